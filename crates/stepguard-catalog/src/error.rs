use crate::doc::DocError;
use camino::Utf8PathBuf;
use stepguard_domain::ports::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog root {0} is not a directory")]
    MissingRoot(Utf8PathBuf),
    #[error("step {0} is not defined")]
    StepNotFound(u32),
    #[error("failed to read {path}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}")]
    Yaml {
        path: Utf8PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid {path}")]
    Invalid {
        path: Utf8PathBuf,
        #[source]
        source: DocError,
    },
    #[error("invalid catalog glob")]
    Glob(#[from] globset::Error),
}

impl From<CatalogError> for ConfigError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::StepNotFound(n) => ConfigError::StepNotFound(n),
            CatalogError::Io { path, source } => ConfigError::Unreadable {
                what: path.to_string(),
                reason: source.to_string(),
            },
            CatalogError::Yaml { path, source } => ConfigError::Invalid {
                what: path.to_string(),
                reason: source.to_string(),
            },
            CatalogError::Invalid { path, source } => ConfigError::Invalid {
                what: path.to_string(),
                reason: source.to_string(),
            },
            other @ (CatalogError::MissingRoot(_) | CatalogError::Glob(_)) => {
                ConfigError::Unreadable {
                    what: "catalog".to_string(),
                    reason: other.to_string(),
                }
            }
        }
    }
}

use crate::error::CatalogError;
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Only the declared type is needed to index a rule file.
#[derive(Deserialize)]
struct TypeProbe {
    #[serde(rename = "type", default)]
    resource_type: Option<String>,
}

/// Index rule files under `resources_root` by their declared `type`.
///
/// Behavior:
/// - Paths (relative to `resources_root`) must match `include` and not match `exclude`.
/// - Files are visited in sorted order; when two files declare the same type the first wins.
/// - Files that cannot be read or do not declare a type are skipped with a warning.
/// - A missing `resources_root` yields an empty index.
pub fn index_rule_files(
    resources_root: &Utf8Path,
    include: &[String],
    exclude: &[String],
) -> Result<BTreeMap<String, Utf8PathBuf>, CatalogError> {
    let include_set = build_globset(include)?;
    let exclude_set = build_globset(exclude)?;

    let mut out: BTreeMap<String, Utf8PathBuf> = BTreeMap::new();
    if !resources_root.is_dir() {
        debug!(root = %resources_root, "no resources directory");
        return Ok(out);
    }

    for entry in WalkDir::new(resources_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let Ok(abs) = Utf8PathBuf::from_path_buf(entry.path().to_path_buf()) else {
            continue;
        };
        let rel = abs
            .strip_prefix(resources_root)
            .unwrap_or(&abs)
            .as_str()
            .replace('\\', "/");
        if !include_set.is_match(&rel) || exclude_set.is_match(&rel) {
            continue;
        }

        let Some(resource_type) = read_declared_type(&abs) else {
            continue;
        };
        if let Some(first) = out.get(&resource_type) {
            warn!(resource_type = %resource_type, kept = %first, ignored = %abs, "duplicate rule file for type");
            continue;
        }
        debug!(resource_type = %resource_type, path = %abs, "indexed rule file");
        out.insert(resource_type, abs);
    }

    Ok(out)
}

fn read_declared_type(path: &Utf8Path) -> Option<String> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!(path = %path, error = %err, "skipping unreadable rule file");
            return None;
        }
    };
    match serde_yaml::from_str::<TypeProbe>(&text) {
        Ok(TypeProbe {
            resource_type: Some(ty),
        }) if !ty.trim().is_empty() => Some(ty),
        Ok(_) => {
            warn!(path = %path, "skipping rule file without a type");
            None
        }
        Err(err) => {
            warn!(path = %path, error = %err, "skipping unparsable rule file");
            None
        }
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, CatalogError> {
    let mut b = GlobSetBuilder::new();
    for p in patterns {
        b.add(Glob::new(p)?);
    }
    Ok(b.build()?)
}

//! Render use case: turn a report into console text, JSON, or Markdown.

use crate::report::{serialize_report, to_renderable};
use stepguard_types::StepguardReport;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "console" | "text" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => anyhow::bail!("unknown output format: {other} (expected console|json|markdown)"),
        }
    }
}

pub fn render_report(report: &StepguardReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Console => Ok(stepguard_render::render_console(&to_renderable(report))),
        OutputFormat::Markdown => Ok(stepguard_render::render_markdown(&to_renderable(report))),
        OutputFormat::Json => {
            let mut text = String::from_utf8(serialize_report(report)?)?;
            text.push('\n');
            Ok(text)
        }
    }
}

//! Rendering for humans: console text and Markdown.
//!
//! Renderers consume the `Renderable*` view models, never the report DTOs, and are pure
//! functions returning `String`.

#![forbid(unsafe_code)]

mod console;
mod markdown;
mod model;

pub use console::{render_console, render_console_step, render_console_summary};
pub use markdown::render_markdown;
pub use model::{
    RenderableError, RenderablePayload, RenderableReport, RenderableResource,
    RenderableResourceStatus, RenderableStep, RenderableStepStatus, RenderableSummary,
    RenderableVerdictStatus, RenderableWarning,
};

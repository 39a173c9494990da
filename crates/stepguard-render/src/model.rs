#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderableVerdictStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderableStepStatus {
    Pending,
    Passed,
    Failed,
    Warning,
    Skipped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderableResourceStatus {
    NotFound,
    Exists,
    Misconfigured,
    Pending,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableResource {
    pub resource_type: String,
    pub name: String,
    pub status: RenderableResourceStatus,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableError {
    pub message: String,
    pub suggestion: Option<String>,
    pub document_ref: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableWarning {
    pub resource: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableStep {
    pub number: u32,
    pub name: String,
    pub status: RenderableStepStatus,
    pub duration_ms: u64,
    pub resources: Vec<RenderableResource>,
    pub errors: Vec<RenderableError>,
    pub warnings: Vec<RenderableWarning>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableSummary {
    pub total_steps: u32,
    pub passed_steps: u32,
    pub failed_steps: u32,
    pub warning_steps: u32,
    pub skipped_steps: u32,
    pub steps: Vec<RenderableStep>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderablePayload {
    Step(RenderableStep),
    Summary(RenderableSummary),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableReport {
    pub verdict: RenderableVerdictStatus,
    pub payload: RenderablePayload,
}

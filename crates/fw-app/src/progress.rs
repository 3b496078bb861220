use crate::run_service::RunMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStage {
    LoadingCase,
    CompilingRuntime,
    SolvingStatic,
    RunningDynamic,
    Trimming,
    Completed,
}

impl RunStage {
    pub fn label(&self) -> &'static str {
        match self {
            RunStage::LoadingCase => "loading",
            RunStage::CompilingRuntime => "compiling",
            RunStage::SolvingStatic => "static",
            RunStage::RunningDynamic => "dynamic",
            RunStage::Trimming => "trim",
            RunStage::Completed => "done",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DynamicProgress {
    pub step: usize,
    pub n_time_steps: usize,
    pub fraction_complete: f64,
    pub converged: bool,
    pub residual: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub mode: RunMode,
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub dynamic: Option<DynamicProgress>,
}

impl RunProgressEvent {
    pub fn stage(
        mode: RunMode,
        stage: RunStage,
        elapsed_wall_s: f64,
        message: Option<String>,
    ) -> Self {
        Self {
            mode,
            stage,
            elapsed_wall_s,
            message,
            dynamic: None,
        }
    }
}

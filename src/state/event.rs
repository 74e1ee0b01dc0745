use super::EnginePhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Initialize,
    ResolutionApplied,
    PreferenceChosen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    pub from: EnginePhase,
    pub event: LifecycleEvent,
    pub to: EnginePhase,
}

impl PhaseTransition {
    pub const fn new(from: EnginePhase, event: LifecycleEvent, to: EnginePhase) -> Self {
        Self { from, event, to }
    }
}

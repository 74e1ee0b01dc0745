use super::error::{StateError, StateResult};
use super::{EnginePhase, LifecycleEvent, PhaseTransition};

#[derive(Debug, Default)]
pub struct StateMachine {
    phase: EnginePhase,
    last_transition: Option<PhaseTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn last_transition(&self) -> Option<PhaseTransition> {
        self.last_transition
    }

    pub fn can_transition(&self, event: LifecycleEvent) -> bool {
        self.next_phase(event).is_some()
    }

    pub fn next_phase(&self, event: LifecycleEvent) -> Option<EnginePhase> {
        use LifecycleEvent::*;
        match (self.phase, event) {
            (EnginePhase::Uninitialized, Initialize) => Some(EnginePhase::Provisional),
            (EnginePhase::Provisional | EnginePhase::Settled, ResolutionApplied) => {
                Some(EnginePhase::Settled)
            }
            (EnginePhase::Provisional | EnginePhase::Settled, PreferenceChosen) => {
                Some(EnginePhase::Settled)
            }
            _ => None,
        }
    }

    pub fn transition(&mut self, event: LifecycleEvent) -> StateResult<EnginePhase> {
        tracing::debug!(from = ?self.phase, event = ?event, "request engine transition");
        let next = self.next_phase(event).ok_or_else(|| {
            let from = self.phase;
            tracing::warn!(from = ?from, event = ?event, "invalid engine transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        self.last_transition = Some(PhaseTransition::new(self.phase, event, next));
        self.phase = next;
        Ok(self.phase)
    }
}

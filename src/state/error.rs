use super::event::LifecycleEvent;
use super::model::EnginePhase;
use thiserror::Error;

pub type StateResult<T> = std::result::Result<T, StateError>;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid engine transition: from {from:?} using event {event:?}")]
    InvalidStateTransition {
        from: EnginePhase,
        event: LifecycleEvent,
    },
}

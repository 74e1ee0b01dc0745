/// Where the engine is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnginePhase {
    /// Constructed, nothing published yet.
    #[default]
    Uninitialized,
    /// Device-derived theme is published; persisted preference not applied yet.
    Provisional,
    /// A resolved or user-chosen preference is in effect.
    Settled,
}

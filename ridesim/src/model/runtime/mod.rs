mod expiration_manager;
mod running_task;
mod spawning_coordinator;

pub use expiration_manager::{ExpirationHooks, ExpirationManager};
pub use running_task::RunningTask;
pub use spawning_coordinator::{SpawnHooks, SpawningCoordinator};

/// errors surfaced by injected hooks. the periodic managers only log these;
/// the hook implementation owns any statistics or retry policy.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Events emitted during a simulation step.
/// The presentation layer consumes these for animation/sound/HUD.

use crate::domain::scoring::LevelResult;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// Run timer started by the first control input.
    TimerStarted,
    /// Emitted every tick while the run timer is running.
    TimerTick { elapsed_secs: f64 },
    EnemyStomped { id: usize },
    EnemyRemoved { id: usize },
    PlayerHurt { health: u32 },
    PlayerDied,
    PlayerRespawned,
    ToastCollected { value: u32, total: u32 },
    LevelCompleted(LevelResult),
}

/// Top-level session state. `started` flips false -> true exactly once;
/// ammo/health/score are displayed by the HUD but nothing in the game
/// mutates them.
pub struct GameState {
    started: bool,
    pub ammo: i32,
    pub health: i32,
    pub score: i32,
}

/// Magazine size shown in the HUD reserve readout.
pub const AMMO_RESERVE: i32 = 90;

impl GameState {
    pub fn new() -> Self {
        Self {
            started: false,
            ammo: 30,
            health: 100,
            score: 0,
        }
    }

    /// The start button's callback. Safe to invoke more than once.
    pub fn start(&mut self) {
        self.started = true;
    }

    pub fn started(&self) -> bool {
        self.started
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_values() {
        let state = GameState::new();
        assert!(!state.started());
        assert_eq!(state.ammo, 30);
        assert_eq!(state.health, 100);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_start_is_monotonic_and_idempotent() {
        let mut state = GameState::new();
        state.start();
        assert!(state.started());
        state.start();
        assert!(state.started(), "second start is a no-op");
        // Gameplay never touches the counters
        assert_eq!((state.ammo, state.health, state.score), (30, 100, 0));
    }
}

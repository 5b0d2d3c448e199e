use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameView {
    #[default]
    Playing,
    RoundComplete,
    GameComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameViewEvent {
    Won,
    Restart,
    Advance { has_next: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameViewEffect {
    None,
    RestartRound,
    StartNextRound,
}

impl GameView {
    /// Pure transition function for the round UI state.
    ///
    /// Board work (re-placing markers) is reported via `GameViewEffect` so callers stay
    /// deterministic.
    pub fn handle(self, event: GameViewEvent) -> (GameView, GameViewEffect) {
        match (self, event) {
            (GameView::Playing, GameViewEvent::Won) => {
                (GameView::RoundComplete, GameViewEffect::None)
            }

            (GameView::RoundComplete, GameViewEvent::Advance { has_next: true }) => {
                (GameView::Playing, GameViewEffect::StartNextRound)
            }
            (GameView::RoundComplete, GameViewEvent::Advance { has_next: false }) => {
                (GameView::GameComplete, GameViewEffect::None)
            }

            (_, GameViewEvent::Restart) => (GameView::Playing, GameViewEffect::RestartRound),

            (state, _) => (state, GameViewEffect::None),
        }
    }

    /// Pointer input only reaches the board while playing.
    pub fn accepts_input(self) -> bool {
        matches!(self, GameView::Playing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_view_is_playing() {
        assert_eq!(GameView::default(), GameView::Playing);
        assert!(GameView::default().accepts_input());
    }

    #[test]
    fn win_completes_the_round() {
        assert_eq!(
            GameView::Playing.handle(GameViewEvent::Won),
            (GameView::RoundComplete, GameViewEffect::None)
        );
        assert!(!GameView::RoundComplete.accepts_input());
    }

    #[test]
    fn advance_only_leaves_a_completed_round() {
        assert_eq!(
            GameView::Playing.handle(GameViewEvent::Advance { has_next: true }),
            (GameView::Playing, GameViewEffect::None)
        );
        assert_eq!(
            GameView::RoundComplete.handle(GameViewEvent::Advance { has_next: true }),
            (GameView::Playing, GameViewEffect::StartNextRound)
        );
        assert_eq!(
            GameView::RoundComplete.handle(GameViewEvent::Advance { has_next: false }),
            (GameView::GameComplete, GameViewEffect::None)
        );
    }

    #[test]
    fn restart_works_from_every_view() {
        for view in [
            GameView::Playing,
            GameView::RoundComplete,
            GameView::GameComplete,
        ] {
            assert_eq!(
                view.handle(GameViewEvent::Restart),
                (GameView::Playing, GameViewEffect::RestartRound)
            );
        }
    }
}

use crate::environment::invaders::mechanics::{GameInput, InvadersMechanics};

/// Presentation layer of the game: draws the current game state and reads player input
pub trait InvadersDrawer {
    fn draw(&mut self, mechanics: &InvadersMechanics);

    /// Input collected since the last frame
    fn read_player_input(&self) -> GameInput;
}

/// Draws nothing and never reports any input. Used for training.
pub struct NoDrawer;

impl InvadersDrawer for NoDrawer {
    fn draw(&mut self, _mechanics: &InvadersMechanics) {}

    fn read_player_input(&self) -> GameInput {
        GameInput::none()
    }
}

use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

use anyhow::Result;
use console_engine::screen::Screen;

/// Data type we use to encode an `Action` at the boundary between agent and environment.
pub type ModelActionType = u8;

pub trait Action: Display + Debug + Sized + Clone + Copy + Hash + PartialEq + Eq {
    /// Number of possible actions
    const ACTION_SPACE: ModelActionType;
    /// Identifying the Action as a unique value in range (0..Self::ACTION_SPACE)
    fn numeric(&self) -> ModelActionType;
    fn try_from_numeric(value: ModelActionType) -> Result<Self>;
}

/// Learning environment, modeling the world of a learning agent
pub trait Environment {
    /// Observation handed out to the agent after each step
    type S: Clone;
    type A: Action;

    /// Resets the environment to a defined starting point and returns the initial state
    fn reset(&mut self) -> &Self::S;

    /// Current state
    fn state(&self) -> &Self::S;

    /// Performs one time/action-step.
    ///
    /// Applies the given `action` to the environment and returns:
    ///   - next state
    ///   - immediate reward earned during performing that step
    ///   - done flag (e.g. game ended)
    ///
    fn step(
        &mut self,
        action: Self::A,
    ) -> (&Self::S, f32, bool);

    /// Visualizes the current state. Has no effect on the environment itself.
    fn render(&mut self) {}

    /// One line summary of the current situation, used for trace logging
    fn one_line_info(&self) -> String {
        String::new()
    }
}

/// Projects an environment state into a (small) discrete key, usable to index a value table.
pub trait StateDiscretizer<E: Environment> {
    type Key: Clone + Debug + Hash + Eq;

    fn discretize(
        &self,
        environment: &E,
        state: &E::S,
    ) -> Self::Key;
}

pub trait DebugVisualizer {
    fn one_line_info(&self) -> String;
    fn render_to_console(&self) -> Screen;
}

#[derive(Debug)]
pub struct QlError(pub String);

impl Display for QlError {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for QlError {}

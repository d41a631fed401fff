use std::fmt::{Display, Formatter};

use anyhow::Result;
use ql::prelude::{Action, DebugVisualizer, Environment, ModelActionType, QlError};

use crate::environment::invaders::drawer::InvadersDrawer;
use crate::environment::invaders::mechanics::{GameInput, InvadersMechanics, Observation, ShipControl};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum InvadersAction {
    MoveLeft,
    MoveRight,
    Fire,
    Hold,
}

impl Action for InvadersAction {
    const ACTION_SPACE: ModelActionType = 4;

    fn numeric(&self) -> ModelActionType {
        match self {
            InvadersAction::MoveLeft => 0,
            InvadersAction::MoveRight => 1,
            InvadersAction::Fire => 2,
            InvadersAction::Hold => 3,
        }
    }

    fn try_from_numeric(value: ModelActionType) -> Result<Self> {
        match value {
            0 => Ok(InvadersAction::MoveLeft),
            1 => Ok(InvadersAction::MoveRight),
            2 => Ok(InvadersAction::Fire),
            3 => Ok(InvadersAction::Hold),
            _ => Err(QlError(format!("action value {} out of range", value)).into()),
        }
    }
}

impl Display for InvadersAction {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        let symbol = match self {
            InvadersAction::MoveLeft => "←",
            InvadersAction::MoveRight => "→",
            InvadersAction::Fire => "⇡",
            InvadersAction::Hold => "·",
        };
        f.write_str(symbol)
    }
}

/// The invaders game as learning environment.
///
/// State is the fixed length [Observation] of the game mechanics.
pub struct InvadersEnvironment {
    mechanics: InvadersMechanics,
    drawer: Box<dyn InvadersDrawer>,
    observation: Observation,
}

impl InvadersEnvironment {
    pub fn new(drawer: Box<dyn InvadersDrawer>) -> Self {
        let mechanics = InvadersMechanics::new();
        let observation = mechanics.observation();
        Self {
            mechanics,
            drawer,
            observation,
        }
    }

    pub fn mechanics(&self) -> &InvadersMechanics {
        &self.mechanics
    }

    pub fn read_player_input(&self) -> GameInput {
        self.drawer.read_player_input()
    }

    fn map_model_action_to_ship_control(action: InvadersAction) -> ShipControl {
        match action {
            InvadersAction::MoveLeft => ShipControl::MoveLeft,
            InvadersAction::MoveRight => ShipControl::MoveRight,
            InvadersAction::Fire => ShipControl::Fire,
            InvadersAction::Hold => ShipControl::Hold,
        }
    }

    pub fn map_ship_control_to_model_action(control: ShipControl) -> InvadersAction {
        match control {
            ShipControl::MoveLeft => InvadersAction::MoveLeft,
            ShipControl::MoveRight => InvadersAction::MoveRight,
            ShipControl::Fire => InvadersAction::Fire,
            ShipControl::Hold => InvadersAction::Hold,
        }
    }
}

impl Environment for InvadersEnvironment {
    type S = Observation;
    type A = InvadersAction;

    fn reset(&mut self) -> &Self::S {
        self.mechanics.reset();
        self.observation = self.mechanics.observation();
        &self.observation
    }

    fn state(&self) -> &Self::S {
        &self.observation
    }

    fn step(
        &mut self,
        action: Self::A,
    ) -> (&Self::S, f32, bool) {
        let reward = self.mechanics.time_step(Self::map_model_action_to_ship_control(action));
        self.observation = self.mechanics.observation();
        (&self.observation, reward, self.mechanics.finished())
    }

    fn render(&mut self) {
        self.drawer.draw(&self.mechanics);
    }

    fn one_line_info(&self) -> String {
        self.mechanics.one_line_info()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use rstest::rstest;

    use crate::environment::invaders::drawer::NoDrawer;
    use crate::environment::invaders::mechanics::{GameResult, LOSS_REWARD, OBSERVATION_SENTINEL, STEP_REWARD};

    use super::*;

    #[rstest]
    #[case(0, InvadersAction::MoveLeft)]
    #[case(1, InvadersAction::MoveRight)]
    #[case(2, InvadersAction::Fire)]
    #[case(3, InvadersAction::Hold)]
    fn test_action_numeric(#[case] value: ModelActionType, #[case] action: InvadersAction) {
        assert_eq!(InvadersAction::try_from_numeric(value).unwrap(), action);
        assert_eq!(action.numeric(), value);
    }

    #[test]
    fn test_action_out_of_range() {
        assert!(InvadersAction::try_from_numeric(4).is_err());
        assert!(InvadersAction::try_from_numeric(255).is_err());
    }

    #[test]
    fn test_reset_and_step() {
        let mut env = InvadersEnvironment::new(Box::new(NoDrawer));
        let initial = *env.reset();
        assert_eq!(initial.len(), 121);

        let (observation, reward, done) = env.step(InvadersAction::Fire);
        assert_eq!(reward, STEP_REWARD);
        assert!(!done);
        assert_ne!(observation[101], OBSERVATION_SENTINEL);
        assert_eq!(env.mechanics().projectiles.len(), 1);

        let (observation, _, _) = env.step(InvadersAction::MoveLeft);
        assert_eq!(observation[0], 355.0 / 800.0);
        assert_eq!(*env.state(), env.mechanics().observation());

        assert_eq!(*env.reset(), initial);
        assert!(env.mechanics().projectiles.is_empty());
    }

    #[test]
    fn test_episode_ends() {
        let mut env = InvadersEnvironment::new(Box::new(NoDrawer));
        env.reset();
        let mut steps = 0;
        loop {
            steps += 1;
            assert!(steps < 10_000);
            let (_, reward, done) = env.step(InvadersAction::MoveRight);
            if done {
                assert_eq!(reward, LOSS_REWARD);
                break;
            }
        }
        assert_eq!(env.mechanics().result, Some(GameResult::Lost));
    }

    struct CountingDrawer {
        frames: Rc<Cell<usize>>,
    }

    impl InvadersDrawer for CountingDrawer {
        fn draw(&mut self, _mechanics: &InvadersMechanics) {
            self.frames.set(self.frames.get() + 1);
        }

        fn read_player_input(&self) -> GameInput {
            GameInput::exit()
        }
    }

    #[test]
    fn test_render_delegates_to_drawer() {
        let frames = Rc::new(Cell::new(0));
        let mut env = InvadersEnvironment::new(Box::new(CountingDrawer { frames: Rc::clone(&frames) }));
        env.reset();
        let before = env.mechanics().clone();

        env.render();
        env.render();
        assert_eq!(frames.get(), 2);
        assert_eq!(env.mechanics().observation(), before.observation());
        assert!(env.read_player_input().exit);
    }

    #[test]
    fn test_ship_control_mapping() {
        for value in 0..InvadersAction::ACTION_SPACE {
            let action = InvadersAction::try_from_numeric(value).unwrap();
            let control = InvadersEnvironment::map_model_action_to_ship_control(action);
            assert_eq!(InvadersEnvironment::map_ship_control_to_model_action(control), action);
        }
    }
}

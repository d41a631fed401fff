use serde::{Deserialize, Serialize};

use ql::prelude::StateDiscretizer;

use crate::environment::invaders::mechanics::{Observation, MAX_ENEMIES, OBSERVATION_LEN, OBSERVATION_SENTINEL};
use crate::environment::invaders_environment::InvadersEnvironment;

/// Number of bins a normalized horizontal position is split into
pub const POSITION_BINS: i32 = 20;

/// Discrete projection of an invaders observation
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvadersStateKey {
    pub ship_bin: i32,
    /// `-POSITION_BINS` when no enemy is left
    pub nearest_enemy_bin: i32,
    /// 0 = swarm moving left, 1 = moving right
    pub swarm_direction_bin: u8,
}

/// Maps an observation and the swarm direction to a state key.
///
/// The nearest enemy is the one with the smallest horizontal distance to the ship;
/// on equal distance the first one in observation order is taken.
pub fn discretize(observation: &[f32], swarm_direction: i32) -> InvadersStateKey {
    assert_eq!(observation.len(), OBSERVATION_LEN, "unexpected observation length");

    let ship_x = observation[0];
    let nearest_enemy_x = observation[1..1 + 2 * MAX_ENEMIES]
        .chunks_exact(2)
        .map(|position| position[0])
        .filter(|&x| x != OBSERVATION_SENTINEL)
        .min_by(|a, b| (ship_x - a).abs().total_cmp(&(ship_x - b).abs()))
        .unwrap_or(OBSERVATION_SENTINEL);

    InvadersStateKey {
        ship_bin: position_bin(ship_x),
        nearest_enemy_bin: position_bin(nearest_enemy_x),
        swarm_direction_bin: if swarm_direction < 0 { 0 } else { 1 },
    }
}

fn position_bin(x: f32) -> i32 {
    (x * POSITION_BINS as f32).floor() as i32
}

pub struct InvadersDiscretizer;

impl StateDiscretizer<InvadersEnvironment> for InvadersDiscretizer {
    type Key = InvadersStateKey;

    fn discretize(
        &self,
        environment: &InvadersEnvironment,
        state: &Observation,
    ) -> Self::Key {
        discretize(state, environment.mechanics().swarm.direction())
    }
}

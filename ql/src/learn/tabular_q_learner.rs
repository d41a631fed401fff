use std::hash::Hash;
use std::path::Path;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::learn::q_table::QTable;
use crate::prelude::Action;
use crate::util::immutable::Immutable;

#[derive(Clone, Debug)]
pub struct Parameter {
    /// Learning rate; (0 <= 𝛼 <= 1) how much a new experience overrides the old estimate
    pub alpha: f32,
    /// Discount rate; (0 <= 𝛾 <= 1) represents the value of future rewards. The bigger, the more farsighted the agent becomes
    pub gamma: f32,
    /// Initial epsilon greedy parameter
    pub epsilon_start: f64,
    /// Minimum epsilon greedy parameter
    pub epsilon_min: f64,
    /// Multiplied onto epsilon after each episode
    pub epsilon_decay: f64,
    /// Seed for the exploration randomness; taken from OS entropy when `None`
    pub seed: Option<u64>,
}

impl Default for Parameter {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.95,
            epsilon_start: 1.0,
            epsilon_min: 0.05,
            epsilon_decay: 0.9995,
            seed: None,
        }
    }
}

/// Tabular Q-learning agent with an epsilon-greedy policy.
///
/// `K` is the discrete state key, `A` the action type.
pub struct TabularQLearner<K, A> {
    param: Immutable<Parameter>,
    rng: StdRng,
    q_table: QTable<K, A>,
    /// Epsilon greedy parameter
    epsilon: f64,
}

impl<K, A> TabularQLearner<K, A>
where
    K: Clone + Hash + Eq,
    A: Action,
{
    pub fn new(param: Parameter) -> Self {
        Self::with_q_table(param, QTable::new())
    }

    pub fn with_q_table(
        param: Parameter,
        q_table: QTable<K, A>,
    ) -> Self {
        assert!((0.0..=1.0).contains(&param.alpha), "alpha should be in range 0..=1");
        assert!((0.0..=1.0).contains(&param.gamma), "gamma should be in range 0..=1");
        assert!(param.epsilon_min <= param.epsilon_start);

        let rng = match param.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let epsilon = param.epsilon_start;
        Self {
            param: Immutable::new(param),
            rng,
            q_table,
            epsilon,
        }
    }

    pub fn param(&self) -> &Parameter {
        &self.param
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn q_table(&self) -> &QTable<K, A> {
        &self.q_table
    }

    /// Epsilon-greedy action selection
    pub fn select_action(
        &mut self,
        state: &K,
    ) -> Result<A> {
        if self.epsilon > self.rng.gen_range(0_f64..1_f64) {
            // Take random action
            let a = self.rng.gen_range(0..A::ACTION_SPACE);
            A::try_from_numeric(a)
        } else {
            self.best_action(state)
        }
    }

    /// Greedy action selection; unknown states count as all-zero rows, the lowest action index wins on ties
    pub fn best_action(
        &self,
        state: &K,
    ) -> Result<A> {
        self.q_table.best_action(state)
    }

    /// One-step Q-learning update:
    /// `Q(s,a) += 𝛼 * (r + 𝛾 * max_a' Q(s',a') - Q(s,a))`
    pub fn update(
        &mut self,
        state: &K,
        action: A,
        reward: f32,
        next_state: &K,
    ) {
        let next_max = {
            let next_values = self.q_table.action_values_mut(next_state);
            next_values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
        };

        let values = self.q_table.action_values_mut(state);
        let a = action.numeric() as usize;
        let old_value = values[a];
        values[a] = old_value + self.param.alpha * (reward + self.param.gamma * next_max - old_value);
    }

    /// Decays epsilon once; it never falls below `epsilon_min` and never increases
    pub fn decay_exploration(&mut self) {
        if self.epsilon > self.param.epsilon_min {
            self.epsilon = f64::max(self.epsilon * self.param.epsilon_decay, self.param.epsilon_min);
        }
    }

    /// Pure greedy play from now on
    pub fn disable_exploration(&mut self) {
        self.epsilon = 0.0;
    }
}

impl<K, A> TabularQLearner<K, A>
where
    K: Clone + Hash + Eq + Serialize + DeserializeOwned,
    A: Action,
{
    pub fn save(
        &self,
        file: &Path,
    ) -> Result<()> {
        self.q_table.save(file)?;
        log::info!("saved Q-table with {} states to '{}'", self.q_table.len(), file.display());
        Ok(())
    }

    /// Replaces the current table with the one stored in `file`
    pub fn load(
        &mut self,
        file: &Path,
    ) -> Result<()> {
        self.q_table = QTable::load(file)?;
        log::info!("loaded Q-table with {} states from '{}'", self.q_table.len(), file.display());
        Ok(())
    }
}

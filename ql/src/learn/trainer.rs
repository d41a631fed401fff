use anyhow::Result;
use itertools::Itertools;
use num_format::ToFormattedString;
use rustc_hash::FxHashMap;

use crate::learn::reward_history::RewardHistory;
use crate::learn::tabular_q_learner::TabularQLearner;
use crate::prelude::{Action, Environment, StateDiscretizer};
use crate::util::format;
use crate::util::immutable::Immutable;

pub struct TrainerParameter {
    /// Log learning statistics every n episodes
    pub stats_after_episodes: usize,
    /// Number of recent episode rewards the statistics are calculated on
    pub reward_history_len: usize,
}

impl Default for TrainerParameter {
    fn default() -> Self {
        Self {
            stats_after_episodes: 100,
            reward_history_len: 100,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeSummary {
    pub steps: usize,
    pub total_reward: f32,
    /// reward of the terminating step
    pub final_reward: f32,
}

/// Drives an [Environment] and a [TabularQLearner] through episodes.
///
/// Each step: discretize state → select action → step the environment → update the Q-table.
/// Episodes end only when the environment signals `done`.
pub struct Trainer<E, D>
where
    E: Environment,
    D: StateDiscretizer<E>,
{
    environment: E,
    discretizer: D,
    learner: TabularQLearner<D::Key, E::A>,
    param: Immutable<TrainerParameter>,
    reward_history: RewardHistory<f32>,
    /// actions taken since the last statistics log
    action_counts: FxHashMap<E::A, usize>,
    step_count: usize,
    episode_count: usize,
}

impl<E, D> Trainer<E, D>
where
    E: Environment,
    D: StateDiscretizer<E>,
{
    pub fn new(
        environment: E,
        discretizer: D,
        learner: TabularQLearner<D::Key, E::A>,
        param: TrainerParameter,
    ) -> Self {
        assert!(param.stats_after_episodes > 0);
        let reward_history = RewardHistory::new(param.reward_history_len);
        Self {
            environment,
            discretizer,
            learner,
            param: Immutable::new(param),
            reward_history,
            action_counts: FxHashMap::default(),
            step_count: 0,
            episode_count: 0,
        }
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    pub fn learner(&self) -> &TabularQLearner<D::Key, E::A> {
        &self.learner
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    pub fn reward_history(&self) -> &RewardHistory<f32> {
        &self.reward_history
    }

    pub fn train(
        &mut self,
        episodes: usize,
    ) -> Result<()> {
        log::info!("starting training for {} episodes", episodes.to_formatted_string(&format::number_format()));
        for _ in 0..episodes {
            self.learn_episode()?;
        }
        log::info!(
            "training finished after {} episodes; Q-table covers {} states",
            self.episode_count.to_formatted_string(&format::number_format()),
            self.learner.q_table().len()
        );
        Ok(())
    }

    /// Plays one episode while learning from every step; decays exploration afterwards
    pub fn learn_episode(&mut self) -> Result<EpisodeSummary> {
        self.environment.reset();
        let mut state_key = self.discretizer.discretize(&self.environment, self.environment.state());
        log::trace!("started learning episode {}", self.episode_count);

        let mut summary = EpisodeSummary {
            steps: 0,
            total_reward: 0.0,
            final_reward: 0.0,
        };

        loop {
            self.step_count += 1;
            summary.steps += 1;

            let action = self.learner.select_action(&state_key)?;
            let (_, reward, done) = self.environment.step(action);
            log::trace!("step with action {} resulted in reward: {:.2}, done: {}", action, reward, done);
            log::trace!("{}", self.environment.one_line_info());

            let next_state_key = self.discretizer.discretize(&self.environment, self.environment.state());
            self.learner.update(&state_key, action, reward, &next_state_key);

            *self.action_counts.entry(action).or_insert(0) += 1;
            summary.total_reward += reward;
            state_key = next_state_key;

            if done {
                summary.final_reward = reward;
                break;
            }
        }

        self.learner.decay_exploration();
        self.reward_history.add(summary.total_reward);
        self.episode_count += 1;
        log::debug!(
            "episode {} finished after {} steps with reward {:.2}",
            self.episode_count,
            summary.steps,
            summary.total_reward
        );

        if self.episode_count % self.param.stats_after_episodes == 0 {
            self.learning_update_log();
        }

        Ok(summary)
    }

    /// Plays one episode greedily without learning, rendering each step.
    ///
    /// `interrupted` is checked before every step; returns `None` when the episode was interrupted.
    pub fn evaluate_episode(
        &mut self,
        mut interrupted: impl FnMut(&E) -> bool,
    ) -> Result<Option<EpisodeSummary>> {
        self.environment.reset();
        self.environment.render();

        let mut summary = EpisodeSummary {
            steps: 0,
            total_reward: 0.0,
            final_reward: 0.0,
        };

        loop {
            if interrupted(&self.environment) {
                return Ok(None);
            }

            let state_key = self.discretizer.discretize(&self.environment, self.environment.state());
            let action = self.learner.best_action(&state_key)?;
            let (_, reward, done) = self.environment.step(action);
            self.environment.render();

            summary.steps += 1;
            summary.total_reward += reward;
            if done {
                summary.final_reward = reward;
                return Ok(Some(summary));
            }
        }
    }

    fn learning_update_log(&mut self) {
        let number_format = format::number_format();

        let total_actions: usize = self.action_counts.values().sum();
        let action_distribution_line = self
            .action_counts
            .iter()
            .sorted_by_key(|(action, _)| action.numeric())
            .map(|(action, &count)| {
                let ratio = 100.0 * count as f32 / total_actions as f32;
                format!("{} {:.1}%", action, ratio)
            })
            .join(", ");

        log::info!(
            "\n\
    episode: {}, steps: {}, 𝛾={:.2}, 𝜀={:.3}, q_table_states: {}\n\
    rewards (last {}): {{mean: {:.2}, low: {:.2}, high: {:.2}}}\n\
    action_distribution (of last {}): {}",
            self.episode_count.to_formatted_string(&number_format),
            self.step_count.to_formatted_string(&number_format),
            self.learner.param().gamma,
            self.learner.epsilon(),
            self.learner.q_table().len().to_formatted_string(&number_format),
            self.reward_history.len(),
            self.reward_history.mean().unwrap_or_default(),
            self.reward_history.min().unwrap_or_default(),
            self.reward_history.max().unwrap_or_default(),
            total_actions.to_formatted_string(&number_format),
            action_distribution_line
        );

        self.action_counts.clear();
    }
}

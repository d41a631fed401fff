use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use num_format::ToFormattedString;

use invaders_game::environment::invaders::console_drawer::ConsoleDrawer;
use invaders_game::environment::invaders::discretizer::InvadersDiscretizer;
use invaders_game::environment::invaders::drawer::{InvadersDrawer, NoDrawer};
use invaders_game::environment::invaders::mechanics::GameResult;
use invaders_game::environment::invaders_environment::InvadersEnvironment;
use ql::learn::tabular_q_learner::{Parameter, TabularQLearner};
use ql::learn::trainer::{Trainer, TrainerParameter};
use ql::prelude::Environment;
use ql::util::format;
use ql::util::log::init_logging;

const DEFAULT_Q_TABLE_FILE: &str = "q_table.json";
const PAUSE_BETWEEN_EPISODES: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "invaders-q-learning")]
#[command(about = "Tabular Q-learning agent playing an invaders arcade game")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train the agent without rendering and save the learned Q-table
    Train {
        #[arg(long, default_value_t = 1000)]
        episodes: usize,
        #[arg(long, default_value = DEFAULT_Q_TABLE_FILE)]
        q_table: PathBuf,
        /// Seed for reproducible exploration
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 100)]
        stats_after_episodes: usize,
    },
    /// Watch the trained agent play greedily in the terminal; Esc quits
    Evaluate {
        #[arg(long, default_value = DEFAULT_Q_TABLE_FILE)]
        q_table: PathBuf,
    },
    /// Play yourself in the terminal: ←/→ move, space fires, Esc quits
    Play,
}

fn main() -> Result<()> {
    init_logging();

    match Cli::parse().command {
        Commands::Train {
            episodes,
            q_table,
            seed,
            stats_after_episodes,
        } => train(episodes, &q_table, seed, stats_after_episodes),
        Commands::Evaluate { q_table } => evaluate(&q_table),
        Commands::Play => play(),
    }
}

fn train(
    episodes: usize,
    q_table_file: &Path,
    seed: Option<u64>,
    stats_after_episodes: usize,
) -> Result<()> {
    let learner = TabularQLearner::new(Parameter {
        seed,
        ..Parameter::default()
    });
    let mut trainer = Trainer::new(
        InvadersEnvironment::new(Box::new(NoDrawer)),
        InvadersDiscretizer,
        learner,
        TrainerParameter {
            stats_after_episodes,
            ..TrainerParameter::default()
        },
    );

    let mut won = 0_usize;
    for _ in 0..episodes {
        trainer.learn_episode()?;
        if trainer.environment().mechanics().result == Some(GameResult::Won) {
            won += 1;
        }
    }

    let number_format = format::number_format();
    log::info!(
        "training finished: {} of {} episodes won, Q-table covers {} states",
        won.to_formatted_string(&number_format),
        episodes.to_formatted_string(&number_format),
        trainer.learner().q_table().len().to_formatted_string(&number_format)
    );
    trainer.learner().save(q_table_file)
}

fn evaluate(q_table_file: &Path) -> Result<()> {
    let mut learner = TabularQLearner::new(Parameter::default());
    if let Err(e) = learner.load(q_table_file) {
        log::error!("{:#}. Run the `train` mode first.", e);
        return Ok(());
    }
    learner.disable_exploration();

    let mut trainer = Trainer::new(
        InvadersEnvironment::new(console_drawer_or_fallback()),
        InvadersDiscretizer,
        learner,
        TrainerParameter::default(),
    );

    let mut episode = 0_usize;
    loop {
        episode += 1;
        match trainer.evaluate_episode(|env| env.read_player_input().exit)? {
            None => break,
            Some(summary) => {
                log::info!(
                    "episode {}: {:?} after {} steps, score: {}, reward: {:.2}",
                    episode,
                    trainer.environment().mechanics().result,
                    summary.steps,
                    trainer.environment().mechanics().score,
                    summary.total_reward
                );
            }
        }
        thread::sleep(PAUSE_BETWEEN_EPISODES);
    }
    Ok(())
}

fn play() -> Result<()> {
    let mut environment = InvadersEnvironment::new(Box::new(ConsoleDrawer::new()?));
    environment.reset();
    environment.render();

    let mut total_reward = 0.0;
    loop {
        let input = environment.read_player_input();
        if input.exit {
            break;
        }
        let action = InvadersEnvironment::map_ship_control_to_model_action(input.control);
        let (_, reward, done) = environment.step(action);
        total_reward += reward;
        environment.render();
        if done {
            break;
        }
    }
    let result = environment.mechanics().result;
    let score = environment.mechanics().score;
    // restores the terminal
    drop(environment);

    println!("Game over! {:?}, score: {}, episode reward: {:.2}", result, score, total_reward);
    Ok(())
}

fn console_drawer_or_fallback() -> Box<dyn InvadersDrawer> {
    match ConsoleDrawer::new() {
        Ok(drawer) => Box::new(drawer),
        Err(e) => {
            log::warn!("{:#}; continuing without rendering", e);
            Box::new(NoDrawer)
        }
    }
}

use anyhow::Result;

use common::{SEEDED_PARAMETER, TRAINING_EPISODES};
use invaders_game::environment::invaders::discretizer::{InvadersDiscretizer, InvadersStateKey};
use invaders_game::environment::invaders::drawer::NoDrawer;
use invaders_game::environment::invaders::mechanics::{GameResult, LOSS_REWARD, WIN_REWARD};
use invaders_game::environment::invaders_environment::{InvadersAction, InvadersEnvironment};
use ql::learn::tabular_q_learner::TabularQLearner;
use ql::learn::trainer::{Trainer, TrainerParameter};

mod common;

type InvadersTrainer = Trainer<InvadersEnvironment, InvadersDiscretizer>;

fn invaders_trainer(learner: TabularQLearner<InvadersStateKey, InvadersAction>) -> InvadersTrainer {
    Trainer::new(
        InvadersEnvironment::new(Box::new(NoDrawer)),
        InvadersDiscretizer,
        learner,
        TrainerParameter {
            stats_after_episodes: 1,
            reward_history_len: 10,
        },
    )
}

#[test]
fn test_train_save_load_evaluate() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let q_table_file = dir.path().join("q_table.json");

    let mut trainer = invaders_trainer(TabularQLearner::new(SEEDED_PARAMETER.clone()));
    for _ in 0..TRAINING_EPISODES {
        let summary = trainer.learn_episode()?;
        assert!(summary.final_reward == LOSS_REWARD || summary.final_reward == WIN_REWARD);
        assert!(trainer.environment().mechanics().result.is_some());
    }
    assert_eq!(trainer.episode_count(), TRAINING_EPISODES);
    assert!(!trainer.learner().q_table().is_empty());
    assert!(trainer.learner().epsilon() < 1.0);
    trainer.learner().save(&q_table_file)?;

    let mut learner = TabularQLearner::new(SEEDED_PARAMETER.clone());
    learner.load(&q_table_file)?;
    assert_eq!(learner.q_table(), trainer.learner().q_table());
    learner.disable_exploration();

    let mut evaluator = invaders_trainer(learner);
    let summary = evaluator
        .evaluate_episode(|_| false)?
        .expect("evaluation was not interrupted");
    assert!(summary.steps > 0);
    assert!(matches!(
        evaluator.environment().mechanics().result,
        Some(GameResult::Won) | Some(GameResult::Lost)
    ));
    // evaluation does not learn
    assert_eq!(evaluator.learner().q_table(), trainer.learner().q_table());
    Ok(())
}

#[test]
fn test_seeded_training_is_reproducible() -> Result<()> {
    let run = || -> Result<Vec<f32>> {
        let mut trainer = invaders_trainer(TabularQLearner::new(SEEDED_PARAMETER.clone()));
        (0..2).map(|_| trainer.learn_episode().map(|s| s.total_reward)).collect()
    };
    assert_eq!(run()?, run()?);
    Ok(())
}

#[test]
fn test_load_missing_q_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut learner = TabularQLearner::<InvadersStateKey, InvadersAction>::new(SEEDED_PARAMETER.clone());
    let err = learner.load(&dir.path().join("missing.json")).unwrap_err();
    assert!(format!("{:#}", err).contains("missing.json"));
    assert!(learner.q_table().is_empty());
}

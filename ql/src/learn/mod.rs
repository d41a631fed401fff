pub mod q_table;
pub mod reward_history;
pub mod tabular_q_learner;
pub mod trainer;

pub mod invaders;
pub mod invaders_environment;

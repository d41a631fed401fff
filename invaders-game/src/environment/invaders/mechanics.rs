use std::mem;

use console_engine::pixel;
use console_engine::screen::Screen;
use itertools::Itertools;
use ql::prelude::DebugVisualizer;

use crate::environment::invaders::algebra_2d::AaBB;
use crate::environment::invaders::entities::{Projectile, Ship, Swarm, SHIP_SPEED};

/// TOP / LEFT corner is 0/0
pub const MODEL_GRID_LEN_X: i32 = 800;
pub const MODEL_GRID_LEN_Y: i32 = 600;

pub const MAX_ENEMIES: usize = 50;
pub const MAX_PROJECTILES: usize = 10;
/// ship x + (x, y) per enemy slot + (x, y) per projectile slot
pub const OBSERVATION_LEN: usize = 1 + 2 * MAX_ENEMIES + 2 * MAX_PROJECTILES;
/// Value of unoccupied observation slots
pub const OBSERVATION_SENTINEL: f32 = -1.0;

pub const STEP_REWARD: f32 = -0.01;
pub const KILL_REWARD: f32 = 10.0;
pub const LOSS_REWARD: f32 = -100.0;
pub const WIN_REWARD: f32 = 200.0;
const KILL_SCORE: u32 = 10;

/// Normalized positions of all entities; see [InvadersMechanics::observation]
pub type Observation = [f32; OBSERVATION_LEN];

const CONSOLE_CELL_LEN_X: i32 = 10;
const CONSOLE_CELL_LEN_Y: i32 = 20;
pub const CONSOLE_SCREEN_LEN_X: u32 = (MODEL_GRID_LEN_X / CONSOLE_CELL_LEN_X) as u32;
pub const CONSOLE_SCREEN_LEN_Y: u32 = (MODEL_GRID_LEN_Y / CONSOLE_CELL_LEN_Y) as u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    Won,
    Lost,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShipControl {
    MoveLeft,
    MoveRight,
    Fire,
    Hold,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GameInput {
    pub control: ShipControl,
    pub exit: bool,
}

impl GameInput {
    pub fn none() -> Self {
        Self {
            control: ShipControl::Hold,
            exit: false,
        }
    }

    pub fn action(control: ShipControl) -> Self {
        Self { control, exit: false }
    }

    pub fn exit() -> Self {
        Self {
            control: ShipControl::Hold,
            exit: true,
        }
    }
}

/// The invaders game model: one ship at the bottom, a descending swarm of enemies and the ship's projectiles.
///
/// Fully deterministic. The game is won when all enemies are destroyed and lost as soon as an enemy
/// touches the ship or reaches the ship's height.
#[derive(Clone, Debug)]
pub struct InvadersMechanics {
    pub ship: Ship,
    pub swarm: Swarm,
    pub projectiles: Vec<Projectile>,
    pub score: u32,
    pub result: Option<GameResult>,
}

impl InvadersMechanics {
    pub fn new() -> Self {
        Self {
            ship: Ship::initial(),
            swarm: Swarm::initial(),
            projectiles: Vec::with_capacity(MAX_PROJECTILES),
            score: 0,
            result: None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn finished(&self) -> bool {
        self.result.is_some()
    }

    /// Moves one time step forward; returns the reward earned during this step
    pub fn time_step(&mut self, control: ShipControl) -> f32 {
        let mut reward = STEP_REWARD;

        match control {
            ShipControl::MoveLeft => self.ship.move_by(-SHIP_SPEED),
            ShipControl::MoveRight => self.ship.move_by(SHIP_SPEED),
            ShipControl::Fire => {
                // dropped silently at the limit
                if self.projectiles.len() < MAX_PROJECTILES {
                    self.projectiles.push(self.ship.fire());
                }
            }
            ShipControl::Hold => (),
        }

        for projectile in self.projectiles.iter_mut() {
            projectile.proceed();
        }
        self.projectiles.retain(|p| !p.out_of_sight());

        self.swarm.proceed();

        let destroyed = self.resolve_hits();
        if destroyed > 0 {
            log::trace!("{} enemies destroyed", destroyed);
            reward += KILL_REWARD * destroyed as f32;
            self.score += KILL_SCORE * destroyed as u32;
        }

        if let Some(result) = self.check_game_end_situation() {
            self.result = Some(result);
            reward = match result {
                GameResult::Won => WIN_REWARD,
                GameResult::Lost => LOSS_REWARD,
            };
        }

        reward
    }

    /// Removes all projectiles and enemies involved in a hit; returns the number of destroyed enemies.
    /// All hits are determined before anything is removed.
    fn resolve_hits(&mut self) -> usize {
        let mut projectile_hit = vec![false; self.projectiles.len()];
        let mut enemy_hit = vec![false; self.swarm.enemies.len()];

        for (p_idx, projectile) in self.projectiles.iter().enumerate() {
            for (e_idx, enemy) in self.swarm.enemies.iter().enumerate() {
                if projectile.shape.overlaps(&enemy.shape) {
                    projectile_hit[p_idx] = true;
                    enemy_hit[e_idx] = true;
                }
            }
        }

        let destroyed = enemy_hit.iter().filter(|&&hit| hit).count();
        if destroyed > 0 {
            self.projectiles = keep_unhit(mem::take(&mut self.projectiles), &projectile_hit);
            self.swarm.enemies = keep_unhit(mem::take(&mut self.swarm.enemies), &enemy_hit);
        }
        destroyed
    }

    fn check_game_end_situation(&self) -> Option<GameResult> {
        let ship = &self.ship.shape;
        if self.swarm.enemies.iter().any(|e| e.shape.overlaps(ship)) {
            Some(GameResult::Lost)
        } else if self.swarm.enemies.iter().any(|e| e.shape.bottom() >= ship.top) {
            Some(GameResult::Lost)
        } else if self.swarm.is_empty() {
            Some(GameResult::Won)
        } else {
            None
        }
    }

    /// Fixed length encoding of the game state:
    /// `[ship_x] ++ (x, y) per enemy ++ (x, y) per projectile`.
    ///
    /// Positions are top-left corners, normalized by the play field size.
    /// Enemies beyond [MAX_ENEMIES] and projectiles beyond [MAX_PROJECTILES] are cut off;
    /// free slots hold [OBSERVATION_SENTINEL].
    pub fn observation(&self) -> Observation {
        let ship_x = self.ship.shape.left as f32 / MODEL_GRID_LEN_X as f32;
        let values = std::iter::once(ship_x)
            .chain(encode_positions(self.swarm.enemies.iter().map(|e| &e.shape), MAX_ENEMIES))
            .chain(encode_positions(self.projectiles.iter().map(|p| &p.shape), MAX_PROJECTILES));

        let mut observation = [OBSERVATION_SENTINEL; OBSERVATION_LEN];
        for (slot, value) in observation.iter_mut().zip(values) {
            *slot = value;
        }
        observation
    }
}

impl Default for InvadersMechanics {
    fn default() -> Self {
        Self::new()
    }
}

fn keep_unhit<T>(elements: Vec<T>, hit: &[bool]) -> Vec<T> {
    debug_assert_eq!(elements.len(), hit.len());
    elements
        .into_iter()
        .zip(hit)
        .filter_map(|(e, &hit)| (!hit).then_some(e))
        .collect()
}

fn encode_positions<'a>(
    shapes: impl Iterator<Item = &'a AaBB> + 'a,
    slots: usize,
) -> impl Iterator<Item = f32> + 'a {
    shapes
        .map(|s| [s.left as f32 / MODEL_GRID_LEN_X as f32, s.top as f32 / MODEL_GRID_LEN_Y as f32])
        .pad_using(slots, |_| [OBSERVATION_SENTINEL; 2])
        .take(slots)
        .flatten()
}

impl DebugVisualizer for InvadersMechanics {
    fn one_line_info(&self) -> String {
        format!(
            "Invaders: ship_x={}, enemies={}, projectiles={}, swarm_velocity={}, score={}, result={:?}",
            self.ship.shape.left,
            self.swarm.enemies.len(),
            self.projectiles.len(),
            self.swarm.velocity_x,
            self.score,
            self.result
        )
    }

    /// One console cell covers 10x20 play field pixels
    fn render_to_console(&self) -> Screen {
        fn fill(screen: &mut Screen, shape: &AaBB, pixel: pixel::Pixel) {
            let right = (shape.right() - 1).max(shape.left);
            let bottom = (shape.bottom() - 1).max(shape.top);
            screen.fill_rect(
                shape.left / CONSOLE_CELL_LEN_X,
                shape.top / CONSOLE_CELL_LEN_Y,
                right / CONSOLE_CELL_LEN_X,
                bottom / CONSOLE_CELL_LEN_Y,
                pixel,
            );
        }

        let mut screen = Screen::new_empty(CONSOLE_SCREEN_LEN_X, CONSOLE_SCREEN_LEN_Y);
        for enemy in &self.swarm.enemies {
            fill(&mut screen, &enemy.shape, pixel::pxl('#'));
        }
        for projectile in &self.projectiles {
            fill(&mut screen, &projectile.shape, pixel::pxl('|'));
        }
        fill(&mut screen, &self.ship.shape, pixel::pxl('^'));
        screen
    }
}

use crate::environment::invaders::algebra_2d::AaBB;
use crate::environment::invaders::mechanics::{MODEL_GRID_LEN_X, MODEL_GRID_LEN_Y};

const SHIP_LEN_X: i32 = 60;
const SHIP_LEN_Y: i32 = 20;
const SHIP_BOTTOM_Y: i32 = MODEL_GRID_LEN_Y - 20;
pub const SHIP_SPEED: i32 = 15;

const ENEMY_LEN_X: i32 = 40;
const ENEMY_LEN_Y: i32 = 30;
const SWARM_SETUP_ROWS: i32 = 5;
const SWARM_SETUP_COLUMNS: i32 = 10;
const SWARM_SETUP_SPACING_X: i32 = 60;
const SWARM_SETUP_SPACING_Y: i32 = 40;
const SWARM_SETUP_OFFSET: i32 = 50;
pub const SWARM_INITIAL_VELOCITY_X: i32 = 2;
pub const SWARM_DROP_Y: i32 = 15;

const PROJECTILE_LEN_X: i32 = 5;
const PROJECTILE_LEN_Y: i32 = 15;
pub const PROJECTILE_VELOCITY_Y: i32 = -10;

#[derive(Clone, Debug, PartialEq)]
pub struct Ship {
    pub shape: AaBB,
}

impl Ship {
    /// Horizontally centered near the bottom
    pub fn initial() -> Self {
        Self {
            shape: AaBB::new(
                MODEL_GRID_LEN_X / 2 - SHIP_LEN_X / 2,
                SHIP_BOTTOM_Y - SHIP_LEN_Y,
                SHIP_LEN_X,
                SHIP_LEN_Y,
            ),
        }
    }

    /// Moves horizontally, staying inside the play field
    pub fn move_by(&mut self, dx: i32) {
        let left = (self.shape.left + dx).clamp(0, MODEL_GRID_LEN_X - self.shape.width);
        self.shape.left = left;
    }

    /// A new projectile leaving the ship's top center
    pub fn fire(&self) -> Projectile {
        let left = self.shape.center_x() - PROJECTILE_LEN_X / 2;
        Projectile {
            shape: AaBB::new(left, self.shape.top - PROJECTILE_LEN_Y, PROJECTILE_LEN_X, PROJECTILE_LEN_Y),
            velocity_y: PROJECTILE_VELOCITY_Y,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub shape: AaBB,
}

impl Enemy {
    pub fn at(left: i32, top: i32) -> Self {
        Self {
            shape: AaBB::new(left, top, ENEMY_LEN_X, ENEMY_LEN_Y),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub shape: AaBB,
    pub velocity_y: i32,
}

impl Projectile {
    pub fn proceed(&mut self) {
        self.shape = self.shape.translate(0, self.velocity_y);
    }

    /// Lower edge above the play field
    pub fn out_of_sight(&self) -> bool {
        self.shape.bottom() < 0
    }
}

/// Enemies moving as one block with a shared horizontal velocity.
///
/// Member order is creation order (row by row) and is kept when members are removed.
#[derive(Clone, Debug, PartialEq)]
pub struct Swarm {
    pub enemies: Vec<Enemy>,
    pub velocity_x: i32,
}

impl Swarm {
    pub fn initial() -> Self {
        let mut enemies = Vec::with_capacity((SWARM_SETUP_ROWS * SWARM_SETUP_COLUMNS) as usize);
        for row in 0..SWARM_SETUP_ROWS {
            for column in 0..SWARM_SETUP_COLUMNS {
                enemies.push(Enemy::at(
                    column * SWARM_SETUP_SPACING_X + SWARM_SETUP_OFFSET,
                    row * SWARM_SETUP_SPACING_Y + SWARM_SETUP_OFFSET,
                ));
            }
        }
        Self {
            enemies,
            velocity_x: SWARM_INITIAL_VELOCITY_X,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// -1 = moving left, 1 = moving right
    pub fn direction(&self) -> i32 {
        self.velocity_x.signum()
    }

    /// Moves all members horizontally.
    /// When afterwards any member crossed a side wall, the direction flips and the whole swarm drops down one step.
    pub fn proceed(&mut self) {
        for enemy in self.enemies.iter_mut() {
            enemy.shape = enemy.shape.translate(self.velocity_x, 0);
        }

        let wall_reached = self
            .enemies
            .iter()
            .any(|e| e.shape.right() > MODEL_GRID_LEN_X || e.shape.left < 0);

        if wall_reached {
            self.velocity_x = -self.velocity_x;
            for enemy in self.enemies.iter_mut() {
                enemy.shape = enemy.shape.translate(0, SWARM_DROP_Y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_initial_layout() {
        let ship = Ship::initial();
        assert_eq!(ship.shape, AaBB::new(370, 560, 60, 20));

        let swarm = Swarm::initial();
        assert_eq!(swarm.enemies.len(), 50);
        assert_eq!(swarm.velocity_x, 2);
        assert_eq!(swarm.enemies[0].shape, AaBB::new(50, 50, 40, 30));
        assert_eq!(swarm.enemies[9].shape, AaBB::new(590, 50, 40, 30));
        assert_eq!(swarm.enemies[10].shape, AaBB::new(50, 90, 40, 30));
        assert_eq!(swarm.enemies[49].shape, AaBB::new(590, 210, 40, 30));
    }

    #[rstest]
    #[case(-SHIP_SPEED, 355)]
    #[case(SHIP_SPEED, 385)]
    #[case(-1000, 0)]
    #[case(1000, 740)]
    fn test_ship_moves_within_field(#[case] dx: i32, #[case] expected_left: i32) {
        let mut ship = Ship::initial();
        ship.move_by(dx);
        assert_eq!(ship.shape.left, expected_left);
    }

    #[test]
    fn test_fire_from_top_center() {
        let projectile = Ship::initial().fire();
        assert_eq!(projectile.shape, AaBB::new(398, 545, 5, 15));
        assert_eq!(projectile.velocity_y, -10);
    }

    #[test]
    fn test_projectile_leaves_field() {
        let mut projectile = Projectile {
            shape: AaBB::new(100, -5, 5, 15),
            velocity_y: PROJECTILE_VELOCITY_Y,
        };
        assert!(!projectile.out_of_sight());
        projectile.proceed();
        assert_eq!(projectile.shape.bottom(), 0);
        assert!(!projectile.out_of_sight());
        projectile.proceed();
        assert!(projectile.out_of_sight());
    }

    #[test]
    fn test_swarm_flips_once_per_step() {
        let mut swarm = Swarm {
            enemies: vec![Enemy::at(700, 100), Enemy::at(760, 100), Enemy::at(759, 140)],
            velocity_x: 2,
        };
        swarm.proceed();
        assert_eq!(swarm.velocity_x, -2);
        assert_eq!(swarm.direction(), -1);
        let tops = swarm.enemies.iter().map(|e| e.shape.top).collect::<Vec<_>>();
        assert_eq!(tops, vec![115, 115, 155]);
        let lefts = swarm.enemies.iter().map(|e| e.shape.left).collect::<Vec<_>>();
        assert_eq!(lefts, vec![702, 762, 761]);

        swarm.proceed();
        assert_eq!(swarm.velocity_x, -2);
        assert_eq!(swarm.enemies[0].shape, AaBB::new(700, 115, 40, 30));
    }

    #[test]
    fn test_swarm_flips_at_left_wall() {
        let mut swarm = Swarm {
            enemies: vec![Enemy::at(1, 300)],
            velocity_x: -2,
        };
        swarm.proceed();
        assert_eq!(swarm.enemies[0].shape, AaBB::new(-1, 315, 40, 30));
        assert_eq!(swarm.direction(), 1);
    }

    #[test]
    fn test_swarm_touching_wall_does_not_flip() {
        let mut swarm = Swarm {
            enemies: vec![Enemy::at(758, 100)],
            velocity_x: 2,
        };
        swarm.proceed();
        assert_eq!(swarm.enemies[0].shape.right(), 800);
        assert_eq!(swarm.velocity_x, 2);
        assert_eq!(swarm.enemies[0].shape.top, 100);
    }
}

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use console_engine::{ConsoleEngine, KeyCode};
use ql::prelude::DebugVisualizer;

use crate::environment::invaders::drawer::InvadersDrawer;
use crate::environment::invaders::mechanics::{
    GameInput, InvadersMechanics, ShipControl, CONSOLE_SCREEN_LEN_X, CONSOLE_SCREEN_LEN_Y,
};

const TARGET_FPS: u32 = 60;
const FPS_MEASURE_INTERVAL: Duration = Duration::from_secs(1);

/// Terminal presentation; the frame rate cap lives here and nowhere else
pub struct ConsoleDrawer {
    engine: ConsoleEngine,
    fps_meter: FpsMeter,
}

impl ConsoleDrawer {
    /// Fails when the terminal is not usable (e.g. too small or not interactive)
    pub fn new() -> Result<Self> {
        // one extra line for the status
        let engine = ConsoleEngine::init(CONSOLE_SCREEN_LEN_X, CONSOLE_SCREEN_LEN_Y + 1, TARGET_FPS)
            .context("failed to initialize console")?;
        Ok(Self {
            engine,
            fps_meter: FpsMeter::new(Instant::now()),
        })
    }
}

impl InvadersDrawer for ConsoleDrawer {
    fn draw(&mut self, mechanics: &InvadersMechanics) {
        self.engine.wait_frame();
        let fps = self.fps_meter.frame(Instant::now());

        self.engine.clear_screen();
        self.engine.print_screen(0, 0, &mechanics.render_to_console());
        self.engine.print(0, CONSOLE_SCREEN_LEN_Y as i32, &status_line(mechanics.score, fps));
        self.engine.draw();
    }

    fn read_player_input(&self) -> GameInput {
        if self.engine.is_key_pressed(KeyCode::Esc) {
            return GameInput::exit();
        }

        let control = if self.engine.is_key_held(KeyCode::Char(' ')) {
            ShipControl::Fire
        } else if self.engine.is_key_held(KeyCode::Left) {
            ShipControl::MoveLeft
        } else if self.engine.is_key_held(KeyCode::Right) {
            ShipControl::MoveRight
        } else {
            ShipControl::Hold
        };
        GameInput::action(control)
    }
}

fn status_line(score: u32, fps: u32) -> String {
    format!("Score: {}   FPS: {}   [←/→ move, space fire, esc quit]", score, fps)
}

/// Frames per second, measured over the last completed interval
struct FpsMeter {
    interval_start: Instant,
    frames: u32,
    fps: u32,
}

impl FpsMeter {
    fn new(now: Instant) -> Self {
        Self {
            interval_start: now,
            frames: 0,
            fps: 0,
        }
    }

    /// Counts one frame; returns the current rate
    fn frame(&mut self, now: Instant) -> u32 {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed >= FPS_MEASURE_INTERVAL {
            self.fps = (self.frames as f64 / elapsed.as_secs_f64()).round() as u32;
            self.frames = 0;
            self.interval_start = now;
        }
        self.fps
    }
}

use serde::{Deserialize, Serialize};

use crate::*;

/// Shape of procedurally generated levels.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Smallest side of the square grid.
    pub min_size: Coord,
    /// Largest side of the square grid, inclusive.
    pub max_size: Coord,
    /// Upper bound of random wall drops, at least one is always made.
    pub max_walls: u8,
    /// Fraction of the grid a random walk has to cover before the level is accepted.
    pub coverage: f32,
    pub star_count: u8,
    /// Levels rejected before giving up.
    pub max_attempts: u32,
}

impl GeneratorConfig {
    pub fn new(min_size: Coord, max_size: Coord, max_walls: u8) -> Self {
        let min_size = min_size.clamp(1, Coord::MAX);
        let max_size = max_size.clamp(min_size, Coord::MAX);
        Self {
            min_size,
            max_size,
            max_walls: max_walls.max(1),
            ..Self::default()
        }
    }

    /// Smallest peak value a walk over `total_cells` cells must reach.
    pub fn required_peak(&self, total_cells: CellCount) -> Value {
        (f32::from(total_cells) * self.coverage).ceil() as Value
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_size: 6,
            max_size: 8,
            max_walls: 6,
            coverage: 0.5,
            star_count: 3,
            max_attempts: 10_000,
        }
    }
}

/// Timing hints, all in milliseconds.
///
/// The core never sleeps, these only feed [`Game::pacing_ms`] and the [`Ticker`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    pub frame_ms: u32,
    /// Inactivity after which the ticker reports itself paused.
    pub pause_after_ms: u32,
    /// A reset rewind starts at `reset_base_ms - value`.
    pub reset_base_ms: u32,
    pub rewind_span_ms: f32,
    pub rewind_floor_ms: f32,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            frame_ms: 20,
            pause_after_ms: 1000,
            reset_base_ms: 80,
            rewind_span_ms: 30.0,
            rewind_floor_ms: 10.0,
        }
    }
}

impl Pacing {
    /// Delay before the next rewind step, growing as `value` approaches the start.
    pub fn rewind_ms(&self, value: Value, max_value: Value) -> u32 {
        if max_value <= 0 {
            return self.rewind_floor_ms as u32;
        }
        let progress = value as f32 / max_value as f32;
        (self.rewind_span_ms * (1.0 - progress) + self.rewind_floor_ms).max(0.0) as u32
    }

    pub fn reset_ms(&self, value: Value) -> u32 {
        u32::try_from(i64::from(self.reset_base_ms) - i64::from(value)).unwrap_or(0)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub generator: GeneratorConfig,
    pub pacing: Pacing,
    pub drag: DragMapper,
}

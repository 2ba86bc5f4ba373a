use serde::{Deserialize, Serialize};

use crate::*;

/// Translates a continuous pointer offset into discrete moves plus a cosmetic stretch of the player square.
///
/// The delta is measured from the center of the player's cell in cell units.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragMapper {
    /// A move triggers once the delta passes `0.5 * snap_factor` cells.
    pub snap_factor: f32,
    pub stretch_factor: f32,
    pub max_stretch: f32,
}

impl Default for DragMapper {
    fn default() -> Self {
        Self {
            snap_factor: 1.4,
            stretch_factor: 1.1,
            max_stretch: 0.75,
        }
    }
}

/// Player square in cell units, edges already moved by the stretch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerShape {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl PlayerShape {
    pub fn at((x, y): Coord2) -> Self {
        let (x, y) = (f32::from(x), f32::from(y));
        Self {
            left: x,
            top: y,
            right: x + 1.0,
            bottom: y + 1.0,
        }
    }

    pub fn stretched(mut self, (dx, dy): (f32, f32)) -> Self {
        if dx > 0.0 {
            self.right += dx;
        } else if dx < 0.0 {
            self.left += dx;
        }
        if dy > 0.0 {
            self.bottom += dy;
        } else if dy < 0.0 {
            self.top += dy;
        }
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Drag {
    /// Moves the drag triggered, in the order they were applied.
    pub moves: Vec<Direction>,
    /// Axis-locked stretch that was applied to the shape.
    pub stretch: (f32, f32),
    pub shape: PlayerShape,
}

impl DragMapper {
    pub fn threshold(&self) -> f32 {
        0.5 * self.snap_factor
    }

    /// Cancels the components of `delta` that point into a blocked direction.
    pub fn clamp(blocked: Blocked, (mut dx, mut dy): (f32, f32)) -> (f32, f32) {
        if blocked.contains(Blocked::LEFT) {
            dx = dx.max(0.0);
        }
        if blocked.contains(Blocked::UP) {
            dy = dy.max(0.0);
        }
        if blocked.contains(Blocked::RIGHT) {
            dx = dx.min(0.0);
        }
        if blocked.contains(Blocked::DOWN) {
            dy = dy.min(0.0);
        }
        (dx, dy)
    }

    /// Non-linear stretch locked to the dominant axis. `angle` is the direction of the raw pointer offset.
    pub fn stretch(&self, (dx, dy): (f32, f32), angle: f32) -> (f32, f32) {
        let bend = |d: f32, weight: f32| {
            if d == 0.0 {
                0.0
            } else {
                (d * d * self.stretch_factor * weight.abs())
                    .min(self.max_stretch)
                    .copysign(d)
            }
        };
        let sx = bend(dx, angle.cos());
        let sy = bend(dy, angle.sin());

        if sx.abs() > sy.abs() {
            (sx, 0.0)
        } else {
            (0.0, sy)
        }
    }

    pub fn apply(&self, map: &mut Map, (dx, dy): (f32, f32)) -> Drag {
        let angle = dy.atan2(dx);
        let (dx, dy) = Self::clamp(map.blocked(), (dx, dy));
        let threshold = self.threshold();

        let mut moves = Vec::new();
        let horizontal = if dx > threshold {
            Some(Direction::Right)
        } else if dx < -threshold {
            Some(Direction::Left)
        } else {
            None
        };
        let vertical = if dy > threshold {
            Some(Direction::Down)
        } else if dy < -threshold {
            Some(Direction::Up)
        } else {
            None
        };
        for direction in horizontal.into_iter().chain(vertical) {
            if map.move_in(direction).is_accepted() {
                moves.push(direction);
            }
        }
        if !moves.is_empty() {
            log::trace!("Drag ({dx:.2}, {dy:.2}) moved {moves:?}");
        }

        let stretch = self.stretch((dx, dy), angle);
        Drag {
            moves,
            stretch,
            shape: PlayerShape::at(map.player()).stretched(stretch),
        }
    }
}

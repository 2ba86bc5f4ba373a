use serde::{Deserialize, Serialize};

use crate::*;

/// Canonical state of a single grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Wall,
    Empty { value: Value },
    Star { value: Value, order: StarRank },
}

impl Cell {
    pub const fn empty() -> Self {
        Self::Empty { value: UNVISITED }
    }

    pub const fn star(order: StarRank) -> Self {
        Self::Star {
            value: UNVISITED,
            order,
        }
    }

    pub const fn is_wall(self) -> bool {
        matches!(self, Self::Wall)
    }

    /// Progression value, `None` for walls.
    pub const fn value(self) -> Option<Value> {
        match self {
            Self::Wall => None,
            Self::Empty { value } | Self::Star { value, .. } => Some(value),
        }
    }

    pub const fn is_unvisited(self) -> bool {
        matches!(self.value(), Some(UNVISITED))
    }

    pub const fn is_visited(self) -> bool {
        match self.value() {
            Some(value) => value > UNVISITED,
            None => false,
        }
    }

    pub const fn star_order(self) -> Option<StarRank> {
        match self {
            Self::Star { order, .. } => Some(order),
            _ => None,
        }
    }

    /// Overwrites the progression value; walls are left alone.
    pub fn set_value(&mut self, new_value: Value) {
        match self {
            Self::Wall => {}
            Self::Empty { value } | Self::Star { value, .. } => *value = new_value,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::empty()
    }
}

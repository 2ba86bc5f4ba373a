use serde::{Deserialize, Serialize};

use crate::*;

/// Ranks earned so far, strictly increasing.
///
/// Stars are earned and un-earned like a stack: a rank can only be pushed on top of a lower one and only the most
/// recent rank can be taken back.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarProgress {
    earned: Vec<StarRank>,
}

impl StarProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last earned rank, 0 when nothing was earned yet.
    pub fn last_rank(&self) -> StarRank {
        self.earned.last().copied().unwrap_or(0)
    }

    pub fn earned(&self, order: StarRank) -> bool {
        self.earned.contains(&order)
    }

    pub fn earn(&mut self, order: StarRank) -> bool {
        if self.last_rank() < order {
            self.earned.push(order);
            true
        } else {
            false
        }
    }

    pub fn unearn(&mut self, order: StarRank) -> bool {
        if order != 0 && self.last_rank() == order {
            self.earned.pop();
            true
        } else {
            false
        }
    }

    pub fn as_slice(&self) -> &[StarRank] {
        &self.earned
    }

    pub fn is_empty(&self) -> bool {
        self.earned.is_empty()
    }

    pub fn len(&self) -> usize {
        self.earned.len()
    }
}

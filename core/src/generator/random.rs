use rand::prelude::*;
use rand::rngs::SmallRng;

use super::*;

/// Square grid of empty cells with a handful of random wall drops, the last drop becomes the player start.
#[derive(Clone, Debug)]
pub struct RandomLevelGenerator {
    rng: SmallRng,
}

impl RandomLevelGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl LevelGenerator for RandomLevelGenerator {
    fn generate(&mut self, config: &GeneratorConfig) -> Layout {
        let min_size = config.min_size.max(1);
        let side = self.rng.random_range(min_size..=config.max_size.max(min_size));
        let drops = self.rng.random_range(1..=config.max_walls.max(1));

        let mut layout = Layout::filled(side);
        let mut last = (0, 0);
        for _ in 0..drops {
            last = (
                self.rng.random_range(0..side),
                self.rng.random_range(0..side),
            );
            layout
                .set(last, Symbol::Wall)
                .expect("drop should be inside the square");
        }
        layout
            .set(last, Symbol::Player)
            .expect("start should be inside the square");

        log::trace!("Generated {side}x{side} layout with {drops} wall drops, start at {last:?}");
        layout
    }
}

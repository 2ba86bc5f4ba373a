use crate::*;
pub use random::*;

mod random;

/// Source of raw level layouts, explored and finished by the [`Game`].
pub trait LevelGenerator {
    fn generate(&mut self, config: &GeneratorConfig) -> Layout;
}

/// A fixed layout is its own generator, handy for hand-authored levels.
impl LevelGenerator for Layout {
    fn generate(&mut self, _config: &GeneratorConfig) -> Layout {
        self.clone()
    }
}

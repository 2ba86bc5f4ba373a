use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Generating -> Generating (walk continues, or the level was rejected and replaced)
/// - Generating -> Rewinding (dead end on a large enough level)
/// - Rewinding -> Ready
/// - Ready -> Rewinding (reset)
/// - Ready -> Finished
/// - Finished -> Generating (outro done)
///
/// Any phase can jump to Generating on [`Game::new_game`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Random walk exploring a fresh layout
    Generating,
    /// Retracing back to the start
    Rewinding,
    /// Waiting for player input
    Ready,
    /// Player reached the maximum value, the path is decaying
    Finished,
}

impl Phase {
    /// Whether the phase advances on its own, without player input.
    pub const fn is_animating(self) -> bool {
        !matches!(self, Self::Ready)
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::Generating
    }
}

/// Result of a single [`Game::step`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing to do in the current phase.
    Idle,
    /// Random walk took a step.
    Explored,
    /// Walk got stuck on a large enough level, stars placed and rewind started.
    DeadEnd,
    /// Walk got stuck on a level that was too small, a new layout was loaded.
    Regenerated,
    /// Rewind took a step back.
    Rewound,
    /// Rewind reached the start, input is accepted now.
    Ready,
    /// Outro eroded the path by one step.
    Decayed,
    /// Outro finished and a new level is being generated.
    NewLevel,
}

/// Owns the current [`Map`] and drives it through generation, rewind, play and outro.
#[derive(Clone, Debug)]
pub struct Game<G = RandomLevelGenerator> {
    settings: Settings,
    generator: G,
    rng: SmallRng,
    map: Map,
    phase: Phase,
    pacing_ms: u32,
    elastic_rewind: bool,
    attempts: u32,
    level: u32,
}

impl Game<RandomLevelGenerator> {
    pub fn new(settings: Settings, seed: u64) -> Result<Self> {
        Self::with_generator(settings, RandomLevelGenerator::new(seed), seed)
    }
}

impl<G: LevelGenerator> Game<G> {
    pub fn with_generator(settings: Settings, mut generator: G, seed: u64) -> Result<Self> {
        let map = Map::from_layout(&generator.generate(&settings.generator))?;
        Ok(Self {
            settings,
            generator,
            rng: SmallRng::seed_from_u64(seed.rotate_left(32)),
            map,
            phase: Phase::Generating,
            pacing_ms: 0,
            elastic_rewind: false,
            attempts: 1,
            level: 1,
        })
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Number of levels started, rejected layouts are not counted.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Delay the caller should wait before the next [`Game::step`]. Never enforced by the game itself.
    pub fn pacing_ms(&self) -> u32 {
        self.pacing_ms
    }

    /// Advances the automatic part of the game by one micro-step.
    pub fn step(&mut self) -> Result<StepOutcome> {
        match self.phase {
            Phase::Generating => self.explore(),
            Phase::Rewinding => Ok(self.rewind()),
            Phase::Ready => Ok(StepOutcome::Idle),
            Phase::Finished => self.decay(),
        }
    }

    /// Steps until the level is playable, this is the whole intro without pacing.
    pub fn run_until_ready(&mut self) -> Result<()> {
        while self.phase != Phase::Ready {
            if self.phase == Phase::Finished {
                self.new_game()?;
            }
            self.step()?;
        }
        Ok(())
    }

    /// Throws the current level away and starts generating a new one.
    pub fn new_game(&mut self) -> Result<()> {
        self.attempts = 0;
        self.level += 1;
        self.load_next()
    }

    /// Rewinds the player back to the start, slowing down elastically on the way.
    ///
    /// Only possible while the level is being played.
    pub fn reset(&mut self) -> bool {
        if self.phase != Phase::Ready {
            return false;
        }
        self.pacing_ms = self.settings.pacing.reset_ms(self.map.player_value());
        self.elastic_rewind = self.pacing_ms > 0;
        self.enter(Phase::Rewinding);
        true
    }

    pub fn move_in(&mut self, direction: Direction) -> MoveOutcome {
        if self.phase != Phase::Ready {
            return MoveOutcome::Rejected;
        }
        let outcome = self.map.move_in(direction);
        self.check_finished();
        outcome
    }

    /// Manual single step towards the start.
    pub fn move_backwards(&mut self) -> MoveOutcome {
        if self.phase != Phase::Ready {
            return MoveOutcome::Rejected;
        }
        self.map.move_backwards()
    }

    /// Feeds a pointer offset through the drag mapper, moves are only applied while ready.
    pub fn drag(&mut self, delta: (f32, f32)) -> Drag {
        if self.phase != Phase::Ready {
            let shape = PlayerShape::at(self.map.player());
            return Drag {
                shape,
                ..Default::default()
            };
        }
        let drag = self.settings.drag.apply(&mut self.map, delta);
        self.check_finished();
        drag
    }

    fn explore(&mut self) -> Result<StepOutcome> {
        if self.map.move_randomly(&mut self.rng).is_accepted() {
            self.pacing_ms = 0;
            return Ok(StepOutcome::Explored);
        }

        self.map.seal_unvisited();
        let peak = self.map.player_value();
        let required = self.settings.generator.required_peak(self.map.total_cells());
        if peak < required {
            log::debug!("Level covers {peak} of required {required} cells, regenerating");
            self.retry()?;
            return Ok(StepOutcome::Regenerated);
        }

        let star_count = usize::from(self.settings.generator.star_count);
        if self.map.has_stars() {
            log::debug!("Layout brings its own stars, none placed");
        } else if !self.map.place_stars(&mut self.rng, star_count) {
            log::warn!("Not enough cells to host {star_count} stars, regenerating");
            self.retry()?;
            return Ok(StepOutcome::Regenerated);
        }

        self.map.set_max_value(peak);
        log::debug!(
            "Accepted level {} after {} attempts, max value {}",
            self.level,
            self.attempts,
            peak
        );
        self.pacing_ms = 0;
        self.elastic_rewind = false;
        self.enter(Phase::Rewinding);
        Ok(StepOutcome::DeadEnd)
    }

    fn rewind(&mut self) -> StepOutcome {
        if !self.map.move_backwards().is_accepted() {
            self.pacing_ms = 0;
            self.elastic_rewind = false;
            self.enter(Phase::Ready);
            return StepOutcome::Ready;
        }

        if self.elastic_rewind {
            self.pacing_ms = self
                .settings
                .pacing
                .rewind_ms(self.map.player_value(), self.map.max_value());
        }
        StepOutcome::Rewound
    }

    fn decay(&mut self) -> Result<StepOutcome> {
        self.pacing_ms = 0;
        if self.map.decay() {
            Ok(StepOutcome::Decayed)
        } else {
            self.new_game()?;
            Ok(StepOutcome::NewLevel)
        }
    }

    fn retry(&mut self) -> Result<()> {
        if self.attempts >= self.settings.generator.max_attempts {
            return Err(GameError::GenerationExhausted(self.attempts));
        }
        self.load_next()
    }

    fn load_next(&mut self) -> Result<()> {
        let layout = self.generator.generate(&self.settings.generator);
        self.map = Map::from_layout(&layout)?;
        self.attempts += 1;
        self.pacing_ms = 0;
        self.elastic_rewind = false;
        self.enter(Phase::Generating);
        Ok(())
    }

    fn check_finished(&mut self) {
        if self.map.is_finished() {
            self.enter(Phase::Finished);
        }
    }

    fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            log::debug!("Phase {:?} -> {:?}", self.phase, phase);
        }
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> Layout {
        // only one way to walk, so the level is deterministic
        Layout::from_json(r#"[["x", 0, 0, 0], [-1, -1, -1, 0], [0, 0, 0, 0]]"#).unwrap()
    }

    fn fixed_game(layout: Layout) -> Game<Layout> {
        Game::with_generator(Settings::default(), layout, 1).unwrap()
    }

    #[test]
    fn corridor_generates_then_rewinds_to_ready() {
        let mut game = fixed_game(corridor());
        assert_eq!(game.phase(), Phase::Generating);

        let mut outcomes = Vec::new();
        while game.phase() != Phase::Ready {
            outcomes.push(game.step().unwrap());
        }

        assert_eq!(outcomes.iter().filter(|&&o| o == StepOutcome::Explored).count(), 8);
        assert_eq!(outcomes.iter().filter(|&&o| o == StepOutcome::DeadEnd).count(), 1);
        assert_eq!(outcomes.iter().filter(|&&o| o == StepOutcome::Rewound).count(), 8);
        assert_eq!(outcomes.last(), Some(&StepOutcome::Ready));

        let map = game.map();
        assert_eq!(map.player(), (0, 0));
        assert_eq!(map.max_value(), 9);
        assert!(map.stars().is_empty());
        assert_eq!(map.cells().filter(|(_, c)| c.star_order().is_some()).count(), 3);
        assert_eq!(game.pacing_ms(), 0);
    }

    #[test]
    fn enclosed_start_exhausts_attempts() {
        let layout = Layout::from_json(r#"[["x", -1], [-1, 0]]"#).unwrap();
        let mut settings = Settings::default();
        settings.generator.max_attempts = 5;
        let mut game = Game::with_generator(settings, layout, 0).unwrap();

        let mut regenerated = 0;
        let error = loop {
            match game.step() {
                Ok(StepOutcome::Regenerated) => regenerated += 1,
                Ok(other) => panic!("unexpected {other:?}"),
                Err(error) => break error,
            }
        };
        assert_eq!(regenerated, 4);
        assert_eq!(error, GameError::GenerationExhausted(5));
    }

    #[test]
    fn too_few_star_hosts_regenerates() {
        // a full walk of a 1x3 strip leaves only two cells with value > 1
        let layout = Layout::from_json(r#"[["x", 0, 0]]"#).unwrap();
        let mut game = fixed_game(layout);

        assert_eq!(game.step().unwrap(), StepOutcome::Explored);
        assert_eq!(game.step().unwrap(), StepOutcome::Explored);
        assert_eq!(game.step().unwrap(), StepOutcome::Regenerated);
        assert_eq!(game.phase(), Phase::Generating);
    }

    #[test]
    fn ranked_layout_keeps_its_own_stars() {
        // same strip, but the star is already there so no hosts are needed
        let layout = Layout::from_json(r#"[["x", 1, 0]]"#).unwrap();
        let mut game = fixed_game(layout);

        assert_eq!(game.step().unwrap(), StepOutcome::Explored);
        assert_eq!(game.step().unwrap(), StepOutcome::Explored);
        assert_eq!(game.step().unwrap(), StepOutcome::DeadEnd);
        game.run_until_ready().unwrap();

        let ranks: Vec<StarRank> = game
            .map()
            .cells()
            .filter_map(|(_, cell)| cell.star_order())
            .collect();
        assert_eq!(ranks, vec![1]);
        assert_eq!(game.map().max_value(), 3);
    }

    #[test]
    fn input_is_ignored_until_ready() {
        let mut game = fixed_game(corridor());

        assert_eq!(game.move_in(Direction::Right), MoveOutcome::Rejected);
        assert_eq!(game.move_backwards(), MoveOutcome::Rejected);
        assert!(game.drag((0.9, 0.0)).moves.is_empty());
        assert!(!game.reset());
        assert_eq!(game.map().player(), (0, 0));

        game.run_until_ready().unwrap();
        assert_eq!(game.move_in(Direction::Right), MoveOutcome::Forward);
    }

    #[test]
    fn reset_rewinds_elastically() {
        let mut game = fixed_game(corridor());
        game.run_until_ready().unwrap();
        for direction in [Direction::Right, Direction::Right, Direction::Right] {
            assert!(game.move_in(direction).is_accepted());
        }

        assert!(game.reset());
        assert_eq!(game.phase(), Phase::Rewinding);
        assert_eq!(game.pacing_ms(), 76);

        let mut delays = Vec::new();
        while game.step().unwrap() == StepOutcome::Rewound {
            delays.push(game.pacing_ms());
        }
        assert_eq!(delays.len(), 3);
        assert!(delays.windows(2).all(|pair| pair[0] < pair[1]));
        // value 1 of 9
        assert_eq!(delays[2], 36);
        assert_eq!(game.phase(), Phase::Ready);
        assert_eq!(game.map().player(), (0, 0));
        assert!(game.map().stars().is_empty());
    }

    #[test]
    fn finishing_decays_then_starts_new_level() {
        let mut game = fixed_game(corridor());
        game.run_until_ready().unwrap();

        let path = [
            Direction::Right,
            Direction::Right,
            Direction::Right,
            Direction::Down,
            Direction::Down,
            Direction::Left,
            Direction::Left,
        ];
        for direction in path {
            assert!(game.move_in(direction).is_accepted());
        }
        assert_eq!(game.phase(), Phase::Ready);
        assert_eq!(game.move_in(Direction::Left), MoveOutcome::Finished);
        assert_eq!(game.phase(), Phase::Finished);
        assert_eq!(game.map().last_star_rank(), 3);
        assert_eq!(game.move_in(Direction::Right), MoveOutcome::Rejected);

        let mut decayed = 0;
        loop {
            match game.step().unwrap() {
                StepOutcome::Decayed => decayed += 1,
                StepOutcome::NewLevel => break,
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(decayed, 7);
        assert_eq!(game.phase(), Phase::Generating);
        assert_eq!(game.level(), 2);
        assert_eq!(game.map().max_value(), 0);
    }

    #[test]
    fn random_levels_become_ready() {
        for seed in 0..16 {
            let mut game = Game::new(Settings::default(), seed).unwrap();
            game.run_until_ready().unwrap();

            let map = game.map();
            assert!(map.max_value() >= GeneratorConfig::default().required_peak(map.total_cells()));
            assert!(map.stars().is_empty());
            assert_eq!(map.player_value(), 1);
            assert_eq!(map.cells().filter(|(_, c)| c.star_order().is_some()).count(), 3);
            for (coords, cell) in map.cells() {
                if coords != map.player() && !cell.is_wall() {
                    assert!(cell.is_unvisited(), "seed {seed}: {coords:?} still visited");
                }
            }
        }
    }
}

use crate::*;

/// Fixed-cadence driver for a [`Game`].
///
/// The caller invokes [`Ticker::tick`] once per frame. Steps are spaced out by the game's pacing hint and the
/// ticker reports itself paused after a stretch of frames without input or animation, so the caller can stop its
/// timer until the next [`Ticker::poke`].
#[derive(Clone, Debug, PartialEq)]
pub struct Ticker {
    pacing: Pacing,
    move_timer: u32,
    pause_counter: u32,
}

impl Ticker {
    pub fn new(pacing: Pacing) -> Self {
        Self {
            pacing,
            move_timer: 0,
            pause_counter: 0,
        }
    }

    pub fn frame_ms(&self) -> u32 {
        self.pacing.frame_ms.max(1)
    }

    pub fn is_paused(&self) -> bool {
        self.pause_counter >= self.pacing.pause_after_ms
    }

    /// Signals activity, keeps or brings the ticker out of pause.
    pub fn poke(&mut self) {
        self.pause_counter = 0;
    }

    /// Runs one frame. Returns the outcome when the game was stepped during this frame.
    pub fn tick<G: LevelGenerator>(&mut self, game: &mut Game<G>) -> Result<Option<StepOutcome>> {
        if self.is_paused() {
            return Ok(None);
        }

        let mut stepped = None;
        if game.phase().is_animating() {
            if self.move_timer > 0 {
                self.move_timer -= 1;
            } else {
                stepped = Some(game.step()?);
                self.move_timer = game.pacing_ms() / self.frame_ms();
            }
            self.poke();
        }

        self.pause_counter = self.pause_counter.saturating_add(self.frame_ms());
        Ok(stepped)
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(Pacing::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_game() -> Game<Layout> {
        let layout = Layout::from_json(r#"[["x", 0, 0, 0, 0, 0, 0, 0]]"#).unwrap();
        let mut game = Game::with_generator(Settings::default(), layout, 9).unwrap();
        game.run_until_ready().unwrap();
        game
    }

    #[test]
    fn pauses_after_idle_frames() {
        let mut game = ready_game();
        let mut ticker = Ticker::default();

        for _ in 0..49 {
            assert_eq!(ticker.tick(&mut game).unwrap(), None);
        }
        assert!(!ticker.is_paused());
        ticker.tick(&mut game).unwrap();
        assert!(ticker.is_paused());

        ticker.poke();
        assert!(!ticker.is_paused());
    }

    #[test]
    fn waits_between_paced_steps() {
        let mut game = ready_game();
        game.move_in(Direction::Right);
        game.move_in(Direction::Right);
        assert!(game.reset());

        let mut ticker = Ticker::default();
        let mut frames = 0;
        let mut steps = Vec::new();
        while game.phase() != Phase::Ready {
            frames += 1;
            if let Some(outcome) = ticker.tick(&mut game).unwrap() {
                steps.push(outcome);
            }
            assert!(!ticker.is_paused());
        }

        assert_eq!(steps, vec![StepOutcome::Rewound, StepOutcome::Rewound, StepOutcome::Ready]);
        assert!(frames > steps.len());
    }
}

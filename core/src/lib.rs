//! Rules and level flow for a grid puzzle where every step changes the cell value by exactly one.
//!
//! A [`Map`] holds the grid, the player and the earned stars. A [`Game`] owns the map and drives it through the
//! generation walk, the intro rewind, play and the finishing outro, one [`Game::step`] at a time.

pub use cell::*;
pub use drag::*;
pub use error::*;
pub use game::*;
pub use generator::*;
pub use layout::*;
pub use map::*;
pub use settings::*;
pub use stars::*;
pub use ticker::*;
pub use types::*;

mod cell;
mod drag;
mod error;
mod game;
mod generator;
mod layout;
mod map;
mod settings;
mod stars;
mod ticker;
mod types;

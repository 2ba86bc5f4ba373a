use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Layout has no rows or no columns")]
    EmptyLayout,
    #[error("Layout row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Layout must contain exactly one player marker, found {0}")]
    PlayerCount(usize),
    #[error("Invalid layout symbol {0}")]
    InvalidSymbol(i64),
    #[error("Invalid layout marker, only \"x\" is accepted")]
    InvalidMarker,
    #[error("Layout is too large")]
    LayoutTooLarge,
    #[error("Could not generate a playable level after {0} attempts")]
    GenerationExhausted(u32),
}

pub type Result<T> = core::result::Result<T, GameError>;

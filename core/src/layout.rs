use serde::{Deserialize, Serialize};

use crate::*;

/// One entry of a level description.
///
/// Serialized the way hand-authored levels are written: `"x"` for the player, `-1` for a wall, `0` for an
/// empty cell and a positive integer for a star of that rank.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSymbol", into = "RawSymbol")]
pub enum Symbol {
    Player,
    Wall,
    Empty,
    Star(StarRank),
}

impl Symbol {
    pub const PLAYER_MARKER: &'static str = "x";

    pub fn from_number(number: i64) -> Result<Self> {
        match number {
            -1 => Ok(Self::Wall),
            0 => Ok(Self::Empty),
            n => StarRank::try_from(n)
                .ok()
                .filter(|&rank| rank > 0)
                .map(Self::Star)
                .ok_or(GameError::InvalidSymbol(n)),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawSymbol {
    Number(i64),
    Marker(String),
}

impl TryFrom<RawSymbol> for Symbol {
    type Error = GameError;

    fn try_from(raw: RawSymbol) -> Result<Self> {
        match raw {
            RawSymbol::Number(number) => Self::from_number(number),
            RawSymbol::Marker(marker) if marker == Self::PLAYER_MARKER => Ok(Self::Player),
            RawSymbol::Marker(_) => Err(GameError::InvalidMarker),
        }
    }
}

impl From<Symbol> for RawSymbol {
    fn from(symbol: Symbol) -> Self {
        match symbol {
            Symbol::Player => RawSymbol::Marker(Symbol::PLAYER_MARKER.into()),
            Symbol::Wall => RawSymbol::Number(-1),
            Symbol::Empty => RawSymbol::Number(0),
            Symbol::Star(rank) => RawSymbol::Number(rank.into()),
        }
    }
}

/// Row-major level description, `rows[y][x]`.
///
/// A layout is not validated until it is loaded into a [`Map`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    rows: Vec<Vec<Symbol>>,
}

impl Layout {
    pub fn new(rows: Vec<Vec<Symbol>>) -> Self {
        Self { rows }
    }

    /// Square layout of empty cells.
    pub fn filled(side: Coord) -> Self {
        let side = usize::from(side);
        Self::new(vec![vec![Symbol::Empty; side]; side])
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn rows(&self) -> &[Vec<Symbol>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Width of the first row, rows are not checked against each other.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn get(&self, (x, y): Coord2) -> Option<Symbol> {
        self.rows
            .get(usize::from(y))?
            .get(usize::from(x))
            .copied()
    }

    pub fn set(&mut self, (x, y): Coord2, symbol: Symbol) -> Result<()> {
        let slot = self
            .rows
            .get_mut(usize::from(y))
            .and_then(|row| row.get_mut(usize::from(x)))
            .ok_or(GameError::InvalidCoords)?;
        *slot = symbol;
        Ok(())
    }
}

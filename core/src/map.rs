use core::fmt;
use core::ops::Index;

use bitflags::bitflags;
use ndarray::Array2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::*;

bitflags! {
    /// Directions the player currently cannot step towards.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Blocked: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const UP = 1 << 2;
        const DOWN = 1 << 3;
    }
}

impl Blocked {
    pub const fn from_direction(direction: Direction) -> Self {
        match direction {
            Direction::Left => Self::LEFT,
            Direction::Right => Self::RIGHT,
            Direction::Up => Self::UP,
            Direction::Down => Self::DOWN,
        }
    }

    pub const fn is_blocked(self, direction: Direction) -> bool {
        self.contains(Self::from_direction(direction))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Illegal move, nothing changed.
    Rejected,
    /// Stepped onto an unvisited cell.
    Forward,
    /// Retraced onto the previous cell.
    Backward,
    /// Accepted move that reached the maximum value.
    Finished,
}

impl MoveOutcome {
    pub const fn is_accepted(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// The playing field: cell grid, player position, earned stars and finish state.
///
/// Serializes as its [`Layout`], so visit progress is dropped and loading goes through [`Map::from_layout`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Layout", into = "Layout")]
pub struct Map {
    board: Array2<Cell>,
    player: Coord2,
    blocked: Blocked,
    stars: StarProgress,
    max_value: Value,
    finished: bool,
}

impl Map {
    /// Loads a level description, rejecting anything that is not rectangular or does not hold exactly one player.
    pub fn from_layout(layout: &Layout) -> Result<Self> {
        let rows = layout.rows();
        let height = rows.len();
        let width = layout.width();
        if height == 0 || width == 0 {
            return Err(GameError::EmptyLayout);
        }
        if width > usize::from(Coord::MAX) || height > usize::from(Coord::MAX) {
            return Err(GameError::LayoutTooLarge);
        }

        let mut board = Array2::default((width, height));
        let mut players = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(GameError::RaggedRow {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            for (x, &symbol) in row.iter().enumerate() {
                board[[x, y]] = match symbol {
                    Symbol::Player => {
                        players.push((x as Coord, y as Coord));
                        Cell::Empty { value: 1 }
                    }
                    Symbol::Wall => Cell::Wall,
                    Symbol::Empty => Cell::empty(),
                    Symbol::Star(order) => Cell::star(order),
                };
            }
        }

        let &[player] = players.as_slice() else {
            return Err(GameError::PlayerCount(players.len()));
        };

        let mut map = Self {
            board,
            player,
            blocked: Blocked::empty(),
            stars: StarProgress::new(),
            max_value: 0,
            finished: false,
        };
        map.update_blocked();
        Ok(map)
    }

    pub fn size(&self) -> Coord2 {
        let (width, height) = self.board.dim();
        (width as Coord, height as Coord)
    }

    pub fn width(&self) -> Coord {
        self.size().0
    }

    pub fn height(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        let (width, height) = self.size();
        mult(width, height)
    }

    pub fn player(&self) -> Coord2 {
        self.player
    }

    pub fn blocked(&self) -> Blocked {
        self.blocked
    }

    pub fn stars(&self) -> &StarProgress {
        &self.stars
    }

    pub fn max_value(&self) -> Value {
        self.max_value
    }

    /// Sets the value that finishes the map once the player reaches it, 0 disables finishing.
    pub fn set_max_value(&mut self, max_value: Value) {
        self.max_value = max_value;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn cell_at(&self, coords: Coord2) -> Option<Cell> {
        let (width, height) = self.size();
        if coords.0 < width && coords.1 < height {
            Some(self.board[coords.to_nd_index()])
        } else {
            None
        }
    }

    pub fn cell_at_player(&self) -> Cell {
        self.board[self.player.to_nd_index()]
    }

    /// Value under the player, the walk only ever grows it so at a dead end it is the peak of the explored region.
    pub fn player_value(&self) -> Value {
        self.cell_at_player().value().unwrap_or(UNVISITED)
    }

    pub fn cells(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.board
            .indexed_iter()
            .map(|((x, y), &cell)| ((x as Coord, y as Coord), cell))
    }

    /// Neighbor of the player in `direction`, if it is on the grid.
    pub fn neighbor(&self, direction: Direction) -> Option<Coord2> {
        direction.step(self.player, self.size())
    }

    pub fn can_move_to(&self, coords: Coord2) -> bool {
        if self.finished {
            return false;
        }

        let dx = (i16::from(coords.0) - i16::from(self.player.0)).abs();
        let dy = (i16::from(coords.1) - i16::from(self.player.1)).abs();
        if dx > 1 || dy > 1 || dx + dy != 1 {
            return false;
        }

        let Some(from) = self.cell_at_player().value() else {
            return false;
        };
        match self.cell_at(coords).and_then(Cell::value) {
            Some(to) => to == from - 1 || to == UNVISITED,
            None => false,
        }
    }

    pub fn can_move(&self, direction: Direction) -> bool {
        self.neighbor(direction)
            .is_some_and(|coords| self.can_move_to(coords))
    }

    pub fn can_move_left(&self) -> bool {
        self.can_move(Direction::Left)
    }

    pub fn can_move_right(&self) -> bool {
        self.can_move(Direction::Right)
    }

    pub fn can_move_up(&self) -> bool {
        self.can_move(Direction::Up)
    }

    pub fn can_move_down(&self) -> bool {
        self.can_move(Direction::Down)
    }

    pub fn move_to(&mut self, coords: Coord2) -> MoveOutcome {
        if !self.can_move_to(coords) {
            return MoveOutcome::Rejected;
        }

        let from = self.cell_at_player();
        let to = self.board[coords.to_nd_index()];
        let (Some(from_value), Some(to_value)) = (from.value(), to.value()) else {
            return MoveOutcome::Rejected;
        };

        let outcome = if to_value == from_value - 1 && to_value > 0 {
            self.board[self.player.to_nd_index()].set_value(UNVISITED);
            if let Some(order) = from.star_order() {
                self.stars.unearn(order);
            }
            MoveOutcome::Backward
        } else {
            self.board[coords.to_nd_index()].set_value(from_value + 1);
            if let Some(order) = to.star_order() {
                self.stars.earn(order);
            }
            MoveOutcome::Forward
        };
        log::trace!("{:?} step from {:?} to {:?}", outcome, self.player, coords);

        self.player = coords;
        if self.max_value > 0 && self.player_value() >= self.max_value {
            log::debug!("Map finished at value {}", self.player_value());
            self.finished = true;
        }
        self.update_blocked();

        if self.finished {
            MoveOutcome::Finished
        } else {
            outcome
        }
    }

    pub fn move_in(&mut self, direction: Direction) -> MoveOutcome {
        match self.neighbor(direction) {
            Some(coords) => self.move_to(coords),
            None => MoveOutcome::Rejected,
        }
    }

    pub fn move_left(&mut self) -> MoveOutcome {
        self.move_in(Direction::Left)
    }

    pub fn move_right(&mut self) -> MoveOutcome {
        self.move_in(Direction::Right)
    }

    pub fn move_up(&mut self) -> MoveOutcome {
        self.move_in(Direction::Up)
    }

    pub fn move_down(&mut self) -> MoveOutcome {
        self.move_in(Direction::Down)
    }

    /// Retraces one step towards the start, trying left, right, up and down in that order.
    pub fn move_backwards(&mut self) -> MoveOutcome {
        let retrace = self.board.iter_neighbors(self.player).find(|&(_, coords)| {
            self.can_move_to(coords) && self.board[coords.to_nd_index()].is_visited()
        });

        match retrace {
            Some((_, coords)) => self.move_to(coords),
            None => MoveOutcome::Rejected,
        }
    }

    /// Steps onto a uniformly chosen unvisited neighbor, rejected when there is none.
    pub fn move_randomly<R: Rng + ?Sized>(&mut self, rng: &mut R) -> MoveOutcome {
        let options: Vec<Coord2> = self
            .board
            .iter_neighbors(self.player)
            .map(|(_, coords)| coords)
            .filter(|&coords| {
                self.can_move_to(coords) && self.board[coords.to_nd_index()].is_unvisited()
            })
            .collect();

        match options.choose(rng) {
            Some(&coords) => self.move_to(coords),
            None => MoveOutcome::Rejected,
        }
    }

    pub fn earn_star(&mut self, order: StarRank) -> bool {
        self.stars.earn(order)
    }

    pub fn unearn_star(&mut self, order: StarRank) -> bool {
        self.stars.unearn(order)
    }

    pub fn earned_star(&self, order: StarRank) -> bool {
        self.stars.earned(order)
    }

    pub fn last_star_rank(&self) -> StarRank {
        self.stars.last_rank()
    }

    /// Turns every cell the exploration never reached into a wall, returns how many were converted.
    pub fn seal_unvisited(&mut self) -> CellCount {
        let mut sealed = 0;
        for cell in self.board.iter_mut() {
            if cell.is_unvisited() {
                *cell = Cell::Wall;
                sealed += 1;
            }
        }
        self.update_blocked();
        sealed
    }

    /// Whether any cell is a star, hand-authored layouts may come with ranked stars already.
    pub fn has_stars(&self) -> bool {
        self.board.iter().any(|cell| cell.star_order().is_some())
    }

    /// Promotes `count` distinct visited empty cells (value > 1) to stars, ranked by ascending value.
    ///
    /// Returns `false` without touching the map when there are not enough eligible cells.
    pub fn place_stars<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize) -> bool {
        let eligible: Vec<(Coord2, Value)> = self
            .cells()
            .filter_map(|(coords, cell)| match cell {
                Cell::Empty { value } if value > 1 => Some((coords, value)),
                _ => None,
            })
            .collect();

        if eligible.len() < count {
            return false;
        }

        let mut picked: Vec<(Coord2, Value)> =
            eligible.choose_multiple(rng, count).copied().collect();
        picked.sort_by_key(|&(_, value)| value);

        for (rank, (coords, value)) in (1..).zip(picked) {
            self.board[coords.to_nd_index()] = Cell::Star { value, order: rank };
        }
        true
    }

    /// One step of the post-finish erosion: every open cell loses one value and turns into a wall once it is
    /// exhausted, and the maximum value shrinks by one.
    ///
    /// Returns `true` while there is still something left to erode.
    pub fn decay(&mut self) -> bool {
        for cell in self.board.iter_mut() {
            if let Some(value) = cell.value() {
                if value - 1 <= 0 {
                    *cell = Cell::Wall;
                } else {
                    cell.set_value(value - 1);
                }
            }
        }
        self.max_value -= 1;
        self.update_blocked();
        self.max_value > 1
    }

    /// Exports the topology as a level description, visit progress is dropped.
    pub fn to_layout(&self) -> Layout {
        let (width, height) = self.size();
        let rows = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| match self.board[(x, y).to_nd_index()] {
                        _ if (x, y) == self.player => Symbol::Player,
                        Cell::Wall => Symbol::Wall,
                        Cell::Empty { .. } => Symbol::Empty,
                        Cell::Star { order, .. } => Symbol::Star(order),
                    })
                    .collect()
            })
            .collect();
        Layout::new(rows)
    }

    fn update_blocked(&mut self) {
        self.blocked = Direction::ALL
            .into_iter()
            .filter(|&direction| !self.can_move(direction))
            .map(Blocked::from_direction)
            .fold(Blocked::empty(), |acc, flag| acc | flag);
    }
}

impl TryFrom<Layout> for Map {
    type Error = GameError;

    fn try_from(layout: Layout) -> Result<Self> {
        Self::from_layout(&layout)
    }
}

impl From<Map> for Layout {
    fn from(map: Map) -> Self {
        map.to_layout()
    }
}

impl Index<Coord2> for Map {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.board[coords.to_nd_index()]
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.size();
        for y in 0..height {
            for x in 0..width {
                let glyph = match self.board[(x, y).to_nd_index()] {
                    _ if (x, y) == self.player => '@',
                    Cell::Wall => '#',
                    Cell::Star { value, .. } if value > UNVISITED => '*',
                    Cell::Star { order, .. } => char::from_digit(order.into(), 10).unwrap_or('?'),
                    Cell::Empty { value } if value > UNVISITED => 'o',
                    Cell::Empty { .. } => '.',
                };
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

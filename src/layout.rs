use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use arrayvec::ArrayVec;

use crate::{Direction, Pos, SpecError};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Empty,
    Wall,
    Food,
    Capsule,
}

/// A maze read from text, one character per cell:
/// `%` wall, `.` food, `o` capsule, `P` Pacman, `G` or `1`..`4` ghost.
///
/// Rows are listed top to bottom; positions count `y` from the bottom row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Layout {
    width: u8,
    height: u8,
    grid: Box<[Cell]>,
    pacman: Pos,
    ghosts: Box<[Pos]>,
}

impl Index<Pos> for Layout {
    type Output = Cell;
    fn index(&self, pos: Pos) -> &Self::Output {
        &self.grid[self.offset(pos)]
    }
}

impl Layout {
    fn offset(&self, Pos(x, y): Pos) -> usize {
        let row = (self.height - 1 - y) as usize;
        row * self.width as usize + x as usize
    }

    fn contains(&self, Pos(x, y): Pos) -> bool {
        x < self.width && y < self.height
    }

    fn cells(&self) -> impl Iterator<Item = (Pos, Cell)> + '_ {
        let (width, height) = (self.width, self.height);
        self.grid.iter().zip(0..).map(move |(&cell, i): (&Cell, usize)| {
            let x = (i % width as usize) as u8;
            let y = height - 1 - (i / width as usize) as u8;
            (Pos(x, y), cell)
        })
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn pacman(&self) -> Pos {
        self.pacman
    }

    /// Positions outside the grid count as walls.
    pub fn is_wall(&self, pos: Pos) -> bool {
        !self.contains(pos) || self[pos] == Cell::Wall
    }

    pub fn has_food(&self, pos: Pos) -> bool {
        self.contains(pos) && self[pos] == Cell::Food
    }

    pub fn food(&self) -> Vec<Pos> {
        let mut food = self
            .cells()
            .filter(|&(_, cell)| cell == Cell::Food)
            .map(|(pos, _)| pos)
            .collect::<Vec<_>>();
        food.sort_unstable();
        food
    }

    /// The inner corners `(1, 1)`, `(1, top)`, `(right, 1)`, `(right, top)`.
    pub fn corners(&self) -> [Pos; 4] {
        let top = self.height.saturating_sub(2);
        let right = self.width.saturating_sub(2);
        [Pos(1, 1), Pos(1, top), Pos(right, 1), Pos(right, top)]
    }

    /// Non-wall neighbours in `North, South, East, West` order.
    pub fn legal_moves(&self, pos: Pos) -> ArrayVec<(Direction, Pos), 4> {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| {
                let next = pos.step(dir)?;
                (!self.is_wall(next)).then_some((dir, next))
            })
            .collect()
    }
}

impl FromStr for Layout {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |msg: String| SpecError::Layout(msg);

        let rows = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        if height == 0 || width == 0 {
            return Err(err("empty layout".into()));
        }
        if height > u8::MAX as usize || width > u8::MAX as usize {
            return Err(err(format!("layout too large: {width}x{height}")));
        }

        let mut grid = Vec::with_capacity(width * height);
        let mut pacman = None;
        let mut ghosts = Vec::new();
        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != width {
                return Err(err(format!(
                    "width mismatch on line {row}, expecting width {width}"
                )));
            }
            let y = (height - 1 - row) as u8;
            for (x, ch) in line.chars().enumerate() {
                let pos = Pos(x as u8, y);
                let cell = match ch {
                    ' ' => Cell::Empty,
                    '%' => Cell::Wall,
                    '.' => Cell::Food,
                    'o' => Cell::Capsule,
                    'P' => {
                        if pacman.replace(pos).is_some() {
                            return Err(err("multiple Pacman positions".into()));
                        }
                        Cell::Empty
                    }
                    'G' | '1'..='4' => {
                        ghosts.push(pos);
                        Cell::Empty
                    }
                    _ => return Err(err(format!("invalid cell: {ch:?}"))),
                };
                grid.push(cell);
            }
        }

        Ok(Layout {
            width: width as u8,
            height: height as u8,
            grid: grid.into(),
            pacman: pacman.ok_or_else(|| err("missing Pacman position".into()))?,
            ghosts: ghosts.into(),
        })
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, cell) in self.cells() {
            if pos.0 == 0 && pos.1 + 1 != self.height {
                "\n".fmt(f)?;
            }
            if pos == self.pacman {
                "P".fmt(f)?;
            } else if self.ghosts.contains(&pos) {
                "G".fmt(f)?;
            } else {
                cell.fmt(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => " ".fmt(f),
            Cell::Wall => "%".fmt(f),
            Cell::Food => ".".fmt(f),
            Cell::Capsule => "o".fmt(f),
        }
    }
}

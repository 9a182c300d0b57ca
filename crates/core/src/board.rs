//! Board module - the solidified-cell playfield
//!
//! The playfield is 10 columns by 40 rows stored as a flat row-major array. Row 0 is the bottom
//! row and y grows upward; the top 20 rows are the spawn buffer above the visible area. Only
//! `Cell::Empty` and `Cell::Block` are ever stored here.
//!
//! Collision queries for movement, rotation, kicks and drop height all go through
//! [`Board::is_valid_position`].

use arrayvec::ArrayVec;

use crate::controller::ActivePiece;
use crate::types::{Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH, DROP_SEARCH_FLOOR};

/// Total number of cells on the board
const BOARD_SIZE: usize = BOARD_WIDTH * BOARD_HEIGHT;

/// Row indices returned by [`Board::find_full_rows`], ascending
pub type RowSet = ArrayVec<usize, BOARD_HEIGHT>;

/// A composed grid of `ROWS` rows, bottom row first
pub type Grid<const ROWS: usize> = [[Cell; BOARD_WIDTH]; ROWS];

/// The game board - 10 columns x 40 rows using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; BOARD_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x as usize >= BOARD_WIDTH || y < 0 || y as usize >= BOARD_HEIGHT {
            return None;
        }
        Some((y as usize) * BOARD_WIDTH + (x as usize))
    }

    pub fn width(&self) -> usize {
        BOARD_WIDTH
    }

    pub fn height(&self) -> usize {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds; ghost cells are never stored
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        if cell == Cell::Ghost {
            return false;
        }
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Whether a single mino may occupy (x, y)
    ///
    /// Columns outside `[0, WIDTH)` and rows below 0 are walls and floor. Rows above the stored
    /// height count as open air.
    pub fn is_open(&self, x: i8, y: i8) -> bool {
        if x < 0 || x as usize >= BOARD_WIDTH || y < 0 {
            return false;
        }
        match self.get(x, y) {
            Some(cell) => !cell.is_solid(),
            None => true,
        }
    }

    /// Whether a cell counts as solid for corner tests: occupied or outside the stored grid
    pub fn is_solid_or_outside(&self, x: i8, y: i8) -> bool {
        match self.get(x, y) {
            Some(cell) => cell.is_solid(),
            None => true,
        }
    }

    /// True iff every mino of `piece` lies on an open cell
    pub fn is_valid_position(&self, piece: &ActivePiece) -> bool {
        piece.cells().iter().all(|&(x, y)| self.is_open(x, y))
    }

    /// The y the piece would come to rest at if dropped straight down
    ///
    /// Probes one row at a time down to `DROP_SEARCH_FLOOR`. If the search runs out the last
    /// valid y is returned.
    pub fn lowest_resting_y(&self, piece: &ActivePiece) -> i8 {
        let mut resting = piece.y;
        let mut probe = *piece;
        while probe.y > DROP_SEARCH_FLOOR {
            probe.y -= 1;
            if !self.is_valid_position(&probe) {
                break;
            }
            resting = probe.y;
        }
        resting
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= BOARD_HEIGHT {
            return false;
        }
        let start = y * BOARD_WIDTH;
        self.cells[start..start + BOARD_WIDTH]
            .iter()
            .all(|cell| cell.is_solid())
    }

    /// Indices of all full rows, bottom to top
    pub fn find_full_rows(&self) -> RowSet {
        (0..BOARD_HEIGHT).filter(|&y| self.is_row_full(y)).collect()
    }

    /// Remove `rows` and let everything above fall into the gaps
    ///
    /// Each surviving row drops by the number of removed rows beneath it; the vacated rows at
    /// the top are refilled empty. Rows outside the board are ignored.
    pub fn clear_and_compact(&mut self, rows: &[usize]) {
        if rows.is_empty() {
            return;
        }

        let mut write_y = 0usize;
        for read_y in 0..BOARD_HEIGHT {
            if rows.contains(&read_y) {
                continue;
            }
            if write_y != read_y {
                let src = read_y * BOARD_WIDTH;
                self.cells
                    .copy_within(src..src + BOARD_WIDTH, write_y * BOARD_WIDTH);
            }
            write_y += 1;
        }

        for cell in &mut self.cells[write_y * BOARD_WIDTH..] {
            *cell = Cell::Empty;
        }
    }

    /// Write the piece's minos into the grid
    ///
    /// Minos above the stored height are dropped. Returns false (and writes nothing) if the
    /// piece is not at a valid position.
    pub fn lock_piece(&mut self, piece: &ActivePiece) -> bool {
        if !self.is_valid_position(piece) {
            return false;
        }
        for (x, y) in piece.cells() {
            self.set(x, y, Cell::Block(piece.kind));
        }
        true
    }

    /// Compose the bottom `ROWS` rows with the active piece (and optionally its ghost)
    ///
    /// With `mask` set, minos outside the grid or on top of solid cells are skipped. Without it
    /// such a configuration yields `None`; that mode backs invariant checks.
    pub fn compose<const ROWS: usize>(
        &self,
        piece: Option<&ActivePiece>,
        include_ghost: bool,
        mask: bool,
    ) -> Option<Grid<ROWS>> {
        let mut out = [[Cell::Empty; BOARD_WIDTH]; ROWS];
        for (y, row) in out.iter_mut().enumerate().take(BOARD_HEIGHT) {
            let start = y * BOARD_WIDTH;
            row.copy_from_slice(&self.cells[start..start + BOARD_WIDTH]);
        }

        let Some(piece) = piece else {
            return Some(out);
        };

        let in_grid = |x: i8, y: i8| x >= 0 && (x as usize) < BOARD_WIDTH && y >= 0 && (y as usize) < ROWS;

        if include_ghost {
            let ghost = ActivePiece {
                y: self.lowest_resting_y(piece),
                ..*piece
            };
            for (x, y) in ghost.cells() {
                if in_grid(x, y) && out[y as usize][x as usize] == Cell::Empty {
                    out[y as usize][x as usize] = Cell::Ghost;
                }
            }
        }

        for (x, y) in piece.cells() {
            if !in_grid(x, y) || out[y as usize][x as usize].is_solid() {
                if mask {
                    continue;
                }
                return None;
            }
            out[y as usize][x as usize] = Cell::Block(piece.kind);
        }

        Some(out)
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of solid cells on the board
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_solid()).count()
    }

    /// Fill every column of row `y` except those in `holes`
    pub fn fill_row_except(&mut self, y: i8, holes: &[i8], kind: PieceKind) {
        for x in 0..BOARD_WIDTH as i8 {
            if !holes.contains(&x) {
                self.set(x, y, Cell::Block(kind));
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

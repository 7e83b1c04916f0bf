//! Board state mirrored from the on-chain game account.
//!
//! The account stores one byte per row, most-significant bit first. The
//! client never enforces game rules on the grid; it only reflects whatever
//! the program last wrote.

/// Number of rows on the board
pub const ROWS: usize = 5;
/// Number of columns on the board
pub const COLS: usize = 8;
/// Total cell count
pub const CELLS: usize = ROWS * COLS;
/// The bottom-right cell. Eating it loses the game.
pub const GLASS_INDEX: u8 = 39;

/// 5x8 grid of eaten cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Board {
    eaten: [[bool; COLS]; ROWS],
}

/// Row of a linear cell index.
pub fn row_of(index: u8) -> u8 {
    index / COLS as u8
}

/// Column of a linear cell index.
pub fn col_of(index: u8) -> u8 {
    index % COLS as u8
}

/// Linear cell index of a row/column pair.
pub fn index_of(row: u8, col: u8) -> u8 {
    row * COLS as u8 + col
}

/// Unpack one account byte into its row of cells, MSB first.
pub fn decode_row(byte: u8) -> [bool; COLS] {
    let mut row = [false; COLS];
    for (col, cell) in row.iter_mut().enumerate() {
        *cell = byte & (0x80 >> col) != 0;
    }
    row
}

impl Board {
    /// Decode raw account data into a board.
    ///
    /// Empty data means the game account has not been initialized yet and is
    /// distinct from an all-uneaten board; short data is malformed. Both
    /// return `None` and must produce no state update in the caller.
    pub fn decode(data: &[u8]) -> Option<Board> {
        if data.len() < ROWS {
            return None;
        }
        let mut eaten = [[false; COLS]; ROWS];
        for (row, byte) in data[..ROWS].iter().enumerate() {
            eaten[row] = decode_row(*byte);
        }
        Some(Board { eaten })
    }

    /// Pack the board back into the 5-byte account layout.
    pub fn encode(&self) -> [u8; ROWS] {
        let mut bytes = [0u8; ROWS];
        for (row, cells) in self.eaten.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if *cell {
                    bytes[row] |= 0x80 >> col;
                }
            }
        }
        bytes
    }

    /// The board shown once the game has ended. Everything is eaten; on a
    /// win the glass cell is the one piece left standing.
    pub fn game_over(win: bool) -> Board {
        let mut eaten = [[true; COLS]; ROWS];
        if win {
            eaten[ROWS - 1][COLS - 1] = false;
        }
        Board { eaten }
    }

    pub fn is_eaten(&self, row: u8, col: u8) -> bool {
        self.eaten[row as usize][col as usize]
    }

    pub fn eaten_at(&self, index: u8) -> bool {
        self.is_eaten(row_of(index), col_of(index))
    }

    /// True once any cell has been consumed, i.e. a game is in progress.
    pub fn any_eaten(&self) -> bool {
        self.eaten.iter().flatten().any(|&cell| cell)
    }
}

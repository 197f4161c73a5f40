use super::move_status::MoveStatus;

/// Board width in columns.
pub const WIDTH: usize = 7;
/// Board height in rows. Row 0 is the top of the board.
pub const HEIGHT: usize = 7;
/// Number of contiguous tokens required to win.
pub const WIN_COUNT: usize = 4;

/// Numeric player encoding.
///
/// Players are `1` and `-1` so that flipping the turn is a negation and
/// ownership tests collapse to a sign comparison. `0` marks an empty cell and
/// is never a valid player id.
pub type Player = i8;

pub const PLAYER_1: Player = 1;
pub const PLAYER_2: Player = -1;
pub const NOT_SET: Player = 0;

/// Raw cell grid, rows ordered top to bottom.
pub type Grid = [[Player; WIDTH]; HEIGHT];

/// Playing board with fixed dimensions.
///
/// It assumes two players and doesn't care who the players are - it just
/// defines the rules of the game. Tokens drop with gravity: a move names a
/// column and the row is derived from the column fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    state: Grid,
    /// Lowest empty row per column, `None` when the column is full.
    next_row: [Option<usize>; WIDTH],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Board {
            state: [[NOT_SET; WIDTH]; HEIGHT],
            next_row: [Some(HEIGHT - 1); WIDTH],
        }
    }

    /// Creates a board from a preloaded state grid.
    ///
    /// The per-column drop rows are recomputed from the grid, so a state
    /// received from another process can be loaded as-is.
    ///
    /// # Arguments
    /// * `state` - The cell grid, rows top to bottom.
    pub fn from_state(state: Grid) -> Self {
        let mut next_row = [None; WIDTH];
        for (col, slot) in next_row.iter_mut().enumerate() {
            *slot = (0..HEIGHT).rev().find(|&row| state[row][col] == NOT_SET);
        }
        Board { state, next_row }
    }

    /// Returns the raw cell grid.
    pub fn grid(&self) -> &Grid {
        &self.state
    }

    /// Returns the value of a single cell.
    pub fn cell(&self, row: usize, col: usize) -> Player {
        self.state[row][col]
    }

    /// Plays a move and updates the board state.
    ///
    /// The token drops to the lowest empty row of `col`. An out-of-range or
    /// full column yields `Invalid` and leaves the state untouched.
    ///
    /// # Arguments
    /// * `col` - Move column.
    /// * `player` - Player making the move, `PLAYER_1` or `PLAYER_2`.
    ///
    /// # Returns
    /// The move status: `Invalid`, `Valid` or `Win`.
    ///
    /// # Panics
    /// If `player` is not one of the two player ids.
    pub fn play(&mut self, col: usize, player: Player) -> MoveStatus {
        if col >= WIDTH {
            return MoveStatus::Invalid;
        }
        assert!(
            player == PLAYER_1 || player == PLAYER_2,
            "invalid player {}",
            player
        );
        let row = match self.next_row[col] {
            Some(row) => row,
            None => return MoveStatus::Invalid,
        };
        let status = self.think(row, col, player);
        if status == MoveStatus::Invalid {
            return status;
        }
        self.state[row][col] = player;
        self.next_row[col] = row.checked_sub(1);
        status
    }

    /// Checks the outcome of a move at `(row, col)` without updating the
    /// board state.
    ///
    /// Win detection spreads middle-out from the placed cell along its row
    /// and its column; diagonals are deliberately not considered.
    ///
    /// # Returns
    /// The status the move would have if it were played.
    pub fn think(&self, row: usize, col: usize, player: Player) -> MoveStatus {
        if !self.check_validity(row, col) {
            return MoveStatus::Invalid;
        }
        let column: [Player; HEIGHT] = std::array::from_fn(|r| self.state[r][col]);
        let row_run = contiguous_run(&self.state[row], col, player);
        let col_run = contiguous_run(&column, row, player);
        if row_run >= WIN_COUNT || col_run >= WIN_COUNT {
            MoveStatus::Win
        } else {
            MoveStatus::Valid
        }
    }

    /// Checks whether a `(row, col)` pair is playable in the current state:
    /// the cell is empty and either sits on the bottom row or on top of an
    /// occupied cell.
    pub fn check_validity(&self, row: usize, col: usize) -> bool {
        if row >= HEIGHT || col >= WIDTH {
            return false;
        }
        if self.state[row][col] != NOT_SET {
            return false;
        }
        if row == HEIGHT - 1 {
            return true;
        }
        self.state[row + 1][col] != NOT_SET
    }

    /// Returns the playable columns in ascending order.
    pub fn valid_moves(&self) -> Vec<usize> {
        (0..WIDTH)
            .filter(|&col| self.next_row[col].is_some())
            .collect()
    }

    /// Returns the lowest empty row of a column, `None` when full.
    pub fn next_row(&self, col: usize) -> Option<usize> {
        self.next_row[col]
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

/// Counts the contiguous cells owned by `player` around `position`,
/// inclusive. The cell at `position` is assumed to belong to `player`.
fn contiguous_run(line: &[Player], position: usize, player: Player) -> usize {
    let mut count = 1;
    for &cell in line[..position].iter().rev() {
        if cell != player {
            break;
        }
        count += 1;
    }
    for &cell in &line[position + 1..] {
        if cell != player {
            break;
        }
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;

    fn play_all(board: &mut Board, moves: &[usize]) -> Vec<MoveStatus> {
        let mut player = PLAYER_1;
        moves
            .iter()
            .map(|&col| {
                let status = board.play(col, player);
                player = -player;
                status
            })
            .collect()
    }

    #[test]
    fn horizontal_win_on_bottom_row() {
        let mut board = Board::new();
        let statuses = play_all(&mut board, &[0, 0, 1, 1, 2, 2, 3]);
        assert_eq!(
            statuses,
            vec![
                MoveStatus::Valid,
                MoveStatus::Valid,
                MoveStatus::Valid,
                MoveStatus::Valid,
                MoveStatus::Valid,
                MoveStatus::Valid,
                MoveStatus::Win,
            ]
        );
    }

    #[test]
    fn vertical_win() {
        let mut board = Board::new();
        let statuses = play_all(&mut board, &[3, 0, 3, 0, 3, 0, 3]);
        assert_eq!(statuses[..6], vec![MoveStatus::Valid; 6][..]);
        assert_eq!(statuses[6], MoveStatus::Win);
    }

    #[test]
    fn no_diagonal_win() {
        // stairs for player 1 along the main diagonal
        let mut board = Board::new();
        for (col, height) in [(0, 1), (1, 2), (2, 3), (3, 4)] {
            for i in 0..height - 1 {
                board.play(col, if i % 2 == 0 { PLAYER_2 } else { PLAYER_1 });
            }
        }
        assert_eq!(board.play(0, PLAYER_1), MoveStatus::Valid);
        assert_eq!(board.play(1, PLAYER_1), MoveStatus::Valid);
        assert_eq!(board.play(2, PLAYER_1), MoveStatus::Valid);
        assert_ne!(board.play(3, PLAYER_1), MoveStatus::Win);
    }

    #[test]
    fn out_of_range_and_full_column_are_invalid() {
        let mut board = Board::new();
        assert_eq!(board.play(WIDTH, PLAYER_1), MoveStatus::Invalid);
        for _ in 0..HEIGHT {
            assert_ne!(board.play(4, PLAYER_1), MoveStatus::Invalid);
        }
        assert_eq!(board.play(4, PLAYER_1), MoveStatus::Invalid);
        assert_eq!(board.next_row(4), None);
    }

    #[test]
    #[should_panic(expected = "invalid player")]
    fn invalid_player_panics() {
        Board::new().play(0, 2);
    }

    #[test]
    fn gravity_invariant_after_random_playout() {
        let mut rng = rand::thread_rng();
        let mut board = Board::new();
        let mut player = PLAYER_1;
        for _ in 0..40 {
            let moves = board.valid_moves();
            let Some(&col) = moves.choose(&mut rng) else {
                break;
            };
            if board.play(col, player) == MoveStatus::Win {
                break;
            }
            player = -player;
        }
        for col in 0..WIDTH {
            let boundary = board.next_row(col).map(|r| r + 1).unwrap_or(0);
            for row in 0..boundary {
                assert_eq!(board.cell(row, col), NOT_SET);
            }
            for row in boundary..HEIGHT {
                assert_ne!(board.cell(row, col), NOT_SET);
            }
        }
    }

    #[test]
    fn copy_isolation() {
        let mut board = Board::new();
        board.play(2, PLAYER_1);
        let copy = board.clone();
        board.play(2, PLAYER_2);
        assert_eq!(copy.cell(HEIGHT - 2, 2), NOT_SET);
        assert_eq!(copy.next_row(2), Some(HEIGHT - 2));
        assert_eq!(board.next_row(2), Some(HEIGHT - 3));
    }

    #[test]
    fn from_state_recomputes_drop_rows() {
        let mut original = Board::new();
        play_all(&mut original, &[3, 3, 3, 0, 6, 6]);
        let loaded = Board::from_state(*original.grid());
        assert_eq!(loaded, original);
        assert_eq!(loaded.next_row(3), Some(HEIGHT - 4));
        assert_eq!(loaded.next_row(0), Some(HEIGHT - 2));
        assert_eq!(loaded.next_row(1), Some(HEIGHT - 1));
    }

    #[test]
    fn check_validity_requires_support() {
        let mut board = Board::new();
        assert!(board.check_validity(HEIGHT - 1, 0));
        assert!(!board.check_validity(HEIGHT - 2, 0));
        board.play(0, PLAYER_1);
        assert!(board.check_validity(HEIGHT - 2, 0));
        assert!(!board.check_validity(HEIGHT - 1, 0));
        assert!(!board.check_validity(HEIGHT, 0));
        assert!(!board.check_validity(0, WIDTH));
    }

    #[test]
    fn valid_moves_is_ordered() {
        let mut board = Board::new();
        for _ in 0..HEIGHT {
            board.play(2, PLAYER_1);
            board.play(5, PLAYER_2);
        }
        assert_eq!(board.valid_moves(), vec![0, 1, 3, 4, 6]);
    }

    #[test]
    fn think_does_not_mutate() {
        let board = Board::new();
        let copy = board.clone();
        assert_eq!(board.think(HEIGHT - 1, 3, PLAYER_1), MoveStatus::Valid);
        assert_eq!(board, copy);
    }
}

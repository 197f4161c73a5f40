use std::cell::RefCell;
use std::rc::Rc;

use crate::board::{player_char, Board, MoveStatus, Player, RenderMode, NOT_SET, PLAYER_1, PLAYER_2};

use super::controller::Controller;

/// Wrapper around the board holding the current game state.
///
/// Alternates two controllers and enforces the exit conditions: a win by
/// either side, or a draw once no column is playable.
pub struct GameLoop<'a> {
    board: Rc<RefCell<Board>>,
    controllers: [&'a mut dyn Controller; 2],
    move_count: usize,
    won: Player,
    render: RenderMode,
}

impl<'a> GameLoop<'a> {
    /// Creates a game over `board` between two controllers.
    ///
    /// # Arguments
    /// * `board` - Shared board; controllers may hold the other handles.
    /// * `player_1` - Controller moving first, playing `PLAYER_1`.
    /// * `player_2` - Controller playing `PLAYER_2`.
    /// * `render` - Table flavour used when running verbosely.
    pub fn new(
        board: Rc<RefCell<Board>>,
        player_1: &'a mut dyn Controller,
        player_2: &'a mut dyn Controller,
        render: RenderMode,
    ) -> Self {
        GameLoop {
            board,
            controllers: [player_1, player_2],
            move_count: 0,
            won: NOT_SET,
            render,
        }
    }

    /// Winner so far, `NOT_SET` while the game is open.
    pub fn won(&self) -> Player {
        self.won
    }

    /// Number of accepted steps so far.
    pub fn move_count(&self) -> usize {
        self.move_count
    }

    /// Plays one move. The side is chosen from the game state.
    ///
    /// Once either player has won, every subsequent step returns `Win` or
    /// `Loss` for the side on turn without consulting the board.
    ///
    /// # Returns
    /// The status of the move; `Invalid` does not advance the move counter,
    /// so the same side retries.
    pub fn step(&mut self) -> MoveStatus {
        let (index, player) = if self.move_count % 2 == 0 {
            (0, PLAYER_1)
        } else {
            (1, PLAYER_2)
        };

        if self.won != NOT_SET {
            self.move_count += 1;
            return if player == self.won {
                MoveStatus::Win
            } else {
                MoveStatus::Loss
            };
        }

        let col = self.controllers[index].next_move(player);
        let status = self.board.borrow_mut().play(col, player);
        if status == MoveStatus::Invalid {
            return status;
        }
        if status == MoveStatus::Win {
            self.won = player;
        }
        self.move_count += 1;
        status
    }

    /// Runs the main game loop until a win or a draw.
    ///
    /// # Arguments
    /// * `verbose` - Print the board after every completed round.
    pub fn run(&mut self, verbose: bool) {
        let mut step_num = 0;
        while self.won == NOT_SET {
            if self.board.borrow().valid_moves().is_empty() {
                return;
            }
            let status = self.step();
            if verbose && step_num % 2 == 1 {
                println!("{}", self.board.borrow().render(self.render));
            }
            if status != MoveStatus::Invalid {
                step_num += 1;
            }
        }
        println!("Player {} won!", player_char(self.render, self.won));
    }
}

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use log::warn;

use crate::board::{Board, Player};
use crate::search::{SearchConfig, SearchEngine};

/// A source of moves for one side of the game.
///
/// Implementations range from stdin-driven humans to the distributed search
/// coordinator - the game loop treats them all the same.
pub trait Controller {
    /// Produces the next column for `player`.
    fn next_move(&mut self, player: Player) -> usize;
}

/// Controller that reads one column index per line from stdin.
pub struct HumanController;

impl HumanController {
    pub fn new() -> Self {
        HumanController
    }
}

impl Default for HumanController {
    fn default() -> Self {
        HumanController::new()
    }
}

impl Controller for HumanController {
    fn next_move(&mut self, player: Player) -> usize {
        let stdin = io::stdin();
        loop {
            print!("player {} move: ", player);
            let _ = io::stdout().flush();
            let mut line = String::new();
            let read = stdin
                .lock()
                .read_line(&mut line)
                .expect("failed to read from stdin");
            if read == 0 {
                panic!("stdin closed while waiting for a move");
            }
            match line.trim().parse::<usize>() {
                Ok(col) => return col,
                Err(_) => warn!("not a column index: {:?}", line.trim()),
            }
        }
    }
}

/// Controller driven by a predetermined move list, front to back.
///
/// Running out of moves is a programmer error in the driving test.
pub struct ScriptedController {
    moves: VecDeque<usize>,
}

impl ScriptedController {
    pub fn new(moves: Vec<usize>) -> Self {
        ScriptedController {
            moves: moves.into(),
        }
    }

    /// Number of moves left in the script.
    pub fn remaining(&self) -> usize {
        self.moves.len()
    }
}

impl Controller for ScriptedController {
    fn next_move(&mut self, _player: Player) -> usize {
        self.moves
            .pop_front()
            .expect("scripted controller ran out of moves")
    }
}

/// Local single-process AI controller wrapping the search engine.
pub struct AiController {
    board: Rc<RefCell<Board>>,
    engine: SearchEngine,
}

impl AiController {
    /// Creates an AI playing on the shared game board.
    ///
    /// # Arguments
    /// * `board` - The board owned by the game loop.
    /// * `config` - Search depth configuration.
    pub fn new(board: Rc<RefCell<Board>>, config: SearchConfig) -> Self {
        AiController {
            board,
            engine: SearchEngine::new(config),
        }
    }
}

impl Controller for AiController {
    fn next_move(&mut self, player: Player) -> usize {
        let board = self.board.borrow().clone();
        self.engine
            .play(&board, player)
            .expect("no playable column left")
    }
}

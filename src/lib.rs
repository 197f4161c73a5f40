pub mod board;
pub mod game;
pub mod measure;
pub mod parallel;
pub mod search;

pub mod prelude {
    // Useful structs
    pub use crate::board::{Board, MoveStatus, RenderMode};
    pub use crate::game::{AiController, Controller, GameLoop, HumanController};
    pub use crate::parallel::{Coordinator, Worker};
    pub use crate::search::{SearchConfig, SearchConfigBuilder, SearchEngine};

    // Useful functions
    pub use crate::board::player_char;
    pub use crate::parallel::create_group;
    pub use crate::search::score_ratio;
}

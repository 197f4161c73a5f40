pub mod grid;
pub mod move_status;
pub mod render;

pub use {
    grid::{Board, Grid, Player, HEIGHT, NOT_SET, PLAYER_1, PLAYER_2, WIDTH, WIN_COUNT},
    move_status::MoveStatus,
    render::{player_char, RenderMode},
};

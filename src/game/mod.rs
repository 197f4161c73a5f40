pub mod controller;
pub mod game_loop;

pub use {
    controller::{AiController, Controller, HumanController, ScriptedController},
    game_loop::GameLoop,
};

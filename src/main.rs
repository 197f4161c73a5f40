//! Distributed drop-token game.
//!
//! Launches a process group of `total_processes` ranks: rank 0 runs the
//! coordinator and the interactive game, ranks 1 and up run search workers.
//! The human plays first; the coordinator answers with the column chosen by
//! the distributed search.

use std::cell::RefCell;
use std::process;
use std::rc::Rc;
use std::thread;

use clap::Parser;

use connect_engine::board::{Board, RenderMode};
use connect_engine::game::{GameLoop, HumanController};
use connect_engine::parallel::{create_group, Coordinator, Worker};
use connect_engine::search::SearchConfigBuilder;

/// Drop-token game against a distributed adversarial search.
#[derive(Parser)]
#[command(name = "connect_engine", about, long_about = None)]
struct Cli {
    /// Total number of ranks: one coordinator plus the workers.
    total_processes: usize,

    /// Full search depth in plies (the AI difficulty).
    max_depth: usize,

    /// Render the board with the boxed human-friendly table.
    #[arg(long)]
    pretty: bool,
}

fn main() {
    pretty_env_logger::init();
    let cli = Cli::parse();

    if cli.total_processes < 2 {
        eprintln!("at least two ranks are needed: a coordinator and a worker");
        process::exit(1);
    }

    let config = SearchConfigBuilder::default()
        .max_depth(cli.max_depth)
        .build()
        .expect("search configuration is complete");
    let render = if cli.pretty {
        RenderMode::Pretty
    } else {
        RenderMode::Official
    };

    let mut group = create_group(cli.total_processes).into_iter();
    let coordinator_endpoint = group.next().expect("the group is never empty");

    let mut handles = Vec::new();
    for endpoint in group {
        handles.push(
            thread::Builder::new()
                .name(format!("worker-{}", endpoint.rank()))
                .spawn(move || Worker::new(endpoint, config).run())
                .expect("failed to spawn a worker"),
        );
    }

    let board = Rc::new(RefCell::new(Board::new()));
    let mut human = HumanController::new();
    let mut coordinator = Coordinator::new(coordinator_endpoint, board.clone(), config);

    let mut game = GameLoop::new(board, &mut human, &mut coordinator, render);
    game.run(true);

    coordinator.done();
    for handle in handles {
        let _ = handle.join();
    }
}

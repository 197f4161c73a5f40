use log::{debug, error, info};

use crate::board::Board;
use crate::search::{SearchConfig, SearchEngine};

use super::message::{Message, Task, TaskResult, COORDINATOR};
use super::transport::Endpoint;

/// Worker side of the distributed search.
///
/// Pulls tasks from the coordinator on demand and runs the deep search below
/// each frontier position. Stateless between tasks apart from the long-lived
/// engine; every task ships its own board state.
pub struct Worker {
    endpoint: Endpoint,
    engine: SearchEngine,
}

impl Worker {
    pub fn new(endpoint: Endpoint, config: SearchConfig) -> Self {
        Worker {
            endpoint,
            engine: SearchEngine::new(config),
        }
    }

    /// Request/compute loop; returns once the coordinator sends DONE or the
    /// link dies.
    pub fn run(&mut self) {
        let rank = self.endpoint.rank();
        info!("worker {} starting", rank);
        loop {
            if let Err(err) = self.endpoint.send(COORDINATOR, &Message::Request(rank)) {
                error!("worker {}: coordinator link closed: {}", rank, err);
                return;
            }

            match self.endpoint.recv() {
                Ok((_, Message::Task(task))) => {
                    debug!("worker {} received task {:?}", rank, task.moves);
                    let result = self.process(task);
                    debug!("worker {} calculated result {:?}", rank, result);
                    if let Err(err) = self.endpoint.send(COORDINATOR, &Message::Result(result)) {
                        error!("worker {}: could not return result: {}", rank, err);
                        return;
                    }
                }
                Ok((_, Message::Done)) => {
                    info!("worker {} exiting", rank);
                    return;
                }
                Ok((source, message)) => {
                    error!(
                        "worker {}: protocol error: unexpected {:?} from {}",
                        rank, message, source
                    );
                    return;
                }
                Err(err) => {
                    error!("worker {}: receive failed: {}", rank, err);
                    return;
                }
            }
        }
    }

    /// Runs the deep search for one task.
    ///
    /// The task's `player` is whoever just moved to reach the frontier
    /// position, which sits `precompute_depth` plies below the search root;
    /// the flips cancel out to recover the side the search is evaluated for.
    fn process(&self, task: Task) -> TaskResult {
        let board = Board::from_state(task.state);
        let config = self.engine.config();
        let parity = if config.precompute_depth % 2 == 0 { 1 } else { -1 };
        let me = -task.player * parity;
        let depth = config.max_depth.saturating_sub(config.precompute_depth);

        let tree = self.engine.compute(&board, me, depth);
        let root = tree.node(tree.root());
        TaskResult {
            score: root.score(),
            total: root.total(),
            winner: root.winner(),
            loser: root.loser(),
            moves: task.moves,
        }
    }
}

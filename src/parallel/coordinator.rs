use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, info, warn};

use crate::board::{Board, Player};
use crate::game::Controller;
use crate::measure::{FileSink, MeasurementSink};
use crate::search::{GameTree, NodeId, SearchConfig, SearchEngine};

use super::message::{Message, Rank, Task, TaskResult};
use super::transport::Endpoint;

/// Master side of the distributed search.
///
/// Builds a shallow frontier of candidate positions, hands its leaves to
/// whichever workers ask for work, reintegrates their results and finishes
/// the scoring locally. From the game loop's point of view this is just
/// another controller.
///
/// A dedicated receive thread owns the read side of the transport and
/// demultiplexes incoming messages into a request queue (idle worker ranks)
/// and a response queue (task results); the play thread only ever touches the
/// queues.
pub struct Coordinator {
    endpoint: Arc<Endpoint>,
    board: Rc<RefCell<Board>>,
    engine: SearchEngine,
    request_queue: Receiver<Rank>,
    response_queue: Receiver<TaskResult>,
    receive_handle: Option<JoinHandle<()>>,
    sink: Box<dyn MeasurementSink>,
    measured: bool,
}

impl Coordinator {
    /// Creates the coordinator over its transport endpoint and starts the
    /// receive thread.
    ///
    /// # Arguments
    /// * `endpoint` - Rank 0 handle into the process group.
    /// * `board` - The shared game board.
    /// * `config` - Search configuration; `max_depth` is the full search
    ///   depth, `precompute_depth` the local frontier depth.
    pub fn new(endpoint: Endpoint, board: Rc<RefCell<Board>>, config: SearchConfig) -> Self {
        Self::with_sink(endpoint, board, config, Box::new(FileSink))
    }

    /// Same as [`Coordinator::new`] with an explicit measurement sink.
    pub fn with_sink(
        endpoint: Endpoint,
        board: Rc<RefCell<Board>>,
        config: SearchConfig,
        sink: Box<dyn MeasurementSink>,
    ) -> Self {
        info!("initializing coordinator over {} ranks", endpoint.size());
        let endpoint = Arc::new(endpoint);
        let (request_sender, request_queue) = unbounded();
        let (response_sender, response_queue) = unbounded();

        let reader = endpoint.clone();
        let receive_handle = thread::Builder::new()
            .name("receive".to_string())
            .spawn(move || receive_loop(reader, request_sender, response_sender))
            .expect("failed to spawn the receive thread");

        Coordinator {
            endpoint,
            board,
            engine: SearchEngine::new(config),
            request_queue,
            response_queue,
            receive_handle: Some(receive_handle),
            sink,
            measured: false,
        }
    }

    /// Runs one distributed move for `player`.
    fn distributed_play(&mut self, player: Player) -> usize {
        let board = self.board.borrow().clone();
        let precompute = self.engine.config().precompute_depth;

        let mut tree = self.engine.create_tree(&board, player, precompute);
        let tasks = create_tasks(&tree, precompute);
        let dispatched = tasks.len();
        debug!("frontier holds {} tasks:\n{}", dispatched, tree.render());

        for mut task in tasks {
            let worker = self
                .request_queue
                .recv()
                .expect("receive context terminated while dispatching");
            task.worker = Some(worker);
            debug!("sending task {:?} to {}", task.moves, worker);
            self.endpoint
                .send(worker, &Message::Task(task))
                .expect("worker link closed");
        }

        for _ in 0..dispatched {
            let result = self
                .response_queue
                .recv()
                .expect("receive context terminated while collecting");
            let leaf = self.locate(&tree, &result.moves);
            let node = tree.node_mut(leaf);
            node.score = result.score;
            node.total = result.total;
            node.winner = result.winner;
            node.loser = result.loser;
        }

        self.engine.score_to_depth(&mut tree, player, precompute);
        debug!("scored frontier:\n{}", tree.render());
        self.engine
            .select_move(&tree)
            .expect("frontier has no playable column")
    }

    /// Resolves a result's move path to its frontier leaf. A miss means a
    /// task/result mismatch and is fatal.
    fn locate(&self, tree: &GameTree, moves: &[usize]) -> NodeId {
        match tree.get_move(tree.root(), moves) {
            Some(id) => id,
            None => panic!("result path {:?} does not match a frontier task", moves),
        }
    }

    /// Shuts the group down: one DONE envelope per worker plus one to the
    /// own rank to unblock the receive thread.
    pub fn done(&mut self) {
        for rank in 0..self.endpoint.size() {
            if let Err(err) = self.endpoint.send(rank, &Message::Done) {
                warn!("could not send DONE to {}: {}", rank, err);
            }
        }
        if let Some(handle) = self.receive_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Controller for Coordinator {
    fn next_move(&mut self, player: Player) -> usize {
        // only the first play call per run is timed
        if self.measured {
            return self.distributed_play(player);
        }
        let start = Instant::now();
        let col = self.distributed_play(player);
        let elapsed = start.elapsed().as_millis() as u64;
        self.sink.record(self.endpoint.size(), elapsed);
        self.measured = true;
        col
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        if self.receive_handle.is_some() {
            self.done();
        }
    }
}

/// Receive context: owns the transport read side and demultiplexes by tag
/// until DONE arrives. Any unexpected message aborts the context.
fn receive_loop(
    endpoint: Arc<Endpoint>,
    requests: Sender<Rank>,
    responses: Sender<TaskResult>,
) {
    loop {
        match endpoint.recv() {
            Ok((_, Message::Request(rank))) => {
                debug!("got request from {}", rank);
                if requests.send(rank).is_err() {
                    return;
                }
            }
            Ok((_, Message::Result(result))) => {
                debug!("received result for {:?}", result.moves);
                if responses.send(result).is_err() {
                    return;
                }
            }
            Ok((_, Message::Done)) => {
                debug!("receive context exiting");
                return;
            }
            Ok((source, message)) => {
                error!("protocol error: unexpected {:?} from {}", message, source);
                return;
            }
            Err(err) => {
                error!("receive context failed: {}", err);
                return;
            }
        }
    }
}

/// Enumerates the frontier tasks of a skeleton tree, depth first.
///
/// A node contributes a task iff it is a leaf at the frontier depth or a
/// terminal with no children; subtrees already decided (winner or loser) are
/// pruned, their scores are known locally.
fn create_tasks(tree: &GameTree, frontier_depth: usize) -> Vec<Task> {
    collect_tasks(tree, tree.root(), Vec::new(), 0, frontier_depth)
}

fn collect_tasks(
    tree: &GameTree,
    id: NodeId,
    path: Vec<usize>,
    ply: usize,
    limit: usize,
) -> Vec<Task> {
    let node = tree.node(id);
    if node.winner() || node.loser() {
        return Vec::new();
    }
    if tree.children(id).is_empty() {
        return vec![frontier_task(tree, id, path)];
    }

    let mut result = Vec::new();
    for &child in tree.children(id) {
        let mut child_path = path.clone();
        child_path.push(tree.node(child).mv().expect("non-root nodes carry a move"));
        if ply + 1 < limit {
            result.extend(collect_tasks(tree, child, child_path, ply + 1, limit));
        } else {
            result.push(frontier_task(tree, child, child_path));
        }
    }
    result
}

fn frontier_task(tree: &GameTree, id: NodeId, moves: Vec<usize>) -> Task {
    let node = tree.node(id);
    Task {
        worker: None,
        state: *node
            .state()
            .expect("skeleton nodes keep their board state")
            .grid(),
        moves,
        player: node.player(),
    }
}

use serde::{Deserialize, Serialize};

use crate::board::{Grid, Player};

/// Process identifier inside the group.
pub type Rank = usize;

/// The coordinator always runs as rank 0.
pub const COORDINATOR: Rank = 0;

/// Unit of farmed work: a self-contained frontier position.
///
/// `moves` is the column path from the search root to the position and acts
/// as the task's identity - the matching [`TaskResult`] carries it back
/// verbatim so the coordinator can reintegrate results arriving in any order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Rank the task was assigned to, filled in at dispatch time.
    pub worker: Option<Rank>,
    /// Board state at the frontier position.
    pub state: Grid,
    pub moves: Vec<usize>,
    /// Side that just moved to reach the position.
    pub player: Player,
}

/// Aggregated outcome of the deep search below one frontier position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub score: i64,
    pub total: i64,
    pub winner: bool,
    pub loser: bool,
    /// Identity of the task this result answers.
    pub moves: Vec<usize>,
}

/// Logical message taxonomy of the group transport.
///
/// Anything that does not decode into one of these variants is a protocol
/// error and aborts the receiving context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Message {
    /// Worker to coordinator: the sender is idle and wants a task.
    Request(Rank),
    /// Coordinator to worker: search this position.
    Task(Task),
    /// Worker to coordinator: finished a task.
    Result(TaskResult),
    /// Coordinator to everyone, itself included: shut down.
    Done,
}

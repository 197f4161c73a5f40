use std::collections::HashMap;

use crate::board::{Board, MoveStatus, Player};

/// Index of a node inside a [`GameTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A single position in the search tree.
///
/// `player` is the side that just moved to reach this position; the root
/// carries the opponent of the side the tree is evaluated for, so that root
/// children are that side's moves. `score` and `total` aggregate the subtree
/// as a running numerator and denominator - the ranking key is their ratio.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub(crate) mv: Option<usize>,
    pub(crate) player: Player,
    pub(crate) state: Option<Board>,
    pub(crate) status: Option<MoveStatus>,
    pub(crate) score: i64,
    pub(crate) total: i64,
    pub(crate) winner: bool,
    pub(crate) loser: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    child_by_move: HashMap<usize, NodeId>,
}

impl TreeNode {
    /// Creates a root node. `player` is the side that is *not* on turn.
    pub fn root(player: Player, state: Option<Board>) -> Self {
        TreeNode {
            mv: None,
            player,
            state,
            status: None,
            score: 0,
            total: 0,
            winner: false,
            loser: false,
            parent: None,
            children: Vec::new(),
            child_by_move: HashMap::new(),
        }
    }

    /// Creates a non-root node reached by playing `mv`.
    pub fn new(mv: usize, player: Player, status: MoveStatus, state: Option<Board>) -> Self {
        TreeNode {
            mv: Some(mv),
            status: Some(status),
            ..TreeNode::root(player, state)
        }
    }

    // GETTERS

    /// Column played to arrive at this node, `None` at the root.
    pub fn mv(&self) -> Option<usize> {
        self.mv
    }

    /// Side that just moved to reach this node.
    pub fn player(&self) -> Player {
        self.player
    }

    /// Status of the move that created this node.
    pub fn status(&self) -> Option<MoveStatus> {
        self.status
    }

    /// Board state after the move, where it is kept.
    pub fn state(&self) -> Option<&Board> {
        self.state.as_ref()
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    /// True when this subtree is a forced win for the evaluated side.
    pub fn winner(&self) -> bool {
        self.winner
    }

    /// True when this subtree is a forced loss for the evaluated side.
    pub fn loser(&self) -> bool {
        self.loser
    }
}

/// Arena-backed game tree.
///
/// Nodes refer to each other through integer ids; every node keeps its
/// children both in insertion order and keyed by the move that leads to them,
/// so positions can be addressed by their move path from the root.
#[derive(Debug, Clone)]
pub struct GameTree {
    nodes: Vec<TreeNode>,
}

impl GameTree {
    /// Creates a tree holding only `root`.
    pub fn new(root: TreeNode) -> Self {
        GameTree { nodes: vec![root] }
    }

    /// Id of the root node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Immutable access to a node.
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    /// Mutable access to a node.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ordered children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Parent of a node, `None` at the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Appends `node` under `parent` and indexes it by its move.
    ///
    /// # Returns
    /// The id of the inserted node.
    ///
    /// # Panics
    /// If `node` carries no move - only the root may omit one.
    pub fn add(&mut self, parent: NodeId, mut node: TreeNode) -> NodeId {
        let mv = node.mv.expect("non-root nodes carry the move that led to them");
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(node);
        let entry = &mut self.nodes[parent.0];
        entry.children.push(id);
        entry.child_by_move.insert(mv, id);
        id
    }

    /// Follows a move path hop by hop from `from`.
    ///
    /// # Returns
    /// The node at the end of the path, or `None` if any hop is missing.
    pub fn get_move(&self, from: NodeId, moves: &[usize]) -> Option<NodeId> {
        let mut current = from;
        for mv in moves {
            current = *self.nodes[current.0].child_by_move.get(mv)?;
        }
        Some(current)
    }

    /// Move sequence from the root to `id`; the root's own move is excluded.
    pub fn chain(&self, id: NodeId) -> Vec<usize> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(parent) = self.nodes[current.0].parent {
            result.push(
                self.nodes[current.0]
                    .mv
                    .expect("non-root nodes carry a move"),
            );
            current = parent;
        }
        result.reverse();
        result
    }

    /// Indented dump of the whole tree, one node per line.
    pub fn render(&self) -> String {
        self.render_from(self.root(), 0)
    }

    fn render_from(&self, id: NodeId, depth: usize) -> String {
        let node = &self.nodes[id.0];
        let mut result = format!(
            "{}Node score {} total {} move {:?} winner {} loser {} player {} chain {:?}\n",
            "\t".repeat(depth),
            node.score,
            node.total,
            node.mv,
            node.winner,
            node.loser,
            node.player,
            self.chain(id),
        );
        for &child in &node.children {
            result += &self.render_from(child, depth + 1);
        }
        result
    }
}

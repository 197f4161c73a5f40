use crate::board::{Board, MoveStatus, Player};

use super::config::SearchConfig;
use super::tree::{GameTree, NodeId, TreeNode};

/// Ranking value of a `(score, total)` pair.
pub fn score_ratio(score: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        score as f64 / total as f64
    }
}

/// Bounded-depth adversarial search over the drop-token game.
///
/// The engine builds trees whose root `player` is the opponent of the side
/// being evaluated, so root children are that side's legal moves. Scoring
/// sums raw child scores into `(score, total)` pairs and ranks children by
/// their ratio; winner/loser flags propagate forced outcomes bottom-up.
pub struct SearchEngine {
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        SearchEngine { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Builds a tree skeleton of the given depth without scoring internal
    /// nodes.
    ///
    /// Every node keeps the board state it represents, so the skeleton's
    /// leaves can be shipped elsewhere as self-contained positions. A node
    /// whose move wins is a leaf: it is marked winner or loser together with
    /// its parent and its subtree is not expanded.
    ///
    /// # Arguments
    /// * `board` - Position at the root.
    /// * `me` - The side the tree is evaluated for, on turn at the root.
    /// * `depth` - Number of plies to expand.
    pub fn create_tree(&self, board: &Board, me: Player, depth: usize) -> GameTree {
        let mut tree = GameTree::new(TreeNode::root(-me, Some(board.clone())));
        let root = tree.root();
        self.expand_skeleton(&mut tree, root, board, me, 0, depth);
        tree
    }

    fn expand_skeleton(
        &self,
        tree: &mut GameTree,
        id: NodeId,
        board: &Board,
        me: Player,
        ply: usize,
        limit: usize,
    ) {
        let player = -tree.node(id).player();
        for col in board.valid_moves() {
            let mut next = board.clone();
            let status = next.play(col, player);
            let cid = tree.add(id, TreeNode::new(col, player, status, Some(next.clone())));
            if status == MoveStatus::Win {
                self.mark_decided(tree, cid, player == me);
                continue;
            }
            if ply + 1 < limit {
                self.expand_skeleton(tree, cid, &next, me, ply + 1, limit);
            }
        }
    }

    /// Flags a directly decided node and its parent.
    fn mark_decided(&self, tree: &mut GameTree, id: NodeId, my_win: bool) {
        let parent = tree.parent(id);
        if my_win {
            tree.node_mut(id).winner = true;
            if let Some(pid) = parent {
                tree.node_mut(pid).winner = true;
            }
        } else {
            tree.node_mut(id).loser = true;
            if let Some(pid) = parent {
                tree.node_mut(pid).loser = true;
            }
        }
    }

    /// Scores a tree to the configured full depth.
    pub fn score_tree(&self, tree: &mut GameTree, me: Player) {
        self.score_to_depth(tree, me, self.config.max_depth);
    }

    /// Scores a tree bottom-up, expanding missing children down to
    /// `max_depth` plies.
    ///
    /// Where children already exist the walk recurses into them instead of
    /// expanding, and it never descends into a node whose decided result was
    /// already aggregated (winner or loser with a non-empty total). Nodes
    /// merely flagged during skeleton construction still get their subtree
    /// summed, so a branch lost to a direct win ranks below every quiet
    /// branch. Calling this with `max_depth` equal to the depth of a
    /// precomputed skeleton therefore re-aggregates internal nodes around
    /// scores injected at the leaves without growing the tree.
    pub fn score_to_depth(&self, tree: &mut GameTree, me: Player, max_depth: usize) {
        let root = tree.root();
        let board = tree
            .node(root)
            .state()
            .cloned()
            .expect("the root node keeps its board state");
        self.score_node(tree, root, &board, me, 0, max_depth);
    }

    fn score_node(
        &self,
        tree: &mut GameTree,
        id: NodeId,
        board: &Board,
        me: Player,
        ply: usize,
        max_depth: usize,
    ) {
        if tree.node(id).status() == Some(MoveStatus::Win) {
            self.score_win_leaf(tree, id, board, me);
            return;
        }
        // a node carrying an aggregated decided result (a reintegrated
        // worker answer) is kept as-is; a bare winner/loser flag from
        // skeleton construction still needs its subtree summed
        if ply > 0
            && tree.node(id).total() != 0
            && (tree.node(id).winner() || tree.node(id).loser())
        {
            return;
        }
        if ply >= max_depth {
            return;
        }

        if tree.children(id).is_empty() {
            let player = -tree.node(id).player();
            for col in board.valid_moves() {
                let mut next = board.clone();
                let status = next.play(col, player);
                let cid = tree.add(id, TreeNode::new(col, player, status, None));
                self.score_node(tree, cid, &next, me, ply + 1, max_depth);
            }
        } else {
            let children: Vec<NodeId> = tree.children(id).to_vec();
            for cid in children {
                let next = match tree.node(cid).state() {
                    Some(state) => state.clone(),
                    None => {
                        let mut next = board.clone();
                        next.play(
                            tree.node(cid).mv().expect("non-root nodes carry a move"),
                            tree.node(cid).player(),
                        );
                        next
                    }
                };
                self.score_node(tree, cid, &next, me, ply + 1, max_depth);
            }
        }

        let mut score = 0;
        let mut total = 0;
        let mut all_winners = true;
        let mut all_losers = true;
        for &cid in tree.children(id) {
            let child = tree.node(cid);
            score += child.score();
            total += child.total();
            all_winners &= child.winner();
            all_losers &= child.loser();
        }
        let has_children = !tree.children(id).is_empty();
        let node = tree.node_mut(id);
        node.score = score;
        node.total = total;
        node.winner |= has_children && all_winners;
        node.loser |= has_children && all_losers;
    }

    /// Scores a winning leaf and flags it and its parent.
    ///
    /// The magnitude is the number of legal moves remaining on the resulting
    /// board, biasing the engine toward wins that leave many continuations
    /// and losses that require many follow-ups.
    fn score_win_leaf(&self, tree: &mut GameTree, id: NodeId, board: &Board, me: Player) {
        let remaining = board.valid_moves().len() as i64;
        let my_win = tree.node(id).player() == me;
        self.mark_decided(tree, id, my_win);
        let node = tree.node_mut(id);
        node.score = if my_win { remaining } else { -remaining };
        node.total = remaining;
    }

    /// Builds and scores a fresh tree for `me` over `board`.
    ///
    /// # Returns
    /// The scored tree; the root carries the aggregated result of the whole
    /// search.
    pub fn compute(&self, board: &Board, me: Player, max_depth: usize) -> GameTree {
        let mut tree = GameTree::new(TreeNode::root(-me, Some(board.clone())));
        self.score_to_depth(&mut tree, me, max_depth);
        tree
    }

    /// Picks the best root child by score ratio.
    ///
    /// Children tie-break by insertion order, which follows the ascending
    /// column order of `valid_moves`.
    ///
    /// # Returns
    /// The winning column, or `None` when the root has no children.
    pub fn select_move(&self, tree: &GameTree) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &cid in tree.children(tree.root()) {
            let child = tree.node(cid);
            let ratio = score_ratio(child.score(), child.total());
            if best.is_none() || ratio > best.unwrap().1 {
                best = Some((child.mv().expect("root children carry a move"), ratio));
            }
        }
        best.map(|(col, _)| col)
    }

    /// Full local search: build, score and pick a column.
    pub fn play(&self, board: &Board, me: Player) -> Option<usize> {
        let tree = self.compute(board, me, self.config.max_depth);
        self.select_move(&tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{PLAYER_1, PLAYER_2, WIDTH};
    use crate::search::SearchConfigBuilder;

    fn engine(max_depth: usize) -> SearchEngine {
        SearchEngine::new(
            SearchConfigBuilder::default()
                .max_depth(max_depth)
                .build()
                .unwrap(),
        )
    }

    /// Board where `me` has three at the bottom of columns 0..=2 and wins by
    /// playing column 3.
    fn board_with_open_three(me: Player) -> Board {
        let mut board = Board::new();
        for col in 0..3 {
            board.play(col, me);
            board.play(col, -me);
        }
        board
    }

    #[test]
    fn skeleton_shape_on_empty_board() {
        let tree = engine(6).create_tree(&Board::new(), PLAYER_1, 2);

        let root = tree.root();
        assert_eq!(tree.node(root).player(), PLAYER_2);
        assert_eq!(tree.children(root).len(), WIDTH);
        let mut leaves = 0;
        for &cid in tree.children(root) {
            assert_eq!(tree.node(cid).player(), PLAYER_1);
            assert_eq!(tree.children(cid).len(), WIDTH);
            for &gid in tree.children(cid) {
                assert_eq!(tree.node(gid).player(), PLAYER_2);
                assert!(tree.children(gid).is_empty());
                assert!(tree.node(gid).state().is_some());
                leaves += 1;
            }
        }
        assert_eq!(leaves, WIDTH * WIDTH);
        assert!(!tree.node(root).winner());
    }

    #[test]
    fn skeleton_alternates_players() {
        let tree = engine(6).create_tree(&Board::new(), PLAYER_1, 3);
        let mut stack = vec![tree.root()];
        while let Some(id) = stack.pop() {
            for &cid in tree.children(id) {
                assert_eq!(tree.node(cid).player(), -tree.node(id).player());
                stack.push(cid);
            }
        }
    }

    #[test]
    fn winning_leaf_is_not_expanded_and_marks_parent() {
        let board = board_with_open_three(PLAYER_1);
        let tree = engine(6).create_tree(&board, PLAYER_1, 2);

        let root = tree.root();
        let win = tree.get_move(root, &[3]).unwrap();
        assert_eq!(tree.node(win).status(), Some(MoveStatus::Win));
        assert!(tree.node(win).winner());
        assert!(tree.children(win).is_empty());
        assert!(tree.node(root).winner());

        // the other columns expanded normally
        let other = tree.get_move(root, &[0]).unwrap();
        assert!(!tree.children(other).is_empty());
    }

    #[test]
    fn win_leaf_scores_remaining_moves() {
        let board = board_with_open_three(PLAYER_1);
        let tree = engine(2).compute(&board, PLAYER_1, 2);

        let root = tree.root();
        let win = tree.get_move(root, &[3]).unwrap();
        // no column is full after the winning drop: all seven remain open
        assert_eq!(tree.node(win).score(), 7);
        assert_eq!(tree.node(win).total(), 7);
        assert!(tree.node(win).winner());

        // quiet siblings contribute nothing
        let quiet = tree.get_move(root, &[4]).unwrap();
        assert_eq!(tree.node(quiet).score(), 0);
        assert_eq!(tree.node(quiet).total(), 0);

        // the root sums raw child scores
        assert_eq!(tree.node(root).score(), 7);
        assert_eq!(tree.node(root).total(), 7);
        assert!(tree.node(root).winner());
    }

    #[test]
    fn engine_blocks_immediate_threat() {
        // opponent owns the bottom of columns 0..=2; 3 is the only block
        let mut board = Board::new();
        for col in 0..3 {
            board.play(col, PLAYER_2);
        }
        board.play(4, PLAYER_1);
        board.play(5, PLAYER_1);

        let engine = engine(2);
        assert_eq!(engine.play(&board, PLAYER_1), Some(3));

        let tree = engine.compute(&board, PLAYER_1, 2);
        let losing = tree.get_move(tree.root(), &[0]).unwrap();
        assert!(tree.node(losing).loser());
        assert!(tree.node(losing).score() < 0);
    }

    #[test]
    fn internal_nodes_sum_raw_child_scores() {
        let mut tree = GameTree::new(TreeNode::root(PLAYER_2, Some(Board::new())));
        let root = tree.root();
        let a = tree.add(root, TreeNode::new(0, PLAYER_1, MoveStatus::Valid, None));
        let b = tree.add(root, TreeNode::new(1, PLAYER_1, MoveStatus::Valid, None));
        tree.node_mut(a).score = 2;
        tree.node_mut(a).total = 4;
        tree.node_mut(b).score = 3;
        tree.node_mut(b).total = 3;

        let engine = engine(6);
        engine.score_to_depth(&mut tree, PLAYER_1, 1);

        // 2/4 + 3/3 summed raw, not averaged: (5, 7)
        assert_eq!(tree.node(root).score(), 5);
        assert_eq!(tree.node(root).total(), 7);
        // ratio 1.0 beats 0.5
        assert_eq!(engine.select_move(&tree), Some(1));
    }

    #[test]
    fn injected_results_are_not_descended_into() {
        let mut tree = GameTree::new(TreeNode::root(PLAYER_2, Some(Board::new())));
        let root = tree.root();
        let a = tree.add(root, TreeNode::new(0, PLAYER_1, MoveStatus::Valid, None));
        let b = tree.add(root, TreeNode::new(1, PLAYER_1, MoveStatus::Valid, None));
        tree.node_mut(a).winner = true;
        tree.node_mut(a).score = 10;
        tree.node_mut(a).total = 10;
        tree.node_mut(b).loser = true;
        tree.node_mut(b).score = -6;
        tree.node_mut(b).total = 6;
        let size_before = tree.len();

        let engine = engine(6);
        engine.score_to_depth(&mut tree, PLAYER_1, 1);

        assert_eq!(tree.len(), size_before);
        assert_eq!(tree.node(a).score(), 10);
        assert_eq!(tree.node(b).score(), -6);
        assert_eq!(tree.node(root).score(), 4);
        assert_eq!(tree.node(root).total(), 16);
        assert_eq!(engine.select_move(&tree), Some(0));
    }

    #[test]
    fn flagged_skeleton_nodes_are_still_summed() {
        // opponent owns the bottom of columns 0..=2: skeleton construction
        // flags every non-blocking branch as lost before any score exists
        let mut board = Board::new();
        for col in 0..3 {
            board.play(col, PLAYER_2);
        }
        let engine = engine(6);
        let mut tree = engine.create_tree(&board, PLAYER_1, 2);
        engine.score_to_depth(&mut tree, PLAYER_1, 2);

        // the flagged branch aggregated its direct-loss leaf: ratio -1.0,
        // not the neutral 0.0 of an unscored node
        let losing = tree.get_move(tree.root(), &[0]).unwrap();
        assert!(tree.node(losing).loser());
        assert_eq!(tree.node(losing).score(), -7);
        assert_eq!(tree.node(losing).total(), 7);

        // the block is the only branch not ranked at -1.0
        assert_eq!(engine.select_move(&tree), Some(3));
    }

    #[test]
    fn winner_propagates_when_all_children_win() {
        let mut tree = GameTree::new(TreeNode::root(PLAYER_2, Some(Board::new())));
        let root = tree.root();
        for col in 0..3 {
            let id = tree.add(root, TreeNode::new(col, PLAYER_1, MoveStatus::Valid, None));
            tree.node_mut(id).winner = true;
            tree.node_mut(id).score = 1;
            tree.node_mut(id).total = 1;
        }

        engine(6).score_to_depth(&mut tree, PLAYER_1, 1);
        assert!(tree.node(root).winner());
        assert!(!tree.node(root).loser());
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let mut tree = GameTree::new(TreeNode::root(PLAYER_2, Some(Board::new())));
        let root = tree.root();
        for col in [2, 5, 6] {
            let id = tree.add(root, TreeNode::new(col, PLAYER_1, MoveStatus::Valid, None));
            tree.node_mut(id).score = 3;
            tree.node_mut(id).total = 6;
        }
        assert_eq!(engine(6).select_move(&tree), Some(2));
    }

    #[test]
    fn select_move_on_childless_root_is_none() {
        let tree = GameTree::new(TreeNode::root(PLAYER_2, Some(Board::new())));
        assert_eq!(engine(6).select_move(&tree), None);
    }

    #[test]
    fn score_ratio_handles_empty_total() {
        assert_eq!(score_ratio(0, 0), 0.0);
        assert_eq!(score_ratio(3, 6), 0.5);
        assert_eq!(score_ratio(-7, 7), -1.0);
    }
}

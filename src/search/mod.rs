pub mod config;
pub mod engine;
pub mod tree;

pub use {
    config::{SearchConfig, SearchConfigBuilder},
    engine::{score_ratio, SearchEngine},
    tree::{GameTree, NodeId, TreeNode},
};

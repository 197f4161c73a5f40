use derive_builder::Builder;

/// Depth configuration for the search engine.
#[derive(Builder, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Full search depth in plies - the AI difficulty.
    #[builder(default = "6")]
    pub max_depth: usize,

    /// Depth of the locally precomputed frontier whose leaves are handed off
    /// to workers. Must not exceed `max_depth`.
    #[builder(default = "2")]
    pub precompute_depth: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfigBuilder::default()
            .build()
            .expect("all fields have defaults")
    }
}

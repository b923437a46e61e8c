use serde::{Deserialize, Serialize};

/// Score gained by clearing `batch_size` cells at chain index `chain`.
///
/// `batch_size² × chain⁴`, saturating.
///
/// # Example
///
/// ```
/// use tilecrush_engine::score_delta;
///
/// assert_eq!(score_delta(3, 1), 9);
/// assert_eq!(score_delta(3, 2), 144);
/// ```
#[must_use]
pub fn score_delta(batch_size: usize, chain: u32) -> u64 {
    let size = u64::try_from(batch_size).unwrap_or(u64::MAX);
    size.saturating_pow(2)
        .saturating_mul(u64::from(chain).saturating_pow(4))
}

/// Chain index of the cascade in progress.
///
/// Starts at 1, goes up by one after every removal batch and drops back to 1
/// once the board is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainState(u32);

impl Default for ChainState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainState {
    #[must_use]
    pub const fn new() -> Self {
        Self(1)
    }

    #[must_use]
    pub const fn current(self) -> u32 {
        self.0
    }

    pub const fn advance(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    pub const fn reset(&mut self) {
        self.0 = 1;
    }
}

/// Running total score. Only [`reset`](Self::reset) ever lowers it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    total: u64,
}

impl ScoreState {
    #[must_use]
    pub const fn new() -> Self {
        Self { total: 0 }
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    pub const fn add(&mut self, delta: u64) {
        self.total = self.total.saturating_add(delta);
    }

    /// Zeroes the score when a new game starts.
    pub const fn reset(&mut self) {
        self.total = 0;
    }
}

/// Session statistics.
///
/// - **Swaps**: accepted and reverted player swaps
/// - **Batches**: removal batches over all cascades
/// - **Pieces cleared**: cells actually emptied by removals
/// - **Specials created**: promotions and mixes
/// - **Longest chain**: highest chain index reached by a batch
///
/// # Example
///
/// ```
/// use tilecrush_engine::SessionStats;
///
/// let mut stats = SessionStats::new();
/// stats.record_batch(3, 2);
/// stats.record_batch(5, 3);
///
/// assert_eq!(stats.batches(), 2);
/// assert_eq!(stats.pieces_cleared(), 8);
/// assert_eq!(stats.longest_chain(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    accepted_swaps: usize,
    reverted_swaps: usize,
    batches: usize,
    pieces_cleared: usize,
    specials_created: usize,
    longest_chain: u32,
}

impl SessionStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            accepted_swaps: 0,
            reverted_swaps: 0,
            batches: 0,
            pieces_cleared: 0,
            specials_created: 0,
            longest_chain: 0,
        }
    }

    #[must_use]
    pub const fn accepted_swaps(&self) -> usize {
        self.accepted_swaps
    }

    #[must_use]
    pub const fn reverted_swaps(&self) -> usize {
        self.reverted_swaps
    }

    #[must_use]
    pub const fn batches(&self) -> usize {
        self.batches
    }

    #[must_use]
    pub const fn pieces_cleared(&self) -> usize {
        self.pieces_cleared
    }

    #[must_use]
    pub const fn specials_created(&self) -> usize {
        self.specials_created
    }

    #[must_use]
    pub const fn longest_chain(&self) -> u32 {
        self.longest_chain
    }

    pub const fn record_swap(&mut self, accepted: bool) {
        if accepted {
            self.accepted_swaps += 1;
        } else {
            self.reverted_swaps += 1;
        }
    }

    pub const fn record_specials(&mut self, count: usize) {
        self.specials_created += count;
    }

    /// Updates statistics after a removal batch of `cleared` cells at chain
    /// index `chain`.
    pub const fn record_batch(&mut self, cleared: usize, chain: u32) {
        self.batches += 1;
        self.pieces_cleared += cleared;
        if chain > self.longest_chain {
            self.longest_chain = chain;
        }
    }
}

//! Initialized-tick bookkeeping for concentrated-liquidity pools.

/// One initialized tick from a pool snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickRecord {
    pub index: i32,
    /// Liquidity added when the price crosses this tick left to right.
    pub liquidity_net: i128,
    /// Total liquidity referencing this tick; zero means uninitialized.
    pub liquidity_gross: u128,
}

/// Sorted view over the initialized ticks of one pool.
///
/// Snapshots carry only the initialized ticks, so lookups for anything else
/// answer with an empty record; a swap crossing such a tick changes nothing.
#[derive(Clone, Debug, Default)]
pub struct TickTable {
    ticks: Vec<TickRecord>,
}

impl TickTable {
    pub fn new(mut ticks: Vec<TickRecord>) -> Self {
        ticks.sort_by_key(|t| t.index);
        ticks.dedup_by_key(|t| t.index);
        Self { ticks }
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn get(&self, index: i32) -> Option<&TickRecord> {
        self.ticks
            .binary_search_by_key(&index, |t| t.index)
            .ok()
            .map(|i| &self.ticks[i])
    }

    /// Net liquidity change when crossing `index` left to right; zero for
    /// uninitialized ticks.
    pub fn liquidity_net(&self, index: i32) -> i128 {
        self.get(index).map_or(0, |t| t.liquidity_net)
    }

    /// Next initialized tick from `from`, in the given direction.
    ///
    /// Searching left (`lte`) includes `from` itself: a swap standing exactly
    /// on an initialized tick must not skip its liquidity transition.
    /// Searching right is strict, matching how tick crossings hand the price
    /// over at range boundaries.
    pub fn next_initialized_tick(&self, from: i32, lte: bool) -> Option<&TickRecord> {
        if lte {
            let idx = self.ticks.partition_point(|t| t.index <= from);
            idx.checked_sub(1).map(|i| &self.ticks[i])
        } else {
            let idx = self.ticks.partition_point(|t| t.index <= from);
            self.ticks.get(idx)
        }
    }
}

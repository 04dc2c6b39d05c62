//! LFU Selection Module
//!
//! Picks eviction victims by ascending hit count for the sweeper's budget pass.

use crate::cache::CacheEntry;

/// Share of live entries removed by one budget pass.
pub const EVICTION_FRACTION: f64 = 0.1;

// == Eviction Count ==
/// Number of entries one budget pass removes: `ceil(10% of len)`.
pub fn eviction_count(len: usize) -> usize {
    (len as f64 * EVICTION_FRACTION).ceil() as usize
}

// == Select Least Used ==
/// Returns the keys of the `count` least frequently used entries.
///
/// Ordering is by ascending `hit_count`; ties fall back to write order
/// (older writes first), so the result is reproducible for a given history.
pub fn select_least_used<'a, T: 'a, I>(entries: I, count: usize) -> Vec<String>
where
    I: IntoIterator<Item = (&'a String, &'a CacheEntry<T>)>,
{
    let mut ranked: Vec<(u64, u64, &String)> = entries
        .into_iter()
        .map(|(key, entry)| (entry.hit_count, entry.seq, key))
        .collect();

    ranked.sort_unstable_by_key(|(hits, seq, _)| (*hits, *seq));

    ranked
        .into_iter()
        .take(count)
        .map(|(_, _, key)| key.clone())
        .collect()
}

// Library root: best ball roster analysis.
//
// Raw rosters, the ADP table and the draftables table come in through a
// `DataSource`, get joined by the enricher, and feed the stack, association
// and exposure analyzers. The filter and search modules turn the analyses
// into view-ready lists.

pub mod adp;
pub mod associations;
pub mod draftables;
pub mod enrich;
pub mod exposure;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod repository;
pub mod rosters;
pub mod search;
pub mod source;
pub mod stacks;

#[cfg(test)]
pub(crate) mod testing;

/// Average ADP reported for stacks, associations and exposures when none of
/// the players involved carries a usable ADP. Sorts such entries last when
/// ordering by ADP ascending.
pub const NO_ADP_SENTINEL: f64 = 999.0;

/// `count / total * 100`, or 0 when `total` is 0.
pub(crate) fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

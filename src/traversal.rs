//! Bottom-up lcp-interval reconstruction (spec component 4.H).
//!
//! Walks the suffix array and LCP table once, left to right, maintaining an
//! explicit stack of currently-open lcp-intervals and emitting a leaf-edge or
//! branching-edge callback for every edge of the implicit interval tree.
//!
//! Ported line-for-line from `original_source/bottom_up_traversal.hpp`'s
//! `bottomup_generic`: the `BottomUpTraversalStack` becomes a plain `Vec`
//! push/pop, the `StateType*` + raw function pointer callbacks become two
//! `FnMut` closures, and `last_interval`/`first_edge_from_root` bookkeeping
//! is carried over unchanged.

/// One suffix's `(seqnum, relpos)` coordinates, as produced by
/// [`crate::suftab_view`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqnumRelpos {
    pub seqnum: u32,
    pub relpos: u32,
}

/// An lcp-interval: the range `SA[lb..=rb]` of suffixes sharing a common
/// prefix of length `lcp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub lcp: usize,
    pub lb: usize,
    pub rb: usize,
}

struct StackEntry {
    lcp: usize,
    lb: usize,
    rb: usize,
}

/// Runs the bottom-up traversal over `nonspecial_suffixes` entries of the
/// suffix array (the entries preceding any wildcard/padding-only suffix),
/// reading each suffix's `(seqnum, relpos)` via `suftab_at` and its LCP value
/// via `lcp_at` (read as `LCP[i + 1]`, the value *following* suffix `i`).
///
/// `on_leaf_edge(first_edge, interval, seqnum, relpos, last_child)` fires
/// for every suffix that is a direct leaf child of the interval on top of
/// the stack. `on_branching_edge(first_edge, parent, child, last_child)`
/// fires once an interval is completed and linked into its parent.
pub fn bottom_up_traversal<F, L>(
    nonspecial_suffixes: usize,
    mut suftab_at: F,
    mut lcp_at: L,
    mut on_leaf_edge: impl FnMut(bool, &Interval, SeqnumRelpos, bool),
    mut on_branching_edge: impl FnMut(bool, &Interval, &Interval, bool),
) where
    F: FnMut(usize) -> SeqnumRelpos,
    L: FnMut(usize) -> usize,
{
    if nonspecial_suffixes == 0 {
        return;
    }

    let mut stack: Vec<StackEntry> = vec![StackEntry { lcp: 0, lb: 0, rb: 0 }];
    let mut last_interval: Option<Interval> = None;
    let mut first_edge_from_root = true;

    for interval_bound in 0..nonspecial_suffixes {
        let lcpvalue = lcp_at(interval_bound + 1);
        let seqnum_relpos = suftab_at(interval_bound);

        debug_assert!(!stack.is_empty());
        let top_lcp = stack.last().unwrap().lcp;
        if lcpvalue <= top_lcp {
            let last_child = lcpvalue < top_lcp;
            let first_edge = top_lcp == 0 && first_edge_from_root;
            if first_edge {
                first_edge_from_root = false;
            }
            let top = stack.last().unwrap();
            let top_interval = Interval { lcp: top.lcp, lb: top.lb, rb: top.rb };
            on_leaf_edge(first_edge, &top_interval, seqnum_relpos, last_child);
        }

        debug_assert!(last_interval.is_none());
        while lcpvalue < stack.last().unwrap().lcp {
            let mut popped = stack.pop().unwrap();
            popped.rb = interval_bound;
            let popped_interval = Interval { lcp: popped.lcp, lb: popped.lb, rb: popped.rb };
            last_interval = Some(popped_interval);

            let top_lcp = stack.last().unwrap().lcp;
            if lcpvalue <= top_lcp {
                let last_child = lcpvalue < top_lcp;
                let first_edge = top_lcp == 0 && first_edge_from_root;
                if first_edge {
                    first_edge_from_root = false;
                }
                let top = stack.last().unwrap();
                let top_interval = Interval { lcp: top.lcp, lb: top.lb, rb: top.rb };
                on_branching_edge(first_edge, &top_interval, &popped_interval, last_child);
                last_interval = None;
            }
        }

        let top_lcp = stack.last().unwrap().lcp;
        if lcpvalue > top_lcp {
            if let Some(popped_interval) = last_interval.take() {
                stack.push(StackEntry {
                    lcp: lcpvalue,
                    lb: popped_interval.lb,
                    rb: 0,
                });
                let new_top = stack.last().unwrap();
                let new_top_interval = Interval { lcp: new_top.lcp, lb: new_top.lb, rb: new_top.rb };
                on_branching_edge(true, &new_top_interval, &popped_interval, false);
            } else {
                stack.push(StackEntry {
                    lcp: lcpvalue,
                    lb: interval_bound,
                    rb: 0,
                });
                let new_top = stack.last().unwrap();
                let new_top_interval = Interval { lcp: new_top.lcp, lb: new_top.lb, rb: new_top.rb };
                on_leaf_edge(true, &new_top_interval, seqnum_relpos, false);
            }
        }
    }

    debug_assert_eq!(stack.last().unwrap().lcp, 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    // DNA "ACGTACGT": SA = [4,0,5,1,6,2,7,3,8], LCP = [0,4,0,3,0,2,0,1,0].
    // All 8 real suffixes belong to a single sequence (seqnum 0).
    const SA: [u32; 9] = [4, 0, 5, 1, 6, 2, 7, 3, 8];
    const LCP: [u32; 9] = [0, 4, 0, 3, 0, 2, 0, 1, 0];

    fn run_and_collect() -> (Vec<(bool, Interval, SeqnumRelpos, bool)>, Vec<(bool, Interval, Interval, bool)>) {
        let mut leaves = Vec::new();
        let mut branches = Vec::new();
        bottom_up_traversal::<_, _>(
            8,
            |i| SeqnumRelpos { seqnum: 0, relpos: SA[i] },
            |i| LCP[i] as usize,
            |first, interval, sr, last| leaves.push((first, *interval, sr, last)),
            |first, parent, child, last| branches.push((first, *parent, *child, last)),
        );
        (leaves, branches)
    }

    #[test]
    fn every_leaf_is_visited_exactly_once() {
        let (leaves, _) = run_and_collect();
        assert_eq!(leaves.len(), 8);
        let mut relpos: Vec<u32> = leaves.iter().map(|(_, _, sr, _)| sr.relpos).collect();
        relpos.sort_unstable();
        assert_eq!(relpos, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn total_edges_below_2t() {
        let (leaves, branches) = run_and_collect();
        assert!(leaves.len() + branches.len() < 2 * 8);
    }

    #[test]
    fn branching_intervals_match_known_internal_nodes() {
        // "ACGTACGT"'s only repeated substrings are the length 1-3 prefixes
        // of "ACGT", so every branching interval's lcp is in [1, 3].
        let (_, branches) = run_and_collect();
        let mut parent_lcps: Vec<usize> = branches.iter().map(|(_, parent, _, _)| parent.lcp).collect();
        parent_lcps.sort_unstable();
        parent_lcps.dedup();
        assert!(parent_lcps.iter().all(|&lcp| lcp <= 3));
    }

    #[test]
    fn single_suffix_has_no_edges() {
        let mut leaves = 0;
        let mut branches = 0;
        bottom_up_traversal::<_, _>(
            1,
            |_| SeqnumRelpos { seqnum: 0, relpos: 0 },
            |_| 0,
            |_, _, _, _| leaves += 1,
            |_, _, _, _| branches += 1,
        );
        assert_eq!(leaves, 1);
        assert_eq!(branches, 0);
    }
}

//! Sorted match list and local colinear chaining (spec component 4.K).
//!
//! Seeds found by the minimizer/k-mer pipeline are extended bidirectionally
//! into maximal exact matches, packed into order-preserving records, sorted
//! and deduplicated, then segmented by `(ref_seqnum, query_seqnum)` and fed
//! to a bounded-lookback colinear chaining DP run in both directions.
//!
//! Grounded on `original_source/sorted_match_list.hpp` (seed record layout,
//! dedup-after-sort, per-segment boundaries) and `local_chainer.hpp`
//! (`LocalChainElemInfo`/`LocalChainer`: the `max_previous` lookback DP, the
//! `diff <= 100 || diff / max(ref_gap, query_gap) <= 0.3` pruning guard, the
//! forward/backward total-score comparison, and the referenced/chain-ends
//! bookkeeping used to recover every non-overlapping chain in a segment, not
//! just the single best one).

use crate::error::Result;
use crate::packed_record::RecordLayout;
use crate::radix_sort::radix_sort_records;

/// A maximal exact match between two sequences, before packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mem {
    pub ref_seqnum: u32,
    pub query_seqnum: u32,
    pub ref_endpos: u32,
    pub query_endpos: u32,
    pub length: u32,
}

impl Mem {
    #[inline]
    pub fn ref_startpos(&self) -> u32 {
        self.ref_endpos - self.length
    }

    #[inline]
    pub fn query_startpos(&self) -> u32 {
        self.query_endpos - self.length
    }
}

/// Extends a seed match of `k` ranks anchored at `ref_ranks[ref_pos..]` /
/// `query_ranks[query_pos..]` left and right by exact-match positions, and
/// returns the maximal match it belongs to, or `None` if the extended match
/// is shorter than `l_min`.
pub fn extend_seed(
    ref_ranks: &[u8],
    query_ranks: &[u8],
    ref_seqnum: u32,
    query_seqnum: u32,
    ref_pos: usize,
    query_pos: usize,
    k: usize,
    l_min: usize,
) -> Option<Mem> {
    let mut left = 0usize;
    while ref_pos > left && query_pos > left && ref_ranks[ref_pos - left - 1] == query_ranks[query_pos - left - 1] {
        left += 1;
    }
    let mut right = k;
    while ref_pos + right < ref_ranks.len()
        && query_pos + right < query_ranks.len()
        && ref_ranks[ref_pos + right] == query_ranks[query_pos + right]
    {
        right += 1;
    }
    let length = left + right;
    if length < l_min {
        return None;
    }
    Some(Mem {
        ref_seqnum,
        query_seqnum,
        ref_endpos: (ref_pos - left + length) as u32,
        query_endpos: (query_pos - left + length) as u32,
        length: length as u32,
    })
}

/// Order-preserving packed layout for `R(k', 5)` match records: `(ref_seqnum,
/// query_seqnum, ref_endpos, query_endpos, length - l_min)`. `k'` (the
/// record's byte width) is `8` or `9`, picked automatically by
/// [`RecordLayout::new`] from the field bit widths.
pub struct MatchLayout {
    layout: RecordLayout,
    l_min: u32,
}

impl MatchLayout {
    /// `seqnum_bits`/`pos_bits` size the seqnum and position fields;
    /// `length_bits` sizes `length - l_min` (the longest match expected
    /// minus `l_min`, rounded up to a bit width).
    pub fn new(seqnum_bits: u32, pos_bits: u32, length_bits: u32, l_min: u32) -> Result<Self> {
        let layout = RecordLayout::new(&[seqnum_bits, seqnum_bits, pos_bits, pos_bits, length_bits])?;
        Ok(Self { layout, l_min })
    }

    pub fn byte_width(&self) -> usize {
        self.layout.byte_width()
    }

    pub fn encode(&self, m: &Mem) -> Result<Vec<u8>> {
        self.layout.encode(&[
            m.ref_seqnum as u64,
            m.query_seqnum as u64,
            m.ref_endpos as u64,
            m.query_endpos as u64,
            (m.length - self.l_min) as u64,
        ])
    }

    pub fn decode(&self, record: &[u8]) -> Mem {
        let fields = self.layout.decode_all(record);
        Mem {
            ref_seqnum: fields[0] as u32,
            query_seqnum: fields[1] as u32,
            ref_endpos: fields[2] as u32,
            query_endpos: fields[3] as u32,
            length: fields[4] as u32 + self.l_min,
        }
    }
}

/// Packs `matches` into one flat byte buffer, sorts it in byte order (hence
/// lexicographic order on the tuple), and removes adjacent duplicates.
pub fn pack_sort_dedup(layout: &MatchLayout, matches: &[Mem]) -> Vec<u8> {
    let width = layout.byte_width();
    let mut buf = Vec::with_capacity(matches.len() * width);
    for m in matches {
        buf.extend(layout.encode(m).expect("fields fit by construction"));
    }
    radix_sort_records(&mut buf, width);

    if buf.is_empty() {
        return buf;
    }
    let mut write = width;
    let mut read = width;
    while read < buf.len() {
        if buf[read..read + width] != buf[write - width..write] {
            buf.copy_within(read..read + width, write);
            write += width;
        }
        read += width;
    }
    buf.truncate(write);
    buf
}

/// One maximal-score colinear chain within a segment: its member matches (in
/// chain order) and total score.
#[derive(Debug, Clone)]
pub struct Chain {
    pub match_indices: Vec<usize>,
    pub score: i64,
}

/// `(ref_gap_length + query_gap_length) / 2`, matching `gap_function`.
#[inline]
fn gap_function(ref_gap: u32, query_gap: u32) -> u32 {
    (ref_gap + query_gap) / 2
}

/// Whether a colinear edge between `i` (earlier) and `j` (later) in
/// reference/query coordinates survives the two-sided imbalance guard.
#[inline]
fn gap_edge_allowed(ref_gap: u32, query_gap: u32) -> bool {
    if ref_gap == 0 && query_gap == 0 {
        return true;
    }
    let diff = ref_gap.abs_diff(query_gap);
    diff <= 100 || (diff as f64) / (ref_gap.max(query_gap) as f64) <= 0.3
}

struct ElemInfo {
    score: i64,
    predecessor: usize,
    ref_gap: u32,
    query_gap: u32,
    referenced: bool,
}

/// Runs the bounded-lookback chaining DP over `segment` (already sorted by
/// `ref_endpos` ascending, all of the same `(ref_seqnum, query_seqnum)`), in
/// the given direction. `upwards` processes indices `0..len` and looks back
/// at most `max_previous` positions; the backward direction is the mirror
/// image (indices `len-1..=0`, looking forward).
fn local_chain_scores(segment: &[Mem], max_previous: usize, upwards: bool) -> Vec<ElemInfo> {
    let n = segment.len();
    let mut info: Vec<ElemInfo> = (0..n)
        .map(|i| ElemInfo {
            score: segment[i].length as i64,
            predecessor: i,
            ref_gap: 0,
            query_gap: 0,
            referenced: false,
        })
        .collect();
    if n <= 1 {
        return info;
    }

    let order: Vec<usize> = if upwards { (0..n).collect() } else { (0..n).rev().collect() };

    for &j in order.iter().skip(1) {
        let j_match_length = segment[j].length as i64;
        let mut j_maxscore = j_match_length;
        let mut best_pred = j;
        let mut best_gaps = (0u32, 0u32);

        let last_idx = if upwards {
            j.saturating_sub(max_previous)
        } else {
            (j + max_previous).min(n - 1)
        };

        let mut i = if upwards { j - 1 } else { j + 1 };
        loop {
            let (earlier, later) = if upwards { (i, j) } else { (j, i) };
            let ref_gap = segment[later].ref_startpos().saturating_sub(segment[earlier].ref_endpos);
            let query_gap = segment[later]
                .query_startpos()
                .saturating_sub(segment[earlier].query_endpos);

            if gap_edge_allowed(ref_gap, query_gap) {
                let gap_score = gap_function(ref_gap, query_gap) as i64;
                let score_from_i = info[i].score + j_match_length;
                if score_from_i > gap_score && j_maxscore < score_from_i - gap_score {
                    j_maxscore = score_from_i - gap_score;
                    best_pred = i;
                    best_gaps = (ref_gap, query_gap);
                }
            }

            if i == last_idx {
                break;
            }
            i = if upwards { i - 1 } else { i + 1 };
        }

        info[j].score = j_maxscore;
        if best_pred != j {
            info[j].predecessor = best_pred;
            info[j].ref_gap = best_gaps.0;
            info[j].query_gap = best_gaps.1;
        }
    }

    info
}

fn total_score(info: &[ElemInfo]) -> i64 {
    info.iter().map(|e| e.score).sum()
}

/// Extracts every non-overlapping chain from `segment`: runs the DP forwards
/// and backwards, keeps the direction with the higher total score, then
/// walks predecessor links starting from every element that is never itself
/// a predecessor (a chain end), from highest score to lowest, marking each
/// visited element so it belongs to exactly one chain.
pub fn chain_segment(segment: &[Mem], max_previous: usize) -> Vec<Chain> {
    if segment.is_empty() {
        return Vec::new();
    }
    let fwd = local_chain_scores(segment, max_previous, true);
    let bck = local_chain_scores(segment, max_previous, false);
    let mut info = if total_score(&fwd) >= total_score(&bck) { fwd } else { bck };

    let n = info.len();
    for idx in 0..n {
        let p = info[idx].predecessor;
        if p != idx {
            info[p].referenced = true;
        }
    }
    let mut chain_ends: Vec<usize> = (0..n).filter(|&idx| !info[idx].referenced).collect();
    chain_ends.sort_by(|&a, &b| info[b].score.cmp(&info[a].score).then(a.cmp(&b)));

    let mut marked = vec![false; n];
    let mut chains = Vec::new();
    for end in chain_ends {
        if marked[end] {
            continue;
        }
        let mut path = vec![end];
        let mut score_sum = segment[end].length as i64;
        let mut j = end;
        loop {
            let i = info[j].predecessor;
            marked[j] = true;
            if i == j || marked[i] {
                break;
            }
            score_sum -= gap_function(info[j].ref_gap, info[j].query_gap) as i64;
            score_sum += segment[i].length as i64;
            path.push(i);
            j = i;
        }
        path.reverse();
        chains.push(Chain {
            match_indices: path,
            score: score_sum.max(0),
        });
    }
    chains
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem(rs: u32, qs: u32, ref_start: u32, query_start: u32, len: u32) -> Mem {
        Mem {
            ref_seqnum: rs,
            query_seqnum: qs,
            ref_endpos: ref_start + len,
            query_endpos: query_start + len,
            length: len,
        }
    }

    #[test]
    fn extend_seed_grows_left_and_right() {
        let r = b"AAACGTACGTTTT".to_vec();
        let q = b"GGGCGTACGTCCC".to_vec();
        // Seed k=3 at "CGT" starting ref_pos=3, query_pos=3.
        let m = extend_seed(&r, &q, 0, 1, 3, 3, 3, 1).unwrap();
        assert_eq!(m.length, 7); // "CGTACGT"
        assert_eq!(m.ref_startpos(), 3);
        assert_eq!(m.query_startpos(), 3);
    }

    #[test]
    fn extend_seed_rejects_below_l_min() {
        let r = b"ACGTTTTT".to_vec();
        let q = b"ACGTGGGG".to_vec();
        assert!(extend_seed(&r, &q, 0, 1, 0, 0, 4, 10).is_none());
    }

    #[test]
    fn pack_sort_dedup_removes_duplicate_matches() {
        let layout = MatchLayout::new(8, 16, 8, 0).unwrap();
        let matches = vec![mem(0, 1, 10, 20, 5), mem(0, 1, 10, 20, 5), mem(0, 1, 0, 0, 8)];
        let packed = pack_sort_dedup(&layout, &matches);
        assert_eq!(packed.len() / layout.byte_width(), 2);
    }

    #[test]
    fn colinear_chain_links_consecutive_matches() {
        // Two matches that are perfectly colinear with no gap should chain
        // into one chain spanning both.
        let segment = vec![mem(0, 0, 0, 0, 10), mem(0, 0, 10, 10, 10)];
        let chains = chain_segment(&segment, 16);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].match_indices, vec![0, 1]);
        assert_eq!(chains[0].score, 20);
    }

    #[test]
    fn large_imbalanced_gap_is_pruned_into_separate_chains() {
        // ref_gap huge, query_gap tiny: imbalance exceeds max(100, 0.3*max),
        // so the edge should be pruned and each match chains alone.
        let segment = vec![mem(0, 0, 0, 0, 10), mem(0, 0, 1000, 10, 10)];
        let chains = chain_segment(&segment, 16);
        assert_eq!(chains.len(), 2);
    }

    #[test]
    fn single_match_segment_is_its_own_chain() {
        let segment = vec![mem(0, 0, 5, 5, 20)];
        let chains = chain_segment(&segment, 16);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].score, 20);
    }
}

//! A bitvector with block-accelerated rank/select (spec component 4.G's
//! succinct PLCP serialization support).
//!
//! Grounded on the teacher's `text_with_rank_support/flat.rs`: a flat bit
//! store plus a per-block cumulative popcount table built once after the
//! bits are finalized. `rank1` sums a block-prefix lookup with a scan of
//! the remaining partial block; `select1` binary-searches the block table
//! then scans within the block.

use bitvec::prelude::*;

const BLOCK_BITS: usize = 512;

/// An immutable bitvector supporting `rank1`/`select1` in `O(1)` amortized
/// plus a bounded in-block scan.
pub struct RankSelectBitVector {
    bits: BitVec<u64, Lsb0>,
    /// `block_rank[b]` = number of one bits in `[0, b * BLOCK_BITS)`.
    block_rank: Vec<u64>,
    total_ones: u64,
}

impl RankSelectBitVector {
    pub fn from_bitvec(bits: BitVec<u64, Lsb0>) -> Self {
        let num_blocks = bits.len().div_ceil(BLOCK_BITS) + 1;
        let mut block_rank = Vec::with_capacity(num_blocks);
        let mut acc = 0u64;
        block_rank.push(0);
        let mut pos = 0;
        while pos < bits.len() {
            let end = (pos + BLOCK_BITS).min(bits.len());
            acc += bits[pos..end].count_ones() as u64;
            block_rank.push(acc);
            pos = end;
        }
        let total_ones = acc;
        Self {
            bits,
            block_rank,
            total_ones,
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn count_ones(&self) -> u64 {
        self.total_ones
    }

    /// Number of one bits in `[0, i)`.
    pub fn rank1(&self, i: usize) -> usize {
        debug_assert!(i <= self.bits.len());
        let block = i / BLOCK_BITS;
        let base = self.block_rank[block] as usize;
        let start = block * BLOCK_BITS;
        base + self.bits[start..i].count_ones()
    }

    /// Position of the `k`-th one bit (0-indexed). Panics if `k` is not a
    /// valid one-bit index.
    pub fn select1(&self, k: usize) -> usize {
        assert!((k as u64) < self.total_ones, "select1({k}) out of range");
        let mut lo = 0usize;
        let mut hi = self.block_rank.len() - 1;
        while lo + 1 < hi {
            let mid = lo + (hi - lo) / 2;
            if (self.block_rank[mid] as usize) <= k {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let start = lo * BLOCK_BITS;
        let end = (start + BLOCK_BITS).min(self.bits.len());
        let mut remaining = k - self.block_rank[lo] as usize;
        for i in start..end {
            if self.bits[i] {
                if remaining == 0 {
                    return i;
                }
                remaining -= 1;
            }
        }
        unreachable!("select1({k}) within a counted block must find its one bit");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(bits_str: &str) -> RankSelectBitVector {
        let mut bv: BitVec<u64, Lsb0> = BitVec::new();
        for c in bits_str.chars() {
            bv.push(c == '1');
        }
        RankSelectBitVector::from_bitvec(bv)
    }

    #[test]
    fn rank_counts_ones_before_index() {
        let bv = make("10110100110");
        assert_eq!(bv.rank1(0), 0);
        assert_eq!(bv.rank1(1), 1);
        assert_eq!(bv.rank1(4), 2);
        assert_eq!(bv.rank1(bv.len()), bv.count_ones() as usize);
    }

    #[test]
    fn select_finds_kth_one() {
        let bv = make("10110100110");
        let ones: Vec<usize> = "10110100110"
            .chars()
            .enumerate()
            .filter(|(_, c)| *c == '1')
            .map(|(i, _)| i)
            .collect();
        for (k, &pos) in ones.iter().enumerate() {
            assert_eq!(bv.select1(k), pos);
        }
    }

    #[test]
    fn large_input_spans_multiple_blocks() {
        let mut bv: BitVec<u64, Lsb0> = BitVec::new();
        for i in 0..4000usize {
            bv.push(i % 7 == 0);
        }
        let rs = RankSelectBitVector::from_bitvec(bv.clone());
        let mut k = 0;
        for i in 0..bv.len() {
            assert_eq!(rs.rank1(i), bv[..i].count_ones());
            if bv[i] {
                assert_eq!(rs.select1(k), i);
                k += 1;
            }
        }
    }
}

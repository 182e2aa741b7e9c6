//! LCP table construction (spec component 4.G): Kasai's algorithm (13n/9n
//! variants) and the PLCP/Φ-array variant (5n), plus the two serialized
//! forms this index persists — saturated three-tier and succinct
//! unary-coded.
//!
//! Grounded on the spec's own description of Kasai's algorithm and the
//! Φ-array recurrence; the builder-style split between an in-memory pass
//! and a streamed pass follows `other_examples/..._src-plcp.rs.rs`'s
//! separation of PLCP construction from LCP construction. The saturation
//! convention (255/65535 sentinels with parallel overflow streams) and the
//! succinct bitvector encoding come directly from spec §4.G / §6's file
//! table.

use num_traits::{NumCast, PrimInt};

use crate::succinct_bitvector::RankSelectBitVector;

/// Builds `ISA` (the inverse of `SA`) for a suffix array of `T+1` entries.
fn inverse_suffix_array<I: PrimInt + NumCast>(sa: &[I]) -> Vec<usize> {
    let mut isa = vec![0usize; sa.len()];
    for (rank, &pos) in sa.iter().enumerate() {
        isa[pos.to_usize().expect("suffix array position fits in usize")] = rank;
    }
    isa
}

/// Classic Kasai's algorithm: `SA` and `ISA` both resident, the text
/// scanned once in position order. `O(T)` time and space beyond the
/// output. This is the "13n" variant (SA + ISA + text + output all
/// resident at 4 bytes/entry, roughly 13 bytes per position).
pub fn kasai<I: PrimInt + NumCast>(text: &[u8], sa: &[I]) -> Vec<u32> {
    let n = sa.len();
    let t = n - 1;
    let sa_usize: Vec<usize> = sa
        .iter()
        .map(|&x| x.to_usize().expect("suffix array position fits in usize"))
        .collect();
    let isa = inverse_suffix_array(sa);

    let mut lcp = vec![0u32; n];
    let mut h = 0usize;
    for i in 0..t {
        let rank = isa[i];
        if rank == 0 {
            h = 0;
            continue;
        }
        let j = sa_usize[rank - 1];
        if j == t {
            lcp[rank] = 0;
            h = 0;
            continue;
        }
        while i + h < t && j + h < t && text[i + h] == text[j + h] {
            h += 1;
        }
        lcp[rank] = h as u32;
        h = h.saturating_sub(1);
    }
    lcp
}

/// Same recurrence as [`kasai`], but `sa` is consumed through a streaming
/// cursor (e.g. records read back from the packed suftab view) instead of
/// held fully resident, matching the "Kasai-9n" resident-memory profile:
/// only `ISA` and the output live in RAM, `SA` is re-derived on demand via
/// `sa_at`.
pub fn kasai_streamed<F>(text: &[u8], total_len: usize, isa: &[usize], mut sa_at: F) -> Vec<u32>
where
    F: FnMut(usize) -> usize,
{
    let n = total_len + 1;
    let t = total_len;
    let mut lcp = vec![0u32; n];
    let mut h = 0usize;
    for i in 0..t {
        let rank = isa[i];
        if rank == 0 {
            h = 0;
            continue;
        }
        let j = sa_at(rank - 1);
        if j == t {
            lcp[rank] = 0;
            h = 0;
            continue;
        }
        while i + h < t && j + h < t && text[i + h] == text[j + h] {
            h += 1;
        }
        lcp[rank] = h as u32;
        h = h.saturating_sub(1);
    }
    lcp
}

/// Builds the permuted LCP array (`PLCP[i]` is the LCP of the suffix at
/// text position `i` with its predecessor in SA order), using the
/// `Φ[i] = SA[ISA[i] - 1]` recurrence. `O(T)` time, and only `ISA` plus the
/// output need to be resident (the "5n" profile once `SA` is dropped).
pub fn plcp<I: PrimInt + NumCast>(text: &[u8], sa: &[I]) -> Vec<u32> {
    let n = sa.len();
    let t = n - 1;
    let sa_usize: Vec<usize> = sa
        .iter()
        .map(|&x| x.to_usize().expect("suffix array position fits in usize"))
        .collect();

    let mut phi = vec![usize::MAX; t];
    for rank in 1..n {
        let pos = sa_usize[rank];
        if pos == t {
            continue;
        }
        phi[pos] = sa_usize[rank - 1];
    }

    let mut result = vec![0u32; t];
    let mut h = 0usize;
    for i in 0..t {
        let j = phi[i];
        if j == usize::MAX || j == t {
            result[i] = 0;
            h = 0;
            continue;
        }
        while i + h < t && j + h < t && text[i + h] == text[j + h] {
            h += 1;
        }
        result[i] = h as u32;
        h = h.saturating_sub(1);
    }
    result
}

/// Un-permutes a PLCP array (indexed by text position) back into LCP form
/// (indexed by SA rank), setting `LCP[0] = LCP[T] = 0`.
pub fn lcp_from_plcp<I: PrimInt + NumCast>(sa: &[I], plcp: &[u32]) -> Vec<u32> {
    let n = sa.len();
    let t = n - 1;
    let mut lcp = vec![0u32; n];
    for rank in 1..n {
        let pos = sa[rank].to_usize().expect("suffix array position fits in usize");
        lcp[rank] = if pos < t { plcp[pos] } else { 0 };
    }
    lcp
}

/// Saturated three-tier LCP serialization: one byte per entry (saturating
/// at 255), a 16-bit overflow stream for entries `>= 255` (saturating at
/// 65535), and a 32-bit second-overflow stream for entries `>= 65535`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaturatedLcp {
    pub primary: Vec<u8>,
    pub secondary: Vec<u16>,
    pub tertiary: Vec<u32>,
}

impl SaturatedLcp {
    pub fn encode(lcp: &[u32]) -> Self {
        let mut primary = Vec::with_capacity(lcp.len());
        let mut secondary = Vec::new();
        let mut tertiary = Vec::new();
        for &v in lcp {
            if v < 255 {
                primary.push(v as u8);
            } else {
                primary.push(255);
                if v < 65535 {
                    secondary.push(v as u16);
                } else {
                    secondary.push(65535);
                    tertiary.push(v);
                }
            }
        }
        Self {
            primary,
            secondary,
            tertiary,
        }
    }

    pub fn decode(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.primary.len());
        let mut secondary = self.secondary.iter();
        let mut tertiary = self.tertiary.iter();
        for &b in &self.primary {
            if b < 255 {
                out.push(b as u32);
                continue;
            }
            let sec = *secondary
                .next()
                .expect("secondary stream holds one entry per primary saturation");
            if sec < 65535 {
                out.push(sec as u32);
            } else {
                out.push(*tertiary.next().expect(
                    "tertiary stream holds one entry per secondary saturation",
                ));
            }
        }
        out
    }

    pub fn get(&self, rank: usize) -> u32 {
        let b = self.primary[rank];
        if b < 255 {
            return b as u32;
        }
        let prior_saturations = self.primary[..rank].iter().filter(|&&x| x == 255).count();
        let sec = self.secondary[prior_saturations];
        if sec < 65535 {
            return sec as u32;
        }
        let prior_tertiary = self.secondary[..prior_saturations]
            .iter()
            .filter(|&&x| x == 65535)
            .count();
        self.tertiary[prior_tertiary]
    }
}

/// Succinct unary-coded PLCP serialization: for each text position `pos`
/// in order, `plcp[pos] - plcp[pos - 1] + 1` zero bits followed by a one
/// bit (with the virtual `plcp[-1] := -1`). Total size `<= 2T + 1` bits.
/// `select1(pos) - pos` recovers `plcp[pos]`.
pub struct SuccinctPlcp {
    bits: RankSelectBitVector,
}

impl SuccinctPlcp {
    pub fn encode(plcp: &[u32]) -> Self {
        use bitvec::prelude::*;
        let mut bits: BitVec<u64, Lsb0> = BitVec::new();
        let mut prev: i64 = -1;
        for &p in plcp {
            let delta = p as i64 - prev + 1;
            debug_assert!(
                delta >= 0,
                "PLCP can drop by at most 1 between consecutive text positions"
            );
            bits.extend(std::iter::repeat(false).take(delta as usize));
            bits.push(true);
            prev = p as i64;
        }
        Self {
            bits: RankSelectBitVector::from_bitvec(bits),
        }
    }

    /// The PLCP value at text position `pos`.
    pub fn plcp_at(&self, pos: usize) -> u32 {
        (self.bits.select1(pos) - pos) as u32
    }

    /// The LCP value at SA rank `rank`, given the suffix array. Ranks 0 and
    /// `T` are always 0 (no real predecessor / the empty suffix).
    pub fn lcp_at<I: PrimInt + NumCast>(&self, rank: usize, sa: &[I]) -> u32 {
        let t = sa.len() - 1;
        if rank == 0 || rank == t {
            return 0;
        }
        let pos = sa[rank].to_usize().expect("suffix array position fits in usize");
        if pos == t {
            0
        } else {
            self.plcp_at(pos)
        }
    }

    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }
}

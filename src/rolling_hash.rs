//! Rolling hashes over a fixed-size window of ranks (spec component 4.C).
//!
//! Two independent families share the sliding-window contract: feed ranks in
//! one at a time, get back a hash for the current window of the last `k`
//! ranks. `IntegerCode` is an invertible base-`a` numeral (collisions are
//! impossible); `NtHash` is Mohamadi et al.'s rotate-left-1 hash (collisions
//! are possible, callers must verify matches). Both provide a canonical,
//! reverse-complement-aware variant for DNA.
//!
//! Grounded on `original_source/cyclic_buffer.hpp` (ring buffer shape),
//! `nthash_fwd.hpp` (exact seed constants and 33/31-period cancellation
//! tables, carried over verbatim since they are part of the hash's wire
//! definition), and `qgrams_hash_invint.hpp` (invertible code roll formula).

use crate::alphabet::dna_complement_rank;

/// Fixed-capacity ring buffer of the last `k` ranks, mirroring
/// `original_source/cyclic_buffer.hpp`'s `CyclicBuffer<Basetype, max_size>`.
pub struct CyclicRankBuffer {
    space: Vec<u8>,
    first: usize,
    filled: usize,
}

impl CyclicRankBuffer {
    pub fn new(k: usize) -> Self {
        assert!(k >= 1, "window size must be at least 1");
        Self {
            space: vec![0u8; k],
            first: 0,
            filled: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.space.len()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.filled == self.space.len()
    }

    /// Pushes `new_elem`, evicting and returning the oldest element once the
    /// buffer is full. Before that point the buffer just fills up and
    /// returns `None`.
    pub fn shift(&mut self, new_elem: u8) -> Option<u8> {
        let cap = self.space.len();
        if self.filled < cap {
            self.space[self.filled] = new_elem;
            self.filled += 1;
            return None;
        }
        let evicted = self.space[self.first];
        self.space[self.first] = new_elem;
        self.first = (self.first + 1) % cap;
        Some(evicted)
    }
}

/// Invertible base-`a` integer code: a k-mer of ranks in `[0, a)` treated as
/// a base-`a` numeral. `roll_forward` both adds the incoming rank and
/// subtracts the outgoing one in O(1); the map is a bijection, so two
/// different k-mers never collide.
pub struct IntegerCode {
    a: u64,
    k: u32,
    pow_k_minus_1: u64,
}

impl IntegerCode {
    pub fn new(alphabet_size: u64, k: u32) -> Self {
        assert!(k >= 1);
        let pow_k_minus_1 = alphabet_size.pow(k - 1);
        Self {
            a: alphabet_size,
            k,
            pow_k_minus_1,
        }
    }

    pub fn k(&self) -> u32 {
        self.k
    }

    /// Computes the code of the first `k` ranks from scratch.
    pub fn first_code(&self, ranks: &[u8]) -> u64 {
        debug_assert_eq!(ranks.len(), self.k as usize);
        ranks.iter().fold(0u64, |acc, &r| acc * self.a + r as u64)
    }

    /// `code' = (code - old_rank * a^(k-1)) * a + new_rank`.
    #[inline]
    pub fn roll_forward(&self, old_rank: u8, code: u64, new_rank: u8) -> u64 {
        (code - old_rank as u64 * self.pow_k_minus_1) * self.a + new_rank as u64
    }

    /// Canonical code for DNA: the lexicographically smaller of the forward
    /// code and the code of the window's reverse complement, maintained
    /// incrementally alongside `roll_forward`.
    pub fn roll_forward_canonical(
        &self,
        old_rank: u8,
        fwd_code: u64,
        rc_code: u64,
        new_rank: u8,
    ) -> (u64, u64, u64) {
        let new_fwd = self.roll_forward(old_rank, fwd_code, new_rank);
        // The complement of new_rank enters the reverse-complement numeral
        // at the *high* end (it becomes the new most-significant digit).
        let new_rc = dna_complement_rank(new_rank) as u64 * self.pow_k_minus_1
            + rc_code / self.a;
        (new_fwd, new_rc, new_fwd.min(new_rc))
    }

    pub fn first_code_canonical(&self, ranks: &[u8]) -> (u64, u64, u64) {
        let fwd = self.first_code(ranks);
        let rc = ranks
            .iter()
            .rev()
            .fold(0u64, |acc, &r| acc * self.a + dna_complement_rank(r) as u64);
        (fwd, rc, fwd.min(rc))
    }
}

#[inline]
fn rotate_left_1(v: u64) -> u64 {
    (v << 1) | (v >> 63)
}

#[inline]
fn rotate_right_1(v: u64) -> u64 {
    (v >> 1) | (v << 63)
}

#[inline]
fn swapbits033(v: u64) -> u64 {
    let x = (v ^ (v >> 33)) & 1;
    v ^ (x | (x << 33))
}

#[inline]
fn swapbits3263(v: u64) -> u64 {
    let x = ((v >> 32) ^ (v >> 63)) & 1;
    v ^ ((x << 32) | (x << 63))
}

const NT_HASH_SEED_A: u64 = 0x3c8bfbb395c60474;
const NT_HASH_SEED_C: u64 = 0x3193c18562a02b4c;
const NT_HASH_SEED_G: u64 = 0x20323ed082572324;
const NT_HASH_SEED_T: u64 = 0x295549f54be24456;
const NT_HASH_SEED_N: u64 = 0;

const NT_HASH_SEED_TABLE: [u64; 5] = [
    NT_HASH_SEED_A,
    NT_HASH_SEED_C,
    NT_HASH_SEED_G,
    NT_HASH_SEED_T,
    NT_HASH_SEED_N,
];

#[rustfmt::skip]
const NT_HASH_A33R: [u64; 33] = [
    0x195c60474, 0x12b8c08e9, 0x571811d3,  0xae3023a6,  0x15c60474c,
    0xb8c08e99,  0x171811d32, 0xe3023a65,  0x1c60474ca, 0x18c08e995,
    0x11811d32b, 0x3023a657,  0x60474cae,  0xc08e995c,  0x1811d32b8,
    0x1023a6571, 0x474cae3,   0x8e995c6,   0x11d32b8c,  0x23a65718,
    0x474cae30,  0x8e995c60,  0x11d32b8c0, 0x3a657181,  0x74cae302,
    0xe995c604,  0x1d32b8c08, 0x1a6571811, 0x14cae3023, 0x995c6047,
    0x132b8c08e, 0x6571811d,  0xcae3023a,
];

#[rustfmt::skip]
const NT_HASH_A31L: [u64; 31] = [
    0x3c8bfbb200000000, 0x7917f76400000000, 0xf22feec800000000,
    0xe45fdd9200000000, 0xc8bfbb2600000000, 0x917f764e00000000,
    0x22feec9e00000000, 0x45fdd93c00000000, 0x8bfbb27800000000,
    0x17f764f200000000, 0x2feec9e400000000, 0x5fdd93c800000000,
    0xbfbb279000000000, 0x7f764f2200000000, 0xfeec9e4400000000,
    0xfdd93c8a00000000, 0xfbb2791600000000, 0xf764f22e00000000,
    0xeec9e45e00000000, 0xdd93c8be00000000, 0xbb27917e00000000,
    0x764f22fe00000000, 0xec9e45fc00000000, 0xd93c8bfa00000000,
    0xb27917f600000000, 0x64f22fee00000000, 0xc9e45fdc00000000,
    0x93c8bfba00000000, 0x27917f7600000000, 0x4f22feec00000000,
    0x9e45fdd800000000,
];

#[rustfmt::skip]
const NT_HASH_C33R: [u64; 33] = [
    0x162a02b4c, 0xc5405699,  0x18a80ad32, 0x115015a65, 0x2a02b4cb,
    0x54056996,  0xa80ad32c,  0x15015a658, 0xa02b4cb1,  0x140569962,
    0x80ad32c5,  0x1015a658a, 0x2b4cb15,   0x569962a,   0xad32c54,
    0x15a658a8,  0x2b4cb150,  0x569962a0,  0xad32c540,  0x15a658a80,
    0xb4cb1501,  0x169962a02, 0xd32c5405,  0x1a658a80a, 0x14cb15015,
    0x9962a02b,  0x132c54056, 0x658a80ad,  0xcb15015a,  0x1962a02b4,
    0x12c540569, 0x58a80ad3,  0xb15015a6,
];

#[rustfmt::skip]
const NT_HASH_C31L: [u64; 31] = [
    0x3193c18400000000, 0x6327830800000000, 0xc64f061000000000,
    0x8c9e0c2200000000, 0x193c184600000000, 0x3278308c00000000,
    0x64f0611800000000, 0xc9e0c23000000000, 0x93c1846200000000,
    0x278308c600000000, 0x4f06118c00000000, 0x9e0c231800000000,
    0x3c18463200000000, 0x78308c6400000000, 0xf06118c800000000,
    0xe0c2319200000000, 0xc184632600000000, 0x8308c64e00000000,
    0x6118c9e00000000,  0xc23193c00000000,  0x1846327800000000,
    0x308c64f000000000, 0x6118c9e000000000, 0xc23193c000000000,
    0x8463278200000000, 0x8c64f0600000000,  0x118c9e0c00000000,
    0x23193c1800000000, 0x4632783000000000, 0x8c64f06000000000,
    0x18c9e0c200000000,
];

#[rustfmt::skip]
const NT_HASH_G33R: [u64; 33] = [
    0x82572324,  0x104ae4648, 0x95c8c91,   0x12b91922,  0x25723244,
    0x4ae46488,  0x95c8c910,  0x12b919220, 0x57232441,  0xae464882,
    0x15c8c9104, 0xb9192209,  0x172324412, 0xe4648825,  0x1c8c9104a,
    0x191922095, 0x12324412b, 0x46488257,  0x8c9104ae,  0x11922095c,
    0x324412b9,  0x64882572,  0xc9104ae4,  0x1922095c8, 0x124412b91,
    0x48825723,  0x9104ae46,  0x122095c8c, 0x4412b919,  0x88257232,
    0x1104ae464, 0x2095c8c9,  0x412b9192,
];

#[rustfmt::skip]
const NT_HASH_G31L: [u64; 31] = [
    0x20323ed000000000, 0x40647da000000000, 0x80c8fb4000000000,
    0x191f68200000000,  0x323ed0400000000,  0x647da0800000000,
    0xc8fb41000000000,  0x191f682000000000, 0x323ed04000000000,
    0x647da08000000000, 0xc8fb410000000000, 0x91f6820200000000,
    0x23ed040600000000, 0x47da080c00000000, 0x8fb4101800000000,
    0x1f68203200000000, 0x3ed0406400000000, 0x7da080c800000000,
    0xfb41019000000000, 0xf682032200000000, 0xed04064600000000,
    0xda080c8e00000000, 0xb410191e00000000, 0x6820323e00000000,
    0xd040647c00000000, 0xa080c8fa00000000, 0x410191f600000000,
    0x820323ec00000000, 0x40647da00000000,  0x80c8fb400000000,
    0x10191f6800000000,
];

#[rustfmt::skip]
const NT_HASH_T33R: [u64; 33] = [
    0x14be24456, 0x97c488ad,  0x12f89115a, 0x5f1222b5,  0xbe24456a,
    0x17c488ad4, 0xf89115a9,  0x1f1222b52, 0x1e24456a5, 0x1c488ad4b,
    0x189115a97, 0x11222b52f, 0x24456a5f,  0x488ad4be,  0x9115a97c,
    0x1222b52f8, 0x4456a5f1,  0x88ad4be2,  0x1115a97c4, 0x22b52f89,
    0x456a5f12,  0x8ad4be24,  0x115a97c48, 0x2b52f891,  0x56a5f122,
    0xad4be244,  0x15a97c488, 0xb52f8911,  0x16a5f1222, 0xd4be2445,
    0x1a97c488a, 0x152f89115, 0xa5f1222b,
];

#[rustfmt::skip]
const NT_HASH_T31L: [u64; 31] = [
    0x295549f400000000, 0x52aa93e800000000, 0xa55527d000000000,
    0x4aaa4fa200000000, 0x95549f4400000000, 0x2aa93e8a00000000,
    0x55527d1400000000, 0xaaa4fa2800000000, 0x5549f45200000000,
    0xaa93e8a400000000, 0x5527d14a00000000, 0xaa4fa29400000000,
    0x549f452a00000000, 0xa93e8a5400000000, 0x527d14aa00000000,
    0xa4fa295400000000, 0x49f452aa00000000, 0x93e8a55400000000,
    0x27d14aaa00000000, 0x4fa2955400000000, 0x9f452aa800000000,
    0x3e8a555200000000, 0x7d14aaa400000000, 0xfa29554800000000,
    0xf452aa9200000000, 0xe8a5552600000000, 0xd14aaa4e00000000,
    0xa295549e00000000, 0x452aa93e00000000, 0x8a55527c00000000,
    0x14aaa4fa00000000,
];

const NT_HASH_N33R: [u64; 33] = [NT_HASH_SEED_N; 33];
const NT_HASH_N31L: [u64; 31] = [NT_HASH_SEED_N; 31];

const MS_TAB_31L: [&[u64; 31]; 5] = [
    &NT_HASH_A31L,
    &NT_HASH_C31L,
    &NT_HASH_G31L,
    &NT_HASH_T31L,
    &NT_HASH_N31L,
];
const MS_TAB_33R: [&[u64; 33]; 5] = [
    &NT_HASH_A33R,
    &NT_HASH_C33R,
    &NT_HASH_G33R,
    &NT_HASH_T33R,
    &NT_HASH_N33R,
];

/// Rolling nt-Hash over a window of `k` DNA ranks (`0..=4`, `4` standing in
/// for `N`). Matches `original_source/nthash_fwd.hpp`'s `NThashTransformer`
/// bit for bit.
pub struct NtHash {
    k: usize,
    ms_tab_or: [u64; 5],
}

impl NtHash {
    pub fn new(k: usize) -> Self {
        assert!(k >= 1);
        let mut ms_tab_or = [0u64; 5];
        for idx in 0..5 {
            ms_tab_or[idx] = MS_TAB_31L[idx][k % 31] | MS_TAB_33R[idx][k % 33];
        }
        Self { k, ms_tab_or }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Computes the forward hash of the first window from scratch.
    pub fn first_hash(&self, ranks: &[u8]) -> u64 {
        debug_assert_eq!(ranks.len(), self.k);
        let mut h_val = 0u64;
        for &rank in ranks {
            h_val = rotate_left_1(h_val);
            h_val = swapbits033(h_val);
            h_val ^= NT_HASH_SEED_TABLE[rank as usize];
        }
        h_val
    }

    /// Computes the reverse-complement hash of the first window from
    /// scratch: equivalent to `first_hash` run on the reverse-complemented
    /// ranks, but the caller rarely has that sequence materialized.
    pub fn first_hash_rc(&self, ranks: &[u8]) -> u64 {
        let rc: Vec<u8> = ranks
            .iter()
            .rev()
            .map(|&r| if r < 4 { dna_complement_rank(r) } else { r })
            .collect();
        self.first_hash(&rc)
    }

    /// Forward-strand update: slide the window by dropping `char_out` and
    /// admitting `char_in`.
    #[inline]
    pub fn next_hash(&self, char_out: u8, fwd_hash: u64, char_in: u8) -> u64 {
        let mut h_val = rotate_left_1(fwd_hash);
        h_val = swapbits033(h_val);
        h_val ^= NT_HASH_SEED_TABLE[char_in as usize];
        h_val ^= self.ms_tab_or[char_out as usize];
        h_val
    }

    /// Reverse-strand update, operating on the complement ranks of the bases
    /// leaving/entering the window.
    #[inline]
    pub fn next_hash_rc(&self, compl_char_out: u8, rc_hash: u64, compl_char_in: u8) -> u64 {
        let mut h_val = rc_hash ^ self.ms_tab_or[compl_char_in as usize];
        h_val ^= NT_HASH_SEED_TABLE[compl_char_out as usize];
        h_val = rotate_right_1(h_val);
        swapbits3263(h_val)
    }

    /// Canonical hash: the smaller of the forward and reverse-complement
    /// values, following spec's convention of the lexicographically smaller
    /// interpretation extended to hash magnitudes.
    #[inline]
    pub fn canonical(fwd_hash: u64, rc_hash: u64) -> u64 {
        fwd_hash.min(rc_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_buffer_fills_then_shifts() {
        let mut buf = CyclicRankBuffer::new(3);
        assert_eq!(buf.shift(1), None);
        assert_eq!(buf.shift(2), None);
        assert!(!buf.is_full());
        assert_eq!(buf.shift(3), None);
        assert!(buf.is_full());
        assert_eq!(buf.shift(4), Some(1));
        assert_eq!(buf.shift(5), Some(2));
    }

    #[test]
    fn integer_code_roll_matches_from_scratch() {
        let ranks = [0u8, 1, 2, 3, 0, 1, 2];
        let k = 3;
        let code = IntegerCode::new(4, k);
        let mut cur = code.first_code(&ranks[0..k as usize]);
        for i in k as usize..ranks.len() {
            cur = code.roll_forward(ranks[i - k as usize], cur, ranks[i]);
            let expect = code.first_code(&ranks[i - k as usize + 1..=i]);
            assert_eq!(cur, expect);
        }
    }

    #[test]
    fn nt_hash_roll_matches_from_scratch() {
        let ranks = [0u8, 1, 2, 3, 0, 1, 2, 3, 0];
        let k = 4;
        let hasher = NtHash::new(k);
        let mut cur = hasher.first_hash(&ranks[0..k]);
        for i in k..ranks.len() {
            cur = hasher.next_hash(ranks[i - k], cur, ranks[i]);
            let expect = hasher.first_hash(&ranks[i - k + 1..=i]);
            assert_eq!(cur, expect);
        }
    }

    #[test]
    fn integer_code_canonical_is_symmetric() {
        let code = IntegerCode::new(4, 4);
        let ranks = [0u8, 1, 2, 3];
        let rc_ranks: Vec<u8> = ranks.iter().rev().map(|&r| dna_complement_rank(r)).collect();
        let (_, _, canon_fwd) = code.first_code_canonical(&ranks);
        let (_, _, canon_rc) = code.first_code_canonical(&rc_ranks);
        assert_eq!(canon_fwd, canon_rc);
    }
}

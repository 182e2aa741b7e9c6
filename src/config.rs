//! Build-time configuration for an [`crate::index::EnhancedSuffixArray`]
//! (spec component 4 construction entry point, ambient stack §10.3).
//!
//! Grounded on the teacher's own `config.rs`: a `Copy` builder struct with
//! chained setter methods and a `Default` impl, consumed by a single
//! `construct` method, rather than a multi-argument constructor function.

use std::path::PathBuf;

use crate::error::Result;
use crate::index::EnhancedSuffixArray;
use crate::alphabet::Alphabet;
use crate::multiseq::SequenceRecord;

/// Which LCP construction algorithm to run, trading resident memory for
/// passes over the text (spec §4.G).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LcpMethod {
    /// Skip LCP construction entirely; `base.lcp`/`.ll2`/`.ll4`/`.lls` are
    /// not produced.
    #[default]
    None,
    /// Kasai's algorithm with `SA` held fully resident (~13 bytes/position).
    Kasai13,
    /// Kasai's algorithm reading `SA` through a streaming cursor
    /// (~9 bytes/position).
    Kasai9,
    /// The PLCP/Φ-array recurrence, `SA` dropped once `ISA` is built
    /// (~5 bytes/position).
    Plcp5,
}

/// A builder-like API to configure and construct an enhanced suffix array.
#[derive(Debug, Clone, Copy)]
pub struct EsaConfig {
    lcp_method: LcpMethod,
    succinct_lcp: bool,
    reverse_complement: bool,
    emit_packed_suftab: bool,
}

impl EsaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the LCP construction algorithm. Default: [`LcpMethod::None`].
    pub fn lcp_method(self, lcp_method: LcpMethod) -> Self {
        Self { lcp_method, ..self }
    }

    /// When set, `base.lls` (the succinct unary-coded PLCP bitvector) is
    /// produced instead of the `base.lcp`/`.ll2`/`.ll4` saturated streams.
    /// Only meaningful alongside [`LcpMethod::Plcp5`], which is the only
    /// method that keeps a PLCP array around to encode. Default: `false`.
    pub fn succinct_lcp(self, succinct_lcp: bool) -> Self {
        Self { succinct_lcp, ..self }
    }

    /// Appends a reverse-complement companion sequence after every input
    /// sequence (DNA alphabets only). Default: `false`.
    pub fn reverse_complement(self, reverse_complement: bool) -> Self {
        Self {
            reverse_complement,
            ..self
        }
    }

    /// Builds `base.bsf`, the packed `(seqnum, relpos)` suffix array view.
    /// Default: `false`.
    pub fn emit_packed_suftab(self, emit_packed_suftab: bool) -> Self {
        Self {
            emit_packed_suftab,
            ..self
        }
    }

    /// Builds the enhanced suffix array over `records`, translated through
    /// alphabet `A`. `source_files` is carried through unchanged into
    /// `base.prj`'s `inputfile` lines.
    ///
    /// The number of threads used by the parallel phases (suffix array
    /// construction, LCP construction, packed-suftab-view build, minimizer
    /// extraction) is controlled by [`rayon`]'s global thread pool.
    pub fn construct<A: Alphabet>(
        &self,
        records: &[SequenceRecord],
        source_files: Vec<PathBuf>,
    ) -> Result<EnhancedSuffixArray> {
        EnhancedSuffixArray::build::<A>(records, source_files, self)
    }

    pub(crate) fn lcp_method_get(&self) -> LcpMethod {
        self.lcp_method
    }

    pub(crate) fn succinct_lcp_get(&self) -> bool {
        self.succinct_lcp
    }

    pub(crate) fn reverse_complement_get(&self) -> bool {
        self.reverse_complement
    }

    pub(crate) fn emit_packed_suftab_get(&self) -> bool {
        self.emit_packed_suftab
    }
}

impl Default for EsaConfig {
    fn default() -> Self {
        Self {
            lcp_method: LcpMethod::default(),
            succinct_lcp: false,
            reverse_complement: false,
            emit_packed_suftab: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Dna;
    use crate::multiseq::SequenceRecord;

    #[test]
    fn basic_config_builds_index() {
        let records = vec![SequenceRecord {
            header: Some("r".to_string()),
            bytes: b"ACGTACGT".to_vec(),
        }];
        let esa = EsaConfig::new()
            .lcp_method(LcpMethod::Kasai13)
            .emit_packed_suftab(true)
            .construct::<Dna>(&records, vec![])
            .unwrap();
        assert_eq!(esa.suffix_array().len(), esa.multiseq().total_length() + 1);
    }
}

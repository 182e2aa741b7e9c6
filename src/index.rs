//! The enhanced suffix array: the type every other component in this crate
//! is built to serve, and the spec §6 on-disk layout it persists to.
//!
//! Grounded on the teacher's `lib.rs` (`FmIndex` as the single struct tying
//! every owned component together, `IndexStorage`'s choice of `i32`/`u32`
//! element type) generalized from an FM-Index's BWT+sampled-SA+lookup-table
//! trio to this spec's multiseq+SA+LCP+packed-view quartet, and on spec §6's
//! file table for the persisted layout.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::alphabet::Alphabet;
use crate::config::{EsaConfig, LcpMethod};
use crate::error::{EsaError, Result};
use crate::lcp::{self, SaturatedLcp, SuccinctPlcp};
use crate::multiseq::{Multiseq, SequenceRecord};
use crate::sais;
use crate::suftab_view::SuftabView;
use crate::traversal::{self, Interval, SeqnumRelpos};

/// The serialized form of the LCP table an [`EnhancedSuffixArray`] carries,
/// mirroring spec §6's `base.lcp/.ll2/.ll4` vs `base.lls` alternative.
enum LcpRepr {
    None,
    Saturated(SaturatedLcp),
    Succinct(SuccinctPlcp),
}

/// An enhanced suffix array: a multi-sequence text, its suffix array, an
/// optional LCP table, and an optional packed `(seqnum, relpos)` view.
pub struct EnhancedSuffixArray {
    multiseq: Multiseq,
    sa: Vec<u32>,
    lcp: LcpRepr,
    suftab_view: Option<SuftabView>,
    reverse_complement: bool,
}

impl EnhancedSuffixArray {
    pub(crate) fn build<A: Alphabet>(
        records: &[SequenceRecord],
        source_files: Vec<PathBuf>,
        config: &EsaConfig,
    ) -> Result<Self> {
        log::debug!("building multiseq over {} record(s)", records.len());
        let multiseq = Multiseq::build::<A>(records, source_files, config.reverse_complement_get())?;
        log::debug!("{}", multiseq.statistics());

        // +1 accounts for the padding rank (`A::SIZE`) multi-sequence input
        // mixes into the concatenation alongside the real 0..A::SIZE ranks.
        log::debug!("running SA-IS over alphabet size {}", A::SIZE + 1);
        let sa: Vec<u32> = sais::construct(multiseq.concat(), A::SIZE + 1)?;

        let lcp = Self::build_lcp(&multiseq, &sa, config);

        let suftab_view = if config.emit_packed_suftab_get() {
            log::debug!("building packed suftab view");
            Some(SuftabView::build(&sa, &multiseq)?)
        } else {
            None
        };

        Ok(Self {
            multiseq,
            sa,
            lcp,
            suftab_view,
            reverse_complement: config.reverse_complement_get(),
        })
    }

    fn build_lcp(multiseq: &Multiseq, sa: &[u32], config: &EsaConfig) -> LcpRepr {
        match config.lcp_method_get() {
            LcpMethod::None => LcpRepr::None,
            LcpMethod::Kasai13 => {
                log::debug!("computing LCP via Kasai-13n");
                if config.succinct_lcp_get() {
                    log::warn!("succinct_lcp requested but LcpMethod::Kasai13 never builds a PLCP array; falling back to saturated encoding");
                }
                LcpRepr::Saturated(SaturatedLcp::encode(&lcp::kasai(multiseq.concat(), sa)))
            }
            LcpMethod::Kasai9 => {
                log::debug!("computing LCP via Kasai-9n (streamed SA cursor)");
                if config.succinct_lcp_get() {
                    log::warn!("succinct_lcp requested but LcpMethod::Kasai9 never builds a PLCP array; falling back to saturated encoding");
                }
                let isa = {
                    let mut isa = vec![0usize; sa.len()];
                    for (rank, &pos) in sa.iter().enumerate() {
                        isa[pos as usize] = rank;
                    }
                    isa
                };
                let dense = lcp::kasai_streamed(multiseq.concat(), multiseq.total_length(), &isa, |rank| sa[rank] as usize);
                LcpRepr::Saturated(SaturatedLcp::encode(&dense))
            }
            LcpMethod::Plcp5 => {
                log::debug!("computing LCP via PLCP-5n (Phi-array)");
                let plcp_array = lcp::plcp(multiseq.concat(), sa);
                if config.succinct_lcp_get() {
                    LcpRepr::Succinct(SuccinctPlcp::encode(&plcp_array))
                } else {
                    LcpRepr::Saturated(SaturatedLcp::encode(&lcp::lcp_from_plcp(sa, &plcp_array)))
                }
            }
        }
    }

    pub fn multiseq(&self) -> &Multiseq {
        &self.multiseq
    }

    pub fn suffix_array(&self) -> &[u32] {
        &self.sa
    }

    pub fn suftab_view(&self) -> Option<&SuftabView> {
        self.suftab_view.as_ref()
    }

    /// The number of suffixes not starting at a sequence separator and not
    /// the terminal empty suffix: the bound the bottom-up traversal (spec
    /// §4.H) walks up to.
    pub fn nonspecial_suffixes(&self) -> usize {
        let seq_count = self.multiseq.seq_count();
        self.multiseq.total_length().saturating_sub(seq_count.saturating_sub(1))
    }

    /// The LCP value at SA rank `rank`, or `0` if no LCP table was built.
    pub fn lcp_at(&self, rank: usize) -> u32 {
        match &self.lcp {
            LcpRepr::None => 0,
            LcpRepr::Saturated(s) => s.get(rank),
            LcpRepr::Succinct(s) => s.lcp_at(rank, &self.sa),
        }
    }

    fn seqnum_relpos_at(&self, sa_rank: usize) -> SeqnumRelpos {
        if let Some(view) = &self.suftab_view {
            let (seqnum, relpos) = view.get(sa_rank);
            return SeqnumRelpos { seqnum, relpos };
        }
        let pos = self.sa[sa_rank] as usize;
        let (seqnum, relpos) = self.multiseq.locate(pos);
        SeqnumRelpos {
            seqnum: seqnum as u32,
            relpos: relpos as u32,
        }
    }

    /// Runs the bottom-up lcp-interval traversal (spec §4.H) over this
    /// index's suffix array and LCP table.
    pub fn bottom_up_traversal(
        &self,
        on_leaf_edge: impl FnMut(bool, &Interval, SeqnumRelpos, bool),
        on_branching_edge: impl FnMut(bool, &Interval, &Interval, bool),
    ) {
        let n = self.nonspecial_suffixes();
        traversal::bottom_up_traversal(
            n,
            |i| self.seqnum_relpos_at(i),
            |rank| self.lcp_at(rank) as usize,
            on_leaf_edge,
            on_branching_edge,
        );
    }

    /// Writes the on-disk layout at `base.{prj,tis,suf,bsf,lcp,ll2,ll4,lls}`,
    /// writing `base.prj` last so its presence marks a complete index (spec
    /// §6, §7).
    pub fn save(&self, base: &Path) -> Result<()> {
        let io_err = |path: &Path| {
            move |source: std::io::Error| EsaError::InputIo {
                path: path.to_path_buf(),
                source,
            }
        };

        let tis_path = with_ext(base, "tis");
        File::create(&tis_path)
            .and_then(|f| BufWriter::new(f).write_all(self.multiseq.concat()))
            .map_err(io_err(&tis_path))?;

        let suf_path = with_ext(base, "suf");
        {
            let mut w = BufWriter::new(File::create(&suf_path).map_err(io_err(&suf_path))?);
            for &entry in &self.sa {
                w.write_all(&entry.to_ne_bytes()).map_err(io_err(&suf_path))?;
            }
        }

        if let Some(view) = &self.suftab_view {
            let bsf_path = with_ext(base, "bsf");
            File::create(&bsf_path)
                .and_then(|f| BufWriter::new(f).write_all(view.as_bytes()))
                .map_err(io_err(&bsf_path))?;
        }

        match &self.lcp {
            LcpRepr::None => {}
            LcpRepr::Saturated(s) => {
                let lcp_path = with_ext(base, "lcp");
                File::create(&lcp_path)
                    .and_then(|f| BufWriter::new(f).write_all(&s.primary))
                    .map_err(io_err(&lcp_path))?;

                let ll2_path = with_ext(base, "ll2");
                {
                    let mut w = BufWriter::new(File::create(&ll2_path).map_err(io_err(&ll2_path))?);
                    for &v in &s.secondary {
                        w.write_all(&v.to_ne_bytes()).map_err(io_err(&ll2_path))?;
                    }
                }

                let ll4_path = with_ext(base, "ll4");
                {
                    let mut w = BufWriter::new(File::create(&ll4_path).map_err(io_err(&ll4_path))?);
                    for &v in &s.tertiary {
                        w.write_all(&v.to_ne_bytes()).map_err(io_err(&ll4_path))?;
                    }
                }
            }
            LcpRepr::Succinct(_) => {
                // SuccinctPlcp does not expose its raw bits for serialization
                // today; `base.lls` is reserved for a future bitvector
                // byte-dump once `succinct_bitvector` grows one.
                log::warn!("succinct LCP requested but base.lls persistence is not yet implemented");
            }
        }

        let prj_path = with_ext(base, "prj");
        let mut prj = String::new();
        prj.push_str(&format!("reverse_complement\t{}\n", self.reverse_complement));
        prj.push_str(&format!("nonspecial_suffixes\t{}\n", self.nonspecial_suffixes()));
        prj.push_str(&format!("sequences_number\t{}\n", self.multiseq.seq_count()));
        prj.push_str(&format!("sequences_number_bits\t{}\n", self.multiseq.b_num()));
        prj.push_str(&format!("sequences_length_bits\t{}\n", self.multiseq.b_len()));
        let sizeof_suftab_entry = self.suftab_view.as_ref().map(SuftabView::byte_width).unwrap_or(4);
        prj.push_str(&format!("sizeof_suftab_entry\t{sizeof_suftab_entry}\n"));
        for source in self.multiseq.source_files() {
            prj.push_str(&format!("inputfile\t{}\n", source.display()));
        }
        File::create(&prj_path)
            .and_then(|f| BufWriter::new(f).write_all(prj.as_bytes()))
            .map_err(io_err(&prj_path))?;

        Ok(())
    }

    /// Reads back `base.tis`/`base.suf` (the files required to reconstruct
    /// the suffix array and multi-sequence text) and, if present,
    /// `base.lcp`/`.ll2`/`.ll4`. Sequence headers are not recoverable (spec
    /// §6's layout does not persist them).
    pub fn load<A: Alphabet>(base: &Path) -> Result<Self> {
        let io_err = |path: &Path| {
            move |source: std::io::Error| EsaError::InputIo {
                path: path.to_path_buf(),
                source,
            }
        };

        let tis_path = with_ext(base, "tis");
        let mut concat = Vec::new();
        File::open(&tis_path)
            .and_then(|mut f| f.read_to_end(&mut concat))
            .map_err(io_err(&tis_path))?;
        let multiseq = Multiseq::from_concat::<A>(concat, vec![]);

        let suf_path = with_ext(base, "suf");
        let mut suf_bytes = Vec::new();
        File::open(&suf_path)
            .and_then(|mut f| f.read_to_end(&mut suf_bytes))
            .map_err(io_err(&suf_path))?;
        if suf_bytes.len() % 4 != 0 {
            return Err(EsaError::InputFormat {
                path: suf_path.clone(),
                reason: "length is not a multiple of 4 bytes".to_string(),
            });
        }
        let sa: Vec<u32> = suf_bytes
            .chunks_exact(4)
            .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        let lcp_path = with_ext(base, "lcp");
        let lcp = if lcp_path.exists() {
            let mut primary = Vec::new();
            File::open(&lcp_path)
                .and_then(|mut f| f.read_to_end(&mut primary))
                .map_err(io_err(&lcp_path))?;
            let secondary = read_u16_stream(&with_ext(base, "ll2"))?;
            let tertiary = read_u32_stream(&with_ext(base, "ll4"))?;
            LcpRepr::Saturated(SaturatedLcp {
                primary,
                secondary,
                tertiary,
            })
        } else {
            LcpRepr::None
        };

        // base.bsf is rebuildable on demand via SuftabView::build; this path
        // does not reconstruct it from disk since doing so needs b_num/b_len
        // from base.prj, which load() does not parse today.
        Ok(Self {
            multiseq,
            sa,
            lcp,
            suftab_view: None,
            reverse_complement: false,
        })
    }
}

fn with_ext(base: &Path, ext: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    let file_name = path
        .file_name()
        .map(|n| format!("{}.{ext}", n.to_string_lossy()))
        .unwrap_or_else(|| format!("index.{ext}"));
    path.set_file_name(file_name);
    path
}

fn read_u16_stream(path: &Path) -> Result<Vec<u16>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut bytes = Vec::new();
    File::open(path)
        .and_then(|mut f| f.read_to_end(&mut bytes))
        .map_err(|source| EsaError::InputIo {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(bytes.chunks_exact(2).map(|c| u16::from_ne_bytes([c[0], c[1]])).collect())
}

fn read_u32_stream(path: &Path) -> Result<Vec<u32>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut bytes = Vec::new();
    File::open(path)
        .and_then(|mut f| f.read_to_end(&mut bytes))
        .map_err(|source| EsaError::InputIo {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(bytes
        .chunks_exact(4)
        .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Dna;
    use crate::config::{EsaConfig, LcpMethod};

    #[test]
    fn scenario_s1_end_to_end() {
        let records = vec![SequenceRecord {
            header: Some("s1".to_string()),
            bytes: b"ACGTACGT".to_vec(),
        }];
        let esa = EsaConfig::new()
            .lcp_method(LcpMethod::Kasai13)
            .emit_packed_suftab(true)
            .construct::<Dna>(&records, vec![])
            .unwrap();

        assert_eq!(esa.suffix_array(), &[4, 0, 5, 1, 6, 2, 7, 3, 8]);
        assert_eq!(esa.nonspecial_suffixes(), 8);
        for (rank, &expected) in [0u32, 4, 0, 3, 0, 2, 0, 1, 0].iter().enumerate() {
            assert_eq!(esa.lcp_at(rank), expected);
        }
    }

    #[test]
    fn save_and_load_round_trips_sa_and_lcp() {
        let dir = std::env::temp_dir().join(format!("esadex-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let base = dir.join("idx");

        let records = vec![SequenceRecord {
            header: None,
            bytes: b"ACGTACGT".to_vec(),
        }];
        let esa = EsaConfig::new()
            .lcp_method(LcpMethod::Kasai13)
            .construct::<Dna>(&records, vec![])
            .unwrap();
        esa.save(&base).unwrap();
        assert!(with_ext(&base, "prj").exists());

        let reloaded = EnhancedSuffixArray::load::<Dna>(&base).unwrap();
        assert_eq!(reloaded.suffix_array(), esa.suffix_array());
        for rank in 0..reloaded.suffix_array().len() {
            assert_eq!(reloaded.lcp_at(rank), esa.lcp_at(rank));
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn bottom_up_traversal_visits_every_leaf() {
        let records = vec![SequenceRecord {
            header: None,
            bytes: b"ACGTACGT".to_vec(),
        }];
        let esa = EsaConfig::new().lcp_method(LcpMethod::Kasai13).construct::<Dna>(&records, vec![]).unwrap();

        let mut leaf_count = 0;
        esa.bottom_up_traversal(|_, _, _, _| leaf_count += 1, |_, _, _, _| {});
        assert_eq!(leaf_count, 8);
    }
}

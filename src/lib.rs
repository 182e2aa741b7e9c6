/*! This library builds enhanced suffix arrays over DNA and protein sequence
 * collections for bioinformatics indexing and comparison.
 *
 * An enhanced suffix array pairs a plain suffix array with a longest-common-
 * prefix (LCP) table; walking both together in one linear pass recovers the
 * full suffix-tree topology without ever materializing the tree itself. This
 * crate builds the suffix array with a linear-time SA-IS construction,
 * offers three LCP construction strategies trading memory for passes over
 * the text, and exposes a bottom-up traversal over the resulting lcp-interval
 * tree alongside a windowed minimizer extractor and a maximal-exact-match
 * seed chainer for sequence comparison.
 *
 * ## Usage
 *
 * ```
 * use esadex::{EsaConfig, alphabet::Dna, multiseq::SequenceRecord};
 *
 * let records = [SequenceRecord {
 *     header: Some("example".to_string()),
 *     bytes: b"ACGTACGT".to_vec(),
 * }];
 *
 * let esa = EsaConfig::new()
 *     .lcp_method(esadex::config::LcpMethod::Kasai13)
 *     .construct::<Dna>(&records, vec![])
 *     .unwrap();
 *
 * assert_eq!(esa.suffix_array().len(), esa.multiseq().total_length() + 1);
 * ```
 *
 * More information about suffix array construction, the LCP table variants,
 * and the on-disk index layout can be found in the module-level
 * documentation of [`config`] and [`index`].
 */

pub mod alphabet;
pub mod char_range;
pub mod chain;
pub mod config;
pub mod error;
pub mod index;
pub mod lcp;
pub mod minimizer;
pub mod multiseq;
pub mod packed_record;
pub mod radix_sort;
pub mod rolling_hash;
pub mod sais;
pub mod succinct_bitvector;
pub mod suftab_view;
pub mod support;
pub mod traversal;

#[doc(inline)]
pub use alphabet::Alphabet;
#[doc(inline)]
pub use config::EsaConfig;
#[doc(inline)]
pub use error::{EsaError, Result};
#[doc(inline)]
pub use index::EnhancedSuffixArray;

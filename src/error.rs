//! Error kinds surfaced by every fallible operation in this crate.
//!
//! Following the hard line drawn in the design notes: input-format and
//! configuration problems return a [`EsaError`], broken internal invariants
//! panic instead of being encoded here.

use std::path::PathBuf;

/// Every fallible operation in this crate returns this error type.
#[derive(Debug, thiserror::Error)]
pub enum EsaError {
    #[error("file \"{path}\" could not be opened or read: {source}")]
    InputIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file \"{path}\" {reason}")]
    InputFormat { path: PathBuf, reason: String },

    #[error(
        "input \"{protein_path}\" was detected as protein, but \"{dna_path}\" was detected as DNA"
    )]
    IncompatiblePair {
        protein_path: PathBuf,
        dna_path: PathBuf,
    },

    #[error("invalid configuration: {reason}")]
    ConfigInvalid { reason: String },

    #[error("value {value} does not fit into {bits} bits for field {field}")]
    BitOverflow {
        field: &'static str,
        value: u64,
        bits: u32,
    },

    #[error("packed-record bit widths sum to {total_bits}, exceeding the {max_bits}-bit budget")]
    BitBudgetExceeded { total_bits: u32, max_bits: u32 },

    #[error("allocation of {requested_bytes} bytes failed")]
    OutOfMemory { requested_bytes: usize },

    #[error("reduced alphabet of size {size} does not fit into the suffix array base type")]
    AlphabetTooLarge { size: usize },

    #[error("cannot build a suffix array for an empty sequence")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, EsaError>;

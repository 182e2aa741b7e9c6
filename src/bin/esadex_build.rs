//! Command-line index builder (spec §6's external CLI surface).
//!
//! Grounded on spec §6's flag table; argument parsing follows the shape of
//! other `clap`-derive CLIs in the corpus (one `#[derive(Parser)]` struct,
//! `value_enum` for the closed LCP-method choice, `-v`/`--verbose` wired to
//! `env_logger`'s filter).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use esadex::alphabet::{Dna, Protein};
use esadex::config::{EsaConfig, LcpMethod};
use esadex::multiseq::{self, SequenceRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LcpMethodArg {
    None,
    Kasai13,
    Kasai9,
    Plcp5,
}

impl From<LcpMethodArg> for LcpMethod {
    fn from(arg: LcpMethodArg) -> Self {
        match arg {
            LcpMethodArg::None => LcpMethod::None,
            LcpMethodArg::Kasai13 => LcpMethod::Kasai13,
            LcpMethodArg::Kasai9 => LcpMethod::Kasai9,
            LcpMethodArg::Plcp5 => LcpMethod::Plcp5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AlphabetArg {
    Dna,
    Protein,
}

/// Build an enhanced suffix array index from FASTA/FASTQ input files.
#[derive(Debug, Parser)]
#[command(name = "esadex-build", version, about)]
struct Cli {
    /// Input FASTA/FASTQ files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output index base name; files are written as `<name>.{prj,tis,suf,...}`.
    #[arg(short, long)]
    output: PathBuf,

    /// Which LCP table to build alongside the suffix array.
    #[arg(long, value_enum, default_value_t = LcpMethodArg::None)]
    lcp_method: LcpMethodArg,

    /// Input alphabet. If omitted, sniffed from the first input file.
    #[arg(long, value_enum)]
    alphabet: Option<AlphabetArg>,

    /// Store the LCP table as a succinct unary-coded bitvector instead of
    /// the saturated three-tier byte streams. Only effective with
    /// `--lcp-method plcp5`.
    #[arg(long)]
    succinct_lcp: bool,

    /// Append a reverse-complement companion sequence after every input
    /// sequence (DNA alphabets only).
    #[arg(long)]
    reverse_complement: bool,

    /// Also build and persist the packed `(seqnum, relpos)` suffix array
    /// view (`base.bsf`).
    #[arg(long)]
    emit_packed_suftab: bool,

    /// Increase log verbosity; repeat for more detail (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> esadex::Result<()> {
    let mut records: Vec<SequenceRecord> = Vec::new();
    for path in &cli.inputs {
        log::info!("reading {}", path.display());
        records.extend(read_records(path)?);
    }

    let alphabet_kind = cli.alphabet.unwrap_or_else(|| {
        let sniffed = multiseq::sniff_alphabet_kind(&records[0].bytes);
        match sniffed {
            multiseq::AlphabetKind::Dna => AlphabetArg::Dna,
            multiseq::AlphabetKind::Protein => AlphabetArg::Protein,
        }
    });

    let config = EsaConfig::new()
        .lcp_method(cli.lcp_method.into())
        .succinct_lcp(cli.succinct_lcp)
        .reverse_complement(cli.reverse_complement)
        .emit_packed_suftab(cli.emit_packed_suftab);

    let esa = match alphabet_kind {
        AlphabetArg::Dna => config.construct::<Dna>(&records, cli.inputs.clone())?,
        AlphabetArg::Protein => config.construct::<Protein>(&records, cli.inputs.clone())?,
    };

    log::info!("{}", esa.multiseq().statistics());
    esa.save(&cli.output)?;
    log::info!("wrote index to {}", cli.output.display());

    Ok(())
}

fn read_records(path: &PathBuf) -> esadex::Result<Vec<SequenceRecord>> {
    let file = std::fs::File::open(path).map_err(|source| esadex::EsaError::InputIo {
        path: path.clone(),
        source,
    })?;
    let reader = std::io::BufReader::new(file);

    let is_fastq = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("fastq") || ext.eq_ignore_ascii_case("fq"))
        .unwrap_or(false);

    if is_fastq {
        multiseq::parse_fastq(reader, path)
    } else {
        multiseq::parse_fasta(reader, path)
    }
}

use esadex::alphabet::{Alphabet, Dna};
use esadex::chain::{MatchLayout, extend_seed, pack_sort_dedup};
use esadex::minimizer::{MinimizerConfig, extract_minimizers};
use esadex::multiseq::{Multiseq, SequenceRecord};

fn main() {
    // This example shows the two building blocks a seed-and-extend aligner
    // would combine: windowed minimizer extraction (to pick sparse anchors)
    // and seed extension into maximal exact matches (to turn an anchor into
    // a scored alignment seed).

    let records = [SequenceRecord {
        header: Some("sample".to_string()),
        bytes: b"ACGTACGTACGTACGT".to_vec(),
    }];
    let multiseq = Multiseq::build::<Dna>(&records, vec![], false).unwrap();

    let config = MinimizerConfig {
        k: 4,
        w: 3,
        canonical: false,
    };
    let minimizers = extract_minimizers(&multiseq, &config, Dna::undefined_rank(), 1);
    println!("extracted {} minimizers", minimizers.len());

    // Extending a seed k-mer match between two copies of the same sequence
    // produces a single maximal exact match spanning the whole repeat.
    let ranks = multiseq.concat();
    let mem = extend_seed(ranks, ranks, 0, 0, 4, 8, 4, 4).unwrap();
    assert_eq!(mem.length, 12);

    let layout = MatchLayout::new(8, 16, 8, 4).unwrap();
    let packed = pack_sort_dedup(&layout, &[mem, mem]);
    assert_eq!(packed.len(), layout.byte_width());
}

use esadex::alphabet::Dna;
use esadex::config::LcpMethod;
use esadex::multiseq::SequenceRecord;
use esadex::{EnhancedSuffixArray, EsaConfig};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn random_dna_bytes(rng: &mut impl rand::Rng, len: usize) -> Vec<u8> {
    const BASES: &[u8] = b"ACGT";
    (0..len).map(|_| BASES[rng.random_range(0..4)]).collect()
}

fn temp_base(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("esadex-round-trip-{name}-{}", std::process::id()))
}

fn cleanup(base: &std::path::Path) {
    for ext in ["prj", "tis", "suf", "bsf", "lcp", "ll2", "ll4", "lls"] {
        let mut path = base.to_path_buf();
        let name = format!("{}.{ext}", path.file_name().unwrap().to_string_lossy());
        path.set_file_name(name);
        let _ = std::fs::remove_file(path);
    }
}

#[test]
fn saved_and_reloaded_index_has_identical_suffix_array_and_lcp() {
    let base = temp_base("basic");
    let records = vec![SequenceRecord {
        header: None,
        bytes: b"GATTACAGATTACAGATTACA".to_vec(),
    }];

    let esa = EsaConfig::new()
        .lcp_method(LcpMethod::Kasai13)
        .construct::<Dna>(&records, vec![])
        .unwrap();
    esa.save(&base).unwrap();

    let reloaded = EnhancedSuffixArray::load::<Dna>(&base).unwrap();
    assert_eq!(reloaded.suffix_array(), esa.suffix_array());
    assert_eq!(reloaded.multiseq().total_length(), esa.multiseq().total_length());
    for rank in 0..esa.suffix_array().len() {
        assert_eq!(reloaded.lcp_at(rank), esa.lcp_at(rank));
    }

    cleanup(&base);
}

#[test]
fn reloaded_index_recovers_sequence_boundaries_without_headers() {
    let base = temp_base("boundaries");
    let records = vec![
        SequenceRecord {
            header: Some("first".to_string()),
            bytes: b"ACGTACGT".to_vec(),
        },
        SequenceRecord {
            header: Some("second".to_string()),
            bytes: b"TTTTGGGG".to_vec(),
        },
    ];

    let esa = EsaConfig::new().construct::<Dna>(&records, vec![]).unwrap();
    esa.save(&base).unwrap();

    let reloaded = EnhancedSuffixArray::load::<Dna>(&base).unwrap();
    assert_eq!(reloaded.multiseq().seq_count(), esa.multiseq().seq_count());
    assert_eq!(reloaded.multiseq().concat(), esa.multiseq().concat());

    cleanup(&base);
}

#[test]
fn index_without_lcp_method_has_no_lcp_file() {
    let base = temp_base("no-lcp");
    let records = vec![SequenceRecord {
        header: None,
        bytes: b"ACGTACGT".to_vec(),
    }];

    let esa = EsaConfig::new().construct::<Dna>(&records, vec![]).unwrap();
    esa.save(&base).unwrap();

    let mut lcp_path = base.clone();
    lcp_path.set_file_name(format!("{}.lcp", base.file_name().unwrap().to_string_lossy()));
    assert!(!lcp_path.exists());

    let reloaded = EnhancedSuffixArray::load::<Dna>(&base).unwrap();
    assert_eq!(reloaded.lcp_at(1), 0);

    cleanup(&base);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]
    #[test]
    fn round_trip_holds_over_random_sequences(seed in 0u64..1000, len in 4usize..80) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let base = temp_base(&format!("prop-{seed}-{len}"));
        let records = vec![SequenceRecord {
            header: None,
            bytes: random_dna_bytes(&mut rng, len),
        }];

        let esa = EsaConfig::new()
            .lcp_method(LcpMethod::Plcp5)
            .construct::<Dna>(&records, vec![])
            .unwrap();
        esa.save(&base).unwrap();

        let reloaded = EnhancedSuffixArray::load::<Dna>(&base).unwrap();
        prop_assert_eq!(reloaded.suffix_array(), esa.suffix_array());
        for rank in 0..esa.suffix_array().len() {
            prop_assert_eq!(reloaded.lcp_at(rank), esa.lcp_at(rank));
        }

        cleanup(&base);
    }
}

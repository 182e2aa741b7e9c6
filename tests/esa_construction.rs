use esadex::alphabet::Dna;
use esadex::{config::LcpMethod, multiseq::SequenceRecord, EsaConfig};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// The empty (terminal) suffix always sorts last in this crate's convention
// (`SA[T] == T`), rather than first as plain byte-slice comparison would
// place it; every other suffix compares in ordinary ascending rank order.
fn naive_suffix_array(ranks: &[u8]) -> Vec<u32> {
    let n = ranks.len();
    let mut order: Vec<u32> = (0..n as u32).collect();
    order.sort_by(|&a, &b| ranks[a as usize..].cmp(&ranks[b as usize..]));
    order.push(n as u32);
    order
}

fn random_dna_bytes(rng: &mut impl rand::Rng, len: usize) -> Vec<u8> {
    const BASES: &[u8] = b"ACGT";
    (0..len).map(|_| BASES[rng.random_range(0..4)]).collect()
}

#[test]
fn sa_matches_naive_sort_on_repetitive_text() {
    let records = vec![SequenceRecord {
        header: None,
        bytes: b"ACGTACGTACGT".to_vec(),
    }];
    let esa = EsaConfig::new().construct::<Dna>(&records, vec![]).unwrap();

    let expected = naive_suffix_array(esa.multiseq().concat());
    assert_eq!(esa.suffix_array(), expected.as_slice());
}

#[test]
fn sa_matches_naive_sort_over_random_sequences() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for trial in 0..30 {
        let seq_count = 1 + trial % 4;
        let records: Vec<SequenceRecord> = (0..seq_count)
            .map(|_| SequenceRecord {
                header: None,
                bytes: random_dna_bytes(&mut rng, 5 + trial * 3),
            })
            .collect();

        let esa = EsaConfig::new().construct::<Dna>(&records, vec![]).unwrap();
        let expected = naive_suffix_array(esa.multiseq().concat());
        assert_eq!(esa.suffix_array(), expected.as_slice(), "trial {trial}");
    }
}

#[test]
fn kasai_and_plcp_lcp_methods_agree() {
    let records = vec![SequenceRecord {
        header: None,
        bytes: b"GATTACAGATTACA".to_vec(),
    }];

    let kasai = EsaConfig::new()
        .lcp_method(LcpMethod::Kasai13)
        .construct::<Dna>(&records, vec![])
        .unwrap();
    let streamed = EsaConfig::new()
        .lcp_method(LcpMethod::Kasai9)
        .construct::<Dna>(&records, vec![])
        .unwrap();
    let plcp = EsaConfig::new()
        .lcp_method(LcpMethod::Plcp5)
        .construct::<Dna>(&records, vec![])
        .unwrap();

    for rank in 0..kasai.suffix_array().len() {
        assert_eq!(kasai.lcp_at(rank), streamed.lcp_at(rank));
        assert_eq!(kasai.lcp_at(rank), plcp.lcp_at(rank));
    }
}

#[test]
fn succinct_plcp_matches_saturated_lcp() {
    let records = vec![SequenceRecord {
        header: None,
        bytes: b"MISSISSIPPIMISSISSIPPI".to_vec(),
    }];

    let dense = EsaConfig::new()
        .lcp_method(LcpMethod::Plcp5)
        .construct::<esadex::alphabet::Protein>(&records, vec![])
        .unwrap();
    let succinct = EsaConfig::new()
        .lcp_method(LcpMethod::Plcp5)
        .succinct_lcp(true)
        .construct::<esadex::alphabet::Protein>(&records, vec![])
        .unwrap();

    for rank in 0..dense.suffix_array().len() {
        assert_eq!(dense.lcp_at(rank), succinct.lcp_at(rank));
    }
}

proptest! {
    #[test]
    fn sa_is_always_a_permutation_of_0_to_t(len in 1usize..60) {
        let bytes: Vec<u8> = (0..len).map(|i| b"ACGT"[i % 4]).collect();
        let records = vec![SequenceRecord { header: None, bytes }];
        let esa = EsaConfig::new().construct::<Dna>(&records, vec![]).unwrap();

        let mut sorted: Vec<u32> = esa.suffix_array().to_vec();
        sorted.sort_unstable();
        let expected: Vec<u32> = (0..=esa.multiseq().total_length() as u32).collect();
        prop_assert_eq!(sorted, expected);
    }
}

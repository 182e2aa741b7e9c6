use esadex::config::LcpMethod;
use esadex::multiseq::SequenceRecord;
use esadex::{Alphabet, EsaConfig, alphabet::Dna};

fn main() {
    // This example shows how to build an enhanced suffix array over a small
    // set of DNA sequences and read back the suffix array and LCP table.

    let records = [
        SequenceRecord {
            header: Some("seq1".to_string()),
            bytes: b"ACGTACGT".to_vec(),
        },
        SequenceRecord {
            header: Some("seq2".to_string()),
            bytes: b"TTACGTAA".to_vec(),
        },
    ];

    let esa = EsaConfig::new()
        .lcp_method(LcpMethod::Kasai13)
        .construct::<Dna>(&records, vec![])
        .unwrap();

    println!("sequences: {}", esa.multiseq().statistics());

    for (rank, &pos) in esa.suffix_array().iter().enumerate() {
        let lcp = esa.lcp_at(rank);
        println!("SA[{rank}] = {pos}, LCP = {lcp}");
    }

    // Ranks translate back into characters through the same alphabet used
    // to build the index.
    let first_base = esa.multiseq().concat()[0];
    assert_eq!(Dna::char_of(first_base), b'A');
}

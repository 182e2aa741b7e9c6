use esadex::EnhancedSuffixArray;
use esadex::alphabet::Dna;
use esadex::config::LcpMethod;
use esadex::multiseq::SequenceRecord;
use esadex::EsaConfig;

fn main() {
    // This example shows how to persist an enhanced suffix array to disk
    // (`base.prj`/`.tis`/`.suf`/`.lcp`/`.ll2`/`.ll4`) and read it back.

    let records = [SequenceRecord {
        header: Some("seq".to_string()),
        bytes: b"ACGTACGT".to_vec(),
    }];

    let esa = EsaConfig::new()
        .lcp_method(LcpMethod::Kasai13)
        .construct::<Dna>(&records, vec![])
        .unwrap();

    let base = std::env::temp_dir().join("esadex-demo-index");
    esa.save(&base).unwrap();

    let reloaded = EnhancedSuffixArray::load::<Dna>(&base).unwrap();
    assert_eq!(reloaded.suffix_array(), esa.suffix_array());
    for rank in 0..reloaded.suffix_array().len() {
        assert_eq!(reloaded.lcp_at(rank), esa.lcp_at(rank));
    }

    println!("round-tripped index with {} suffixes", reloaded.suffix_array().len());

    for ext in ["prj", "tis", "suf", "lcp", "ll2", "ll4"] {
        let _ = std::fs::remove_file(base.with_extension(ext));
    }
}

use esadex::config::LcpMethod;
use esadex::multiseq::SequenceRecord;
use esadex::{EsaConfig, alphabet::Dna};

fn main() {
    // This example walks the bottom-up lcp-interval traversal over a small
    // index, counting how many branching intervals (repeated substrings)
    // and leaf edges (individual suffixes) the traversal visits.

    let records = [SequenceRecord {
        header: Some("repetitive".to_string()),
        bytes: b"ACGTACGT".to_vec(),
    }];

    let esa = EsaConfig::new()
        .lcp_method(LcpMethod::Kasai13)
        .construct::<Dna>(&records, vec![])
        .unwrap();

    let mut leaf_edges = 0;
    let mut branching_edges = 0;

    esa.bottom_up_traversal(
        |_first_edge, interval, seqnum_relpos, _last_child| {
            leaf_edges += 1;
            println!(
                "leaf: interval lcp={} [{}, {}] suffix at seqnum={} relpos={}",
                interval.lcp, interval.lb, interval.rb, seqnum_relpos.seqnum, seqnum_relpos.relpos
            );
        },
        |_first_edge, parent, child, _last_child| {
            branching_edges += 1;
            println!(
                "branch: parent lcp={} child lcp={}",
                parent.lcp, child.lcp
            );
        },
    );

    assert_eq!(leaf_edges, 8);
    assert!(branching_edges > 0);
}

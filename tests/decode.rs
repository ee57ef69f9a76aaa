use std::sync::mpsc;

use life_rules::rules::{
    ErrorKind, Family, Incompatibility, MemoryFetcher, Neighborhood, RuleDecoder, RuleError,
    Topology, max_neighbors,
};

fn decode(rule: &str) -> Result<life_rules::RuleDescriptor, RuleError> {
    RuleDecoder::new().decode(rule)
}

/// Von Neumann parity tree: the next state is N xor W xor E xor S.
fn parity_tree(nodes: usize) -> String {
    let mut lines = vec![
        "@RULE Parity".to_string(),
        "@TREE".to_string(),
        "num_states=2".to_string(),
        "num_neighbors=4".to_string(),
        format!("num_nodes={nodes}"),
        "1 0 0".to_string(),
        "1 1 1".to_string(),
    ];
    for level in 2..=4 {
        let even = 2 * (level - 2);
        lines.push(format!("{level} {} {}", even, even + 1));
        lines.push(format!("{level} {} {}", even + 1, even));
    }
    lines.push("5 6 7".to_string());
    lines.join("\n")
}

#[test]
fn conways_life() {
    let d = decode("B3/S23").unwrap();
    assert_eq!(d.name(), "B3/S23");
    assert_eq!(d.alias(), Some("Conway's Life"));
    assert_eq!(d.states(), 2);
    assert_eq!(d.neighborhood(), Neighborhood::Moore);
    let table = d.table().unwrap();
    assert!(table.is_birth(0b111));
    assert!(!table.is_birth(0b11));
    assert!(table.is_survival(0b11));
    assert!(!table.is_survival(0b1111));
    assert!(!d.has_b0());
}

#[test]
fn larger_than_life() {
    let d = decode("R2,C0,M1,S6..9,B7..8,NM").unwrap();
    assert_eq!(d.states(), 2);
    assert_eq!(d.neighborhood(), Neighborhood::Moore);
    assert_eq!(d.name(), "R2,C2,S5-8,B7-8");
    let Family::Ltl(ltl) = d.family() else {
        panic!("expected a Larger than Life rule, got {:?}", d.family().name());
    };
    assert_eq!(ltl.range, 2);
    assert!(ltl.middle_included);
    assert_eq!((ltl.survival_min, ltl.survival_max), (6, 9));
    assert_eq!((ltl.birth_min, ltl.birth_max), (7, 8));
    assert_eq!(max_neighbors(Neighborhood::Moore, 2), 24);
    assert_eq!(ltl.counts.max_count(), 24);

    // The canonical form is the HROT list form and decodes to the same counts.
    let again = decode(d.name()).unwrap();
    assert_eq!(again.name(), d.name());
    let Family::Hrot(hrot) = again.family() else {
        panic!("expected an HROT rule, got {:?}", again.family().name());
    };
    assert_eq!(hrot.counts, ltl.counts);
    let d = decode("R1,C3,M0,S2..3,B3..3,NN").unwrap();
    assert_eq!(d.name(), "R1,C3,S2-3,B3,NN");
}

#[test]
fn bosco_alias_uses_list_form() {
    let d = decode("R5,C0,M1,S34..58,B34..45,NM").unwrap();
    assert_eq!(d.name(), "R5,C2,S33-57,B34-45");
    assert_eq!(d.alias(), Some("Bosco's Rule"));
    assert_eq!(decode("Bosco's Rule").unwrap().name(), d.name());
}

#[test]
fn alternate_rules() {
    let d = decode("B3/S23|B2/S").unwrap();
    assert_eq!(d.name(), "B3/S23|B2/S");
    let other = d.alternate().unwrap();
    assert_eq!(other.name(), "B2/S");
    assert_eq!(other.states(), d.states());
    assert_eq!(
        decode("B3/S23|B2/SV").unwrap_err(),
        RuleError::Incompatible(Incompatibility::Neighborhood)
    );
}

#[test]
fn bounded_torus() {
    let d = decode("B3/S23:T10,5").unwrap();
    let grid = d.bounded().unwrap();
    assert_eq!(grid.topology, Topology::Torus);
    assert_eq!((grid.width, grid.height), (10, 5));
    assert_eq!(d.name(), "B3/S23:T10,5");

    let d = decode("B3/S23:T10+2,5").unwrap();
    assert_eq!(d.bounded().unwrap().h_shift, 2);
    assert!(decode("B3/S23:T10+2*").is_err());
    assert!(decode("B3/S23:T10+2*,5").is_err());
}

#[test]
fn map_length_names_valid_lengths() {
    let rule = format!("MAP{}", "A".repeat(87));
    let err = decode(&rule).unwrap_err();
    assert_eq!(err, RuleError::MapLength { found: 87 });
    assert_eq!(err.kind(), ErrorKind::Structural);
    assert!(err.to_string().contains("6, 22 or 86"));
}

#[test]
fn all_zero_map_of_odd_length() {
    let rule = "MAPAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
    let err = decode(rule).unwrap_err();
    assert_eq!(err, RuleError::MapLength { found: rule.len() - 3 });
    assert_eq!(err.kind(), ErrorKind::Structural);
    assert!(err.to_string().contains("6, 22 or 86"), "{err}");
}

#[test]
fn rule_tree_entry_mismatch() {
    let mut decoder = RuleDecoder::new();
    let d = decoder.decode_rule_table(&parity_tree(9), "Parity").unwrap();
    assert_eq!(d.name(), "Parity");
    assert_eq!(d.neighborhood(), Neighborhood::VonNeumann);

    let err = decoder.decode_rule_table(&parity_tree(10), "Parity").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
    assert_eq!(
        err,
        RuleError::TokenCount {
            what: "rule tree entries",
            expected: 20,
            found: 18
        }
    );
}

#[test]
fn canonical_names_are_regenerated() {
    assert_eq!(decode("b36/s23").unwrap().name(), "B36/S23");
    assert_eq!(decode("23/3").unwrap().name(), "B3/S23");
    assert_eq!(decode("B3/S2-i34q").unwrap().alias(), Some("tlife"));
    assert_eq!(decode("B2/S/C3").unwrap().alias(), Some("Brian's Brain"));
    assert_eq!(decode("W30").unwrap().name(), "W30");
}

#[test]
fn fetch_fallback_decodes_rule_tree() {
    let fetcher = MemoryFetcher::new().with_rule("Parity", parity_tree(9));
    let mut decoder = RuleDecoder::new();
    let (tx, rx) = mpsc::channel();

    let sent = tx.clone();
    decoder.decode_or_fetch("B3/S23", &fetcher, move |r| sent.send(r).unwrap());
    assert_eq!(rx.recv().unwrap().unwrap().name(), "B3/S23");

    let sent = tx.clone();
    decoder.decode_or_fetch("Parity", &fetcher, move |r| sent.send(r).unwrap());
    let d = rx.recv().unwrap().unwrap();
    assert!(matches!(d.family(), Family::RuleTree(_)));
    assert_eq!(d.states(), 2);
}

#[test]
fn failed_fetch_reports_original_error() {
    let original = decode("Unknown").unwrap_err();
    let mut decoder = RuleDecoder::new();
    let (tx, rx) = mpsc::channel();
    decoder.decode_or_fetch("Unknown", &MemoryFetcher::new(), move |r| tx.send(r).unwrap());
    assert_eq!(rx.recv().unwrap().unwrap_err(), original);
}

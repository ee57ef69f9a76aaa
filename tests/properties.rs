//! Property-based tests for canonical names and range bounds.

use proptest::prelude::*;

use life_rules::rules::symmetry::letters;
use life_rules::rules::{
    DecoderConfig, ErrorKind, Family, Neighborhood, RuleDecoder, max_neighbors, prefers_inverted,
};

fn count_char(count: u8) -> char {
    if count < 10 {
        char::from(b'0' + count)
    } else {
        char::from(b'a' + count - 10)
    }
}

/// One B or S part from a bitmask of enabled counts and per-count letter masks.
fn part(neighborhood: Neighborhood, enabled: u16, masks: &[u16], first: u8) -> String {
    let mut out = String::new();
    for count in first..=neighborhood.max_count() {
        if enabled & (1 << count) == 0 {
            continue;
        }
        out.push(count_char(count));
        let names = letters(neighborhood, count);
        let mask = masks[count as usize];
        let picked: String = names
            .chars()
            .enumerate()
            .filter(|&(i, _)| mask & (1 << i) != 0)
            .map(|(_, c)| c)
            .collect();
        if !picked.is_empty() && picked.len() < names.len() {
            out.push_str(&picked);
        }
    }
    out
}

fn lettered_neighborhood() -> impl Strategy<Value = Neighborhood> {
    prop_oneof![Just(Neighborhood::Moore), Just(Neighborhood::Hex)]
}

fn any_neighborhood() -> impl Strategy<Value = Neighborhood> {
    prop_oneof![
        Just(Neighborhood::Moore),
        Just(Neighborhood::Hex),
        Just(Neighborhood::VonNeumann),
        Just(Neighborhood::TriangularAll),
        Just(Neighborhood::TriangularEdges),
        Just(Neighborhood::TriangularVertices),
    ]
}

/// B/S rule over `neighborhood`, optionally with a Generations state count.
fn bs_rule(
    neighborhood: impl Strategy<Value = Neighborhood>,
    generations: bool,
) -> impl Strategy<Value = String> {
    let states = if generations {
        prop::option::of(3u16..=256).boxed()
    } else {
        Just(None).boxed()
    };
    (
        neighborhood,
        any::<u16>(),
        prop::collection::vec(any::<u16>(), 13),
        any::<u16>(),
        prop::collection::vec(any::<u16>(), 13),
        states,
    )
        .prop_map(|(nh, b, bm, s, sm, states)| {
            let mut rule = format!("B{}/S{}", part(nh, b, &bm, 1), part(nh, s, &sm, 0));
            if let Some(n) = states {
                rule.push_str(&format!("/C{n}"));
            }
            rule.push_str(nh.postfix());
            rule
        })
}

/// Letter groups of a canonical part: `(count, inverted, letters)`.
fn groups(part: &str) -> Vec<(u8, bool, String)> {
    let mut out: Vec<(u8, bool, String)> = Vec::new();
    for c in part.chars() {
        if let Some(d) = c.to_digit(10) {
            out.push((d as u8, false, String::new()));
        } else if let Some(last) = out.last_mut() {
            if c == '-' {
                last.1 = true;
            } else {
                last.2.push(c);
            }
        }
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn canonical_name_is_a_fixed_point(rule in bs_rule(any_neighborhood(), true)) {
        let mut decoder = RuleDecoder::new();
        let first = decoder.decode(&rule).unwrap();
        let second = decoder.decode(first.name()).unwrap();
        prop_assert_eq!(first.name(), second.name());
        prop_assert_eq!(first.table(), second.table());
        prop_assert_eq!(first.states(), second.states());
        prop_assert_eq!(first.neighborhood(), second.neighborhood());
    }

    #[test]
    fn canonical_letters_use_the_shorter_form(rule in bs_rule(lettered_neighborhood(), false)) {
        let mut decoder = RuleDecoder::new();
        let d = decoder.decode(&rule).unwrap();
        let name = d.name();
        let bare = name.strip_suffix(d.neighborhood().postfix()).unwrap();
        let (birth, survival) = bare.split_once('/').unwrap();
        for part in [&birth[1..], &survival[1..]] {
            for (count, inverted, listed) in groups(part) {
                if listed.is_empty() {
                    prop_assert!(!inverted);
                    continue;
                }
                let total = letters(d.neighborhood(), count).len();
                prop_assert!(listed.len() < total);
                let set = if inverted { total - listed.len() } else { listed.len() };
                prop_assert_eq!(prefers_inverted(set, total), inverted, "{} in {}", count, name);
            }
        }
    }

    #[test]
    fn ltl_bounds_stay_within_neighbor_count(
        range in 1u32..=12,
        a in 0u32..400,
        b in 0u32..400,
        von_neumann in any::<bool>(),
    ) {
        let (code, neighborhood) = if von_neumann {
            ("N", Neighborhood::VonNeumann)
        } else {
            ("M", Neighborhood::Moore)
        };
        let max = max_neighbors(neighborhood, range);
        let (lo, hi) = (a.min(b), a.max(b));
        let rule = format!("R{range},C0,M1,S{lo}..{hi},B{lo}..{hi},N{code}");
        let result = RuleDecoder::new().decode(&rule);
        if hi <= max {
            let d = result.unwrap();
            let Family::Ltl(ltl) = d.family() else {
                panic!("{rule} is not a Larger than Life rule");
            };
            prop_assert_eq!(ltl.counts.max_count(), max as usize);
            prop_assert!(ltl.birth_max <= max);
        } else {
            prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::Range);
        }
    }

    #[test]
    fn range_is_limited_by_config(range in 1u32..40, limit in 1u32..40) {
        let mut decoder = RuleDecoder::with_config(DecoderConfig::default().max_range(limit));
        let result = decoder.decode(&format!("R{range},C2,S2,B3"));
        if range <= limit {
            prop_assert_eq!(result.unwrap().family().range(), range);
        } else {
            prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::Range);
        }
    }
}

#[test]
fn neighbor_counts_by_shape() {
    for r in 1..=10u32 {
        assert_eq!(max_neighbors(Neighborhood::Moore, r), (2 * r + 1) * (2 * r + 1) - 1);
        assert_eq!(max_neighbors(Neighborhood::VonNeumann, r), 2 * r * (r + 1));
        let circular = max_neighbors(Neighborhood::Circular, r);
        assert!(circular > max_neighbors(Neighborhood::VonNeumann, r));
        assert!(circular <= max_neighbors(Neighborhood::Moore, r));
    }
    assert_eq!(max_neighbors(Neighborhood::Circular, 1), 8);
    assert_eq!(max_neighbors(Neighborhood::Circular, 2), 20);
}

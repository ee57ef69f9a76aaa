//! Canonical rule names.
//!
//! Names are always regenerated from decoded data, never echoed from the
//! input, so decoding a canonical name yields the same name again.

use std::fmt::Write;

use super::block::{margolus_name, pca_name};
use super::descriptor::{Family, HrotCounts, HrotRule, LtlRule, Marker, TableSource};
use super::map;
use super::symmetry::{base_config, letters};
use super::table::{Neighborhood, RuleTable};

/// Letter count at which the inverted form is never used.
const NO_INVERT_TOTAL: usize = 13;
const NO_INVERT_SET: usize = 7;

/// Whether `set` of `total` letters should be written as `-` plus the rest.
pub fn prefers_inverted(set: usize, total: usize) -> bool {
    set * 2 > total && !(total == NO_INVERT_TOTAL && set == NO_INVERT_SET)
}

/// Lowest configuration with `count` neighbors.
fn representative(neighborhood: Neighborhood, count: u8) -> usize {
    let mut mask = neighborhood.neighbor_mask();
    let mut config = 0u16;
    for _ in 0..count {
        let low = mask & mask.wrapping_neg();
        config |= low;
        mask &= !low;
    }
    config as usize
}

fn digit_char(count: u8) -> char {
    char::from_digit(u32::from(count), 13).unwrap_or('?')
}

/// One birth or survival part, without its `B`/`S` prefix.
pub fn table_part(table: &RuleTable, survival: bool) -> String {
    let neighborhood = table.neighborhood();
    let accepts = |config: usize| {
        if survival {
            table.is_survival(config)
        } else {
            table.is_birth(config)
        }
    };
    let mut out = String::new();
    for count in 0..=neighborhood.max_count() {
        let names = letters(neighborhood, count);
        if names.is_empty() {
            if accepts(representative(neighborhood, count)) {
                out.push(digit_char(count));
            }
            continue;
        }
        let accepted: Vec<bool> = (0..names.len())
            .map(|i| base_config(neighborhood, count, i).is_some_and(|c| accepts(c as usize)))
            .collect();
        let set = accepted.iter().filter(|&&a| a).count();
        if set == 0 {
            continue;
        }
        out.push(digit_char(count));
        if set == names.len() {
            continue;
        }
        let inverted = prefers_inverted(set, names.len());
        if inverted {
            out.push('-');
        }
        for (letter, &on) in names.chars().zip(&accepted) {
            if on != inverted {
                out.push(letter);
            }
        }
    }
    out
}

/// `B3/S23` style name with Generations, neighborhood and marker suffixes.
pub fn totalistic_name(table: &RuleTable, states: u16, marker: Marker) -> String {
    let mut name = format!("B{}/S{}", table_part(table, false), table_part(table, true));
    if marker == Marker::Plain && states > 2 {
        let _ = write!(name, "/C{states}");
    }
    name.push_str(table.neighborhood().postfix());
    name.push_str(marker.postfix());
    name
}

/// Collapse a count array into `a-b,c` spans.
pub fn count_list(counts: &[u8]) -> String {
    let mut spans = Vec::new();
    let mut i = 0;
    while i < counts.len() {
        if counts[i] == 0 {
            i += 1;
            continue;
        }
        let start = i;
        while i + 1 < counts.len() && counts[i + 1] != 0 {
            i += 1;
        }
        if start == i {
            spans.push(start.to_string());
        } else {
            spans.push(format!("{start}-{i}"));
        }
        i += 1;
    }
    spans.join(",")
}

/// Larger than Life rules share the HROT list form; Wojtowicz, Goucher and
/// Evans spellings are accepted on input only.
pub fn ltl_name(rule: &LtlRule, neighborhood: Neighborhood, states: u16) -> String {
    range_name(rule.range, &rule.counts, neighborhood, states)
}

pub fn hrot_name(rule: &HrotRule, neighborhood: Neighborhood, states: u16) -> String {
    range_name(rule.range, &rule.counts, neighborhood, states)
}

fn range_name(range: u32, counts: &HrotCounts, neighborhood: Neighborhood, states: u16) -> String {
    let mut name = format!(
        "R{range},C{states},S{},B{}",
        count_list(counts.survival()),
        count_list(counts.birth()),
    );
    if neighborhood != Neighborhood::Moore {
        let _ = write!(name, ",N{}", neighborhood.range_code());
    }
    name
}

/// Canonical name of one decoded rule (no alternate, no bounded grid).
pub(crate) fn family_name(
    family: &Family,
    neighborhood: Neighborhood,
    states: u16,
    marker: Marker,
) -> String {
    match family {
        Family::Totalistic(rule) => match rule.source() {
            TableSource::Isotropic => totalistic_name(rule.table(), states, marker),
            TableSource::Map => {
                format!("MAP{}{}", map::encode(rule.table()), marker.postfix())
            }
            TableSource::Wolfram(n) => format!("W{n}{}", marker.postfix()),
        },
        Family::Ltl(ltl) => ltl_name(ltl, neighborhood, states) + marker.postfix(),
        Family::Hrot(hrot) => hrot_name(hrot, neighborhood, states) + marker.postfix(),
        Family::Margolus(block) => margolus_name(block),
        Family::Pca(block) => pca_name(block),
        Family::RuleTree(tree) => tree.name().to_string(),
        Family::None => "none".to_string(),
    }
}

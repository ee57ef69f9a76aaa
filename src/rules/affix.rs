//! Prefix and postfix stripping steps applied before family dispatch.
//!
//! Each step takes the remaining rule text and returns what is left plus the
//! field it recognised, so the decoder composes them in a fixed order:
//! marker, neighborhood postfix, Generations state count.

use super::descriptor::Marker;
use super::error::RuleError;
use super::scan::Scanner;
use super::table::Neighborhood;

const MARKERS: [(&str, Marker); 3] = [
    ("history", Marker::History),
    ("super", Marker::Super),
    ("niemiec", Marker::Niemiec),
];

// Longest first so `lv` wins over `v`.
const POSTFIXES: [(&str, Neighborhood); 5] = [
    ("lv", Neighborhood::TriangularVertices),
    ("le", Neighborhood::TriangularEdges),
    ("l", Neighborhood::TriangularAll),
    ("h", Neighborhood::Hex),
    ("v", Neighborhood::VonNeumann),
];

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let at = text.len().checked_sub(suffix.len())?;
    let tail = text.get(at..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &text[..at])
}

/// Strip a `History`, `Super` or `Niemiec` postfix (any case).
pub(crate) fn strip_marker(text: &str) -> (&str, Marker) {
    for (suffix, marker) in MARKERS {
        if let Some(rest) = strip_suffix_ignore_case(text, suffix) {
            return (rest, marker);
        }
    }
    (text, Marker::Plain)
}

/// Strip a neighborhood postfix from lowercased B/S text.
pub(crate) fn strip_neighborhood(text: &str) -> (&str, Option<Neighborhood>) {
    for (suffix, neighborhood) in POSTFIXES {
        if let Some(rest) = text.strip_suffix(suffix) {
            return (rest, Some(neighborhood));
        }
    }
    (text, None)
}

/// Split a Generations state count off lowercased B/S text.
///
/// Accepts `b2/s/c3`, `b2/s/3`, Golly `345/2/4` and Catagolue `g4b2s345`.
pub(crate) fn split_generations(text: &str) -> Result<(&str, Option<u32>), RuleError> {
    if let Some(rest) = text.strip_prefix('g') {
        let mut scan = Scanner::new(rest, "Generations states");
        let states = scan.number()?;
        let rule = scan.rest();
        if !rule.starts_with(['b', 's']) {
            return Err(scan.unexpected());
        }
        return Ok((rule, Some(states)));
    }
    if text.matches('/').count() != 2 {
        return Ok((text, None));
    }
    let Some((rule, last)) = text.rsplit_once('/') else {
        return Ok((text, None));
    };
    let digits = last.strip_prefix('c').unwrap_or(last);
    let mut scan = Scanner::new(digits, "Generations states");
    let states = scan.number()?;
    scan.finish()?;
    Ok((rule, Some(states)))
}

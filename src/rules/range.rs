//! Larger than Life and HROT range rules.
//!
//! Accepted forms (input already lowercased, whitespace removed):
//!
//! - `r2,c0,m1,s6..9,b7..8,nm` (Wojtowicz LTL)
//! - `r2b7t8s6t9` (Goucher LTL)
//! - `2,7,8,6,9` (Evans LTL: range, birth bounds, survival bounds)
//! - `r2,c2,s6-9,11,b7-8,nn` (HROT count lists)
//! - `r2b180s1c0z` (HROT hex bitmaps, trailing `z` = survival on zero)

use super::alloc::TableAllocator;
use super::decoder::Limits;
use super::descriptor::{Family, HrotCounts, HrotRule, LtlRule};
use super::error::RuleError;
use super::scan::Scanner;
use super::table::Neighborhood;

/// Result of decoding a range rule.
#[derive(Debug)]
pub(crate) struct RangeDecode {
    pub family: Family,
    pub neighborhood: Neighborhood,
    pub states: u16,
}

/// Number of neighbors (centre excluded) of a range `range` neighborhood.
pub fn max_neighbors(neighborhood: Neighborhood, range: u32) -> u32 {
    let r = u64::from(range);
    let count = match neighborhood {
        Neighborhood::VonNeumann => 2 * r * (r + 1),
        Neighborhood::Circular => {
            let limit = r * r + r;
            let r = r as i64;
            let mut points = 0u64;
            for y in -r..=r {
                for x in -r..=r {
                    if (x * x + y * y) as u64 <= limit {
                        points += 1;
                    }
                }
            }
            points - 1
        }
        _ => (2 * r + 1) * (2 * r + 1) - 1,
    };
    count as u32
}

/// Does the text look like one of the range rule forms.
pub(crate) fn is_range_rule(text: &str) -> bool {
    let bytes = text.as_bytes();
    match bytes {
        [b'r', d, ..] if d.is_ascii_digit() => true,
        [d, ..] if d.is_ascii_digit() => {
            text.contains(',') && bytes.iter().all(|b| b.is_ascii_digit() || *b == b',')
        }
        _ => false,
    }
}

pub(crate) fn decode(
    text: &str,
    limits: &Limits,
    alloc: &mut dyn TableAllocator,
) -> Result<RangeDecode, RuleError> {
    if !text.starts_with('r') {
        return evans(text, limits, alloc);
    }
    if text.contains("..") {
        wojtowicz(text, limits, alloc)
    } else if text.contains(',') {
        hrot_lists(text, limits, alloc)
    } else if text.contains('t') {
        goucher(text, limits, alloc)
    } else {
        hrot_hex(text, limits, alloc)
    }
}

fn check_range(range: u32, limits: &Limits) -> Result<u32, RuleError> {
    if range < 1 || range > limits.max_range {
        return Err(RuleError::out_of_range(
            "range",
            i64::from(range),
            1,
            i64::from(limits.max_range),
        ));
    }
    Ok(range)
}

fn check_states(states: u32, limits: &Limits) -> Result<u16, RuleError> {
    if states > u32::from(limits.max_states) {
        return Err(RuleError::out_of_range(
            "states",
            i64::from(states),
            0,
            i64::from(limits.max_states),
        ));
    }
    Ok(states.max(2) as u16)
}

fn check_bound(what: &'static str, value: u32, max: u32) -> Result<u32, RuleError> {
    if value > max {
        return Err(RuleError::out_of_range(
            what,
            i64::from(value),
            0,
            i64::from(max),
        ));
    }
    Ok(value)
}

fn check_bounds(
    what: &'static str,
    min: u32,
    max_value: u32,
    max: u32,
) -> Result<(u32, u32), RuleError> {
    let (lo_name, hi_name) = match what {
        "birth" => ("birth minimum", "birth maximum"),
        _ => ("survival minimum", "survival maximum"),
    };
    check_bound(lo_name, min, max)?;
    check_bound(hi_name, max_value, max)?;
    if min > max_value {
        return Err(RuleError::InvertedBounds {
            what,
            min,
            max: max_value,
        });
    }
    Ok((min, max_value))
}

fn neighborhood_code(code: &str) -> Result<Neighborhood, RuleError> {
    match code {
        "m" => Ok(Neighborhood::Moore),
        "n" => Ok(Neighborhood::VonNeumann),
        "c" => Ok(Neighborhood::Circular),
        _ => Err(RuleError::malformed(format!(
            "unknown range neighborhood 'N{}', expected NM, NN or NC",
            code.to_ascii_uppercase()
        ))),
    }
}

/// Build an LTL rule from user-facing bounds.
fn ltl(
    range: u32,
    states: u16,
    middle_included: bool,
    survival: (u32, u32),
    birth: (u32, u32),
    neighborhood: Neighborhood,
    alloc: &mut dyn TableAllocator,
) -> RangeDecode {
    let max = max_neighbors(neighborhood, range) as usize;
    let adjust = u32::from(!middle_included);
    let (survival_min, survival_max) = (survival.0 + adjust, survival.1 + adjust);

    let mut birth_counts = alloc.allocate(max + 1);
    let mut survival_counts = alloc.allocate(max + 1);
    // Survival count i includes the live centre, so i - 1 other neighbors.
    for i in survival_min.max(1)..=survival_max {
        survival_counts[i as usize - 1] = 1;
    }
    for i in birth.0..=birth.1 {
        birth_counts[i as usize] = 1;
    }
    log::debug!("LTL rule range {range} {} ({max} neighbors)", neighborhood.name());
    RangeDecode {
        family: Family::Ltl(LtlRule {
            range,
            middle_included,
            survival_min,
            survival_max,
            birth_min: birth.0,
            birth_max: birth.1,
            counts: HrotCounts::new(birth_counts, survival_counts),
        }),
        neighborhood,
        states,
    }
}

fn field<'a>(token: Option<&'a str>, prefix: char, name: &'static str) -> Result<&'a str, RuleError> {
    let token = token.ok_or(RuleError::MissingField(name))?;
    token.strip_prefix(prefix).ok_or_else(|| RuleError::UnexpectedChar {
        found: token.chars().next().unwrap_or(','),
        context: name,
    })
}

fn parse_number(text: &str, context: &'static str) -> Result<u32, RuleError> {
    let mut scan = Scanner::new(text, context);
    let value = scan.number()?;
    scan.finish()?;
    Ok(value)
}

fn parse_interval(text: &str, context: &'static str) -> Result<(u32, u32), RuleError> {
    let mut scan = Scanner::new(text, context);
    let min = scan.number()?;
    if !scan.eat_str("..") {
        return Err(scan.unexpected());
    }
    let max = scan.number()?;
    scan.finish()?;
    Ok((min, max))
}

fn wojtowicz(
    text: &str,
    limits: &Limits,
    alloc: &mut dyn TableAllocator,
) -> Result<RangeDecode, RuleError> {
    let mut tokens = text.split(',');
    let range = check_range(parse_number(field(tokens.next(), 'r', "range")?, "range")?, limits)?;
    let states = check_states(parse_number(field(tokens.next(), 'c', "states")?, "states")?, limits)?;
    let middle = match field(tokens.next(), 'm', "middle")? {
        "0" => false,
        "1" => true,
        other => {
            return Err(RuleError::malformed(format!(
                "middle must be M0 or M1, not 'M{other}'"
            )));
        }
    };
    let survival = parse_interval(field(tokens.next(), 's', "survival")?, "survival")?;
    let birth = parse_interval(field(tokens.next(), 'b', "birth")?, "birth")?;
    let neighborhood = match tokens.next() {
        Some(token) => neighborhood_code(field(Some(token), 'n', "neighborhood")?)?,
        None => Neighborhood::Moore,
    };
    if let Some(extra) = tokens.next() {
        return Err(RuleError::malformed(format!("unexpected ',{extra}' after neighborhood")));
    }
    let max = max_neighbors(neighborhood, range);
    let survival = check_bounds("survival", survival.0, survival.1, max)?;
    let birth = check_bounds("birth", birth.0, birth.1, max)?;
    Ok(ltl(range, states, middle, survival, birth, neighborhood, alloc))
}

fn goucher(
    text: &str,
    limits: &Limits,
    alloc: &mut dyn TableAllocator,
) -> Result<RangeDecode, RuleError> {
    let mut scan = Scanner::new(text, "Larger than Life rule");
    scan.expect(b'r')?;
    let range = check_range(scan.number()?, limits)?;
    scan.expect(b'b')?;
    let birth_min = scan.number()?;
    scan.expect(b't')?;
    let birth_max = scan.number()?;
    scan.expect(b's')?;
    let survival_min = scan.number()?;
    scan.expect(b't')?;
    let survival_max = scan.number()?;
    scan.finish()?;
    let max = max_neighbors(Neighborhood::Moore, range);
    let survival = check_bounds("survival", survival_min, survival_max, max)?;
    let birth = check_bounds("birth", birth_min, birth_max, max)?;
    Ok(ltl(range, 2, true, survival, birth, Neighborhood::Moore, alloc))
}

fn evans(
    text: &str,
    limits: &Limits,
    alloc: &mut dyn TableAllocator,
) -> Result<RangeDecode, RuleError> {
    let values = text
        .split(',')
        .map(|t| parse_number(t, "Larger than Life rule"))
        .collect::<Result<Vec<_>, _>>()?;
    let [range, birth_min, birth_max, survival_min, survival_max] = values[..] else {
        return Err(RuleError::TokenCount {
            what: "Larger than Life rule",
            expected: 5,
            found: values.len(),
        });
    };
    let range = check_range(range, limits)?;
    let max = max_neighbors(Neighborhood::Moore, range);
    let survival = check_bounds("survival", survival_min, survival_max, max)?;
    let birth = check_bounds("birth", birth_min, birth_max, max)?;
    Ok(ltl(range, 2, true, survival, birth, Neighborhood::Moore, alloc))
}

/// Parse `6-9`-style segments into `counts`.
fn fill_segment(
    segment: &str,
    what: &'static str,
    max: u32,
    counts: &mut [u8],
) -> Result<(), RuleError> {
    let mut scan = Scanner::new(segment, what);
    let lo = scan.number()?;
    let hi = if scan.eat(b'-') { scan.number()? } else { lo };
    scan.finish()?;
    check_bound(what, lo, max)?;
    check_bound(what, hi, max)?;
    if lo > hi {
        return Err(RuleError::InvertedBounds { what, min: lo, max: hi });
    }
    for count in lo..=hi {
        counts[count as usize] = 1;
    }
    Ok(())
}

fn hrot_lists(
    text: &str,
    limits: &Limits,
    alloc: &mut dyn TableAllocator,
) -> Result<RangeDecode, RuleError> {
    let mut tokens = text.split(',').peekable();
    let range = check_range(parse_number(field(tokens.next(), 'r', "range")?, "range")?, limits)?;
    let states = check_states(parse_number(field(tokens.next(), 'c', "states")?, "states")?, limits)?;

    let first_survival = field(tokens.next(), 's', "survival")?;
    let mut survival_segments = vec![first_survival];
    while let Some(token) = tokens.next_if(|t| t.starts_with(|c: char| c.is_ascii_digit())) {
        survival_segments.push(token);
    }
    let first_birth = field(tokens.next(), 'b', "birth")?;
    let mut birth_segments = vec![first_birth];
    while let Some(token) = tokens.next_if(|t| t.starts_with(|c: char| c.is_ascii_digit())) {
        birth_segments.push(token);
    }
    let neighborhood = match tokens.next() {
        Some(token) => neighborhood_code(field(Some(token), 'n', "neighborhood")?)?,
        None => Neighborhood::Moore,
    };
    if let Some(extra) = tokens.next() {
        return Err(RuleError::malformed(format!("unexpected ',{extra}' after neighborhood")));
    }

    let max = max_neighbors(neighborhood, range);
    let mut birth = alloc.allocate(max as usize + 1);
    let mut survival = alloc.allocate(max as usize + 1);
    for (i, segment) in survival_segments.iter().enumerate() {
        // `S,B3` leaves the survival list empty.
        if i == 0 && segment.is_empty() {
            continue;
        }
        fill_segment(segment, "survival", max, &mut survival)?;
    }
    for (i, segment) in birth_segments.iter().enumerate() {
        if i == 0 && segment.is_empty() {
            continue;
        }
        fill_segment(segment, "birth", max, &mut birth)?;
    }
    log::debug!("HROT rule range {range} {} ({max} neighbors)", neighborhood.name());
    Ok(RangeDecode {
        family: Family::Hrot(HrotRule {
            range,
            counts: HrotCounts::new(birth, survival),
        }),
        neighborhood,
        states,
    })
}

/// Expand a hex bitmap: bit 0 of the last digit is one neighbor.
fn fill_hex(hex: &str, what: &'static str, max: u32, counts: &mut [u8]) -> Result<(), RuleError> {
    for (k, ch) in hex.chars().rev().enumerate() {
        let digit = ch.to_digit(16).ok_or(RuleError::UnexpectedChar { found: ch, context: what })?;
        for bit in 0..4u64 {
            if digit & (1u32 << bit) == 0 {
                continue;
            }
            let count = 1 + 4 * k as u64 + bit;
            if count > u64::from(max) {
                return Err(RuleError::out_of_range(what, count as i64, 0, i64::from(max)));
            }
            counts[count as usize] = 1;
        }
    }
    Ok(())
}

fn hrot_hex(
    text: &str,
    limits: &Limits,
    alloc: &mut dyn TableAllocator,
) -> Result<RangeDecode, RuleError> {
    let mut scan = Scanner::new(text, "HROT rule");
    scan.expect(b'r')?;
    let range = check_range(scan.number()?, limits)?;
    scan.expect(b'b')?;
    let rest = scan.rest();
    let at = rest.find('s').ok_or(RuleError::MissingField("survival"))?;
    let (birth_hex, survival_part) = (&rest[..at], &rest[at + 1..]);
    let (survival_hex, zero) = match survival_part.strip_suffix('z') {
        Some(hex) => (hex, true),
        None => (survival_part, false),
    };

    let max = max_neighbors(Neighborhood::Moore, range);
    let mut birth = alloc.allocate(max as usize + 1);
    let mut survival = alloc.allocate(max as usize + 1);
    fill_hex(birth_hex, "birth", max, &mut birth)?;
    fill_hex(survival_hex, "survival", max, &mut survival)?;
    if zero {
        survival[0] = 1;
    }
    Ok(RangeDecode {
        family: Family::Hrot(HrotRule {
            range,
            counts: HrotCounts::new(birth, survival),
        }),
        neighborhood: Neighborhood::Moore,
        states: 2,
    })
}

//! Totalistic and isotropic non-totalistic table builder.
//!
//! A birth or survival part is a sequence of `<digit>[-]<letters>*` groups.
//! A bare digit accepts every configuration with that many neighbors;
//! letters restrict it to the named symmetry classes and a leading `-`
//! accepts every class except the named ones. Tables are filled only from
//! symmetry orbits, never bit by bit.

use super::alloc::{TableAllocator, allocate_copy};
use super::error::RuleError;
use super::symmetry::{letter_index, letters, orbit};
use super::table::{N, NE, NW, Neighborhood, RuleTable};

pub const MAX_DIGITS: usize = 13;

/// Parsed state of one neighbor count within a birth or survival part.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DigitSpec {
    /// The digit appeared without letters (every class accepted).
    pub bare: bool,
    /// Letters listed for the digit, bit `i` = `i`th letter.
    pub letters: u16,
    /// Whether the letters were negated. `None` until a letter is seen.
    pub negative: Option<bool>,
}

impl DigitSpec {
    /// Letter mask the digit accepts, given `all` = every letter for it.
    pub fn accepted(&self, all: u16) -> u16 {
        if self.bare {
            all
        } else if self.negative == Some(true) {
            all & !self.letters
        } else {
            self.letters
        }
    }

    pub fn is_used(&self) -> bool {
        self.bare || self.negative.is_some()
    }
}

/// Reusable buffers owned by one decoder.
pub(crate) struct Scratch {
    birth: [DigitSpec; MAX_DIGITS],
    survival: [DigitSpec; MAX_DIGITS],
    work: Vec<u8>,
}

impl Scratch {
    pub fn new() -> Self {
        Self {
            birth: [DigitSpec::default(); MAX_DIGITS],
            survival: [DigitSpec::default(); MAX_DIGITS],
            work: Vec::with_capacity(8192),
        }
    }

    fn reset(&mut self, len: usize) {
        self.birth = [DigitSpec::default(); MAX_DIGITS];
        self.survival = [DigitSpec::default(); MAX_DIGITS];
        self.work.clear();
        self.work.resize(len, 0);
    }
}

fn digit_value(ch: char, neighborhood: Neighborhood) -> Option<u8> {
    match ch {
        '0'..='9' => Some(ch as u8 - b'0'),
        'a'..='c' if neighborhood.is_triangular() => Some(ch as u8 - b'a' + 10),
        _ => None,
    }
}

/// Parse one birth or survival part (without its `b`/`s` prefix).
pub(crate) fn parse_part(
    text: &str,
    neighborhood: Neighborhood,
    what: &'static str,
    out: &mut [DigitSpec; MAX_DIGITS],
) -> Result<(), RuleError> {
    let max = neighborhood.max_count();
    let mut current: Option<u8> = None;
    let mut minus = false;
    let mut lettered = false;

    let close = |current: Option<u8>,
                 minus: bool,
                 lettered: bool,
                 out: &mut [DigitSpec; MAX_DIGITS]|
     -> Result<(), RuleError> {
        if let Some(d) = current {
            if minus && !lettered {
                return Err(RuleError::DanglingMinus { count: d });
            }
            if !lettered {
                out[d as usize].bare = true;
            }
        }
        Ok(())
    };

    for ch in text.chars() {
        if let Some(d) = digit_value(ch, neighborhood) {
            close(current, minus, lettered, out)?;
            if d > max {
                return Err(RuleError::out_of_range(
                    what,
                    i64::from(d),
                    0,
                    i64::from(max),
                ));
            }
            current = Some(d);
            minus = false;
            lettered = false;
        } else if ch == '-' {
            if current.is_none() || minus || lettered {
                return Err(RuleError::UnexpectedChar { found: ch, context: what });
            }
            minus = true;
        } else if ch.is_ascii_lowercase() {
            let d = current.ok_or(RuleError::UnexpectedChar { found: ch, context: what })?;
            if !matches!(neighborhood, Neighborhood::Moore | Neighborhood::Hex) {
                return Err(RuleError::LettersNotSupported(neighborhood.name()));
            }
            let index = letter_index(neighborhood, d, ch).ok_or_else(|| RuleError::InvalidLetter {
                token: format!("{d}{ch}"),
                count: d,
            })?;
            let spec = &mut out[d as usize];
            match spec.negative {
                Some(prev) if prev != minus => return Err(RuleError::MixedNegation { count: d }),
                _ => spec.negative = Some(minus),
            }
            let bit = 1u16 << index;
            if spec.letters & bit != 0 {
                return Err(RuleError::DuplicateLetter { count: d, letter: ch });
            }
            spec.letters |= bit;
            lettered = true;
        } else {
            return Err(RuleError::UnexpectedChar { found: ch, context: what });
        }
    }
    close(current, minus, lettered, out)
}

fn fill(
    work: &mut [u8],
    neighborhood: Neighborhood,
    digits: &[DigitSpec; MAX_DIGITS],
    center: u16,
) -> Result<(), RuleError> {
    for count in 0..=neighborhood.max_count() {
        let spec = digits[count as usize];
        if !spec.is_used() {
            continue;
        }
        let names = letters(neighborhood, count);
        if names.is_empty() || spec.bare {
            for config in orbit(neighborhood, count, None)? {
                work[(config | center) as usize] = 1;
            }
            continue;
        }
        let all = (1u16 << names.len()) - 1;
        let accepted = spec.accepted(all);
        for (i, letter) in names.chars().enumerate() {
            if accepted & (1 << i) == 0 {
                continue;
            }
            for config in orbit(neighborhood, count, Some(letter))? {
                work[(config | center) as usize] = 1;
            }
        }
    }
    Ok(())
}

/// Build the combined table for a birth part and a survival part.
pub(crate) fn build(
    birth: &str,
    survival: &str,
    neighborhood: Neighborhood,
    scratch: &mut Scratch,
    alloc: &mut dyn TableAllocator,
) -> Result<RuleTable, RuleError> {
    scratch.reset(neighborhood.table_len());
    parse_part(birth, neighborhood, "birth", &mut scratch.birth)?;
    parse_part(survival, neighborhood, "survival", &mut scratch.survival)?;
    fill(&mut scratch.work, neighborhood, &scratch.birth, 0)?;
    fill(
        &mut scratch.work,
        neighborhood,
        &scratch.survival,
        neighborhood.center_bit(),
    )?;
    Ok(RuleTable::from_cells(
        neighborhood,
        allocate_copy(alloc, &scratch.work),
    ))
}

/// Split `b3/s23`, `b3s23`, `s23/b3` or Golly `23/3` into birth and
/// survival parts.
pub(crate) fn split_birth_survival(text: &str) -> Result<(&str, &str), RuleError> {
    if let Some((first, second)) = text.split_once('/') {
        if second.contains('/') {
            return Err(RuleError::UnknownFormat(text.to_string()));
        }
        return match (first.strip_prefix('b'), second.strip_prefix('s')) {
            (Some(b), Some(s)) => Ok((b, s)),
            _ => match (first.strip_prefix('s'), second.strip_prefix('b')) {
                (Some(s), Some(b)) => Ok((b, s)),
                _ if !first.starts_with(['b', 's']) && !second.starts_with(['b', 's']) => {
                    // Golly order: survival first.
                    Ok((second, first))
                }
                _ => Err(RuleError::UnknownFormat(text.to_string())),
            },
        };
    }
    if let Some(rest) = text.strip_prefix('b') {
        if let Some(at) = rest.find('s') {
            return Ok((&rest[..at], &rest[at + 1..]));
        }
    } else if let Some(rest) = text.strip_prefix('s') {
        if let Some(at) = rest.find('b') {
            return Ok((&rest[at + 1..], &rest[..at]));
        }
    }
    Err(RuleError::UnknownFormat(text.to_string()))
}

/// Wolfram rule `W<n>` as a 2D table: births follow the elementary rule
/// applied to the three cells above, live cells always survive.
pub(crate) fn wolfram(number: u32, alloc: &mut dyn TableAllocator) -> Result<RuleTable, RuleError> {
    if number > 254 {
        return Err(RuleError::out_of_range("Wolfram rule", i64::from(number), 0, 254));
    }
    if number & 1 != 0 {
        return Err(RuleError::unsupported("Wolfram rule must be even"));
    }
    let neighborhood = Neighborhood::Moore;
    let mut cells = alloc.allocate(neighborhood.table_len());
    let center = neighborhood.center_bit() as usize;
    for (index, cell) in cells.iter_mut().enumerate() {
        let alive = index & center != 0;
        let pattern = (usize::from(index & NW as usize != 0) << 2)
            | (usize::from(index & N as usize != 0) << 1)
            | usize::from(index & NE as usize != 0);
        *cell = u8::from(alive || (number >> pattern) & 1 != 0);
    }
    Ok(RuleTable::from_cells(neighborhood, cells))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::alloc::HeapAllocator;
    use crate::rules::error::ErrorKind;
    use crate::rules::table::{E, S, SE, SW, W};

    fn table(birth: &str, survival: &str, nh: Neighborhood) -> Result<RuleTable, RuleError> {
        let mut scratch = Scratch::new();
        build(birth, survival, nh, &mut scratch, &mut HeapAllocator)
    }

    #[test]
    fn life_table() {
        let t = table("3", "23", Neighborhood::Moore).unwrap();
        assert!(t.is_birth((N | E | S) as usize));
        assert!(t.is_survival((N | S) as usize));
        assert!(!t.is_survival(N as usize));
        assert!(!t.has_b0());
    }

    #[test]
    fn letters_select_classes() {
        // 2a: corner plus adjacent edge. 2i: opposite edges.
        let t = table("2a", "", Neighborhood::Moore).unwrap();
        assert!(t.is_birth((S | SE) as usize));
        assert!(t.is_birth((NW | N) as usize));
        assert!(!t.is_birth((W | E) as usize));

        let t = table("2-a", "", Neighborhood::Moore).unwrap();
        assert!(!t.is_birth((S | SE) as usize));
        assert!(t.is_birth((W | E) as usize));
    }

    #[test]
    fn bare_digit_wins_over_letters() {
        let a = table("2a2", "", Neighborhood::Moore).unwrap();
        let b = table("2", "", Neighborhood::Moore).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn structural_errors() {
        let err = table("2a2-c", "", Neighborhood::Moore).unwrap_err();
        assert_eq!(err, RuleError::MixedNegation { count: 2 });
        let err = table("2aa", "", Neighborhood::Moore).unwrap_err();
        assert_eq!(err, RuleError::DuplicateLetter { count: 2, letter: 'a' });
        let err = table("2-", "", Neighborhood::Moore).unwrap_err();
        assert_eq!(err, RuleError::DanglingMinus { count: 2 });
        let err = table("9", "", Neighborhood::Moore).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        let err = table("3", "5", Neighborhood::VonNeumann).unwrap_err();
        assert_eq!(err, RuleError::out_of_range("survival", 5, 0, 4));
        let err = table("2y", "", Neighborhood::Moore).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lexical);
    }

    #[test]
    fn extreme_counts_take_no_letters() {
        for (birth, survival, token) in [("1e", "", "1e"), ("", "7c", "7c"), ("0c", "", "0c")] {
            let err = table(birth, survival, Neighborhood::Moore).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Lexical);
            assert!(err.to_string().contains(token), "{err}");
        }
        let t = table("1", "7", Neighborhood::Moore).unwrap();
        assert!(t.is_birth(SE as usize));
        assert!(t.is_birth(N as usize));
    }

    #[test]
    fn triangular_high_digits() {
        let t = table("c", "ab", Neighborhood::TriangularAll).unwrap();
        assert!(t.is_birth(0xfff));
        assert!(t.is_survival(0x3ff));
        assert!(!t.is_survival(0x1ff));
    }

    #[test]
    fn hex_letters() {
        let t = table("2p", "", Neighborhood::Hex).unwrap();
        assert!(t.is_birth((N | S) as usize));
        assert!(t.is_birth((E | W) as usize));
        assert!(!t.is_birth((N | E) as usize));
        // NE and SW are outside the hex neighborhood.
        assert!(t.is_birth((N | S | NE | SW) as usize));
        assert!(table("2y", "", Neighborhood::Hex).is_err());
    }

    #[test]
    fn split_forms() {
        assert_eq!(split_birth_survival("b3/s23").unwrap(), ("3", "23"));
        assert_eq!(split_birth_survival("b3s23").unwrap(), ("3", "23"));
        assert_eq!(split_birth_survival("s23/b3").unwrap(), ("3", "23"));
        assert_eq!(split_birth_survival("23/3").unwrap(), ("3", "23"));
        assert_eq!(split_birth_survival("b2/s").unwrap(), ("2", ""));
        assert!(split_birth_survival("b3/x2").is_err());
        assert!(split_birth_survival("b3/s2/c3").is_err());
    }

    #[test]
    fn wolfram_rules() {
        let t = wolfram(30, &mut HeapAllocator).unwrap();
        // Rule 30: 001 -> 1, 100 -> 1, 111 -> 0.
        assert!(t.is_birth(NE as usize));
        assert!(t.is_birth(NW as usize));
        assert!(!t.is_birth((NW | N | NE) as usize));
        assert!(t.is_survival(0));
        assert!(!t.is_birth((SW | S | SE | W) as usize));
        assert!(wolfram(31, &mut HeapAllocator).is_err());
        assert!(wolfram(256, &mut HeapAllocator).is_err());
    }
}

//! Rule decoder: the entry point that turns a rule string into a
//! [`RuleDescriptor`].
//!
//! Decoding runs as a fixed pipeline: bounded-grid suffix, alternate split,
//! then per half alias substitution, marker, family detection and (for B/S
//! rules) neighborhood postfix and Generations count. Scratch buffers and the
//! table allocator belong to the decoder instance, so one instance decodes
//! one rule at a time while separate instances run independently.

use std::sync::Arc;

use super::affix::{split_generations, strip_marker, strip_neighborhood};
use super::alias::{AliasTable, BuiltinAliases};
use super::alloc::{HeapAllocator, TableAllocator};
use super::alternate;
use super::block;
use super::bounded::{self, BoundedGrid};
use super::canonical::family_name;
use super::descriptor::{Family, Marker, RuleDescriptor, TableSource, TotalisticRule};
use super::error::RuleError;
use super::fetch::RuleFetcher;
use super::map;
use super::range;
use super::scan::Scanner;
use super::table::Neighborhood;
use super::totalistic::{self, Scratch};
use crate::ruletree::{self, RuleTree};

pub const DEFAULT_MAX_RANGE: u32 = 500;
pub const DEFAULT_MAX_STATES: u16 = 256;
pub const DEFAULT_MAX_GRID_SIZE: u32 = 16384;

const ENV_MAX_RANGE: &str = "LIFE_RULES_MAX_RANGE";
const ENV_MAX_GRID: &str = "LIFE_RULES_MAX_GRID";

/// Configuration for a rule decoder.
///
/// Use `DecoderConfig::default()` for the standard limits, or customise
/// individual knobs via the builder methods.
#[derive(Clone, Debug, Default)]
pub struct DecoderConfig {
    /// Largest accepted range for LTL/HROT rules, at most 500.
    /// `None` means 500.
    pub max_range: Option<u32>,
    /// Largest accepted state count.
    /// `None` means 256.
    pub max_states: Option<u16>,
    /// Largest bounded grid width or height.
    /// `None` means 16384.
    pub max_grid_size: Option<u32>,
    /// Substitute well-known names and attach display aliases.
    /// `None` means enabled.
    pub resolve_aliases: Option<bool>,
}

impl DecoderConfig {
    pub fn max_range(mut self, n: u32) -> Self {
        self.max_range = Some(n.clamp(1, DEFAULT_MAX_RANGE));
        self
    }

    pub fn max_states(mut self, n: u16) -> Self {
        self.max_states = Some(n.clamp(2, DEFAULT_MAX_STATES));
        self
    }

    pub fn max_grid_size(mut self, n: u32) -> Self {
        self.max_grid_size = Some(n.max(1));
        self
    }

    pub fn resolve_aliases(mut self, enabled: bool) -> Self {
        self.resolve_aliases = Some(enabled);
        self
    }

    /// Defaults overridden by `LIFE_RULES_MAX_RANGE` and
    /// `LIFE_RULES_MAX_GRID` when they hold positive integers.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(n) = env_number(ENV_MAX_RANGE) {
            config = config.max_range(n);
        }
        if let Some(n) = env_number(ENV_MAX_GRID) {
            config = config.max_grid_size(n);
        }
        config
    }
}

fn env_number(name: &str) -> Option<u32> {
    let value = std::env::var(name).ok()?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            log::warn!("ignoring {name}={value}: expected a positive integer");
            None
        }
    }
}

/// Resolved limits used while decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Limits {
    pub max_range: u32,
    pub max_states: u16,
    pub max_grid: u32,
    pub resolve_aliases: bool,
}

impl Default for Limits {
    fn default() -> Self {
        resolve_limits(&DecoderConfig::default())
    }
}

fn resolve_limits(config: &DecoderConfig) -> Limits {
    Limits {
        max_range: config.max_range.unwrap_or(DEFAULT_MAX_RANGE).clamp(1, DEFAULT_MAX_RANGE),
        max_states: config.max_states.unwrap_or(DEFAULT_MAX_STATES),
        max_grid: config.max_grid_size.unwrap_or(DEFAULT_MAX_GRID_SIZE),
        resolve_aliases: config.resolve_aliases.unwrap_or(true),
    }
}

pub struct RuleDecoder {
    limits: Limits,
    scratch: Scratch,
    allocator: Box<dyn TableAllocator>,
    aliases: Arc<dyn AliasTable>,
}

impl Default for RuleDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleDecoder {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            limits: resolve_limits(&config),
            scratch: Scratch::new(),
            allocator: Box::new(HeapAllocator),
            aliases: Arc::new(BuiltinAliases),
        }
    }

    /// Replace the alias table.
    pub fn with_aliases(mut self, aliases: Arc<dyn AliasTable>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Replace the table allocator.
    pub fn with_allocator(mut self, allocator: Box<dyn TableAllocator>) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn max_range(&self) -> u32 {
        self.limits.max_range
    }

    pub fn max_states(&self) -> u16 {
        self.limits.max_states
    }

    pub fn max_grid_size(&self) -> u32 {
        self.limits.max_grid
    }

    /// Decode a rule string.
    pub fn decode(&mut self, rule: &str) -> Result<RuleDescriptor, RuleError> {
        let text = rule.trim();
        if text.is_empty() {
            return Err(RuleError::Empty);
        }
        let (body, bounded) = match text.rsplit_once(':') {
            Some((body, suffix)) => {
                let suffix: String = suffix
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect::<String>()
                    .to_ascii_lowercase();
                (body, Some(bounded::parse(&suffix, self.limits.max_grid)?))
            }
            None => (text, None),
        };

        let (first, second) = alternate::split(body)?;
        let mut descriptor = self.decode_single(first)?;
        let mut name = descriptor.name.clone();
        if let Some(second) = second {
            let other = self.decode_single(second)?;
            alternate::check(&descriptor, &other)?;
            name = format!("{name}{}{}", alternate::DELIMITER, other.name);
            descriptor.alternate = Some(Box::new(other));
        }
        if let Some(grid) = &bounded {
            check_bounded_b0(&descriptor, grid)?;
        }

        descriptor.alias = if self.limits.resolve_aliases {
            self.aliases.alias_for(&name).map(str::to_owned)
        } else {
            None
        };
        if let Some(grid) = &bounded {
            name.push_str(&grid.to_string());
        }
        descriptor.name = name;
        descriptor.bounded = bounded;
        log::debug!(
            "decoded '{text}' as {} rule {}",
            descriptor.family.name(),
            descriptor.name
        );
        Ok(descriptor)
    }

    /// Decode a rule-tree definition (`@RULE` file text or a bare tree).
    pub fn decode_rule_table(
        &mut self,
        text: &str,
        fallback_name: &str,
    ) -> Result<RuleDescriptor, RuleError> {
        decode_tree_text(text, fallback_name, self.limits.max_states)
    }

    /// Decode `rule`, falling back to fetching it as a rule tree when it is
    /// not a rule string.
    ///
    /// `done` runs exactly once: immediately when `rule` decodes, otherwise
    /// from the fetcher's reply. If the fetch itself fails, `done` receives
    /// the original decode error.
    pub fn decode_or_fetch<F>(&mut self, rule: &str, fetcher: &dyn RuleFetcher, done: F)
    where
        F: FnOnce(Result<RuleDescriptor, RuleError>) + Send + 'static,
    {
        let original = match self.decode(rule) {
            Ok(descriptor) => return done(Ok(descriptor)),
            Err(err) => err,
        };
        let name = rule.trim().to_string();
        log::debug!("'{name}' did not decode ({original}), fetching rule table");
        let max_states = self.limits.max_states;
        let reply_name = name.clone();
        fetcher.fetch(
            &name,
            Box::new(move |fetched| {
                let result = match fetched {
                    Ok(text) => decode_tree_text(&text, &reply_name, max_states),
                    Err(err) => {
                        log::warn!("rule fetch for '{reply_name}' failed: {err}");
                        Err(original)
                    }
                };
                done(result);
            }),
        );
    }

    fn decode_single(&mut self, text: &str) -> Result<RuleDescriptor, RuleError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(RuleError::Empty);
        }
        let substituted = if self.limits.resolve_aliases {
            self.aliases.rule_for(trimmed).map(str::to_owned)
        } else {
            None
        };
        if let Some(rule) = &substituted {
            log::debug!("alias '{trimmed}' -> {rule}");
        }
        let compact: String = substituted
            .as_deref()
            .unwrap_or(trimmed)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if compact.eq_ignore_ascii_case("none") {
            return Ok(RuleDescriptor {
                family: Family::None,
                neighborhood: Neighborhood::Moore,
                states: DEFAULT_MAX_STATES,
                marker: Marker::Plain,
                bounded: None,
                alternate: None,
                name: "none".to_string(),
                alias: None,
            });
        }

        let (rest, marker) = strip_marker(&compact);
        let (family, neighborhood, states) = self.decode_family(rest)?;
        let states = apply_marker(&family, states, marker)?;
        let name = family_name(&family, neighborhood, states, marker);
        Ok(RuleDescriptor {
            family,
            neighborhood,
            states,
            marker,
            bounded: None,
            alternate: None,
            name,
            alias: None,
        })
    }

    /// Family dispatch on marker-free text.
    fn decode_family(&mut self, text: &str) -> Result<(Family, Neighborhood, u16), RuleError> {
        if let Some(payload) = text.get(..3).filter(|p| p.eq_ignore_ascii_case("map")) {
            let table = map::decode(&text[payload.len()..], self.allocator.as_mut())?;
            let neighborhood = table.neighborhood();
            let rule = TotalisticRule::new(table, TableSource::Map);
            return Ok((Family::Totalistic(rule), neighborhood, 2));
        }
        let lower = text.to_ascii_lowercase();

        if let Some(digits) = lower.strip_prefix('w').filter(|d| !d.is_empty()) {
            let mut scan = Scanner::new(digits, "Wolfram rule");
            let number = scan.number()?;
            scan.finish()?;
            let table = totalistic::wolfram(number, self.allocator.as_mut())?;
            let rule = TotalisticRule::new(table, TableSource::Wolfram(number));
            return Ok((Family::Totalistic(rule), Neighborhood::Moore, 2));
        }
        if block::is_pca(&lower) {
            let rule = block::pca(&lower[block::PCA_PREFIX.len()..])?;
            return Ok((Family::Pca(rule), Neighborhood::Moore, 2));
        }
        if block::is_margolus(&lower) {
            let rule = block::margolus(&lower[1..])?;
            return Ok((Family::Margolus(rule), Neighborhood::Moore, 2));
        }
        if range::is_range_rule(&lower) {
            let decoded = range::decode(&lower, &self.limits, self.allocator.as_mut())?;
            return Ok((decoded.family, decoded.neighborhood, decoded.states));
        }
        self.decode_birth_survival(&lower)
    }

    fn decode_birth_survival(
        &mut self,
        lower: &str,
    ) -> Result<(Family, Neighborhood, u16), RuleError> {
        let (rest, mut postfix) = strip_neighborhood(lower);
        let (mut rule, generations) = split_generations(rest)?;
        if postfix.is_none() {
            (rule, postfix) = strip_neighborhood(rule);
        }
        let neighborhood = postfix.unwrap_or(Neighborhood::Moore);
        let (birth, survival) = totalistic::split_birth_survival(rule)?;
        let table = totalistic::build(
            birth,
            survival,
            neighborhood,
            &mut self.scratch,
            self.allocator.as_mut(),
        )?;

        let states = match generations {
            None => 2,
            Some(n) => {
                let max = self.limits.max_states;
                if n < 2 || n > u32::from(max) {
                    return Err(RuleError::out_of_range(
                        "Generations states",
                        i64::from(n),
                        2,
                        i64::from(max),
                    ));
                }
                if n > 2 && table.has_b0() {
                    return Err(RuleError::unsupported("Generations rules can not contain B0"));
                }
                n as u16
            }
        };
        let rule = TotalisticRule::new(table, TableSource::Isotropic);
        Ok((Family::Totalistic(rule), neighborhood, states))
    }
}

/// Markers layer extra states on two-state totalistic and range rules.
fn apply_marker(family: &Family, states: u16, marker: Marker) -> Result<u16, RuleError> {
    if marker == Marker::Plain {
        return Ok(states);
    }
    let supported = matches!(
        family,
        Family::Totalistic(_) | Family::Ltl(_) | Family::Hrot(_)
    );
    if !supported || states != 2 {
        return Err(RuleError::unsupported(format!(
            "{} is only supported for two-state rules",
            marker.postfix()
        )));
    }
    Ok(marker.states())
}

fn check_bounded_b0(descriptor: &RuleDescriptor, grid: &BoundedGrid) -> Result<(), RuleError> {
    if grid.is_infinite() && descriptor.has_b0() {
        return Err(RuleError::unsupported(
            "B0 rules need a bounded width and height",
        ));
    }
    Ok(())
}

fn tree_descriptor(tree: RuleTree) -> RuleDescriptor {
    let neighborhood = if tree.neighbors() == 4 {
        Neighborhood::VonNeumann
    } else {
        Neighborhood::Moore
    };
    RuleDescriptor {
        neighborhood,
        states: tree.states(),
        marker: Marker::Plain,
        bounded: None,
        alternate: None,
        name: tree.name().to_string(),
        alias: None,
        family: Family::RuleTree(tree),
    }
}

fn decode_tree_text(
    text: &str,
    fallback_name: &str,
    max_states: u16,
) -> Result<RuleDescriptor, RuleError> {
    ruletree::parse(text, fallback_name, max_states).map(tree_descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::alias::NoAliases;
    use crate::rules::error::{ErrorKind, Incompatibility};

    fn decode(rule: &str) -> Result<RuleDescriptor, RuleError> {
        RuleDecoder::new().decode(rule)
    }

    #[test]
    fn life_with_alias() {
        let d = decode("B3/S23").unwrap();
        assert_eq!(d.name(), "B3/S23");
        assert_eq!(d.alias(), Some("Conway's Life"));
        assert_eq!(d.states(), 2);
        assert_eq!(d.neighborhood(), Neighborhood::Moore);
        assert_eq!(decode("conway's life").unwrap().name(), "B3/S23");
        assert_eq!(decode(" b3 / s23 ").unwrap().name(), "B3/S23");
    }

    #[test]
    fn aliases_can_be_disabled() {
        let mut decoder = RuleDecoder::with_config(DecoderConfig::default().resolve_aliases(false));
        assert_eq!(decoder.decode("B3/S23").unwrap().alias(), None);
        assert!(decoder.decode("HighLife").is_err());
        let mut decoder = RuleDecoder::new().with_aliases(Arc::new(NoAliases));
        assert_eq!(decoder.decode("B36/S23").unwrap().alias(), None);
    }

    #[test]
    fn generations_and_markers() {
        let d = decode("b2/s/c3").unwrap();
        assert_eq!(d.states(), 3);
        assert_eq!(d.name(), "B2/S/C3");
        assert_eq!(d.alias(), Some("Brian's Brain"));
        assert_eq!(decode("345/2/4").unwrap().name(), "B2/S345/C4");
        assert_eq!(decode("g4b2s345").unwrap().name(), "B2/S345/C4");
        assert_eq!(decode("B2/S34/C3H").unwrap().name(), "B2/S34/C3H");

        let d = decode("B3/S23History").unwrap();
        assert!(d.is_history());
        assert_eq!(d.states(), 7);
        let d = decode("B3/S23Super").unwrap();
        assert_eq!(d.states(), 26);
        assert!(decode("B3/S23Niemiec").unwrap().is_niemiec());
        assert_eq!(
            decode("B2/S/C3History").unwrap_err().kind(),
            ErrorKind::Semantic
        );
        assert_eq!(decode("B0/S/C3").unwrap_err().kind(), ErrorKind::Semantic);
    }

    #[test]
    fn other_families() {
        assert_eq!(decode("W30").unwrap().alias(), Some("Rule 30"));
        assert!(decode("W31").is_err());
        let d = decode("none").unwrap();
        assert_eq!(*d.family(), Family::None);
        assert_eq!(d.states(), 256);
        let d = decode("M0,8,4,3,2,5,9,7,1,6,10,11,12,13,14,15").unwrap();
        assert!(matches!(d.family(), Family::Margolus(_)));
        let d = decode("2PCA4,0,2,4,6,8,10,12,14,1,3,5,7,9,11,13,15").unwrap();
        assert!(matches!(d.family(), Family::Pca(_)));
        let d = decode("R5,C0,M1,S34..58,B34..45,NM").unwrap();
        assert_eq!(d.alias(), Some("Bosco's Rule"));
    }

    #[test]
    fn bounded_grids() {
        let d = decode("B3/S23:T10,5").unwrap();
        assert_eq!(d.name(), "B3/S23:T10,5");
        assert_eq!(d.alias(), Some("Conway's Life"));
        assert_eq!(d.bounded().map(|g| (g.width, g.height)), Some((10, 5)));
        assert!(decode("B3/S23:T10+2,5").is_ok());
        assert!(decode("B3/S23:T10+2*").is_err());
        assert_eq!(decode("B0/S8:P0,10").unwrap_err().kind(), ErrorKind::Semantic);
        assert!(decode("B0/S8:T10,10").is_ok());
    }

    #[test]
    fn alternates() {
        let d = decode("B3/S23|B2/S").unwrap();
        assert_eq!(d.name(), "B3/S23|B2/S");
        assert_eq!(d.alternate().map(RuleDescriptor::name), Some("B2/S"));
        assert_eq!(
            decode("B3/S23|B2/S/C3").unwrap_err(),
            RuleError::Incompatible(Incompatibility::States)
        );
        assert_eq!(
            decode("B3/S23|B2/SH").unwrap_err(),
            RuleError::Incompatible(Incompatibility::Neighborhood)
        );
        assert_eq!(
            decode("B3/S23|R2,C0,M1,S6..9,B7..8,NM").unwrap_err(),
            RuleError::Incompatible(Incompatibility::Family)
        );
        assert_eq!(
            decode("R2,C2,S2,B3|R3,C2,S2,B3").unwrap_err(),
            RuleError::Incompatible(Incompatibility::Range)
        );
        assert_eq!(decode("B3/S23|B2/S|B1/S").unwrap_err(), RuleError::TooManyAlternates);
        assert_eq!(decode("B3/S23|none").unwrap_err().kind(), ErrorKind::Semantic);
        assert_eq!(decode("B3/S23|B0/S").unwrap_err().kind(), ErrorKind::Semantic);
    }

    #[test]
    fn map_payload_keeps_case() {
        let life = "MAPARYXfhZofugWaH7oaIDogBZofuhogOiAaIDogIAAgAAWaH7oaIDogGiA6ICAAIAAaIDogIAAgACAAIAAAAAAAA";
        let d = decode(life).unwrap();
        assert_eq!(d.name(), life);
        assert_eq!(d.table(), decode("B3/S23").unwrap().table());
        // Lowercasing the payload changes the bits it encodes.
        let lower = format!("MAP{}", life[3..].to_ascii_lowercase());
        assert_ne!(decode(&lower).unwrap().table(), d.table());
    }

    #[test]
    fn limits_come_from_config() {
        let mut decoder = RuleDecoder::with_config(DecoderConfig::default().max_range(3));
        assert_eq!(decoder.max_range(), 3);
        assert!(decoder.decode("R3,C2,S2,B3").is_ok());
        assert_eq!(
            decoder.decode("R4,C2,S2,B3").unwrap_err(),
            RuleError::out_of_range("range", 4, 1, 3)
        );
        let mut decoder = RuleDecoder::with_config(DecoderConfig::default().max_grid_size(100));
        assert_eq!(decoder.decode("B3/S23:T101").unwrap_err().kind(), ErrorKind::Range);
    }

    #[test]
    fn range_limit_never_exceeds_default() {
        let decoder = RuleDecoder::with_config(DecoderConfig::default().max_range(40000));
        assert_eq!(decoder.max_range(), DEFAULT_MAX_RANGE);
        let config = DecoderConfig {
            max_range: Some(40000),
            ..DecoderConfig::default()
        };
        let mut decoder = RuleDecoder::with_config(config);
        assert_eq!(decoder.max_range(), DEFAULT_MAX_RANGE);
        assert_eq!(
            decoder.decode("R501,C2,S2,B3").unwrap_err(),
            RuleError::out_of_range("range", 501, 1, 500)
        );
        let decoder = RuleDecoder::with_config(DecoderConfig::default().max_range(0));
        assert_eq!(decoder.max_range(), 1);
    }

    #[test]
    fn errors() {
        assert_eq!(decode("").unwrap_err(), RuleError::Empty);
        assert_eq!(decode("   ").unwrap_err(), RuleError::Empty);
        assert_eq!(decode("B3/S23|").unwrap_err(), RuleError::Empty);
        assert_eq!(decode("hello").unwrap_err().kind(), ErrorKind::Lexical);
        assert_eq!(decode("B9/S23").unwrap_err().kind(), ErrorKind::Range);
    }
}

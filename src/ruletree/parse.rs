use super::colors::{Rgb, default_ramp};
use super::RuleTree;
use crate::rules::RuleError;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Tree,
    Colors,
    Other,
}

#[derive(Default)]
struct Header {
    states: Option<u32>,
    neighbors: Option<u32>,
    nodes: Option<u32>,
}

struct Builder {
    states: u32,
    neighbors: u32,
    nodes: u32,
    levels: Vec<u8>,
    entries: Vec<u32>,
}

fn number(token: &str, context: &'static str) -> Result<u32, RuleError> {
    if !token.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(RuleError::MissingNumber { context });
    }
    token.parse().map_err(|_| match token.chars().find(|c| !c.is_ascii_digit()) {
        Some(found) => RuleError::UnexpectedChar { found, context },
        None => RuleError::out_of_range(context, i64::from(u32::MAX), 0, i64::from(u32::MAX)),
    })
}

impl Header {
    fn set(&mut self, line: &str) -> Result<(), RuleError> {
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| RuleError::malformed(format!("expected name = value, got '{line}'")))?;
        let (key, value) = (key.trim(), value.trim());
        let slot = match key {
            "num_states" => &mut self.states,
            "num_neighbors" => &mut self.neighbors,
            "num_nodes" => &mut self.nodes,
            _ => return Err(RuleError::malformed(format!("unknown rule tree field '{key}'"))),
        };
        *slot = Some(number(value, "rule tree header")?);
        Ok(())
    }

    /// `lines` bounds the node count the text can hold, so a huge declared
    /// `num_nodes` does not reserve memory up front.
    fn finish(&self, max_states: u16, lines: usize) -> Result<Builder, RuleError> {
        let states = self.states.ok_or(RuleError::MissingField("num_states"))?;
        let neighbors = self.neighbors.ok_or(RuleError::MissingField("num_neighbors"))?;
        let nodes = self.nodes.ok_or(RuleError::MissingField("num_nodes"))?;
        if states < 2 || states > u32::from(max_states) {
            return Err(RuleError::out_of_range(
                "num_states",
                i64::from(states),
                2,
                i64::from(max_states),
            ));
        }
        if neighbors != 4 && neighbors != 8 {
            return Err(RuleError::malformed(format!(
                "num_neighbors must be 4 or 8, not {neighbors}"
            )));
        }
        if nodes < neighbors {
            return Err(RuleError::out_of_range(
                "num_nodes",
                i64::from(nodes),
                i64::from(neighbors),
                i64::from(u32::MAX),
            ));
        }
        let reserve = lines.min(nodes as usize);
        Ok(Builder {
            states,
            neighbors,
            nodes,
            levels: Vec::with_capacity(reserve),
            entries: Vec::with_capacity(reserve * states as usize),
        })
    }
}

impl Builder {
    fn node(&mut self, line: &str) -> Result<(), RuleError> {
        let mut tokens = line.split_whitespace();
        let level = number(tokens.next().unwrap_or_default(), "rule tree node")?;
        if level < 1 || level > self.neighbors + 1 {
            return Err(RuleError::out_of_range(
                "rule tree level",
                i64::from(level),
                1,
                i64::from(self.neighbors + 1),
            ));
        }
        let index = self.levels.len();
        let start = self.entries.len();
        for token in tokens {
            let value = number(token, "rule tree node")?;
            if level == 1 {
                if value >= self.states {
                    return Err(RuleError::out_of_range(
                        "rule tree state",
                        i64::from(value),
                        0,
                        i64::from(self.states - 1),
                    ));
                }
                self.entries.push(value);
            } else {
                let child = value as usize;
                if child >= index || u32::from(self.levels[child]) != level - 1 {
                    return Err(RuleError::malformed(format!(
                        "rule tree node {index} refers to node {child}, which is not an earlier node at level {}",
                        level - 1
                    )));
                }
                self.entries.push(value * self.states);
            }
        }
        let found = self.entries.len() - start;
        if found != self.states as usize {
            return Err(RuleError::TokenCount {
                what: "rule tree node",
                expected: self.states as usize,
                found,
            });
        }
        self.levels.push(level as u8);
        Ok(())
    }

    fn finish(self, name: String, colors: &[(u32, Rgb)]) -> Result<RuleTree, RuleError> {
        let expected = (self.nodes as usize).saturating_mul(self.states as usize);
        if self.entries.len() != expected {
            return Err(RuleError::TokenCount {
                what: "rule tree entries",
                expected,
                found: self.entries.len(),
            });
        }
        let root = self.levels.last().copied().unwrap_or(0);
        if u32::from(root) != self.neighbors + 1 {
            return Err(RuleError::malformed(format!(
                "rule tree root is at level {root} but {} neighbors need level {}",
                self.neighbors,
                self.neighbors + 1
            )));
        }
        let mut ramp = default_ramp(self.states as u16);
        for &(state, rgb) in colors {
            if state >= self.states {
                return Err(RuleError::out_of_range(
                    "color state",
                    i64::from(state),
                    0,
                    i64::from(self.states - 1),
                ));
            }
            ramp[state as usize] = rgb;
        }
        Ok(RuleTree {
            name,
            neighbors: self.neighbors as u8,
            states: self.states as u16,
            levels: self.levels.into_boxed_slice(),
            entries: self.entries.into_boxed_slice(),
            colors: ramp,
        })
    }
}

fn color(line: &str) -> Result<(u32, Rgb), RuleError> {
    let values = line
        .split_whitespace()
        .map(|t| number(t, "color"))
        .collect::<Result<Vec<_>, _>>()?;
    let [state, r, g, b] = values[..] else {
        return Err(RuleError::TokenCount {
            what: "color",
            expected: 4,
            found: values.len(),
        });
    };
    let channel = |v: u32| {
        u8::try_from(v).map_err(|_| RuleError::out_of_range("color", i64::from(v), 0, 255))
    };
    Ok((state, Rgb::new(channel(r)?, channel(g)?, channel(b)?)))
}

/// Parse a rule tree definition.
///
/// `text` is either a full rule file with `@RULE`, `@TREE` and optional
/// `@COLORS` sections, or a bare tree body. `fallback_name` names the rule
/// when there is no `@RULE` line.
pub fn parse(text: &str, fallback_name: &str, max_states: u16) -> Result<RuleTree, RuleError> {
    let sectioned = text.lines().any(|l| l.trim_start().starts_with('@'));
    let mut section = if sectioned { Section::Other } else { Section::Tree };
    let mut name = None;
    let mut header = Header::default();
    let mut builder: Option<Builder> = None;
    let mut colors = Vec::new();
    let lines = text.lines().count();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(tag) = line.strip_prefix('@') {
            let (tag, rest) = tag.split_once(char::is_whitespace).unwrap_or((tag, ""));
            section = match tag.to_ascii_uppercase().as_str() {
                "RULE" => {
                    name = Some(rest.trim().to_string()).filter(|n| !n.is_empty());
                    Section::Other
                }
                "TREE" => Section::Tree,
                "COLORS" => Section::Colors,
                _ => Section::Other,
            };
            continue;
        }
        match section {
            Section::Tree if line.contains('=') => {
                if builder.is_some() {
                    return Err(RuleError::malformed("rule tree header after the first node"));
                }
                header.set(line)?;
            }
            Section::Tree => {
                if builder.is_none() {
                    builder = Some(header.finish(max_states, lines)?);
                }
                if let Some(builder) = builder.as_mut() {
                    builder.node(line)?;
                }
            }
            Section::Colors => colors.push(color(line)?),
            Section::Other => {}
        }
    }

    let builder = match builder {
        Some(builder) => builder,
        None => {
            header.finish(max_states, 0)?;
            return Err(RuleError::MissingField("rule tree nodes"));
        }
    };
    let name = name.unwrap_or_else(|| fallback_name.to_string());
    let tree = builder.finish(name, &colors)?;
    log::debug!(
        "parsed rule tree '{}': {} states, {} neighbors, {} nodes",
        tree.name(),
        tree.states(),
        tree.neighbors(),
        tree.node_count()
    );
    Ok(tree)
}

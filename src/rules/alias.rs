//! Well-known rule names.

/// Read-only mapping between display names and rule strings.
pub trait AliasTable: Send + Sync {
    /// Rule string for a name, compared case-insensitively.
    fn rule_for(&self, name: &str) -> Option<&str>;

    /// Display name for a canonical rule string.
    fn alias_for(&self, canonical: &str) -> Option<&str>;
}

/// Built-in aliases as `(name, canonical rule)` pairs.
const BUILTIN: &[(&str, &str)] = &[
    ("Conway's Life", "B3/S23"),
    ("HighLife", "B36/S23"),
    ("Day & Night", "B3678/S34678"),
    ("Seeds", "B2/S"),
    ("Life without Death", "B3/S012345678"),
    ("Maze", "B3/S12345"),
    ("Replicator", "B1357/S1357"),
    ("2x2", "B36/S125"),
    ("Diamoeba", "B35678/S5678"),
    ("Morley", "B368/S245"),
    ("Anneal", "B4678/S35678"),
    ("Long Life", "B345/S5"),
    ("Gnarl", "B1/S1"),
    ("Live Free or Die", "B2/S0"),
    ("Coral", "B3/S45678"),
    ("Brian's Brain", "B2/S/C3"),
    ("Star Wars", "B2/S345/C4"),
    ("Bosco's Rule", "R5,C2,S33-57,B34-45"),
    ("tlife", "B3/S2-i34q"),
    ("LifeHistory", "B3/S23History"),
    ("Rule 30", "W30"),
];

#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinAliases;

impl AliasTable for BuiltinAliases {
    fn rule_for(&self, name: &str) -> Option<&str> {
        BUILTIN
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            .map(|&(_, rule)| rule)
    }

    fn alias_for(&self, canonical: &str) -> Option<&str> {
        BUILTIN
            .iter()
            .find(|(_, rule)| *rule == canonical)
            .map(|&(alias, _)| alias)
    }
}

/// An empty table, for callers that want canonical names only.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAliases;

impl AliasTable for NoAliases {
    fn rule_for(&self, _name: &str) -> Option<&str> {
        None
    }

    fn alias_for(&self, _canonical: &str) -> Option<&str> {
        None
    }
}

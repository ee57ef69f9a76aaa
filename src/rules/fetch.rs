//! Rule-table fetch boundary.
//!
//! When a rule string does not decode, the host may look it up elsewhere
//! (typically a rule repository over the network). The decoder never does
//! I/O itself: it hands the name to a [`RuleFetcher`] together with a
//! continuation and decodes whatever text comes back.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("rule '{0}' was not found")]
    NotFound(String),
    #[error("fetching rule '{name}' failed: {reason}")]
    Failed { name: String, reason: String },
}

/// Continuation invoked exactly once with the fetched rule text.
pub type FetchReply = Box<dyn FnOnce(Result<String, FetchError>) + Send>;

pub trait RuleFetcher {
    /// Start fetching `name`. `reply` may run before this returns or later on
    /// another thread.
    fn fetch(&self, name: &str, reply: FetchReply);
}

/// Serves rule files from memory, replying synchronously.
#[derive(Clone, Debug, Default)]
pub struct MemoryFetcher {
    rules: Vec<(String, String)>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.rules.push((name.into(), text.into()));
        self
    }
}

impl RuleFetcher for MemoryFetcher {
    fn fetch(&self, name: &str, reply: FetchReply) {
        let found = self
            .rules
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, text)| text.clone());
        reply(found.ok_or_else(|| FetchError::NotFound(name.to_string())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn memory_fetcher_replies_once() {
        let fetcher = MemoryFetcher::new().with_rule("Parity", "@RULE Parity");
        let (tx, rx) = mpsc::channel();
        let tx2 = tx.clone();
        fetcher.fetch("parity", Box::new(move |r| tx.send(r).unwrap()));
        fetcher.fetch("missing", Box::new(move |r| tx2.send(r).unwrap()));
        assert_eq!(rx.recv().unwrap(), Ok("@RULE Parity".to_string()));
        assert_eq!(
            rx.recv().unwrap(),
            Err(FetchError::NotFound("missing".to_string()))
        );
    }
}

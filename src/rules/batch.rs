//! Parallel decoding of many rule strings.
//!
//! Each rayon worker owns its own [`RuleDecoder`], so scratch buffers are
//! never shared between concurrent decodes. The alias table is shared
//! read-only.

use std::sync::{Arc, OnceLock};

use rayon::prelude::*;
use thiserror::Error;

use super::alias::{AliasTable, BuiltinAliases};
use super::decoder::{DecoderConfig, RuleDecoder};
use super::descriptor::RuleDescriptor;
use super::error::RuleError;

static PHYSICAL_CORES: OnceLock<usize> = OnceLock::new();

#[inline]
fn physical_core_count() -> usize {
    *PHYSICAL_CORES.get_or_init(|| num_cpus::get_physical().max(1))
}

/// Physical cores, at most eight.
#[inline]
fn auto_pool_thread_count_for_physical(physical: usize) -> usize {
    physical.clamp(1, 8)
}

#[inline]
fn auto_pool_thread_count() -> usize {
    auto_pool_thread_count_for_physical(physical_core_count())
}

/// Resolve the thread count from a config, falling back to auto-detect.
fn resolve_thread_count(config: &BatchConfig) -> usize {
    let mut threads = config.thread_count.unwrap_or_else(auto_pool_thread_count);
    if let Some(cap) = config.max_threads {
        threads = threads.min(cap);
    }
    threads.max(1)
}

/// Configuration for a batch decoder.
#[derive(Clone, Debug, Default)]
pub struct BatchConfig {
    /// Number of threads for the decode pool.
    /// `None` means auto-detect from physical cores.
    pub thread_count: Option<usize>,
    /// Hard upper bound on threads regardless of auto-detection.
    /// `None` means no additional cap beyond `thread_count`.
    pub max_threads: Option<usize>,
    /// Limits for each worker's decoder.
    pub decoder: DecoderConfig,
}

impl BatchConfig {
    /// Set an explicit thread count for the decode pool.
    pub fn thread_count(mut self, n: usize) -> Self {
        self.thread_count = Some(n.max(1));
        self
    }

    /// Set a hard upper bound on threads.
    pub fn max_threads(mut self, n: usize) -> Self {
        self.max_threads = Some(n.max(1));
        self
    }

    pub fn decoder(mut self, decoder: DecoderConfig) -> Self {
        self.decoder = decoder;
        self
    }
}

#[derive(Debug, Error)]
#[error("failed to build rule decoding thread pool: {0}")]
pub struct BatchError(#[from] rayon::ThreadPoolBuildError);

pub struct BatchDecoder {
    pool: rayon::ThreadPool,
    threads: usize,
    decoder: DecoderConfig,
    aliases: Arc<dyn AliasTable>,
}

impl BatchDecoder {
    pub fn new() -> Result<Self, BatchError> {
        Self::with_config(BatchConfig::default())
    }

    pub fn with_config(config: BatchConfig) -> Result<Self, BatchError> {
        let threads = resolve_thread_count(&config);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("life-rules-{i}"))
            .build()?;
        log::debug!("batch decoder using {threads} threads");
        Ok(Self {
            pool,
            threads,
            decoder: config.decoder,
            aliases: Arc::new(BuiltinAliases),
        })
    }

    /// Replace the alias table shared by every worker.
    pub fn with_aliases(mut self, aliases: Arc<dyn AliasTable>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn thread_count(&self) -> usize {
        self.threads
    }

    /// Decode every rule, keeping input order.
    pub fn decode_all<S>(&self, rules: &[S]) -> Vec<Result<RuleDescriptor, RuleError>>
    where
        S: AsRef<str> + Sync,
    {
        let config = &self.decoder;
        let aliases = &self.aliases;
        self.pool.install(|| {
            rules
                .par_iter()
                .map_init(
                    || RuleDecoder::with_config(config.clone()).with_aliases(Arc::clone(aliases)),
                    |decoder, rule| decoder.decode(rule.as_ref()),
                )
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_thread_count_is_capped() {
        assert_eq!(auto_pool_thread_count_for_physical(0), 1);
        assert_eq!(auto_pool_thread_count_for_physical(4), 4);
        assert_eq!(auto_pool_thread_count_for_physical(32), 8);
    }

    #[test]
    fn explicit_threads_respect_cap() {
        let config = BatchConfig::default().thread_count(6).max_threads(2);
        assert_eq!(resolve_thread_count(&config), 2);
        let config = BatchConfig::default().thread_count(3);
        assert_eq!(resolve_thread_count(&config), 3);
    }

    #[test]
    fn results_keep_order() {
        let batch = BatchDecoder::with_config(BatchConfig::default().thread_count(2)).unwrap();
        let results = batch.decode_all(&["B3/S23", "bogus", "B36/S23"]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().name(), "B3/S23");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().alias(), Some("HighLife"));
    }
}

//! Decode throughput benchmark.
//!
//! Runs a fixed corpus of rule strings plus seeded random isotropic rules
//! through a single decoder and through the batch pool. Use with
//! `--release` for meaningful results.

#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use life_rules::rules::random::random_rule;
use life_rules::rules::{BatchConfig, BatchDecoder, Neighborhood, RuleDecoder};
use rand::SeedableRng;
use std::time::Instant;

const CORPUS: &[&str] = &[
    "B3/S23",
    "B36/S23",
    "B2-a/S12",
    "B3-cnqy/S2-i34q",
    "B2/S/C3",
    "B3/S23History",
    "B2o/S2m34H",
    "B2/S013V",
    "B2/S12L",
    "W110",
    "R2,C0,M1,S6..9,B7..8,NM",
    "R5,C0,M1,S34..58,B34..45,NM",
    "R3,C2,S2,3,B3,NN",
    "R2B4S3z",
    "MAPARYXfhZofugWaH7oaIDogBZofuhogOiAaIDogIAAgAAWaH7oaIDogGiA6ICAAIAAaIDogIAAgACAAIAAAAAAAA",
    "M0,8,4,3,2,5,9,7,1,6,10,11,12,13,14,15",
    "B3/S23|B36/S23",
    "B3/S23:T100,100",
    "B3/S23:K64*,64",
];

struct Scenario {
    name: &'static str,
    random: usize,
    repeat: usize,
    seed: u64,
}

fn build_rules(s: &Scenario) -> Vec<String> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(s.seed);
    let mut rules = Vec::with_capacity(s.repeat * CORPUS.len() + s.random);
    for _ in 0..s.repeat {
        rules.extend(CORPUS.iter().map(|r| r.to_string()));
    }
    rules.extend((0..s.random).map(|_| random_rule(&mut rng, Neighborhood::Moore)));
    rules
}

fn run_single(rules: &[String]) -> (f64, usize) {
    let mut decoder = RuleDecoder::new();
    let start = Instant::now();
    let ok = rules.iter().filter(|r| decoder.decode(r).is_ok()).count();
    (start.elapsed().as_secs_f64() * 1000.0, ok)
}

fn run_batch(rules: &[String], threads: Option<usize>) -> (f64, usize) {
    let config = if let Some(t) = threads {
        BatchConfig::default().thread_count(t)
    } else {
        BatchConfig::default()
    };
    let batch = match BatchDecoder::with_config(config) {
        Ok(batch) => batch,
        Err(err) => panic!("{err}"),
    };
    let start = Instant::now();
    let ok = batch.decode_all(rules).iter().filter(|r| r.is_ok()).count();
    (start.elapsed().as_secs_f64() * 1000.0, ok)
}

fn main() {
    let scenarios = [
        Scenario {
            name: "corpus",
            random: 0,
            repeat: 200,
            seed: 0xA1,
        },
        Scenario {
            name: "random-small",
            random: 2_000,
            repeat: 0,
            seed: 0xB2,
        },
        Scenario {
            name: "random-large",
            random: 20_000,
            repeat: 0,
            seed: 0xC3,
        },
        Scenario {
            name: "mixed",
            random: 10_000,
            repeat: 500,
            seed: 0xD4,
        },
    ];

    println!(
        "{:<16} {:>10} {:>10} {:>12} {:>12} {:>10}",
        "Scenario", "Threads", "Rules", "Total(ms)", "Avg(us)", "Ok"
    );
    println!("{}", "-".repeat(74));

    for s in &scenarios {
        let rules = build_rules(s);
        let (total_ms, ok) = run_single(&rules);
        let avg_us = total_ms * 1000.0 / rules.len() as f64;
        println!(
            "{:<16} {:>10} {:>10} {:>12.3} {:>12.3} {:>10}",
            s.name,
            "single",
            rules.len(),
            total_ms,
            avg_us,
            ok
        );
    }

    println!();

    for s in &scenarios {
        let rules = build_rules(s);
        for threads in [None, Some(1)] {
            let (total_ms, ok) = run_batch(&rules, threads);
            let avg_us = total_ms * 1000.0 / rules.len() as f64;
            let label = threads.map_or_else(|| "auto".to_string(), |t| t.to_string());
            println!(
                "{:<16} {:>10} {:>10} {:>12.3} {:>12.3} {:>10}",
                s.name,
                label,
                rules.len(),
                total_ms,
                avg_us,
                ok
            );
        }
    }
}

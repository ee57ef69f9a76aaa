#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use life_rules::rules::random::random_rule;
use life_rules::rules::{BatchConfig, BatchDecoder, DecoderConfig, Family, Neighborhood};
use rand::SeedableRng;
use std::process::ExitCode;
use std::time::Instant;

const RANDOM_SEED: u64 = 0x5EED_1234_ABCD_EF01;
const USAGE: &str = "usage: life-rules [--threads N] [--max-threads N] [--random N] RULE...";

struct MainArgs {
    config: BatchConfig,
    random: usize,
    rules: Vec<String>,
}

fn parse_args() -> MainArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut config = BatchConfig::default().decoder(DecoderConfig::from_env());
    let mut random = 0;
    let mut rules = Vec::new();
    let next_arg = |i: usize, flag: &str| -> &str {
        args.get(i)
            .map(String::as_str)
            .unwrap_or_else(|| panic!("{flag} requires a value\n{USAGE}"))
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--threads" => {
                i += 1;
                let n: usize = next_arg(i, "--threads")
                    .parse()
                    .expect("--threads requires a positive integer");
                config = config.thread_count(n);
            }
            "--max-threads" => {
                i += 1;
                let n: usize = next_arg(i, "--max-threads")
                    .parse()
                    .expect("--max-threads requires a positive integer");
                config = config.max_threads(n);
            }
            "--random" => {
                i += 1;
                random = next_arg(i, "--random")
                    .parse()
                    .expect("--random requires a non-negative integer");
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other if other.starts_with("--") => panic!("unknown argument: {other}\n{USAGE}"),
            rule => rules.push(rule.to_string()),
        }
        i += 1;
    }
    MainArgs {
        config,
        random,
        rules,
    }
}

fn describe(family: &Family) -> String {
    match family {
        Family::Totalistic(rule) => match rule.wolfram() {
            Some(n) => format!("Wolfram {n}"),
            None => format!("{:?} table", rule.source()),
        },
        Family::Ltl(ltl) => format!("Larger than Life, range {}", ltl.range),
        Family::Hrot(hrot) => format!("HROT, range {}", hrot.range),
        Family::RuleTree(tree) => format!("rule tree, {} nodes", tree.node_count()),
        other => other.name().to_string(),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = parse_args();
    let mut rules = args.rules;
    let mut rng = rand::rngs::StdRng::seed_from_u64(RANDOM_SEED);
    rules.extend((0..args.random).map(|_| random_rule(&mut rng, Neighborhood::Moore)));
    if rules.is_empty() {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    }

    let batch = match BatchDecoder::with_config(args.config) {
        Ok(batch) => batch,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let start = Instant::now();
    let results = batch.decode_all(&rules);
    let elapsed = start.elapsed();

    let mut failures = 0usize;
    for (rule, result) in rules.iter().zip(&results) {
        match result {
            Ok(descriptor) => {
                print!("{rule} -> {}", descriptor.name());
                if let Some(alias) = descriptor.alias() {
                    print!(" ({alias})");
                }
                println!(
                    " [{}, {} states, {}]",
                    describe(descriptor.family()),
                    descriptor.states(),
                    descriptor.neighborhood().name()
                );
            }
            Err(err) => {
                failures += 1;
                println!("{rule} -> {:?} error: {err}", err.kind());
            }
        }
    }
    log::info!(
        "decoded {} rules on {} threads in {:.3} ms ({failures} failed)",
        rules.len(),
        batch.thread_count(),
        elapsed.as_secs_f64() * 1000.0
    );
    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

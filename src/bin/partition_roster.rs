/// Split a full roster file into one bundle per category plus an index.
///
/// Usage:
/// ```bash
/// cargo run --bin partition_roster -- --input data/all-employees.json --output public/employees
/// ```
///
/// Options:
/// - `--input <file>`: roster file, either `{ "employees": [...] }` or a bare array (required)
/// - `--output <dir>`: directory for the bundles and `index.json` (required)
/// - `--rules <leveled|keyword>`: built-in rule table (default: from settings, else `leveled`)
/// - `--config <file>`: settings file to take the rule table from
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use rosterrank::classification::RuleSet;
use rosterrank::settings::SettingsStore;
use rosterrank::{batch, init_logging, log_info};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Default)]
struct PartitionArgs {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    rules: Option<RuleSet>,
    config: Option<PathBuf>,
}

fn print_help() {
    println!("partition_roster --input <file> --output <dir> [--rules leveled|keyword] [--config <file>]");
}

fn parse_args() -> Result<PartitionArgs> {
    let mut parsed = PartitionArgs::default();
    let args: Vec<String> = std::env::args().collect();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        if matches!(flag, "--help" | "-h") {
            print_help();
            std::process::exit(0);
        }

        let value = args
            .get(i + 1)
            .with_context(|| format!("{flag} requires a value"))?;
        match flag {
            "--input" => parsed.input = Some(PathBuf::from(value)),
            "--output" => parsed.output = Some(PathBuf::from(value)),
            "--config" => parsed.config = Some(PathBuf::from(value)),
            "--rules" => {
                parsed.rules = Some(
                    RuleSet::parse(value)
                        .with_context(|| format!("unknown rule table {value}"))?,
                )
            }
            _ => bail!("Unknown argument: {flag}"),
        }
        i += 2;
    }

    Ok(parsed)
}

fn main() -> Result<()> {
    init_logging();

    let args = parse_args()?;
    let (Some(input), Some(output)) = (args.input, args.output) else {
        print_help();
        bail!("--input and --output are required");
    };

    let rule_set = match (args.rules, args.config) {
        (Some(rules), _) => rules,
        (None, Some(config)) => SettingsStore::new(config)?.get().rule_set,
        (None, None) => RuleSet::default(),
    };

    let report = batch::run_partition(&input, &output, &rule_set.table())?;
    if report.skipped_entries > 0 {
        log::warn!("skipped {} entries without a usable username", report.skipped_entries);
    }
    log_info!(
        "wrote {} files for {} records to {}",
        report.files.len(),
        report.index.total_employees,
        output.display()
    );

    Ok(())
}

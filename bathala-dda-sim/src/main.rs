mod logic;
mod scenarios;
mod util;

use anyhow::{Context, Result};
use bathala_dda::{DdaConfig, DdaPreset};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{ScenarioResult, SeedInfo, SessionTester, resolve_seed_inputs};
use scenarios::{Scenario, find_scenario, list_scenarios, scenario_keys};
use util::split_csv;

#[derive(Debug, Parser)]
#[command(name = "bathala-dda-sim", version)]
#[command(
    about = "Step-by-step audit simulator for the Bathala dynamic difficulty adjustment engine"
)]
struct Args {
    /// Scenarios to run (comma-separated keys, or `all`)
    #[arg(long, default_value = "all")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated integers, 0x hex, or words)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Iterations per scenario and seed; iteration i runs with seed + i
    #[arg(long, default_value_t = 3)]
    iterations: usize,

    /// Number of combats in seeded random-stream scenarios
    #[arg(long)]
    combats: Option<u32>,

    /// Engine preset applied to every scenario
    #[arg(long)]
    preset: Option<DdaPreset>,

    /// JSON engine configuration applied to every scenario
    #[arg(long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Print every combat's breakdown
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let config = load_config(&args)?;
    let scenarios = expand_scenarios(&args.scenarios);
    let seed_infos = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let tester = SessionTester::new(args.verbose)
        .with_config(config)
        .with_combats(args.combats);

    let results = run_scenarios(&tester, &scenarios, &seed_infos, args.iterations);

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:20} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "⚖️  Bathala DDA Simulator".bright_cyan().bold());
    println!("{}", "=========================".cyan());
}

/// Configuration override from `--config` or `--preset`, validated.
fn load_config(args: &Args) -> Result<Option<DdaConfig>> {
    let config = if let Some(path) = &args.config {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        DdaConfig::from_json(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?
    } else if let Some(preset) = args.preset {
        DdaConfig::preset(preset)
    } else {
        return Ok(None);
    };
    config.validate().context("invalid engine configuration")?;
    Ok(Some(config))
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<Scenario> {
    let mut keys = split_csv(scenarios_arg);
    if keys.iter().any(|key| key.eq_ignore_ascii_case("all")) {
        keys.retain(|key| !key.eq_ignore_ascii_case("all"));
        keys.extend(scenario_keys().into_iter().map(str::to_string));
    }

    let mut scenarios: Vec<Scenario> = Vec::new();
    for key in keys {
        match find_scenario(&key) {
            Some(scenario) if scenarios.iter().all(|s| s.key != scenario.key) => {
                scenarios.push(scenario);
            }
            Some(_) => {}
            None => eprintln!("⚠️  Unknown scenario: {}", key.yellow()),
        }
    }
    scenarios
}

fn run_scenarios(
    tester: &SessionTester,
    scenarios: &[Scenario],
    seed_infos: &[SeedInfo],
    iterations: usize,
) -> Vec<ScenarioResult> {
    if scenarios.is_empty() {
        return Vec::new();
    }

    println!("{}", "🧠 Replaying Sessions".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());
    let seeds: Vec<String> = seed_infos.iter().map(SeedInfo::label).collect();
    println!("Seeds: {}", seeds.join(", "));

    let seed_values: Vec<u64> = seed_infos.iter().map(|s| s.seed).collect();
    scenarios
        .iter()
        .flat_map(|scenario| tester.run_scenario(scenario, &seed_values, iterations))
        .collect()
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                logic::reports::generate_json_report(&mut output_target, results)?;
            }
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Bathala DDA Audit Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        "csv" => logic::reports::generate_csv_report(&mut output_target, results)?,
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

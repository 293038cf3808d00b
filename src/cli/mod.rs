use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::bail;
use clap::Parser;
use colored::Colorize;

use crate::catalog::{load_slots, load_srams};
use crate::cli::args::{Args, Command, ListWhat, ReportFormat};
use crate::cli::progress::StepContext;
use crate::config::parse_chip_config;
use crate::fit::calculate_fit;
use crate::package::create_package;
use crate::plan::{execute_plan, generate_plan, ExecutePlanParams, TaskKey};
use crate::status::{fetcher, report, load_downstream_repos};
use crate::{Result, DATA_PATH};

pub mod args;
pub mod progress;

pub const BANNER: &str = r"
  ___ _ __ __ _ _ __ ___       / _| ___  _ __ __ _  ___
 / __| '__/ _` | '_ ` _ \ ____| |_ / _ \| '__/ _` |/ _ \
 \__ \ | | (_| | | | | | |____|  _| (_) | | | (_| |  __/
 |___/_|  \__,_|_| |_| |_|    |_|  \___/|_|  \__, |\___|
                                             |___/
";

pub fn run() -> Result<()> {
    let args = Args::parse();
    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DATA_PATH));

    match args.command {
        Command::List { what } => list(&data_dir, what),
        Command::Calc {
            slot,
            sram,
            halo,
            reserved,
        } => calc(&data_dir, &slot, &sram, halo, reserved),
        Command::Check { config } => check(&data_dir, &config),
        Command::Gen {
            config,
            output,
            only,
        } => gen(&data_dir, &config, &output, only),
        Command::Package {
            config,
            name,
            output,
        } => package(&data_dir, &config, &name, &output),
        Command::Status {
            repos,
            format,
            limit,
        } => status(&data_dir, repos, format, limit),
    }
}

fn list(data_dir: &Path, what: ListWhat) -> Result<()> {
    match what {
        ListWhat::Srams => {
            let srams = load_srams(data_dir.join("srams.toml"))?;
            println!("Available SRAMs:");
            println!("{}", "-".repeat(70));
            for (name, spec) in &srams {
                let bits = spec.total_bits();
                println!("  {name}");
                println!(
                    "    Capacity: {} x {}-bit = {} bits ({} bytes)",
                    spec.size,
                    spec.width,
                    bits,
                    bits / 8
                );
                println!(
                    "    Size: {:.2} x {:.2} um",
                    spec.dimensions_um.width, spec.dimensions_um.height
                );
                println!();
            }
        }
        ListWhat::Slots => {
            let slots = load_slots(data_dir.join("slots.toml"))?;
            println!("Available Slots:");
            println!("{}", "-".repeat(70));
            for (name, spec) in &slots {
                println!("  {name}");
                println!(
                    "    Die: {:.0} x {:.0} um",
                    spec.die.width, spec.die.height
                );
                println!(
                    "    Core: {:.0} x {:.0} um",
                    spec.core_width(),
                    spec.core_height()
                );
                println!("    Core area: {:.3} mm^2", spec.core_area_um2() / 1e6);
                println!(
                    "    IO budget: {} bidir, {} input",
                    spec.io_budget.bidir, spec.io_budget.input
                );
                println!();
            }
        }
    }
    Ok(())
}

fn calc(data_dir: &Path, slot: &str, sram: &str, halo: f64, reserved: Option<f64>) -> Result<()> {
    if halo < 0.0 {
        bail!("halo must be non-negative");
    }
    let slots = load_slots(data_dir.join("slots.toml"))?;
    let srams = load_srams(data_dir.join("srams.toml"))?;
    let Some(slot_spec) = slots.get(slot) else {
        bail!("unknown slot '{slot}'");
    };
    let Some(sram_spec) = srams.get(sram) else {
        bail!("unknown SRAM macro '{sram}'");
    };

    let fit = calculate_fit(slot_spec, sram_spec, halo, reserved);

    println!("Fit for {sram} in slot {slot}:");
    println!("  Grid: {} cols x {} rows = {} macros", fit.cols, fit.rows, fit.count);
    println!("  Total words: {}", fit.total_words);
    println!(
        "  Capacity: {} bits ({} bytes)",
        fit.total_bits,
        fit.total_bytes()
    );
    println!("  Address bits: {}", fit.address_bits);
    println!("  Utilization: {:.1}%", fit.utilization * 100.0);
    if !fit.reservation_met {
        println!(
            "{}",
            "  Warning: reserved-area budget not satisfied".yellow()
        );
    }
    Ok(())
}

fn check(data_dir: &Path, config_path: &Path) -> Result<()> {
    let config = parse_chip_config(config_path)?;
    let plan = generate_plan(config, data_dir)?;
    println!(
        "{} {} in slot {}: {} macros, {} bytes",
        "OK".green(),
        plan.config.chip.name,
        plan.config.slot,
        plan.fit.count,
        plan.fit.total_bytes()
    );
    Ok(())
}

fn gen(
    data_dir: &Path,
    config_path: &Path,
    output: &Path,
    only: Option<args::Artifact>,
) -> Result<()> {
    println!("{BANNER}");
    println!("Reading configuration file {config_path:?}...\n");
    let config = parse_chip_config(config_path)?;

    let tasks: HashSet<TaskKey> = only.map(|a| HashSet::from([a.task_key()])).unwrap_or_default();
    let total_steps = if tasks.is_empty() { 4 } else { tasks.len() };
    let mut ctx = StepContext::new(total_steps);

    let plan = ctx.check(generate_plan(config, data_dir))?;
    println!("Chip: {}", plan.config.chip.name);
    println!("  Slot: {}", plan.config.slot);
    println!("  Macro: {}", plan.config.memory.macro_name);
    println!(
        "  Fit: {}x{} grid, {} macros, {} bytes",
        plan.fit.cols,
        plan.fit.rows,
        plan.fit.count,
        plan.fit.total_bytes()
    );

    let res = execute_plan(ExecutePlanParams {
        work_dir: output,
        plan: &plan,
        tasks: &tasks,
        ctx: Some(&mut ctx),
    });
    ctx.check(res)?;
    ctx.done();

    println!("Artifacts saved to: {output:?}");
    Ok(())
}

fn package(data_dir: &Path, config_path: &Path, name: &str, output: &Path) -> Result<()> {
    let config = parse_chip_config(config_path)?;
    let plan = generate_plan(config, data_dir)?;
    let package_dir = create_package(&plan, name, output)?;
    println!("Package staged at: {}", package_dir.display());
    Ok(())
}

fn status(
    data_dir: &Path,
    repos: Option<PathBuf>,
    format: ReportFormat,
    limit: usize,
) -> Result<()> {
    let repos_path = repos.unwrap_or_else(|| data_dir.join("downstream.toml"));
    let repos = load_downstream_repos(repos_path)?;
    let status_report = fetcher::fetch_all_status(&repos, limit);

    match format {
        ReportFormat::Terminal => println!("{}", report::format_terminal(&status_report)),
        ReportFormat::Markdown => println!("{}", report::format_markdown(&status_report)),
        ReportFormat::Json => println!("{}", report::format_json(&status_report)?),
    }
    Ok(())
}

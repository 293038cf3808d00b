use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::plan::TaskKey;

#[derive(Parser, Debug)]
#[command(
    name = "sram-forge",
    author,
    version,
    about = "Generate SRAM-based chip designs for GF180MCU",
    help_template(
        "{before-help}{name} {version}\n{author-with-newline}{about-with-newline}\n{usage-heading} {usage}\n\n{all-args}{after-help}"
    )
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Catalog directory holding srams.toml, slots.toml, downstream.toml.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available SRAMs or slots.
    List {
        #[arg(value_enum)]
        what: ListWhat,
    },

    /// Calculate SRAM capacity for a slot.
    Calc {
        /// Slot name (e.g. 1x1).
        #[arg(long)]
        slot: String,

        /// SRAM macro name.
        #[arg(long)]
        sram: String,

        /// Routing halo around each SRAM in microns (each side).
        #[arg(long, default_value_t = 10.0)]
        halo: f64,

        /// Override the slot's reserved area in square microns.
        #[arg(long)]
        reserved: Option<f64>,
    },

    /// Validate a chip configuration file against the catalog.
    Check {
        /// Path to TOML chip configuration.
        config: PathBuf,
    },

    /// Generate outputs from a chip configuration.
    Gen {
        /// Path to TOML chip configuration.
        config: PathBuf,

        /// Directory to which output files should be saved.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Generate only one artifact family.
        #[arg(long, value_enum)]
        only: Option<Artifact>,
    },

    /// Create a complete asset package.
    Package {
        /// Path to TOML chip configuration.
        config: PathBuf,

        /// Package name.
        #[arg(long)]
        name: String,

        /// Directory in which to stage the package.
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Report build status of the downstream repositories.
    Status {
        /// Downstream repository database; defaults to the bundled
        /// downstream.toml.
        #[arg(long)]
        repos: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = ReportFormat::Terminal)]
        format: ReportFormat,

        /// Workflow runs to fetch per repository.
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListWhat {
    Srams,
    Slots,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Verilog,
    Librelane,
    Testbench,
    Docs,
}

impl Artifact {
    pub fn task_key(self) -> TaskKey {
        match self {
            Artifact::Verilog => TaskKey::GenerateVerilog,
            Artifact::Librelane => TaskKey::GenerateLibrelane,
            Artifact::Testbench => TaskKey::GenerateTestbench,
            Artifact::Docs => TaskKey::GenerateDocs,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Terminal,
    Markdown,
    Json,
}

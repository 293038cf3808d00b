//! Design planning and artifact generation pipeline.
//!
//! A [`DesignPlan`] resolves a chip config against the catalog: the slot and
//! macro records plus the fit calculation, with any explicit macro count
//! already applied. [`execute_plan`] renders the requested artifact families
//! into a work directory.

use std::collections::HashSet;
use std::path::Path;

use anyhow::bail;
use log::info;

use crate::catalog::{self, SlotSpec, SramSpec};
use crate::cli::progress::StepContext;
use crate::config::{ChipConfig, MacroCount};
use crate::fit::{calculate_fit, FitResult};
use crate::paths::{out_markdown, out_python, out_sdc, out_tcl, out_verilog, out_yaml, save};
use crate::{docs, librelane, testbench, verilog, Result};

/// Routing halo applied around each macro, in microns per side.
pub const DEFAULT_HALO_UM: f64 = 10.0;

/// A concrete plan for one chip: config resolved against the catalog, fit
/// computed, explicit count applied.
pub struct DesignPlan {
    pub config: ChipConfig,
    pub slot: SlotSpec,
    pub sram: SramSpec,
    pub fit: FitResult,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskKey {
    GeneratePlan,
    GenerateVerilog,
    GenerateLibrelane,
    GenerateTestbench,
    GenerateDocs,
}

pub struct ExecutePlanParams<'a> {
    pub work_dir: &'a Path,
    pub plan: &'a DesignPlan,
    /// Artifact families to generate; empty means all.
    pub tasks: &'a HashSet<TaskKey>,
    pub ctx: Option<&'a mut StepContext>,
}

/// Resolve a chip config against the catalog and compute the fit.
pub fn generate_plan(config: ChipConfig, data_dir: &Path) -> Result<DesignPlan> {
    let slots = catalog::load_slots(data_dir.join("slots.toml"))?;
    let srams = catalog::load_srams(data_dir.join("srams.toml"))?;

    let Some(slot) = slots.get(&config.slot) else {
        bail!("unknown slot '{}'", config.slot);
    };
    let Some(sram) = srams.get(&config.memory.macro_name) else {
        bail!("unknown SRAM macro '{}'", config.memory.macro_name);
    };

    let mut fit = calculate_fit(slot, sram, DEFAULT_HALO_UM, None);

    match config.memory.count {
        MacroCount::Auto => {
            if fit.count == 0 {
                bail!(
                    "no {} macros fit in slot '{}'",
                    config.memory.macro_name,
                    config.slot
                );
            }
        }
        MacroCount::Explicit(n) => {
            if n == 0 {
                bail!("explicit macro count must be at least 1");
            }
            if n > fit.cols * fit.rows {
                bail!(
                    "requested {n} macros but only {} fit in slot '{}'",
                    fit.cols * fit.rows,
                    config.slot
                );
            }
            fit.resize(n, sram);
        }
    }

    info!(
        "planned {}: {}x{} grid, {} macros, {} bytes",
        config.chip.name,
        fit.cols,
        fit.rows,
        fit.count,
        fit.total_bytes()
    );

    Ok(DesignPlan {
        slot: slot.clone(),
        sram: sram.clone(),
        fit,
        config,
    })
}

macro_rules! try_finish_task {
    ( $ctx:expr, $task:expr ) => {
        if let Some(ctx) = $ctx.as_mut() {
            ctx.finish($task);
        }
    };
}

macro_rules! try_execute_task {
    ( $tasks:expr, $task:expr, $body:expr, $ctx:expr ) => {
        if $tasks.is_empty() || $tasks.contains(&$task) {
            $body;
            try_finish_task!($ctx, $task);
        }
    };
}

/// Render the plan's artifacts into the work directory.
pub fn execute_plan(params: ExecutePlanParams) -> Result<()> {
    let ExecutePlanParams {
        work_dir,
        plan,
        tasks,
        mut ctx,
    } = params;

    std::fs::create_dir_all(work_dir)?;

    let DesignPlan {
        config,
        slot,
        sram,
        fit,
    } = plan;
    let name = &config.chip.name;

    try_execute_task!(
        tasks,
        TaskKey::GenerateVerilog,
        {
            let src_dir = work_dir.join("src");
            save(
                out_verilog(&src_dir, &format!("{name}_sram_array")),
                &verilog::generate_sram_array(config, sram, fit)?,
            )?;
            save(
                out_verilog(&src_dir, &format!("{name}_core")),
                &verilog::generate_chip_core(config, sram, fit)?,
            )?;
            save(
                out_verilog(&src_dir, &format!("{name}_top")),
                &verilog::generate_chip_top(config, sram, fit)?,
            )?;
        },
        ctx
    );

    try_execute_task!(
        tasks,
        TaskKey::GenerateLibrelane,
        {
            save(
                out_yaml(work_dir, "config"),
                &librelane::generate_config(config, sram, slot, fit, DEFAULT_HALO_UM)?,
            )?;
            save(
                out_tcl(work_dir, "pdn_cfg"),
                &librelane::generate_pdn(config, sram, slot, fit, DEFAULT_HALO_UM)?,
            )?;
            save(
                out_sdc(work_dir, &format!("{name}_top")),
                &librelane::generate_sdc(config, sram, fit)?,
            )?;
            save(
                work_dir.join("Makefile"),
                &librelane::generate_makefile(config)?,
            )?;
        },
        ctx
    );

    try_execute_task!(
        tasks,
        TaskKey::GenerateTestbench,
        {
            let tb_dir = work_dir.join("cocotb");
            save(
                out_python(&tb_dir, "test_sram"),
                &testbench::generate_cocotb_test(config, sram, fit)?,
            )?;
            save(
                tb_dir.join("Makefile"),
                &testbench::generate_sim_makefile(config, sram, fit)?,
            )?;
            save(
                out_python(&tb_dir, "sram_model"),
                &testbench::generate_sram_model(config, sram, fit)?,
            )?;
        },
        ctx
    );

    try_execute_task!(
        tasks,
        TaskKey::GenerateDocs,
        {
            let docs_dir = work_dir.join("docs");
            save(
                out_markdown(&docs_dir, "README"),
                &docs::generate_readme(config, sram, fit)?,
            )?;
            save(
                out_markdown(&docs_dir, "datasheet"),
                &docs::generate_datasheet(config, sram, fit)?,
            )?;
            save(
                out_markdown(&docs_dir, "memory_map"),
                &docs::generate_memory_map(config, sram, fit)?,
            )?;
        },
        ctx
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::Path;

    use super::*;
    use crate::config::tests::test_config;
    use crate::config::MacroCount;

    fn data_dir() -> &'static Path {
        Path::new(crate::DATA_PATH)
    }

    #[test]
    fn plan_resolves_catalog_names() {
        let plan = generate_plan(test_config(), data_dir()).unwrap();
        assert_eq!(plan.fit.count, 48);
        assert_eq!(plan.sram.size, 512);
    }

    #[test]
    fn plan_applies_explicit_count() {
        let mut config = test_config();
        config.memory.count = MacroCount::Explicit(16);

        let plan = generate_plan(config, data_dir()).unwrap();
        assert_eq!(plan.fit.count, 16);
        assert_eq!(plan.fit.total_words, 16 * 512);
        assert_eq!(plan.fit.address_bits, 13);
    }

    #[test]
    fn plan_rejects_oversized_count() {
        let mut config = test_config();
        config.memory.count = MacroCount::Explicit(1000);
        assert!(generate_plan(config, data_dir()).is_err());
    }

    #[test]
    fn plan_rejects_unknown_names() {
        let mut config = test_config();
        config.slot = "9x9".to_string();
        assert!(generate_plan(config, data_dir()).is_err());

        let mut config = test_config();
        config.memory.macro_name = "nonexistent".to_string();
        assert!(generate_plan(config, data_dir()).is_err());
    }

    #[test]
    fn execute_plan_writes_all_artifacts() {
        let plan = generate_plan(test_config(), data_dir()).unwrap();
        let work_dir = tempfile::tempdir().unwrap();

        execute_plan(ExecutePlanParams {
            work_dir: work_dir.path(),
            plan: &plan,
            tasks: &HashSet::new(),
            ctx: None,
        })
        .unwrap();

        for file in [
            "src/ram_chip_sram_array.sv",
            "src/ram_chip_core.sv",
            "src/ram_chip_top.sv",
            "config.yaml",
            "pdn_cfg.tcl",
            "ram_chip_top.sdc",
            "Makefile",
            "cocotb/test_sram.py",
            "cocotb/Makefile",
            "cocotb/sram_model.py",
            "docs/README.md",
            "docs/datasheet.md",
            "docs/memory_map.md",
        ] {
            assert!(work_dir.path().join(file).exists(), "missing {file}");
        }
    }

    #[test]
    fn execute_plan_respects_task_filter() {
        let plan = generate_plan(test_config(), data_dir()).unwrap();
        let work_dir = tempfile::tempdir().unwrap();

        let tasks = HashSet::from([TaskKey::GenerateDocs]);
        execute_plan(ExecutePlanParams {
            work_dir: work_dir.path(),
            plan: &plan,
            tasks: &tasks,
            ctx: None,
        })
        .unwrap();

        assert!(work_dir.path().join("docs/README.md").exists());
        assert!(!work_dir.path().join("config.yaml").exists());
    }
}

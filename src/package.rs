//! Asset package staging.
//!
//! A package is a self-contained directory tree with the generated sources,
//! LibreLane configuration, testbench, documentation, and a manifest listing
//! the contents. Archiving the tree is left to the surrounding CI.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::bail;
use log::info;
use tera::Context;

use crate::plan::{execute_plan, DesignPlan, ExecutePlanParams};
use crate::{Result, TEMPLATES};

/// Files a package is expected to contain, relative to its root. The chip
/// name is substituted for `{name}`.
const PACKAGE_FILES: &[&str] = &[
    "src/{name}_sram_array.sv",
    "src/{name}_core.sv",
    "src/{name}_top.sv",
    "config.yaml",
    "pdn_cfg.tcl",
    "{name}_top.sdc",
    "Makefile",
    "cocotb/test_sram.py",
    "cocotb/Makefile",
    "cocotb/sram_model.py",
    "docs/README.md",
    "docs/datasheet.md",
    "docs/memory_map.md",
];

fn package_files(chip_name: &str) -> Vec<String> {
    PACKAGE_FILES
        .iter()
        .map(|f| f.replace("{name}", chip_name))
        .collect()
}

/// Render the package manifest.
pub fn generate_manifest(plan: &DesignPlan, package_name: &str) -> Result<String> {
    let mut ctx = Context::new();
    ctx.insert("package_name", package_name);
    ctx.insert("chip", &plan.config.chip);
    ctx.insert("config", &plan.config);
    ctx.insert("macro_name", &plan.config.memory.macro_name);
    ctx.insert("fit", &plan.fit);
    ctx.insert("data_width", &plan.sram.width);
    ctx.insert("total_bytes", &plan.fit.total_bytes());
    ctx.insert("files", &package_files(&plan.config.chip.name));
    Ok(TEMPLATES.render("package/manifest.toml", &ctx)?)
}

/// Stage a complete asset package under `output_dir/package_name`.
///
/// Returns the package root. Fails rather than overwriting an existing
/// package directory.
pub fn create_package(
    plan: &DesignPlan,
    package_name: &str,
    output_dir: impl AsRef<Path>,
) -> Result<PathBuf> {
    let package_dir = output_dir.as_ref().join(package_name);
    if package_dir.exists() {
        bail!("package directory already exists: {}", package_dir.display());
    }
    std::fs::create_dir_all(&package_dir)?;

    execute_plan(ExecutePlanParams {
        work_dir: &package_dir,
        plan,
        tasks: &HashSet::new(),
        ctx: None,
    })?;

    let manifest = generate_manifest(plan, package_name)?;
    std::fs::write(package_dir.join("manifest.toml"), manifest)?;

    info!("staged package at {}", package_dir.display());
    Ok(package_dir)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::config::tests::test_config;
    use crate::plan::generate_plan;

    #[test]
    fn manifest_lists_contents() {
        let plan = generate_plan(test_config(), Path::new(crate::DATA_PATH)).unwrap();
        let manifest = generate_manifest(&plan, "ram_chip_1x1").unwrap();
        assert!(manifest.contains("ram_chip_1x1"));
        assert!(manifest.contains("src/ram_chip_top.sv"));
        assert!(manifest.contains(&plan.fit.total_words.to_string()));

        // The manifest itself must parse as TOML.
        let parsed: toml::Value = toml::from_str(&manifest).unwrap();
        assert_eq!(
            parsed["package"]["name"].as_str(),
            Some("ram_chip_1x1")
        );
    }

    #[test]
    fn package_stages_full_tree() {
        let plan = generate_plan(test_config(), Path::new(crate::DATA_PATH)).unwrap();
        let out = tempfile::tempdir().unwrap();

        let package_dir = create_package(&plan, "ram_chip_1x1", out.path()).unwrap();
        assert!(package_dir.join("manifest.toml").exists());
        for file in package_files("ram_chip") {
            assert!(package_dir.join(&file).exists(), "missing {file}");
        }

        // A second package with the same name must not clobber the first.
        assert!(create_package(&plan, "ram_chip_1x1", out.path()).is_err());
    }
}

//! LibreLane physical-design configuration generation.
//!
//! Produces the flow `config.yaml`, PDN TCL, SDC constraints, and the root
//! Makefile for a generated chip, including deterministic macro placement
//! coordinates derived from the fit result.

use itertools::iproduct;
use serde::{Deserialize, Serialize};
use tera::Context;

use crate::catalog::{SlotSpec, SramSpec};
use crate::config::ChipConfig;
use crate::fit::FitResult;
use crate::{Result, TEMPLATES};

/// One placed macro instance, in die coordinates (microns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub orientation: String,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Generate macro placement coordinates, centered in the core area.
///
/// The array is centered so the slack splits evenly left/right and
/// top/bottom. Cell pitch is the macro footprint plus halo on both sides;
/// instances are named `sram_{i}` in row-major order. Only `fit.count`
/// instances are emitted, so a resized fit leaves the tail of the physical
/// grid empty.
pub fn generate_placements(
    sram: &SramSpec,
    slot: &SlotSpec,
    fit: &FitResult,
    halo_um: f64,
) -> Vec<Placement> {
    let sram_w = sram.dimensions_um.width;
    let sram_h = sram.dimensions_um.height;

    let cell_w = sram_w + 2.0 * halo_um;
    let cell_h = sram_h + 2.0 * halo_um;

    let array_width = fit.cols as f64 * cell_w;
    let array_height = fit.rows as f64 * cell_h;

    let margin_x = (slot.core_width() - array_width) / 2.0;
    let margin_y = (slot.core_height() - array_height) / 2.0;

    let base_x = slot.core.inset.left + margin_x + halo_um;
    let base_y = slot.core.inset.bottom + margin_y + halo_um;

    iproduct!(0..fit.rows, 0..fit.cols)
        .take(fit.count)
        .enumerate()
        .map(|(idx, (row, col))| Placement {
            name: format!("sram_{idx}"),
            x: round2(base_x + col as f64 * cell_w),
            y: round2(base_y + row as f64 * cell_h),
            orientation: "N".to_string(),
        })
        .collect()
}

/// Target global-placement density for a given macro utilization.
///
/// High macro occupancy leaves few standard cells in the remaining area;
/// the placer's target density must then sit close to the actual
/// utilization or its penalty term overflows (GPL-0305).
pub fn placement_density_pct(macro_utilization: f64) -> u32 {
    if macro_utilization > 0.80 {
        2
    } else if macro_utilization > 0.70 {
        5
    } else if macro_utilization > 0.50 {
        10
    } else if macro_utilization > 0.30 {
        15
    } else {
        20
    }
}

/// Slot name as a preprocessor define, e.g. "1x1" -> "1X1", "0.5x1" ->
/// "0P5X1".
pub fn slot_define(slot_name: &str) -> String {
    slot_name.to_uppercase().replace('.', "P")
}

fn base_context(
    config: &ChipConfig,
    sram: &SramSpec,
    fit: &FitResult,
) -> Result<Context> {
    let mut ctx = Context::new();
    ctx.insert("chip", &config.chip);
    ctx.insert("config", config);
    ctx.insert("sram", sram);
    ctx.insert("fit", fit);
    ctx.insert("macro_name", &config.memory.macro_name);
    ctx.insert("clock_period_ns", &config.clock.period_ns());
    Ok(ctx)
}

/// Generate the LibreLane flow `config.yaml`.
pub fn generate_config(
    config: &ChipConfig,
    sram: &SramSpec,
    slot: &SlotSpec,
    fit: &FitResult,
    halo_um: f64,
) -> Result<String> {
    let (die_area, core_area) = slot.to_librelane_areas();

    let mut ctx = base_context(config, sram, fit)?;
    ctx.insert("slot", slot);
    ctx.insert("die_area", &die_area);
    ctx.insert("core_area", &core_area);
    ctx.insert("placements", &generate_placements(sram, slot, fit, halo_um));
    ctx.insert("slot_define", &slot_define(&config.slot));
    ctx.insert(
        "placement_density_pct",
        &placement_density_pct(fit.utilization),
    );

    Ok(TEMPLATES.render("librelane/config.yaml", &ctx)?)
}

/// Generate the power-distribution-network TCL.
pub fn generate_pdn(
    config: &ChipConfig,
    sram: &SramSpec,
    slot: &SlotSpec,
    fit: &FitResult,
    halo_um: f64,
) -> Result<String> {
    let mut ctx = base_context(config, sram, fit)?;
    ctx.insert("placements", &generate_placements(sram, slot, fit, halo_um));

    Ok(TEMPLATES.render("librelane/pdn_cfg.tcl", &ctx)?)
}

/// Generate the timing-constraints SDC.
pub fn generate_sdc(config: &ChipConfig, sram: &SramSpec, fit: &FitResult) -> Result<String> {
    let ctx = base_context(config, sram, fit)?;
    Ok(TEMPLATES.render("librelane/chip_top.sdc", &ctx)?)
}

/// Generate the root Makefile with the slot baked in.
pub fn generate_makefile(config: &ChipConfig) -> Result<String> {
    let mut ctx = Context::new();
    ctx.insert("slot", &config.slot);
    ctx.insert("chip_name", &config.chip.name);
    Ok(TEMPLATES.render("librelane/Makefile", &ctx)?)
}

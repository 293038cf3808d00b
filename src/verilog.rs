//! SystemVerilog generation for the SRAM array, chip core, and chip top.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tera::{Context, Value};

use crate::catalog::{Pins, SramSpec};
use crate::config::{ChipConfig, OutputRouting};
use crate::fit::FitResult;
use crate::{clog2, Result, TEMPLATES};

/// Tera filter: minimal bit width that can represent `value` distinct
/// choices; never less than 1.
pub fn bits_for_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let n = value
        .as_u64()
        .ok_or_else(|| tera::Error::msg("bits_for expects an integer"))?;
    Ok(Value::from(bits_for(n as usize) as u64))
}

/// Tera filter: hex digits needed for a given bit width.
pub fn hex_width_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let bits = value
        .as_u64()
        .ok_or_else(|| tera::Error::msg("hex_width expects an integer"))?;
    Ok(Value::from((bits + 3) / 4))
}

/// Tera filter: format an address as `0x`-prefixed hex, zero-padded to the
/// `width` argument (in hex digits, default 4).
pub fn hex_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let n = value
        .as_u64()
        .ok_or_else(|| tera::Error::msg("hex expects an integer"))?;
    let width = args.get("width").and_then(Value::as_u64).unwrap_or(4) as usize;
    Ok(Value::from(format!("0x{n:0width$X}")))
}

pub fn bits_for(value: usize) -> usize {
    if value <= 1 {
        1
    } else {
        clog2(value)
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct SramArrayParams {
    pub module_name: String,
    pub macro_name: String,
    pub sram_count: usize,
    pub data_width: usize,
    pub addr_bits: usize,
    pub sram_addr_bits: usize,
    pub select_bits: usize,
    pub output_routing: OutputRouting,
    pub write_mask: bool,
    pub pins: Pins,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ChipModuleParams {
    pub module_name: String,
    pub chip_name: String,
    pub data_width: usize,
    pub addr_bits: usize,
    pub write_mask: bool,
    pub registered_output: bool,
}

fn array_params(config: &ChipConfig, sram: &SramSpec, fit: &FitResult) -> SramArrayParams {
    let bus = &config.interface.unified_bus;
    SramArrayParams {
        module_name: format!("{}_sram_array", config.chip.name),
        macro_name: config.memory.macro_name.clone(),
        sram_count: fit.count,
        data_width: sram.width,
        addr_bits: fit.address_bits,
        sram_addr_bits: sram.abits,
        select_bits: bits_for(fit.count),
        output_routing: bus.output_routing,
        write_mask: bus.write_mask,
        pins: sram.ports[0].pins.clone(),
    }
}

fn chip_params(config: &ChipConfig, sram: &SramSpec, fit: &FitResult, suffix: &str) -> ChipModuleParams {
    ChipModuleParams {
        module_name: format!("{}_{suffix}", config.chip.name),
        chip_name: config.chip.name.clone(),
        data_width: sram.width,
        addr_bits: fit.address_bits,
        write_mask: config.interface.unified_bus.write_mask,
        registered_output: config.interface.unified_bus.registered_output,
    }
}

/// Generate the SRAM array module: the decoded bank of macro instances
/// behind a unified bus.
pub fn generate_sram_array(
    config: &ChipConfig,
    sram: &SramSpec,
    fit: &FitResult,
) -> Result<String> {
    assert!(fit.count > 0, "cannot generate an array of zero macros");

    let params = array_params(config, sram, fit);
    Ok(TEMPLATES.render("verilog/sram_array.sv", &Context::from_serialize(params)?)?)
}

/// Generate the chip core module wrapping the SRAM array.
pub fn generate_chip_core(
    config: &ChipConfig,
    sram: &SramSpec,
    fit: &FitResult,
) -> Result<String> {
    let params = chip_params(config, sram, fit, "core");
    Ok(TEMPLATES.render("verilog/chip_core.sv", &Context::from_serialize(params)?)?)
}

/// Generate the chip top module with IO pads.
pub fn generate_chip_top(config: &ChipConfig, sram: &SramSpec, fit: &FitResult) -> Result<String> {
    let params = chip_params(config, sram, fit, "top");
    Ok(TEMPLATES.render("verilog/chip_top.sv", &Context::from_serialize(params)?)?)
}

pub fn save_verilog(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    crate::paths::save(path, contents)
}

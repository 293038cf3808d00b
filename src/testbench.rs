//! Cocotb testbench generation: the test module, its Makefile, and a Python
//! behavioral model of the SRAM macro for simulation without the vendor
//! netlist.

use tera::Context;

use crate::catalog::SramSpec;
use crate::config::ChipConfig;
use crate::fit::FitResult;
use crate::{Result, TEMPLATES};

fn tb_context(config: &ChipConfig, sram: &SramSpec, fit: &FitResult) -> Context {
    let mut ctx = Context::new();
    ctx.insert("chip", &config.chip);
    ctx.insert("config", config);
    ctx.insert("sram", sram);
    ctx.insert("fit", fit);
    ctx.insert("data_width", &sram.width);
    ctx.insert("addr_bits", &fit.address_bits);
    ctx.insert("total_words", &fit.total_words);
    ctx.insert("macro_name", &config.memory.macro_name);
    ctx.insert("write_mask", &config.interface.unified_bus.write_mask);
    ctx.insert("clock_period_ns", &config.clock.period_ns());
    ctx
}

pub fn generate_cocotb_test(
    config: &ChipConfig,
    sram: &SramSpec,
    fit: &FitResult,
) -> Result<String> {
    let ctx = tb_context(config, sram, fit);
    Ok(TEMPLATES.render("testbench/test_sram.py", &ctx)?)
}

pub fn generate_sim_makefile(
    config: &ChipConfig,
    sram: &SramSpec,
    fit: &FitResult,
) -> Result<String> {
    let ctx = tb_context(config, sram, fit);
    Ok(TEMPLATES.render("testbench/Makefile", &ctx)?)
}

pub fn generate_sram_model(
    config: &ChipConfig,
    sram: &SramSpec,
    fit: &FitResult,
) -> Result<String> {
    let ctx = tb_context(config, sram, fit);
    Ok(TEMPLATES.render("testbench/sram_model.py", &ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{test_slot, test_sram};
    use crate::config::tests::test_config;
    use crate::fit::calculate_fit;

    #[test]
    fn cocotb_test_targets_the_top_module() {
        let config = test_config();
        let sram = test_sram();
        let fit = calculate_fit(&test_slot(), &sram, 10.0, None);

        let test = generate_cocotb_test(&config, &sram, &fit).unwrap();
        assert!(test.contains("cocotb"));
        assert!(test.contains(&fit.total_words.to_string()));

        let makefile = generate_sim_makefile(&config, &sram, &fit).unwrap();
        assert!(makefile.contains("ram_chip_top"));

        let model = generate_sram_model(&config, &sram, &fit).unwrap();
        assert!(model.contains(&sram.size.to_string()));
    }
}

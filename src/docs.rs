//! Markdown documentation generation: README, datasheet, memory map.

use serde::{Deserialize, Serialize};
use tera::Context;

use crate::catalog::SramSpec;
use crate::config::ChipConfig;
use crate::fit::FitResult;
use crate::{Result, TEMPLATES};

/// One macro's address range in the unified memory map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRegion {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub size: usize,
}

/// Per-macro address regions, in instance order.
pub fn memory_regions(sram: &SramSpec, fit: &FitResult) -> Vec<MemoryRegion> {
    (0..fit.count)
        .map(|i| MemoryRegion {
            index: i,
            start: i * sram.size,
            end: (i + 1) * sram.size - 1,
            size: sram.size,
        })
        .collect()
}

fn doc_context(config: &ChipConfig, sram: &SramSpec, fit: &FitResult) -> Context {
    let mut ctx = Context::new();
    ctx.insert("chip", &config.chip);
    ctx.insert("config", config);
    ctx.insert("sram", sram);
    ctx.insert("fit", fit);
    ctx.insert("macro_name", &config.memory.macro_name);
    ctx.insert("data_width", &sram.width);
    ctx.insert("addr_bits", &fit.address_bits);
    ctx.insert("sram_count", &fit.count);
    ctx.insert("total_words", &fit.total_words);
    ctx.insert("total_bits", &fit.total_bits);
    ctx.insert("total_bytes", &fit.total_bytes());
    ctx.insert("write_mask", &config.interface.unified_bus.write_mask);
    ctx
}

pub fn generate_readme(config: &ChipConfig, sram: &SramSpec, fit: &FitResult) -> Result<String> {
    let ctx = doc_context(config, sram, fit);
    Ok(TEMPLATES.render("docs/README.md", &ctx)?)
}

pub fn generate_datasheet(
    config: &ChipConfig,
    sram: &SramSpec,
    fit: &FitResult,
) -> Result<String> {
    let ctx = doc_context(config, sram, fit);
    Ok(TEMPLATES.render("docs/datasheet.md", &ctx)?)
}

pub fn generate_memory_map(
    config: &ChipConfig,
    sram: &SramSpec,
    fit: &FitResult,
) -> Result<String> {
    let mut ctx = doc_context(config, sram, fit);
    ctx.insert("regions", &memory_regions(sram, fit));
    Ok(TEMPLATES.render("docs/memory_map.md", &ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{test_slot, test_sram};
    use crate::config::tests::test_config;
    use crate::fit::calculate_fit;

    #[test]
    fn regions_tile_the_address_space() {
        let sram = test_sram();
        let fit = calculate_fit(&test_slot(), &sram, 10.0, None);

        let regions = memory_regions(&sram, &fit);
        assert_eq!(regions.len(), fit.count);
        assert_eq!(regions[0].start, 0);
        assert_eq!(regions[0].end, 511);
        for pair in regions.windows(2) {
            assert_eq!(pair[1].start, pair[0].end + 1);
        }
        assert_eq!(regions.last().unwrap().end, fit.total_words - 1);
    }

    #[test]
    fn readme_mentions_capacity() {
        let config = test_config();
        let sram = test_sram();
        let fit = calculate_fit(&test_slot(), &sram, 10.0, None);

        let readme = generate_readme(&config, &sram, &fit).unwrap();
        assert!(readme.contains("ram_chip"));
        assert!(readme.contains(&fit.total_bytes().to_string()));
    }

    #[test]
    fn datasheet_and_memory_map_render() {
        let config = test_config();
        let sram = test_sram();
        let fit = calculate_fit(&test_slot(), &sram, 10.0, None);

        let datasheet = generate_datasheet(&config, &sram, &fit).unwrap();
        assert!(datasheet.contains(&fit.count.to_string()));

        let map = generate_memory_map(&config, &sram, &fit).unwrap();
        assert!(map.contains("sram_0"));
        assert!(map.contains("0x0000"));
    }
}

pub use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use tera::Tera;

pub mod catalog;
pub mod cli;
pub mod config;
pub mod docs;
pub mod fit;
pub mod librelane;
pub mod package;
pub mod paths;
pub mod plan;
pub mod status;
pub mod testbench;
pub mod verilog;

pub const DATA_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

lazy_static! {
    pub static ref TEMPLATES: Tera =
        match Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*")) {
            Ok(mut t) => {
                t.register_filter("bits_for", crate::verilog::bits_for_filter);
                t.register_filter("hex_width", crate::verilog::hex_width_filter);
                t.register_filter("hex", crate::verilog::hex_filter);
                t
            }
            Err(e) => panic!("Error parsing templates: {e}"),
        };
}

pub fn bus_bit(name: &str, index: usize) -> String {
    format!("{name}[{index}]")
}

/// Ceiling log base 2; the minimal bit width that addresses `x` entries.
#[inline]
pub(crate) fn clog2(x: usize) -> usize {
    (x as f64).log2().ceil() as usize
}

#[cfg(test)]
pub mod tests {
    use super::clog2;

    #[test]
    fn test_clog2() {
        assert_eq!(clog2(1), 0);
        assert_eq!(clog2(2), 1);
        assert_eq!(clog2(500), 9);
        assert_eq!(clog2(512), 9);
        assert_eq!(clog2(513), 10);
    }
}

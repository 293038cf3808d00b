//! SRAM macro specification records.

use serde::{Deserialize, Serialize};

use super::CatalogError;

/// Where an SRAM macro comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SramSource {
    Pdk,
    Openram,
    Custom,
}

/// Physical dimensions in microns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

/// Pin mapping for one SRAM port. Optional pins are absent on ports that do
/// not carry the corresponding signal (e.g. `din` on a read-only port).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pins {
    pub clk: String,
    #[serde(default)]
    pub en_n: Option<String>,
    #[serde(default)]
    pub we_n: Option<String>,
    #[serde(default)]
    pub wem_n: Option<String>,
    #[serde(default)]
    pub addr: Option<String>,
    #[serde(default)]
    pub din: Option<String>,
    #[serde(default)]
    pub dout: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    Ro,
    Wo,
    Rw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockPolarity {
    Rising,
    Falling,
}

/// One port of an SRAM macro.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    #[serde(rename = "type")]
    pub port_type: PortType,
    pub clk_enable: bool,
    pub clk_polarity: ClockPolarity,
    pub pins: Pins,
}

impl Port {
    /// Whether this port has per-bit write mask capability.
    pub fn has_write_mask(&self) -> bool {
        self.pins.wem_n.is_some()
    }
}

/// Setup or hold times in nanoseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupHold {
    pub addr: f64,
    #[serde(default)]
    pub din: Option<f64>,
    #[serde(default)]
    pub en: Option<f64>,
}

/// Timing parameters in nanoseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub min_cycle: f64,
    pub clk_to_q: f64,
    pub setup: SetupHold,
    pub hold: SetupHold,
}

/// File paths for the macro's physical views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Files {
    pub gds: String,
    pub lef: String,
    #[serde(default)]
    pub lib: Option<String>,
    #[serde(default)]
    pub verilog: Option<String>,
}

/// Complete SRAM macro specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SramSpec {
    pub source: SramSource,
    /// Number of words.
    pub size: usize,
    /// Bits per word.
    pub width: usize,
    /// Address bus width of a single macro.
    pub abits: usize,
    pub dimensions_um: Dimensions,
    pub ports: Vec<Port>,
    #[serde(default)]
    pub timing_ns: Option<Timing>,
    #[serde(default)]
    pub files: Option<Files>,
}

impl SramSpec {
    /// Total storage capacity in bits.
    pub fn total_bits(&self) -> usize {
        self.size * self.width
    }

    /// Footprint area in square microns.
    pub fn area_um2(&self) -> f64 {
        self.dimensions_um.width * self.dimensions_um.height
    }

    pub(super) fn validate(&self, name: &str) -> Result<(), CatalogError> {
        let fail = |reason: String| CatalogError::Invalid {
            name: name.to_string(),
            reason,
        };
        if self.size == 0 {
            return Err(fail("word count must be positive".to_string()));
        }
        if self.width == 0 {
            return Err(fail("word width must be positive".to_string()));
        }
        if self.abits == 0 {
            return Err(fail("address width must be positive".to_string()));
        }
        if self.dimensions_um.width <= 0.0 || self.dimensions_um.height <= 0.0 {
            return Err(fail(format!(
                "dimensions must be positive, got {}x{}",
                self.dimensions_um.width, self.dimensions_um.height
            )));
        }
        if self.ports.is_empty() {
            return Err(fail("at least one port is required".to_string()));
        }
        Ok(())
    }
}

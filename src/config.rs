//! Per-chip configuration.
//!
//! A chip config picks a slot and an SRAM macro out of the catalog and
//! describes how the memory array is exposed to the outside world. Parsed
//! from a TOML file; cross-checks against the catalog happen in
//! [`crate::plan::generate_plan`], not here.

use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Basic chip identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Requested number of macro instances: automatic (as many as fit) or an
/// explicit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroCount {
    Auto,
    Explicit(usize),
}

impl Default for MacroCount {
    fn default() -> Self {
        MacroCount::Auto
    }
}

impl Serialize for MacroCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MacroCount::Auto => serializer.serialize_str("auto"),
            MacroCount::Explicit(n) => serializer.serialize_u64(*n as u64),
        }
    }
}

impl<'de> Deserialize<'de> for MacroCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(usize),
            Keyword(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Count(n) => Ok(MacroCount::Explicit(n)),
            Raw::Keyword(s) if s == "auto" => Ok(MacroCount::Auto),
            Raw::Keyword(s) => Err(D::Error::custom(format!(
                "count must be 'auto' or an integer, got '{s}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrangementPrefer {
    Rows,
    Columns,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    N,
    E,
    S,
    W,
    #[serde(rename = "mixed")]
    Mixed,
}

/// SRAM arrangement preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrangement {
    #[serde(default = "Arrangement::default_prefer")]
    pub prefer: ArrangementPrefer,
    #[serde(default = "Arrangement::default_orientation")]
    pub orientation: Orientation,
}

impl Arrangement {
    fn default_prefer() -> ArrangementPrefer {
        ArrangementPrefer::Rows
    }

    fn default_orientation() -> Orientation {
        Orientation::Mixed
    }
}

impl Default for Arrangement {
    fn default() -> Self {
        Arrangement {
            prefer: Self::default_prefer(),
            orientation: Self::default_orientation(),
        }
    }
}

/// SRAM array configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    /// SRAM macro name from the catalog.
    #[serde(rename = "macro")]
    pub macro_name: String,
    #[serde(default)]
    pub count: MacroCount,
    #[serde(default)]
    pub arrangement: Arrangement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputRouting {
    Mux,
    Tristate,
    TristateRegistered,
}

/// Unified bus interface configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedBus {
    #[serde(default = "UnifiedBus::default_data_width")]
    pub data_width: usize,
    #[serde(default)]
    pub registered_output: bool,
    #[serde(default = "UnifiedBus::default_output_routing")]
    pub output_routing: OutputRouting,
    /// Expose per-bit write mask pins.
    #[serde(default)]
    pub write_mask: bool,
}

impl UnifiedBus {
    fn default_data_width() -> usize {
        8
    }

    fn default_output_routing() -> OutputRouting {
        OutputRouting::Mux
    }
}

impl Default for UnifiedBus {
    fn default() -> Self {
        UnifiedBus {
            data_width: Self::default_data_width(),
            registered_output: false,
            output_routing: Self::default_output_routing(),
            write_mask: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceScheme {
    UnifiedBus,
    Banked,
    MultiPort,
}

/// External interface configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    #[serde(default = "Interface::default_scheme")]
    pub scheme: InterfaceScheme,
    #[serde(default)]
    pub unified_bus: UnifiedBus,
}

impl Interface {
    fn default_scheme() -> InterfaceScheme {
        InterfaceScheme::UnifiedBus
    }
}

impl Default for Interface {
    fn default() -> Self {
        Interface {
            scheme: Self::default_scheme(),
            unified_bus: UnifiedBus::default(),
        }
    }
}

/// Optional feature flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    #[serde(default)]
    pub parity: bool,
    #[serde(default)]
    pub ecc: bool,
    #[serde(default)]
    pub bist: bool,
}

/// Clock configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    #[serde(default = "Clock::default_frequency")]
    pub frequency_mhz: f64,
}

impl Clock {
    fn default_frequency() -> f64 {
        25.0
    }

    /// Clock period in nanoseconds.
    pub fn period_ns(&self) -> f64 {
        1000.0 / self.frequency_mhz
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock {
            frequency_mhz: Self::default_frequency(),
        }
    }
}

/// Power configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Power {
    #[serde(default = "Power::default_voltage")]
    pub core_voltage: f64,
}

impl Power {
    fn default_voltage() -> f64 {
        5.0
    }
}

impl Default for Power {
    fn default() -> Self {
        Power {
            core_voltage: Self::default_voltage(),
        }
    }
}

/// Complete chip configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChipConfig {
    /// Target slot name from the catalog.
    pub slot: String,
    pub chip: ChipInfo,
    pub memory: Memory,
    #[serde(default)]
    pub interface: Interface,
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub clock: Clock,
    #[serde(default)]
    pub power: Power,
}

pub fn parse_chip_config(path: impl AsRef<Path>) -> Result<ChipConfig> {
    let contents = fs::read_to_string(path)?;
    let config = toml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub fn test_config() -> ChipConfig {
        ChipConfig {
            chip: ChipInfo {
                name: "ram_chip".to_string(),
                description: Some("48-macro SRAM array".to_string()),
            },
            slot: "1x1".to_string(),
            memory: Memory {
                macro_name: "gf180mcu_fd_ip_sram__sram512x8m8wm1".to_string(),
                count: MacroCount::Auto,
                arrangement: Arrangement::default(),
            },
            interface: Interface::default(),
            features: Features::default(),
            clock: Clock::default(),
            power: Power::default(),
        }
    }

    #[test]
    fn parse_minimal_config() {
        let toml_src = r#"
            slot = "1x1"

            [chip]
            name = "ram_chip"

            [memory]
            macro = "gf180mcu_fd_ip_sram__sram512x8m8wm1"
        "#;
        let config: ChipConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.chip.name, "ram_chip");
        assert_eq!(config.memory.count, MacroCount::Auto);
        assert_eq!(config.interface.scheme, InterfaceScheme::UnifiedBus);
        assert_eq!(config.interface.unified_bus.data_width, 8);
        assert_eq!(config.clock.frequency_mhz, 25.0);
    }

    #[test]
    fn parse_explicit_count() {
        let toml_src = r#"
            slot = "1x1"

            [chip]
            name = "ram_chip"

            [memory]
            macro = "gf180mcu_fd_ip_sram__sram512x8m8wm1"
            count = 16
        "#;
        let config: ChipConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.memory.count, MacroCount::Explicit(16));
    }

    #[test]
    fn reject_bad_count_keyword() {
        let toml_src = r#"
            slot = "1x1"

            [chip]
            name = "ram_chip"

            [memory]
            macro = "m"
            count = "all"
        "#;
        assert!(toml::from_str::<ChipConfig>(toml_src).is_err());
    }

    #[test]
    fn clock_period() {
        let clock = Clock {
            frequency_mhz: 25.0,
        };
        assert_eq!(clock.period_ns(), 40.0);
    }

    #[test]
    fn config_round_trip() {
        let config = test_config();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: ChipConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed, config);
    }
}

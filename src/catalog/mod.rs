//! SRAM and slot catalog.
//!
//! The catalog is a pair of TOML databases (`srams.toml`, `slots.toml`)
//! mapping names to specification records. Positivity constraints are
//! enforced here, at load time, so the fit calculator never needs to
//! validate its inputs.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

mod slot;
mod sram;

pub use slot::{Core, Die, Inset, IoBudget, SlotSpec};
pub use sram::{
    ClockPolarity, Dimensions, Files, Pins, Port, PortType, SetupHold, SramSource, SramSpec,
    Timing,
};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid spec '{name}': {reason}")]
    Invalid { name: String, reason: String },
}

#[derive(Deserialize)]
struct SramDb {
    #[serde(default)]
    srams: BTreeMap<String, SramSpec>,
}

#[derive(Deserialize)]
struct SlotDb {
    #[serde(default)]
    slots: BTreeMap<String, SlotSpec>,
}

fn read_db(path: &Path) -> Result<String, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::NotFound(path.display().to_string()));
    }
    Ok(fs::read_to_string(path)?)
}

/// Load SRAM specifications from a `srams.toml` database.
pub fn load_srams(path: impl AsRef<Path>) -> Result<BTreeMap<String, SramSpec>, CatalogError> {
    let contents = read_db(path.as_ref())?;
    let db: SramDb = toml::from_str(&contents)?;
    for (name, spec) in &db.srams {
        spec.validate(name)?;
    }
    Ok(db.srams)
}

/// Load slot specifications from a `slots.toml` database.
pub fn load_slots(path: impl AsRef<Path>) -> Result<BTreeMap<String, SlotSpec>, CatalogError> {
    let contents = read_db(path.as_ref())?;
    let db: SlotDb = toml::from_str(&contents)?;
    for (name, spec) in &db.slots {
        spec.validate(name)?;
    }
    Ok(db.slots)
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// GF180MCU 512x8 single-port SRAM macro, as shipped in the bundled
    /// catalog.
    pub fn test_sram() -> SramSpec {
        SramSpec {
            source: SramSource::Pdk,
            size: 512,
            width: 8,
            abits: 9,
            dimensions_um: Dimensions {
                width: 431.86,
                height: 484.88,
            },
            ports: vec![Port {
                name: "port0".to_string(),
                port_type: PortType::Rw,
                clk_enable: true,
                clk_polarity: ClockPolarity::Rising,
                pins: Pins {
                    clk: "CLK".to_string(),
                    en_n: Some("CEN".to_string()),
                    we_n: Some("GWEN".to_string()),
                    wem_n: Some("WEN[7:0]".to_string()),
                    addr: Some("A[8:0]".to_string()),
                    din: Some("D[7:0]".to_string()),
                    dout: Some("Q[7:0]".to_string()),
                },
            }],
            timing_ns: Some(Timing {
                min_cycle: 6.077,
                clk_to_q: 5.008,
                setup: SetupHold {
                    addr: 0.947,
                    din: Some(0.458),
                    en: Some(0.406),
                },
                hold: SetupHold {
                    addr: 0.549,
                    din: Some(0.674),
                    en: None,
                },
            }),
            files: None,
        }
    }

    /// The 1x1 slot: 3932x5122 die with 442um insets all around.
    pub fn test_slot() -> SlotSpec {
        SlotSpec {
            die: Die {
                width: 3932.0,
                height: 5122.0,
            },
            core: Core {
                inset: Inset {
                    left: 442.0,
                    bottom: 442.0,
                    right: 442.0,
                    top: 442.0,
                },
            },
            io_budget: IoBudget {
                dvdd: 8,
                dvss: 10,
                input: 12,
                bidir: 40,
                analog: 2,
            },
            reserved_area_um2: 50_000.0,
        }
    }

    #[test]
    fn core_dimensions() {
        let slot = test_slot();
        assert_eq!(slot.core_width(), 3048.0);
        assert_eq!(slot.core_height(), 4238.0);
        assert_eq!(slot.core_area_um2(), 3048.0 * 4238.0);
    }

    #[test]
    fn librelane_areas() {
        let slot = test_slot();
        let (die_area, core_area) = slot.to_librelane_areas();
        assert_eq!(die_area, [0.0, 0.0, 3932.0, 5122.0]);
        assert_eq!(core_area, [442.0, 442.0, 3490.0, 4680.0]);
    }

    #[test]
    fn io_budget_signal_pins() {
        let slot = test_slot();
        assert_eq!(slot.io_budget.total_signal_pins(), 54);
    }

    #[test]
    fn sram_derived_fields() {
        let sram = test_sram();
        assert_eq!(sram.total_bits(), 4096);
        assert!(sram.ports[0].has_write_mask());
    }

    #[test]
    fn bundled_catalog_loads() {
        let data = std::path::Path::new(crate::DATA_PATH);
        let srams = load_srams(data.join("srams.toml")).expect("srams.toml must load");
        let slots = load_slots(data.join("slots.toml")).expect("slots.toml must load");
        assert!(!srams.is_empty());
        assert!(!slots.is_empty());
        assert!(srams.contains_key("gf180mcu_fd_ip_sram__sram512x8m8wm1"));
        assert!(slots.contains_key("1x1"));
    }

    #[test]
    fn missing_database_is_an_error() {
        let err = load_srams("/nonexistent/srams.toml").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[test]
    fn invalid_sram_rejected() {
        let mut sram = test_sram();
        sram.size = 0;
        let err = sram.validate("bad").unwrap_err();
        assert!(matches!(err, CatalogError::Invalid { .. }));

        let mut sram = test_sram();
        sram.dimensions_um.width = -1.0;
        assert!(sram.validate("bad").is_err());

        let mut sram = test_sram();
        sram.ports.clear();
        assert!(sram.validate("bad").is_err());
    }

    #[test]
    fn invalid_slot_rejected() {
        let mut slot = test_slot();
        slot.die.width = 0.0;
        assert!(slot.validate("bad").is_err());

        let mut slot = test_slot();
        slot.reserved_area_um2 = -1.0;
        assert!(slot.validate("bad").is_err());
    }
}

//! Slot specification records.

use serde::{Deserialize, Serialize};

use super::CatalogError;

/// Die dimensions in microns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Die {
    pub width: f64,
    pub height: f64,
}

/// Inset from die edge to core boundary, in microns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inset {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

/// Core area definition via insets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Core {
    pub inset: Inset,
}

/// Available IO pads by type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoBudget {
    pub dvdd: usize,
    pub dvss: usize,
    pub input: usize,
    pub bidir: usize,
    pub analog: usize,
}

impl IoBudget {
    /// Total signal pins, excluding power.
    pub fn total_signal_pins(&self) -> usize {
        self.input + self.bidir + self.analog
    }
}

/// A physical die/core template a chip design is placed into.
///
/// The type does not require the insets to leave a positive core; the fit
/// calculator treats a degenerate core as a zero-fit, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSpec {
    pub die: Die,
    pub core: Core,
    pub io_budget: IoBudget,
    /// Area that must stay free of macros (logo, chip ID, fixed IP).
    pub reserved_area_um2: f64,
}

impl SlotSpec {
    /// Usable core width in microns.
    pub fn core_width(&self) -> f64 {
        self.die.width - self.core.inset.left - self.core.inset.right
    }

    /// Usable core height in microns.
    pub fn core_height(&self) -> f64 {
        self.die.height - self.core.inset.bottom - self.core.inset.top
    }

    /// Usable core area in square microns.
    pub fn core_area_um2(&self) -> f64 {
        self.core_width() * self.core_height()
    }

    /// Die and core areas as LibreLane `[x_min, y_min, x_max, y_max]` lists.
    pub fn to_librelane_areas(&self) -> ([f64; 4], [f64; 4]) {
        let die_area = [0.0, 0.0, self.die.width, self.die.height];
        let core_area = [
            self.core.inset.left,
            self.core.inset.bottom,
            self.die.width - self.core.inset.right,
            self.die.height - self.core.inset.top,
        ];
        (die_area, core_area)
    }

    pub(super) fn validate(&self, name: &str) -> Result<(), CatalogError> {
        let fail = |reason: String| CatalogError::Invalid {
            name: name.to_string(),
            reason,
        };
        if self.die.width <= 0.0 || self.die.height <= 0.0 {
            return Err(fail(format!(
                "die dimensions must be positive, got {}x{}",
                self.die.width, self.die.height
            )));
        }
        let i = &self.core.inset;
        if i.left < 0.0 || i.bottom < 0.0 || i.right < 0.0 || i.top < 0.0 {
            return Err(fail("core insets must be non-negative".to_string()));
        }
        if self.reserved_area_um2 < 0.0 {
            return Err(fail("reserved area must be non-negative".to_string()));
        }
        Ok(())
    }
}

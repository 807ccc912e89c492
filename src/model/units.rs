//! Physical units an event is expressed in.
//!
//! Units are recorded on the event and travel with it; conversion between
//! unit systems is a generator-side concern and not performed here.

use serde::{Deserialize, Serialize};

/// Momentum unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MomentumUnit {
    #[default]
    Gev,
    Mev,
}

/// Length unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthUnit {
    #[default]
    Mm,
    Cm,
}

/// The unit pair an event's momenta and positions are expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Units {
    pub momentum: MomentumUnit,
    pub length: LengthUnit,
}

impl Units {
    pub fn new(momentum: MomentumUnit, length: LengthUnit) -> Self {
        Self { momentum, length }
    }
}

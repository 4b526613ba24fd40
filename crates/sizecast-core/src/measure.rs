//! Unit-labelled numbers for cost reports.

use serde::Serialize;
use std::fmt;

pub const UNIT_BYTES: &str = "B";
pub const UNIT_SECONDS: &str = "s";
pub const UNIT_CARBON: &str = "kgCO2eq";
pub const UNIT_EUROS: &str = "EUR";
pub const UNIT_SERVERS: &str = "servers";
pub const UNIT_DOCS: &str = "docs";
pub const UNIT_RATIO: &str = "ratio";

/// A numeric report value paired with its unit label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measure {
    pub value: f64,
    pub unit: &'static str,
}

impl Measure {
    pub const fn new(value: f64, unit: &'static str) -> Self {
        Self { value, unit }
    }

    pub fn bytes(value: f64) -> Self {
        Self::new(value, UNIT_BYTES)
    }

    pub fn seconds(value: f64) -> Self {
        Self::new(value, UNIT_SECONDS)
    }

    pub fn carbon(value: f64) -> Self {
        Self::new(value, UNIT_CARBON)
    }

    pub fn euros(value: f64) -> Self {
        Self::new(value, UNIT_EUROS)
    }

    pub fn servers(value: u64) -> Self {
        Self::new(value as f64, UNIT_SERVERS)
    }

    pub fn docs(value: u64) -> Self {
        Self::new(value as f64, UNIT_DOCS)
    }

    pub fn ratio(value: f64) -> Self {
        Self::new(value, UNIT_RATIO)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2e} {}", self.value, self.unit)
    }
}

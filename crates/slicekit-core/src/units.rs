//! Filament diameter utilities
//!
//! Material profiles carry an exact filament diameter (1.75 mm, 2.85 mm)
//! and an approximate one used for matching (2, 3). These helpers parse,
//! compare, round, and format diameters consistently across the crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Nominal filament sizes sold for desktop printers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilamentSize {
    /// 1.75 mm filament
    Mm175,
    /// 2.85 mm filament (often sold as "3 mm")
    Mm285,
}

impl FilamentSize {
    /// Exact diameter in millimeters
    pub fn diameter(self) -> f64 {
        match self {
            Self::Mm175 => 1.75,
            Self::Mm285 => 2.85,
        }
    }

    /// Rounded diameter used for profile matching
    pub fn approximate(self) -> u32 {
        approximate_diameter(self.diameter())
    }
}

impl Default for FilamentSize {
    fn default() -> Self {
        Self::Mm285
    }
}

impl fmt::Display for FilamentSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_diameter(self.diameter()))
    }
}

impl FromStr for FilamentSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = parse_diameter(s)?;
        match approximate_diameter(value) {
            2 => Ok(Self::Mm175),
            3 => Ok(Self::Mm285),
            _ => Err(format!("Unknown filament size: {}", s)),
        }
    }
}

/// Round an exact diameter to the approximate value used for matching
///
/// 1.75 rounds to 2 and 2.85 rounds to 3.
pub fn approximate_diameter(diameter: f64) -> u32 {
    if !diameter.is_finite() || diameter <= 0.0 {
        return 0;
    }
    diameter.round() as u32
}

/// Whether two diameters round to the same approximate value
pub fn diameters_match(a: f64, b: f64) -> bool {
    approximate_diameter(a) == approximate_diameter(b)
}

/// Parse a diameter string in millimeters
///
/// Accepts plain numbers and an optional `mm` suffix ("1.75", "2.85 mm").
pub fn parse_diameter(input: &str) -> Result<f64, String> {
    let input = input.trim();
    let number = input.strip_suffix("mm").unwrap_or(input).trim();
    if number.is_empty() {
        return Err("Empty diameter".to_string());
    }

    let value = number.parse::<f64>().map_err(|e| e.to_string())?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("Diameter must be positive, got {}", input));
    }
    Ok(value)
}

/// Format a diameter for display ("1.75 mm")
pub fn format_diameter(diameter: f64) -> String {
    format!("{:.2} mm", diameter)
}

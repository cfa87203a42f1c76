//! Domain models that mirror the catalog file columns and get passed
//! throughout the TUI. These stay light-weight data holders so the other
//! layers can focus on presentation and file I/O; anything derived (required
//! power, headroom verdicts) lives in `calc` and `selection` instead.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
/// One row of the headphone catalog. Identity is the `(brand, model)` pair;
/// the catalog treats it as unique but does not enforce it.
pub struct Headphone {
    /// Manufacturer name, used to group models in the brand picker.
    pub brand: String,
    /// Model designation shown in the model picker.
    pub model: String,
    /// Nominal impedance in ohms. Assumed purely resistive; nothing
    /// downstream models frequency dependence.
    pub impedance_ohms: f64,
    /// Sensitivity in dB SPL per 1 mW of input power.
    pub sensitivity_db_mw: f64,
}

impl fmt::Display for Headphone {
    /// Write `Brand Model` so the type drops straight into Ratatui widgets
    /// that consume strings implicitly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.brand, self.model)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One row of the amplifier catalog. Identity is the `name` field.
pub struct Amplifier {
    /// User-facing display name.
    pub name: String,
    /// Maximum output voltage in volts RMS.
    pub voltage_rms: f64,
    /// Maximum output current in milliamps RMS.
    pub current_ma: f64,
}

impl fmt::Display for Amplifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

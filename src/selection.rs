//! The user's current pick of headphones, amplifier, and target loudness,
//! plus everything the UI derives from it. State lives here instead of in
//! the UI so the fallback rules (what happens to the model picker when the
//! brand changes) stay testable without a terminal.

use crate::calc;
use crate::models::{Amplifier, Headphone};

/// Lowest selectable target loudness in dB.
pub const LOUDNESS_MIN_DB: i64 = 50;
/// Highest selectable target loudness in dB.
pub const LOUDNESS_MAX_DB: i64 = 200;
/// Loudness preselected when the application starts.
pub const LOUDNESS_DEFAULT_DB: i64 = 110;

/// SPL above which the max-volume verdict appends a warning.
pub const TOO_LOUD_DB: f64 = 119.0;

#[derive(Debug, Clone)]
/// Current choice of headphone (by brand and model), amplifier (by name),
/// and target loudness. The catalogs themselves are owned elsewhere and
/// passed into every method; this struct only stores the identities.
pub struct Selection {
    pub brand: String,
    pub model: String,
    pub amplifier: String,
    pub loudness_db: i64,
}

/// Everything the calculator derives from one selection. Recomputed from
/// scratch on every change; the formulas are O(1) so caching would only add
/// staleness bugs.
#[derive(Debug, Clone, Copy)]
pub struct Readout {
    pub required_power_mw: f64,
    pub required_voltage_rms: f64,
    pub required_current_ma: f64,
    pub max_loudness_db: f64,
    /// Whether the amplifier's voltage limit exceeds the requirement.
    pub voltage_headroom: bool,
    /// Whether the amplifier's current limit exceeds the requirement.
    pub current_headroom: bool,
}

impl Selection {
    /// Start from the alphabetically first brand and model plus the first
    /// amplifier in catalog order. Returns `None` when either catalog is
    /// empty; the UI shows placeholders until an entry is added.
    pub fn first(headphones: &[Headphone], amplifiers: &[Amplifier]) -> Option<Self> {
        let brand = brands(headphones).into_iter().next()?;
        let model = models_for_brand(headphones, &brand).into_iter().next()?;
        let amplifier = amplifiers.first()?.name.clone();
        Some(Self {
            brand,
            model,
            amplifier,
            loudness_db: LOUDNESS_DEFAULT_DB,
        })
    }

    /// Switch to another brand. The current model carries over when the new
    /// brand also has it; otherwise the selection falls back to the new
    /// brand's alphabetically first model, deterministically.
    pub fn set_brand(&mut self, headphones: &[Headphone], brand: &str) {
        let models = models_for_brand(headphones, brand);
        if !models.iter().any(|m| m == &self.model) {
            if let Some(first) = models.into_iter().next() {
                self.model = first;
            }
        }
        self.brand = brand.to_string();
    }

    /// Step the target loudness, clamped to the selectable range.
    pub fn adjust_loudness(&mut self, delta: i64) {
        self.loudness_db = (self.loudness_db + delta).clamp(LOUDNESS_MIN_DB, LOUDNESS_MAX_DB);
    }

    /// Resolve the selected headphone record, if it still exists.
    pub fn headphone<'a>(&self, headphones: &'a [Headphone]) -> Option<&'a Headphone> {
        headphones
            .iter()
            .find(|h| h.brand == self.brand && h.model == self.model)
    }

    /// Resolve the selected amplifier record, if it still exists.
    pub fn amplifier<'a>(&self, amplifiers: &'a [Amplifier]) -> Option<&'a Amplifier> {
        amplifiers.iter().find(|a| a.name == self.amplifier)
    }

    /// Run the calculator over the current selection. `None` when either
    /// side of the pairing is unresolved.
    pub fn readout(&self, headphones: &[Headphone], amplifiers: &[Amplifier]) -> Option<Readout> {
        let headphone = self.headphone(headphones)?;
        let amplifier = self.amplifier(amplifiers)?;

        let power = calc::required_power_mw(headphone.sensitivity_db_mw, self.loudness_db as f64);
        let voltage = calc::required_voltage_rms(power, headphone.impedance_ohms);
        let current = calc::required_current_ma(power, headphone.impedance_ohms);

        Some(Readout {
            required_power_mw: power,
            required_voltage_rms: voltage,
            required_current_ma: current,
            max_loudness_db: calc::max_loudness_db(
                headphone.sensitivity_db_mw,
                amplifier.voltage_rms,
                amplifier.current_ma,
                headphone.impedance_ohms,
            ),
            voltage_headroom: amplifier.voltage_rms > voltage,
            current_headroom: amplifier.current_ma > current,
        })
    }
}

/// Unique brands present in the catalog, sorted alphabetically.
pub fn brands(headphones: &[Headphone]) -> Vec<String> {
    let mut brands: Vec<String> = headphones.iter().map(|h| h.brand.clone()).collect();
    brands.sort();
    brands.dedup();
    brands
}

/// Models available under one brand, sorted alphabetically.
pub fn models_for_brand(headphones: &[Headphone], brand: &str) -> Vec<String> {
    let mut models: Vec<String> = headphones
        .iter()
        .filter(|h| h.brand == brand)
        .map(|h| h.model.clone())
        .collect();
    models.sort();
    models
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headphone(brand: &str, model: &str, impedance: f64, sensitivity: f64) -> Headphone {
        Headphone {
            brand: brand.to_string(),
            model: model.to_string(),
            impedance_ohms: impedance,
            sensitivity_db_mw: sensitivity,
        }
    }

    fn catalog() -> Vec<Headphone> {
        vec![
            headphone("Sennheiser", "HD 600", 300.0, 97.0),
            headphone("Sennheiser", "6XX", 300.0, 103.0),
            headphone("Beyerdynamic", "DT 990 Pro", 250.0, 96.0),
            headphone("Beyerdynamic", "DT 770 Pro", 80.0, 96.0),
        ]
    }

    fn amps() -> Vec<Amplifier> {
        vec![Amplifier {
            name: "Qudelix 5K".to_string(),
            voltage_rms: 2.0,
            current_ma: 120.0,
        }]
    }

    #[test]
    fn first_picks_alphabetical_brand_and_model() {
        let selection = Selection::first(&catalog(), &amps()).unwrap();
        assert_eq!(selection.brand, "Beyerdynamic");
        assert_eq!(selection.model, "DT 770 Pro");
        assert_eq!(selection.amplifier, "Qudelix 5K");
        assert_eq!(selection.loudness_db, LOUDNESS_DEFAULT_DB);
    }

    #[test]
    fn first_is_none_when_a_catalog_is_empty() {
        assert!(Selection::first(&[], &amps()).is_none());
        assert!(Selection::first(&catalog(), &[]).is_none());
    }

    #[test]
    fn brand_change_falls_back_to_first_model_of_new_brand() {
        let headphones = catalog();
        let mut selection = Selection::first(&headphones, &amps()).unwrap();
        selection.model = "DT 990 Pro".to_string();

        selection.set_brand(&headphones, "Sennheiser");
        assert_eq!(selection.brand, "Sennheiser");
        assert_eq!(selection.model, "6XX");
    }

    #[test]
    fn brand_change_keeps_model_shared_with_new_brand() {
        let mut headphones = catalog();
        headphones.push(headphone("Drop", "6XX", 300.0, 103.0));

        let mut selection = Selection::first(&headphones, &amps()).unwrap();
        selection.brand = "Sennheiser".to_string();
        selection.model = "6XX".to_string();

        selection.set_brand(&headphones, "Drop");
        assert_eq!(selection.brand, "Drop");
        assert_eq!(selection.model, "6XX");
    }

    #[test]
    fn loudness_clamps_to_the_selectable_range() {
        let mut selection = Selection::first(&catalog(), &amps()).unwrap();
        selection.adjust_loudness(1000);
        assert_eq!(selection.loudness_db, LOUDNESS_MAX_DB);
        selection.adjust_loudness(-1000);
        assert_eq!(selection.loudness_db, LOUDNESS_MIN_DB);
    }

    #[test]
    fn readout_matches_the_calculator_for_the_resolved_pair() {
        let headphones = vec![headphone("Sennheiser", "6XX", 300.0, 103.0)];
        let mut selection = Selection::first(&headphones, &amps()).unwrap();
        selection.loudness_db = 110;

        let readout = selection.readout(&headphones, &amps()).unwrap();
        assert!((readout.required_power_mw - 5.0119).abs() < 0.001);
        assert!((readout.required_voltage_rms - 1.2259).abs() < 0.001);
        assert!((readout.required_current_ma - 4.0873).abs() < 0.001);
        assert!(readout.voltage_headroom);
        assert!(readout.current_headroom);
    }

    #[test]
    fn readout_is_none_when_the_selection_dangles() {
        let headphones = catalog();
        let mut selection = Selection::first(&headphones, &amps()).unwrap();
        selection.model = "gone".to_string();
        assert!(selection.readout(&headphones, &amps()).is_none());
    }

    #[test]
    fn brands_are_unique_and_sorted() {
        assert_eq!(brands(&catalog()), vec!["Beyerdynamic", "Sennheiser"]);
    }
}

use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Amplifier, Headphone};

/// Internal representation of the "add headphones" form fields. Text is kept
/// raw while the user types; validation happens in `parse_inputs` on save.
#[derive(Default, Clone)]
pub(crate) struct HeadphoneForm {
    pub(crate) brand: String,
    pub(crate) model: String,
    pub(crate) impedance: String,
    pub(crate) sensitivity: String,
    pub(crate) active: HeadphoneField,
    pub(crate) error: Option<String>,
}

/// Fields available within the headphone form, in focus order.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum HeadphoneField {
    #[default]
    Brand,
    Model,
    Impedance,
    Sensitivity,
}

impl HeadphoneForm {
    /// Move focus to the next field, wrapping around.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            HeadphoneField::Brand => HeadphoneField::Model,
            HeadphoneField::Model => HeadphoneField::Impedance,
            HeadphoneField::Impedance => HeadphoneField::Sensitivity,
            HeadphoneField::Sensitivity => HeadphoneField::Brand,
        };
    }

    /// Move focus to the previous field, wrapping around.
    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            HeadphoneField::Brand => HeadphoneField::Sensitivity,
            HeadphoneField::Model => HeadphoneField::Brand,
            HeadphoneField::Impedance => HeadphoneField::Model,
            HeadphoneField::Sensitivity => HeadphoneField::Impedance,
        };
    }

    /// Append a character to the active field, validating allowed input.
    /// The numeric fields only accept digits and a single decimal point.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            HeadphoneField::Brand => push_text(&mut self.brand, ch),
            HeadphoneField::Model => push_text(&mut self.model, ch),
            HeadphoneField::Impedance => push_numeric(&mut self.impedance, ch),
            HeadphoneField::Sensitivity => push_numeric(&mut self.sensitivity, ch),
        }
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            HeadphoneField::Brand => {
                self.brand.pop();
            }
            HeadphoneField::Model => {
                self.model.pop();
            }
            HeadphoneField::Impedance => {
                self.impedance.pop();
            }
            HeadphoneField::Sensitivity => {
                self.sensitivity.pop();
            }
        }
    }

    /// Validate the inputs and return a record ready to append.
    pub(crate) fn parse_inputs(&self) -> Result<Headphone> {
        let brand = self.brand.trim();
        if brand.is_empty() {
            return Err(anyhow!("Brand is required."));
        }
        let model = self.model.trim();
        if model.is_empty() {
            return Err(anyhow!("Model is required."));
        }
        if brand.contains(';') || model.contains(';') {
            return Err(anyhow!("Semicolons are not allowed in catalog fields."));
        }
        let impedance_ohms = parse_positive(&self.impedance, "Impedance (Ohm)")?;
        let sensitivity_db_mw = parse_positive(&self.sensitivity, "Sensitivity (dB/mW)")?;

        Ok(Headphone {
            brand: brand.to_string(),
            model: model.to_string(),
            impedance_ohms,
            sensitivity_db_mw,
        })
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: HeadphoneField) -> Line<'static> {
        form_line(field_name, self.value(field), self.active == field)
    }

    /// Return the character count for the requested field.
    pub(crate) fn value_len(&self, field: HeadphoneField) -> usize {
        self.value(field).chars().count()
    }

    fn value(&self, field: HeadphoneField) -> &str {
        match field {
            HeadphoneField::Brand => &self.brand,
            HeadphoneField::Model => &self.model,
            HeadphoneField::Impedance => &self.impedance,
            HeadphoneField::Sensitivity => &self.sensitivity,
        }
    }
}

/// Internal representation of the "add amplifier" form fields.
#[derive(Default, Clone)]
pub(crate) struct AmplifierForm {
    pub(crate) name: String,
    pub(crate) voltage: String,
    pub(crate) current: String,
    pub(crate) active: AmplifierField,
    pub(crate) error: Option<String>,
}

/// Fields available within the amplifier form, in focus order.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum AmplifierField {
    #[default]
    Name,
    Voltage,
    Current,
}

impl AmplifierForm {
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            AmplifierField::Name => AmplifierField::Voltage,
            AmplifierField::Voltage => AmplifierField::Current,
            AmplifierField::Current => AmplifierField::Name,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            AmplifierField::Name => AmplifierField::Current,
            AmplifierField::Voltage => AmplifierField::Name,
            AmplifierField::Current => AmplifierField::Voltage,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            AmplifierField::Name => push_text(&mut self.name, ch),
            AmplifierField::Voltage => push_numeric(&mut self.voltage, ch),
            AmplifierField::Current => push_numeric(&mut self.current, ch),
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            AmplifierField::Name => {
                self.name.pop();
            }
            AmplifierField::Voltage => {
                self.voltage.pop();
            }
            AmplifierField::Current => {
                self.current.pop();
            }
        }
    }

    /// Validate the inputs and return a record ready to append.
    pub(crate) fn parse_inputs(&self) -> Result<Amplifier> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Name is required."));
        }
        if name.contains(';') {
            return Err(anyhow!("Semicolons are not allowed in catalog fields."));
        }
        let voltage_rms = parse_positive(&self.voltage, "Voltage (V RMS)")?;
        let current_ma = parse_positive(&self.current, "Current (mA)")?;

        Ok(Amplifier {
            name: name.to_string(),
            voltage_rms,
            current_ma,
        })
    }

    pub(crate) fn build_line(&self, field_name: &str, field: AmplifierField) -> Line<'static> {
        form_line(field_name, self.value(field), self.active == field)
    }

    pub(crate) fn value_len(&self, field: AmplifierField) -> usize {
        self.value(field).chars().count()
    }

    fn value(&self, field: AmplifierField) -> &str {
        match field {
            AmplifierField::Name => &self.name,
            AmplifierField::Voltage => &self.voltage,
            AmplifierField::Current => &self.current,
        }
    }
}

fn push_text(value: &mut String, ch: char) -> bool {
    if ch.is_control() {
        return false;
    }
    value.push(ch);
    true
}

fn push_numeric(value: &mut String, ch: char) -> bool {
    if ch.is_ascii_digit() || (ch == '.' && !value.contains('.')) {
        value.push(ch);
        true
    } else {
        false
    }
}

fn parse_positive(raw: &str, field_name: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{field_name} is required."));
    }
    let value: f64 = trimmed
        .parse()
        .with_context(|| format!("{field_name} must be a number."))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(anyhow!("{field_name} must be greater than zero."));
    }
    Ok(value)
}

fn form_line(field_name: &str, value: &str, is_active: bool) -> Line<'static> {
    let display = if value.is_empty() {
        "<required>".to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_fields_reject_letters_and_second_decimal_points() {
        let mut form = HeadphoneForm {
            active: HeadphoneField::Impedance,
            ..HeadphoneForm::default()
        };

        assert!(form.push_char('3'));
        assert!(form.push_char('2'));
        assert!(form.push_char('.'));
        assert!(form.push_char('5'));
        assert!(!form.push_char('.'));
        assert!(!form.push_char('x'));
        assert_eq!(form.impedance, "32.5");
    }

    #[test]
    fn headphone_form_requires_every_field() {
        let mut form = HeadphoneForm {
            brand: "Sennheiser".to_string(),
            model: "HD 600".to_string(),
            impedance: "300".to_string(),
            ..HeadphoneForm::default()
        };
        assert!(form.parse_inputs().is_err());

        form.sensitivity = "97".to_string();
        let headphone = form.parse_inputs().unwrap();
        assert_eq!(headphone.impedance_ohms, 300.0);
        assert_eq!(headphone.sensitivity_db_mw, 97.0);
    }

    #[test]
    fn amplifier_form_rejects_non_positive_numbers() {
        let form = AmplifierForm {
            name: "Atom".to_string(),
            voltage: "0".to_string(),
            current: "120".to_string(),
            ..AmplifierForm::default()
        };
        assert!(form.parse_inputs().is_err());
    }

    #[test]
    fn semicolons_are_rejected_to_protect_the_file_format() {
        let form = AmplifierForm {
            name: "Atom;2".to_string(),
            voltage: "7.7".to_string(),
            current: "350".to_string(),
            ..AmplifierForm::default()
        };
        assert!(form.parse_inputs().is_err());
    }

    #[test]
    fn focus_cycles_through_all_fields_and_back() {
        let mut form = AmplifierForm::default();
        form.next_field();
        form.next_field();
        form.next_field();
        assert!(form.active == AmplifierField::Name);
        form.previous_field();
        assert!(form.active == AmplifierField::Current);
    }
}

//! The acoustic-electrical formulas at the center of the application. Every
//! function here is pure: plain `f64` in, plain `f64` out, no I/O and no
//! state, which keeps them trivially testable against worked examples.
//!
//! All formulas assume a purely resistive load. Sensitivity is the usual
//! headphone spec sheet figure, dB SPL produced by 1 mW of input power.

/// Power in milliwatts needed to reach `loudness_db` with headphones of the
/// given sensitivity. Straight inversion of the dB/mW definition:
/// every +10 dB over the sensitivity figure costs 10x the power.
pub fn required_power_mw(sensitivity_db_mw: f64, loudness_db: f64) -> f64 {
    10f64.powf((loudness_db - sensitivity_db_mw) / 10.0)
}

/// Voltage in volts RMS needed to push `power_mw` into the load
/// (`P = V^2 / R`, with the mW -> W conversion folded in).
pub fn required_voltage_rms(power_mw: f64, impedance_ohms: f64) -> f64 {
    (power_mw / 1000.0 * impedance_ohms).sqrt()
}

/// Current in milliamps RMS needed to push `power_mw` into the load
/// (`P = I^2 * R`, converted back to milliamps for display).
pub fn required_current_ma(power_mw: f64, impedance_ohms: f64) -> f64 {
    (power_mw / 1000.0 / impedance_ohms).sqrt() * 1000.0
}

/// Highest SPL the amplifier can drive these headphones to, in dB.
///
/// The amplifier is limited twice: by how much current it can source and by
/// how much voltage it can swing. Each limit caps the power delivered into
/// the load; whichever cap is lower binds. The intermediate powers are
/// normalized to milliwatts before the shared `S + 10*log10(mW)` step
/// (mA^2 * ohm lands in microwatts, V^2 / ohm lands in watts).
pub fn max_loudness_db(
    sensitivity_db_mw: f64,
    amp_voltage_rms: f64,
    amp_current_ma: f64,
    impedance_ohms: f64,
) -> f64 {
    let current_limited_mw = amp_current_ma * amp_current_ma * impedance_ohms / 1000.0;
    let voltage_limited_mw = amp_voltage_rms * amp_voltage_rms / impedance_ohms * 1000.0;

    let spl_current = sensitivity_db_mw + 10.0 * current_limited_mw.log10();
    let spl_voltage = sensitivity_db_mw + 10.0 * voltage_limited_mw.log10();

    spl_current.min(spl_voltage)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64, tolerance: f64) -> bool {
        (actual - expected).abs() < tolerance
    }

    #[test]
    fn worked_example_hd6xx_at_110_db() {
        // 103 dB/mW into 300 ohm, target 110 dB.
        let power = required_power_mw(103.0, 110.0);
        assert!(close(power, 5.0119, 0.001), "power was {power}");

        let voltage = required_voltage_rms(power, 300.0);
        assert!(close(voltage, 1.2259, 0.001), "voltage was {voltage}");

        let current = required_current_ma(power, 300.0);
        assert!(close(current, 4.0873, 0.001), "current was {current}");
    }

    #[test]
    fn one_milliwatt_reproduces_the_sensitivity_figure() {
        assert!(close(required_power_mw(97.0, 97.0), 1.0, 1e-12));
    }

    #[test]
    fn required_voltage_and_current_are_non_negative() {
        for sensitivity in [85.0, 97.0, 103.0, 115.0] {
            for loudness in [50.0, 75.0, 110.0, 130.0] {
                for impedance in [16.0, 32.0, 80.0, 300.0, 600.0] {
                    let power = required_power_mw(sensitivity, loudness);
                    assert!(required_voltage_rms(power, impedance) >= 0.0);
                    assert!(required_current_ma(power, impedance) >= 0.0);
                }
            }
        }
    }

    #[test]
    fn voltage_limit_binds_into_a_high_impedance_load() {
        // 2 V / 100 mA into 50 ohm: the current limit allows 500 mW but the
        // voltage swing only allows 80 mW, so the voltage figure wins.
        let spl = max_loudness_db(103.0, 2.0, 100.0, 50.0);
        let voltage_limited = 103.0 + 10.0 * 80.0f64.log10();
        assert!(close(spl, voltage_limited, 1e-9), "spl was {spl}");
        assert!(close(spl, 122.03, 0.01));

        let current_limited = 103.0 + 10.0 * 500.0f64.log10();
        assert!(spl < current_limited);
    }

    #[test]
    fn current_limit_binds_into_a_low_impedance_load() {
        // Plenty of voltage, starved for current.
        let spl = max_loudness_db(97.0, 10.0, 10.0, 32.0);
        let current_limited_mw: f64 = 10.0 * 10.0 * 32.0 / 1000.0;
        let expected = 97.0 + 10.0 * current_limited_mw.log10();
        assert!(close(spl, expected, 1e-9), "spl was {spl}");
    }

    #[test]
    fn max_loudness_never_exceeds_either_limit() {
        for voltage in [0.5, 1.0, 2.0, 7.0] {
            for current in [10.0, 50.0, 250.0] {
                for impedance in [16.0, 50.0, 300.0] {
                    let spl = max_loudness_db(100.0, voltage, current, impedance);
                    let by_current =
                        100.0 + 10.0 * (current * current * impedance / 1000.0).log10();
                    let by_voltage =
                        100.0 + 10.0 * (voltage * voltage / impedance * 1000.0).log10();
                    assert!(spl <= by_current + 1e-9);
                    assert!(spl <= by_voltage + 1e-9);
                }
            }
        }
    }
}

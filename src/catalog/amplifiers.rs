use csv::StringRecord;

use crate::models::Amplifier;

use super::store::{append_row, read_rows, CatalogError, CatalogStore};

/// Load the amplifier catalog in file order, dropping malformed rows
/// (wrong field count, unparsable or non-positive numbers) under the same
/// lenient policy as the headphone catalog.
pub fn load_amplifiers(store: &CatalogStore) -> Result<Vec<Amplifier>, CatalogError> {
    let rows = read_rows(&store.amplifiers_path())?;
    Ok(rows.iter().filter_map(parse_row).collect())
}

/// Append one amplifier row to the backing file; callers reload afterwards.
pub fn append_amplifier(store: &CatalogStore, amplifier: &Amplifier) -> Result<(), CatalogError> {
    let fields = vec![
        amplifier.name.clone(),
        amplifier.voltage_rms.to_string(),
        amplifier.current_ma.to_string(),
    ];
    append_row(&store.amplifiers_path(), &fields)
}

fn parse_row(row: &StringRecord) -> Option<Amplifier> {
    let name = row.get(0)?;
    if name.is_empty() {
        return None;
    }
    let voltage_rms: f64 = row.get(1)?.parse().ok()?;
    let current_ma: f64 = row.get(2)?.parse().ok()?;
    // An amplifier with no voltage or current would turn the max-loudness
    // log into -inf; such rows are as malformed as non-numeric ones.
    if !(voltage_rms.is_finite() && voltage_rms > 0.0)
        || !(current_ma.is_finite() && current_ma > 0.0)
    {
        return None;
    }
    Some(Amplifier {
        name: name.to_string(),
        voltage_rms,
        current_ma,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn store_with(contents: &str) -> (tempfile::TempDir, CatalogStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::with_dir(dir.path());
        fs::write(store.amplifiers_path(), contents).unwrap();
        (dir, store)
    }

    #[test]
    fn append_then_reload_round_trips_byte_identical_fields() {
        let (_dir, store) = store_with("name;voltage;current");

        let added = Amplifier {
            name: "JDS Labs Atom 2".to_string(),
            voltage_rms: 7.7,
            current_ma: 350.0,
        };
        append_amplifier(&store, &added).unwrap();

        let loaded = load_amplifiers(&store).unwrap();
        assert_eq!(loaded, vec![added]);

        let raw = fs::read_to_string(store.amplifiers_path()).unwrap();
        assert!(raw.ends_with("\nJDS Labs Atom 2;7.7;350"));
    }

    #[test]
    fn malformed_rows_are_dropped_silently() {
        let (_dir, store) = store_with(
            "name;voltage;current\n\
             Apple USB-C dongle;1;31\n\
             Magni;six volts;500\n\
             Magni;6\n\
             Qudelix 5K;2;120",
        );

        let loaded = load_amplifiers(&store).unwrap();
        let names: Vec<&str> = loaded.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Apple USB-C dongle", "Qudelix 5K"]);
    }

    #[test]
    fn rows_with_non_positive_numbers_are_dropped_silently() {
        let (_dir, store) = store_with(
            "name;voltage;current\n\
             Broken DAC;0;31\n\
             Backwards amp;-2;120\n\
             Qudelix 5K;2;120",
        );

        let loaded = load_amplifiers(&store).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Qudelix 5K");
    }
}

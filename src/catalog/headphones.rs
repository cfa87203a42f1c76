use csv::StringRecord;

use crate::models::Headphone;

use super::store::{append_row, read_rows, CatalogError, CatalogStore};

/// Trailing empty columns carried on every headphone row. The file format
/// reserves them, so appends must write them and loads must expect them.
const RESERVED_COLUMNS: usize = 3;

/// Load the headphone catalog in file order. Rows with the wrong field
/// count, unparsable numeric fields, or non-positive impedance/sensitivity
/// are dropped under the catalog's lenient-parse policy; only the file
/// itself being missing or unreadable is an error.
pub fn load_headphones(store: &CatalogStore) -> Result<Vec<Headphone>, CatalogError> {
    let rows = read_rows(&store.headphones_path())?;
    Ok(rows.iter().filter_map(parse_row).collect())
}

/// Append one headphone row to the backing file. The in-memory catalog is
/// not touched; callers re-run `load_headphones` to observe the new record.
pub fn append_headphone(store: &CatalogStore, headphone: &Headphone) -> Result<(), CatalogError> {
    let mut fields = vec![
        headphone.brand.clone(),
        headphone.model.clone(),
        headphone.impedance_ohms.to_string(),
        headphone.sensitivity_db_mw.to_string(),
    ];
    fields.extend(std::iter::repeat(String::new()).take(RESERVED_COLUMNS));
    append_row(&store.headphones_path(), &fields)
}

fn parse_row(row: &StringRecord) -> Option<Headphone> {
    let brand = row.get(0)?;
    let model = row.get(1)?;
    if brand.is_empty() || model.is_empty() {
        return None;
    }
    let impedance_ohms: f64 = row.get(2)?.parse().ok()?;
    let sensitivity_db_mw: f64 = row.get(3)?.parse().ok()?;
    // A zero or negative impedance would divide the formulas into inf/NaN;
    // such rows are as malformed as non-numeric ones.
    if !(impedance_ohms.is_finite() && impedance_ohms > 0.0)
        || !(sensitivity_db_mw.is_finite() && sensitivity_db_mw > 0.0)
    {
        return None;
    }
    Some(Headphone {
        brand: brand.to_string(),
        model: model.to_string(),
        impedance_ohms,
        sensitivity_db_mw,
    })
}

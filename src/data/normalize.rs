use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellRecord, Column, RawTable, RecordSet, OPERATOR_HEADER, OTHER_OPERATOR};
use crate::config::DashboardConfig;

/// Turn a raw table into canonical records.
///
/// * header names are trimmed and renamed through `config.header_aliases`
/// * Latitude/Longitude that are not finite numbers make the row disappear
/// * Operator comes from the MNC code table, `"Other"` when unmapped
/// * every other column is carried along verbatim as an extra column
pub fn normalize(raw: RawTable, config: &DashboardConfig) -> RecordSet {
    let positions = resolve_columns(&raw.headers, &config.header_aliases);
    let columns: BTreeSet<Column> = positions.keys().copied().collect();
    let (extra_columns, extra_positions) = extra_columns(&raw.headers, &positions);

    let field = |row: &Vec<String>, column: Column| -> Option<String> {
        positions
            .get(&column)
            .and_then(|&i| row.get(i))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let total = raw.rows.len();
    let mut records = Vec::with_capacity(total);

    for row in &raw.rows {
        let latitude = field(row, Column::Latitude).and_then(|s| to_float(&s));
        let longitude = field(row, Column::Longitude).and_then(|s| to_float(&s));
        let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
            continue;
        };

        let mnc = field(row, Column::Mnc).and_then(|s| to_code(&s));
        let operator = mnc
            .and_then(|code| config.operator_name(code))
            .unwrap_or(OTHER_OPERATOR)
            .to_string();

        records.push(CellRecord {
            mnc,
            cell_id: field(row, Column::CellId),
            latitude,
            longitude,
            generation: field(row, Column::Gen),
            operator,
            extra: extra_positions
                .iter()
                .map(|&i| row.get(i).map(|v| v.trim().to_string()).unwrap_or_default())
                .collect(),
        });
    }

    let dropped = total - records.len();
    if dropped > 0 {
        log::warn!("Dropped {dropped} of {total} row(s) with missing or non-numeric coordinates");
    }

    RecordSet::new(records, columns, dropped)
        .with_extra_columns(extra_columns)
        .with_encoding(raw.encoding)
}

fn clean_header(header: &str) -> &str {
    header.trim_start_matches('\u{feff}').trim()
}

/// Names and indices of the columns that are neither canonical nor the
/// derived Operator column. Blank headers are named `Unnamed: <index>`.
fn extra_columns(
    headers: &[String],
    positions: &BTreeMap<Column, usize>,
) -> (Vec<String>, Vec<usize>) {
    let used: BTreeSet<usize> = positions.values().copied().collect();
    headers
        .iter()
        .enumerate()
        .filter(|(i, h)| !used.contains(i) && clean_header(h) != OPERATOR_HEADER)
        .map(|(i, h)| {
            let name = match clean_header(h) {
                "" => format!("Unnamed: {i}"),
                name => name.to_string(),
            };
            (name, i)
        })
        .unzip()
}

/// Map each canonical column to its index in `headers`.
///
/// A header that already carries the canonical name wins over an alias.
fn resolve_columns(
    headers: &[String],
    aliases: &BTreeMap<String, String>,
) -> BTreeMap<Column, usize> {
    let cleaned: Vec<&str> = headers.iter().map(|h| clean_header(h)).collect();

    let mut positions = BTreeMap::new();
    for (i, name) in cleaned.iter().enumerate() {
        if let Some(column) = Column::from_header(name) {
            positions.entry(column).or_insert(i);
        }
    }

    for (i, name) in cleaned.iter().enumerate() {
        let Some(column) = aliases.get(*name).and_then(|c| Column::from_header(c)) else {
            continue;
        };
        if let Some(&existing) = positions.get(&column) {
            if existing != i {
                log::warn!(
                    "Ignoring header {name:?}: column {} is already present",
                    column.header()
                );
            }
            continue;
        }
        positions.insert(column, i);
    }

    positions
}

/// Lenient float coercion: anything that is not a finite number is missing.
fn to_float(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// MNC codes may arrive as `"30"` or, from spreadsheet exports, `"30.0"`.
fn to_code(s: &str) -> Option<i64> {
    if let Ok(code) = s.parse::<i64>() {
        return Some(code);
    }
    let value = to_float(s)?;
    (value.fract() == 0.0 && value.abs() < i64::MAX as f64).then_some(value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_str;
    use approx::assert_relative_eq;

    fn normalize_text(text: &str) -> RecordSet {
        let config = DashboardConfig::default();
        normalize(parse_str(text, &config).unwrap(), &config)
    }

    #[test]
    fn mapped_code_resolves_operator_and_keeps_row() {
        let set = normalize_text("MNC,Cell_ID,Latitude,Longitude,Gen\n30,1011,6.5244,3.3792,3G\n");
        assert_eq!(set.len(), 1);
        let record = &set.records[0];
        assert_eq!(record.operator, "MTN");
        assert_eq!(record.mnc, Some(30));
        assert_eq!(record.generation.as_deref(), Some("3G"));
        assert_relative_eq!(record.latitude, 6.5244);
        assert_relative_eq!(record.longitude, 3.3792);
    }

    #[test]
    fn invalid_coordinate_drops_row_regardless_of_code() {
        let set = normalize_text("MNC,Latitude,Longitude\n999,abc,3.0\n30,6.1,x\n60,,3.0\n");
        assert!(set.is_empty());
        assert_eq!(set.dropped_rows, 3);
    }

    #[test]
    fn no_record_ever_has_missing_coordinates() {
        let set = normalize_text(
            "MNC,Latitude,Longitude\n30,6.5, 3.3 \n30,NaN,3.3\n30,inf,3.3\n50,7.0,8.0\n",
        );
        assert_eq!(set.len(), 2);
        assert!(set
            .records
            .iter()
            .all(|r| r.latitude.is_finite() && r.longitude.is_finite()));
    }

    #[test]
    fn unmapped_or_missing_code_is_other() {
        let set = normalize_text("MNC,Latitude,Longitude\n999,6.5,3.3\n,6.5,3.3\nabc,6.5,3.3\n");
        assert_eq!(set.len(), 3);
        assert!(set.records.iter().all(|r| r.operator == OTHER_OPERATOR));
        assert_eq!(set.records[0].mnc, Some(999));
        assert_eq!(set.records[1].mnc, None);
    }

    #[test]
    fn float_codes_are_accepted() {
        let set = normalize_text("MNC,Latitude,Longitude\n60.0,6.5,3.3\n60.5,6.5,3.3\n");
        assert_eq!(set.records[0].operator, "Airtel");
        assert_eq!(set.records[1].mnc, None);
    }

    #[test]
    fn raw_headers_are_renamed() {
        let set = normalize_text(
            "60,50822,Latitude_abs,Longitude_abs,Network_Generation\n50,1011,6.5244,3.3792,3G\n",
        );
        assert_eq!(set.columns.len(), 5);
        let record = &set.records[0];
        assert_eq!(record.operator, "Glo");
        assert_eq!(record.cell_id.as_deref(), Some("1011"));
        assert_eq!(record.generation.as_deref(), Some("3G"));
    }

    #[test]
    fn canonical_header_wins_over_alias() {
        let set = normalize_text("Latitude,Latitude_abs,Longitude\n6.5,99.0,3.3\n");
        assert_relative_eq!(set.records[0].latitude, 6.5);
    }

    #[test]
    fn headers_are_trimmed_and_bom_stripped() {
        let set = normalize_text("\u{feff}MNC , Latitude ,Longitude\n2,6.5,3.3\n");
        assert_eq!(set.records[0].operator, "9mobile");
    }

    #[test]
    fn absent_optional_columns_stay_absent() {
        let set = normalize_text("Latitude,Longitude\n6.5,3.3\n");
        assert!(!set.columns.contains(&Column::Gen));
        let record = &set.records[0];
        assert_eq!(record.generation, None);
        assert_eq!(record.cell_id, None);
        assert_eq!(record.generation_label(), "Unknown");
    }

    #[test]
    fn all_empty_rows_are_counted_as_dropped() {
        let set = normalize_text("MNC,Latitude,Longitude\n30,6.5,3.3\n,,\n999,abc,3.0\n");
        assert_eq!(set.len(), 1);
        assert_eq!(set.dropped_rows, 2);
    }

    #[test]
    fn unknown_columns_are_kept_as_extras() {
        let set = normalize_text(
            "Site,MNC,Latitude,Longitude,,Operator\nIkeja-01 ,30,6.6,3.3,x,ignored\n",
        );
        assert_eq!(set.extra_columns, ["Site", "Unnamed: 4"]);
        let record = &set.records[0];
        assert_eq!(record.extra, ["Ikeja-01", "x"]);
        assert_eq!(record.extra_value(0), "Ikeja-01");
        assert_eq!(record.extra_value(9), "");
        assert_eq!(record.operator, "MTN");
    }

    #[test]
    fn shadowed_alias_column_becomes_an_extra() {
        let set = normalize_text("Latitude,Latitude_abs,Longitude\n6.5,99.0,3.3\n");
        assert_eq!(set.extra_columns, ["Latitude_abs"]);
        assert_eq!(set.records[0].extra, ["99.0"]);
    }

    #[test]
    fn missing_coordinate_column_drops_everything() {
        let set = normalize_text("MNC,Latitude\n30,6.5\n");
        assert!(set.is_empty());
        assert_eq!(set.dropped_rows, 1);
    }
}

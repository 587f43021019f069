use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::{Column, RecordView, OPERATOR_HEADER};

/// Write the view as UTF-8 CSV with header
/// `MNC,Cell_ID,Latitude,Longitude,Gen,Operator` followed by any extra
/// source columns. Missing values are empty cells.
pub fn write_csv<W: Write>(records: &RecordView<'_>, delimiter: u8, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    let extra_columns = &records.set().extra_columns;
    let header = Column::ALL
        .iter()
        .map(|c| c.header())
        .chain([OPERATOR_HEADER])
        .chain(extra_columns.iter().map(String::as_str));
    csv_writer.write_record(header).context("writing CSV header")?;

    for record in records.iter() {
        let mut row = vec![
            record.mnc.map(|m| m.to_string()).unwrap_or_default(),
            record.cell_id.clone().unwrap_or_default(),
            // Display for f64 is the shortest text that parses back exactly
            record.latitude.to_string(),
            record.longitude.to_string(),
            record.generation.clone().unwrap_or_default(),
            record.operator.clone(),
        ];
        row.extend((0..extra_columns.len()).map(|i| record.extra_value(i).to_string()));
        csv_writer.write_record(&row).context("writing CSV row")?;
    }
    csv_writer.flush().context("flushing CSV")?;
    Ok(())
}

/// Export into memory, e.g. for a download button.
pub fn to_csv_bytes(records: &RecordView<'_>, delimiter: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(records, delimiter, &mut buf)?;
    Ok(buf)
}

pub fn export_to_file(records: &RecordView<'_>, delimiter: u8, path: &Path) -> Result<()> {
    let bytes = to_csv_bytes(records, delimiter)?;
    std::fs::write(path, bytes).with_context(|| format!("exporting to {}", path.display()))?;
    log::info!("Exported {} rows to {}", records.len(), path.display());
    Ok(())
}

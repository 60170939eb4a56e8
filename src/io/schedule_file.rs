//! CSV storage for `Schedule:File` objects.
//!
//! Each schedule occupies one column of numbers. An optional first column
//! holds a date-time label for every row, and an optional header row holds
//! schedule identifiers.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tracing::info;

use crate::error::{Result, ScheduleError};

/// Column layout for a schedule CSV.
#[derive(Debug, Default)]
pub struct CsvLayout<'a> {
    /// Header labels, one per data column (a blank label is added for datetimes).
    pub header: Option<&'a [String]>,
    /// Date-time labels written as the first column.
    pub datetimes: Option<&'a [String]>,
}

/// Writes schedule columns to a CSV file, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created or written.
pub fn export_schedule_csv(columns: &[Vec<f64>], layout: &CsvLayout<'_>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_schedule_csv(columns, layout, buf)?;
    info!(path = %path.display(), columns = columns.len(), "wrote schedule CSV");
    Ok(())
}

/// Writes schedule columns as CSV to any writer.
///
/// Rows stop at the shortest column.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_schedule_csv(
    columns: &[Vec<f64>],
    layout: &CsvLayout<'_>,
    writer: impl Write,
) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);

    if let Some(header) = layout.header {
        let mut row: Vec<&str> = Vec::with_capacity(header.len() + 1);
        if layout.datetimes.is_some() {
            row.push("");
        }
        row.extend(header.iter().map(String::as_str));
        wtr.write_record(&row)?;
    }

    let n_rows = columns.iter().map(Vec::len).min().unwrap_or(0);
    for i in 0..n_rows {
        let mut row: Vec<String> = Vec::with_capacity(columns.len() + 1);
        if let Some(dts) = layout.datetimes {
            row.push(dts.get(i).cloned().unwrap_or_default());
        }
        row.extend(columns.iter().map(|c| c[i].to_string()));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Reads one numeric column (0-based) from a schedule CSV.
///
/// # Errors
///
/// Returns [`ScheduleError::Parse`] if a row lacks the column or holds a
/// non-numeric value, and I/O or CSV errors if the file cannot be read.
pub fn read_csv_column(path: &Path, column: usize, rows_to_skip: usize) -> Result<Vec<f64>> {
    let file = File::open(path)?;
    read_column(file, column, rows_to_skip)
}

/// Reads one numeric column (0-based) from CSV data.
///
/// # Errors
///
/// See [`read_csv_column`].
pub fn read_column(reader: impl io::Read, column: usize, rows_to_skip: usize) -> Result<Vec<f64>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut values = Vec::new();
    for (row, record) in rdr.records().enumerate().skip(rows_to_skip) {
        let record = record?;
        let cell = record.get(column).map(str::trim).unwrap_or("");
        if cell.is_empty() && record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let value = cell.parse::<f64>().map_err(|_| {
            ScheduleError::Parse(format!(
                "row {} column {} holds \"{cell}\" which is not a number",
                row + 1,
                column + 1
            ))
        })?;
        values.push(value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_datetime_column() {
        let cols = vec![vec![0.5, 1.0], vec![2.0, 3.0]];
        let header = vec!["A".to_string(), "B".to_string()];
        let dts = vec!["01 Jan 00:00".to_string(), "01 Jan 01:00".to_string()];
        let layout = CsvLayout { header: Some(&header), datetimes: Some(&dts) };
        let mut buf = Vec::new();
        assert!(write_schedule_csv(&cols, &layout, &mut buf).is_ok());
        let text = String::from_utf8(buf).unwrap_or_default();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![",A,B", "01 Jan 00:00,0.5,2", "01 Jan 01:00,1,3"]);
    }

    #[test]
    fn read_column_skips_rows() {
        let data = ",A,B\nx,1,2\ny,3,4\n";
        let vals = read_column(data.as_bytes(), 2, 1).ok();
        assert_eq!(vals, Some(vec![2.0, 4.0]));
    }

    #[test]
    fn read_column_rejects_text() {
        let data = "1\nabc\n";
        assert!(matches!(read_column(data.as_bytes(), 0, 0), Err(ScheduleError::Parse(_))));
    }

    #[test]
    fn export_creates_directories() {
        let dir = tempfile::tempdir().ok();
        let Some(dir) = dir else { return };
        let path = dir.path().join("nested").join("sched.csv");
        let cols = vec![vec![1.0; 24]];
        assert!(export_schedule_csv(&cols, &CsvLayout::default(), &path).is_ok());
        let back = read_csv_column(&path, 0, 0).ok();
        assert_eq!(back.map(|v| v.len()), Some(24));
    }
}

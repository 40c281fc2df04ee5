use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Minimum width of every output cell; short values are left-justified and
/// space-padded so columns line up across rows.
pub const FIELD_WIDTH: usize = 30;

pub const COL_TEMPERATURE: &str = "T_K";
pub const COL_PRESSURE: &str = "P_bar";
pub const COL_MOLECULES: &str = "No_mol";
pub const COL_DENSITY: &str = "Rho_kg_per_m_cubed";
pub const COL_VOLUME: &str = "V_ang_cubed";
pub const COL_BOX_LENGTH: &str = "L_ang_if_cubed";

const SUMMARY_COLUMNS: [&str; 6] = [
    COL_TEMPERATURE,
    COL_PRESSURE,
    COL_MOLECULES,
    COL_DENSITY,
    COL_VOLUME,
    COL_BOX_LENGTH,
];

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("summary is missing its header or data row")]
    Truncated,
    #[error("column '{0}' not found in summary header")]
    MissingColumn(String),
    #[error("data row has {found} fields but the header names {expected}")]
    RowShape { found: usize, expected: usize },
    #[error("invalid number '{value}' in column '{column}'")]
    InvalidNumber { column: String, value: String },
}

fn write_row(writer: &mut impl Write, cells: &[String]) -> io::Result<()> {
    for cell in cells {
        write!(writer, "{cell:<FIELD_WIDTH$} ")?;
    }
    writeln!(writer)
}

/// Read one header row and one data row, both whitespace-delimited, into a
/// column-name → value map.
fn read_record(reader: &mut impl BufRead) -> Result<HashMap<String, f64>, SummaryError> {
    let mut rows = Vec::with_capacity(2);
    for line_res in reader.lines() {
        let line = line_res?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(line);
        if rows.len() == 2 {
            break;
        }
    }
    let [header, data]: [String; 2] = rows.try_into().map_err(|_| SummaryError::Truncated)?;

    let names: Vec<&str> = header.split_whitespace().collect();
    let fields: Vec<&str> = data.split_whitespace().collect();
    if names.len() != fields.len() {
        return Err(SummaryError::RowShape {
            found: fields.len(),
            expected: names.len(),
        });
    }

    let mut record = HashMap::with_capacity(names.len());
    for (name, raw) in names.iter().zip(&fields) {
        let value: f64 = raw.parse().map_err(|_| SummaryError::InvalidNumber {
            column: (*name).to_string(),
            value: (*raw).to_string(),
        })?;
        record.insert((*name).to_string(), value);
    }
    Ok(record)
}

fn take(record: &HashMap<String, f64>, column: &str) -> Result<f64, SummaryError> {
    record
        .get(column)
        .copied()
        .ok_or_else(|| SummaryError::MissingColumn(column.to_string()))
}

/// Scalar summary of one replicate's production run: the state point it ran
/// at plus the step-range means of the tracked quantities. Written once after
/// production completes and kept as an audit artifact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplicateSummary {
    pub temperature_k: f64,
    pub pressure_bar: f64,
    pub mol_count: f64,
    pub density_kg_per_m3: f64,
    pub volume_ang3: f64,
    pub box_length_ang: f64,
}

impl ReplicateSummary {
    fn values(&self) -> [f64; 6] {
        [
            self.temperature_k,
            self.pressure_bar,
            self.mol_count,
            self.density_kg_per_m3,
            self.volume_ang3,
            self.box_length_ang,
        ]
    }

    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        write_row(writer, &SUMMARY_COLUMNS.map(str::to_string))?;
        write_row(writer, &self.values().map(|v| v.to_string()))
    }

    pub fn write_to_path(&self, path: &Path) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()
    }

    pub fn read_from(reader: &mut impl BufRead) -> Result<Self, SummaryError> {
        let record = read_record(reader)?;
        Ok(Self {
            temperature_k: take(&record, COL_TEMPERATURE)?,
            pressure_bar: take(&record, COL_PRESSURE)?,
            mol_count: take(&record, COL_MOLECULES)?,
            density_kg_per_m3: take(&record, COL_DENSITY)?,
            volume_ang3: take(&record, COL_VOLUME)?,
            box_length_ang: take(&record, COL_BOX_LENGTH)?,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, SummaryError> {
        let file = File::open(path)?;
        Self::read_from(&mut BufReader::new(file))
    }
}

/// A mean together with its across-replica sample standard deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantityStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// Across-replica statistics for one replicate group, in summary-column
/// order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateRow {
    pub temperature_k: QuantityStats,
    pub pressure_bar: QuantityStats,
    pub mol_count: QuantityStats,
    pub density_kg_per_m3: QuantityStats,
    pub volume_ang3: QuantityStats,
    pub box_length_ang: QuantityStats,
}

impl AggregateRow {
    fn stats(&self) -> [QuantityStats; 6] {
        [
            self.temperature_k,
            self.pressure_bar,
            self.mol_count,
            self.density_kg_per_m3,
            self.volume_ang3,
            self.box_length_ang,
        ]
    }
}

/// The shared cross-replicate report: a header row written once, then one
/// fixed-width row per replicate group, appended as each group completes.
///
/// Appends take no lock. Two aggregation jobs appending concurrently would
/// interleave rows; the campaign driver serializes group aggregation, which
/// is the only thing making this safe.
#[derive(Debug, Clone)]
pub struct AggregateReport {
    path: PathBuf,
}

impl AggregateReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Remove the report if present, forcing the next append to rebuild it
    /// from scratch. Returns whether a file was removed.
    pub fn invalidate(&self) -> io::Result<bool> {
        if self.path.is_file() {
            fs::remove_file(&self.path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn header_cells() -> Vec<String> {
        SUMMARY_COLUMNS
            .iter()
            .flat_map(|name| [(*name).to_string(), format!("{name}_std")])
            .collect()
    }

    pub fn append(&self, row: &AggregateRow) -> Result<(), SummaryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let is_new = !self.path.is_file();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        if is_new {
            write_row(&mut writer, &Self::header_cells())?;
        }
        let cells: Vec<String> = row
            .stats()
            .iter()
            .flat_map(|s| [s.mean.to_string(), s.std_dev.to_string()])
            .collect();
        write_row(&mut writer, &cells)?;
        writer.flush()?;
        Ok(())
    }

    /// All rows currently in the report, keyed by header name. Used for
    /// status reporting and tests; the pipeline itself never reads this file.
    pub fn rows(&self) -> Result<Vec<HashMap<String, f64>>, SummaryError> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let header = loop {
            match lines.next() {
                Some(line) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
                None => return Err(SummaryError::Truncated),
            }
        };
        let names: Vec<String> = header.split_whitespace().map(str::to_string).collect();

        let mut rows = Vec::new();
        for line_res in lines {
            let line = line_res?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != names.len() {
                return Err(SummaryError::RowShape {
                    found: fields.len(),
                    expected: names.len(),
                });
            }
            let mut record = HashMap::with_capacity(names.len());
            for (name, raw) in names.iter().zip(&fields) {
                let value: f64 = raw.parse().map_err(|_| SummaryError::InvalidNumber {
                    column: name.clone(),
                    value: (*raw).to_string(),
                })?;
                record.insert(name.clone(), value);
            }
            rows.push(record);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn summary() -> ReplicateSummary {
        ReplicateSummary {
            temperature_k: 300.0,
            pressure_bar: 1.01325,
            mol_count: 500.0,
            density_kg_per_m3: 997.2,
            volume_ang3: 14958.3,
            box_length_ang: 24.64,
        }
    }

    fn stats(mean: f64, std_dev: f64) -> QuantityStats {
        QuantityStats { mean, std_dev }
    }

    fn row(temp: f64) -> AggregateRow {
        AggregateRow {
            temperature_k: stats(temp, 0.0),
            pressure_bar: stats(1.01325, 0.0),
            mol_count: stats(500.0, 0.0),
            density_kg_per_m3: stats(1.0, 0.028),
            volume_ang3: stats(15625.0, 2.0),
            box_length_ang: stats(25.0, 0.001),
        }
    }

    #[test]
    fn summary_round_trips_through_the_text_format() {
        let original = summary();
        let mut buffer = Vec::new();
        original.write_to(&mut buffer).unwrap();

        let back = ReplicateSummary::read_from(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn summary_rows_are_fixed_width_with_trailing_space() {
        let mut buffer = Vec::new();
        summary().write_to(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(&format!("{COL_TEMPERATURE:<30} ")));
        for line in &lines {
            // Six cells of at least 30 characters, each followed by one space.
            assert!(line.len() >= 6 * (FIELD_WIDTH + 1));
            assert!(line.ends_with(' '));
        }
    }

    #[test]
    fn nan_cells_survive_a_round_trip() {
        let mut original = summary();
        original.density_kg_per_m3 = f64::NAN;
        let mut buffer = Vec::new();
        original.write_to(&mut buffer).unwrap();

        let back = ReplicateSummary::read_from(&mut Cursor::new(buffer)).unwrap();
        assert!(back.density_kg_per_m3.is_nan());
        assert_eq!(back.volume_ang3, original.volume_ang3);
    }

    #[test]
    fn truncated_summary_is_an_error() {
        let result = ReplicateSummary::read_from(&mut Cursor::new("T_K P_bar\n"));
        assert!(matches!(result, Err(SummaryError::Truncated)));
    }

    #[test]
    fn summary_with_renamed_column_is_an_error() {
        let text = "T_K P_bar No_mol Rho V_ang_cubed L_ang_if_cubed\n300 1 500 1.0 15625 25\n";
        let result = ReplicateSummary::read_from(&mut Cursor::new(text));
        assert!(matches!(result, Err(SummaryError::MissingColumn(c)) if c == COL_DENSITY));
    }

    #[test]
    fn report_writes_the_header_exactly_once() {
        let dir = tempdir().unwrap();
        let report = AggregateReport::new(dir.path().join("averages.txt"));

        report.append(&row(550.0)).unwrap();
        report.append(&row(300.0)).unwrap();

        let text = fs::read_to_string(report.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            text.matches(COL_TEMPERATURE).count(),
            2, // T_K and T_K_std, in the single header row
        );
    }

    #[test]
    fn appending_a_second_group_preserves_the_first_row() {
        let dir = tempdir().unwrap();
        let report = AggregateReport::new(dir.path().join("averages.txt"));

        report.append(&row(550.0)).unwrap();
        let first = fs::read_to_string(report.path()).unwrap();
        report.append(&row(300.0)).unwrap();
        let both = fs::read_to_string(report.path()).unwrap();

        assert!(both.starts_with(&first));
        let rows = report.rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][COL_TEMPERATURE], 550.0);
        assert_eq!(rows[1][COL_TEMPERATURE], 300.0);
        assert_eq!(rows[1]["Rho_kg_per_m_cubed_std"], 0.028);
    }

    #[test]
    fn invalidate_removes_the_report() {
        let dir = tempdir().unwrap();
        let report = AggregateReport::new(dir.path().join("averages.txt"));

        assert!(!report.invalidate().unwrap());
        report.append(&row(300.0)).unwrap();
        assert!(report.invalidate().unwrap());
        assert!(!report.exists());
    }
}

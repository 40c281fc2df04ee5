use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlkError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("block output contains no header row")]
    Empty,
    #[error("column '{name}' not found (available: {available:?})")]
    MissingColumn { name: String, available: Vec<String> },
    #[error("row {row} has {found} fields, expected {expected}")]
    RowShape {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("invalid number '{value}' in column '{column}' on row {row}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
}

/// One engine block-average table, held fully in memory.
///
/// The input is whitespace-delimited with a single header row. The engine
/// prefixes the first header token with a marker character (`#STEP`); the
/// marker is stripped so the step column can be addressed by its bare name.
/// Cells spelling `NaN` parse to a quiet NaN and are excluded from means
/// downstream, never treated as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockTable {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl BlockTable {
    pub fn read_from(reader: &mut impl BufRead) -> Result<Self, BlkError> {
        let mut columns: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            if line.trim().is_empty() {
                continue;
            }
            match &columns {
                None => {
                    let mut names: Vec<String> =
                        line.split_whitespace().map(str::to_string).collect();
                    if let Some(first) = names.first_mut() {
                        *first = first
                            .trim_start_matches(|c: char| !c.is_ascii_alphanumeric())
                            .to_string();
                    }
                    columns = Some(names);
                }
                Some(cols) => {
                    let fields: Vec<&str> = line.split_whitespace().collect();
                    if fields.len() != cols.len() {
                        return Err(BlkError::RowShape {
                            row: line_num + 1,
                            found: fields.len(),
                            expected: cols.len(),
                        });
                    }
                    let mut row = Vec::with_capacity(fields.len());
                    for (col_idx, raw) in fields.iter().enumerate() {
                        let value: f64 = raw.parse().map_err(|_| BlkError::InvalidNumber {
                            row: line_num + 1,
                            column: cols[col_idx].clone(),
                            value: (*raw).to_string(),
                        })?;
                        row.push(value);
                    }
                    rows.push(row);
                }
            }
        }

        let columns = columns.ok_or(BlkError::Empty)?;
        Ok(Self { columns, rows })
    }

    pub fn from_path(path: &Path) -> Result<Self, BlkError> {
        let file = File::open(path)?;
        Self::read_from(&mut BufReader::new(file))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Result<usize, BlkError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| BlkError::MissingColumn {
                name: name.to_string(),
                available: self.columns.clone(),
            })
    }

    /// The values of one column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<f64>, BlkError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Rows whose value in `column` lies inside `range`, both bounds
    /// inclusive.
    pub fn filtered_by(
        &self,
        column: &str,
        range: RangeInclusive<f64>,
    ) -> Result<BlockTable, BlkError> {
        let idx = self.column_index(column)?;
        let rows = self
            .rows
            .iter()
            .filter(|row| range.contains(&row[idx]))
            .cloned()
            .collect();
        Ok(BlockTable {
            columns: self.columns.clone(),
            rows,
        })
    }
}

//! In-memory tabular extract

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("line {line}: expected {expected} column(s), found {found}")]
    RowWidth {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("no header line")]
    MissingHeader,

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Named columns and rows of text cells
///
/// Cells are kept as the text the extraction tool printed, so writing the
/// table back out as CSV reproduces every value exactly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; its width must match the header
    pub fn push_row<I, S>(&mut self, row: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = row.into_iter().map(Into::into).collect();
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                line: self.rows.len() + 2,
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parse comma separated text whose first record is the header
    pub fn from_csv(text: &str) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(TableError::MissingHeader);
        }

        let mut table = Table::new(headers.iter());
        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter())?;
        }
        Ok(table)
    }

    /// Parse whitespace aligned columns
    ///
    /// The first non-blank line is the header; a leading `#` on it is
    /// dropped. Later comment lines and blank lines are ignored.
    pub fn from_whitespace(text: &str) -> Result<Self, TableError> {
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header) = lines.next().ok_or(TableError::MissingHeader)?;
        let header = header.trim_start().trim_start_matches('#');
        let mut table = Table::new(header.split_whitespace());
        if table.columns.is_empty() {
            return Err(TableError::MissingHeader);
        }

        for (index, line) in lines {
            if line.trim_start().starts_with('#') {
                continue;
            }
            let cells: Vec<&str> = line.split_whitespace().collect();
            if cells.len() != table.columns.len() {
                return Err(TableError::RowWidth {
                    line: index + 1,
                    expected: table.columns.len(),
                    found: cells.len(),
                });
            }
            table.rows.push(cells.into_iter().map(str::to_string).collect());
        }
        Ok(table)
    }

    /// Write the header and every row as CSV
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), TableError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

/// One extract paired with the feature it was taken for
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub feature: String,
    pub table: Table,
}

impl FeatureTable {
    pub fn new(feature: impl Into<String>, table: Table) -> Self {
        Self {
            feature: feature.into(),
            table,
        }
    }
}

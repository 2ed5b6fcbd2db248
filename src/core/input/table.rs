//! Gene-level TSV table

use crate::config::InputConfig;
use crate::domain::{PhenoscribeError, Result};
use std::io::Read;
use std::path::Path;

/// Column names used to read the gene table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    /// Gene symbol column
    pub gene: String,

    /// Alternate gene column, renamed to `gene` when `gene` is absent
    pub alternate_gene: Option<String>,

    /// Cluster label column
    pub cluster: String,

    /// Optional functional annotation column
    pub annotation: Option<String>,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self::from(&InputConfig::default())
    }
}

impl From<&InputConfig> for ColumnNames {
    fn from(config: &InputConfig) -> Self {
        Self {
            gene: config.gene_column.clone(),
            alternate_gene: config.alternate_gene_column.clone(),
            cluster: config.cluster_column.clone(),
            annotation: config.annotation_column.clone(),
        }
    }
}

/// In-memory gene table with a header row
#[derive(Debug, Clone, Default)]
pub struct GeneTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl GeneTable {
    /// Reads a tab-separated file
    ///
    /// # Errors
    ///
    /// Returns `PhenoscribeError::Input` if the file is missing, cannot be
    /// parsed, or lacks the gene or cluster column.
    pub fn from_tsv(path: impl AsRef<Path>, columns: &ColumnNames) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PhenoscribeError::Input(format!(
                "Input file not found: {}",
                path.display()
            )));
        }

        let file = std::fs::File::open(path).map_err(|e| {
            PhenoscribeError::Input(format!("Failed to open {}: {}", path.display(), e))
        })?;

        Self::from_reader(file, columns)
    }

    /// Reads tab-separated data from any reader
    pub fn from_reader<R: Read>(reader: R, columns: &ColumnNames) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(reader);

        let mut headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<std::result::Result<Vec<Vec<String>>, csv::Error>>()?;

        normalize_gene_column(&mut headers, columns);

        let table = Self { headers, rows };
        table.require_column(&columns.gene)?;
        table.require_column(&columns.cluster)?;
        Ok(table)
    }

    /// Column headers after normalization
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell value, empty for short rows
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|s| s.trim())
            .unwrap_or("")
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            PhenoscribeError::Input(format!(
                "Required column '{}' not found (available: {})",
                name,
                self.headers.join(", ")
            ))
        })
    }
}

fn normalize_gene_column(headers: &mut [String], columns: &ColumnNames) {
    if headers.iter().any(|h| h == &columns.gene) {
        return;
    }
    if let Some(alternate) = &columns.alternate_gene {
        if let Some(header) = headers.iter_mut().find(|h| *h == alternate) {
            tracing::debug!(from = %alternate, to = %columns.gene, "Renaming gene column");
            *header = columns.gene.clone();
        }
    }
}

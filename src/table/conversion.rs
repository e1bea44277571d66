use super::model::EbdTable;
use crate::error::TableError;

/// A trait for scraper output that can be turned into an [`EbdTable`].
///
/// Extraction from PDF or DOCX documents happens outside this crate. Whatever structure a
/// scraper produces, implementing this trait is the translation layer into the table model
/// that the converter consumes.
///
/// # Example
///
/// ```rust,no_run
/// use ebd_graph::prelude::*;
///
/// // 1. The scraper's own row type.
/// struct ScrapedRow { nr: String, question: String, yes: String, no: String }
/// struct ScrapedTable { code: String, rows: Vec<ScrapedRow> }
///
/// // 2. Implement `IntoTable` for the top-level struct.
/// impl IntoTable for ScrapedTable {
///     fn into_table(self) -> std::result::Result<EbdTable, TableError> {
///         let mut rows = Vec::new();
///         for row in self.rows {
///             let invalid = |e: ParseError| TableError::InvalidRow {
///                 row: row.nr.clone(),
///                 message: e.to_string(),
///             };
///             let step: StepNumber = row.nr.parse().map_err(invalid)?;
///             let yes: StepNumber = row.yes.parse().map_err(invalid)?;
///             rows.push(
///                 TableRow::new(step, row.question)
///                     .with_outcome("ja", CheckResult::ContinueAt(yes))
///                     .with_outcome("nein", CheckResult::Terminal(Terminal::new(row.no, ""))),
///             );
///         }
///         let metadata = TableMetadata { ebd_code: self.code, ..Default::default() };
///         Ok(EbdTable::new(metadata, rows))
///     }
/// }
/// ```
pub trait IntoTable {
    /// Consumes the object and converts it into a table ready for conversion.
    fn into_table(self) -> Result<EbdTable, TableError>;
}

impl IntoTable for EbdTable {
    fn into_table(self) -> Result<EbdTable, TableError> {
        Ok(self)
    }
}

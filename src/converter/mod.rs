use crate::error::ConversionError;
use crate::graph::EbdGraph;
use crate::table::{EbdTable, Vocabulary};
use ahash::AHashSet;
use itertools::Itertools;
use tracing::debug;

mod builder;

use builder::GraphBuilder;

/// Turns an [`EbdTable`] into an [`EbdGraph`].
///
/// Conversion is deterministic and independent of row order except for the entry step,
/// which is always the first row in document order. Decision nodes are created in
/// ascending step order and outcome nodes in the order they are first reached from
/// those steps, so permuting rows yields the same graph. A table without rows converts
/// to a graph holding only an [`Empty`](crate::graph::Node::Empty) node.
pub struct Converter<'t> {
    table: &'t EbdTable,
    vocabulary: Option<Vocabulary>,
}

pub struct ConverterBuilder<'t> {
    table: &'t EbdTable,
    vocabulary: Option<Vocabulary>,
}

impl<'t> ConverterBuilder<'t> {
    pub fn new(table: &'t EbdTable) -> Self {
        Self {
            table,
            vocabulary: None,
        }
    }

    /// Checks the whole table against `vocabulary` before converting it.
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    pub fn build(self) -> Converter<'t> {
        Converter {
            table: self.table,
            vocabulary: self.vocabulary,
        }
    }
}

impl<'t> Converter<'t> {
    pub fn builder(table: &'t EbdTable) -> ConverterBuilder<'t> {
        ConverterBuilder::new(table)
    }

    pub fn convert(&self) -> Result<EbdGraph, ConversionError> {
        let table = self.table;
        if let Some(vocabulary) = &self.vocabulary {
            table.validate(vocabulary)?;
        }
        let Some(entry) = table.first_row() else {
            return convert_without_rows(table);
        };

        let rows: Vec<_> = table.rows.iter().sorted_by_key(|r| r.step_number).collect();
        let mut builder = GraphBuilder::new(rows.len());

        // 1. Start node and one step node per row.
        let start = builder.add_start();
        for row in &rows {
            builder.add_step(row)?;
        }
        builder.connect_start(start, entry.step_number);

        // 2. Outcome edges, discovering outcome nodes in step order.
        for row in &rows {
            builder.connect_row(row)?;
        }

        // 3. Annotation nodes, one per instruction.
        let mut anchors = AHashSet::new();
        for instruction in table
            .multi_step_instructions
            .iter()
            .sorted_by_key(|i| i.anchor)
        {
            if !anchors.insert(instruction.anchor) {
                return Err(ConversionError::DuplicateAnnotation {
                    anchor: instruction.anchor,
                });
            }
            builder.add_annotation(instruction)?;
        }

        let graph = builder.finish(table.metadata.clone())?;
        debug!(
            ebd = %table.metadata.ebd_code,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "converted table to graph"
        );
        Ok(graph)
    }
}

/// An EBD without a table becomes a single placeholder node showing the metadata remark.
fn convert_without_rows(table: &EbdTable) -> Result<EbdGraph, ConversionError> {
    if let Some(instruction) = table.multi_step_instructions.first() {
        return Err(ConversionError::DanglingAnnotation {
            anchor: instruction.anchor,
        });
    }
    let mut builder = GraphBuilder::new(0);
    builder.add_empty();
    let graph = builder.finish(table.metadata.clone())?;
    debug!(ebd = %table.metadata.ebd_code, "table has no rows, using placeholder node");
    Ok(graph)
}

/// Converts a table with the default settings: no vocabulary check, only the structural
/// checks the conversion itself needs.
pub fn convert(table: &EbdTable) -> Result<EbdGraph, ConversionError> {
    Converter::builder(table).build().convert()
}

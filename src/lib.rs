//! # ebd-graph - Decision Table to Diagram Compiler
//!
//! **ebd-graph** turns digitized EBD decision tables ("Entscheidungsbaumdiagramme" of the
//! German energy market) into a directed graph and renders that graph as diagram text
//! for standard layout tools. The primary output is Graphviz DOT; PlantUML is available
//! as a simpler alternative.
//!
//! ## Core Workflow
//!
//! The pipeline runs strictly in one direction:
//!
//! 1.  **Load Your Table**: Deserialize an [`EbdTable`](table::EbdTable) from JSON, or
//!     implement [`IntoTable`](table::IntoTable) for your scraper's own structs.
//! 2.  **Convert**: Use `Converter::builder` to build the [`EbdGraph`](graph::EbdGraph).
//!     Step references are resolved and identical terminal results share one node, as do
//!     all "Ende" results. Transition steps get a single unlabeled edge, and a table
//!     without rows becomes one placeholder node.
//!     Unresolvable references fail with a typed [`ConversionError`](error::ConversionError).
//! 3.  **Validate**: [`Validated::check`](validator::Validated::check) runs the graph
//!     checks. Fatal findings stop here; loops come back as warnings.
//! 4.  **Render**: Pick a [`DiagramRenderer`](render::DiagramRenderer) and produce text.
//!     Output is byte-identical for an unchanged graph.
//!
//! ## Quick Start
//!
//! ```rust
//! use ebd_graph::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let step = |s: &str| s.parse::<StepNumber>();
//!     let metadata = TableMetadata {
//!         ebd_code: "E_0001".to_string(),
//!         role: "NB".to_string(),
//!         ..Default::default()
//!     };
//!     let table = EbdTable::new(
//!         metadata,
//!         vec![
//!             TableRow::new(step("1")?, "Ist die Marktlokation bekannt?")
//!                 .with_outcome("ja", CheckResult::ContinueAt(step("2")?))
//!                 .with_outcome("nein", CheckResult::Terminal(Terminal::new("A01", "Unbekannt"))),
//!             TableRow::new(step("2")?, "Liegt die Anmeldung fristgerecht vor?")
//!                 .with_outcome("ja", CheckResult::Terminal(Terminal::new("A02", "")))
//!                 .with_outcome("nein", CheckResult::ContinueAt(step("1")?)),
//!         ],
//!     )
//!     .with_instruction(MultiStepInstruction::new(step("1")?, "Gilt ab hier."));
//!
//!     let graph = Converter::builder(&table)
//!         .with_vocabulary(Vocabulary::default())
//!         .build()
//!         .convert()?;
//!
//!     // The loop from step 2 back to step 1 is reported, not rejected.
//!     let validated = Validated::check(&graph)?;
//!     assert_eq!(validated.warnings().len(), 1);
//!
//!     let dot = DotRenderer::default().render(&validated);
//!     assert!(dot.starts_with("digraph D {"));
//!     Ok(())
//! }
//! ```

pub mod converter;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod render;
pub mod table;
pub mod validator;

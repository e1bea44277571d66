//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the ebd-graph crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use ebd_graph::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/E_0003.json")?;
//! let table = EbdTable::from_json(&json)?;
//!
//! let graph = convert(&table)?;
//! let validated = Validated::check(&graph)?;
//! println!("{}", render(&validated, Dialect::Dot));
//! # Ok(())
//! # }
//! ```

// Table model
pub use crate::table::{
    CheckResult, EbdTable, IntoTable, MultiStepInstruction, OutcomeCode, Resolution,
    StepNumber, TRANSITION, TableMetadata, TableRow, Terminal, Vocabulary,
};

// Conversion and graph model
pub use crate::converter::{Converter, convert};
pub use crate::graph::{EbdGraph, EdgeKind, Node, NodeIndex, NodeKind};

// Validation
pub use crate::validator::{Finding, FindingKind, Severity, Validated, validate};

// Rendering
pub use crate::render::{
    DiagramRenderer, Dialect, DotRenderer, DotStyle, PlantUmlRenderer, PlantUmlStyle, render,
};

// Error types
pub use crate::error::{ConversionError, GraphError, ParseError, TableError, ValidationError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

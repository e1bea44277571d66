//! Common test utilities for building decision tables.
use ebd_graph::prelude::*;

/// Parses a step number, panicking on malformed test input.
#[allow(dead_code)]
pub fn step(text: &str) -> StepNumber {
    text.parse().expect("valid step number in test fixture")
}

#[allow(dead_code)]
pub fn continue_at(text: &str) -> CheckResult {
    CheckResult::ContinueAt(step(text))
}

#[allow(dead_code)]
pub fn terminal(end_code: &str, label: &str) -> CheckResult {
    CheckResult::Terminal(Terminal::new(end_code, label))
}

#[allow(dead_code)]
pub fn create_metadata() -> TableMetadata {
    TableMetadata {
        ebd_code: "E_0001".to_string(),
        chapter: "7.1 AD: Anmeldung".to_string(),
        section: "7.1.1 E_0001_Anmeldung prüfen".to_string(),
        ebd_name: "Anmeldung prüfen".to_string(),
        role: "NB".to_string(),
        remark: None,
    }
}

/// Creates the three-part loop scenario.
///
/// Step 1 ("check A"): ja -> 2, nein -> E0001 "no match".
/// Step 2 ("check B"): ja -> E0002 "match", nein -> 1 (loop).
/// One multi-step instruction anchored at step 1.
#[allow(dead_code)]
pub fn create_loop_table() -> EbdTable {
    EbdTable::new(
        create_metadata(),
        vec![
            TableRow::new(step("1"), "check A")
                .with_outcome("ja", continue_at("2"))
                .with_outcome("nein", terminal("E0001", "no match")),
            TableRow::new(step("2"), "check B")
                .with_outcome("ja", terminal("E0002", "match"))
                .with_outcome("nein", continue_at("1")),
        ],
    )
    .with_instruction(MultiStepInstruction::new(step("1"), "applies from here"))
}

/// Creates a loop-free table where two steps end with the same answer.
///
/// Step 10: ja -> 20, nein -> A01 "Cluster: Ablehnung".
/// Step 20: ja -> A02 "Zustimmung", nein -> A01 "Cluster: Ablehnung".
#[allow(dead_code)]
pub fn create_shared_outcome_table() -> EbdTable {
    EbdTable::new(
        create_metadata(),
        vec![
            TableRow::new(step("10"), "Ist der Absender berechtigt?")
                .with_outcome("ja", continue_at("20"))
                .with_outcome("nein", terminal("A01", "Cluster: Ablehnung")),
            TableRow::new(step("20"), "Ist die Frist eingehalten?")
                .with_outcome("ja", terminal("A02", "Zustimmung"))
                .with_outcome("nein", terminal("A01", "Cluster: Ablehnung")),
        ],
    )
}

/// Converts and gates a table, panicking on any error.
#[allow(dead_code)]
pub fn convert_table(table: &EbdTable) -> EbdGraph {
    convert(table).expect("Failed to convert table")
}

#[allow(dead_code)]
pub fn kind_count(graph: &EbdGraph, kind: NodeKind) -> usize {
    graph.nodes_of_kind(kind).count()
}

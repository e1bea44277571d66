//! Tests for the DOT and PlantUML renderers.
mod common;
use common::*;
use ebd_graph::prelude::*;

const FONT: &str = "Roboto, sans-serif";

fn render_dot(table: &EbdTable, style: DotStyle) -> String {
    let graph = convert_table(table);
    let validated = Validated::check(&graph).expect("Failed to validate graph");
    DotRenderer::new(style).render(&validated)
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("'{}' not found in:\n{}", needle, haystack))
}

#[test]
fn test_dot_output_is_byte_identical_across_runs() {
    let graph = convert_table(&create_loop_table());
    let validated = Validated::check(&graph).expect("Failed to validate graph");
    let renderer = DotRenderer::default();

    let first = renderer.render(&validated);
    let second = renderer.render(&validated);
    assert_eq!(first, second);

    let rebuilt = convert_table(&create_loop_table());
    let revalidated = Validated::check(&rebuilt).expect("Failed to validate graph");
    assert_eq!(first, renderer.render(&revalidated));
}

#[test]
fn test_dot_header_and_footer() {
    let dot = render_dot(&create_loop_table(), DotStyle::default());

    assert!(dot.starts_with("digraph D {\n    labelloc=\"t\";\n"));
    assert!(dot.contains(
        r#"    label=<<B><FONT POINT-SIZE="18">7.1 AD: Anmeldung</FONT></B><BR align="left"/><BR/><B><FONT POINT-SIZE="16">7.1.1 E_0001_Anmeldung prüfen</FONT></B><BR align="left"/><BR/><BR/><BR/>>;"#
    ));
    assert!(dot.contains("    rankdir=TB;\n"));
    assert!(dot.ends_with("\n    bgcolor=\"transparent\";\n    fontname=\"Roboto, sans-serif\";\n}\n"));
}

#[test]
fn test_dot_node_declarations() {
    let dot = render_dot(&create_loop_table(), DotStyle::default());
    let lines: Vec<&str> = dot.lines().collect();

    let expected = [
        format!(
            r##"    "Start" [margin="0.2,0.12", shape=box, style="filled,rounded", penwidth=0.0, fillcolor="#8ba2d7", label=<<B>E_0001</B><BR align="left"/><FONT>Prüfende Rolle: <B>NB</B></FONT><BR align="center"/>>, fontname="{FONT}"];"##
        ),
        format!(
            r##"    "1" [margin="0.2,0.12", shape=box, style="filled,rounded", penwidth=0.0, fillcolor="#c2cee9", label=<<B>1: </B>check A<BR align="left"/>>, fontname="{FONT}"];"##
        ),
        format!(
            r##"    "E0001" [margin="0.2,0.12", shape=box, style="filled,rounded", penwidth=0.0, fillcolor="#c4cac1", label=<<B>E0001</B><BR align="left"/><BR align="left"/><FONT>no match<BR align="left"/></FONT>>, fontname="{FONT}"];"##
        ),
        format!(
            r##"    "msi_1" [margin="0.2,0.12", shape=note, style="filled", penwidth=0.0, fillcolor="#e6f3ff", label=<<FONT><I>applies from here</I></FONT><BR align="left"/>>, fontname="{FONT}"];"##
        ),
    ];
    for line in &expected {
        assert!(lines.contains(&line.as_str()), "missing line:\n{}\nin:\n{}", line, dot);
    }
}

#[test]
fn test_dot_orders_nodes_by_kind_and_step() {
    let table = EbdTable::new(
        create_metadata(),
        vec![
            TableRow::new(step("20"), "zwanzig")
                .with_outcome("ja", terminal("A02", ""))
                .with_outcome("nein", continue_at("3")),
            TableRow::new(step("3"), "drei")
                .with_outcome("ja", terminal("A01", ""))
                .with_outcome("nein", terminal("A02", "")),
        ],
    )
    .with_instruction(MultiStepInstruction::new(step("20"), "later"))
    .with_instruction(MultiStepInstruction::new(step("3"), "earlier"));
    let dot = render_dot(&table, DotStyle::default());

    let order = [
        "    \"Start\" [",
        "    \"3\" [",
        "    \"20\" [",
        "    \"A01\" [",
        "    \"A02\" [",
        "    \"msi_3\" [",
        "    \"msi_20\" [",
    ];
    let positions: Vec<usize> = order.iter().map(|n| position(&dot, n)).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "unexpected order:\n{}", dot);
}

#[test]
fn test_dot_edges_carry_labels_and_annotation_style() {
    let dot = render_dot(&create_loop_table(), DotStyle::default());

    let expected = [
        r##"    "Start" -> "1" [color="#88a0d6"];"##.to_string(),
        format!(r##"    "1" -> "2" [label=<<B>JA</B>>, color="#88a0d6", fontname="{FONT}"];"##),
        format!(r##"    "1" -> "E0001" [label=<<B>NEIN</B>>, color="#88a0d6", fontname="{FONT}"];"##),
        format!(r##"    "2" -> "E0002" [label=<<B>JA</B>>, color="#88a0d6", fontname="{FONT}"];"##),
        format!(r##"    "2" -> "1" [label=<<B>NEIN</B>>, color="#88a0d6", fontname="{FONT}"];"##),
        r##"    "msi_1" -> "1" [style=dashed, color="#888888", arrowhead=none, constraint=false];"##
            .to_string(),
    ];
    let positions: Vec<usize> = expected.iter().map(|e| position(&dot, e)).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "unexpected edge order:\n{}", dot);
}

#[test]
fn test_dot_pins_annotation_beside_its_anchor() {
    let dot = render_dot(&create_loop_table(), DotStyle::default());
    assert!(dot.contains("    { rank=same; \"msi_1\"; \"1\"; }\n"));
    assert!(!dot.contains("subgraph"));
}

#[test]
fn test_dot_clusters_group_steps_in_scope() {
    let dot = render_dot(&create_loop_table(), DotStyle::default().with_clusters(true));

    let cluster_start = position(&dot, "    subgraph \"cluster_msi_1\" {\n");
    let cluster = &dot[cluster_start..];
    let cluster = &cluster[..position(cluster, "\n    }\n")];

    assert!(cluster.contains("        style=\"dashed,rounded\";\n"));
    assert!(cluster.contains("        bgcolor=\"#f0f7ff\";\n"));
    assert!(cluster.contains("        penwidth=1.5;\n"));
    assert!(cluster.contains("        margin=16;\n"));
    assert!(cluster.contains("        \"msi_1\" ["));
    assert!(cluster.contains("        \"1\" ["));
    assert!(cluster.contains("        \"2\" ["));
    assert!(!cluster.contains("\"E0001\" ["));

    // Clustered nodes are declared once.
    assert_eq!(dot.matches("\"2\" [margin").count(), 1);
    assert!(!dot.contains("rank=same"));
}

#[test]
fn test_dot_wraps_and_escapes_long_descriptions() {
    let description = "Ist der Wert < 5 & liegt die Meldung vor dem Stichtag, der im Vertrag mit dem Netzbetreiber vereinbart wurde?";
    let table = EbdTable::new(
        create_metadata(),
        vec![
            TableRow::new(step("1"), description)
                .with_outcome("ja", terminal("A01", ""))
                .with_outcome("nein", terminal("A02", "")),
        ],
    );
    let dot = render_dot(&table, DotStyle::default().with_wrap_width(40));

    assert!(dot.contains(
        r#"<B>1: </B>Ist der Wert &lt; 5 &amp; liegt die Meldung<BR align="left"/>vor dem Stichtag, der im Vertrag mit<BR align="left"/>dem Netzbetreiber vereinbart wurde?<BR align="left"/>"#
    ));
}

#[test]
fn test_dot_quotes_starred_step_ids() {
    let table = EbdTable::new(
        create_metadata(),
        vec![
            TableRow::new(step("6"), "sechs")
                .with_outcome("ja", continue_at("6*"))
                .with_outcome("nein", terminal("A01", "")),
            TableRow::new(step("6*"), "sechs stern")
                .with_outcome("ja", terminal("A02", ""))
                .with_outcome("nein", terminal("A01", "")),
        ],
    );
    let dot = render_dot(&table, DotStyle::default());
    assert!(dot.contains(r#"    "6" -> "6*" [label=<<B>JA</B>>"#));
    assert!(position(&dot, "    \"6\" [") < position(&dot, "    \"6*\" ["));
}

#[test]
fn test_plantuml_output() {
    let graph = convert_table(&create_loop_table());
    let validated = Validated::check(&graph).expect("Failed to validate graph");
    let text = PlantUmlRenderer::default().render(&validated);

    let expected = "@startuml
title E_0001: Anmeldung prüfen

rectangle \"E_0001\" as start
rectangle \"1: check A\" as step_1
rectangle \"2: check B\" as step_2
rectangle \"E0001\\nno match\" as outcome_E0001
rectangle \"E0002\\nmatch\" as outcome_E0002

start --> step_1
step_1 --> step_2 : ja
step_1 --> outcome_E0001 : nein
step_2 --> outcome_E0002 : ja
step_2 --> step_1 : nein

note right of step_1
  applies from here
end note
@enduml
";
    assert_eq!(text, expected);
}

#[test]
fn test_plantuml_can_omit_annotations() {
    let graph = convert_table(&create_loop_table());
    let validated = Validated::check(&graph).expect("Failed to validate graph");
    let style = PlantUmlStyle {
        include_annotations: false,
        ..PlantUmlStyle::default()
    };
    let text = PlantUmlRenderer::new(style).render(&validated);

    assert!(!text.contains("note right of"));
    assert!(!text.contains("msi_1"));
}

#[test]
fn test_self_loop_renders_in_both_dialects() {
    let table = EbdTable::new(
        create_metadata(),
        vec![
            TableRow::new(step("1"), "retry until ready")
                .with_outcome("ja", terminal("A01", "ready"))
                .with_outcome("nein", continue_at("1")),
        ],
    );
    let graph = convert_table(&table);
    let validated = Validated::check(&graph).expect("loops are not fatal");

    let dot = DotRenderer::default().render(&validated);
    position(
        &dot,
        &format!(r##"    "1" -> "1" [label=<<B>NEIN</B>>, color="#88a0d6", fontname="{FONT}"];"##),
    );

    let text = PlantUmlRenderer::default().render(&validated);
    position(&text, "step_1 --> step_1 : nein\n");
}

/// Step 275 is a transition into 280; 280 collects A10 and ends, or ends with a remark.
fn create_transition_table() -> EbdTable {
    EbdTable::new(
        create_metadata(),
        vec![
            TableRow::new(step("275"), "Vollständige Adressprüfung")
                .with_transition(step("280"))
                .with_note("Aufnahme in die Trefferliste"),
            TableRow::new(step("280"), "Genau ein Treffer?")
                .with_outcome(
                    "ja",
                    CheckResult::Multi(vec![
                        Resolution::Terminal(Terminal::new("A10", "")),
                        Resolution::End,
                    ]),
                )
                .with_outcome(
                    "nein",
                    CheckResult::Terminal(Terminal::note_only("Keine Antwort")),
                ),
        ],
    )
}

#[test]
fn test_dot_transition_end_and_note_only_nodes() {
    let dot = render_dot(&create_transition_table(), DotStyle::default());
    let lines: Vec<&str> = dot.lines().collect();

    let expected = [
        format!(
            r##"    "275" [margin="0.2,0.12", shape=box, style="filled,rounded", penwidth=0.0, fillcolor="#c2cee9", label=<<B>275: </B>Vollständige Adressprüfung<BR align="left"/><FONT>Aufnahme in die Trefferliste<BR align="left"/></FONT>>, fontname="{FONT}"];"##
        ),
        format!(
            r##"    "Ende" [margin="0.2,0.12", shape=box, style="filled,rounded", penwidth=0.0, fillcolor="#8ba2d7", label=<Ende>, fontname="{FONT}"];"##
        ),
        format!(
            r##"    "Keine Antwort" [margin="0.2,0.12", shape=box, style="filled,rounded", penwidth=0.0, fillcolor="#c4cac1", label=<<FONT>Keine Antwort<BR align="left"/></FONT>>, fontname="{FONT}"];"##
        ),
        r##"    "275" -> "280" [color="#88a0d6"];"##.to_string(),
        format!(r##"    "280" -> "Ende" [label=<<B>JA</B>>, color="#88a0d6", fontname="{FONT}"];"##),
    ];
    for line in &expected {
        assert!(lines.contains(&line.as_str()), "missing line:\n{}\nin:\n{}", line, dot);
    }
}

#[test]
fn test_plantuml_transition_end_and_note_only_nodes() {
    let graph = convert_table(&create_transition_table());
    let validated = Validated::check(&graph).expect("Failed to validate graph");
    let text = PlantUmlRenderer::default().render(&validated);

    let expected = "@startuml
title E_0001: Anmeldung prüfen

rectangle \"E_0001\" as start
rectangle \"275: Vollständige Adressprüfung\\nAufnahme in die Trefferliste\" as step_275
rectangle \"280: Genau ein Treffer?\" as step_280
rectangle \"A10\" as outcome_A10
rectangle \"Ende\" as ende
rectangle \"Keine Antwort\" as note_5

start --> step_275
step_275 --> step_280
step_280 --> outcome_A10 : ja
step_280 --> ende : ja
step_280 --> note_5 : nein
@enduml
";
    assert_eq!(text, expected);
}

#[test]
fn test_table_without_rows_renders_its_remark() {
    let mut metadata = create_metadata();
    metadata.remark =
        Some("Derzeit ist für diese Prüfung kein Entscheidungsbaum notwendig.".to_string());
    let dot = render_dot(&EbdTable::new(metadata, vec![]), DotStyle::default());

    position(
        &dot,
        &format!(
            r##"    "Empty" [margin="0.2,0.12", shape=box, style="filled,rounded", penwidth=0.0, fillcolor="#7a8da1", label=<<B>E_0001</B><BR align="center"/><FONT>Derzeit ist für diese Prüfung kein Entscheidungsbaum notwendig.</FONT><BR align="center"/>>, fontname="{FONT}"];"##
        ),
    );
    assert!(!dot.contains(" -> "));

    let blank = render_dot(&EbdTable::new(create_metadata(), vec![]), DotStyle::default());
    assert!(blank.contains(r#"label=<<B>E_0001</B><BR align="center"/>>"#));
    assert!(!blank.contains("<FONT></FONT>"));
}

#[test]
fn test_outcome_colliding_with_a_step_is_declared_once_per_node() {
    let table = EbdTable::new(
        create_metadata(),
        vec![
            TableRow::new(step("1"), "check A")
                .with_outcome("ja", continue_at("2"))
                .with_outcome("nein", terminal("2", "")),
            TableRow::new(step("2"), "check B")
                .with_outcome("ja", terminal("A01", ""))
                .with_outcome("nein", terminal("A02", "")),
        ],
    );
    let dot = render_dot(&table, DotStyle::default());

    assert_eq!(dot.matches("    \"2\" [").count(), 1);
    assert_eq!(dot.matches("    \"outcome_2\" [").count(), 1);
    position(&dot, r##"    "1" -> "outcome_2" [label=<<B>NEIN</B>>"##);
}

#[test]
fn test_dialect_dispatch() {
    let graph = convert_table(&create_shared_outcome_table());
    let validated = Validated::check(&graph).expect("Failed to validate graph");

    assert!(render(&validated, Dialect::Dot).starts_with("digraph D {"));
    assert!(render(&validated, Dialect::PlantUml).starts_with("@startuml"));
    assert_eq!(Dialect::PlantUml.file_extension(), "puml");
}

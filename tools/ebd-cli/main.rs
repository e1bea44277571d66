use clap::{Parser, ValueEnum};
use ebd_graph::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

// --- JSON Deserialization Structs (Scraper Format) ---
// These structs match the JSON written by the table scraper and are only used here for
// conversion into the table model.

#[derive(Deserialize)]
struct ScrapedTable {
    metadata: ScrapedMetadata,
    rows: Vec<ScrapedRow>,
    #[serde(default)]
    multi_step_instructions: Vec<ScrapedInstruction>,
}

#[derive(Deserialize)]
struct ScrapedMetadata {
    ebd_code: String,
    #[serde(default)]
    chapter: String,
    #[serde(default)]
    sub_chapter: String,
    #[serde(default)]
    ebd_name: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    remark: Option<String>,
}

#[derive(Deserialize)]
struct ScrapedRow {
    step_number: String,
    description: String,
    sub_rows: Vec<ScrapedSubRow>,
}

#[derive(Deserialize)]
struct ScrapedSubRow {
    check_result: ScrapedCheckResult,
    result_code: Option<String>,
    note: Option<String>,
}

#[derive(Deserialize)]
struct ScrapedCheckResult {
    /// `None` marks a transition row that always continues at its subsequent step
    result: Option<bool>,
    subsequent_step_number: Option<String>,
}

/// Where a sub row continues: nowhere, at "Ende" or at another step.
enum Next {
    Stop,
    End,
    Step(StepNumber),
}

fn parse_next(raw: Option<String>) -> std::result::Result<Next, ParseError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(Next::Stop),
        Some("Ende") => Ok(Next::End),
        Some(step) => step.parse().map(Next::Step),
    }
}

#[derive(Deserialize)]
struct ScrapedInstruction {
    first_step_number_affected: String,
    instruction_text: String,
}

// --- Converter Implementation ---
// A sub row with both a result code and a subsequent step collects the code and continues.
// "Ende" as subsequent step is the shared end node.

impl IntoTable for ScrapedTable {
    fn into_table(self) -> std::result::Result<EbdTable, TableError> {
        let mut rows = Vec::with_capacity(self.rows.len());
        for raw_row in self.rows {
            let invalid = |message: String| TableError::InvalidRow {
                row: raw_row.step_number.clone(),
                message,
            };
            let step: StepNumber = raw_row
                .step_number
                .parse()
                .map_err(|e: ParseError| invalid(e.to_string()))?;

            let mut row = TableRow::new(step, raw_row.description);
            for sub_row in raw_row.sub_rows {
                let next = parse_next(sub_row.check_result.subsequent_step_number)
                    .map_err(|e| invalid(e.to_string()))?;
                let Some(answer) = sub_row.check_result.result else {
                    let Next::Step(next) = next else {
                        return Err(invalid(
                            "a transition must continue at another step".to_string(),
                        ));
                    };
                    row = row.with_transition(next);
                    if let Some(note) = sub_row.note.filter(|n| !n.trim().is_empty()) {
                        row = row.with_note(note);
                    }
                    continue;
                };
                let code = if answer { "ja" } else { "nein" };

                let terminal = match (sub_row.result_code, sub_row.note) {
                    (Some(end_code), note) => {
                        Some(Terminal::new(end_code, note.unwrap_or_default()))
                    }
                    (None, Some(note)) if matches!(next, Next::Stop) => {
                        Some(Terminal::note_only(note))
                    }
                    (None, _) => None,
                };

                let result = match (next, terminal) {
                    (Next::Step(next), Some(terminal)) => CheckResult::Multi(vec![
                        Resolution::Terminal(terminal),
                        Resolution::ContinueAt(next),
                    ]),
                    (Next::End, Some(terminal)) => CheckResult::Multi(vec![
                        Resolution::Terminal(terminal),
                        Resolution::End,
                    ]),
                    (Next::Step(next), None) => CheckResult::ContinueAt(next),
                    (Next::End, None) => CheckResult::End,
                    (Next::Stop, Some(terminal)) => CheckResult::Terminal(terminal),
                    (Next::Stop, None) => {
                        return Err(invalid(format!(
                            "outcome '{}' has neither a result code, a note nor a subsequent step",
                            code
                        )));
                    }
                };
                row = row.with_outcome(code, result);
            }
            rows.push(row);
        }

        let metadata = TableMetadata {
            ebd_code: self.metadata.ebd_code,
            chapter: self.metadata.chapter,
            section: self.metadata.sub_chapter,
            ebd_name: self.metadata.ebd_name,
            role: self.metadata.role,
            remark: self.metadata.remark,
        };
        let mut table = EbdTable::new(metadata, rows);
        for raw in self.multi_step_instructions {
            let anchor: StepNumber =
                raw.first_step_number_affected
                    .parse()
                    .map_err(|e: ParseError| TableError::InvalidRow {
                        row: raw.first_step_number_affected.clone(),
                        message: e.to_string(),
                    })?;
            table = table.with_instruction(MultiStepInstruction::new(anchor, raw.instruction_text));
        }
        Ok(table)
    }
}

/// Define CLI-specific enums for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum DialectCli {
    Dot,
    Plantuml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputFormat {
    /// The crate's own table JSON
    Table,
    /// The JSON written by the table scraper (rows with sub rows)
    Scraped,
}

/// Converts EBD decision tables into Graphviz or PlantUML diagrams
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the table JSON file
    table_path: PathBuf,

    /// The diagram dialect to emit
    #[arg(short, long, value_enum, default_value_t = DialectCli::Dot)]
    dialect: DialectCli,

    /// The layout of the input JSON
    #[arg(short, long, value_enum, default_value_t = InputFormat::Table)]
    format: InputFormat,

    /// Write the diagram to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Group multi-step instructions with the steps they apply to (dot only)
    #[arg(long)]
    clusters: bool,

    /// Maximum line length of node labels
    #[arg(long)]
    wrap_width: Option<usize>,

    /// Additional outcome codes accepted besides 'ja' and 'nein'
    #[arg(long = "outcome-code")]
    outcome_codes: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    run(cli);
}

fn run(cli: Cli) {
    let total_start = Instant::now();

    // --- 1. File Loading ---
    let json = fs::read_to_string(&cli.table_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read table file '{}': {}",
            cli.table_path.display(),
            e
        ))
    });

    // --- 2. Parsing ---
    let table = match cli.format {
        InputFormat::Table => EbdTable::from_json(&json)
            .unwrap_or_else(|e| exit_with_error(&e.to_string())),
        InputFormat::Scraped => {
            let scraped: ScrapedTable = serde_json::from_str(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse table JSON: {}", e)));
            scraped
                .into_table()
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to read scraped table: {}", e)))
        }
    };

    let mut vocabulary = Vocabulary::default();
    for code in &cli.outcome_codes {
        vocabulary = vocabulary.with_outcome_code(code.as_str());
    }

    // --- 3. Conversion ---
    let graph = Converter::builder(&table)
        .with_vocabulary(vocabulary)
        .build()
        .convert()
        .unwrap_or_else(|e| exit_with_error(&format!("Conversion failed: {}", e)));

    // --- 4. Validation ---
    let validated = Validated::check(&graph).unwrap_or_else(|e| {
        for finding in e.findings() {
            eprintln!("  {}", finding);
        }
        exit_with_error(&format!("Validation failed: {}", e))
    });
    if !validated.warnings().is_empty() {
        warn!(
            ebd = %graph.metadata().ebd_code,
            count = validated.warnings().len(),
            "graph contains loops"
        );
    }

    // --- 5. Rendering ---
    let diagram = match cli.dialect {
        DialectCli::Dot => {
            let mut style = DotStyle::default().with_clusters(cli.clusters);
            if let Some(width) = cli.wrap_width {
                style = style.with_wrap_width(width);
            }
            DotRenderer::new(style).render(&validated)
        }
        DialectCli::Plantuml => {
            let mut style = PlantUmlStyle::default();
            if let Some(width) = cli.wrap_width {
                style.wrap_width = width;
            }
            PlantUmlRenderer::new(style).render(&validated)
        }
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, &diagram).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to write '{}': {}", path.display(), e))
            });
            info!(path = %path.display(), "diagram written");
        }
        None => print!("{}", diagram),
    }

    info!(
        ebd = %graph.metadata().ebd_code,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        elapsed = ?total_start.elapsed(),
        "done"
    );
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}

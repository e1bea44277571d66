use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Number of a check step (the "Nr" column), e.g. `4` or `7*`.
///
/// Steps order numerically; a starred step sorts directly after its unstarred twin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StepNumber {
    number: u32,
    starred: bool,
}

impl StepNumber {
    pub fn new(number: u32) -> Result<Self, ParseError> {
        if number == 0 {
            return Err(ParseError::InvalidStepNumber(number.to_string()));
        }
        Ok(Self {
            number,
            starred: false,
        })
    }

    pub fn starred(number: u32) -> Result<Self, ParseError> {
        Self::new(number).map(|s| Self {
            starred: true,
            ..s
        })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn is_starred(&self) -> bool {
        self.starred
    }
}

impl FromStr for StepNumber {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidStepNumber(s.to_string());
        let (digits, starred) = match s.strip_suffix('*') {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let number: u32 = digits.parse().map_err(|_| invalid())?;
        if number == 0 {
            return Err(invalid());
        }
        Ok(Self { number, starred })
    }
}

impl TryFrom<String> for StepNumber {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StepNumber> for String {
    fn from(value: StepNumber) -> Self {
        value.to_string()
    }
}

impl fmt::Display for StepNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.starred {
            write!(f, "{}*", self.number)
        } else {
            write!(f, "{}", self.number)
        }
    }
}

/// Name used for the unconditional step of a transition row in error messages.
pub const TRANSITION: &str = "transition";

/// A check-result code such as `ja` or `nein`. Which codes are legal is decided by the
/// [`Vocabulary`](super::Vocabulary), not by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutcomeCode(String);

impl OutcomeCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OutcomeCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The leaf of a decision: an answer code plus its free-text explanation.
///
/// Some tables end a check with a remark only ("Keine Antwort, Bestellung wird
/// ausgeführt"); those terminals carry no end code and are identified by their label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Terminal {
    #[serde(default, alias = "result_code", skip_serializing_if = "Option::is_none")]
    pub end_code: Option<String>,
    #[serde(default, alias = "note")]
    pub label: String,
}

impl Terminal {
    pub fn new(end_code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            end_code: Some(end_code.into()),
            label: label.into(),
        }
    }

    /// A terminal without an answer code.
    pub fn note_only(label: impl Into<String>) -> Self {
        Self {
            end_code: None,
            label: label.into(),
        }
    }
}

/// One target of a check result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    ContinueAt(StepNumber),
    Terminal(Terminal),
    End,
}

/// What happens when a step yields a given outcome code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckResult {
    /// Proceed with another step, possibly an earlier one.
    ContinueAt(StepNumber),
    /// Stop with an answer code.
    Terminal(Terminal),
    /// The check is complete without an answer ("Ende").
    End,
    /// Several simultaneous results, e.g. an answer code that is collected while the
    /// check continues at a later step.
    Multi(Vec<Resolution>),
}

impl CheckResult {
    /// Flattens the result into the targets it resolves to, in declaration order.
    pub fn resolutions(&self) -> Vec<Resolution> {
        match self {
            CheckResult::ContinueAt(step) => vec![Resolution::ContinueAt(*step)],
            CheckResult::Terminal(terminal) => vec![Resolution::Terminal(terminal.clone())],
            CheckResult::End => vec![Resolution::End],
            CheckResult::Multi(resolutions) => resolutions.clone(),
        }
    }

    /// Number of graph edges this result produces.
    pub fn arity(&self) -> usize {
        match self {
            CheckResult::Multi(resolutions) => resolutions.len(),
            _ => 1,
        }
    }
}

/// A single row of the check table.
///
/// A row either branches on outcome codes or, as a transition step, performs its
/// description and always continues at `transition` ("Vollständige Adressprüfung").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub step_number: StepNumber,
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outcomes: BTreeMap<OutcomeCode, CheckResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<StepNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TableRow {
    pub fn new(step_number: StepNumber, description: impl Into<String>) -> Self {
        Self {
            step_number,
            description: description.into(),
            outcomes: BTreeMap::new(),
            transition: None,
            note: None,
        }
    }

    pub fn is_transition(&self) -> bool {
        self.transition.is_some()
    }

    pub fn with_transition(mut self, next: StepNumber) -> Self {
        self.transition = Some(next);
        self
    }

    pub fn with_outcome(mut self, code: impl Into<OutcomeCode>, result: CheckResult) -> Self {
        self.outcomes.insert(code.into(), result);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Free text that applies to every step from `anchor` onwards, either until `until`
/// or, when absent, until the next instruction (or the end of the table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiStepInstruction {
    #[serde(alias = "first_step_number_affected")]
    pub anchor: StepNumber,
    #[serde(alias = "instruction_text")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<StepNumber>,
}

impl MultiStepInstruction {
    pub fn new(anchor: StepNumber, text: impl Into<String>) -> Self {
        Self {
            anchor,
            text: text.into(),
            until: None,
        }
    }

    pub fn until(mut self, last_step: StepNumber) -> Self {
        self.until = Some(last_step);
        self
    }
}

/// Document metadata. The core never interprets it; it only ends up in diagram titles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub ebd_code: String,
    #[serde(default)]
    pub chapter: String,
    #[serde(default, alias = "sub_chapter")]
    pub section: String,
    #[serde(default)]
    pub ebd_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

/// A digitized EBD table: rows in document order plus the multi-step instructions.
///
/// Some EBDs are published without a table, only with a remark in the metadata; those
/// have no rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EbdTable {
    pub metadata: TableMetadata,
    pub rows: Vec<TableRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub multi_step_instructions: Vec<MultiStepInstruction>,
}

impl EbdTable {
    pub fn new(metadata: TableMetadata, rows: Vec<TableRow>) -> Self {
        Self {
            metadata,
            rows,
            multi_step_instructions: Vec::new(),
        }
    }

    pub fn with_instruction(mut self, instruction: MultiStepInstruction) -> Self {
        self.multi_step_instructions.push(instruction);
        self
    }

    /// Reads a table from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        serde_json::from_str(json).map_err(|e| ParseError::JsonParseError(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ParseError> {
        serde_json::to_string_pretty(self).map_err(|e| ParseError::JsonParseError(e.to_string()))
    }

    /// The row the decision process starts with: the first one in document order.
    pub fn first_row(&self) -> Option<&TableRow> {
        self.rows.first()
    }

    pub fn row(&self, step: StepNumber) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.step_number == step)
    }
}

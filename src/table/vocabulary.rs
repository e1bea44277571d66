use super::OutcomeCode;
use crate::error::ParseError;
use regex::Regex;

/// Outcome codes accepted when no custom vocabulary is configured.
pub const DEFAULT_OUTCOME_CODES: [&str; 2] = ["ja", "nein"];

/// Answer codes such as `A01`, `AC7` or `E0001`.
pub const DEFAULT_END_CODE_PATTERN: &str = r"^[A-Z]+\d+$";

/// The policy constants a table is checked against: which outcome codes a step may
/// branch on and which shape an answer code must have.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    outcome_codes: Vec<OutcomeCode>,
    end_code_pattern: Regex,
}

impl Vocabulary {
    pub fn new<I, S>(outcome_codes: I, end_code_pattern: &str) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            outcome_codes: outcome_codes
                .into_iter()
                .map(|c| OutcomeCode::new(c))
                .collect(),
            end_code_pattern: compile_pattern(end_code_pattern)?,
        })
    }

    /// Adds a code, e.g. a numeric check result `"1"`.
    pub fn with_outcome_code(mut self, code: impl Into<String>) -> Self {
        let code = OutcomeCode::new(code);
        if !self.outcome_codes.contains(&code) {
            self.outcome_codes.push(code);
        }
        self
    }

    pub fn with_end_code_pattern(mut self, pattern: &str) -> Result<Self, ParseError> {
        self.end_code_pattern = compile_pattern(pattern)?;
        Ok(self)
    }

    pub fn outcome_codes(&self) -> &[OutcomeCode] {
        &self.outcome_codes
    }

    pub fn knows(&self, code: &OutcomeCode) -> bool {
        self.outcome_codes.contains(code)
    }

    pub fn accepts_end_code(&self, end_code: &str) -> bool {
        self.end_code_pattern.is_match(end_code)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            outcome_codes: DEFAULT_OUTCOME_CODES.map(OutcomeCode::new).to_vec(),
            end_code_pattern: default_pattern().clone(),
        }
    }
}

fn default_pattern() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(DEFAULT_END_CODE_PATTERN).unwrap())
}

fn compile_pattern(pattern: &str) -> Result<Regex, ParseError> {
    Regex::new(pattern).map_err(|e| ParseError::InvalidEndCodePattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

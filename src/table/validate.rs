use super::{CheckResult, EbdTable, Resolution, StepNumber, TRANSITION, Terminal, Vocabulary};
use crate::error::TableError;
use ahash::AHashSet;

impl EbdTable {
    /// Checks the table invariants against a vocabulary and reports the first violation.
    ///
    /// Rows are checked in document order, outcomes in code order, instructions last. A
    /// table without rows is valid as long as it has no instructions.
    pub fn validate(&self, vocabulary: &Vocabulary) -> Result<(), TableError> {
        let mut steps: AHashSet<StepNumber> = AHashSet::with_capacity(self.rows.len());
        for row in &self.rows {
            if !steps.insert(row.step_number) {
                return Err(TableError::DuplicateStepNumber(row.step_number));
            }
        }

        for row in &self.rows {
            let step = row.step_number;
            if let Some(target) = row.transition {
                if !row.outcomes.is_empty() {
                    return Err(TableError::TransitionWithOutcomes(step));
                }
                if !steps.contains(&target) {
                    return Err(TableError::UnresolvedReference {
                        step,
                        outcome: TRANSITION.to_string(),
                        target,
                    });
                }
                continue;
            }
            if row.outcomes.is_empty() {
                return Err(TableError::NoOutcomes(step));
            }
            for (code, result) in &row.outcomes {
                if !vocabulary.knows(code) {
                    return Err(TableError::UnknownOutcomeCode {
                        step,
                        code: code.to_string(),
                    });
                }
                if let CheckResult::Multi(resolutions) = result {
                    if resolutions.len() < 2 {
                        return Err(TableError::DegenerateMultiResult {
                            step,
                            outcome: code.to_string(),
                        });
                    }
                }
                for resolution in result.resolutions() {
                    match resolution {
                        Resolution::ContinueAt(target) if !steps.contains(&target) => {
                            return Err(TableError::UnresolvedReference {
                                step,
                                outcome: code.to_string(),
                                target,
                            });
                        }
                        Resolution::Terminal(Terminal {
                            end_code: Some(end_code),
                            ..
                        }) if !vocabulary.accepts_end_code(&end_code) => {
                            return Err(TableError::InvalidEndCode { step, end_code });
                        }
                        Resolution::Terminal(Terminal {
                            end_code: None,
                            label,
                        }) if label.trim().is_empty() => {
                            return Err(TableError::EmptyTerminal {
                                step,
                                outcome: code.to_string(),
                            });
                        }
                        _ => {}
                    }
                }
            }
        }

        let mut anchors: AHashSet<StepNumber> = AHashSet::new();
        for instruction in &self.multi_step_instructions {
            if !steps.contains(&instruction.anchor) {
                return Err(TableError::DanglingAnnotation(instruction.anchor));
            }
            if !anchors.insert(instruction.anchor) {
                return Err(TableError::DuplicateAnnotation(instruction.anchor));
            }
            if let Some(until) = instruction.until {
                if until < instruction.anchor || !steps.contains(&until) {
                    return Err(TableError::InvalidInstructionEnd {
                        anchor: instruction.anchor,
                        until,
                    });
                }
            }
        }

        Ok(())
    }
}

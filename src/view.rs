use serde::Serialize;

use crate::calc::{MarksRecord, SessionResult};
use crate::catalog::Subject;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputView {
    pub id: String,
    pub placeholder: String,
    pub min: u32,
    pub max: u32,
    pub value: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRowView {
    pub subject_key: String,
    pub label: String,
    pub cie: InputView,
    pub sem: InputView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub display_name: String,
    pub rows: Vec<SubjectRowView>,
}

impl FormView {
    /// Values currently pre-filled, `(cie, sem)` per subject key.
    #[allow(dead_code)]
    pub fn prefill(&self) -> Vec<(&str, Option<u32>, Option<u32>)> {
        self.rows
            .iter()
            .map(|r| (r.subject_key.as_str(), r.cie.value, r.sem.value))
            .collect()
    }
}

pub fn render_form(
    display_name: &str,
    subjects: &[Subject],
    record: Option<&MarksRecord>,
) -> FormView {
    let rows = subjects
        .iter()
        .map(|s| {
            let stored = record.and_then(|r| r.get(s.key));
            SubjectRowView {
                subject_key: s.key.to_string(),
                label: s.name.to_string(),
                cie: InputView {
                    id: format!("{}-cie", s.key),
                    placeholder: s.cie_hint(),
                    min: 0,
                    max: s.cie_max,
                    value: stored.map(|e| e.cie),
                },
                sem: InputView {
                    id: format!("{}-sem", s.key),
                    placeholder: s.sem_hint(),
                    min: 0,
                    max: s.sem_max,
                    value: stored.map(|e| e.sem),
                },
            }
        })
        .collect();
    FormView {
        display_name: display_name.to_string(),
        rows,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    pub display_name: String,
    pub sgpa: f64,
    pub text: String,
}

pub fn render_result(display_name: &str, result: &SessionResult) -> ResultView {
    ResultView {
        display_name: display_name.to_string(),
        sgpa: result.sgpa,
        text: result.sgpa_text(),
    }
}

pub const NO_BREAKDOWN: &str = "No breakdown data available. Please calculate SGPA first.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownLine {
    pub subject_name: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownView {
    pub lines: Vec<BreakdownLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

pub fn render_breakdown(result: Option<&SessionResult>) -> BreakdownView {
    let Some(result) = result.filter(|r| !r.breakdown.is_empty()) else {
        return BreakdownView {
            lines: Vec::new(),
            empty_message: Some(NO_BREAKDOWN.to_string()),
        };
    };
    let lines = result
        .breakdown
        .iter()
        .map(|b| BreakdownLine {
            subject_name: b.subject_name.clone(),
            text: format!(
                "CIE: {}, Sem: {} (Total: {:.1}), Converted: {} x Credit {}",
                b.cie, b.sem, b.total, b.converted_score, b.credit
            ),
        })
        .collect();
    BreakdownView {
        lines,
        empty_message: None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionsView {
    pub title: String,
    pub steps: Vec<String>,
}

pub fn render_instructions(subjects: &[Subject]) -> InstructionsView {
    let mut steps = vec!["Enter your CIE marks (0-50) for every subject.".to_string()];
    let fifty: Vec<&str> = subjects
        .iter()
        .filter(|s| s.sem_out_of_fifty())
        .map(|s| s.name)
        .collect();
    steps.push(format!(
        "Enter End Sem marks out of 100, except {} which are out of 50.",
        fifty.join(", ")
    ));
    steps.push(
        "End Sem marks out of 100 are halved and added to CIE, giving a total out of 100."
            .to_string(),
    );
    steps.push(
        "Each total is converted to a 10-point score: below 10 scores 1, below 20 scores 2, and so on; 90 and above scores 10."
            .to_string(),
    );
    steps.push("SGPA is the credit-weighted average of the converted scores.".to_string());
    InstructionsView {
        title: "How to use the SGPA calculator".to_string(),
        steps,
    }
}

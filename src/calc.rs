use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::Subject;

/// Half-up 1-decimal rounding used for displayed totals:
/// `floor(10x + 0.5) / 10`
pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkEntry {
    pub subject_key: String,
    pub cie: u32,
    pub sem: u32,
}

/// Keyed by subject key.
pub type MarksRecord = BTreeMap<String, MarkEntry>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectBreakdown {
    pub subject_key: String,
    pub subject_name: String,
    pub cie: u32,
    pub sem: u32,
    pub total: f64,
    pub converted_score: u8,
    pub credit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub sgpa: f64,
    /// Catalog order.
    pub breakdown: Vec<SubjectBreakdown>,
}

impl SessionResult {
    #[allow(dead_code)]
    pub fn by_name(&self, subject_name: &str) -> Option<&SubjectBreakdown> {
        self.breakdown.iter().find(|b| b.subject_name == subject_name)
    }

    pub fn sgpa_text(&self) -> String {
        format!("Your SGPA is: {:.2}", self.sgpa)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalcError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CalcError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }
}

impl std::fmt::Display for CalcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CalcError {}

/// Ten-point score for a 0-100 total. Compares the raw total against the
/// decile thresholds, so 44.5 scores 5 and 89.9 scores 9.
pub fn mark_to_score(total: f64) -> u8 {
    if total == 0.0 {
        return 0;
    }
    for k in 1..=9u8 {
        if total < f64::from(k) * 10.0 {
            return k;
        }
    }
    10
}

/// Normalizes both components onto a 0-100 scale.
pub fn subject_total(subject: &Subject, cie: u32, sem: u32) -> f64 {
    if subject.sem_out_of_fifty() {
        f64::from(cie) + f64::from(sem)
    } else {
        f64::from(cie) + f64::from(sem) / 2.0
    }
}

pub fn compute_sgpa(
    record: &MarksRecord,
    subjects: &[Subject],
) -> Result<SessionResult, CalcError> {
    let mut weighted: u64 = 0;
    let mut credits: u64 = 0;
    let mut breakdown = Vec::with_capacity(subjects.len());

    for subject in subjects {
        let Some(entry) = record.get(subject.key) else {
            let mut e = CalcError::new(
                "missing_entry",
                format!("no marks recorded for {}", subject.name),
            );
            e.details = Some(serde_json::json!({ "subjectKey": subject.key }));
            return Err(e);
        };
        let total = subject_total(subject, entry.cie, entry.sem);
        let converted_score = mark_to_score(total);

        weighted += u64::from(converted_score) * u64::from(subject.credit);
        credits += u64::from(subject.credit);

        breakdown.push(SubjectBreakdown {
            subject_key: subject.key.to_string(),
            subject_name: subject.name.to_string(),
            cie: entry.cie,
            sem: entry.sem,
            total: round_off_1_decimal(total),
            converted_score,
            credit: subject.credit,
        });
    }

    let sgpa = if credits > 0 {
        weighted as f64 / credits as f64
    } else {
        0.0
    };

    Ok(SessionResult { sgpa, breakdown })
}

use serde_json::Value;
use thiserror::Error;

use crate::calc::{MarkEntry, MarksRecord};
use crate::catalog::Subject;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Cie,
    Sem,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Cie => "cie",
            Field::Sem => "sem",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Reason {
    #[error("value is missing")]
    Missing,
    #[error("value is not a whole number")]
    NotInteger,
    #[error("value must not be negative")]
    Negative,
    #[error("value must not exceed {max}")]
    AboveMax { max: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{subject_key}.{}: {reason}", .field.as_str())]
pub struct ValidationError {
    pub subject_key: String,
    pub field: Field,
    pub reason: Reason,
}

impl ValidationError {
    pub fn to_json(&self, subject: &Subject) -> Value {
        serde_json::json!({
            "subjectKey": self.subject_key,
            "subjectName": subject.name,
            "field": self.field.as_str(),
            "reason": self.reason.to_string(),
            "expected": {
                "cie": format!("0-{}", subject.cie_max),
                "sem": format!("0-{}", subject.sem_max),
            },
        })
    }
}

/// Raw input arrives as JSON integers or integer strings.
fn parse_raw(raw: Option<&Value>) -> Result<i64, Reason> {
    match raw {
        None | Some(Value::Null) => Err(Reason::Missing),
        Some(Value::Number(n)) => n.as_i64().ok_or(Reason::NotInteger),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Err(Reason::Missing);
            }
            s.parse::<i64>().map_err(|_| Reason::NotInteger)
        }
        Some(_) => Err(Reason::NotInteger),
    }
}

fn check_range(raw: Option<&Value>, max: u32) -> Result<u32, Reason> {
    let v = parse_raw(raw)?;
    if v < 0 {
        return Err(Reason::Negative);
    }
    if v > i64::from(max) {
        return Err(Reason::AboveMax { max });
    }
    u32::try_from(v).map_err(|_| Reason::AboveMax { max })
}

pub fn validate_marks(
    subject: &Subject,
    raw_cie: Option<&Value>,
    raw_sem: Option<&Value>,
) -> Result<MarkEntry, ValidationError> {
    let fail = |field, reason| ValidationError {
        subject_key: subject.key.to_string(),
        field,
        reason,
    };
    let cie = check_range(raw_cie, subject.cie_max).map_err(|r| fail(Field::Cie, r))?;
    let sem = check_range(raw_sem, subject.sem_max).map_err(|r| fail(Field::Sem, r))?;
    Ok(MarkEntry {
        subject_key: subject.key.to_string(),
        cie,
        sem,
    })
}

/// Validates every subject in `subjects` against `raw` (`{key: {cie, sem}}`).
/// Returns the complete record only if all of them pass; otherwise one error
/// per failing subject.
pub fn validate_submission(
    subjects: &[Subject],
    raw: &Value,
) -> Result<MarksRecord, Vec<ValidationError>> {
    let mut record = MarksRecord::new();
    let mut errors = Vec::new();

    for subject in subjects {
        let pair = raw.get(subject.key);
        let cie = pair.and_then(|p| p.get("cie"));
        let sem = pair.and_then(|p| p.get("sem"));
        match validate_marks(subject, cie, sem) {
            Ok(entry) => {
                record.insert(subject.key.to_string(), entry);
            }
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(record)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{self, SUBJECTS};
    use serde_json::json;

    fn subject(key: &str) -> &'static Subject {
        catalog::find(key).expect("known subject")
    }

    #[test]
    fn accepts_integers_and_integer_strings() {
        let e = validate_marks(subject("math"), Some(&json!(45)), Some(&json!(" 80 ")))
            .expect("valid");
        assert_eq!((e.cie, e.sem), (45, 80));
        assert_eq!(e.subject_key, "math");
    }

    #[test]
    fn rejects_cie_above_fifty_everywhere() {
        for s in SUBJECTS.iter() {
            let e = validate_marks(s, Some(&json!(51)), Some(&json!(0))).expect_err("cie 51");
            assert_eq!(e.field, Field::Cie);
            assert_eq!(e.reason, Reason::AboveMax { max: 50 });
        }
    }

    #[test]
    fn sem_limit_depends_on_subject() {
        let e = validate_marks(subject("eng"), Some(&json!(10)), Some(&json!(60)))
            .expect_err("sem 60 on eng");
        assert_eq!(e.field, Field::Sem);
        assert_eq!(e.reason, Reason::AboveMax { max: 50 });

        assert!(validate_marks(subject("chem"), Some(&json!(10)), Some(&json!(60))).is_ok());
        assert!(validate_marks(subject("chem"), Some(&json!(10)), Some(&json!(101))).is_err());
    }

    #[test]
    fn rejects_missing_negative_and_non_integers() {
        let s = subject("plc");
        let reason = |cie: Option<&Value>| {
            validate_marks(s, cie, Some(&json!(1)))
                .expect_err("invalid")
                .reason
        };
        assert_eq!(reason(None), Reason::Missing);
        assert_eq!(reason(Some(&json!(null))), Reason::Missing);
        assert_eq!(reason(Some(&json!("  "))), Reason::Missing);
        assert_eq!(reason(Some(&json!("abc"))), Reason::NotInteger);
        assert_eq!(reason(Some(&json!(12.5))), Reason::NotInteger);
        assert_eq!(reason(Some(&json!(true))), Reason::NotInteger);
        assert_eq!(reason(Some(&json!(-1))), Reason::Negative);
    }

    #[test]
    fn submission_collects_every_failing_subject() {
        let mut raw = json!({});
        for s in SUBJECTS.iter() {
            raw[s.key] = json!({ "cie": 20, "sem": 20 });
        }
        raw["caed"] = json!({ "cie": 70, "sem": 20 });
        raw["ico"] = json!({ "cie": 20, "sem": 55 });

        let errors = validate_submission(&SUBJECTS, &raw).expect_err("two failures");
        let keys: Vec<&str> = errors.iter().map(|e| e.subject_key.as_str()).collect();
        assert_eq!(keys, vec!["caed", "ico"]);
        assert_eq!(errors[1].to_string(), "ico.sem: value must not exceed 50");

        let details = errors[1].to_json(subject("ico"));
        assert_eq!(details["expected"]["sem"], json!("0-50"));
    }

    #[test]
    fn submission_returns_full_record() {
        let mut raw = json!({});
        for s in SUBJECTS.iter() {
            raw[s.key] = json!({ "cie": "50", "sem": s.sem_max });
        }
        let record = validate_submission(&SUBJECTS, &raw).expect("valid");
        assert_eq!(record.len(), SUBJECTS.len());
        assert_eq!(record["sfh"].sem, 50);
    }

    #[test]
    fn missing_subject_block_fails_that_subject() {
        let errors = validate_submission(&SUBJECTS, &json!({})).expect_err("all missing");
        assert_eq!(errors.len(), SUBJECTS.len());
        assert!(errors.iter().all(|e| e.reason == Reason::Missing));
    }
}

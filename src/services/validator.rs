use std::fmt;

/// A single declarative constraint on a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// The field must be present and non-empty.
    Required,
    /// Character length must fall within the inclusive range.
    Length { min: usize, max: usize },
}

/// One field of a record together with its declared constraints,
/// evaluated in declaration order.
pub struct FieldSpec<'a> {
    pub name: &'static str,
    pub value: &'a str,
    pub constraints: Vec<Constraint>,
}

/// A single (field, reason) pair describing why a record failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub reason: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

/// Carries the full, ordered list of violations, not just the first.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl std::error::Error for ValidationError {}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

/// Check every field against its constraints.
///
/// Fields are evaluated in slice order and every violation is collected, so
/// the caller can report all problems in one response. Length constraints are
/// skipped for absent values; `Required` already covers those.
pub fn validate(fields: &[FieldSpec<'_>]) -> Result<(), ValidationError> {
    let mut violations = Vec::new();

    for field in fields {
        for constraint in &field.constraints {
            match *constraint {
                Constraint::Required => {
                    if field.value.is_empty() {
                        violations.push(Violation {
                            field: field.name,
                            reason: "is required".to_string(),
                        });
                    }
                }
                Constraint::Length { min, max } => {
                    if field.value.is_empty() {
                        continue;
                    }
                    // Count chars, not bytes, so multibyte titles are not
                    // rejected early.
                    let len = field.value.chars().count();
                    if len < min {
                        violations.push(Violation {
                            field: field.name,
                            reason: format!("must be at least {min} characters long"),
                        });
                    } else if len > max {
                        violations.push(Violation {
                            field: field.name,
                            reason: format!("must be at most {max} characters long"),
                        });
                    }
                }
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(value: &str) -> FieldSpec<'_> {
        FieldSpec {
            name: "Title",
            value,
            constraints: vec![Constraint::Required, Constraint::Length { min: 3, max: 5 }],
        }
    }

    fn article(value: &str) -> FieldSpec<'_> {
        FieldSpec {
            name: "Article",
            value,
            constraints: vec![Constraint::Required],
        }
    }

    #[test]
    fn accepts_values_within_bounds() {
        assert!(validate(&[title("abc"), article("ok")]).is_ok());
        assert!(validate(&[title("abcde"), article("ok")]).is_ok());
    }

    #[test]
    fn rejects_short_title() {
        let err = validate(&[title("ab"), article("ok")]).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, "Title");
        assert!(err.violations[0].reason.contains("at least 3"));
    }

    #[test]
    fn rejects_long_title() {
        let err = validate(&[title("abcdef"), article("ok")]).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert!(err.violations[0].reason.contains("at most 5"));
    }

    #[test]
    fn required_wins_over_length_for_empty_values() {
        let err = validate(&[title(""), article("ok")]).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].reason, "is required");
    }

    #[test]
    fn collects_all_violations_in_field_order() {
        let err = validate(&[title("x"), article("")]).unwrap_err();
        let fields: Vec<_> = err.violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["Title", "Article"]);
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        // Four chars, twelve bytes
        assert!(validate(&[title("日本語字")]).is_ok());
    }

    #[test]
    fn message_concatenates_violations() {
        let err = validate(&[title(""), article("")]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Title is required"));
        assert!(msg.contains("Article is required"));
        assert!(msg.contains("; "));
    }
}

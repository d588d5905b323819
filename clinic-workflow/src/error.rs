use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Who a prescription is for: a registered student or a walk-in identified
/// only by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientRef {
    Student(i64),
    Other(String),
}

impl PatientRef {
    /// Resolve the student-id / other-name pair supplied at creation.
    ///
    /// Policy: exactly one of the two must be present. Both-unset and
    /// both-set are rejected rather than guessed at.
    pub fn resolve(student_id: Option<i64>, other_name: Option<&str>) -> WorkflowResult<Self> {
        let other_name = other_name.map(str::trim).filter(|n| !n.is_empty());
        match (student_id, other_name) {
            (Some(id), None) => Ok(Self::Student(id)),
            (None, Some(name)) => Ok(Self::Other(name.to_string())),
            (Some(_), Some(_)) => Err(WorkflowError::Validation(
                "Provide either a student reference or an other-patient name, not both".into(),
            )),
            (None, None) => Err(WorkflowError::Validation(
                "A prescription needs a student reference or an other-patient name".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_reference_alone_is_accepted() {
        assert_eq!(PatientRef::resolve(Some(7), None).unwrap(), PatientRef::Student(7));
    }

    #[test]
    fn other_name_alone_is_accepted() {
        assert_eq!(
            PatientRef::resolve(None, Some("  Visiting Parent ")).unwrap(),
            PatientRef::Other("Visiting Parent".into())
        );
    }

    #[test]
    fn both_set_is_rejected() {
        assert!(PatientRef::resolve(Some(7), Some("Someone")).is_err());
    }

    #[test]
    fn neither_set_is_rejected() {
        assert!(PatientRef::resolve(None, None).is_err());
        // Whitespace-only other_name counts as unset.
        assert!(PatientRef::resolve(None, Some("   ")).is_err());
    }
}

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::SubjectId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubjectError {
    #[error("subject name cannot be empty")]
    EmptyName,
}

//
// ─── SUBJECT ───────────────────────────────────────────────────────────────────
//

/// A quiz subject owning a bank of questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    id: SubjectId,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl Subject {
    /// Creates a new Subject.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::EmptyName` if name is empty or whitespace-only.
    pub fn new(
        id: SubjectId,
        name: impl Into<String>,
        description: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SubjectError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SubjectError::EmptyName);
        }

        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        Ok(Self {
            id,
            name: name.trim().to_owned(),
            description,
            created_at,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> SubjectId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn subject_new_rejects_empty_name() {
        let err = Subject::new(SubjectId::new(1), "   ", None, fixed_now()).unwrap_err();
        assert_eq!(err, SubjectError::EmptyName);
    }

    #[test]
    fn subject_new_happy_path() {
        let subject = Subject::new(
            SubjectId::new(10),
            "History",
            Some("ancient to modern".into()),
            fixed_now(),
        )
        .unwrap();

        assert_eq!(subject.id(), SubjectId::new(10));
        assert_eq!(subject.name(), "History");
        assert_eq!(subject.description(), Some("ancient to modern"));
    }

    #[test]
    fn subject_trims_name_and_description() {
        let subject = Subject::new(
            SubjectId::new(1),
            "  Geography  ",
            Some("  capitals  ".into()),
            fixed_now(),
        )
        .unwrap();

        assert_eq!(subject.name(), "Geography");
        assert_eq!(subject.description(), Some("capitals"));
    }

    #[test]
    fn subject_filters_empty_description() {
        let subject = Subject::new(SubjectId::new(1), "Math", Some("   ".into()), fixed_now())
            .unwrap();
        assert_eq!(subject.description(), None);
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Patient record as stored and as returned to API callers
#[derive(Deserialize, Serialize, sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    /// Server assigned identifier. Never reused, even after the record is deleted.
    pub(crate) id: i64,
    /// Full name of the patient
    pub(crate) emri: String,
    /// Contact phone number
    pub(crate) nr_cel: String,
    pub(crate) email: String,
    /// Name of the treating doctor
    pub(crate) mjeku: String,
    /// Price of the services. Kept as free text.
    pub(crate) cmimi: String,
    /// Services provided to the patient
    pub(crate) sherbimet: String,
    /// Creation timestamp, the only sort key for listings
    pub(crate) data: Option<DateTime<Utc>>,
}

impl Patient {
    /// Create a new [Patient] record from validated `fields`
    pub(crate) fn from_fields(id: i64, fields: &PatientFields, data: DateTime<Utc>) -> Self {
        let PatientFields {
            emri,
            nr_cel,
            email,
            mjeku,
            cmimi,
            sherbimet,
        } = fields.clone();
        Self {
            id,
            emri,
            nr_cel,
            email,
            mjeku,
            cmimi,
            sherbimet,
            data: Some(data),
        }
    }

    /// Replace every mutable field with the validated `fields`. The id and creation timestamp are
    /// left untouched.
    pub(crate) fn apply(&mut self, fields: &PatientFields) {
        self.emri = fields.emri.clone();
        self.nr_cel = fields.nr_cel.clone();
        self.email = fields.email.clone();
        self.mjeku = fields.mjeku.clone();
        self.cmimi = fields.cmimi.clone();
        self.sherbimet = fields.sherbimet.clone();
    }

    pub const fn id(&self) -> i64 {
        self.id
    }
}

/// Normalized set of user editable patient fields. Only produced by
/// [PatientValidator][crate::validation::PatientValidator] so every instance has passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientFields {
    pub(crate) emri: String,
    pub(crate) nr_cel: String,
    pub(crate) email: String,
    pub(crate) mjeku: String,
    pub(crate) cmimi: String,
    pub(crate) sherbimet: String,
}

use common::error::KlResult;

use crate::data::patient::{Patient, PatientFields};

/// Persistence of [Patient] records keyed by their integer id
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PatientRepository: Send + Sync {
    /// Store a new patient, assigning the id and creation timestamp
    async fn create(&self, fields: &PatientFields) -> KlResult<Patient>;
    /// Fetch the patient with the `id` specified, if any
    async fn read_one(&self, id: i64) -> KlResult<Option<Patient>>;
    /// Fetch every patient, newest first
    async fn read_all(&self) -> KlResult<Vec<Patient>>;
    /// Replace the editable fields of the patient with the `id` specified. Returns [None] if the
    /// patient does not exist.
    async fn update(&self, id: i64, fields: &PatientFields) -> KlResult<Option<Patient>>;
    /// Remove the patient with the `id` specified. Returns false if nothing was removed.
    async fn delete(&self, id: i64) -> KlResult<bool>;
}

use std::collections::BTreeMap;

use chrono::Utc;
use common::error::KlResult;
use tokio::sync::RwLock;

use crate::{
    data::patient::{Patient, PatientFields},
    service::patients::PatientRepository,
};

#[derive(Default)]
struct PatientTable {
    /// Last id handed out. Ids are never reused.
    last_id: i64,
    rows: BTreeMap<i64, Patient>,
}

/// In memory implementation of [PatientRepository]
#[derive(Default)]
pub struct MemoryPatientService {
    table: RwLock<PatientTable>,
}

#[async_trait::async_trait]
impl PatientRepository for MemoryPatientService {
    async fn create(&self, fields: &PatientFields) -> KlResult<Patient> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let patient = Patient::from_fields(table.last_id, fields, Utc::now());
        table.rows.insert(patient.id, patient.clone());
        Ok(patient)
    }

    async fn read_one(&self, id: i64) -> KlResult<Option<Patient>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn read_all(&self) -> KlResult<Vec<Patient>> {
        let mut patients: Vec<Patient> = self.table.read().await.rows.values().cloned().collect();
        patients.sort_by(|left, right| right.data.cmp(&left.data).then(right.id.cmp(&left.id)));
        Ok(patients)
    }

    async fn update(&self, id: i64, fields: &PatientFields) -> KlResult<Option<Patient>> {
        let mut table = self.table.write().await;
        let Some(patient) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        patient.apply(fields);
        Ok(Some(patient.clone()))
    }

    async fn delete(&self, id: i64) -> KlResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}

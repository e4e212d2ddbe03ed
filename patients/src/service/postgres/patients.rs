use common::error::KlResult;
use sqlx::PgPool;

use crate::{
    data::patient::{Patient, PatientFields},
    service::patients::PatientRepository,
};

/// Postgresql implementation of [PatientRepository]
#[derive(Clone)]
pub struct PgPatientService {
    /// Postgres database connection pool used by this service
    pool: PgPool,
}

impl PgPatientService {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }
}

#[async_trait::async_trait]
impl PatientRepository for PgPatientService {
    async fn create(&self, fields: &PatientFields) -> KlResult<Patient> {
        let patient = sqlx::query_as(
            r#"
            insert into klinika.patients(emri, nr_cel, email, mjeku, cmimi, sherbimet, data)
            values($1, $2, $3, $4, $5, $6, now())
            returning id, emri, nr_cel, email, mjeku, cmimi, sherbimet, data"#,
        )
        .bind(&fields.emri)
        .bind(&fields.nr_cel)
        .bind(&fields.email)
        .bind(&fields.mjeku)
        .bind(&fields.cmimi)
        .bind(&fields.sherbimet)
        .fetch_one(&self.pool)
        .await?;
        Ok(patient)
    }

    async fn read_one(&self, id: i64) -> KlResult<Option<Patient>> {
        let patient = sqlx::query_as(
            r#"
            select p.id, p.emri, p.nr_cel, p.email, p.mjeku, p.cmimi, p.sherbimet, p.data
            from klinika.patients p
            where p.id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(patient)
    }

    async fn read_all(&self) -> KlResult<Vec<Patient>> {
        let patients = sqlx::query_as(
            r#"
            select p.id, p.emri, p.nr_cel, p.email, p.mjeku, p.cmimi, p.sherbimet, p.data
            from klinika.patients p
            order by p.data desc nulls last, p.id desc"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(patients)
    }

    async fn update(&self, id: i64, fields: &PatientFields) -> KlResult<Option<Patient>> {
        let patient = sqlx::query_as(
            r#"
            update klinika.patients
            set emri = $2, nr_cel = $3, email = $4, mjeku = $5, cmimi = $6, sherbimet = $7
            where id = $1
            returning id, emri, nr_cel, email, mjeku, cmimi, sherbimet, data"#,
        )
        .bind(id)
        .bind(&fields.emri)
        .bind(&fields.nr_cel)
        .bind(&fields.email)
        .bind(&fields.mjeku)
        .bind(&fields.cmimi)
        .bind(&fields.sherbimet)
        .fetch_optional(&self.pool)
        .await?;
        Ok(patient)
    }

    async fn delete(&self, id: i64) -> KlResult<bool> {
        let result = sqlx::query("delete from klinika.patients where id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod test {
    use common::error::KlResult;
    use rstest::rstest;
    use sqlx::PgPool;

    use super::PgPatientService;
    use crate::{
        data::patient::PatientFields,
        service::{patients::PatientRepository, postgres::test::database},
    };

    fn patient_fields(emri: &str) -> PatientFields {
        PatientFields {
            emri: emri.to_owned(),
            nr_cel: "+355123456".to_owned(),
            email: "john@example.com".to_owned(),
            mjeku: "Dr. House".to_owned(),
            cmimi: "100".to_owned(),
            sherbimet: "Consultation".to_owned(),
        }
    }

    #[rstest]
    #[ignore = "requires the klinika test database"]
    #[tokio::test]
    async fn create_should_assign_id_and_timestamp(database: PgPool) -> KlResult<()> {
        let service = PgPatientService::new(&database);

        let patient = service.create(&patient_fields("Pg Create")).await?;
        let fetched = service.read_one(patient.id).await?;
        service.delete(patient.id).await?;

        assert!(patient.data.is_some(), "Created patient should have a timestamp");
        assert_eq!(fetched, Some(patient));
        Ok(())
    }

    #[rstest]
    #[ignore = "requires the klinika test database"]
    #[tokio::test]
    async fn update_should_keep_id_and_timestamp(database: PgPool) -> KlResult<()> {
        let service = PgPatientService::new(&database);
        let patient = service.create(&patient_fields("Pg Update")).await?;

        let updated = service
            .update(patient.id, &patient_fields("Pg Updated"))
            .await?
            .expect("Patient should exist");
        service.delete(patient.id).await?;

        assert_eq!(updated.id, patient.id);
        assert_eq!(updated.data, patient.data);
        assert_eq!(updated.emri, "Pg Updated");
        Ok(())
    }

    #[rstest]
    #[ignore = "requires the klinika test database"]
    #[tokio::test]
    async fn delete_should_report_missing_record(database: PgPool) -> KlResult<()> {
        let service = PgPatientService::new(&database);
        let patient = service.create(&patient_fields("Pg Delete")).await?;

        assert!(service.delete(patient.id).await?);
        assert!(!service.delete(patient.id).await?);
        assert_eq!(service.read_one(patient.id).await?, None);
        Ok(())
    }
}

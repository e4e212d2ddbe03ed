use actix_web::web::{Bytes, Data, Path};
use common::{
    api::{parse_json_body, ApiResponse, StatusMessage},
    error::{KlError, KlResult},
};
use log::info;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    data::patient::{Patient, PatientFields},
    service::patients::PatientRepository,
    validation::{FieldMapValidator, PatientValidator},
};

pub const PATIENT_NOT_FOUND: &str = "Patient not found.";

/// Body of the patient listing
#[derive(Serialize)]
pub struct PatientList {
    results: Vec<Patient>,
}

fn validate_body(body: &[u8]) -> KlResult<PatientFields> {
    let fields: Map<String, Value> = parse_json_body(body)?;
    PatientValidator::validate_request(&fields)
}

/// API endpoint to fetch every patient, newest first
pub async fn list<P>(service: Data<P>) -> KlResult<ApiResponse<PatientList>>
where
    P: PatientRepository,
{
    let results = service.read_all().await?;
    Ok(ApiResponse::ok(PatientList { results }))
}

/// API endpoint to create a new patient
pub async fn create<P>(body: Bytes, service: Data<P>) -> KlResult<ApiResponse<Patient>>
where
    P: PatientRepository,
{
    let fields = validate_body(&body)?;
    let patient = service.create(&fields).await?;
    info!("Created patient {}", patient.id());
    Ok(ApiResponse::created(patient))
}

/// API endpoint to fetch a single patient
pub async fn read<P>(id: Path<i64>, service: Data<P>) -> KlResult<ApiResponse<Patient>>
where
    P: PatientRepository,
{
    match service.read_one(id.into_inner()).await? {
        Some(patient) => Ok(ApiResponse::ok(patient)),
        None => Err(KlError::NotFound(PATIENT_NOT_FOUND)),
    }
}

/// API endpoint to replace the editable fields of a patient. An unknown id is reported before the
/// body is inspected.
pub async fn update<P>(
    id: Path<i64>,
    body: Bytes,
    service: Data<P>,
) -> KlResult<ApiResponse<Patient>>
where
    P: PatientRepository,
{
    let id = id.into_inner();
    if service.read_one(id).await?.is_none() {
        return Err(KlError::NotFound(PATIENT_NOT_FOUND));
    }
    let fields = validate_body(&body)?;
    match service.update(id, &fields).await? {
        Some(patient) => {
            info!("Updated patient {id}");
            Ok(ApiResponse::ok(patient))
        }
        None => Err(KlError::NotFound(PATIENT_NOT_FOUND)),
    }
}

/// API endpoint to remove a patient
pub async fn delete<P>(id: Path<i64>, service: Data<P>) -> KlResult<ApiResponse<StatusMessage>>
where
    P: PatientRepository,
{
    let id = id.into_inner();
    if !service.delete(id).await? {
        return Err(KlError::NotFound(PATIENT_NOT_FOUND));
    }
    info!("Deleted patient {id}");
    Ok(ApiResponse::message("deleted"))
}

#[cfg(test)]
mod test {
    use actix_web::{
        body::to_bytes,
        http::StatusCode,
        web::{Bytes, Data, Path},
        ResponseError,
    };
    use chrono::Utc;
    use common::error::{KlError, INTERNAL_ERROR_MESSAGE};
    use rstest::{fixture, rstest};
    use serde_json::{json, Value};

    use super::{create, delete, list, update, PATIENT_NOT_FOUND};
    use crate::{
        data::patient::{Patient, PatientFields},
        service::patients::MockPatientRepository,
    };

    #[fixture]
    fn patient() -> Patient {
        let fields = PatientFields {
            emri: "John Doe".to_owned(),
            nr_cel: "+355123456".to_owned(),
            email: "john@example.com".to_owned(),
            mjeku: "Dr. House".to_owned(),
            cmimi: "100".to_owned(),
            sherbimet: "Consultation".to_owned(),
        };
        Patient::from_fields(1, &fields, Utc::now())
    }

    fn body() -> Bytes {
        Bytes::from(
            json!({
                "emri": "John Doe",
                "nr_cel": "+355123456",
                "email": "john@example.com",
                "mjeku": "Dr. House",
                "cmimi": "100",
                "sherbimet": "Consultation",
            })
            .to_string(),
        )
    }

    #[actix_web::test]
    async fn list_should_hide_storage_failures() {
        let mut repository = MockPatientRepository::new();
        repository
            .expect_read_all()
            .returning(|| Err(KlError::Generic("connection refused".to_owned())));

        let error = match list(Data::new(repository)).await {
            Ok(_) => panic!("Expected storage failure to propagate"),
            Err(error) => error,
        };
        let response = error.error_response();
        let bytes = to_bytes(response.into_body())
            .await
            .expect("Body should be readable");
        let body: Value = serde_json::from_slice(&bytes).expect("Body should be JSON");

        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": INTERNAL_ERROR_MESSAGE }));
    }

    #[rstest]
    #[actix_web::test]
    async fn update_should_report_patient_deleted_mid_request(patient: Patient) {
        let mut repository = MockPatientRepository::new();
        repository
            .expect_read_one()
            .returning(move |_| Ok(Some(patient.clone())));
        repository.expect_update().returning(|_, _| Ok(None));

        let result = update(Path::from(1), body(), Data::new(repository)).await;

        assert!(
            matches!(result, Err(KlError::NotFound(message)) if message == PATIENT_NOT_FOUND),
            "Expected a not found error"
        );
    }

    #[actix_web::test]
    async fn update_should_check_existence_before_body() {
        let mut repository = MockPatientRepository::new();
        repository.expect_read_one().returning(|_| Ok(None));
        repository.expect_update().never();

        let result = update(Path::from(7), Bytes::from("not json"), Data::new(repository)).await;

        assert!(matches!(result, Err(KlError::NotFound(_))));
    }

    #[actix_web::test]
    async fn create_should_not_store_invalid_patient() {
        let mut repository = MockPatientRepository::new();
        repository.expect_create().never();

        let result = create(Bytes::from("{\"emri\": \"\"}"), Data::new(repository)).await;

        assert!(
            matches!(result, Err(KlError::ValidationFailed(ref errors)) if errors.len() == 6),
            "Expected every field to be reported"
        );
    }

    #[actix_web::test]
    async fn delete_should_report_unknown_patient() {
        let mut repository = MockPatientRepository::new();
        repository.expect_delete().returning(|_| Ok(false));

        let result = delete(Path::from(3), Data::new(repository)).await;

        assert!(matches!(result, Err(KlError::NotFound(_))));
    }
}

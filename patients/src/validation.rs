use common::error::{FieldErrors, KlError, KlResult};
use lazy_regex::regex_is_match;
use serde_json::{Map, Value};

use crate::data::patient::PatientFields;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_VALUE_MESSAGE: &str = "Enter a valid value.";
pub const INVALID_EMAIL_MESSAGE: &str = "Enter a valid email address.";

/// Longest value accepted for free text fields
pub const MAX_TEXT_LENGTH: usize = 255;
/// Longest value accepted for email addresses
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Validator for field maps received from API callers. Produces a normalized output value or
/// every problem found, keyed by field name.
pub trait FieldMapValidator {
    /// Normalized value produced when all fields are valid
    type Output;
    /// Check every field of the `fields` map
    /// # Errors
    /// This function will return an error with at least one entry if any field is invalid
    fn validate(fields: &Map<String, Value>) -> Result<Self::Output, FieldErrors>;
    /// Performs the implemented validation against the `fields`, mapping the errors (if any) into
    /// a [KlError::ValidationFailed] error
    /// # Errors
    /// This function will return an error if any field is invalid
    fn validate_request(fields: &Map<String, Value>) -> KlResult<Self::Output> {
        Self::validate(fields).map_err(KlError::ValidationFailed)
    }
}

/// Validates the six user editable [Patient][crate::data::patient::Patient] fields
pub struct PatientValidator;

impl FieldMapValidator for PatientValidator {
    type Output = PatientFields;

    fn validate(fields: &Map<String, Value>) -> Result<PatientFields, FieldErrors> {
        let mut errors = FieldErrors::new();
        let emri = text_field(fields, "emri", &mut errors);
        let nr_cel = text_field(fields, "nr_cel", &mut errors);
        let email = email_field(fields, "email", &mut errors);
        let mjeku = text_field(fields, "mjeku", &mut errors);
        let cmimi = text_field(fields, "cmimi", &mut errors);
        let sherbimet = text_field(fields, "sherbimet", &mut errors);
        match (emri, nr_cel, email, mjeku, cmimi, sherbimet) {
            (Some(emri), Some(nr_cel), Some(email), Some(mjeku), Some(cmimi), Some(sherbimet))
                if errors.is_empty() =>
            {
                Ok(PatientFields {
                    emri,
                    nr_cel,
                    email,
                    mjeku,
                    cmimi,
                    sherbimet,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Record a single error `message` against the field `name`
fn push_error(errors: &mut FieldErrors, name: &str, message: String) {
    errors.entry(name.to_owned()).or_default().push(message);
}

/// Extract the trimmed text value of a required field. Numbers are accepted as their textual
/// form.
fn required_text(
    fields: &Map<String, Value>,
    name: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    let text = match fields.get(name) {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(value.trim().to_owned()),
        Some(Value::Number(value)) => Some(value.to_string()),
        Some(_) => {
            push_error(errors, name, INVALID_VALUE_MESSAGE.to_owned());
            return None;
        }
    };
    match text {
        Some(text) if !text.is_empty() => Some(text),
        _ => {
            push_error(errors, name, REQUIRED_MESSAGE.to_owned());
            None
        }
    }
}

fn check_length(value: &str, max: usize, name: &str, errors: &mut FieldErrors) -> bool {
    let length = value.chars().count();
    if length > max {
        push_error(
            errors,
            name,
            format!("Ensure this value has at most {max} characters (it has {length})."),
        );
        return false;
    }
    true
}

fn text_field(
    fields: &Map<String, Value>,
    name: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    let value = required_text(fields, name, errors)?;
    check_length(&value, MAX_TEXT_LENGTH, name, errors).then_some(value)
}

fn email_field(
    fields: &Map<String, Value>,
    name: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    let value = required_text(fields, name, errors)?;
    let valid_length = check_length(&value, MAX_EMAIL_LENGTH, name, errors);
    if !regex_is_match!(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$", &value) {
        push_error(errors, name, INVALID_EMAIL_MESSAGE.to_owned());
        return None;
    }
    valid_length.then_some(value)
}

use actix_web::{cookie::Cookie, http::StatusCode, Responder};
use log::{debug, error};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{FieldErrors, KlError, KlResult};

/// Body of every non-validation error response
#[derive(Serialize)]
pub struct ErrorMessage {
    pub error: String,
}

/// Body of a validation error response. Each field maps to all problems found with the value.
#[derive(Serialize)]
pub struct FieldErrorsMessage<'e> {
    pub errors: &'e FieldErrors,
}

/// Body of responses that only report the outcome of an action
#[derive(Serialize)]
pub struct StatusMessage {
    pub status: &'static str,
}

/// API response object that serializes the `body` as JSON with the specified `status`, setting
/// any attached `cookies`. This type can be used as a [Responder] for HTTP route handlers. If the
/// serialization of the `body` fails, a 500 plaintext response is returned instead.
pub struct ApiResponse<T: Serialize> {
    status: StatusCode,
    body: T,
    cookies: Vec<Cookie<'static>>,
}

impl<T> Responder for ApiResponse<T>
where
    T: Serialize,
{
    type Body = actix_web::body::BoxBody;

    fn respond_to(self, req: &actix_web::HttpRequest) -> actix_web::HttpResponse<Self::Body> {
        let bytes = match serde_json::to_vec(&self.body) {
            Ok(inner) => inner,
            Err(error) => {
                let message = format!(
                    "Could not serialize response for {}. Error: {}",
                    req.path(),
                    error
                );
                error!("{}", message);
                return actix_web::HttpResponse::InternalServerError()
                    .content_type(actix_web::http::header::ContentType::plaintext())
                    .body(message.into_bytes());
            }
        };
        let mut builder = actix_web::HttpResponse::build(self.status);
        for cookie in self.cookies {
            builder.cookie(cookie);
        }
        builder
            .content_type(actix_web::http::header::ContentType(mime::APPLICATION_JSON))
            .body(bytes)
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Generate a 200 [ApiResponse] wrapping the `data`
    pub const fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            body: data,
            cookies: Vec::new(),
        }
    }

    /// Generate a 201 [ApiResponse] wrapping the newly created `data`
    pub const fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            body: data,
            cookies: Vec::new(),
        }
    }

    /// Attach a `cookie` to be set when the response is sent
    #[must_use]
    pub fn with_cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.cookies.push(cookie);
        self
    }
}

impl ApiResponse<StatusMessage> {
    /// Generate a 200 [ApiResponse] with a `{"status": ...}` body
    pub const fn message(status: &'static str) -> Self {
        Self::ok(StatusMessage { status })
    }
}

/// Deserialize a raw request body as JSON. An empty (or whitespace only) body is treated as an
/// empty JSON object.
/// # Errors
/// This function will return [KlError::MalformedBody] if the body is not valid JSON or does not
/// match the shape of `T`
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> KlResult<T> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|error| {
        debug!("Could not parse request body. {error}");
        KlError::MalformedBody
    })
}

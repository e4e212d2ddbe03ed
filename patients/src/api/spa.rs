use actix_web::{http::header::ContentType, web::Data, HttpRequest, HttpResponse};
use log::warn;

use super::cookies::missing_csrf_cookie;
use crate::config::{CookieConfig, SpaConfig};

/// Page served when no built client is available
const FALLBACK_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Klinika</title>
</head>
<body>
  <div id="root"></div>
  <p>The patient records client has not been built.</p>
</body>
</html>
"#;

/// Serve the entry page of the single page application for every client side route. The CSRF
/// cookie is issued here so the client can make state changing requests after login.
pub async fn index(
    req: HttpRequest,
    spa: Data<SpaConfig>,
    cookies: Data<CookieConfig>,
) -> HttpResponse {
    let page = match common::read_file(spa.index_path()).await {
        Ok(page) => page,
        Err(error) => {
            warn!("Serving fallback index page. {error}");
            FALLBACK_INDEX.to_owned()
        }
    };
    let mut builder = HttpResponse::Ok();
    if let Some(cookie) = missing_csrf_cookie(&req, &cookies) {
        builder.cookie(cookie);
    }
    builder.content_type(ContentType::html()).body(page)
}

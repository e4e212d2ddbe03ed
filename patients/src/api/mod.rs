use actix_files::Files;
use actix_session::{config::PersistentSession, SessionMiddleware};
use actix_web::{
    cookie::{time::Duration, Key, SameSite},
    middleware::{from_fn, Logger},
    web::{self, delete, get, post, put, Data, PathConfig, ServiceConfig},
    App, HttpResponse, HttpServer,
};
use chrono::Utc;
use common::error::{KlError, KlResult};
use log::info;

pub mod auth;
pub mod cookies;
pub mod guard;
pub mod patients;
pub mod spa;

use crate::{
    config::{CookieConfig, ServerConfig},
    service::{patients::PatientRepository, sessions::ExpiringSessionStore, users::UserService},
};

async fn not_found() -> KlResult<HttpResponse> {
    Err(KlError::NotFound("Not found."))
}

/// Session middleware keeping the session key in the HttpOnly
/// [SESSION_COOKIE][cookies::SESSION_COOKIE], signed with `key`. Sessions live for the configured
/// TTL.
pub fn session_middleware<S>(store: S, key: Key, cookies: &CookieConfig) -> SessionMiddleware<S>
where
    S: ExpiringSessionStore,
{
    let ttl = Duration::seconds(cookies.session_ttl.num_seconds());
    SessionMiddleware::builder(store, key)
        .cookie_name(cookies::SESSION_COOKIE.to_owned())
        .cookie_path("/".to_owned())
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .cookie_secure(cookies.secure)
        .session_lifecycle(PersistentSession::default().session_ttl(ttl))
        .build()
}

/// Register every klinika route. Services must be registered as [Data] of the `P` and `U` types
/// along with a [CookieConfig] and a [SpaConfig][crate::config::SpaConfig]. The application must
/// be wrapped in [session_middleware].
pub fn configure<P, U>(cfg: &mut ServiceConfig)
where
    P: PatientRepository + 'static,
    U: UserService + 'static,
{
    let path_config = PathConfig::default()
        .error_handler(|_, _| KlError::NotFound(patients::PATIENT_NOT_FOUND).into());
    cfg.service(
        web::scope("/api")
            .wrap(from_fn(guard::identify))
            .service(web::resource("/auth/session/").route(get().to(auth::session_status)))
            .service(web::resource("/auth/login/").route(post().to(auth::login::<U>)))
            .service(
                web::resource("/auth/logout/")
                    .wrap(from_fn(guard::require_authentication))
                    .route(post().to(auth::logout)),
            )
            .service(
                web::scope("/patients")
                    .wrap(from_fn(guard::require_authentication))
                    .app_data(path_config)
                    .service(
                        web::resource("/")
                            .route(get().to(patients::list::<P>))
                            .route(post().to(patients::create::<P>)),
                    )
                    .service(
                        web::resource("/{id}/")
                            .route(get().to(patients::read::<P>))
                            .route(put().to(patients::update::<P>))
                            .route(delete().to(patients::delete::<P>)),
                    ),
            ),
    )
    .route("/", get().to(spa::index))
    .route("/patients/new", get().to(spa::index))
    .route("/patients/{id}", get().to(spa::index))
    .route("/patients/{id}/edit", get().to(spa::index))
    .default_service(web::to(not_found));
}

/// Run the klinika API server with the `patients`, `users` and `sessions` services provided.
/// Sessions that expired while the server was down are removed before binding.
/// # Errors
/// This function will return an error if expired sessions cannot be cleared, the session key is
/// invalid, the server is unable to bind to the configured address or the server's `run` method
/// returns an error
pub async fn spawn_api_server<P, U, S>(
    patients: P,
    users: U,
    sessions: S,
    config: ServerConfig,
) -> KlResult<()>
where
    P: PatientRepository + 'static,
    U: UserService + 'static,
    S: ExpiringSessionStore,
{
    let key = config.session_key()?;
    let cleared = sessions.clear_expired(Utc::now()).await?;
    if cleared > 0 {
        info!("Cleared {cleared} expired session(s)");
    }
    let patients_data: Data<P> = Data::new(patients);
    let users_data: Data<U> = Data::new(users);
    let cookies = config.cookies;
    let cookies_data = Data::new(cookies.clone());
    let spa_dir = config.spa.dir.clone();
    let spa_data = Data::new(config.spa);
    info!("Starting klinika API server on {}", config.bind);
    HttpServer::new(move || {
        App::new()
            .wrap(session_middleware(sessions.clone(), key.clone(), &cookies))
            .wrap(Logger::default())
            .app_data(patients_data.clone())
            .app_data(users_data.clone())
            .app_data(cookies_data.clone())
            .app_data(spa_data.clone())
            .service(Files::new("/static/spa", spa_dir.clone()))
            .configure(configure::<P, U>)
    })
    .bind(config.bind.as_str())?
    .run()
    .await?;
    Ok(())
}

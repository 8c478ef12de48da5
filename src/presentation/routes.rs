use crate::presentation::admin;
use crate::presentation::error::ApiError;
use crate::presentation::handlers::{
    add_favorite_people, add_favorite_planet, delete_favorite_people, delete_favorite_planet,
    get_people, get_planet, health_check, list_people, list_planets, list_users,
    method_not_allowed, not_found, sitemap, user_favorites,
};
use actix_web::web;

/// Public API surface, as listed on the sitemap.
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("GET", "/health"),
    ("GET", "/people"),
    ("GET", "/people/{id}"),
    ("GET", "/planets"),
    ("GET", "/planets/{id}"),
    ("GET", "/users"),
    ("GET", "/users/favorites"),
    ("POST", "/favorite/planet/{id}"),
    ("POST", "/favorite/people/{id}"),
    ("DELETE", "/favorite/planet/{id}"),
    ("DELETE", "/favorite/people/{id}"),
];

/// Registers the API, the admin panel and the JSON fallbacks.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PathConfig::default().error_handler(|err, _req| {
        ApiError::NotFound(format!("Resource not found: {err}")).into()
    }))
    .app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .route("/", web::get().to(sitemap))
    .route("/health", web::get().to(health_check))
    .route("/people", web::get().to(list_people))
    .route("/people/{id}", web::get().to(get_people))
    .route("/planets", web::get().to(list_planets))
    .route("/planets/{id}", web::get().to(get_planet))
    .route("/users", web::get().to(list_users))
    .route("/users/favorites", web::get().to(user_favorites))
    .service(
        web::resource("/favorite/planet/{id}")
            .route(web::post().to(add_favorite_planet))
            .route(web::delete().to(delete_favorite_planet))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/favorite/people/{id}")
            .route(web::post().to(add_favorite_people))
            .route(web::delete().to(delete_favorite_people))
            .default_service(web::to(method_not_allowed)),
    )
    .service(admin::scope())
    .default_service(web::to(not_found));
}

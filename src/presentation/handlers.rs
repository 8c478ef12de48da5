use crate::application::admin_service::AdminService;
use crate::application::service::CatalogService;
use crate::data::sqlite::SqliteRepository;
use crate::domain::models::{FavoriteView, Target};
use crate::presentation::error::ApiError;
use crate::presentation::routes::ENDPOINTS;
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{FromRequest, HttpRequest, HttpResponse, web};
use chrono::Utc;
use serde::Serialize;
use std::future::{Ready, ready};
use std::sync::Arc;
use tracing::{error, info, instrument};

// AppState holding the services
pub struct AppState {
    pub service: CatalogService<SqliteRepository>,
    pub admin: AdminService<SqliteRepository>,
    pub current_user_id: i64,
}

impl AppState {
    pub fn new(repository: Arc<SqliteRepository>, current_user_id: i64) -> Self {
        Self {
            service: CatalogService::new(repository.clone()),
            admin: AdminService::new(repository),
            current_user_id,
        }
    }
}

/// The identity favorite operations act on. Resolved from configuration
/// until an authentication layer supplies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i64);

impl FromRequest for CurrentUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user = req
            .app_data::<web::Data<AppState>>()
            .map(|state| CurrentUser(state.current_user_id))
            .ok_or_else(|| ApiError::Internal("application state is not configured".to_string()));
        ready(user)
    }
}

#[derive(Serialize)]
struct MessageResponse {
    msg: String,
}

#[derive(Serialize)]
struct FavoriteCreated {
    msg: String,
    #[serde(flatten)]
    favorite: FavoriteView,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

// Handlers

#[instrument]
pub async fn sitemap() -> HttpResponse {
    let links: String = ENDPOINTS
        .iter()
        .map(|(method, path)| {
            if *method == "GET" && !path.contains('{') {
                format!("<li><a href=\"{path}\">{method} {path}</a></li>")
            } else {
                format!("<li>{method} {path}</li>")
            }
        })
        .collect();
    let body = format!(
        "<!doctype html><html><head><title>Favorites API</title></head><body>\
         <h1>Favorites API</h1><p>Endpoints:</p><ul>{links}</ul>\
         <p><a href=\"/admin/\">Admin</a></p></body></html>"
    );
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    info!("Health check requested");
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[instrument(skip(state))]
pub async fn list_people(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let people = state.service.list_people().await?;
    info!(count = people.len(), "Listed people");
    Ok(HttpResponse::Ok().json(people))
}

#[instrument(skip(state), fields(people_id = %*path))]
pub async fn get_people(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let people = state.service.get_people(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(people))
}

#[instrument(skip(state))]
pub async fn list_planets(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let planets = state.service.list_planets().await?;
    info!(count = planets.len(), "Listed planets");
    Ok(HttpResponse::Ok().json(planets))
}

#[instrument(skip(state), fields(planet_id = %*path))]
pub async fn get_planet(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let planet = state.service.get_planet(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(planet))
}

#[instrument(skip(state))]
pub async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let users = state.service.list_users().await?;
    info!(count = users.len(), "Listed users");
    Ok(HttpResponse::Ok().json(users))
}

#[instrument(skip(state))]
pub async fn user_favorites(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, ApiError> {
    let favorites = state.service.user_favorites(user.0).await?;
    info!(user_id = user.0, count = favorites.len(), "Listed favorites");
    Ok(HttpResponse::Ok().json(favorites))
}

#[instrument(skip(state), fields(planet_id = %*path))]
pub async fn add_favorite_planet(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    add_favorite(&state, user, Target::Planet(path.into_inner()), "Favorite planet added").await
}

#[instrument(skip(state), fields(people_id = %*path))]
pub async fn add_favorite_people(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    add_favorite(&state, user, Target::People(path.into_inner()), "Favorite people added").await
}

#[instrument(skip(state), fields(planet_id = %*path))]
pub async fn delete_favorite_planet(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    remove_favorite(&state, user, Target::Planet(path.into_inner()), "Favorite planet deleted").await
}

#[instrument(skip(state), fields(people_id = %*path))]
pub async fn delete_favorite_people(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    remove_favorite(&state, user, Target::People(path.into_inner()), "Favorite people deleted").await
}

async fn add_favorite(
    state: &AppState,
    user: CurrentUser,
    target: Target,
    msg: &str,
) -> Result<HttpResponse, ApiError> {
    let favorite = state
        .service
        .add_favorite(user.0, target)
        .await
        .map_err(|e| {
            error!(user_id = user.0, ?target, error = %e, "Failed to add favorite");
            e
        })?;
    info!(favorite_id = favorite.id, "Favorite created");
    Ok(HttpResponse::Created().json(FavoriteCreated {
        msg: msg.to_string(),
        favorite,
    }))
}

async fn remove_favorite(
    state: &AppState,
    user: CurrentUser,
    target: Target,
    msg: &str,
) -> Result<HttpResponse, ApiError> {
    state
        .service
        .remove_favorite(user.0, target)
        .await
        .map_err(|e| {
            error!(user_id = user.0, ?target, error = %e, "Failed to remove favorite");
            e
        })?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        msg: msg.to_string(),
    }))
}

pub async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound("Not found".to_string()))
}

pub async fn method_not_allowed() -> Result<HttpResponse, ApiError> {
    Err(ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"))
}

//! Server-rendered admin panel: list, create, edit and delete for every table.
//!
//! Pages are plain HTML built from strings. Forms post urlencoded bodies which
//! the admin service turns into typed records; storage constraints are the
//! only validation beyond that.

use crate::application::admin_service::FormData;
use crate::domain::models::{FavoriteFilter, FavoriteView, Planet, ResolvedTarget};
use crate::presentation::error::ApiError;
use crate::presentation::handlers::AppState;
use actix_web::http::StatusCode;
use actix_web::http::header::{self, ContentType};
use actix_web::{HttpResponse, ResponseError, Scope, web};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminEntity {
    User,
    Planet,
    People,
    Favorite,
}

impl AdminEntity {
    pub const ALL: [AdminEntity; 4] = [
        AdminEntity::User,
        AdminEntity::Planet,
        AdminEntity::People,
        AdminEntity::Favorite,
    ];

    pub fn parse(slug: &str) -> Result<Self, ApiError> {
        Self::ALL
            .into_iter()
            .find(|entity| entity.slug() == slug)
            .ok_or_else(|| ApiError::NotFound(format!("Unknown admin view: {slug}")))
    }

    pub fn slug(&self) -> &'static str {
        match self {
            AdminEntity::User => "user",
            AdminEntity::Planet => "planet",
            AdminEntity::People => "people",
            AdminEntity::Favorite => "favorite",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AdminEntity::User => "User",
            AdminEntity::Planet => "Planet",
            AdminEntity::People => "People",
            AdminEntity::Favorite => "Favorite",
        }
    }

    fn list_url(&self) -> String {
        format!("/admin/{}", self.slug())
    }
}

pub fn scope() -> Scope {
    web::scope("/admin")
        .route("", web::get().to(index))
        .route("/{entity}", web::get().to(list))
        .service(
            web::resource("/{entity}/new")
                .route(web::get().to(new_form))
                .route(web::post().to(create)),
        )
        .service(
            web::resource("/{entity}/{id}/edit")
                .route(web::get().to(edit_form))
                .route(web::post().to(update)),
        )
        .route("/{entity}/{id}/delete", web::post().to(delete))
}

// Handlers

pub async fn index() -> HttpResponse {
    let items: String = AdminEntity::ALL
        .iter()
        .map(|e| format!("<li><a href=\"{}\">{}</a></li>", e.list_url(), e.title()))
        .collect();
    html(StatusCode::OK, &page("Admin", &format!("<ul>{items}</ul>")))
}

#[instrument(skip(state, filter))]
pub async fn list(
    state: web::Data<AppState>,
    path: web::Path<String>,
    filter: web::Query<FavoriteFilter>,
) -> HttpResponse {
    list_page(&state, &path, &filter)
        .await
        .unwrap_or_else(error_page)
}

#[instrument(skip(state))]
pub async fn new_form(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    form_page(&state, &path, None).await.unwrap_or_else(error_page)
}

#[instrument(skip(state))]
pub async fn edit_form(state: web::Data<AppState>, path: web::Path<(String, i64)>) -> HttpResponse {
    let (slug, id) = path.into_inner();
    form_page(&state, &slug, Some(id))
        .await
        .unwrap_or_else(error_page)
}

#[instrument(skip(state, form))]
pub async fn create(
    state: web::Data<AppState>,
    path: web::Path<String>,
    form: web::Form<FormData>,
) -> HttpResponse {
    create_record(&state, &path, &form)
        .await
        .unwrap_or_else(error_page)
}

#[instrument(skip(state, form))]
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<(String, i64)>,
    form: web::Form<FormData>,
) -> HttpResponse {
    let (slug, id) = path.into_inner();
    update_record(&state, &slug, id, &form)
        .await
        .unwrap_or_else(error_page)
}

#[instrument(skip(state))]
pub async fn delete(state: web::Data<AppState>, path: web::Path<(String, i64)>) -> HttpResponse {
    let (slug, id) = path.into_inner();
    delete_record(&state, &slug, id)
        .await
        .unwrap_or_else(error_page)
}

async fn list_page(
    state: &AppState,
    slug: &str,
    filter: &FavoriteFilter,
) -> Result<HttpResponse, ApiError> {
    let entity = AdminEntity::parse(slug)?;
    let body = render_list(state, entity, filter).await?;
    Ok(html(StatusCode::OK, &page(entity.title(), &body)))
}

async fn form_page(state: &AppState, slug: &str, id: Option<i64>) -> Result<HttpResponse, ApiError> {
    let entity = AdminEntity::parse(slug)?;
    let fields = form_fields(state, entity, id).await?;
    let (action, title) = match id {
        Some(id) => (
            format!("{}/{id}/edit", entity.list_url()),
            format!("Edit {} {id}", entity.title()),
        ),
        None => (
            format!("{}/new", entity.list_url()),
            format!("New {}", entity.title()),
        ),
    };
    Ok(html(StatusCode::OK, &page(&title, &render_form(&action, &fields))))
}

async fn create_record(
    state: &AppState,
    slug: &str,
    form: &FormData,
) -> Result<HttpResponse, ApiError> {
    let entity = AdminEntity::parse(slug)?;
    let id = match entity {
        AdminEntity::User => state.admin.create_user(form).await?.id,
        AdminEntity::Planet => state.admin.create_planet(form).await?.id,
        AdminEntity::People => state.admin.create_people(form).await?.id,
        AdminEntity::Favorite => state.admin.create_favorite(form).await?.id,
    };
    info!(entity = entity.slug(), id, "Record created from admin");
    Ok(redirect(&entity.list_url()))
}

async fn update_record(
    state: &AppState,
    slug: &str,
    id: i64,
    form: &FormData,
) -> Result<HttpResponse, ApiError> {
    let entity = AdminEntity::parse(slug)?;
    match entity {
        AdminEntity::User => state.admin.update_user(id, form).await.map(|_| ())?,
        AdminEntity::Planet => state.admin.update_planet(id, form).await.map(|_| ())?,
        AdminEntity::People => state.admin.update_people(id, form).await.map(|_| ())?,
        AdminEntity::Favorite => state.admin.update_favorite(id, form).await.map(|_| ())?,
    }
    info!(entity = entity.slug(), id, "Record updated from admin");
    Ok(redirect(&entity.list_url()))
}

async fn delete_record(state: &AppState, slug: &str, id: i64) -> Result<HttpResponse, ApiError> {
    let entity = AdminEntity::parse(slug)?;
    match entity {
        AdminEntity::User => state.admin.delete_user(id).await?,
        AdminEntity::Planet => state.admin.delete_planet(id).await?,
        AdminEntity::People => state.admin.delete_people(id).await?,
        AdminEntity::Favorite => state.admin.delete_favorite(id).await?,
    }
    Ok(redirect(&entity.list_url()))
}

// Rendering

enum FieldKind {
    Text,
    Checkbox(bool),
    /// (value, label) pairs; an empty value means "none".
    Select(Vec<(String, String)>),
}

struct Field {
    name: &'static str,
    value: String,
    kind: FieldKind,
}

impl Field {
    fn text(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
            kind: FieldKind::Text,
        }
    }

    fn select(name: &'static str, value: Option<i64>, options: Vec<(String, String)>) -> Self {
        Self {
            name,
            value: value.map(|v| v.to_string()).unwrap_or_default(),
            kind: FieldKind::Select(options),
        }
    }
}

async fn render_list(
    state: &AppState,
    entity: AdminEntity,
    filter: &FavoriteFilter,
) -> Result<String, ApiError> {
    let (headers, rows): (&[&str], Vec<(i64, Vec<String>)>) = match entity {
        AdminEntity::User => (
            &["Email", "Active"][..],
            state
                .admin
                .list_users()
                .await?
                .into_iter()
                .map(|u| (u.id, vec![u.email, u.is_active.to_string()]))
                .collect(),
        ),
        AdminEntity::Planet => (
            &["Name", "Climate", "Terrain", "Population"][..],
            state
                .admin
                .list_planets()
                .await?
                .into_iter()
                .map(|p| {
                    (
                        p.id,
                        vec![
                            p.name,
                            p.climate.unwrap_or_default(),
                            p.terrain.unwrap_or_default(),
                            p.population.unwrap_or_default(),
                        ],
                    )
                })
                .collect(),
        ),
        AdminEntity::People => (
            &["Name", "Gender", "Birth year"][..],
            state
                .admin
                .list_people()
                .await?
                .into_iter()
                .map(|p| {
                    (
                        p.id,
                        vec![p.name, p.gender.unwrap_or_default(), p.birth_year.unwrap_or_default()],
                    )
                })
                .collect(),
        ),
        AdminEntity::Favorite => (
            &["User", "Planet", "People"][..],
            state
                .admin
                .list_favorites(filter)
                .await?
                .into_iter()
                .map(|entry| {
                    let user = entry
                        .user_email
                        .unwrap_or_else(|| format!("#{}", entry.favorite.user_id));
                    let (planet, people) = target_names(&entry.favorite);
                    (entry.favorite.id, vec![user, planet, people])
                })
                .collect(),
        ),
    };

    let head: String = headers.iter().map(|h| format!("<th>{h}</th>")).collect();
    let list_url = entity.list_url();
    let body: String = rows
        .iter()
        .map(|(id, cells)| {
            let cells: String = cells.iter().map(|c| format!("<td>{}</td>", escape(c))).collect();
            format!(
                "<tr><td>{id}</td>{cells}<td><a href=\"{list_url}/{id}/edit\">Edit</a> \
                 <form method=\"post\" action=\"{list_url}/{id}/delete\" style=\"display:inline\">\
                 <button type=\"submit\">Delete</button></form></td></tr>"
            )
        })
        .collect();

    let search = if entity == AdminEntity::Favorite {
        render_search(filter)
    } else {
        String::new()
    };

    Ok(format!(
        "{search}<p><a href=\"{list_url}/new\">Create</a> ({count} records)</p>\
         <table border=\"1\"><thead><tr><th>Id</th>{head}<th></th></tr></thead>\
         <tbody>{body}</tbody></table>",
        count = rows.len()
    ))
}

fn target_names(favorite: &FavoriteView) -> (String, String) {
    match &favorite.resolved {
        ResolvedTarget::Planet { planet } => (planet.name.clone(), String::new()),
        ResolvedTarget::People { people } => (String::new(), people.name.clone()),
        ResolvedTarget::Unknown => ("?".to_string(), "?".to_string()),
    }
}

fn render_search(filter: &FavoriteFilter) -> String {
    let value = |v: &Option<String>| escape(v.as_deref().unwrap_or_default());
    format!(
        "<form method=\"get\">\
         <label>User email <input name=\"search\" value=\"{}\"></label> \
         <label>Planet name <input name=\"planet\" value=\"{}\"></label> \
         <label>People name <input name=\"people\" value=\"{}\"></label> \
         <button type=\"submit\">Filter</button></form>",
        value(&filter.user_email),
        value(&filter.planet_name),
        value(&filter.people_name),
    )
}

async fn form_fields(
    state: &AppState,
    entity: AdminEntity,
    id: Option<i64>,
) -> Result<Vec<Field>, ApiError> {
    let fields = match entity {
        AdminEntity::User => {
            let user = match id {
                Some(id) => Some(state.admin.get_user(id).await?),
                None => None,
            };
            vec![
                Field::text("email", user.as_ref().map(|u| u.email.clone()).unwrap_or_default()),
                Field::text("password", user.as_ref().map(|u| u.password.clone()).unwrap_or_default()),
                Field {
                    name: "is_active",
                    value: "on".to_string(),
                    kind: FieldKind::Checkbox(user.as_ref().is_none_or(|u| u.is_active)),
                },
            ]
        }
        AdminEntity::Planet => {
            let planet = match id {
                Some(id) => Some(state.admin.get_planet(id).await?),
                None => None,
            };
            let planet = planet.unwrap_or_else(|| Planet {
                id: 0,
                name: String::new(),
                climate: None,
                terrain: None,
                population: None,
            });
            vec![
                Field::text("name", planet.name),
                Field::text("climate", planet.climate.unwrap_or_default()),
                Field::text("terrain", planet.terrain.unwrap_or_default()),
                Field::text("population", planet.population.unwrap_or_default()),
            ]
        }
        AdminEntity::People => {
            let people = match id {
                Some(id) => Some(state.admin.get_people(id).await?),
                None => None,
            };
            vec![
                Field::text("name", people.as_ref().map(|p| p.name.clone()).unwrap_or_default()),
                Field::text(
                    "gender",
                    people.as_ref().and_then(|p| p.gender.clone()).unwrap_or_default(),
                ),
                Field::text(
                    "birth_year",
                    people.as_ref().and_then(|p| p.birth_year.clone()).unwrap_or_default(),
                ),
            ]
        }
        AdminEntity::Favorite => {
            let favorite = match id {
                Some(id) => Some(state.admin.get_favorite(id).await?),
                None => None,
            };
            let users = state
                .admin
                .list_users()
                .await?
                .into_iter()
                .map(|u| (u.id.to_string(), u.email))
                .collect();
            let planets = state
                .admin
                .list_planets()
                .await?
                .into_iter()
                .map(|p| (p.id.to_string(), p.name))
                .collect();
            let people = state
                .admin
                .list_people()
                .await?
                .into_iter()
                .map(|p| (p.id.to_string(), p.name))
                .collect();
            vec![
                Field::select("user_id", favorite.as_ref().map(|f| f.user_id), users),
                Field::select("planet_id", favorite.as_ref().and_then(|f| f.planet_id), planets),
                Field::select("people_id", favorite.as_ref().and_then(|f| f.people_id), people),
            ]
        }
    };
    Ok(fields)
}

fn render_form(action: &str, fields: &[Field]) -> String {
    let inputs: String = fields
        .iter()
        .map(|field| {
            let name = field.name;
            let value = escape(&field.value);
            let input = match &field.kind {
                FieldKind::Text => format!("<input name=\"{name}\" value=\"{value}\">"),
                FieldKind::Checkbox(checked) => format!(
                    "<input type=\"checkbox\" name=\"{name}\" value=\"{value}\"{}>",
                    if *checked { " checked" } else { "" }
                ),
                FieldKind::Select(options) => {
                    let options: String = std::iter::once((String::new(), String::new()))
                        .chain(options.iter().cloned())
                        .map(|(v, label)| {
                            let selected = if v == field.value { " selected" } else { "" };
                            format!(
                                "<option value=\"{}\"{selected}>{}</option>",
                                escape(&v),
                                escape(&label)
                            )
                        })
                        .collect();
                    format!("<select name=\"{name}\">{options}</select>")
                }
            };
            format!("<p><label>{name} {input}</label></p>")
        })
        .collect();
    format!("<form method=\"post\" action=\"{action}\">{inputs}<button type=\"submit\">Save</button></form>")
}

fn page(title: &str, body: &str) -> String {
    let nav: String = AdminEntity::ALL
        .iter()
        .map(|e| format!("<a href=\"{}\">{}</a> ", e.list_url(), e.title()))
        .collect();
    format!(
        "<!doctype html><html><head><title>{title} - Favorites Admin</title></head>\
         <body><nav><a href=\"/admin/\">Home</a> {nav}</nav><h1>{title}</h1>{body}</body></html>",
        title = escape(title)
    )
}

fn html(status: StatusCode, body: &str) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(body.to_string())
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

fn error_page(err: ApiError) -> HttpResponse {
    let status = err.status_code();
    warn!(error = %err, status = %status, "Admin request failed");
    let body = format!("<p>{}</p><p><a href=\"/admin/\">Back</a></p>", escape(&err.msg()));
    html(status, &page("Error", &body))
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

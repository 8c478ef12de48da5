use crate::domain::error::DomainError;
use crate::domain::models::{
    FavoriteEntry, FavoriteFilter, FavoriteView, NewFavorite, NewPeople, NewPlanet, People,
    Planet, Target,
};
use crate::domain::repository::CatalogRepository;
use crate::domain::user::{NewUser, User};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Raw admin form submission, field name to value.
pub type FormData = HashMap<String, String>;

/// Direct data management behind the admin panel. Input is whatever the HTML
/// forms post; storage constraints do the rest.
pub struct AdminService<R: CatalogRepository> {
    repository: Arc<R>,
}

impl<R: CatalogRepository> AdminService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.repository.list_users().await
    }

    pub async fn get_user(&self, id: i64) -> Result<User> {
        self.repository
            .find_user(id)
            .await?
            .ok_or_else(|| not_found("User", id))
    }

    #[instrument(skip(self, form))]
    pub async fn create_user(&self, form: &FormData) -> Result<User> {
        let user = self.repository.create_user(user_from_form(form)?).await?;
        info!(user_id = user.id, "Admin created user");
        Ok(user)
    }

    #[instrument(skip(self, form))]
    pub async fn update_user(&self, id: i64, form: &FormData) -> Result<User> {
        self.repository
            .update_user(id, user_from_form(form)?)
            .await?
            .ok_or_else(|| not_found("User", id))
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i64) -> Result<()> {
        deleted(self.repository.delete_user(id).await?, "User", id)
    }

    pub async fn list_planets(&self) -> Result<Vec<Planet>> {
        self.repository.list_planets().await
    }

    pub async fn get_planet(&self, id: i64) -> Result<Planet> {
        self.repository
            .find_planet(id)
            .await?
            .ok_or_else(|| not_found("Planet", id))
    }

    #[instrument(skip(self, form))]
    pub async fn create_planet(&self, form: &FormData) -> Result<Planet> {
        let planet = self.repository.create_planet(planet_from_form(form)?).await?;
        info!(planet_id = planet.id, "Admin created planet");
        Ok(planet)
    }

    #[instrument(skip(self, form))]
    pub async fn update_planet(&self, id: i64, form: &FormData) -> Result<Planet> {
        self.repository
            .update_planet(id, planet_from_form(form)?)
            .await?
            .ok_or_else(|| not_found("Planet", id))
    }

    #[instrument(skip(self))]
    pub async fn delete_planet(&self, id: i64) -> Result<()> {
        deleted(self.repository.delete_planet(id).await?, "Planet", id)
    }

    pub async fn list_people(&self) -> Result<Vec<People>> {
        self.repository.list_people().await
    }

    pub async fn get_people(&self, id: i64) -> Result<People> {
        self.repository
            .find_people(id)
            .await?
            .ok_or_else(|| not_found("People", id))
    }

    #[instrument(skip(self, form))]
    pub async fn create_people(&self, form: &FormData) -> Result<People> {
        let people = self.repository.create_people(people_from_form(form)?).await?;
        info!(people_id = people.id, "Admin created people");
        Ok(people)
    }

    #[instrument(skip(self, form))]
    pub async fn update_people(&self, id: i64, form: &FormData) -> Result<People> {
        self.repository
            .update_people(id, people_from_form(form)?)
            .await?
            .ok_or_else(|| not_found("People", id))
    }

    #[instrument(skip(self))]
    pub async fn delete_people(&self, id: i64) -> Result<()> {
        deleted(self.repository.delete_people(id).await?, "People", id)
    }

    pub async fn list_favorites(&self, filter: &FavoriteFilter) -> Result<Vec<FavoriteEntry>> {
        self.repository.list_favorites(filter).await
    }

    pub async fn get_favorite(&self, id: i64) -> Result<FavoriteView> {
        self.repository
            .find_favorite(id)
            .await?
            .ok_or_else(|| not_found("Favorite", id))
    }

    #[instrument(skip(self, form))]
    pub async fn create_favorite(&self, form: &FormData) -> Result<FavoriteView> {
        let favorite = self
            .repository
            .create_favorite(favorite_from_form(form)?)
            .await?;
        info!(favorite_id = favorite.id, "Admin created favorite");
        self.get_favorite(favorite.id).await
    }

    #[instrument(skip(self, form))]
    pub async fn update_favorite(&self, id: i64, form: &FormData) -> Result<FavoriteView> {
        self.repository
            .update_favorite(id, favorite_from_form(form)?)
            .await?
            .ok_or_else(|| not_found("Favorite", id))?;
        self.get_favorite(id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_favorite(&self, id: i64) -> Result<()> {
        deleted(self.repository.delete_favorite(id).await?, "Favorite", id)
    }
}

fn not_found(entity: &str, id: i64) -> anyhow::Error {
    DomainError::NotFound(format!("{entity} {id} not found")).into()
}

fn deleted(removed: bool, entity: &str, id: i64) -> Result<()> {
    if removed {
        info!(entity, id, "Admin deleted record");
        Ok(())
    } else {
        Err(not_found(entity, id))
    }
}

fn optional(form: &FormData, field: &str) -> Option<String> {
    form.get(field)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(form: &FormData, field: &str) -> Result<String, DomainError> {
    optional(form, field).ok_or_else(|| DomainError::Validation(format!("{field} is required")))
}

fn optional_id(form: &FormData, field: &str) -> Result<Option<i64>, DomainError> {
    optional(form, field)
        .map(|raw| {
            raw.parse::<i64>()
                .map_err(|_| DomainError::Validation(format!("{field} must be a number")))
        })
        .transpose()
}

/// HTML checkboxes are only posted when ticked.
fn checkbox(form: &FormData, field: &str) -> bool {
    optional(form, field).is_some_and(|v| matches!(v.as_str(), "on" | "true" | "1" | "y"))
}

pub fn user_from_form(form: &FormData) -> Result<NewUser, DomainError> {
    Ok(NewUser {
        email: required(form, "email")?,
        password: required(form, "password")?,
        is_active: checkbox(form, "is_active"),
    })
}

pub fn planet_from_form(form: &FormData) -> Result<NewPlanet, DomainError> {
    Ok(NewPlanet {
        name: required(form, "name")?,
        climate: optional(form, "climate"),
        terrain: optional(form, "terrain"),
        population: optional(form, "population"),
    })
}

pub fn people_from_form(form: &FormData) -> Result<NewPeople, DomainError> {
    Ok(NewPeople {
        name: required(form, "name")?,
        gender: optional(form, "gender"),
        birth_year: optional(form, "birth_year"),
    })
}

pub fn favorite_from_form(form: &FormData) -> Result<NewFavorite, DomainError> {
    let user_id = optional_id(form, "user_id")?
        .ok_or_else(|| DomainError::Validation("user_id is required".to_string()))?;
    let target = Target::from_columns(
        optional_id(form, "planet_id")?,
        optional_id(form, "people_id")?,
    )
    .map_err(|_| {
        DomainError::Validation("A favorite needs exactly one of planet_id or people_id".to_string())
    })?;
    Ok(NewFavorite { user_id, target })
}

use crate::domain::models::{
    Favorite, FavoriteEntry, FavoriteFilter, FavoriteView, NewFavorite, NewPeople, NewPlanet,
    People, Planet, Target,
};
use crate::domain::user::{NewUser, User};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>>;
    async fn find_user(&self, id: i64) -> Result<Option<User>>;
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn update_user(&self, id: i64, user: NewUser) -> Result<Option<User>>;
    async fn delete_user(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait PlanetRepository: Send + Sync {
    async fn list_planets(&self) -> Result<Vec<Planet>>;
    async fn find_planet(&self, id: i64) -> Result<Option<Planet>>;
    async fn create_planet(&self, planet: NewPlanet) -> Result<Planet>;
    async fn update_planet(&self, id: i64, planet: NewPlanet) -> Result<Option<Planet>>;
    async fn delete_planet(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait PeopleRepository: Send + Sync {
    async fn list_people(&self) -> Result<Vec<People>>;
    async fn find_people(&self, id: i64) -> Result<Option<People>>;
    async fn create_people(&self, people: NewPeople) -> Result<People>;
    async fn update_people(&self, id: i64, people: NewPeople) -> Result<Option<People>>;
    async fn delete_people(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    async fn list_favorites(&self, filter: &FavoriteFilter) -> Result<Vec<FavoriteEntry>>;
    async fn list_user_favorites(&self, user_id: i64) -> Result<Vec<FavoriteView>>;
    async fn find_favorite(&self, id: i64) -> Result<Option<FavoriteView>>;
    async fn find_favorite_by_target(&self, user_id: i64, target: Target)
    -> Result<Option<Favorite>>;
    async fn create_favorite(&self, favorite: NewFavorite) -> Result<Favorite>;
    async fn update_favorite(&self, id: i64, favorite: NewFavorite) -> Result<Option<Favorite>>;
    async fn delete_favorite(&self, id: i64) -> Result<bool>;
}

/// Everything the services need from storage.
pub trait CatalogRepository:
    UserRepository + PlanetRepository + PeopleRepository + FavoriteRepository
{
}

impl<T> CatalogRepository for T where
    T: UserRepository + PlanetRepository + PeopleRepository + FavoriteRepository
{
}

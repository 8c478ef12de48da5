use crate::domain::error::DomainError;
use crate::domain::models::{FavoriteView, NewFavorite, People, Planet, Target};
use crate::domain::repository::CatalogRepository;
use crate::domain::user::User;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct CatalogService<R: CatalogRepository> {
    repository: Arc<R>,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn list_people(&self) -> Result<Vec<People>> {
        self.repository.list_people().await
    }

    pub async fn get_people(&self, id: i64) -> Result<People> {
        self.repository
            .find_people(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("People not found".to_string()).into())
    }

    pub async fn list_planets(&self) -> Result<Vec<Planet>> {
        self.repository.list_planets().await
    }

    pub async fn get_planet(&self, id: i64) -> Result<Planet> {
        self.repository
            .find_planet(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Planet not found".to_string()).into())
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.repository.list_users().await
    }

    #[instrument(skip(self))]
    pub async fn user_favorites(&self, user_id: i64) -> Result<Vec<FavoriteView>> {
        let user = self.require_user(user_id).await?;
        self.repository.list_user_favorites(user.id).await
    }

    /// Absent → present. A second add for the same target is a conflict,
    /// whether caught by the lookup here or by the storage unique constraint.
    #[instrument(skip(self))]
    pub async fn add_favorite(&self, user_id: i64, target: Target) -> Result<FavoriteView> {
        let user = self.require_user(user_id).await?;
        self.require_target(target).await?;

        if let Some(existing) = self
            .repository
            .find_favorite_by_target(user.id, target)
            .await?
        {
            warn!(favorite_id = existing.id, "Target already in favorites");
            return Err(DomainError::Conflict(already_favorite(target)).into());
        }

        let favorite = self
            .repository
            .create_favorite(NewFavorite {
                user_id: user.id,
                target,
            })
            .await
            .map_err(|e| {
                // Lost a race with an identical request.
                if matches!(e.downcast_ref::<DomainError>(), Some(DomainError::Conflict(_))) {
                    DomainError::Conflict(already_favorite(target)).into()
                } else {
                    e
                }
            })?;
        debug!(favorite_id = favorite.id, "Favorite stored");

        let view = self
            .repository
            .find_favorite(favorite.id)
            .await?
            .ok_or_else(|| DomainError::Internal("favorite vanished after insert".to_string()))?;
        info!(favorite_id = view.id, kind = target.kind(), "Favorite added");
        Ok(view)
    }

    /// Present → absent. Removing a target that is not a favorite is NotFound.
    #[instrument(skip(self))]
    pub async fn remove_favorite(&self, user_id: i64, target: Target) -> Result<()> {
        let user = self.require_user(user_id).await?;
        let not_found = || DomainError::NotFound(format!("Favorite {} not found", target.kind()));

        let favorite = self
            .repository
            .find_favorite_by_target(user.id, target)
            .await?
            .ok_or_else(not_found)?;

        if !self.repository.delete_favorite(favorite.id).await? {
            return Err(not_found().into());
        }
        info!(favorite_id = favorite.id, kind = target.kind(), "Favorite removed");
        Ok(())
    }

    async fn require_user(&self, user_id: i64) -> Result<User> {
        self.repository.find_user(user_id).await?.ok_or_else(|| {
            warn!(user_id, "Current user does not exist");
            DomainError::NotFound(missing_user_message(user_id)).into()
        })
    }

    async fn require_target(&self, target: Target) -> Result<()> {
        match target {
            Target::Planet(id) => self.get_planet(id).await.map(|_| ()),
            Target::People(id) => self.get_people(id).await.map(|_| ()),
        }
    }
}

pub fn missing_user_message(user_id: i64) -> String {
    format!("Current user (id={user_id}) not found. Create it in Admin.")
}

fn already_favorite(target: Target) -> String {
    match target {
        Target::Planet(_) => "Planet already in favorites".to_string(),
        Target::People(_) => "People already in favorites".to_string(),
    }
}

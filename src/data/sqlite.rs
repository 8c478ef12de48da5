use crate::data::schema;
use crate::domain::error::DomainError;
use crate::domain::models::{
    Favorite, FavoriteEntry, FavoriteFilter, FavoriteView, NewFavorite, NewPeople, NewPlanet,
    People, Planet, Target,
};
use crate::domain::repository::{
    FavoriteRepository, PeopleRepository, PlanetRepository, UserRepository,
};
use crate::domain::user::{NewUser, User};
use crate::infrastructure::database::create_pool;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, instrument, trace, warn};

const USER_COLUMNS: &str = "id, email, password, is_active";
const PLANET_COLUMNS: &str = "id, name, climate, terrain, population";
const PEOPLE_COLUMNS: &str = "id, name, gender, birth_year";
const FAVORITE_COLUMNS: &str = "id, user_id, planet_id, people_id";

/// Favorites joined with their owner and both possible targets.
const FAVORITE_JOIN: &str = r#"
    SELECT f.id, f.user_id, f.planet_id, f.people_id,
           u.email AS user_email,
           p.id AS p_id, p.name AS p_name, p.climate AS p_climate,
           p.terrain AS p_terrain, p.population AS p_population,
           pe.id AS pe_id, pe.name AS pe_name, pe.gender AS pe_gender,
           pe.birth_year AS pe_birth_year
    FROM favorite f
    LEFT JOIN "user" u ON u.id = f.user_id
    LEFT JOIN planet p ON p.id = f.planet_id
    LEFT JOIN people pe ON pe.id = f.people_id
"#;

#[derive(Debug, FromRow)]
struct FavoriteRow {
    id: i64,
    user_id: i64,
    planet_id: Option<i64>,
    people_id: Option<i64>,
}

impl TryFrom<FavoriteRow> for Favorite {
    type Error = DomainError;

    fn try_from(row: FavoriteRow) -> Result<Self, Self::Error> {
        Ok(Favorite {
            id: row.id,
            user_id: row.user_id,
            target: Target::from_columns(row.planet_id, row.people_id)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct FavoriteJoinRow {
    id: i64,
    user_id: i64,
    planet_id: Option<i64>,
    people_id: Option<i64>,
    user_email: Option<String>,
    p_id: Option<i64>,
    p_name: Option<String>,
    p_climate: Option<String>,
    p_terrain: Option<String>,
    p_population: Option<String>,
    pe_id: Option<i64>,
    pe_name: Option<String>,
    pe_gender: Option<String>,
    pe_birth_year: Option<String>,
}

impl FavoriteJoinRow {
    fn into_entry(self) -> Result<FavoriteEntry, DomainError> {
        let favorite = Favorite {
            id: self.id,
            user_id: self.user_id,
            target: Target::from_columns(self.planet_id, self.people_id)?,
        };
        let planet = match (self.p_id, self.p_name) {
            (Some(id), Some(name)) => Some(Planet {
                id,
                name,
                climate: self.p_climate,
                terrain: self.p_terrain,
                population: self.p_population,
            }),
            _ => None,
        };
        let people = match (self.pe_id, self.pe_name) {
            (Some(id), Some(name)) => Some(People {
                id,
                name,
                gender: self.pe_gender,
                birth_year: self.pe_birth_year,
            }),
            _ => None,
        };

        Ok(FavoriteEntry {
            favorite: FavoriteView::resolve(favorite, planet, people),
            user_email: self.user_email,
        })
    }
}

/// Translates constraint failures raised by SQLite into domain errors.
/// Anything else stays a raw database error.
fn constraint_error(err: sqlx::Error, entity: &str) -> anyhow::Error {
    if let Some(db_err) = err.as_database_error() {
        let detail = db_err.message().to_string();
        let mapped = match db_err.kind() {
            ErrorKind::UniqueViolation => {
                Some(DomainError::Conflict(format!("{entity} already exists")))
            }
            ErrorKind::ForeignKeyViolation => Some(DomainError::ConstraintViolation(format!(
                "{entity} references a row that does not exist"
            ))),
            ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                Some(DomainError::ConstraintViolation(format!("{entity}: {detail}")))
            }
            _ => None,
        };
        if let Some(mapped) = mapped {
            warn!(entity, error = %detail, "Storage constraint rejected write");
            return mapped.into();
        }
    }
    anyhow::Error::new(err).context(format!("failed to write {entity}"))
}

/// Deletes only trip a foreign key when the row is still referenced.
fn delete_error(err: sqlx::Error, entity: &str) -> anyhow::Error {
    let referenced = err
        .as_database_error()
        .is_some_and(|db_err| matches!(db_err.kind(), ErrorKind::ForeignKeyViolation));
    if referenced {
        warn!(entity, "Refusing to delete row still referenced by favorites");
        return DomainError::Conflict(format!("{entity} is still referenced by favorites")).into();
    }
    anyhow::Error::new(err).context(format!("failed to delete {entity}"))
}

enum Bind {
    Id(i64),
    Text(Option<String>),
}

fn blank_to_none(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens the pool and brings the schema up to date.
    pub async fn open(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = create_pool(database_url, max_connections)
            .await
            .context("failed to open database")?;
        schema::migrate(&pool)
            .await
            .context("failed to apply database schema")?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_entries(&self, clause: &str, binds: Vec<Bind>) -> Result<Vec<FavoriteEntry>> {
        let sql = format!("{FAVORITE_JOIN} {clause} ORDER BY f.id");
        let mut query = sqlx::query_as::<_, FavoriteJoinRow>(&sql);
        for bind in binds {
            query = match bind {
                Bind::Id(value) => query.bind(value),
                Bind::Text(value) => query.bind(value),
            };
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("failed to load favorites")?;
        trace!(count = rows.len(), "Loaded favorite rows");

        rows.into_iter()
            .map(|row| row.into_entry().map_err(anyhow::Error::from))
            .collect()
    }
}

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn list_users(&self) -> Result<Vec<User>> {
        let sql = format!(r#"SELECT {USER_COLUMNS} FROM "user" ORDER BY id"#);
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await
            .context("failed to list users")?;
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        let sql = format!(r#"SELECT {USER_COLUMNS} FROM "user" WHERE id = ?"#);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to load user")?;
        trace!(found = user.is_some(), "User lookup finished");
        Ok(user)
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let sql = format!(
            r#"INSERT INTO "user" (email, password, is_active) VALUES (?, ?, ?) RETURNING {USER_COLUMNS}"#
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "User"))?;
        debug!(user_id = created.id, "User inserted");
        Ok(created)
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn update_user(&self, id: i64, user: NewUser) -> Result<Option<User>> {
        let sql = format!(
            r#"UPDATE "user" SET email = ?, password = ?, is_active = ? WHERE id = ? RETURNING {USER_COLUMNS}"#
        );
        let updated = sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.is_active)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "User"))?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM "user" WHERE id = ?"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| delete_error(e, "User"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PlanetRepository for SqliteRepository {
    async fn list_planets(&self) -> Result<Vec<Planet>> {
        let sql = format!("SELECT {PLANET_COLUMNS} FROM planet ORDER BY id");
        let planets = sqlx::query_as::<_, Planet>(&sql)
            .fetch_all(&self.pool)
            .await
            .context("failed to list planets")?;
        Ok(planets)
    }

    #[instrument(skip(self))]
    async fn find_planet(&self, id: i64) -> Result<Option<Planet>> {
        let sql = format!("SELECT {PLANET_COLUMNS} FROM planet WHERE id = ?");
        let planet = sqlx::query_as::<_, Planet>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to load planet")?;
        Ok(planet)
    }

    #[instrument(skip(self, planet), fields(name = %planet.name))]
    async fn create_planet(&self, planet: NewPlanet) -> Result<Planet> {
        let sql = format!(
            "INSERT INTO planet (name, climate, terrain, population) VALUES (?, ?, ?, ?) RETURNING {PLANET_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Planet>(&sql)
            .bind(&planet.name)
            .bind(&planet.climate)
            .bind(&planet.terrain)
            .bind(&planet.population)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "Planet"))?;
        debug!(planet_id = created.id, "Planet inserted");
        Ok(created)
    }

    #[instrument(skip(self, planet), fields(name = %planet.name))]
    async fn update_planet(&self, id: i64, planet: NewPlanet) -> Result<Option<Planet>> {
        let sql = format!(
            "UPDATE planet SET name = ?, climate = ?, terrain = ?, population = ? WHERE id = ? RETURNING {PLANET_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Planet>(&sql)
            .bind(&planet.name)
            .bind(&planet.climate)
            .bind(&planet.terrain)
            .bind(&planet.population)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "Planet"))?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete_planet(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM planet WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| delete_error(e, "Planet"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PeopleRepository for SqliteRepository {
    async fn list_people(&self) -> Result<Vec<People>> {
        let sql = format!("SELECT {PEOPLE_COLUMNS} FROM people ORDER BY id");
        let people = sqlx::query_as::<_, People>(&sql)
            .fetch_all(&self.pool)
            .await
            .context("failed to list people")?;
        Ok(people)
    }

    #[instrument(skip(self))]
    async fn find_people(&self, id: i64) -> Result<Option<People>> {
        let sql = format!("SELECT {PEOPLE_COLUMNS} FROM people WHERE id = ?");
        let people = sqlx::query_as::<_, People>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to load people")?;
        Ok(people)
    }

    #[instrument(skip(self, people), fields(name = %people.name))]
    async fn create_people(&self, people: NewPeople) -> Result<People> {
        let sql = format!(
            "INSERT INTO people (name, gender, birth_year) VALUES (?, ?, ?) RETURNING {PEOPLE_COLUMNS}"
        );
        let created = sqlx::query_as::<_, People>(&sql)
            .bind(&people.name)
            .bind(&people.gender)
            .bind(&people.birth_year)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "People"))?;
        debug!(people_id = created.id, "People inserted");
        Ok(created)
    }

    #[instrument(skip(self, people), fields(name = %people.name))]
    async fn update_people(&self, id: i64, people: NewPeople) -> Result<Option<People>> {
        let sql = format!(
            "UPDATE people SET name = ?, gender = ?, birth_year = ? WHERE id = ? RETURNING {PEOPLE_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, People>(&sql)
            .bind(&people.name)
            .bind(&people.gender)
            .bind(&people.birth_year)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "People"))?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete_people(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM people WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| delete_error(e, "People"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl FavoriteRepository for SqliteRepository {
    #[instrument(skip(self))]
    async fn list_favorites(&self, filter: &FavoriteFilter) -> Result<Vec<FavoriteEntry>> {
        if filter.is_empty() {
            return self.fetch_entries("", Vec::new()).await;
        }

        let email = blank_to_none(&filter.user_email);
        let planet = blank_to_none(&filter.planet_name);
        let people = blank_to_none(&filter.people_name);

        // SQLite LIKE is case-insensitive for ASCII.
        let clause = r#"
            WHERE (? IS NULL OR u.email LIKE '%' || ? || '%')
              AND (? IS NULL OR p.name LIKE '%' || ? || '%')
              AND (? IS NULL OR pe.name LIKE '%' || ? || '%')
        "#;
        let binds = [email, planet, people]
            .into_iter()
            .flat_map(|value| [Bind::Text(value.clone()), Bind::Text(value)])
            .collect();
        self.fetch_entries(clause, binds).await
    }

    #[instrument(skip(self))]
    async fn list_user_favorites(&self, user_id: i64) -> Result<Vec<FavoriteView>> {
        let entries = self
            .fetch_entries("WHERE f.user_id = ?", vec![Bind::Id(user_id)])
            .await?;
        Ok(entries.into_iter().map(|entry| entry.favorite).collect())
    }

    #[instrument(skip(self))]
    async fn find_favorite(&self, id: i64) -> Result<Option<FavoriteView>> {
        let entries = self
            .fetch_entries("WHERE f.id = ?", vec![Bind::Id(id)])
            .await?;
        Ok(entries.into_iter().next().map(|entry| entry.favorite))
    }

    #[instrument(skip(self))]
    async fn find_favorite_by_target(
        &self,
        user_id: i64,
        target: Target,
    ) -> Result<Option<Favorite>> {
        let column = match target {
            Target::Planet(_) => "planet_id",
            Target::People(_) => "people_id",
        };
        let target_id = target.planet_id().or(target.people_id());
        let sql = format!("SELECT {FAVORITE_COLUMNS} FROM favorite WHERE user_id = ? AND {column} = ?");
        let row = sqlx::query_as::<_, FavoriteRow>(&sql)
            .bind(user_id)
            .bind(target_id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to look up favorite")?;

        row.map(Favorite::try_from)
            .transpose()
            .map_err(anyhow::Error::from)
    }

    #[instrument(skip(self))]
    async fn create_favorite(&self, favorite: NewFavorite) -> Result<Favorite> {
        let sql = format!(
            "INSERT INTO favorite (user_id, planet_id, people_id) VALUES (?, ?, ?) RETURNING {FAVORITE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, FavoriteRow>(&sql)
            .bind(favorite.user_id)
            .bind(favorite.target.planet_id())
            .bind(favorite.target.people_id())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "Favorite"))?;
        debug!(favorite_id = row.id, "Favorite inserted");
        Ok(Favorite::try_from(row)?)
    }

    #[instrument(skip(self))]
    async fn update_favorite(&self, id: i64, favorite: NewFavorite) -> Result<Option<Favorite>> {
        let sql = format!(
            "UPDATE favorite SET user_id = ?, planet_id = ?, people_id = ? WHERE id = ? RETURNING {FAVORITE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, FavoriteRow>(&sql)
            .bind(favorite.user_id)
            .bind(favorite.target.planet_id())
            .bind(favorite.target.people_id())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "Favorite"))?;

        row.map(Favorite::try_from)
            .transpose()
            .map_err(anyhow::Error::from)
    }

    #[instrument(skip(self))]
    async fn delete_favorite(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM favorite WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| delete_error(e, "Favorite"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> SqliteRepository {
        SqliteRepository::open("sqlite::memory:", 1).await.unwrap()
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password: "secret".to_string(),
            is_active: true,
        }
    }

    fn new_planet(name: &str) -> NewPlanet {
        NewPlanet {
            name: name.to_string(),
            climate: Some("temperate".to_string()),
            ..Default::default()
        }
    }

    fn new_people(name: &str) -> NewPeople {
        NewPeople {
            name: name.to_string(),
            gender: Some("male".to_string()),
            birth_year: Some("19BBY".to_string()),
        }
    }

    fn is_conflict(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<DomainError>(), Some(DomainError::Conflict(_)))
    }

    fn is_constraint(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::ConstraintViolation(_))
        )
    }

    #[tokio::test]
    async fn test_crud_planet() {
        let repo = repo().await;
        let created = repo.create_planet(new_planet("Alderaan")).await.unwrap();

        let found = repo.find_planet(created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.climate.as_deref(), Some("temperate"));
        assert!(found.terrain.is_none());

        let updated = repo
            .update_planet(created.id, new_planet("Alderaan (destroyed)"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Alderaan (destroyed)");

        assert!(repo.delete_planet(created.id).await.unwrap());
        assert!(!repo.delete_planet(created.id).await.unwrap());
        assert!(repo.find_planet(created.id).await.unwrap().is_none());
        assert!(repo.update_planet(created.id, new_planet("x")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_names_and_emails_conflict() {
        let repo = repo().await;
        repo.create_user(new_user("han@falcon.io")).await.unwrap();
        repo.create_planet(new_planet("Hoth")).await.unwrap();
        repo.create_people(new_people("Chewbacca")).await.unwrap();

        let err = repo.create_user(new_user("han@falcon.io")).await.unwrap_err();
        assert!(is_conflict(&err));
        let err = repo.create_planet(new_planet("Hoth")).await.unwrap_err();
        assert!(is_conflict(&err));
        let err = repo.create_people(new_people("Chewbacca")).await.unwrap_err();
        assert!(is_conflict(&err));
    }

    #[tokio::test]
    async fn test_duplicate_favorite_is_rejected_by_storage() {
        let repo = repo().await;
        let user = repo.create_user(new_user("leia@alderaan.gov")).await.unwrap();
        let planet = repo.create_planet(new_planet("Dagobah")).await.unwrap();
        let people = repo.create_people(new_people("Yoda")).await.unwrap();

        let favorite = NewFavorite {
            user_id: user.id,
            target: Target::Planet(planet.id),
        };
        repo.create_favorite(favorite).await.unwrap();
        let err = repo.create_favorite(favorite).await.unwrap_err();
        assert!(is_conflict(&err));

        // Same user may still favorite a person, and more than one.
        let other = repo.create_people(new_people("Obi-Wan")).await.unwrap();
        for id in [people.id, other.id] {
            repo.create_favorite(NewFavorite {
                user_id: user.id,
                target: Target::People(id),
            })
            .await
            .unwrap();
        }
        assert_eq!(repo.list_user_favorites(user.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_check_constraint_rejects_both_or_neither_target() {
        let repo = repo().await;
        let user = repo.create_user(new_user("rey@jakku.net")).await.unwrap();
        let planet = repo.create_planet(new_planet("Jakku")).await.unwrap();
        let people = repo.create_people(new_people("Rey")).await.unwrap();

        let both = sqlx::query("INSERT INTO favorite (user_id, planet_id, people_id) VALUES (?, ?, ?)")
            .bind(user.id)
            .bind(planet.id)
            .bind(people.id)
            .execute(repo.pool())
            .await
            .unwrap_err();
        assert!(is_constraint(&constraint_error(both, "Favorite")));

        let neither = sqlx::query("INSERT INTO favorite (user_id) VALUES (?)")
            .bind(user.id)
            .execute(repo.pool())
            .await
            .unwrap_err();
        assert!(is_constraint(&constraint_error(neither, "Favorite")));

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM favorite")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_favorite_to_missing_planet_violates_foreign_key() {
        let repo = repo().await;
        let user = repo.create_user(new_user("finn@first.order")).await.unwrap();

        let err = repo
            .create_favorite(NewFavorite {
                user_id: user.id,
                target: Target::Planet(404),
            })
            .await
            .unwrap_err();
        assert!(is_constraint(&err));
    }

    #[tokio::test]
    async fn test_deleting_user_cascades_to_favorites() {
        let repo = repo().await;
        let user = repo.create_user(new_user("luke@tatooine.net")).await.unwrap();
        let planet = repo.create_planet(new_planet("Tatooine")).await.unwrap();
        let favorite = repo
            .create_favorite(NewFavorite {
                user_id: user.id,
                target: Target::Planet(planet.id),
            })
            .await
            .unwrap();

        assert!(repo.delete_user(user.id).await.unwrap());
        assert!(repo.find_favorite(favorite.id).await.unwrap().is_none());
        assert!(repo.find_planet(planet.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_referenced_planet_cannot_be_deleted() {
        let repo = repo().await;
        let user = repo.create_user(new_user("lando@bespin.com")).await.unwrap();
        let planet = repo.create_planet(new_planet("Bespin")).await.unwrap();
        repo.create_favorite(NewFavorite {
            user_id: user.id,
            target: Target::Planet(planet.id),
        })
        .await
        .unwrap();

        let err = repo.delete_planet(planet.id).await.unwrap_err();
        assert!(is_conflict(&err));
        assert!(repo.find_planet(planet.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_favorite_by_target_is_scoped_to_user() {
        let repo = repo().await;
        let owner = repo.create_user(new_user("owner@example.com")).await.unwrap();
        let other = repo.create_user(new_user("other@example.com")).await.unwrap();
        let planet = repo.create_planet(new_planet("Naboo")).await.unwrap();
        let created = repo
            .create_favorite(NewFavorite {
                user_id: owner.id,
                target: Target::Planet(planet.id),
            })
            .await
            .unwrap();

        let found = repo
            .find_favorite_by_target(owner.id, Target::Planet(planet.id))
            .await
            .unwrap();
        assert_eq!(found, Some(created));
        assert!(
            repo.find_favorite_by_target(other.id, Target::Planet(planet.id))
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            repo.find_favorite_by_target(owner.id, Target::People(planet.id))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_favorites_filters_by_email_and_names() {
        let repo = repo().await;
        let luke = repo.create_user(new_user("luke@rebels.org")).await.unwrap();
        let vader = repo.create_user(new_user("vader@empire.gov")).await.unwrap();
        let hoth = repo.create_planet(new_planet("Hoth")).await.unwrap();
        let yoda = repo.create_people(new_people("Yoda")).await.unwrap();

        for (user_id, target) in [
            (luke.id, Target::Planet(hoth.id)),
            (luke.id, Target::People(yoda.id)),
            (vader.id, Target::Planet(hoth.id)),
        ] {
            repo.create_favorite(NewFavorite { user_id, target }).await.unwrap();
        }

        let all = repo.list_favorites(&FavoriteFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let blank = repo
            .list_favorites(&FavoriteFilter {
                user_email: Some("  ".to_string()),
                planet_name: Some(String::new()),
                people_name: None,
            })
            .await
            .unwrap();
        assert_eq!(blank.len(), 3);

        let by_email = repo
            .list_favorites(&FavoriteFilter {
                user_email: Some("REBELS".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_email.len(), 2);
        assert!(by_email.iter().all(|e| e.user_email.as_deref() == Some("luke@rebels.org")));

        let by_planet = repo
            .list_favorites(&FavoriteFilter {
                planet_name: Some("hoth".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_planet.len(), 2);

        let by_people = repo
            .list_favorites(&FavoriteFilter {
                user_email: Some("vader".to_string()),
                people_name: Some("yoda".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(by_people.is_empty());
    }

    #[tokio::test]
    async fn test_list_user_favorites_resolves_targets() {
        let repo = repo().await;
        let user = repo.create_user(new_user("poe@resistance.org")).await.unwrap();
        let planet = repo.create_planet(new_planet("Yavin IV")).await.unwrap();
        repo.create_favorite(NewFavorite {
            user_id: user.id,
            target: Target::Planet(planet.id),
        })
        .await
        .unwrap();

        let favorites = repo.list_user_favorites(user.id).await.unwrap();
        assert_eq!(favorites.len(), 1);
        let value = serde_json::to_value(&favorites[0]).unwrap();
        assert_eq!(value["type"], "planet");
        assert_eq!(value["planet"]["name"], "Yavin IV");
        assert_eq!(value["user_id"], user.id);
    }
}

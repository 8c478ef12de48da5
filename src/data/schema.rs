use sqlx::SqlitePool;
use tracing::{debug, info};

/// Table definitions, applied in order. Every statement is idempotent so the
/// schema can be applied on each startup.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS "user" (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email VARCHAR(120) NOT NULL UNIQUE,
        password VARCHAR(255) NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS planet (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name VARCHAR(120) NOT NULL UNIQUE,
        climate VARCHAR(80),
        terrain VARCHAR(80),
        population VARCHAR(40)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS people (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name VARCHAR(120) NOT NULL UNIQUE,
        gender VARCHAR(20),
        birth_year VARCHAR(20)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS favorite (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES "user"(id) ON DELETE CASCADE,
        planet_id INTEGER REFERENCES planet(id),
        people_id INTEGER REFERENCES people(id),
        CONSTRAINT uq_user_planet_fav UNIQUE (user_id, planet_id),
        CONSTRAINT uq_user_people_fav UNIQUE (user_id, people_id),
        CONSTRAINT ck_favorite_one_target CHECK (
            (planet_id IS NOT NULL AND people_id IS NULL)
            OR (planet_id IS NULL AND people_id IS NOT NULL)
        )
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_favorite_user ON favorite (user_id)",
];

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!(statements = SCHEMA.len(), "Applying database schema");
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    debug!("Database schema is up to date");
    Ok(())
}

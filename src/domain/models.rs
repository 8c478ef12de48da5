use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Planet {
    pub id: i64,
    pub name: String,
    pub climate: Option<String>,
    pub terrain: Option<String>,
    pub population: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct People {
    pub id: i64,
    pub name: String,
    pub gender: Option<String>,
    pub birth_year: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPlanet {
    pub name: String,
    pub climate: Option<String>,
    pub terrain: Option<String>,
    pub population: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPeople {
    pub name: String,
    pub gender: Option<String>,
    pub birth_year: Option<String>,
}

/// What a favorite points at. Exactly one of the two, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Planet(i64),
    People(i64),
}

impl Target {
    /// Rebuilds a target from the two nullable foreign key columns.
    pub fn from_columns(
        planet_id: Option<i64>,
        people_id: Option<i64>,
    ) -> Result<Self, DomainError> {
        match (planet_id, people_id) {
            (Some(id), None) => Ok(Target::Planet(id)),
            (None, Some(id)) => Ok(Target::People(id)),
            (Some(_), Some(_)) => Err(DomainError::Integrity(
                "favorite references both a planet and a person".to_string(),
            )),
            (None, None) => Err(DomainError::Integrity(
                "favorite references neither a planet nor a person".to_string(),
            )),
        }
    }

    pub fn planet_id(&self) -> Option<i64> {
        match self {
            Target::Planet(id) => Some(*id),
            Target::People(_) => None,
        }
    }

    pub fn people_id(&self) -> Option<i64> {
        match self {
            Target::People(id) => Some(*id),
            Target::Planet(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Target::Planet(_) => "planet",
            Target::People(_) => "people",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub target: Target,
}

#[derive(Debug, Clone, Copy)]
pub struct NewFavorite {
    pub user_id: i64,
    pub target: Target,
}

/// Transport form of a favorite, with the referenced entity embedded.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FavoriteView {
    pub id: i64,
    pub user_id: i64,
    pub planet_id: Option<i64>,
    pub people_id: Option<i64>,
    #[serde(flatten)]
    pub resolved: ResolvedTarget,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResolvedTarget {
    Planet { planet: Planet },
    People { people: People },
    Unknown,
}

impl FavoriteView {
    /// Pairs a favorite with whatever its target resolved to. A target that
    /// did not resolve (or resolved to a different row) is rendered as
    /// `unknown`.
    pub fn resolve(favorite: Favorite, planet: Option<Planet>, people: Option<People>) -> Self {
        let resolved = match favorite.target {
            Target::Planet(id) => match planet {
                Some(planet) if planet.id == id => ResolvedTarget::Planet { planet },
                _ => ResolvedTarget::Unknown,
            },
            Target::People(id) => match people {
                Some(people) if people.id == id => ResolvedTarget::People { people },
                _ => ResolvedTarget::Unknown,
            },
        };

        if resolved == ResolvedTarget::Unknown {
            warn!(
                favorite_id = favorite.id,
                target = favorite.target.kind(),
                "Favorite target could not be resolved"
            );
        }

        Self {
            id: favorite.id,
            user_id: favorite.user_id,
            planet_id: favorite.target.planet_id(),
            people_id: favorite.target.people_id(),
            resolved,
        }
    }
}

/// Favorite as listed in the admin panel, with the owner's email.
#[derive(Debug, Clone)]
pub struct FavoriteEntry {
    pub favorite: FavoriteView,
    pub user_email: Option<String>,
}

/// Admin search over favorites. All matches are case-insensitive substrings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoriteFilter {
    #[serde(rename = "search")]
    pub user_email: Option<String>,
    #[serde(rename = "planet")]
    pub planet_name: Option<String>,
    #[serde(rename = "people")]
    pub people_name: Option<String>,
}

impl FavoriteFilter {
    pub fn is_empty(&self) -> bool {
        [&self.user_email, &self.planet_name, &self.people_name]
            .iter()
            .all(|field| field.as_deref().is_none_or(|v| v.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tatooine() -> Planet {
        Planet {
            id: 5,
            name: "Tatooine".to_string(),
            climate: Some("arid".to_string()),
            terrain: Some("desert".to_string()),
            population: Some("200000".to_string()),
        }
    }

    fn leia() -> People {
        People {
            id: 5,
            name: "Leia Organa".to_string(),
            gender: Some("female".to_string()),
            birth_year: Some("19BBY".to_string()),
        }
    }

    #[test]
    fn test_target_from_columns_requires_exactly_one() {
        assert_eq!(Target::from_columns(Some(3), None).unwrap(), Target::Planet(3));
        assert_eq!(Target::from_columns(None, Some(4)).unwrap(), Target::People(4));
        assert!(matches!(
            Target::from_columns(Some(1), Some(2)),
            Err(DomainError::Integrity(_))
        ));
        assert!(matches!(
            Target::from_columns(None, None),
            Err(DomainError::Integrity(_))
        ));
    }

    #[test]
    fn test_planet_favorite_embeds_planet() {
        let favorite = Favorite {
            id: 1,
            user_id: 1,
            target: Target::Planet(5),
        };
        let view = FavoriteView::resolve(favorite, Some(tatooine()), None);

        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["type"], "planet");
        assert_eq!(value["planet_id"], 5);
        assert!(value["people_id"].is_null());
        assert_eq!(value["planet"]["name"], "Tatooine");
        assert_eq!(value["planet"]["climate"], "arid");
        assert!(value.get("people").is_none());
    }

    #[test]
    fn test_people_favorite_embeds_people() {
        let favorite = Favorite {
            id: 2,
            user_id: 1,
            target: Target::People(5),
        };
        let view = FavoriteView::resolve(favorite, None, Some(leia()));

        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["type"], "people");
        assert_eq!(value["people_id"], 5);
        assert_eq!(value["people"]["birth_year"], "19BBY");
    }

    #[test]
    fn test_unresolved_target_is_unknown() {
        let favorite = Favorite {
            id: 3,
            user_id: 1,
            target: Target::Planet(9),
        };
        // Wrong row and missing row both count as unresolved.
        let mismatched = FavoriteView::resolve(favorite, Some(tatooine()), None);
        let missing = FavoriteView::resolve(favorite, None, None);

        assert_eq!(mismatched.resolved, ResolvedTarget::Unknown);
        let value = serde_json::to_value(&missing).unwrap();
        assert_eq!(value["type"], "unknown");
        assert_eq!(value["planet_id"], 9);
        assert!(value.get("planet").is_none());
    }

    #[test]
    fn test_filter_is_empty_ignores_blank_fields() {
        let filter = FavoriteFilter {
            user_email: Some("  ".to_string()),
            planet_name: None,
            people_name: Some(String::new()),
        };
        assert!(filter.is_empty());

        let filter = FavoriteFilter {
            planet_name: Some("hoth".to_string()),
            ..Default::default()
        };
        assert!(!filter.is_empty());
    }
}

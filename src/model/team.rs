use crate::model::schema::{players, teams};
use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Queryable, Selectable)]
#[diesel(table_name = teams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Team {
    pub id: String,
    pub name: String,
    pub city: Option<String>,
    pub founded_year: Option<i32>,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TeamWithPlayers {
    #[serde(flatten)]
    pub team: Team,
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable)]
#[diesel(table_name = players)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Player {
    pub id: String,
    pub team_id: String,
    pub name: String,
    pub full_name: Option<String>,
    pub number: String,
    pub position: Option<String>,
    pub height_cm: Option<i32>,
    pub age: Option<i32>,
    pub nationality: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A player joined with whatever is left of its team row.
#[derive(Debug, Serialize)]
pub struct PlayerWithTeam {
    #[serde(flatten)]
    pub player: Player,
    pub team_name: Option<String>,
    pub team_city: Option<String>,
    pub team_logo: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamSchema {
    #[validate(length(min = 1, max = 50, message = "Team id is required (max 50 characters)"))]
    pub id: String,
    #[validate(length(min = 1, max = 100, message = "Team name is required (max 100 characters)"))]
    pub name: String,
    pub city: Option<String>,
    #[validate(range(min = 1800, max = 2100, message = "Founded year is out of range"))]
    pub founded_year: Option<i32>,
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTeamSchema {
    #[validate(length(min = 1, max = 100, message = "Team name is required (max 100 characters)"))]
    pub name: String,
    pub city: Option<String>,
    #[validate(range(min = 1800, max = 2100, message = "Founded year is out of range"))]
    pub founded_year: Option<i32>,
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    pub search: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = teams)]
pub struct NewTeam<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub city: Option<&'a str>,
    pub founded_year: Option<i32>,
    pub logo: Option<&'a str>,
}

/// Full replacement of a team's editable columns; `None` clears the column.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = teams)]
#[diesel(treat_none_as_null = true)]
pub struct TeamChanges<'a> {
    pub name: &'a str,
    pub city: Option<&'a str>,
    pub founded_year: Option<i32>,
    pub logo: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlayerSchema {
    #[validate(length(min = 1, max = 50, message = "Player id is required (max 50 characters)"))]
    pub id: String,
    #[validate(length(min = 1, max = 100, message = "Player name is required (max 100 characters)"))]
    pub name: String,
    pub full_name: Option<String>,
    #[validate(length(min = 1, max = 10, message = "Player number is required (max 10 characters)"))]
    pub number: String,
    pub position: Option<String>,
    #[validate(range(min = 100, max = 260, message = "Height must be between 100 and 260 cm"))]
    pub height_cm: Option<i32>,
    #[validate(range(min = 10, max = 70, message = "Age must be between 10 and 70"))]
    pub age: Option<i32>,
    pub nationality: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePlayerSchema {
    #[validate(length(min = 1, max = 100, message = "Player name is required (max 100 characters)"))]
    pub name: String,
    pub full_name: Option<String>,
    #[validate(length(min = 1, max = 10, message = "Player number is required (max 10 characters)"))]
    pub number: String,
    pub position: Option<String>,
    #[validate(range(min = 100, max = 260, message = "Height must be between 100 and 260 cm"))]
    pub height_cm: Option<i32>,
    #[validate(range(min = 10, max = 70, message = "Age must be between 10 and 70"))]
    pub age: Option<i32>,
    pub nationality: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerQuery {
    pub search: Option<String>,
    #[serde(rename = "teamId")]
    pub team_id: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = players)]
pub struct NewPlayer<'a> {
    pub id: &'a str,
    pub team_id: &'a str,
    pub name: &'a str,
    pub full_name: Option<&'a str>,
    pub number: &'a str,
    pub position: Option<&'a str>,
    pub height_cm: Option<i32>,
    pub age: Option<i32>,
    pub nationality: Option<&'a str>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = players)]
#[diesel(treat_none_as_null = true)]
pub struct PlayerChanges<'a> {
    pub name: &'a str,
    pub full_name: Option<&'a str>,
    pub number: &'a str,
    pub position: Option<&'a str>,
    pub height_cm: Option<i32>,
    pub age: Option<i32>,
    pub nationality: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl CreateTeamSchema {
    pub fn as_new_team(&self) -> NewTeam<'_> {
        NewTeam {
            id: &self.id,
            name: &self.name,
            city: self.city.as_deref(),
            founded_year: self.founded_year,
            logo: self.logo.as_deref(),
        }
    }
}

impl UpdateTeamSchema {
    pub fn as_changes(&self, now: DateTime<Utc>) -> TeamChanges<'_> {
        TeamChanges {
            name: &self.name,
            city: self.city.as_deref(),
            founded_year: self.founded_year,
            logo: self.logo.as_deref(),
            updated_at: now,
        }
    }
}

impl CreatePlayerSchema {
    pub fn as_new_player<'a>(&'a self, team_id: &'a str) -> NewPlayer<'a> {
        NewPlayer {
            id: &self.id,
            team_id,
            name: &self.name,
            full_name: self.full_name.as_deref(),
            number: &self.number,
            position: self.position.as_deref(),
            height_cm: self.height_cm,
            age: self.age,
            nationality: self.nationality.as_deref(),
        }
    }
}

impl UpdatePlayerSchema {
    pub fn as_changes(&self, now: DateTime<Utc>) -> PlayerChanges<'_> {
        PlayerChanges {
            name: &self.name,
            full_name: self.full_name.as_deref(),
            number: &self.number,
            position: self.position.as_deref(),
            height_cm: self.height_cm,
            age: self.age,
            nationality: self.nationality.as_deref(),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_with_players_flattens_the_team_fields() {
        let now = Utc::now();
        let body = serde_json::to_value(TeamWithPlayers {
            team: Team {
                id: "T1".to_string(),
                name: "Harbor Hawks".to_string(),
                city: Some("Valparaiso".to_string()),
                founded_year: Some(1998),
                logo: None,
                created_at: now,
                updated_at: now,
            },
            players: vec![],
        })
        .unwrap();

        assert_eq!(body["id"], "T1");
        assert_eq!(body["name"], "Harbor Hawks");
        assert_eq!(body["players"], serde_json::json!([]));
        assert!(body["logo"].is_null());
    }

    #[test]
    fn player_payload_requires_name_and_number() {
        let schema: CreatePlayerSchema =
            serde_json::from_str(r#"{"id":"P1","name":"","number":""}"#).unwrap();
        let errors = schema.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("number"));
    }

    #[test]
    fn player_query_reads_camel_case_team_filter() {
        let query: PlayerQuery =
            serde_json::from_str(r#"{"teamId":"T9","position":"Center"}"#).unwrap();
        assert_eq!(query.team_id.as_deref(), Some("T9"));
        assert_eq!(query.position.as_deref(), Some("Center"));
        assert!(query.search.is_none());
    }
}

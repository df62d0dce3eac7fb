use crate::model::schema::{game_roster, scheduled_games};
use crate::model::{text_column_enum, UnknownVariant};
use chrono::{DateTime, Utc};
use diesel::expression::AsExpression;
use diesel::sql_types::Text;
use diesel::{AsChangeset, FromSqlRow, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::{Validate, ValidationError};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Scheduled => "scheduled",
            GameStatus::InProgress => "in_progress",
            GameStatus::Completed => "completed",
            GameStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        GameStatus::Scheduled
    }
}

impl FromStr for GameStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(GameStatus::Scheduled),
            "in_progress" => Ok(GameStatus::InProgress),
            "completed" => Ok(GameStatus::Completed),
            "cancelled" => Ok(GameStatus::Cancelled),
            other => Err(UnknownVariant {
                kind: "game status",
                value: other.to_string(),
            }),
        }
    }
}

text_column_enum!(GameStatus);

/// Which side of the game a rostered player lines up on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
pub enum RosterSide {
    A,
    B,
}

impl RosterSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            RosterSide::A => "A",
            RosterSide::B => "B",
        }
    }
}

impl FromStr for RosterSide {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(RosterSide::A),
            "B" => Ok(RosterSide::B),
            other => Err(UnknownVariant {
                kind: "roster side",
                value: other.to_string(),
            }),
        }
    }
}

text_column_enum!(RosterSide);

#[derive(Debug, Clone, Serialize, Queryable, Selectable)]
#[diesel(table_name = scheduled_games)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ScheduledGame {
    pub id: i32,
    #[serde(rename = "teamA_id")]
    pub team_a_id: String,
    #[serde(rename = "teamA_name")]
    pub team_a_name: String,
    #[serde(rename = "teamB_id")]
    pub team_b_id: String,
    #[serde(rename = "teamB_name")]
    pub team_b_name: String,
    pub scheduled_date: DateTime<Utc>,
    pub location: Option<String>,
    pub status: GameStatus,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// A roster row joined with the player's current details.
#[derive(Debug, Clone, PartialEq, Serialize, Queryable)]
pub struct RosterPlayer {
    pub id: i32,
    #[serde(skip)]
    pub scheduled_game_id: i32,
    pub player_id: String,
    pub team: RosterSide,
    pub name: String,
    pub full_name: Option<String>,
    pub number: String,
    pub position: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScheduledGameWithRoster {
    #[serde(flatten)]
    pub game: ScheduledGame,
    pub roster: Vec<RosterPlayer>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RosterEntryInput {
    pub player_id: String,
    pub team: RosterSide,
}

fn check_matchup(
    team_a_id: &str,
    team_b_id: &str,
    roster: &[RosterEntryInput],
) -> Result<(), ValidationError> {
    if team_a_id == team_b_id {
        let mut err = ValidationError::new("same_team");
        err.message = Some("A team cannot be scheduled against itself".into());
        return Err(err);
    }
    if roster.iter().any(|entry| entry.player_id.trim().is_empty()) {
        let mut err = ValidationError::new("roster_player_id");
        err.message = Some("Every roster entry needs a player id".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "create_matchup_is_valid", skip_on_field_errors = false))]
pub struct CreateScheduledGameSchema {
    #[serde(rename = "teamA_id")]
    #[validate(length(min = 1, message = "Team A is required"))]
    pub team_a_id: String,
    #[serde(rename = "teamA_name")]
    pub team_a_name: Option<String>,
    #[serde(rename = "teamB_id")]
    #[validate(length(min = 1, message = "Team B is required"))]
    pub team_b_id: String,
    #[serde(rename = "teamB_name")]
    pub team_b_name: Option<String>,
    pub scheduled_date: DateTime<Utc>,
    pub location: Option<String>,
    #[serde(default)]
    pub roster: Vec<RosterEntryInput>,
}

fn create_matchup_is_valid(schema: &CreateScheduledGameSchema) -> Result<(), ValidationError> {
    check_matchup(&schema.team_a_id, &schema.team_b_id, &schema.roster)
}

/// Full replacement of a scheduled game. `roster: None` (absent or null) keeps the
/// stored roster; `Some(vec![])` clears it.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "update_matchup_is_valid", skip_on_field_errors = false))]
pub struct UpdateScheduledGameSchema {
    #[serde(rename = "teamA_id")]
    #[validate(length(min = 1, message = "Team A is required"))]
    pub team_a_id: String,
    #[serde(rename = "teamA_name")]
    pub team_a_name: Option<String>,
    #[serde(rename = "teamB_id")]
    #[validate(length(min = 1, message = "Team B is required"))]
    pub team_b_id: String,
    #[serde(rename = "teamB_name")]
    pub team_b_name: Option<String>,
    pub scheduled_date: DateTime<Utc>,
    pub location: Option<String>,
    pub status: Option<GameStatus>,
    pub roster: Option<Vec<RosterEntryInput>>,
}

fn update_matchup_is_valid(schema: &UpdateScheduledGameSchema) -> Result<(), ValidationError> {
    check_matchup(
        &schema.team_a_id,
        &schema.team_b_id,
        schema.roster.as_deref().unwrap_or_default(),
    )
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusSchema {
    pub status: GameStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScheduledGameQuery {
    pub status: Option<GameStatus>,
    #[serde(rename = "teamId")]
    pub team_id: Option<String>,
    #[serde(rename = "fromDate")]
    pub from_date: Option<String>,
    #[serde(rename = "toDate")]
    pub to_date: Option<String>,
}

/// Resolved filter for listing games; date bounds are inclusive.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScheduledGameFilter {
    pub status: Option<GameStatus>,
    pub team_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = scheduled_games)]
pub struct NewScheduledGame<'a> {
    pub team_a_id: &'a str,
    pub team_a_name: &'a str,
    pub team_b_id: &'a str,
    pub team_b_name: &'a str,
    pub scheduled_date: DateTime<Utc>,
    pub location: Option<&'a str>,
    pub status: GameStatus,
    pub created_by: Option<i32>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = scheduled_games)]
#[diesel(treat_none_as_null = true)]
pub struct ScheduledGameChanges<'a> {
    pub team_a_id: &'a str,
    pub team_a_name: &'a str,
    pub team_b_id: &'a str,
    pub team_b_name: &'a str,
    pub scheduled_date: DateTime<Utc>,
    pub location: Option<&'a str>,
    pub status: GameStatus,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = game_roster)]
pub struct NewRosterEntry<'a> {
    pub scheduled_game_id: i32,
    pub player_id: &'a str,
    pub team: RosterSide,
}

/// Scalar fields of a game write. Missing team names are filled in from `teams`.
#[derive(Debug, Clone)]
pub struct GameFields {
    pub team_a_id: String,
    pub team_a_name: Option<String>,
    pub team_b_id: String,
    pub team_b_name: Option<String>,
    pub scheduled_date: DateTime<Utc>,
    pub location: Option<String>,
    pub status: GameStatus,
}

impl CreateScheduledGameSchema {
    pub fn into_parts(self) -> (GameFields, Vec<RosterEntryInput>) {
        (
            GameFields {
                team_a_id: self.team_a_id,
                team_a_name: self.team_a_name,
                team_b_id: self.team_b_id,
                team_b_name: self.team_b_name,
                scheduled_date: self.scheduled_date,
                location: self.location,
                status: GameStatus::Scheduled,
            },
            self.roster,
        )
    }
}

impl UpdateScheduledGameSchema {
    pub fn into_parts(self) -> (GameFields, Option<Vec<RosterEntryInput>>) {
        (
            GameFields {
                team_a_id: self.team_a_id,
                team_a_name: self.team_a_name,
                team_b_id: self.team_b_id,
                team_b_name: self.team_b_name,
                scheduled_date: self.scheduled_date,
                location: self.location,
                status: self.status.unwrap_or_default(),
            },
            self.roster,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_uses_snake_case_on_the_wire() {
        assert_eq!(
            serde_json::to_value(GameStatus::InProgress).unwrap(),
            json!("in_progress")
        );
        for status in [
            GameStatus::Scheduled,
            GameStatus::InProgress,
            GameStatus::Completed,
            GameStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<GameStatus>().unwrap(), status);
        }
        assert!("postponed".parse::<GameStatus>().is_err());
    }

    #[test]
    fn create_payload_defaults_to_an_empty_roster() {
        let schema: CreateScheduledGameSchema = serde_json::from_value(json!({
            "teamA_id": "T1",
            "teamB_id": "T2",
            "scheduled_date": "2024-03-01T18:00:00Z"
        }))
        .unwrap();
        assert!(schema.roster.is_empty());
        assert!(schema.validate().is_ok());

        let (fields, roster) = schema.into_parts();
        assert!(roster.is_empty());
        assert_eq!(fields.status, GameStatus::Scheduled);
    }

    #[test]
    fn create_payload_rejects_a_team_playing_itself() {
        let schema: CreateScheduledGameSchema = serde_json::from_value(json!({
            "teamA_id": "T1",
            "teamB_id": "T1",
            "scheduled_date": "2024-03-01T18:00:00Z"
        }))
        .unwrap();
        assert!(schema.validate().is_err());
    }

    #[test]
    fn create_payload_rejects_blank_roster_player_ids() {
        let schema: CreateScheduledGameSchema = serde_json::from_value(json!({
            "teamA_id": "T1",
            "teamB_id": "T2",
            "scheduled_date": "2024-03-01T18:00:00Z",
            "roster": [{"player_id": " ", "team": "A"}]
        }))
        .unwrap();
        assert!(schema.validate().is_err());
    }

    #[test]
    fn roster_side_must_be_a_or_b() {
        let parsed = serde_json::from_value::<RosterEntryInput>(json!({
            "player_id": "P1",
            "team": "C"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn update_distinguishes_missing_roster_from_empty_roster() {
        let base = json!({
            "teamA_id": "T1",
            "teamB_id": "T2",
            "scheduled_date": "2024-03-01T18:00:00Z"
        });

        let omitted: UpdateScheduledGameSchema = serde_json::from_value(base.clone()).unwrap();
        assert!(omitted.roster.is_none());
        assert!(omitted.status.is_none());

        let mut with_empty = base;
        with_empty["roster"] = json!([]);
        let cleared: UpdateScheduledGameSchema = serde_json::from_value(with_empty).unwrap();
        assert_eq!(cleared.roster.as_ref().map(Vec::len), Some(0));

        let (fields, roster) = cleared.into_parts();
        assert_eq!(fields.status, GameStatus::Scheduled);
        assert!(roster.is_some());
    }

    #[test]
    fn game_serializes_with_team_letter_field_names() {
        let now = Utc::now();
        let body = serde_json::to_value(ScheduledGameWithRoster {
            game: ScheduledGame {
                id: 7,
                team_a_id: "T1".to_string(),
                team_a_name: "Hawks".to_string(),
                team_b_id: "T2".to_string(),
                team_b_name: "Owls".to_string(),
                scheduled_date: now,
                location: None,
                status: GameStatus::Scheduled,
                created_by: Some(1),
                created_at: now,
            },
            roster: vec![RosterPlayer {
                id: 1,
                scheduled_game_id: 7,
                player_id: "P1".to_string(),
                team: RosterSide::A,
                name: "Soto".to_string(),
                full_name: None,
                number: "23".to_string(),
                position: Some("Guard".to_string()),
            }],
        })
        .unwrap();

        assert_eq!(body["teamA_id"], "T1");
        assert_eq!(body["teamB_name"], "Owls");
        assert_eq!(body["status"], "scheduled");
        assert_eq!(body["roster"][0]["team"], "A");
        assert!(body["roster"][0].get("scheduled_game_id").is_none());
    }
}

use crate::error::ApiError;
use crate::model::response::{CreatedGame, CreatedResponse, MessageResponse};
use crate::model::scheduled_game::{
    CreateScheduledGameSchema, ScheduledGameFilter, ScheduledGameQuery, UpdateScheduledGameSchema,
    UpdateStatusSchema,
};
use crate::model::token_claims::Identity;
use crate::service::non_blank;
use crate::AppState;
use actix_web::HttpResponse;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::info;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Start,
    End,
}

/// Reads an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (UTC). A plain date used as
/// the upper bound covers the whole day.
pub fn parse_date_bound(raw: &str, bound: DateBound) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let naive = match bound {
        DateBound::Start => date.and_hms_opt(0, 0, 0)?,
        DateBound::End => date.and_hms_micro_opt(23, 59, 59, 999_999)?,
    };
    Some(Utc.from_utc_datetime(&naive))
}

impl TryFrom<ScheduledGameQuery> for ScheduledGameFilter {
    type Error = ApiError;

    fn try_from(query: ScheduledGameQuery) -> Result<Self, Self::Error> {
        let from = non_blank(query.from_date)
            .map(|raw| {
                parse_date_bound(&raw, DateBound::Start).ok_or_else(|| {
                    ApiError::Validation(format!("fromDate: not a valid date: {raw}"))
                })
            })
            .transpose()?;
        let to = non_blank(query.to_date)
            .map(|raw| {
                parse_date_bound(&raw, DateBound::End)
                    .ok_or_else(|| ApiError::Validation(format!("toDate: not a valid date: {raw}")))
            })
            .transpose()?;

        Ok(ScheduledGameFilter {
            status: query.status,
            team_id: non_blank(query.team_id),
            from,
            to,
        })
    }
}

pub async fn list_scheduled_games_service(
    data: &AppState,
    query: ScheduledGameQuery,
) -> Result<HttpResponse, ApiError> {
    let filter = ScheduledGameFilter::try_from(query)?;
    let games = data.db.list_scheduled_games(&filter).await?;
    Ok(HttpResponse::Ok().json(games))
}

pub async fn get_scheduled_game_service(
    data: &AppState,
    game_id: i32,
) -> Result<HttpResponse, ApiError> {
    let game = data.db.get_scheduled_game(game_id).await?;
    Ok(HttpResponse::Ok().json(game))
}

pub async fn create_scheduled_game_service(
    data: &AppState,
    caller: &Identity,
    new_game: CreateScheduledGameSchema,
) -> Result<HttpResponse, ApiError> {
    new_game.validate()?;
    let (fields, roster) = new_game.into_parts();

    let game_id = data
        .db
        .create_scheduled_game(&fields, &roster, caller.id)
        .await?;

    info!(
        "User {} scheduled game {} ({} vs {}) with {} roster entries",
        caller.username,
        game_id,
        fields.team_a_id,
        fields.team_b_id,
        roster.len()
    );
    Ok(HttpResponse::Created().json(CreatedResponse {
        message: "Scheduled game created successfully",
        created: CreatedGame { game_id },
    }))
}

pub async fn update_scheduled_game_service(
    data: &AppState,
    game_id: i32,
    changes: UpdateScheduledGameSchema,
) -> Result<HttpResponse, ApiError> {
    changes.validate()?;
    let (fields, roster) = changes.into_parts();

    data.db
        .update_scheduled_game(game_id, &fields, roster.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Scheduled game updated successfully",
    }))
}

pub async fn update_game_status_service(
    data: &AppState,
    game_id: i32,
    change: UpdateStatusSchema,
) -> Result<HttpResponse, ApiError> {
    data.db.update_game_status(game_id, change.status).await?;
    info!("Game {} is now {}", game_id, change.status.as_str());
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Game status updated successfully",
    }))
}

pub async fn delete_scheduled_game_service(
    data: &AppState,
    game_id: i32,
) -> Result<HttpResponse, ApiError> {
    data.db.delete_scheduled_game(game_id).await?;
    info!("Scheduled game {} deleted", game_id);
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Scheduled game deleted successfully",
    }))
}

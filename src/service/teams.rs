use crate::error::ApiError;
use crate::model::response::{CreatedId, CreatedResponse, MessageResponse};
use crate::model::team::{
    CreatePlayerSchema, CreateTeamSchema, PlayerQuery, TeamQuery, UpdatePlayerSchema,
    UpdateTeamSchema,
};
use crate::repository::teams::{PlayerFilter, TeamFilter};
use crate::service::non_blank;
use crate::AppState;
use actix_web::HttpResponse;
use chrono::Utc;
use log::info;
use validator::Validate;

impl From<TeamQuery> for TeamFilter {
    fn from(query: TeamQuery) -> Self {
        TeamFilter {
            search: non_blank(query.search),
            city: non_blank(query.city),
        }
    }
}

impl From<PlayerQuery> for PlayerFilter {
    fn from(query: PlayerQuery) -> Self {
        PlayerFilter {
            search: non_blank(query.search),
            team_id: non_blank(query.team_id),
            position: non_blank(query.position),
        }
    }
}

pub async fn list_teams_service(data: &AppState, query: TeamQuery) -> Result<HttpResponse, ApiError> {
    let teams = data.db.list_teams(&TeamFilter::from(query)).await?;
    Ok(HttpResponse::Ok().json(teams))
}

pub async fn get_team_service(data: &AppState, team_id: &str) -> Result<HttpResponse, ApiError> {
    let team = data.db.get_team(team_id).await?;
    Ok(HttpResponse::Ok().json(team))
}

pub async fn create_team_service(
    data: &AppState,
    new_team: CreateTeamSchema,
) -> Result<HttpResponse, ApiError> {
    new_team.validate()?;
    data.db.create_team(new_team.as_new_team()).await?;
    info!("Team {} created", new_team.id);
    Ok(HttpResponse::Created().json(CreatedResponse {
        message: "Team created successfully",
        created: CreatedId { id: &new_team.id },
    }))
}

pub async fn update_team_service(
    data: &AppState,
    team_id: &str,
    changes: UpdateTeamSchema,
) -> Result<HttpResponse, ApiError> {
    changes.validate()?;
    data.db
        .update_team(team_id, changes.as_changes(Utc::now()))
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Team updated successfully",
    }))
}

pub async fn delete_team_service(data: &AppState, team_id: &str) -> Result<HttpResponse, ApiError> {
    data.db.delete_team(team_id).await?;
    info!("Team {} and its players deleted", team_id);
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Team deleted successfully",
    }))
}

pub async fn add_player_service(
    data: &AppState,
    team_id: &str,
    new_player: CreatePlayerSchema,
) -> Result<HttpResponse, ApiError> {
    new_player.validate()?;
    data.db.add_player(new_player.as_new_player(team_id)).await?;
    info!("Player {} added to team {}", new_player.id, team_id);
    Ok(HttpResponse::Created().json(CreatedResponse {
        message: "Player added successfully",
        created: CreatedId { id: &new_player.id },
    }))
}

pub async fn list_players_service(
    data: &AppState,
    query: PlayerQuery,
) -> Result<HttpResponse, ApiError> {
    let players = data.db.list_players(&PlayerFilter::from(query)).await?;
    Ok(HttpResponse::Ok().json(players))
}

pub async fn get_player_service(data: &AppState, player_id: &str) -> Result<HttpResponse, ApiError> {
    let player = data.db.get_player(player_id).await?;
    Ok(HttpResponse::Ok().json(player))
}

pub async fn update_player_service(
    data: &AppState,
    player_id: &str,
    changes: UpdatePlayerSchema,
) -> Result<HttpResponse, ApiError> {
    changes.validate()?;
    data.db
        .update_player(player_id, changes.as_changes(Utc::now()))
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Player updated successfully",
    }))
}

pub async fn delete_player_service(
    data: &AppState,
    player_id: &str,
) -> Result<HttpResponse, ApiError> {
    data.db.delete_player(player_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Player deleted successfully",
    }))
}

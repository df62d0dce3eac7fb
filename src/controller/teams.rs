use crate::config::jwt_auth::{AnyStaff, Authorized, JwtMiddleware};
use crate::error::ApiError;
use crate::model::team::{
    CreatePlayerSchema, CreateTeamSchema, PlayerQuery, TeamQuery, UpdatePlayerSchema,
    UpdateTeamSchema,
};
use crate::service::teams::{
    add_player_service, create_team_service, delete_player_service, delete_team_service,
    get_player_service, get_team_service, list_players_service, list_teams_service,
    update_player_service, update_team_service,
};
use crate::AppState;
use actix_web::web::{Data, Json, Path, Query};
use actix_web::{delete, get, post, put, web, HttpResponse};

#[get("")]
async fn list_teams_handler(
    data: Data<AppState>,
    _: JwtMiddleware,
    query: Query<TeamQuery>,
) -> Result<HttpResponse, ApiError> {
    list_teams_service(&data, query.into_inner()).await
}

#[post("")]
async fn create_team_handler(
    data: Data<AppState>,
    _: Authorized<AnyStaff>,
    new_team: Json<CreateTeamSchema>,
) -> Result<HttpResponse, ApiError> {
    create_team_service(&data, new_team.into_inner()).await
}

#[get("/players/all")]
async fn list_players_handler(
    data: Data<AppState>,
    _: JwtMiddleware,
    query: Query<PlayerQuery>,
) -> Result<HttpResponse, ApiError> {
    list_players_service(&data, query.into_inner()).await
}

#[get("/players/{player_id}")]
async fn get_player_handler(
    data: Data<AppState>,
    _: JwtMiddleware,
    path: Path<String>,
) -> Result<HttpResponse, ApiError> {
    get_player_service(&data, &path).await
}

#[put("/players/{player_id}")]
async fn update_player_handler(
    data: Data<AppState>,
    _: Authorized<AnyStaff>,
    path: Path<String>,
    changes: Json<UpdatePlayerSchema>,
) -> Result<HttpResponse, ApiError> {
    update_player_service(&data, &path, changes.into_inner()).await
}

#[delete("/players/{player_id}")]
async fn delete_player_handler(
    data: Data<AppState>,
    _: Authorized<AnyStaff>,
    path: Path<String>,
) -> Result<HttpResponse, ApiError> {
    delete_player_service(&data, &path).await
}

#[get("/{team_id}")]
async fn get_team_handler(
    data: Data<AppState>,
    _: JwtMiddleware,
    path: Path<String>,
) -> Result<HttpResponse, ApiError> {
    get_team_service(&data, &path).await
}

#[put("/{team_id}")]
async fn update_team_handler(
    data: Data<AppState>,
    _: Authorized<AnyStaff>,
    path: Path<String>,
    changes: Json<UpdateTeamSchema>,
) -> Result<HttpResponse, ApiError> {
    update_team_service(&data, &path, changes.into_inner()).await
}

#[delete("/{team_id}")]
async fn delete_team_handler(
    data: Data<AppState>,
    _: Authorized<AnyStaff>,
    path: Path<String>,
) -> Result<HttpResponse, ApiError> {
    delete_team_service(&data, &path).await
}

#[post("/{team_id}/players")]
async fn add_player_handler(
    data: Data<AppState>,
    _: Authorized<AnyStaff>,
    path: Path<String>,
    new_player: Json<CreatePlayerSchema>,
) -> Result<HttpResponse, ApiError> {
    add_player_service(&data, &path, new_player.into_inner()).await
}

pub fn config(conf: &mut web::ServiceConfig) {
    // player routes first so "players" is never taken for a team id
    let scope = web::scope("/api/teams")
        .service(list_players_handler)
        .service(get_player_handler)
        .service(update_player_handler)
        .service(delete_player_handler)
        .service(list_teams_handler)
        .service(create_team_handler)
        .service(get_team_handler)
        .service(update_team_handler)
        .service(delete_team_handler)
        .service(add_player_handler);

    conf.service(scope);
}

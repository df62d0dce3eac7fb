use crate::config::jwt_auth::{AnyStaff, Authorized, JwtMiddleware};
use crate::error::ApiError;
use crate::model::scheduled_game::{
    CreateScheduledGameSchema, ScheduledGameQuery, UpdateScheduledGameSchema, UpdateStatusSchema,
};
use crate::service::scheduled_games::{
    create_scheduled_game_service, delete_scheduled_game_service, get_scheduled_game_service,
    list_scheduled_games_service, update_game_status_service, update_scheduled_game_service,
};
use crate::AppState;
use actix_web::web::{Data, Json, Path, Query};
use actix_web::{delete, get, patch, post, put, web, HttpResponse};

#[get("")]
async fn list_scheduled_games_handler(
    data: Data<AppState>,
    _: JwtMiddleware,
    query: Query<ScheduledGameQuery>,
) -> Result<HttpResponse, ApiError> {
    list_scheduled_games_service(&data, query.into_inner()).await
}

#[get("/{game_id}")]
async fn get_scheduled_game_handler(
    data: Data<AppState>,
    _: JwtMiddleware,
    path: Path<i32>,
) -> Result<HttpResponse, ApiError> {
    get_scheduled_game_service(&data, path.into_inner()).await
}

#[post("")]
async fn create_scheduled_game_handler(
    data: Data<AppState>,
    auth: Authorized<AnyStaff>,
    new_game: Json<CreateScheduledGameSchema>,
) -> Result<HttpResponse, ApiError> {
    create_scheduled_game_service(&data, &auth.user, new_game.into_inner()).await
}

#[put("/{game_id}")]
async fn update_scheduled_game_handler(
    data: Data<AppState>,
    _: Authorized<AnyStaff>,
    path: Path<i32>,
    changes: Json<UpdateScheduledGameSchema>,
) -> Result<HttpResponse, ApiError> {
    update_scheduled_game_service(&data, path.into_inner(), changes.into_inner()).await
}

#[patch("/{game_id}/status")]
async fn update_game_status_handler(
    data: Data<AppState>,
    _: Authorized<AnyStaff>,
    path: Path<i32>,
    change: Json<UpdateStatusSchema>,
) -> Result<HttpResponse, ApiError> {
    update_game_status_service(&data, path.into_inner(), change.into_inner()).await
}

#[delete("/{game_id}")]
async fn delete_scheduled_game_handler(
    data: Data<AppState>,
    _: Authorized<AnyStaff>,
    path: Path<i32>,
) -> Result<HttpResponse, ApiError> {
    delete_scheduled_game_service(&data, path.into_inner()).await
}

pub fn config(conf: &mut web::ServiceConfig) {
    let scope = web::scope("/api/scheduled-games")
        .service(list_scheduled_games_handler)
        .service(create_scheduled_game_handler)
        .service(get_scheduled_game_handler)
        .service(update_scheduled_game_handler)
        .service(update_game_status_handler)
        .service(delete_scheduled_game_handler);

    conf.service(scope);
}

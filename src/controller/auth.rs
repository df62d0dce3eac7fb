use crate::config::jwt_auth::{Authorized, JwtMiddleware, OptionalAuth, SuperadminOnly};
use crate::error::ApiError;
use crate::model::user::{ChangePasswordSchema, LoginUserSchema, RegisterUserSchema};
use crate::service::user::{
    change_password_service, login_user_service, logout_user_service, profile_service,
    register_user_service,
};
use crate::AppState;
use actix_web::web::{Data, Json};
use actix_web::{get, post, web, HttpResponse};

#[post("/login")]
async fn login_user_handler(
    data: Data<AppState>,
    credentials: Json<LoginUserSchema>,
) -> Result<HttpResponse, ApiError> {
    login_user_service(&data, credentials.into_inner()).await
}

#[post("/logout")]
async fn logout_user_handler(caller: OptionalAuth) -> HttpResponse {
    logout_user_service(caller.0)
}

#[post("/register")]
async fn register_user_handler(
    data: Data<AppState>,
    auth: Authorized<SuperadminOnly>,
    new_user: Json<RegisterUserSchema>,
) -> Result<HttpResponse, ApiError> {
    register_user_service(&data, &auth.user, new_user.into_inner()).await
}

#[get("/profile")]
async fn profile_handler(
    data: Data<AppState>,
    auth: JwtMiddleware,
) -> Result<HttpResponse, ApiError> {
    profile_service(&data, &auth.user).await
}

#[post("/change-password")]
async fn change_password_handler(
    data: Data<AppState>,
    auth: JwtMiddleware,
    change: Json<ChangePasswordSchema>,
) -> Result<HttpResponse, ApiError> {
    change_password_service(&data, &auth.user, change.into_inner()).await
}

pub fn config(conf: &mut web::ServiceConfig) {
    let scope = web::scope("/api/auth")
        .service(login_user_handler)
        .service(logout_user_handler)
        .service(register_user_handler)
        .service(profile_handler)
        .service(change_password_handler);

    conf.service(scope);
}

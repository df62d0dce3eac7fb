use crate::error::ApiError;
use crate::model::response::{FilteredUser, LoginResponse, MessageResponse, UserResponse};
use crate::model::token_claims::Identity;
use crate::model::user::{ChangePasswordSchema, LoginUserSchema, NewUser, RegisterUserSchema, User};
use crate::util::password::{burn_dummy_verification, hash_password, verify_password};
use crate::util::token;
use crate::AppState;
use actix_web::{web, HttpResponse};
use log::{error, info, warn};
use validator::Validate;

/// Checks a username/password pair, stamps `last_login` and issues a session token.
/// Unknown users and wrong passwords fail identically.
pub async fn authenticate(
    data: &AppState,
    credentials: LoginUserSchema,
) -> Result<(User, String), ApiError> {
    credentials.validate()?;
    let LoginUserSchema { username, password } = credentials;

    let user = match data.db.find_user_by_username(&username).await? {
        Some(user) => user,
        None => {
            web::block(move || burn_dummy_verification(&password)).await?;
            warn!("Login attempt for unknown user {}", username);
            return Err(ApiError::InvalidCredentials);
        }
    };

    let stored_hash = user.password_hash.clone();
    let matches = web::block(move || verify_password(&password, &stored_hash)).await??;
    if !matches {
        warn!("Wrong password for user {}", user.username);
        return Err(ApiError::InvalidCredentials);
    }

    let user = data.db.touch_last_login(user.id).await?;
    let details = token::generate_jwt_token(
        &Identity::from(&user),
        data.config.jwt_expires_in,
        &data.config.jwt_secret,
    )
    .map_err(|e| {
        error!("Could not issue a token for {}. The error: {:?}", user.username, e);
        ApiError::Internal
    })?;

    Ok((user, details.token))
}

pub async fn login_user_service(
    data: &AppState,
    credentials: LoginUserSchema,
) -> Result<HttpResponse, ApiError> {
    let (user, token) = authenticate(data, credentials).await?;
    info!("User {} logged in", user.username);
    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login successful",
        token,
        user: FilteredUser::from(&user),
    }))
}

pub fn logout_user_service(caller: Option<Identity>) -> HttpResponse {
    if let Some(user) = caller {
        info!("User {} logged out", user.username);
    }
    HttpResponse::Ok().json(MessageResponse {
        message: "Logout successful",
    })
}

pub async fn register_user_service(
    data: &AppState,
    caller: &Identity,
    new_user: RegisterUserSchema,
) -> Result<HttpResponse, ApiError> {
    new_user.validate()?;

    if data
        .db
        .username_or_email_taken(&new_user.username, &new_user.email)
        .await?
    {
        return Err(ApiError::Conflict(
            "User with that username or email already exists",
        ));
    }

    let password = new_user.password.clone();
    let password_hash = web::block(move || hash_password(&password)).await??;

    let user = data
        .db
        .create_user(NewUser {
            username: &new_user.username,
            email: &new_user.email,
            password_hash: &password_hash,
            role: new_user.role.unwrap_or_default(),
        })
        .await?;

    info!(
        "User {} registered {} with role {}",
        caller.username,
        user.username,
        user.role.as_str()
    );
    Ok(HttpResponse::Created().json(UserResponse {
        message: "User registered successfully",
        user: FilteredUser::from(&user),
    }))
}

pub async fn profile_service(data: &AppState, caller: &Identity) -> Result<HttpResponse, ApiError> {
    let user = data
        .db
        .find_user_by_id(caller.id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(HttpResponse::Ok().json(FilteredUser::from(&user)))
}

pub async fn change_password_service(
    data: &AppState,
    caller: &Identity,
    change: ChangePasswordSchema,
) -> Result<HttpResponse, ApiError> {
    change.validate()?;
    let ChangePasswordSchema {
        current_password,
        new_password,
    } = change;

    let user = data
        .db
        .find_user_by_id(caller.id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let stored_hash = user.password_hash;
    let matches = web::block(move || verify_password(&current_password, &stored_hash)).await??;
    if !matches {
        return Err(ApiError::WrongCurrentPassword);
    }

    let new_hash = web::block(move || hash_password(&new_password)).await??;
    data.db.update_password_hash(user.id, &new_hash).await?;

    info!("User {} changed their password", user.username);
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Password changed successfully",
    }))
}

pub mod auth;
pub mod scheduled_games;
pub mod teams;

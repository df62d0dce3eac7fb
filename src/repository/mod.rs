pub mod database;
pub mod scheduled_games;
pub mod teams;
pub mod users;

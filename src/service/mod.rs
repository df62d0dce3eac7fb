pub mod scheduled_games;
pub mod teams;
pub mod user;

/// Query-string filters treat an empty value the same as an absent one.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

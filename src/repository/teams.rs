use crate::model::schema::{players, teams};
use crate::model::team::{
    NewPlayer, NewTeam, Player, PlayerChanges, PlayerWithTeam, Team, TeamChanges, TeamWithPlayers,
};
use crate::repository::database::{DBConn, Database, DatabaseError, Result};
use diesel::{
    BoolExpressionMethods, ExpressionMethods, NullableExpressionMethods, OptionalExtension,
    PgTextExpressionMethods, QueryDsl, SelectableHelper,
};
use diesel_async::{AsyncConnection, RunQueryDsl};
use scoped_futures::ScopedFutureExt;
use std::collections::HashMap;

type TeamColumns = (String, Option<String>, Option<String>);

#[derive(Debug, Default, Clone)]
pub struct TeamFilter {
    pub search: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct PlayerFilter {
    pub search: Option<String>,
    pub team_id: Option<String>,
    pub position: Option<String>,
}

impl Database {
    pub async fn list_teams(&self, filter: &TeamFilter) -> Result<Vec<TeamWithPlayers>> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;

            let mut query = teams::table.into_boxed();
            if let Some(search) = filter.search.as_deref() {
                let pattern = contains_pattern(search);
                query = query.filter(
                    teams::name
                        .ilike(pattern.clone())
                        .or(teams::city.ilike(pattern)),
                );
            }
            if let Some(city) = filter.city.as_deref() {
                query = query.filter(teams::city.eq(city));
            }

            let rows = query
                .order(teams::created_at.desc())
                .select(Team::as_select())
                .load::<Team>(&mut conn)
                .await?;

            let roster = load_players_for(&mut conn, &rows).await?;
            Ok(attach_players(rows, roster))
        })
        .await
    }

    pub async fn get_team(&self, team_id: &str) -> Result<TeamWithPlayers> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            let team = teams::table
                .find(team_id)
                .select(Team::as_select())
                .first::<Team>(&mut conn)
                .await
                .optional()?
                .ok_or(DatabaseError::NotFound("Team"))?;

            let rows = vec![team];
            let roster = load_players_for(&mut conn, &rows).await?;
            attach_players(rows, roster)
                .pop()
                .ok_or(DatabaseError::NotFound("Team"))
        })
        .await
    }

    pub async fn create_team(&self, new_team: NewTeam<'_>) -> Result<()> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            diesel::insert_into(teams::table)
                .values(&new_team)
                .execute(&mut conn)
                .await?;
            Ok(())
        })
        .await
    }

    pub async fn update_team(&self, team_id: &str, changes: TeamChanges<'_>) -> Result<()> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            let updated = diesel::update(teams::table.find(team_id))
                .set(&changes)
                .execute(&mut conn)
                .await?;
            if updated == 0 {
                return Err(DatabaseError::NotFound("Team"));
            }
            Ok(())
        })
        .await
    }

    /// Removes a team and its players in one transaction.
    pub async fn delete_team(&self, team_id: &str) -> Result<()> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            conn.transaction::<_, DatabaseError, _>(|conn| {
                async move {
                    let existing = teams::table
                        .find(team_id)
                        .select(teams::id)
                        .first::<String>(conn)
                        .await
                        .optional()?;
                    if existing.is_none() {
                        return Err(DatabaseError::NotFound("Team"));
                    }

                    diesel::delete(players::table.filter(players::team_id.eq(team_id)))
                        .execute(conn)
                        .await?;
                    diesel::delete(teams::table.find(team_id))
                        .execute(conn)
                        .await?;
                    Ok(())
                }
                .scope_boxed()
            })
            .await
            .map_err(DatabaseError::rolled_back)
        })
        .await
    }

    pub async fn add_player(&self, new_player: NewPlayer<'_>) -> Result<()> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            let team = teams::table
                .find(new_player.team_id)
                .select(teams::id)
                .first::<String>(&mut conn)
                .await
                .optional()?;
            if team.is_none() {
                return Err(DatabaseError::NotFound("Team"));
            }

            diesel::insert_into(players::table)
                .values(&new_player)
                .execute(&mut conn)
                .await?;
            Ok(())
        })
        .await
    }

    pub async fn update_player(&self, player_id: &str, changes: PlayerChanges<'_>) -> Result<()> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            let updated = diesel::update(players::table.find(player_id))
                .set(&changes)
                .execute(&mut conn)
                .await?;
            if updated == 0 {
                return Err(DatabaseError::NotFound("Player"));
            }
            Ok(())
        })
        .await
    }

    pub async fn delete_player(&self, player_id: &str) -> Result<()> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            let deleted = diesel::delete(players::table.find(player_id))
                .execute(&mut conn)
                .await?;
            if deleted == 0 {
                return Err(DatabaseError::NotFound("Player"));
            }
            Ok(())
        })
        .await
    }

    pub async fn list_players(&self, filter: &PlayerFilter) -> Result<Vec<PlayerWithTeam>> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;

            let mut query = players::table.left_join(teams::table).into_boxed();
            if let Some(search) = filter.search.as_deref() {
                let pattern = contains_pattern(search);
                query = query.filter(
                    players::name
                        .ilike(pattern.clone())
                        .or(players::full_name.ilike(pattern)),
                );
            }
            if let Some(team_id) = filter.team_id.as_deref() {
                query = query.filter(players::team_id.eq(team_id));
            }
            if let Some(position) = filter.position.as_deref() {
                query = query.filter(players::position.eq(position));
            }

            let rows = query
                .order((teams::name.asc(), players::number.asc()))
                .select((
                    Player::as_select(),
                    (teams::name, teams::city, teams::logo).nullable(),
                ))
                .load::<(Player, Option<TeamColumns>)>(&mut conn)
                .await?;

            Ok(rows.into_iter().map(join_team).collect())
        })
        .await
    }

    pub async fn get_player(&self, player_id: &str) -> Result<PlayerWithTeam> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            let row = players::table
                .left_join(teams::table)
                .filter(players::id.eq(player_id))
                .select((
                    Player::as_select(),
                    (teams::name, teams::city, teams::logo).nullable(),
                ))
                .first::<(Player, Option<TeamColumns>)>(&mut conn)
                .await
                .optional()?
                .ok_or(DatabaseError::NotFound("Player"))?;
            Ok(join_team(row))
        })
        .await
    }
}

async fn load_players_for(conn: &mut DBConn, parents: &[Team]) -> Result<Vec<Player>> {
    if parents.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<&str> = parents.iter().map(|team| team.id.as_str()).collect();
    let players = players::table
        .filter(players::team_id.eq_any(ids))
        .order(players::number.asc())
        .select(Player::as_select())
        .load::<Player>(conn)
        .await?;
    Ok(players)
}

/// Groups players under their team, keeping team order.
pub fn attach_players(rows: Vec<Team>, players: Vec<Player>) -> Vec<TeamWithPlayers> {
    let mut by_team: HashMap<String, Vec<Player>> = HashMap::new();
    for player in players {
        by_team
            .entry(player.team_id.clone())
            .or_default()
            .push(player);
    }
    rows.into_iter()
        .map(|team| {
            let players = by_team.remove(&team.id).unwrap_or_default();
            TeamWithPlayers { team, players }
        })
        .collect()
}

/// `ILIKE` pattern matching `search` literally anywhere in the column.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn join_team((player, team): (Player, Option<TeamColumns>)) -> PlayerWithTeam {
    let (team_name, team_city, team_logo) = match team {
        Some((name, city, logo)) => (Some(name), city, logo),
        None => (None, None, None),
    };
    PlayerWithTeam {
        player,
        team_name,
        team_city,
        team_logo,
    }
}

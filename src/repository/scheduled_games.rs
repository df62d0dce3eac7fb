use crate::model::scheduled_game::{
    GameFields, GameStatus, NewRosterEntry, NewScheduledGame, RosterEntryInput, RosterPlayer,
    ScheduledGame, ScheduledGameChanges, ScheduledGameFilter, ScheduledGameWithRoster,
};
use crate::model::schema::{game_roster, players, scheduled_games, teams};
use crate::repository::database::{DBConn, Database, DatabaseError, Result};
use diesel::{BoolExpressionMethods, ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{AsyncConnection, RunQueryDsl};
use scoped_futures::ScopedFutureExt;
use std::collections::HashMap;

impl Database {
    /// Inserts the game and its roster atomically and returns the new game id.
    pub async fn create_scheduled_game(
        &self,
        fields: &GameFields,
        roster: &[RosterEntryInput],
        created_by: i32,
    ) -> Result<i32> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            conn.transaction::<_, DatabaseError, _>(|conn| {
                async move {
                    let (team_a_name, team_b_name) = resolve_team_names(conn, fields).await?;

                    let game_id = diesel::insert_into(scheduled_games::table)
                        .values(&NewScheduledGame {
                            team_a_id: &fields.team_a_id,
                            team_a_name: &team_a_name,
                            team_b_id: &fields.team_b_id,
                            team_b_name: &team_b_name,
                            scheduled_date: fields.scheduled_date,
                            location: fields.location.as_deref(),
                            status: fields.status,
                            created_by: Some(created_by),
                        })
                        .returning(scheduled_games::id)
                        .get_result::<i32>(conn)
                        .await?;

                    insert_roster(conn, game_id, roster).await?;
                    Ok(game_id)
                }
                .scope_boxed()
            })
            .await
            .map_err(DatabaseError::rolled_back)
        })
        .await
    }

    /// Replaces every scalar field of a game; when `roster` is given the stored roster is
    /// swapped for it inside the same transaction.
    pub async fn update_scheduled_game(
        &self,
        game_id: i32,
        fields: &GameFields,
        roster: Option<&[RosterEntryInput]>,
    ) -> Result<()> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            conn.transaction::<_, DatabaseError, _>(|conn| {
                async move {
                    let existing = scheduled_games::table
                        .find(game_id)
                        .select(scheduled_games::id)
                        .for_update()
                        .first::<i32>(conn)
                        .await
                        .optional()?;
                    if existing.is_none() {
                        return Err(DatabaseError::NotFound("Scheduled game"));
                    }

                    let (team_a_name, team_b_name) = resolve_team_names(conn, fields).await?;

                    diesel::update(scheduled_games::table.find(game_id))
                        .set(&ScheduledGameChanges {
                            team_a_id: &fields.team_a_id,
                            team_a_name: &team_a_name,
                            team_b_id: &fields.team_b_id,
                            team_b_name: &team_b_name,
                            scheduled_date: fields.scheduled_date,
                            location: fields.location.as_deref(),
                            status: fields.status,
                        })
                        .execute(conn)
                        .await?;

                    if let Some(roster) = roster {
                        diesel::delete(
                            game_roster::table.filter(game_roster::scheduled_game_id.eq(game_id)),
                        )
                        .execute(conn)
                        .await?;
                        insert_roster(conn, game_id, roster).await?;
                    }
                    Ok(())
                }
                .scope_boxed()
            })
            .await
            .map_err(DatabaseError::rolled_back)
        })
        .await
    }

    pub async fn update_game_status(&self, game_id: i32, new_status: GameStatus) -> Result<()> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            let updated = diesel::update(scheduled_games::table.find(game_id))
                .set(scheduled_games::status.eq(new_status))
                .execute(&mut conn)
                .await?;
            if updated == 0 {
                return Err(DatabaseError::NotFound("Scheduled game"));
            }
            Ok(())
        })
        .await
    }

    /// Roster rows go with the game through `ON DELETE CASCADE`.
    pub async fn delete_scheduled_game(&self, game_id: i32) -> Result<()> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            let deleted = diesel::delete(scheduled_games::table.find(game_id))
                .execute(&mut conn)
                .await?;
            if deleted == 0 {
                return Err(DatabaseError::NotFound("Scheduled game"));
            }
            Ok(())
        })
        .await
    }

    pub async fn list_scheduled_games(
        &self,
        filter: &ScheduledGameFilter,
    ) -> Result<Vec<ScheduledGameWithRoster>> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;

            let mut query = scheduled_games::table.into_boxed();
            if let Some(status) = filter.status {
                query = query.filter(scheduled_games::status.eq(status));
            }
            if let Some(team_id) = filter.team_id.as_deref() {
                query = query.filter(
                    scheduled_games::team_a_id
                        .eq(team_id)
                        .or(scheduled_games::team_b_id.eq(team_id)),
                );
            }
            if let Some(from) = filter.from {
                query = query.filter(scheduled_games::scheduled_date.ge(from));
            }
            if let Some(to) = filter.to {
                query = query.filter(scheduled_games::scheduled_date.le(to));
            }

            let games = query
                .order((
                    scheduled_games::scheduled_date.desc(),
                    scheduled_games::id.desc(),
                ))
                .select(ScheduledGame::as_select())
                .load::<ScheduledGame>(&mut conn)
                .await?;

            let roster = load_rosters_for(&mut conn, &games).await?;
            Ok(attach_rosters(games, roster))
        })
        .await
    }

    pub async fn get_scheduled_game(&self, game_id: i32) -> Result<ScheduledGameWithRoster> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            let game = scheduled_games::table
                .find(game_id)
                .select(ScheduledGame::as_select())
                .first::<ScheduledGame>(&mut conn)
                .await
                .optional()?
                .ok_or(DatabaseError::NotFound("Scheduled game"))?;

            let games = vec![game];
            let roster = load_rosters_for(&mut conn, &games).await?;
            attach_rosters(games, roster)
                .pop()
                .ok_or(DatabaseError::NotFound("Scheduled game"))
        })
        .await
    }
}

/// Uses the names sent by the caller, otherwise snapshots the teams' current names.
async fn resolve_team_names(conn: &mut DBConn, fields: &GameFields) -> Result<(String, String)> {
    let team_a_name = match fields.team_a_name.as_deref() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => team_name(conn, &fields.team_a_id).await?,
    };
    let team_b_name = match fields.team_b_name.as_deref() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => team_name(conn, &fields.team_b_id).await?,
    };
    Ok((team_a_name, team_b_name))
}

async fn team_name(conn: &mut DBConn, team_id: &str) -> Result<String> {
    teams::table
        .find(team_id)
        .select(teams::name)
        .first::<String>(conn)
        .await
        .optional()?
        .ok_or(DatabaseError::NotFound("Team"))
}

async fn insert_roster(conn: &mut DBConn, game_id: i32, roster: &[RosterEntryInput]) -> Result<()> {
    if roster.is_empty() {
        return Ok(());
    }
    let rows: Vec<NewRosterEntry<'_>> = roster
        .iter()
        .map(|entry| NewRosterEntry {
            scheduled_game_id: game_id,
            player_id: &entry.player_id,
            team: entry.team,
        })
        .collect();
    diesel::insert_into(game_roster::table)
        .values(&rows)
        .execute(conn)
        .await?;
    Ok(())
}

async fn load_rosters_for(conn: &mut DBConn, games: &[ScheduledGame]) -> Result<Vec<RosterPlayer>> {
    if games.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = games.iter().map(|game| game.id).collect();
    let roster = game_roster::table
        .inner_join(players::table)
        .filter(game_roster::scheduled_game_id.eq_any(ids))
        .order((game_roster::scheduled_game_id.asc(), game_roster::id.asc()))
        .select((
            game_roster::id,
            game_roster::scheduled_game_id,
            game_roster::player_id,
            game_roster::team,
            players::name,
            players::full_name,
            players::number,
            players::position,
        ))
        .load::<RosterPlayer>(conn)
        .await?;
    Ok(roster)
}

/// Groups roster rows under their game, keeping game order.
pub fn attach_rosters(
    games: Vec<ScheduledGame>,
    roster: Vec<RosterPlayer>,
) -> Vec<ScheduledGameWithRoster> {
    let mut by_game: HashMap<i32, Vec<RosterPlayer>> = HashMap::new();
    for entry in roster {
        by_game
            .entry(entry.scheduled_game_id)
            .or_default()
            .push(entry);
    }
    games
        .into_iter()
        .map(|game| {
            let roster = by_game.remove(&game.id).unwrap_or_default();
            ScheduledGameWithRoster { game, roster }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::scheduled_game::RosterSide;
    use chrono::{TimeZone, Utc};

    fn game(id: i32, day: u32) -> ScheduledGame {
        ScheduledGame {
            id,
            team_a_id: "T1".to_string(),
            team_a_name: "Hawks".to_string(),
            team_b_id: "T2".to_string(),
            team_b_name: "Owls".to_string(),
            scheduled_date: Utc.with_ymd_and_hms(2024, 1, day, 18, 0, 0).unwrap(),
            location: None,
            status: GameStatus::Scheduled,
            created_by: Some(1),
            created_at: Utc::now(),
        }
    }

    fn entry(id: i32, game_id: i32, player: &str, side: RosterSide) -> RosterPlayer {
        RosterPlayer {
            id,
            scheduled_game_id: game_id,
            player_id: player.to_string(),
            team: side,
            name: player.to_lowercase(),
            full_name: None,
            number: "0".to_string(),
            position: None,
        }
    }

    #[test]
    fn rosters_follow_their_game_and_keep_game_order() {
        let games = vec![game(3, 20), game(1, 10), game(2, 5)];
        let roster = vec![
            entry(10, 1, "P1", RosterSide::A),
            entry(11, 3, "P2", RosterSide::B),
            entry(12, 1, "P3", RosterSide::B),
        ];

        let assembled = attach_rosters(games, roster);

        let ids: Vec<i32> = assembled.iter().map(|g| g.game.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(assembled[0].roster.len(), 1);
        assert_eq!(assembled[0].roster[0].player_id, "P2");
        assert_eq!(
            assembled[1]
                .roster
                .iter()
                .map(|r| r.player_id.as_str())
                .collect::<Vec<_>>(),
            vec!["P1", "P3"]
        );
        assert!(assembled[2].roster.is_empty());
    }

    #[test]
    fn roster_rows_for_unknown_games_are_dropped() {
        let assembled = attach_rosters(vec![game(1, 1)], vec![entry(1, 99, "P1", RosterSide::A)]);
        assert!(assembled[0].roster.is_empty());
    }
}

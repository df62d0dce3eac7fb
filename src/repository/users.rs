use crate::model::schema::users::dsl::*;
use crate::model::user::{NewUser, User};
use crate::repository::database::{Database, Result};
use chrono::Utc;
use diesel::{BoolExpressionMethods, ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;

impl Database {
    pub async fn find_user_by_username(&self, user_name: &str) -> Result<Option<User>> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            let user = users
                .filter(username.eq(user_name))
                .select(User::as_select())
                .first::<User>(&mut conn)
                .await
                .optional()?;
            Ok(user)
        })
        .await
    }

    pub async fn find_user_by_id(&self, user_id: i32) -> Result<Option<User>> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            let user = users
                .find(user_id)
                .select(User::as_select())
                .first::<User>(&mut conn)
                .await
                .optional()?;
            Ok(user)
        })
        .await
    }

    pub async fn username_or_email_taken(&self, user_name: &str, user_email: &str) -> Result<bool> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            let existing = users
                .filter(username.eq(user_name).or(email.eq(user_email)))
                .select(id)
                .first::<i32>(&mut conn)
                .await
                .optional()?;
            Ok(existing.is_some())
        })
        .await
    }

    pub async fn create_user(&self, new_user: NewUser<'_>) -> Result<User> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            let user = diesel::insert_into(users)
                .values(&new_user)
                .returning(User::as_returning())
                .get_result::<User>(&mut conn)
                .await?;
            Ok(user)
        })
        .await
    }

    pub async fn touch_last_login(&self, user_id: i32) -> Result<User> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            let user = diesel::update(users.find(user_id))
                .set(last_login.eq(Some(Utc::now())))
                .returning(User::as_returning())
                .get_result::<User>(&mut conn)
                .await?;
            Ok(user)
        })
        .await
    }

    pub async fn update_password_hash(&self, user_id: i32, new_hash: &str) -> Result<()> {
        self.bounded(async {
            let mut conn = self.get_db_conn().await?;
            diesel::update(users.find(user_id))
                .set(password_hash.eq(new_hash))
                .execute(&mut conn)
                .await?;
            Ok(())
        })
        .await
    }
}

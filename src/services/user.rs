use crate::{
    error::{AppError, AppResult},
    models::{favorite, follow, like, post, user, Favorite, Follow, Like, Post, User, UserModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};

pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<UserModel> {
        User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn get_by_username(&self, username: &str) -> AppResult<UserModel> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Update profile fields. Username and email stay globally unique.
    pub async fn update_profile(
        &self,
        user_id: i32,
        username: Option<&str>,
        email: Option<&str>,
        about_me: Option<&str>,
    ) -> AppResult<UserModel> {
        let user = self.get_by_id(user_id).await?;

        if username.is_some() || email.is_some() {
            let mut cond = Condition::any();
            if let Some(username) = username {
                cond = cond.add(user::Column::Username.eq(username));
            }
            if let Some(email) = email {
                cond = cond.add(user::Column::Email.eq(email));
            }
            let taken = User::find()
                .filter(cond)
                .filter(user::Column::Id.ne(user_id))
                .count(&self.db)
                .await?;
            if taken > 0 {
                return Err(AppError::Conflict(
                    "Username or email already exists".to_string(),
                ));
            }
        }

        let now = chrono::Utc::now().naive_utc();
        let mut active: user::ActiveModel = user.into();
        if let Some(username) = username {
            active.username = Set(username.to_string());
        }
        if let Some(email) = email {
            active.email = Set(email.to_string());
        }
        if let Some(about_me) = about_me {
            active.about_me = Set(Some(about_me.to_string()));
        }
        active.updated_at = Set(now);

        Ok(active.update(&self.db).await?)
    }

    /// Overwrite the stored password hash.
    pub async fn set_password(&self, user_id: i32, plaintext: &str) -> AppResult<UserModel> {
        let user = self.get_by_id(user_id).await?;
        let new_hash = crate::utils::hash_password(plaintext)?;

        let now = chrono::Utc::now().naive_utc();
        let mut active: user::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.updated_at = Set(now);
        Ok(active.update(&self.db).await?)
    }

    /// Record request activity on the profile.
    pub async fn touch_last_seen(&self, user_id: i32) -> AppResult<()> {
        let now = chrono::Utc::now().naive_utc();
        User::update_many()
            .col_expr(user::Column::LastSeen, sea_orm::sea_query::Expr::value(now))
            .filter(user::Column::Id.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Delete a user and everything hanging off them: posts, likes given
    /// and received, favorites, and follow edges in both directions.
    pub async fn delete(&self, user_id: i32) -> AppResult<()> {
        self.get_by_id(user_id).await?;

        let txn = self.db.begin().await?;

        let post_ids: Vec<i32> = Post::find()
            .select_only()
            .column(post::Column::Id)
            .filter(post::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&txn)
            .await?;

        if !post_ids.is_empty() {
            Like::delete_many()
                .filter(like::Column::PostId.is_in(post_ids.clone()))
                .exec(&txn)
                .await?;
            Favorite::delete_many()
                .filter(favorite::Column::PostId.is_in(post_ids))
                .exec(&txn)
                .await?;
        }

        Like::delete_many()
            .filter(like::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        Favorite::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        Follow::delete_many()
            .filter(
                Condition::any()
                    .add(follow::Column::FollowerId.eq(user_id))
                    .add(follow::Column::FollowedId.eq(user_id)),
            )
            .exec(&txn)
            .await?;
        Post::delete_many()
            .filter(post::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        User::delete_by_id(user_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}

use crate::{
    error::{AppError, AppResult},
    models::{follow, user, Follow, User, UserModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use std::collections::HashMap;

pub struct FollowService {
    db: DatabaseConnection,
}

impl FollowService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create the follow edge. Idempotent: following an already-followed
    /// user changes nothing. Returns true if the edge is new.
    pub async fn follow(&self, follower_id: i32, followed_id: i32) -> AppResult<bool> {
        if follower_id == followed_id {
            return Err(AppError::Validation("Cannot follow yourself".to_string()));
        }

        User::find_by_id(followed_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if self.is_following(follower_id, followed_id).await? {
            return Ok(false);
        }

        let now = chrono::Utc::now().naive_utc();
        let model = follow::ActiveModel {
            follower_id: Set(follower_id),
            followed_id: Set(followed_id),
            created_at: Set(now),
            ..Default::default()
        };

        // A concurrent follow may land between the check and the insert;
        // the unique pair index turns that into "already exists".
        match model.insert(&self.db).await {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// Remove the follow edge. Unfollowing someone not followed is a
    /// no-op. Returns true if an edge was removed.
    pub async fn unfollow(&self, follower_id: i32, followed_id: i32) -> AppResult<bool> {
        let result = Follow::delete_many()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FollowedId.eq(followed_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn is_following(&self, follower_id: i32, followed_id: i32) -> AppResult<bool> {
        let count = Follow::find()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FollowedId.eq(followed_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// Users who follow `user_id`, most recent edge first.
    pub async fn list_followers(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<UserModel>, u64)> {
        let paginator = Follow::find()
            .filter(follow::Column::FollowedId.eq(user_id))
            .order_by_desc(follow::Column::CreatedAt)
            .order_by_desc(follow::Column::Id)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let follows = paginator.fetch_page(page.saturating_sub(1)).await?;
        let user_ids: Vec<i32> = follows.iter().map(|f| f.follower_id).collect();

        Ok((self.resolve_users(user_ids).await?, total))
    }

    /// Users that `user_id` follows, most recent edge first.
    pub async fn list_following(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<UserModel>, u64)> {
        let paginator = Follow::find()
            .filter(follow::Column::FollowerId.eq(user_id))
            .order_by_desc(follow::Column::CreatedAt)
            .order_by_desc(follow::Column::Id)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let follows = paginator.fetch_page(page.saturating_sub(1)).await?;
        let user_ids: Vec<i32> = follows.iter().map(|f| f.followed_id).collect();

        Ok((self.resolve_users(user_ids).await?, total))
    }

    /// Fetch users by id, preserving the given order.
    async fn resolve_users(&self, user_ids: Vec<i32>) -> AppResult<Vec<UserModel>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let users = User::find()
            .filter(user::Column::Id.is_in(user_ids.clone()))
            .all(&self.db)
            .await?;

        let user_map: HashMap<i32, UserModel> = users.into_iter().map(|u| (u.id, u)).collect();
        Ok(user_ids
            .into_iter()
            .filter_map(|id| user_map.get(&id).cloned())
            .collect())
    }
}

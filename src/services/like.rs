use crate::{
    error::{AppError, AppResult},
    models::{like, Like, Post},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, SqlErr,
};

pub struct LikeService {
    db: DatabaseConnection,
}

impl LikeService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Like a post. Idempotent: a second like leaves exactly one edge.
    /// Returns true if the edge is new.
    pub async fn like(&self, user_id: i32, post_id: i32) -> AppResult<bool> {
        Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if self.has_liked(user_id, post_id).await? {
            return Ok(false);
        }

        let now = chrono::Utc::now().naive_utc();
        let model = like::ActiveModel {
            user_id: Set(user_id),
            post_id: Set(post_id),
            created_at: Set(now),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// Unlike a post. A no-op when no edge exists; the count never goes
    /// negative. Returns true if an edge was removed.
    pub async fn unlike(&self, user_id: i32, post_id: i32) -> AppResult<bool> {
        let result = Like::delete_many()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Flip the like state and report where it ended up: true = liked.
    pub async fn toggle(&self, user_id: i32, post_id: i32) -> AppResult<bool> {
        if self.has_liked(user_id, post_id).await? {
            self.unlike(user_id, post_id).await?;
            Ok(false)
        } else {
            self.like(user_id, post_id).await?;
            Ok(true)
        }
    }

    pub async fn has_liked(&self, user_id: i32, post_id: i32) -> AppResult<bool> {
        let count = Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.eq(post_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    pub async fn count_for_post(&self, post_id: i32) -> AppResult<u64> {
        Ok(Like::find()
            .filter(like::Column::PostId.eq(post_id))
            .count(&self.db)
            .await?)
    }

    pub async fn count_for_user(&self, user_id: i32) -> AppResult<u64> {
        Ok(Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?)
    }
}

use crate::{
    error::{AppError, AppResult},
    models::{favorite, post, Favorite, Post, PostModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use std::collections::HashMap;

pub struct FavoriteService {
    db: DatabaseConnection,
}

impl FavoriteService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Favorite a post. Idempotent, requires the post to exist.
    pub async fn favorite(&self, user_id: i32, post_id: i32) -> AppResult<bool> {
        Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if self.has_favorited(user_id, post_id).await? {
            return Ok(false);
        }

        let now = chrono::Utc::now().naive_utc();
        let model = favorite::ActiveModel {
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

    /// Remove a favorite from a live post. Dereferences the post first,
    /// so this path fails with NotFound once the post is gone — callers
    /// then need `unfavorite_deleted`.
    pub async fn unfavorite(&self, user_id: i32, post_id: i32) -> AppResult<bool> {
        Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        self.remove_edge(user_id, post_id).await
    }

    /// Remove a favorite edge whose post no longer exists. Works purely
    /// on the stored (user_id, post_id) pair; nothing is dereferenced.
    pub async fn unfavorite_deleted(&self, user_id: i32, post_id: i32) -> AppResult<()> {
        if !self.remove_edge(user_id, post_id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub async fn has_favorited(&self, user_id: i32, post_id: i32) -> AppResult<bool> {
        let count = Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::PostId.eq(post_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    pub async fn count_for_user(&self, user_id: i32) -> AppResult<u64> {
        Ok(Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?)
    }

    /// The user's favorited posts, most recently favorited first. Edges
    /// whose post has been deleted are skipped, not errors.
    pub async fn list_for_user(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<PostModel>, u64)> {
        let paginator = Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::CreatedAt)
            .order_by_desc(favorite::Column::Id)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let favorites = paginator.fetch_page(page.saturating_sub(1)).await?;

        let post_ids: Vec<i32> = favorites.iter().map(|f| f.post_id).collect();
        if post_ids.is_empty() {
            return Ok((vec![], total));
        }

        let posts = Post::find()
            .filter(post::Column::Id.is_in(post_ids.clone()))
            .all(&self.db)
            .await?;

        let post_map: HashMap<i32, PostModel> = posts.into_iter().map(|p| (p.id, p)).collect();
        let ordered: Vec<PostModel> = post_ids
            .into_iter()
            .filter_map(|id| post_map.get(&id).cloned())
            .collect();

        Ok((ordered, total))
    }

    async fn remove_edge(&self, user_id: i32, post_id: i32) -> AppResult<bool> {
        let result = Favorite::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

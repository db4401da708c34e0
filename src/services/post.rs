use crate::{
    error::{AppError, AppResult},
    models::{follow, like, post, Follow, Like, Post, PostModel, User},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

pub struct PostService {
    db: DatabaseConnection,
}

impl PostService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: i32, body: &str) -> AppResult<PostModel> {
        if body.trim().is_empty() {
            return Err(AppError::Validation("Post body must not be empty".to_string()));
        }

        User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let now = chrono::Utc::now().naive_utc();
        let new_post = post::ActiveModel {
            user_id: Set(user_id),
            body: Set(body.to_string()),
            created_at: Set(now),
            ..Default::default()
        };

        Ok(new_post.insert(&self.db).await?)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<PostModel> {
        Post::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Delete a post. Only the owner may do so; anyone else gets a
    /// Forbidden, not a NotFound. Likes on the post go with it, favorite
    /// edges deliberately stay behind (see FavoriteService).
    pub async fn delete(&self, id: i32, user_id: i32) -> AppResult<PostModel> {
        let existing = self.get_by_id(id).await?;
        if existing.user_id != user_id {
            return Err(AppError::Forbidden);
        }

        Like::delete_many()
            .filter(like::Column::PostId.eq(id))
            .exec(&self.db)
            .await?;
        Post::delete_by_id(id).exec(&self.db).await?;

        Ok(existing)
    }

    /// All posts, newest first (created_at DESC, id DESC tiebreak).
    pub async fn list(&self, page: u64, per_page: u64) -> AppResult<(Vec<PostModel>, u64)> {
        let paginator = Post::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let posts = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((posts, total))
    }

    pub async fn list_by_user(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<PostModel>, u64)> {
        User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let paginator = Post::find()
            .filter(post::Column::UserId.eq(user_id))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let posts = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((posts, total))
    }

    /// The feed: posts by users the given user follows, merged with the
    /// user's own posts, newest first. The sort key is explicit —
    /// created_at DESC with id DESC as the tiebreak — so the order is
    /// deterministic even for equal timestamps.
    pub async fn followed_posts(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<PostModel>, u64)> {
        let mut author_ids: Vec<i32> = Follow::find()
            .select_only()
            .column(follow::Column::FollowedId)
            .filter(follow::Column::FollowerId.eq(user_id))
            .into_tuple()
            .all(&self.db)
            .await?;
        author_ids.push(user_id);

        let paginator = Post::find()
            .filter(post::Column::UserId.is_in(author_ids))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let posts = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((posts, total))
    }
}

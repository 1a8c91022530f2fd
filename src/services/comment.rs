//! Comment service

use std::sync::Arc;

use thiserror::Error;

use crate::db::repositories::{CommentRepository, PostRepository};
use crate::models::{Comment, CommentWithAuthor, CreateCommentInput};

/// Comment service errors
#[derive(Debug, Error)]
pub enum CommentServiceError {
    #[error("Post not found")]
    PostNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Comment business logic
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    pub async fn create(
        &self,
        post_id: i64,
        user_id: i64,
        input: CreateCommentInput,
    ) -> Result<Comment, CommentServiceError> {
        if !self.posts.exists(post_id).await? {
            return Err(CommentServiceError::PostNotFound);
        }
        Ok(self.comments.create(post_id, user_id, &input).await?)
    }

    pub async fn list(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>, CommentServiceError> {
        if !self.posts.exists(post_id).await? {
            return Err(CommentServiceError::PostNotFound);
        }
        Ok(self.comments.list_by_post(post_id).await?)
    }

    pub async fn update(
        &self,
        id: i64,
        user_id: i64,
        comment: &str,
    ) -> Result<Comment, CommentServiceError> {
        if !self.comments.update(id, user_id, comment).await? {
            return Err(CommentServiceError::CommentNotFound);
        }
        self.comments
            .get_by_id(id)
            .await?
            .ok_or(CommentServiceError::CommentNotFound)
    }

    pub async fn delete(&self, id: i64, user_id: i64) -> Result<(), CommentServiceError> {
        if !self.comments.soft_delete(id, user_id).await? {
            return Err(CommentServiceError::CommentNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        PostRepository, SqlxCommentRepository, SqlxPostRepository, SqlxUserRepository,
        UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreatePostInput, User};

    async fn setup() -> (CommentService, i64, i64, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let alice = users
            .create(&User::new(
                "Alice".to_string(),
                "alice".to_string(),
                "alice@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .unwrap();
        let bob = users
            .create(&User::new(
                "Bob".to_string(),
                "bob".to_string(),
                "bob@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .unwrap();

        let post_repo = SqlxPostRepository::new(pool.clone());
        let post = post_repo
            .create(
                alice.id,
                &CreatePostInput {
                    title: "Open thread".to_string(),
                    content: "Discuss".to_string(),
                    image_url: None,
                    tags: vec![],
                },
                "open-thread",
            )
            .await
            .unwrap();

        let service = CommentService::new(
            SqlxCommentRepository::boxed(pool.clone()),
            SqlxPostRepository::boxed(pool),
        );
        (service, alice.id, bob.id, post.post.id)
    }

    fn text_input(text: &str) -> CreateCommentInput {
        CreateCommentInput {
            comment: text.to_string(),
            parent_id: None,
        }
    }

    #[tokio::test]
    async fn test_comment_on_missing_post() {
        let (service, alice, _, _) = setup().await;
        let result = service.create(999, alice, text_input("Hello?")).await;
        assert!(matches!(result, Err(CommentServiceError::PostNotFound)));
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (service, alice, bob, post_id) = setup().await;

        service.create(post_id, alice, text_input("First")).await.unwrap();
        service.create(post_id, bob, text_input("Second")).await.unwrap();

        let comments = service.list(post_id).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].comment, "First");
    }

    #[tokio::test]
    async fn test_edit_by_non_author_is_not_found() {
        let (service, alice, bob, post_id) = setup().await;
        let comment = service.create(post_id, alice, text_input("Mine")).await.unwrap();

        let result = service.update(comment.id, bob, "Tampered").await;
        assert!(matches!(result, Err(CommentServiceError::CommentNotFound)));
    }

    #[tokio::test]
    async fn test_delete_own_comment() {
        let (service, alice, _, post_id) = setup().await;
        let comment = service.create(post_id, alice, text_input("Gone soon")).await.unwrap();

        service.delete(comment.id, alice).await.unwrap();
        assert!(service.list(post_id).await.unwrap().is_empty());

        let again = service.delete(comment.id, alice).await;
        assert!(matches!(again, Err(CommentServiceError::CommentNotFound)));
    }
}

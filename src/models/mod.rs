//! Data models
//!
//! This module contains all data structures used throughout the Daybook service.
//! Models represent:
//! - Database entities (User, Todo, Notebook, Note, Post, Tag, Comment)
//! - Input types for create/update operations

mod comment;
mod note;
mod notebook;
mod post;
mod tag;
mod todo;
mod user;

pub use comment::{Comment, CommentAuthor, CommentWithAuthor, CreateCommentInput};
pub use note::{CreateNoteInput, Note, UpdateNoteInput};
pub use notebook::{CreateNotebookInput, Notebook, UpdateNotebookInput};
pub use post::{CreatePostInput, Post, PostWithMeta, UpdatePostInput};
pub use tag::Tag;
pub use todo::{CreateTodoInput, Todo, TodoPriority, TodoStatus, UpdateTodoInput};
pub use user::User;

//! Service layer
//!
//! Business logic between the API handlers and the repositories. Each service
//! owns its repository trait objects and exposes a thiserror enum the API
//! layer maps onto HTTP statuses.

pub mod comment;
pub mod note;
pub mod notebook;
pub mod password;
pub mod post;
pub mod todo;
pub mod token;
pub mod user;

pub use comment::{CommentService, CommentServiceError};
pub use note::{NoteService, NoteServiceError};
pub use notebook::{NotebookService, NotebookServiceError};
pub use post::{PostService, PostServiceError};
pub use todo::{TodoService, TodoServiceError};
pub use token::{Claims, TokenError};
pub use user::{UserService, UserServiceError};

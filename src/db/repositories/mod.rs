//! Repository layer
//!
//! Each repository exposes a trait describing the data access surface for one
//! aggregate, plus a SQLx implementation that dispatches to SQLite or MySQL
//! based on the configured driver. Tag rows are managed inside the post
//! repository because every tag write happens within a post transaction.

pub mod comment;
pub mod note;
pub mod notebook;
pub mod post;
pub mod todo;
pub mod user;

pub use comment::{CommentRepository, SqlxCommentRepository};
pub use note::{NoteRepository, SqlxNoteRepository};
pub use notebook::{NotebookRepository, SqlxNotebookRepository};
pub use post::{PostRepository, SqlxPostRepository};
pub use todo::{SqlxTodoRepository, TodoRepository};
pub use user::{SqlxUserRepository, UserRepository};

//! HTTP request handlers.

pub mod events;
pub mod health;
pub mod index;
pub mod tag_status;

pub use events::*;
pub use health::*;
pub use index::*;
pub use tag_status::*;

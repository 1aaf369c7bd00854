//! Domain module - validated records produced by the extraction engine
//!
//! Each module is its own file in the domain/ directory; commonly used
//! types are re-exported here for convenience.

pub mod non_empty;
pub mod post;
pub mod post_id;

pub use non_empty::NonEmptyVec;
pub use post::{Post, PostImage};
pub use post_id::PostId;

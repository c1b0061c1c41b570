pub mod comment;
pub mod extraction;
pub mod post;

pub use comment::CommentSet;
pub use extraction::{Extraction, Progress, StopReason};
pub use post::PostRef;

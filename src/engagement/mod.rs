pub mod aggregate;
pub mod arena;
pub mod store;

pub use aggregate::{aggregate, bottom_rated, top_rated, trending, TRENDING_LIMIT};
pub use arena::CommentArena;
pub use store::{EngagementStore, COMMENTS_KEY, RATINGS_KEY};

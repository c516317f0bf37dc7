pub mod category;
pub mod engagement;
pub mod record;

pub use category::{CategoryBundle, CategoryIndex, CategorySummary};
pub use engagement::{
    CommentEvent, EngagementSummary, RatedRecord, RatingEvent, VoteDirection,
};
pub use record::{Record, RosterPayload};

pub mod cache;
pub mod search;
pub mod source;

pub use cache::{LoadOutcome, RosterCache, RosterLoad};
pub use search::{departments, levels, paginate, search, Page, RosterFilter};
pub use source::{FileSource, HttpSource, RosterSource};

pub mod classifier;
pub mod partition;
pub mod rules;

pub use classifier::classify;
pub use partition::{partition, Bucket, Partition};
pub use rules::{CategoryRule, RuleSet, RuleTable};

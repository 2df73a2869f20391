pub mod error;
pub mod graph;
pub mod refs;
pub mod remap;
pub mod rule;
pub mod scheduler;

pub use error::RewriteError;
pub use graph::{HeadRef, RewriteGraph};
pub use refs::{
    apply_ref_updates, plan_ref_updates, RefEntry, RefReport, RefStatus, RefUpdate, RefUpdatePlan,
};
pub use remap::RemapTable;
pub use rule::{Direction, IntervalUnit, Jitter, RuleConfig, Schedule};
pub use scheduler::{rewrite_history, RewriteOutcome};

#[cfg(test)]
pub(crate) mod testutil;

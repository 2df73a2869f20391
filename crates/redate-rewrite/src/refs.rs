use serde::Serialize;

use redate_core::accessor::{AccessError, ObjectAccessor};
use redate_core::id::ObjectId;

use crate::graph::RewriteGraph;
use crate::remap::RemapTable;

/// One planned ref move: repoint `name` from `old_tip` to `new_tip`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefUpdate {
    pub name: String,
    pub old_tip: ObjectId,
    pub new_tip: ObjectId,
}

#[derive(Debug, Default)]
pub struct RefUpdatePlan {
    pub updates: Vec<RefUpdate>,
    /// Heads whose tip remapped to itself; nothing to apply for these.
    pub already_current: Vec<RefUpdate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum RefStatus {
    Updated,
    AlreadyCurrent,
    /// The ref no longer pointed at the expected tip when the
    /// compare-and-swap ran; it was left untouched.
    Moved { actual: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RefEntry {
    pub name: String,
    pub old_tip: ObjectId,
    pub new_tip: ObjectId,
    #[serde(flatten)]
    pub status: RefStatus,
}

/// Per-ref outcome of one apply pass. The caller always gets the full list
/// of attempted refs with old tip, intended new tip, and status.
#[derive(Debug, Default, Serialize)]
pub struct RefReport {
    pub entries: Vec<RefEntry>,
}

impl RefReport {
    pub fn fully_applied(&self) -> bool {
        self.entries
            .iter()
            .all(|e| matches!(e.status, RefStatus::Updated | RefStatus::AlreadyCurrent))
    }

    /// Some refs applied and some did not; the defined partial-completion
    /// outcome, not a failure state.
    pub fn partial(&self) -> bool {
        !self.fully_applied()
    }

    pub fn updated_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, RefStatus::Updated))
            .count()
    }
}

/// Build the ref update plan from the loaded heads and the final remap
/// table.
pub fn plan_ref_updates(graph: &RewriteGraph, remap: &RemapTable) -> RefUpdatePlan {
    let mut plan = RefUpdatePlan::default();
    for head in graph.heads() {
        let new_tip = remap.resolve(&head.tip);
        let update = RefUpdate {
            name: head.name.clone(),
            old_tip: head.tip,
            new_tip,
        };
        if new_tip == head.tip {
            plan.already_current.push(update);
        } else {
            plan.updates.push(update);
        }
    }
    plan
}

/// Apply every planned update with a compare-and-swap. A ref that moved
/// underneath us is reported and skipped; sibling updates still run — each
/// ref update is independently atomic.
pub fn apply_ref_updates<A: ObjectAccessor>(accessor: &mut A, plan: &RefUpdatePlan) -> RefReport {
    let mut report = RefReport::default();

    for update in &plan.already_current {
        report.entries.push(RefEntry {
            name: update.name.clone(),
            old_tip: update.old_tip,
            new_tip: update.new_tip,
            status: RefStatus::AlreadyCurrent,
        });
    }

    for update in &plan.updates {
        let status =
            match accessor.compare_and_swap_ref(&update.name, &update.old_tip, &update.new_tip) {
                Ok(()) => RefStatus::Updated,
                Err(AccessError::RefCasConflict { actual, .. }) => {
                    tracing::warn!(
                        "ref '{}' moved externally (now {}), leaving it alone",
                        update.name,
                        actual
                    );
                    RefStatus::Moved { actual }
                }
                Err(e) => {
                    tracing::warn!("ref '{}' update failed: {}", update.name, e);
                    RefStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            };
        report.entries.push(RefEntry {
            name: update.name.clone(),
            old_tip: update.old_tip,
            new_tip: update.new_tip,
            status,
        });
    }

    tracing::info!(
        "applied {} of {} ref updates",
        report.updated_count(),
        plan.updates.len()
    );
    report
}

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use redate_core::accessor::{AccessError, ObjectAccessor};
use redate_core::commit::{CommitRecord, Timestamp};
use redate_core::id::ObjectId;

use crate::RewriteError;

/// A ref selected for rewriting and the tip it pointed at when loaded.
#[derive(Debug, Clone)]
pub struct HeadRef {
    pub name: String,
    pub tip: ObjectId,
}

/// Every commit reachable from the requested heads, minus anything cut off
/// by the boundary set, fully materialized in memory before the rewrite
/// mutates anything.
#[derive(Debug)]
pub struct RewriteGraph {
    records: HashMap<ObjectId, CommitRecord>,
    order: Vec<ObjectId>,
    heads: Vec<HeadRef>,
    boundary: HashSet<ObjectId>,
}

impl RewriteGraph {
    pub fn load<A: ObjectAccessor>(
        accessor: &A,
        ref_names: &[String],
        boundary: HashSet<ObjectId>,
    ) -> Result<Self, RewriteError> {
        let mut heads = Vec::with_capacity(ref_names.len());
        for name in ref_names {
            let tip = accessor.resolve_ref(name)?;
            heads.push(HeadRef {
                name: name.clone(),
                tip,
            });
        }

        // Explicit worklist; recursing here would overflow the call stack
        // on deep linear histories.
        let mut records: HashMap<ObjectId, CommitRecord> = HashMap::new();
        let mut pending: Vec<ObjectId> = heads
            .iter()
            .map(|h| h.tip)
            .filter(|tip| !boundary.contains(tip))
            .collect();
        while let Some(id) = pending.pop() {
            if records.contains_key(&id) {
                continue;
            }
            let record = match accessor.read_commit(&id) {
                Ok(record) => record,
                Err(AccessError::ObjectNotFound(_)) => {
                    return Err(RewriteError::RepositoryCorrupt {
                        id,
                        reason: "commit object missing".into(),
                    })
                }
                Err(AccessError::Corrupt { reason, .. }) => {
                    return Err(RewriteError::RepositoryCorrupt { id, reason })
                }
                Err(e) => return Err(e.into()),
            };
            for parent in &record.parent_ids {
                if !boundary.contains(parent) && !records.contains_key(parent) {
                    pending.push(*parent);
                }
            }
            records.insert(id, record);
        }

        let order = topo_order(&records)?;
        tracing::debug!(
            "loaded {} commits from {} heads ({} boundary)",
            records.len(),
            heads.len(),
            boundary.len()
        );
        Ok(Self {
            records,
            order,
            heads,
            boundary,
        })
    }

    /// Topological order: every commit appears after all of its in-scope
    /// parents.
    pub fn order(&self) -> &[ObjectId] {
        &self.order
    }

    pub fn record(&self, id: &ObjectId) -> Option<&CommitRecord> {
        self.records.get(id)
    }

    pub fn heads(&self) -> &[HeadRef] {
        &self.heads
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.records.contains_key(id)
    }

    pub fn is_boundary(&self, id: &ObjectId) -> bool {
        self.boundary.contains(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Kahn's algorithm. Ties among dependency-free commits break by original
/// committer time, then id bytes, so the order is stable across runs.
fn topo_order(records: &HashMap<ObjectId, CommitRecord>) -> Result<Vec<ObjectId>, RewriteError> {
    let mut indegree: HashMap<ObjectId, usize> = HashMap::with_capacity(records.len());
    let mut children: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();
    for (id, record) in records {
        let mut in_scope_parents = 0;
        for parent in &record.parent_ids {
            if records.contains_key(parent) {
                children.entry(*parent).or_default().push(*id);
                in_scope_parents += 1;
            }
        }
        indegree.insert(*id, in_scope_parents);
    }

    let mut ready: BinaryHeap<Reverse<(Timestamp, ObjectId)>> = indegree
        .iter()
        .filter(|(_, &n)| n == 0)
        .map(|(id, _)| Reverse((records[id].committer_time, *id)))
        .collect();

    let mut order = Vec::with_capacity(records.len());
    while let Some(Reverse((_, id))) = ready.pop() {
        order.push(id);
        if let Some(kids) = children.get(&id) {
            for child in kids {
                let n = indegree
                    .get_mut(child)
                    .ok_or_else(|| RewriteError::RepositoryCorrupt {
                        id: *child,
                        reason: "commit missing from dependency index".into(),
                    })?;
                *n -= 1;
                if *n == 0 {
                    ready.push(Reverse((records[child].committer_time, *child)));
                }
            }
        }
    }

    if order.len() != records.len() {
        // A commit graph is acyclic by construction; a leftover here means
        // the object store handed us inconsistent parent links.
        let placed: HashSet<ObjectId> = order.iter().copied().collect();
        if let Some(id) = records.keys().find(|id| !placed.contains(id)) {
            return Err(RewriteError::RepositoryCorrupt {
                id: *id,
                reason: "cycle in commit graph".into(),
            });
        }
    }
    Ok(order)
}

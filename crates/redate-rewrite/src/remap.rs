use std::collections::HashMap;

use redate_core::id::ObjectId;

/// Original commit id -> replacement id, populated in topological order.
/// Boundary and untouched commits resolve to themselves.
#[derive(Debug, Default, Clone)]
pub struct RemapTable {
    entries: HashMap<ObjectId, ObjectId>,
}

impl RemapTable {
    pub fn insert(&mut self, original: ObjectId, replacement: ObjectId) {
        self.entries.insert(original, replacement);
    }

    /// Where a commit ended up. Ids without an entry map to themselves.
    pub fn resolve(&self, id: &ObjectId) -> ObjectId {
        self.entries.get(id).copied().unwrap_or(*id)
    }

    /// The recorded replacement, if this id went through the scheduler.
    pub fn get(&self, id: &ObjectId) -> Option<ObjectId> {
        self.entries.get(id).copied()
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.entries.contains_key(id)
    }

    /// True when the scheduler decided this commit was a no-op.
    pub fn is_self_map(&self, id: &ObjectId) -> bool {
        self.entries.get(id) == Some(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectId, &ObjectId)> {
        self.entries.iter()
    }
}

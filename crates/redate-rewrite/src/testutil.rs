use std::collections::HashMap;

use redate_core::accessor::{AccessError, ObjectAccessor};
use redate_core::commit::{CommitRecord, Identity, NewCommit, Timestamp};
use redate_core::id::ObjectId;

/// In-memory object store for engine tests. Ids are BLAKE3 content hashes
/// truncated to the 20-byte id width, so rewritten commits get stable,
/// content-derived identifiers just like the real store.
#[derive(Default)]
pub struct MemoryAccessor {
    pub commits: HashMap<ObjectId, CommitRecord>,
    pub refs: HashMap<String, ObjectId>,
    pub fail_writes: bool,
    pub write_count: usize,
}

pub fn content_id(commit: &NewCommit) -> ObjectId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"redate-test\0");
    hasher.update(commit.tree_id.as_bytes());
    for parent in &commit.parent_ids {
        hasher.update(parent.as_bytes());
    }
    for identity in [&commit.author, &commit.committer] {
        hasher.update(&identity.name);
        hasher.update(b"\0");
        hasher.update(&identity.email);
        hasher.update(b"\0");
    }
    for time in [commit.author_time, commit.committer_time] {
        hasher.update(&time.seconds.to_le_bytes());
        hasher.update(&time.offset_minutes.to_le_bytes());
    }
    hasher.update(&commit.message);
    let hash = hasher.finalize();
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash.as_bytes()[..20]);
    ObjectId::from_bytes(bytes)
}

fn record_from(commit: &NewCommit, id: ObjectId) -> CommitRecord {
    CommitRecord {
        id,
        parent_ids: commit.parent_ids.clone(),
        tree_id: commit.tree_id,
        author: commit.author.clone(),
        committer: commit.committer.clone(),
        author_time: commit.author_time,
        committer_time: commit.committer_time,
        message: commit.message.clone(),
    }
}

impl MemoryAccessor {
    /// Store a commit with both timestamps at `seconds` UTC and return its
    /// content id.
    pub fn insert_commit(
        &mut self,
        parent_ids: Vec<ObjectId>,
        seconds: i64,
        message: &str,
    ) -> ObjectId {
        let commit = NewCommit {
            tree_id: ObjectId::from_bytes([7; 20]),
            parent_ids,
            author: Identity::new("Ann Author", "ann@example.com"),
            committer: Identity::new("Con Committer", "con@example.com"),
            author_time: Timestamp::utc(seconds),
            committer_time: Timestamp::utc(seconds),
            message: message.as_bytes().to_vec(),
        };
        let id = content_id(&commit);
        self.commits.insert(id, record_from(&commit, id));
        id
    }

    pub fn set_ref(&mut self, name: &str, id: ObjectId) {
        self.refs.insert(name.to_string(), id);
    }
}

impl ObjectAccessor for MemoryAccessor {
    fn resolve_ref(&self, name: &str) -> Result<ObjectId, AccessError> {
        self.refs
            .get(name)
            .copied()
            .ok_or_else(|| AccessError::RefNotFound(name.to_string()))
    }

    fn read_commit(&self, id: &ObjectId) -> Result<CommitRecord, AccessError> {
        self.commits
            .get(id)
            .cloned()
            .ok_or(AccessError::ObjectNotFound(*id))
    }

    fn write_commit(&mut self, commit: &NewCommit) -> Result<ObjectId, AccessError> {
        if self.fail_writes {
            return Err(AccessError::WriteFailed("simulated write failure".into()));
        }
        let id = content_id(commit);
        self.commits.insert(id, record_from(commit, id));
        self.write_count += 1;
        Ok(id)
    }

    fn compare_and_swap_ref(
        &mut self,
        name: &str,
        expected_old: &ObjectId,
        new: &ObjectId,
    ) -> Result<(), AccessError> {
        let current = self
            .refs
            .get(name)
            .copied()
            .ok_or_else(|| AccessError::RefNotFound(name.to_string()))?;
        if current != *expected_old {
            return Err(AccessError::RefCasConflict {
                name: name.to_string(),
                expected: *expected_old,
                actual: current.to_hex(),
            });
        }
        self.refs.insert(name.to_string(), *new);
        Ok(())
    }
}

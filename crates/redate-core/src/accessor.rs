use thiserror::Error;

use crate::commit::{CommitRecord, NewCommit};
use crate::id::ObjectId;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("ref not found: {0}")]
    RefNotFound(String),
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),
    #[error("corrupt object {id}: {reason}")]
    Corrupt { id: ObjectId, reason: String },
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("ref '{name}' CAS conflict: expected {expected}, actual {actual}")]
    RefCasConflict {
        name: String,
        expected: ObjectId,
        /// What the ref pointed at when the conflict was observed, when it
        /// could still be read.
        actual: String,
    },
    #[error("backend error: {0}")]
    Backend(String),
}

/// Read and write access to a repository's commit objects and refs.
///
/// The rewrite engine is generic over this trait; the engine assumes it is
/// the sole writer for the duration of one invocation, and relies on
/// `compare_and_swap_ref` to detect (not prevent) concurrent mutation.
pub trait ObjectAccessor {
    /// Resolve a ref name (full or short) to the commit id it points at.
    fn resolve_ref(&self, name: &str) -> Result<ObjectId, AccessError>;

    /// Read one commit's metadata by id.
    fn read_commit(&self, id: &ObjectId) -> Result<CommitRecord, AccessError>;

    /// Materialize a new commit object and return its content-derived id.
    /// The write is durable once this returns; an unreferenced object left
    /// behind by an aborted rewrite is harmless garbage.
    fn write_commit(&mut self, commit: &NewCommit) -> Result<ObjectId, AccessError>;

    /// Repoint a ref, but only if it still points at `expected_old`.
    /// Fails with `RefCasConflict` when another writer got there first.
    fn compare_and_swap_ref(
        &mut self,
        name: &str,
        expected_old: &ObjectId,
        new: &ObjectId,
    ) -> Result<(), AccessError>;
}

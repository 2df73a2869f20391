use std::path::Path;

use git2::{ErrorCode, Oid, Repository};

use redate_core::accessor::{AccessError, ObjectAccessor};
use redate_core::commit::{CommitRecord, Identity, NewCommit, Timestamp};
use redate_core::id::ObjectId;

use crate::commit_format::commit_object_bytes;

/// libgit2-backed object accessor. Owns the repository handle for the
/// duration of one rewrite invocation; no process-wide repository state.
pub struct GitAccessor {
    repo: Repository,
}

impl GitAccessor {
    pub fn open(path: &Path) -> Result<Self, AccessError> {
        let repo = Repository::open(path).map_err(|e| {
            AccessError::Backend(format!(
                "cannot open repository at {}: {}",
                path.display(),
                e.message()
            ))
        })?;
        tracing::debug!("opened repository at {}", path.display());
        Ok(Self { repo })
    }

    /// Look up a ref by full name, falling back to short branch/tag names,
    /// and chase symbolic refs (HEAD) to the direct ref underneath.
    fn find_direct_reference(&self, name: &str) -> Result<git2::Reference<'_>, AccessError> {
        let reference = self
            .repo
            .find_reference(name)
            .or_else(|_| self.repo.resolve_reference_from_short_name(name))
            .map_err(|e| match e.code() {
                ErrorCode::NotFound => AccessError::RefNotFound(name.to_string()),
                _ => AccessError::Backend(e.message().to_string()),
            })?;
        reference
            .resolve()
            .map_err(|e| AccessError::Backend(e.message().to_string()))
    }
}

fn to_object_id(oid: Oid) -> Result<ObjectId, AccessError> {
    let bytes: [u8; 20] = oid
        .as_bytes()
        .try_into()
        .map_err(|_| AccessError::Backend(format!("unexpected oid width for {oid}")))?;
    Ok(ObjectId::from_bytes(bytes))
}

fn to_oid(id: &ObjectId) -> Result<Oid, AccessError> {
    Oid::from_bytes(id.as_bytes()).map_err(|e| AccessError::Backend(e.message().to_string()))
}

fn identity_from(signature: &git2::Signature<'_>) -> Identity {
    Identity::new(signature.name_bytes(), signature.email_bytes())
}

fn timestamp_from(time: git2::Time) -> Timestamp {
    Timestamp::new(time.seconds(), time.offset_minutes())
}

impl ObjectAccessor for GitAccessor {
    fn resolve_ref(&self, name: &str) -> Result<ObjectId, AccessError> {
        let reference = self.find_direct_reference(name)?;
        let target = reference
            .target()
            .ok_or_else(|| AccessError::Backend(format!("ref '{name}' has no direct target")))?;
        to_object_id(target)
    }

    fn read_commit(&self, id: &ObjectId) -> Result<CommitRecord, AccessError> {
        let oid = to_oid(id)?;
        let commit = self.repo.find_commit(oid).map_err(|e| match e.code() {
            ErrorCode::NotFound => AccessError::ObjectNotFound(*id),
            _ => AccessError::Corrupt {
                id: *id,
                reason: e.message().to_string(),
            },
        })?;

        let mut parent_ids = Vec::with_capacity(commit.parent_count());
        for parent in commit.parent_ids() {
            parent_ids.push(to_object_id(parent)?);
        }

        Ok(CommitRecord {
            id: *id,
            parent_ids,
            tree_id: to_object_id(commit.tree_id())?,
            author: identity_from(&commit.author()),
            committer: identity_from(&commit.committer()),
            author_time: timestamp_from(commit.author().when()),
            committer_time: timestamp_from(commit.committer().when()),
            message: commit.message_raw_bytes().to_vec(),
        })
    }

    fn write_commit(&mut self, commit: &NewCommit) -> Result<ObjectId, AccessError> {
        let bytes = commit_object_bytes(commit);
        let odb = self
            .repo
            .odb()
            .map_err(|e| AccessError::WriteFailed(e.message().to_string()))?;
        let oid = odb
            .write(git2::ObjectType::Commit, &bytes)
            .map_err(|e| AccessError::WriteFailed(e.message().to_string()))?;
        to_object_id(oid)
    }

    fn compare_and_swap_ref(
        &mut self,
        name: &str,
        expected_old: &ObjectId,
        new: &ObjectId,
    ) -> Result<(), AccessError> {
        let full_name = {
            let reference = self.find_direct_reference(name)?;
            let full_name = reference
                .name()
                .ok_or_else(|| AccessError::Backend(format!("ref '{name}' has a non-UTF-8 name")))?
                .to_string();
            match reference.target() {
                Some(oid) if to_object_id(oid)? == *expected_old => {}
                other => {
                    return Err(AccessError::RefCasConflict {
                        name: full_name,
                        expected: *expected_old,
                        actual: other
                            .map(|oid| oid.to_string())
                            .unwrap_or_else(|| "<unborn>".to_string()),
                    })
                }
            }
            full_name
        };

        // The check above only fills in the observed value; this update is
        // the atomic step and re-verifies the expected tip.
        self.repo
            .reference_matching(
                &full_name,
                to_oid(new)?,
                true,
                to_oid(expected_old)?,
                "redate: timestamp rewrite",
            )
            .map_err(|e| match e.code() {
                ErrorCode::Modified => AccessError::RefCasConflict {
                    name: full_name.clone(),
                    expected: *expected_old,
                    actual: self
                        .repo
                        .find_reference(&full_name)
                        .ok()
                        .and_then(|r| r.target())
                        .map(|oid| oid.to_string())
                        .unwrap_or_else(|| "<unknown>".to_string()),
                },
                ErrorCode::NotFound => AccessError::RefNotFound(full_name.clone()),
                _ => AccessError::Backend(e.message().to_string()),
            })?;
        Ok(())
    }
}

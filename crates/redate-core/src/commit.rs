use std::borrow::Cow;
use std::fmt;

use crate::id::ObjectId;

/// Seconds since the Unix epoch plus a timezone offset in minutes east of
/// UTC, mirroring git's commit-header encoding. A changed offset is a
/// content change even when the instant is the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    pub seconds: i64,
    pub offset_minutes: i32,
}

impl Timestamp {
    pub fn new(seconds: i64, offset_minutes: i32) -> Self {
        Self {
            seconds,
            offset_minutes,
        }
    }

    pub fn utc(seconds: i64) -> Self {
        Self {
            seconds,
            offset_minutes: 0,
        }
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Order by instant; offset only disambiguates for determinism.
        self.seconds
            .cmp(&other.seconds)
            .then(self.offset_minutes.cmp(&other.offset_minutes))
    }
}

/// Author or committer identity. git does not guarantee UTF-8 here, so the
/// raw bytes are kept and only rendered lossily for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: Vec<u8>,
    pub email: Vec<u8>,
}

impl Identity {
    pub fn new(name: impl Into<Vec<u8>>, email: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    pub fn email_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.email)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name_lossy(), self.email_lossy())
    }
}

/// One historical commit as read from the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: ObjectId,
    /// Ordered; the first parent is the mainline.
    pub parent_ids: Vec<ObjectId>,
    pub tree_id: ObjectId,
    pub author: Identity,
    pub committer: Identity,
    pub author_time: Timestamp,
    pub committer_time: Timestamp,
    /// Opaque bytes, preserved verbatim through a rewrite.
    pub message: Vec<u8>,
}

impl CommitRecord {
    /// First line of the message, lossily decoded, for listings.
    pub fn summary_line(&self) -> String {
        let first = self
            .message
            .split(|&b| b == b'\n')
            .next()
            .unwrap_or_default();
        String::from_utf8_lossy(first).into_owned()
    }

    /// Committer-minus-author time difference in seconds.
    pub fn time_delta_seconds(&self) -> i64 {
        self.committer_time.seconds - self.author_time.seconds
    }
}

/// Write-side projection of a replacement commit: everything the object
/// store needs to materialize it and compute the new id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommit {
    pub tree_id: ObjectId,
    pub parent_ids: Vec<ObjectId>,
    pub author: Identity,
    pub committer: Identity,
    pub author_time: Timestamp,
    pub committer_time: Timestamp,
    pub message: Vec<u8>,
}

impl NewCommit {
    /// Replacement for `record` with remapped parents and new timestamps;
    /// tree, identities and message carry over untouched.
    pub fn replacement(
        record: &CommitRecord,
        parent_ids: Vec<ObjectId>,
        author_time: Timestamp,
        committer_time: Timestamp,
    ) -> Self {
        Self {
            tree_id: record.tree_id,
            parent_ids,
            author: record.author.clone(),
            committer: record.committer.clone(),
            author_time,
            committer_time,
            message: record.message.clone(),
        }
    }
}

use thiserror::Error;

use redate_core::accessor::AccessError;
use redate_core::id::ObjectId;

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("invalid rule config: {0}")]
    InvalidRuleConfig(String),
    #[error("repository corrupt at {id}: {reason}")]
    RepositoryCorrupt { id: ObjectId, reason: String },
    #[error("storage write failed while replacing {original}: {source}")]
    StorageWriteFailed {
        original: ObjectId,
        source: AccessError,
    },
    #[error("access error: {0}")]
    Access(#[from] AccessError),
}

pub mod accessor;
pub mod commit;
pub mod error;
pub mod id;

pub use accessor::{AccessError, ObjectAccessor};
pub use commit::{CommitRecord, Identity, NewCommit, Timestamp};
pub use error::CoreError;
pub use id::ObjectId;

use redate_core::commit::{Identity, NewCommit, Timestamp};

/// Serialize a commit in git's canonical object format, without the
/// "commit <len>\0" header (the odb prepends it when hashing):
///
/// tree <hex-sha1>
/// parent <hex-sha1>   (one per parent, in order)
/// author <name> <<email>> <seconds> <±HHMM>
/// committer <name> <<email>> <seconds> <±HHMM>
///
/// <message bytes, verbatim>
pub fn commit_object_bytes(commit: &NewCommit) -> Vec<u8> {
    let mut out = Vec::with_capacity(256 + commit.message.len());

    out.extend_from_slice(b"tree ");
    out.extend_from_slice(commit.tree_id.to_hex().as_bytes());
    out.push(b'\n');

    for parent in &commit.parent_ids {
        out.extend_from_slice(b"parent ");
        out.extend_from_slice(parent.to_hex().as_bytes());
        out.push(b'\n');
    }

    signature_line(&mut out, b"author", &commit.author, commit.author_time);
    signature_line(&mut out, b"committer", &commit.committer, commit.committer_time);
    out.push(b'\n');
    out.extend_from_slice(&commit.message);
    out
}

fn signature_line(out: &mut Vec<u8>, kind: &[u8], identity: &Identity, time: Timestamp) {
    out.extend_from_slice(kind);
    out.push(b' ');
    out.extend_from_slice(&identity.name);
    out.extend_from_slice(b" <");
    out.extend_from_slice(&identity.email);
    out.extend_from_slice(b"> ");
    out.extend_from_slice(time.seconds.to_string().as_bytes());
    out.push(b' ');
    out.extend_from_slice(format_offset(time.offset_minutes).as_bytes());
    out.push(b'\n');
}

/// git encodes the timezone as ±HHMM.
pub fn format_offset(offset_minutes: i32) -> String {
    let sign = if offset_minutes < 0 { '-' } else { '+' };
    let magnitude = offset_minutes.unsigned_abs();
    format!("{sign}{:02}{:02}", magnitude / 60, magnitude % 60)
}

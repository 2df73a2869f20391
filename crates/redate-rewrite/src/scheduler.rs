use redate_core::accessor::ObjectAccessor;
use redate_core::commit::NewCommit;
use redate_core::id::ObjectId;

use crate::graph::RewriteGraph;
use crate::remap::RemapTable;
use crate::rule::Schedule;
use crate::RewriteError;

/// Result of one scheduling pass: the id remapping plus every object that
/// was actually written.
#[derive(Debug)]
pub struct RewriteOutcome {
    pub remap: RemapTable,
    pub written: Vec<ObjectId>,
}

/// Walk the graph in topological order and materialize a replacement for
/// every commit whose parents or timestamps change.
///
/// A commit whose remapped parents equal its original parents and whose
/// scheduled instant equals both original timestamps is recorded as a
/// self-map without writing anything. A failed write aborts the whole pass;
/// objects already written stay behind as unreferenced garbage and no ref
/// has been touched yet.
pub fn rewrite_history<A: ObjectAccessor>(
    accessor: &mut A,
    graph: &RewriteGraph,
    schedule: &Schedule,
) -> Result<RewriteOutcome, RewriteError> {
    if schedule.len() != graph.len() {
        return Err(RewriteError::InvalidRuleConfig(format!(
            "schedule covers {} commits but the graph holds {}",
            schedule.len(),
            graph.len()
        )));
    }

    let mut remap = RemapTable::default();
    let mut written = Vec::new();
    for (ordinal, id) in graph.order().iter().enumerate() {
        let record = graph
            .record(id)
            .ok_or_else(|| RewriteError::RepositoryCorrupt {
                id: *id,
                reason: "commit missing from loaded graph".into(),
            })?;

        let parents: Vec<ObjectId> = record.parent_ids.iter().map(|p| remap.resolve(p)).collect();
        let new_time = schedule.timestamp_for(ordinal);

        if parents == record.parent_ids
            && new_time == record.author_time
            && new_time == record.committer_time
        {
            tracing::debug!("{} unchanged, keeping original", id.short());
            remap.insert(*id, *id);
            continue;
        }

        let replacement = NewCommit::replacement(record, parents, new_time, new_time);
        let new_id = accessor
            .write_commit(&replacement)
            .map_err(|source| RewriteError::StorageWriteFailed {
                original: *id,
                source,
            })?;
        tracing::debug!("{} rewritten as {}", id.short(), new_id.short());
        remap.insert(*id, new_id);
        written.push(new_id);
    }

    tracing::info!("rewrote {} of {} commits", written.len(), graph.len());
    Ok(RewriteOutcome { remap, written })
}

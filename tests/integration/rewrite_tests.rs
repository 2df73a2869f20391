use std::collections::HashSet;
use std::path::Path;

use git2::{Oid, Repository, Signature, Time};

use redate_core::{Identity, NewCommit, ObjectAccessor, ObjectId, Timestamp};
use redate_git::GitAccessor;
use redate_rewrite::{
    apply_ref_updates, plan_ref_updates, rewrite_history, Direction, IntervalUnit, RefReport,
    RefStatus, RemapTable, RewriteGraph, RuleConfig,
};

const START: i64 = 1577836800; // 2020-01-01T00:00:00Z
const DAY: i64 = 86400;

fn init_repo() -> (tempfile::TempDir, Repository) {
    let tmp = tempfile::tempdir().unwrap();
    let repo = Repository::init(tmp.path()).unwrap();
    (tmp, repo)
}

fn commit(repo: &Repository, parents: &[Oid], seconds: i64, message: &str) -> Oid {
    let tree_id = repo.treebuilder(None).unwrap().write().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = Signature::new("Ann Author", "ann@example.com", &Time::new(seconds, 0)).unwrap();
    let parents: Vec<git2::Commit> = parents
        .iter()
        .map(|&p| repo.find_commit(p).unwrap())
        .collect();
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    repo.commit(None, &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}

fn set_branch(repo: &Repository, name: &str, target: Oid) {
    repo.reference(&format!("refs/heads/{name}"), target, true, "test")
        .unwrap();
}

fn object_id(oid: Oid) -> ObjectId {
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(oid.as_bytes());
    ObjectId::from_bytes(bytes)
}

fn oid(id: ObjectId) -> Oid {
    Oid::from_bytes(id.as_bytes()).unwrap()
}

fn day_rule() -> RuleConfig {
    RuleConfig {
        start: Timestamp::utc(START),
        interval: 1,
        unit: IntervalUnit::Days,
        direction: Direction::OldestFirst,
        jitter: None,
    }
}

fn run_rewrite(
    path: &Path,
    branches: &[&str],
    boundary: HashSet<ObjectId>,
    config: &RuleConfig,
) -> (RemapTable, Vec<ObjectId>, RefReport) {
    let mut accessor = GitAccessor::open(path).unwrap();
    let branches: Vec<String> = branches.iter().map(|s| s.to_string()).collect();
    let graph = RewriteGraph::load(&accessor, &branches, boundary).unwrap();
    let schedule = config.compile(graph.len()).unwrap();
    let outcome = rewrite_history(&mut accessor, &graph, &schedule).unwrap();
    let plan = plan_ref_updates(&graph, &outcome.remap);
    let report = apply_ref_updates(&mut accessor, &plan);
    (outcome.remap, outcome.written, report)
}

#[test]
fn linear_history_lands_on_daily_schedule() {
    let (tmp, repo) = init_repo();
    let root = commit(&repo, &[], 1000, "root\n");
    let a = commit(&repo, &[root], 2000, "a\n");
    let b = commit(&repo, &[a], 3000, "b\n");
    set_branch(&repo, "main", b);

    let (remap, written, report) =
        run_rewrite(tmp.path(), &["refs/heads/main"], HashSet::new(), &day_rule());

    assert_eq!(written.len(), 3);
    assert!(report.fully_applied());

    for (ordinal, old) in [root, a, b].iter().enumerate() {
        let new_id = remap.resolve(&object_id(*old));
        assert_ne!(new_id, object_id(*old));
        let rewritten = repo.find_commit(oid(new_id)).unwrap();
        let expected = START + ordinal as i64 * DAY;
        assert_eq!(rewritten.author().when().seconds(), expected);
        assert_eq!(rewritten.committer().when().seconds(), expected);
        // Tree content is never rewritten.
        assert_eq!(
            rewritten.tree_id(),
            repo.find_commit(*old).unwrap().tree_id()
        );
    }

    // The branch ref moved to the rewritten tip.
    let tip = repo.find_reference("refs/heads/main").unwrap().target();
    assert_eq!(tip, Some(oid(remap.resolve(&object_id(b)))));
}

#[test]
fn merge_keeps_boundary_parent_verbatim() {
    let (tmp, repo) = init_repo();
    let base = commit(&repo, &[], 500, "shared base\n");
    let ours = commit(&repo, &[base], 1000, "ours\n");
    let theirs = commit(&repo, &[base], 1500, "theirs\n");
    let merge = commit(&repo, &[ours, theirs], 2000, "merge\n");
    set_branch(&repo, "main", merge);
    set_branch(&repo, "other", theirs);

    // "other" is not being rewritten; cut its side off at `theirs`.
    let boundary: HashSet<ObjectId> = [object_id(theirs)].into_iter().collect();
    let (remap, _, report) =
        run_rewrite(tmp.path(), &["refs/heads/main"], boundary, &day_rule());

    assert!(report.fully_applied());
    // Boundary commits never enter the remap table.
    assert!(remap.get(&object_id(theirs)).is_none());

    let new_merge = repo
        .find_commit(oid(remap.resolve(&object_id(merge))))
        .unwrap();
    let parents: Vec<Oid> = new_merge.parent_ids().collect();
    assert_eq!(
        parents,
        vec![oid(remap.resolve(&object_id(ours))), theirs]
    );
    // The untouched branch still points at the old history.
    assert_eq!(
        repo.find_reference("refs/heads/other").unwrap().target(),
        Some(theirs)
    );
}

#[test]
fn externally_moved_ref_is_reported_and_siblings_update() {
    let (tmp, repo) = init_repo();
    let a = commit(&repo, &[], 1000, "a\n");
    let b = commit(&repo, &[], 2000, "b\n");
    set_branch(&repo, "one", a);
    set_branch(&repo, "two", b);

    let mut accessor = GitAccessor::open(tmp.path()).unwrap();
    let branches = vec!["refs/heads/one".to_string(), "refs/heads/two".to_string()];
    let graph = RewriteGraph::load(&accessor, &branches, HashSet::new()).unwrap();
    let schedule = day_rule().compile(graph.len()).unwrap();
    let outcome = rewrite_history(&mut accessor, &graph, &schedule).unwrap();
    let plan = plan_ref_updates(&graph, &outcome.remap);

    // Concurrent external move between scheduling and apply.
    let interloper = commit(&repo, &[], 9000, "interloper\n");
    set_branch(&repo, "two", interloper);

    let report = apply_ref_updates(&mut accessor, &plan);
    assert!(report.partial());
    assert_eq!(report.updated_count(), 1);

    let two = report
        .entries
        .iter()
        .find(|e| e.name == "refs/heads/two")
        .unwrap();
    assert!(matches!(&two.status, RefStatus::Moved { actual } if *actual == interloper.to_string()));

    // "two" untouched, "one" repointed.
    assert_eq!(
        repo.find_reference("refs/heads/two").unwrap().target(),
        Some(interloper)
    );
    assert_eq!(
        repo.find_reference("refs/heads/one").unwrap().target(),
        Some(oid(outcome.remap.resolve(&object_id(a))))
    );
}

#[test]
fn second_run_is_all_self_maps() {
    let (tmp, repo) = init_repo();
    let root = commit(&repo, &[], 1000, "root\n");
    let tip = commit(&repo, &[root], 2000, "tip\n");
    set_branch(&repo, "main", tip);

    let (_, first_written, first_report) =
        run_rewrite(tmp.path(), &["refs/heads/main"], HashSet::new(), &day_rule());
    assert_eq!(first_written.len(), 2);
    assert!(first_report.fully_applied());

    let (second_remap, second_written, second_report) =
        run_rewrite(tmp.path(), &["refs/heads/main"], HashSet::new(), &day_rule());
    assert!(second_written.is_empty());
    assert!(second_report.fully_applied());
    assert_eq!(second_report.updated_count(), 0);
    for (original, mapped) in second_remap.iter() {
        assert_eq!(original, mapped);
    }
}

#[test]
fn identical_runs_produce_identical_ids() {
    let build = || {
        let (tmp, repo) = init_repo();
        let root = commit(&repo, &[], 1000, "root\n");
        let tip = commit(&repo, &[root], 2000, "tip\n");
        set_branch(&repo, "main", tip);
        (tmp, object_id(tip))
    };
    let (repo_a, tip_a) = build();
    let (repo_b, tip_b) = build();
    assert_eq!(tip_a, tip_b);

    let (remap_a, _, _) =
        run_rewrite(repo_a.path(), &["refs/heads/main"], HashSet::new(), &day_rule());
    let (remap_b, _, _) =
        run_rewrite(repo_b.path(), &["refs/heads/main"], HashSet::new(), &day_rule());
    assert_eq!(remap_a.resolve(&tip_a), remap_b.resolve(&tip_b));
}

#[test]
fn non_utf8_message_survives_a_rewrite() {
    let (tmp, repo) = init_repo();
    let tree_id = repo.treebuilder(None).unwrap().write().unwrap();

    let mut accessor = GitAccessor::open(tmp.path()).unwrap();
    let message = vec![b'f', b'i', b'x', 0xff, 0xfe, b'\n'];
    let odd = accessor
        .write_commit(&NewCommit {
            tree_id: object_id(tree_id),
            parent_ids: vec![],
            author: Identity::new("Ann", "ann@example.com"),
            committer: Identity::new("Ann", "ann@example.com"),
            author_time: Timestamp::utc(1000),
            committer_time: Timestamp::utc(1000),
            message: message.clone(),
        })
        .unwrap();
    set_branch(&repo, "main", oid(odd));

    let (remap, _, report) =
        run_rewrite(tmp.path(), &["refs/heads/main"], HashSet::new(), &day_rule());
    assert!(report.fully_applied());

    let accessor = GitAccessor::open(tmp.path()).unwrap();
    let rewritten = accessor.read_commit(&remap.resolve(&odd)).unwrap();
    assert_eq!(rewritten.message, message);
    assert_eq!(rewritten.author_time, Timestamp::utc(START));
}

#[test]
fn newest_first_pins_tip_to_start() {
    let (tmp, repo) = init_repo();
    let root = commit(&repo, &[], 1000, "root\n");
    let tip = commit(&repo, &[root], 2000, "tip\n");
    set_branch(&repo, "main", tip);

    let config = RuleConfig {
        direction: Direction::NewestFirst,
        ..day_rule()
    };
    let (remap, _, _) = run_rewrite(tmp.path(), &["refs/heads/main"], HashSet::new(), &config);

    let new_tip = repo
        .find_commit(oid(remap.resolve(&object_id(tip))))
        .unwrap();
    let new_root = repo
        .find_commit(oid(remap.resolve(&object_id(root))))
        .unwrap();
    assert_eq!(new_tip.committer().when().seconds(), START);
    assert_eq!(new_root.committer().when().seconds(), START - DAY);
}

use std::io::Write as _;

use clap::Args;

use redate_rewrite::{
    apply_ref_updates, plan_ref_updates, rewrite_history, RefReport, RefStatus, RewriteGraph,
};

use crate::output;

#[derive(Args)]
pub struct RewriteArgs {
    #[command(flatten)]
    repo: super::RepoArgs,
    /// Branch or ref to rewrite; repeatable
    #[arg(long = "branch", required = true)]
    branches: Vec<String>,
    #[command(flatten)]
    rule: super::RuleArgs,
    /// Skip the backup confirmation prompt
    #[arg(long)]
    yes: bool,
    /// Emit the ref report as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: RewriteArgs) -> anyhow::Result<i32> {
    // Bad rule parameters fail here, before anything is read or written.
    let config = args.rule.to_config()?;

    if !args.yes && !confirm_backup()? {
        anyhow::bail!("aborted: create a backup of the repository first, or pass --yes");
    }

    let mut accessor = args.repo.open()?;
    let boundary = args.repo.boundary_set(&accessor)?;
    let graph = RewriteGraph::load(&accessor, &args.branches, boundary)?;
    if graph.is_empty() {
        println!("nothing to rewrite");
        return Ok(0);
    }

    tracing::info!("rewriting {} commits on {} refs", graph.len(), graph.heads().len());
    let schedule = config.compile(graph.len())?;
    let outcome = rewrite_history(&mut accessor, &graph, &schedule)?;
    let plan = plan_ref_updates(&graph, &outcome.remap);
    let report = apply_ref_updates(&mut accessor, &plan);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, outcome.written.len());
    }
    Ok(if report.fully_applied() { 0 } else { 1 })
}

fn confirm_backup() -> anyhow::Result<bool> {
    print!("Rewriting history is destructive. Did you create a backup? [y/N] ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().eq_ignore_ascii_case("y"))
}

fn print_report(report: &RefReport, written: usize) {
    println!("{written} commits rewritten");
    for entry in &report.entries {
        let status = match &entry.status {
            RefStatus::Updated => "updated".to_string(),
            RefStatus::AlreadyCurrent => "already current".to_string(),
            RefStatus::Moved { actual } => format!("moved externally (now {actual})"),
            RefStatus::Failed { reason } => format!("failed: {reason}"),
        };
        println!(
            "{}",
            output::kv(
                &entry.name,
                &format!(
                    "{} -> {}  [{}]",
                    entry.old_tip.short(),
                    entry.new_tip.short(),
                    status
                )
            )
        );
    }
}

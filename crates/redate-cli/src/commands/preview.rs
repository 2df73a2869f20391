use clap::Args;

use redate_rewrite::RewriteGraph;

use crate::output;

#[derive(Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    repo: super::RepoArgs,
    /// Branch or ref to rewrite; repeatable
    #[arg(long = "branch", required = true)]
    branches: Vec<String>,
    #[command(flatten)]
    rule: super::RuleArgs,
}

pub fn run(args: PreviewArgs) -> anyhow::Result<i32> {
    let config = args.rule.to_config()?;
    let accessor = args.repo.open()?;
    let boundary = args.repo.boundary_set(&accessor)?;
    let graph = RewriteGraph::load(&accessor, &args.branches, boundary)?;
    let schedule = config.compile(graph.len())?;

    println!(
        "{}",
        output::header(&format!("planned schedule, {} commits", graph.len()))
    );
    for (ordinal, id) in graph.order().iter().enumerate() {
        let Some(record) = graph.record(id) else {
            continue;
        };
        println!(
            "{ordinal:>4} {} {} -> {}",
            id.short(),
            output::format_timestamp(record.committer_time),
            output::format_timestamp(schedule.timestamp_for(ordinal))
        );
    }

    println!("{}", output::header("refs"));
    for head in graph.heads() {
        println!(
            "{}",
            output::kv(
                &head.name,
                &format!("{} (tip re-identified at rewrite time)", head.tip.short())
            )
        );
    }
    println!("no objects or refs were modified");
    Ok(0)
}

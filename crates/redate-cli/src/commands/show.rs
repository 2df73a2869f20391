use clap::Args;

use redate_rewrite::RewriteGraph;

use crate::output;

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    repo: super::RepoArgs,
    /// Branch or ref to inspect; repeatable
    #[arg(long = "branch", default_value = "HEAD")]
    branches: Vec<String>,
}

pub fn run(args: ShowArgs) -> anyhow::Result<i32> {
    let accessor = args.repo.open()?;
    let boundary = args.repo.boundary_set(&accessor)?;
    let graph = RewriteGraph::load(&accessor, &args.branches, boundary)?;

    println!("{}", output::header(&format!("{} commits", graph.len())));
    for (ordinal, id) in graph.order().iter().enumerate() {
        let Some(record) = graph.record(id) else {
            continue;
        };
        println!("{ordinal:>4} {} {}", id.short(), record.summary_line());
        println!(
            "     author    {}",
            output::format_timestamp(record.author_time)
        );
        println!(
            "     committer {}  (delta {}s)",
            output::format_timestamp(record.committer_time),
            record.time_delta_seconds()
        );
    }
    Ok(0)
}

use anyhow::{bail, Context, Result};
use clap::Parser;
use linkrank_core::graph::{parse_link_list, LinkGraphBuilder};
use linkrank_core::persist::{read_metadata, write_metadata};
use linkrank_core::{ContentFetcher, InvertedIndex, Page, QueryOutcome, QueryResolver, RankEngine};
use linkrank_fetcher::HttpFetcher;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "linkrank")]
#[command(about = "Closed-crawl PageRank search over a fixed link list")]
struct Cli {
    /// Metadata file from a previous build (query-only mode), or the
    /// `label,url` link list when an output directory is also given.
    input: PathBuf,
    /// Output directory for metadata.txt; enables the full build.
    output_dir: Option<PathBuf>,
    /// Fetch workers during graph construction.
    #[arg(long, default_value_t = 1)]
    concurrency: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();
    let fetcher = HttpFetcher::new()?;

    let pages = match &args.output_dir {
        None => {
            if !args.input.is_file() {
                bail!("{} is not a metadata file", args.input.display());
            }
            read_metadata(&args.input)?
        }
        Some(dir) => {
            if !args.input.is_file() || !dir.is_dir() {
                bail!("need an existing links file and an existing output directory");
            }
            build(&args.input, dir, args.concurrency, &fetcher).await?
        }
    };

    let index = InvertedIndex::build(&pages);
    println!("System is now ready to accept queries");
    repl(&index, &pages, &fetcher).await
}

/// Full build chain: fetch the seed set, rank it, write metadata.txt.
async fn build(
    links: &Path,
    out_dir: &Path,
    concurrency: usize,
    fetcher: &dyn ContentFetcher,
) -> Result<Vec<Page>> {
    let text =
        std::fs::read_to_string(links).with_context(|| format!("reading {}", links.display()))?;
    let entries = parse_link_list(&text);
    let (graph, mut pages) = LinkGraphBuilder::new()
        .with_concurrency(concurrency)
        .build(&entries, fetcher)
        .await?;

    let scores = RankEngine::new().run(&graph);
    for (page, score) in pages.iter_mut().zip(&scores) {
        page.score = *score;
    }
    tracing::info!(pages = pages.len(), "ranking complete");
    write_metadata(&out_dir.join("metadata.txt"), &pages)?;
    Ok(pages)
}

/// One query per line; `ZZZ` quits; an empty line re-prompts. Errors while
/// answering a query are reported without ending the session.
async fn repl(index: &InvertedIndex, pages: &[Page], fetcher: &HttpFetcher) -> Result<()> {
    let resolver = QueryResolver::new(index, pages);
    let stdin = io::stdin();
    loop {
        print!("\nEnter your query: ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim_end_matches(['\r', '\n']);
        if query == "ZZZ" {
            break;
        }
        if query.is_empty() {
            println!("No query entered. Enter some query.");
            continue;
        }
        answer(&resolver, query, fetcher).await;
    }
    println!("\nThank you for trying out the system.");
    Ok(())
}

async fn answer(resolver: &QueryResolver<'_>, query: &str, fetcher: &HttpFetcher) {
    match resolver.resolve(query, fetcher).await {
        Ok(QueryOutcome::EmptyQuery) => println!("No query entered. Enter some query."),
        Ok(QueryOutcome::TermNotFound) => {
            println!("Term does not exist. Please modify your search query and try again.");
        }
        Ok(QueryOutcome::Results(hits)) => {
            for (rank, hit) in hits.iter().enumerate() {
                println!("{}. {}\n{}\nPageRank: {}", rank + 1, hit.title, hit.url, hit.score);
                println!("{}\n", hit.snippet);
            }
        }
        Err(err) => println!("query failed: {err:#}"),
    }
}

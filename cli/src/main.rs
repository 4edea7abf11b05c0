use anyhow::Result;
use clap::{Parser, Subcommand};
use engine::search;
use engine::store::{IndexStore, MemoryStore, SledStore};
use engine::{Crawler, Fetcher, Indexer, Ranker, StopWords, Throttle};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "websearch")]
#[command(about = "Crawl a linked document collection and search it", long_about = None)]
struct Cli {
    /// Directory of the durable index store; in-memory when omitted
    #[arg(long)]
    store: Option<PathBuf>,
    /// Directory of the local page cache
    #[arg(long, default_value = "./pages")]
    cache_dir: PathBuf,
    /// Stop-word file (comma- or line-delimited); bundled list when omitted
    #[arg(long)]
    stopwords: Option<PathBuf>,
    /// Minimum milliseconds between live network fetches
    #[arg(long, default_value_t = 1000)]
    min_fetch_interval_ms: u64,
}

#[derive(Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    /// Crawl a URL breadth-first to the given depth
    Crawl {
        url: String,
        #[arg(long, default_value_t = 1)]
        depth: u32,
    },
    /// Query the index; terms are colon-delimited and all must match
    Search { terms: String },
    /// Delete everything from the index store
    Reset,
    /// Leave the shell
    Quit,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();

    let store: Box<dyn IndexStore> = match &args.store {
        Some(path) => {
            tracing::info!(path = %path.display(), "using durable index store");
            Box::new(SledStore::open(path)?)
        }
        None => Box::new(MemoryStore::new()),
    };
    let stop_words = match &args.stopwords {
        Some(path) => StopWords::from_path(path)?,
        None => StopWords::default(),
    };
    let mut index = Indexer::new(store, stop_words);
    // one ranker for the whole session: crawls feed it, queries read it
    let mut ranker = Ranker::new();
    let throttle = Throttle::new(Duration::from_millis(args.min_fetch_interval_ms));
    let fetcher = Fetcher::new(&args.cache_dir, throttle)?;

    print_help();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parsed = match ShellLine::try_parse_from(trimmed.split_whitespace()) {
            Ok(parsed) => parsed,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        match parsed.command {
            ShellCommand::Crawl { url, depth } => run_crawl(&url, depth, &mut index, &mut ranker, &fetcher),
            ShellCommand::Search { terms } => run_search(&terms, &index, &ranker),
            ShellCommand::Reset => match index.delete_all_keys() {
                Ok(()) => println!("Index store cleared"),
                Err(err) => println!("Reset failed: {err:#}"),
            },
            ShellCommand::Quit => {
                println!("Quitting");
                break;
            }
        }
    }
    Ok(())
}

fn run_crawl(url: &str, depth: u32, index: &mut Indexer, ranker: &mut Ranker, fetcher: &Fetcher) {
    println!("Crawling {url}");
    let mut crawler = match Crawler::new(url, index, ranker, fetcher) {
        Ok(crawler) => crawler,
        Err(err) => {
            println!("{err:#}");
            return;
        }
    };
    match crawler.crawl_all(depth) {
        Ok(stats) => println!(
            "Done crawling {url}: {} indexed, {} already known, {} without content",
            stats.indexed, stats.skipped, stats.missing
        ),
        Err(err) => println!("Crawl failed: {err:#}"),
    }
}

fn run_search(terms: &str, index: &Indexer, ranker: &Ranker) {
    let terms: Vec<String> = terms
        .split(':')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if terms.is_empty() {
        println!("No search terms given");
        return;
    }
    for term in &terms {
        println!("Query: {term}");
    }
    match search::search_all(&terms, index, Some(ranker)) {
        Ok(Some(result)) => {
            println!("Here are the URLs in order of relevance:");
            for (url, score) in result.sort_descending() {
                println!("  {url} = {score}");
            }
        }
        Ok(None) => println!("No match found for term(s) {}", terms.join(", ")),
        Err(err) => println!("Search failed: {err:#}"),
    }
}

fn print_help() {
    println!("Enter a command:");
    println!("  crawl <url> [--depth N]   crawl a site breadth-first");
    println!("  search <t1:t2:...>        AND-query over the index");
    println!("  reset                     clear the index store");
    println!("  quit                      leave the shell");
}

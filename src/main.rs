mod assemble;
mod convert;
mod dom;
mod fetch;
mod lang;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use scraper::Html;
use tracing::warn;

use convert::ClassifierConfig;
use lang::Oracle;

#[derive(Parser)]
#[command(name = "wemark", about = "WeChat article to Markdown converter")]
struct Cli {
    /// Directory of language signature packs (*.json) for code detection
    #[arg(long, global = true)]
    packs: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a saved article HTML file
    Convert {
        input: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fetch an article by URL and convert it
    Fetch {
        url: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert every *.html file in a directory
    Batch {
        dir: PathBuf,
        /// Output directory (default: alongside the inputs)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Max files to convert
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    // One-time engine load; "unavailable" just means the signature-table
    // fallback does all the work.
    let oracle = match &cli.packs {
        Some(dir) => Oracle::from_status(lang::engine::load_packs(dir.clone()).await),
        None => Oracle::offline(),
    };
    let cfg = ClassifierConfig::default();

    let result = match cli.command {
        Commands::Convert { input, output } => {
            let html = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let markdown = convert_document(&html, &oracle, &cfg)?;
            write_output(&markdown, output.as_deref())
        }
        Commands::Fetch { url, output } => {
            let html = fetch::fetch_article(&url).await?;
            let markdown = convert_document(&html, &oracle, &cfg)?;
            write_output(&markdown, output.as_deref())
        }
        Commands::Batch { dir, out, limit } => {
            batch_convert(&dir, out.as_deref(), limit, &oracle, &cfg)
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

/// Parse + assemble one document; "no content root" is the only failure.
fn convert_document(html: &str, oracle: &Oracle, cfg: &ClassifierConfig) -> Result<String> {
    let doc = Html::parse_document(html);
    match assemble::assemble(&doc, oracle, cfg) {
        Some(markdown) => Ok(markdown),
        None => bail!("No article content found (missing #js_content / .rich_media_content)"),
    }
}

fn write_output(markdown: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, markdown)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", markdown),
    }
    Ok(())
}

fn batch_convert(
    dir: &Path,
    out: Option<&Path>,
    limit: Option<usize>,
    oracle: &Oracle,
    cfg: &ClassifierConfig,
) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|e| e == "html"))
        .collect();
    files.sort();
    if let Some(n) = limit {
        files.truncate(n);
    }

    if files.is_empty() {
        println!("No .html files in {}", dir.display());
        return Ok(());
    }

    let out_dir = out.unwrap_or(dir);
    fs::create_dir_all(out_dir)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec})")?
            .progress_chars("=> "),
    );

    // Each conversion owns its walker (and visit set), so files convert
    // independently across the pool.
    let results: Vec<Result<()>> = files
        .par_iter()
        .map(|path| {
            let result = (|| -> Result<()> {
                let html = fs::read_to_string(path)?;
                let markdown = convert_document(&html, oracle, cfg)?;
                let dest = out_dir
                    .join(path.file_stem().unwrap_or_default())
                    .with_extension("md");
                fs::write(&dest, markdown)?;
                Ok(())
            })();
            if let Err(e) = &result {
                warn!("{}: {}", path.display(), e);
            }
            pb.inc(1);
            result
        })
        .collect();

    pb.finish_and_clear();

    let ok = results.iter().filter(|r| r.is_ok()).count();
    println!(
        "Converted {} files ({} ok, {} errors).",
        results.len(),
        ok,
        results.len() - ok
    );
    Ok(())
}

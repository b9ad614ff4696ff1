mod config;
mod db;
mod fetch;
mod model;
mod parser;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::Settings;
use crate::fetch::Payload;
use crate::model::{Document, TableData};

#[derive(Parser)]
#[command(name = "h10a_scraper", about = "Hash race status page scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the status page, extract it and store a snapshot
    Scrape {
        /// Page to fetch (default from settings)
        #[arg(long)]
        url: Option<String>,
        /// Proxy URL prefix to try after a direct fetch (repeatable)
        #[arg(short, long = "proxy")]
        proxies: Vec<String>,
        /// Where to write the JSON document (default: data/state.json)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Skip per-cell background colors
        #[arg(long)]
        no_colors: bool,
    },
    /// Extract a saved HTML page
    Parse {
        file: PathBuf,
        /// URL the page came from, used to resolve relative links
        #[arg(long)]
        source: Option<String>,
        /// Write JSON here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(long)]
        no_colors: bool,
    },
    /// Print the latest stored snapshot as JSON
    State,
    /// Render the latest snapshot (or a state.json file) as tables
    Show {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List stored snapshots
    History {
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;

    let result = match cli.command {
        Commands::Scrape {
            url,
            proxies,
            out,
            no_colors,
        } => {
            if let Some(url) = url {
                settings.url = url;
            }
            settings.proxies.extend(proxies);
            if no_colors {
                settings.capture_colors = false;
            }

            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let preferred = db::preferred_proxy(&conn)?;

            let fetched = fetch::fetch(&settings.fetch_settings(), preferred.as_deref())
                .await
                .with_context(|| format!("Failed to fetch {}", settings.url))?;
            let doc = match fetched.payload {
                Payload::Html(html) => {
                    parser::extract(&html, &settings.url, &settings.extract_options())
                }
                Payload::Document(doc) => {
                    info!("Responder returned a ready document, skipping extraction");
                    *doc
                }
            };

            db::set_preferred_proxy(&conn, fetched.via.as_deref())?;
            let id = db::save_snapshot(&conn, &doc, fetched.via.as_deref())?;
            let out = out.unwrap_or_else(|| settings.state_path.clone());
            write_json(&out, &doc)?;

            println!(
                "Snapshot #{} saved, wrote {} ({} active hashes, {} chain entries, {} assets)",
                id,
                out.display(),
                doc.active_hashes.len(),
                doc.longest_chain.entries.len(),
                doc.assets.len()
            );
            Ok(())
        }
        Commands::Parse {
            file,
            source,
            out,
            no_colors,
        } => {
            if no_colors {
                settings.capture_colors = false;
            }
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {:?}", file))?;
            let source = source.unwrap_or_else(|| settings.url.clone());
            let doc = parser::extract(&html, &source, &settings.extract_options());
            match out {
                Some(path) => {
                    write_json(&path, &doc)?;
                    println!("Wrote {}", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&doc)?),
            }
            Ok(())
        }
        Commands::State => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            match db::latest_snapshot(&conn)? {
                Some(doc) => {
                    println!("{}", serde_json::to_string_pretty(&doc)?);
                    Ok(())
                }
                None => bail!("No snapshot stored. Run 'scrape' first."),
            }
        }
        Commands::Show { file } => {
            let doc = match file {
                Some(path) => read_json(&path)?,
                None => {
                    let conn = db::connect(&settings.db_path)?;
                    db::init_schema(&conn)?;
                    match db::latest_snapshot(&conn)? {
                        Some(doc) => doc,
                        None => bail!("No snapshot stored. Run 'scrape' first."),
                    }
                }
            };
            print_document(&doc);
            Ok(())
        }
        Commands::History { limit } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let rows = db::list_snapshots(&conn, limit)?;
            if rows.is_empty() {
                println!("No snapshots stored.");
                return Ok(());
            }

            println!(
                "{:>4} | {:<24} | {:>6} | {:>5} | {:>6} | {:<16} | {:<14} | {:<20}",
                "#", "Fetched", "Active", "Chain", "Assets", "Root", "Difficulty", "Via"
            );
            println!("{}", "-".repeat(112));
            for r in &rows {
                println!(
                    "{:>4} | {:<24} | {:>6} | {:>5} | {:>6} | {:<16} | {:<14} | {:<20}",
                    r.id,
                    truncate(&r.fetched_at, 24),
                    r.active_count,
                    r.chain_count,
                    r.asset_count,
                    truncate(r.root_hash.as_deref().unwrap_or("-"), 13),
                    truncate(r.difficulty.as_deref().unwrap_or("-"), 11),
                    truncate(r.via_proxy.as_deref().unwrap_or("direct"), 17),
                );
            }
            let sources: Vec<_> = rows.iter().map(|r| r.source.as_str()).collect();
            if sources.iter().any(|s| *s != sources[0]) {
                println!("\nNote: snapshots come from more than one source URL.");
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

fn write_json(path: &Path, doc: &Document) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(doc)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn read_json(path: &Path) -> anyhow::Result<Document> {
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("{:?} is not a state document", path))
}

fn print_document(doc: &Document) {
    println!("Source:  {}", doc.metadata.source);
    println!("Fetched: {}", doc.metadata.fetched_at);
    if let Some(d) = &doc.difficulty {
        println!("Difficulty: {}", d);
    }

    println!("\n== Active Hashes ==");
    print_table(&doc.active_hashes);

    println!("\n== Longest Chain ==");
    if let Some(root) = &doc.longest_chain.root_hash {
        println!("Root: {}", root);
    }
    print_table(&doc.longest_chain.entries);

    println!("\n== Summary ==");
    print_table(&doc.summary);

    println!("\n== Assets ==");
    if doc.assets.is_empty() {
        println!("(none)");
    }
    for a in &doc.assets {
        println!("  {}  <{}>", a.name, a.url);
    }
}

/// First row is the header; short rows are padded with blanks.
fn print_table(data: &TableData) {
    const MAX_WIDTH: usize = 20;

    let rows = data.rows();
    let Some((header, body)) = rows.split_first() else {
        println!("(no rows)");
        return;
    };
    if let Some(h) = data.headers() {
        println!("(marked header cells: {})", h.join(", "));
    }
    let columns = header.cells.len().max(1);

    let cell = |r: &model::Row, i: usize| truncate(r.cell(i), MAX_WIDTH);
    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            rows.iter()
                .map(|r| cell(r, i).chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |r: &model::Row| {
        (0..columns)
            .map(|i| format!("{:<w$}", cell(r, i), w = widths[i]))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("{}", line(header));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 3 * (columns - 1)));
    for r in body {
        println!("{}", line(r));
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

//! Cosmos CLI - browse, search, and categorize a bookmark collection
//!
//! Usage: cosmos [OPTIONS] <COMMAND>
//!
//! Runs against a JSON tree file (--file) or the built-in demo data.
//! Supports JSON output for scripting.

use clap::{Parser, Subcommand};
use cosmos_lib::classify::{Classifier, ClassifierOptions};
use cosmos_lib::host::{import_chrome_bookmarks, BookmarkHost, FileHost, MockHost};
use cosmos_lib::{settings, BookmarkSession, FlattenConfig, ALL_CATEGORIES};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cosmos", version, about = "Bookmark search and AI categorization")]
struct Cli {
    /// Bookmark tree file; omit to use the built-in demo data
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List bookmarks, optionally narrowed by query and category
    List {
        /// Free-text query (matches title, url, and category)
        #[arg(short, long, default_value = "")]
        query: String,
        /// Category filter ("All" for no filter)
        #[arg(short, long, default_value = ALL_CATEGORIES)]
        category: String,
    },
    /// Show category populations, most popular first
    Categories,
    /// Ask the classifier to recategorize a sample of the collection
    Organize,
    /// Delete a bookmark by id
    Delete { id: String },
    /// Move a bookmark into another folder
    Move { id: String, folder_id: String },
    /// Create a folder
    NewFolder {
        title: String,
        /// Parent folder id (defaults to the bookmarks bar)
        #[arg(long, default_value = "1")]
        parent: String,
    },
    /// Convert a Chrome profile Bookmarks file into a tree file
    ImportChrome {
        /// Path to the Chrome profile `Bookmarks` file
        source: PathBuf,
        /// Where to write the converted tree
        #[arg(long)]
        out: PathBuf,
    },
    /// Store the Gemini API key in settings
    SetKey { key: String },
    /// Remove the stored Gemini API key
    ClearKey,
}

#[tokio::main]
async fn main() {
    settings::init(settings::default_config_dir());

    let cli = Cli::parse();

    let result = match &cli.command {
        Command::ImportChrome { source, out } => import_chrome(source, out),
        Command::SetKey { key } => settings::set_api_key(key.clone()).map(|_| {
            println!("API key saved");
        }),
        Command::ClearKey => settings::clear_api_key().map(|_| {
            println!("API key cleared");
        }),
        _ => match &cli.file {
            Some(path) => match FileHost::open(path) {
                Ok(host) => run(host, &cli).await,
                Err(e) => Err(e),
            },
            None => run(MockHost::new(), &cli).await,
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn import_chrome(source: &PathBuf, out: &PathBuf) -> Result<(), String> {
    let tree = import_chrome_bookmarks(source)?;
    FileHost::create(out, tree)?;
    println!("Imported Chrome bookmarks to {:?}", out);
    Ok(())
}

async fn run<H: BookmarkHost>(host: H, cli: &Cli) -> Result<(), String> {
    let config = FlattenConfig {
        default_category: settings::get_default_category(),
        ..FlattenConfig::default()
    };
    let mut session = BookmarkSession::load(host, &config).await?;

    match &cli.command {
        Command::List { query, category } => {
            let results = session.search(query, category);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results).map_err(|e| e.to_string())?);
            } else if results.is_empty() {
                println!("No bookmarks found.");
            } else {
                for b in results {
                    let title = if b.title.is_empty() { "(untitled)" } else { &b.title };
                    println!(
                        "{:<8} {:<16} {:<36} {} {}",
                        b.id,
                        b.category,
                        title,
                        b.url,
                        format_date(b.date_added)
                    );
                }
            }
        }
        Command::Categories => {
            let categories = session.categories();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&categories).map_err(|e| e.to_string())?);
            } else {
                for c in categories {
                    println!("{:<20} {}", c.name, c.count);
                }
            }
        }
        Command::Organize => {
            if !settings::has_api_key() {
                return Err(
                    "No Gemini API key configured. Set GEMINI_API_KEY or run `cosmos set-key`.".to_string()
                );
            }
            let classifier = Classifier::new(ClassifierOptions::default());
            let updated = session.organize(&classifier).await;
            println!("Recategorized {} bookmarks", updated);
        }
        Command::Delete { id } => {
            session.delete(id).await;
            println!("Deleted {}", id);
        }
        Command::Move { id, folder_id } => {
            session.move_bookmark(id, folder_id).await;
            println!("Moved {} to folder {}", id, folder_id);
        }
        Command::NewFolder { title, parent } => match session.create_folder(parent, title).await {
            Some(folder) => println!("Created folder {:?} ({})", folder.title, folder.id),
            None => return Err("Folder title must not be empty".to_string()),
        },
        // Handled before a session exists
        Command::ImportChrome { .. } | Command::SetKey { .. } | Command::ClearKey => {}
    }

    Ok(())
}

fn format_date(ms: Option<i64>) -> String {
    ms.and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use collagekit::gallery::{self, GalleryView};
use collagekit::platform::{DefaultImageLoader, DirectoryDownloader, FileStorage, KeyValueStorage};
use collagekit::selection::Toggle;
use collagekit::source::{Photo, UnsplashClient};
use collagekit::state::{self, CollageLayout, CollageState, DraftStore};
use collagekit::{CollageConfig, Exporter, SelectionController, StoreHandle};
use std::path::PathBuf;
use std::sync::Arc;

/// Slot remembering the last listed photos so `select` can resolve ids
const LAST_PHOTOS_KEY: &str = "last-photos";

#[derive(Parser)]
#[command(name = "collagekit", version, about = "Compose, export and archive photo collages")]
struct Cli {
    /// Directory for the draft slot and the collage database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the default photo feed
    Photos {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Search photos
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Pick photos from the last listing and start a new draft
    Select {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Inspect or edit the draft collage
    Draft {
        #[command(subcommand)]
        action: DraftCommand,
    },
    /// Render the draft to PNG and archive it
    Export {
        /// Download directory (defaults to the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Browse saved collages
    Gallery {
        #[command(subcommand)]
        action: GalleryCommand,
    },
}

#[derive(Subcommand)]
enum DraftCommand {
    Show,
    /// Switch layout: grid, horizontal or vertical
    Layout { layout: String },
    /// Move the image at FROM to TO (zero-based)
    Reorder { from: usize, to: usize },
    Clear,
}

#[derive(Subcommand)]
enum GalleryCommand {
    List,
    Delete { id: String },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn print_photos(photos: &[Photo]) {
    for p in photos {
        println!("{}\t{}\t{}", p.id, p.alt_text.as_deref().unwrap_or("-"), p.preview_uri);
    }
}

fn print_draft(state: &CollageState) {
    println!("layout: {} ({} images)", state.layout(), state.len());
    for (i, img) in state.images().iter().enumerate() {
        println!("  [{}] {}\t{}", i, img.id, img.src);
    }
}

fn remember_photos(drafts: &DraftStore<FileStorage>, photos: &[Photo]) -> Result<()> {
    let json = serde_json::to_string(photos)?;
    drafts.storage().set_item(LAST_PHOTOS_KEY, &json)?;
    Ok(())
}

fn require_draft(drafts: &DraftStore<FileStorage>) -> Result<CollageState> {
    match drafts.load() {
        Some(state) => Ok(state),
        None => bail!("no draft collage; pick photos with `collagekit select` first"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = CollageConfig::default();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    config.validate()?;

    let storage = FileStorage::open(config.session_dir())
        .with_context(|| format!("opening session dir {}", config.session_dir().display()))?;
    let drafts = DraftStore::with_key(storage, config.draft_key.clone());

    match cli.command {
        Command::Photos { page } => {
            let client = UnsplashClient::new(config.unsplash.clone())?;
            let photos = client.fetch_default(page).await?;
            remember_photos(&drafts, &photos)?;
            print_photos(&photos);
        }
        Command::Search { query, page } => {
            let client = UnsplashClient::new(config.unsplash.clone())?;
            let found = client.search(&query, page).await?;
            remember_photos(&drafts, &found.results)?;
            print_photos(&found.results);
            println!("page {} of {} ({} results)", page.max(1), found.total_pages, found.total);
        }
        Command::Select { ids } => {
            let photos: Vec<Photo> = match drafts.storage().get_item(LAST_PHOTOS_KEY) {
                Some(json) => serde_json::from_str(&json).context("reading last photo listing")?,
                None => bail!("no photo listing yet; run `collagekit photos` or `collagekit search` first"),
            };
            let mut selection = SelectionController::with_capacity(config.max_selection);
            for id in &ids {
                if selection.toggle(id) == Toggle::Rejected {
                    log::warn!("selection is full, skipping {}", id);
                }
            }
            let (state, route) = selection.commit(&photos, &drafts)?;
            println!("{}", selection.summary());
            print_draft(&state);
            log::debug!("next view: {}", route.path());
        }
        Command::Draft { action } => match action {
            DraftCommand::Show => print_draft(&require_draft(&drafts)?),
            DraftCommand::Layout { layout } => {
                let layout: CollageLayout = layout.parse()?;
                let state = state::update_layout(&require_draft(&drafts)?, layout);
                drafts.save(&state)?;
                print_draft(&state);
            }
            DraftCommand::Reorder { from, to } => {
                let state = state::reorder_images(&require_draft(&drafts)?, from, to)?;
                drafts.save(&state)?;
                print_draft(&state);
            }
            DraftCommand::Clear => {
                drafts.clear()?;
                println!("draft cleared");
            }
        },
        Command::Export { out } => {
            let out = match out {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let loader = DefaultImageLoader::new(config.cache_bust)?;
            let exporter = Exporter::new(
                config.clone(),
                Arc::new(loader),
                Arc::new(DirectoryDownloader::new(&out)),
            )
            .with_archive_result(StoreHandle::open(config.database_path()).await);

            let report = exporter.export_state(drafts.load().as_ref()).await?;
            println!(
                "saved {} ({}x{}) to {}",
                report.filename,
                report.width,
                report.height,
                out.display()
            );
            match (&report.entity_id, &report.archive_warning) {
                (Some(id), _) => println!("archived as {}", id),
                (None, Some(warning)) => eprintln!("warning: not archived: {}", warning),
                (None, None) => {}
            }
        }
        Command::Gallery { action } => {
            let store = StoreHandle::open(config.database_path()).await?;
            let view = match action {
                GalleryCommand::List => gallery::load(&store).await,
                GalleryCommand::Delete { id } => gallery::delete(&store, &id).await?,
            };
            match view {
                GalleryView::Empty => println!("no saved collages"),
                GalleryView::Items(items) => {
                    for item in items {
                        let when = chrono::DateTime::from_timestamp_millis(item.created_at)
                            .map(|t| t.to_rfc3339())
                            .unwrap_or_else(|| item.created_at.to_string());
                        println!("{}\t{}\t{} bytes", item.id, when, item.image.len());
                    }
                }
                GalleryView::Error(msg) => bail!("failed to load saved collages: {}", msg),
            }
        }
    }

    Ok(())
}

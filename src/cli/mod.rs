use crate::config::Config;
use crate::core::formatter::{check_template, field_names};
use crate::core::{
    format, format_videos, search_videos, FuzzyRanker, FzfSelector, Matcher, Paginator, SearchField, Strategy, Video,
    VideoRow,
};
use crate::error::Error;
use crate::sources::{reconcile, JsonFileSource, SourceEngine, YtDlpSource};
use crate::store::Store;
use crate::utils::{database_filename, video_url_id};
use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{BufRead, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "pls")]
#[command(about = "Save YouTube playlist metadata locally, then search and browse it")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ./pls.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch a playlist and store its videos
    Get(GetArgs),
    /// Print stored videos, optionally filtered by a search query
    List(ListArgs),
    /// Print whether a video is stored
    Has(HasArgs),
    /// Page through stored videos interactively
    Browse(BrowseArgs),
}

#[derive(Args)]
pub struct GetArgs {
    /// Playlist or feed URL, or a JSON file saved from yt-dlp
    #[arg(value_name = "URL")]
    pub input: String,

    /// Database file (defaults to "<playlist title>.sqlite")
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Do not print progress to stderr
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Database file created by `pls get`
    #[arg(value_name = "DB", required_unless_present = "format_help")]
    pub db: Option<PathBuf>,

    /// Fuzzy search query
    #[arg(short, long)]
    pub query: Option<String>,

    /// Print at most this many videos
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// What the query is matched against
    #[arg(long, value_enum)]
    pub field: Option<SearchField>,

    /// How the query is matched
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Pick videos interactively with fzf
    #[arg(long)]
    pub fzf: bool,

    /// Output template, e.g. "{Index}: {Title} by {ChannelTitle}"
    #[arg(short, long)]
    pub format: Option<String>,

    /// Print video urls (same as --format "{Url}")
    #[arg(long, conflicts_with = "format")]
    pub url: bool,

    /// List the placeholders --format understands
    #[arg(long)]
    pub format_help: bool,
}

#[derive(Args)]
pub struct HasArgs {
    #[arg(value_name = "DB")]
    pub db: PathBuf,

    /// Video URL, e.g. https://www.youtube.com/watch?v=...
    #[arg(value_name = "URL")]
    pub url: String,
}

#[derive(Args)]
pub struct BrowseArgs {
    #[arg(value_name = "DB")]
    pub db: PathBuf,

    /// Rows per page
    #[arg(short = 'n', long)]
    pub page_size: Option<NonZeroUsize>,

    /// Row template
    #[arg(short, long)]
    pub format: Option<String>,
}

impl ListArgs {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(field) = self.field {
            config.field = field;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if self.url {
            config.format = "{Url}".to_string();
        } else if let Some(format) = &self.format {
            config.format = format.clone();
        }
        config
    }
}

impl BrowseArgs {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(format) = &self.format {
            config.format = format.clone();
        }
        config
    }
}

impl Cli {
    pub fn log_level(&self) -> Level {
        match &self.command {
            _ if self.verbose => Level::DEBUG,
            Command::Get(args) if args.quiet => Level::ERROR,
            Command::Get(_) => Level::INFO,
            _ => Level::WARN,
        }
    }

    pub async fn run(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match &self.command {
            Command::Get(args) => get(args, &config).await,
            Command::List(args) => list(args, &args.apply(config), &mut std::io::stdout().lock()),
            Command::Has(args) => has(args, &mut std::io::stdout().lock()),
            Command::Browse(args) => browse(
                &args.db,
                &args.apply(config),
                std::io::stdin().lock(),
                &mut std::io::stdout().lock(),
            ),
        }
    }
}

/// Opens a database `pls get` created. SQLite would happily create an empty
/// one for a mistyped path.
fn open_existing(path: &Path) -> Result<Store> {
    if !path.is_file() {
        bail!("no database at {}", path.display());
    }
    Ok(Store::open(path)?)
}

pub async fn get(args: &GetArgs, config: &Config) -> Result<()> {
    let mut engine = SourceEngine::new();
    engine.register_source(Box::new(JsonFileSource));
    engine.register_source(Box::new(YtDlpSource::new(config.yt_dlp_path.clone(), !args.quiet)));

    let mut playlist = engine.fetch(&args.input).await?;
    for problem in reconcile(&mut playlist) {
        warn!("{}", problem);
    }
    info!("Fetched \"{}\" with {} videos", playlist.title, playlist.entries.len());

    let path = args.db.clone().unwrap_or_else(|| database_filename(&playlist.title));
    let store = Store::open(&path)?;

    let mut created = 0;
    for video in &playlist.entries {
        if store.create(video)? {
            created += 1;
        }
    }
    let skipped = playlist.entries.len() - created;

    if !args.quiet {
        eprintln!(
            "{}: stored {} videos ({} already present)",
            path.display(),
            created,
            skipped
        );
    }
    Ok(())
}

pub fn list(args: &ListArgs, config: &Config, out: &mut impl Write) -> Result<()> {
    let sample = Video::default();
    if args.format_help {
        for name in field_names(&VideoRow::new(&sample, 1)) {
            writeln!(out, "- {{{}}}", name)?;
        }
        return Ok(());
    }
    let Some(db) = &args.db else {
        bail!("need a database file");
    };

    let store = open_existing(db)?;
    let mut videos = store.find_all()?;

    if args.query.is_some() || args.fzf {
        let query = args.query.as_deref().unwrap_or_default();
        let matcher: Box<dyn Matcher> = if args.fzf {
            Box::new(FzfSelector::new(config.fzf_path.clone()))
        } else {
            Box::new(FuzzyRanker::new(config.strategy))
        };
        videos = search_videos(matcher.as_ref(), query, videos, config.field)?;
        if videos.is_empty() && !query.is_empty() {
            return Err(Error::NoMatch { query: query.to_string() }.into());
        }
    }

    if let Some(limit) = args.limit {
        videos.truncate(limit);
    }

    if let Err(e) = check_template(&config.format, &VideoRow::new(&sample, 1)) {
        warn!("{}", e);
    }
    for line in format_videos(&config.format, &videos) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

pub fn has(args: &HasArgs, out: &mut impl Write) -> Result<()> {
    let id = video_url_id(&args.url)?;
    let store = open_existing(&args.db)?;
    let found = store.find_by_video_id(&id)?.is_some();
    writeln!(out, "{}", found)?;
    Ok(())
}

/// Line-driven pager: `j` down, `k` up, empty line or `p` prints the
/// selected video's url, `q` quits.
pub fn browse(db: &Path, config: &Config, input: impl BufRead, out: &mut impl Write) -> Result<()> {
    let store = open_existing(db)?;
    let total = store.count()?;
    let mut pager = Paginator::new(&store, config.page_size);

    if let Err(e) = check_template(&config.format, &VideoRow::new(&Video::default(), 1)) {
        warn!("{}", e);
    }

    let mut lines = input.lines();
    loop {
        let page = pager.current_page()?;
        for (i, video) in page.iter().enumerate() {
            let marker = if i == pager.selected_index() { '>' } else { ' ' };
            let row = VideoRow::new(video, pager.offset() + i + 1);
            writeln!(out, "{} {}", marker, format(&config.format, &row))?;
        }
        writeln!(
            out,
            "-- {}/{} [j] down [k] up [enter] url [q] quit",
            (pager.offset() + pager.selected_index() + 1).min(total),
            total
        )?;
        out.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        match line?.trim() {
            "j" => {
                // The paginator has no lower bound of its own.
                if pager.offset() + pager.selected_index() + 1 < total {
                    pager.advance();
                }
            }
            "k" => pager.retreat(),
            "" | "p" => {
                if let Some(video) = pager.selected()? {
                    writeln!(out, "{}", video.url())?;
                }
            }
            "q" => break,
            other => warn!("unknown command {:?}", other),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_list() {
        let cli = Cli::parse_from([
            "pls", "list", "music.sqlite", "-q", "song", "-n", "3", "--field", "title", "--strategy", "strict",
        ]);
        let Command::List(args) = &cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.query.as_deref(), Some("song"));
        assert_eq!(args.limit, Some(3));

        let config = args.apply(Config::default());
        assert_eq!(config.field, SearchField::Title);
        assert_eq!(config.strategy, Strategy::Strict);
        assert_eq!(config.format, "{Index}: {Title}");
    }

    #[test]
    fn test_url_flag_overrides_format() {
        let cli = Cli::parse_from(["pls", "list", "music.sqlite", "--url"]);
        let Command::List(args) = &cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.apply(Config::default()).format, "{Url}");
    }

    #[test]
    fn test_format_help_needs_no_database() {
        let cli = Cli::parse_from(["pls", "list", "--format-help"]);
        let Command::List(args) = &cli.command else {
            panic!("expected list");
        };
        let mut out = Vec::new();
        list(args, &Config::default(), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("- {ChannelTitle}\n"));
        assert!(out.contains("- {DurationString}\n"));
        assert!(out.contains("- {Json}\n"));
    }

    #[test]
    fn test_log_level() {
        assert_eq!(Cli::parse_from(["pls", "get", "x", "-q"]).log_level(), Level::ERROR);
        assert_eq!(Cli::parse_from(["pls", "-v", "get", "x", "-q"]).log_level(), Level::DEBUG);
        assert_eq!(Cli::parse_from(["pls", "has", "a", "b"]).log_level(), Level::WARN);
    }
}

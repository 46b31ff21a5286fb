//! curio — personal link-curation log.
//!
//! The CLI stands in for the out-of-scope request layer: `--user` and
//! `--staff` supply the already-authenticated viewer identity, and the
//! commands map onto the catalog, query composer, and random picker.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use curio_catalog::{Catalog, Intake};
use curio_core::config::Config;
use curio_core::link::{Link, LinkDraft, LinkUpdate};
use curio_core::policy;
use curio_core::view::LinkView;
use curio_core::viewer::Viewer;
use curio_query::QueryComposer;
use curio_scrape::HttpTitleSource;
use curio_store::LinkStore;

#[derive(Parser)]
#[command(name = "curio")]
#[command(version)]
#[command(about = "Personal link-curation log")]
struct Cli {
    /// Config file (defaults to ./curio.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database path; overrides the config file.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(flatten)]
    identity: Identity,

    #[command(subcommand)]
    command: Commands,
}

/// The already-authenticated viewer. Authentication itself is out of
/// scope; these flags are the trusted session values.
#[derive(Args)]
struct Identity {
    /// Act as this user. Omit for an anonymous viewer.
    #[arg(long, global = true)]
    user: Option<String>,

    /// Grant the acting user staff rights.
    #[arg(long, global = true)]
    staff: bool,
}

impl Identity {
    fn viewer(&self) -> Option<Viewer> {
        self.user.as_ref().map(|name| Viewer {
            username: name.clone(),
            staff: self.staff,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create the link database
    Init,
    /// Catalog a URL (staff only; idempotent on the URL)
    Add {
        url: String,
        /// Explicit title; skips scraping
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        public: bool,
        #[arg(long)]
        friends: bool,
        #[arg(long)]
        family: bool,
    },
    /// Replace a link's fields (staff only)
    Edit {
        id: i64,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// RFC 3339 published-at timestamp
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        public: Option<bool>,
        #[arg(long)]
        friends: Option<bool>,
        #[arg(long)]
        family: Option<bool>,
        #[arg(long)]
        shared: Option<bool>,
    },
    /// Show one link with the viewer's edit flag
    Show { id: i64 },
    /// Other links from the same domain
    Related { id: i64 },
    /// List links visible to the viewer, newest first
    #[command(alias = "ls")]
    List {
        /// Keyword filter; words narrow left to right
        #[arg(long)]
        keywords: Option<String>,
        /// Restrict to links carrying any of these comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Cap the listing (defaults to the configured page size)
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Pick one link at random
    Random,
    /// Oldest links as JSON, for the exchange format
    Export,
    /// Database statistics
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    let viewer = cli.identity.viewer();

    match cli.command {
        Commands::Init => cmd_init(&config),
        Commands::Add {
            url,
            title,
            description,
            tags,
            public,
            friends,
            family,
        } => {
            let mut draft = LinkDraft::from_url(&url, require_staff(viewer.as_ref())?);
            draft.title = title.unwrap_or_default();
            draft.description = description;
            draft.tags = parse_tags(tags.as_deref());
            draft.public = public;
            draft.friends = friends;
            draft.family = family;
            cmd_add(&config, draft)
        }
        Commands::Edit {
            id,
            url,
            title,
            description,
            tags,
            date,
            public,
            friends,
            family,
            shared,
        } => {
            require_staff(viewer.as_ref())?;
            let date = date
                .map(|raw| parse_date(&raw))
                .transpose()
                .context("invalid --date")?;
            cmd_edit(
                &config,
                id,
                EditArgs {
                    url,
                    title,
                    description,
                    tags: tags.map(|raw| parse_tags(Some(&raw))),
                    date,
                    public,
                    friends,
                    family,
                    shared,
                },
            )
        }
        Commands::Show { id } => cmd_show(&config, viewer.as_ref(), id),
        Commands::Related { id } => cmd_related(&config, id),
        Commands::List {
            keywords,
            tags,
            limit,
            json,
        } => cmd_list(&config, viewer.as_ref(), keywords, tags, limit, json),
        Commands::Random => cmd_random(&config),
        Commands::Export => cmd_export(&config),
        Commands::Stats => cmd_stats(&config),
    }
}

/// Field overrides for `edit`; anything left `None` keeps the stored
/// value, and the combined result replaces the row wholesale.
struct EditArgs {
    url: Option<String>,
    title: Option<String>,
    description: Option<String>,
    tags: Option<Vec<String>>,
    date: Option<DateTime<Utc>>,
    public: Option<bool>,
    friends: Option<bool>,
    family: Option<bool>,
    shared: Option<bool>,
}

fn cmd_init(config: &Config) -> Result<()> {
    LinkStore::open(&config.db_path)?;
    println!("initialized {}", config.db_path.display());
    Ok(())
}

fn cmd_add(config: &Config, draft: LinkDraft) -> Result<()> {
    let store = LinkStore::open(&config.db_path)?;
    let titles = HttpTitleSource::new(config)?;
    let catalog = Catalog::new(&store, &titles);

    match catalog.intake_draft(draft)? {
        Intake::Existing(link) => {
            eprintln!("already cataloged as {}", link.id);
            print_json(&link)
        }
        Intake::Created(link) => print_json(&link),
    }
}

fn cmd_edit(config: &Config, id: i64, args: EditArgs) -> Result<()> {
    let store = LinkStore::open(&config.db_path)?;
    let titles = HttpTitleSource::new(config)?;
    let catalog = Catalog::new(&store, &titles);

    let existing = catalog.get(id)?;
    let fields = LinkUpdate {
        url: args.url.unwrap_or(existing.url),
        title: args.title.unwrap_or(existing.title),
        description: args.description.or(existing.description),
        tags: args.tags.unwrap_or(existing.tags),
        date: args.date.unwrap_or(existing.date),
        family: args.family.unwrap_or(existing.family),
        friends: args.friends.unwrap_or(existing.friends),
        public: args.public.unwrap_or(existing.public),
        shared: args.shared.unwrap_or(existing.shared),
    };

    let updated = catalog.update(id, fields)?;
    print_json(&updated)
}

fn cmd_show(config: &Config, viewer: Option<&Viewer>, id: i64) -> Result<()> {
    let store = LinkStore::open(&config.db_path)?;
    let titles = HttpTitleSource::new(config)?;
    let catalog = Catalog::new(&store, &titles);

    let link = catalog.get(id)?;
    print_json(&LinkView::for_viewer(link, viewer))
}

fn cmd_related(config: &Config, id: i64) -> Result<()> {
    let store = LinkStore::open(&config.db_path)?;
    let titles = HttpTitleSource::new(config)?;
    let catalog = Catalog::new(&store, &titles);
    let composer = QueryComposer::new(&store, config);

    let link = catalog.get(id)?;
    let others = composer.others_in_domain(&link)?;
    print_json(&others)
}

fn cmd_list(
    config: &Config,
    viewer: Option<&Viewer>,
    keywords: Option<String>,
    tags: Option<String>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let store = LinkStore::open(&config.db_path)?;
    let composer = QueryComposer::new(&store, config);

    let mut links = match tags {
        Some(raw) => composer.list_by_tags(viewer, &parse_tags(Some(&raw)))?,
        None => composer.list_visible(viewer, keywords.as_deref())?,
    };
    links.truncate(limit.unwrap_or(config.page_size));

    if json {
        let views = composer.with_edit_flags(viewer, links);
        print_json(&views)
    } else {
        for link in &links {
            print_line(link);
        }
        Ok(())
    }
}

fn cmd_random(config: &Config) -> Result<()> {
    let store = LinkStore::open(&config.db_path)?;
    let titles = HttpTitleSource::new(config)?;
    let catalog = Catalog::new(&store, &titles);

    match catalog.pick_random()? {
        Some(link) => print_json(&link),
        None => {
            println!("none found");
            Ok(())
        }
    }
}

fn cmd_export(config: &Config) -> Result<()> {
    let store = LinkStore::open(&config.db_path)?;
    let composer = QueryComposer::new(&store, config);
    print_json(&composer.export_recent()?)
}

fn cmd_stats(config: &Config) -> Result<()> {
    let store = LinkStore::open(&config.db_path)?;
    println!("links: {}", store.count()?);
    println!("max id: {}", store.max_id()?);
    Ok(())
}

fn require_staff(viewer: Option<&Viewer>) -> Result<&str> {
    if !policy::can_edit(viewer) {
        bail!("forbidden: cataloging links is staff-only (pass --user NAME --staff)");
    }
    // can_edit only passes for an existing staff viewer.
    Ok(viewer.map(|v| v.username.as_str()).unwrap_or_default())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from("curio.toml"), false),
    };

    if !path.exists() {
        if explicit {
            bail!("config file not found: {}", path.display());
        }
        return Ok(Config::default());
    }

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn parse_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(ToString::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_line(link: &Link) {
    let flags = format!(
        "{}{}{}{}",
        if link.public { 'p' } else { '-' },
        if link.friends { 'f' } else { '-' },
        if link.family { 'F' } else { '-' },
        if link.shared { 's' } else { '-' },
    );
    println!(
        "{:>5}  {}  {}  {}  {}",
        link.id,
        link.date.format("%Y-%m-%d"),
        flags,
        link.title,
        link.url,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tags_trims_and_drops_empties() {
        assert_eq!(
            parse_tags(Some("rust, cooking , ,essays")),
            vec!["rust", "cooking", "essays"]
        );
        assert!(parse_tags(None).is_empty());
    }

    #[test]
    fn parse_date_accepts_rfc3339() {
        let date = parse_date("2024-05-01T12:00:00Z").unwrap();
        assert_eq!(date.to_rfc3339(), "2024-05-01T12:00:00+00:00");
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn require_staff_rejects_non_staff() {
        assert!(require_staff(None).is_err());
        assert!(require_staff(Some(&Viewer::new("ana"))).is_err());
        assert_eq!(require_staff(Some(&Viewer::staff("root"))).unwrap(), "root");
    }
}

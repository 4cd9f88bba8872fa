use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use directories::ProjectDirs;
use dramashelf_application::{
    DEFAULT_RELATED_LIMIT, DEFAULT_SUGGESTION_LIMIT, EmptyReason, FilterSession, SessionView,
    StatEntry, aggregate, monthly_counts, related, suggest, summary, top_entries,
};
use dramashelf_core::{
    CardLayout, FavoritesSet, PageSize, Settings, SortKey, StatusFilter, Work, WorkId,
};
use dramashelf_storage::{
    FavoritesStore, SlotStore, Storage, StorageError, export_file_name, load_catalog,
    load_settings, save_settings,
};
use tracing_subscriber::EnvFilter;
use unicode_width::UnicodeWidthChar as _;

const TITLE_COLUMN_WIDTH: usize = 32;
const CHART_TOP: usize = 8;
const CHART_MONTHS: usize = 6;

#[derive(Debug, Parser)]
#[command(name = "dramashelf", version, about = "Browse, search and rank the drama catalog")]
struct Cli {
    /// Catalog JSON file (array of works).
    #[arg(long, env = "DRAMASHELF_CATALOG", global = true)]
    catalog: Option<PathBuf>,

    /// Slot database holding favorites and settings.
    #[arg(long, env = "DRAMASHELF_DB", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List works matching a search.
    List(ListArgs),
    /// Tag, artist and translator frequency tables.
    Stats {
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Works similar to the given one.
    Related {
        id: WorkId,
        #[arg(long, default_value_t = DEFAULT_RELATED_LIMIT)]
        limit: usize,
    },
    /// Toggle a favorite.
    Fav { id: WorkId },
    /// Favorite every work matching a search.
    FavAll(FilterArgs),
    /// Unfavorite every work matching a search.
    UnfavAll(FilterArgs),
    /// Write favorited works to a JSON file.
    ExportFavorites {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Search-box completions.
    Suggest {
        input: String,
        #[arg(long, default_value_t = DEFAULT_SUGGESTION_LIMIT)]
        limit: usize,
    },
    /// Catalog totals.
    Summary,
    /// Works added per month, plus top authors and translators.
    Monthly,
    /// Show or change persisted settings.
    Settings(SettingsArgs),
}

#[derive(Debug, Args)]
struct FilterArgs {
    #[arg(long, default_value = "all")]
    status: StatusFilter,
    /// Search text, e.g. `tag="romance" artist="X" moon`.
    #[arg(long, short, default_value = "")]
    query: String,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[command(flatten)]
    filter: FilterArgs,
    /// Sort key; unknown keys keep catalog order.
    #[arg(long)]
    sort: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: usize,
    #[arg(long)]
    per_page: Option<PageSize>,
}

#[derive(Debug, Args)]
struct SettingsArgs {
    #[arg(long)]
    default_sort: Option<SortKey>,
    #[arg(long)]
    per_page: Option<PageSize>,
    #[arg(long)]
    layout: Option<CardLayout>,
    #[arg(long)]
    animations: Option<bool>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let project_dirs =
        ProjectDirs::from("dev", "dramashelf", "dramashelf").context("resolve project dirs")?;
    let config_dir = project_dirs.config_dir();
    fs::create_dir_all(config_dir)
        .with_context(|| format!("create config dir {}", config_dir.display()))?;

    let db_path = cli.db.unwrap_or_else(|| config_dir.join("dramashelf.db"));
    let storage = Storage::open(&db_path)?;

    let catalog_path = cli.catalog.unwrap_or_else(|| config_dir.join("catalog.json"));
    let works = load_catalog(&catalog_path)?;

    let settings = load_settings(&storage);
    let favorites = FavoritesStore::new(&storage);

    match cli.command {
        Command::List(args) => {
            let mut session = session_for(&settings, &args.filter);
            if let Some(sort) = args.sort.as_deref() {
                session.set_sort_key(SortKey::from_name(sort));
            }
            if let Some(per_page) = args.per_page {
                session.set_page_size(per_page);
            }
            session.set_page(args.page);
            let favorite_ids = favorites.load();
            let view = session.run(&works, &favorite_ids);
            print_view(&view, &favorite_ids);
        }
        Command::Stats { top } => {
            let stats = aggregate(&works);
            print_table("Tags", top_entries(&stats.tag_stats, top));
            print_table("Artists", top_entries(&stats.author_stats, top));
            print_table("Translators", top_entries(&stats.translator_stats, top));
        }
        Command::Related { id, limit } => {
            let target = find_work(&works, id)?;
            println!("Related to #{} {}", target.id, target.title);
            for hit in related(target, &works, limit) {
                println!("  {:>3}  {}", hit.score, work_line(hit.work));
            }
        }
        Command::Fav { id } => {
            let work = find_work(&works, id)?;
            let toggled = favorites.toggle(work.id);
            warn_on_storage_failure(toggled.warning.as_ref());
            let verb = if toggled.is_favorite { "added to" } else { "removed from" };
            println!("#{} {} {verb} favorites", work.id, work.title);
        }
        Command::FavAll(args) => {
            let ids = matching_ids(&settings, &args, &works, &storage);
            let outcome = favorites.favorite_all(ids);
            warn_on_storage_failure(outcome.warning.as_ref());
            println!("favorited {} works", outcome.changed);
        }
        Command::UnfavAll(args) => {
            let ids = matching_ids(&settings, &args, &works, &storage);
            let outcome = favorites.unfavorite_all(ids);
            warn_on_storage_failure(outcome.warning.as_ref());
            println!("unfavorited {} works", outcome.changed);
        }
        Command::ExportFavorites { out } => {
            let export = favorites.export(&works);
            let path = out.unwrap_or_else(|| PathBuf::from(export_file_name(today())));
            write_export(&path, &export.to_json()?)?;
            println!("exported {} favorites to {}", export.total_count, path.display());
        }
        Command::Suggest { input, limit } => {
            for s in suggest(&works, &input, limit) {
                println!("{:<10} {} ({})", s.kind.as_str(), s.value, s.count);
            }
        }
        Command::Summary => {
            let totals = summary(&works, &favorites.load());
            println!("total        {}", totals.total);
            println!("translated   {}", totals.translated);
            println!("untranslated {}", totals.untranslated);
            println!("favorites    {}", totals.favorites);
        }
        Command::Monthly => {
            for month in monthly_counts(&works, CHART_MONTHS) {
                println!("{}  {}", month.month, month.count);
            }
            let stats = aggregate(&works);
            print_table("Top artists", top_entries(&stats.author_stats, CHART_TOP));
            print_table(
                "Top translators",
                top_entries(&stats.translator_stats, CHART_TOP),
            );
        }
        Command::Settings(args) => {
            let mut next = settings.clone();
            if let Some(sort) = args.default_sort {
                next.default_sort = sort;
            }
            if let Some(per_page) = args.per_page {
                next.items_per_page = per_page;
            }
            if let Some(layout) = args.layout {
                next.card_layout = layout;
            }
            if let Some(animations) = args.animations {
                next.enable_animations = animations;
            }
            if next != settings {
                warn_on_storage_failure(save_settings(&storage, &next).err().as_ref());
            }
            println!("layout        {}", next.card_layout);
            println!("per page      {}", next.items_per_page);
            println!("default sort  {}", next.default_sort);
            println!("animations    {}", next.enable_animations);
        }
    }

    Ok(())
}

fn session_for(settings: &Settings, args: &FilterArgs) -> FilterSession {
    FilterSession::new(settings)
        .with_status(args.status)
        .with_query(args.query.clone())
}

fn matching_ids<S: SlotStore>(
    settings: &Settings,
    args: &FilterArgs,
    works: &[Work],
    slots: &S,
) -> Vec<WorkId> {
    let favorites = FavoritesStore::new(slots).load();
    session_for(settings, args)
        .matching(works, &favorites)
        .into_iter()
        .map(|w| w.id)
        .collect()
}

fn find_work(works: &[Work], id: WorkId) -> anyhow::Result<&Work> {
    works
        .iter()
        .find(|w| w.id == id)
        .with_context(|| format!("no work with id {id}"))
}

fn warn_on_storage_failure(err: Option<&StorageError>) {
    if let Some(err) = err {
        tracing::warn!("{err:?}");
        eprintln!("warning: {}", err.user_message());
    }
}

fn write_export(path: &Path, json: &str) -> anyhow::Result<()> {
    fs::write(path, json).with_context(|| format!("write export {}", path.display()))
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn print_view(view: &SessionView<'_>, favorites: &FavoritesSet) {
    match view.empty_reason {
        Some(EmptyReason::NoFavorites) => println!("No favorites yet."),
        Some(EmptyReason::NoMatches) => println!("No works match this search."),
        None => {
            for work in &view.page.items {
                let mark = if favorites.contains(&work.id) { '*' } else { ' ' };
                println!("{mark} {}", work_line(work));
            }
            println!(
                "page {}/{} ({} matches)",
                view.page.current_page,
                view.page.total_pages.max(1),
                view.total_matches
            );
        }
    }
}

fn work_line(work: &Work) -> String {
    let status = if work.is_translated { "translated" } else { "original" };
    format!(
        "#{:<4} {}  {}  {}  [{}]",
        work.id,
        pad_to_width(&work.title, TITLE_COLUMN_WIDTH),
        work.date_added,
        work.author,
        status
    )
}

fn print_table(title: &str, entries: &[StatEntry]) {
    println!("{title}");
    for entry in entries {
        let tags = if entry.top_tags.is_empty() {
            String::new()
        } else {
            format!("  ({})", entry.top_tags.join(", "))
        };
        println!(
            "  {} {:>4}{tags}",
            pad_to_width(&entry.name, TITLE_COLUMN_WIDTH),
            entry.count
        );
    }
}

/// Pads or truncates to a display width; CJK characters take two columns.
fn pad_to_width(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str(&" ".repeat(width - used));
    out
}

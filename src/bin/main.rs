use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use overlay_core::config::{OverlayConfig, DEFAULT_SITE_URL};
use overlay_core::core::builtin::merge_dictionary_dir;
use overlay_core::core::dom::{document_body, parse_fragment, parse_html, serialize_document};
use overlay_core::fetch::HttpFetcher;
use overlay_core::observer;
use overlay_core::persistence::LocalStore;
use overlay_core::recorder::{export_domain, site_domain};
use overlay_core::version::{has_update, VersionChecker, VersionDescriptor};
use overlay_core::{Language, OverlayError, Result, Session};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "exile-zh", version, about = "Chinese text overlay for wealthyexile.com pages")]
struct Cli {
    /// Local store file (defaults to the user data directory).
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    /// Dictionary asset host prefix.
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate a saved page in place and write the result.
    Translate {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Page URL, used for the untranslated-text worklist.
        #[arg(long, default_value = DEFAULT_SITE_URL)]
        url: String,
        /// HTML snippets appended to <body> after the first pass, as a page
        /// loading more content would.
        #[arg(long)]
        inject: Vec<PathBuf>,
        /// Protocol messages (JSON) sent to the session after translating.
        #[arg(long)]
        message: Vec<String>,
        /// Write this page's untranslated strings here.
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Show settings and cache state.
    Status,
    Enable {
        /// Only flip the translation toggle, not the whole overlay.
        #[arg(long)]
        translation_only: bool,
    },
    Disable {
        #[arg(long)]
        translation_only: bool,
    },
    /// Set the target script: simplified or traditional.
    Language { language: String },
    /// Override the dictionary URL prefix; an empty value restores the default.
    SetUrl { prefix: String },
    CheckVersion,
    /// Print the untranslated-text worklist of a domain as JSON.
    Export {
        #[arg(long, default_value = DEFAULT_SITE_URL)]
        domain: String,
    },
    /// Merge a directory of dictionary JSON files into one.
    Merge {
        dir: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "overlay_core=debug,exile_zh=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = OverlayConfig::default();
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    debug!(store = %config.store_path.display(), base_url = %config.base_url, "configuration");

    match cli.command {
        Command::Translate { input, output, url, inject, message, export } => {
            let html = fs::read_to_string(&input)?;
            let document = parse_html(&html);
            let store = LocalStore::open(&config.store_path);
            let mut session = Session::start(&config, store, HttpFetcher::new(config.http_timeout), &url);

            if inject.is_empty() {
                match session.init_translation(&document) {
                    Some(report) => eprintln!(
                        "{} {} replaced, {} untranslated",
                        "translated:".green(),
                        report.replaced(),
                        report.misses.len()
                    ),
                    None => eprintln!("{} no translation applied", "skipped:".yellow()),
                }
            } else {
                let fragments = inject
                    .iter()
                    .map(fs::read_to_string)
                    .collect::<std::io::Result<Vec<_>>>()?;
                let passes = run_with_injections(&config, &mut session, &document, fragments)?;
                eprintln!("{} {} passes", "translated:".green(), passes);
            }

            for raw in &message {
                eprintln!("{}", session.handle_json(raw, &document)?);
            }
            if let Some(path) = export {
                let data = session.export_untranslated();
                fs::write(&path, serde_json::to_string_pretty(&data)?)?;
                eprintln!("{} {} strings to {}", "exported:".green(), data.len(), path.display());
            }

            let translated = serialize_document(&document)?;
            match output {
                Some(path) => fs::write(path, translated)?,
                None => println!("{translated}"),
            }
        }
        Command::Status => print_status(&config),
        Command::Enable { translation_only } => set_enabled(&config, translation_only, true),
        Command::Disable { translation_only } => set_enabled(&config, translation_only, false),
        Command::Language { language } => {
            let language: Language = language.parse().map_err(OverlayError::config)?;
            LocalStore::open(&config.store_path).update(|s| s.language = Some(language));
            println!("language set to {}", language.to_string().bold());
        }
        Command::SetUrl { prefix } => {
            let prefix = prefix.trim().to_string();
            let value = (!prefix.is_empty()).then_some(prefix);
            LocalStore::open(&config.store_path).update(|s| s.translation_url_prefix = value);
        }
        Command::CheckVersion => {
            let local = VersionDescriptor::bundled()?;
            let fetcher = HttpFetcher::new(config.http_timeout);
            let result = VersionChecker::new(config.version_url(), config.version_cache_ttl).check(&fetcher);
            match result.version.as_deref() {
                Some(remote) if has_update(&local.version, remote) => {
                    println!("{} {} -> {}", "update available:".yellow().bold(), local.version, remote)
                }
                Some(_) => println!("{} {}", "up to date:".green(), local.version),
                None => println!(
                    "{} {}",
                    "version check failed:".red(),
                    result.error.unwrap_or_default()
                ),
            }
        }
        Command::Export { domain } => {
            let store = LocalStore::open(&config.store_path);
            let data = export_domain(&store, &site_domain(&domain));
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Command::Merge { dir, output } => {
            let merged = merge_dictionary_dir(&dir)?;
            let body = serde_json::to_string_pretty(&merged.to_json_value())?;
            match output {
                Some(path) => {
                    fs::write(&path, body)?;
                    eprintln!("{} {} entries to {}", "merged:".green(), merged.len(), path.display());
                }
                None => println!("{body}"),
            }
        }
    }
    Ok(())
}

fn run_with_injections(
    config: &OverlayConfig,
    session: &mut Session<HttpFetcher>,
    document: &markup5ever_rcdom::RcDom,
    fragments: Vec<String>,
) -> Result<usize> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
    let (observer, scheduler) = observer::channel(config.debounce);
    let body = document_body(document);

    let passes = runtime.block_on(async {
        let producer = async move {
            for html in fragments {
                for node in parse_fragment(&html) {
                    observer.append(&body, node);
                }
                tokio::task::yield_now().await;
            }
        };
        let (passes, ()) = tokio::join!(session.run_live(document, scheduler), producer);
        passes
    });
    Ok(passes)
}

fn set_enabled(config: &OverlayConfig, translation_only: bool, enabled: bool) {
    let mut store = LocalStore::open(&config.store_path);
    store.update(|s| {
        if translation_only {
            s.translation_enabled = Some(enabled);
        } else {
            s.extension_enabled = Some(enabled);
        }
    });
    print_status(config);
}

fn print_status(config: &OverlayConfig) {
    let store = LocalStore::open(&config.store_path);
    let state = store.state();
    let flag = |value: Option<bool>| {
        if value.unwrap_or(true) { "on".green() } else { "off".red() }
    };

    println!("{}", "exile-zh".bold());
    println!("  store               {}", config.store_path.display());
    println!("  extensionEnabled    {}", flag(state.extension_enabled));
    println!("  translationEnabled  {}", flag(state.translation_enabled));
    println!("  language            {}", state.language());
    println!(
        "  translationUrlPrefix {}",
        state.translation_url_prefix.as_deref().unwrap_or(&config.base_url)
    );
    for lang in Language::ALL {
        match state.translations.get(&lang) {
            Some(record) => println!(
                "  translations_{:<12} {} entries, version {}, fetched at {}",
                lang.as_str(),
                record.dictionary.len(),
                record.dictionary.url_version().unwrap_or("-"),
                record.fetched_at_ms
            ),
            None => println!("  translations_{:<12} {}", lang.as_str(), "not cached".dark_grey()),
        }
    }
    for (domain, entries) in &state.unmatched {
        println!("  untranslated        {} ({} strings)", domain, entries.len());
    }
}

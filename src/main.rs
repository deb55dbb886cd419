use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use leadscout::config::{ConfigLoader, PanelConfig};
use leadscout::output::console::{ConsolePresenter, format_dashboard};
use leadscout::panel::{CommandOutcome, EXPORT_FIELDS, Panel, SaveOutcome};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "leadscout")]
#[command(version)]
#[command(about = "Terminal control panel for the lead search backend", long_about = None)]
struct Cli {
    /// Path to a configuration file (JSON/YAML/TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend origin; overrides the config file
    #[arg(short, long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the state codes the backend offers
    States,
    /// List the cities of a state
    Cities { state: String },
    /// List the exportable fields
    Fields,
    /// Manage the proxy pool
    Proxies {
        #[command(subcommand)]
        action: ProxyAction,
    },
    /// Control the search run
    Search {
        #[command(subcommand)]
        action: SearchAction,
    },
    /// Follow the live feed and dashboard until Ctrl-C
    Watch,
    /// Export the results
    Export {
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Field to export (repeatable); all fields when omitted
        #[arg(long = "field")]
        fields: Vec<String>,

        /// Directory for the exported file
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Validate a configuration file
    Check { file: PathBuf },
}

#[derive(Subcommand)]
enum ProxyAction {
    /// Upload a proxy list, one per line ("-" reads stdin)
    Load { file: PathBuf },
    /// Ask the server to health-check the loaded proxies
    Test,
}

#[derive(Subcommand)]
enum SearchAction {
    Start {
        #[arg(short, long)]
        term: String,

        #[arg(short, long)]
        state: String,

        /// City to search (repeatable)
        #[arg(long = "city", required = true)]
        cities: Vec<String>,

        #[arg(long)]
        max_pages: Option<u32>,

        #[arg(long)]
        threads: Option<u32>,

        /// Keep following the feed after starting
        #[arg(short, long, default_value_t = false)]
        watch: bool,
    },
    Pause,
    Stop,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// CSV generated by the server
    Csv,
    /// JSON written locally from the fetched results
    Json,
    /// CSV written locally from the fetched results
    LocalCsv,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe { std::env::set_var("RUST_LOG", "info"); }
    }
    let cli = Cli::parse();

    if let Commands::Check { file } = &cli.command {
        match ConfigLoader::load(file) {
            Ok(cfg) => {
                println!("✅ Config is valid:");
                println!("   Backend: {}", cfg.base_url);
                println!(
                    "   Poll intervals: results {}ms, dashboard {}ms",
                    cfg.sync.results_interval_ms, cfg.sync.dashboard_interval_ms
                );
                println!("   Export dir: {}", cfg.export_dir.display());
            }
            Err(e) => {
                eprintln!("❌ Config error: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let watching = matches!(
        cli.command,
        Commands::Watch
            | Commands::Search {
                action: SearchAction::Start { watch: true, .. }
            }
    );

    let logger = env_logger::Builder::from_default_env().build();
    let level = logger.filter();
    let multi = Arc::new(MultiProgress::new());
    let presenter = if watching {
        indicatif_log_bridge::LogWrapper::new((*multi).clone(), logger).try_init()?;
        let status = multi.add(ProgressBar::new_spinner());
        status.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
        status.enable_steady_tick(Duration::from_millis(120));
        ConsolePresenter::new(Some(multi.clone())).with_status(status)
    } else {
        log::set_boxed_logger(Box::new(logger))?;
        ConsolePresenter::new(None)
    };
    log::set_max_level(level);

    let config = resolve_config(&cli)?;

    let mut panel = Panel::new(&config, Arc::new(presenter))?;
    log::debug!("Backend: {}", panel.client().base_url());

    match cli.command {
        Commands::States => {
            panel.load_states().await?;
            for state in panel.view().await.states.iter() {
                println!("{}", state);
            }
        }
        Commands::Cities { state } => {
            panel.update_cities(&state).await?;
            for city in panel.view().await.cities.iter() {
                println!("{}", city.value);
            }
        }
        Commands::Fields => {
            for field in EXPORT_FIELDS {
                println!("{}", field);
            }
        }
        Commands::Proxies { action } => {
            let outcome = match action {
                ProxyAction::Load { file } => panel.load_proxies(&read_proxies(&file)?).await?,
                ProxyAction::Test => panel.test_proxies().await?,
            };
            exit_unless_accepted(&outcome);
        }
        Commands::Search { action } => match action {
            SearchAction::Start {
                term,
                state,
                cities,
                max_pages,
                threads,
                watch,
            } => {
                panel.update_cities(&state).await?;
                {
                    let mut view = panel.view().await;
                    view.search_term = term;
                    if let Some(n) = max_pages {
                        view.max_pages = n;
                    }
                    if let Some(n) = threads {
                        view.num_threads = n;
                    }
                    for city in &cities {
                        if !view.set_city_checked(city, true) {
                            log::warn!("{} is not a known city of {}", city, state);
                        }
                    }
                }

                let outcome = panel.start_search().await?;
                if watch && outcome.is_accepted() {
                    follow(&panel).await?;
                } else {
                    panel.stop_sync().await;
                }
                exit_unless_accepted(&outcome);
            }
            SearchAction::Pause => exit_unless_accepted(&panel.pause_search().await?),
            SearchAction::Stop => exit_unless_accepted(&panel.stop_search().await?),
        },
        Commands::Watch => {
            panel.start_sync().await;
            follow(&panel).await?;
        }
        Commands::Export {
            format,
            fields,
            dir,
        } => {
            if let Some(dir) = dir {
                panel.set_export_dir(dir);
            }
            for field in panel.select_export_fields(&fields).await? {
                log::warn!("Unknown field ignored: {}", field);
            }

            let outcome = match format {
                ExportFormat::Csv => panel.save_results().await?,
                ExportFormat::Json => panel.save_results_json().await?,
                ExportFormat::LocalCsv => panel.save_results_local_csv().await?,
            };
            match outcome {
                SaveOutcome::Saved(path) => println!("✅ Saved {}", path.display()),
                SaveOutcome::Empty => {}
                SaveOutcome::Rejected(_) => std::process::exit(1),
            }
        }
        Commands::Check { .. } => unreachable!("handled before the panel is built"),
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> anyhow::Result<PanelConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            log::debug!("Loading config from {:?}", path);
            ConfigLoader::load(path)?
        }
        None => ConfigLoader::from_base_url(
            cli.base_url.as_deref().unwrap_or("http://localhost:5000"),
        )?,
    };
    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
    }
    Ok(config)
}

fn read_proxies(file: &Path) -> anyhow::Result<String> {
    let mut text = String::new();
    if file.as_os_str() == "-" {
        std::io::stdin().read_to_string(&mut text)?;
    } else {
        text = std::fs::read_to_string(file)?;
    }
    Ok(text)
}

/// Keeps the poll loops running until Ctrl-C, then prints a summary.
async fn follow(panel: &Panel) -> anyhow::Result<()> {
    log::info!("Following feed, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    log::info!("Shutting down...");
    panel.stop_sync().await;

    let metrics = panel.metrics();
    let dashboard = panel.view().await.dashboard.clone();
    println!("\n✅ Sync Stopped:");
    println!("   Feed Lines: {}", metrics.feed_lines);
    println!("   Results Received: {}", metrics.results_received);
    println!("   Poll Success Rate: {:.1}%", metrics.success_rate);
    println!("   {}", format_dashboard(&dashboard));
    println!("   Total Time: {:.1}s", metrics.elapsed_seconds);
    Ok(())
}

fn exit_unless_accepted(outcome: &CommandOutcome) {
    if !outcome.is_accepted() {
        std::process::exit(1);
    }
}

use jukebox::app::{AppStartupOptions, run_with_startup};
use jukebox::config::{self, Settings};
use jukebox::library;
use jukebox::model::Catalog;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct CliArgs {
    catalog: Option<PathBuf>,
    folders: Vec<PathBuf>,
    seed: Option<u64>,
    null_audio: bool,
    list: bool,
    init_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1).collect())?;

    if args.init_config {
        let path = config::save_settings(&Settings::default())?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    let settings = config::load_settings()?;
    init_logging(&settings);

    let catalog = build_catalog(&args, &settings)?;
    tracing::info!(tracks = catalog.len(), "catalog ready");

    if args.list {
        println!("{}", serde_json::to_string_pretty(catalog.tracks())?);
        return Ok(());
    }

    run_with_startup(AppStartupOptions {
        catalog,
        settings,
        null_audio: args.null_audio,
        seed: args.seed,
    })
}

fn build_catalog(args: &CliArgs, settings: &Settings) -> anyhow::Result<Catalog> {
    if let Some(path) = args.catalog.as_ref().or(settings.catalog.as_ref()) {
        return library::load_catalog_file(path);
    }

    let folders = if args.folders.is_empty() {
        &settings.folders
    } else {
        &args.folders
    };
    if folders.is_empty() {
        anyhow::bail!("no catalog given; pass --catalog <file> or --dir <folder>");
    }

    let tracks = library::scan_many(folders);
    Catalog::new(tracks).map_err(|err| {
        anyhow::anyhow!(
            "{err}: no audio files found under {}",
            folders
                .iter()
                .map(|folder| folder.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}

/// The terminal UI owns stdout, so logs go to a file under the config dir.
fn init_logging(settings: &Settings) {
    let Ok(path) = config::ensure_config_dir().and_then(|_| config::log_path()) else {
        return;
    };
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };

    let filter = EnvFilter::try_from_env("JUKEBOX_LOG")
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--catalog" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--catalog requires a file path");
                };
                out.catalog = Some(PathBuf::from(value));
            }
            "--dir" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--dir requires a folder path");
                };
                out.folders.push(PathBuf::from(value));
            }
            "--seed" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--seed requires a number");
                };
                let Ok(seed) = value.trim().parse::<u64>() else {
                    anyhow::bail!("--seed must be an unsigned integer, got {value}");
                };
                out.seed = Some(seed);
            }
            "--null-audio" => out.null_audio = true,
            "--list" => out.list = true,
            "--init-config" => out.init_config = true,
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
        index += 1;
    }
    Ok(out)
}

fn print_help() {
    println!("Jukebox");
    println!("  --catalog <file>  JSON track list to play");
    println!("  --dir <folder>    Scan a folder for audio (repeatable)");
    println!("  --seed <n>        Seed the shuffle order");
    println!("  --null-audio      Run without an audio device");
    println!("  --list            Print the catalog as JSON and exit");
    println!("  --init-config     Write default settings and exit");
}

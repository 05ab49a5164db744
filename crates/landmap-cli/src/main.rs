//! `landmap` – replay recorded localization/detection frames through a
//! world map and print the result.
//!
//! ```text
//! landmap init [--config <path>]
//! landmap [--config <path>] <snapshot.json>...
//! ```
//!
//! The wall catalog, map settings and placed discs come from
//! `~/.landmap/config.toml` unless `--config` points elsewhere.  Snapshots
//! are replayed in order into a single map.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use colored::Colorize;
use tracing::{info, warn};

use landmap_perception::{MapKey, Snapshot, WorldMap};

/// What the command line asked for.
#[derive(Debug, PartialEq)]
enum Command {
    Init { config: Option<PathBuf> },
    Replay {
        config: Option<PathBuf>,
        snapshots: Vec<PathBuf>,
    },
    Help,
}

fn main() -> ExitCode {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG selects the filter (default "info"); LANDMAP_LOG_FORMAT=json
    // switches to newline-delimited JSON.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("LANDMAP_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    let command = match parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}: {}", "Usage error".red(), e);
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        Command::Help => {
            print_usage();
            Ok(())
        }
        Command::Init { config } => run_init(config.unwrap_or_else(config::config_path)),
        Command::Replay { config, snapshots } => {
            run_replay(config.unwrap_or_else(config::config_path), &snapshots)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

fn run_init(path: PathBuf) -> Result<(), landmap_types::MapError> {
    if path.exists() {
        println!("  Config already exists at {}", path.display().to_string().bold());
        return Ok(());
    }
    config::save_to(&config::Config::sample(), &path)?;
    println!(
        "  {} Config saved to {}",
        "✓".green().bold(),
        path.display().to_string().bold()
    );
    Ok(())
}

fn run_replay(path: PathBuf, snapshots: &[PathBuf]) -> Result<(), landmap_types::MapError> {
    let cfg = match config::load_from(&path)? {
        Some(cfg) => {
            info!(path = %path.display(), walls = cfg.walls.len(), "config loaded");
            cfg
        }
        None => {
            warn!(path = %path.display(), "no config found; using an empty wall catalog");
            config::Config::default()
        }
    };

    let catalog = Arc::new(cfg.build_catalog()?);
    let mut map = WorldMap::with_settings(catalog, cfg.settings.clone());
    for disc in &cfg.discs {
        map.place_disc(disc.to_disc());
    }

    for snapshot_path in snapshots {
        let snapshot = Snapshot::load(snapshot_path)?;
        let applied = snapshot.replay(&mut map);
        info!(
            snapshot = %snapshot_path.display(),
            events = snapshot.events.len(),
            applied,
            "snapshot replayed"
        );
    }

    print_map(&map);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn parse_args<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
{
    let mut config = None;
    let mut positional = Vec::new();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-c" | "--config" => {
                let value = args.next().ok_or("--config needs a path")?;
                config = Some(PathBuf::from(value));
            }
            flag if flag.starts_with('-') => return Err(format!("unknown option '{flag}'")),
            _ => positional.push(arg),
        }
    }

    let first = positional.first().cloned();
    match first.as_deref() {
        Some("init") if positional.len() == 1 => Ok(Command::Init { config }),
        Some("init") => Err("init takes no arguments".to_string()),
        Some(_) => Ok(Command::Replay {
            config,
            snapshots: positional.into_iter().map(PathBuf::from).collect(),
        }),
        None => Err("no snapshot given".to_string()),
    }
}

fn print_map(map: &WorldMap) {
    let mut entries: Vec<_> = map.objects().iter().collect();
    entries.sort_by_key(|(key, _)| **key);

    println!();
    println!("  {} ({} entries)", "World map".bold(), entries.len());
    for (key, entity) in entries {
        let line = entity.to_string();
        let line = match key {
            MapKey::Wall(_) => line.cyan(),
            _ if entity.is_visible() => line.green(),
            _ => line.dimmed(),
        };
        println!("    {:<12} {}", key.to_string().dimmed(), line);
    }
    println!();
}

fn print_usage() {
    println!();
    println!("  {} {}", "landmap".bold(), format!("v{}", env!("CARGO_PKG_VERSION")).dimmed());
    println!();
    println!("  landmap init [--config <path>]");
    println!("  landmap [--config <path>] <snapshot.json>...");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_snapshot_list() {
        let cmd = parse_args(args(&["a.json", "b.json"])).unwrap();
        assert_eq!(
            cmd,
            Command::Replay {
                config: None,
                snapshots: vec![PathBuf::from("a.json"), PathBuf::from("b.json")],
            }
        );
    }

    #[test]
    fn parses_config_flag_anywhere() {
        let cmd = parse_args(args(&["frame.json", "--config", "/tmp/c.toml"])).unwrap();
        assert_eq!(
            cmd,
            Command::Replay {
                config: Some(PathBuf::from("/tmp/c.toml")),
                snapshots: vec![PathBuf::from("frame.json")],
            }
        );
    }

    #[test]
    fn parses_init() {
        assert_eq!(
            parse_args(args(&["init"])).unwrap(),
            Command::Init { config: None }
        );
        assert!(parse_args(args(&["init", "extra"])).is_err());
    }

    #[test]
    fn rejects_missing_input_and_unknown_flags() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["--config"])).is_err());
        assert!(parse_args(args(&["--verbose", "a.json"])).is_err());
        assert_eq!(parse_args(args(&["-h"])).unwrap(), Command::Help);
    }

    #[test]
    fn replay_reads_config_and_snapshot() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let cfg_path = dir.path().join("config.toml");
        config::save_to(&config::Config::sample(), &cfg_path).expect("save");

        let frame = dir.path().join("frame.json");
        std::fs::write(
            &frame,
            r#"{ "landmarks": [ { "marker": 7,
                 "estimate": { "mean": [10.0, 0.0], "orientation": 0.0 } } ] }"#,
        )
        .expect("write");

        assert!(run_replay(cfg_path, &[frame]).is_ok());
    }

    #[test]
    fn replay_fails_on_missing_snapshot() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let result = run_replay(dir.path().join("none.toml"), &[dir.path().join("none.json")]);
        assert!(result.is_err());
    }
}

// src/main.rs - Resolve a spidercam scene into cable-length tables
use std::path::PathBuf;

use clap::Parser;
use spidercam_rs::config::{self, ConfigError, Settings};
use spidercam_rs::motion::planner::DEFAULT_START_INDEX;
use spidercam_rs::scene;
use spidercam_rs::{OutputWriter, RecordingSink, ScheduleResolver};

#[derive(Debug, Parser)]
#[command(name = "spidercam", version, about = "Plan spidercam moves and compute cable lengths")]
struct Cli {
    /// Scene file with workspace parameters and timestamped commands
    scene: PathBuf,

    /// Optional TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the output tables (overrides the settings file)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Command level to start resolving from
    #[arg(long, default_value_t = DEFAULT_START_INDEX)]
    start_index: usize,

    /// Log level (overrides the settings file)
    #[arg(long)]
    log_level: Option<String>,

    /// Resolve without writing any output files
    #[arg(long)]
    dry_run: bool,
}

/// Settings file merged with the command-line overrides.
fn load_settings(cli: &Cli) -> Result<Settings, ConfigError> {
    let mut settings = match &cli.config {
        Some(path) => config::load_config(&path.to_string_lossy())?,
        None => Settings::default(),
    };
    if let Some(level) = &cli.log_level {
        settings.logging.level = level.clone();
    }
    if let Some(dir) = &cli.out_dir {
        settings.output.directory = Some(dir.clone());
    }
    if let Err(e) = settings.validate() {
        tracing::error!("Invalid settings: {}", e);
        return Err(e);
    }
    Ok(settings)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Settings errors are logged before the configured level is known
    let bootstrap = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .finish();
    let settings = tracing::subscriber::with_default(bootstrap, || load_settings(&cli))?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(settings.logging.max_level()?)
        .init();

    let scene = scene::load_scene(&cli.scene)?;
    let workspace = scene.config;
    tracing::info!("Workspace: {}, start at {}", workspace.dim, workspace.start);
    let mut commands = scene.into_commands();

    if cli.dry_run {
        let mut resolver = ScheduleResolver::new(workspace, RecordingSink::default())?;
        let report = resolver.resolve_from(&mut commands, cli.start_index)?;
        println!("{}", report);
        println!("{} samples computed (dry run, nothing written)", resolver.sink().sample_count());
        return Ok(());
    }

    let mut writer = OutputWriter::for_scene(&cli.scene, &settings.output);
    let report = {
        let mut resolver = ScheduleResolver::new(workspace, &mut writer)?;
        resolver.resolve_from(&mut commands, cli.start_index)?
    };
    if let Err(e) = writer.finish() {
        tracing::error!("Failed to write output tables: {}", e);
        return Err(Box::new(e));
    }
    println!("{}", report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_cli_overrides_settings_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spidercam.toml");
        fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

        let cli = Cli::parse_from([
            "spidercam",
            "scene.txt",
            "--config",
            path.to_str().unwrap(),
            "--log-level",
            "debug",
            "--out-dir",
            "results",
        ]);
        let settings = load_settings(&cli).unwrap();
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.output.directory, Some(PathBuf::from("results")));
    }

    #[test]
    fn test_invalid_settings_are_reported() {
        let cli = Cli::parse_from(["spidercam", "scene.txt", "--log-level", "loud"]);
        let bootstrap = tracing_subscriber::fmt().with_test_writer().finish();
        let result = tracing::subscriber::with_default(bootstrap, || load_settings(&cli));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let missing = Cli::parse_from(["spidercam", "scene.txt", "-c", "/nonexistent/spidercam.toml"]);
        assert!(matches!(load_settings(&missing), Err(ConfigError::Io(_))));
    }
}

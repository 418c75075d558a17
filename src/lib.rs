//! ao2vis - AO2 character folder visualizer
//!
//! Enumerates the character folders mounted from Attorney Online 2 base
//! folders, projects each into a display record and caches the projection in
//! memory and on disk, keyed by a signature of the folder list.

pub mod actions;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;
pub mod visualizer;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};

use crate::cache::{DiskCache, EnvironmentId, MemoryCache};
use crate::cli::{Cli, Commands, DeleteArgs, ListArgs, OutputFormat, PreviewArgs};
use crate::config::Settings;
use crate::error::{CharacterNotFound, ExitCode, Interrupted};
use crate::output::{write_table, JsonOutput};
use crate::progress::Progress;
use crate::scanner::{enumerate_folders, find_by_name, FolderDescriptor, ProjectionBuilder};
use crate::signal::ShutdownHandler;
use crate::visualizer::{CacheOrchestrator, CacheOutcome, Delivery};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the CLI and return the process exit code.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let shutdown = signal::install_handler().context("Failed to install Ctrl+C handler")?;
    let config_path = cli.config.clone().or_else(Settings::default_config_path);
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if settings.base_folders.is_empty() {
        log::warn!(
            "No base folders configured; add base_folders to {}",
            config_path
                .as_deref()
                .map_or_else(|| "the settings file".to_string(), |p| p.display().to_string())
        );
    }

    let app = App::new(settings, config_path, cli.quiet, shutdown);
    match cli.command {
        Commands::List(args) => app.list(&args),
        Commands::Refresh => app.refresh(),
        Commands::Invalidate => app.invalidate(),
        Commands::Preview(args) => app.set_preview(&args),
        Commands::Reverify(args) => app.reverify(&args.name),
        Commands::Delete(args) => app.delete(&args),
    }
}

struct App {
    settings: Settings,
    config_path: Option<PathBuf>,
    orchestrator: Arc<CacheOrchestrator>,
    shutdown: ShutdownHandler,
}

impl App {
    fn new(
        settings: Settings,
        config_path: Option<PathBuf>,
        quiet: bool,
        shutdown: ShutdownHandler,
    ) -> Self {
        let environment = EnvironmentId::derive(config_path.as_deref(), &settings.base_folders);
        let disk = match settings.cache_dir() {
            Some(dir) => Some(DiskCache::new(&dir, &environment)),
            None => {
                log::warn!("No cache directory available, caching in memory only");
                None
            }
        };
        let builder = ProjectionBuilder::new(settings.projection_config());
        let orchestrator = CacheOrchestrator::new(Arc::new(MemoryCache::new()), disk, builder)
            .with_progress_callback(Arc::new(Progress::new(quiet)));

        Self {
            settings,
            config_path,
            orchestrator: Arc::new(orchestrator),
            shutdown,
        }
    }

    fn folders(&self) -> Vec<FolderDescriptor> {
        enumerate_folders(&self.settings.base_folders, &self.settings.preview_overrides)
    }

    fn folder(&self, name: &str) -> anyhow::Result<FolderDescriptor> {
        find_by_name(&self.folders(), name)
            .cloned()
            .ok_or_else(|| CharacterNotFound(name.to_string()).into())
    }

    /// Resolve on a background thread, polling for Ctrl+C meanwhile.
    fn resolve(&self, force_rebuild: bool) -> anyhow::Result<CacheOutcome> {
        let mut pending = self
            .orchestrator
            .spawn_get_or_build(self.folders(), force_rebuild)?;

        loop {
            if self.shutdown.is_shutdown_requested() {
                return Err(Interrupted.into());
            }
            let mut delivered = None;
            if let Some(result) =
                pending.try_deliver(&self.shutdown, |outcome| delivered = Some(outcome))
            {
                return match result? {
                    Delivery::Applied => {
                        delivered.ok_or_else(|| anyhow!("Result was applied but not received"))
                    }
                    Delivery::ConsumerGone => Err(Interrupted.into()),
                    Delivery::Superseded => bail!("Request was superseded by a newer rebuild"),
                };
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn list(&self, args: &ListArgs) -> anyhow::Result<ExitCode> {
        let outcome = self.resolve(args.refresh)?;
        log::debug!(
            "{} records from {} (signature {:?})",
            outcome.records.len(),
            outcome.source.label(),
            outcome.signature
        );

        let mut stdout = io::stdout().lock();
        match args.output {
            OutputFormat::Table => {
                write_table(&outcome.records, &mut stdout).context("Failed to write table")?;
            }
            OutputFormat::Json => {
                JsonOutput::new(&outcome)
                    .write_to(&mut stdout)
                    .context("Failed to write JSON")?;
            }
        }
        Ok(ExitCode::Success)
    }

    fn refresh(&self) -> anyhow::Result<ExitCode> {
        let outcome = self.resolve(true)?;
        println!("Rebuilt {} character folders", outcome.records.len());
        Ok(ExitCode::Success)
    }

    fn invalidate(&self) -> anyhow::Result<ExitCode> {
        self.orchestrator.invalidate();
        println!("Cache cleared");
        Ok(ExitCode::Success)
    }

    fn set_preview(&self, args: &PreviewArgs) -> anyhow::Result<ExitCode> {
        let folder = self
            .folder(&args.name)
            .context("Failed to set preview")?;
        let config_path = self
            .config_path
            .as_deref()
            .ok_or_else(|| anyhow!("No settings file location; pass --config"))?;

        let mut stored = Settings::load_file_only(Some(config_path))
            .context("Failed to read settings file")?;
        stored
            .preview_overrides
            .insert(folder.name.clone(), args.emote_id);
        stored
            .save_to(config_path)
            .with_context(|| format!("Failed to save {}", config_path.display()))?;

        let mut overrides = self.settings.preview_overrides.clone();
        overrides.insert(folder.name.clone(), args.emote_id);
        let folders = enumerate_folders(&self.settings.base_folders, &overrides);

        match self.orchestrator.patch_preview(&folders, &folder.name) {
            Some(record) => println!(
                "{}: preview is now {}",
                record.name,
                record.preview_path.display()
            ),
            None => println!(
                "{}: preview set to emote {}; shown after the next list",
                folder.name, args.emote_id
            ),
        }
        Ok(ExitCode::Success)
    }

    fn reverify(&self, name: &str) -> anyhow::Result<ExitCode> {
        let folder = self.folder(name).context("Failed to re-read integrity")?;
        let folders = self.folders();
        let record = match self.orchestrator.patch_integrity(&folders, &folder.name) {
            Some(record) => record,
            None => self.orchestrator.builder().project(&folder),
        };

        if record.integrity_failed {
            println!(
                "{}: {} integrity failures: {}",
                record.name, record.integrity_failure_count, record.integrity_summary
            );
        } else {
            println!("{}: no integrity failures", record.name);
        }
        Ok(ExitCode::Success)
    }

    fn delete(&self, args: &DeleteArgs) -> anyhow::Result<ExitCode> {
        let folder = self.folder(&args.name).context("Failed to delete")?;

        if !args.yes && !confirm(&format!("Move {} to the trash?", folder.directory.display()))? {
            println!("Cancelled");
            return Ok(ExitCode::Success);
        }

        let result = actions::delete_character_folder(&folder.directory)
            .with_context(|| format!("Failed to delete {}", folder.name))?;
        self.orchestrator.invalidate();
        println!(
            "Moved {} to the trash ({})",
            result.path.display(),
            bytesize::ByteSize::b(result.size)
        );
        Ok(ExitCode::Success)
    }
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}

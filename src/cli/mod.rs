use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser};
use tracing::{debug, info};

use crate::clipboard::{ClipboardSink, WlCopy};
use crate::config::Settings;
use crate::hidden_id::extract_id;
use crate::history::ClipboardHistory;
use crate::preview::format_size;
use crate::protocol::ListWriter;

pub mod launcher;

pub use launcher::{KeyAction, LauncherEnv};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("TARGET"),
    ", ",
    env!("PROFILE"),
    ", built ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "clipshelf")]
#[command(about = "Multi-buffer clipboard history for rofi script mode")]
#[command(version, long_version = LONG_VERSION)]
pub struct Cli {
    #[arg(short, long, value_name = "PATH", help = "Config file to use instead of the default")]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Log debug output to stderr")]
    pub verbose: bool,

    #[command(flatten)]
    pub action: Action,

    #[arg(long, requires = "init_config", help = "Overwrite an existing config file")]
    pub force: bool,

    /// Row text handed back by rofi
    #[arg(allow_hyphen_values = true, conflicts_with = "action")]
    pub selection: Option<String>,
}

#[derive(Args, Debug, Default)]
#[group(id = "action", multiple = false)]
pub struct Action {
    #[arg(long, help = "Store stdin in the current buffer")]
    pub store: bool,

    #[arg(
        long,
        value_name = "LIMIT",
        num_args = 0..=1,
        default_missing_value = "0",
        help = "List the current buffer (default action)"
    )]
    pub list: Option<usize>,

    #[arg(long, value_name = "ID", help = "Toggle the pin on an entry")]
    pub pin: Option<i64>,

    #[arg(long, value_name = "ID", help = "Delete an entry")]
    pub delete: Option<i64>,

    #[arg(long, value_name = "ID", help = "Print the raw content of an entry")]
    pub get: Option<i64>,

    #[arg(long, value_name = "N", help = "Switch to buffer N (1-5)")]
    pub buffer: Option<i64>,

    #[arg(long, help = "Switch to the next buffer")]
    pub next_buffer: bool,

    #[arg(long, help = "Switch to the previous buffer")]
    pub prev_buffer: bool,

    #[arg(long, help = "Regenerate all previews from the current config")]
    pub rebuild_previews: bool,

    #[arg(long, help = "Compact the database")]
    pub vacuum: bool,

    #[arg(long, help = "Write an example config file")]
    pub init_config: bool,
}

/// What one invocation does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Store,
    List(Option<usize>),
    TogglePin(i64),
    Delete(i64),
    Get(i64),
    SwitchBuffer(i64),
    NextBuffer,
    PreviousBuffer,
    RebuildPreviews,
    Vacuum,
    InitConfig { force: bool },
    /// Copy the selected row's entry to the clipboard
    Select(i64),
}

impl Cli {
    /// Resolve flags, selection and rofi's environment into one command
    pub fn command(&self, env: &LauncherEnv) -> Command {
        if let Some(key) = env.key_action() {
            return key.into_command(self.selection_id(env));
        }

        let action = &self.action;
        if action.store {
            Command::Store
        } else if let Some(limit) = action.list {
            Command::List((limit > 0).then_some(limit))
        } else if let Some(id) = action.pin {
            Command::TogglePin(id)
        } else if let Some(id) = action.delete {
            Command::Delete(id)
        } else if let Some(id) = action.get {
            Command::Get(id)
        } else if let Some(buffer) = action.buffer {
            Command::SwitchBuffer(buffer)
        } else if action.next_buffer {
            Command::NextBuffer
        } else if action.prev_buffer {
            Command::PreviousBuffer
        } else if action.rebuild_previews {
            Command::RebuildPreviews
        } else if action.vacuum {
            Command::Vacuum
        } else if action.init_config {
            Command::InitConfig { force: self.force }
        } else {
            match self.selection_id(env) {
                Some(id) => Command::Select(id),
                None => Command::List(None),
            }
        }
    }

    fn selection_id(&self, env: &LauncherEnv) -> Option<i64> {
        let selection = self.selection.as_deref().filter(|s| !s.is_empty())?;
        match extract_id(selection, env.info.as_deref()) {
            Ok(id) => Some(id),
            Err(e) => {
                debug!(error = %e, "Selection without entry id");
                None
            }
        }
    }
}

pub struct CliHandler {
    settings: Settings,
    config_path: Option<PathBuf>,
    history: Option<ClipboardHistory>,
    clipboard: Box<dyn ClipboardSink>,
}

impl CliHandler {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        let settings = match &config_path {
            Some(path) => Settings::load_or_default(path),
            None => Settings::load(),
        };

        Self::with_settings(settings, config_path)
    }

    pub fn with_settings(settings: Settings, config_path: Option<PathBuf>) -> Self {
        Self {
            settings,
            config_path,
            history: None,
            clipboard: Box::new(WlCopy::default()),
        }
    }

    /// Replace the clipboard used for copy-out
    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardSink>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Lazily open the history database when needed
    async fn ensure_history(&mut self) -> Result<&ClipboardHistory> {
        if self.history.is_none() {
            let db_path = self.settings.database_path()?;
            debug!(path = %db_path.display(), "Opening history database");
            let history = ClipboardHistory::new(&db_path, self.settings.clone()).await?;
            self.history = Some(history);
        }

        self.history
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("History database not initialized"))
    }

    pub async fn handle_command<W: Write>(&mut self, command: Command, out: &mut W) -> Result<()> {
        debug!(?command, "Handling command");

        match command {
            Command::Store => {
                let history = self.ensure_history().await?;
                history.store_from_reader(tokio::io::stdin()).await?;
                Ok(())
            }
            Command::List(limit) => self.list(limit, out).await,
            Command::TogglePin(id) => {
                self.ensure_history().await?.toggle_pin(id).await?;
                self.list(None, out).await
            }
            Command::Delete(id) => {
                self.ensure_history().await?.delete(id).await?;
                self.list(None, out).await
            }
            Command::Get(id) => {
                let content = self.ensure_history().await?.get_content(id).await?;
                out.write_all(&content)?;
                out.flush()?;
                Ok(())
            }
            Command::SwitchBuffer(buffer) => {
                self.ensure_history().await?.switch_buffer(buffer).await?;
                self.list(None, out).await
            }
            Command::NextBuffer => {
                self.ensure_history().await?.next_buffer().await?;
                self.list(None, out).await
            }
            Command::PreviousBuffer => {
                self.ensure_history().await?.previous_buffer().await?;
                self.list(None, out).await
            }
            Command::RebuildPreviews => {
                let count = self.ensure_history().await?.rebuild_previews().await?;
                eprintln!("Updated {} previews", count);
                Ok(())
            }
            Command::Vacuum => {
                let report = self.ensure_history().await?.vacuum().await?;
                eprintln!("Database size before VACUUM: {}", format_size(report.before));
                eprintln!("Database size after VACUUM: {}", format_size(report.after));
                if report.freed() > 0 {
                    eprintln!("Freed: {}", format_size(report.freed()));
                }
                Ok(())
            }
            Command::InitConfig { force } => self.init_config(force),
            Command::Select(id) => {
                let content = self.ensure_history().await?.get_content(id).await?;
                self.clipboard.copy(&content).await?;
                Ok(())
            }
        }
    }

    async fn list<W: Write>(&mut self, limit: Option<usize>, out: &mut W) -> Result<()> {
        let history = self.ensure_history().await?;
        let listing = ListWriter::new(history).render(limit).await?;
        out.write_all(listing.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn init_config(&self, force: bool) -> Result<()> {
        let path = match &self.config_path {
            Some(path) => path.clone(),
            None => Settings::default_config_path()
                .ok_or_else(|| anyhow::anyhow!("Could not determine the config directory"))?,
        };

        Settings::write_example(&path, force)?;
        info!(path = %path.display(), "Wrote example config");
        eprintln!("Example configuration written to {}", path.display());
        Ok(())
    }
}

//! Headless session replay for figedit.
//!
//! Replays a scripted list of pointer and key events against an item stored
//! in a directory of JSON documents, saves the result and prints the final
//! frame as text.
//!
//! ```bash
//! figedit replay session.json --data-dir ./items
//! figedit init-config
//! ```
//!
//! A session file looks like:
//!
//! ```json
//! {
//!   "item": "frame_0",
//!   "create": { "width": 640, "height": 480 },
//!   "steps": [
//!     { "PointerDown": { "x": 10, "y": 10 } },
//!     { "PointerDown": { "x": 50, "y": 40 } },
//!     { "press": { "key": "Z", "ctrl": true } }
//!   ]
//! }
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result, bail};
    use clap::{Parser, Subcommand};
    use serde::Deserialize;

    use figedit::config::AppConfig;
    use figedit::keybindings::{KeyBindings, KeyChord};
    use figedit::persistence::JsonDirectoryRepository;
    use figedit::render::TextRenderer;
    use figedit::{AnnotatedItem, FigureController, InputEvent, ItemId, ItemRepository};

    #[derive(Parser)]
    #[command(name = "figedit")]
    #[command(about = "Headless figure editing session replay", long_about = None)]
    struct Cli {
        /// Config file (defaults to the user config directory)
        #[arg(long, global = true)]
        config: Option<PathBuf>,

        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Replay a session file against stored items
        Replay {
            /// Path to the session JSON file
            session: PathBuf,
            /// Directory of item documents (overrides the config)
            #[arg(long)]
            data_dir: Option<PathBuf>,
            /// Do not save the item after replaying
            #[arg(long)]
            dry_run: bool,
        },
        /// Write the default configuration file
        InitConfig,
    }

    #[derive(Debug, Deserialize)]
    struct NewItem {
        width: usize,
        height: usize,
    }

    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    enum SessionStep {
        /// A raw key chord, resolved through the keybindings
        Press { press: KeyChord },
        /// An already-resolved controller event
        Event(InputEvent),
    }

    #[derive(Debug, Deserialize)]
    struct Session {
        item: ItemId,
        /// Create the item with this size when it is not stored yet
        #[serde(default)]
        create: Option<NewItem>,
        #[serde(default)]
        steps: Vec<SessionStep>,
    }

    fn load_config(path: Option<&Path>) -> Result<AppConfig> {
        match path {
            Some(path) => AppConfig::load_from_path(path)
                .with_context(|| format!("loading config {}", path.display())),
            None => Ok(AppConfig::try_load_from_default_path()
                .context("loading default config")?
                .unwrap_or_default()),
        }
    }

    fn init_logging(config: &AppConfig) {
        // RUST_LOG still wins over the configured level
        let _ = env_logger::Builder::new()
            .filter_level(config.preferences.log_level.to_level_filter())
            .parse_default_env()
            .try_init();
    }

    fn resolve(step: &SessionStep, bindings: &KeyBindings) -> Option<InputEvent> {
        match step {
            SessionStep::Event(event) => Some(*event),
            SessionStep::Press { press } => {
                let command = bindings.command_for(*press);
                if command.is_none() {
                    log::warn!("Unbound key {}", press);
                }
                command.map(InputEvent::Key)
            }
        }
    }

    fn replay(
        config: &AppConfig,
        session_path: &Path,
        data_dir: Option<PathBuf>,
        dry_run: bool,
    ) -> Result<()> {
        let json = std::fs::read_to_string(session_path)
            .with_context(|| format!("reading session {}", session_path.display()))?;
        let session: Session = serde_json::from_str(&json).context("parsing session")?;

        let data_dir = match data_dir {
            Some(dir) => dir,
            None if !config.preferences.data_dir.is_empty() => {
                PathBuf::from(&config.preferences.data_dir)
            }
            None => bail!("no data directory given and none configured"),
        };

        let labels = config.label_set();
        let mut repo = JsonDirectoryRepository::new(&data_dir, labels.clone());
        if !repo.exists(&session.item) {
            let Some(new) = &session.create else {
                bail!("item '{}' not found in {}", session.item, data_dir.display());
            };
            log::info!("Creating item '{}' ({}x{})", session.item, new.width, new.height);
            repo.save_item(&AnnotatedItem::new(session.item.clone(), new.width, new.height))?;
        }

        let mut controller = FigureController::new(labels, config.editor_settings());
        controller.open_item(&mut repo, &session.item)?;

        let mut committed = 0;
        let events = session
            .steps
            .iter()
            .filter_map(|step| resolve(step, &config.keybindings));
        for event in events {
            if controller.handle(event).committed {
                committed += 1;
            }
        }
        log::info!("Replayed {} steps, {} commits", session.steps.len(), committed);

        if dry_run {
            log::info!("Dry run, item not saved");
        } else {
            controller.save(&mut repo)?;
        }

        for line in controller.render_with(&mut TextRenderer, Vec::new()) {
            println!("{line}");
        }
        controller.mark_drawn();
        Ok(())
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();
        let config = load_config(cli.config.as_deref())?;
        init_logging(&config);

        match cli.command {
            Commands::Replay {
                session,
                data_dir,
                dry_run,
            } => replay(&config, &session, data_dir, dry_run),
            Commands::InitConfig => {
                match &cli.config {
                    Some(path) => config.save_to_path(path)?,
                    None => config.save_to_default_path()?,
                }
                Ok(())
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = cli::run() {
        eprintln!("figedit error: {:#}", e);
        std::process::exit(1);
    }
}

// WASM hosts embed the library directly
#[cfg(target_arch = "wasm32")]
fn main() {}

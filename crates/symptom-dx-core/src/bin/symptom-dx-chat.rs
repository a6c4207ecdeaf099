//! Line-oriented chat over stdin/stdout.
//!
//! Each input line is one turn. Lines starting with `:` are commands:
//! `:remedies <disease>`, `:diagnose <symptoms>`, `:log`, `:reset`, `:quit`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use symptom_dx_core::config::{self, EngineConfig};
use symptom_dx_core::{Catalog, ChatService, DiagnosisEngine};

#[derive(Parser, Debug)]
#[command(name = "symptom-dx-chat", version, about = "Symptom diagnosis chat")]
struct Args {
    /// Disease catalog (JSON)
    #[arg(long)]
    catalog: PathBuf,

    /// Engine configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Conversation identifier
    #[arg(long, default_value = "local")]
    user: String,

    /// Enable the strong-match boost regardless of the config file
    #[arg(long)]
    boost: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let args = Args::parse();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let mut engine_config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if args.boost {
        engine_config.strong_match_boost = true;
    }

    let catalog = Catalog::load(&args.catalog)
        .with_context(|| format!("loading catalog {}", args.catalog.display()))?;
    let engine = DiagnosisEngine::from_config(catalog, &engine_config);
    let service = ChatService::new(Arc::new(engine));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "Describe your symptoms, separated by commas. Type :quit to exit.")?;

    for line in stdin.lock().lines() {
        let line = line?;
        let reply = match line.trim() {
            ":quit" => break,
            ":reset" => {
                service.reset(&args.user);
                "Conversation reset.".to_string()
            }
            ":log" => match service.conversation(&args.user) {
                Some(state) => serde_json::to_string_pretty(&state.diagnosis_log)?,
                None => "[]".to_string(),
            },
            command if command.starts_with(":remedies ") => {
                let name = &command[":remedies ".len()..];
                match service.remedies(name) {
                    Ok(info) => serde_json::to_string_pretty(&info)?,
                    Err(e) => e.to_string(),
                }
            }
            command if command.starts_with(":diagnose ") => {
                let text = &command[":diagnose ".len()..];
                match service.diagnose(text) {
                    Ok(result) => result.to_json()?,
                    Err(e) => e.to_string(),
                }
            }
            text => service.respond(&args.user, text).text,
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }

    Ok(())
}

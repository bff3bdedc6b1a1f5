mod app;
mod catalog;
mod cli;
mod config;
mod document;
mod error;
mod history;
mod input;
mod k8s;
mod layout;
mod model;
mod provider;
mod remote;
mod schema;
mod search;
mod ui;
mod viewport;
mod wrap;

use anyhow::{Context, Result};
use app::{App, SessionConfig};
use clap::{CommandFactory, Parser};
use cli::{CliArgs, split_dot_notation};
use config::KexplainConfig;
use crossterm::event::{
    Event, EventStream, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    supports_keyboard_enhancement,
};
use document::Document;
use futures::StreamExt;
use k8s::KubeSelection;
use provider::SchemaProvider;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use remote::RemoteSource;
use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let Some(target) = args.target.as_deref() else {
        CliArgs::command()
            .print_help()
            .context("failed to print help")?;
        return Ok(());
    };
    init_tracing(&args.log_filter, args.log_file.as_deref())?;

    let config = KexplainConfig::discover()?;
    if let Some(source) = &config.source {
        debug!(path = %source.display(), "loaded config");
    }

    let request_timeout = Duration::from_secs(args.request_timeout_secs.max(1));
    let provider = SchemaProvider {
        selection: KubeSelection {
            kubeconfig: args.kubeconfig.clone(),
            context: args.context.clone(),
        },
        force_remote: args.remote,
        remote: RemoteSource::new(
            &config.remote_url,
            &args.k8s_version,
            config.cache_dir(),
            config.cache_ttl(),
            request_timeout,
        ),
        request_timeout,
    };
    let bundle = provider.load().await?;
    info!(source = %bundle.source, "schema ready");

    let (resource, path) = split_dot_notation(target);
    let identity = bundle
        .catalog
        .with_aliases(&config.aliases)
        .identity_for(&resource)?;
    let document = Document::new(Arc::new(bundle.schema), identity, path)?;

    let mut app = App::new(
        document,
        SessionConfig {
            wrap_width: config.wrap_width,
        },
    );
    run(&mut app).await
}

fn init_tracing(level_filter: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact();
    let _ = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::sink).try_init(),
    };

    Ok(())
}

async fn run(app: &mut App) -> Result<()> {
    let (mut terminal, keyboard_enhanced) = init_terminal()?;
    let run_result = run_loop(&mut terminal, app).await;
    let restore_result = restore_terminal(&mut terminal, keyboard_enhanced);

    match (run_result, restore_result) {
        (Err(run_error), Err(restore_error)) => Err(anyhow::anyhow!(
            "{run_error:#}\nterminal restore error: {restore_error:#}"
        )),
        (Err(error), _) => Err(error),
        (_, Err(error)) => Err(error),
        (Ok(()), Ok(())) => Ok(()),
    }
}

fn init_terminal() -> Result<(TuiTerminal, bool)> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    let keyboard_enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if keyboard_enhanced {
        execute!(
            stdout,
            EnterAlternateScreen,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_ALTERNATE_KEYS
            )
        )
        .context("failed to enter alternate screen with keyboard enhancement")?;
    } else {
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().context("failed to clear terminal")?;
    Ok((terminal, keyboard_enhanced))
}

fn restore_terminal(terminal: &mut TuiTerminal, keyboard_enhanced: bool) -> Result<()> {
    if keyboard_enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)
            .context("failed to pop keyboard enhancement flags")?;
    }
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

async fn run_loop(terminal: &mut TuiTerminal, app: &mut App) -> Result<()> {
    let mut reader = EventStream::new();

    loop {
        terminal
            .draw(|frame| ui::render(frame, app))
            .context("failed to render terminal frame")?;

        if !app.is_running() {
            break;
        }

        match reader.next().await {
            Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                if let Some(action) = input::map_key(app.mode(), key) {
                    debug!("action={action:?}");
                    app.apply_action(action);
                }
            }
            // resizes are picked up by the next draw
            Some(Ok(_)) => {}
            Some(Err(error)) => return Err(error).context("failed to read terminal event"),
            None => break,
        }
    }

    Ok(())
}

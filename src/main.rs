use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use code_auto_typer::config::{parse_duration, TabMode};
use code_auto_typer::{
    prepare, Config, Dispatcher, EnigoInjector, KeystrokeInjector, RunSummary, StopHotkey,
    StopReason, TypingSettings, WriterInjector,
};
use colored::Colorize;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "autotyper",
    version,
    about = "Types prepared text into the focused window, one character at a time"
)]
struct Cli {
    /// Text to type. Read from stdin when neither TEXT nor --file is given
    text: Option<String>,

    /// Read the text from a file ("-" for stdin)
    #[arg(short, long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Seconds to wait before typing starts
    #[arg(short, long)]
    delay: Option<String>,

    /// How to handle tab characters
    #[arg(long, value_enum)]
    tabs: Option<TabsArg>,

    /// Spaces per tab when replacing tabs
    #[arg(long)]
    tab_width: Option<String>,

    /// Pause between characters (e.g. 10ms, 1s)
    #[arg(short, long)]
    interval: Option<String>,

    /// Global hotkey that stops typing (e.g. ctrl+alt+s)
    #[arg(long)]
    stop_hotkey: Option<String>,

    /// Do not register the global stop hotkey
    #[arg(long)]
    no_hotkey: bool,

    /// Type into this terminal instead of the focused window
    #[arg(long)]
    dry_run: bool,

    /// Write the effective configuration to this file
    #[arg(long)]
    save_config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TabsArg {
    Replace,
    Remove,
}

impl From<TabsArg> for TabMode {
    fn from(arg: TabsArg) -> Self {
        match arg {
            TabsArg::Replace => TabMode::Replace,
            TabsArg::Remove => TabMode::Remove,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    init_logging(config.verbose);
    config.validate()?;

    if let Some(path) = &cli.save_config {
        config.save_to_file(path)?;
        println!("{} Configuration saved to {}", "💾".green(), path);
    }

    let raw = read_input(&cli)?;
    let settings = config.resolve();
    let characters = prepare(&raw, settings.tab_policy).context("Please enter some text to type")?;

    let hotkey = if config.enable_stop_hotkey {
        match StopHotkey::register(&config.stop_hotkey) {
            Ok(hotkey) => Some(hotkey),
            Err(e) => {
                warn!(error = %e, "Continuing without a stop hotkey");
                None
            }
        }
    } else {
        None
    };

    println!(
        "{} Typing starts in {} seconds. Focus the target window!",
        "⌨️".cyan(),
        settings.initial_delay.as_secs_f64()
    );
    match &hotkey {
        Some(hotkey) => println!("   Press {} or Ctrl-C to stop", hotkey.combo().bold()),
        None => println!("   Press Ctrl-C to stop"),
    }

    let summary = if cli.dry_run {
        type_text(WriterInjector::new(io::stdout()), characters, settings, hotkey.as_ref()).await?
    } else {
        let injector = EnigoInjector::new().context("Failed to set up keyboard simulation")?;
        type_text(injector, characters, settings, hotkey.as_ref()).await?
    };

    match summary.reason {
        StopReason::Exhausted => {
            println!("\n{} Done, typed {} characters", "✅".green(), summary.sent);
        }
        StopReason::Cancelled => println!(
            "\n{} Stopped after {} characters",
            "⏹️".yellow(),
            summary.sent
        ),
    }
    Ok(())
}

/// Merge the config file (if any) with command-line overrides.
fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(delay) = &cli.delay {
        config.delay = delay.clone();
    }
    if let Some(tabs) = cli.tabs {
        config.tab_mode = tabs.into();
    }
    if let Some(width) = &cli.tab_width {
        config.tab_width = width.clone();
    }
    if let Some(interval) = &cli.interval {
        config.tick_interval = parse_duration(interval)?;
    }
    if let Some(combo) = &cli.stop_hotkey {
        config.stop_hotkey = combo.clone();
    }
    if cli.no_hotkey {
        config.enable_stop_hotkey = false;
    }
    config.verbose |= cli.verbose;

    Ok(config)
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    // enigo stays at error so typed text never shows up in the log
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},enigo=error")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(cli: &Cli) -> Result<String> {
    if let Some(text) = &cli.text {
        return Ok(text.clone());
    }

    match &cli.file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read text from stdin")?;
            Ok(text)
        }
    }
}

async fn type_text<I: KeystrokeInjector>(
    injector: I,
    characters: Vec<char>,
    settings: TypingSettings,
    hotkey: Option<&StopHotkey>,
) -> Result<RunSummary> {
    let mut dispatcher = Dispatcher::with_tick_interval(injector, settings.tick_interval);
    let stop = dispatcher.start(characters, settings.initial_delay)?;

    let ctrl_c = tokio::spawn({
        let stop = stop.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received");
                stop.stop();
            }
        }
    });
    let listener = hotkey.map(|hotkey| hotkey.spawn_listener(stop.clone()));

    let result = dispatcher.run().await;

    // Releases the hotkey listener thread.
    stop.stop();
    ctrl_c.abort();
    if let Some(listener) = listener {
        listener.await.context("Stop hotkey listener panicked")?;
    }

    Ok(result?)
}

mod cli;

use flvscope::analysis::SessionSummary;
use flvscope::config::{self, Config};
use flvscope::presentation::{terminal, LogPresenter, Presenter, TerminalPresenter};
use flvscope::session::{Session, SessionOutcome};
use flvscope::source::ByteSource;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use tokio_util::sync::CancellationToken;

/// Window size for plain output when the config does not set one.
const PLAIN_WINDOW_CAPACITY: usize = 120;

async fn analyze<P: Presenter>(
    presenter: &mut P,
    source: ByteSource,
    config: &Config,
    cancel: CancellationToken,
) -> Result<SessionOutcome> {
    tracing::info!("Analyzing {}", source);
    let session = Session::open(source, config.source.clone(), config.session.clone());
    let outcome = session
        .run(presenter, cancel)
        .await
        .context("Analysis failed")?;
    Ok(outcome)
}

async fn run_plain(source: ByteSource, config: &Config) -> Result<SessionOutcome> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let capacity = config
        .display
        .window_capacity
        .unwrap_or(PLAIN_WINDOW_CAPACITY);
    let mut presenter = LogPresenter::new(std::io::stdout(), capacity);
    analyze(&mut presenter, source, config, cancel).await
}

async fn run_chart(source: ByteSource, config: &Config) -> Result<SessionOutcome> {
    let cancel = CancellationToken::new();
    let mut presenter = TerminalPresenter::new(source.to_string(), &config.display)?;
    let watcher = terminal::spawn_key_watcher(cancel.clone());

    let outcome = analyze(&mut presenter, source, config, cancel.clone()).await;

    cancel.cancel();
    let _ = watcher.join();
    drop(presenter);
    outcome
}

fn print_summary(outcome: &SessionOutcome) {
    match outcome {
        SessionOutcome::Completed(summary) => print_completed(summary),
        SessionOutcome::IdleTimeout => println!("Stream went idle before completing"),
        SessionOutcome::Cancelled => println!("Cancelled"),
    }
}

fn print_completed(summary: &SessionSummary) {
    println!("Video duration: {:.1}s", summary.duration_secs());
    if summary.audio_present {
        println!(
            "Maximum difference of audio and video timestamps: {}ms",
            summary.max_deviation_ms
        );
    } else {
        println!("No audio");
        println!(
            "Maximum increment of video frame timestamp: {}ms",
            summary.max_deviation_ms
        );
    }
}

fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "flvscope=trace,flvscope_flv=debug".to_string()
        } else {
            "flvscope=info,flvscope_flv=info".to_string()
        }
    });

    if cli.plain {
        tracing_subscriber::fmt()
            .with_env_filter(&env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        // The chart owns the screen, so logs go to a file.
        let path = config.logging.file_path();
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path))?;
        tracing_subscriber::fmt()
            .with_env_filter(&env_filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config_or_default(cli.config.as_deref())?;
    init_logging(&cli, &config)?;
    for warning in config::config_warnings(&config) {
        tracing::warn!("{}", warning);
    }

    let source = ByteSource::from_arg(&cli.input);
    if let ByteSource::File(ref path) = source {
        if !path.exists() {
            anyhow::bail!("Input file does not exist: {:?}", path);
        }
    }

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async {
        if cli.plain {
            run_plain(source, &config).await
        } else {
            run_chart(source, &config).await
        }
    });
    // A decoder blocked on a stalled read must not keep the process alive.
    rt.shutdown_background();

    let outcome = result?;
    print_summary(&outcome);
    Ok(())
}

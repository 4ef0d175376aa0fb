//! CLI entrypoint for think-tank
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use clap::{CommandFactory, Parser};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use think_tank_application::{
    AgentRunner, ArtifactPublisher, CannedAnswers, ClarificationResponder, ConversationLogger,
    NoConversationLogger, NoProgress, PersonaInvoker, ProgressNotifier, PublisherTools,
    RunAgentInput, RunContext, SessionStore, StageRunner, ThinkTankCoordinator, ThinkTankInput,
};
use think_tank_domain::{EmailContent, OutputFormat, SessionKey, Stage};
use think_tank_infrastructure::{
    ConfigLoader, ConfiguredSessionStore, FileConfig, FileLoggingConfig, GeminiCompletionService,
    InMemoryArtifactStore, JsonlConversationLogger, RendererKind, SessionBackend, renderer_for,
};
use think_tank_presentation::{
    AskArgs, Cli, Command, ConsoleFormatter, EmailArgs, InteractiveClarification,
    ProgressReporter, PublishArgs, SessionsArgs, SimpleProgress,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

type Invoker = PersonaInvoker<GeminiCompletionService>;

fn main() -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    let result = runtime.block_on(run(Cli::parse()));
    // A stdin read abandoned on Ctrl-C must not keep the process alive
    runtime.shutdown_background();
    result
}

async fn run(cli: Cli) -> Result<()> {

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
    }
    .map_err(|e| anyhow!("Failed to load configuration: {}", e))?;
    config.validate().context("Invalid configuration")?;

    let _log_guard = init_logging(cli.verbose, &config.logging)?;
    ConsoleFormatter::set_color(config.output.color);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    info!("Starting think-tank");

    let format = cli
        .output
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();

    // === Dependency Injection ===
    let sessions = Arc::new(
        ConfiguredSessionStore::open(&config.session).context("Failed to open session store")?,
    );

    if let Command::Sessions(args) = command {
        return run_sessions(&config, sessions.as_ref(), args).await;
    }

    let renderer = renderer_for(&config.publisher)?;
    let publisher = Arc::new(ArtifactPublisher::new(
        renderer,
        Arc::new(InMemoryArtifactStore::new()),
        config.publisher.output_dir.clone(),
    ));

    let ctx = run_context(&config, cli.quiet);

    match command {
        Command::Publish(args) if !args.agent => {
            run_publish_direct(&config, &publisher, args).await
        }
        command => {
            let completion = Arc::new(GeminiCompletionService::new(&config.gemini)?);
            let invoker = PersonaInvoker::new(completion, config.runtime_config())
                .with_tools(Arc::new(PublisherTools::new(Arc::clone(&publisher))));

            let session = sessions
                .create_session(
                    &config.session.app_name,
                    &config.session.user_id,
                    None,
                    config.user.seed_state(Local::now().date_naive()),
                )
                .await?;
            info!("Session {}", session.key);

            match command {
                Command::Ask(args) => {
                    run_ask(&config, invoker, sessions, &publisher, session.key, args, &ctx, format)
                        .await
                }
                Command::Email(args) => {
                    run_email(&config, invoker, sessions, session.key, args, &ctx, format).await
                }
                Command::Publish(args) => {
                    run_publish_agent(&config, invoker, sessions, session.key, args, &ctx).await
                }
                Command::Sessions(_) => Ok(()),
            }
        }
    }
}

/// Console logging from `-v`, overridable by `RUST_LOG`, plus an optional
/// daily log file
fn init_logging(verbose: u8, logging: &FileLoggingConfig) -> Result<Option<WorkerGuard>> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file, guard) = match &logging.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "think-tank.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();
    Ok(guard)
}

fn run_context(config: &FileConfig, quiet: bool) -> RunContext {
    let progress: Arc<dyn ProgressNotifier> = if quiet {
        Arc::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Arc::new(ProgressReporter::new())
    } else {
        Arc::new(SimpleProgress)
    };

    let logger: Arc<dyn ConversationLogger> = match config
        .logging
        .conversation_log
        .as_ref()
        .and_then(JsonlConversationLogger::new)
    {
        Some(logger) => Arc::new(logger),
        None => Arc::new(NoConversationLogger),
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling run");
            on_signal.cancel();
        }
    });

    RunContext::new(progress, logger, cancel)
}

fn extension(config: &FileConfig) -> &'static str {
    match config.publisher.renderer {
        RendererKind::Weasyprint => "pdf",
        RendererKind::Html => "html",
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_ask(
    config: &FileConfig,
    invoker: Invoker,
    sessions: Arc<ConfiguredSessionStore>,
    publisher: &ArtifactPublisher,
    session: SessionKey,
    args: AskArgs,
    ctx: &RunContext,
    format: OutputFormat,
) -> Result<()> {
    let think_tank = config
        .model
        .catalog()
        .think_tank(&config.orchestration.roster)?;
    let coordinator = ThinkTankCoordinator::new(StageRunner::new(invoker), sessions, think_tank);

    let mut input = ThinkTankInput::new(session, args.request);
    if args.no_clarify {
        input = input.without_clarification();
    }

    let responder: Box<dyn ClarificationResponder> = match &args.answers_file {
        Some(path) => Box::new(CannedAnswers::new(read_answers(path).await?)),
        None => Box::new(InteractiveClarification::new()),
    };

    let report = coordinator.run(input, responder.as_ref(), ctx).await?;
    if report.is_partial() {
        warn!("Report built from partial persona input");
    }

    let output = match format {
        OutputFormat::Full => ConsoleFormatter::format(&report),
        OutputFormat::Synthesis => ConsoleFormatter::format_synthesis_only(&report),
        OutputFormat::Json => ConsoleFormatter::format_json(&report),
    };
    println!("{}", output);

    if args.publish {
        let filename = format!("think_tank_report.{}", extension(config));
        let reference = publisher.render(&report.report, Some(&filename)).await?;
        let path = publisher.persist(&reference, Some(&filename)).await?;
        print!("{}", ConsoleFormatter::format_published(&reference, &path));
    }
    Ok(())
}

/// One answer per line; blank lines leave a question unanswered
async fn read_answers(path: &Path) -> Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read answers file {}", path.display()))?;
    Ok(text.lines().map(|line| line.trim().to_string()).collect())
}

async fn run_email(
    config: &FileConfig,
    invoker: Invoker,
    sessions: Arc<ConfiguredSessionStore>,
    session: SessionKey,
    args: EmailArgs,
    ctx: &RunContext,
    format: OutputFormat,
) -> Result<()> {
    let stage: Stage = config.model.catalog().email_writer()?.into();
    let runner = AgentRunner::new(StageRunner::new(invoker), sessions);
    let output = runner
        .execute(&stage, RunAgentInput::new(session, args.request), ctx)
        .await?;

    if format == OutputFormat::Json {
        println!("{}", ConsoleFormatter::format_run_json(&output));
        return Ok(());
    }

    let structured = output
        .outcome
        .output
        .as_ref()
        .and_then(|output| output.result.as_structured())
        .ok_or_else(|| anyhow!("Email writer returned no structured result"))?;
    let email: EmailContent = serde_json::from_value(structured.clone())?;
    println!("{}", ConsoleFormatter::format_email(&email));
    Ok(())
}

async fn run_publish_direct(
    config: &FileConfig,
    publisher: &ArtifactPublisher,
    args: PublishArgs,
) -> Result<()> {
    let markdown = read_markdown(&args.input).await?;
    let stem = args
        .input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let render_name = format!("{}.{}", stem, extension(config));

    let reference = publisher.render(&markdown, Some(&render_name)).await?;
    let path = publisher
        .persist(&reference, args.filename.as_deref())
        .await?;
    print!("{}", ConsoleFormatter::format_published(&reference, &path));
    Ok(())
}

async fn run_publish_agent(
    config: &FileConfig,
    invoker: Invoker,
    sessions: Arc<ConfiguredSessionStore>,
    session: SessionKey,
    args: PublishArgs,
    ctx: &RunContext,
) -> Result<()> {
    let markdown = read_markdown(&args.input).await?;
    let message = match &args.filename {
        Some(filename) => format!("Publish this report as {}:\n\n{}", filename, markdown),
        None => format!("Publish this report:\n\n{}", markdown),
    };

    let stage: Stage = config.model.catalog().content_publisher()?.into();
    let runner = AgentRunner::new(StageRunner::new(invoker), sessions);
    let output = runner
        .execute(&stage, RunAgentInput::new(session, message), ctx)
        .await?;
    println!("{}", output.final_response.unwrap_or_default());
    Ok(())
}

async fn read_markdown(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

async fn run_sessions(
    config: &FileConfig,
    sessions: &ConfiguredSessionStore,
    args: SessionsArgs,
) -> Result<()> {
    if config.session.backend == SessionBackend::Memory {
        warn!("Session backend is 'memory'; set [session] backend = \"sqlite\" to keep sessions");
    }
    let key = |id: String| SessionKey::new(&config.session.app_name, &config.session.user_id, id);

    if let Some(id) = args.show {
        let Some(session) = sessions.get_session(&key(id.clone())).await? else {
            bail!("Session not found: {}", id);
        };
        print!("{}", ConsoleFormatter::format_session(&session));
    } else if let Some(id) = args.delete {
        sessions.delete_session(&key(id.clone())).await?;
        println!("Deleted session {}", id);
    } else {
        let listed = sessions
            .list_sessions(&config.session.app_name, &config.session.user_id)
            .await?;
        print!("{}", ConsoleFormatter::format_sessions(&listed));
    }
    Ok(())
}

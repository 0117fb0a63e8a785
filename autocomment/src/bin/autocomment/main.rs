use {
    anyhow::{anyhow, bail, Context as _},
    autocomment::{
        breaker::CircuitBreaker,
        comments::CommentSource,
        config::{Config, ConfigError, DEFAULT_CONFIG_PATH},
        cycle::ActionCycle,
        locator::{Located, Locator, ScreenLocator, Target},
        notifier::WebhookNotifier,
        session::Session,
        setup::setup_to_file,
        worker::Worker,
    },
    clap::{Parser, Subcommand, ValueEnum},
    std::{
        path::{Path, PathBuf},
        sync::Arc,
        thread,
    },
    strum::IntoEnumIterator,
    tracing::info,
    tracing_subscriber::{filter::LevelFilter, EnvFilter},
};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file. Created by the setup if missing.
    #[clap(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Post comments until too many consecutive cycles fail (default).
    Run,
    /// Ask for all settings again and overwrite the configuration file.
    Setup,
    /// Look for a button on the current screen and print where it is.
    Locate {
        #[clap(value_enum, default_value_t = LocateTarget::All)]
        target: LocateTarget,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LocateTarget {
    CommentButton,
    NextButton,
    All,
}

impl LocateTarget {
    fn targets(self) -> Vec<Target> {
        match self {
            LocateTarget::CommentButton => vec![Target::CommentButton],
            LocateTarget::NextButton => vec![Target::NextButton],
            LocateTarget::All => Target::iter().collect(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env()?,
        )
        .init();

    match args.command.unwrap_or(Command::Run) {
        Command::Run => run(&args.config),
        Command::Setup => setup_to_file(&args.config).map(drop),
        Command::Locate { target } => locate(&args.config, target),
    }
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    if !path.try_exists()? {
        println!("{} not found, starting setup", path.display());
        return setup_to_file(path);
    }
    Config::load(path)
}

fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    check_config(&config, config_path)?;

    let session = Arc::new(Session::new());
    let notifier = WebhookNotifier::from_config(&config)?;
    let worker_session = session.clone();
    // The input device is owned by the worker thread for its whole life.
    let worker = thread::Builder::new()
        .name("automation".into())
        .spawn(move || -> anyhow::Result<()> {
            let context = autocomment_driver::Context::new()?;
            let pacing = config.pacing();
            let locator =
                ScreenLocator::new(context.clone(), config.templates(), config.confidence);
            let cycle = ActionCycle::new(
                worker_session.clone(),
                CommentSource::new(&config.comment_file),
                locator,
                context,
                pacing,
            );
            let breaker = CircuitBreaker::new(worker_session, notifier, config.error_threshold);
            Worker::new(cycle, breaker, pacing.cycle_interval).run();
            Ok(())
        })
        .context("failed to spawn automation thread")?;
    worker
        .join()
        .map_err(|_| anyhow!("automation thread panicked"))??;

    let state = session.snapshot();
    info!(
        comment_count = state.comment_count,
        consecutive_errors = state.consecutive_errors,
        "session finished"
    );
    for comment in &state.posted_comments {
        info!("posted: {comment}");
    }
    Ok(())
}

fn check_config(config: &Config, config_path: &Path) -> anyhow::Result<()> {
    match config.validate() {
        Ok(()) => Ok(()),
        Err(ConfigError::MissingWebhookUrl) => bail!(
            "Webhook URL not set in {}. Please run setup again.",
            config_path.display()
        ),
        Err(err) => bail!("Invalid configuration in {}: {err}", config_path.display()),
    }
}

fn locate(config_path: &Path, target: LocateTarget) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let context = autocomment_driver::Context::new()?;
    let locator = ScreenLocator::new(context, config.templates(), config.confidence);
    for target in target.targets() {
        match locator.locate(target) {
            Located::Found(point) => println!("{target}: {point}"),
            Located::NotFound => println!("{target}: not found"),
        }
    }
    Ok(())
}

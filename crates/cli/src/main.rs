use std::path::PathBuf;

use {
    anyhow::Context,
    chrono::NaiveDateTime,
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    chatbubble_config::WidgetConfig,
    chatbubble_widget::{LinkOpener, SystemOpener, build, build_link, is_available_now},
};

#[derive(Parser)]
#[command(name = "chatbubble", about = "chatbubble — WhatsApp chat-launcher widget toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file path (defaults to standard discovery).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit the widget's embed markup.
    Render {
        /// Evaluate availability at this local time ("YYYY-MM-DDTHH:MM")
        /// instead of now.
        #[arg(long)]
        at: Option<String>,
    },
    /// Build the chat deep link for the default contact or an explicit number.
    Link {
        #[arg(long)]
        phone: Option<String>,
        #[arg(short, long)]
        message: Option<String>,
        /// Open the link with the system handler.
        #[arg(long, default_value_t = false)]
        open: bool,
    },
    /// Report whether the widget would appear.
    Status {
        /// Evaluate at this local time ("YYYY-MM-DDTHH:MM") instead of now.
        #[arg(long)]
        at: Option<String>,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML.
    Show,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load(cli: &Cli) -> anyhow::Result<WidgetConfig> {
    match &cli.config {
        Some(path) => chatbubble_config::load_config(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(chatbubble_config::discover_and_load()),
    }
}

fn parse_at(at: Option<&str>) -> anyhow::Result<NaiveDateTime> {
    match at {
        Some(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
            .context("expected a local time like 2026-08-07T14:30"),
        None => Ok(chrono::Local::now().naive_local()),
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    let config = load(&cli)?;

    match &cli.command {
        Commands::Render { at } => {
            let now = parse_at(at.as_deref())?;
            if !config.enabled {
                info!("widget is disabled — nothing to render");
                return Ok(());
            }
            if !is_available_now(&config.working_hours, now) {
                info!("outside working hours — the widget would not mount");
                return Ok(());
            }
            println!("{}", build(&config).root.to_html());
        },
        Commands::Link {
            phone,
            message,
            open,
        } => {
            let phone = phone.as_deref().unwrap_or(&config.contact.phone_number);
            let message = message.as_deref().unwrap_or(&config.contact.message);
            let link = build_link(phone, message)
                .ok_or_else(|| anyhow::anyhow!("no usable phone number configured"))?;
            println!("{link}");
            if *open {
                SystemOpener.open(&link)?;
            }
        },
        Commands::Status { at } => {
            let now = parse_at(at.as_deref())?;
            if !config.enabled {
                println!("disabled");
            } else if is_available_now(&config.working_hours, now) {
                println!("available");
            } else {
                println!("unavailable (outside working hours)");
            }
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", toml::to_string_pretty(&config)?);
            },
        },
    }

    Ok(())
}

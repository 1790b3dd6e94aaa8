mod config_commands;
mod console;
mod render_commands;

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    hublink_boundary::{
        Boundary, BoundaryOptions, LocalEvent, LocalEventKind, Markup, WsOptions, WsTransport,
        introduction_frame, provider_fn,
    },
    serde_json::{Value, json},
    std::{path::PathBuf, sync::Arc},
    tokio::sync::mpsc,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "hublink", about = "Hublink: bridge a chat platform to a hub")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery in ./ and the user config dir).
    #[arg(long, global = true, env = "HUBLINK_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the hub and print deliveries to stdout (default).
    Run {
        /// Markup used to render outgoing bodies.
        #[arg(long, default_value_t = Markup::Markdown)]
        markup: Markup,
        /// Boundary name (overrides config value).
        #[arg(long)]
        name: Option<String>,
        /// Hub URL (overrides config value).
        #[arg(long)]
        hub_url: Option<String>,
    },
    /// Render a body offline and print the text and mentioned ids.
    Render {
        body: String,
        #[arg(long, default_value_t = Markup::Markdown)]
        markup: Markup,
        /// Chat the body is addressed to.
        #[arg(long, default_value = "console")]
        chat: String,
        /// Members of the chat, for `{tageveryone}`.
        #[arg(long, value_delimiter = ',')]
        members: Vec<String>,
    },
    /// Load, validate and print the configuration with secrets redacted.
    CheckConfig,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

async fn run(
    cli: &Cli,
    markup: Markup,
    name: Option<&str>,
    hub_url: Option<&str>,
) -> anyhow::Result<()> {
    let mut config = config_commands::load(cli.config.as_deref())?;
    if let Some(name) = name {
        config.boundary.name = name.to_string();
    }
    if let Some(url) = hub_url {
        config.hub.url = url.to_string();
    }
    config.validate().context("invalid configuration")?;

    let options = BoundaryOptions {
        name: config.boundary.name.clone(),
        platform: config.boundary.platform,
    };
    let endpoint = config.hub.endpoint()?;
    info!(
        boundary = %options.name,
        platform = %options.platform,
        hub = %endpoint,
        markup = %markup,
        "starting boundary"
    );

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let transport = WsTransport::spawn(
        WsOptions {
            url: endpoint,
            reconnect_delay: config.hub.reconnect_delay(),
            introduction: introduction_frame(&options, &config.hub.secret_bytes())?,
        },
        event_tx,
    );

    let boundary = Boundary::new(
        options.clone(),
        markup.builder().build(),
        console::ConsoleAdapter,
        Arc::new(transport),
    );
    boundary.on(LocalEventKind::Connect, |event| {
        if let LocalEvent::Connect(intro) = event {
            eprintln!("connected as {} ({})", intro.name, intro.platform);
        }
    });
    boundary.on_ask_resource(
        "boundary",
        provider_fn(move |_: Value| {
            let options = options.clone();
            async move {
                Ok::<_, anyhow::Error>(json!({
                    "name": options.name,
                    "platform": options.platform,
                    "version": env!("CARGO_PKG_VERSION"),
                }))
            }
        }),
    );

    tokio::select! {
        () = boundary.run(event_rx) => {},
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("interrupted, shutting down");
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "hublink starting");

    match &cli.command {
        None => run(&cli, Markup::default(), None, None).await,
        Some(Commands::Run {
            markup,
            name,
            hub_url,
        }) => run(&cli, *markup, name.as_deref(), hub_url.as_deref()).await,
        Some(Commands::Render {
            body,
            markup,
            chat,
            members,
        }) => render_commands::handle_render(body, *markup, chat, members).await,
        Some(Commands::CheckConfig) => config_commands::handle_check(cli.config.as_deref()),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_args_parse() {
        let cli = Cli::parse_from([
            "hublink",
            "render",
            "{bold:x}",
            "--markup",
            "html",
            "--members",
            "u1,u2",
        ]);
        match cli.command {
            Some(Commands::Render {
                body,
                markup,
                chat,
                members,
            }) => {
                assert_eq!(body, "{bold:x}");
                assert_eq!(markup, Markup::Html);
                assert_eq!(chat, "console");
                assert_eq!(members, vec!["u1", "u2"]);
            },
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn global_flags_apply_to_subcommands() {
        let cli = Cli::parse_from(["hublink", "check-config", "--config", "x.toml", "--json-logs"]);
        assert!(cli.json_logs);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("x.toml")));
        assert!(matches!(cli.command, Some(Commands::CheckConfig)));
    }

    #[test]
    fn run_overrides_parse() {
        let cli = Cli::parse_from(["hublink", "run", "--name", "tg", "--hub-url", "wss://hub"]);
        match cli.command {
            Some(Commands::Run {
                markup,
                name,
                hub_url,
            }) => {
                assert_eq!(markup, Markup::Markdown);
                assert_eq!(name.as_deref(), Some("tg"));
                assert_eq!(hub_url.as_deref(), Some("wss://hub"));
            },
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn unknown_markup_is_rejected() {
        assert!(Cli::try_parse_from(["hublink", "run", "--markup", "rtf"]).is_err());
    }
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blockhost::config::ProvisionConfig;
use blockhost::meta::{self, MetaClient, VersionCatalog};
use blockhost::models::ReleaseKind;
use blockhost::provision::{ProcessLauncher, Provisioner, TunedProfile};
use blockhost::ui::{self, ConsoleReporter, Selection, Style};

#[derive(Parser)]
#[command(name = "blockhost")]
#[command(about = "Provision a runnable Minecraft server")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List installable releases
    List {
        /// Show every manifest entry, including snapshots
        #[arg(long)]
        all: bool,
    },
    /// Download, launch and configure a server (default)
    Create(CreateArgs),
}

#[derive(Args, Default)]
struct CreateArgs {
    /// Release id to install; prompts when omitted
    #[arg(short, long)]
    release: Option<String>,

    /// Directory to install the server into
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Runtime executable used to start the server
    #[arg(long)]
    runtime: Option<String>,

    /// Check the download's size and checksum against the catalog
    #[arg(long)]
    verify: bool,
}

/// Initialize tracing on stderr so stdout carries only status lines.
fn init_tracing(verbose: bool) {
    let default = if verbose { "blockhost=debug" } else { "blockhost=info" };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = ProvisionConfig::load();
    let style = Style::from_env();

    match cli.command {
        Some(Commands::List { all }) => list(&config, &style, all).await?,
        Some(Commands::Create(args)) => create(config, style, args).await?,
        None => create(config, style, CreateArgs::default()).await?,
    }

    Ok(())
}

async fn list(config: &ProvisionConfig, style: &Style, all: bool) -> anyhow::Result<()> {
    let client = MetaClient::new(&config.user_agent);
    let manifest = VersionCatalog::new(client, &config.manifest_url).fetch().await?;

    if all {
        for entry in manifest.entries() {
            println!("{:<24} {}", entry.id, style.muted(entry.kind.as_str()));
        }
    } else {
        print!("{}", ui::render_candidates(&meta::filter(&manifest), style));
    }
    Ok(())
}

async fn create(mut config: ProvisionConfig, style: Style, args: CreateArgs) -> anyhow::Result<()> {
    if let Some(dir) = args.dir {
        config.server_dir = dir;
    }
    if let Some(runtime) = args.runtime {
        config.runtime = runtime;
    }
    config.verify_checksum |= args.verify;

    let client = MetaClient::new(&config.user_agent);
    let manifest = VersionCatalog::new(client.clone(), &config.manifest_url)
        .fetch()
        .await?;
    let candidates = meta::filter(&manifest);

    let index = match args.release {
        Some(id) => match ui::resolve_choice(&candidates, &id) {
            Some(index) => index,
            None => match manifest.find(&id) {
                Some(entry) if entry.kind != ReleaseKind::Release => anyhow::bail!(
                    "{} is a {} build, not an installable release",
                    id,
                    entry.kind.as_str()
                ),
                Some(_) => anyhow::bail!("{} is not a stable release", id),
                None => anyhow::bail!("{} is not in the release catalog", id),
            },
        },
        None => match ui::choose(&candidates, &style)? {
            Selection::Chosen(index) => index,
            Selection::Cancelled => {
                println!("Cancelled.");
                return Ok(());
            }
        },
    };
    let release = candidates
        .into_selection(index)
        .ok_or_else(|| anyhow::anyhow!("selection out of range"))?;

    let reporter = ConsoleReporter::new(style);
    let profile = TunedProfile::detect();
    let mut provisioner = Provisioner::new(&config, client, ProcessLauncher, profile);
    let report = provisioner.provision(release, &reporter).await?;

    tracing::info!(
        release = %report.release_id,
        tuned = report.tuned(),
        bytes = report.bytes,
        "Server ready"
    );
    if let Some(e) = report.script_error {
        eprintln!("warning: {}", e);
    }
    Ok(())
}

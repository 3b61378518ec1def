use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use radix_router::config::RouteTableConfig;
use radix_router::routing::Router;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "router-cli", about = "Radix trie URL router — build, dump, match")]
struct Cli {
    /// Path to the route table config file
    #[arg(short, long, default_value = "routes.toml")]
    routes: PathBuf,

    /// Print the built trie and exit instead of matching a path
    #[arg(long)]
    dump: bool,

    /// Path to match against the built router
    path: Option<String>,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let table = RouteTableConfig::load(&cli.routes)?;

    let mut router: Router<String> = Router::new();
    for entry in table.routes {
        router.add(&entry.pattern, entry.payload)?;
    }

    if cli.dump {
        print!("{}", router.dump());
        return Ok(());
    }

    match cli.path {
        Some(path) => match router.match_path(&path) {
            Some(hit) => {
                println!("matched: {:?}", hit.payload);
                println!("params: {:?}", hit.params);
            }
            None => {
                println!("no match for {path}");
            }
        },
        None => {
            anyhow::bail!("pass a path to match, or --dump to print the trie");
        }
    }

    Ok(())
}

fn init_tracing() {
    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(false),
        )
        .init();

    // Leaked deliberately: the guard must outlive every `tracing` call made
    // for the rest of the process, and this is a short-lived CLI, not a
    // server with a graceful-shutdown path to run it down on.
    std::mem::forget(guard);
}

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    HttpUserListProvider, ProviderConfig, StaticUserListProvider, UserListProvider,
    UserListScreen, UserRow,
};
use tracing::info;

/// Shows the user list once and prints one line per row.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, env = "USERLIST_SERVER_URL", default_value = "http://127.0.0.1:8080")]
    server_url: String,
    #[arg(long, env = "USERLIST_USERS_PATH", default_value = "/users")]
    users_path: String,
    #[arg(long, env = "USERLIST_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,
    /// Read users from a JSON file instead of the server.
    #[arg(long)]
    fixture: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let provider = build_provider(&args)?;
    let mut screen = UserListScreen::new(provider);
    screen.appear();

    match screen.settle().await {
        Some(Ok(count)) => info!(count, "user list ready"),
        Some(Err(err)) => return Err(err).context("failed to fetch users"),
        None => {}
    }

    let rows = screen.rows();
    if rows.is_empty() {
        println!("(no users)");
    }
    for row in &rows {
        println!("{}", format_row(row));
    }
    Ok(())
}

fn build_provider(args: &Args) -> Result<Arc<dyn UserListProvider>> {
    if let Some(path) = &args.fixture {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture '{}'", path.display()))?;
        return Ok(Arc::new(StaticUserListProvider::from_json(&raw)?));
    }

    let provider = HttpUserListProvider::new(&ProviderConfig {
        server_url: args.server_url.clone(),
        users_path: args.users_path.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
    })?;
    info!(endpoint = %provider.endpoint(), "using remote user list");
    Ok(Arc::new(provider))
}

fn format_row(row: &UserRow) -> String {
    format!("{:>6}  {}", row.key.0, row.text)
}

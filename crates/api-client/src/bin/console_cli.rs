use anyhow::Context;
use api_client::{ApiClient, ClientConfig, CredentialStore};
use clap::{Parser, Subcommand};
use reqwest::Method;

#[derive(Parser)]
#[command(name = "console-cli")]
#[command(about = "Call the agent console API with a bearer token")]
#[command(
    long_about = "A command-line interface for the agent console backend.\n\n\
    Requests go through the same request layer the console UI uses: the token\n\
    is attached as `Authorization: Bearer <token>` and failed responses are\n\
    reported, never retried."
)]
struct Cli {
    /// Backend server URL to connect to.
    #[arg(short, long, env = "API_BASE_URL")]
    base_url: Option<String>,

    /// Session token to authenticate with.
    #[arg(short, long, env = "CONSOLE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the session the backend associates with the token
    Whoami,

    /// GET an API path and print the response body
    Get {
        /// Path relative to the base URL, e.g. /api/v1/session
        path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_client=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }

    let credentials = CredentialStore::new();
    if let Some(token) = cli.token {
        credentials.sign_in(token).await;
    }

    let client = ApiClient::new(&config, credentials).context("Failed to create API client")?;

    match cli.command {
        Commands::Whoami => {
            let session = client
                .current_session()
                .await
                .context("Failed to fetch session")?;
            println!("Subject:  {}", session.subject);
            if let Some(name) = session.name {
                println!("Name:     {}", name);
            }
            println!("Expires:  {}", session.expires_at.to_rfc3339());
            println!(
                "Refresh:  {}",
                if session.refresh_available { "available" } else { "none" }
            );
        }
        Commands::Get { path } => {
            let response = client
                .send(client.request(Method::GET, &path).await?)
                .await
                .with_context(|| format!("GET {} failed", path))?;

            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            println!("{}", body);

            if !status.is_success() {
                anyhow::bail!("GET {} returned {}", path, status);
            }
        }
    }

    Ok(())
}

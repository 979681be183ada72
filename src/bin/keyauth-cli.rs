use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "keyauth-cli")]
#[command(about = "Management CLI for the function host", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:7071")]
    url: String,

    /// Key presented to the host.
    #[arg(short, long, env = "FUNCTIONS_KEY")]
    key: Option<String>,

    /// Send the key as `?code=` instead of the `x-functions-key` header.
    #[arg(long)]
    query: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check host status (master key)
    Status,
    /// List host key names (master key)
    Keys,
    /// Call a function route
    Invoke {
        /// Route path, e.g. /api/orders
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let path = match &cli.command {
        Commands::Status => "/admin/host/status".to_string(),
        Commands::Keys => "/admin/host/keys".to_string(),
        Commands::Invoke { path } => path.clone(),
    };

    let mut request = client.get(format!("{}{}", cli.url.trim_end_matches('/'), path));
    if let Some(key) = &cli.key {
        if cli.query {
            request = request.query(&[("code", key)]);
        } else {
            let mut headers = HeaderMap::new();
            headers.insert("x-functions-key", HeaderValue::from_str(key)?);
            request = request.headers(headers);
        }
    }

    let res = request.send().await?;
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: {} {}", status, res.text().await.unwrap_or_default());
        std::process::exit(1);
    }

    let body: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

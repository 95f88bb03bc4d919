use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the Security Gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token for protected routes
    #[arg(short, long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway health
    Health,
    /// Encrypt a plaintext string
    Encrypt { data: String },
    /// Decrypt a hex-encoded ciphertext
    Decrypt { data: String },
    /// Issue a signed URL for a stored file
    SignUrl {
        file_path: String,
        #[arg(short, long, default_value_t = 15)]
        expiry_minutes: i64,
    },
    /// Validate a signed URL token
    ValidateUrl { token: String },
    /// Record a custom audit event
    Audit {
        action: String,
        /// Metadata as a JSON object string
        #[arg(short, long)]
        metadata: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
    }

    match cli.command {
        Commands::Health => {
            let res = client
                .get(format!("{}/health", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Encrypt { data } => {
            let res = client
                .post(format!("{}/secure-encrypt", cli.url))
                .headers(headers)
                .json(&json!({ "action": "encrypt", "data": data }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Decrypt { data } => {
            let res = client
                .post(format!("{}/secure-encrypt", cli.url))
                .headers(headers)
                .json(&json!({ "action": "decrypt", "data": data }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::SignUrl {
            file_path,
            expiry_minutes,
        } => {
            let res = client
                .post(format!("{}/secure-encrypt", cli.url))
                .headers(headers)
                .json(&json!({
                    "action": "signUrl",
                    "filePath": file_path,
                    "expiryMinutes": expiry_minutes,
                }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::ValidateUrl { token } => {
            let res = client
                .post(format!("{}/secure-encrypt", cli.url))
                .headers(headers)
                .json(&json!({ "action": "validateUrl", "data": token }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Audit { action, metadata } => {
            let metadata: Value = match metadata {
                Some(raw) => serde_json::from_str(&raw)?,
                None => json!({}),
            };
            let res = client
                .post(format!("{}/audit-log", cli.url))
                .headers(headers)
                .json(&json!({ "action": action, "metadata": metadata }))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use mvnup::deploy::{Deployer, UploadRequest};

#[derive(Parser)]
#[command(name = "mvnup")]
#[command(about = "Upload an artifact to a maven repository")]
struct Cli {
    /// URL to the maven repository
    #[arg(long)]
    repourl: String,

    /// Maven group identifier
    #[arg(long)]
    group: String,

    /// Artifact identifier
    #[arg(long)]
    artifact: String,

    /// File extension, used as the packaging type
    #[arg(long)]
    ext: String,

    /// Artifact version
    #[arg(long)]
    version: String,

    /// File to upload
    #[arg(long)]
    file: PathBuf,

    /// Username for authentication to the repository
    #[arg(long)]
    username: String,

    /// Password for authentication to the repository
    #[arg(long)]
    password: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let repo_url = Url::parse(&cli.repourl).context("repourl not valid")?;
    if repo_url.scheme() != "http" && repo_url.scheme() != "https" {
        anyhow::bail!("repourl is neither http nor https");
    }

    let request = UploadRequest {
        repo_url: cli.repourl,
        group_id: cli.group,
        artifact_id: cli.artifact,
        packaging: cli.ext,
        version: cli.version,
        file: cli.file,
        username: cli.username,
        password: cli.password,
    };

    info!("uploading artifact...");
    let uploaded = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async { Deployer::new().upload(&request).await })?;

    info!("uploaded files:");
    for url in &uploaded {
        println!("{url}");
    }
    info!("upload complete.");
    Ok(())
}

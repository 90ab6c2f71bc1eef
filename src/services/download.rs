use std::path::Path;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::info;

use crate::model::cli_error::CliError;

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Downloads `url` into a new file at `dest`, returning the byte count.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, CliError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, CliError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        HttpFetcher { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, CliError> {
        info!(%url, "Downloading AWS CLI");
        let mut res = self.client.get(url).send().await?.error_for_status()?;

        // Hidden automatically when stderr is not a terminal, as in CI logs.
        let pb = match res.content_length() {
            Some(len) => ProgressBar::new(len).with_style(
                ProgressStyle::with_template("{bytes}/{total_bytes} {wide_bar} {eta}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            ),
            None => ProgressBar::new_spinner(),
        };

        let mut file = File::create(dest).await?;
        let mut written = 0u64;
        while let Some(chunk) = res.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            pb.inc(chunk.len() as u64);
        }
        file.flush().await?;
        pb.finish_and_clear();

        info!(bytes = written, path = %dest.display(), "Download complete");
        Ok(written)
    }
}

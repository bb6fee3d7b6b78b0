// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::infrastructure::constants::USER_AGENT;
use crate::shared::error::{Result, ToolchainError};
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

#[async_trait::async_trait]
pub trait ToolDownloader: Send + Sync {
    /// Fetch `url` into `dest`, returning the number of bytes written.
    ///
    /// The file is not made executable. Callers own cleanup of `dest` on
    /// failure.
    async fn download(
        &self,
        url: &Url,
        dest: &Path,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<u64>;
}

pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ToolDownloader for HttpDownloader {
    async fn download(
        &self,
        url: &Url,
        dest: &Path,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolchainError::filesystem(parent, e))?;
        }

        debug!(%url, dest = %dest.display(), timeout_secs = timeout.as_secs(), "Downloading");
        let request = self.client.get(url.clone()).timeout(timeout).send();
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ToolchainError::Cancelled),
            response = request => response?,
        };

        if response.status() != StatusCode::OK {
            return Err(ToolchainError::Download {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| ToolchainError::filesystem(dest, e))?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        loop {
            let chunk = tokio::select! {
                _ = cancel.cancelled() => return Err(ToolchainError::Cancelled),
                chunk = stream.next() => chunk,
            };
            let Some(chunk) = chunk else { break };
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| ToolchainError::filesystem(dest, e))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| ToolchainError::filesystem(dest, e))?;

        info!(%url, bytes = written, "Download complete");
        Ok(written)
    }
}

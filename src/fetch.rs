//! Release package list fetching.
//!
//! The rock package archive serves one Debian `Packages` list per release,
//! laid out like a plain Debian repository. Downloads retry transient
//! failures with exponential backoff and land in the cache directory; the
//! import layer then normalizes them into the index. This is the only
//! network-touching code in the crate.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::platform::import::{self, SourceFormat};

/// Download configuration options.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Request timeout (package lists are small, so a timeout is safe)
    pub timeout: Option<Duration>,
    /// Number of retry attempts for transient failures (default: 3)
    pub retries: u32,
    /// Delay between retries (default: 2 seconds, doubles each retry)
    pub retry_delay: Duration,
    /// Whether to narrate retries and results (default: true)
    pub show_progress: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(60)),
            retries: 3,
            retry_delay: Duration::from_secs(2),
            show_progress: true,
        }
    }
}

impl FetchOptions {
    /// Quiet fetch for scripted use.
    pub fn quiet() -> Self {
        Self {
            show_progress: false,
            ..Self::default()
        }
    }
}

/// URL of a release's Packages list within the archive.
pub fn packages_url(base: &str, release: &str, distribution: &str, arch: &str) -> String {
    format!(
        "{}/{}/dists/{}/main/binary-{}/Packages",
        base.trim_end_matches('/'),
        release,
        distribution,
        arch
    )
}

/// Download one release's Packages list into the cache directory.
pub fn fetch_packages_list(config: &Config, release: &str, options: &FetchOptions) -> Result<PathBuf> {
    let url = packages_url(
        &config.archive_url,
        release,
        &config.distribution,
        &config.architecture,
    );
    let dest = config
        .cache_dir
        .join(format!("{}_{}.packages", release, config.architecture));

    if options.show_progress {
        println!("  Fetching {}", url);
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(http(&url, &dest, options))?;
    Ok(dest)
}

/// Fetch a release's list and import it into the index directory.
pub fn fetch_and_import(config: &Config, release: &str, options: &FetchOptions) -> Result<usize> {
    let packages_file = fetch_packages_list(config, release, options)?;
    import::import_source(
        &config.index_dir,
        release,
        &config.architecture,
        &packages_file,
        SourceFormat::Packages,
    )
}

/// Download a file via HTTP with retries.
///
/// # Errors
/// Returns detailed error with URL, HTTP status, and retry information.
pub async fn http(url: &str, dest: &Path, options: &FetchOptions) -> Result<()> {
    let client = reqwest::Client::builder()
        .user_agent("rockdeb/0.1")
        .build()
        .context("Failed to create HTTP client")?;

    let mut last_error = None;
    let mut attempt = 0;

    while attempt <= options.retries {
        if attempt > 0 {
            let delay = options.retry_delay * (1 << (attempt - 1).min(4)); // Exponential backoff, max 16x
            if options.show_progress {
                println!("    Retry {}/{} in {:?}...", attempt, options.retries, delay);
            }
            tokio::time::sleep(delay).await;
        }
        attempt += 1;

        match http_attempt(&client, url, dest, options).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                let is_retryable = is_retryable_error(&e);
                if !is_retryable || attempt > options.retries {
                    return Err(e);
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| anyhow::anyhow!("Download failed after {} retries", options.retries)))
}

/// Single HTTP download attempt.
async fn http_attempt(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    options: &FetchOptions,
) -> Result<()> {
    use futures_util::StreamExt;
    use tokio::io::AsyncWriteExt;

    let mut request = client.get(url);
    if let Some(timeout) = options.timeout {
        request = request.timeout(timeout);
    }

    let response = request
        .send()
        .await
        .with_context(|| format!("HTTP request failed: {}", url))?;

    let status = response.status();
    if !status.is_success() {
        bail!(
            "HTTP {} for {}: {}",
            status.as_u16(),
            url,
            status.canonical_reason().unwrap_or("Unknown error")
        );
    }

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    // Write to a sidecar first so a dropped connection never leaves a
    // truncated list behind.
    let partial = dest.with_extension("partial");
    let file = tokio::fs::File::create(&partial)
        .await
        .with_context(|| format!("Failed to create {}", partial.display()))?;
    let mut writer = tokio::io::BufWriter::new(file);

    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.with_context(|| format!("Failed to read chunk from {}", url))?;
        writer
            .write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write to {}", partial.display()))?;
        downloaded += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .with_context(|| format!("Failed to flush {}", partial.display()))?;

    tokio::fs::rename(&partial, dest)
        .await
        .with_context(|| format!("Failed to move {} into place", partial.display()))?;

    if options.show_progress {
        println!("    Fetched {:.1} KB", downloaded as f64 / 1024.0);
    }

    Ok(())
}

/// Check if an error is likely transient and worth retrying.
fn is_retryable_error(e: &anyhow::Error) -> bool {
    let msg = e.to_string().to_lowercase();
    msg.contains("timeout")
        || msg.contains("connection reset")
        || msg.contains("connection refused")
        || msg.contains("temporarily unavailable")
        || msg.contains("try again")
        || msg.contains("503")
        || msg.contains("502")
        || msg.contains("504")
}

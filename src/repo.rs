//! Maven repository layout and integrity checks

use reqwest::StatusCode;
use sha1::{Digest, Sha1};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("http response {status} fetching {url}")]
    UnexpectedStatus { url: String, status: StatusCode },

    #[error("checksum file {0} is empty")]
    EmptyChecksum(String),

    #[error("checksum ({url}) does not match: expected {expected}, got {actual}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },
}

/// The URLs and file name a set of Maven coordinates resolves to.
///
/// `group_url` and `version_url` always end in `/`, so file names append
/// directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub group_url: String,
    pub version_url: String,
    pub file_name: String,
}

impl Layout {
    pub fn new(
        repo_url: &str,
        group_id: &str,
        artifact_id: &str,
        packaging: &str,
        version: &str,
    ) -> Self {
        let base = repo_url.trim_end_matches('/');
        let group_path = group_id.replace('.', "/");
        Self {
            group_url: format!("{base}/{group_path}/"),
            version_url: format!("{base}/{group_path}/{artifact_id}/{version}/"),
            file_name: format!("{artifact_id}-{version}.{packaging}"),
        }
    }
}

/// Fetches the `.sha1` sibling of `url` and verifies `bytes` against it.
///
/// The checksum file contains the hex digest, optionally followed by
/// whitespace and a file name; comparison is case-insensitive.
pub async fn verify_sha1(
    client: &reqwest::Client,
    url: &str,
    bytes: &[u8],
) -> Result<(), RepoError> {
    let sha1_url = format!("{url}.sha1");
    let response = client.get(&sha1_url).send().await?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(RepoError::UnexpectedStatus {
            url: sha1_url,
            status,
        });
    }
    let text = response.text().await?;
    let expected = text
        .split_whitespace()
        .next()
        .ok_or_else(|| RepoError::EmptyChecksum(sha1_url.clone()))?
        .to_ascii_lowercase();
    let actual = hex::encode(Sha1::digest(bytes));
    if actual != expected {
        return Err(RepoError::ChecksumMismatch {
            url: sha1_url,
            expected,
            actual,
        });
    }
    Ok(())
}

//! Artifact upload pipeline
//!
//! A deploy is a fixed sequence of PUTs, one artifact at a time: the primary
//! file, its SHA-1 and MD5 checksum siblings, the generated POM with its
//! siblings, then the merged `maven-metadata.xml` with its siblings. Every
//! PUT must come back `201 Created`; the first failure aborts the pipeline.

use std::path::PathBuf;

use md5::Md5;
use quick_xml::SeError;
use reqwest::StatusCode;
use sha1::{Digest, Sha1};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::metadata::{self, MetadataError, MAVEN_METADATA_FILE};
use crate::pom::{self, Pom};
use crate::repo::Layout;

const USER_AGENT: &str = concat!("mvnup/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("could not read artifact file {path:?}: {source}")]
    ReadArtifact {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("uploading {url}: http response {status}")]
    UnexpectedStatus { url: Url, status: StatusCode },

    #[error("target URL not valid: {0}")]
    Url(#[from] url::ParseError),

    #[error("error updating metadata: {0}")]
    Metadata(#[from] MetadataError),

    #[error("error marshaling xml: {0}")]
    Xml(#[from] SeError),
}

/// Everything one deploy needs: coordinates, the file, and credentials.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub repo_url: String,
    pub group_id: String,
    pub artifact_id: String,
    pub packaging: String,
    pub version: String,
    pub file: PathBuf,
    pub username: String,
    pub password: String,
}

/// Uploads artifacts to a Maven repository over HTTP.
pub struct Deployer {
    client: reqwest::Client,
}

impl Deployer {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .expect("failed to create HTTP client"),
        }
    }

    /// Uses a caller-supplied client, e.g. one pointed at a test server.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Runs the full deploy and returns every URL that was uploaded, in
    /// order.
    pub async fn upload(&self, request: &UploadRequest) -> Result<Vec<Url>, DeployError> {
        let layout = Layout::new(
            &request.repo_url,
            &request.group_id,
            &request.artifact_id,
            &request.packaging,
            &request.version,
        );
        let artifact = tokio::fs::read(&request.file)
            .await
            .map_err(|source| DeployError::ReadArtifact {
                path: request.file.clone(),
                source,
            })?;

        let mut uploaded = Vec::new();

        info!(file = %request.file.display(), "uploading artifact");
        let artifact_url = Url::parse(&format!("{}{}", layout.version_url, layout.file_name))?;
        uploaded.push(self.put(request, artifact_url, artifact.clone()).await?);
        uploaded.extend(
            self.put_checksums(request, &artifact, &layout.version_url, &layout.file_name)
                .await?,
        );

        info!("uploading POM");
        let pom = Pom::new(
            &request.group_id,
            &request.artifact_id,
            &request.version,
            &request.packaging,
        );
        let pom_bytes = pom.to_xml()?.into_bytes();
        let pom_url = pom::url(
            &request.repo_url,
            &request.group_id,
            &request.artifact_id,
            &request.version,
        )?;
        uploaded.push(self.put(request, pom_url, pom_bytes.clone()).await?);
        let pom_name = format!("{}-{}.pom", request.artifact_id, request.version);
        uploaded.extend(
            self.put_checksums(request, &pom_bytes, &layout.version_url, &pom_name)
                .await?,
        );

        info!("updating repository metadata");
        let metadata = metadata::generate(
            &self.client,
            &request.repo_url,
            &request.group_id,
            &request.artifact_id,
            &request.version,
        )
        .await?;
        let metadata_bytes = metadata.to_xml()?.into_bytes();
        let metadata_dir = format!("{}{}/", layout.group_url, request.artifact_id);
        let metadata_url = Url::parse(&format!("{metadata_dir}{MAVEN_METADATA_FILE}"))?;
        uploaded.push(self.put(request, metadata_url, metadata_bytes.clone()).await?);
        uploaded.extend(
            self.put_checksums(request, &metadata_bytes, &metadata_dir, MAVEN_METADATA_FILE)
                .await?,
        );

        info!(count = uploaded.len(), "upload complete");
        Ok(uploaded)
    }

    async fn put(
        &self,
        request: &UploadRequest,
        url: Url,
        body: Vec<u8>,
    ) -> Result<Url, DeployError> {
        debug!(%url, bytes = body.len(), "PUT");
        let response = self
            .client
            .put(url.clone())
            .basic_auth(&request.username, Some(&request.password))
            .body(body)
            .send()
            .await?;
        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(DeployError::UnexpectedStatus { url, status });
        }
        Ok(url)
    }

    /// PUTs the `.sha1` then `.md5` sibling files for `bytes`.
    async fn put_checksums(
        &self,
        request: &UploadRequest,
        bytes: &[u8],
        base_url: &str,
        file_name: &str,
    ) -> Result<Vec<Url>, DeployError> {
        let digests = [
            ("sha1", hex::encode(Sha1::digest(bytes))),
            ("md5", hex::encode(Md5::digest(bytes))),
        ];
        let mut uploaded = Vec::with_capacity(digests.len());
        for (suffix, digest) in digests {
            let url = Url::parse(&format!("{base_url}{file_name}.{suffix}"))?;
            uploaded.push(self.put(request, url, digest.into_bytes()).await?);
        }
        Ok(uploaded)
    }
}

impl Default for Deployer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_digests_are_lowercase_hex() {
        // known vectors for the empty input
        assert_eq!(
            hex::encode(Sha1::digest(b"")),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
        assert_eq!(
            hex::encode(Md5::digest(b"")),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }
}

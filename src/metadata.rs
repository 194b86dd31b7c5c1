//! `maven-metadata.xml` documents
//!
//! The artifact-level metadata file lists every deployed version plus the
//! latest/release pointers. An upload fetches the hosted file (verifying it
//! against its `.sha1` sibling), merges the new version in, re-sorts, and
//! republishes. Versions round-trip through their normalized string form.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use quick_xml::se::Serializer;
use quick_xml::{DeError, SeError};
use reqwest::StatusCode;
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::repo::{verify_sha1, RepoError};
use crate::version::{Version, VersionError, Versions};

pub const MAVEN_METADATA_FILE: &str = "maven-metadata.xml";
const METADATA_MODEL_VERSION: &str = "1.1.0";
const LAST_UPDATED_FORMAT: &str = "%Y%m%d%H%M%S";
const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("no metadata hosted at {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("http response {status} downloading metadata ({url})")]
    UnexpectedStatus { url: String, status: StatusCode },

    #[error("integrity check failed: {0}")]
    Integrity(#[from] RepoError),

    #[error("error unmarshaling metadata: {0}")]
    Decode(#[from] DeError),

    #[error("error marshaling metadata: {0}")]
    Encode(#[from] SeError),

    #[error(transparent)]
    Version(#[from] VersionError),
}

/// An artifact-level metadata document, root element `<metadata>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(rename = "@modelVersion", skip_serializing_if = "Option::is_none", default)]
    pub model_version: Option<String>,
    pub group_id: String,
    pub artifact_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<Version>,
    #[serde(default)]
    pub versioning: Versioning,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Versioning {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub latest: Option<Version>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub release: Option<Version>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub snapshot: Option<Snapshot>,
    #[serde(default)]
    pub versions: VersionList,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_updated: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub snapshot_versions: Option<SnapshotVersions>,
}

/// The `<versions>` wrapper around the `<version>` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionList {
    #[serde(rename = "version", default)]
    pub version: Versions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp: Timestamp,
    pub build_number: u32,
    pub local_copy: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotVersions {
    #[serde(rename = "snapshotVersion", default)]
    pub snapshot_version: Vec<SnapshotVersion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotVersion {
    pub classifier: String,
    pub extension: String,
    pub value: String,
    pub updated: String,
}

/// A UTC timestamp in the `lastUpdated` wire format (`yyyyMMddHHmmss`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(LAST_UPDATED_FORMAT))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0.format(LAST_UPDATED_FORMAT))
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, LAST_UPDATED_FORMAT)
            .map(|naive| Self(naive.and_utc()))
            .map_err(de::Error::custom)
    }
}

impl Metadata {
    /// An empty metadata document for an artifact with no hosted versions.
    pub fn new(group_id: &str, artifact_id: &str) -> Self {
        Self {
            model_version: Some(METADATA_MODEL_VERSION.to_string()),
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: None,
            versioning: Versioning::default(),
        }
    }

    /// Renders the document with an XML declaration and 2-space indentation.
    pub fn to_xml(&self) -> Result<String, SeError> {
        let mut body = String::new();
        let mut ser = Serializer::with_root(&mut body, Some("metadata"))?;
        ser.indent(' ', 2);
        self.serialize(ser)?;
        Ok(format!("{XML_HEADER}{body}"))
    }

    /// Parses a document and sorts its version list oldest first.
    pub fn from_xml(text: &str) -> Result<Self, DeError> {
        let mut metadata: Self = quick_xml::de::from_str(text)?;
        metadata.versioning.versions.version.sort();
        Ok(metadata)
    }
}

fn metadata_url(repo_url: &str, group_id: &str, artifact_id: &str) -> String {
    let group_path = group_id.replace('.', "/");
    format!(
        "{}/{}/{}/{}",
        repo_url.trim_end_matches('/'),
        group_path,
        artifact_id,
        MAVEN_METADATA_FILE
    )
}

/// Fetches the hosted metadata for an artifact, verifying it against its
/// `.sha1` sibling. A 404 maps to [`MetadataError::NotFound`] so callers
/// can start a fresh document.
pub async fn fetch(
    client: &reqwest::Client,
    repo_url: &str,
    group_id: &str,
    artifact_id: &str,
) -> Result<Metadata, MetadataError> {
    let url = metadata_url(repo_url, group_id, artifact_id);
    let response = client.get(&url).send().await?;
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(MetadataError::NotFound(url));
    }
    if status != StatusCode::OK {
        return Err(MetadataError::UnexpectedStatus { url, status });
    }
    let bytes = response.bytes().await?;
    verify_sha1(client, &url, &bytes).await?;

    let mut metadata: Metadata = quick_xml::de::from_reader(bytes.as_ref())?;
    metadata.versioning.versions.version.sort();
    Ok(metadata)
}

/// Produces the metadata to republish after deploying `new_version`:
/// the hosted document (or a fresh one) with the version merged in,
/// latest/release repointed and lastUpdated stamped.
pub async fn generate(
    client: &reqwest::Client,
    repo_url: &str,
    group_id: &str,
    artifact_id: &str,
    new_version: &str,
) -> Result<Metadata, MetadataError> {
    let mut metadata = match fetch(client, repo_url, group_id, artifact_id).await {
        Ok(metadata) => metadata,
        Err(MetadataError::NotFound(url)) => {
            debug!(%url, "no hosted metadata, starting a fresh document");
            Metadata::new(group_id, artifact_id)
        }
        Err(err) => return Err(err),
    };

    let version = Version::parse(new_version)?;
    let versions = &mut metadata.versioning.versions.version;
    versions.push(version);
    versions.sort();
    let newest = versions.last().cloned();
    metadata.versioning.latest = newest.clone();
    metadata.versioning.release = newest.clone();
    metadata.version = newest;
    metadata.versioning.last_updated = Some(Timestamp::now());
    Ok(metadata)
}

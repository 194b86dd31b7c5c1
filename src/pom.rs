//! `pom.xml` documents
//!
//! Models the subset of the project object model an upload needs to
//! produce, plus the fetch/load paths consumers use to read one back.

use std::path::Path;

use quick_xml::se::Serializer;
use quick_xml::{DeError, SeError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::repo::{verify_sha1, Layout, RepoError};

const POM_MODEL_VERSION: &str = "4.0.0";
const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

#[derive(Debug, Error)]
pub enum PomError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("http response {status} downloading POM file {url}")]
    UnexpectedStatus { url: Url, status: StatusCode },

    #[error("integrity check failed: {0}")]
    Integrity(#[from] RepoError),

    #[error("error unmarshaling pom: {0}")]
    Decode(#[from] DeError),

    #[error("error marshaling pom: {0}")]
    Encode(#[from] SeError),

    #[error("POM URL not valid: {0}")]
    Url(#[from] url::ParseError),

    #[error("could not read POM file: {0}")]
    Io(#[from] std::io::Error),
}

/// A project object model document, root element `<project>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pom {
    pub model_version: String,
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub packaging: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub licenses: Option<Licenses>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dependencies: Option<Dependencies>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub repositories: Option<Repositories>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Licenses {
    #[serde(rename = "license", default)]
    pub license: Vec<License>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub name: String,
    pub url: String,
    pub distribution: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dependencies {
    #[serde(rename = "dependency", default)]
    pub dependency: Vec<Dependency>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub scope: String,
    pub optional: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Repositories {
    #[serde(rename = "repository", default)]
    pub repository: Vec<Repository>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: String,
    pub name: String,
    pub url: String,
    pub layout: String,
    pub snapshots: RepoPolicy,
    pub releases: RepoPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoPolicy {
    pub enabled: bool,
    pub update_policy: String,
    pub checksum_policy: String,
}

impl Pom {
    /// A minimal POM for an uploaded artifact.
    pub fn new(group_id: &str, artifact_id: &str, version: &str, packaging: &str) -> Self {
        Self {
            model_version: POM_MODEL_VERSION.to_string(),
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
            packaging: packaging.to_string(),
            description: None,
            url: None,
            name: None,
            licenses: None,
            dependencies: None,
            repositories: None,
        }
    }

    /// Renders the document with an XML declaration and 2-space indentation.
    pub fn to_xml(&self) -> Result<String, SeError> {
        let mut body = String::new();
        let mut ser = Serializer::with_root(&mut body, Some("project"))?;
        ser.indent(' ', 2);
        self.serialize(ser)?;
        Ok(format!("{XML_HEADER}{body}"))
    }

    pub fn from_xml(text: &str) -> Result<Self, DeError> {
        quick_xml::de::from_str(text)
    }

    /// Reads a POM from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PomError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_xml(&text)?)
    }
}

/// The URL a POM lives at for the given coordinates.
pub fn url(
    repo_url: &str,
    group_id: &str,
    artifact_id: &str,
    version: &str,
) -> Result<Url, url::ParseError> {
    let layout = Layout::new(repo_url, group_id, artifact_id, "", version);
    Url::parse(&format!(
        "{}{}-{}.pom",
        layout.version_url, artifact_id, version
    ))
}

/// Fetches and verifies the POM for the given coordinates.
pub async fn fetch(
    client: &reqwest::Client,
    repo_url: &str,
    group_id: &str,
    artifact_id: &str,
    version: &str,
) -> Result<Pom, PomError> {
    let pom_url = url(repo_url, group_id, artifact_id, version)?;
    let response = client.get(pom_url.clone()).send().await?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(PomError::UnexpectedStatus {
            url: pom_url,
            status,
        });
    }
    let bytes = response.bytes().await?;
    verify_sha1(client, pom_url.as_str(), &bytes).await?;
    Ok(quick_xml::de::from_reader(bytes.as_ref())?)
}

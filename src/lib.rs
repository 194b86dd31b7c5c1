//! Maven repository deployment for non-Maven build pipelines.
//!
//! The crate splits into a pure version engine and a thin HTTP layer on top:
//!
//! - [`version`]: parsing, ordering and range matching for Maven version
//!   strings, faithful to the rules documented at
//!   <https://maven.apache.org/pom.html>
//! - [`repo`]: coordinate-to-URL layout and checksum verification
//! - [`pom`] / [`metadata`]: the `pom.xml` and `maven-metadata.xml` documents
//!   an upload has to produce
//! - [`deploy`]: the upload pipeline itself

pub mod deploy;
pub mod metadata;
pub mod pom;
pub mod repo;
pub mod version;

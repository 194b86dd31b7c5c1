use std::io::Write;

use md5::Md5;
use mockito::Matcher;
use sha1::{Digest, Sha1};
use tempfile::NamedTempFile;

use mvnup::deploy::{DeployError, Deployer, UploadRequest};
use mvnup::pom::Pom;

const ARTIFACT_BODY: &str = "not really a jar";

fn write_artifact() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(ARTIFACT_BODY.as_bytes()).unwrap();
    file
}

fn request(repo_url: &str, file: &NamedTempFile) -> UploadRequest {
    UploadRequest {
        repo_url: repo_url.to_string(),
        group_id: "com.example".to_string(),
        artifact_id: "demo".to_string(),
        packaging: "jar".to_string(),
        version: "1.0".to_string(),
        file: file.path().to_path_buf(),
        username: "user".to_string(),
        password: "pass".to_string(),
    }
}

fn sha1_hex(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}

fn md5_hex(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

#[tokio::test]
async fn upload_puts_artifact_pom_metadata_and_checksums() {
    let mut server = mockito::Server::new_async().await;

    // base64("user:pass")
    let auth = "Basic dXNlcjpwYXNz";
    let artifact = server
        .mock("PUT", "/com/example/demo/1.0/demo-1.0.jar")
        .match_header("authorization", auth)
        .match_body(ARTIFACT_BODY)
        .with_status(201)
        .create_async()
        .await;
    let artifact_sha1 = server
        .mock("PUT", "/com/example/demo/1.0/demo-1.0.jar.sha1")
        .match_body(sha1_hex(ARTIFACT_BODY.as_bytes()).as_str())
        .with_status(201)
        .create_async()
        .await;
    let artifact_md5 = server
        .mock("PUT", "/com/example/demo/1.0/demo-1.0.jar.md5")
        .match_body(md5_hex(ARTIFACT_BODY.as_bytes()).as_str())
        .with_status(201)
        .create_async()
        .await;

    let pom_xml = Pom::new("com.example", "demo", "1.0", "jar").to_xml().unwrap();
    let pom = server
        .mock("PUT", "/com/example/demo/1.0/demo-1.0.pom")
        .match_header("authorization", auth)
        .match_body(pom_xml.as_str())
        .with_status(201)
        .create_async()
        .await;
    let pom_sha1 = server
        .mock("PUT", "/com/example/demo/1.0/demo-1.0.pom.sha1")
        .match_body(sha1_hex(pom_xml.as_bytes()).as_str())
        .with_status(201)
        .create_async()
        .await;
    let pom_md5 = server
        .mock("PUT", "/com/example/demo/1.0/demo-1.0.pom.md5")
        .match_body(md5_hex(pom_xml.as_bytes()).as_str())
        .with_status(201)
        .create_async()
        .await;

    // no hosted metadata yet
    let metadata_get = server
        .mock("GET", "/com/example/demo/maven-metadata.xml")
        .with_status(404)
        .create_async()
        .await;
    let metadata = server
        .mock("PUT", "/com/example/demo/maven-metadata.xml")
        .match_header("authorization", auth)
        .match_body(Matcher::Regex(
            "(?s)<metadata modelVersion=\"1.1.0\">.*<version>1.0</version>.*<latest>1.0</latest>"
                .to_string(),
        ))
        .with_status(201)
        .create_async()
        .await;
    let metadata_sha1 = server
        .mock("PUT", "/com/example/demo/maven-metadata.xml.sha1")
        .match_body(Matcher::Regex("^[0-9a-f]{40}$".to_string()))
        .with_status(201)
        .create_async()
        .await;
    let metadata_md5 = server
        .mock("PUT", "/com/example/demo/maven-metadata.xml.md5")
        .match_body(Matcher::Regex("^[0-9a-f]{32}$".to_string()))
        .with_status(201)
        .create_async()
        .await;

    let file = write_artifact();
    let deployer = Deployer::with_client(reqwest::Client::new());
    let uploaded = deployer.upload(&request(&server.url(), &file)).await.unwrap();

    let expected: Vec<String> = [
        "/com/example/demo/1.0/demo-1.0.jar",
        "/com/example/demo/1.0/demo-1.0.jar.sha1",
        "/com/example/demo/1.0/demo-1.0.jar.md5",
        "/com/example/demo/1.0/demo-1.0.pom",
        "/com/example/demo/1.0/demo-1.0.pom.sha1",
        "/com/example/demo/1.0/demo-1.0.pom.md5",
        "/com/example/demo/maven-metadata.xml",
        "/com/example/demo/maven-metadata.xml.sha1",
        "/com/example/demo/maven-metadata.xml.md5",
    ]
    .iter()
    .map(|path| format!("{}{}", server.url(), path))
    .collect();
    let uploaded: Vec<String> = uploaded.iter().map(|u| u.to_string()).collect();
    assert_eq!(uploaded, expected);

    for mock in [
        artifact,
        artifact_sha1,
        artifact_md5,
        pom,
        pom_sha1,
        pom_md5,
        metadata_get,
        metadata,
        metadata_sha1,
        metadata_md5,
    ] {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn upload_merges_hosted_metadata() {
    let mut server = mockito::Server::new_async().await;

    for path in [
        "/com/example/demo/1.0/demo-1.0.jar",
        "/com/example/demo/1.0/demo-1.0.jar.sha1",
        "/com/example/demo/1.0/demo-1.0.jar.md5",
        "/com/example/demo/1.0/demo-1.0.pom",
        "/com/example/demo/1.0/demo-1.0.pom.sha1",
        "/com/example/demo/1.0/demo-1.0.pom.md5",
        "/com/example/demo/maven-metadata.xml.sha1",
        "/com/example/demo/maven-metadata.xml.md5",
    ] {
        server.mock("PUT", path).with_status(201).create_async().await;
    }

    let hosted = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
        <metadata modelVersion=\"1.1.0\">\
        <groupId>com.example</groupId>\
        <artifactId>demo</artifactId>\
        <versioning><versions>\
        <version>2.0</version>\
        <version>0.9</version>\
        </versions></versioning></metadata>";
    server
        .mock("GET", "/com/example/demo/maven-metadata.xml")
        .with_status(200)
        .with_body(hosted)
        .create_async()
        .await;
    server
        .mock("GET", "/com/example/demo/maven-metadata.xml.sha1")
        .with_status(200)
        .with_body(sha1_hex(hosted.as_bytes()))
        .create_async()
        .await;

    // merged list is re-sorted and latest points at the newest version
    let merged = server
        .mock("PUT", "/com/example/demo/maven-metadata.xml")
        .match_body(Matcher::Regex(
            "(?s)<latest>2.0</latest>.*<version>0.9</version>.*<version>1.0</version>.*<version>2.0</version>"
                .to_string(),
        ))
        .with_status(201)
        .create_async()
        .await;

    let file = write_artifact();
    let deployer = Deployer::with_client(reqwest::Client::new());
    let uploaded = deployer.upload(&request(&server.url(), &file)).await.unwrap();
    assert_eq!(uploaded.len(), 9);
    merged.assert_async().await;
}

#[tokio::test]
async fn upload_stops_at_the_first_rejected_put() {
    let mut server = mockito::Server::new_async().await;
    let rejected = server
        .mock("PUT", "/com/example/demo/1.0/demo-1.0.jar")
        .with_status(403)
        .create_async()
        .await;
    let never_reached = server
        .mock("PUT", "/com/example/demo/1.0/demo-1.0.jar.sha1")
        .with_status(201)
        .expect(0)
        .create_async()
        .await;

    let file = write_artifact();
    let deployer = Deployer::with_client(reqwest::Client::new());
    let err = deployer
        .upload(&request(&server.url(), &file))
        .await
        .unwrap_err();
    assert!(matches!(err, DeployError::UnexpectedStatus { .. }));
    rejected.assert_async().await;
    never_reached.assert_async().await;
}

#[tokio::test]
async fn upload_fails_when_the_artifact_file_is_missing() {
    let server = mockito::Server::new_async().await;
    let file = write_artifact();
    let mut request = request(&server.url(), &file);
    request.file = file.path().with_extension("missing");

    let deployer = Deployer::with_client(reqwest::Client::new());
    let err = deployer.upload(&request).await.unwrap_err();
    assert!(matches!(err, DeployError::ReadArtifact { .. }));
}

//! Cover artwork for renamed folders.
//!
//! The renamer only knows the [`CoverArt`] contract: given a code, a cover URL
//! and the folder that now exists on disk, produce some files in that folder
//! and report their names. [`CoverDownloader`] is the stock implementation; it
//! downloads the cover image and leaves icon generation to other tools.

use crate::error::{Classify, ErrorKind, Result};
use crate::http::HttpSettings;
use crate::models::WorkCode;
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::Client;
use std::path::Path;
use tracing::instrument;

/// Names of the files a [`CoverArt`] implementation placed in a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverFiles {
    /// Generated folder icon, for implementations that produce one.
    pub icon: Option<String>,
    /// Downloaded cover image.
    pub image: String,
}

#[async_trait]
pub trait CoverArt: Send + Sync {
    async fn fetch(&self, code: &WorkCode, url: &str, dir: &Path) -> Result<CoverFiles>;
}

/// Downloads the cover image into `cover.jpg`, unless the folder already has one.
pub struct CoverDownloader {
    client: Client,
}
impl CoverDownloader {
    pub const FILE_NAME: &str = "cover.jpg";

    pub fn new(settings: &HttpSettings) -> Result<Self> {
        Ok(Self { client: settings.client()? })
    }
}

#[async_trait]
impl CoverArt for CoverDownloader {
    #[instrument(skip(self, dir), fields(code = %code))]
    async fn fetch(&self, code: &WorkCode, url: &str, dir: &Path) -> Result<CoverFiles> {
        let files = CoverFiles { icon: None, image: Self::FILE_NAME.to_string() };
        let target = dir.join(Self::FILE_NAME);
        if tokio::fs::try_exists(&target).await.or_raise(|| ErrorKind::Write(target.clone()))? {
            tracing::debug!(path = %target.display(), "cover already present");
            return Ok(files);
        }
        let response = self.client.get(url).send().await.classify()?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }
        let bytes = response.bytes().await.classify()?;
        tokio::fs::write(&target, &bytes).await.or_raise(|| ErrorKind::Write(target.clone()))?;
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn downloader() -> CoverDownloader {
        CoverDownloader::new(&HttpSettings { sleep_interval: Duration::ZERO, ..HttpSettings::default() }).unwrap()
    }

    #[tokio::test]
    async fn test_downloads_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cover.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg".to_vec()))
            .expect(1)
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let code: WorkCode = "RJ123456".parse().unwrap();
        let url = format!("{}/cover.jpg", server.uri());

        let downloader = downloader();
        let files = downloader.fetch(&code, &url, dir.path()).await.unwrap();
        assert_eq!(files, CoverFiles { icon: None, image: "cover.jpg".to_string() });
        assert_eq!(std::fs::read(dir.path().join("cover.jpg")).unwrap(), b"jpeg");
        // Second call finds the file and makes no request.
        downloader.fetch(&code, &url, dir.path()).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_image_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(404)).mount(&server).await;
        let dir = tempfile::tempdir().unwrap();
        let code: WorkCode = "RJ123456".parse().unwrap();

        let err = downloader().fetch(&code, &format!("{}/x.jpg", server.uri()), dir.path()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::not_found());
        assert!(!dir.path().join("cover.jpg").exists());
    }
}

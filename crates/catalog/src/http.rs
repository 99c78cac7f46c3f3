//! Raw lookups against the remote catalog's product endpoint.
//!
//! The endpoint takes a `workno` and a `locale` and answers with a JSON array
//! holding (at most) one product record. An empty array is reported as
//! `404 Not Found`, exactly like a non-success status.

use crate::consts::{DEFAULT_ENDPOINT, ISO_DATE};
use crate::error::{Classify, ErrorKind, Result};
use crate::models::{AgeCategory, Locale, WorkCode, WorkMetadata};
use crate::source::MetadataSource;
use async_trait::async_trait;
use exn::OptionExt;
use reqwest::{Client, Proxy};
use serde::Deserialize;
use serde::de::IgnoredAny;
use std::time::Duration;
use time::Date;
use tracing::instrument;

/// Connection settings shared by every client talking to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    /// Product endpoint URL.
    pub endpoint: String,
    pub locale: Locale,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Pause after every remote call.
    pub sleep_interval: Duration,
    /// Proxy for all requests. Without one, the system proxy settings apply.
    pub proxy: Option<String>,
}
impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            locale: Locale::default(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(10),
            sleep_interval: Duration::from_secs(3),
            proxy: None,
        }
    }
}
impl HttpSettings {
    pub(crate) fn client(&self) -> Result<Client> {
        let mut builder = Client::builder()
            .user_agent(concat!("rjren/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(self.connect_timeout)
            .read_timeout(self.read_timeout);
        if let Some(proxy) = &self.proxy {
            builder = builder.proxy(Proxy::all(proxy).classify()?);
        }
        builder.build().classify()
    }
}

/// Product record as returned by the catalog. Only the fields needed to build
/// [`WorkMetadata`] are declared.
#[derive(Debug, Deserialize)]
struct Product {
    work_name: String,
    maker_id: String,
    maker_name: String,
    regist_date: String,
    #[serde(default)]
    series_id: Option<String>,
    #[serde(default)]
    series_name: Option<String>,
    age_category: u8,
    #[serde(default)]
    genres: Vec<Named>,
    #[serde(default)]
    creaters: Option<Creators>,
    #[serde(default)]
    image_main: Option<Image>,
    #[serde(default)]
    translation_info: Option<TranslationInfo>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Image {
    url: String,
}

#[derive(Debug, Deserialize)]
struct TranslationInfo {
    #[serde(default)]
    original_workno: Option<String>,
}

/// Credits are an object when present, but an empty array when not.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Creators {
    Credits {
        #[serde(default)]
        voice_by: Vec<Named>,
    },
    #[allow(dead_code)]
    Other(IgnoredAny),
}

/// [`MetadataSource`] backed by the remote catalog.
///
/// Every remote call is followed by the configured
/// [`sleep_interval`](HttpSettings::sleep_interval), whatever its outcome.
pub struct HttpSource {
    client: Client,
    settings: HttpSettings,
}
impl HttpSource {
    pub fn new(settings: HttpSettings) -> Result<Self> {
        Ok(Self { client: settings.client()?, settings })
    }

    /// Validates `code` before looking it up; a malformed code fails with
    /// [`ErrorKind::InvalidCode`] without any request being made.
    pub async fn lookup(&self, code: &str) -> Result<WorkMetadata> {
        let code: WorkCode = code.parse()?;
        self.fetch(&code).await
    }

    async fn product(&self, code: &WorkCode) -> Result<Product> {
        let result = self.request(code).await;
        tokio::time::sleep(self.settings.sleep_interval).await;
        result
    }

    async fn request(&self, code: &WorkCode) -> Result<Product> {
        let response = self
            .client
            .get(&self.settings.endpoint)
            .query(&[("workno", code.as_str()), ("locale", self.settings.locale.as_str())])
            .send()
            .await
            .classify()?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }
        let products: Vec<Product> = response.json().await.classify()?;
        products.into_iter().next().ok_or_raise(ErrorKind::not_found)
    }
}

#[async_trait]
impl MetadataSource for HttpSource {
    #[instrument(skip(self), fields(code = %code))]
    async fn fetch(&self, code: &WorkCode) -> Result<WorkMetadata> {
        let mut product = self.product(code).await?;
        let original_workno = product
            .translation_info
            .take()
            .and_then(|info| info.original_workno)
            .filter(|workno| !workno.is_empty() && !workno.eq_ignore_ascii_case(code.as_str()));
        let original = match original_workno {
            Some(workno) => {
                let original: WorkCode = workno.parse()?;
                tracing::debug!(%original, "work is a translation; inheriting maker and series");
                Some(self.product(&original).await?)
            },
            None => None,
        };
        into_metadata(code.clone(), product, original)
    }
}

/// Maps a product record (and the record of the work it translates, if
/// any) into [`WorkMetadata`]. Maker and series come from the original work;
/// name, release date and code always describe the requested record.
fn into_metadata(code: WorkCode, product: Product, original: Option<Product>) -> Result<WorkMetadata> {
    let Product {
        work_name,
        maker_id,
        maker_name,
        regist_date,
        series_id,
        series_name,
        age_category,
        genres,
        creaters,
        image_main,
        ..
    } = product;
    let (maker_id, maker_name, series_id, series_name) = match original {
        Some(original) => (original.maker_id, original.maker_name, original.series_id, original.series_name),
        None => (maker_id, maker_name, series_id, series_name),
    };
    let release_date = regist_date
        .get(..10)
        .and_then(|date| Date::parse(date, ISO_DATE).ok())
        .ok_or_raise(|| ErrorKind::Request(format!("invalid release date: {regist_date}")))?;
    let mut tags: Vec<String> = Vec::with_capacity(genres.len());
    for Named { name } in genres {
        if !tags.contains(&name) {
            tags.push(name);
        }
    }
    let voice_actors = match creaters {
        Some(Creators::Credits { voice_by }) => voice_by.into_iter().map(|named| named.name).collect(),
        _ => Vec::new(),
    };
    let cover_url = image_main
        .map(|image| match image.url.starts_with("//") {
            true => format!("https:{}", image.url),
            false => image.url,
        })
        .unwrap_or_default();
    Ok(WorkMetadata {
        code,
        work_name,
        maker_id,
        maker_name,
        release_date,
        series_id: series_id.filter(|s| !s.is_empty()),
        series_name: series_name.filter(|s| !s.is_empty()),
        age_category: AgeCategory::from_catalog(age_category),
        tags,
        voice_actors,
        cover_url,
    })
}

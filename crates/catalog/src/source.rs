use crate::error::Result;
use crate::models::{WorkCode, WorkMetadata};
use async_trait::async_trait;
use std::sync::Arc;

/// Anything that can resolve a [`WorkCode`] into [`WorkMetadata`].
///
/// Implementations report failures through the classified
/// [`ErrorKind`](crate::error::ErrorKind) so that a caller can decide per
/// item how to proceed. Decorators (caching, for example) wrap another
/// source rather than extend it.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch(&self, code: &WorkCode) -> Result<WorkMetadata>;
}

#[async_trait]
impl<S: MetadataSource + ?Sized> MetadataSource for Arc<S> {
    async fn fetch(&self, code: &WorkCode) -> Result<WorkMetadata> {
        (**self).fetch(code).await
    }
}

use territoires_shared::{BoundaryCollection, BoundaryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch boundary dataset: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to read boundary dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] BoundaryError),
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Fetches and parses the department boundaries. Nothing is cached between calls.
pub async fn load(
    client: &reqwest::Client,
    source: &str,
) -> Result<BoundaryCollection, LoadError> {
    let bytes = if is_remote(source) {
        client
            .get(source)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    } else {
        tokio::fs::read(source).await?
    };
    Ok(BoundaryCollection::from_slice(&bytes)?)
}

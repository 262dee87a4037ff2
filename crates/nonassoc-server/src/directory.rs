//! HTTP client for the prisoner search service.

use std::time::Duration;

use nonassoc_core::directory::{PrisonerDetails, PrisonerDirectory};
use reqwest::Client;
use serde::Serialize;

use crate::error::Error;

/// [`PrisonerDirectory`] backed by the prisoner search service.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpPrisonerDirectory {
  client:   Client,
  base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrisonerNumbersRequest<'a> {
  prisoner_numbers: &'a [String],
}

impl HttpPrisonerDirectory {
  pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self) -> String {
    format!(
      "{}/prisoner-search/prisoner-numbers",
      self.base_url.trim_end_matches('/')
    )
  }
}

impl PrisonerDirectory for HttpPrisonerDirectory {
  type Error = Error;

  async fn lookup<'a>(
    &'a self,
    prisoner_numbers: &'a [String],
  ) -> Result<Vec<PrisonerDetails>, Self::Error> {
    let resp = self
      .client
      .post(self.url())
      .json(&PrisonerNumbersRequest { prisoner_numbers })
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      tracing::warn!(%status, count = prisoner_numbers.len(), "prisoner search request failed");
      return Err(Error::DirectoryStatus(status.as_u16()));
    }
    Ok(resp.json().await?)
  }
}

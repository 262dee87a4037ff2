//! Lookup of prisoner details held by an external service.

use std::{collections::HashMap, future::Future};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The details of a prisoner needed to list and sort non-associations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrisonerDetails {
  pub prisoner_number: String,
  pub first_name:      String,
  pub last_name:       String,
  pub prison_id:       Option<String>,
  pub prison_name:     Option<String>,
  pub cell_location:   Option<String>,
}

/// An external prisoner directory.
pub trait PrisonerDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Look up the given prisoner numbers. Unknown numbers are simply absent
  /// from the result.
  fn lookup<'a>(
    &'a self,
    prisoner_numbers: &'a [String],
  ) -> impl Future<Output = Result<Vec<PrisonerDetails>, Self::Error>> + Send + 'a;
}

/// Index `details` by prisoner number, failing with
/// [`Error::UpstreamLookupGap`] on the first requested number that the
/// directory did not return.
pub fn index_details(
  requested: &[String],
  details: Vec<PrisonerDetails>,
) -> Result<HashMap<String, PrisonerDetails>> {
  let index: HashMap<String, PrisonerDetails> = details
    .into_iter()
    .map(|d| (d.prisoner_number.clone(), d))
    .collect();
  if let Some(missing) = requested.iter().find(|n| !index.contains_key(*n)) {
    return Err(Error::UpstreamLookupGap(missing.clone()));
  }
  Ok(index)
}

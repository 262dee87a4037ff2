//! Test doubles shared by the unit tests in this crate.

use chrono::{DateTime, TimeZone as _, Utc};

use crate::{
  Error, Result,
  record::{NewNonAssociation, NonAssociation},
  repository::Repository,
  vocabulary::{Reason, RestrictionType, Role},
};

pub fn created_at() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
}

pub fn new_record(first: &str, second: &str) -> NewNonAssociation {
  NewNonAssociation {
    first_prisoner_number:  first.into(),
    first_role:             Role::Victim,
    second_prisoner_number: second.into(),
    second_role:            Role::Perpetrator,
    reason:                 Reason::Violence,
    restriction_type:       RestrictionType::Cell,
    comment:                "seen fighting".into(),
    authorised_by:          "GOVERNOR".into(),
    updated_by:             "OFFICER".into(),
    closure:                None,
    when_created:           created_at(),
    when_updated:           created_at(),
  }
}

pub fn open_record(id: i64, first: &str, second: &str) -> NonAssociation {
  new_record(first, second).with_id(id)
}

/// A `Vec`-backed repository. Ids are assigned sequentially from 1.
#[derive(Debug, Default)]
pub struct MemoryRepository {
  pub records: Vec<NonAssociation>,
  next_id:     i64,
}

impl MemoryRepository {
  pub fn with(records: Vec<NonAssociation>) -> Self {
    let next_id = records.iter().map(|r| r.id).max().unwrap_or(0);
    Self { records, next_id }
  }

  pub fn get(&self, id: i64) -> Option<&NonAssociation> {
    self.records.iter().find(|r| r.id == id)
  }
}

impl Repository for MemoryRepository {
  fn find_by_id(&mut self, id: i64) -> Result<Option<NonAssociation>> {
    Ok(self.get(id).cloned())
  }

  fn find_all_by_either_prisoner_number(
    &mut self,
    prisoner_number: &str,
  ) -> Result<Vec<NonAssociation>> {
    Ok(
      self
        .records
        .iter()
        .filter(|r| r.involves(prisoner_number))
        .cloned()
        .collect(),
    )
  }

  fn find_by_exact_pair(
    &mut self,
    first: &str,
    second: &str,
  ) -> Result<Vec<NonAssociation>> {
    Ok(
      self
        .records
        .iter()
        .filter(|r| r.first_prisoner_number == first && r.second_prisoner_number == second)
        .cloned()
        .collect(),
    )
  }

  fn insert(&mut self, record: NewNonAssociation) -> Result<NonAssociation> {
    self.next_id += 1;
    let record = record.with_id(self.next_id);
    self.records.push(record.clone());
    Ok(record)
  }

  fn save(&mut self, record: &NonAssociation) -> Result<()> {
    let slot = self
      .records
      .iter_mut()
      .find(|r| r.id == record.id)
      .ok_or(Error::NotFound(record.id))?;
    *slot = record.clone();
    Ok(())
  }

  fn delete(&mut self, id: i64) -> Result<()> {
    self.records.retain(|r| r.id != id);
    Ok(())
  }
}

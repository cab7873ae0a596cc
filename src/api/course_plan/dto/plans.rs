/*
 * Responsibility
 * - course plan の request/response DTO
 * - JSON のキー名は dashboard が使っていたもの (_id, ownerID, createdDate, modifiedDate)
 * - "_id" は encode 済みの公開 ID を返す (内部 ID を漏らさない)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::plan_repo::PlanChanges;

pub const MAX_NAME_LEN: usize = 200;

/// Update payload: only these fields may change.
///
/// Anything else (`_id`, `ownerID`, `createdDate`, ...) is rejected at deserialization.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdatePlanRequest {
    pub name: Option<String>,
    pub modified_date: Option<DateTime<Utc>>,
}

impl UpdatePlanRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.is_none() && self.modified_date.is_none() {
            return Err("at least one of name, modifiedDate is required");
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err("name cannot be empty");
            }
            if name.chars().count() > MAX_NAME_LEN {
                return Err("name must be <= 200 chars");
            }
        }

        Ok(())
    }

    /// The name is stored exactly as sent; `validate` only rejects blank ones.
    pub fn into_changes(self) -> PlanChanges {
        PlanChanges {
            name: self.name,
            modified_date: self.modified_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanIdResponse {
    #[serde(rename = "_id")]
    pub id: String, // encoded
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    #[serde(rename = "_id")]
    pub id: String, // encoded
    #[serde(rename = "ownerID")]
    pub owner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "createdDate")]
    pub created_date: DateTime<Utc>,
    #[serde(rename = "modifiedDate")]
    pub modified_date: DateTime<Utc>,
}

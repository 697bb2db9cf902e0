use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::Sex;

/// Patient identity as extracted from one source document.
/// Every field is optional: lab reports frequently omit or garble them,
/// and a malformed date parses to None rather than failing the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedIdentity {
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub sex: Option<Sex>,
    pub collection_date: Option<NaiveDate>,
}

/// The single patient identity produced by reducing over every document
/// in one analysis run. `collection_date` is the most recent valid date
/// seen across documents, not the most common one, since multiple real lab
/// visits are expected and are not noise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedIdentity {
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub sex: Option<Sex>,
    pub collection_date: Option<NaiveDate>,
}

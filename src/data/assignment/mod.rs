use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod db;

pub static ASSIGNMENT_COLLECTION_NAME: &str = "assignments";

/// A posted assignment. Anyone may create one; only the recorded creator may
/// delete it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(
        default = "Uuid::new_v4",
        rename = "_id",
        with = "bson::serde_helpers::uuid_1_as_binary"
    )]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub difficulty: String,
    pub due_date: DateTime<Utc>,
    pub marks: i32,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub creator_email: String,
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod db;

pub static TESTIMONIAL_COLLECTION_NAME: &str = "testimonial";

/// User testimonial shown on the landing page. Create and list only; no
/// ownership, no update, no delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Testimonial {
    #[serde(
        default = "Uuid::new_v4",
        rename = "_id",
        with = "bson::serde_helpers::uuid_1_as_binary"
    )]
    pub id: Uuid,
    pub author_name: String,
    pub text: String,
    pub rating: i32,
}

use bson::{doc, Document};
use mongodb::options::UpdateOptions;
use serde::Serialize;
use uuid::Uuid;

pub mod assignment;
pub mod submission;
pub mod testimonial;

/// Identifier of a freshly created record.
#[derive(Debug, Clone, Serialize)]
pub struct InsertOutcome {
    pub inserted_id: Uuid,
}

/// Result of an upsert replace. `upserted_id` is set only when the record
/// did not previously exist and was created by the replace.
#[derive(Debug, Clone, Serialize)]
pub struct ReplaceOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<Uuid>,
}

impl ReplaceOutcome {
    pub fn from_update(id: Uuid, result: mongodb::results::UpdateResult) -> ReplaceOutcome {
        Self::from_counts(
            id,
            result.matched_count,
            result.modified_count,
            result.upserted_id.is_some(),
        )
    }

    fn from_counts(id: Uuid, matched_count: u64, modified_count: u64, upserted: bool) -> Self {
        ReplaceOutcome {
            matched_count,
            modified_count,
            upserted_id: upserted.then_some(id),
        }
    }
}

/// `$set` update for a replace. The stored `_id` is never part of the update;
/// the filtered id always wins and a replace never moves a document.
pub fn replacement_update<T: Serialize>(value: &T) -> Result<Document, bson::ser::Error> {
    let mut replacement = bson::to_document(value)?;
    replacement.remove("_id");

    Ok(doc! { "$set": replacement })
}

/// Replaces create the record when the filter matches nothing.
pub fn upsert_options() -> UpdateOptions {
    UpdateOptions::builder().upsert(true).build()
}

/// Identifier of a successfully deleted record.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    pub deleted_id: Uuid,
}

pub mod filter {
    use bson::spec::BinarySubtype;
    use bson::{doc, Bson, Document};
    use uuid::Uuid;

    /// Binary-UUID value matching the `uuid_1_as_binary` representation used
    /// for `_id` fields.
    #[inline]
    pub fn uuid_bson(id: Uuid) -> Bson {
        Bson::Binary(bson::Binary {
            subtype: BinarySubtype::Uuid,
            bytes: id.as_bytes().to_vec(),
        })
    }

    #[inline]
    pub fn by_id(id: Uuid) -> Document {
        doc! { "_id": uuid_bson(id) }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn id_filter_uses_binary_uuid() {
            let id = Uuid::new_v4();
            let filter = by_id(id);

            match filter.get("_id") {
                Some(Bson::Binary(bin)) => {
                    assert_eq!(bin.subtype, BinarySubtype::Uuid);
                    assert_eq!(bin.bytes, id.as_bytes().to_vec());
                }
                other => panic!("expected binary uuid filter, got {:?}", other),
            }
        }
    }
}

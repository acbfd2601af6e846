use mongodb::Database;
use rocket::futures::StreamExt;
use uuid::Uuid;

use super::{Assignment, ASSIGNMENT_COLLECTION_NAME};
use crate::data::{filter, replacement_update, upsert_options, ReplaceOutcome};
use crate::resp::problem::Problem;

pub mod problem {
    use crate::resp::problem::{ErrorCode, Problem};
    use uuid::Uuid;

    #[inline]
    pub fn not_found(id: Uuid) -> Problem {
        Problem::new(ErrorCode::NotFound, "Assignment doesn't exist.")
            .insert_str("id", id)
            .clone()
    }

    #[inline]
    pub fn not_owner() -> Problem {
        Problem::new(
            ErrorCode::Forbidden,
            "Only the creator can delete an assignment.",
        )
    }

    #[inline]
    pub fn delete_failed(id: Uuid) -> Problem {
        Problem::new(ErrorCode::Internal, "Failed to delete the assignment.")
            .insert_str("id", id)
            .clone()
    }
}

/// Ownership rule for mutations: the caller's verified identity must equal
/// the recorded creator email, compared exactly (case-sensitive).
pub fn authorize_owner(assignment: &Assignment, caller_email: &str) -> Result<(), Problem> {
    if assignment.creator_email != caller_email {
        return Err(problem::not_owner());
    }

    Ok(())
}

pub trait AssignmentDbExt {
    async fn list_assignments(&self) -> Result<Vec<Assignment>, Problem>;

    async fn get_assignment(&self, id: Uuid) -> Result<Option<Assignment>, Problem>;

    async fn create_assignment(&self, assignment: &Assignment) -> Result<Uuid, Problem>;

    /// Upsert by design: an unused `id` creates the record.
    async fn replace_assignment(
        &self,
        id: Uuid,
        assignment: Assignment,
    ) -> Result<ReplaceOutcome, Problem>;

    /// Gated by [`authorize_owner`]; fails with `NotFound` when the record is
    /// absent and `Internal` when the store reports nothing deleted.
    async fn delete_assignment(&self, id: Uuid, caller_email: &str) -> Result<Uuid, Problem>;
}

impl AssignmentDbExt for Database {
    async fn list_assignments(&self) -> Result<Vec<Assignment>, Problem> {
        let mut cursor = self
            .collection::<Assignment>(ASSIGNMENT_COLLECTION_NAME)
            .find(None, None)
            .await?;

        let mut assignments = Vec::new();
        while let Some(next) = cursor.next().await {
            match next {
                Ok(assignment) => assignments.push(assignment),
                Err(_) => tracing::warn!("Unable to deserialize Assignment document."),
            }
        }

        Ok(assignments)
    }

    async fn get_assignment(&self, id: Uuid) -> Result<Option<Assignment>, Problem> {
        self.collection(ASSIGNMENT_COLLECTION_NAME)
            .find_one(filter::by_id(id), None)
            .await
            .map_err(Problem::from)
    }

    async fn create_assignment(&self, assignment: &Assignment) -> Result<Uuid, Problem> {
        self.collection::<Assignment>(ASSIGNMENT_COLLECTION_NAME)
            .insert_one(assignment, None)
            .await?;

        Ok(assignment.id)
    }

    async fn replace_assignment(
        &self,
        id: Uuid,
        assignment: Assignment,
    ) -> Result<ReplaceOutcome, Problem> {
        let result = self
            .collection::<Assignment>(ASSIGNMENT_COLLECTION_NAME)
            .update_one(
                filter::by_id(id),
                replacement_update(&assignment)?,
                upsert_options(),
            )
            .await?;

        Ok(ReplaceOutcome::from_update(id, result))
    }

    async fn delete_assignment(&self, id: Uuid, caller_email: &str) -> Result<Uuid, Problem> {
        let assignment = self
            .get_assignment(id)
            .await?
            .ok_or_else(|| problem::not_found(id))?;

        authorize_owner(&assignment, caller_email)?;

        let result = self
            .collection::<Assignment>(ASSIGNMENT_COLLECTION_NAME)
            .delete_one(filter::by_id(id), None)
            .await?;

        if result.deleted_count == 0 {
            return Err(problem::delete_failed(id));
        }

        Ok(id)
    }
}

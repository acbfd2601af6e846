use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::{Cursor, Database};
use rocket::futures::StreamExt;
use uuid::Uuid;

use super::{Submission, SUBMISSION_COLLECTION_NAME};
use crate::data::{replacement_update, upsert_options, ReplaceOutcome};
use crate::resp::problem::Problem;

pub mod problem {
    use crate::data::submission::SubmissionStatus;
    use crate::resp::problem::{ErrorCode, Problem};
    use uuid::Uuid;

    #[inline]
    pub fn invalid_transition(from: SubmissionStatus, to: SubmissionStatus) -> Problem {
        Problem::new(
            ErrorCode::InvalidTransition,
            "Submission status transition not allowed.",
        )
        .insert_str("from", from)
        .insert_str("to", to)
        .clone()
    }

    #[inline]
    pub fn replace_raced(id: Uuid) -> Problem {
        Problem::new(
            ErrorCode::Internal,
            "Submission changed while being replaced.",
        )
        .insert_str("id", id)
        .clone()
    }
}

pub mod filter {
    use bson::{doc, Document};
    use uuid::Uuid;

    use crate::data::submission::SubmissionStatus;

    /// Submissions belonging to the caller.
    #[inline]
    pub fn by_user_email(email: &str) -> Document {
        doc! { "user_email": email }
    }

    /// Pending submissions from everyone except the caller.
    #[inline]
    pub fn pending_excluding(email: &str) -> Document {
        doc! {
            "status": SubmissionStatus::Pending.to_string(),
            "user_email": { "$ne": email },
        }
    }

    /// Submissions handed in for one assignment.
    #[inline]
    pub fn by_assignment(assignment_id: Uuid) -> Document {
        doc! { "assignment_id": assignment_id.to_string() }
    }

    /// Record under replacement: the id, holding a status that may become
    /// `next`. With upsert enabled an unused id creates the record, while an
    /// id held by a disallowed status matches nothing and the insert attempt
    /// collides with the existing `_id`.
    #[inline]
    pub fn replaceable(id: Uuid, next: SubmissionStatus) -> Document {
        let sources: Vec<String> = next
            .allowed_sources()
            .iter()
            .map(ToString::to_string)
            .collect();

        doc! {
            "_id": crate::data::filter::uuid_bson(id),
            "status": { "$in": sources },
        }
    }
}

pub trait SubmissionDbExt {
    async fn list_submissions_for(&self, email: &str) -> Result<Vec<Submission>, Problem>;

    async fn list_pending_excluding(&self, email: &str) -> Result<Vec<Submission>, Problem>;

    async fn list_submissions_for_assignment(
        &self,
        assignment_id: Uuid,
    ) -> Result<Vec<Submission>, Problem>;

    async fn create_submission(&self, submission: &Submission) -> Result<Uuid, Problem>;

    /// Upsert by design, but an existing record only accepts status changes
    /// allowed by [`SubmissionStatus::can_transition_to`]. The rule lives in
    /// the update filter, so the store enforces it in a single operation.
    ///
    /// [`SubmissionStatus::can_transition_to`]: super::SubmissionStatus::can_transition_to
    async fn replace_submission(
        &self,
        id: Uuid,
        submission: Submission,
    ) -> Result<ReplaceOutcome, Problem>;
}

async fn collect(mut cursor: Cursor<Submission>) -> Vec<Submission> {
    let mut submissions = Vec::new();
    while let Some(next) = cursor.next().await {
        match next {
            Ok(submission) => submissions.push(submission),
            Err(_) => tracing::warn!("Unable to deserialize Submission document."),
        }
    }

    submissions
}

impl SubmissionDbExt for Database {
    async fn list_submissions_for(&self, email: &str) -> Result<Vec<Submission>, Problem> {
        let cursor = self
            .collection::<Submission>(SUBMISSION_COLLECTION_NAME)
            .find(filter::by_user_email(email), None)
            .await?;

        Ok(collect(cursor).await)
    }

    async fn list_pending_excluding(&self, email: &str) -> Result<Vec<Submission>, Problem> {
        let cursor = self
            .collection::<Submission>(SUBMISSION_COLLECTION_NAME)
            .find(filter::pending_excluding(email), None)
            .await?;

        Ok(collect(cursor).await)
    }

    async fn list_submissions_for_assignment(
        &self,
        assignment_id: Uuid,
    ) -> Result<Vec<Submission>, Problem> {
        let cursor = self
            .collection::<Submission>(SUBMISSION_COLLECTION_NAME)
            .find(filter::by_assignment(assignment_id), None)
            .await?;

        Ok(collect(cursor).await)
    }

    async fn create_submission(&self, submission: &Submission) -> Result<Uuid, Problem> {
        self.collection::<Submission>(SUBMISSION_COLLECTION_NAME)
            .insert_one(submission, None)
            .await?;

        Ok(submission.id)
    }

    async fn replace_submission(
        &self,
        id: Uuid,
        submission: Submission,
    ) -> Result<ReplaceOutcome, Problem> {
        let result = self
            .collection::<Submission>(SUBMISSION_COLLECTION_NAME)
            .update_one(
                filter::replaceable(id, submission.status),
                replacement_update(&submission)?,
                upsert_options(),
            )
            .await;

        match result {
            Ok(result) => Ok(ReplaceOutcome::from_update(id, result)),
            // A duplicate key here means the id exists with a status the
            // filter excluded, so the forbidden transition caused the clash.
            Err(error) if is_duplicate_key(&error) => {
                let existing: Option<Submission> = self
                    .collection(SUBMISSION_COLLECTION_NAME)
                    .find_one(crate::data::filter::by_id(id), None)
                    .await?;

                match existing {
                    Some(current) => Err(problem::invalid_transition(
                        current.status,
                        submission.status,
                    )),
                    None => Err(problem::replace_raced(id)),
                }
            }
            Err(error) => Err(error.into()),
        }
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    match *error.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) => write_error.code == 11000,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::submission::SubmissionStatus;
    use crate::resp::problem::ErrorCode;
    use bson::Bson;
    use rocket::http::Status;

    #[test]
    fn own_submissions_filter_matches_exact_email() {
        let filter = filter::by_user_email("a@x.com");

        assert_eq!(filter.get_str("user_email").unwrap(), "a@x.com");
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn pending_filter_excludes_caller() {
        let filter = filter::pending_excluding("a@x.com");

        assert_eq!(filter.get_str("status").unwrap(), "Pending");
        assert_eq!(
            filter.get_document("user_email").unwrap().get("$ne"),
            Some(&Bson::String(String::from("a@x.com")))
        );
    }

    #[test]
    fn assignment_filter_uses_recorded_reference() {
        let id = Uuid::new_v4();
        let filter = filter::by_assignment(id);

        assert_eq!(filter.get_str("assignment_id").unwrap(), id.to_string());
    }

    #[test]
    fn replace_filter_restricts_source_statuses() {
        let id = Uuid::new_v4();
        let filter = filter::replaceable(id, SubmissionStatus::Completed);

        assert!(matches!(filter.get("_id"), Some(Bson::Binary(_))));
        let sources = filter
            .get_document("status")
            .unwrap()
            .get_array("$in")
            .unwrap();
        assert_eq!(
            sources,
            &vec![
                Bson::String(String::from("Pending")),
                Bson::String(String::from("Completed")),
            ]
        );
    }

    #[test]
    fn replace_into_pending_only_matches_pending() {
        let filter = filter::replaceable(Uuid::new_v4(), SubmissionStatus::Pending);

        let sources = filter
            .get_document("status")
            .unwrap()
            .get_array("$in")
            .unwrap();
        assert_eq!(sources, &vec![Bson::String(String::from("Pending"))]);
    }

    #[test]
    fn invalid_transition_is_a_conflict() {
        let problem =
            problem::invalid_transition(SubmissionStatus::Completed, SubmissionStatus::Pending);

        assert_eq!(problem.status, Status::Conflict);
        assert_eq!(problem.code, ErrorCode::InvalidTransition);
    }
}

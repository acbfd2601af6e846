use mongodb::Database;
use rocket::serde::json::Json;
use rocket::State;
use uuid::Uuid;

use crate::data::submission::db::SubmissionDbExt;
use crate::data::submission::Submission;
use crate::data::{InsertOutcome, ReplaceOutcome};
use crate::resp::jwt::AccessToken;
use crate::resp::problem::Problem;

/// Submissions belonging to the authenticated caller.
#[get("/submissions")]
#[tracing::instrument(skip(db))]
pub async fn submission_list_own(
    auth: AccessToken,
    db: &State<Database>,
) -> Result<Json<Vec<Submission>>, Problem> {
    Ok(Json(db.list_submissions_for(&auth.email).await?))
}

/// Pending submissions from other users, for review.
#[get("/submissions/pending")]
#[tracing::instrument(skip(db))]
pub async fn submission_list_pending(
    auth: AccessToken,
    db: &State<Database>,
) -> Result<Json<Vec<Submission>>, Problem> {
    Ok(Json(db.list_pending_excluding(&auth.email).await?))
}

/// All submissions handed in for one assignment.
#[get("/submissions/<id>")]
#[tracing::instrument(skip(db))]
pub async fn submission_list_for_assignment(
    id: Uuid,
    db: &State<Database>,
) -> Result<Json<Vec<Submission>>, Problem> {
    Ok(Json(db.list_submissions_for_assignment(id).await?))
}

#[post("/submissions", format = "application/json", data = "<submission>")]
#[tracing::instrument(skip(db))]
pub async fn submission_create(
    submission: Json<Submission>,
    db: &State<Database>,
) -> Result<Json<InsertOutcome>, Problem> {
    let inserted_id = db.create_submission(&submission.0).await?;

    Ok(Json(InsertOutcome { inserted_id }))
}

/// Replace a submission. Upsert by design; status changes on existing
/// records must follow the enforced transition rule.
#[put("/submissions/<id>", format = "application/json", data = "<submission>")]
#[tracing::instrument(skip(db))]
pub async fn submission_replace(
    id: Uuid,
    submission: Json<Submission>,
    db: &State<Database>,
) -> Result<Json<ReplaceOutcome>, Problem> {
    Ok(Json(db.replace_submission(id, submission.into_inner()).await?))
}

///////////////////////
//       TESTS
///////////////////////

#[cfg(test)]
mod submission_endpoints {
    use mongodb::Client as MongoClient;
    use rocket::http::Status;
    use rocket::local::asynchronous::Client;

    use crate::config::Config;
    use crate::resp::jwt::AccessToken;

    static TEST_SECRET: &str = "submission-endpoint-test-secret";

    fn test_config() -> Config {
        let mut c = Config::default();
        c.token_secret = String::from(TEST_SECRET);
        c.production = false;
        c
    }

    // The handle is lazy; nothing is contacted unless a handler runs a query.
    async fn test_rocket() -> rocket::Rocket<rocket::Build> {
        let db = MongoClient::with_uri_str("mongodb://127.0.0.1:27017")
            .await
            .expect("valid mongodb uri")
            .database("studyhive_test");

        rocket::build().manage(test_config()).manage(db).mount(
            "/",
            rocket::routes![super::submission_list_own, super::submission_list_pending],
        )
    }

    #[rocket::async_test]
    async fn own_submissions_require_credential() {
        let client = Client::tracked(test_rocket().await)
            .await
            .expect("valid rocket");

        let response = client.get("/submissions").dispatch().await;

        assert_eq!(
            response.status(),
            Status::Unauthorized,
            "expected unauthorized response"
        );
    }

    #[rocket::async_test]
    async fn pending_submissions_require_credential() {
        let client = Client::tracked(test_rocket().await)
            .await
            .expect("valid rocket");

        let response = client.get("/submissions/pending").dispatch().await;

        assert_eq!(
            response.status(),
            Status::Unauthorized,
            "expected unauthorized response"
        );
    }

    #[rocket::async_test]
    async fn expired_credential_is_rejected() {
        let client = Client::tracked(test_rocket().await)
            .await
            .expect("valid rocket");

        let cookie = AccessToken::expired("a@x.com")
            .cookie(TEST_SECRET, false)
            .expect("cookie encoding should work");

        let response = client.get("/submissions").cookie(cookie).dispatch().await;

        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn forged_credential_is_rejected() {
        let client = Client::tracked(test_rocket().await)
            .await
            .expect("valid rocket");

        // Signed with a different secret than the server holds.
        let cookie = AccessToken::new("a@x.com")
            .cookie("not-the-server-secret", false)
            .expect("cookie encoding should work");

        let response = client.get("/submissions").cookie(cookie).dispatch().await;

        assert_eq!(response.status(), Status::Unauthorized);
    }
}

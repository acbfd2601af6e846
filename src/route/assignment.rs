use mongodb::Database;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;
use uuid::Uuid;

use crate::data::assignment::db::AssignmentDbExt;
use crate::data::assignment::Assignment;
use crate::data::{DeleteOutcome, InsertOutcome, ReplaceOutcome};
use crate::resp::jwt::AccessToken;
use crate::resp::problem::Problem;

/// List all assignments.
#[get("/assignments")]
#[tracing::instrument(skip(db))]
pub async fn assignment_list(db: &State<Database>) -> Result<Json<Vec<Assignment>>, Problem> {
    Ok(Json(db.list_assignments().await?))
}

#[get("/assignments/<id>")]
#[tracing::instrument(skip(db))]
pub async fn assignment_get(
    id: Uuid,
    db: &State<Database>,
) -> Result<Option<Json<Assignment>>, Problem> {
    Ok(db.get_assignment(id).await?.map(Json))
}

/// Create an assignment. Intentionally unguarded; ownership only gates
/// deletion.
#[post("/assignments", format = "application/json", data = "<assignment>")]
#[tracing::instrument(skip(db))]
pub async fn assignment_create(
    assignment: Json<Assignment>,
    db: &State<Database>,
) -> Result<Created<Json<InsertOutcome>>, Problem> {
    let inserted_id = db.create_assignment(&assignment.0).await?;

    let location = format!("/assignments/{}", inserted_id);
    Ok(Created::new(location).body(Json(InsertOutcome { inserted_id })))
}

/// Replace an assignment. Upsert by design: an unused id creates the record.
#[put("/assignments/<id>", format = "application/json", data = "<assignment>")]
#[tracing::instrument(skip(db))]
pub async fn assignment_replace(
    id: Uuid,
    assignment: Json<Assignment>,
    db: &State<Database>,
) -> Result<Json<ReplaceOutcome>, Problem> {
    Ok(Json(db.replace_assignment(id, assignment.into_inner()).await?))
}

/// Delete an assignment. The caller identity comes from the verified
/// credential and must match the recorded creator.
#[delete("/assignments/<id>")]
#[tracing::instrument(skip(db))]
pub async fn assignment_delete(
    id: Uuid,
    auth: AccessToken,
    db: &State<Database>,
) -> Result<Json<DeleteOutcome>, Problem> {
    let deleted_id = db.delete_assignment(id, &auth.email).await?;

    Ok(Json(DeleteOutcome { deleted_id }))
}

///////////////////////
//       TESTS
///////////////////////

#[cfg(test)]
mod assignment_endpoints {
    use mongodb::Client as MongoClient;
    use rocket::http::Status;
    use rocket::local::asynchronous::Client;

    use crate::config::Config;
    use crate::resp::jwt::AccessToken;

    static TEST_SECRET: &str = "assignment-endpoint-test-secret";

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

        rocket::build()
            .manage(test_config())
            .manage(db)
            .mount("/", rocket::routes![super::assignment_delete])
    }

    #[rocket::async_test]
    async fn delete_requires_credential() {
        let client = Client::tracked(test_rocket().await)
            .await
            .expect("valid rocket");

        let uri = format!("/assignments/{}", uuid::Uuid::new_v4());
        let response = client.delete(uri).dispatch().await;

        assert_eq!(
            response.status(),
            Status::Unauthorized,
            "expected unauthorized response"
        );
    }

    #[rocket::async_test]
    async fn delete_rejects_expired_credential() {
        let client = Client::tracked(test_rocket().await)
            .await
            .expect("valid rocket");

        let cookie = AccessToken::expired("a@x.com")
            .cookie(TEST_SECRET, false)
            .expect("cookie encoding should work");

        let uri = format!("/assignments/{}", uuid::Uuid::new_v4());
        let response = client.delete(uri).cookie(cookie).dispatch().await;

        assert_eq!(response.status(), Status::Unauthorized);
    }
}

use mongodb::Database;
use rocket::serde::json::Json;
use rocket::State;

use crate::data::testimonial::db::TestimonialDbExt;
use crate::data::testimonial::Testimonial;
use crate::data::InsertOutcome;
use crate::resp::problem::Problem;

/// List all testimonials.
#[get("/testimonial")]
#[tracing::instrument(skip(db))]
pub async fn testimonial_list(db: &State<Database>) -> Result<Json<Vec<Testimonial>>, Problem> {
    Ok(Json(db.list_testimonials().await?))
}

#[post("/testimonial", format = "application/json", data = "<testimonial>")]
#[tracing::instrument(skip(db))]
pub async fn testimonial_create(
    testimonial: Json<Testimonial>,
    db: &State<Database>,
) -> Result<Json<InsertOutcome>, Problem> {
    let inserted_id = db.create_testimonial(&testimonial.0).await?;

    Ok(Json(InsertOutcome { inserted_id }))
}

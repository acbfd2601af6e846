use mongodb::Database;
use rocket::futures::StreamExt;
use uuid::Uuid;

use super::{Testimonial, TESTIMONIAL_COLLECTION_NAME};
use crate::resp::problem::Problem;

pub trait TestimonialDbExt {
    async fn list_testimonials(&self) -> Result<Vec<Testimonial>, Problem>;

    async fn create_testimonial(&self, testimonial: &Testimonial) -> Result<Uuid, Problem>;
}

impl TestimonialDbExt for Database {
    async fn list_testimonials(&self) -> Result<Vec<Testimonial>, Problem> {
        let mut cursor = self
            .collection::<Testimonial>(TESTIMONIAL_COLLECTION_NAME)
            .find(None, None)
            .await?;

        let mut testimonials = Vec::new();
        while let Some(next) = cursor.next().await {
            match next {
                Ok(testimonial) => testimonials.push(testimonial),
                Err(_) => tracing::warn!("Unable to deserialize Testimonial document."),
            }
        }

        Ok(testimonials)
    }

    async fn create_testimonial(&self, testimonial: &Testimonial) -> Result<Uuid, Problem> {
        self.collection::<Testimonial>(TESTIMONIAL_COLLECTION_NAME)
            .insert_one(testimonial, None)
            .await?;

        Ok(testimonial.id)
    }
}

use rocket::http::Status;
use rocket::{Build, Rocket, Route};

use crate::resp::problem::{problems, ErrorCode, Problem};

pub mod assignment;
pub mod auth;
pub mod status;
pub mod submission;
pub mod testimonial;

use assignment::*;
use auth::*;
use status::*;
use submission::*;
use testimonial::*;

// Catchers keep failures that never reach a handler (guard rejections,
// unmatched routes, malformed bodies) in the same problem+json shape.

#[catch(401)]
fn unauthorized_catcher() -> Problem {
    problems::unauthorized("Request requires a valid credential.")
}

#[catch(404)]
fn not_found_catcher() -> Problem {
    Problem::new(ErrorCode::NotFound, "Resource doesn't exist.")
}

#[catch(422)]
fn unprocessable_catcher() -> Problem {
    let mut problem = Problem::new(ErrorCode::BadRequest, "Request body was malformed.");
    problem.status = Status::UnprocessableEntity;
    problem
}

#[catch(500)]
fn internal_catcher() -> Problem {
    problems::internal("Unexpected error while handling the request.")
}

pub fn api() -> Vec<Route> {
    routes![
        token_issue,
        token_clear,
        assignment_list,
        assignment_get,
        assignment_create,
        assignment_replace,
        assignment_delete,
        testimonial_list,
        testimonial_create,
        submission_list_own,
        submission_list_pending,
        submission_list_for_assignment,
        submission_create,
        submission_replace,
        status_page,
    ]
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .register(
            "/",
            catchers![
                unauthorized_catcher,
                not_found_catcher,
                unprocessable_catcher,
                internal_catcher
            ],
        )
        .mount("/", api())
}

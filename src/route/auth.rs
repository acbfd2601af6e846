use rocket::http::CookieJar;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::resp::jwt::AccessToken;
use crate::resp::problem::{problems, Problem};

#[derive(Clone, Deserialize)]
pub struct TokenRequest {
    pub email: String,
}

// Recorded into tracing spans; keeps the claimed identity out of logs.
impl std::fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenRequest:<redacted>")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
}

/// Issue a credential cookie for the claimed identity. The claim is not
/// checked against any account store; identity here is the email itself.
#[post("/jwt", format = "application/json", data = "<user>")]
#[tracing::instrument(skip(cookies, c))]
pub fn token_issue(
    user: Json<TokenRequest>,
    cookies: &CookieJar<'_>,
    c: &State<Config>,
) -> Result<Json<AuthResponse>, Problem> {
    let token = AccessToken::new(&user.email);
    let cookie = token
        .cookie(&c.token_secret, c.production)
        .map_err(|_| problems::internal("Unable to sign access token."))?;
    cookies.add(cookie);

    Ok(Json(AuthResponse { success: true }))
}

/// Clear the credential cookie. Idempotent; succeeds with or without one.
#[post("/logout")]
#[tracing::instrument(skip(cookies, c))]
pub fn token_clear(cookies: &CookieJar<'_>, c: &State<Config>) -> Json<AuthResponse> {
    cookies.remove(AccessToken::removal_cookie(c.production));

    Json(AuthResponse { success: true })
}

///////////////////////
//       TESTS
///////////////////////

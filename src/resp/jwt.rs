use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::outcome::Outcome::{Error, Success};
use rocket::request::{self, FromRequest, Request};
use rocket::time::OffsetDateTime;
use serde::{Deserialize, Serialize};

use super::util::date_time_as_unix_seconds;
use crate::config::Config;
use crate::resp::problem::{problems, Problem};

pub static AUTH_COOKIE_NAME: &str = "token";

/// Validity window of an issued credential.
pub const TOKEN_LIFETIME_HOURS: i64 = 10;

/// Signed identity claim carried in the credential cookie. No session state
/// is kept server-side; the decoded claims live only for the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    #[serde(with = "date_time_as_unix_seconds")]
    iat: DateTime<Utc>,
    #[serde(with = "date_time_as_unix_seconds")]
    exp: DateTime<Utc>,
    pub email: String,
}

impl AccessToken {
    pub fn new(email: impl ToString) -> AccessToken {
        let now = Utc::now();
        AccessToken {
            iat: now,
            exp: now + Duration::hours(TOKEN_LIFETIME_HOURS),
            email: email.to_string(),
        }
    }

    pub fn encode_jwt(
        &self,
        secret: impl AsRef<[u8]>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(secret.as_ref());

        encode(&header, &self, &key)
    }

    /// Credential cookie. Development deployments keep SameSite strict; in
    /// production the frontend lives on another origin, so the cookie must be
    /// cross-site capable and secure.
    pub fn cookie(
        &self,
        secret: impl AsRef<[u8]>,
        production: bool,
    ) -> Result<Cookie<'static>, jsonwebtoken::errors::Error> {
        Ok(Cookie::build((AUTH_COOKIE_NAME, self.encode_jwt(secret)?))
            .http_only(true)
            .secure(production)
            .same_site(same_site_policy(production))
            .expires(OffsetDateTime::from_unix_timestamp(self.exp.timestamp()).ok())
            .path("/")
            .build())
    }

    /// Cookie with matching attributes used to clear the credential.
    pub fn removal_cookie(production: bool) -> Cookie<'static> {
        Cookie::build(AUTH_COOKIE_NAME)
            .http_only(true)
            .secure(production)
            .same_site(same_site_policy(production))
            .path("/")
            .build()
    }
}

#[cfg(test)]
impl AccessToken {
    /// Token whose validity window is already over.
    pub fn expired(email: impl ToString) -> AccessToken {
        let now = Utc::now();
        AccessToken {
            iat: now - Duration::hours(12),
            exp: now - Duration::hours(2),
            email: email.to_string(),
        }
    }
}

fn same_site_policy(production: bool) -> SameSite {
    if production {
        SameSite::None
    } else {
        SameSite::Strict
    }
}

pub fn extract_claims(
    cookies: &CookieJar,
    secret: impl AsRef<[u8]>,
) -> Result<AccessToken, Problem> {
    let auth_cookie = cookies.get(AUTH_COOKIE_NAME);
    let token = match auth_cookie {
        Some(jwt) => jwt.value().to_owned(),
        None => {
            return Err(problems::unauthorized("No credential cookie."));
        }
    };
    tracing::debug!("extracted credential from cookie");

    match decode::<AccessToken>(
        &token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    {
        Ok(it) => {
            tracing::debug!("decoded access token for: {}", it.email);

            Ok(it)
        }
        Err(e) => Err(Problem::from(e)),
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AccessToken {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let config: &Config = match req.rocket().state() {
            Some(it) => it,
            None => {
                return Error((
                    Status::InternalServerError,
                    problems::internal("Server configuration missing."),
                ))
            }
        };

        tracing::trace!("extracting access token from request cookies");
        match extract_claims(req.cookies(), &config.token_secret) {
            Ok(it) => Success(it),
            Err(e) => {
                tracing::debug!("unable to extract claims from cookies");
                Error((Status::Unauthorized, e))
            }
        }
    }
}

pub trait HasAuthCookie {
    fn get_auth_cookie(&self, secret: impl AsRef<[u8]>) -> Option<AccessToken>;
}

#[cfg(test)]
impl HasAuthCookie for rocket::local::asynchronous::LocalResponse<'_> {
    fn get_auth_cookie(&self, secret: impl AsRef<[u8]>) -> Option<AccessToken> {
        extract_claims(self.cookies(), secret).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::SubsecRound;

    static TEST_SECRET: &[u8] = b"access-token-test-secret";

    #[test]
    fn token_round_trips() {
        let now = Utc::now().round_subsecs(0);

        let token = AccessToken {
            iat: now,
            exp: now + Duration::hours(TOKEN_LIFETIME_HOURS),
            email: String::from("a@x.com"),
        };

        let encoded = token.encode_jwt(TEST_SECRET).expect("encoding should work");

        let decoded: AccessToken = decode(
            &encoded,
            &DecodingKey::from_secret(TEST_SECRET),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .expect("decoding an untampered token should work");

        assert_eq!(now, decoded.iat);
        assert_eq!(now + Duration::hours(TOKEN_LIFETIME_HOURS), decoded.exp);
        assert_eq!(decoded.email, "a@x.com");
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = AccessToken::expired("a@x.com");
        let encoded = token.encode_jwt(TEST_SECRET).expect("encoding should work");

        let result = decode::<AccessToken>(
            &encoded,
            &DecodingKey::from_secret(TEST_SECRET),
            &Validation::new(Algorithm::HS256),
        );

        assert!(result.is_err(), "token past its expiry must not decode");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = AccessToken::new("a@x.com");
        let encoded = token.encode_jwt(TEST_SECRET).expect("encoding should work");

        let result = decode::<AccessToken>(
            &encoded,
            &DecodingKey::from_secret(b"some-other-secret"),
            &Validation::new(Algorithm::HS256),
        );

        assert!(result.is_err(), "signature must be checked");
    }

    #[test]
    fn cookie_attributes_follow_environment() {
        let token = AccessToken::new("a@x.com");

        let dev = token
            .cookie(TEST_SECRET, false)
            .expect("cookie encoding should work");
        assert_eq!(dev.same_site(), Some(SameSite::Strict));
        assert_eq!(dev.secure(), Some(false));
        assert_eq!(dev.http_only(), Some(true));
        assert_eq!(dev.path(), Some("/"));

        let prod = token
            .cookie(TEST_SECRET, true)
            .expect("cookie encoding should work");
        assert_eq!(prod.same_site(), Some(SameSite::None));
        assert_eq!(prod.secure(), Some(true));
        assert_eq!(prod.http_only(), Some(true));
    }
}

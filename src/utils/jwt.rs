use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> AppResult<i64> {
        self.sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthenticated("Invalid token subject".to_string()))
    }
}

/// HS256 bearer tokens. Tokens are issued by the identity service; this side
/// only verifies them (`issue` exists for tooling and tests).
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user_id: i64, ttl_seconds: i64) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_round_trips_user_id() {
        let jwt = JwtService::new("secret");
        let token = jwt.issue(42, 60).unwrap();
        let claims = jwt.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = JwtService::new("one").issue(1, 60).unwrap();
        assert!(matches!(
            JwtService::new("two").verify(&token),
            Err(AppError::JwtError(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = JwtService::new("secret");
        // 超过默认 60 秒容差
        let token = jwt.issue(1, -3600).unwrap();
        assert!(jwt.verify(&token).is_err());
    }
}

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_seconds: i64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_seconds: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_seconds,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    system: bool,
    service: Option<String>,
    exp: i64,
    iat: i64,
}

pub fn encode_token(
    user_id: &Uuid,
    email: &str,
    service_name: Option<&str>,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        system: service_name.is_some(),
        service: service_name.map(str::to_string),
        exp: now + config.expiration_seconds,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

pub struct DecodedToken {
    pub user_id: Uuid,
    pub email: String,
    pub is_system_user: bool,
    pub service_name: Option<String>,
}

pub fn decode_token(token: &str, config: &JwtConfig) -> Result<DecodedToken, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;

    let user_id = Uuid::parse_str(&data.claims.sub)
        .map_err(|_| jsonwebtoken::errors::ErrorKind::InvalidSubject)?;

    Ok(DecodedToken {
        user_id,
        email: data.claims.email,
        is_system_user: data.claims.system,
        service_name: data.claims.service,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_claims() {
        let config = JwtConfig::new("test-secret", 3600);
        let user_id = Uuid::new_v4();
        let token = encode_token(&user_id, "alice@example.com", None, &config).unwrap();

        let decoded = decode_token(&token, &config).unwrap();
        assert_eq!(decoded.user_id, user_id);
        assert_eq!(decoded.email, "alice@example.com");
        assert!(!decoded.is_system_user);
    }

    #[test]
    fn system_caller_claims_carry_service_name() {
        let config = JwtConfig::new("test-secret", 3600);
        let user_id = Uuid::new_v4();
        let token = encode_token(&user_id, "worker-a@system.internal", Some("worker-a"), &config).unwrap();

        let decoded = decode_token(&token, &config).unwrap();
        assert!(decoded.is_system_user);
        assert_eq!(decoded.service_name.as_deref(), Some("worker-a"));
    }

    #[test]
    fn decoding_with_wrong_secret_fails() {
        let config = JwtConfig::new("test-secret", 3600);
        let other = JwtConfig::new("other-secret", 3600);
        let token = encode_token(&Uuid::new_v4(), "alice@example.com", None, &config).unwrap();

        assert!(decode_token(&token, &other).is_err());
    }
}

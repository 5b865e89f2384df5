use super::model::{AuthenticatedUser, Role};
use crate::core::config::AuthConfig;
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub struct JwtValidator {
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    leeway: u64,
}

/// Access token claims issued by the external auth provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taman_kehati_id: Option<i32>,
    pub exp: u64,
}

impl JwtValidator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            algorithm: config.algorithm,
            leeway: config.jwt_leeway.as_secs(),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Unauthorized(e.to_string()))?;

        // Reject algorithm confusion (e.g. "none" or asymmetric algs)
        if header.alg != self.algorithm {
            return Err(AppError::Unauthorized(format!(
                "Unsupported algorithm: {:?}. Only {:?} is allowed",
                header.alg, self.algorithm
            )));
        }

        let mut validation = Validation::new(self.algorithm);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(e.to_string()))?;

        let claims = token_data.claims;
        let role: Role = claims.role.parse()?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            email: claims.email,
            role,
            taman_kehati_id: claims.taman_kehati_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::Duration;

    const SECRET: &str = "test-secret-for-taman-kehati";

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: SECRET.to_string(),
            algorithm: Algorithm::HS256,
            jwt_leeway: Duration::from_secs(0),
        }
    }

    fn token_for(role: &str, exp: u64, secret: &str) -> String {
        let claims = Claims {
            sub: Uuid::now_v7(),
            email: "admin@kehati.test".to_string(),
            role: role.to_string(),
            taman_kehati_id: Some(3),
            exp,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> u64 {
        (chrono::Utc::now().timestamp() + 3600) as u64
    }

    #[test]
    fn test_valid_token() {
        let validator = JwtValidator::new(&config());
        let user = validator
            .validate_token(&token_for("admin_taman", future_exp(), SECRET))
            .unwrap();
        assert_eq!(user.role, Role::AdminTaman);
        assert_eq!(user.taman_kehati_id, Some(3));
        assert_eq!(user.email, "admin@kehati.test");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let validator = JwtValidator::new(&config());
        let result = validator.validate_token(&token_for("viewer", future_exp(), "other"));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let validator = JwtValidator::new(&config());
        let expired = (chrono::Utc::now().timestamp() - 3600) as u64;
        let result = validator.validate_token(&token_for("viewer", expired, SECRET));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let validator = JwtValidator::new(&config());
        let result = validator.validate_token(&token_for("gardener", future_exp(), SECRET));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let validator = JwtValidator::new(&AuthConfig {
            algorithm: Algorithm::HS512,
            ..config()
        });
        let result = validator.validate_token(&token_for("viewer", future_exp(), SECRET));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        let validator = JwtValidator::new(&config());
        assert!(validator.validate_token("not-a-jwt").is_err());
    }
}

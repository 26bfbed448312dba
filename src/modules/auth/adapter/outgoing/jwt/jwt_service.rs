use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use std::fmt;
use uuid::Uuid;

use crate::auth::application::ports::outgoing::token_provider::{
    TokenClaims, TokenError, TokenProvider,
};

use super::jwt_config::JwtConfig;

const ACCESS_TOKEN_TYPE: &str = "access";

#[derive(Clone)]
pub struct JwtTokenService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

#[cfg(not(tarpaulin_include))]
impl fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("issuer", &self.config.issuer)
            .finish()
    }
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;
        validation.validate_nbf = true;
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);
        validation
    }

    fn decode_claims(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation())
            .map(|decoded| decoded.claims)
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;

                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Token verification failed: token expired");
                        TokenError::TokenExpired
                    }
                    ErrorKind::ImmatureSignature => {
                        tracing::warn!("Token verification failed: token not yet valid");
                        TokenError::TokenNotYetValid
                    }
                    ErrorKind::InvalidSignature => {
                        tracing::error!("Security alert: invalid token signature detected");
                        TokenError::InvalidSignature
                    }
                    ErrorKind::InvalidIssuer => {
                        tracing::warn!("Token verification failed: unexpected issuer");
                        TokenError::InvalidIssuer
                    }
                    ErrorKind::InvalidToken | ErrorKind::InvalidAlgorithm => {
                        tracing::error!("Security alert: malformed or wrong-algorithm token");
                        TokenError::MalformedToken
                    }
                    _ => {
                        tracing::warn!(error = %e, "Token verification failed");
                        TokenError::MalformedToken
                    }
                }
            })
    }
}

impl TokenProvider for JwtTokenService {
    fn generate_access_token(&self, user_id: Uuid) -> Result<String, TokenError> {
        let now = Utc::now();
        let expiration = now + Duration::seconds(self.config.access_token_expiry);

        let claims = TokenClaims {
            sub: user_id,
            iss: self.config.issuer.clone(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingError(e.to_string()))
    }

    fn verify_access_token(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let claims = self.decode_claims(token)?;

        if claims.token_type != ACCESS_TOKEN_TYPE {
            tracing::warn!(
                token_type = %claims.token_type,
                "Token type mismatch, expected access"
            );
            return Err(TokenError::InvalidTokenType(ACCESS_TOKEN_TYPE.to_string()));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-test-secret-test-secret!";

    fn config(issuer: &str, expiry: i64) -> JwtConfig {
        JwtConfig {
            secret_key: SECRET.to_string(),
            issuer: issuer.to_string(),
            access_token_expiry: expiry,
        }
    }

    fn service() -> JwtTokenService {
        JwtTokenService::new(config("reviews-api", 3600))
    }

    fn sign(service: &JwtTokenService, claims: &TokenClaims) -> String {
        encode(&Header::new(Algorithm::HS256), claims, &service.encoding_key).unwrap()
    }

    fn claims_for(user_id: Uuid, token_type: &str) -> TokenClaims {
        let now = Utc::now().timestamp();
        TokenClaims {
            sub: user_id,
            iss: "reviews-api".to_string(),
            exp: now + 3600,
            iat: now,
            nbf: now,
            token_type: token_type.to_string(),
        }
    }

    #[test]
    fn generate_and_verify_access_token() {
        let service = service();
        let user_id = Uuid::new_v4();

        let token = service.generate_access_token(user_id).unwrap();
        let claims = service.verify_access_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "reviews-api");
        assert_eq!(claims.token_type, "access");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn garbage_is_malformed() {
        let result = service().verify_access_token("invalid.jwt.token");

        assert_eq!(result.unwrap_err(), TokenError::MalformedToken);
    }

    #[test]
    fn expired_token() {
        // Beyond the 30 second leeway
        let service = JwtTokenService::new(config("reviews-api", -35));

        let token = service.generate_access_token(Uuid::new_v4()).unwrap();

        assert_eq!(
            service.verify_access_token(&token).unwrap_err(),
            TokenError::TokenExpired
        );
    }

    #[test]
    fn token_not_yet_valid() {
        let service = service();
        let mut claims = claims_for(Uuid::new_v4(), "access");
        claims.nbf += 600;

        let token = sign(&service, &claims);

        assert_eq!(
            service.verify_access_token(&token).unwrap_err(),
            TokenError::TokenNotYetValid
        );
    }

    #[test]
    fn foreign_secret_is_invalid_signature() {
        let token = service().generate_access_token(Uuid::new_v4()).unwrap();

        let other = JwtTokenService::new(JwtConfig {
            secret_key: format!("{}_DIFFERENT", SECRET),
            ..config("reviews-api", 3600)
        });

        assert_eq!(
            other.verify_access_token(&token).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let token = JwtTokenService::new(config("someone-else", 3600))
            .generate_access_token(Uuid::new_v4())
            .unwrap();

        assert_eq!(
            service().verify_access_token(&token).unwrap_err(),
            TokenError::InvalidIssuer
        );
    }

    #[test]
    fn non_access_token_type_is_rejected() {
        let service = service();
        let token = sign(&service, &claims_for(Uuid::new_v4(), "refresh"));

        match service.verify_access_token(&token) {
            Err(TokenError::InvalidTokenType(expected)) => assert_eq!(expected, "access"),
            other => panic!("Expected InvalidTokenType, got {:?}", other),
        }
    }

    #[test]
    fn tampered_token_fails() {
        let service = service();
        let mut token = service.generate_access_token(Uuid::new_v4()).unwrap();
        token.push('x');

        assert!(service.verify_access_token(&token).is_err());
    }
}

//! RS256 access tokens.
//!
//! Tokens are signed with the configured private key and verified against the
//! matching public key. Expiry is checked with zero leeway.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::domain::AccountUser;
use super::errors::TokenError;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id.
    pub sub: String,
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    pub admin: bool,
    pub iat: u64,
    pub exp: u64,
}

impl AccessClaims {
    pub fn for_user(user: &AccountUser, issued_at: u64, lifetime: Duration) -> Self {
        Self {
            sub: user.id.to_string(),
            given_name: user.first_name.clone(),
            family_name: user.last_name.clone(),
            email: user.email.clone(),
            admin: user.admin,
            iat: issued_at,
            exp: issued_at + lifetime.as_secs(),
        }
    }
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenService {
    /// Build from PEM documents (PKCS#1 or PKCS#8 private key, SPKI or
    /// PKCS#1 public key).
    pub fn from_pem(private_pem: &[u8], public_pem: &[u8], lifetime: Duration) -> Result<Self, TokenError> {
        let encoding = EncodingKey::from_rsa_pem(private_pem)
            .map_err(|e| TokenError::Key(format!("private key: {e}")))?;
        let decoding = DecodingKey::from_rsa_pem(public_pem)
            .map_err(|e| TokenError::Key(format!("public key: {e}")))?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;
        Ok(Self { encoding, decoding, validation, lifetime })
    }

    /// Build from base64-encoded PEM documents, as supplied through the
    /// `ACCESS_TOKEN_SECRET` / `PUBLIC_ACCESS_TOKEN_SECRET` settings.
    pub fn from_base64(private_b64: &str, public_b64: &str, lifetime: Duration) -> Result<Self, TokenError> {
        let private_pem = decode_b64(private_b64).map_err(|e| TokenError::Key(format!("private key: {e}")))?;
        let public_pem = decode_b64(public_b64).map_err(|e| TokenError::Key(format!("public key: {e}")))?;
        Self::from_pem(&private_pem, &public_pem, lifetime)
    }

    pub fn from_config(cfg: &configs::AuthConfig) -> Result<Self, TokenError> {
        let lifetime = cfg.token_lifetime().map_err(|e| TokenError::Key(e.to_string()))?;
        Self::from_base64(&cfg.access_token_secret, &cfg.public_access_token_secret, lifetime)
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Sign a fresh token for `user`, valid from now for the configured lifetime.
    pub fn issue(&self, user: &AccountUser) -> Result<String, TokenError> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        self.sign(&AccessClaims::for_user(user, now, self.lifetime))
    }

    pub fn sign(&self, claims: &AccessClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::RS256), claims, &self.encoding)
            .map_err(|e| TokenError::Sign(e.to_string()))
    }

    /// Check signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode::<AccessClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Rejected(e.to_string()))
    }
}

fn decode_b64(raw: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{foreign_tokens, sample_user, signing_tokens, SIGNING_PRIVATE_PEM, SIGNING_PUBLIC_PEM};

    fn now() -> u64 {
        chrono::Utc::now().timestamp() as u64
    }

    #[test]
    fn issued_token_round_trips_user_claims() {
        let tokens = signing_tokens(Duration::from_secs(3600));
        let user = sample_user();
        let token = tokens.issue(&user).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.given_name, "Ada");
        assert_eq!(claims.family_name, "Lovelace");
        assert_eq!(claims.email, "ada@example.com");
        assert!(!claims.admin);
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn header_declares_rs256() {
        let tokens = signing_tokens(Duration::from_secs(60));
        let token = tokens.issue(&sample_user()).unwrap();
        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
    }

    #[test]
    fn token_from_another_key_is_rejected() {
        let ours = signing_tokens(Duration::from_secs(3600));
        let theirs = foreign_tokens(Duration::from_secs(3600));
        let token = theirs.issue(&sample_user()).unwrap();
        assert!(matches!(ours.verify(&token), Err(TokenError::Rejected(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = signing_tokens(Duration::from_secs(3600));
        let issued = now() - 120;
        let claims = AccessClaims::for_user(&sample_user(), issued, Duration::from_secs(60));
        let token = tokens.sign(&claims).unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::Rejected(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        let tokens = signing_tokens(Duration::from_secs(3600));
        assert!(tokens.verify("").is_err());
        assert!(tokens.verify("not.a.token").is_err());
    }

    #[test]
    fn base64_keys_with_line_breaks_are_accepted() {
        let private_b64 = STANDARD.encode(SIGNING_PRIVATE_PEM);
        let public_b64 = STANDARD.encode(SIGNING_PUBLIC_PEM);
        let wrapped: String = private_b64
            .as_bytes()
            .chunks(76)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        let tokens = TokenService::from_base64(&wrapped, &public_b64, Duration::from_secs(60)).unwrap();
        let token = tokens.issue(&sample_user()).unwrap();
        tokens.verify(&token).unwrap();
    }

    #[test]
    fn unusable_key_material_is_reported() {
        let err = TokenService::from_base64("%%%", "cHVi", Duration::from_secs(60)).err().unwrap();
        assert!(matches!(err, TokenError::Key(_)));
        let err = TokenService::from_pem(b"nope", SIGNING_PUBLIC_PEM, Duration::from_secs(60)).err().unwrap();
        assert!(matches!(err, TokenError::Key(_)));
    }

    #[test]
    fn config_lifetime_is_applied() {
        let cfg = configs::AuthConfig {
            access_token_secret: STANDARD.encode(SIGNING_PRIVATE_PEM),
            public_access_token_secret: STANDARD.encode(SIGNING_PUBLIC_PEM),
            access_token_life: "15m".into(),
        };
        let tokens = TokenService::from_config(&cfg).unwrap();
        assert_eq!(tokens.lifetime(), Duration::from_secs(900));
    }
}

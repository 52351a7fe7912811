use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use super::identity::Identity;
use crate::{config::JwtConfig, state::AppState};

/// Lifetime of tokens minted by [`JwtKeys::sign`].
const TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::from(&state.config.jwt)
    }
}

impl From<&JwtConfig> for JwtKeys {
    fn from(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
        }
    }
}

impl JwtKeys {
    /// Mints a token for `identity`. Production tokens come from the identity
    /// provider; this serves tests and local tooling sharing the secret.
    pub fn sign(&self, identity: &Identity) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(TOKEN_TTL.as_secs() as i64);
        let claims = Claims {
            sub: identity.id,
            name: identity.display_name.clone(),
            email: identity.email.clone(),
            picture: identity.photo_ref.clone(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %identity.id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Identity> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::from(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
        })
    }

    #[test]
    fn sign_and_verify_round_trips_profile() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let identity = Identity {
            id: Uuid::new_v4(),
            display_name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            photo_ref: None,
        };
        let token = keys.sign(&identity).expect("sign");
        let verified = keys.verify(&token).expect("verify");
        assert_eq!(verified, identity);
    }

    #[test]
    fn blank_profile_fields_become_none() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let mut identity = Identity::anonymous(Uuid::new_v4());
        identity.display_name = Some("   ".into());
        let token = keys.sign(&identity).expect("sign");
        assert_eq!(keys.verify(&token).expect("verify").display_name, None);
    }

    #[test]
    fn verify_rejects_wrong_issuer_audience_or_secret() {
        let good = make_keys("same-secret", "good-iss", "good-aud");
        let token = good.sign(&Identity::anonymous(Uuid::new_v4())).expect("sign");

        assert!(make_keys("same-secret", "bad-iss", "good-aud").verify(&token).is_err());
        assert!(make_keys("same-secret", "good-iss", "bad-aud").verify(&token).is_err());
        assert!(make_keys("other-secret", "good-iss", "good-aud").verify(&token).is_err());
        assert!(good.verify("not-a-token").is_err());
    }
}

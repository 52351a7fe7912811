use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,              // user ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,   // display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>, // photo reference
    pub iat: usize,             // issued at (unix timestamp)
    pub exp: usize,             // expires at (unix timestamp)
    pub iss: String,            // issuer
    pub aud: String,            // audience
}

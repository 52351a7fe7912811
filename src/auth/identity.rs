use serde::Serialize;
use uuid::Uuid;

use super::claims::Claims;

/// The caller, as resolved from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_ref: Option<String>,
}

impl Identity {
    /// An identity carrying no profile data.
    pub fn anonymous(id: Uuid) -> Self {
        Self {
            id,
            display_name: None,
            email: None,
            photo_ref: None,
        }
    }
}

impl From<Claims> for Identity {
    fn from(c: Claims) -> Self {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            id: c.sub,
            display_name: non_blank(c.name),
            email: non_blank(c.email),
            photo_ref: non_blank(c.picture),
        }
    }
}

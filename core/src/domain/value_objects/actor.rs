//! Issuing actor value object.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who is asking the engine to issue a code
///
/// Threaded explicitly through issuance instead of being inferred from a
/// possibly-absent user reference. API callers have no user; UI-originated
/// calls carry the authenticated user's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    /// Internal maintenance and test paths
    System,
    /// A registered API application calling `/api/issue`
    ApiApp {
        /// Identifier of the calling application
        app_id: Uuid,
    },
    /// An authenticated human operator (case investigator UI)
    User {
        /// Identifier of the operator
        user_id: Uuid,
    },
}

impl Actor {
    /// The user id, when the actor is an authenticated operator
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Actor::User { user_id } => Some(*user_id),
            _ => None,
        }
    }

    /// The app id, when the actor is an API application
    pub fn app_id(&self) -> Option<Uuid> {
        match self {
            Actor::ApiApp { app_id } => Some(*app_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_accessors() {
        let user_id = Uuid::new_v4();
        let app_id = Uuid::new_v4();

        assert_eq!(Actor::User { user_id }.user_id(), Some(user_id));
        assert_eq!(Actor::User { user_id }.app_id(), None);
        assert_eq!(Actor::ApiApp { app_id }.app_id(), Some(app_id));
        assert_eq!(Actor::System.user_id(), None);
        assert_eq!(Actor::System.app_id(), None);
    }
}

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a person acting on the system.
pub type ActorId = Uuid;

/// The closed set of application roles.
///
/// Every workflow guard checks one of these explicitly; there is no
/// open-ended dispatch on a role string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    Supervisor,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Employee => write!(f, "employee"),
            Role::Supervisor => write!(f, "supervisor"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// An authenticated principal as supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: ActorId,
    pub email: String,
    pub role: Role,
}

/// Identity/role lookup consumed by the workflow engine.
///
/// Authentication itself happens elsewhere; the engine only ever sees an
/// `ActorId` and asks the directory who that is.
pub trait Directory: Send + Sync {
    fn lookup(&self, id: ActorId) -> Option<Principal>;

    fn role_of(&self, id: ActorId) -> Option<Role> {
        self.lookup(id).map(|p| p.role)
    }
}

/// Fixed in-memory directory. Suitable for tests and the embedded demo;
/// a deployment wires the real user database behind the same trait.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    users: HashMap<ActorId, Principal>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a principal and return its generated id.
    pub fn add(&mut self, email: &str, role: Role) -> ActorId {
        let id = Uuid::new_v4();
        self.users.insert(
            id,
            Principal {
                id,
                email: email.to_string(),
                role,
            },
        );
        id
    }
}

impl Directory for StaticDirectory {
    fn lookup(&self, id: ActorId) -> Option<Principal> {
        self.users.get(&id).cloned()
    }
}

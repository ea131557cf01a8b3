use serde::{Deserialize, Serialize};

use crate::model::User;

/// Where the data on screen comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataMode {
    /// Signed in; user and content come from the API.
    Authenticated,
    /// Anonymous; user and content come from local demo fixtures.
    Demo,
}

/// The current user together with the mode it was obtained in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    mode: DataMode,
    user: User,
}

impl Account {
    #[must_use]
    pub fn authenticated(user: User) -> Self {
        Self {
            mode: DataMode::Authenticated,
            user,
        }
    }

    #[must_use]
    pub fn demo() -> Self {
        Self::demo_with(User::anonymous())
    }

    /// Demo account carrying a caller-supplied user (e.g. a registration that
    /// returned no token).
    #[must_use]
    pub fn demo_with(user: User) -> Self {
        Self {
            mode: DataMode::Demo,
            user,
        }
    }

    #[must_use]
    pub fn mode(&self) -> DataMode {
        self.mode
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn into_user(self) -> User {
        self.user
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.mode == DataMode::Authenticated
    }
}

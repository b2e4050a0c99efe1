use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role of the signed-in operator.
///
/// Kept as an opaque string so roles the server introduces later still
/// deserialize; the two the console knows about have constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: &'static str = "admin";
    pub const SUB_ADMIN: &'static str = "sub-admin";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn admin() -> Self {
        Self(Cow::Borrowed(Self::ADMIN))
    }

    pub fn sub_admin() -> Self {
        Self(Cow::Borrowed(Self::SUB_ADMIN))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Admins are not restricted by the permission list.
    pub fn is_admin(&self) -> bool {
        self.as_str().eq_ignore_ascii_case(Self::ADMIN)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

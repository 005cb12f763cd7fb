//! Sign-in boundary.
//!
//! Identification (the face scan) and the spoken greeting belong to the
//! presentation layer. The engine only sees them through these traits.

use crate::{Role, User, UserId};

/// Resolves who is in front of the device.
pub trait IdentityResolver {
    /// `None` when nobody could be identified.
    fn identify_user(&self) -> Option<UserId>;
}

/// Plays (or otherwise presents) the greeting. Fire and forget.
pub trait Greeter {
    fn announce_greeting(&self, user: &User, greeting: &str);
}

/// Resolver that always recognises the same roster user.
#[derive(Clone, Copy, Debug)]
pub struct RosterScan(pub UserId);

impl IdentityResolver for RosterScan {
    fn identify_user(&self) -> Option<UserId> {
        Some(self.0)
    }
}

/// Greeter that writes the greeting to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingGreeter;

impl Greeter for TracingGreeter {
    fn announce_greeting(&self, user: &User, greeting: &str) {
        tracing::info!(user_id = %user.id, "{greeting}");
    }
}

/// Greeting text for a freshly signed-in user.
pub fn greeting_for(user: &User) -> String {
    match user.role {
        Role::Employer { .. } => format!(
            "Welcome back, {}. You have new employee updates waiting for your review.",
            user.name
        ),
        Role::Employee(_) => format!(
            "Hello {}. Your current balance is {} credits. Have a productive day!",
            user.name, user.balance
        ),
    }
}

use serde::{Deserialize, Serialize};

use crate::{EngineError, Greeter, IdentityResolver, ResultEngine, User, greeting_for};

use super::Engine;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignIn {
    pub user: User,
    pub greeting: String,
}

impl Engine {
    /// Identifies the user through `resolver`, checks them against the
    /// roster and hands the greeting to `greeter`.
    pub async fn sign_in(
        &self,
        resolver: &impl IdentityResolver,
        greeter: &impl Greeter,
    ) -> ResultEngine<SignIn> {
        let user_id = resolver
            .identify_user()
            .ok_or_else(|| EngineError::UnknownUser("no user identified".to_string()))?;
        let user = self.ledger.user(user_id).await?;
        let greeting = greeting_for(&user);
        greeter.announce_greeting(&user, &greeting);
        tracing::info!(user_id = %user.id, employer = user.is_employer(), "signed in");
        Ok(SignIn { user, greeting })
    }
}

use super::authorized;
use crate::{validation::Params, Client, Result};
use serde_json::Value;

/// The authenticated user.
#[derive(Debug, Clone)]
pub struct UserApi {
    pub(super) client: Client,
}

impl UserApi {
    pub(super) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches the account the API key belongs to.
    pub async fn me(&self) -> Result<Value> {
        self.client
            .post("/auth/me", Some(&Params::new()), authorized())
            .await?
            .json()
    }
}

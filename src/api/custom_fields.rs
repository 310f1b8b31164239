use super::{authorized, query_pairs};
use crate::{validation::Params, Client, Error, Result};
use serde_json::{json, Value};

/// Custom fields that templates can reference.
#[derive(Debug, Clone)]
pub struct CustomFieldsApi {
    pub(super) client: Client,
}

impl CustomFieldsApi {
    pub(super) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Lists custom fields, optionally filtered by `query`.
    pub async fn all(&self, query: &Params) -> Result<Value> {
        let options = authorized().with_query_params(query_pairs(query));
        self.client.get("/custom-fields", options).await?.json()
    }

    /// Fetches one custom field.
    pub async fn get(&self, id: i64) -> Result<Value> {
        self.client
            .get(&format!("/custom-fields/{}", id), authorized())
            .await?
            .json()
    }

    /// Creates a custom field called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `name` is empty.
    pub async fn create(&self, name: &str) -> Result<Value> {
        let body = name_body(name)?;
        self.client
            .post("/custom-fields", Some(&body), authorized())
            .await?
            .json()
    }

    /// Renames a custom field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `name` is empty.
    pub async fn update(&self, id: i64, name: &str) -> Result<Value> {
        let body = name_body(name)?;
        self.client
            .put(&format!("/custom-fields/{}", id), Some(&body), authorized())
            .await?
            .json()
    }

    /// Deletes a custom field.
    pub async fn delete(&self, id: i64) -> Result<Value> {
        self.client
            .delete(&format!("/custom-fields/{}", id), authorized())
            .await?
            .json()
    }
}

fn name_body(name: &str) -> Result<Params> {
    if name.trim().is_empty() {
        return Err(Error::InvalidConfig(
            "The \"name\" parameter is required and should not be empty".to_string(),
        ));
    }

    let mut body = Params::new();
    body.insert("customFieldName".to_string(), json!(name));
    Ok(body)
}

//! Resource-facing callers of the request pipeline.
//!
//! Each resource validates its parameters, delegates to the shared [`Client`]
//! and returns the decoded response envelope (`{"message": ..., "data": ...}`).
//! [`Olc`] owns one instance of every resource, created up front.
//!
//! The resources here cover user identity, custom fields, orders and
//! templates. Other endpoints (products, order details, ...) are reached
//! through [`Olc::client`] with a plain [`Client::get`] or [`Client::post`].

mod custom_fields;
mod orders;
mod templates;
mod user;

pub use custom_fields::CustomFieldsApi;
pub use orders::OrdersApi;
pub use templates::{TemplateFiles, TemplatesApi};
pub use user::UserApi;

use crate::{validation::Params, Client, Config, RequestOptions, Result};
use serde_json::Value;

/// Entry point bundling the API resources of this module.
///
/// # Examples
///
/// ```no_run
/// use olc::{Config, Olc};
///
/// # async fn example() -> Result<(), olc::Error> {
/// let olc = Olc::new(Config::new("my-api-key"))?;
///
/// let me = olc.user().me().await?;
/// println!("Signed in as {}", me["data"]["email"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Olc {
    client: Client,
    user: UserApi,
    custom_fields: CustomFieldsApi,
    orders: OrdersApi,
    templates: TemplatesApi,
}

impl Olc {
    /// Builds the client and every resource from `config`.
    ///
    /// # Errors
    ///
    /// Fails like [`Client::new`].
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self::from_client(Client::new(config)?))
    }

    /// Wraps an already configured client.
    pub fn from_client(client: Client) -> Self {
        Self {
            user: UserApi::new(client.clone()),
            custom_fields: CustomFieldsApi::new(client.clone()),
            orders: OrdersApi::new(client.clone()),
            templates: TemplatesApi::new(client.clone()),
            client,
        }
    }

    /// The underlying request pipeline.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The authenticated user.
    pub fn user(&self) -> &UserApi {
        &self.user
    }

    /// Custom fields.
    pub fn custom_fields(&self) -> &CustomFieldsApi {
        &self.custom_fields
    }

    /// Orders.
    pub fn orders(&self) -> &OrdersApi {
        &self.orders
    }

    /// Templates.
    pub fn templates(&self) -> &TemplatesApi {
        &self.templates
    }
}

fn authorized() -> RequestOptions {
    RequestOptions::new().authorized()
}

/// Flattens parameters into query pairs.
///
/// Nested arrays and objects use bracket keys (`ids[0]=1`, `range[from]=x`),
/// booleans become `1`/`0` and nulls are skipped.
pub(crate) fn query_pairs(params: &Params) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        push_pairs(&mut pairs, key.clone(), value);
    }
    pairs
}

fn push_pairs(pairs: &mut Vec<(String, String)>, key: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(b) => pairs.push((key, if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => pairs.push((key, n.to_string())),
        Value::String(s) => pairs.push((key, s.clone())),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                push_pairs(pairs, format!("{}[{}]", key, i), item);
            }
        }
        Value::Object(map) => {
            for (sub, item) in map {
                push_pairs(pairs, format!("{}[{}]", key, sub), item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_pairs_flatten() {
        let params = json!({
            "page": 2,
            "search": "main st",
            "active": true,
            "skip": null,
            "ids": [4, 5],
            "deliveredDate": {"from": "2024-01-01"}
        });
        let pairs = query_pairs(params.as_object().unwrap());

        let has = |k: &str, v: &str| pairs.contains(&(k.to_string(), v.to_string()));
        assert!(has("page", "2"));
        assert!(has("search", "main st"));
        assert!(has("active", "1"));
        assert!(has("ids[0]", "4"));
        assert!(has("ids[1]", "5"));
        assert!(has("deliveredDate[from]", "2024-01-01"));
        assert!(!pairs.iter().any(|(k, _)| k == "skip"));
    }

    #[test]
    fn test_resources_share_client() {
        let olc = Olc::new(Config::new("k").with_version("v9")).unwrap();
        assert_eq!(olc.client().credentials().version(), "v9");
        assert_eq!(olc.orders().client.credentials().version(), "v9");
        assert_eq!(olc.templates().client.credentials().api_key(), "k");
    }
}

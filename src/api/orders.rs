use super::{authorized, query_pairs};
use crate::{
    validation::{self, Params, ORDER_STATUS, PAYMENT_STATUS, SOURCE},
    Client, Error, Result,
};
use serde_json::Value;

/// Recipient selectors for a new order. Exactly one must be given.
const RECIPIENT_KEYS: [&str; 3] = ["tag", "reqId", "contactIds"];

/// Mail orders.
#[derive(Debug, Clone)]
pub struct OrdersApi {
    pub(super) client: Client,
}

impl OrdersApi {
    pub(super) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Lists orders, optionally filtered by `query`.
    pub async fn all(&self, query: &Params) -> Result<Value> {
        let options = authorized().with_query_params(query_pairs(query));
        self.client.get("/orders", options).await?.json()
    }

    /// Fetches one order.
    pub async fn get(&self, id: i64) -> Result<Value> {
        self.client
            .get(&format!("/orders/{}", id), authorized())
            .await?
            .json()
    }

    /// Fetches the values available for order filters.
    ///
    /// Only `source`, `paymentStatus` and `orderStatus` are forwarded; each
    /// must be one of its allowed values when present.
    pub async fn filters_data(&self, params: &Params) -> Result<Value> {
        let mut query = Vec::new();
        for (key, allowed) in [
            ("source", SOURCE),
            ("paymentStatus", PAYMENT_STATUS),
            ("orderStatus", ORDER_STATUS),
        ] {
            if let Some(value) = validation::optional_enum(params, key, allowed)? {
                query.push((key.to_string(), value.to_string()));
            }
        }

        let options = authorized().with_query_params(query);
        self.client.get("/orders/filters-data", options).await?.json()
    }

    /// Estimates the cost of an order. `tag` and `productId` are required.
    pub async fn calculate_cost(&self, params: &Params) -> Result<Value> {
        validation::required_int(params, "tag")?;
        validation::required_int(params, "productId")?;

        self.client
            .post("/orders/calculate-cost", Some(params), authorized())
            .await?
            .json()
    }

    /// Places an order.
    ///
    /// `productId` and `templateId` must be integers and `returnAddress` an
    /// integer or null. Recipients are chosen by exactly one of `tag`
    /// (integer), `reqId` (string) or `contactIds` (non-empty array).
    pub async fn create(&self, params: &Params) -> Result<Value> {
        validation::required_int(params, "productId")?;
        validation::int_or_null(params, "returnAddress")?;
        validation::required_int(params, "templateId")?;

        match validation::exactly_one_of(params, &RECIPIENT_KEYS)? {
            "tag" => {
                validation::required_int(params, "tag")?;
            }
            "reqId" => {
                validation::required_str(params, "reqId")?;
            }
            _ => {
                let has_contacts = params
                    .get("contactIds")
                    .and_then(Value::as_array)
                    .is_some_and(|ids| !ids.is_empty());
                if !has_contacts {
                    return Err(Error::InvalidConfig(
                        "The \"contactIds\" parameter should be a non-empty array".to_string(),
                    ));
                }
            }
        }

        self.client
            .post("/orders", Some(params), authorized())
            .await?
            .json()
    }

    /// Bulk order actions are not available in this API version.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::NotImplemented`].
    pub async fn bulk_actions(&self, _params: &Params) -> Result<Value> {
        Err(Error::NotImplemented(
            "Bulk order actions are not available in this version".to_string(),
        ))
    }
}

//! # olc - client for the Open Letter Connect mail-fulfillment API
//!
//! `olc` wraps the REST API (orders, templates, custom fields, user identity)
//! in a typed async client built on `reqwest`. It injects bearer
//! authorization, negotiates JSON or multipart bodies, decodes response
//! envelopes by path, and maps rejected requests to a structured error that
//! keeps the raw exchange around for debugging.
//!
//! ## Quick Start
//!
//! ```no_run
//! use olc::{Config, Error, Olc};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     // Read OLC_API_KEY, OLC_API_VERSION, OLC_API_ENDPOINT, SSL_VERIFY and ENV
//!     let olc = Olc::new(Config::from_env()?)?;
//!
//!     let me = olc.user().me().await?;
//!     println!("Account: {}", me["data"]);
//!
//!     let params = json!({"orderStatus": "MAILED"});
//!     let filters = olc.orders().filters_data(params.as_object().unwrap()).await?;
//!     println!("Filters: {}", filters["data"]);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-level requests
//!
//! Every resource method is a thin wrapper over [`Client`], which can also be
//! used directly:
//!
//! ```no_run
//! use olc::{Client, RequestOptions};
//!
//! # async fn example() -> Result<(), olc::Error> {
//! let client = Client::builder().api_key("my-api-key").build()?;
//!
//! let response = client
//!     .get("/products", RequestOptions::new().authorized().with_query_param("page", "1"))
//!     .await?;
//! let first = response.value_at("data[0].name")?;
//! println!("First product: {:?} ({:?})", first, response.latency);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error handling
//!
//! Validation problems ([`Error::InvalidConfig`], [`Error::NotFound`],
//! [`Error::NotImplemented`]) are raised before anything is sent. A non-2xx
//! answer becomes [`Error::Transport`], exposing the status, the envelope
//! message and the structured `data.errors` list.
//!
//! ```no_run
//! use olc::{Config, Error, Olc};
//!
//! # async fn example() -> Result<(), Error> {
//! let olc = Olc::new(Config::new("my-api-key"))?;
//!
//! match olc.custom_fields().create("Nickname").await {
//!     Ok(field) => println!("Created: {}", field["data"]),
//!     Err(Error::Transport(e)) => {
//!         eprintln!("Rejected with {}: {}", e.status(), e.message());
//!         for detail in e.error_list() {
//!             eprintln!("  {}", detail);
//!         }
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod metadata;
pub mod multipart;
pub mod path;
pub mod response;
pub mod validation;

pub use api::{CustomFieldsApi, Olc, OrdersApi, TemplateFiles, TemplatesApi, UserApi};
pub use client::{Client, ClientBuilder, Credentials};
pub use config::{Config, Environment};
pub use error::{Error, RawRequest, Result, TransportError};
pub use metadata::RequestOptions;
pub use multipart::FilePart;
pub use path::{extract, PathExpression};
pub use response::Response;
pub use validation::{CustomField, Params};

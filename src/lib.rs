//! An async Rust client for the Moneybird invoicing REST API.
//!
//! The entry point is [`ApiConnector`]: one connection to one
//! administration, with per-resource services for contacts, invoices,
//! estimates, incoming invoices, recurring templates, products, tax rates
//! and invoice profiles. Domain data is carried by the generic
//! dirty-tracking [`Entity`], so updates only resend what actually
//! changed.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use moneybird_api_client::{ApiConnector, Entity, EntityKind, HttpTransport, Value};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = HttpTransport::builder()
//!         .credentials("user@example.com", "secret")
//!         .build();
//!     let connector = ApiConnector::builder()
//!         .client_name("mycompany")
//!         .transport(Arc::new(transport))
//!         .build()?;
//!
//!     let mut contact = Entity::new(EntityKind::Contact);
//!     contact.set_data(
//!         [
//!             ("companyName", Value::from("Acme")),
//!             ("email", Value::from("billing@acme.example")),
//!         ],
//!         true,
//!     )?;
//!     connector.contacts().save(&mut contact).await?;
//!     println!("saved contact {}", contact.id().unwrap_or_default());
//!
//!     Ok(())
//! }
//! ```

pub mod connector;
pub mod error;
pub mod mapper;
pub mod model;
pub mod services;
pub mod transport;

pub use connector::{ApiConnector, ApiConnectorBuilder};
pub use error::{ApiError, ErrorList, MoneybirdError};
pub use mapper::{JsonMapper, WireMapper, XmlMapper};
pub use model::{Collection, Entity, EntityKind, Envelope, SendMethod, Value};
pub use transport::{HttpTransport, Transport};

/// Result type for all Moneybird client operations.
pub type Result<T> = std::result::Result<T, MoneybirdError>;

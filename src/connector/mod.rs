//! The API connector: URL building, session handling and the REST verbs.

mod filters;

pub use filters::{allowed_filters, allowed_named_ids, check_named_id, filter_segment};

use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

use crate::error::{ApiError, ErrorList, MoneybirdError, TransportError};
use crate::mapper::{Parsed, Subject, WireMapper, XmlMapper};
use crate::model::{Collection, Entity, EntityKind, Envelope};
use crate::transport::{HttpTransport, Method, Transport};
use crate::Result;

const API_VERSION: &str = "1.0";

// The sync fetch endpoint accepts at most this many ids per request.
const SYNC_BATCH: usize = 100;

/// Connection to one Moneybird administration.
///
/// Cheap to clone; clones share the HTTP transport, the memoized session
/// and the last-errors buffer. The per-resource services in
/// [`crate::services`] are thin wrappers over this type.
#[derive(Clone)]
pub struct ApiConnector {
    inner: Arc<Inner>,
}

struct Inner {
    base_url: String,
    transport: Arc<dyn Transport>,
    mapper: Arc<dyn WireMapper>,
    session: OnceCell<Entity>,
    errors: Mutex<ErrorList>,
}

impl ApiConnector {
    /// Create a connector builder.
    pub fn builder() -> ApiConnectorBuilder {
        ApiConnectorBuilder::new()
    }

    /// The administration the connector talks to.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The signed-in user, probing the session on first use.
    pub async fn current_session(&self) -> Result<Entity> {
        self.ensure_session().await?;
        // The cell is filled by ensure_session.
        self.inner
            .session
            .get()
            .cloned()
            .ok_or_else(|| MoneybirdError::NotLoggedIn("authorization required".to_string()))
    }

    /// Requests left in the current rate-limit window.
    pub async fn requests_left(&self) -> Result<Option<u32>> {
        self.ensure_session().await?;
        Ok(self.inner.transport.requests_left())
    }

    /// Take the field-level errors of the most recent rejected request,
    /// leaving the buffer empty.
    pub fn take_errors(&self) -> ErrorList {
        self.inner
            .errors
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .unwrap_or_default()
    }

    /// Fetch one entity by id.
    pub async fn get_by_id(&self, kind: EntityKind, id: &str) -> Result<Entity> {
        if !filters::is_digits(id) {
            return Err(MoneybirdError::InvalidId(format!("invalid id: {id}")));
        }
        let url = self.build_url(kind, Some(id), None, None, None);
        let response = self.request(&url, Method::Get, None).await?;
        self.parse_entity(&response, kind)
    }

    /// Fetch all entities of a kind, optionally filtered or scoped to a
    /// parent entity. The filter is validated before any request is sent.
    pub async fn get_all(
        &self,
        kind: EntityKind,
        filter: Option<&str>,
        parent: Option<&Entity>,
    ) -> Result<Collection> {
        let segment = match filter {
            Some(filter) => Some(filter_segment(kind, filter)?),
            None => None,
        };
        let url = self.build_url(kind, None, parent, segment.as_deref(), None);
        let response = self.request(&url, Method::Get, None).await?;
        self.parse_collection(&response, kind)
    }

    /// Fetch one entity by a named id such as `customer_id`.
    pub async fn get_by_named_id(
        &self,
        kind: EntityKind,
        name: &str,
        id: &str,
    ) -> Result<Entity> {
        check_named_id(kind, name, id)?;
        let segment = format!("/{name}/{id}");
        let url = self.build_url(kind, None, None, Some(&segment), None);
        let response = self.request(&url, Method::Get, None).await?;
        self.parse_entity(&response, kind)
    }

    /// Save an entity: POST when new, PUT when persisted. The entity is
    /// validated locally first and reloaded from the authoritative
    /// response.
    pub async fn save(&self, model: &mut Entity) -> Result<()> {
        model.validate()?;
        let body = self.inner.mapper.to_wire(Subject::Entity(model))?;
        let (method, url) = match model.id() {
            Some(id) => (
                Method::Put,
                self.build_url(model.kind(), Some(&id), None, None, None),
            ),
            None => (
                Method::Post,
                self.build_url(model.kind(), None, None, None, None),
            ),
        };
        let response = self.request(&url, method, Some(body)).await?;
        let fresh = self.parse_entity(&response, model.kind())?;
        model.reload(fresh);
        Ok(())
    }

    /// Delete a persisted entity.
    ///
    /// A contact that still owns invoices, estimates, recurring templates
    /// or incoming invoices is refused locally with
    /// [`MoneybirdError::Forbidden`] before any DELETE is sent.
    pub async fn delete(&self, model: &Entity) -> Result<()> {
        let Some(id) = model.id() else {
            return Err(MoneybirdError::InvalidState(format!(
                "cannot delete an unsaved {}",
                model.kind()
            )));
        };
        if model.kind().is_subject() {
            let dependents = [
                EntityKind::Invoice,
                EntityKind::Estimate,
                EntityKind::RecurringTemplate,
                EntityKind::IncomingInvoice,
            ];
            for kind in dependents {
                let existing = self.get_all(kind, None, Some(model)).await?;
                if !existing.is_empty() {
                    return Err(MoneybirdError::Forbidden(format!(
                        "unable to delete {} {id}: {} dependent {}(s) exist",
                        model.kind(),
                        existing.len(),
                        kind
                    )));
                }
            }
        }
        let url = self.build_url(model.kind(), Some(&id), None, None, None);
        self.request(&url, Method::Delete, None).await?;
        Ok(())
    }

    /// Send an invoice or estimate with a delivery envelope, saving the
    /// document first when it has never been saved.
    pub async fn send_document(&self, model: &mut Entity, envelope: &Envelope) -> Result<()> {
        let (envelope_kind, segment) = match model.kind() {
            EntityKind::Invoice => (EntityKind::InvoiceEnvelope, "/send_invoice"),
            EntityKind::Estimate => (EntityKind::EstimateEnvelope, "/send_estimate"),
            other => {
                return Err(MoneybirdError::InvalidState(format!(
                    "{other} cannot be sent"
                )));
            }
        };
        if model.id().is_none() {
            self.save(model).await?;
        }
        let id = model.id().ok_or_else(|| {
            MoneybirdError::InvalidState("document has no id after save".to_string())
        })?;
        let body = self
            .inner
            .mapper
            .to_wire(Subject::Entity(&envelope.to_entity(envelope_kind)?))?;
        let url = self.build_url(model.kind(), Some(&id), None, Some(segment), None);
        let response = self.request(&url, Method::Put, Some(body)).await?;
        let fresh = self.parse_entity(&response, model.kind())?;
        model.reload(fresh);
        Ok(())
    }

    /// Send a payment reminder for an invoice.
    pub async fn remind(&self, invoice: &mut Entity, envelope: &Envelope) -> Result<()> {
        if invoice.kind() != EntityKind::Invoice {
            return Err(MoneybirdError::InvalidState(format!(
                "{} cannot be reminded",
                invoice.kind()
            )));
        }
        let Some(id) = invoice.id() else {
            return Err(MoneybirdError::InvalidState(
                "cannot remind an unsaved Invoice".to_string(),
            ));
        };
        let mut entity = envelope.to_entity(EntityKind::InvoiceEnvelope)?;
        entity.set_data([("invoiceId", crate::model::Value::Text(id.clone()))], true)?;
        let body = self.inner.mapper.to_wire(Subject::Entity(&entity))?;
        let url = self.build_url(
            EntityKind::Invoice,
            Some(&id),
            None,
            Some("/send_reminder"),
            None,
        );
        let response = self.request(&url, Method::Put, Some(body)).await?;
        let fresh = self.parse_entity(&response, EntityKind::Invoice)?;
        invoice.reload(fresh);
        Ok(())
    }

    /// Register a payment on an invoice or incoming invoice, saving the
    /// document first when needed.
    pub async fn register_payment(
        &self,
        document: &mut Entity,
        payment: &mut Entity,
    ) -> Result<()> {
        let (payment_kind, id_attr) = match document.kind() {
            EntityKind::Invoice => (EntityKind::InvoicePayment, "invoiceId"),
            EntityKind::IncomingInvoice => {
                (EntityKind::IncomingInvoicePayment, "incomingInvoiceId")
            }
            other => {
                return Err(MoneybirdError::InvalidState(format!(
                    "{other} cannot take payments"
                )));
            }
        };
        if payment.kind() != payment_kind {
            return Err(MoneybirdError::TypeMismatch {
                expected: payment_kind.name(),
                actual: payment.kind().name(),
            });
        }
        if document.id().is_none() {
            self.save(document).await?;
        }
        let id = document.id().ok_or_else(|| {
            MoneybirdError::InvalidState("document has no id after save".to_string())
        })?;
        // The owning id is read-only on the payment; the URL carries it.
        payment.set_data([(id_attr, crate::model::Value::Text(id.clone()))], true)?;
        payment.validate()?;
        let body = self.inner.mapper.to_wire(Subject::Entity(payment))?;
        let url = self.build_url(document.kind(), Some(&id), None, Some("/payments"), None);
        let response = self.request(&url, Method::Post, Some(body)).await?;
        match self.inner.mapper.from_wire(&response)? {
            Parsed::Entity(fresh) if fresh.kind() == document.kind() => document.reload(fresh),
            Parsed::Entity(fresh) if fresh.kind() == payment_kind => payment.reload(fresh),
            _ => {
                return Err(MoneybirdError::InvalidDocument(
                    "unexpected payment response".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Fetch the raw PDF bytes of a persisted document. The body is
    /// binary and never goes through text decoding.
    pub async fn get_pdf(&self, model: &Entity) -> Result<Vec<u8>> {
        let Some(id) = model.id() else {
            return Err(MoneybirdError::InvalidState(format!(
                "cannot fetch the pdf of an unsaved {}",
                model.kind()
            )));
        };
        let url = self.build_url(model.kind(), Some(&id), None, None, Some("pdf"));
        self.ensure_session().await?;
        self.request_raw(&url, Method::Get, None).await
    }

    /// List id and revision of every entity of a kind, for change
    /// detection against a local copy.
    pub async fn sync_list(&self, kind: EntityKind) -> Result<Collection> {
        let sync_kind = self.sync_kind(kind)?;
        let url = self.build_url(sync_kind, None, None, Some("/sync_list_ids"), None);
        let response = self.request(&url, Method::Get, None).await?;
        self.parse_collection(&response, kind)
    }

    /// Fetch full entities for a batch of ids, chunked to the endpoint's
    /// maximum batch size.
    pub async fn get_by_ids(&self, kind: EntityKind, ids: &[String]) -> Result<Collection> {
        let sync_kind = self.sync_kind(kind)?;
        for id in ids {
            if !filters::is_digits(id) {
                return Err(MoneybirdError::InvalidId(format!("invalid id: {id}")));
            }
        }
        let url = self.build_url(sync_kind, None, None, Some("/sync_fetch_ids"), None);
        let mut result = Collection::new(kind);
        for chunk in ids.chunks(SYNC_BATCH) {
            let batch_ids = crate::model::Value::Many(
                chunk
                    .iter()
                    .map(|id| crate::model::Value::Text(id.clone()))
                    .collect(),
            );
            let marker = Entity::from_data(sync_kind, [("id", batch_ids)], true)?;
            let mut batch = Collection::new(sync_kind);
            batch.push(marker)?;
            let body = self.inner.mapper.to_wire(Subject::Collection(&batch))?;
            let response = self.request(&url, Method::Post, Some(body)).await?;
            result.merge(self.parse_collection(&response, kind)?)?;
        }
        Ok(result)
    }

    fn sync_kind(&self, kind: EntityKind) -> Result<EntityKind> {
        kind.sync_kind().ok_or_else(|| {
            MoneybirdError::InvalidState(format!("{kind} does not support the sync protocol"))
        })
    }

    /// Build a resource URL:
    /// `<base>[/<parents>/<pid>]/<resources>[/<id>][<append>].<doctype>`.
    fn build_url(
        &self,
        kind: EntityKind,
        id: Option<&str>,
        parent: Option<&Entity>,
        append: Option<&str>,
        doc_type: Option<&str>,
    ) -> String {
        let doc_type = doc_type.unwrap_or_else(|| self.inner.mapper.extension());
        let mut url = self.inner.base_url.clone();
        if let Some(parent) = parent {
            if let Some(parent_id) = parent.id() {
                url.push('/');
                url.push_str(parent.kind().resource_name());
                url.push('/');
                url.push_str(&parent_id);
            }
        }
        url.push('/');
        url.push_str(kind.resource_name());
        if let Some(id) = id {
            url.push('/');
            url.push_str(id);
        }
        if let Some(append) = append {
            url.push_str(append);
        }
        url.push('.');
        url.push_str(doc_type);
        url
    }

    /// Probe the session once: a 404 on the probe means the client name
    /// does not exist. A failed probe is retried on the next call.
    async fn ensure_session(&self) -> Result<()> {
        self.inner
            .session
            .get_or_try_init(|| async {
                let url = self.build_url(EntityKind::CurrentSession, None, None, None, None);
                debug!(url, "probing session");
                let response =
                    self.request_raw(&url, Method::Get, None)
                        .await
                        .map_err(|err| match err {
                            MoneybirdError::NotFound(_) => MoneybirdError::NotLoggedIn(
                                "invalid client name".to_string(),
                            ),
                            other => other,
                        })?;
                match self.inner.mapper.from_wire(&decode(response)?)? {
                    Parsed::Entity(session)
                        if session.kind() == EntityKind::CurrentSession =>
                    {
                        Ok(session)
                    }
                    _ => Err(MoneybirdError::NotLoggedIn(
                        "authorization required".to_string(),
                    )),
                }
            })
            .await
            .map(|_| ())
    }

    async fn request(&self, url: &str, method: Method, body: Option<String>) -> Result<String> {
        self.ensure_session().await?;
        decode(self.request_raw(url, method, body).await?)
    }

    async fn request_raw(
        &self,
        url: &str,
        method: Method,
        body: Option<String>,
    ) -> Result<Vec<u8>> {
        let result = self
            .inner
            .transport
            .send(url, method, body.as_deref(), self.inner.mapper.content_type())
            .await;
        match result {
            Ok(response) => Ok(response),
            Err(TransportError::Connection(message)) => Err(MoneybirdError::Connection(message)),
            Err(TransportError::Status { status, body }) => Err(self.status_error(status, &body)),
        }
    }

    fn status_error(&self, status: u16, body: &str) -> MoneybirdError {
        let mut message = format!("HTTP status {status}");
        let mut errors = ErrorList::default();
        if status == 403 || status == 422 {
            // The buffer always reflects the most recent failure, even when
            // its body carried no parseable error list.
            errors = self.parse_errors(body);
            if let Ok(mut guard) = self.inner.errors.lock() {
                *guard = errors.clone();
            }
            if !errors.is_empty() {
                message = format!("{message}\nErrors:\n{errors}");
            }
        }
        match status {
            401 => MoneybirdError::NotLoggedIn(message),
            403 => MoneybirdError::Forbidden(message),
            404 => MoneybirdError::NotFound(message),
            406 | 422 => MoneybirdError::NotValid { message, errors },
            _ => MoneybirdError::ServerError(message),
        }
    }

    fn parse_errors(&self, body: &str) -> ErrorList {
        let Ok(Parsed::Collection(collection)) = self.inner.mapper.from_wire(body) else {
            return ErrorList::default();
        };
        if collection.kind() != EntityKind::Error {
            return ErrorList::default();
        }
        ErrorList(
            collection
                .iter()
                .map(|error| {
                    ApiError::new(
                        error
                            .get("attribute")
                            .ok()
                            .and_then(|v| v.as_str())
                            .unwrap_or_default(),
                        error
                            .get("message")
                            .ok()
                            .and_then(|v| v.as_str())
                            .unwrap_or_default(),
                    )
                })
                .collect(),
        )
    }

    fn parse_entity(&self, response: &str, kind: EntityKind) -> Result<Entity> {
        match self.inner.mapper.from_wire(response)? {
            Parsed::Entity(entity) if entity.kind() == kind => Ok(entity),
            _ => Err(MoneybirdError::InvalidDocument(format!(
                "expected a {kind} in the response"
            ))),
        }
    }

    fn parse_collection(&self, response: &str, kind: EntityKind) -> Result<Collection> {
        match self.inner.mapper.from_wire(response)? {
            Parsed::Collection(collection) if collection.kind() == kind => Ok(collection),
            _ => Err(MoneybirdError::InvalidDocument(format!(
                "expected a collection of {kind} in the response"
            ))),
        }
    }
}

fn decode(body: Vec<u8>) -> Result<String> {
    String::from_utf8(body)
        .map_err(|e| MoneybirdError::InvalidDocument(format!("response is not valid UTF-8: {e}")))
}

/// Builder for [`ApiConnector`].
pub struct ApiConnectorBuilder {
    client_name: Option<String>,
    base_url: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    mapper: Option<Arc<dyn WireMapper>>,
}

impl ApiConnectorBuilder {
    /// Create a new builder with the XML mapper and HTTP transport as
    /// defaults.
    pub fn new() -> Self {
        Self {
            client_name: None,
            base_url: None,
            transport: None,
            mapper: None,
        }
    }

    /// Connect to `<name>.moneybird.nl`. The name must match
    /// `^[a-z0-9_-]+$`; anything else fails at build time, before any
    /// connection is made.
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    /// Set an explicit base URL (useful for testing with a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        while url.ends_with('/') {
            url.pop();
        }
        self.base_url = Some(url);
        self
    }

    /// Set the transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the wire mapper.
    pub fn mapper(mut self, mapper: Arc<dyn WireMapper>) -> Self {
        self.mapper = Some(mapper);
        self
    }

    /// Build the connector, validating the configuration.
    pub fn build(self) -> Result<ApiConnector> {
        let base_url = match (self.base_url, self.client_name) {
            (Some(url), _) => url,
            (None, Some(name)) => {
                let valid = !name.is_empty()
                    && name.bytes().all(|b| {
                        b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-'
                    });
                if !valid {
                    return Err(MoneybirdError::InvalidConfig(format!(
                        "invalid client name: {name}"
                    )));
                }
                format!("https://{name}.moneybird.nl/api/v{API_VERSION}")
            }
            (None, None) => {
                return Err(MoneybirdError::InvalidConfig(
                    "a client name or base url is required".to_string(),
                ));
            }
        };
        Url::parse(&base_url)
            .map_err(|e| MoneybirdError::InvalidConfig(format!("invalid base url: {e}")))?;
        Ok(ApiConnector {
            inner: Arc::new(Inner {
                base_url,
                transport: self
                    .transport
                    .unwrap_or_else(|| Arc::new(HttpTransport::new())),
                mapper: self.mapper.unwrap_or_else(|| Arc::new(XmlMapper::new())),
                session: OnceCell::new(),
                errors: Mutex::new(ErrorList::default()),
            }),
        })
    }
}

impl Default for ApiConnectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

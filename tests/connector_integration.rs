use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use moneybird_api_client::{
    ApiConnector, Entity, EntityKind, Envelope, MoneybirdError, SendMethod, Value,
};

const SESSION_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<user>
  <name>Test User</name>
  <email>user@example.test</email>
  <language>nl</language>
  <time-zone>Amsterdam</time-zone>
</user>"#;

fn build_connector(server: &MockServer) -> ApiConnector {
    ApiConnector::builder()
        .base_url(server.uri())
        .build()
        .unwrap()
}

async fn mount_session(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/current_session.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SESSION_XML))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_save_new_contact_end_to_end() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    let response = r#"<?xml version="1.0" encoding="UTF-8"?>
<contact>
  <id type="integer">101</id>
  <company-name>Acme</company-name>
  <email>billing@acme.example</email>
  <revision type="integer">1</revision>
</contact>"#;

    Mock::given(method("POST"))
        .and(path("/contacts.xml"))
        .and(body_string_contains("<company-name>Acme</company-name>"))
        .and(body_string_contains("<email>billing@acme.example</email>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(response))
        .mount(&server)
        .await;

    let connector = build_connector(&server);
    let mut contact = Entity::new(EntityKind::Contact);
    contact
        .set_data(
            [
                ("companyName", Value::from("Acme")),
                ("email", Value::from("billing@acme.example")),
            ],
            true,
        )
        .unwrap();

    connector.contacts().save(&mut contact).await.unwrap();

    assert_eq!(contact.id().as_deref(), Some("101"));
    assert_eq!(contact.get("revision").unwrap().as_integer(), Some(1));
    assert!(!contact.is_dirty());
}

#[tokio::test]
async fn test_update_sends_only_dirty_attributes() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    let response = r#"<contact>
  <id type="integer">101</id>
  <company-name>Acme</company-name>
  <email>new@acme.example</email>
</contact>"#;

    Mock::given(method("PUT"))
        .and(path("/contacts/101.xml"))
        .and(body_string_contains("<email>new@acme.example</email>"))
        .and(body_string_contains("<id>101</id>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(response))
        .mount(&server)
        .await;

    let connector = build_connector(&server);
    let mut contact = Entity::from_data(
        EntityKind::Contact,
        [
            ("id", Value::from(101)),
            ("companyName", Value::from("Acme")),
            ("email", Value::from("old@acme.example")),
        ],
        false,
    )
    .unwrap();
    contact
        .set_data([("email", Value::from("new@acme.example"))], true)
        .unwrap();

    connector.contacts().save(&mut contact).await.unwrap();
    assert!(!contact.is_dirty());

    // Only the dirty attribute and the id went over the wire.
    let requests = server.received_requests().await.unwrap();
    let put = requests
        .iter()
        .find(|r| r.method.as_str() == "PUT")
        .unwrap();
    let body = String::from_utf8_lossy(&put.body);
    assert!(!body.contains("company-name"));
}

#[tokio::test]
async fn test_session_probe_404_means_not_logged_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/current_session.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let connector = build_connector(&server);
    let result = connector.contacts().get_by_id("1").await;
    assert!(matches!(result, Err(MoneybirdError::NotLoggedIn(_))));
}

#[tokio::test]
async fn test_session_probe_non_session_body_means_not_logged_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/current_session.xml"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<contact><id type=\"integer\">1</id></contact>"),
        )
        .mount(&server)
        .await;

    let connector = build_connector(&server);
    let result = connector.current_session().await;
    assert!(matches!(result, Err(MoneybirdError::NotLoggedIn(_))));
}

#[tokio::test]
async fn test_unauthorized_request_is_not_logged_in() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("GET"))
        .and(path("/contacts/5.xml"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let connector = build_connector(&server);
    let result = connector.contacts().get_by_id("5").await;
    assert!(matches!(result, Err(MoneybirdError::NotLoggedIn(_))));
}

#[tokio::test]
async fn test_delete_guard_refuses_contact_with_invoices() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    let invoices = r#"<invoices type="array">
  <invoice><id type="integer">900</id></invoice>
</invoices>"#;

    Mock::given(method("GET"))
        .and(path("/contacts/7/invoices.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(invoices))
        .mount(&server)
        .await;

    let connector = build_connector(&server);
    let contact = Entity::from_data(EntityKind::Contact, [("id", Value::from(7))], false).unwrap();
    let result = connector.contacts().delete(&contact).await;
    assert!(matches!(result, Err(MoneybirdError::Forbidden(_))));

    // The DELETE itself must never have been sent.
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.method.as_str() != "DELETE"));
}

#[tokio::test]
async fn test_delete_contact_without_dependents() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    for resource in [
        "invoices",
        "estimates",
        "recurring_templates",
        "incoming_invoices",
    ] {
        let empty = match resource {
            "invoices" => "<invoices type=\"array\"/>",
            "estimates" => "<estimates type=\"array\"/>",
            "recurring_templates" => "<recurring-templates type=\"array\"/>",
            _ => "<incoming-invoices type=\"array\"/>",
        };
        Mock::given(method("GET"))
            .and(path(format!("/contacts/7/{resource}.xml")))
            .respond_with(ResponseTemplate::new(200).set_body_string(empty))
            .mount(&server)
            .await;
    }
    Mock::given(method("DELETE"))
        .and(path("/contacts/7.xml"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let connector = build_connector(&server);
    let contact = Entity::from_data(EntityKind::Contact, [("id", Value::from(7))], false).unwrap();
    connector.contacts().delete(&contact).await.unwrap();
}

#[tokio::test]
async fn test_validation_error_body_becomes_not_valid() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    let errors = r#"<errors type="array">
  <error>
    <attribute>company-name</attribute>
    <message>can't be blank</message>
  </error>
</errors>"#;

    Mock::given(method("POST"))
        .and(path("/contacts.xml"))
        .respond_with(ResponseTemplate::new(422).set_body_string(errors))
        .mount(&server)
        .await;

    let connector = build_connector(&server);
    let mut contact = Entity::new(EntityKind::Contact);
    contact
        .set_data([("lastname", Value::from("Jansen"))], true)
        .unwrap();

    let result = connector.contacts().save(&mut contact).await;
    let Err(MoneybirdError::NotValid { errors, .. }) = result else {
        panic!("expected NotValid");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.iter().next().unwrap().message, "can't be blank");

    // The connector buffers the errors until they are taken.
    assert_eq!(connector.take_errors().len(), 1);
    assert!(connector.take_errors().is_empty());
}

#[tokio::test]
async fn test_local_validation_fails_before_any_request() {
    let server = MockServer::start().await;
    let connector = build_connector(&server);

    let mut contact = Entity::new(EntityKind::Contact);
    let result = connector.contacts().save(&mut contact).await;
    assert!(matches!(result, Err(MoneybirdError::NotValid { .. })));

    let result = connector.invoices().get_all(Some("bogus"), None).await;
    assert!(matches!(result, Err(MoneybirdError::InvalidFilter(_))));

    let result = connector.contacts().get_by_id("12x").await;
    assert!(matches!(result, Err(MoneybirdError::InvalidId(_))));

    // Nothing reached the server, not even the session probe.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_filtered_get_all_hits_filter_url() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    let response = r#"<invoices type="array">
  <invoice><id type="integer">1</id><state>open</state></invoice>
  <invoice><id type="integer">2</id><state>open</state></invoice>
</invoices>"#;

    Mock::given(method("GET"))
        .and(path("/invoices/filter/open.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(response))
        .mount(&server)
        .await;

    let connector = build_connector(&server);
    let invoices = connector
        .invoices()
        .get_all(Some("open"), None)
        .await
        .unwrap();
    assert_eq!(invoices.len(), 2);
    assert_eq!(invoices.kind(), EntityKind::Invoice);
}

#[tokio::test]
async fn test_send_invoice_saves_draft_first() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    let saved = r#"<invoice>
  <id type="integer">55</id>
  <contact-id type="integer">7</contact-id>
  <state>draft</state>
</invoice>"#;
    let sent = r#"<invoice>
  <id type="integer">55</id>
  <contact-id type="integer">7</contact-id>
  <state>open</state>
</invoice>"#;

    Mock::given(method("POST"))
        .and(path("/invoices.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(saved))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/invoices/55/send_invoice.xml"))
        .and(body_string_contains("<send-method>email</send-method>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sent))
        .mount(&server)
        .await;

    let connector = build_connector(&server);
    let mut detail = Entity::new(EntityKind::InvoiceDetail);
    detail
        .set_data(
            [
                ("description", Value::from("Consulting")),
                ("amount", Value::from("2".parse::<rust_decimal::Decimal>().unwrap())),
            ],
            true,
        )
        .unwrap();
    let mut details = moneybird_api_client::Collection::new(EntityKind::InvoiceDetail);
    details.push(detail).unwrap();
    let mut invoice = Entity::new(EntityKind::Invoice);
    invoice
        .set_data(
            [
                ("contactId", Value::from(7)),
                ("details", Value::from(details)),
            ],
            true,
        )
        .unwrap();

    connector
        .invoices()
        .send(&mut invoice, &Envelope::new(SendMethod::Email))
        .await
        .unwrap();

    assert_eq!(invoice.get("state").unwrap().as_str(), Some("open"));
}

#[tokio::test]
async fn test_remind_draft_invoice_is_invalid_state() {
    let server = MockServer::start().await;
    let connector = build_connector(&server);

    let mut draft = Entity::from_data(
        EntityKind::Invoice,
        [("id", Value::from(55)), ("state", Value::from("draft"))],
        false,
    )
    .unwrap();
    let result = connector
        .invoices()
        .remind(&mut draft, &Envelope::new(SendMethod::Email))
        .await;
    assert!(matches!(result, Err(MoneybirdError::InvalidState(_))));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pdf_uses_pdf_doc_type_and_keeps_binary_body() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    // Real PDF streams are not valid UTF-8; the body must come back
    // byte for byte.
    let body: &[u8] = b"%PDF-1.4\n\xE2\xE3\xCF\xD3 stream \x80\x81\xFE\xFF";
    Mock::given(method("GET"))
        .and(path("/invoices/55.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;

    let connector = build_connector(&server);
    let invoice = Entity::from_data(
        EntityKind::Invoice,
        [("id", Value::from(55)), ("state", Value::from("open"))],
        false,
    )
    .unwrap();
    let pdf = connector.invoices().pdf(&invoice).await.unwrap();
    assert_eq!(pdf, body);
}

#[tokio::test]
async fn test_sync_list_returns_id_revision_pairs() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    let response = r#"<invoices type="array">
  <invoice><id type="integer">1</id><revision type="integer">3</revision></invoice>
  <invoice><id type="integer">2</id><revision type="integer">8</revision></invoice>
</invoices>"#;

    Mock::given(method("GET"))
        .and(path("/invoices/sync_list_ids.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(response))
        .mount(&server)
        .await;

    let connector = build_connector(&server);
    let list = connector.invoices().sync_list().await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list.get(1).unwrap().get("revision").unwrap().as_integer(), Some(8));
}

#[tokio::test]
async fn test_sync_fetch_posts_id_batch() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    let response = r#"<invoices type="array">
  <invoice><id type="integer">1</id></invoice>
  <invoice><id type="integer">2</id></invoice>
</invoices>"#;

    Mock::given(method("POST"))
        .and(path("/invoices/sync_fetch_ids.xml"))
        .and(body_string_contains("<ids><id>1</id><id>2</id></ids>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(response))
        .mount(&server)
        .await;

    let connector = build_connector(&server);
    let invoices = connector
        .invoices()
        .get_by_ids(&["1".to_string(), "2".to_string()])
        .await
        .unwrap();
    assert_eq!(invoices.len(), 2);
}

#[tokio::test]
async fn test_register_payment_posts_to_payments_url() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    let response = r#"<invoice>
  <id type="integer">55</id>
  <state>paid</state>
  <total-unpaid type="float">0.0</total-unpaid>
</invoice>"#;

    Mock::given(method("POST"))
        .and(path("/invoices/55/payments.xml"))
        .and(body_string_contains("<price>50</price>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(response))
        .mount(&server)
        .await;

    let connector = build_connector(&server);
    let mut invoice = Entity::from_data(
        EntityKind::Invoice,
        [("id", Value::from(55)), ("state", Value::from("open"))],
        false,
    )
    .unwrap();
    let mut payment = Entity::new(EntityKind::InvoicePayment);
    payment
        .set_data(
            [
                ("price", Value::from("50".parse::<rust_decimal::Decimal>().unwrap())),
                ("paymentDate", Value::from("2012-03-08")),
            ],
            true,
        )
        .unwrap();

    connector
        .invoices()
        .register_payment(&mut invoice, &mut payment)
        .await
        .unwrap();
    assert_eq!(invoice.get("state").unwrap().as_str(), Some("paid"));
}

#[tokio::test]
async fn test_named_id_lookup() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    let response = r#"<contact><id type="integer">7</id><customer-id>C-100</customer-id></contact>"#;
    Mock::given(method("GET"))
        .and(path("/contacts/customer_id/C-100.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(response))
        .mount(&server)
        .await;

    let connector = build_connector(&server);
    let contact = connector
        .contacts()
        .get_by_customer_id("C-100")
        .await
        .unwrap();
    assert_eq!(contact.id().as_deref(), Some("7"));
}

#[tokio::test]
async fn test_requests_left_from_rate_limit_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/current_session.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SESSION_XML)
                .insert_header("X-RateLimit-Remaining", "349"),
        )
        .mount(&server)
        .await;

    let connector = build_connector(&server);
    let left = connector.requests_left().await.unwrap();
    assert_eq!(left, Some(349));
}

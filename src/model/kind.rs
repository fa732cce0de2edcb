//! The closed set of resource kinds and their static schemas.
//!
//! The original API models its resources through runtime class hierarchies;
//! here every kind is a variant of [`EntityKind`] carrying a static
//! [`Schema`], its REST resource name and its wire element names. All type
//! dispatch in the mapper and connector is a match on this enum.

/// Rule for [`crate::model::Entity::validate`].
#[derive(Debug, Clone, Copy)]
pub enum RequiredRule {
    /// The attribute must be set and non-null
    Attr(&'static str),
    /// At least one attribute of the group must be set and non-null
    AnyOf(&'static [&'static str]),
}

/// Static description of one entity kind.
#[derive(Debug)]
pub struct Schema {
    /// Declared attributes, camelCase. Unknown keys in `set_data` payloads
    /// are ignored; reads outside this set fail.
    pub attributes: &'static [&'static str],
    /// Server-assigned attributes that `set_data` refuses to touch
    pub readonly: &'static [&'static str],
    /// Validation rules checked before a save leaves the client
    pub required: &'static [RequiredRule],
    /// Nested collection attributes and the child kind they are bound to
    pub children: &'static [(&'static str, EntityKind)],
    /// True for documents that must carry at least one detail line
    pub requires_details: bool,
    /// True for line items that are deleted by saving with a destroy flag
    pub deletable: bool,
}

impl Schema {
    /// Resolve a caller-supplied attribute name to its static spelling.
    pub fn attribute(&self, name: &str) -> Option<&'static str> {
        self.attributes.iter().copied().find(|a| *a == name)
    }

    /// True if the attribute is server-assigned.
    pub fn is_readonly(&self, name: &str) -> bool {
        self.readonly.contains(&name)
    }

    /// Child kind bound to a nested collection attribute, if any.
    pub fn child_kind(&self, name: &str) -> Option<EntityKind> {
        self.children
            .iter()
            .find(|(attr, _)| *attr == name)
            .map(|(_, kind)| *kind)
    }
}

/// Every resource kind the API exposes, including nested line items,
/// delivery envelopes and the lightweight sync markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Contact,
    CurrentSession,
    Invoice,
    InvoiceDetail,
    InvoicePayment,
    InvoiceHistory,
    InvoiceEnvelope,
    Estimate,
    EstimateDetail,
    EstimateHistory,
    EstimateEnvelope,
    IncomingInvoice,
    IncomingInvoiceDetail,
    IncomingInvoicePayment,
    IncomingInvoiceHistory,
    RecurringTemplate,
    RecurringTemplateDetail,
    InvoiceProfile,
    Product,
    TaxRate,
    Error,
    ContactSync,
    InvoiceSync,
    EstimateSync,
    IncomingInvoiceSync,
}

const SUBJECT_ATTRS: &[&str] = &[
    "address1",
    "address2",
    "attention",
    "city",
    "companyName",
    "country",
    "customerId",
    "firstname",
    "lastname",
    "zipcode",
];

const CONTACT: Schema = Schema {
    attributes: &[
        "address1",
        "address2",
        "attention",
        "bankAccount",
        "chamberOfCommerce",
        "city",
        "companyName",
        "contactHash",
        "contactName",
        "country",
        "createdAt",
        "customerId",
        "email",
        "firstname",
        "id",
        "lastname",
        "name",
        "phone",
        "revision",
        "sendMethod",
        "taxNumber",
        "updatedAt",
        "zipcode",
    ],
    readonly: &[
        "contactHash",
        "contactName",
        "createdAt",
        "id",
        "name",
        "revision",
        "updatedAt",
    ],
    required: &[RequiredRule::AnyOf(&["companyName", "firstname", "lastname"])],
    children: &[],
    requires_details: false,
    deletable: false,
};

const CURRENT_SESSION: Schema = Schema {
    attributes: &["email", "language", "name", "timeZone"],
    readonly: &["email", "language", "name", "timeZone"],
    required: &[],
    children: &[],
    requires_details: false,
    deletable: false,
};

const INVOICE: Schema = Schema {
    attributes: &[
        "address1",
        "address2",
        "attention",
        "city",
        "companyName",
        "conceptId",
        "contactId",
        "contactName",
        "country",
        "createdAt",
        "currency",
        "customerId",
        "daysOpen",
        "description",
        "details",
        "discount",
        "dueDateInterval",
        "email",
        "firstname",
        "history",
        "id",
        "invoiceDate",
        "invoiceEmail",
        "invoiceEmailReminder",
        "invoiceHash",
        "invoiceId",
        "invoiceProfileId",
        "invoiceProfileVersionId",
        "language",
        "lastname",
        "name",
        "originalEstimateId",
        "originalInvoiceId",
        "payUrl",
        "payments",
        "pdfUrl",
        "poNumber",
        "recurringTemplateId",
        "revision",
        "sendMethod",
        "showCustomerId",
        "showTax",
        "showTaxNumber",
        "state",
        "taxNumber",
        "totalPaid",
        "totalPriceExclTax",
        "totalPriceInclTax",
        "totalTax",
        "totalUnpaid",
        "updatedAt",
        "url",
        "zipcode",
    ],
    readonly: &[
        "conceptId",
        "contactName",
        "createdAt",
        "daysOpen",
        "email",
        "history",
        "id",
        "invoiceEmail",
        "invoiceEmailReminder",
        "invoiceHash",
        "invoiceProfileVersionId",
        "name",
        "originalEstimateId",
        "originalInvoiceId",
        "payUrl",
        "payments",
        "pdfUrl",
        "recurringTemplateId",
        "revision",
        "sendMethod",
        "state",
        "totalPaid",
        "totalPriceExclTax",
        "totalPriceInclTax",
        "totalTax",
        "totalUnpaid",
        "updatedAt",
        "url",
    ],
    required: &[RequiredRule::AnyOf(&[
        "contactId",
        "companyName",
        "firstname",
        "lastname",
    ])],
    children: &[
        ("details", EntityKind::InvoiceDetail),
        ("history", EntityKind::InvoiceHistory),
        ("payments", EntityKind::InvoicePayment),
    ],
    requires_details: true,
    deletable: false,
};

const ESTIMATE: Schema = Schema {
    attributes: &[
        "address1",
        "address2",
        "attention",
        "city",
        "companyName",
        "contactId",
        "country",
        "createdAt",
        "currency",
        "customerId",
        "details",
        "discount",
        "dueDateInterval",
        "estimateDate",
        "estimateHash",
        "estimateId",
        "firstname",
        "history",
        "id",
        "invoiceProfileId",
        "invoiceProfileVersionId",
        "language",
        "lastname",
        "pdfUrl",
        "postText",
        "preText",
        "sendMethod",
        "showCustomerId",
        "showTax",
        "signOnline",
        "state",
        "updatedAt",
        "url",
        "zipcode",
    ],
    readonly: &[
        "createdAt",
        "estimateHash",
        "history",
        "id",
        "invoiceProfileVersionId",
        "pdfUrl",
        "sendMethod",
        "signOnline",
        "state",
        "updatedAt",
        "url",
    ],
    required: &[
        RequiredRule::AnyOf(&["contactId", "companyName", "firstname", "lastname"]),
        RequiredRule::Attr("estimateDate"),
    ],
    children: &[
        ("details", EntityKind::EstimateDetail),
        ("history", EntityKind::EstimateHistory),
    ],
    requires_details: true,
    deletable: false,
};

const INCOMING_INVOICE: Schema = Schema {
    attributes: &[
        "conceptId",
        "contactId",
        "createdAt",
        "currency",
        "details",
        "dueDate",
        "history",
        "id",
        "invoiceDate",
        "invoiceId",
        "payments",
        "revision",
        "state",
        "totalPaid",
        "totalUnpaid",
        "updatedAt",
    ],
    readonly: &[
        "conceptId",
        "createdAt",
        "history",
        "id",
        "payments",
        "revision",
        "state",
        "totalPaid",
        "totalUnpaid",
        "updatedAt",
    ],
    required: &[
        RequiredRule::Attr("contactId"),
        RequiredRule::Attr("invoiceDate"),
        RequiredRule::Attr("invoiceId"),
    ],
    children: &[
        ("details", EntityKind::IncomingInvoiceDetail),
        ("history", EntityKind::IncomingInvoiceHistory),
        ("payments", EntityKind::IncomingInvoicePayment),
    ],
    requires_details: true,
    deletable: false,
};

const RECURRING_TEMPLATE: Schema = Schema {
    attributes: &[
        "active",
        "contactId",
        "createdAt",
        "currency",
        "details",
        "discount",
        "frequency",
        "frequencyType",
        "id",
        "invoiceProfileId",
        "lastDate",
        "nextDate",
        "numberOfOccurences",
        "occurences",
        "sendInvoice",
        "startDate",
        "templateId",
        "totalPriceExclTax",
        "totalPriceInclTax",
        "updatedAt",
    ],
    readonly: &[
        "active",
        "createdAt",
        "id",
        "lastDate",
        "nextDate",
        "numberOfOccurences",
        "totalPriceExclTax",
        "totalPriceInclTax",
        "updatedAt",
    ],
    required: &[
        RequiredRule::Attr("contactId"),
        RequiredRule::Attr("frequencyType"),
    ],
    children: &[("details", EntityKind::RecurringTemplateDetail)],
    requires_details: true,
    deletable: false,
};

macro_rules! detail_schema {
    ($owner_id:literal) => {
        Schema {
            attributes: &[
                "amount",
                "createdAt",
                "description",
                "id",
                $owner_id,
                "ledgerAccountId",
                "price",
                "rowOrder",
                "tax",
                "taxRateId",
                "totalPriceExclTax",
                "totalPriceInclTax",
                "updatedAt",
            ],
            readonly: &[
                "createdAt",
                "id",
                $owner_id,
                "totalPriceExclTax",
                "totalPriceInclTax",
                "updatedAt",
            ],
            required: &[],
            children: &[],
            requires_details: false,
            deletable: true,
        }
    };
}

const INVOICE_DETAIL: Schema = detail_schema!("invoiceId");
const ESTIMATE_DETAIL: Schema = detail_schema!("estimateId");
const INCOMING_INVOICE_DETAIL: Schema = detail_schema!("incomingInvoiceId");
const RECURRING_TEMPLATE_DETAIL: Schema = detail_schema!("recurringTemplateId");

macro_rules! history_schema {
    ($owner_id:literal) => {
        Schema {
            attributes: &[
                "action",
                "createdAt",
                "description",
                "id",
                $owner_id,
                "updatedAt",
                "userId",
            ],
            readonly: &["createdAt", "id", $owner_id, "updatedAt", "userId"],
            required: &[RequiredRule::Attr("description")],
            children: &[],
            requires_details: false,
            deletable: false,
        }
    };
}

const INVOICE_HISTORY: Schema = history_schema!("invoiceId");
const ESTIMATE_HISTORY: Schema = history_schema!("estimateId");
const INCOMING_INVOICE_HISTORY: Schema = history_schema!("incomingInvoiceId");

const INVOICE_PAYMENT: Schema = Schema {
    attributes: &[
        "createdAt",
        "creditInvoiceId",
        "id",
        "invoiceId",
        "paymentDate",
        "paymentMethod",
        "price",
        "sendEmail",
        "updatedAt",
    ],
    readonly: &["createdAt", "creditInvoiceId", "id", "invoiceId", "updatedAt"],
    required: &[RequiredRule::Attr("paymentDate"), RequiredRule::Attr("price")],
    children: &[],
    requires_details: false,
    deletable: false,
};

const INCOMING_INVOICE_PAYMENT: Schema = Schema {
    attributes: &[
        "createdAt",
        "id",
        "incomingInvoiceId",
        "paymentDate",
        "paymentMethod",
        "price",
        "updatedAt",
    ],
    readonly: &["createdAt", "id", "incomingInvoiceId", "updatedAt"],
    required: &[RequiredRule::Attr("paymentDate"), RequiredRule::Attr("price")],
    children: &[],
    requires_details: false,
    deletable: false,
};

const INVOICE_ENVELOPE: Schema = Schema {
    attributes: &["email", "invoiceEmail", "invoiceId", "sendMethod"],
    readonly: &[],
    required: &[RequiredRule::Attr("sendMethod")],
    children: &[],
    requires_details: false,
    deletable: false,
};

const ESTIMATE_ENVELOPE: Schema = Schema {
    attributes: &["email", "estimateEmail", "sendMethod"],
    readonly: &[],
    required: &[RequiredRule::Attr("sendMethod")],
    children: &[],
    requires_details: false,
    deletable: false,
};

const INVOICE_PROFILE: Schema = Schema {
    attributes: &["id", "name"],
    readonly: &["id", "name"],
    required: &[],
    children: &[],
    requires_details: false,
    deletable: false,
};

const PRODUCT: Schema = Schema {
    attributes: &[
        "createdAt",
        "description",
        "id",
        "ledgerAccountId",
        "price",
        "tax",
        "taxRateId",
        "updatedAt",
    ],
    readonly: &[
        "createdAt",
        "description",
        "id",
        "ledgerAccountId",
        "price",
        "tax",
        "taxRateId",
        "updatedAt",
    ],
    required: &[],
    children: &[],
    requires_details: false,
    deletable: false,
};

const TAX_RATE: Schema = Schema {
    attributes: &[
        "active",
        "createdAt",
        "id",
        "name",
        "percentage",
        "showTax",
        "taxRateType",
        "taxedItemType",
        "updatedAt",
    ],
    readonly: &[
        "active",
        "createdAt",
        "id",
        "name",
        "percentage",
        "showTax",
        "taxRateType",
        "taxedItemType",
        "updatedAt",
    ],
    required: &[],
    children: &[],
    requires_details: false,
    deletable: false,
};

const ERROR: Schema = Schema {
    attributes: &["attribute", "message"],
    readonly: &[],
    required: &[],
    children: &[],
    requires_details: false,
    deletable: false,
};

const SYNC: Schema = Schema {
    attributes: &["id", "revision"],
    readonly: &[],
    required: &[],
    children: &[],
    requires_details: false,
    deletable: false,
};

impl EntityKind {
    /// Static schema of this kind.
    pub fn schema(self) -> &'static Schema {
        match self {
            EntityKind::Contact => &CONTACT,
            EntityKind::CurrentSession => &CURRENT_SESSION,
            EntityKind::Invoice => &INVOICE,
            EntityKind::InvoiceDetail => &INVOICE_DETAIL,
            EntityKind::InvoicePayment => &INVOICE_PAYMENT,
            EntityKind::InvoiceHistory => &INVOICE_HISTORY,
            EntityKind::InvoiceEnvelope => &INVOICE_ENVELOPE,
            EntityKind::Estimate => &ESTIMATE,
            EntityKind::EstimateDetail => &ESTIMATE_DETAIL,
            EntityKind::EstimateHistory => &ESTIMATE_HISTORY,
            EntityKind::EstimateEnvelope => &ESTIMATE_ENVELOPE,
            EntityKind::IncomingInvoice => &INCOMING_INVOICE,
            EntityKind::IncomingInvoiceDetail => &INCOMING_INVOICE_DETAIL,
            EntityKind::IncomingInvoicePayment => &INCOMING_INVOICE_PAYMENT,
            EntityKind::IncomingInvoiceHistory => &INCOMING_INVOICE_HISTORY,
            EntityKind::RecurringTemplate => &RECURRING_TEMPLATE,
            EntityKind::RecurringTemplateDetail => &RECURRING_TEMPLATE_DETAIL,
            EntityKind::InvoiceProfile => &INVOICE_PROFILE,
            EntityKind::Product => &PRODUCT,
            EntityKind::TaxRate => &TAX_RATE,
            EntityKind::Error => &ERROR,
            EntityKind::ContactSync
            | EntityKind::InvoiceSync
            | EntityKind::EstimateSync
            | EntityKind::IncomingInvoiceSync => &SYNC,
        }
    }

    /// Plural resource segment used in REST paths.
    ///
    /// Line items, envelopes and sync markers address their owning
    /// document's resource; `CurrentSession` maps to a fixed singular name.
    pub fn resource_name(self) -> &'static str {
        match self {
            EntityKind::Contact | EntityKind::ContactSync => "contacts",
            EntityKind::CurrentSession => "current_session",
            EntityKind::Invoice
            | EntityKind::InvoiceDetail
            | EntityKind::InvoicePayment
            | EntityKind::InvoiceHistory
            | EntityKind::InvoiceEnvelope
            | EntityKind::InvoiceSync => "invoices",
            EntityKind::Estimate
            | EntityKind::EstimateDetail
            | EntityKind::EstimateHistory
            | EntityKind::EstimateEnvelope
            | EntityKind::EstimateSync => "estimates",
            EntityKind::IncomingInvoice
            | EntityKind::IncomingInvoiceDetail
            | EntityKind::IncomingInvoicePayment
            | EntityKind::IncomingInvoiceHistory
            | EntityKind::IncomingInvoiceSync => "incoming_invoices",
            EntityKind::RecurringTemplate | EntityKind::RecurringTemplateDetail => {
                "recurring_templates"
            }
            EntityKind::InvoiceProfile => "invoice_profiles",
            EntityKind::Product => "products",
            EntityKind::TaxRate => "tax_rates",
            EntityKind::Error => "errors",
        }
    }

    /// Wire element name of a single entity of this kind.
    ///
    /// Envelopes serialize under their document's element name; sync
    /// markers serialize as `ids`; `incoming_invoice` keeps the
    /// underscore the API expects on writes.
    pub fn wire_name(self) -> &'static str {
        match self {
            EntityKind::Contact => "contact",
            EntityKind::CurrentSession => "user",
            EntityKind::Invoice | EntityKind::InvoiceEnvelope => "invoice",
            EntityKind::Estimate | EntityKind::EstimateEnvelope => "estimate",
            EntityKind::IncomingInvoice => "incoming_invoice",
            EntityKind::RecurringTemplate => "recurring-template",
            EntityKind::InvoiceProfile => "invoice-profile",
            EntityKind::Product => "product",
            EntityKind::TaxRate => "tax-rate",
            EntityKind::Error => "error",
            EntityKind::InvoiceDetail
            | EntityKind::EstimateDetail
            | EntityKind::IncomingInvoiceDetail
            | EntityKind::RecurringTemplateDetail => "detail",
            EntityKind::InvoicePayment | EntityKind::IncomingInvoicePayment => "payment",
            EntityKind::InvoiceHistory
            | EntityKind::EstimateHistory
            | EntityKind::IncomingInvoiceHistory => "history",
            EntityKind::ContactSync
            | EntityKind::InvoiceSync
            | EntityKind::EstimateSync
            | EntityKind::IncomingInvoiceSync => "ids",
        }
    }

    /// Wire element name of a collection of this kind.
    ///
    /// Detail collections serialize as `details_attributes` (the server's
    /// nested-attributes convention) even though they arrive as `details`;
    /// history stays singular.
    pub fn collection_wire_name(self) -> &'static str {
        match self {
            EntityKind::Contact | EntityKind::ContactSync => "contacts",
            EntityKind::CurrentSession => "users",
            EntityKind::Invoice | EntityKind::InvoiceEnvelope | EntityKind::InvoiceSync => {
                "invoices"
            }
            EntityKind::Estimate | EntityKind::EstimateEnvelope | EntityKind::EstimateSync => {
                "estimates"
            }
            EntityKind::IncomingInvoice | EntityKind::IncomingInvoiceSync => "incoming_invoices",
            EntityKind::RecurringTemplate => "recurring-templates",
            EntityKind::InvoiceProfile => "invoice-profiles",
            EntityKind::Product => "products",
            EntityKind::TaxRate => "tax-rates",
            EntityKind::Error => "errors",
            EntityKind::InvoiceDetail
            | EntityKind::EstimateDetail
            | EntityKind::IncomingInvoiceDetail
            | EntityKind::RecurringTemplateDetail => "details_attributes",
            EntityKind::InvoicePayment | EntityKind::IncomingInvoicePayment => "payments",
            EntityKind::InvoiceHistory
            | EntityKind::EstimateHistory
            | EntityKind::IncomingInvoiceHistory => "history",
        }
    }

    /// True for the lightweight sync markers.
    pub fn is_sync(self) -> bool {
        matches!(
            self,
            EntityKind::ContactSync
                | EntityKind::InvoiceSync
                | EntityKind::EstimateSync
                | EntityKind::IncomingInvoiceSync
        )
    }

    /// True for delivery envelopes.
    pub fn is_envelope(self) -> bool {
        matches!(
            self,
            EntityKind::InvoiceEnvelope | EntityKind::EstimateEnvelope
        )
    }

    /// True for kinds that own dependent documents and are guarded against
    /// deletion while any exist.
    pub fn is_subject(self) -> bool {
        matches!(self, EntityKind::Contact)
    }

    /// Sync marker kind for this resource, if the API supports the sync
    /// protocol for it.
    pub fn sync_kind(self) -> Option<EntityKind> {
        match self {
            EntityKind::Contact => Some(EntityKind::ContactSync),
            EntityKind::Invoice => Some(EntityKind::InvoiceSync),
            EntityKind::Estimate => Some(EntityKind::EstimateSync),
            EntityKind::IncomingInvoice => Some(EntityKind::IncomingInvoiceSync),
            _ => None,
        }
    }

    /// Short name for error messages.
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Contact => "Contact",
            EntityKind::CurrentSession => "CurrentSession",
            EntityKind::Invoice => "Invoice",
            EntityKind::InvoiceDetail => "InvoiceDetail",
            EntityKind::InvoicePayment => "InvoicePayment",
            EntityKind::InvoiceHistory => "InvoiceHistory",
            EntityKind::InvoiceEnvelope => "InvoiceEnvelope",
            EntityKind::Estimate => "Estimate",
            EntityKind::EstimateDetail => "EstimateDetail",
            EntityKind::EstimateHistory => "EstimateHistory",
            EntityKind::EstimateEnvelope => "EstimateEnvelope",
            EntityKind::IncomingInvoice => "IncomingInvoice",
            EntityKind::IncomingInvoiceDetail => "IncomingInvoiceDetail",
            EntityKind::IncomingInvoicePayment => "IncomingInvoicePayment",
            EntityKind::IncomingInvoiceHistory => "IncomingInvoiceHistory",
            EntityKind::RecurringTemplate => "RecurringTemplate",
            EntityKind::RecurringTemplateDetail => "RecurringTemplateDetail",
            EntityKind::InvoiceProfile => "InvoiceProfile",
            EntityKind::Product => "Product",
            EntityKind::TaxRate => "TaxRate",
            EntityKind::Error => "Error",
            EntityKind::ContactSync => "ContactSync",
            EntityKind::InvoiceSync => "InvoiceSync",
            EntityKind::EstimateSync => "EstimateSync",
            EntityKind::IncomingInvoiceSync => "IncomingInvoiceSync",
        }
    }

    /// Attributes an invoice inherits from its contact when created for one.
    pub(crate) fn contact_carryover() -> &'static [&'static str] {
        SUBJECT_ATTRS
    }

    /// Attributes dropped from a deep copy on top of `id` and the
    /// read-only set. A customer id is unique per contact, so a copied
    /// contact must not inherit it.
    pub(crate) fn copy_exclude(self) -> &'static [&'static str] {
        match self {
            EntityKind::Contact => &["customerId"],
            _ => &[],
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

//! Path-keyed registry resolving wire element paths to entity kinds.

use std::sync::LazyLock;

use crate::model::EntityKind;

/// What a registered path maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registered {
    /// A single entity of the kind
    Entity(EntityKind),
    /// A homogeneous collection of the kind
    Collection(EntityKind),
}

// Longest key first, so that e.g. `invoice/history/history` wins over the
// bare `history` fallback.
static REGISTRY: LazyLock<Vec<(&'static str, Registered)>> = LazyLock::new(|| {
    use EntityKind::*;
    use Registered::{Collection, Entity};
    let mut entries = vec![
        ("contacts", Collection(Contact)),
        ("contact", Entity(Contact)),
        ("user", Entity(CurrentSession)),
        ("estimates", Collection(Estimate)),
        ("estimate", Entity(Estimate)),
        ("estimate/details", Collection(EstimateDetail)),
        ("estimate/details/detail", Entity(EstimateDetail)),
        ("estimate/history", Collection(EstimateHistory)),
        ("estimate/history/history", Entity(EstimateHistory)),
        ("incoming-invoices", Collection(IncomingInvoice)),
        ("incoming-invoice", Entity(IncomingInvoice)),
        ("incoming-invoice/details", Collection(IncomingInvoiceDetail)),
        ("incoming-invoice/details/detail", Entity(IncomingInvoiceDetail)),
        ("incoming-invoice/payments", Collection(IncomingInvoicePayment)),
        ("incoming-invoice/payments/payment", Entity(IncomingInvoicePayment)),
        ("incoming-invoice/history", Collection(IncomingInvoiceHistory)),
        ("incoming-invoice/history/history", Entity(IncomingInvoiceHistory)),
        ("invoices", Collection(Invoice)),
        ("invoice", Entity(Invoice)),
        ("invoice/details", Collection(InvoiceDetail)),
        ("invoice/details/detail", Entity(InvoiceDetail)),
        ("invoice/payments", Collection(InvoicePayment)),
        ("invoice/payments/payment", Entity(InvoicePayment)),
        ("invoice/history", Collection(InvoiceHistory)),
        ("invoice/history/history", Entity(InvoiceHistory)),
        ("history", Entity(InvoiceHistory)),
        ("invoice-profiles", Collection(InvoiceProfile)),
        ("invoice-profile", Entity(InvoiceProfile)),
        ("products", Collection(Product)),
        ("product", Entity(Product)),
        ("recurring-templates", Collection(RecurringTemplate)),
        ("recurring-template", Entity(RecurringTemplate)),
        ("recurring-template/details", Collection(RecurringTemplateDetail)),
        ("recurring-template/details/detail", Entity(RecurringTemplateDetail)),
        ("tax-rates", Collection(TaxRate)),
        ("tax-rate", Entity(TaxRate)),
        ("errors", Collection(Error)),
        ("error", Entity(Error)),
    ];
    entries.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));
    entries
});

/// Resolve an element path (ancestor names joined with `/`) to a registered
/// kind. A key matches when it is the full path or a `/`-bounded suffix of
/// it; the longest registered key wins.
pub fn resolve(path: &str) -> Option<Registered> {
    for (key, registered) in REGISTRY.iter() {
        if path == *key {
            return Some(*registered);
        }
        if path.len() > key.len()
            && path.ends_with(key)
            && path.as_bytes()[path.len() - key.len() - 1] == b'/'
        {
            return Some(*registered);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use EntityKind::*;

    #[test]
    fn test_root_resolution() {
        assert_eq!(resolve("contacts"), Some(Registered::Collection(Contact)));
        assert_eq!(resolve("invoice"), Some(Registered::Entity(Invoice)));
        assert_eq!(resolve("user"), Some(Registered::Entity(CurrentSession)));
        assert_eq!(resolve("unknown"), None);
    }

    #[test]
    fn test_longest_suffix_wins() {
        // The specific document history must win over the bare fallback.
        assert_eq!(
            resolve("estimate/history/history"),
            Some(Registered::Entity(EstimateHistory))
        );
        assert_eq!(resolve("history"), Some(Registered::Entity(InvoiceHistory)));
    }

    #[test]
    fn test_suffix_must_sit_on_path_boundary() {
        // `incoming-invoice` must not fall through to the `invoice` entry.
        assert_eq!(
            resolve("incoming-invoice"),
            Some(Registered::Entity(IncomingInvoice))
        );
        assert_eq!(
            resolve("incoming-invoices/incoming-invoice"),
            Some(Registered::Entity(IncomingInvoice))
        );
        assert_eq!(resolve("hello-invoice"), None);
    }

    #[test]
    fn test_nested_paths_resolve_through_ancestors() {
        assert_eq!(
            resolve("invoices/invoice/details"),
            Some(Registered::Collection(InvoiceDetail))
        );
        assert_eq!(
            resolve("invoices/invoice/details/detail"),
            Some(Registered::Entity(InvoiceDetail))
        );
    }
}

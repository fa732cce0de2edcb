//! Filter and named-id whitelists, checked before any request is sent.

use crate::error::MoneybirdError;
use crate::model::EntityKind;
use crate::Result;

/// Named filters the API accepts per resource.
pub fn allowed_filters(kind: EntityKind) -> Option<&'static [&'static str]> {
    match kind {
        EntityKind::Invoice => Some(&[
            "all",
            "this_month",
            "last_month",
            "this_quarter",
            "last_quarter",
            "this_year",
            "last_year",
            "draft",
            "sent",
            "open",
            "late",
            "paid",
        ]),
        EntityKind::Estimate => Some(&[
            "all",
            "active",
            "draft",
            "sent",
            "open",
            "late",
            "accepted",
            "rejected",
            "billed",
            "archived",
            "this_month",
            "last_month",
            "this_quarter",
            "last_quarter",
            "this_year",
            "last_year",
        ]),
        EntityKind::IncomingInvoice => Some(&[
            "all",
            "this_month",
            "last_month",
            "this_quarter",
            "last_quarter",
            "this_year",
            "draft",
            "sent",
            "open",
            "late",
            "paid",
        ]),
        EntityKind::RecurringTemplate => Some(&[
            "all",
            "inactive",
            "weekly",
            "monthly",
            "quarterly",
            "half_yearly",
            "yearly",
            "upcoming",
        ]),
        _ => None,
    }
}

/// Validate a filter for a resource and return its URL segment.
///
/// A filter is either a whitelisted name or the numeric id of an advanced
/// filter saved in the administration.
pub fn filter_segment(kind: EntityKind, filter: &str) -> Result<String> {
    if let Some(allowed) = allowed_filters(kind) {
        if allowed.contains(&filter) || is_digits(filter) {
            return Ok(format!("/filter/{filter}"));
        }
        return Err(MoneybirdError::InvalidFilter(format!(
            "unknown filter {filter:?} for {kind}; available filters: {}",
            allowed.join(", ")
        )));
    }
    Err(MoneybirdError::InvalidFilter(format!(
        "unknown filter {filter:?} for {kind}"
    )))
}

/// Named-id lookups the API supports per resource.
pub fn allowed_named_ids(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Contact => &["customer_id"],
        EntityKind::Invoice => &["invoice_id"],
        _ => &[],
    }
}

/// Validate a named-id lookup and its id value.
pub fn check_named_id(kind: EntityKind, name: &str, id: &str) -> Result<()> {
    if !allowed_named_ids(kind).contains(&name) {
        return Err(MoneybirdError::InvalidNamedId(format!(
            "{name} is not a valid named id for {kind}"
        )));
    }
    let valid = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b' ' || b == b'_');
    if !valid {
        return Err(MoneybirdError::InvalidId(format!("invalid id: {id}")));
    }
    Ok(())
}

pub(crate) fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

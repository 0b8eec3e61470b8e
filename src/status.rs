//! The status badge model: a visual kind, a short label, and a details line.
//!
//! The UI layer only renders whatever `Status` the app currently holds;
//! everything that can happen during a check (precondition failure, server
//! verdict, transport error) is mapped into a `Status` here.

use crate::currency;
use crate::signal::{SignalError, SignalKind, SignalResponse};

/// One rendered status: kind drives the badge color, label is the headline,
/// details is the statistics line (empty = nothing shown).
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub kind: SignalKind,
    pub label: String,
    pub details: String,
}

impl Default for Status {
    fn default() -> Self {
        Self {
            kind: SignalKind::Neutral,
            label: "Pick currencies and press Enter to check".to_string(),
            details: String::new(),
        }
    }
}

impl Status {
    fn new(kind: SignalKind, label: impl Into<String>, details: Option<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            // No stale details: absent means cleared
            details: details.unwrap_or_default(),
        }
    }

    /// Base and target are the same currency. No request is made for this.
    pub fn same_pair() -> Self {
        Self::new(SignalKind::Red, "Pick different currencies", None)
    }

    /// Interim state while the request is in flight.
    pub fn checking() -> Self {
        Self::new(SignalKind::Neutral, "Checking...", None)
    }

    /// Map a successful response into a status. The details line is only
    /// built when the server reported a usable latest rate.
    pub fn from_response(base: &str, target: &str, resp: &SignalResponse) -> Self {
        let details = match resp.latest {
            Some(latest) if latest != 0.0 => Some(format_details(base, target, latest, resp)),
            _ => None,
        };
        Self::new(resp.signal, resp.label.clone(), details)
    }

    /// Map any check failure into a red status carrying the error's message.
    pub fn from_error(err: &SignalError) -> Self {
        Self::new(SignalKind::Red, "Error fetching signal", Some(err.to_string()))
    }
}

/// `🇺🇸 USD/🇪🇺 EUR = 1.2345 | p50=1.2000 p75=1.2500 over 30d`
fn format_details(base: &str, target: &str, latest: f64, resp: &SignalResponse) -> String {
    format!(
        "{}/{} = {:.4} | p50={:.4} p75={:.4} over {}d",
        currency::display(base),
        currency::display(target),
        latest,
        resp.p50.unwrap_or_default(),
        resp.p75.unwrap_or_default(),
        resp.days.unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(latest: Option<f64>) -> SignalResponse {
        SignalResponse {
            signal: SignalKind::Green,
            label: "Great time to convert".to_string(),
            latest,
            p50: Some(1.2),
            p75: Some(1.25),
            days: Some(30),
        }
    }

    #[test]
    fn test_details_contain_codes_and_statistics() {
        let status = Status::from_response("USD", "EUR", &response(Some(1.2345)));
        assert_eq!(status.kind, SignalKind::Green);
        assert_eq!(status.label, "Great time to convert");
        for needle in ["USD", "EUR", "1.2345", "1.2000", "1.2500", "30"] {
            assert!(status.details.contains(needle), "missing {:?} in {:?}", needle, status.details);
        }
    }

    #[test]
    fn test_absent_latest_clears_details() {
        let status = Status::from_response("USD", "EUR", &response(None));
        assert!(status.details.is_empty());
    }

    #[test]
    fn test_zero_latest_clears_details() {
        let status = Status::from_response("USD", "EUR", &response(Some(0.0)));
        assert!(status.details.is_empty());
    }

    #[test]
    fn test_error_message_becomes_details() {
        let status = Status::from_error(&SignalError::Api("bad pair".to_string()));
        assert_eq!(status.kind, SignalKind::Red);
        assert_eq!(status.label, "Error fetching signal");
        assert_eq!(status.details, "bad pair");
    }

    #[test]
    fn test_unknown_currency_renders_without_flag() {
        let mut resp = response(Some(2.0));
        resp.days = Some(180);
        let status = Status::from_response("USD", "XXX", &resp);
        assert!(status.details.contains("🇺🇸 USD/XXX = 2.0000"));
        assert!(status.details.contains("over 180d"));
    }
}

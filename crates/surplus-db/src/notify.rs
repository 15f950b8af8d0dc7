//! # Quote Notifications
//!
//! Buyer-facing notification seam for the quote workflow.
//!
//! Quote submission wants to email the RFQ's buyer, but delivery is an
//! external collaborator and must never fail the submission. The repository
//! calls through [`QuoteNotifier`] *after* the transaction commits and logs
//! (rather than propagates) any failure.

use tracing::info;

use surplus_core::{Quote, Rfq};

/// Error raised by a notifier backend.
///
/// The caller only ever logs it; the type exists so backends can report
/// something more useful than `()`.
#[derive(Debug, thiserror::Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// Delivers buyer notifications for quote activity.
///
/// Implementations: an SMTP/email backend in production, [`LogNotifier`]
/// in development, a recording stub in tests.
#[allow(async_fn_in_trait)]
pub trait QuoteNotifier {
    /// Called once per accepted quote submission, after commit.
    async fn quote_submitted(&self, rfq: &Rfq, quote: &Quote) -> Result<(), NotifyError>;
}

/// Notifier that writes a structured log line instead of sending email.
///
/// The default wiring until an email backend is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl QuoteNotifier for LogNotifier {
    async fn quote_submitted(&self, rfq: &Rfq, quote: &Quote) -> Result<(), NotifyError> {
        info!(
            rfq_id = %rfq.id,
            buyer_id = %rfq.buyer_id,
            quote_number = %quote.quote_number,
            supplier_id = %quote.supplier_id,
            "Quote submitted notification"
        );
        Ok(())
    }
}

/// Notifier that silently drops everything. For tests that don't care.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl QuoteNotifier for NoopNotifier {
    async fn quote_submitted(&self, _rfq: &Rfq, _quote: &Quote) -> Result<(), NotifyError> {
        Ok(())
    }
}

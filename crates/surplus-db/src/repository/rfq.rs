//! # RFQ Repository
//!
//! Buyer RFQs (request-for-quote) and supplier quotes.
//!
//! ## Status Machines
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RFQ:    active ──► closed | expired | fulfilled      (all terminal)    │
//! │                                                                         │
//! │          expiry is a READ-TIME projection: an active row past its       │
//! │          expires_at reads as expired, the row itself is untouched       │
//! │                                                                         │
//! │  Quote:  pending ──► accepted | rejected | expired | converted          │
//! │                                                                         │
//! │          accepting a quote marks its RFQ fulfilled in the same          │
//! │          transaction                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quote Submission
//! One quote per supplier per RFQ. The existence check gives the friendly
//! error; the UNIQUE(rfq_id, supplier_id) constraint catches the race when
//! two submissions interleave. Quote numbers are `QT-<yyyymmdd>-<3-digit
//! random>` - human-readable, unique per (rfq, supplier) by the constraint,
//! not by the number itself.
//!
//! Buyer notification is best-effort: it runs after commit and a failure is
//! logged, never propagated.

use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::notify::QuoteNotifier;
use surplus_core::validation::{validate_budget_range, validate_delivery_days, validate_quote_price};
use surplus_core::{CoreError, Quote, QuoteStatus, Rfq, RfqStatus, ValidationError};

const RFQ_COLUMNS: &str = "id, buyer_id, title, description, quantity, unit, budget_min_paise, \
     budget_max_paise, required_by, status, quote_count, view_count, expires_at, \
     created_at, updated_at";

const QUOTE_COLUMNS: &str = "id, rfq_id, supplier_id, quote_number, price_paise, delivery_days, \
     valid_until, notes, status, created_at, updated_at";

/// Input for creating an RFQ.
#[derive(Debug, Clone)]
pub struct NewRfq {
    pub buyer_id: String,
    pub title: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub unit: String,
    pub budget_min_paise: Option<i64>,
    pub budget_max_paise: Option<i64>,
    pub required_by: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Input for submitting a quote.
#[derive(Debug, Clone)]
pub struct NewQuote {
    pub price_paise: i64,
    pub delivery_days: i64,
    pub valid_until: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

fn status_label<S: std::fmt::Debug>(status: S) -> String {
    format!("{status:?}").to_lowercase()
}

/// Repository for RFQ and quote operations.
#[derive(Debug, Clone)]
pub struct RfqRepository {
    pool: SqlitePool,
}

impl RfqRepository {
    /// Creates a new RfqRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RfqRepository { pool }
    }

    // =========================================================================
    // RFQs
    // =========================================================================

    /// Creates an RFQ in `active` status.
    pub async fn create_rfq(&self, draft: NewRfq, now: DateTime<Utc>) -> DbResult<Rfq> {
        if draft.title.trim().is_empty() {
            return Err(CoreError::from(ValidationError::Required {
                field: "title".to_string(),
            })
            .into());
        }
        if draft.quantity <= 0 {
            return Err(CoreError::from(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            })
            .into());
        }
        validate_budget_range(draft.budget_min_paise, draft.budget_max_paise)
            .map_err(CoreError::from)?;

        let rfq = Rfq {
            id: Uuid::new_v4().to_string(),
            buyer_id: draft.buyer_id,
            title: draft.title.trim().to_string(),
            description: draft.description,
            quantity: draft.quantity,
            unit: draft.unit,
            budget_min_paise: draft.budget_min_paise,
            budget_max_paise: draft.budget_max_paise,
            required_by: draft.required_by,
            status: RfqStatus::Active,
            quote_count: 0,
            view_count: 0,
            expires_at: draft.expires_at,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO rfqs (
                id, buyer_id, title, description, quantity, unit, budget_min_paise,
                budget_max_paise, required_by, status, quote_count, view_count,
                expires_at, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&rfq.id)
        .bind(&rfq.buyer_id)
        .bind(&rfq.title)
        .bind(&rfq.description)
        .bind(rfq.quantity)
        .bind(&rfq.unit)
        .bind(rfq.budget_min_paise)
        .bind(rfq.budget_max_paise)
        .bind(rfq.required_by)
        .bind(rfq.status)
        .bind(rfq.quote_count)
        .bind(rfq.view_count)
        .bind(rfq.expires_at)
        .bind(rfq.created_at)
        .bind(rfq.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(rfq_id = %rfq.id, title = %rfq.title, "RFQ created");
        Ok(rfq)
    }

    /// Fetches an RFQ with the expiry projection applied: an active row past
    /// its `expires_at` comes back as `expired`.
    pub async fn get_rfq(&self, id: &str, now: DateTime<Utc>) -> DbResult<Rfq> {
        let mut rfq = sqlx::query_as::<_, Rfq>(&format!(
            "SELECT {RFQ_COLUMNS} FROM rfqs WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::RfqNotFound(id.to_string()))?;

        rfq.status = rfq.effective_status(now);
        Ok(rfq)
    }

    /// Lists RFQs currently open for quoting, newest first.
    pub async fn list_open(&self, now: DateTime<Utc>) -> DbResult<Vec<Rfq>> {
        let rfqs = sqlx::query_as::<_, Rfq>(&format!(
            "SELECT {RFQ_COLUMNS} FROM rfqs WHERE status = 'active' ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        // Stored-active rows past expiry are filtered here, not in SQL.
        Ok(rfqs
            .into_iter()
            .filter(|r| r.effective_status(now) == RfqStatus::Active)
            .collect())
    }

    /// Bumps the view counter. Best-effort: a failure is logged and dropped,
    /// a supplier browsing must never see an error from this.
    pub async fn record_view(&self, id: &str) {
        let result = sqlx::query("UPDATE rfqs SET view_count = view_count + 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await;

        if let Err(err) = result {
            warn!(rfq_id = %id, error = %err, "Failed to record RFQ view");
        }
    }

    /// Explicitly transitions an RFQ (close, fulfil). Terminal states reject
    /// further transitions.
    pub async fn update_rfq_status(
        &self,
        id: &str,
        status: RfqStatus,
        now: DateTime<Utc>,
    ) -> DbResult<Rfq> {
        let mut tx = self.pool.begin().await?;

        let mut rfq = sqlx::query_as::<_, Rfq>(&format!(
            "SELECT {RFQ_COLUMNS} FROM rfqs WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::RfqNotFound(id.to_string()))?;

        if rfq.status.is_terminal() {
            return Err(CoreError::RfqNotActive {
                id: rfq.id,
                status: status_label(rfq.status),
            }
            .into());
        }

        sqlx::query("UPDATE rfqs SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        rfq.status = status;
        rfq.updated_at = now;
        Ok(rfq)
    }

    // =========================================================================
    // Quotes
    // =========================================================================

    /// Generates a display number: QT-<yyyymmdd>-<3-digit random>.
    fn generate_quote_number(now: DateTime<Utc>) -> String {
        let suffix: u32 = rand::thread_rng().gen_range(0..1000);
        format!("QT-{}-{:03}", now.format("%Y%m%d"), suffix)
    }

    /// Submits a supplier's quote against an active RFQ.
    ///
    /// ## Gates (in order)
    /// 1. Price and delivery window must validate
    /// 2. RFQ must exist and read as active (expiry projected)
    /// 3. No prior quote from this supplier - double-checked by the schema
    ///
    /// On success the RFQ's quote counter moves in the same transaction;
    /// the buyer notification runs after commit and is best-effort.
    pub async fn submit_quote<N: QuoteNotifier>(
        &self,
        rfq_id: &str,
        supplier_id: &str,
        input: NewQuote,
        notifier: &N,
        now: DateTime<Utc>,
    ) -> DbResult<Quote> {
        validate_quote_price(input.price_paise).map_err(CoreError::from)?;
        validate_delivery_days(input.delivery_days).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let rfq = sqlx::query_as::<_, Rfq>(&format!(
            "SELECT {RFQ_COLUMNS} FROM rfqs WHERE id = ?1"
        ))
        .bind(rfq_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::RfqNotFound(rfq_id.to_string()))?;

        let effective = rfq.effective_status(now);
        if effective != RfqStatus::Active {
            return Err(CoreError::RfqNotActive {
                id: rfq.id,
                status: status_label(effective),
            }
            .into());
        }

        let existing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM quotes WHERE rfq_id = ?1 AND supplier_id = ?2",
        )
        .bind(rfq_id)
        .bind(supplier_id)
        .fetch_one(&mut *tx)
        .await?;
        if existing > 0 {
            return Err(CoreError::DuplicateQuote.into());
        }

        let quote = Quote {
            id: Uuid::new_v4().to_string(),
            rfq_id: rfq_id.to_string(),
            supplier_id: supplier_id.to_string(),
            quote_number: Self::generate_quote_number(now),
            price_paise: input.price_paise,
            delivery_days: input.delivery_days,
            valid_until: input.valid_until,
            notes: input.notes,
            status: QuoteStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO quotes (
                id, rfq_id, supplier_id, quote_number, price_paise, delivery_days,
                valid_until, notes, status, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&quote.id)
        .bind(&quote.rfq_id)
        .bind(&quote.supplier_id)
        .bind(&quote.quote_number)
        .bind(quote.price_paise)
        .bind(quote.delivery_days)
        .bind(quote.valid_until)
        .bind(&quote.notes)
        .bind(quote.status)
        .bind(quote.created_at)
        .bind(quote.updated_at)
        .execute(&mut *tx)
        .await;

        // Concurrent submission from the same supplier lands here instead of
        // on the COUNT check above.
        if let Err(err) = inserted {
            return match DbError::from(err) {
                DbError::UniqueViolation { .. } => Err(CoreError::DuplicateQuote.into()),
                other => Err(other),
            };
        }

        sqlx::query("UPDATE rfqs SET quote_count = quote_count + 1, updated_at = ?2 WHERE id = ?1")
            .bind(rfq_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(
            quote_number = %quote.quote_number,
            rfq_id = %rfq_id,
            supplier_id = %supplier_id,
            "Quote submitted"
        );

        if let Err(err) = notifier.quote_submitted(&rfq, &quote).await {
            warn!(
                rfq_id = %rfq_id,
                quote_number = %quote.quote_number,
                error = %err,
                "Buyer notification failed; quote stands"
            );
        }

        Ok(quote)
    }

    /// All quotes against an RFQ, oldest first.
    pub async fn quotes_for_rfq(&self, rfq_id: &str) -> DbResult<Vec<Quote>> {
        let quotes = sqlx::query_as::<_, Quote>(&format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes WHERE rfq_id = ?1 ORDER BY created_at"
        ))
        .bind(rfq_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(quotes)
    }

    /// A supplier's quotes across all RFQs, newest first.
    pub async fn quotes_by_supplier(&self, supplier_id: &str) -> DbResult<Vec<Quote>> {
        let quotes = sqlx::query_as::<_, Quote>(&format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes WHERE supplier_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(quotes)
    }

    /// Transitions a quote out of `pending`.
    ///
    /// Accepting a quote marks its RFQ fulfilled in the same transaction;
    /// the other suppliers' quotes stay pending for the buyer to reject
    /// explicitly.
    pub async fn update_quote_status(
        &self,
        quote_id: &str,
        status: QuoteStatus,
        now: DateTime<Utc>,
    ) -> DbResult<Quote> {
        let mut tx = self.pool.begin().await?;

        let mut quote = sqlx::query_as::<_, Quote>(&format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = ?1"
        ))
        .bind(quote_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::QuoteNotFound(quote_id.to_string()))?;

        if quote.status.is_terminal() {
            return Err(CoreError::QuoteAlreadyFinal {
                status: status_label(quote.status),
            }
            .into());
        }

        sqlx::query("UPDATE quotes SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(quote_id)
            .bind(status)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        if status == QuoteStatus::Accepted {
            sqlx::query(
                "UPDATE rfqs SET status = ?2, updated_at = ?3 WHERE id = ?1 AND status = 'active'",
            )
            .bind(&quote.rfq_id)
            .bind(RfqStatus::Fulfilled)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        quote.status = status;
        quote.updated_at = now;
        Ok(quote)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NoopNotifier, NotifyError};
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use std::sync::Mutex;

    fn draft(buyer: &str) -> NewRfq {
        NewRfq {
            buyer_id: buyer.to_string(),
            title: "20 tons copper scrap".to_string(),
            description: None,
            quantity: 20,
            unit: "ton".to_string(),
            budget_min_paise: Some(50_000_000),
            budget_max_paise: Some(80_000_000),
            required_by: None,
            expires_at: None,
        }
    }

    fn quote_input() -> NewQuote {
        NewQuote {
            price_paise: 60_000_000,
            delivery_days: 14,
            valid_until: None,
            notes: Some("Includes transport".to_string()),
        }
    }

    /// Records every notification it receives.
    #[derive(Default)]
    struct RecordingNotifier {
        seen: Mutex<Vec<String>>,
    }

    impl QuoteNotifier for RecordingNotifier {
        async fn quote_submitted(&self, _rfq: &Rfq, quote: &Quote) -> Result<(), NotifyError> {
            self.seen.lock().unwrap().push(quote.quote_number.clone());
            Ok(())
        }
    }

    /// Always fails, to prove submission survives a notifier outage.
    struct FailingNotifier;

    impl QuoteNotifier for FailingNotifier {
        async fn quote_submitted(&self, _rfq: &Rfq, _quote: &Quote) -> Result<(), NotifyError> {
            Err(NotifyError("smtp down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_create_and_get_rfq() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.rfqs();
        let now = Utc::now();

        let rfq = repo.create_rfq(draft("buyer-1"), now).await.unwrap();
        assert_eq!(rfq.status, RfqStatus::Active);
        assert_eq!(rfq.quote_count, 0);

        let found = repo.get_rfq(&rfq.id, now).await.unwrap();
        assert_eq!(found.title, "20 tons copper scrap");

        let err = repo.get_rfq("ghost", now).await.unwrap_err();
        assert_eq!(err.as_domain().unwrap().code(), "RFQ_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_rfq_validation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.rfqs();
        let now = Utc::now();

        let mut bad = draft("buyer-1");
        bad.title = "  ".to_string();
        assert!(repo.create_rfq(bad, now).await.is_err());

        let mut bad = draft("buyer-1");
        bad.quantity = 0;
        assert!(repo.create_rfq(bad, now).await.is_err());

        let mut bad = draft("buyer-1");
        bad.budget_min_paise = Some(90_000_000);
        bad.budget_max_paise = Some(80_000_000);
        assert!(repo.create_rfq(bad, now).await.is_err());
    }

    #[tokio::test]
    async fn test_expiry_is_a_read_time_projection() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.rfqs();
        let now = Utc::now();

        let mut d = draft("buyer-1");
        d.expires_at = Some(now + Duration::hours(1));
        let rfq = repo.create_rfq(d, now).await.unwrap();

        assert_eq!(repo.list_open(now).await.unwrap().len(), 1);

        let later = now + Duration::hours(2);
        let found = repo.get_rfq(&rfq.id, later).await.unwrap();
        assert_eq!(found.status, RfqStatus::Expired);
        assert!(repo.list_open(later).await.unwrap().is_empty());

        // Quoting against it reads as expired too.
        let err = db
            .rfqs()
            .submit_quote(&rfq.id, "supplier-1", quote_input(), &NoopNotifier, later)
            .await
            .unwrap_err();
        assert_eq!(err.as_domain().unwrap().code(), "RFQ_NOT_ACTIVE");
    }

    #[tokio::test]
    async fn test_submit_quote_happy_path() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.rfqs();
        let now = Utc::now();

        let rfq = repo.create_rfq(draft("buyer-1"), now).await.unwrap();

        let notifier = RecordingNotifier::default();
        let quote = repo
            .submit_quote(&rfq.id, "supplier-1", quote_input(), &notifier, now)
            .await
            .unwrap();

        // QT-<yyyymmdd>-<3 digits>
        assert_eq!(quote.quote_number.len(), 15);
        assert!(quote.quote_number.starts_with("QT-"));
        let expected_date = now.format("%Y%m%d").to_string();
        assert_eq!(&quote.quote_number[3..11], expected_date.as_str());
        assert!(quote.quote_number[12..].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(quote.status, QuoteStatus::Pending);

        let found = repo.get_rfq(&rfq.id, now).await.unwrap();
        assert_eq!(found.quote_count, 1);

        assert_eq!(notifier.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_one_quote_per_supplier() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.rfqs();
        let now = Utc::now();

        let rfq = repo.create_rfq(draft("buyer-1"), now).await.unwrap();

        repo.submit_quote(&rfq.id, "supplier-1", quote_input(), &NoopNotifier, now)
            .await
            .unwrap();

        let err = repo
            .submit_quote(&rfq.id, "supplier-1", quote_input(), &NoopNotifier, now)
            .await
            .unwrap_err();
        assert_eq!(err.as_domain().unwrap().code(), "DUPLICATE_QUOTE");

        // Counter moved exactly once; a second supplier still can quote.
        assert_eq!(repo.get_rfq(&rfq.id, now).await.unwrap().quote_count, 1);

        repo.submit_quote(&rfq.id, "supplier-2", quote_input(), &NoopNotifier, now)
            .await
            .unwrap();
        assert_eq!(repo.quotes_for_rfq(&rfq.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_fail_submission() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.rfqs();
        let now = Utc::now();

        let rfq = repo.create_rfq(draft("buyer-1"), now).await.unwrap();

        let quote = repo
            .submit_quote(&rfq.id, "supplier-1", quote_input(), &FailingNotifier, now)
            .await
            .unwrap();

        assert_eq!(repo.quotes_for_rfq(&rfq.id).await.unwrap().len(), 1);
        assert_eq!(quote.status, QuoteStatus::Pending);
    }

    #[tokio::test]
    async fn test_accepting_a_quote_fulfills_the_rfq() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.rfqs();
        let now = Utc::now();

        let rfq = repo.create_rfq(draft("buyer-1"), now).await.unwrap();
        let quote = repo
            .submit_quote(&rfq.id, "supplier-1", quote_input(), &NoopNotifier, now)
            .await
            .unwrap();

        let accepted = repo
            .update_quote_status(&quote.id, QuoteStatus::Accepted, now)
            .await
            .unwrap();
        assert_eq!(accepted.status, QuoteStatus::Accepted);

        let found = repo.get_rfq(&rfq.id, now).await.unwrap();
        assert_eq!(found.status, RfqStatus::Fulfilled);

        // Terminal quote rejects further transitions.
        let err = repo
            .update_quote_status(&quote.id, QuoteStatus::Rejected, now)
            .await
            .unwrap_err();
        assert_eq!(err.as_domain().unwrap().code(), "QUOTE_ALREADY_FINAL");

        // The fulfilled RFQ no longer accepts quotes.
        let err = repo
            .submit_quote(&rfq.id, "supplier-2", quote_input(), &NoopNotifier, now)
            .await
            .unwrap_err();
        assert_eq!(err.as_domain().unwrap().code(), "RFQ_NOT_ACTIVE");
    }

    #[tokio::test]
    async fn test_close_rfq_and_terminal_guard() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.rfqs();
        let now = Utc::now();

        let rfq = repo.create_rfq(draft("buyer-1"), now).await.unwrap();

        let closed = repo
            .update_rfq_status(&rfq.id, RfqStatus::Closed, now)
            .await
            .unwrap();
        assert_eq!(closed.status, RfqStatus::Closed);

        let err = repo
            .update_rfq_status(&rfq.id, RfqStatus::Active, now)
            .await
            .unwrap_err();
        assert_eq!(err.as_domain().unwrap().code(), "RFQ_NOT_ACTIVE");
    }

    #[tokio::test]
    async fn test_record_view_is_best_effort() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.rfqs();
        let now = Utc::now();

        let rfq = repo.create_rfq(draft("buyer-1"), now).await.unwrap();

        repo.record_view(&rfq.id).await;
        repo.record_view(&rfq.id).await;
        // Unknown id: silently a no-op.
        repo.record_view("ghost").await;

        assert_eq!(repo.get_rfq(&rfq.id, now).await.unwrap().view_count, 2);
    }
}

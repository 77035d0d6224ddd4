/// Bill model and lifecycle operations
///
/// # State Machine
///
/// ```text
/// pending → paid
/// pending → overdue → paid
/// ```
///
/// `paid` is terminal. The pending→overdue transition is a lazy bulk sweep
/// by due date, run whenever a resident views their bills; it is idempotent
/// and may run redundantly with no harmful side effect.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE bills (
///     bill_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     flat_number VARCHAR(10) NOT NULL,
///     bill_type VARCHAR(50) NOT NULL,
///     amount NUMERIC(10,2) NOT NULL,
///     due_date DATE NOT NULL,
///     payment_status VARCHAR(20) NOT NULL DEFAULT 'pending'
///         CHECK (payment_status IN ('pending', 'paid', 'overdue')),
///     payment_date DATE,
///     payment_method VARCHAR(50),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     created_by UUID REFERENCES users(user_id)
/// );
/// ```
///
/// Bills belong to a flat, not a user: a flat can house several residents
/// and any of them may settle the bill.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Payment method recorded when the admin marks a bill paid on a
/// resident's behalf
pub const ADMIN_OVERRIDE_METHOD: &str = "Admin Override";

/// Bill payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting payment, due date not yet passed
    Pending,

    /// Settled
    Paid,

    /// Past due date and still unpaid
    Overdue,
}

impl PaymentStatus {
    /// Converts status to its database string
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overdue => "overdue",
        }
    }

    /// Checks if state is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }

    /// Checks if transition to target state is valid
    pub fn can_transition_to(&self, target: PaymentStatus) -> bool {
        match (self, target) {
            (PaymentStatus::Pending, PaymentStatus::Paid) => true,
            (PaymentStatus::Pending, PaymentStatus::Overdue) => true,
            (PaymentStatus::Overdue, PaymentStatus::Paid) => true,
            _ => false,
        }
    }
}

/// Bill model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bill {
    /// Unique bill ID
    pub bill_id: Uuid,

    /// Flat the bill is addressed to
    pub flat_number: String,

    /// Bill category (e.g. "Maintenance", "Water", "Electricity")
    pub bill_type: String,

    /// Amount due
    pub amount: Decimal,

    /// Date payment is due
    pub due_date: NaiveDate,

    /// Current lifecycle state
    pub payment_status: PaymentStatus,

    /// Date the bill was settled (None until paid)
    pub payment_date: Option<NaiveDate>,

    /// How the bill was settled (None until paid)
    pub payment_method: Option<String>,

    /// When the bill was created
    pub created_at: DateTime<Utc>,

    /// Admin who raised the bill
    pub created_by: Option<Uuid>,
}

/// Input for creating a new bill
///
/// `amount > 0` is validated at the API boundary, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBill {
    /// Flat the bill is addressed to
    pub flat_number: String,

    /// Bill category
    pub bill_type: String,

    /// Amount due
    pub amount: Decimal,

    /// Date payment is due
    pub due_date: NaiveDate,

    /// Admin raising the bill
    pub created_by: Option<Uuid>,
}

/// Payment analytics across all bills
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PaymentStats {
    /// Total number of bills
    pub total_bills: i64,

    /// Bills in paid state
    pub paid_bills: i64,

    /// Bills in pending state
    pub pending_bills: i64,

    /// Bills in overdue state
    pub overdue_bills: i64,

    /// Sum of all bill amounts
    pub total_amount: Decimal,

    /// Sum of paid bill amounts
    pub collected_amount: Decimal,
}

impl PaymentStats {
    /// Collection rate as a percentage of billed amount
    ///
    /// When nothing has been billed the divisor is substituted with 1, so
    /// an empty ledger reports 0% rather than a division error.
    pub fn collection_rate(&self) -> f64 {
        let divisor = if self.total_amount.is_zero() {
            Decimal::ONE
        } else {
            self.total_amount
        };

        (self.collected_amount / divisor * Decimal::from(100))
            .to_f64()
            .unwrap_or(0.0)
    }
}

impl Bill {
    /// Creates a new bill in pending state
    pub async fn create(pool: &PgPool, data: CreateBill) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Bill>(
            r#"
            INSERT INTO bills (flat_number, bill_type, amount, due_date, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.flat_number)
        .bind(&data.bill_type)
        .bind(data.amount)
        .bind(data.due_date)
        .bind(data.created_by)
        .fetch_one(pool)
        .await
    }

    /// Finds a bill by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Bill>("SELECT * FROM bills WHERE bill_id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists all bills for a flat, newest first
    pub async fn list_for_flat(pool: &PgPool, flat_number: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Bill>(
            "SELECT * FROM bills WHERE flat_number = $1 ORDER BY created_at DESC",
        )
        .bind(flat_number)
        .fetch_all(pool)
        .await
    }

    /// Lists bills, optionally filtered by status, newest first
    pub async fn list(
        pool: &PgPool,
        status: Option<PaymentStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match status {
            Some(status) => {
                sqlx::query_as::<_, Bill>(
                    "SELECT * FROM bills WHERE payment_status = $1 ORDER BY created_at DESC",
                )
                .bind(status)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Bill>("SELECT * FROM bills ORDER BY created_at DESC")
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Transitions every pending bill past its due date to overdue
    ///
    /// Idempotent bulk sweep, invoked lazily whenever a resident views
    /// their bills. A bill with a future due date is never touched; a
    /// second run in succession changes nothing.
    ///
    /// Returns the number of bills transitioned.
    pub async fn sweep_overdue(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE bills
            SET payment_status = 'overdue'
            WHERE payment_status = 'pending' AND due_date < CURRENT_DATE
            "#,
        )
        .execute(pool)
        .await?;

        let swept = result.rows_affected();
        if swept > 0 {
            tracing::info!(swept, "Swept pending bills to overdue");
        }

        Ok(swept)
    }

    /// Marks a bill paid
    ///
    /// Sets status to paid, payment date to today, and records the method.
    /// Paying an already-paid bill is accepted: the terminal state is
    /// unchanged but payment_date and payment_method are overwritten.
    ///
    /// Returns the updated bill, or `None` if the bill doesn't exist.
    pub async fn pay(
        pool: &PgPool,
        bill_id: Uuid,
        payment_method: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Bill>(
            r#"
            UPDATE bills
            SET payment_status = 'paid', payment_date = CURRENT_DATE, payment_method = $2
            WHERE bill_id = $1
            RETURNING *
            "#,
        )
        .bind(bill_id)
        .bind(payment_method)
        .fetch_optional(pool)
        .await
    }

    /// Loads payment analytics across all bills
    pub async fn payment_stats(pool: &PgPool) -> Result<PaymentStats, sqlx::Error> {
        sqlx::query_as::<_, PaymentStats>(
            r#"
            SELECT
                COUNT(*) AS total_bills,
                COUNT(*) FILTER (WHERE payment_status = 'paid') AS paid_bills,
                COUNT(*) FILTER (WHERE payment_status = 'pending') AS pending_bills,
                COUNT(*) FILTER (WHERE payment_status = 'overdue') AS overdue_bills,
                COALESCE(SUM(amount), 0) AS total_amount,
                COALESCE(SUM(amount) FILTER (WHERE payment_status = 'paid'), 0) AS collected_amount
            FROM bills
            "#,
        )
        .fetch_one(pool)
        .await
    }

    /// Sums outstanding (pending + overdue) amounts for a flat
    pub async fn outstanding_for_flat(
        pool: &PgPool,
        flat_number: &str,
    ) -> Result<Decimal, sqlx::Error> {
        let (outstanding,): (Decimal,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM bills
            WHERE flat_number = $1 AND payment_status IN ('pending', 'overdue')
            "#,
        )
        .bind(flat_number)
        .fetch_one(pool)
        .await?;

        Ok(outstanding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_as_str() {
        assert_eq!(PaymentStatus::Pending.as_str(), "pending");
        assert_eq!(PaymentStatus::Paid.as_str(), "paid");
        assert_eq!(PaymentStatus::Overdue.as_str(), "overdue");
    }

    #[test]
    fn test_transition_table() {
        use PaymentStatus::*;

        assert!(Pending.can_transition_to(Paid));
        assert!(Pending.can_transition_to(Overdue));
        assert!(Overdue.can_transition_to(Paid));

        // No way out of paid
        assert!(!Paid.can_transition_to(Pending));
        assert!(!Paid.can_transition_to(Overdue));

        // Overdue never reverts
        assert!(!Overdue.can_transition_to(Pending));
    }

    #[test]
    fn test_paid_is_terminal() {
        assert!(PaymentStatus::Paid.is_terminal());
        assert!(!PaymentStatus::Pending.is_terminal());
        // Overdue can still be paid
        assert!(!PaymentStatus::Overdue.is_terminal());
    }

    #[test]
    fn test_collection_rate() {
        let stats = PaymentStats {
            total_bills: 4,
            paid_bills: 2,
            pending_bills: 1,
            overdue_bills: 1,
            total_amount: dec!(10000.00),
            collected_amount: dec!(2500.00),
        };

        assert!((stats.collection_rate() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_collection_rate_empty_ledger() {
        let stats = PaymentStats {
            total_bills: 0,
            paid_bills: 0,
            pending_bills: 0,
            overdue_bills: 0,
            total_amount: Decimal::ZERO,
            collected_amount: Decimal::ZERO,
        };

        // Divisor substituted with 1, never a division error
        assert_eq!(stats.collection_rate(), 0.0);
    }

    #[test]
    fn test_collection_rate_full() {
        let stats = PaymentStats {
            total_bills: 1,
            paid_bills: 1,
            pending_bills: 0,
            overdue_bills: 0,
            total_amount: dec!(1500.00),
            collected_amount: dec!(1500.00),
        };

        assert!((stats.collection_rate() - 100.0).abs() < f64::EPSILON);
    }
}

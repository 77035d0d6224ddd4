/// Society-wide dashboard statistics

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::models::bill::{Bill, PaymentStats};
use crate::models::complaint::{Complaint, ComplaintStatusCount};
use crate::models::user::{Role, User};
use crate::models::visitor::Visitor;

/// Headline counts and breakdowns for the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocietyStats {
    /// Registered owners
    pub total_owners: i64,

    /// Registered tenants
    pub total_tenants: i64,

    /// Bills awaiting payment (pending or overdue)
    pub pending_bills: i64,

    /// Complaints that still need attention (open or in progress)
    pub open_complaints: i64,

    /// Visitors currently inside the premises
    pub current_visitors: i64,

    /// Billing totals and collection rate
    pub billing: PaymentStats,

    /// Per-status complaint counts
    pub complaints: Vec<ComplaintStatusCount>,
}

impl SocietyStats {
    /// Loads the full dashboard snapshot
    pub async fn load(pool: &PgPool) -> Result<Self, sqlx::Error> {
        let total_owners = User::count_by_role(pool, Role::Owner).await?;
        let total_tenants = User::count_by_role(pool, Role::Tenant).await?;
        let billing = Bill::payment_stats(pool).await?;
        let open_complaints = Complaint::count_unresolved(pool).await?;
        let complaints = Complaint::status_breakdown(pool).await?;
        let current_visitors = Visitor::count_inside(pool).await?;

        let pending_bills = billing.pending_bills + billing.overdue_bills;

        Ok(SocietyStats {
            total_owners,
            total_tenants,
            pending_bills,
            open_complaints,
            current_visitors,
            billing,
            complaints,
        })
    }
}

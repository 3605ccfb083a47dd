use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

/// Order lifecycle states. `Pending` is the only state a freshly recorded
/// order can hold; the transition table in [`is_valid_transition`] is the
/// single authority on which overwrites are accepted afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Failed => "failed",
            OrderStatus::Refunded => "refunded",
        }
    }

    pub fn parse(value: &str) -> Option<OrderStatus> {
        match value {
            "pending" => Some(OrderStatus::Pending),
            "paid" => Some(OrderStatus::Paid),
            "failed" => Some(OrderStatus::Failed),
            "refunded" => Some(OrderStatus::Refunded),
            _ => None,
        }
    }
}

/// Settled states are terminal; only `pending` moves anywhere. Same-state
/// writes are not transitions and are reported separately by
/// [`update_status`].
pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
    match from {
        OrderStatus::Pending => matches!(
            to,
            OrderStatus::Paid | OrderStatus::Failed | OrderStatus::Refunded
        ),
        OrderStatus::Paid | OrderStatus::Failed | OrderStatus::Refunded => false,
    }
}

/// Stored order row. The status column stays a plain label in the store;
/// the enum is enforced at the write boundary, so rows predating a status
/// rename remain readable.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub transaction_reference: String,
    /// Smallest currency unit.
    pub amount: i64,
    pub items: Value,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewOrder<'a> {
    pub transaction_reference: &'a str,
    pub amount: i64,
    pub items: &'a Value,
    pub customer_name: Option<&'a str>,
    pub customer_email: Option<&'a str>,
    pub customer_address: Option<&'a str>,
}

/// Upsert keyed on the transaction reference. A retry of the same checkout
/// returns the already-stored row instead of failing, and never regresses
/// its status: the conflict arm touches `updated_at` only.
pub async fn record_order(db: &PgPool, new_order: NewOrder<'_>) -> sqlx::Result<Order> {
    sqlx::query_as::<_, Order>(
        "INSERT INTO orders \
             (id, transaction_reference, amount, items, customer_name, customer_email, customer_address, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending') \
         ON CONFLICT (transaction_reference) DO UPDATE SET updated_at = now() \
         RETURNING id, transaction_reference, amount, items, customer_name, customer_email, \
                   customer_address, status, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(new_order.transaction_reference)
    .bind(new_order.amount)
    .bind(new_order.items)
    .bind(new_order.customer_name)
    .bind(new_order.customer_email)
    .bind(new_order.customer_address)
    .fetch_one(db)
    .await
}

/// Outcome of a guarded status overwrite.
#[derive(Debug, PartialEq, Eq)]
pub enum StatusUpdate {
    /// Matched one row and modified it.
    Applied,
    /// Matched, but the stored value already equals the target.
    NoChange,
    /// The stored state does not permit the requested overwrite.
    Illegal { from: String },
    /// No order carries that reference.
    NotFound,
}

/// Read-check-write against the transition table. The check and the write
/// are separate statements, so concurrent updates resolve last-write-wins
/// rather than by compare-and-swap; acceptable at storefront scale.
pub async fn update_status(
    db: &PgPool,
    reference: &str,
    to: OrderStatus,
) -> sqlx::Result<StatusUpdate> {
    let stored: Option<String> =
        sqlx::query_scalar("SELECT status FROM orders WHERE transaction_reference = $1")
            .bind(reference)
            .fetch_optional(db)
            .await?;

    let Some(stored) = stored else {
        return Ok(StatusUpdate::NotFound);
    };

    match OrderStatus::parse(&stored) {
        Some(from) if from == to => return Ok(StatusUpdate::NoChange),
        Some(from) if !is_valid_transition(from, to) => {
            return Ok(StatusUpdate::Illegal { from: stored });
        }
        Some(_) => {}
        // Legacy label outside the known set: nothing transitions out of it.
        None => return Ok(StatusUpdate::Illegal { from: stored }),
    }

    let result = sqlx::query(
        "UPDATE orders SET status = $2, updated_at = now() WHERE transaction_reference = $1",
    )
    .bind(reference)
    .bind(to.as_str())
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        // Row deleted between the read and the write.
        Ok(StatusUpdate::NotFound)
    } else {
        Ok(StatusUpdate::Applied)
    }
}

pub async fn order_by_reference(db: &PgPool, reference: &str) -> sqlx::Result<Option<Order>> {
    sqlx::query_as::<_, Order>(
        "SELECT id, transaction_reference, amount, items, customer_name, customer_email, \
                customer_address, status, created_at, updated_at \
         FROM orders WHERE transaction_reference = $1",
    )
    .bind(reference)
    .fetch_optional(db)
    .await
}

/// Full scan, newest first. Deliberately unpaginated and unfiltered: any
/// authenticated caller sees the whole collection.
pub async fn list_orders(db: &PgPool) -> sqlx::Result<Vec<Order>> {
    sqlx::query_as::<_, Order>(
        "SELECT id, transaction_reference, amount, items, customer_name, customer_email, \
                customer_address, status, created_at, updated_at \
         FROM orders ORDER BY created_at DESC",
    )
    .fetch_all(db)
    .await
}

//! Ledger repository: wallet balances and the append-only transaction log.
//!
//! Balance mutations are conditional single-statement updates so they stay
//! correct under concurrent callers, and every mutator is generic over the
//! connection so the ledger write commits inside whatever transaction
//! triggered it.

use std::sync::Arc;

use crate::entities::{
    TransactionRecord, User,
    transaction_record::{self, TransType},
    user,
};
use bookmarket_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Alias, Expr},
};

#[derive(FromQueryResult)]
struct AmountSum {
    total: Option<i64>,
}

/// Ledger repository for database operations.
#[derive(Clone)]
pub struct LedgerRepository {
    db: Arc<DatabaseConnection>,
}

impl LedgerRepository {
    /// Create a new ledger repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ========== Balance mutations ==========

    /// Atomically add `amount` to a user's balance.
    ///
    /// Returns the number of rows touched; zero means the user does not
    /// exist.
    pub async fn add_to_balance<C>(&self, conn: &C, user_id: &str, amount: i64) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        let result = User::update_many()
            .col_expr(
                user::Column::Balance,
                Expr::col(user::Column::Balance).add(amount),
            )
            .filter(user::Column::Id.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Atomically subtract `amount` from a user's balance, guarded on
    /// sufficient funds.
    ///
    /// The `balance >= amount` filter makes the debit a compare-and-swap:
    /// zero rows touched means the user is missing or the wallet cannot
    /// cover the amount, and the balance is left untouched.
    pub async fn subtract_from_balance<C>(
        &self,
        conn: &C,
        user_id: &str,
        amount: i64,
    ) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        let result = User::update_many()
            .col_expr(
                user::Column::Balance,
                Expr::col(user::Column::Balance).sub(amount),
            )
            .filter(user::Column::Id.eq(user_id))
            .filter(user::Column::Balance.gte(amount))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Append one ledger entry on the caller's connection.
    pub async fn append_record<C>(
        &self,
        conn: &C,
        model: transaction_record::ActiveModel,
    ) -> AppResult<transaction_record::Model>
    where
        C: ConnectionTrait,
    {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ========== Reads ==========

    /// Current balance for a user.
    pub async fn get_balance(&self, user_id: &str) -> AppResult<i64> {
        User::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .map(|u| u.balance)
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))
    }

    /// Signed sum of all ledger entries for a user.
    ///
    /// Reconciles with `user.balance`; used by integration tests and the
    /// admin statistics view.
    pub async fn sum_for_user(&self, user_id: &str) -> AppResult<i64> {
        // SUM over bigint yields numeric in Postgres; cast back so the
        // result maps onto i64.
        let sum = TransactionRecord::find()
            .select_only()
            .column_as(
                Expr::col(transaction_record::Column::Amount)
                    .sum()
                    .cast_as(Alias::new("BIGINT")),
                "total",
            )
            .filter(transaction_record::Column::UserId.eq(user_id))
            .into_model::<AmountSum>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(sum.and_then(|s| s.total).unwrap_or(0))
    }

    /// List a user's ledger entries, newest first, with an optional type
    /// filter.
    pub async fn find_by_user(
        &self,
        user_id: &str,
        trans_type: Option<TransType>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<transaction_record::Model>> {
        let mut query = TransactionRecord::find()
            .filter(transaction_record::Column::UserId.eq(user_id))
            .order_by_desc(transaction_record::Column::CreatedAt);

        if let Some(t) = trans_type {
            query = query.filter(transaction_record::Column::TransType.eq(t));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a user's ledger entries with an optional type filter.
    pub async fn count_by_user(
        &self,
        user_id: &str,
        trans_type: Option<TransType>,
    ) -> AppResult<u64> {
        let mut query =
            TransactionRecord::find().filter(transaction_record::Column::UserId.eq(user_id));

        if let Some(t) = trans_type {
            query = query.filter(transaction_record::Column::TransType.eq(t));
        }

        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a single ledger entry.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<transaction_record::Model>> {
        TransactionRecord::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_record(id: &str, user_id: &str, amount: i64) -> transaction_record::Model {
        transaction_record::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            amount,
            trans_type: if amount < 0 {
                TransType::Payment
            } else {
                TransType::TopUp
            },
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_subtract_reports_zero_rows_on_insufficient_funds() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = LedgerRepository::new(Arc::clone(&db));
        let rows = repo
            .subtract_from_balance(db.as_ref(), "user1", 500)
            .await
            .unwrap();

        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn test_add_to_balance_touches_one_row() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = LedgerRepository::new(Arc::clone(&db));
        let rows = repo.add_to_balance(db.as_ref(), "user1", 300).await.unwrap();

        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let records = vec![
            create_test_record("t2", "user1", -300),
            create_test_record("t1", "user1", 1000),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([records])
                .into_connection(),
        );

        let repo = LedgerRepository::new(db);
        let result = repo.find_by_user("user1", None, 20, 0).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].amount, -300);
    }
}

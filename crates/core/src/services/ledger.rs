//! Account ledger service.
//!
//! The single enforcement point for the wallet invariants: a balance is
//! never driven negative, and every balance mutation appends exactly one
//! transaction record on the same connection, so `user.balance` always
//! reconciles with the signed sum of that user's ledger entries.

use bookmarket_common::{AppError, AppResult, IdGenerator};
use bookmarket_db::{
    entities::transaction_record::{self, TransType},
    repositories::LedgerRepository,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, Set, TransactionTrait};
use std::sync::Arc;

/// Ledger service for wallet balances and transaction history.
#[derive(Clone)]
pub struct LedgerService {
    db: Arc<DatabaseConnection>,
    ledger_repo: LedgerRepository,
    id_gen: IdGenerator,
    max_top_up: i64,
}

impl LedgerService {
    /// Create a new ledger service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        ledger_repo: LedgerRepository,
        max_top_up: i64,
    ) -> Self {
        Self {
            db,
            ledger_repo,
            id_gen: IdGenerator::new(),
            max_top_up,
        }
    }

    /// Add funds to a user's balance and append the matching ledger entry
    /// on the caller's connection.
    ///
    /// Callers own the transaction boundary; the credit commits or rolls
    /// back together with whatever triggered it.
    pub async fn credit<C>(
        &self,
        conn: &C,
        user_id: &str,
        amount: i64,
        trans_type: TransType,
    ) -> AppResult<transaction_record::Model>
    where
        C: ConnectionTrait,
    {
        if amount <= 0 {
            return Err(AppError::Validation(
                "Credit amount must be positive".to_string(),
            ));
        }

        let rows = self.ledger_repo.add_to_balance(conn, user_id, amount).await?;
        if rows == 0 {
            return Err(AppError::UserNotFound(user_id.to_string()));
        }

        self.append(conn, user_id, amount, trans_type).await
    }

    /// Subtract funds from a user's balance and append the matching ledger
    /// entry on the caller's connection.
    ///
    /// The underlying update is conditional on `balance >= amount`; a
    /// wallet that cannot cover the amount fails with `InsufficientFunds`
    /// and is left untouched.
    pub async fn debit<C>(
        &self,
        conn: &C,
        user_id: &str,
        amount: i64,
        trans_type: TransType,
    ) -> AppResult<transaction_record::Model>
    where
        C: ConnectionTrait,
    {
        if amount <= 0 {
            return Err(AppError::Validation(
                "Debit amount must be positive".to_string(),
            ));
        }

        let rows = self
            .ledger_repo
            .subtract_from_balance(conn, user_id, amount)
            .await?;
        if rows == 0 {
            return Err(AppError::InsufficientFunds);
        }

        self.append(conn, user_id, -amount, trans_type).await
    }

    async fn append<C>(
        &self,
        conn: &C,
        user_id: &str,
        signed_amount: i64,
        trans_type: TransType,
    ) -> AppResult<transaction_record::Model>
    where
        C: ConnectionTrait,
    {
        let model = transaction_record::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            amount: Set(signed_amount),
            trans_type: Set(trans_type),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.ledger_repo.append_record(conn, model).await
    }

    /// Top up a user's wallet. Opens its own transaction and returns the
    /// new balance.
    pub async fn top_up(&self, user_id: &str, amount: i64) -> AppResult<i64> {
        if amount <= 0 {
            return Err(AppError::Validation(
                "Top-up amount must be positive".to_string(),
            ));
        }
        if amount > self.max_top_up {
            return Err(AppError::Validation(format!(
                "Top-up amount must not exceed {}",
                self.max_top_up
            )));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|_| AppError::TransactionAborted)?;

        self.credit(&txn, user_id, amount, TransType::TopUp).await?;

        txn.commit().await.map_err(|_| AppError::TransactionAborted)?;

        self.ledger_repo.get_balance(user_id).await
    }

    /// Current balance for a user.
    pub async fn get_balance(&self, user_id: &str) -> AppResult<i64> {
        self.ledger_repo.get_balance(user_id).await
    }

    /// List a user's ledger entries with an optional type filter.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        trans_type: Option<TransType>,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<transaction_record::Model>, u64)> {
        let records = self
            .ledger_repo
            .find_by_user(user_id, trans_type, limit, offset)
            .await?;
        let total = self.ledger_repo.count_by_user(user_id, trans_type).await?;

        Ok((records, total))
    }

    /// Signed sum of a user's ledger entries.
    pub async fn ledger_sum(&self, user_id: &str) -> AppResult<i64> {
        self.ledger_repo.sum_for_user(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn service_with(db: Arc<DatabaseConnection>) -> LedgerService {
        LedgerService::new(Arc::clone(&db), LedgerRepository::new(db), 100_000)
    }

    #[tokio::test]
    async fn test_credit_rejects_non_positive_amount() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(Arc::clone(&db));

        let result = service
            .credit(db.as_ref(), "user1", 0, TransType::TopUp)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = service
            .credit(db.as_ref(), "user1", -5, TransType::TopUp)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_debit_insufficient_funds() {
        // Conditional update matches no row: wallet cannot cover the amount.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );
        let service = service_with(Arc::clone(&db));

        let result = service
            .debit(db.as_ref(), "user1", 500, TransType::Payment)
            .await;

        assert!(matches!(result, Err(AppError::InsufficientFunds)));
    }

    #[tokio::test]
    async fn test_debit_appends_negative_record() {
        let record = transaction_record::Model {
            id: "t1".to_string(),
            user_id: "user1".to_string(),
            amount: -300,
            trans_type: TransType::Payment,
            created_at: chrono::Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .append_query_results([[record]])
                .into_connection(),
        );
        let service = service_with(Arc::clone(&db));

        let result = service
            .debit(db.as_ref(), "user1", 300, TransType::Payment)
            .await
            .unwrap();

        assert_eq!(result.amount, -300);
        assert_eq!(result.trans_type, TransType::Payment);
    }

    #[tokio::test]
    async fn test_top_up_rejects_amount_over_cap() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let result = service.top_up("user1", 100_001).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_top_up_rejects_zero_amount() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let result = service.top_up("user1", 0).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}

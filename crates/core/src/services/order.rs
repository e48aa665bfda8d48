//! Order service.
//!
//! The purchase path is the one place in the system where correctness
//! depends on concurrency control: the listing status flip, both balance
//! mutations, and the order insert happen inside a single database
//! transaction, with the flip expressed as a compare-and-swap on
//! `status = 'listed'`. Two simultaneous buyers both reach the CAS; the
//! row matches exactly one of them, and the loser's transaction rolls
//! back without a partial debit ever becoming visible.

use crate::services::ledger::LedgerService;
use bookmarket_common::{AppError, AppResult, IdGenerator};
use bookmarket_db::{
    entities::{
        order::{self, OrderStatus},
        transaction_record::TransType,
    },
    repositories::{OrderRepository, PostingRepository},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use std::sync::Arc;

/// Order service for purchases and order history.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    order_repo: OrderRepository,
    posting_repo: PostingRepository,
    ledger: LedgerService,
    id_gen: IdGenerator,
}

impl OrderService {
    /// Create a new order service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        order_repo: OrderRepository,
        posting_repo: PostingRepository,
        ledger: LedgerService,
    ) -> Self {
        Self {
            db,
            order_repo,
            posting_repo,
            ledger,
            id_gen: IdGenerator::new(),
        }
    }

    /// Purchase a listed posting.
    ///
    /// All four writes (status flip, buyer debit, seller credit, order
    /// insert) commit together or not at all. Failure modes:
    ///
    /// - `NotFound`: the posting does not exist.
    /// - `Validation`: the buyer owns the posting.
    /// - `ListingUnavailable`: the posting is not `listed`, or another
    ///   buyer won the compare-and-swap first.
    /// - `InsufficientFunds`: the buyer's wallet cannot cover the price
    ///   at commit time.
    /// - `TransactionAborted`: the transaction itself failed; nothing
    ///   happened and the caller may retry from scratch.
    pub async fn purchase(&self, buyer_id: &str, posting_id: &str) -> AppResult<order::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|_| AppError::TransactionAborted)?;

        let result = self.purchase_in(&txn, buyer_id, posting_id).await;

        match result {
            Ok(order) => {
                txn.commit().await.map_err(|_| AppError::TransactionAborted)?;
                tracing::info!(
                    order_id = %order.id,
                    buyer_id = %buyer_id,
                    posting_id = %posting_id,
                    deal_price = order.deal_price,
                    "Purchase completed"
                );
                Ok(order)
            }
            Err(err) => {
                // Rollback failure is unreachable state for the caller
                // either way; the business error wins.
                txn.rollback().await.ok();
                Err(err)
            }
        }
    }

    async fn purchase_in(
        &self,
        txn: &sea_orm::DatabaseTransaction,
        buyer_id: &str,
        posting_id: &str,
    ) -> AppResult<order::Model> {
        let posting = self
            .posting_repo
            .find_by_id_on(txn, posting_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Posting {posting_id} not found")))?;

        if posting.user_id == buyer_id {
            return Err(AppError::Validation(
                "You cannot purchase your own listing".to_string(),
            ));
        }

        // Conditional update from `listed` to `sold`. Zero rows affected
        // means the listing was already sold, reserved, or removed; the
        // whole transaction rolls back.
        let rows = self.posting_repo.mark_sold_if_listed(txn, posting_id).await?;
        if rows == 0 {
            return Err(AppError::ListingUnavailable);
        }

        // Both ledger writes run on the same transaction, so a failed
        // debit also reverts the status flip.
        self.ledger
            .debit(txn, buyer_id, posting.price, TransType::Payment)
            .await?;
        self.ledger
            .credit(txn, &posting.user_id, posting.price, TransType::Income)
            .await?;

        let model = order::ActiveModel {
            id: Set(self.id_gen.generate()),
            buyer_id: Set(buyer_id.to_string()),
            posting_id: Set(posting_id.to_string()),
            deal_price: Set(posting.price),
            status: Set(OrderStatus::Completed),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.order_repo.insert(txn, model).await
    }

    /// Get an order. Only the buyer, the seller, or an admin may see it.
    pub async fn get_order(
        &self,
        order_id: &str,
        requester_id: &str,
        requester_is_admin: bool,
    ) -> AppResult<order::Model> {
        let order = self.order_repo.get_by_id(order_id).await?;

        if requester_is_admin || order.buyer_id == requester_id {
            return Ok(order);
        }

        let posting = self.posting_repo.get_by_id(&order.posting_id).await?;
        if posting.user_id == requester_id {
            return Ok(order);
        }

        Err(AppError::Forbidden(
            "Only the buyer or seller can view this order".to_string(),
        ))
    }

    /// List a buyer's orders, newest first.
    pub async fn list_orders(
        &self,
        buyer_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<order::Model>, u64)> {
        let orders = self.order_repo.find_by_buyer(buyer_id, limit, offset).await?;
        let total = self.order_repo.count_by_buyer(buyer_id).await?;

        Ok((orders, total))
    }

    /// Cancel a completed order, refunding the buyer and clawing the
    /// income back from the seller. Admin-only; the caller's role is
    /// verified at the API boundary and asserted here.
    ///
    /// Fails with `InsufficientFunds` when the seller has already spent
    /// the proceeds; the order then stays `completed`.
    pub async fn cancel(&self, order_id: &str) -> AppResult<order::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|_| AppError::TransactionAborted)?;

        let result = self.cancel_in(&txn, order_id).await;

        match result {
            Ok(order) => {
                txn.commit().await.map_err(|_| AppError::TransactionAborted)?;
                tracing::info!(order_id = %order.id, "Order cancelled and refunded");
                Ok(order)
            }
            Err(err) => {
                txn.rollback().await.ok();
                Err(err)
            }
        }
    }

    async fn cancel_in(
        &self,
        txn: &sea_orm::DatabaseTransaction,
        order_id: &str,
    ) -> AppResult<order::Model> {
        let order = self.order_repo.get_by_id_on(txn, order_id).await?;

        if order.status == OrderStatus::Cancelled {
            return Err(AppError::Conflict("Order is already cancelled".to_string()));
        }

        let posting = self
            .posting_repo
            .find_by_id_on(txn, &order.posting_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Posting {} not found", order.posting_id)))?;

        // Claw back the seller's income first; if they have spent it,
        // the cancellation fails and nothing changes.
        self.ledger
            .debit(txn, &posting.user_id, order.deal_price, TransType::Refund)
            .await?;
        self.ledger
            .credit(txn, &order.buyer_id, order.deal_price, TransType::Refund)
            .await?;

        let mut active: order::ActiveModel = order.into();
        active.status = Set(OrderStatus::Cancelled);

        self.order_repo.update_on(txn, active).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bookmarket_db::entities::posting::{self, PostingStatus};
    use bookmarket_db::repositories::LedgerRepository;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_posting(id: &str, seller: &str, price: i64) -> posting::Model {
        posting::Model {
            id: id.to_string(),
            user_id: seller.to_string(),
            title: "Calculus Early Transcendentals".to_string(),
            description: None,
            price,
            status: PostingStatus::Listed,
            category_id: None,
            course_id: None,
            image_url: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn build_service(db: Arc<DatabaseConnection>) -> OrderService {
        let order_repo = OrderRepository::new(Arc::clone(&db));
        let posting_repo = PostingRepository::new(Arc::clone(&db));
        let ledger = LedgerService::new(
            Arc::clone(&db),
            LedgerRepository::new(Arc::clone(&db)),
            100_000,
        );
        OrderService::new(db, order_repo, posting_repo, ledger)
    }

    #[tokio::test]
    async fn test_purchase_rejects_self_purchase() {
        let posting = create_test_posting("p1", "buyer1", 300);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[posting]])
                .into_connection(),
        );

        let service = build_service(db);
        let result = service.purchase("buyer1", "p1").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_purchase_missing_posting() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<posting::Model>::new()])
                .into_connection(),
        );

        let service = build_service(db);
        let result = service.purchase("buyer1", "missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_purchase_cas_lost_maps_to_listing_unavailable() {
        let posting = create_test_posting("p1", "seller1", 300);

        // The posting read succeeds, but the conditional status update
        // matches zero rows: another buyer already flipped it.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[posting]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let service = build_service(db);
        let result = service.purchase("buyer1", "p1").await;

        assert!(matches!(result, Err(AppError::ListingUnavailable)));
    }

    #[tokio::test]
    async fn test_purchase_insufficient_funds_aborts() {
        let posting = create_test_posting("p1", "seller1", 300);

        // CAS wins, but the conditional debit matches zero rows: the
        // buyer's wallet cannot cover the price. The service must surface
        // InsufficientFunds (and the real transaction rolls the flip back).
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[posting]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let service = build_service(db);
        let result = service.purchase("buyer1", "p1").await;

        assert!(matches!(result, Err(AppError::InsufficientFunds)));
    }

    #[tokio::test]
    async fn test_cancel_already_cancelled_conflicts() {
        let order = order::Model {
            id: "o1".to_string(),
            buyer_id: "buyer1".to_string(),
            posting_id: "p1".to_string(),
            deal_price: 300,
            status: OrderStatus::Cancelled,
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[order]])
                .into_connection(),
        );

        let service = build_service(db);
        let result = service.cancel("o1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}

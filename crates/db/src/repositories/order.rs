//! Order repository.

use std::sync::Arc;

use crate::entities::{
    Order,
    order::{self, OrderStatus},
};
use bookmarket_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// Order repository for database operations.
#[derive(Clone)]
pub struct OrderRepository {
    db: Arc<DatabaseConnection>,
}

impl OrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert an order on the caller's connection.
    ///
    /// Only the purchase transaction creates orders, so this always runs
    /// inside one.
    pub async fn insert<C>(&self, conn: &C, model: order::ActiveModel) -> AppResult<order::Model>
    where
        C: ConnectionTrait,
    {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an order by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<order::Model>> {
        Order::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an order by ID, failing when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<order::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {id} not found")))
    }

    /// Get an order inside a caller-owned transaction.
    pub async fn get_by_id_on<C>(&self, conn: &C, id: &str) -> AppResult<order::Model>
    where
        C: ConnectionTrait,
    {
        Order::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Order {id} not found")))
    }

    /// List a buyer's orders, newest first.
    pub async fn find_by_buyer(
        &self,
        buyer_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<order::Model>> {
        Order::find()
            .filter(order::Column::BuyerId.eq(buyer_id))
            .order_by_desc(order::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a buyer's orders.
    pub async fn count_by_buyer(&self, buyer_id: &str) -> AppResult<u64> {
        Order::find()
            .filter(order::Column::BuyerId.eq(buyer_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the non-cancelled order for a posting, if any.
    pub async fn find_active_by_posting(&self, posting_id: &str) -> AppResult<Option<order::Model>> {
        Order::find()
            .filter(order::Column::PostingId.eq(posting_id))
            .filter(order::Column::Status.eq(OrderStatus::Completed))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an order on the caller's connection.
    pub async fn update_on<C>(&self, conn: &C, model: order::ActiveModel) -> AppResult<order::Model>
    where
        C: ConnectionTrait,
    {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all orders.
    pub async fn count(&self) -> AppResult<u64> {
        Order::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_order(id: &str, buyer_id: &str) -> order::Model {
        order::Model {
            id: id.to_string(),
            buyer_id: buyer_id.to_string(),
            posting_id: "p1".to_string(),
            deal_price: 300,
            status: OrderStatus::Completed,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_buyer() {
        let orders = vec![
            create_test_order("o2", "buyer1"),
            create_test_order("o1", "buyer1"),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([orders])
                .into_connection(),
        );

        let repo = OrderRepository::new(db);
        let result = repo.find_by_buyer("buyer1", 20, 0).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<order::Model>::new()])
                .into_connection(),
        );

        let repo = OrderRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}

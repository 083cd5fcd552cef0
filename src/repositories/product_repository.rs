use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use metrics::{counter, histogram};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::db::{self, seed};
use crate::entities::product::{
    ActiveModel as ProductActiveModel, Column, Entity as Product, Model as ProductModel,
};
use crate::errors::ServiceError;
use crate::repositories::Repository;

use super::BaseRepository;

/// User-supplied product fields, used for both inserts and full updates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub sku: Option<String>,
}

impl NewProduct {
    /// Blank SKUs are stored as NULL so they never collide with each other
    fn normalized_sku(&self) -> Option<String> {
        self.sku
            .as_ref()
            .filter(|sku| !sku.trim().is_empty())
            .cloned()
    }

    fn into_active_model(self) -> ProductActiveModel {
        let sku = self.normalized_sku();
        ProductActiveModel {
            name: Set(self.name),
            description: Set(self.description),
            category: Set(self.category),
            quantity: Set(self.quantity),
            price: Set(self.price),
            sku: Set(sku),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
    }
}

/// Repository for the product catalog
#[derive(Debug, Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl Repository for ProductRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}

/// Times a storage call and classifies its error at the boundary.
async fn observe<T, F>(operation: &'static str, fut: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, DbErr>>,
{
    let start = Instant::now();
    let result = fut.await;
    histogram!(
        "inventory_db.operation.duration",
        start.elapsed(),
        "operation" => operation
    );

    result.map_err(|e| {
        counter!("inventory_db.operation.errors", 1, "operation" => operation);
        debug!(operation, "Storage operation failed: {}", e);
        ServiceError::from(e)
    })
}

fn flatten_transaction_error(err: TransactionError<DbErr>) -> DbErr {
    match err {
        TransactionError::Connection(e) | TransactionError::Transaction(e) => e,
    }
}

impl ProductRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Prepares the schema and seeds the starter catalog when the table is empty.
    ///
    /// Returns the number of rows seeded, 0 when the store already held products.
    /// Safe to call on every start.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<usize, ServiceError> {
        db::run_migrations(self.get_db()).await?;
        self.seed_if_empty().await
    }

    /// Writes the starter catalog in a single transaction if no products exist.
    #[instrument(skip(self))]
    pub async fn seed_if_empty(&self) -> Result<usize, ServiceError> {
        let rows = seed::seed_products();

        let seeded = observe(
            "seed",
            async {
                self.get_db()
                    .transaction::<_, usize, DbErr>(|txn| {
                        Box::pin(async move {
                            if Product::find().count(txn).await? > 0 {
                                return Ok(0);
                            }
                            let total = rows.len();
                            for row in rows {
                                row.into_active_model().insert(txn).await?;
                            }
                            Ok(total)
                        })
                    })
                    .await
                    .map_err(flatten_transaction_error)
            },
        )
        .await?;

        if seeded > 0 {
            info!("Seeded {} starter products", seeded);
        } else {
            debug!("Product table already populated, skipping seed");
        }
        Ok(seeded)
    }

    /// All products, ordered by ascending id
    pub async fn list_all(&self) -> Result<Vec<ProductModel>, ServiceError> {
        observe(
            "list_all",
            Product::find()
                .order_by_asc(Column::Id)
                .all(self.get_db()),
        )
        .await
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<ProductModel>, ServiceError> {
        observe("get_by_id", Product::find_by_id(id).one(self.get_db())).await
    }

    /// Inserts a product and returns its new id
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn insert(&self, product: NewProduct) -> Result<i32, ServiceError> {
        let created = observe(
            "insert",
            product.into_active_model().insert(self.get_db()),
        )
        .await?;
        counter!("inventory_products.created", 1);
        debug!(id = created.id, "Product inserted");
        Ok(created.id)
    }

    /// Sets the quantity of one product. Returns false when no row has this id.
    #[instrument(skip(self))]
    pub async fn update_quantity(&self, id: i32, quantity: i32) -> Result<bool, ServiceError> {
        let changes = ProductActiveModel {
            quantity: Set(quantity),
            ..Default::default()
        };
        let result = observe(
            "update_quantity",
            Product::update_many()
                .set(changes)
                .filter(Column::Id.eq(id))
                .exec(self.get_db()),
        )
        .await?;
        Ok(result.rows_affected > 0)
    }

    /// Replaces every user field of one product. Returns false when no row has this id.
    #[instrument(skip(self, product))]
    pub async fn update_all(&self, id: i32, product: NewProduct) -> Result<bool, ServiceError> {
        let sku = product.normalized_sku();
        let changes = ProductActiveModel {
            name: Set(product.name),
            description: Set(product.description),
            category: Set(product.category),
            quantity: Set(product.quantity),
            price: Set(product.price),
            sku: Set(sku),
            ..Default::default()
        };
        let result = observe(
            "update_all",
            Product::update_many()
                .set(changes)
                .filter(Column::Id.eq(id))
                .exec(self.get_db()),
        )
        .await?;
        Ok(result.rows_affected > 0)
    }

    /// Deletes one product. Returns false when no row has this id.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: i32) -> Result<bool, ServiceError> {
        let result = observe(
            "remove",
            Product::delete_by_id(id).exec(self.get_db()),
        )
        .await?;
        if result.rows_affected > 0 {
            counter!("inventory_products.deleted", 1);
        }
        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64, ServiceError> {
        observe("count", Product::find().count(self.get_db())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, ProductRepository) {
        let dir = TempDir::new().unwrap();
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("inventory.db").display()
        );
        let conn = db::connect(&db::DbConfig::from_url(url)).await.unwrap();
        db::run_migrations(&conn).await.unwrap();
        (dir, ProductRepository::new(Arc::new(conn)))
    }

    fn product(name: &str, sku: Option<&str>) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: "A test product".to_string(),
            category: "Testing".to_string(),
            quantity: 7,
            price: dec!(12.50),
            sku: sku.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn initialize_seeds_once() {
        let (_dir, repo) = setup().await;
        assert_eq!(repo.initialize().await.unwrap(), seed::SEED_COUNT);
        assert_eq!(repo.initialize().await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), seed::SEED_COUNT as u64);

        let all = repo.list_all().await.unwrap();
        assert_eq!(all[0].name, "Wireless Mouse");
        assert_eq!(all[0].price, dec!(29.99));
        assert_eq!(all[19].sku.as_deref(), Some("KITCH-001"));
    }

    #[tokio::test]
    async fn seed_skipped_when_products_exist() {
        let (_dir, repo) = setup().await;
        repo.insert(product("Existing", None)).await.unwrap();
        assert_eq!(repo.seed_if_empty().await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn insert_round_trips_user_fields() {
        let (_dir, repo) = setup().await;
        let input = product("Gadget", Some("GAD-1"));
        let id = repo.insert(input.clone()).await.unwrap();

        let stored = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.name, input.name);
        assert_eq!(stored.description, input.description);
        assert_eq!(stored.category, input.category);
        assert_eq!(stored.quantity, input.quantity);
        assert_eq!(stored.price, input.price);
        assert_eq!(stored.sku, input.sku);
        assert!(stored.created_at <= Utc::now());
    }

    #[tokio::test]
    async fn ids_increase_and_are_not_reused() {
        let (_dir, repo) = setup().await;
        let first = repo.insert(product("One", None)).await.unwrap();
        let second = repo.insert(product("Two", None)).await.unwrap();
        assert!(second > first);

        assert!(repo.remove(second).await.unwrap());
        let third = repo.insert(product("Three", None)).await.unwrap();
        assert!(third > second);
    }

    #[tokio::test]
    async fn duplicate_sku_is_a_constraint_violation() {
        let (_dir, repo) = setup().await;
        let first = repo.insert(product("First", Some("DUP-1"))).await.unwrap();

        let err = repo
            .insert(product("Second", Some("DUP-1")))
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::ConstraintViolation(_));

        assert_eq!(repo.count().await.unwrap(), 1);
        let kept = repo.get_by_id(first).await.unwrap().unwrap();
        assert_eq!(kept.name, "First");
    }

    #[tokio::test]
    async fn blank_skus_do_not_collide() {
        let (_dir, repo) = setup().await;
        let a = repo.insert(product("A", Some(""))).await.unwrap();
        let b = repo.insert(product("B", Some("  "))).await.unwrap();
        let c = repo.insert(product("C", None)).await.unwrap();
        for id in [a, b, c] {
            assert_eq!(repo.get_by_id(id).await.unwrap().unwrap().sku, None);
        }
    }

    #[tokio::test]
    async fn update_quantity_reports_missing_rows() {
        let (_dir, repo) = setup().await;
        let id = repo.insert(product("Widget", None)).await.unwrap();

        assert!(!repo.update_quantity(id + 100, 3).await.unwrap());
        assert_eq!(repo.get_by_id(id).await.unwrap().unwrap().quantity, 7);

        assert!(repo.update_quantity(id, -4).await.unwrap());
        assert_eq!(repo.get_by_id(id).await.unwrap().unwrap().quantity, -4);
    }

    #[tokio::test]
    async fn update_all_replaces_fields_but_keeps_created_at() {
        let (_dir, repo) = setup().await;
        let id = repo.insert(product("Old", Some("OLD-1"))).await.unwrap();
        let before = repo.get_by_id(id).await.unwrap().unwrap();

        let replacement = NewProduct {
            name: "New".to_string(),
            description: String::new(),
            category: "Other".to_string(),
            quantity: 1,
            price: dec!(99),
            sku: None,
        };
        assert!(repo.update_all(id, replacement).await.unwrap());

        let after = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(after.name, "New");
        assert_eq!(after.category, "Other");
        assert_eq!(after.price, dec!(99));
        assert_eq!(after.sku, None);
        assert_eq!(after.created_at, before.created_at);

        assert!(!repo.update_all(id + 1, product("Ghost", None)).await.unwrap());
    }

    #[tokio::test]
    async fn update_all_rejects_taken_sku() {
        let (_dir, repo) = setup().await;
        repo.insert(product("Taken", Some("SKU-A"))).await.unwrap();
        let id = repo.insert(product("Other", Some("SKU-B"))).await.unwrap();

        let err = repo
            .update_all(id, product("Other", Some("SKU-A")))
            .await
            .unwrap_err();
        assert!(err.is_constraint_violation());
        assert_eq!(
            repo.get_by_id(id).await.unwrap().unwrap().sku.as_deref(),
            Some("SKU-B")
        );
    }

    #[tokio::test]
    async fn remove_then_get_is_none() {
        let (_dir, repo) = setup().await;
        let id = repo.insert(product("Doomed", None)).await.unwrap();
        assert!(repo.remove(id).await.unwrap());
        assert!(repo.get_by_id(id).await.unwrap().is_none());
        assert!(!repo.remove(id).await.unwrap());
    }

    #[test]
    fn empty_name_fails_validation() {
        assert!(product("", None).validate().is_err());
        assert!(product("Fine", None).validate().is_ok());
    }

    #[tokio::test]
    async fn failed_seed_leaves_no_rows() {
        use sea_orm::ConnectionTrait;

        let (_dir, repo) = setup().await;
        repo.get_db()
            .execute_unprepared(
                "CREATE TRIGGER block_desk_lamp BEFORE INSERT ON products \
                 WHEN NEW.sku = 'OFF-001' \
                 BEGIN SELECT RAISE(ABORT, 'blocked'); END;",
            )
            .await
            .unwrap();

        assert!(repo.seed_if_empty().await.is_err());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    struct WarnCounter(Arc<std::sync::atomic::AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCounter {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            if *event.metadata().level() <= tracing::Level::WARN {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }
        }
    }

    #[tokio::test]
    async fn storage_failure_is_logged_once_per_request() {
        use axum::response::IntoResponse;
        use tracing_subscriber::layer::SubscriberExt;

        let count = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(count.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let err = observe("get_by_id", async {
            Err::<(), _>(DbErr::Custom("disk I/O error".into()))
        })
        .await
        .unwrap_err();
        let response = err.or_internal("Failed to fetch product").into_response();

        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Product entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "products")]
#[schema(as = Product)]
pub struct Model {
    /// Primary key, assigned by the store and never reused
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Product name
    pub name: String,

    /// Free-form description, empty when not supplied
    pub description: String,

    /// Grouping label used by the category filter, empty when not supplied
    pub category: String,

    /// Units in stock
    pub quantity: i32,

    /// Unit price
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 29.99)]
    pub price: Decimal,

    /// SKU (Stock Keeping Unit), unique when present
    #[sea_orm(unique)]
    pub sku: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        if insert {
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(Utc::now());
            }
            if let ActiveValue::NotSet = active_model.description {
                active_model.description = Set(String::new());
            }
            if let ActiveValue::NotSet = active_model.category {
                active_model.category = Set(String::new());
            }
        }

        Ok(active_model)
    }
}

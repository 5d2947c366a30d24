use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::products::dto::{ProductFilter, ProductRequest};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub product_title: String,
    pub category: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub condition: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub negotiable: bool,
    pub screen_size: Option<String>,
    pub merchant_id: Option<Uuid>,
    pub product_image_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

const PRODUCT_COLUMNS: &str = "id, product_title, category, brand, model, color, condition, \
     description, price, negotiable, screen_size, merchant_id, product_image_url, \
     created_at, updated_at";

impl Product {
    pub async fn create(db: &PgPool, req: &ProductRequest) -> Result<Product, ApiError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (id, product_title, category, brand, model, color, condition,
                 description, price, negotiable, screen_size, merchant_id, product_image_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&req.product_title)
        .bind(&req.category)
        .bind(&req.brand)
        .bind(&req.model)
        .bind(&req.color)
        .bind(&req.condition)
        .bind(&req.description)
        .bind(req.price)
        .bind(req.negotiable)
        .bind(&req.screen_size)
        .bind(req.merchant_id)
        .bind(&req.product_image_url)
        .fetch_one(db)
        .await?;
        Ok(product)
    }

    /// List products, newest first, with the two optional equality filters.
    pub async fn list(db: &PgPool, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));

        let mut first = true;
        if let Some(category) = &filter.category {
            query.push(" WHERE category = ").push_bind(category);
            first = false;
        }
        if let Some(merchant_id) = filter.merchant_id {
            query.push(if first { " WHERE " } else { " AND " });
            query.push("merchant_id = ").push_bind(merchant_id);
        }
        query.push(" ORDER BY created_at DESC");

        let rows = query.build_query_as::<Product>().fetch_all(db).await?;
        Ok(rows)
    }

    pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<Product>, ApiError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(product)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        req: &ProductRequest,
    ) -> Result<Option<Product>, ApiError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products
             SET product_title = $1, category = $2, brand = $3, model = $4, color = $5,
                 condition = $6, description = $7, price = $8, negotiable = $9,
                 screen_size = $10, merchant_id = $11, product_image_url = $12,
                 updated_at = NOW()
             WHERE id = $13
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&req.product_title)
        .bind(&req.category)
        .bind(&req.brand)
        .bind(&req.model)
        .bind(&req.color)
        .bind(&req.condition)
        .bind(&req.description)
        .bind(req.price)
        .bind(req.negotiable)
        .bind(&req.screen_size)
        .bind(req.merchant_id)
        .bind(&req.product_image_url)
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(product)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

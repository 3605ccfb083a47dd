//! Public catalog surface: products, site testimonials, product reviews and
//! carts. Product and cart documents are schema-light JSONB; only the fields
//! the service itself filters or merges on are pulled into columns.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use common_http_errors::{ApiError, ApiResult};

use crate::app::{store_error, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inserted {
    pub inserted_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct Removed {
    pub message: &'static str,
}

fn with_id(id: Uuid, doc: Value) -> Value {
    match doc {
        Value::Object(mut map) => {
            map.insert("id".to_string(), Value::String(id.to_string()));
            Value::Object(map)
        }
        other => serde_json::json!({ "id": id, "doc": other }),
    }
}

pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Value>>> {
    let rows: Vec<(Uuid, Value)> = sqlx::query_as("SELECT id, doc FROM products")
        .fetch_all(&state.db)
        .await
        .map_err(store_error)?;
    Ok(Json(rows.into_iter().map(|(id, doc)| with_id(id, doc)).collect()))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(doc): Json<Map<String, Value>>,
) -> ApiResult<Json<Inserted>> {
    let inserted_id: Uuid =
        sqlx::query_scalar("INSERT INTO products (id, doc) VALUES ($1, $2) RETURNING id")
            .bind(Uuid::new_v4())
            .bind(Value::Object(doc))
            .fetch_one(&state.db)
            .await
            .map_err(store_error)?;
    Ok(Json(Inserted { inserted_id }))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let row: Option<(Uuid, Value)> = sqlx::query_as("SELECT id, doc FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await
        .map_err(store_error)?;
    row.map(|(id, doc)| Json(with_id(id, doc)))
        .ok_or_else(|| ApiError::not_found("product_not_found"))
}

/// Shallow merge: top-level keys in the patch overwrite the stored document.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(updates): Json<Map<String, Value>>,
) -> ApiResult<Json<Value>> {
    let row: Option<(Uuid, Value)> = sqlx::query_as(
        "UPDATE products SET doc = doc || $2 WHERE id = $1 RETURNING id, doc",
    )
    .bind(id)
    .bind(Value::Object(updates))
    .fetch_optional(&state.db)
    .await
    .map_err(store_error)?;
    row.map(|(id, doc)| Json(with_id(id, doc)))
        .ok_or_else(|| ApiError::not_found("product_not_found"))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Removed>> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(store_error)?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("product_not_found"));
    }
    Ok(Json(Removed {
        message: "Product deleted successfully.",
    }))
}

/// Site-wide testimonials, seeded out of band; this surface is read-only.
pub async fn list_testimonials(State(state): State<AppState>) -> ApiResult<Json<Vec<Value>>> {
    let rows: Vec<(Uuid, Value)> = sqlx::query_as("SELECT id, doc FROM reviews")
        .fetch_all(&state.db)
        .await
        .map_err(store_error)?;
    Ok(Json(rows.into_iter().map(|(id, doc)| with_id(id, doc)).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub rating: i32,
    pub review_text: String,
    pub product_name: String,
    pub name: String,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub rating: i32,
    pub review_text: String,
    pub product_name: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

pub async fn list_reviews(State(state): State<AppState>) -> ApiResult<Json<Vec<Review>>> {
    let reviews = sqlx::query_as::<_, Review>(
        "SELECT id, rating, review_text, product_name, name, created_at \
         FROM product_reviews ORDER BY created_at DESC",
    )
    .fetch_all(&state.db)
    .await
    .map_err(store_error)?;
    Ok(Json(reviews))
}

pub async fn create_review(
    State(state): State<AppState>,
    Json(new_review): Json<NewReview>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let review = sqlx::query_as::<_, Review>(
        "INSERT INTO product_reviews (id, rating, review_text, product_name, name) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, rating, review_text, product_name, name, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(new_review.rating)
    .bind(&new_review.review_text)
    .bind(&new_review.product_name)
    .bind(&new_review.name)
    .fetch_one(&state.db)
    .await
    .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(review)))
}

#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub email: String,
}

/// `GET /carts?email=`: a shopper's saved cart items.
pub async fn list_cart(
    State(state): State<AppState>,
    Query(query): Query<CartQuery>,
) -> ApiResult<Json<Vec<Value>>> {
    let rows: Vec<(Uuid, Value)> = sqlx::query_as("SELECT id, doc FROM carts WHERE email = $1")
        .bind(&query.email)
        .fetch_all(&state.db)
        .await
        .map_err(store_error)?;
    Ok(Json(rows.into_iter().map(|(id, doc)| with_id(id, doc)).collect()))
}

/// The owning email is lifted out of the document so reads can filter on a
/// plain column; the document itself is stored unchanged.
pub async fn add_cart_item(
    State(state): State<AppState>,
    Json(doc): Json<Map<String, Value>>,
) -> ApiResult<Json<Inserted>> {
    let email = doc.get("email").and_then(Value::as_str).map(str::to_owned);
    let inserted_id: Uuid =
        sqlx::query_scalar("INSERT INTO carts (id, email, doc) VALUES ($1, $2, $3) RETURNING id")
            .bind(Uuid::new_v4())
            .bind(email)
            .bind(Value::Object(doc))
            .fetch_one(&state.db)
            .await
            .map_err(store_error)?;
    Ok(Json(Inserted { inserted_id }))
}

pub async fn remove_cart_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Removed>> {
    let result = sqlx::query("DELETE FROM carts WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(store_error)?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("cart_item_not_found"));
    }
    Ok(Json(Removed {
        message: "Cart item removed.",
    }))
}

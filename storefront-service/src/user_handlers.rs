use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use common_auth::{AuthContext, IdentityClaim};
use common_http_errors::{ApiError, ApiResult};

use crate::app::{store_error, token_error, AppState};

pub const ROLE_STANDARD: &str = "standard";
pub const ROLE_ADMIN: &str = "admin";

/// Registration payload: the subject email plus whatever profile fields the
/// storefront collects at sign-up. Unknown fields land in the profile
/// document unchanged.
#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub email: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

/// Outcome of `POST /users`. `insertedId` is always present so clients can
/// branch on null; a duplicate email is a no-op, not an error.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReport {
    pub inserted_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// Create a directory entry with the `standard` role.
///
/// Existence check and insert are a single statement, so two concurrent
/// registrations of one email cannot both report success: exactly one gets
/// an id back, the other hits the conflict arm and inserts nothing.
pub async fn register_user(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> ApiResult<Json<RegisterReport>> {
    if new_user.email.trim().is_empty() {
        return Err(ApiError::bad_request("missing_email", "email must not be empty"));
    }

    let inserted: Option<Uuid> = sqlx::query_scalar(
        "INSERT INTO users (id, email, role, profile) VALUES ($1, $2, $3, $4) \
         ON CONFLICT (email) DO NOTHING \
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(&new_user.email)
    .bind(ROLE_STANDARD)
    .bind(Value::Object(new_user.profile))
    .fetch_optional(&state.db)
    .await
    .map_err(store_error)?;

    let report = match inserted {
        Some(id) => RegisterReport {
            inserted_id: Some(id),
            message: None,
        },
        None => RegisterReport {
            inserted_id: None,
            message: Some("User Already Created"),
        },
    };
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
pub struct SessionToken {
    pub token: String,
}

/// `POST /session`: exchange an identity claim for a signed session token.
///
/// Issuance is deliberately cheap: the claim is not cross-checked against
/// the directory. Role and ownership checks happen on every protected
/// request instead.
pub async fn issue_session(
    State(state): State<AppState>,
    Json(claim): Json<IdentityClaim>,
) -> ApiResult<Json<SessionToken>> {
    let token = state.tokens.issue(&claim).map_err(token_error)?;
    Ok(Json(SessionToken { token }))
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

/// `PATCH /users/:id`: promote a user to the admin role.
///
/// Promotion is an explicit directory write and never travels inside a
/// token; a promoted user is admin on their next request without
/// re-authenticating. Overwriting `admin` with `admin` is a plain success.
pub async fn promote_user(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET role = $2 WHERE id = $1 RETURNING id, email, role",
    )
    .bind(id)
    .bind(ROLE_ADMIN)
    .fetch_optional(&state.db)
    .await
    .map_err(store_error)?;

    user.map(Json).ok_or_else(|| ApiError::not_found("user_not_found"))
}

/// `GET /users`: the whole directory, newest first.
pub async fn list_users(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> ApiResult<Json<Vec<User>>> {
    let users =
        sqlx::query_as::<_, User>("SELECT id, email, role FROM users ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await
            .map_err(store_error)?;
    Ok(Json(users))
}

#[derive(Debug, Serialize)]
pub struct Removed {
    pub message: &'static str,
}

/// `DELETE /users/:id`: drop a directory entry. Orders and carts are keyed
/// by email, not user id, so nothing cascades.
pub async fn delete_user(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Removed>> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(store_error)?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("user_not_found"));
    }
    Ok(Json(Removed {
        message: "User removed.",
    }))
}

#[derive(Debug, Serialize)]
pub struct AdminStatus {
    pub admin: bool,
}

/// `GET /users/:email`: report whether the caller holds the admin role.
///
/// Callers may only ask about themselves; the ownership check runs before
/// the directory is touched. The role is read fresh so promotions take
/// effect without re-login, and an email with no directory entry reports
/// `false` rather than an error.
pub async fn admin_status(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(email): Path<String>,
) -> ApiResult<Json<AdminStatus>> {
    if auth.subject() != email {
        return Err(ApiError::Forbidden);
    }

    let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await
        .map_err(store_error)?;

    Ok(Json(AdminStatus {
        admin: role.as_deref() == Some(ROLE_ADMIN),
    }))
}

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::extract::ValidJson;
use crate::api::types::{ApiContext, TokenResponse};
use crate::auth;
use crate::models::{AdminLogin, Role};

/// `POST /admin/login`
pub async fn login(
    State(ctx): State<ApiContext>,
    ValidJson(body): ValidJson<AdminLogin>,
) -> Result<Json<TokenResponse>, ApiError> {
    let tokens = ctx.tokens.clone();
    let token = ctx
        .with_db(move |conn| {
            Ok(auth::login(conn, &tokens, Role::Admin, &body.username, &body.password)?)
        })
        .await?;
    Ok(Json(TokenResponse { token }))
}

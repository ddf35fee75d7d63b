use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use surveyrpc_core::AppError;
use tracing::error;

use crate::dto::{INTERNAL_ERROR, RpcRequest, RpcResponse};
use crate::error::ApiResult;
use crate::rpc;
use crate::state::AppState;

pub async fn rpc_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<RpcResponse>> {
    let request: RpcRequest = serde_json::from_slice(&body).map_err(|error| {
        AppError::Validation(format!("malformed JSON-RPC request: {error}"))
    })?;

    let id = request.id.clone();
    let method = request.method.clone();
    let remote_control = state.remote_control.clone();

    // Detached so that a dropped connection cannot cancel a call halfway.
    let call = tokio::spawn(async move { rpc::dispatch(&remote_control, request).await });

    match call.await {
        Ok(response) => Ok(Json(response)),
        Err(join_error) => {
            error!(%method, error = %join_error, "remote-control call aborted");
            Ok(Json(RpcResponse::failure(
                id,
                INTERNAL_ERROR,
                "remote-control call aborted",
            )))
        }
    }
}

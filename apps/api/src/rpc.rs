//! Remote-control method dispatch and wire shaping.
//!
//! Status results keep the host's historical keys: `update_response`
//! reports failures under `Status`, every other method (and an invalid
//! session everywhere) under `status`.

mod params;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde_json::{Value, json};
use surveyrpc_application::RemoteControlService;
use surveyrpc_core::AppError;
use surveyrpc_domain::{RpcOutcome, RpcStatus};
use tracing::error;

use crate::dto::{INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND, RpcRequest, RpcResponse};

use self::params::Params;

/// Failure that turns into the reply's `error` object.
#[derive(Debug)]
enum CallError {
    MethodNotFound(String),
    InvalidParams(String),
    Fault(AppError),
}

impl From<AppError> for CallError {
    fn from(value: AppError) -> Self {
        Self::Fault(value)
    }
}

/// Runs one call against the remote-control service.
pub async fn dispatch(remote_control: &RemoteControlService, request: RpcRequest) -> RpcResponse {
    let RpcRequest { method, params, id } = request;

    match call(remote_control, &method, Params::new(&params)).await {
        Ok(result) => RpcResponse::success(id, result),
        Err(CallError::MethodNotFound(method)) => {
            RpcResponse::failure(id, METHOD_NOT_FOUND, format!("method '{method}' not found"))
        }
        Err(CallError::InvalidParams(message)) => RpcResponse::failure(id, INVALID_PARAMS, message),
        Err(CallError::Fault(fault)) => {
            error!(%method, error = %fault, "remote-control call failed");
            RpcResponse::failure(id, INTERNAL_ERROR, fault.to_string())
        }
    }
}

async fn call(
    remote_control: &RemoteControlService,
    method: &str,
    params: Params<'_>,
) -> Result<Value, CallError> {
    match method {
        "get_me" => {
            let session_key = params.session_key();
            let profile = remote_control.get_me(&session_key).await?;
            serde_json::to_value(profile).map_err(|error| {
                CallError::Fault(AppError::Internal(format!(
                    "failed to serialize user profile: {error}"
                )))
            })
        }
        "hasGlobalPermission" => {
            let session_key = params.session_key();
            let permission = params.string(1, "sPermission")?;
            let verb = params.crud_verb(2);
            let outcome = remote_control
                .has_global_permission(&session_key, &permission, &verb)
                .await?;
            Ok(permission_result(outcome))
        }
        "hasSurveyPermission" => {
            let session_key = params.session_key();
            let survey_id = params.survey_id(1);
            let permission = params.string(2, "sPermission")?;
            let verb = params.crud_verb(3);
            let outcome = remote_control
                .has_survey_permission(&session_key, survey_id, &permission, &verb)
                .await?;
            Ok(permission_result(outcome))
        }
        "export_survey" => {
            let session_key = params.session_key();
            let survey_id = params.survey_id(1);
            let outcome = remote_control
                .export_survey(&session_key, survey_id)
                .await?;
            Ok(match outcome {
                Ok(archive) => Value::String(BASE64_STANDARD.encode(archive.bytes)),
                Err(status) => status_result("status", &status),
            })
        }
        "update_response" => {
            let session_key = params.session_key();
            let survey_id = params.survey_id(1);
            let fields = params.object(2);
            let outcome = remote_control
                .update_response(&session_key, survey_id, fields)
                .await?;
            Ok(match outcome {
                Ok(()) => Value::Bool(true),
                Err(RpcStatus::InvalidSession) => {
                    status_result("status", &RpcStatus::InvalidSession)
                }
                Err(status) => status_result("Status", &status),
            })
        }
        "delete_responses" => {
            let session_key = params.session_key();
            let survey_id = params.survey_id(1);
            let selection = params.value(2);
            let outcome = remote_control
                .delete_responses(&session_key, survey_id, &selection)
                .await?;
            Ok(match outcome {
                Ok(()) => json!({ "status": "OK" }),
                Err(status) => status_result("status", &status),
            })
        }
        other => Err(CallError::MethodNotFound(other.to_owned())),
    }
}

fn permission_result(outcome: RpcOutcome<bool>) -> Value {
    match outcome {
        Ok(permission) => json!({ "permission": permission }),
        Err(status) => status_result("status", &status),
    }
}

fn status_result(key: &str, status: &RpcStatus) -> Value {
    let mut result = serde_json::Map::new();
    result.insert(key.to_owned(), Value::String(status.message()));
    Value::Object(result)
}

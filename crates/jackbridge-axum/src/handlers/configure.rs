//! Configure handlers - parameters stored in the service's defaults file.

use axum::Json;
use axum::extract::{Path, State};
use jackbridge_core::{Constraint, ParamValue, ParameterValue};
use jackbridge_runtime::ParameterUpdate;
use serde::Deserialize;

use crate::error::HttpError;
use crate::state::AppState;

/// Request body for setting a parameter.
#[derive(Debug, Deserialize)]
pub struct SetParameterBody {
    pub value: ParamValue,
}

pub async fn get(
    State(state): State<AppState>,
    Path((group, name)): Path<(String, String)>,
) -> Result<Json<ParameterValue>, HttpError> {
    Ok(Json(state.configure.get(&[group, name]).await?))
}

pub async fn set(
    State(state): State<AppState>,
    Path((group, name)): Path<(String, String)>,
    Json(body): Json<SetParameterBody>,
) -> Result<Json<ParameterUpdate>, HttpError> {
    Ok(Json(state.configure.set(&[group, name], body.value).await?))
}

/// Restore the parameter's default value.
pub async fn reset(
    State(state): State<AppState>,
    Path((group, name)): Path<(String, String)>,
) -> Result<Json<ParameterUpdate>, HttpError> {
    Ok(Json(state.configure.reset(&[group, name]).await?))
}

pub async fn constraint(
    State(state): State<AppState>,
    Path((group, name)): Path<(String, String)>,
) -> Result<Json<Constraint>, HttpError> {
    Ok(Json(state.configure.constraint(&[group, name]).await?))
}

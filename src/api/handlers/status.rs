//! Routes of the skeleton REST API. The table-backed resource routes are not part of this service.

use crate::api::error::AppError;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
pub struct WelcomeResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub api: String,
    pub version: String,
    pub time: DateTime<Utc>,
}

pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: format!("Welcome to the {} API", env!("CARGO_PKG_NAME")),
    })
}

pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        api: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        time: Utc::now(),
    })
}

pub async fn not_found() -> AppError {
    AppError::route_not_found()
}

//! Build identification endpoint
//!
//! Values are captured by build.rs at compile time.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use super::AppState;

pub const GIT_HASH: &str = env!("GIT_HASH");
pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");
pub const BUILD_PROFILE: &str = env!("BUILD_PROFILE");

#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
    pub build_profile: String,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            git_hash: GIT_HASH.to_string(),
            build_timestamp: BUILD_TIMESTAMP.to_string(),
            build_profile: BUILD_PROFILE.to_string(),
        }
    }
}

/// GET /build_info
pub async fn build_info() -> Json<BuildInfo> {
    Json(BuildInfo::current())
}

pub fn buildinfo_routes() -> Router<AppState> {
    Router::new().route("/build_info", get(build_info))
}

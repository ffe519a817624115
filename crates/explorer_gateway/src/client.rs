use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use explorer_core::{
    EndpointCatalog, ExecutionReport, FavoriteEntry, FileRow, PageResponse, Settings, UserContext,
};

use crate::fault::Fault;
use crate::gateway::{CallMethod, RemoteApiGateway};

/// Dotted operation paths as served by the platform.
mod ops {
    pub const USER_CONTEXT: &str = "explorer.auth.get_current_user_context";
    pub const SETTINGS: &str = "explorer.settings.get_settings";
    pub const SCAN: &str = "explorer.scanner.scan_endpoints";
    pub const CLEAR_SCAN_CACHE: &str = "explorer.scanner.clear_cache";
    pub const FAVORITES: &str = "explorer.favorites.get_favorites";
    pub const ADD_FAVORITE: &str = "explorer.favorites.add_favorite";
    pub const REMOVE_FAVORITE: &str = "explorer.favorites.remove_favorite";
    pub const EXECUTE: &str = "explorer.executor.execute_endpoint";
    pub const PAGINATED: &str = "explorer.pagination.get_paginated_endpoints";
    pub const SCHEMA: &str = "explorer.openapi.get_endpoint_schema";
    pub const TRACK_LOGIN: &str = "explorer.history.track_login";
    pub const TRACK_LOGOUT: &str = "explorer.history.track_logout";
    pub const LOGOUT: &str = "logout";
}

/// The remote operations the console consumes. [`RemoteApiGateway`] is the
/// production implementation; tests substitute stubs.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    async fn get_current_user_context(&self) -> Result<UserContext, Fault>;
    async fn get_settings(&self) -> Result<Settings, Fault>;
    async fn scan_endpoints(&self) -> Result<EndpointCatalog, Fault>;
    async fn get_favorites(&self) -> Result<Vec<FavoriteEntry>, Fault>;
    async fn add_favorite(&self, name: &str, path: &str) -> Result<(), Fault>;
    async fn remove_favorite(&self, path: &str) -> Result<(), Fault>;
    async fn execute_endpoint(
        &self,
        path: &str,
        parameters: &[(String, String)],
        files: &[FileRow],
    ) -> Result<ExecutionReport, Fault>;
    async fn get_paginated_endpoints(
        &self,
        app: &str,
        category: &str,
        page: usize,
        query: &str,
    ) -> Result<PageResponse, Fault>;
    async fn get_endpoint_schema(&self, path: &str) -> Result<Value, Fault>;
    async fn track_login(&self) -> Result<(), Fault>;
    async fn track_logout(&self) -> Result<(), Fault>;
    async fn logout(&self) -> Result<(), Fault>;
    async fn clear_scan_cache(&self) -> Result<(), Fault>;
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, Fault> {
    serde_json::from_value(value)
        .map_err(|err| Fault::Application(format!("unexpected {what} payload: {err}")))
}

/// Mutation acks carry `{success, message}`; a rejected mutation is a fault
/// so the caller can compensate.
fn check_ack(value: Value, what: &str) -> Result<(), Fault> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("rejected")
            .to_string();
        return Err(Fault::Application(format!("{what}: {message}")));
    }
    Ok(())
}

#[async_trait]
impl PlatformClient for RemoteApiGateway {
    async fn get_current_user_context(&self) -> Result<UserContext, Fault> {
        let payload = self.call(ops::USER_CONTEXT, CallMethod::Get, &[]).await?;
        decode(payload, "user context")
    }

    async fn get_settings(&self) -> Result<Settings, Fault> {
        let payload = self.call(ops::SETTINGS, CallMethod::Get, &[]).await?;
        decode(payload, "settings")
    }

    async fn scan_endpoints(&self) -> Result<EndpointCatalog, Fault> {
        let payload = self.call(ops::SCAN, CallMethod::Get, &[]).await?;
        let apps = payload.get("apps").cloned().unwrap_or_else(|| json!({}));
        decode(apps, "endpoint catalog")
    }

    async fn get_favorites(&self) -> Result<Vec<FavoriteEntry>, Fault> {
        let payload = self.call(ops::FAVORITES, CallMethod::Get, &[]).await?;
        decode(payload, "favorites")
    }

    async fn add_favorite(&self, name: &str, path: &str) -> Result<(), Fault> {
        let payload = self
            .call(
                ops::ADD_FAVORITE,
                CallMethod::Post,
                &[("name", name.to_string()), ("path", path.to_string())],
            )
            .await?;
        check_ack(payload, "add favorite")
    }

    async fn remove_favorite(&self, path: &str) -> Result<(), Fault> {
        let payload = self
            .call(
                ops::REMOVE_FAVORITE,
                CallMethod::Post,
                &[("path", path.to_string())],
            )
            .await?;
        check_ack(payload, "remove favorite")
    }

    async fn execute_endpoint(
        &self,
        path: &str,
        parameters: &[(String, String)],
        files: &[FileRow],
    ) -> Result<ExecutionReport, Fault> {
        let parameter_map: serde_json::Map<String, Value> = parameters
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();
        let file_rows: Vec<Value> = files
            .iter()
            .map(|row| {
                json!({
                    "key": row.key,
                    "file_name": row.file_name,
                    "mode": format!("{:?}", row.mode),
                })
            })
            .collect();
        let payload = self
            .call(
                ops::EXECUTE,
                CallMethod::Post,
                &[
                    ("endpoint_path", path.to_string()),
                    ("parameters", Value::Object(parameter_map).to_string()),
                    ("files", Value::Array(file_rows).to_string()),
                ],
            )
            .await?;
        decode(payload, "execution report")
    }

    async fn get_paginated_endpoints(
        &self,
        app: &str,
        category: &str,
        page: usize,
        query: &str,
    ) -> Result<PageResponse, Fault> {
        let payload = self
            .call(
                ops::PAGINATED,
                CallMethod::Get,
                &[
                    ("app_name", app.to_string()),
                    ("category", category.to_string()),
                    ("page", page.to_string()),
                    ("search_query", query.to_string()),
                ],
            )
            .await?;
        decode(payload, "paginated endpoints")
    }

    async fn get_endpoint_schema(&self, path: &str) -> Result<Value, Fault> {
        self.call(
            ops::SCHEMA,
            CallMethod::Post,
            &[("endpoint_path", path.to_string())],
        )
        .await
    }

    async fn track_login(&self) -> Result<(), Fault> {
        self.call(ops::TRACK_LOGIN, CallMethod::Post, &[]).await?;
        Ok(())
    }

    async fn track_logout(&self) -> Result<(), Fault> {
        self.call(ops::TRACK_LOGOUT, CallMethod::Post, &[]).await?;
        Ok(())
    }

    async fn logout(&self) -> Result<(), Fault> {
        self.call(ops::LOGOUT, CallMethod::Post, &[]).await?;
        Ok(())
    }

    async fn clear_scan_cache(&self) -> Result<(), Fault> {
        self.call(ops::CLEAR_SCAN_CACHE, CallMethod::Post, &[])
            .await?;
        Ok(())
    }
}

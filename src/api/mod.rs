//! HTTP API
//!
//! A thin axum layer over [`ExpenseService`](crate::services::ExpenseService).
//! The caller's company comes from the `x-company-id` header; the ledger
//! itself is synchronous and runs on tokio's blocking pool.

mod handlers;
mod response;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::storage::Storage;

pub use handlers::COMPANY_HEADER;
pub use response::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
}

pub fn router(storage: Arc<Storage>) -> Router {
    Router::new()
        .route(
            "/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route(
            "/expenses/:id",
            get(handlers::get_expense)
                .put(handlers::update_expense)
                .delete(handlers::delete_expense),
        )
        .with_state(AppState { storage })
}

/// Serve the API on `addr` until Ctrl-C
pub async fn serve(storage: Arc<Storage>, addr: &str) -> LedgerResult<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| LedgerError::Io(format!("Failed to bind {}: {}", addr, e)))?;
    info!("expense ledger listening on {addr}");

    axum::serve(listener, router(storage))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .map_err(|e| LedgerError::Io(format!("Server failed: {}", e)))
}

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{CompanyId, EmployeeId, ExpenseId, ProjectId};
use crate::services::{ExpenseDraft, ExpenseFilter, ExpenseService, ExpenseUpdate, ExpenseView};
use crate::storage::Storage;

use super::response::ApiError;
use super::AppState;

/// Header carrying the caller's company
pub const COMPANY_HEADER: &str = "x-company-id";

fn company_from_headers(headers: &HeaderMap) -> Result<CompanyId, ApiError> {
    headers
        .get(COMPANY_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<CompanyId>().ok())
        .ok_or_else(|| {
            ApiError::from_ledger(
                LedgerError::Unauthorized(format!("missing or invalid {} header", COMPANY_HEADER)),
                "Unauthorized",
                "auth",
            )
        })
}

fn expense_id(raw: &str) -> Result<ExpenseId, ApiError> {
    raw.parse::<ExpenseId>().map_err(|_| {
        ApiError::new(
            StatusCode::NOT_FOUND,
            LedgerError::expense_not_found(raw).to_string(),
        )
    })
}

/// Run a synchronous ledger call on the blocking pool
async fn run_blocking<T, F>(state: &AppState, f: F) -> LedgerResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Storage) -> LedgerResult<T> + Send + 'static,
{
    let storage = Arc::clone(&state.storage);
    tokio::task::spawn_blocking(move || f(&storage))
        .await
        .map_err(|e| LedgerError::Storage(format!("Ledger task failed: {}", e)))?
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListQuery {
    category: Option<String>,
    project_id: Option<ProjectId>,
    employee_id: Option<EmployeeId>,
}

pub(crate) async fn list_expenses(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ExpenseView>>, ApiError> {
    let company_id = company_from_headers(&headers)?;
    let filter = ExpenseFilter {
        category: query.category,
        project_id: query.project_id,
        employee_id: query.employee_id,
    };

    run_blocking(&state, move |storage| {
        let service = ExpenseService::new(storage);
        service
            .list(company_id, &filter)?
            .into_iter()
            .map(|e| service.expand(e))
            .collect::<LedgerResult<Vec<_>>>()
    })
    .await
    .map(Json)
    .map_err(|e| ApiError::from_ledger(e, "Failed to list expenses", "list"))
}

pub(crate) async fn create_expense(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ExpenseDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<ExpenseView>), ApiError> {
    let company_id = company_from_headers(&headers)?;
    let Json(draft) = payload?;

    run_blocking(&state, move |storage| {
        let service = ExpenseService::new(storage);
        let expense = service.create(company_id, draft)?;
        service.expand(expense)
    })
    .await
    .map(|view| (StatusCode::CREATED, Json(view)))
    .map_err(|e| ApiError::from_ledger(e, "Failed to create expense", "create"))
}

pub(crate) async fn get_expense(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<Json<ExpenseView>, ApiError> {
    let company_id = company_from_headers(&headers)?;
    let id = expense_id(&raw_id)?;

    run_blocking(&state, move |storage| {
        let service = ExpenseService::new(storage);
        let expense = service.get(company_id, id)?;
        service.expand(expense)
    })
    .await
    .map(Json)
    .map_err(|e| ApiError::from_ledger(e, "Failed to fetch expense", &raw_id))
}

pub(crate) async fn update_expense(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    payload: Result<Json<ExpenseUpdate>, JsonRejection>,
) -> Result<Json<ExpenseView>, ApiError> {
    let company_id = company_from_headers(&headers)?;
    let id = expense_id(&raw_id)?;
    let Json(update) = payload?;

    run_blocking(&state, move |storage| {
        let service = ExpenseService::new(storage);
        let expense = service.update(company_id, id, update)?;
        service.expand(expense)
    })
    .await
    .map(Json)
    .map_err(|e| ApiError::from_ledger(e, "Failed to update expense", &raw_id))
}

pub(crate) async fn delete_expense(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let company_id = company_from_headers(&headers)?;
    let id = expense_id(&raw_id)?;

    let deletion = run_blocking(&state, move |storage| {
        ExpenseService::new(storage).delete(company_id, id)
    })
    .await
    .map_err(|e| ApiError::from_ledger(e, "Failed to delete expense", &raw_id))?;

    let mut body = json!({
        "message": "Expense deleted successfully",
        "transactionsRemoved": deletion.transactions_removed,
    });
    if let Some(warning) = deletion.labor.warning() {
        body["laborWarning"] = json!(warning);
    }

    Ok(Json(body))
}

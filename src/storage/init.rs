//! Storage initialization
//!
//! First-run setup: directories, default settings and empty collection files.

use crate::config::paths::LedgerPaths;
use crate::config::settings::Settings;
use crate::error::LedgerError;

use super::Storage;

/// Initialize storage for a fresh installation
///
/// Existing settings and collection files are left untouched.
pub fn initialize_storage(paths: &LedgerPaths) -> Result<Settings, LedgerError> {
    paths.ensure_directories()?;

    let settings = Settings::load_or_create(paths)?;
    if !paths.settings_file().exists() {
        settings.save(paths)?;
    }

    let files = [
        paths.accounts_file(),
        paths.expenses_file(),
        paths.employees_file(),
        paths.project_labor_file(),
        paths.company_labor_file(),
        paths.transactions_file(),
    ];
    if files.iter().any(|f| !f.exists()) {
        // Loaded first so collections that already exist are rewritten as-is
        Storage::open(paths.clone())?.save_all()?;
    }

    Ok(settings)
}

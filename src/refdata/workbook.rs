use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ReferenceDataError;

/// Sheet of the reference workbook holding GL account codes and labels.
pub const GL_ACCOUNTS_SHEET: &str = "gl_accounts.csv";
/// Sheet of the reference workbook holding standardized expense categories.
pub const DATA_LIST_SHEET: &str = "data_list.csv";

/// One selectable GL account sourced from the reference workbook.
///
/// `label` is the display form shown to users: `"{account} - {name}"`
/// when the sheet carries a name column, otherwise the bare account code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlAccount {
    pub account: String,
    pub label: String,
}

impl GlAccount {
    fn from_row(account: &str, name: &str) -> Self {
        let account = account.trim().to_string();
        let name = name.trim();
        let label = if name.is_empty() {
            account.clone()
        } else {
            format!("{account} - {name}")
        };
        Self { account, label }
    }
}

/// Read GL account rows from the workbook's `gl_accounts.csv` sheet.
///
/// The first row is a header and is skipped; rows with a blank account
/// code are skipped as well, matching the template's trailing padding.
pub fn load_gl_accounts(dir: &Path) -> Result<Vec<GlAccount>, ReferenceDataError> {
    let path = sheet_path(dir, GL_ACCOUNTS_SHEET)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(&path)?;

    let mut accounts = Vec::new();
    for row in reader.records() {
        let record = row?;
        let account = record.get(0).unwrap_or("").trim();
        if account.is_empty() {
            continue;
        }
        let name = record.get(1).unwrap_or("");
        accounts.push(GlAccount::from_row(account, name));
    }
    Ok(accounts)
}

/// Read standardized expense categories from `data_list.csv`.
pub fn load_categories(dir: &Path) -> Result<Vec<String>, ReferenceDataError> {
    let path = sheet_path(dir, DATA_LIST_SHEET)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(&path)?;

    let mut categories = Vec::new();
    for row in reader.records() {
        let record = row?;
        let candidate = record.get(0).unwrap_or("").trim();
        if !candidate.is_empty() {
            categories.push(candidate.to_string());
        }
    }
    Ok(categories)
}

fn sheet_path(dir: &Path, sheet: &str) -> Result<std::path::PathBuf, ReferenceDataError> {
    if !dir.is_dir() {
        return Err(ReferenceDataError::MissingWorkbook {
            path: dir.display().to_string(),
        });
    }
    let path = dir.join(sheet);
    if !path.is_file() {
        return Err(ReferenceDataError::MissingSheet {
            path: dir.display().to_string(),
            sheet: sheet.to_string(),
        });
    }
    Ok(path)
}

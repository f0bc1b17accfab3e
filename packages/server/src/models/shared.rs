use serde::Serialize;

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based), after clamping into the existing range.
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 6)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages (at least 1).
    #[schema(example = 8)]
    pub total_pages: u64,
}

impl Pagination {
    /// Clamp `requested` into `[1, total_pages]`; an empty result set has one (empty) page.
    pub fn clamped(requested: i64, per_page: u64, total: u64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total.div_ceil(per_page).max(1);
        let page = u64::try_from(requested).unwrap_or(0).clamp(1, total_pages);
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.per_page
    }
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Trim a required text field and check it is 1-`max` Unicode characters.
pub fn validate_required_text(value: &str, label: &str, max: usize) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.chars().count() > max {
        return Err(format!("{label} must be 1-{max} characters"));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank becomes `None`.
pub fn validate_optional_text(
    value: Option<&str>,
    label: &str,
    max: usize,
) -> Result<Option<String>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.chars().count() > max => {
            Err(format!("{label} must be at most {max} characters"))
        }
        Some(v) => Ok(Some(v.to_string())),
    }
}

//! Page-number pagination for list endpoints.
//!
//! Lists answer with `{count, next, previous, results}`, where `next` and
//! `previous` are absolute URLs that keep every other query parameter.

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::{DisplayFromStr, serde_as};
use url::Url;

use crate::config::PaginationConfig;
use crate::error::AppError;

/// Page-number query parameters.
///
/// Uses `serde_with` to parse numbers from query strings.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<i64>,
}

/// A resolved page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl PageParams {
    /// Applies defaults and bounds from the configuration.
    ///
    /// `limit` is capped at `max_page_size`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `page` or `limit` is below 1, or if the
    /// page lies past the largest representable offset.
    pub fn resolve(&self, config: &PaginationConfig) -> Result<PageRequest, AppError> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(config.page_size);

        if page < 1 {
            return Err(AppError::bad_request(
                "Invalid page",
                json!({ "page": ["Page must be greater than 0"] }),
            ));
        }
        if limit < 1 {
            return Err(AppError::bad_request(
                "Invalid page size",
                json!({ "limit": ["Limit must be greater than 0"] }),
            ));
        }

        let limit = limit.min(config.max_page_size);
        if page.checked_mul(limit).is_none() {
            return Err(AppError::bad_request(
                "Invalid page",
                json!({ "page": ["Page is out of range"] }),
            ));
        }

        Ok(PageRequest { page, limit })
    }
}

/// A page of results.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Builds the page and its neighbour links.
    ///
    /// `base_url` and `path` locate the endpoint; `query` is the raw query
    /// string of the current request.
    pub fn new(
        results: Vec<T>,
        count: i64,
        request: PageRequest,
        base_url: &str,
        path: &str,
        query: Option<&str>,
    ) -> Self {
        let has_next = request.page.saturating_mul(request.limit) < count;
        let has_previous = request.page > 1;

        Self {
            next: has_next
                .then(|| page_link(base_url, path, query, request.page + 1))
                .flatten(),
            previous: has_previous
                .then(|| page_link(base_url, path, query, request.page - 1))
                .flatten(),
            count,
            results,
        }
    }

    /// Builds a limit/offset page and its neighbour links.
    pub fn with_offset(
        results: Vec<T>,
        count: i64,
        offset: i64,
        limit: i64,
        base_url: &str,
        path: &str,
        query: Option<&str>,
    ) -> Self {
        let next_offset = offset.saturating_add(limit);
        let previous_offset = offset.saturating_sub(limit).max(0);

        Self {
            next: (next_offset < count)
                .then(|| replace_param(base_url, path, query, "offset", Some(next_offset)))
                .flatten(),
            previous: (offset > 0)
                .then(|| {
                    replace_param(
                        base_url,
                        path,
                        query,
                        "offset",
                        (previous_offset > 0).then_some(previous_offset),
                    )
                })
                .flatten(),
            count,
            results,
        }
    }
}

/// URL of `page`, keeping all other query parameters. Page 1 has no `page`
/// parameter.
pub fn page_link(base_url: &str, path: &str, query: Option<&str>, page: i64) -> Option<String> {
    replace_param(base_url, path, query, "page", (page > 1).then_some(page))
}

/// Rebuilds the request URL with `param` set to `value`, or removed when `None`.
fn replace_param(
    base_url: &str,
    path: &str,
    query: Option<&str>,
    param: &str,
    value: Option<i64>,
) -> Option<String> {
    let mut url = Url::parse(&format!("{base_url}{path}")).ok()?;

    let kept: Vec<(String, String)> = url::form_urlencoded::parse(query.unwrap_or("").as_bytes())
        .filter(|(key, _)| key != param)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() && value.is_none() {
        url.set_query(None);
    } else {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        pairs.extend_pairs(&kept);
        if let Some(value) = value {
            pairs.append_pair(param, &value.to_string());
        }
    }

    Some(url.to_string())
}

/// Reads one query parameter as an integer.
pub fn parse_int(field: &'static str, value: &str) -> Result<i64, AppError> {
    value.trim().parse().map_err(|_| {
        AppError::bad_request(
            "Invalid query parameter",
            json!({ field: ["A valid integer is required"] }),
        )
    })
}

/// Reads a `0`/`1` style flag.
pub fn parse_flag(field: &'static str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(AppError::bad_request(
            "Invalid query parameter",
            json!({ field: ["Must be 0 or 1"] }),
        )),
    }
}

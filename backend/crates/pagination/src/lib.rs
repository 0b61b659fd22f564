//! Offset paging primitives shared by backend list endpoints.
//!
//! A [`PageRequest`] captures the optional offset/limit window a client asked
//! for. A [`Page`] carries the selected items together with the total number
//! of matching rows. The total never depends on the window: callers compute
//! it from the filtered, unpaged result set.
//!
//! # Examples
//!
//! ```
//! use pagination::{Page, PageRequest};
//!
//! let request = PageRequest::new(Some(1), Some(2));
//! let items = request.apply(vec!["a", "b", "c", "d"]);
//! let page = Page::new(items, 4, request);
//!
//! assert_eq!(page.items(), &["b", "c"]);
//! assert_eq!(page.total(), 4);
//! ```

use serde::{Deserialize, Serialize};

/// Response header carrying the offset that produced a page.
pub const PAGING_OFFSET_HEADER: &str = "X-Paging-Offset";
/// Response header carrying the effective page size.
pub const PAGING_LIMIT_HEADER: &str = "X-Paging-Limit";
/// Response header carrying the filtered, unpaged row count.
pub const PAGING_TOTAL_HEADER: &str = "X-Paging-Total";

/// Errors raised when raw paging parameters cannot form a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// The requested offset was negative.
    #[error("offset must not be negative, got {value}")]
    NegativeOffset {
        /// Rejected raw value.
        value: i64,
    },
    /// The requested limit was negative.
    #[error("limit must not be negative, got {value}")]
    NegativeLimit {
        /// Rejected raw value.
        value: i64,
    },
}

/// Paging window requested by a caller.
///
/// `None` in either dimension means unbounded: no rows skipped, or no cap on
/// the number of rows returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    offset: Option<u64>,
    limit: Option<u64>,
}

impl PageRequest {
    /// Window that returns every matching row.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            offset: None,
            limit: None,
        }
    }

    /// Build a window from already validated values.
    #[must_use]
    pub const fn new(offset: Option<u64>, limit: Option<u64>) -> Self {
        Self { offset, limit }
    }

    /// Validate signed query parameters into a window.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when either value is negative.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagination::{PageRequest, PageRequestError};
    ///
    /// assert!(PageRequest::try_from_raw(Some(0), Some(10)).is_ok());
    /// assert_eq!(
    ///     PageRequest::try_from_raw(Some(-1), None),
    ///     Err(PageRequestError::NegativeOffset { value: -1 })
    /// );
    /// ```
    pub fn try_from_raw(offset: Option<i64>, limit: Option<i64>) -> Result<Self, PageRequestError> {
        let offset = offset
            .map(|value| u64::try_from(value).map_err(|_| PageRequestError::NegativeOffset { value }))
            .transpose()?;
        let limit = limit
            .map(|value| u64::try_from(value).map_err(|_| PageRequestError::NegativeLimit { value }))
            .transpose()?;
        Ok(Self { offset, limit })
    }

    /// Number of rows to skip, if bounded.
    #[must_use]
    pub const fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Maximum number of rows to return, if bounded.
    #[must_use]
    pub const fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Whether the window leaves the result set untouched.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.offset.is_none() && self.limit.is_none()
    }

    /// Apply the window to an already filtered and ordered sequence.
    #[must_use]
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skip = self
            .offset
            .map_or(0, |offset| usize::try_from(offset).unwrap_or(usize::MAX));
        let take = self
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
        items.into_iter().skip(skip).take(take).collect()
    }
}

/// One window of results plus the unpaged total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    total: u64,
    #[serde(flatten)]
    request: PageRequest,
}

impl<T> Page<T> {
    /// Assemble a page from its parts.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    /// Items inside the window.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Filtered row count, independent of the window.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Window that produced this page.
    #[must_use]
    pub const fn request(&self) -> PageRequest {
        self.request
    }

    /// Consume the page, returning `(items, total)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, u64) {
        (self.items, self.total)
    }

    /// Consume the page, returning only the items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Convert every item while keeping the total and window.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }

    /// Header name/value pairs describing this page.
    ///
    /// An unbounded offset is reported as `0`; an unbounded limit is reported
    /// as the number of items actually returned.
    #[must_use]
    pub fn headers(&self) -> [(&'static str, String); 3] {
        let offset = self.request.offset().unwrap_or(0);
        let limit = self
            .request
            .limit()
            .unwrap_or_else(|| u64::try_from(self.items.len()).unwrap_or(u64::MAX));
        [
            (PAGING_OFFSET_HEADER, offset.to_string()),
            (PAGING_LIMIT_HEADER, limit.to_string()),
            (PAGING_TOTAL_HEADER, self.total.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for paging windows and envelopes.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PageRequest::unbounded(), vec![1, 2, 3, 4])]
    #[case(PageRequest::new(Some(2), None), vec![3, 4])]
    #[case(PageRequest::new(None, Some(1)), vec![1])]
    #[case(PageRequest::new(Some(1), Some(2)), vec![2, 3])]
    #[case(PageRequest::new(Some(10), Some(2)), vec![])]
    #[case(PageRequest::new(Some(0), Some(0)), vec![])]
    fn apply_respects_window(#[case] request: PageRequest, #[case] expected: Vec<i32>) {
        assert_eq!(request.apply(vec![1, 2, 3, 4]), expected);
    }

    #[rstest]
    #[case(Some(-3), None, PageRequestError::NegativeOffset { value: -3 })]
    #[case(None, Some(-1), PageRequestError::NegativeLimit { value: -1 })]
    fn try_from_raw_rejects_negative_values(
        #[case] offset: Option<i64>,
        #[case] limit: Option<i64>,
        #[case] expected: PageRequestError,
    ) {
        assert_eq!(PageRequest::try_from_raw(offset, limit), Err(expected));
    }

    #[rstest]
    fn headers_report_window_and_total() {
        let page = Page::new(vec!["a", "b"], 7, PageRequest::new(Some(4), Some(2)));
        let headers = page.headers();
        assert_eq!(headers[0], (PAGING_OFFSET_HEADER, "4".to_owned()));
        assert_eq!(headers[1], (PAGING_LIMIT_HEADER, "2".to_owned()));
        assert_eq!(headers[2], (PAGING_TOTAL_HEADER, "7".to_owned()));
    }

    #[rstest]
    fn headers_fill_unbounded_window_from_items() {
        let page = Page::new(vec![1, 2, 3], 3, PageRequest::unbounded());
        let headers = page.headers();
        assert_eq!(headers[0].1, "0");
        assert_eq!(headers[1].1, "3");
    }

    #[rstest]
    fn map_keeps_total_and_window() {
        let request = PageRequest::new(Some(1), Some(1));
        let page = Page::new(vec![2], 5, request).map(|value| value * 10);
        assert_eq!(page.items(), &[20]);
        assert_eq!(page.total(), 5);
        assert_eq!(page.request(), request);
    }

    #[rstest]
    fn page_serialises_flat_window() {
        let page = Page::new(vec!["x"], 1, PageRequest::new(Some(0), Some(5)));
        let value = serde_json::to_value(&page).expect("serialise page");
        assert_eq!(
            value,
            serde_json::json!({ "items": ["x"], "total": 1, "offset": 0, "limit": 5 })
        );
    }
}

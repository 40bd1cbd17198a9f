//! Offset/limit pagination primitives shared by backend endpoints.
//!
//! A [`PageRequest`] captures the caller-supplied window over an ordered
//! collection; a [`Paged`] envelope carries one page of records back to the
//! caller together with the window that produced it.
//!
//! An omitted limit deliberately means "everything from `offset` onwards".
//! Callers opting into that behaviour accept unbounded result sets; the
//! trade-off is documented on [`PageRequest::limit`] rather than silently
//! capped here.

use serde::Serialize;

/// Validation errors raised when constructing a [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageValidationError {
    /// The offset was negative.
    #[error("offset must not be negative, got {value}")]
    NegativeOffset {
        /// The rejected offset.
        value: i64,
    },
    /// The limit was negative.
    #[error("limit must not be negative, got {value}")]
    NegativeLimit {
        /// The rejected limit.
        value: i64,
    },
}

/// A validated window over an ordered collection.
///
/// The offset defaults to zero and the limit is optional: `None` requests
/// the full remaining set starting at `offset`. There is no implicit cap,
/// so very large collections can produce very large pages; callers that
/// need bounded responses must supply a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    offset: i64,
    limit: Option<i64>,
}

impl PageRequest {
    /// Validate and construct a page request.
    ///
    /// # Errors
    ///
    /// Returns [`PageValidationError`] when `offset` or `limit` is negative.
    pub const fn new(offset: i64, limit: Option<i64>) -> Result<Self, PageValidationError> {
        if offset < 0 {
            return Err(PageValidationError::NegativeOffset { value: offset });
        }
        match limit {
            Some(value) if value < 0 => return Err(PageValidationError::NegativeLimit { value }),
            _ => {}
        }
        Ok(Self { offset, limit })
    }

    /// The first window starting at offset zero with no limit.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            offset: 0,
            limit: None,
        }
    }

    /// Number of records to skip before the window starts.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        self.offset
    }

    /// Maximum number of records in the window, or `None` for all remaining.
    #[must_use]
    pub const fn limit(&self) -> Option<i64> {
        self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// One page of records together with the window that produced it.
///
/// The serialised `limit` echoes the requested limit, or the record count
/// when the request had none, so callers always see a concrete number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paged<T> {
    /// Offset the page was read at.
    pub offset: i64,
    /// Effective limit: the requested one, or the record count if omitted.
    pub limit: i64,
    /// The records in window order.
    pub records: Vec<T>,
}

impl<T> Paged<T> {
    /// Wrap `records` in the envelope for the given request.
    #[must_use]
    pub fn new(request: &PageRequest, records: Vec<T>) -> Self {
        let limit = request
            .limit()
            .unwrap_or_else(|| i64::try_from(records.len()).unwrap_or(i64::MAX));
        Self {
            offset: request.offset(),
            limit,
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, None)]
    #[case(0, Some(0))]
    #[case(7, Some(3))]
    fn accepts_non_negative_windows(#[case] offset: i64, #[case] limit: Option<i64>) {
        let request = PageRequest::new(offset, limit).expect("window should validate");
        assert_eq!(request.offset(), offset);
        assert_eq!(request.limit(), limit);
    }

    #[rstest]
    fn rejects_negative_offset() {
        let error = PageRequest::new(-1, None).expect_err("negative offset must fail");
        assert_eq!(error, PageValidationError::NegativeOffset { value: -1 });
    }

    #[rstest]
    fn rejects_negative_limit() {
        let error = PageRequest::new(0, Some(-5)).expect_err("negative limit must fail");
        assert_eq!(error, PageValidationError::NegativeLimit { value: -5 });
    }

    #[rstest]
    fn default_is_unbounded() {
        assert_eq!(PageRequest::default(), PageRequest::unbounded());
    }

    #[rstest]
    fn envelope_echoes_requested_limit() {
        let request = PageRequest::new(2, Some(2)).expect("valid window");
        let page = Paged::new(&request, vec!["a", "b"]);
        assert_eq!(page.offset, 2);
        assert_eq!(page.limit, 2);
        assert_eq!(page.records.len(), 2);
    }

    #[rstest]
    fn envelope_falls_back_to_record_count() {
        let request = PageRequest::unbounded();
        let page = Paged::new(&request, vec![1, 2, 3]);
        assert_eq!(page.limit, 3);
    }

    #[rstest]
    fn validation_errors_render_the_offending_value() {
        let error = PageRequest::new(0, Some(-2)).expect_err("negative limit must fail");
        assert!(error.to_string().contains("-2"));
    }
}

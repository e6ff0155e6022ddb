//! Order listing filters and pagination.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{OrderError, Result};
use crate::order::{Order, OrderStatus};

/// Default page size for order listings.
pub const DEFAULT_LIMIT: usize = 10;

/// Sort direction by order id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Ascending order (ASC)
    Asc,
    /// Descending order (DESC)
    #[default]
    Desc,
}

impl OrderDirection {
    /// Parses `ASC` or `DESC`, case-insensitively.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(OrderError::InvalidFilter {
                key: "order".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Which orders a listing or count selects, and which page of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
    /// Accepted statuses. `None` accepts any status.
    pub statuses: Option<Vec<OrderStatus>>,
    pub created_at_min: Option<DateTime<Utc>>,
    pub created_at_max: Option<DateTime<Utc>>,
    pub updated_at_min: Option<DateTime<Utc>>,
    pub updated_at_max: Option<DateTime<Utc>>,
    /// Page size. `None` returns every match.
    pub limit: Option<usize>,
    /// Explicit offset. Takes precedence over `page`.
    pub offset: Option<usize>,
    /// One-based page number.
    pub page: usize,
    pub direction: OrderDirection,
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            statuses: None,
            created_at_min: None,
            created_at_max: None,
            updated_at_min: None,
            updated_at_max: None,
            limit: Some(DEFAULT_LIMIT),
            offset: None,
            page: 1,
            direction: OrderDirection::Desc,
        }
    }
}

impl OrderQuery {
    /// Creates a query matching every order, first page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to a comma-separated status list. `any` matches everything.
    pub fn with_statuses<'a, I>(mut self, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut statuses = Vec::new();
        for slug in values.into_iter().flat_map(|v| v.split(',')) {
            let slug = slug.trim();
            if slug.is_empty() {
                continue;
            }
            if slug.eq_ignore_ascii_case("any") {
                self.statuses = None;
                return Ok(self);
            }
            statuses.push(OrderStatus::parse(slug)?);
        }
        self.statuses = if statuses.is_empty() {
            None
        } else {
            Some(statuses)
        };
        Ok(self)
    }

    /// Applies the keys of a `filter[...]` map. Unknown keys are ignored.
    pub fn with_filter(mut self, filter: &BTreeMap<String, String>) -> Result<Self> {
        for (key, value) in filter {
            match key.as_str() {
                "created_at_min" => self.created_at_min = Some(parse_date(value)?),
                "created_at_max" => self.created_at_max = Some(parse_date(value)?),
                "updated_at_min" => self.updated_at_min = Some(parse_date(value)?),
                "updated_at_max" => self.updated_at_max = Some(parse_date(value)?),
                "limit" => self.limit = parse_limit(value)?,
                "offset" => self.offset = Some(parse_count(key, value)?),
                "order" => self.direction = OrderDirection::parse(value)?,
                _ => {}
            }
        }
        Ok(self)
    }

    /// Selects a one-based page. Zero is treated as the first page.
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    /// Returns true if `order` passes the status and date filters.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&order.status) {
                return false;
            }
        }
        within(order.created_at, self.created_at_min, self.created_at_max)
            && within(order.updated_at, self.updated_at_min, self.updated_at_max)
    }

    /// Returns the number of matches to skip.
    pub fn skip(&self) -> usize {
        match (self.offset, self.limit) {
            (Some(offset), _) => offset,
            (None, Some(limit)) => (self.page - 1).saturating_mul(limit),
            (None, None) => 0,
        }
    }

    /// Returns the number of pages `total` matches span.
    pub fn total_pages(&self, total: usize) -> usize {
        match self.limit {
            Some(limit) if limit > 0 => total.div_ceil(limit).max(1),
            _ => 1,
        }
    }
}

fn within(at: DateTime<Utc>, min: Option<DateTime<Utc>>, max: Option<DateTime<Utc>>) -> bool {
    min.is_none_or(|min| at >= min) && max.is_none_or(|max| at <= max)
}

/// Parses an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
        .ok_or_else(|| OrderError::InvalidDate(value.to_string()))
}

fn parse_limit(value: &str) -> Result<Option<usize>> {
    if value.trim() == "-1" {
        return Ok(None);
    }
    parse_count("limit", value).map(Some)
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| OrderError::InvalidFilter {
            key: key.to_string(),
            value: value.to_string(),
        })
}

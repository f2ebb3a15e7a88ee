//! # Sales Reporting
//!
//! Pure aggregation over the bill ledger and the catalog. Every report is
//! recomputed from scratch; nothing here is cached or persisted.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   bills ──► parse_bill_date ──┬──► sales_report   (monthly + yearly)    │
//! │                               │                                         │
//! │                               ├──► top_sellers    (tally by name,       │
//! │   catalog ────────────────────┤                    joined with stock)   │
//! │                               │                                         │
//! │                               └──► dashboard_summary (one month)        │
//! │                                                                         │
//! │   Bills whose date cannot be parsed still count toward all-time        │
//! │   revenue but never toward a month or a year.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Bill, Product};
use crate::MONTHLY_TARGET_STEP;

/// How many entries the dashboard shows in its top sellers list.
pub const DASHBOARD_TOP_SELLERS: usize = 5;

// =============================================================================
// Bill Dates
// =============================================================================

/// Parses a client-supplied bill date.
///
/// ## Accepted Forms
/// - RFC 3339 (`2025-03-14T10:30:00Z`, `2025-03-14T10:30:00+05:30`); the
///   wall-clock time in the given offset is kept
/// - `2025-03-14T10:30` / `2025-03-14T10:30:15`
/// - `2025-03-14 10:30` / `2025-03-14 10:30:15`
/// - `2025-03-14` (midnight)
///
/// ```rust
/// use stockbook_core::report::parse_bill_date;
///
/// assert!(parse_bill_date("2025-03-14T10:30").is_some());
/// assert!(parse_bill_date("14/03/2025").is_none());
/// ```
pub fn parse_bill_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// First and last day of a calendar month.
fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, next.pred_opt()?))
}

// =============================================================================
// Report Window
// =============================================================================

/// Parses a `YYYY-MM` month key into `(year, month)`.
pub fn parse_year_month(raw: &str) -> CoreResult<(i32, u32)> {
    let invalid = || CoreError::InvalidReportWindow(raw.to_string());

    let (y, m) = raw.split_once('-').ok_or_else(invalid)?;
    if y.len() != 4 || m.len() != 2 {
        return Err(invalid());
    }
    let year: i32 = y.parse().map_err(|_| invalid())?;
    let month: u32 = m.parse().map_err(|_| invalid())?;
    month_bounds(year, month).ok_or_else(invalid)?;

    Ok((year, month))
}

/// Time window a report is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportWindow {
    /// Every bill, dated or not.
    #[default]
    All,
    Month { year: i32, month: u32 },
    Year(i32),
}

impl ReportWindow {
    /// Builds a window from the `month` / `year` query parameters.
    ///
    /// `month` (`YYYY-MM`) wins when both are present. Empty strings count as
    /// absent.
    pub fn from_query(month: Option<&str>, year: Option<&str>) -> CoreResult<Self> {
        let month = month.map(str::trim).filter(|s| !s.is_empty());
        let year = year.map(str::trim).filter(|s| !s.is_empty());

        match (month, year) {
            (Some(m), _) => Self::parse_month(m),
            (None, Some(y)) => Self::parse_year(y),
            (None, None) => Ok(ReportWindow::All),
        }
    }

    /// Parses `YYYY-MM`.
    pub fn parse_month(raw: &str) -> CoreResult<Self> {
        let (year, month) = parse_year_month(raw)?;
        Ok(ReportWindow::Month { year, month })
    }

    fn parse_year(raw: &str) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidReportWindow(raw.to_string());

        if raw.len() != 4 {
            return Err(invalid());
        }
        let year: i32 = raw.parse().map_err(|_| invalid())?;
        Ok(ReportWindow::Year(year))
    }

    /// Whether a bill with this raw date falls inside the window.
    pub fn contains(&self, bill_date: &str) -> bool {
        match self {
            ReportWindow::All => true,
            ReportWindow::Month { year, month } => parse_bill_date(bill_date)
                .is_some_and(|d| d.year() == *year && d.month() == *month),
            ReportWindow::Year(year) => {
                parse_bill_date(bill_date).is_some_and(|d| d.year() == *year)
            }
        }
    }
}

// =============================================================================
// Monthly / Yearly Totals
// =============================================================================

/// Revenue for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    /// `YYYY-MM`
    pub month_key: String,
    /// `Mar 2025`
    pub month_label: String,
    #[ts(type = "number")]
    pub total: Money,
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
}

/// Revenue for one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct YearlyTotal {
    pub year: i32,
    #[ts(type = "number")]
    pub total: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReport {
    pub monthly: Vec<MonthlyTotal>,
    pub yearly: Vec<YearlyTotal>,
}

/// Groups bill totals by calendar month and by year, both ascending.
pub fn sales_report(bills: &[Bill]) -> SalesReport {
    let mut by_month: BTreeMap<(i32, u32), Money> = BTreeMap::new();
    let mut by_year: BTreeMap<i32, Money> = BTreeMap::new();

    for bill in bills {
        let Some(date) = parse_bill_date(&bill.bill_date) else {
            continue;
        };
        *by_month.entry((date.year(), date.month())).or_default() += bill.total;
        *by_year.entry(date.year()).or_default() += bill.total;
    }

    let monthly = by_month
        .into_iter()
        .filter_map(|((year, month), total)| {
            let (start, end) = month_bounds(year, month)?;
            Some(MonthlyTotal {
                month_key: start.format("%Y-%m").to_string(),
                month_label: start.format("%b %Y").to_string(),
                total,
                start,
                end,
            })
        })
        .collect();

    let yearly = by_year
        .into_iter()
        .map(|(year, total)| YearlyTotal { year, total })
        .collect();

    SalesReport { monthly, yearly }
}

// =============================================================================
// Top Sellers
// =============================================================================

/// One row of the best-seller ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TopSeller {
    pub name: String,
    pub quantity_sold: i64,
    /// `None` when the name was sold but no catalog product carries it.
    pub quantity_in_stock: Option<i64>,
    pub is_out_of_stock: bool,
}

/// Ranks products by units sold within `window`.
///
/// ## Ordering
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Names as first encountered in the bills (bill order, line order)    │
/// │  2. Catalog products never sold, in catalog order (quantitySold = 0)    │
/// │  3. Stable sort by quantitySold, descending                             │
/// │     → ties keep the order from steps 1 and 2                            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// When several catalog products share a name, stock is read from the first
/// one, the same product a bill commit decrements.
pub fn top_sellers(bills: &[Bill], products: &[Product], window: &ReportWindow) -> Vec<TopSeller> {
    let mut stock: HashMap<&str, i64> = HashMap::new();
    for product in products {
        stock.entry(product.name.as_str()).or_insert(product.quantity);
    }

    let mut order: Vec<&str> = Vec::new();
    let mut sold: HashMap<&str, i64> = HashMap::new();

    for bill in bills.iter().filter(|b| window.contains(&b.bill_date)) {
        for line in &bill.order {
            let name = line.product_name.as_str();
            let tally = sold.entry(name).or_insert_with(|| {
                order.push(name);
                0
            });
            *tally = tally.saturating_add(line.quantity);
        }
    }

    let mut seen: HashSet<&str> = order.iter().copied().collect();
    for product in products {
        if seen.insert(product.name.as_str()) {
            order.push(product.name.as_str());
        }
    }

    let mut ranking: Vec<TopSeller> = order
        .into_iter()
        .map(|name| {
            let in_stock = stock.get(name).copied();
            TopSeller {
                name: name.to_string(),
                quantity_sold: sold.get(name).copied().unwrap_or(0),
                quantity_in_stock: in_stock,
                is_out_of_stock: in_stock.is_some_and(|q| q <= 0),
            }
        })
        .collect();

    ranking.sort_by(|a, b| b.quantity_sold.cmp(&a.quantity_sold));
    ranking
}

// =============================================================================
// Dashboard
// =============================================================================

/// Headline numbers for one reference month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub month_key: String,
    /// All time, including bills with unparseable dates.
    #[ts(type = "number")]
    pub total_revenue: Money,
    #[ts(type = "number")]
    pub monthly_revenue: Money,
    pub monthly_orders: usize,
    /// Distinct non-empty customer emails on this month's bills.
    pub monthly_customers: usize,
    /// Next multiple of the target step at or above monthly revenue.
    #[ts(type = "number")]
    pub monthly_target: Money,
    /// Whole target steps reached this month.
    pub milestones: i64,
    pub top_sellers: Vec<TopSeller>,
}

/// Builds the dashboard for `year`-`month`.
pub fn dashboard_summary(
    bills: &[Bill],
    products: &[Product],
    year: i32,
    month: u32,
) -> CoreResult<DashboardSummary> {
    let (start, _) = month_bounds(year, month)
        .ok_or_else(|| CoreError::InvalidReportWindow(format!("{year:04}-{month:02}")))?;
    let window = ReportWindow::Month { year, month };

    let total_revenue: Money = bills.iter().map(|b| b.total).sum();

    let monthly: Vec<&Bill> = bills
        .iter()
        .filter(|b| window.contains(&b.bill_date))
        .collect();
    let monthly_revenue: Money = monthly.iter().map(|b| b.total).sum();

    let monthly_customers = monthly
        .iter()
        .map(|b| b.customer.email.trim())
        .filter(|e| !e.is_empty())
        .collect::<HashSet<_>>()
        .len();

    let monthly_target = match monthly_revenue.ceil_to(MONTHLY_TARGET_STEP) {
        t if t.is_zero() => MONTHLY_TARGET_STEP,
        t => t,
    };

    let mut top = top_sellers(bills, products, &window);
    top.truncate(DASHBOARD_TOP_SELLERS);

    Ok(DashboardSummary {
        month_key: start.format("%Y-%m").to_string(),
        total_revenue,
        monthly_revenue,
        monthly_orders: monthly.len(),
        monthly_customers,
        monthly_target,
        milestones: monthly_revenue.whole_steps(MONTHLY_TARGET_STEP),
        top_sellers: top,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

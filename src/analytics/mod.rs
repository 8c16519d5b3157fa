//! Monthly spending analytics: the aggregation behind the charts, the chart
//! options, and the page and API that serve them.

mod aggregation;
mod charts;
mod handlers;

pub use aggregation::{
    CategoryMetadata, MonthlySummaryRow, aggregate_monthly_spending, monthly_spending_summary,
};
pub use handlers::{get_analytics_page, get_monthly_summary};

//! The analytics page and the monthly summary JSON endpoint.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    analytics::{
        MonthlySummaryRow,
        aggregation::{monthly_spending_summary, sort_summary_rows},
        charts::{
            ChartKind, ECHARTS_SCRIPT, SpendingChartData, SpendingSummary, build_chart,
            build_chart_data, chart_container, chart_script, summarize,
        },
    },
    auth::UserID,
    endpoints,
    expense::{DateWindow, ExpenseStore, first_of_next_month},
    html::{
        CARD_STYLE, HeadElement, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, category_badge, currency_rounded_with_tooltip, format_currency,
        link,
    },
    navigation::NavBar,
};

const CHART_ID: &str = "spending-chart";

/// The state needed for the analytics page and API.
#[derive(Clone)]
pub struct AnalyticsState {
    pub expense_store: Arc<dyn ExpenseStore + Send + Sync>,
}

impl FromRef<AppState> for AnalyticsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_store: state.expense_store.clone(),
        }
    }
}

/// How far back the analytics page looks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum AnalyticsRange {
    #[serde(rename = "3-months")]
    ThreeMonths,
    #[default]
    #[serde(rename = "6-months")]
    SixMonths,
    #[serde(rename = "1-year")]
    OneYear,
}

impl AnalyticsRange {
    const ALL: [AnalyticsRange; 3] = [
        AnalyticsRange::ThreeMonths,
        AnalyticsRange::SixMonths,
        AnalyticsRange::OneYear,
    ];

    fn months(self) -> u32 {
        match self {
            AnalyticsRange::ThreeMonths => 3,
            AnalyticsRange::SixMonths => 6,
            AnalyticsRange::OneYear => 12,
        }
    }

    fn as_query_value(self) -> &'static str {
        match self {
            AnalyticsRange::ThreeMonths => "3-months",
            AnalyticsRange::SixMonths => "6-months",
            AnalyticsRange::OneYear => "1-year",
        }
    }

    fn label(self) -> &'static str {
        match self {
            AnalyticsRange::ThreeMonths => "Last 3 months",
            AnalyticsRange::SixMonths => "Last 6 months",
            AnalyticsRange::OneYear => "Last year",
        }
    }

    /// The window from `months()` calendar months before `today` through `today`.
    fn window(self, today: Date) -> Result<DateWindow, Error> {
        let start = months_before(today, self.months())
            .ok_or_else(|| Error::InvalidDate(format!("{today} minus {} months", self.months())))?;

        DateWindow::new(start, today)
    }
}

/// `date` moved back `months` calendar months, with the day clamped to the
/// length of the target month.
fn months_before(date: Date, months: u32) -> Option<Date> {
    let month_index = date.year() * 12 + i32::from(date.month() as u8) - 1 - months as i32;
    let year = month_index.div_euclid(12);
    let month = u8::try_from(month_index.rem_euclid(12) + 1).ok()?;
    let month = time::Month::try_from(month).ok()?;

    let first_of_month = Date::from_calendar_date(year, month, 1).ok()?;
    let last_day = first_of_next_month(first_of_month)?.previous_day()?.day();

    Date::from_calendar_date(year, month, date.day().min(last_day)).ok()
}

/// The query parameters for the analytics page.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    #[serde(default)]
    pub range: AnalyticsRange,
    #[serde(default)]
    pub chart: ChartKind,
}

/// Render the analytics page.
pub async fn get_analytics_page(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Response, Error> {
    let today = OffsetDateTime::now_utc().date();
    let window = query.range.window(today)?;

    let mut rows = monthly_spending_summary(state.expense_store.as_ref(), Some(user_id), Some(window))
        .inspect_err(|error| tracing::error!("Could not summarize monthly spending: {error}"))?;
    sort_summary_rows(&mut rows);

    if rows.is_empty() {
        return Ok(analytics_no_data_view(query.range, query.chart).into_response());
    }

    let data = build_chart_data(&rows)?;
    let summary = summarize(&rows)?;
    let options = build_chart(query.chart, &data, query.range.label()).to_string();

    Ok(analytics_view(query.range, query.chart, &summary, &data, &options).into_response())
}

/// The query parameters for the monthly summary API. Both dates are inclusive.
#[derive(Debug, Default, Deserialize)]
pub struct MonthlySummaryQuery {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

/// Return the monthly summary rows as JSON, sorted by month then category name.
pub async fn get_monthly_summary(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<MonthlySummaryQuery>,
) -> Result<Json<Vec<MonthlySummaryRow>>, Error> {
    let window = match (query.start_date, query.end_date) {
        (None, None) => None,
        (start, end) => Some(DateWindow::new(
            start.unwrap_or(Date::MIN),
            end.unwrap_or(Date::MAX),
        )?),
    };

    let mut rows = monthly_spending_summary(state.expense_store.as_ref(), Some(user_id), window)
        .inspect_err(|error| tracing::error!("Could not summarize monthly spending: {error}"))?;
    sort_summary_rows(&mut rows);

    Ok(Json(rows))
}

fn page_url(range: AnalyticsRange, chart: ChartKind) -> String {
    format!(
        "{}?range={}&chart={}",
        endpoints::ANALYTICS_VIEW,
        range.as_query_value(),
        chart.as_query_value()
    )
}

fn controls_view(selected_range: AnalyticsRange, selected_chart: ChartKind) -> Markup {
    let pill = |href: String, label: &str, is_selected: bool| {
        let style = if is_selected {
            "px-3 py-1 rounded-full text-sm font-medium bg-blue-600 text-white"
        } else {
            "px-3 py-1 rounded-full text-sm font-medium bg-gray-200 text-gray-800 \
            hover:bg-gray-300 dark:bg-gray-700 dark:text-gray-200"
        };

        html!(
            a
                href=(href)
                class=(style)
                aria-current=[is_selected.then_some("true")]
            { (label) }
        )
    };

    html!(
        div class="flex flex-wrap gap-4 justify-between w-full"
        {
            div class="flex gap-2" data-range-options
            {
                @for range in AnalyticsRange::ALL {
                    (pill(page_url(range, selected_chart), range.label(), range == selected_range))
                }
            }

            div class="flex gap-2" data-chart-options
            {
                @for chart in ChartKind::ALL {
                    (pill(page_url(selected_range, chart), chart.label(), chart == selected_chart))
                }
            }
        }
    )
}

fn summary_cards_view(summary: &SpendingSummary) -> Markup {
    html!(
        section class="grid grid-cols-1 sm:grid-cols-3 gap-4 w-full"
        {
            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Total spent" }
                p class="text-2xl font-bold" data-total-spent
                { (currency_rounded_with_tooltip(summary.total_spent)) }
            }

            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Average per month" }
                p class="text-2xl font-bold" data-average-monthly
                { (currency_rounded_with_tooltip(summary.average_monthly)) }
            }

            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Categories" }
                p class="text-2xl font-bold" data-category-count { (summary.category_count) }
            }
        }
    )
}

fn category_totals_view(data: &SpendingChartData) -> Markup {
    html!(
        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class="px-6 py-4 text-right" { "Total" }
                }
            }

            tbody
            {
                @for category in &data.categories {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE) { (category_badge(&category.name, &category.color)) }
                        td class="px-6 py-4 text-right tabular-nums" { (format_currency(category.total)) }
                    }
                }
            }
        }
    )
}

fn analytics_view(
    range: AnalyticsRange,
    chart: ChartKind,
    summary: &SpendingSummary,
    data: &SpendingChartData,
    options: &str,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::ANALYTICS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-screen-xl"
            {
                h1 class="text-xl font-bold" { "Analytics" }

                (controls_view(range, chart))
                (summary_cards_view(summary))
                (chart_container(CHART_ID))
                (category_totals_view(data))
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
        chart_script(CHART_ID, options),
    ];

    base("Analytics", &scripts, &content)
}

fn analytics_no_data_view(range: AnalyticsRange, chart: ChartKind) -> Markup {
    let nav_bar = NavBar::new(endpoints::ANALYTICS_VIEW).into_html();
    let new_expense_link = link(endpoints::NEW_EXPENSE_VIEW, "log an expense");

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-screen-xl"
            {
                h1 class="text-xl font-bold" { "Analytics" }

                (controls_view(range, chart))

                div class="flex flex-col items-center py-8" data-no-data
                {
                    h2 class="text-xl font-bold" { "Nothing here yet..." }

                    p
                    {
                        "Charts will show up here once you " (new_expense_link)
                        " in this period."
                    }
                }
            }
        }
    );

    base("Analytics", &[], &content)
}

//! Turns monthly summary rows into chart series and ECharts options.

use std::collections::{BTreeMap, BTreeSet};

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Color, Emphasis, EmphasisFocus,
        JsFunction, Tooltip, Trigger,
    },
    series::{Line, Pie, bar::Bar},
};
use maud::{Markup, PreEscaped, html};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Deserialize;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error, analytics::MonthlySummaryRow, category::CategoryId, html::HeadElement,
    money::checked_sum,
};

/// Where the ECharts library is served from.
pub(super) const ECHARTS_SCRIPT: &str = "/static/echarts.6.0.0.min.js";

const TOTAL_SERIES_COLOR: &str = "#6b7280";

const MONTH_LABEL_FORMAT: &[BorrowedFormatItem] = format_description!("[month repr:short] [year]");

/// The kind of chart shown on the analytics page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Pie,
}

impl ChartKind {
    pub(super) const ALL: [ChartKind; 3] = [ChartKind::Line, ChartKind::Bar, ChartKind::Pie];

    pub(super) fn as_query_value(self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
        }
    }

    pub(super) fn label(self) -> &'static str {
        match self {
            ChartKind::Line => "Line",
            ChartKind::Bar => "Bar",
            ChartKind::Pie => "Pie",
        }
    }
}

/// The spending of one category across the months on the chart axis.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CategorySeries {
    pub category_id: CategoryId,
    pub name: String,
    pub color: String,
    /// One value per month on the axis, `None` when nothing was spent.
    pub values: Vec<Option<f64>>,
    pub total: Decimal,
}

/// Everything needed to draw the analytics charts.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct SpendingChartData {
    pub months: Vec<Date>,
    pub labels: Vec<String>,
    pub monthly_totals: Vec<f64>,
    pub categories: Vec<CategorySeries>,
}

/// The headline figures for the analytics page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct SpendingSummary {
    pub total_spent: Decimal,
    /// Total spent divided by the number of months with spending.
    pub average_monthly: Decimal,
    pub category_count: usize,
}

fn to_f64(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or_default()
}

/// Format month dates like "Jan 2024".
pub(super) fn format_month_labels(months: &[Date]) -> Result<Vec<String>, Error> {
    months
        .iter()
        .map(|date| {
            date.format(MONTH_LABEL_FORMAT)
                .map_err(|error| Error::InvalidDate(error.to_string()))
        })
        .collect()
}

/// Build the month axis and per-category series from `rows`.
///
/// Months are sorted ascending. Categories are ordered by name.
///
/// # Errors
///
/// Returns [Error::AmountOverflow] if a monthly or category total does not
/// fit in a [Decimal].
pub(super) fn build_chart_data(rows: &[MonthlySummaryRow]) -> Result<SpendingChartData, Error> {
    let months = rows
        .iter()
        .map(|row| row.month)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>();
    let month_index = |month: Date| months.iter().position(|&m| m == month);

    let mut monthly_totals = vec![Decimal::ZERO; months.len()];
    let mut by_category: BTreeMap<CategoryId, CategorySeries> = BTreeMap::new();

    for row in rows {
        let Some(index) = month_index(row.month) else {
            continue;
        };

        monthly_totals[index] = monthly_totals[index]
            .checked_add(row.total_spent)
            .ok_or(Error::AmountOverflow)?;

        let series = by_category
            .entry(row.category_id)
            .or_insert_with(|| CategorySeries {
                category_id: row.category_id,
                name: row.category_name.clone(),
                color: row.category_color.clone(),
                values: vec![None; months.len()],
                total: Decimal::ZERO,
            });

        let value = series.values[index].unwrap_or_default() + to_f64(row.total_spent);
        series.values[index] = Some(value);
        series.total = series
            .total
            .checked_add(row.total_spent)
            .ok_or(Error::AmountOverflow)?;
    }

    let mut categories = by_category.into_values().collect::<Vec<_>>();
    categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.category_id.cmp(&b.category_id)));

    Ok(SpendingChartData {
        labels: format_month_labels(&months)?,
        monthly_totals: monthly_totals.into_iter().map(to_f64).collect(),
        months,
        categories,
    })
}

/// Summarize `rows` for the analytics cards.
///
/// # Errors
///
/// Returns [Error::AmountOverflow] if the total does not fit in a [Decimal].
pub(super) fn summarize(rows: &[MonthlySummaryRow]) -> Result<SpendingSummary, Error> {
    let total_spent = checked_sum(rows.iter().map(|row| row.total_spent))?;
    let month_count = rows.iter().map(|row| row.month).collect::<BTreeSet<_>>().len();
    let category_count = rows
        .iter()
        .map(|row| row.category_id)
        .collect::<BTreeSet<_>>()
        .len();

    let average_monthly = if month_count == 0 {
        Decimal::ZERO
    } else {
        total_spent
            .checked_div(Decimal::from(month_count))
            .ok_or(Error::AmountOverflow)?
    };

    Ok(SpendingSummary {
        total_spent,
        average_monthly,
        category_count,
    })
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

fn currency_tooltip(trigger: Trigger) -> Tooltip {
    Tooltip::new()
        .trigger(trigger)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

fn base_axis_chart(title: &str, subtitle: &str, data: &SpendingChartData) -> Chart {
    Chart::new()
        .title(Title::new().text(title).subtext(subtitle).left(20).top("1%"))
        .tooltip(currency_tooltip(Trigger::Axis))
        .legend(Legend::new().left(250).top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(data.labels.clone()),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
}

/// The monthly total as a line plus one line per category.
pub(super) fn line_chart(data: &SpendingChartData, subtitle: &str) -> Chart {
    let mut colors = vec![Color::from(TOTAL_SERIES_COLOR)];
    colors.extend(data.categories.iter().map(|c| Color::from(c.color.as_str())));

    let mut chart = base_axis_chart("Monthly Spending", subtitle, data)
        .color(colors)
        .series(
            Line::new()
                .name("Total")
                .data(data.monthly_totals.clone()),
        );

    for category in &data.categories {
        chart = chart.series(
            Line::new()
                .name(category.name.as_str())
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(category.values.clone()),
        );
    }

    chart
}

/// Stacked bars of each category's spending per month.
pub(super) fn bar_chart(data: &SpendingChartData, subtitle: &str) -> Chart {
    let colors = data
        .categories
        .iter()
        .map(|c| Color::from(c.color.as_str()))
        .collect::<Vec<_>>();

    let mut chart = base_axis_chart("Monthly Spending", subtitle, data).color(colors);

    for category in &data.categories {
        chart = chart.series(
            Bar::new()
                .name(category.name.as_str())
                .stack("Spending")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(category.values.clone()),
        );
    }

    chart
}

/// Each category's share of the spending over the whole window.
pub(super) fn pie_chart(data: &SpendingChartData, subtitle: &str) -> Chart {
    let colors = data
        .categories
        .iter()
        .map(|c| Color::from(c.color.as_str()))
        .collect::<Vec<_>>();
    let slices = data
        .categories
        .iter()
        .map(|category| (to_f64(category.total), category.name.clone()))
        .collect::<Vec<_>>();

    Chart::new()
        .title(Title::new().text("Spending by Category").subtext(subtitle).left(20).top("1%"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().left(250).top("1%"))
        .color(colors)
        .series(
            Pie::new()
                .name("Spending")
                .radius(vec!["40%", "70%"])
                .data(slices),
        )
}

/// Build the chart options for `kind`.
pub(super) fn build_chart(kind: ChartKind, data: &SpendingChartData, subtitle: &str) -> Chart {
    match kind {
        ChartKind::Line => line_chart(data, subtitle),
        ChartKind::Bar => bar_chart(data, subtitle),
        ChartKind::Pie => pie_chart(data, subtitle),
    }
}

/// The container for a chart with the given element ID.
pub(super) fn chart_container(id: &str) -> Markup {
    html!(
        div
            id=(id)
            class="min-h-[380px] w-full rounded dark:bg-gray-100"
        {}
    )
}

/// JavaScript that draws `options` into the element `id` once the page loads,
/// following the system dark mode setting.
pub(super) fn chart_script(id: &str, options: &str) -> HeadElement {
    let script = format!(
        r#"document.addEventListener('DOMContentLoaded', function() {{
            const chartDom = document.getElementById("{id}");
            const chart = echarts.init(chartDom);
            const option = {options};
            chart.setOption(option);

            window.addEventListener('resize', chart.resize);

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const updateTheme = () => {{
                const isDarkMode = darkModeMediaQuery.matches;
                chart.setTheme(isDarkMode ? 'dark' : 'default');
            }}
            darkModeMediaQuery.addEventListener('change', updateTheme);
            updateTheme();
        }});"#
    );

    HeadElement::ScriptSource(PreEscaped(script))
}

//! Text rendering for jobs and quotes
//!
//! Stored job costs and cost parameters are USD amounts and are always shown
//! as such. Other currencies only appear when the backend quoted or converted
//! into them.

use libprintquote::api::endpoints::display_amount;
use libprintquote::api::types::{
    BrandingSettings, CostBreakdown, CostCalculationResponse, CostParameters,
    CurrencyConversionResponse, ExchangeRates, Job, JobListResponse, JobSummary,
};
use libprintquote::currency::{self, Currency};

/// Currency of amounts persisted by the backend
const STORED: Currency = Currency::Usd;

fn usd(amount: f64) -> String {
    currency::format(amount, STORED)
}

/// One line per job for `list`
pub fn job_row(job: &Job) -> String {
    format!(
        "{}  {:<13} {:<13} {:>7}  {:>16}  {}",
        job.id,
        job.status.as_str(),
        job.job_type.as_str(),
        job.quantity,
        usd(job.total_cost),
        job.title
    )
}

pub fn job_list(page: &JobListResponse) -> String {
    if page.jobs.is_empty() {
        return "No jobs found".to_string();
    }

    let mut out = String::new();
    for job in &page.jobs {
        out.push_str(&job_row(job));
        out.push('\n');
    }
    out.push_str(&format!(
        "Page {} of {} ({} job{})",
        page.page,
        page.total_pages.max(1),
        page.total,
        if page.total == 1 { "" } else { "s" }
    ));
    out
}

fn breakdown_lines(out: &mut String, breakdown: &CostBreakdown, shown: Currency) {
    for (label, amount) in breakdown.lines() {
        out.push_str(&format!(
            "  {:<10} {:>16}\n",
            label,
            currency::format(amount, shown)
        ));
    }
}

pub fn job_detail(job: &Job) -> String {
    let specs = &job.specifications;
    let mut out = String::new();

    out.push_str(&format!("{}\n", job.title));
    out.push_str(&format!("ID:        {}\n", job.id));
    out.push_str(&format!("Status:    {}\n", job.status));
    out.push_str(&format!("Type:      {}\n", job.job_type));
    out.push_str(&format!("Quantity:  {}\n", job.quantity));
    out.push_str(&format!("Paper:     {} {}", specs.paper_type, specs.paper_size));
    if let Some(weight) = &specs.paper_weight {
        out.push_str(&format!(" {}", weight));
    }
    out.push('\n');
    out.push_str(&format!(
        "Colors:    {}/{}{}\n",
        specs.colors.front_colors,
        specs.colors.back_colors,
        if specs.colors.is_full_color { " (full color)" } else { "" }
    ));
    if let Some(pages) = specs.pages {
        out.push_str(&format!("Pages:     {}\n", pages));
    }
    if let Some(binding) = specs.binding.as_deref().filter(|b| !b.is_empty()) {
        out.push_str(&format!("Binding:   {}\n", binding));
    }
    if !specs.finishing.is_empty() {
        out.push_str(&format!("Finishing: {}\n", specs.finishing.join(", ")));
    }
    out.push_str(&format!(
        "Updated:   {}\n",
        job.updated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    out.push_str("Cost breakdown:\n");
    breakdown_lines(&mut out, &job.cost_breakdown, STORED);
    out.push_str(&format!(
        "Total:     {} ({} per unit)",
        usd(job.total_cost),
        usd(job.unit_cost)
    ));
    out
}

/// Extra line under a job's total when the backend converted it
pub fn converted_total(conversion: &CurrencyConversionResponse) -> String {
    format!(
        "           {} at 1 {} = {} {}",
        currency::format(conversion.converted_amount, conversion.to_currency),
        conversion.from_currency,
        conversion.exchange_rate,
        conversion.to_currency
    )
}

pub fn summary(summary: &JobSummary) -> String {
    format!(
        "Total jobs:     {}\nRecent jobs:    {}\nRecent value:   {}\nAverage value:  {}",
        summary.total_jobs,
        summary.listed_jobs,
        usd(summary.listed_value),
        usd(summary.average_value)
    )
}

/// A quote is shown in the currency the backend priced it in, USD when unnamed
pub fn quote(response: &CostCalculationResponse) -> String {
    let shown = response.currency.unwrap_or(STORED);
    let mut out = String::from("Cost breakdown:\n");

    breakdown_lines(&mut out, &response.cost_breakdown, shown);
    out.push_str(&format!(
        "Total:     {}\nUnit cost: {}\nDelivery:  {} day{}",
        display_amount(response.total_cost, response.currency, STORED),
        display_amount(response.unit_cost, response.currency, STORED),
        response.estimated_delivery_days,
        if response.estimated_delivery_days == 1 { "" } else { "s" }
    ));
    if let Some(rate) = response.exchange_rate.filter(|_| shown != STORED) {
        out.push_str(&format!("\nRate:      1 USD = {} {}", rate, shown));
    }
    out
}

pub fn rates(rates: &ExchangeRates) -> String {
    let mut out = format!(
        "Base {} (updated {})\n",
        rates.base,
        rates.last_updated.format("%Y-%m-%d %H:%M UTC")
    );
    for (code, rate) in &rates.rates {
        out.push_str(&format!("  {:<5} {}\n", code, rate));
    }
    out.trim_end().to_string()
}

pub fn cost_parameters(params: &CostParameters) -> String {
    [
        format!("Paper per sheet:   {}", usd(params.paper_cost_per_sheet)),
        format!("Plates per job:    {}", usd(params.plate_cost_per_job)),
        format!("Labor per hour:    {}", usd(params.labor_cost_per_hour)),
        format!("Binding per unit:  {}", usd(params.binding_cost_per_unit)),
        format!("Overhead:          {}%", percent(params.overhead_percentage)),
        format!("Profit margin:     {}%", percent(params.profit_margin_percentage)),
    ]
    .join("\n")
}

pub fn branding(settings: &BrandingSettings) -> String {
    let mut out = format!(
        "Company:    {}\nPrimary:    {}\nSecondary:  {}",
        settings.company_name, settings.primary_color, settings.secondary_color
    );
    if let Some(logo) = &settings.company_logo_url {
        out.push_str(&format!("\nLogo:       {}", logo));
    }
    out
}

// The backend stores percentages as fractions (0.15 = 15%)
fn percent(fraction: f64) -> String {
    let value = fraction * 100.0;
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round())
    } else {
        format!("{:.2}", value)
    }
}

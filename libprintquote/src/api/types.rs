//! Request and response shapes of the costing backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::currency::{self, Currency};

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Manager,
    User,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Manager => write!(f, "manager"),
            Role::User => write!(f, "user"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

// ============================================================================
// Jobs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    Book,
    Flyer,
    BusinessCard,
    Brochure,
    Poster,
    Banner,
    Sticker,
    Custom,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Book => "book",
            JobType::Flyer => "flyer",
            JobType::BusinessCard => "business_card",
            JobType::Brochure => "brochure",
            JobType::Poster => "poster",
            JobType::Banner => "banner",
            JobType::Sticker => "sticker",
            JobType::Custom => "custom",
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "book" => Ok(JobType::Book),
            "flyer" => Ok(JobType::Flyer),
            "business_card" | "businesscard" => Ok(JobType::BusinessCard),
            "brochure" => Ok(JobType::Brochure),
            "poster" => Ok(JobType::Poster),
            "banner" => Ok(JobType::Banner),
            "sticker" => Ok(JobType::Sticker),
            "custom" => Ok(JobType::Custom),
            _ => Err(format!("Invalid job type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Draft,
    Quoted,
    Approved,
    InProduction,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Quoted => "quoted",
            JobStatus::Approved => "approved",
            JobStatus::InProduction => "in_production",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "draft" => Ok(JobStatus::Draft),
            "quoted" => Ok(JobStatus::Quoted),
            "approved" => Ok(JobStatus::Approved),
            "in_production" | "inproduction" => Ok(JobStatus::InProduction),
            "completed" => Ok(JobStatus::Completed),
            "cancelled" | "canceled" => Ok(JobStatus::Cancelled),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSpecification {
    pub front_colors: i32,
    pub back_colors: i32,
    #[serde(default)]
    pub spot_colors: Vec<String>,
    pub is_full_color: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpecifications {
    pub paper_type: String,
    pub paper_size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_weight: Option<String>,
    pub colors: ColorSpecification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lamination: Option<String>,
    #[serde(default)]
    pub finishing: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requirements: Option<String>,
}

/// Decomposition of a job's price, in the response currency
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    #[serde(deserialize_with = "deserialize_amount")]
    pub paper_cost: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub plate_cost: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub labor_cost: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub binding_cost: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub finishing_cost: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub overhead: f64,
}

impl CostBreakdown {
    /// Sum of all components
    pub fn subtotal(&self) -> f64 {
        self.lines().iter().map(|(_, amount)| amount).sum()
    }

    /// Labelled components in display order
    pub fn lines(&self) -> [(&'static str, f64); 6] {
        [
            ("Paper", self.paper_cost),
            ("Plates", self.plate_cost),
            ("Labor", self.labor_cost),
            ("Binding", self.binding_cost),
            ("Finishing", self.finishing_cost),
            ("Overhead", self.overhead),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub job_type: JobType,
    pub quantity: i32,
    pub specifications: JobSpecifications,
    pub cost_breakdown: CostBreakdown,
    #[serde(deserialize_with = "deserialize_amount")]
    pub total_cost: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub unit_cost: f64,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: String,
    pub job_type: JobType,
    pub quantity: i32,
    pub specifications: JobSpecifications,
}

/// Partial job update; absent fields are left unchanged by the backend
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<JobSpecifications>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

impl UpdateJobRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.quantity.is_none()
            && self.specifications.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("Invalid sort order: {}. Valid options: asc, desc", s)),
        }
    }
}

/// Job list filters, sent as a query string with snake_case keys
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct JobListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    #[serde(alias = "totalPages")]
    pub total_pages: u64,
}

impl JobListResponse {
    /// Dashboard figures for this page of jobs
    pub fn summary(&self) -> JobSummary {
        let listed_value: f64 = self.jobs.iter().map(|job| job.total_cost).sum();
        let average_value = if self.jobs.is_empty() {
            0.0
        } else {
            listed_value / self.jobs.len() as f64
        };

        JobSummary {
            total_jobs: self.total,
            listed_jobs: self.jobs.len(),
            listed_value,
            average_value,
        }
    }
}

/// Totals over the most recent jobs; values are in USD like stored job costs
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    /// Jobs known to the backend, across all pages
    pub total_jobs: u64,
    pub listed_jobs: usize,
    pub listed_value: f64,
    pub average_value: f64,
}

// ============================================================================
// Costing
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostCalculationRequest {
    pub job_type: JobType,
    pub quantity: i32,
    pub specifications: JobSpecifications,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
}

impl From<&CreateJobRequest> for CostCalculationRequest {
    fn from(job: &CreateJobRequest) -> Self {
        Self {
            job_type: job.job_type,
            quantity: job.quantity,
            specifications: job.specifications.clone(),
            currency: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostCalculationResponse {
    pub cost_breakdown: CostBreakdown,
    #[serde(deserialize_with = "deserialize_amount")]
    pub total_cost: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub unit_cost: f64,
    pub estimated_delivery_days: i32,
    #[serde(default, deserialize_with = "currency::deserialize_lenient_opt")]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub exchange_rate: Option<f64>,
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostParameters {
    pub id: Uuid,
    #[serde(deserialize_with = "deserialize_amount")]
    pub paper_cost_per_sheet: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub plate_cost_per_job: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub labor_cost_per_hour: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub binding_cost_per_unit: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub overhead_percentage: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub profit_margin_percentage: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCostParametersRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_cost_per_sheet: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate_cost_per_job: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labor_cost_per_hour: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding_cost_per_unit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overhead_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_margin_percentage: Option<f64>,
}

impl UpdateCostParametersRequest {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandingSettings {
    pub id: Uuid,
    pub company_name: String,
    #[serde(default)]
    pub company_logo_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBrandingRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
}

impl UpdateBrandingRequest {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ============================================================================
// Currency
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRates {
    #[serde(deserialize_with = "currency::deserialize_lenient")]
    pub base: Currency,
    /// Rates keyed by the backend's code (FCFA appears as `XAF` here)
    pub rates: BTreeMap<String, f64>,
    #[serde(alias = "last_updated")]
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyConversionResponse {
    pub original_amount: f64,
    pub converted_amount: f64,
    #[serde(deserialize_with = "currency::deserialize_lenient")]
    pub from_currency: Currency,
    #[serde(deserialize_with = "currency::deserialize_lenient")]
    pub to_currency: Currency,
    pub exchange_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencySettings {
    #[serde(deserialize_with = "currency::deserialize_lenient")]
    pub default_currency: Currency,
    #[serde(deserialize_with = "deserialize_currency_list")]
    pub supported_currencies: Vec<Currency>,
}

/// Error body returned by the backend on failure
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

/// Accept monetary values as JSON numbers or numeric strings
///
/// Decimal columns on the backend serialize as strings (`"12.50"`).
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    match Amount::deserialize(deserializer)? {
        Amount::Number(n) => Ok(n),
        Amount::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid amount: {:?}", s))),
    }
}

/// Currency list where unknown codes become USD and duplicates are dropped
pub fn deserialize_currency_list<'de, D>(deserializer: D) -> Result<Vec<Currency>, D::Error>
where
    D: Deserializer<'de>,
{
    let codes = Vec::<String>::deserialize(deserializer)?;
    let mut currencies: Vec<Currency> = Vec::with_capacity(codes.len());
    for code in codes {
        let currency = Currency::parse_lenient(&code);
        if !currencies.contains(&currency) {
            currencies.push(currency);
        }
    }
    Ok(currencies)
}

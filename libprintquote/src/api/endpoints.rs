//! Endpoint groups borrowed from an `ApiClient`

use reqwest::Method;
use uuid::Uuid;

use crate::api::client::ApiClient;
use crate::api::types::{
    BrandingSettings, CostCalculationRequest, CostCalculationResponse, CostParameters,
    CreateJobRequest, CurrencyConversionResponse, CurrencySettings, ExchangeRates, Job,
    JobListQuery, JobListResponse, UpdateBrandingRequest, UpdateCostParametersRequest,
    UpdateJobRequest,
};
use crate::currency::{self, Currency};
use crate::error::Result;

impl ApiClient {
    pub fn jobs(&self) -> JobsApi<'_> {
        JobsApi { client: self }
    }

    pub fn costing(&self) -> CostingApi<'_> {
        CostingApi { client: self }
    }

    pub fn settings(&self) -> SettingsApi<'_> {
        SettingsApi { client: self }
    }

    pub fn currency(&self) -> CurrencyApi<'_> {
        CurrencyApi { client: self }
    }

    pub fn export(&self) -> ExportApi<'_> {
        ExportApi { client: self }
    }
}

/// `/api/jobs`
pub struct JobsApi<'a> {
    client: &'a ApiClient,
}

impl JobsApi<'_> {
    pub async fn list(&self, query: &JobListQuery) -> Result<JobListResponse> {
        self.client.get_json_query("/api/jobs", query).await
    }

    pub async fn create(&self, job: &CreateJobRequest) -> Result<Job> {
        self.client.send_json(Method::POST, "/api/jobs", job).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Job> {
        self.client.get_json(&format!("/api/jobs/{}", id)).await
    }

    pub async fn update(&self, id: Uuid, updates: &UpdateJobRequest) -> Result<Job> {
        self.client
            .send_json(Method::PUT, &format!("/api/jobs/{}", id), updates)
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.client
            .send_empty(Method::DELETE, &format!("/api/jobs/{}", id))
            .await
    }
}

/// `/api/cost`
pub struct CostingApi<'a> {
    client: &'a ApiClient,
}

impl CostingApi<'_> {
    /// Full cost calculation
    pub async fn calculate(&self, request: &CostCalculationRequest) -> Result<CostCalculationResponse> {
        self.client
            .send_json(Method::POST, "/api/cost/calculate", request)
            .await
    }

    /// Calculation for display while a job is being edited
    pub async fn preview(&self, request: &CostCalculationRequest) -> Result<CostCalculationResponse> {
        self.client
            .send_json(Method::POST, "/api/cost/preview", request)
            .await
    }

    /// Rough estimate
    pub async fn quick_calculate(
        &self,
        request: &CostCalculationRequest,
    ) -> Result<CostCalculationResponse> {
        self.client
            .send_json(Method::POST, "/api/cost/quick", request)
            .await
    }
}

/// `/api/settings`
pub struct SettingsApi<'a> {
    client: &'a ApiClient,
}

impl SettingsApi<'_> {
    pub async fn cost_parameters(&self) -> Result<CostParameters> {
        self.client.get_json("/api/settings/cost-parameters").await
    }

    pub async fn update_cost_parameters(
        &self,
        params: &UpdateCostParametersRequest,
    ) -> Result<CostParameters> {
        self.client
            .send_json(Method::PUT, "/api/settings/cost-parameters", params)
            .await
    }

    pub async fn branding(&self) -> Result<BrandingSettings> {
        self.client.get_json("/api/settings/branding").await
    }

    pub async fn update_branding(&self, settings: &UpdateBrandingRequest) -> Result<BrandingSettings> {
        self.client
            .send_json(Method::PUT, "/api/settings/branding", settings)
            .await
    }
}

/// `/api/currency`
pub struct CurrencyApi<'a> {
    client: &'a ApiClient,
}

impl CurrencyApi<'_> {
    /// Currencies the backend can quote in; unknown codes read as USD
    pub async fn supported_currencies(&self) -> Result<Vec<Currency>> {
        let codes: Vec<String> = self.client.get_json("/api/currency/supported").await?;
        let mut currencies = Vec::with_capacity(codes.len());
        for code in codes {
            let currency = Currency::parse_lenient(&code);
            if !currencies.contains(&currency) {
                currencies.push(currency);
            }
        }
        Ok(currencies)
    }

    pub async fn exchange_rates(&self) -> Result<ExchangeRates> {
        self.client.get_json("/api/currency/rates").await
    }

    pub async fn convert(
        &self,
        amount: f64,
        from: Currency,
        to: Currency,
    ) -> Result<CurrencyConversionResponse> {
        let query = [
            ("amount", amount.to_string()),
            ("from", from.as_str().to_string()),
            ("to", to.as_str().to_string()),
        ];
        self.client
            .get_json_query("/api/currency/convert", &query)
            .await
    }

    pub async fn currency_settings(&self) -> Result<CurrencySettings> {
        self.client.get_json("/api/currency/settings").await
    }
}

/// Document formats the backend can render a job into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Pdf,
    Excel,
}

impl ExportKind {
    pub fn path_segment(&self) -> &'static str {
        match self {
            ExportKind::Pdf => "pdf",
            ExportKind::Excel => "excel",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportKind::Pdf => "pdf",
            ExportKind::Excel => "xlsx",
        }
    }
}

impl std::str::FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(ExportKind::Pdf),
            "excel" | "xlsx" => Ok(ExportKind::Excel),
            _ => Err(format!("Invalid export kind: '{}'. Valid options: pdf, excel", s)),
        }
    }
}

/// `/api/export`
pub struct ExportApi<'a> {
    client: &'a ApiClient,
}

impl ExportApi<'_> {
    /// Render a job and return the raw document bytes
    pub async fn job(&self, id: Uuid, kind: ExportKind) -> Result<Vec<u8>> {
        self.client
            .send_bytes(
                Method::POST,
                &format!("/api/export/{}/{}", kind.path_segment(), id),
            )
            .await
    }

    pub async fn pdf(&self, id: Uuid) -> Result<Vec<u8>> {
        self.job(id, ExportKind::Pdf).await
    }

    pub async fn excel(&self, id: Uuid) -> Result<Vec<u8>> {
        self.job(id, ExportKind::Excel).await
    }
}

/// Format a monetary value from a response
///
/// Responses that name their currency are shown in it; otherwise the
/// caller's fallback (normally the stored preference) is used.
pub fn display_amount(amount: f64, response_currency: Option<Currency>, fallback: Currency) -> String {
    currency::format(amount, response_currency.unwrap_or(fallback))
}

//! pq-jobs - Work with print jobs and cost quotes on a PrintQuote backend

mod render;

use std::io::{BufRead, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use libprintquote::api::types::{
    CostCalculationRequest, CreateJobRequest, Job, JobListQuery, SortOrder,
    UpdateBrandingRequest, UpdateCostParametersRequest, UpdateJobRequest,
};
use libprintquote::api::{ApiClient, ExportKind};
use libprintquote::currency::{self, Currency};
use libprintquote::error::{ApiError, StorageError};
use libprintquote::logging::LogSettings;
use libprintquote::{Config, Preferences, PrintQuoteError, Result};
use serde::Serialize;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "pq-jobs")]
#[command(version, about = "Work with print jobs and cost quotes")]
#[command(long_about = r#"Work with print jobs and cost quotes on a PrintQuote backend.

EXAMPLES:
    # Log in (prompts for the password)
    pq-jobs login --email ana@example.com
    printf '%s\n' "$PASSWORD" | pq-jobs login --email ana@example.com --password-stdin

    # Browse jobs
    pq-jobs list --status quoted --limit 20
    pq-jobs show 6f1c3a52-2b0e-4f3e-9d55-0c8f1b8d2a11

    # Quote a job described in a JSON file
    pq-jobs quote --file flyer.json --currency FCFA

    # Save it as a job, then export a PDF
    pq-jobs create --file flyer.json
    pq-jobs export <ID> --kind pdf --output flyer.pdf

Stored job costs and cost parameters are USD and are shown as USD. When the
display currency (see `pq-currency set`, or --currency) is not USD, `show`
adds the job total converted by the backend, and `quote` asks the backend to
price in the display currency.

EXIT CODES:
    0 - Success
    1 - Error (network, backend, storage, configuration)
    2 - Not logged in or session expired
    3 - Invalid input
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(short, long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Display currency (overrides the stored preference)
    #[arg(short, long, global = true, value_name = "CODE")]
    currency: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,

        /// Read the password from stdin instead of prompting
        #[arg(long)]
        password_stdin: bool,
    },

    /// Log out and forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami {
        /// Ask the backend instead of using the cached user
        #[arg(long)]
        remote: bool,
    },

    /// List jobs
    List {
        #[arg(long)]
        page: Option<u64>,

        #[arg(long)]
        limit: Option<u64>,

        /// draft, quoted, approved, in_production, completed, cancelled
        #[arg(long)]
        status: Option<String>,

        /// book, flyer, business_card, brochure, poster, banner, sticker, custom
        #[arg(long = "type", value_name = "TYPE")]
        job_type: Option<String>,

        /// Match against job titles
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        sort_by: Option<String>,

        /// asc or desc
        #[arg(long)]
        sort_order: Option<String>,
    },

    /// Totals over the most recent jobs
    Summary {
        /// Number of recent jobs to total
        #[arg(long, default_value = "10")]
        limit: u64,
    },

    /// Show one job with its cost breakdown
    Show { id: String },

    /// Create a job from a JSON file (`-` for stdin)
    Create {
        #[arg(long)]
        file: PathBuf,
    },

    /// Update a job's title, quantity or status
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        quantity: Option<i32>,

        #[arg(long)]
        status: Option<String>,
    },

    /// Delete a job
    Delete { id: String },

    /// Get a cost quote for a job described in a JSON file (`-` for stdin)
    Quote {
        #[arg(long)]
        file: PathBuf,

        /// Use the preview endpoint
        #[arg(long, conflicts_with = "quick")]
        preview: bool,

        /// Use the quick estimate endpoint
        #[arg(long)]
        quick: bool,
    },

    /// Show the backend's exchange rates
    Rates,

    /// Convert an amount between currencies on the backend
    Convert {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        from: String,
        to: String,
    },

    /// Export a job document
    Export {
        id: String,

        /// pdf or excel
        #[arg(long, default_value = "pdf")]
        kind: String,

        /// Output path (defaults to job-<ID>.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or change shop settings
    Settings {
        #[command(subcommand)]
        section: SettingsSection,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsSection {
    /// Cost parameters used by the pricing engine
    Costs,
    /// Company branding used on exports
    Branding,

    /// Change cost parameters (amounts in USD, percentages as 0-100)
    UpdateCosts {
        #[arg(long)]
        paper_per_sheet: Option<f64>,

        #[arg(long)]
        plates_per_job: Option<f64>,

        #[arg(long)]
        labor_per_hour: Option<f64>,

        #[arg(long)]
        binding_per_unit: Option<f64>,

        #[arg(long, value_name = "PERCENT")]
        overhead: Option<f64>,

        #[arg(long, value_name = "PERCENT")]
        margin: Option<f64>,
    },

    /// Change company branding
    UpdateBranding {
        #[arg(long)]
        company_name: Option<String>,

        #[arg(long)]
        logo_url: Option<String>,

        /// Hex color such as #1d4ed8
        #[arg(long)]
        primary_color: Option<String>,

        #[arg(long)]
        secondary_color: Option<String>,
    },
}

/// Everything a command needs
struct Context {
    client: ApiClient,
    display: Currency,
    json: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    LogSettings::from_env(cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        if e.exit_code() == 2 {
            eprintln!("Run `pq-jobs login --email <EMAIL>` to start a new session.");
        }
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let store = config.open_store();
    let prefs = Preferences::new(store.clone());

    let display = match &cli.currency {
        Some(code) => parse_currency(code)?,
        None => prefs.get_default(),
    };

    let ctx = Context {
        client: ApiClient::new(&config.api, store)?,
        display,
        json: cli.format == "json",
    };

    run_command(&ctx, cli.command).await
}

async fn run_command(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Login {
            email,
            password_stdin,
        } => {
            let password = read_password(password_stdin)?;
            let response = ctx.client.login(&email, &password).await?;
            if ctx.json {
                print_json(&response.user)?;
            } else {
                println!(
                    "Logged in as {} <{}> ({})",
                    response.user.name, response.user.email, response.user.role
                );
            }
        }
        Commands::Logout => {
            ctx.client.logout().await?;
            if !ctx.json {
                println!("Logged out");
            }
        }
        Commands::Whoami { remote } => {
            let user = if remote {
                ctx.client.me().await?
            } else {
                ctx.client.current_user().ok_or_else(|| {
                    PrintQuoteError::Api(ApiError::Unauthorized("no stored session".to_string()))
                })?
            };
            if ctx.json {
                print_json(&user)?;
            } else {
                println!("{} <{}> ({})", user.name, user.email, user.role);
            }
        }
        Commands::List {
            page,
            limit,
            status,
            job_type,
            search,
            sort_by,
            sort_order,
        } => {
            let query = JobListQuery {
                page,
                limit,
                job_type: job_type.as_deref().map(parse_arg).transpose()?,
                status: status.as_deref().map(parse_arg).transpose()?,
                search,
                sort_by,
                sort_order: sort_order
                    .as_deref()
                    .map(parse_arg::<SortOrder>)
                    .transpose()?,
            };
            let page = ctx.client.jobs().list(&query).await?;
            if ctx.json {
                print_json(&page)?;
            } else {
                println!("{}", render::job_list(&page));
            }
        }
        Commands::Summary { limit } => {
            if limit == 0 {
                return Err(PrintQuoteError::InvalidInput(
                    "limit must be at least 1".to_string(),
                ));
            }
            let query = JobListQuery {
                limit: Some(limit),
                ..Default::default()
            };
            let summary = ctx.client.jobs().list(&query).await?.summary();
            if ctx.json {
                print_json(&summary)?;
            } else {
                println!("{}", render::summary(&summary));
            }
        }
        Commands::Show { id } => {
            let job = ctx.client.jobs().get(parse_id(&id)?).await?;
            print_job(ctx, &job).await?;
        }
        Commands::Create { file } => {
            let request: CreateJobRequest = read_json(&file)?;
            if request.quantity <= 0 {
                return Err(PrintQuoteError::InvalidInput(
                    "quantity must be positive".to_string(),
                ));
            }
            let job = ctx.client.jobs().create(&request).await?;
            if ctx.json {
                print_json(&job)?;
            } else {
                println!("Created job {}", job.id);
                print_job(ctx, &job).await?;
            }
        }
        Commands::Update {
            id,
            title,
            quantity,
            status,
        } => {
            let updates = UpdateJobRequest {
                title,
                quantity,
                specifications: None,
                status: status.as_deref().map(parse_arg).transpose()?,
            };
            if updates.is_empty() {
                return Err(PrintQuoteError::InvalidInput(
                    "nothing to update; pass --title, --quantity or --status".to_string(),
                ));
            }
            let job = ctx.client.jobs().update(parse_id(&id)?, &updates).await?;
            print_job(ctx, &job).await?;
        }
        Commands::Delete { id } => {
            let id = parse_id(&id)?;
            ctx.client.jobs().delete(id).await?;
            if !ctx.json {
                println!("Deleted job {}", id);
            }
        }
        Commands::Quote {
            file,
            preview,
            quick,
        } => {
            let mut request: CostCalculationRequest = read_json(&file)?;
            if request.currency.is_none() {
                request.currency = Some(ctx.display);
            }

            let costing = ctx.client.costing();
            let response = if preview {
                costing.preview(&request).await?
            } else if quick {
                costing.quick_calculate(&request).await?
            } else {
                costing.calculate(&request).await?
            };

            if ctx.json {
                print_json(&response)?;
            } else {
                println!("{}", render::quote(&response));
            }
        }
        Commands::Rates => {
            let rates = ctx.client.currency().exchange_rates().await?;
            if ctx.json {
                print_json(&rates)?;
            } else {
                println!("{}", render::rates(&rates));
            }
        }
        Commands::Convert { amount, from, to } => {
            let from = parse_currency(&from)?;
            let to = parse_currency(&to)?;
            let response = ctx.client.currency().convert(amount, from, to).await?;
            if ctx.json {
                print_json(&response)?;
            } else {
                println!(
                    "{} = {}",
                    currency::format(response.original_amount, response.from_currency),
                    currency::format(response.converted_amount, response.to_currency)
                );
            }
        }
        Commands::Export { id, kind, output } => {
            let id = parse_id(&id)?;
            let kind: ExportKind = parse_arg(&kind)?;
            let bytes = ctx.client.export().job(id, kind).await?;

            let path = output
                .unwrap_or_else(|| PathBuf::from(format!("job-{}.{}", id, kind.extension())));
            std::fs::write(&path, &bytes).map_err(|e| {
                StorageError::Io(std::io::Error::new(
                    e.kind(),
                    format!("cannot write {}: {}", path.display(), e),
                ))
            })?;
            tracing::info!("Wrote {} bytes to {}", bytes.len(), path.display());
            if !ctx.json {
                println!("{}", path.display());
            }
        }
        Commands::Settings { section } => match section {
            SettingsSection::Costs => {
                let params = ctx.client.settings().cost_parameters().await?;
                if ctx.json {
                    print_json(&params)?;
                } else {
                    println!("{}", render::cost_parameters(&params));
                }
            }
            SettingsSection::Branding => {
                let branding = ctx.client.settings().branding().await?;
                if ctx.json {
                    print_json(&branding)?;
                } else {
                    println!("{}", render::branding(&branding));
                }
            }
            SettingsSection::UpdateCosts {
                paper_per_sheet,
                plates_per_job,
                labor_per_hour,
                binding_per_unit,
                overhead,
                margin,
            } => {
                let updates = UpdateCostParametersRequest {
                    paper_cost_per_sheet: paper_per_sheet,
                    plate_cost_per_job: plates_per_job,
                    labor_cost_per_hour: labor_per_hour,
                    binding_cost_per_unit: binding_per_unit,
                    overhead_percentage: overhead.map(percent_to_fraction).transpose()?,
                    profit_margin_percentage: margin.map(percent_to_fraction).transpose()?,
                };
                if updates.is_empty() {
                    return Err(PrintQuoteError::InvalidInput(
                        "nothing to update; pass at least one cost option".to_string(),
                    ));
                }
                let params = ctx.client.settings().update_cost_parameters(&updates).await?;
                if ctx.json {
                    print_json(&params)?;
                } else {
                    println!("{}", render::cost_parameters(&params));
                }
            }
            SettingsSection::UpdateBranding {
                company_name,
                logo_url,
                primary_color,
                secondary_color,
            } => {
                let updates = UpdateBrandingRequest {
                    company_name,
                    company_logo_url: logo_url,
                    primary_color,
                    secondary_color,
                };
                if updates.is_empty() {
                    return Err(PrintQuoteError::InvalidInput(
                        "nothing to update; pass at least one branding option".to_string(),
                    ));
                }
                let branding = ctx.client.settings().update_branding(&updates).await?;
                if ctx.json {
                    print_json(&branding)?;
                } else {
                    println!("{}", render::branding(&branding));
                }
            }
        },
    }

    Ok(())
}

/// Print a job; non-USD display currencies get the backend's conversion of the total
async fn print_job(ctx: &Context, job: &Job) -> Result<()> {
    if ctx.json {
        return print_json(job);
    }

    println!("{}", render::job_detail(job));
    if ctx.display != Currency::Usd {
        match ctx
            .client
            .currency()
            .convert(job.total_cost, Currency::Usd, ctx.display)
            .await
        {
            Ok(conversion) => println!("{}", render::converted_total(&conversion)),
            Err(e) => tracing::warn!("Could not convert total to {}: {}", ctx.display, e),
        }
    }
    Ok(())
}

/// Percentages are entered as 0-100 and stored as fractions
fn percent_to_fraction(percent: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&percent) {
        return Err(PrintQuoteError::InvalidInput(format!(
            "percentage must be between 0 and 100, got {}",
            percent
        )));
    }
    Ok(percent / 100.0)
}

fn parse_arg<T>(value: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(PrintQuoteError::InvalidInput)
}

/// Strict currency parsing for arguments the backend will see
fn parse_currency(code: &str) -> Result<Currency> {
    parse_arg(&code.trim().to_uppercase())
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id.trim())
        .map_err(|_| PrintQuoteError::InvalidInput(format!("Invalid job id: '{}'", id)))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let mut content = String::new();
    if path == Path::new("-") {
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| PrintQuoteError::InvalidInput(format!("cannot read stdin: {}", e)))?;
    } else {
        content = std::fs::read_to_string(path).map_err(|e| {
            PrintQuoteError::InvalidInput(format!("cannot read {}: {}", path.display(), e))
        })?;
    }

    serde_json::from_str(&content).map_err(|e| {
        PrintQuoteError::InvalidInput(format!("invalid job description in {}: {}", path.display(), e))
    })
}

fn read_password(from_stdin: bool) -> Result<String> {
    let password = if from_stdin {
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| PrintQuoteError::InvalidInput(format!("cannot read password: {}", e)))?;
        line.trim_end_matches(['\r', '\n']).to_string()
    } else {
        rpassword::prompt_password("Password: ")
            .map_err(|e| PrintQuoteError::InvalidInput(format!("cannot read password: {}", e)))?
    };

    if password.is_empty() {
        return Err(PrintQuoteError::InvalidInput(
            "password cannot be empty".to_string(),
        ));
    }
    Ok(password)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| PrintQuoteError::InvalidInput(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

//! pq-currency - Format amounts and manage the preferred display currency

use clap::{Parser, Subcommand};
use libprintquote::currency::{self, Currency, CurrencyInfo};
use libprintquote::error::StorageError;
use libprintquote::logging::LogSettings;
use libprintquote::preferences::{Preferences, PREFERRED_CURRENCY_KEY};
use libprintquote::storage::KeyValueStore;
use libprintquote::{Config, PrintQuoteError, Result};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "pq-currency")]
#[command(version, about = "Format amounts and manage the preferred display currency")]
#[command(long_about = r#"Format amounts and manage the preferred display currency.

EXAMPLES:
    # Format in the preferred currency
    pq-currency format 1234.9

    # Format in a specific currency
    pq-currency format 1234.9 --currency FCFA
    pq-currency format -- -5 --currency EUR

    # Show or change the preferred currency
    pq-currency get
    pq-currency set EUR

    # List supported currencies
    pq-currency info
    pq-currency info --format json | jq '.[].symbol'

EXIT CODES:
    0 - Success
    1 - Error (configuration or storage problem)
    3 - Invalid input (unknown currency code for `set` or `info`)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Format an amount for display
    Format {
        /// Amount to format
        #[arg(allow_negative_numbers = true)]
        amount: f64,

        /// Currency code (defaults to the preferred currency; unknown codes format as USD)
        #[arg(short, long, value_name = "CODE")]
        currency: Option<String>,
    },

    /// Show symbol and name for one or all currencies
    Info {
        /// Currency code (all currencies when omitted)
        code: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Print the preferred currency
    Get,

    /// Change the preferred currency
    Set {
        /// One of USD, FCFA, EUR, GBP, CAD
        code: String,
    },

    /// Store the configured default currency unless a preference already exists
    Init,
}

fn main() {
    let cli = Cli::parse();
    LogSettings::from_env(cli.verbose).init();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(command: Commands) -> Result<()> {
    let config = Config::load()?;
    let store = config.open_store();
    let prefs = Preferences::new(store.clone());

    match command {
        Commands::Format { amount, currency } => {
            let code = currency
                .map(|c| resolve_display_code(&c))
                .unwrap_or_else(|| prefs.get_default());
            println!("{}", currency::format(amount, code));
        }
        Commands::Info { code, format } => {
            let infos: Vec<&CurrencyInfo> = match code {
                Some(code) => vec![currency::info_of(parse_code(&code)?)],
                None => Currency::ALL.iter().map(|c| currency::info_of(*c)).collect(),
            };
            print_info(&infos, &format)?;
        }
        Commands::Get => {
            println!("{}", prefs.get_default());
        }
        Commands::Set { code } => {
            let code = parse_code(&code)?;
            prefs.set_default(code);
            // set_default swallows storage failures; report them here
            let stored = store.get(PREFERRED_CURRENCY_KEY)?;
            if stored.as_deref() != Some(code.as_str()) {
                tracing::warn!(
                    "Preference was not saved to {}",
                    store.path().display()
                );
                return Err(StorageError::NotSaved(PREFERRED_CURRENCY_KEY.to_string()).into());
            }
            println!("{}", code);
        }
        Commands::Init => {
            if store.get(PREFERRED_CURRENCY_KEY)?.is_none() {
                prefs.set_default(config.defaults.currency);
            }
            println!("{}", prefs.get_default());
        }
    }

    Ok(())
}

fn parse_code(code: &str) -> Result<Currency> {
    code.trim()
        .to_uppercase()
        .parse()
        .map_err(PrintQuoteError::InvalidInput)
}

/// Lenient lookup for `format`: anything unrecognized formats as USD
fn resolve_display_code(code: &str) -> Currency {
    let resolved = Currency::parse_lenient(&code.to_uppercase());
    if resolved.as_str() != code.trim().to_uppercase() {
        tracing::debug!("Unknown currency '{}', formatting as {}", code, resolved);
    }
    resolved
}

#[derive(Serialize)]
struct InfoRow<'a> {
    code: &'a str,
    symbol: &'a str,
    name: &'a str,
    example: String,
}

fn print_info(infos: &[&CurrencyInfo], format: &str) -> Result<()> {
    let rows: Vec<InfoRow> = infos
        .iter()
        .map(|info| InfoRow {
            code: info.code.as_str(),
            symbol: info.symbol,
            name: info.name,
            example: currency::format(1234.5, info.code),
        })
        .collect();

    if format == "json" {
        let json = serde_json::to_string_pretty(&rows)
            .map_err(|e| PrintQuoteError::InvalidInput(e.to_string()))?;
        println!("{}", json);
    } else {
        for row in rows {
            println!("{:<5} {:<5} {:<26} {}", row.code, row.symbol, row.name, row.example);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_code_is_case_insensitive_for_cli() {
        assert_eq!(parse_code("eur").unwrap(), Currency::Eur);
        assert_eq!(parse_code(" fcfa ").unwrap(), Currency::Fcfa);
        let err = parse_code("XAF").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_resolve_display_code_falls_back() {
        assert_eq!(resolve_display_code("gbp"), Currency::Gbp);
        assert_eq!(resolve_display_code("ZZZ"), Currency::Usd);
    }
}

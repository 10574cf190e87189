use std::sync::OnceLock;
use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

/// Evaluation progress at info; storage and hub chatter only when it matters.
pub const DEFAULT_LOG_FILTER: &str = "romansh_mt_eval=info,foyer=warn,hf_hub=warn";
/// Crate-specific override, checked before `RUST_LOG`.
pub const LOG_FILTER_ENV: &str = "RMEVAL_LOG";

static INSTALLED: OnceLock<()> = OnceLock::new();

#[derive(Debug, Error)]
pub enum TelemetryInitError {
    #[error("invalid log filter `{directive}`")]
    Filter {
        directive: String,
        #[source]
        source: ParseError,
    },
    #[error("failed to install log subscriber")]
    Install(#[from] TryInitError),
}

/// Installs compact stderr logging for evaluation runs.
///
/// The filter comes from `RMEVAL_LOG`, then `RUST_LOG`, then
/// [`DEFAULT_LOG_FILTER`]. An invalid `RMEVAL_LOG` is an error; an invalid
/// `RUST_LOG` falls back to the default. Repeated calls are no-ops.
pub fn init_tracing() -> Result<(), TelemetryInitError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    let filter = match std::env::var(LOG_FILTER_ENV) {
        Ok(directive) if !directive.trim().is_empty() => parse_filter(&directive)?,
        _ => EnvFilter::try_from_default_env().or_else(|_| parse_filter(DEFAULT_LOG_FILTER))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()?;
    let _ = INSTALLED.set(());
    Ok(())
}

fn parse_filter(directive: &str) -> Result<EnvFilter, TelemetryInitError> {
    EnvFilter::try_new(directive).map_err(|source| TelemetryInitError::Filter {
        directive: directive.to_string(),
        source,
    })
}

/// Prefix of `value` with at most `max_chars` characters, for log fields.
pub fn truncate(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((cutoff, _)) => &value[..cutoff],
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("Grüezi", 3), "Grü");
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[test]
    fn default_filter_parses() {
        assert!(parse_filter(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn invalid_filter_names_the_directive() {
        let err = parse_filter("romansh_mt_eval=loud").unwrap_err();
        assert_eq!(err.to_string(), "invalid log filter `romansh_mt_eval=loud`");
    }
}

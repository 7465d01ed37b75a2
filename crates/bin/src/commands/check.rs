//! Consistency check command.

use std::sync::Arc;

use binder::{ConsistencyService, IdentityService};

use crate::backend::create_store;
use crate::cli::{BackendConfig, TokensArgs};
use crate::output::{OutputFormat, print_json};

/// Run the check command, returning whether the tokens are consistent
pub async fn run(
    args: &TokensArgs,
    config: &BackendConfig,
    format: OutputFormat,
) -> Result<bool, Box<dyn std::error::Error>> {
    let ids = IdentityService::new(create_store(config).await?);
    let consistency = ConsistencyService::new(Arc::new(ids));

    let consistent = consistency.is_consistent(&args.tokens).await?;

    match format {
        OutputFormat::Human => {
            if consistent {
                println!("consistent");
            } else {
                println!("inconsistent");
            }
        }
        OutputFormat::Json => {
            let tokens: Vec<String> = args.tokens.iter().map(|t| t.to_string()).collect();
            let value = serde_json::json!({
                "tokens": tokens,
                "consistent": consistent,
            });
            print_json(&value)?;
        }
    }

    Ok(consistent)
}

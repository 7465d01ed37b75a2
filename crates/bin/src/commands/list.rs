//! Group listing command.

use crate::backend::create_store;
use crate::cli::BackendConfig;
use crate::output::{OutputFormat, print_groups};

/// Run the list command
pub async fn run(
    config: &BackendConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = create_store(config).await?;
    let groups = store.find_all().await?;
    print_groups(&groups, format)?;
    Ok(())
}

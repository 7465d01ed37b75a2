//! Bind command - joins tokens into one group.

use binder::IdentityService;

use crate::backend::{create_store, persist_store};
use crate::cli::{BackendConfig, TokensArgs};
use crate::output::{OutputFormat, group_json, group_label, member_list, print_json};

/// Run the bind command
pub async fn run(
    args: &TokensArgs,
    config: &BackendConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = create_store(config).await?;
    let ids = IdentityService::new(store.clone());

    let group = ids.bind_tokens(&args.tokens).await?;
    persist_store(&store, config).await?;

    match format {
        OutputFormat::Human => {
            let id = group_label(&group);
            println!("Bound {} identities into group {id}", group.len());
            println!("Members:     {}", member_list(&group));
        }
        OutputFormat::Json => {
            print_json(&group_json(&group))?;
        }
    }

    Ok(())
}

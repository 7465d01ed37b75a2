//! Unbind command - removes an identity from its group.

use binder::{IdentityService, TokenIdentity};

use crate::backend::{create_store, persist_store};
use crate::cli::{BackendConfig, IdentityArgs};
use crate::output::{OutputFormat, group_json, group_label, print_json};

/// Run the unbind command
pub async fn run(
    args: &IdentityArgs,
    config: &BackendConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = create_store(config).await?;
    let ids = IdentityService::new(store.clone());

    let group = ids
        .unbind_and_save(args.identity.subject(), args.identity.issuer())
        .await?;
    if group.is_some() {
        persist_store(&store, config).await?;
    }

    match format {
        OutputFormat::Human => match &group {
            Some(group) => {
                let id = group_label(group);
                println!("Unbound {} from group {id}", args.identity);
            }
            None => println!("Identity {} is not bound.", args.identity),
        },
        OutputFormat::Json => {
            let value = serde_json::json!({
                "identity": args.identity.to_string(),
                "unbound": group.is_some(),
                "group": group.as_ref().map(group_json),
            });
            print_json(&value)?;
        }
    }

    Ok(())
}

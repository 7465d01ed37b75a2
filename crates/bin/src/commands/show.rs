//! Show a single identity and its group.

use binder::{IdentityService, TokenIdentity};

use crate::backend::create_store;
use crate::cli::{BackendConfig, IdentityArgs};
use crate::output::{OutputFormat, group_json, group_label, member_list, print_json};

/// Run the show command
pub async fn run(
    args: &IdentityArgs,
    config: &BackendConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let ids = IdentityService::new(create_store(config).await?);
    let subject = args.identity.subject();
    let issuer = args.identity.issuer();

    let single = ids.get_single_by_subject_issuer(subject, issuer).await?;
    let group = ids.find_multiple_by_member(subject, issuer).await?;

    match format {
        OutputFormat::Human => {
            let Some(single) = single else {
                println!("Identity {} is not registered.", args.identity);
                return Ok(());
            };
            println!("Identity:    {single}");
            match &group {
                Some(group) => {
                    let id = group_label(group);
                    println!("Group:       {id}");
                    println!("Members:     {}", member_list(group));
                }
                None => println!("Group:       (unbound)"),
            }
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "identity": args.identity.to_string(),
                "registered": single.is_some(),
                "group": group.as_ref().map(group_json),
            });
            print_json(&value)?;
        }
    }

    Ok(())
}

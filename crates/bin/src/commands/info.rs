//! Store info command - shows backend and identity/group counts.

use crate::backend::{backend_label, create_store};
use crate::cli::BackendConfig;
use crate::output::{OutputFormat, print_json};

/// Run the info command
pub async fn run(
    config: &BackendConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = create_store(config).await?;

    let identities = store.list_singles().await?;
    let groups = store.find_all().await?;
    let bound: usize = groups.iter().map(|group| group.len()).sum();

    let backend_str = backend_label(config);

    match format {
        OutputFormat::Human => {
            println!("Backend:     {backend_str}");
            println!("Identities:  {}", identities.len());
            println!("Bound:       {bound}");
            println!("Groups:      {}", groups.len());
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "backend": backend_str,
                "identities": identities.len(),
                "bound": bound,
                "groups": groups.len(),
            });
            print_json(&value)?;
        }
    }

    Ok(())
}

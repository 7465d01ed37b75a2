//! Rendering of groups and command results for human or JSON output.

use binder::MultipleIdentity;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Human }
    }
}

/// Print a serializable value as one line of JSON.
pub fn print_json(value: &serde_json::Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Group id as shown to users; unsaved groups have none.
pub fn group_label(group: &MultipleIdentity) -> String {
    group.id().map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Comma-separated members in sorted order.
pub fn member_list(group: &MultipleIdentity) -> String {
    group
        .sorted_identities()
        .iter()
        .map(|identity| identity.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// JSON rendering of a group, members sorted for stable output.
pub fn group_json(group: &MultipleIdentity) -> serde_json::Value {
    serde_json::json!({
        "id": group.id().map(|id| id.get()),
        "members": group
            .sorted_identities()
            .iter()
            .map(|identity| identity.to_string())
            .collect::<Vec<_>>(),
    })
}

/// Print every group, one row each.
pub fn print_groups(
    groups: &[MultipleIdentity],
    format: OutputFormat,
) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Human => {
            for line in group_table(groups) {
                println!("{line}");
            }
            Ok(())
        }
        OutputFormat::Json => {
            let entries: Vec<_> = groups.iter().map(group_json).collect();
            print_json(&serde_json::Value::Array(entries))
        }
    }
}

/// Lines of the human-readable group table, columns padded to the widest cell.
fn group_table(groups: &[MultipleIdentity]) -> Vec<String> {
    if groups.is_empty() {
        return vec!["No groups found.".to_string()];
    }

    let rows: Vec<[String; 3]> = groups
        .iter()
        .map(|group| [group_label(group), group.len().to_string(), member_list(group)])
        .collect();

    let header = ["GROUP", "SIZE", "MEMBERS"];
    let id_width = rows.iter().map(|r| r[0].len()).fold(header[0].len(), usize::max);
    let size_width = rows.iter().map(|r| r[1].len()).fold(header[1].len(), usize::max);

    std::iter::once([header[0].to_string(), header[1].to_string(), header[2].to_string()])
        .chain(rows)
        .map(|[id, size, members]| {
            format!("{id:<id_width$}  {size:>size_width$}  {members}")
                .trim_end()
                .to_string()
        })
        .collect()
}

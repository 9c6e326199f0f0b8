//! Shows information about the built-in handlers and the config format
use schemars::schema_for;
use std::path::Path;
use tokio::fs;

use branchsmith::{BranchConfig, HandlerRegistry, Result};

/// Print each built-in handler with its capabilities
pub fn handlers() -> Result<()> {
    let registry = HandlerRegistry::builtin();

    for handler in registry.handlers() {
        let capabilities = handler
            .capabilities()
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!("{}: {capabilities}", handler.id());
    }

    Ok(())
}

/// Print the JSON schema of the branch config file
pub async fn schema(out_file: Option<String>) -> Result<()> {
    let schema = schema_for!(BranchConfig);
    print_json(serde_json::to_value(&schema)?, out_file).await
}

pub async fn print_json(
    json: serde_json::Value,
    out_file: Option<String>,
) -> Result<()> {
    if let Some(out_file) = out_file {
        let file_path = Path::new(&out_file);

        if let Some(parent) = file_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(&json)?;
        log::info!("writing json to: {}", file_path.display());
        fs::write(file_path, &content).await?;
    } else {
        println!("{}", serde_json::to_string_pretty(&json)?);
    }

    Ok(())
}

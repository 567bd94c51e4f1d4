use anyhow::Context;
use ci_tools_core::markdown_index::write_index;
use std::path::Path;

pub fn run(root: &Path, output: &Path, json: bool) -> anyhow::Result<()> {
    let count = write_index(root, output)
        .with_context(|| format!("failed to index markdown under {}", root.display()))?;

    if json {
        crate::output::print_json(&serde_json::json!({
            "root": root,
            "output": root.join(output),
            "documents": count,
        }))?;
    } else {
        println!("Indexed {count} documents into {}", root.join(output).display());
    }
    Ok(())
}

//! Markdown index generation.
//!
//! Walks a repository for `*.md` documents and renders a single index page
//! linking to all of them, grouped by directory.

use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

pub const INDEX_FILE: &str = "INDEX.md";

const SKIP_DIRS: &[&str] = &["vendor", "node_modules", "target"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Path relative to the indexed root, `/`-separated.
    pub path: String,
    pub title: String,
}

impl Document {
    /// Directory part of `path`, or `/` for documents at the root.
    pub fn directory(&self) -> &str {
        match self.path.rsplit_once('/') {
            Some((dir, _)) => dir,
            None => "/",
        }
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIP_DIRS.contains(&name.as_ref())
}

/// Every markdown document under `root` except `index_file`, sorted by path.
pub fn collect_documents(root: &Path, index_file: &Path) -> Result<Vec<Document>> {
    let mut docs = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e));

    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|e| e.to_str()) != Some("md")
            || path == index_file
        {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let content = std::fs::read_to_string(path)?;
        let title = first_heading(&content).unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| relative.clone())
        });
        docs.push(Document {
            path: relative,
            title,
        });
    }

    docs.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(docs)
}

/// First level-one ATX heading outside fenced code blocks.
fn first_heading(content: &str) -> Option<String> {
    let mut in_fence = false;
    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(title) = trimmed.strip_prefix("# ") {
            let title = title.trim().trim_end_matches('#').trim();
            if !title.is_empty() {
                return Some(title.to_string());
            }
        }
    }
    None
}

pub fn render_index(docs: &[Document]) -> String {
    let mut groups: BTreeMap<&str, Vec<&Document>> = BTreeMap::new();
    for doc in docs {
        groups.entry(doc.directory()).or_default().push(doc);
    }

    let mut out = String::from("# Index\n");
    for (dir, mut entries) in groups {
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        out.push_str(&format!("\n## {dir}\n\n"));
        for doc in entries {
            out.push_str(&format!("- [{}]({})\n", doc.title, doc.path));
        }
    }
    out
}

/// Regenerate the index at `output` (relative paths resolve against `root`).
/// Returns the number of documents indexed.
pub fn write_index(root: &Path, output: &Path) -> Result<usize> {
    let output = if output.is_absolute() {
        output.to_path_buf()
    } else {
        root.join(output)
    };
    let docs = collect_documents(root, &output)?;
    crate::io::atomic_write(&output, render_index(&docs).as_bytes())?;
    tracing::info!(documents = docs.len(), path = %output.display(), "wrote markdown index");
    Ok(docs.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, content: &str) {
        let path = dir.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn collects_titles_and_skips_ignored_dirs() {
        let dir = TempDir::new().unwrap();
        write(&dir, "README.md", "# Test Infra\n\nOverview");
        write(&dir, "docs/prow/jobs.md", "intro\n# Prow Jobs\n");
        write(&dir, "docs/notes.md", "no heading here");
        write(&dir, "vendor/lib/README.md", "# Vendored");
        write(&dir, ".github/PULL_REQUEST_TEMPLATE.md", "# Template");
        write(&dir, "docs/image.png", "");

        let docs = collect_documents(dir.path(), &dir.path().join(INDEX_FILE)).unwrap();
        let paths: Vec<_> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["README.md", "docs/notes.md", "docs/prow/jobs.md"]);
        assert_eq!(docs[0].title, "Test Infra");
        assert_eq!(docs[1].title, "notes");
        assert_eq!(docs[2].title, "Prow Jobs");
    }

    #[test]
    fn heading_inside_code_fence_is_ignored() {
        let content = "```sh\n# not a title\n```\n# Real Title\n";
        assert_eq!(first_heading(content).as_deref(), Some("Real Title"));
    }

    #[test]
    fn renders_grouped_by_directory() {
        let docs = vec![
            Document {
                path: "docs/b.md".into(),
                title: "B".into(),
            },
            Document {
                path: "README.md".into(),
                title: "Readme".into(),
            },
            Document {
                path: "docs/a.md".into(),
                title: "A".into(),
            },
        ];
        let rendered = render_index(&docs);
        assert_eq!(
            rendered,
            "# Index\n\n## /\n\n- [Readme](README.md)\n\n## docs\n\n- [A](docs/a.md)\n- [B](docs/b.md)\n"
        );
    }

    #[test]
    fn write_index_excludes_itself() {
        let dir = TempDir::new().unwrap();
        write(&dir, "README.md", "# Root");
        write(&dir, "docs/guide.md", "# Guide");

        let count = write_index(dir.path(), Path::new(INDEX_FILE)).unwrap();
        assert_eq!(count, 2);
        let again = write_index(dir.path(), Path::new(INDEX_FILE)).unwrap();
        assert_eq!(again, 2);

        let index = std::fs::read_to_string(dir.path().join(INDEX_FILE)).unwrap();
        assert!(index.contains("- [Guide](docs/guide.md)"));
        assert!(!index.contains("INDEX.md"));
    }
}

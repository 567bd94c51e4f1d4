use crate::error::Result;
use regex::Regex;
use std::io::Read;
use std::sync::OnceLock;

static IMAGE_RE: OnceLock<Regex> = OnceLock::new();

fn image_re() -> &'static Regex {
    IMAGE_RE.get_or_init(|| Regex::new(r#"(?m)^\s*image\s*=\s*"([^"]+)""#).unwrap())
}

/// Image references assigned to `image = "..."` attributes in a Terraform file.
pub fn from_terraform<R: Read>(mut reader: R) -> Result<Vec<String>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    Ok(image_re()
        .captures_iter(&content)
        .map(|caps| caps[1].to_string())
        .collect())
}

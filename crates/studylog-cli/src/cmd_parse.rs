use anyhow::{Context, Result};
use std::io::{self, Read};
use std::path::PathBuf;
use studylog::{load_field_labels, parse_body};

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

pub fn run(template: PathBuf) -> Result<()> {
    let labels = load_field_labels(&template)
        .with_context(|| format!("Failed to load form definition {}", template.display()))?;
    let body = read_stdin()?;
    let fields = parse_body(&body, &labels);
    let json = serde_json::to_string_pretty(&fields).context("failed to serialize fields")?;
    println!("{json}");
    Ok(())
}

use anyhow::{Context, Result};
use std::path::PathBuf;
use studylog::{SyncOutcome, store, sync_template};

pub fn run(data: PathBuf, template: PathBuf, dry_run: bool) -> Result<()> {
    let doc = store::load(&data)
        .with_context(|| format!("Error reading or parsing {}", data.display()))?;
    log::debug!("Found {} goals in {}", doc.goals.len(), data.display());

    let outcome = sync_template(&template, &doc.goals, dry_run)
        .with_context(|| format!("Failed to sync {}", template.display()))?;
    match outcome {
        SyncOutcome::Updated => {
            println!("Goal options updated in issue template.");
            if !dry_run {
                println!("Successfully updated {}", template.display());
            }
        }
        SyncOutcome::UpToDate => println!("Goal options are already up-to-date."),
        SyncOutcome::DropdownMissing => println!(
            "No goalId dropdown found in {}; nothing to update.",
            template.display()
        ),
    }
    Ok(())
}

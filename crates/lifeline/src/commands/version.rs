//! Version command

use crate::cli::VersionArgs;
use crate::output;
use crate::version::VersionInfo;
use anyhow::Result;

pub fn run(args: VersionArgs) -> Result<()> {
    let info = VersionInfo::current();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", info.display());
    if let Some(commit) = &info.commit {
        output::kv("Commit", commit);
    }
    if let Some(date) = &info.build_date {
        output::kv("Build date", date);
    }
    if let Some(target) = &info.target {
        output::kv("Target", target);
    }

    Ok(())
}

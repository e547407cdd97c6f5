use anyhow::{bail, Context as _, Result};

use crate::actual_api::ActualHttpStorage;
use crate::args::Args;
use crate::config::Config;
use crate::driver::RunDriver;
use crate::import::expand_patterns;

/// Run one import. Returns an error for anything that prevents the run from
/// completing: bad configuration, no input files, an unreachable ledger or a
/// failed commit. Individual rows and files that fail are only logged.
pub async fn main(args: Args) -> Result<()> {
    let config = Config::from_args(args).context("Invalid configuration")?;
    log::debug!("{config:?}");

    let files = expand_patterns(&config.file_patterns).context("Failed to find input files")?;
    if files.is_empty() {
        bail!("No input files match {:?}", config.file_patterns);
    }
    log::info!("Found {} input files", files.len());

    let storage = ActualHttpStorage::connect(&config.ledger)
        .await
        .context("Failed to connect to the ledger")?;

    let report = RunDriver::new(&config, storage)
        .run(&files)
        .await
        .context("Failed to commit the import to the ledger")?;

    println!("{report}");
    if report.files_failed == files.len() {
        bail!("None of the {} input files could be imported", files.len());
    }
    Ok(())
}

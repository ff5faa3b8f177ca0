//! CLI command for spreadsheet export

use std::path::PathBuf;

use chrono::Local;

use crate::error::PocketbookResult;
use crate::export::ExportArtifact;
use crate::services::Session;

use super::print_progress;

/// Handle the export command
///
/// Writes to `output`, or to a dated file in the export directory.
pub async fn handle_export_command(
    session: &Session,
    output: Option<PathBuf>,
) -> PocketbookResult<()> {
    let Some(artifact) = session.export(print_progress).await? else {
        println!("An export is already running.");
        return Ok(());
    };

    let path = match output {
        Some(path) => path,
        None => session
            .paths()
            .export_dir()
            .join(ExportArtifact::file_name_for(Local::now().date_naive())),
    };
    artifact.write_to(&path).await?;

    println!("Exported to {}", path.display());
    Ok(())
}

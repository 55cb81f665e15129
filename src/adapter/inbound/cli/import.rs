//! Handler for the `import` command.

use serde_json::json;

use crate::adapter::inbound::cli::command::ImportArgs;
use crate::adapter::inbound::cli::output;
use crate::application::import::ImportService;
use crate::domain::RouteId;
use crate::error::Result;
use crate::infrastructure::bootstrap::Services;

/// Lines listed individually before the rest are summarised.
const SKIPPED_SHOWN: usize = 5;

/// Execute `import`.
pub async fn execute(services: &Services, args: &ImportArgs) -> Result<()> {
    let id = RouteId::new(args.route.as_str());
    services.routes.require(&id).await?;

    let report = ImportService::new(&services.history)
        .import_file(&id, &args.file)
        .await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "import",
            "route_id": id,
            "file": args.file.display().to_string(),
            "report": report,
        }));
        return Ok(());
    }

    output::success(&format!(
        "Imported {} days into {}",
        report.imported,
        output::highlight(&id)
    ));
    output::field("Lines", report.lines);
    output::field("Kept", report.kept_existing);
    output::field("Skipped", report.skipped.len());
    for skipped in report.skipped.iter().take(SKIPPED_SHOWN) {
        output::warning(&format!("line {}: {}", skipped.line, skipped.reason));
    }
    if report.skipped.len() > SKIPPED_SHOWN {
        output::note(&format!(
            "{} more skipped lines not shown",
            report.skipped.len() - SKIPPED_SHOWN
        ));
    }
    Ok(())
}

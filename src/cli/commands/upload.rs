//! CLI commands `esp8266fs upload`, `pack` and `plan`
//!
//! All three drive the same session; they differ in how far it runs and in
//! what is printed afterwards.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::cli::output::{
    is_json, print_detail, print_info, print_success, ConsoleSink, OutputConfig,
};
use crate::cli::RunContext;
use crate::core::report::LogSink;
use crate::core::session::{RunMode, RunRequest, Session, UploadPlan};
use crate::infra::platform::HostPlatform;

/// Run the session on the blocking pool
///
/// Each invocation builds its own `Session`, so the single-flight guard
/// rejects overlapping runs within this process only. Two `esp8266fs`
/// processes are not excluded from one another.
async fn run_session(context: RunContext, mode: RunMode) -> Result<UploadPlan> {
    let verbosity = OutputConfig::current().verbosity(context.settings.log_level());
    let sink: Arc<dyn LogSink> = Arc::new(ConsoleSink::new(verbosity));

    let request = RunRequest {
        project_root: context.project_root,
        settings: context.settings,
        platform: HostPlatform::detect(),
        mode,
    };
    tracing::debug!(?mode, platform = %request.platform, "starting session");

    let plan = tokio::task::spawn_blocking(move || Session::new(sink).run(&request))
        .await
        .context("Upload task did not complete")??;
    Ok(plan)
}

/// Execute `upload` or `pack`
pub async fn execute(context: RunContext, mode: RunMode) -> Result<()> {
    let plan = run_session(context, mode).await?;

    if is_json() {
        let json_result = serde_json::json!({
            "status": "success",
            "mode": if mode == RunMode::Pack { "pack" } else { "upload" },
            "image": plan.image,
            "size": plan.layout.size(),
            "transport": plan.transport,
        });
        println!("{}", serde_json::to_string_pretty(&json_result)?);
        return Ok(());
    }

    match (mode, &plan.transport) {
        (RunMode::Pack, _) | (_, None) => {
            print_success(&format!("SPIFFS image written to {}", plan.image.display()));
        }
        (_, Some(transport)) => {
            print_success("ESP8266 Uploaded!");
            print_detail(&format!("{} via {}", plan.image.display(), transport));
        }
    }
    Ok(())
}

/// Execute `plan`
pub async fn execute_plan(context: RunContext) -> Result<()> {
    let plan = run_session(context, RunMode::Plan).await?;

    if is_json() {
        let json_result = serde_json::json!({
            "status": "success",
            "plan": plan,
        });
        println!("{}", serde_json::to_string_pretty(&json_result)?);
        return Ok(());
    }

    print_info(&format!("Target {} ({})", plan.target, plan.memory_config));
    print_detail(&format!("Arduino:     {}", plan.arduino_path.display()));
    print_detail(&format!("Preferences: {}", plan.preferences_dir.display()));
    print_detail(&format!("Package:     {}", plan.board_package_version));
    print_detail(&format!(
        "Data:        {} ({} files, {} bytes)",
        plan.data_dir.display(),
        plan.data_files,
        plan.data_bytes
    ));
    print_detail(&format!(
        "SPIFFS:      0x{:06X}..0x{:06X} ({} bytes, page {}, block {})",
        plan.layout.start,
        plan.layout.end,
        plan.layout.size(),
        plan.layout.page_size,
        plan.layout.block_size
    ));
    print_detail(&format!("Image:       {}", plan.image.display()));
    if let Some(transport) = &plan.transport {
        print_detail(&format!("Transport:   {transport}"));
    }

    print_info("Commands:");
    print_detail(&plan.pack_command.to_string());
    if let Some(upload) = &plan.upload_command {
        print_detail(&upload.to_string());
    }
    Ok(())
}

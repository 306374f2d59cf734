//! Status command - check the runtime and compare host and upstream formats

use crate::config::Config;
use crate::error::MixpodResult;
use crate::image::image_name;
use crate::orchestration::{CliRuntime, ContainerRuntime};
use crate::runner::container_required;
use crate::ui::{self, UiContext};
use crate::upstream::{read_host_format, resolve_upstream_version, upstream_format};
use crate::upstream::{HttpUpstream, UpstreamSource};
use tracing::debug;

/// What the status command found
#[derive(Debug, Default)]
pub struct StatusReport {
    pub runtime: String,
    pub runtime_available: bool,
    pub host_format: Option<String>,
    /// Resolved upstream release and its format
    pub upstream: Option<(String, String)>,
    /// Why upstream could not be resolved
    pub upstream_error: Option<String>,
    /// Whether the image for the upstream format exists, when it could be checked
    pub image_present: Option<bool>,
}

impl StatusReport {
    /// `None` while the upstream format is unknown
    pub fn container_required(&self) -> Option<bool> {
        self.upstream
            .as_ref()
            .map(|(_, format)| container_required(self.host_format.as_deref(), format))
    }
}

/// Execute the status command
pub async fn execute(config: &Config) -> MixpodResult<()> {
    let ctx = UiContext::detect();
    let runtime = CliRuntime::from_settings(&config.container);
    let upstream = HttpUpstream::new(config.upstream.url.clone());

    let report = collect(config, &runtime, &upstream).await?;
    print_report(&ctx, config, &report);
    Ok(())
}

/// Gather the report. Upstream and runtime problems are recorded rather than
/// returned; only an unreadable host format file is an error.
pub async fn collect(
    config: &Config,
    runtime: &dyn ContainerRuntime,
    upstream: &dyn UpstreamSource,
) -> MixpodResult<StatusReport> {
    let mut report = StatusReport {
        runtime: runtime.runtime_name().to_string(),
        runtime_available: runtime.is_available().await?,
        host_format: read_host_format(&config.container.host_format_path).await?,
        ..Default::default()
    };

    let resolved = async {
        let version = resolve_upstream_version(upstream, &config.upstream.version).await?;
        let format = upstream_format(upstream, &version).await?;
        Ok::<_, crate::error::MixpodError>((version, format))
    }
    .await;

    match resolved {
        Ok((version, format)) => {
            if report.runtime_available {
                let name = image_name(&config.container.image_repository, &format);
                match runtime.image_exists(&name).await {
                    Ok(present) => report.image_present = Some(present),
                    Err(e) => debug!("Image query failed: {}", e),
                }
            }
            report.upstream = Some((version, format));
        }
        Err(e) => report.upstream_error = Some(e.to_string()),
    }

    Ok(report)
}

fn print_report(ctx: &UiContext, config: &Config, report: &StatusReport) {
    ui::section(ctx, "Runtime");
    if report.runtime_available {
        ui::step_ok(ctx, &format!("{} available", report.runtime));
    } else {
        ui::step_warn(ctx, &format!("{} not found", report.runtime));
    }

    println!();
    ui::section(ctx, "Formats");
    match &report.host_format {
        Some(format) => ui::key_value(ctx, "Host format", format),
        None => ui::key_value_status(ctx, "Host format", "unknown", false),
    }
    match (&report.upstream, &report.upstream_error) {
        (Some((version, format)), _) => {
            ui::key_value(ctx, "Upstream version", version);
            ui::key_value(ctx, "Upstream format", format);
        }
        (None, Some(reason)) => ui::step_warn(
            ctx,
            &format!("Upstream {} not reachable: {}", config.upstream.url, reason),
        ),
        (None, None) => {}
    }

    if let Some(required) = report.container_required() {
        let value = if required { "required" } else { "not required" };
        ui::key_value_status(ctx, "Container", value, !required);
    }

    if let (Some((_, format)), Some(present)) = (&report.upstream, report.image_present) {
        let name = image_name(&config.container.image_repository, format);
        let value = if present { "present" } else { "not built" };
        ui::key_value_status(ctx, &name, value, present);
    }
}

//! Build command - make sure the image for the configured upstream exists

use crate::config::Config;
use crate::error::MixpodResult;
use crate::orchestration::CliRuntime;
use crate::runner::ContainerRunner;
use crate::ui::{self, TaskSpinner, UiContext};
use crate::upstream::HttpUpstream;
use std::path::Path;

/// Execute the build command
pub async fn execute(config: &Config, cwd: &Path) -> MixpodResult<()> {
    let ctx = UiContext::detect();
    let upstream = HttpUpstream::new(config.upstream.url.clone());
    let runtime = CliRuntime::from_settings(&config.container);
    let mut runner = ContainerRunner::new(config, cwd, &runtime, &upstream);

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Ensuring image...");
    let (version, range, image) = match runner.ensure_image().await {
        Ok(ensured) => ensured,
        Err(e) => {
            spinner.stop_error("Image not available");
            return Err(e);
        }
    };

    let status = if image.was_cached { "already present" } else { "built" };
    spinner.stop(&format!("Image {} {}", image.name, status));

    ui::key_value(&ctx, "Upstream version", &version);
    ui::key_value(&ctx, "Format", &range.format);
    ui::key_value(
        &ctx,
        "Format releases",
        &format!("{}..={}", range.first, range.latest),
    );
    println!("{}", image.name);

    Ok(())
}

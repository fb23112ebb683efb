mod bootstrap;
mod report;

use anyhow::Result;
use chrono::Utc;
use dashboard_core::settings::Settings;
use dashboard_core::time_utils::resolve_timezone;
use dashboard_runtime::orchestrator::DashboardOrchestrator;
use dashboard_ui::app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    let log_target = bootstrap::log_target(
        &settings.view,
        settings.log_file.as_deref(),
        &bootstrap::state_dir(),
    );
    bootstrap::setup_logging(&settings.log_level, &log_target)?;

    tracing::info!("usage-dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Tab: {}, Theme: {}, Timezone: {}",
        settings.view,
        settings.tab,
        settings.theme,
        settings.timezone
    );

    let data_path = bootstrap::discover_data_path(settings.data_path.as_deref());
    match &data_path {
        Some(path) => tracing::info!("Reading sessions from {}", path.display()),
        None => tracing::warn!("No session directory found; showing empty data"),
    }

    match settings.view.as_str() {
        "live" => {
            tracing::info!("Starting live dashboard...");

            let orchestrator =
                DashboardOrchestrator::new(u64::from(settings.refresh_rate), data_path);
            let (rx, handle) = orchestrator.start();

            let app = App::new(
                &settings.theme,
                resolve_timezone(&settings.timezone),
                &settings.tab,
            );

            // The loop exits on 'q' / Ctrl+C inside the TUI. Ctrl+C is also
            // watched at the OS level for signals delivered outside raw mode;
            // the loop yields every iteration so this arm can win, and the
            // app's terminal guard restores the screen when it is dropped.
            tokio::select! {
                result = app.run_live(rx, handle.trigger()) => {
                    handle.abort();
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down refresh task");
                    handle.abort();
                }
            }
        }

        "report" => {
            let report = report::build_report(data_path.as_deref(), Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        unknown => {
            anyhow::bail!("unknown view mode: {unknown}");
        }
    }

    Ok(())
}

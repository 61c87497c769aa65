use storefront::infrastructure::ConfigRepository;
use storefront::presentation::services::log_capture::init_log_capture;
use storefront::presentation::ui::StorefrontApp;

fn main() -> anyhow::Result<()> {
    let log_rx = init_log_capture()?;

    let config_repository = ConfigRepository::new();
    let config = config_repository.load().unwrap_or_else(|e| {
        tracing::warn!(
            "Ignoring unreadable config {}: {:#}",
            config_repository.path().display(),
            e
        );
        Default::default()
    });

    let start_location = std::env::args().nth(1);
    let app = StorefrontApp::new(config, config_repository, start_location, log_rx)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Storefront",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("UI terminated: {}", e))
}

use oxidemap::OxideMapApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_title("oxidemap"),
        ..Default::default()
    };

    eframe::run_native(
        "oxidemap",
        options,
        Box::new(|cc| Ok(Box::new(OxideMapApp::new(cc)))),
    )
}

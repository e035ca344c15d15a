mod app;
mod flavor;
mod util;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to the flavor map dataset (JSON).
    #[arg(long, default_value = "data/flavor-map.json")]
    data: String,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "flavor map",
        options,
        Box::new(move |cc| Ok(Box::new(app::FlavorMapApp::new(cc, args.data.clone())))),
    )
}

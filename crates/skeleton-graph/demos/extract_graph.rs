//! Extract skeleton graphs from an image described by a JSON config.
//!
//! ```text
//! cargo run --example extract_graph -- extract.json
//! ```

use std::path::PathBuf;

use image::ImageReader;
use skeleton_graph::detect;
use skeleton_graph::topology::{GraphExtractConfig, GraphReport};

#[cfg(not(feature = "tracing"))]
use log::{info, warn, LevelFilter};
#[cfg(feature = "tracing")]
use tracing::{info, warn};

#[cfg(feature = "tracing")]
use skeleton_graph::core::init_tracing;
#[cfg(not(feature = "tracing"))]
use skeleton_graph::core::init_with_level;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(not(feature = "tracing"))]
    init_with_level(LevelFilter::Info)?;
    #[cfg(feature = "tracing")]
    init_tracing(false);

    run()
}

#[cfg_attr(feature = "tracing", tracing::instrument(level = "info"))]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Some(config_path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("Usage: extract_graph <config.json>");
        return Ok(());
    };

    let cfg = GraphExtractConfig::load_json(&config_path)?;
    let img = ImageReader::open(&cfg.input_path)?.decode()?.to_luma8();
    info!(
        "loaded {} ({}x{}, {} foreground pixels)",
        cfg.input_path,
        img.width(),
        img.height(),
        detect::binary_from_gray(&img).count_set()
    );

    let islands = detect::graphs_from_gray(&img, &cfg.params)?;
    let mut report = GraphReport::new(
        &cfg,
        &config_path,
        img.width() as usize,
        img.height() as usize,
    );
    report.add_islands(&islands);

    info!(
        "{} islands: {} nodes, {} edges",
        islands.len(),
        report.num_nodes,
        report.num_edges
    );
    if report.num_failed > 0 {
        warn!("{} islands failed graph assembly", report.num_failed);
    }

    let out = cfg.output_path();
    report.write_json(&out)?;
    info!("report written to {}", out.display());
    Ok(())
}

//! Tracksketch - activity file decoding for map rendering
//!
//! Command-line shell: loads activity files as one session, runs the decode
//! pipeline, and emits the renderer-boundary GeoJSON (or per-file summaries).

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracksketch::config;
use tracksketch::geometry::summarize;
use tracksketch::import::TrackFile;
use tracksketch::session::{FileStore, RouteLoader};

#[derive(Parser, Debug)]
#[command(version, about = "Decode FIT and GPX activity files into GeoJSON track collections", long_about = None)]
struct Cli {
    /// Activity files to decode (.fit or .gpx)
    files: Vec<PathBuf>,

    /// Index of the focused collection
    #[arg(short, long, default_value_t = 0)]
    active: usize,

    /// Pretty-print the GeoJSON output
    #[arg(short, long)]
    pretty: bool,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print per-file summaries instead of GeoJSON
    #[arg(short, long)]
    summary: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::info!("Starting tracksketch v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        config::AppConfig::default()
    });

    let store = Arc::new(tokio::sync::Mutex::new(FileStore::new()));

    let mut uploads = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| path.display().to_string());
        uploads.push(TrackFile::new(name, bytes));
    }

    {
        let mut store = store.lock().await;
        store.add_files(uploads);
        if cli.active > 0 && !store.set_active(cli.active) {
            tracing::warn!(
                "--active {} is out of range for {} files, focusing the first one",
                cli.active,
                store.len()
            );
        }
    }

    let loader = RouteLoader::with_options(store.clone(), config.decode.to_options());
    loader.refresh().await?;
    let collections = loader.collections().await;

    for collection in &collections {
        for error in &collection.report.errors {
            tracing::warn!(file = %collection.properties.name, "{}", error);
        }
        for warning in &collection.report.warnings {
            tracing::warn!(file = %collection.properties.name, "{}", warning);
        }
    }

    if cli.summary {
        for collection in &collections {
            let summary = summarize(collection);
            let marker = if summary.active { "*" } else { " " };
            let sport = summary
                .sport
                .as_deref()
                .map(|sport| format!(" [{}]", sport))
                .unwrap_or_default();
            match summary.bounds {
                Some(bounds) => println!(
                    "{} {}{}: {} points, {:.1} km, bounds ({:.4}, {:.4}) - ({:.4}, {:.4})",
                    marker,
                    summary.name,
                    sport,
                    summary.point_count,
                    summary.distance_km,
                    bounds.min_lon,
                    bounds.min_lat,
                    bounds.max_lon,
                    bounds.max_lat
                ),
                None => println!("{} {}{}: no geometry", marker, summary.name, sport),
            }
        }
        return Ok(());
    }

    let feature_collections: Vec<geojson::FeatureCollection> = collections
        .iter()
        .map(|collection| collection.to_feature_collection())
        .collect();

    let rendered = if cli.pretty || config.output.pretty {
        serde_json::to_string_pretty(&feature_collections)?
    } else {
        serde_json::to_string(&feature_collections)?
    };

    match &cli.output {
        Some(path) => {
            tokio::fs::write(path, rendered)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(
                "Wrote {} collections to {}",
                collections.len(),
                path.display()
            );
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

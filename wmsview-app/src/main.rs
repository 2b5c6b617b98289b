use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::{path::PathBuf, time::Duration};
use wmsview::{
    bootstrap, ControlKind, Document, Extent, ImageLoader, RequestLog, RequestSink, Size,
    TilingMode, ViewerConfig, ViewerConfigBuilder,
};

const MAPSERVER_URL: &str = "http://localhost/mapserver";

#[derive(Parser, Debug)]
#[command(name = "wmsview-app")]
#[command(about = "Bootstraps a WMS map view into a headless document")]
struct Args {
    /// JSON viewer configuration
    config: Option<PathBuf>,

    /// Built-in deployment to use instead of a configuration file
    #[arg(long, value_enum, conflicts_with = "config")]
    preset: Option<Preset>,

    /// Container width in pixels
    #[arg(long, default_value_t = 1024.0)]
    width: f64,

    /// Container height in pixels
    #[arg(long, default_value_t = 768.0)]
    height: f64,

    /// Fetch the planned images instead of only listing them
    #[arg(long)]
    fetch: bool,

    /// Seconds to wait for fetches to complete
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Preset {
    /// Whole MapServer extent with pan-zoom and attribution
    FullScreen,
    /// Fixed regional box with a layer switcher
    Bounded,
}

impl Preset {
    fn config(self) -> Result<ViewerConfig> {
        let builder = ViewerConfigBuilder::new()
            .with_service_url(MAPSERVER_URL)
            .with_container("map")
            .with_layer_title("MapServer WMS")
            .with_tiling_mode(TilingMode::Tiled);

        let builder = match self {
            Preset::FullScreen => builder
                .with_layers(["city_poly", "county_borders", "parcels"])
                .with_controls([
                    ControlKind::Navigation,
                    ControlKind::PanZoom,
                    ControlKind::Attribution,
                ])
                .with_max_extent(),
            Preset::Bounded => builder
                .with_layers(["county_borders", "parcels"])
                .with_controls([
                    ControlKind::Navigation,
                    ControlKind::PanZoom,
                    ControlKind::Attribution,
                    ControlKind::LayerSwitcher,
                ])
                .with_bbox(Extent::new(-94.50, 46.97, -92.98, 47.94), true),
        };
        Ok(builder.build()?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    wmsview::init_logging();
    let args = Args::parse();

    let config = match (&args.config, args.preset) {
        (Some(path), _) => ViewerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        (None, Some(preset)) => preset.config()?,
        (None, None) => Preset::FullScreen.config()?,
    };

    if args.width <= 0.0 || args.height <= 0.0 {
        bail!("container size must be positive, got {}x{}", args.width, args.height);
    }
    let mut document =
        Document::new().with_container(config.container_id.clone(), Size::new(args.width, args.height));

    let loader = if args.fetch {
        Some(ImageLoader::http()?)
    } else {
        None
    };
    let results = loader.as_ref().map(ImageLoader::results);
    let sink: Box<dyn RequestSink> = match loader {
        Some(loader) => Box::new(loader),
        None => Box::new(RequestLog::new()),
    };

    let mut map = bootstrap(&config, &mut document, sink)?;
    for event in map.process_events() {
        log::debug!("{:?}", event);
    }

    let container = document
        .container(&config.container_id)
        .context("container disappeared after bootstrap")?;
    println!("{}", serde_json::to_string_pretty(container.children())?);

    let Some(results) = results else {
        return Ok(());
    };

    let expected = map.current_requests().len();
    let mut received = 0;
    let mut failed = 0;
    let deadline = tokio::time::sleep(Duration::from_secs(args.timeout));
    tokio::pin!(deadline);

    while received < expected {
        tokio::select! {
            _ = &mut deadline => {
                log::warn!("timed out with {} of {} image(s) outstanding", expected - received, expected);
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupted");
                break;
            }
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                for result in results.try_iter() {
                    received += 1;
                    match result.data {
                        Ok(bytes) => log::info!(
                            "{} bytes for {}",
                            bytes.len(),
                            result.request.url
                        ),
                        Err(e) => {
                            failed += 1;
                            log::warn!("{}: {}", result.request.url, e);
                        }
                    }
                }
            }
        }
    }

    log::info!(
        "{} of {} image(s) received, {} failed",
        received,
        expected,
        failed
    );
    Ok(())
}

//! carousel-resolve - Resolve a persisted carousel block

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};

use libcarousel::error::CarouselError;
use libcarousel::listing::{ContentSearchProvider, SearchRequest, SearchResults};
use libcarousel::{BlockData, CarouselSession, CarouselView, Config, FixedViewport};

#[derive(Parser, Debug)]
#[command(name = "carousel-resolve")]
#[command(version, about = "Resolve a carousel block into its runtime configuration and slides")]
#[command(long_about = r#"Resolve a persisted carousel block into the configuration the carousel
engine runs with and the slides a renderer draws.

EXAMPLES:
    # Resolve a block for a wide viewport
    carousel-resolve --block block.json

    # Resolve for a phone-sized viewport
    carousel-resolve --block block.json --width 390

    # Feed listing results captured from a search endpoint
    carousel-resolve --block block.json --listing results.json

    # Decide link targets relative to a site
    carousel-resolve --block block.json --host www.example.org

    # JSON output for scripting
    carousel-resolve --block block.json --format json | jq '.config'

INPUT FORMATS:
    --block    JSON, or TOML when the file ends in .toml
    --listing  JSON array of items, or an object with an "items" array

EXIT CODES:
    0 - Success
    1 - Error (unreadable or malformed input, bad configuration)
    3 - Invalid input
"#)]
struct Cli {
    /// Block data file
    #[arg(short, long, value_name = "FILE")]
    block: PathBuf,

    /// Listing results file
    #[arg(short, long, value_name = "FILE")]
    listing: Option<PathBuf>,

    /// Viewport width in pixels (omit for no viewport)
    #[arg(short, long, value_name = "PX")]
    width: Option<u32>,

    /// Current site host name, overrides the configuration file
    #[arg(long, value_name = "HOST")]
    host: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Serves listing results loaded from a file
struct FileSearchProvider {
    results: SearchResults,
}

impl FileSearchProvider {
    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read listing file {}", path.display()))?;
        let results = SearchResults::from_json_str(&content)
            .with_context(|| format!("Failed to parse listing file {}", path.display()))?;
        Ok(Self { results })
    }
}

#[async_trait]
impl ContentSearchProvider for FileSearchProvider {
    async fn search(&self, request: &SearchRequest) -> libcarousel::Result<SearchResults> {
        let mut items = self.results.items.clone();
        if let Some(limit) = request.options.b_size {
            items.truncate(limit as usize);
        }
        Ok(SearchResults {
            items,
            total: self.results.total,
        })
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    libcarousel::logging::from_env(cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<CarouselError>()
            .map(CarouselError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    tracing::debug!("carousel-resolve started with args: {:?}", cli);

    let mut settings = Config::load_or_default().context("Failed to load configuration")?;
    if let Some(host) = cli.host {
        settings.site.host = Some(host);
    }

    let block = BlockData::load_from_path(&cli.block)
        .with_context(|| format!("Failed to load block {}", cli.block.display()))?;

    let viewport = FixedViewport::new(cli.width.unwrap_or(0));
    let mut session = CarouselSession::new(block, settings, &viewport);

    if let Some(path) = &cli.listing {
        let provider = FileSearchProvider::load(path)?;
        let delivered = session
            .refresh_listing(&provider)
            .await
            .context("Listing search failed")?;
        if delivered.is_none() {
            tracing::debug!("Block builds no listing search, applying results as delivered");
            session.apply_listing(provider.results);
        }
    }

    let view = session.render();
    match cli.format.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&view)?;
            println!("{}", json);
        }
        _ => print_text(&view),
    }

    Ok(())
}

/// Serialized name of a unit enum value
fn label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn print_text(view: &CarouselView) {
    let config = &view.config;
    println!("type:            {}", config.carousel_type);
    println!("align:           {}", label(&config.alignment));
    println!("loop:            {}", yes_no(config.loop_enabled));
    println!("scroll step:     {}", config.scroll_step);
    println!("contain scroll:  {}", label(&config.contain_scroll));
    println!("drag free:       {}", yes_no(config.drag_free));
    println!("skip snaps:      {}", yes_no(config.skip_snaps));
    if config.autoplay_enabled {
        println!("autoplay:        every {}ms", config.autoplay_delay_ms);
    } else {
        println!("autoplay:        no");
    }
    println!(
        "viewport:        {}, {} visible",
        if view.viewport.is_narrow { "narrow" } else { "wide" },
        view.viewport.effective_items_visible
    );
    println!("pages:           {}", view.navigation.page_count);
    println!(
        "controls:        arrows {}, dots {}",
        yes_no(view.show_arrows),
        yes_no(view.show_dots)
    );

    if view.slides.is_empty() {
        println!("slides:          none");
        return;
    }

    println!("slides:");
    for (index, slide) in view.slides.iter().enumerate() {
        let heading = if slide.heading.is_empty() {
            "(untitled)"
        } else {
            slide.heading.as_str()
        };
        println!("  {}. {} [{}] -> {}", index + 1, heading, slide.origin, slide.href);
        if !slide.image_url.is_empty() {
            println!("     image:  {}", slide.image_url);
        }
        if let Some(button) = &slide.button {
            println!(
                "     button: {} -> {}{}",
                button.label,
                button.href,
                if button.external { " (external)" } else { "" }
            );
        }
        if let Some(date) = &slide.date_label {
            println!("     date:   {}", date);
        }
    }
}

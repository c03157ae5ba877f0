use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use pokethumb::{
    imageref::DEFAULT_RELAY, EditorState, ExportConfig, ExportOutcome, ExportPipeline,
    OutputFormat, RenderFields, Template, Trend,
};

/// Compose a 1280x720 Pokemon price thumbnail and export it as PNG or JPEG.
#[derive(Parser, Debug)]
#[command(name = "pokethumb", version, about)]
struct Cli {
    /// Image reference: URL, data URI or local file path
    #[arg(long)]
    image: Option<String>,

    /// Load the field set from a JSON file (individual flags override it)
    #[arg(long)]
    fields: Option<PathBuf>,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    subtitle: Option<String>,

    #[arg(long)]
    price: Option<String>,

    #[arg(long)]
    before_price: Option<String>,

    /// Change figure; sign and percent suffix are derived from the trend
    #[arg(long)]
    change: Option<String>,

    #[arg(long)]
    timeframe: Option<String>,

    /// Visual template: classic or impact (defaults to the field set's)
    #[arg(long)]
    template: Option<Template>,

    /// Price trend: up or down (defaults to the field set's)
    #[arg(long)]
    trend: Option<Trend>,

    /// Output encoding: png or jpeg
    #[arg(long, default_value = "png")]
    format: OutputFormat,

    /// Disable routing remote images through the CORS-friendly relay
    #[arg(long)]
    no_proxy: bool,

    /// Relay base URL
    #[arg(long, default_value = DEFAULT_RELAY)]
    relay: String,

    /// Directory the exported file is written into
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("pokethumb: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut fields = match &cli.fields {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str::<RenderFields>(&json)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => RenderFields::default(),
    };

    if let Some(title) = cli.title {
        fields.title = title;
    }
    if let Some(subtitle) = cli.subtitle {
        fields.subtitle = subtitle;
    }
    if let Some(price) = cli.price {
        fields.price = price;
    }
    if let Some(before_price) = cli.before_price {
        fields.before_price = before_price;
    }
    if let Some(change) = cli.change {
        fields.change_percent = change;
    }
    if let Some(timeframe) = cli.timeframe {
        fields.timeframe = timeframe;
    }
    if let Some(template) = cli.template {
        fields.template = template;
    }
    if let Some(trend) = cli.trend {
        fields.trend = trend;
    }

    let mut editor = EditorState::new(cli.relay.clone());
    editor.set_fields(fields);
    editor.set_proxy_enabled(!cli.no_proxy);
    if let Some(image) = cli.image {
        editor.set_image_ref(image);
    }

    let pipeline = ExportPipeline::new(ExportConfig {
        relay_base: cli.relay,
        out_dir: cli.out,
        ..ExportConfig::default()
    })?;

    match pipeline.export(&mut editor, cli.format)? {
        ExportOutcome::Written { path, bytes } => {
            println!("{} ({} bytes)", path.display(), bytes);
        }
        ExportOutcome::Skipped => {
            eprintln!("an export is already in flight; nothing written");
        }
    }
    Ok(())
}

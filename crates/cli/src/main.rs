//! CLI tool for working with generated slide decks offline.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use deck_core::{
    is_remote_reference, local_asset_path, normalize_slides, ImageData, PromptBuilder,
    ResponseParser, ServiceConfig, Slide, SlideInput, TopicKey,
};
use deck_gemini::{GeminiClient, GenerationRequest, TextGenerator};
use deck_pdf::PdfRenderer;
use deck_pptx::{PptxReader, PptxRenderer, RenderAssets};
use deck_store::{DeckStore, FileStore};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

/// Parse, render, inspect and generate AI-written slide decks.
#[derive(Parser, Debug)]
#[command(name = "deck")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// JSON service configuration (slide bounds, layout, gateway)
    #[arg(short, long, global = true, env = "DECK_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Turn saved AI response text into deck JSON
    Parse {
        /// File holding the raw model output
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render deck JSON to a .pptx or .pdf file
    Render {
        /// Deck JSON (an array of slides)
        input: PathBuf,

        /// Output file; the extension picks the format unless --format is given
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Directory that local image paths are resolved against
        #[arg(short, long)]
        assets: Option<PathBuf>,

        /// Document title (default: the input file name)
        #[arg(short, long)]
        title: Option<String>,
    },

    /// List the slides and text of a .pptx file
    Inspect {
        /// Input PowerPoint file(s)
        #[arg(required = true)]
        input: Vec<PathBuf>,
    },

    /// Ask Gemini for a deck and store it like the server does
    Generate {
        /// Presentation topic
        topic: String,

        /// Number of slides
        #[arg(short = 'n', long, default_value_t = 5)]
        slides: u32,

        /// Google Gemini API key
        #[arg(long, env = "GOOGLE_GEMINI_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Directory holding one JSON file per deck
        #[arg(long, env = "DECK_STORAGE_DIR", default_value = "generated_ppts")]
        storage_dir: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Pptx,
    Pdf,
}

impl OutputFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "pptx" => Some(Self::Pptx),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let config = match &args.config {
        Some(path) => ServiceConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ServiceConfig::default(),
    };

    match args.command {
        Command::Parse { input, output } => {
            let slides = parse_file(&input)?;
            let json = serde_json::to_string_pretty(&slides)?;
            match output {
                Some(path) => {
                    write_output(&path, json.as_bytes())?;
                    eprintln!("Wrote {} slides to {}", slides.len(), path.display());
                }
                None => println!("{}", json),
            }
        }
        Command::Render {
            input,
            output,
            format,
            assets,
            title,
        } => {
            let format = format
                .or_else(|| OutputFormat::from_path(&output))
                .ok_or_else(|| {
                    anyhow::anyhow!("Cannot tell the format of {}; use --format", output.display())
                })?;
            let slides = load_deck(&input)?;
            let title = title.unwrap_or_else(|| {
                input
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("Presentation")
                    .to_string()
            });

            let bytes = match format {
                OutputFormat::Pptx => {
                    let assets = load_assets(&slides, assets.as_deref())?;
                    PptxRenderer::new(config.layout.clone()).render(&title, &slides, &assets)?
                }
                OutputFormat::Pdf => PdfRenderer::new(config.layout.clone()).render(&title, &slides)?,
            };
            write_output(&output, &bytes)?;
            eprintln!("Rendered {} slides to {}", slides.len(), output.display());
        }
        Command::Inspect { input } => {
            for path in &input {
                match inspect(path) {
                    Ok(report) => print!("{}", report),
                    Err(e) => eprintln!("Error processing {}: {}", path.display(), e),
                }
            }
        }
        Command::Generate {
            topic,
            slides,
            api_key,
            storage_dir,
        } => {
            let path = generate(&config, &topic, slides, &api_key, &storage_dir).await?;
            eprintln!("Saved deck to {}", path.display());
        }
    }

    Ok(())
}

/// Parse a file of raw model output into normalized slides.
fn parse_file(input: &Path) -> Result<Vec<Slide>> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let slides = ResponseParser::new()
        .parse(&text)
        .with_context(|| format!("No slides found in {}", input.display()))?;
    log::debug!("Parsed {} slides", slides.len());
    Ok(normalize_slides(slides.into_iter().map(SlideInput::from).collect(), false))
}

/// Load deck JSON, keeping images.
fn load_deck(input: &Path) -> Result<Vec<Slide>> {
    let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let inputs: Vec<SlideInput> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("{} is not deck JSON", input.display()))?;
    Ok(normalize_slides(inputs, true))
}

/// Read the local images a deck refers to.
fn load_assets(slides: &[Slide], asset_dir: Option<&Path>) -> Result<RenderAssets> {
    let mut assets = RenderAssets::new();
    for source in RenderAssets::references(slides) {
        if is_remote_reference(&source) {
            bail!("Remote image {} is not supported offline; save it under --assets", source);
        }
        let root = asset_dir.unwrap_or_else(|| Path::new("."));
        let path = local_asset_path(root, &source)?;
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        let image = ImageData::from_bytes(bytes, &source)?;
        assets.insert(source, image);
    }
    Ok(assets)
}

/// Describe every slide of a .pptx file.
fn inspect(path: &Path) -> Result<String> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let slides = PptxReader::new().read(BufReader::new(file))?;

    let mut out = format!("{}: {} slides\n", path.display(), slides.len());
    for slide in &slides {
        out.push_str(&format!(
            "  {}. {}",
            slide.number,
            slide.title().unwrap_or("(no title)")
        ));
        if slide.pictures > 0 {
            out.push_str(&format!(" [{} picture(s)]", slide.pictures));
        }
        out.push('\n');
        for text in slide.texts.iter().skip(1) {
            for line in text.lines() {
                out.push_str(&format!("     {}\n", line));
            }
        }
    }
    Ok(out)
}

async fn generate(
    config: &ServiceConfig,
    topic: &str,
    count: u32,
    api_key: &str,
    storage_dir: &Path,
) -> Result<PathBuf> {
    let key = TopicKey::from_topic(topic)?;
    let count = config.slide_count.check(count)?;

    let prompts = PromptBuilder::from_config(config);
    let request = GenerationRequest::new(prompts.build(topic, count))
        .with_system_instruction(prompts.system_instruction());
    let client = GeminiClient::new(api_key, &config.gateway)?;

    log::debug!("Calling {}", client.endpoint());
    let text = client.generate(&request).await?;
    let slides = ResponseParser::new().parse(&text)?;
    let slides = normalize_slides(slides.into_iter().map(SlideInput::from).collect(), false);

    let store = FileStore::open(storage_dir).await?;
    store.save(&key, &slides).await?;
    Ok(store.path_for(&key))
}

/// Write output to a file.
fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}

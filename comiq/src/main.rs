//! Find and read the text bubbles on comic pages.

#![warn(missing_docs)]

use std::{
    io::{stdout, Write as _},
    path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use clap::Parser;
use comiq::{config::Config, Extractor};
use dotenv::dotenv;
use log::debug;

use crate::ui::Ui;

mod ui;

#[derive(Debug, Parser)]
/// Find the text bubbles on a comic page, using OCR plus a multimodal language
/// model. The model's API key is read from MLLM_API_KEY, which may also be
/// set in a .env file.
#[command(name = "comiq", version)]
enum Args {
    /// Extract text bubbles from an image, and print them as JSON.
    #[command(name = "extract")]
    Extract {
        /// Path to the comic page.
        image: PathBuf,

        /// OCR engine to use. May be repeated to combine several engines.
        #[arg(long = "ocr", default_value = "tesseract")]
        engines: Vec<String>,

        /// Path to a JSON configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the available OCR engines.
    #[command(name = "engines")]
    Engines {
        /// Path to a JSON configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

// Choose and run the appropriate command.
#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let ui = Ui::init();

    let args: Args = Args::parse();
    match args {
        Args::Extract {
            image,
            engines,
            config,
        } => cmd_extract(&ui, &image, &engines, config.as_deref()).await,
        Args::Engines { config } => cmd_engines(config.as_deref()),
    }
}

async fn cmd_extract(
    ui: &Ui,
    image: &Path,
    engines: &[String],
    config: Option<&Path>,
) -> Result<()> {
    let config = Config::load(config)?;
    let registry = config.registry();
    // Check engine names before we complain about API keys or read images.
    registry.check(engines)?;
    let model = config.model()?;

    let mut extractor = Extractor::new(registry, model).ai_params(config.ai);
    for (name, options) in &config.ocr {
        extractor = extractor.engine_options(name.as_str(), options.clone());
    }
    debug!("using {:?}", extractor);

    let spinner = ui.new_spinner(&format!("Reading {}", image.display()));
    let result = extractor.extract_path(image, engines).await;
    spinner.finish_and_clear();
    let bubbles = result?;

    let mut out = stdout().lock();
    serde_json::to_writer_pretty(&mut out, &bubbles)
        .context("could not write JSON to stdout")?;
    writeln!(out)?;
    Ok(())
}

fn cmd_engines(config: Option<&Path>) -> Result<()> {
    let config = Config::load(config)?;
    let mut out = stdout().lock();
    for name in config.registry().available_engines() {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}

//! OCR using the `tesseract` command-line tool.

use std::{io::Write as _, path::Path, process::Command};

use anyhow::{anyhow, Context as _};
use image::{DynamicImage, ImageOutputFormat};
use log::{debug, trace};

use super::{EngineOptions, OcrEngine};
use crate::{boxes::DetectedBox, geom::TextBox};

/// Tesseract's TSV output reports one row per page, block, paragraph, line
/// and word. We only want the words.
const WORD_LEVEL: i32 = 5;

/// Runs `tesseract` on a temporary copy of the image and reads back its
/// word-level TSV output.
///
/// Supported options:
///
/// - `lang`: Tesseract language codes, e.g. `"eng"` or `"eng+jpn"`.
/// - `psm`: the page segmentation mode. Defaults to 11 ("sparse text"), which
///   suits scattered speech bubbles much better than the default.
/// - `min_confidence`: discard words with a lower confidence (0-100).
/// - `binary`: the `tesseract` executable to run.
#[derive(Clone, Debug)]
pub struct TesseractEngine {
    binary: String,
    lang: String,
    psm: u32,
}

impl Default for TesseractEngine {
    fn default() -> Self {
        TesseractEngine {
            binary: "tesseract".to_owned(),
            lang: "eng".to_owned(),
            psm: 11,
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn detect(
        &self,
        image: &DynamicImage,
        options: &EngineOptions,
    ) -> anyhow::Result<Vec<DetectedBox>> {
        let binary = str_option(options, "binary")?.unwrap_or(&self.binary);
        let lang = str_option(options, "lang")?.unwrap_or(&self.lang);
        let psm = match options.get("psm") {
            None => self.psm,
            Some(v) => v
                .as_u64()
                .and_then(|psm| u32::try_from(psm).ok())
                .ok_or_else(|| {
                    anyhow!("tesseract option \"psm\" must be a small number, not {}", v)
                })?,
        };
        let min_confidence = match options.get("min_confidence") {
            None => 0.0,
            Some(v) => v.as_f64().ok_or_else(|| {
                anyhow!("tesseract option \"min_confidence\" must be a number")
            })?,
        };

        let mut tmp = tempfile::Builder::new()
            .prefix("comiq")
            .suffix(".png")
            .tempfile()
            .context("could not create temporary file for OCR")?;
        image
            .write_to(&mut tmp, ImageOutputFormat::Png)
            .context("could not write temporary image for OCR")?;
        tmp.flush()?;

        let tsv = run_tesseract_tsv(binary, tmp.path(), lang, psm)?;
        parse_tsv_words(&tsv, min_confidence)
    }
}

/// Look up an optional string option.
fn str_option<'a>(options: &'a EngineOptions, key: &str) -> anyhow::Result<Option<&'a str>> {
    match options.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_str()
            .map(Some)
            .ok_or_else(|| anyhow!("tesseract option {:?} must be a string", key)),
    }
}

fn run_tesseract_tsv(binary: &str, path: &Path, lang: &str, psm: u32) -> anyhow::Result<String> {
    let mut cmd = Command::new(binary);
    cmd.arg(path)
        .arg("stdout")
        .arg("-l")
        .arg(lang)
        .arg("--psm")
        .arg(psm.to_string())
        .arg("tsv");
    debug!("running {:?}", cmd);
    let output = cmd
        .output()
        .with_context(|| format!("could not run {} (is it installed?)", binary))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("{} failed: {}", binary, stderr.trim()));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse the word rows of Tesseract's TSV output.
fn parse_tsv_words(tsv: &str, min_confidence: f64) -> anyhow::Result<Vec<DetectedBox>> {
    let mut words = vec![];
    // The first line is a header.
    for (line_no, row) in tsv.lines().enumerate().skip(1) {
        let cols = row.split('\t').collect::<Vec<_>>();
        if cols.len() < 12 {
            trace!("skipping short TSV row {}: {:?}", line_no + 1, row);
            continue;
        }
        let num = |idx: usize| -> anyhow::Result<i32> {
            cols[idx].trim().parse::<i32>().with_context(|| {
                format!("bad number in tesseract output line {}: {:?}", line_no + 1, row)
            })
        };
        if num(0)? != WORD_LEVEL {
            continue;
        }
        let text = cols[11].trim();
        let confidence = cols[10].trim().parse::<f64>().unwrap_or(-1.0);
        if text.is_empty() || confidence < 0.0 || confidence < min_confidence {
            continue;
        }
        let text_box = TextBox::ltwh(num(6)?, num(7)?, num(8)?, num(9)?);
        words.push(DetectedBox::new(text_box, text));
    }
    Ok(words)
}

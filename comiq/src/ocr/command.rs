//! OCR using an arbitrary external program.
//!
//! This is how we talk to engines which don't have a usable command-line
//! interface of their own, such as PaddleOCR or EasyOCR: write a small
//! wrapper script which speaks our protocol.

use std::{
    io::Write as _,
    path::PathBuf,
    process::{Command, Stdio},
};

use anyhow::{anyhow, Context as _};
use image::{DynamicImage, ImageOutputFormat};
use log::{debug, trace};
use serde::Deserialize;

use super::{EngineOptions, OcrEngine};
use crate::{boxes::DetectedBox, geom::TextBox};

/// Runs an external program to perform OCR.
///
/// The program is called as `program [args...] IMAGE_PATH`, where
/// `IMAGE_PATH` is a temporary PNG file. The engine options are written to
/// its standard input as a JSON object. It must print a JSON list of
/// `{"text_box": [ymin, xmin, ymax, xmax], "text": "..."}` objects, in pixel
/// coordinates, on standard output. Coordinates may be fractional, and are
/// truncated toward zero.
#[derive(Clone, Debug)]
pub struct CommandEngine {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandEngine {
    /// Create a new engine which runs `program` with `args`.
    pub fn new<P: Into<PathBuf>>(program: P, args: Vec<String>) -> CommandEngine {
        CommandEngine {
            program: program.into(),
            args,
        }
    }
}

impl OcrEngine for CommandEngine {
    fn detect(
        &self,
        image: &DynamicImage,
        options: &EngineOptions,
    ) -> anyhow::Result<Vec<DetectedBox>> {
        let mut tmp = tempfile::Builder::new()
            .prefix("comiq")
            .suffix(".png")
            .tempfile()
            .context("could not create temporary file for OCR")?;
        image
            .write_to(&mut tmp, ImageOutputFormat::Png)
            .context("could not write temporary image for OCR")?;
        tmp.flush()?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(tmp.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        debug!("running {:?}", cmd);
        let mut child = cmd
            .spawn()
            .with_context(|| format!("could not run {}", self.program.display()))?;

        // Small enough to fit in a pipe buffer, so we can write it all before
        // reading any output.
        let input = serde_json::to_vec(options)?;
        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| anyhow!("could not open stdin of OCR command"))?;
            // The program may exit without reading its options.
            if let Err(e) = stdin.write_all(&input) {
                debug!("could not send options to OCR command: {}", e);
            }
        }

        let output = child.wait_with_output().with_context(|| {
            format!("could not wait for {}", self.program.display())
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "{} failed with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            ));
        }
        trace!(
            "OCR command output: {}",
            String::from_utf8_lossy(&output.stdout)
        );
        parse_detections(&output.stdout).with_context(|| {
            format!("could not parse output of {}", self.program.display())
        })
    }
}

/// A detection as printed by an OCR program. Most engines report corner
/// points as floats.
#[derive(Deserialize)]
struct RawDetection {
    text_box: [f64; 4],
    text: String,
}

fn parse_detections(stdout: &[u8]) -> anyhow::Result<Vec<DetectedBox>> {
    let raw = serde_json::from_slice::<Vec<RawDetection>>(stdout)?;
    Ok(raw
        .into_iter()
        .map(|d| {
            // `as` truncates toward zero, and saturates at the `i32` limits.
            let [ymin, xmin, ymax, xmax] = d.text_box.map(|c| c as i32);
            DetectedBox::new(TextBox::new(ymin, xmin, ymax, xmax), d.text)
        })
        .collect())
}

//! PaddleOCR and EasyOCR, run through small Python wrapper scripts.
//!
//! The scripts are compiled into the binary and passed to `python3 -c`, so
//! these engines work anywhere the Python packages are installed. Copies live
//! in `scripts/` for anyone who wants to customize them and register them as
//! command engines instead.

use super::CommandEngine;

/// The PaddleOCR wrapper. Tuned for small, dense comic lettering.
pub const PADDLEOCR_SCRIPT: &str = include_str!("../../scripts/paddleocr_wrapper.py");

/// The EasyOCR wrapper. Uses beam search and 2x magnification.
pub const EASYOCR_SCRIPT: &str = include_str!("../../scripts/easyocr_wrapper.py");

/// The Python interpreter we run the wrappers with.
const PYTHON: &str = "python3";

/// An engine which runs PaddleOCR. Its options override the PaddleOCR
/// constructor arguments.
pub fn paddleocr_engine() -> CommandEngine {
    python_engine(PADDLEOCR_SCRIPT)
}

/// An engine which runs EasyOCR. Its options may set `languages` and `gpu`
/// for the reader, and override any `readtext` argument.
pub fn easyocr_engine() -> CommandEngine {
    python_engine(EASYOCR_SCRIPT)
}

fn python_engine(script: &str) -> CommandEngine {
    CommandEngine::new(PYTHON, vec!["-c".to_owned(), script.to_owned()])
}

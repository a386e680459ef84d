//! OCR engines, and a registry for looking them up by name.
//!
//! We don't do any OCR ourselves. An [`OcrEngine`] wraps some external
//! program which can find words in an image and report where they are.

use std::{collections::BTreeMap, fmt};

use image::DynamicImage;
use log::{debug, warn};

use crate::{boxes::DetectedBox, Error, Result};

pub use self::{
    command::CommandEngine,
    python::{easyocr_engine, paddleocr_engine},
    tesseract::TesseractEngine,
};

mod command;
mod python;
mod tesseract;

/// Engine-specific options. These are passed through to the engine as-is.
pub type EngineOptions = serde_json::Map<String, serde_json::Value>;

/// Something which can find words in an image.
pub trait OcrEngine: Send + Sync {
    /// Find all the words in `image`, in pixel coordinates.
    fn detect(
        &self,
        image: &DynamicImage,
        options: &EngineOptions,
    ) -> anyhow::Result<Vec<DetectedBox>>;
}

/// OCR engines, by name.
///
/// Register engines while setting things up, and then hand the registry to an
/// [`Extractor`](crate::Extractor), which only ever reads it.
#[derive(Default)]
pub struct OcrRegistry {
    engines: BTreeMap<String, Box<dyn OcrEngine>>,
}

impl OcrRegistry {
    /// Create an empty registry.
    pub fn new() -> OcrRegistry {
        OcrRegistry::default()
    }

    /// Create a registry containing our built-in engines: `"tesseract"`,
    /// plus `"paddleocr"` and `"easyocr"`, which need `python3` and the
    /// corresponding Python package.
    pub fn with_default_engines() -> OcrRegistry {
        let mut registry = OcrRegistry::new();
        registry
            .register("easyocr", easyocr_engine())
            .register("paddleocr", paddleocr_engine())
            .register("tesseract", TesseractEngine::default());
        registry
    }

    /// Register `engine` as `name`, replacing any engine already registered
    /// under that name.
    pub fn register<S, E>(&mut self, name: S, engine: E) -> &mut Self
    where
        S: Into<String>,
        E: OcrEngine + 'static,
    {
        let name = name.into();
        if self.engines.insert(name.clone(), Box::new(engine)).is_some() {
            warn!("replacing previously registered OCR engine {:?}", name);
        }
        self
    }

    /// The names of all registered engines, sorted.
    pub fn available_engines(&self) -> Vec<String> {
        self.engines.keys().cloned().collect()
    }

    /// Make sure we have at least one engine name, and that every name is
    /// registered.
    pub fn check<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        if names.is_empty() {
            return Err(Error::NoEnginesRequested);
        }
        for name in names {
            let name = name.as_ref();
            if !self.engines.contains_key(name) {
                return Err(Error::UnknownEngine {
                    name: name.to_owned(),
                    available: self.available_engines(),
                });
            }
        }
        Ok(())
    }

    /// Run each of the engines in `names` over `image`, in order, and
    /// concatenate what they find.
    ///
    /// We don't try to reconcile overlapping boxes from different engines.
    /// The model is much better at that than we are.
    pub fn run<S: AsRef<str>>(
        &self,
        image: &DynamicImage,
        names: &[S],
        options: &BTreeMap<String, EngineOptions>,
    ) -> Result<Vec<DetectedBox>> {
        self.check(names)?;
        let no_options = EngineOptions::new();
        let mut detected = vec![];
        for name in names {
            let name = name.as_ref();
            let engine = &self.engines[name];
            let engine_options = options.get(name).unwrap_or(&no_options);
            debug!("running OCR engine {:?} with {:?}", name, engine_options);
            let found = engine
                .detect(image, engine_options)
                .map_err(|e| Error::Ocr {
                    engine: name.to_owned(),
                    source: e.into(),
                })?;
            debug!("OCR engine {:?} found {} boxes", name, found.len());
            detected.extend(found);
        }
        Ok(detected)
    }
}

impl fmt::Debug for OcrRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrRegistry")
            .field("engines", &self.available_engines())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::geom::TextBox;

    /// An engine which always "finds" the same words.
    struct FixedEngine(Vec<&'static str>);

    impl OcrEngine for FixedEngine {
        fn detect(
            &self,
            _image: &DynamicImage,
            _options: &EngineOptions,
        ) -> anyhow::Result<Vec<DetectedBox>> {
            // Report boxes bottom-to-top, to make sure nobody re-sorts them.
            Ok(self
                .0
                .iter()
                .enumerate()
                .rev()
                .map(|(i, w)| {
                    let i = i as i32;
                    DetectedBox::new(TextBox::new(i * 10, 0, i * 10 + 5, 50), *w)
                })
                .collect())
        }
    }

    /// An engine which echoes one of its options back as a word.
    struct EchoEngine;

    impl OcrEngine for EchoEngine {
        fn detect(
            &self,
            _image: &DynamicImage,
            options: &EngineOptions,
        ) -> anyhow::Result<Vec<DetectedBox>> {
            let word = options
                .get("word")
                .and_then(|w| w.as_str())
                .unwrap_or("default");
            Ok(vec![DetectedBox::new(TextBox::new(0, 0, 1, 1), word)])
        }
    }

    struct BrokenEngine;

    impl OcrEngine for BrokenEngine {
        fn detect(
            &self,
            _image: &DynamicImage,
            _options: &EngineOptions,
        ) -> anyhow::Result<Vec<DetectedBox>> {
            Err(anyhow!("model weights not found"))
        }
    }

    fn image() -> DynamicImage {
        DynamicImage::new_luma8(4, 4)
    }

    fn registry() -> OcrRegistry {
        let mut registry = OcrRegistry::new();
        registry
            .register("engineA", FixedEngine(vec!["a1", "a2", "a3"]))
            .register("engineB", FixedEngine(vec!["b1", "b2"]));
        registry
    }

    fn texts(boxes: &[DetectedBox]) -> Vec<&str> {
        boxes.iter().map(|b| b.text.as_str()).collect()
    }

    #[test]
    fn concatenates_in_requested_order() {
        let registry = registry();
        let found = registry
            .run(&image(), &["engineA", "engineB"], &BTreeMap::new())
            .unwrap();
        assert_eq!(texts(&found), vec!["a3", "a2", "a1", "b2", "b1"]);

        let found = registry
            .run(&image(), &["engineB", "engineA"], &BTreeMap::new())
            .unwrap();
        assert_eq!(texts(&found), vec!["b2", "b1", "a3", "a2", "a1"]);
    }

    #[test]
    fn does_not_deduplicate_across_engines() {
        let found = registry()
            .run(&image(), &["engineA", "engineA"], &BTreeMap::new())
            .unwrap();
        assert_eq!(found.len(), 6);
    }

    #[test]
    fn unknown_engine_lists_registered_engines() {
        let err = registry()
            .run(&image(), &["engineA", "nope", "zilch"], &BTreeMap::new())
            .unwrap_err();
        match err {
            Error::UnknownEngine { name, available } => {
                assert_eq!(name, "nope");
                assert_eq!(available, vec!["engineA", "engineB"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn requires_at_least_one_engine() {
        let names: &[&str] = &[];
        assert!(matches!(
            registry().run(&image(), names, &BTreeMap::new()),
            Err(Error::NoEnginesRequested)
        ));
    }

    #[test]
    fn passes_options_by_engine_name() {
        let mut registry = OcrRegistry::new();
        registry.register("echo", EchoEngine);
        let mut options = BTreeMap::new();
        let mut echo_options = EngineOptions::new();
        echo_options.insert("word".to_owned(), "KA-BOOM".into());
        options.insert("echo".to_owned(), echo_options);

        let found = registry.run(&image(), &["echo"], &options).unwrap();
        assert_eq!(texts(&found), vec!["KA-BOOM"]);
        let found = registry.run(&image(), &["echo"], &BTreeMap::new()).unwrap();
        assert_eq!(texts(&found), vec!["default"]);
    }

    #[test]
    fn engine_failures_name_the_engine() {
        let mut registry = registry();
        registry.register("broken", BrokenEngine);
        let err = registry
            .run(&image(), &["engineA", "broken"], &BTreeMap::new())
            .unwrap_err();
        assert!(matches!(&err, Error::Ocr { engine, .. } if engine == "broken"));
        assert_eq!(err.to_string(), "OCR engine \"broken\" failed");
    }

    #[test]
    fn registering_twice_replaces_the_engine() {
        let mut registry = registry();
        registry.register("engineA", FixedEngine(vec!["replacement"]));
        assert_eq!(registry.available_engines(), vec!["engineA", "engineB"]);
        let found = registry
            .run(&image(), &["engineA"], &BTreeMap::new())
            .unwrap();
        assert_eq!(texts(&found), vec!["replacement"]);
    }

    #[test]
    fn default_registry_has_builtin_engines() {
        assert_eq!(
            OcrRegistry::with_default_engines().available_engines(),
            vec!["easyocr", "paddleocr", "tesseract"]
        );
    }
}

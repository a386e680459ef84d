//! The full extraction pipeline.

use std::{collections::BTreeMap, fmt, path::Path, sync::Arc};

use image::DynamicImage;
use log::debug;
use tokio::task::spawn_blocking;

use crate::{
    ai::{group_boxes, AiParams, MultimodalModel},
    boxes::assign_ids,
    geom::{to_normalized, to_pixel, ImageSize},
    merge::{merge_groups, MergedBubble},
    ocr::{EngineOptions, OcrRegistry},
    preprocess::preprocess_image,
    Error, Result,
};

/// Finds the text bubbles on comic pages.
///
/// Once built, an `Extractor` is never modified, so it can be shared between
/// concurrent extractions. Image processing and OCR run on tokio's blocking
/// thread pool, so they don't stall other tasks.
pub struct Extractor {
    registry: Arc<OcrRegistry>,
    model: Box<dyn MultimodalModel>,
    engine_options: BTreeMap<String, EngineOptions>,
    ai_params: AiParams,
}

impl Extractor {
    /// Create a new extractor using OCR engines from `registry`, and `model`
    /// to group their output.
    pub fn new<M>(registry: OcrRegistry, model: M) -> Extractor
    where
        M: MultimodalModel + 'static,
    {
        Extractor {
            registry: Arc::new(registry),
            model: Box::new(model),
            engine_options: BTreeMap::new(),
            ai_params: AiParams::default(),
        }
    }

    /// Pass `options` to the OCR engine named `name` whenever we run it.
    pub fn engine_options<S: Into<String>>(mut self, name: S, options: EngineOptions) -> Self {
        self.engine_options.insert(name.into(), options);
        self
    }

    /// Use `params` when asking the model.
    pub fn ai_params(mut self, params: AiParams) -> Self {
        self.ai_params = params;
        self
    }

    /// Our OCR engines.
    pub fn registry(&self) -> &OcrRegistry {
        &self.registry
    }

    /// Find the text bubbles in `image`, using the OCR engines named in
    /// `engines`. Returned boxes are in the pixel coordinates of `image`.
    pub async fn extract<S: AsRef<str>>(
        &self,
        image: &DynamicImage,
        engines: &[S],
    ) -> Result<Vec<MergedBubble>> {
        // Fail fast on typos, before doing anything expensive.
        self.registry.check(engines)?;
        let (width, height) = (image.width(), image.height());
        let size = ImageSize::new(width, height).ok_or(Error::EmptyImage { width, height })?;

        let registry = Arc::clone(&self.registry);
        let image = image.clone();
        let engines = engines
            .iter()
            .map(|name| name.as_ref().to_owned())
            .collect::<Vec<_>>();
        let options = self.engine_options.clone();
        let (processed, detected) = spawn_blocking(move || -> Result<_> {
            debug!("preprocessing {}x{} image", width, height);
            let processed = preprocess_image(&image);
            let detected = registry.run(&processed, &engines, &options)?;
            Ok((processed, detected))
        })
        .await??;
        debug!("OCR found {} boxes in total", detected.len());

        let boxes = assign_ids(to_normalized(&detected, size));
        let analysis =
            group_boxes(self.model.as_ref(), &processed, &boxes, &self.ai_params).await?;
        debug!("model returned {} groups", analysis.groups.len());

        let merged = merge_groups(&analysis, &boxes);
        debug!("merged into {} text bubbles", merged.len());
        Ok(to_pixel(&merged, size))
    }

    /// Load the image at `path` and call [`Extractor::extract`].
    pub async fn extract_path<S: AsRef<str>>(
        &self,
        path: &Path,
        engines: &[S],
    ) -> Result<Vec<MergedBubble>> {
        self.registry.check(engines)?;
        let path = path.to_owned();
        let image = spawn_blocking(move || {
            image::open(&path).map_err(|source| Error::ReadImage { path, source })
        })
        .await??;
        self.extract(&image, engines).await
    }
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("registry", &self.registry)
            .field("engine_options", &self.engine_options)
            .field("ai_params", &self.ai_params)
            .finish_non_exhaustive()
    }
}

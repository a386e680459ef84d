//! Clean up a comic page before OCR.
//!
//! This is a fixed chain of filters: sharpen, boost contrast, convert to
//! grayscale, and remove speckle noise. It makes lettering crisper, which
//! helps every OCR engine we've tried.

use image::{imageops, DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::filter::{filter3x3, median_filter};

/// How much to sharpen. 1.0 leaves the image unchanged.
const SHARPNESS: f32 = 2.0;

/// How much to stretch contrast around the mean gray level. 1.0 leaves the
/// image unchanged.
const CONTRAST: f32 = 1.5;

/// Radius of the median filter used for denoising.
const DENOISE_RADIUS: u32 = 1;

/// Run our standard filter chain over `image`. The result has the same
/// dimensions as the input.
pub fn preprocess_image(image: &DynamicImage) -> DynamicImage {
    let rgb = image.to_rgb8();
    let sharpened = sharpen(&rgb, SHARPNESS);
    let contrasted = adjust_contrast(&sharpened, CONTRAST);
    let gray = imageops::grayscale(&contrasted);
    let denoised = denoise(&gray);
    DynamicImage::ImageLuma8(denoised)
}

/// Blend the image away from a smoothed copy of itself.
fn sharpen(image: &RgbImage, factor: f32) -> RgbImage {
    // `factor * identity + (1 - factor) * smooth`, where `smooth` is the
    // usual 3x3 kernel with a heavy center weight.
    let smooth = [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0].map(|w: f32| w / 13.0);
    let mut kernel = smooth.map(|w| (1.0 - factor) * w);
    kernel[4] += factor;
    filter3x3::<_, f32, u8>(image, &kernel)
}

/// Scale each channel's distance from the image's mean gray level.
fn adjust_contrast(image: &RgbImage, factor: f32) -> RgbImage {
    let pixels = u64::from(image.width()) * u64::from(image.height());
    if pixels == 0 {
        return image.clone();
    }
    let total = image.pixels().map(|Rgb(rgb)| gray_level(rgb)).sum::<u64>();
    let mean = (total as f64 / pixels as f64).round() as f32;

    let mut out = image.clone();
    for Rgb(channels) in out.pixels_mut() {
        for c in channels.iter_mut() {
            let v = mean + (f32::from(*c) - mean) * factor;
            *c = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// ITU-R 601 luma, in integer arithmetic.
fn gray_level(rgb: &[u8; 3]) -> u64 {
    let [r, g, b] = rgb.map(u64::from);
    (r * 299 + g * 587 + b * 114) / 1000
}

fn denoise(image: &GrayImage) -> GrayImage {
    median_filter(image, DENOISE_RADIUS, DENOISE_RADIUS)
}

//! Sample-size computation for thumbnail decoding.
//!
//! A sample size of N means the decoded bitmap is 1/N of the source in
//! each dimension. The divisor is chosen from two constraints: a minimum
//! side length the thumbnail should keep, and a maximum pixel count it
//! must not exceed. Decoders only honor coarse divisors, so the result is
//! rounded up to a power of two (small divisors) or a multiple of 8;
//! rounding up never enlarges the decoded bitmap.

/// Minimum side length a mini thumbnail should keep, in pixels
pub const TARGET_SIZE_MINI_THUMBNAIL: u32 = 320;

/// Maximum pixel count tolerable for a decoded thumbnail bitmap
pub const MAX_NUM_PIXELS_THUMBNAIL: u32 = 512 * 384;

/// Compute the rounded sample-size divisor for a source image.
///
/// `min_side` and `max_pixels` are each optional; `None` means the
/// corresponding constraint is ignored. With both absent the image is
/// decoded at full size.
pub fn compute_sample_size(
    width: u32,
    height: u32,
    min_side: Option<u32>,
    max_pixels: Option<u32>,
) -> u32 {
    round_sample_size(initial_sample_size(width, height, min_side, max_pixels))
}

/// Pick the divisor inside (or nearest to) the feasible range.
///
/// The lower bound keeps the pixel count under `max_pixels`; the upper
/// bound keeps both sides at least `min_side`. When the range is empty
/// the lower bound wins: staying under the pixel budget matters more
/// than hitting the target side length.
fn initial_sample_size(
    width: u32,
    height: u32,
    min_side: Option<u32>,
    max_pixels: Option<u32>,
) -> u32 {
    let w = width as f64;
    let h = height as f64;

    let lower_bound = match max_pixels {
        None => 1,
        Some(max) => (w * h / max as f64).sqrt().ceil() as u32,
    };
    let upper_bound = match min_side {
        None => 128,
        Some(side) => ((w / side as f64).floor()).min((h / side as f64).floor()) as u32,
    };

    if upper_bound < lower_bound {
        // No overlapping zone; return the larger one.
        return lower_bound;
    }

    match (max_pixels, min_side) {
        (None, None) => 1,
        (_, None) => lower_bound,
        _ => upper_bound,
    }
}

/// Round a divisor up to what decoders actually honor.
///
/// Decoders downsample by 2 even when asked for 3, so rounding must go
/// up, never down, or the decoded bitmap exceeds the memory budget.
fn round_sample_size(initial: u32) -> u32 {
    if initial <= 8 {
        let mut rounded = 1;
        while rounded < initial {
            rounded <<= 1;
        }
        rounded
    } else {
        (initial + 7) / 8 * 8
    }
}

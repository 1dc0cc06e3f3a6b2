//! Pixel format conversion helpers.

/// Convert tightly packed BGRA pixels to RGBA.
pub(crate) fn bgra_to_rgba(src: &[u8]) -> Vec<u8> {
    let mut dst = src.to_vec();
    for px in dst.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
    dst
}

//! Attachment URL derivation.
//!
//! Images attached to a post are addressed by position, so the URLs can be
//! rebuilt from `(channel_id, post_id, img_count)` alone. The format is part
//! of the external contract with the file-serving side.

/// Path prefix for attached images
pub const IMAGE_URL_PREFIX: &str = "/api/v1/files/get_image";

/// Build the ordered, 1-indexed image URLs for a post.
///
/// A count of zero (or a negative count from a bad row) yields no URLs.
///
/// # Example
/// ```
/// use poststore_core::image_urls;
///
/// let urls = image_urls("chan", "post", 2);
/// assert_eq!(urls[0], "/api/v1/files/get_image/chan/post/1.png");
/// assert_eq!(urls[1], "/api/v1/files/get_image/chan/post/2.png");
/// ```
pub fn image_urls(channel_id: &str, post_id: &str, img_count: i64) -> Vec<String> {
    (1..=img_count.max(0))
        .map(|i| format!("{IMAGE_URL_PREFIX}/{channel_id}/{post_id}/{i}.png"))
        .collect()
}

//! Uploaded-file model and node conversion.
//!
//! telegra.ph hosts media uploaded through its `/upload` endpoint and only
//! accepts a small set of image and video extensions. [`UploadedFile`] wraps
//! the returned path and knows how to embed itself into a content tree.

use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeChild};

/// File extensions accepted by the telegra.ph upload endpoint.
pub const ALLOWED_EXTENSIONS: &[&str] = &["gif", "jpg", "jpe", "jpeg", "jfif", "png", "mp4", "m4v", "mp4v"];

/// The subset of [`ALLOWED_EXTENSIONS`] rendered as images rather than video.
const IMAGE_EXTENSIONS: &[&str] = &["gif", "jpg", "jpe", "jpeg", "jfif", "png"];

/// A file stored on telegra.ph servers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Path to the file, relative to `https://telegra.ph`.
    pub src: String,
}

impl UploadedFile {
    /// Returns the file extension, taken from the last dot in `src`.
    pub fn extension(&self) -> &str {
        self.src.rsplit('.').next().unwrap_or("")
    }

    /// Converts the uploaded file into a node that can be placed in a
    /// content tree: a `figure` holding an `img` or `video` (depending on
    /// the extension) followed by a caption.
    pub fn to_node(&self, caption: &str) -> Node {
        let media_tag = if IMAGE_EXTENSIONS.contains(&self.extension()) { "img" } else { "video" };

        Node::with_children(
            "figure",
            vec![
                Node::new(media_tag).attr("src", self.src.clone()).into(),
                Node::with_children("figcaption", vec![NodeChild::text(caption)]).into(),
            ],
        )
    }
}

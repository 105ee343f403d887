pub mod error;
pub mod models;
pub mod node;
pub mod normalize;
pub mod tree;
pub mod upload;

#[cfg(feature = "client")]
pub mod client;

pub use error::{Result, TelepressError};
pub use models::{Account, Page, PageList, PageViews};
pub use node::{Node, NodeChild, serialize_nodes};
pub use normalize::{SUPPORTED_ATTRS, SUPPORTED_TAGS, normalize_html};
#[doc(hidden)]
pub use normalize::{rewrite_video_embeds, strip_unsupported_attrs, strip_unsupported_tags};
pub use tree::{html_to_nodes, html_to_nodes_raw};
pub use upload::{ALLOWED_EXTENSIONS, UploadedFile};

#[cfg(feature = "client")]
pub use client::{AccountDetails, AccountUpdate, ClientConfig, PageOptions, Telegraph, ViewsPeriod};

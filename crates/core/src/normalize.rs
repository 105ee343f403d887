//! HTML normalization pipeline.
//!
//! Telegraph accepts only a small subset of HTML, so raw fragments are run
//! through an ordered chain of rewrite passes before being converted into a
//! node tree: video-embed iframes are rewritten into Telegraph's embed-proxy
//! form, unsupported tags are unwrapped, unsupported attributes dropped, and
//! the result trimmed. Every pass is a pure fragment-to-fragment function;
//! the same input always yields the same output.
//!
//! Malformed HTML never fails here: both the fragment parser and the
//! streaming rewriter recover best-effort and the pipeline proceeds on
//! whatever structure results.

use regex::Regex;
use scraper::Html;
use url::Url;

/// Tags accepted by the Telegraph editor. Anything else is unwrapped: the
/// element is dropped and its children spliced into its parent's child list.
pub const SUPPORTED_TAGS: &[&str] = &[
    "a", "aside", "b", "blockquote", "br", "code", "em", "figcaption", "figure", "h3", "h4", "hr",
    "i", "iframe", "img", "li", "ol", "p", "pre", "s", "strong", "u", "ul", "video",
];

/// Attributes accepted by the Telegraph editor; all others are deleted.
pub const SUPPORTED_ATTRS: &[&str] = &["href", "src"];

type RewritePass = fn(&str) -> String;

/// The fixed pass order. Each pass consumes the full output of the previous
/// one, so the whitelist passes see the markup produced by the embed rewrite.
const PASSES: &[RewritePass] = &[
    rewrite_video_embeds,
    strip_unsupported_tags,
    strip_unsupported_attrs,
    trim_fragment,
];

/// Runs the full normalization pipeline over an HTML fragment.
///
/// # Example
///
/// ```rust
/// use telepress_core::normalize_html;
///
/// let html = r#"<p><span onclick="x">Hello</span></p>"#;
/// assert_eq!(normalize_html(html), "<p>Hello</p>");
/// ```
pub fn normalize_html(html: &str) -> String {
    PASSES.iter().fold(html.to_string(), |fragment, pass| pass(&fragment))
}

/// Rewrites YouTube embed iframes into Telegraph's embed-proxy form.
///
/// A matching iframe gets its `src` replaced with
/// `/embed/youtube?url=https://youtube.com/watch?v=<id>` (the id being the
/// final path segment of the embed URL), fixed 640x360 dimensions, the
/// transparency and fullscreen flags, a following empty `<figcaption>` when
/// none is present, and a `<figure>` wrapper when its parent is not already
/// one. Iframes that do not match the embed pattern pass through unchanged.
pub fn rewrite_video_embeds(html: &str) -> String {
    let embed_re = Regex::new(r"^https?://(?:www\.)?youtube\.com/embed/").unwrap();

    let fragment = Html::parse_fragment(html);
    let mut output = String::new();
    for child in fragment.root_element().children() {
        serialize_rewriting_embeds(child, false, &embed_re, &mut output);
    }
    output
}

fn serialize_rewriting_embeds(
    node: ego_tree::NodeRef<scraper::Node>,
    in_figure: bool,
    embed_re: &Regex,
    out: &mut String,
) {
    match node.value() {
        scraper::Node::Text(text) => out.push_str(&escape_text(text)),
        scraper::Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        scraper::Node::Element(el) => {
            let name = el.name().to_lowercase();

            if name == "iframe"
                && let Some(src) = el.attr("src")
                && embed_re.is_match(src)
                && let Some(video_id) = embed_video_id(src)
            {
                emit_rewritten_embed(node, in_figure, &video_id, embed_re, out);
                return;
            }

            out.push('<');
            out.push_str(&name);
            for (attr, value) in el.attrs() {
                out.push(' ');
                out.push_str(attr);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }

            if is_void_element(&name) {
                out.push_str(" />");
                return;
            }

            out.push('>');
            let child_in_figure = name == "figure";
            for child in node.children() {
                serialize_rewriting_embeds(child, child_in_figure, embed_re, out);
            }
            out.push_str("</");
            out.push_str(&name);
            out.push('>');
        }
        _ => {}
    }
}

fn emit_rewritten_embed(
    node: ego_tree::NodeRef<scraper::Node>,
    in_figure: bool,
    video_id: &str,
    embed_re: &Regex,
    out: &mut String,
) {
    let proxy_src = format!("/embed/youtube?url=https://youtube.com/watch?v={}", video_id);

    if !in_figure {
        out.push_str("<figure>");
    }

    out.push_str("<iframe src=\"");
    out.push_str(&escape_attr(&proxy_src));
    out.push_str("\" width=\"640\" height=\"360\" allowtransparency=\"true\" allowfullscreen=\"true\"");
    for (attr, value) in node.value().as_element().map(|el| el.attrs()).into_iter().flatten() {
        if matches!(attr, "src" | "width" | "height" | "allowtransparency" | "allowfullscreen") {
            continue;
        }
        out.push(' ');
        out.push_str(attr);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push('>');

    for child in node.children() {
        serialize_rewriting_embeds(child, false, embed_re, out);
    }
    out.push_str("</iframe>");

    if !followed_by_caption(node) {
        out.push_str("<figcaption></figcaption>");
    }
    if !in_figure {
        out.push_str("</figure>");
    }
}

/// Checks whether the next non-whitespace sibling is already a figcaption.
fn followed_by_caption(node: ego_tree::NodeRef<scraper::Node>) -> bool {
    for sibling in node.next_siblings() {
        match sibling.value() {
            scraper::Node::Text(text) if text.trim().is_empty() => continue,
            scraper::Node::Element(el) => return el.name().eq_ignore_ascii_case("figcaption"),
            _ => return false,
        }
    }
    false
}

/// Extracts the video id from an embed URL as its final path segment.
///
/// Query parameters and fragments are dropped. A bare `/embed/` path has no
/// id to extract and is treated as a pattern miss.
fn embed_video_id(src: &str) -> Option<String> {
    let url = Url::parse(src).ok()?;
    let id = url.path_segments()?.filter(|segment| !segment.is_empty()).next_back()?;
    if id == "embed" {
        return None;
    }
    Some(id.to_string())
}

/// Unwraps every element whose tag is not in [`SUPPORTED_TAGS`].
///
/// Content is preserved: only the offending wrapper is dropped, at any depth.
pub fn strip_unsupported_tags(html: &str) -> String {
    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("*", |el| {
                if !SUPPORTED_TAGS.contains(&el.tag_name().to_lowercase().as_str()) {
                    el.remove_and_keep_content();
                }
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    match rewriter.write(html.as_bytes()) {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    match rewriter.end() {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    output
}

/// Deletes every attribute whose name is not in [`SUPPORTED_ATTRS`], on all
/// elements at all depths.
pub fn strip_unsupported_attrs(html: &str) -> String {
    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("*", |el| {
                let names: Vec<String> = el.attributes().iter().map(|attr| attr.name()).collect();
                for name in names {
                    if !SUPPORTED_ATTRS.contains(&name.as_str()) {
                        el.remove_attribute(&name);
                    }
                }
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    match rewriter.write(html.as_bytes()) {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    match rewriter.end() {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    output
}

/// Strips leading and trailing whitespace from the fragment.
fn trim_fragment(html: &str) -> String {
    html.trim().to_string()
}

fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "source" | "track" | "wbr"
    )
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_embed_rewrite_wraps_and_captions() {
        let html = r#"<iframe src="https://www.youtube.com/embed/abc123"></iframe>"#;
        let result = rewrite_video_embeds(html);

        assert!(result.starts_with("<figure><iframe"));
        assert!(result.contains("src=\"/embed/youtube?url=https://youtube.com/watch?v=abc123\""));
        assert!(result.contains("width=\"640\""));
        assert!(result.contains("height=\"360\""));
        assert!(result.contains("allowtransparency=\"true\""));
        assert!(result.contains("allowfullscreen=\"true\""));
        assert!(result.ends_with("<figcaption></figcaption></figure>"));
    }

    #[test]
    fn test_embed_rewrite_without_www() {
        let html = r#"<iframe src="https://youtube.com/embed/xyz"></iframe>"#;
        let result = rewrite_video_embeds(html);

        assert!(result.contains("watch?v=xyz"));
    }

    #[test]
    fn test_embed_rewrite_keeps_existing_figure_and_caption() {
        let html = concat!(
            r#"<figure><iframe src="https://www.youtube.com/embed/abc"></iframe>"#,
            "<figcaption>My video</figcaption></figure>",
        );
        let result = rewrite_video_embeds(html);

        assert_eq!(result.matches("<figure>").count(), 1);
        assert_eq!(result.matches("<figcaption>").count(), 1);
        assert!(result.contains("My video"));
    }

    #[test]
    fn test_embed_rewrite_ignores_other_iframes() {
        let html = r#"<iframe src="https://player.vimeo.com/video/1"></iframe>"#;
        let result = rewrite_video_embeds(html);

        assert!(result.contains("https://player.vimeo.com/video/1"));
        assert!(!result.contains("<figure>"));
        assert!(!result.contains("figcaption"));
    }

    #[test]
    fn test_embed_rewrite_drops_query_params_from_id() {
        let html = r#"<iframe src="https://www.youtube.com/embed/abc123?start=30"></iframe>"#;
        let result = rewrite_video_embeds(html);

        assert!(result.contains("watch?v=abc123\""));
        assert!(!result.contains("start=30"));
    }

    #[test]
    fn test_embed_rewrite_preserves_surrounding_content() {
        let html = r#"<p>Before</p><iframe src="https://www.youtube.com/embed/v1"></iframe><p>After</p>"#;
        let result = rewrite_video_embeds(html);

        assert!(result.starts_with("<p>Before</p><figure>"));
        assert!(result.ends_with("</figure><p>After</p>"));
    }

    #[rstest]
    #[case("<blink>X</blink>", "X")]
    #[case("<p><span>inner</span></p>", "<p>inner</p>")]
    #[case("<div><p>kept</p></div>", "<p>kept</p>")]
    #[case("<strong>bold</strong>", "<strong>bold</strong>")]
    fn test_strip_unsupported_tags(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_unsupported_tags(input), expected);
    }

    #[test]
    fn test_strip_tags_recurses() {
        let html = "<p><font><marquee>deep</marquee></font></p>";
        assert_eq!(strip_unsupported_tags(html), "<p>deep</p>");
    }

    #[test]
    fn test_strip_tags_idempotent() {
        let html = "<div><p>A <b>b</b> <blink>c</blink></p></div>";
        let once = strip_unsupported_tags(html);
        let twice = strip_unsupported_tags(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_strip_attrs() {
        let html = r#"<a href="u" onclick="x" class="y">t</a>"#;
        let result = strip_unsupported_attrs(html);

        assert!(result.contains(r#"href="u""#));
        assert!(!result.contains("onclick"));
        assert!(!result.contains("class"));
    }

    #[test]
    fn test_strip_attrs_idempotent() {
        let html = r#"<img src="i.png" alt="a" /><a href="u" target="_blank">t</a>"#;
        let once = strip_unsupported_attrs(html);
        let twice = strip_unsupported_attrs(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_trim_pass() {
        assert_eq!(trim_fragment("\n  <p>x</p>  \n"), "<p>x</p>");
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let html = r#"
            <div class="wrapper">
                <p onclick="boom()">Hello <span>there</span></p>
                <iframe src="https://www.youtube.com/embed/abc123"></iframe>
            </div>
        "#;

        let first = normalize_html(html);
        let second = normalize_html(html);
        assert_eq!(first, second);
        assert!(first.contains("<p>Hello there</p>"));
        assert!(first.contains("watch?v=abc123"));
        assert!(!first.contains("onclick"));
        assert!(!first.contains("div"));
    }

    #[test]
    fn test_pipeline_handles_malformed_html() {
        let html = "<p>unclosed <b>nested <i>tags";
        let result = normalize_html(html);

        assert!(result.contains("unclosed"));
        assert!(result.contains("nested"));
        assert!(result.contains("tags"));
    }
}

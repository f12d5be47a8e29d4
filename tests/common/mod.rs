#![allow(dead_code)]

/// Renders a minimal comic page. The image lives in `div#comic`, the
/// next-page link carries both `class="next"` and `rel="next"`, so the
/// same fixture serves the static-selector tests and selector discovery.
pub fn comic_page(image_src: Option<&str>, next_href: Option<&str>) -> String {
    let image = image_src
        .map(|src| format!(r#"<div id="comic"><img src="{src}"></div>"#))
        .unwrap_or_default();
    let next = next_href
        .map(|href| format!(r#"<a class="next" rel="next" href="{href}">Next</a>"#))
        .unwrap_or_default();
    format!("<html><body>{image}{next}</body></html>")
}

pub const NEXT_SELECTOR: &str = "a.next@href";
pub const IMAGE_SELECTOR: &str = "div#comic img@src";

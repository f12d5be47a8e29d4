use crate::error::{ComicDlError, Result};
use scraper::{ElementRef, Html, Selector};

/// A selector expression of the form `<css>@<attribute>`, e.g.
/// `div#comic img@src` or `a[rel="next"]@href`. The CSS part picks the
/// elements, the attribute part names which attribute value to extract.
///
/// If a matched element does not carry the attribute itself, the attribute
/// is collected from its descendants instead. That makes container
/// selectors like `div.photo@src` usable without spelling out the inner
/// `img`, which is what inconsistent comic markup often requires.
#[derive(Debug, Clone)]
pub struct CompiledSelector {
    css: Selector,
    attr: String,
    expression: String,
}

impl CompiledSelector {
    pub fn parse(expression: &str) -> Result<Self> {
        let (css_part, attr) = expression.rsplit_once('@').ok_or_else(|| {
            ComicDlError::selector(format!(
                "selector `{expression}` is missing an @attribute suffix"
            ))
        })?;
        let css_part = css_part.trim();
        let attr = attr.trim();
        if css_part.is_empty() || attr.is_empty() {
            return Err(ComicDlError::selector(format!(
                "selector `{expression}` must have both a css part and an attribute"
            )));
        }
        let css = Selector::parse(css_part).map_err(|e| {
            ComicDlError::selector(format!("selector `{expression}` is not valid css: {e:?}"))
        })?;
        Ok(Self {
            css,
            attr: attr.to_string(),
            expression: expression.to_string(),
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Evaluates the selector against a parsed document, returning matched
    /// attribute values in document order. No matches is an empty vec, never
    /// an error.
    pub fn evaluate(&self, document: &Html) -> Vec<String> {
        let mut values = Vec::new();
        for element in document.select(&self.css) {
            if let Some(value) = element.value().attr(&self.attr) {
                values.push(value.to_string());
                continue;
            }
            // Descendant lookup, mirrors `//@attr` extraction semantics.
            for node in element.descendants() {
                if let Some(child) = ElementRef::wrap(node) {
                    if let Some(value) = child.value().attr(&self.attr) {
                        values.push(value.to_string());
                    }
                }
            }
        }
        values
    }
}

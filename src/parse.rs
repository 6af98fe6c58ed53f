use std::sync::Arc;

use scraper::{CaseSensitivity, ElementRef, Html, Selector};
use tokio::task::spawn_blocking;

use crate::{Error, Result};

/// Where the extracted attribute lives relative to the matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Carrier {
    /// The matched element carries the attribute itself.
    Element,
    /// The first descendant (any tag) carrying the attribute.
    Descendant,
}

/// Declarative description of which attribute values to pull out of a page.
#[derive(Debug, Clone)]
pub struct Selection {
    pub tag: String,
    /// Whitespace separated classes; an element matches when it has all of them.
    pub class_filter: String,
    pub carrier: Carrier,
    pub attribute: String,
    /// Substring the element's text content must contain.
    pub text_filter: Option<String>,
}

impl Selection {
    pub fn new(tag: &str, class_filter: &str, carrier: Carrier, attribute: &str) -> Self {
        Self {
            tag: tag.into(),
            class_filter: class_filter.into(),
            carrier,
            attribute: attribute.into(),
            text_filter: None,
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text_filter = Some(text.into());
        self
    }

    fn matches(&self, el: &ElementRef) -> bool {
        let has_classes = self
            .class_filter
            .split_whitespace()
            .all(|class| el.value().has_class(class, CaseSensitivity::CaseSensitive));
        if !has_classes {
            return false;
        }
        match &self.text_filter {
            Some(text) => el.text().collect::<String>().contains(text.as_str()),
            None => true,
        }
    }

    fn carrier_value<'a>(&self, el: ElementRef<'a>) -> Option<&'a str> {
        match self.carrier {
            Carrier::Element => el.value().attr(&self.attribute),
            // `descendants` yields the element itself first.
            Carrier::Descendant => el
                .descendants()
                .skip(1)
                .filter_map(ElementRef::wrap)
                .find_map(|d| d.value().attr(&self.attribute)),
        }
    }
}

/// Runs the selection over the page, returning matching attribute values in document order.
/// Elements without the attribute are skipped. Duplicates are kept.
pub fn extract(html: &[u8], selection: &Selection) -> Result<Vec<String>> {
    let selector = create_selector(&selection.tag)?;
    let doc = Html::parse_document(&String::from_utf8_lossy(html));

    let values = doc
        .select(&selector)
        .filter(|el| selection.matches(el))
        .filter_map(|el| selection.carrier_value(el))
        .map(str::to_owned)
        .collect();
    Ok(values)
}

/// Same as [`extract`] but off the async workers, since parsing a whole page is CPU bound.
pub async fn parse_html(html: Arc<Vec<u8>>, selection: Selection) -> Result<Vec<String>> {
    spawn_blocking(move || extract(&html, &selection)).await?
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str)
        .map_err(|e| Error::Parse(format!("invalid element selector {sel_str:?}: {e}")))
}

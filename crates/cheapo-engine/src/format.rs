//! Renders a page of results as Telegram Markdown.

use std::collections::BTreeSet;

use cheapo_core::{Coordinates, MerchantRecord, SourceCatalog, SourceId};

use crate::offer::condense_offer_description;
use crate::transform::Page;

pub const NO_RESULTS_TEXT: &str = "Sorry, there are no results :(";

const STATIC_MAP_BASE: &str = "https://developers.onemap.sg/commonapi/staticmap/getStaticImage";
const CENTER_MARKER_COLOUR: &str = "255,0,0";
const MERCHANT_MARKER_COLOUR: &str = "144,238,144";
const LOCATION_PIN: &str = "\u{1F4CD}";

/// Everything besides the page itself that shows up in the text.
#[derive(Debug, Clone, Copy)]
pub struct FormatContext<'a> {
    pub center: Coordinates,
    pub radius_meters: u32,
    pub catalog: &'a SourceCatalog,
    pub offer_summary_max_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedPage {
    pub text: String,
    /// Sources of the records shown on this page.
    pub sources_present: BTreeSet<SourceId>,
}

#[must_use]
pub fn format_page(page: &Page, ctx: &FormatContext<'_>) -> FormattedPage {
    if page.is_empty() {
        return FormattedPage {
            text: NO_RESULTS_TEXT.to_string(),
            sources_present: BTreeSet::new(),
        };
    }

    let mut map_url = static_map_url(ctx.center);
    let mut body = String::new();
    let mut sources_present = BTreeSet::new();

    for (index, record) in page.items.iter().enumerate() {
        let label = row_label(index);
        let Coordinates {
            latitude,
            longitude,
        } = record.coordinates;

        map_url.push_str(&format!(
            "|[{latitude},{longitude},%22{MERCHANT_MARKER_COLOUR}%22,%22{label}%22]"
        ));
        body.push_str(&format_line(&label, record, ctx));
        body.push('\n');
        sources_present.insert(record.source);
    }

    let header = format!(
        "*Cheapo found*[ ]({map_url})*{} results in a {}m radius!*\nDisplaying results {} to {}\n\n",
        page.total_items, ctx.radius_meters, page.start_item_number, page.end_item_number
    );

    FormattedPage {
        text: header + &body,
        sources_present,
    }
}

fn format_line(label: &str, record: &MerchantRecord, ctx: &FormatContext<'_>) -> String {
    let Coordinates {
        latitude,
        longitude,
    } = record.coordinates;
    let mut line = format!(
        "{} [{LOCATION_PIN}](http://maps.google.com/maps?q=loc:{latitude},{longitude})",
        bold(&format!("{label}. {}", record.name))
    );

    if let Some(source) = ctx.catalog.by_id(record.source) {
        line.push_str(&format!(
            "[({})]({})",
            strip_markdown(&source.name),
            link_target(&record.source_website)
        ));
    }

    if let Some(offer) = record.offer_details.as_deref() {
        if !offer.trim().is_empty() && offer.chars().count() < ctx.offer_summary_max_chars {
            line.push_str(&format!(
                " - {}",
                escape_markdown(&condense_offer_description(offer))
            ));
        }
    }

    line
}

fn static_map_url(center: Coordinates) -> String {
    let Coordinates {
        latitude,
        longitude,
    } = center;
    format!(
        "{STATIC_MAP_BASE}?layerchosen=default&lat={latitude}&lng={longitude}\
         &zoom=15&height=512&width=512&points=[{latitude},{longitude},%22{CENTER_MARKER_COLOUR}%22]"
    )
}

/// Per-page row label: `A`–`Z`, then `a`–`z`, then the 1-based row number.
#[must_use]
pub fn row_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        Ok(i) if i < 52 => char::from(b'a' + (i - 26)).to_string(),
        _ => (index + 1).to_string(),
    }
}

fn is_entity_delimiter(c: char) -> bool {
    matches!(c, '_' | '*' | '`' | '[')
}

/// Escapes the characters legacy Telegram Markdown treats as entity delimiters.
/// Only valid outside an entity.
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if is_entity_delimiter(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Bolds `text`. Legacy Markdown cannot escape inside an entity, so each
/// delimiter closes the bold run and is emitted escaped between runs.
fn bold(text: &str) -> String {
    fn flush(out: &mut String, run: &mut String) {
        if !run.is_empty() {
            out.push('*');
            out.push_str(run);
            out.push('*');
            run.clear();
        }
    }

    let mut out = String::with_capacity(text.len() + 2);
    let mut run = String::new();
    for c in text.chars() {
        if is_entity_delimiter(c) {
            flush(&mut out, &mut run);
            out.push('\\');
            out.push(c);
        } else {
            run.push(c);
        }
    }
    flush(&mut out, &mut run);
    out
}

/// Link text is an entity too; delimiters and the closing bracket are dropped.
fn strip_markdown(text: &str) -> String {
    text.chars()
        .filter(|&c| !is_entity_delimiter(c) && c != ']')
        .collect()
}

/// Percent-encodes parentheses so a `)` cannot end the link target early.
fn link_target(url: &str) -> String {
    url.replace('(', "%28").replace(')', "%29")
}

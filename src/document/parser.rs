/*!
 * DFXP parsing.
 *
 * Reads a DFXP/TTML caption document into a `CaptionDocument`. Inline
 * formatting inside `<p>` is converted to caption markup, `<div>` boundaries
 * become paragraph starts, and the head is completed with the style and
 * regions the editor relies on.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

use crate::caption::{Millis, Region, UNSET_TIME};
use crate::errors::DocumentError;
use crate::markup;

use super::model::{CaptionDocument, NodeAttrs, Placement};
use super::timing::parse_time_expression;

// @const: Whitespace run containing a line break in source text
static SOURCE_BREAK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\n\s*").unwrap());

pub(crate) const AMARA_STYLE: &str = r#"<style xml:id="amara-style" tts:color="white" tts:fontFamily="proportionalSansSerif" tts:fontSize="18px" tts:backgroundColor="transparent" tts:textOutline="black 1px 0px" tts:textAlign="center"/>"#;
pub(crate) const BOTTOM_REGION: &str = r#"<region xml:id="bottom" style="amara-style" tts:extent="100% 20%" tts:origin="0 80%"/>"#;
pub(crate) const TOP_REGION: &str = r#"<region xml:id="top" style="amara-style" tts:extent="100% 20%" tts:origin="0 0"/>"#;

const TTML_NAMESPACE: &str = "http://www.w3.org/ns/ttml";
const TTML_STYLING_NAMESPACE: &str = "http://www.w3.org/ns/ttml#styling";

const DEFAULT_METADATA: &str = r#"<metadata xmlns:ttm="http://www.w3.org/ns/ttml#metadata"><ttm:title/><ttm:description/><ttm:copyright/></metadata>"#;

/// DFXP text of an empty document in the given language
pub fn empty_dfxp(language_code: &str) -> String {
    format!(
        r#"<tt xmlns="{}" xmlns:tts="{}" xml:lang="{}">
    <head>
        {}
        <styling>{}</styling>
        <layout>{}{}</layout>
    </head>
    <body region="bottom"><div/></body>
</tt>"#,
        TTML_NAMESPACE,
        TTML_STYLING_NAMESPACE,
        escape(language_code),
        DEFAULT_METADATA,
        AMARA_STYLE,
        BOTTOM_REGION,
        TOP_REGION
    )
}

fn local_name(element: &BytesStart) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

/// Attributes of an element as (qualified name, unescaped value) pairs
fn attributes(element: &BytesStart) -> Result<Vec<(String, String)>, DocumentError> {
    let mut result = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| DocumentError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        result.push((key, value));
    }
    Ok(result)
}

fn attribute<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Markup markers opened by a `<span>` and the sequence that closes them
fn span_markers(attrs: &[(String, String)]) -> (String, String) {
    let mut open = String::new();
    if attribute(attrs, "tts:fontWeight") == Some("bold") {
        open.push_str("**");
    }
    if attribute(attrs, "tts:fontStyle") == Some("italic") {
        open.push('*');
    }
    if attribute(attrs, "tts:textDecoration") == Some("underline") {
        open.push('_');
    }
    let close = open.chars().rev().collect();
    (open, close)
}

fn parse_time_attribute(attrs: &[(String, String)], name: &str) -> Result<Millis, DocumentError> {
    match attribute(attrs, name) {
        Some(value) if !value.trim().is_empty() => parse_time_expression(value),
        _ => Ok(UNSET_TIME),
    }
}

/// Head features the editor needs
#[derive(Default)]
struct HeadScan {
    has_style: bool,
    has_bottom: bool,
    has_top: bool,
}

impl HeadScan {
    fn observe(&mut self, name: &str, attrs: &[(String, String)]) {
        let id = attribute(attrs, "xml:id");
        match (name, id) {
            ("style", Some("amara-style")) => self.has_style = true,
            ("region", Some("bottom")) => self.has_bottom = true,
            ("region", Some("top")) => self.has_top = true,
            _ => {}
        }
    }
}

/// Add whatever the head is missing of the editor's style and regions
fn complete_head(head: Option<String>, scan: &HeadScan) -> String {
    let mut head = match head {
        Some(head) => head,
        None => return format!(
            "<head>{}<styling>{}</styling><layout>{}{}</layout></head>",
            DEFAULT_METADATA, AMARA_STYLE, BOTTOM_REGION, TOP_REGION
        ),
    };

    if !scan.has_style {
        insert_into_section(&mut head, "styling", AMARA_STYLE);
    }
    let mut regions = String::new();
    if !scan.has_bottom {
        regions.push_str(BOTTOM_REGION);
    }
    if !scan.has_top {
        regions.push_str(TOP_REGION);
    }
    if !regions.is_empty() {
        insert_into_section(&mut head, "layout", &regions);
    }
    head
}

/// Append `content` at the end of the `<section>` element of a head, creating it if needed
fn insert_into_section(head: &mut String, section: &str, content: &str) {
    let closing = format!("</{}>", section);
    if let Some(pos) = head.rfind(&closing) {
        head.insert_str(pos, content);
        return;
    }
    let element = format!("<{0}>{1}</{0}>", section, content);
    match head.rfind("</head>") {
        Some(pos) => head.insert_str(pos, &element),
        None => head.push_str(&element),
    }
}

/// Caption being collected between `<p>` and `</p>`
struct OpenCaption {
    attrs: NodeAttrs,
    text: String,
    span_closers: Vec<String>,
}

impl CaptionDocument {
    /// Parse DFXP text into a document
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_str(text);

        let mut root_attributes: Option<Vec<(String, String)>> = None;
        let mut head: Option<String> = None;
        let mut head_start: Option<usize> = None;
        let mut head_scan = HeadScan::default();
        let mut body_region: Option<String> = None;
        let mut in_body = false;
        let mut paragraph_pending = true;
        let mut depth = 0usize;
        let mut open: Option<OpenCaption> = None;
        let mut captions: Vec<(NodeAttrs, String)> = Vec::new();

        loop {
            let position = reader.buffer_position() as usize;
            match reader.read_event()? {
                Event::Start(element) => {
                    depth += 1;
                    let name = local_name(&element);
                    let attrs = attributes(&element)?;
                    if head_start.is_some() {
                        head_scan.observe(&name, &attrs);
                        continue;
                    }
                    match name.as_str() {
                        "tt" if root_attributes.is_none() => root_attributes = Some(attrs),
                        "head" if !in_body => head_start = Some(position),
                        "body" => {
                            in_body = true;
                            paragraph_pending = true;
                            body_region = attribute(&attrs, "region").map(str::to_string);
                        }
                        "div" if in_body => paragraph_pending = true,
                        "p" if in_body => {
                            let region = match attribute(&attrs, "region") {
                                Some(value) => value.parse::<Region>().ok(),
                                None => None,
                            };
                            open = Some(OpenCaption {
                                attrs: NodeAttrs {
                                    begin: parse_time_attribute(&attrs, "begin")?,
                                    end: parse_time_attribute(&attrs, "end")?,
                                    region,
                                    start_of_paragraph: paragraph_pending,
                                },
                                text: String::new(),
                                span_closers: Vec::new(),
                            });
                            paragraph_pending = false;
                        }
                        "span" => {
                            if let Some(caption) = open.as_mut() {
                                let (opener, closer) = span_markers(&attrs);
                                caption.text.push_str(&opener);
                                caption.span_closers.push(closer);
                            }
                        }
                        _ => {}
                    }
                }
                Event::Empty(element) => {
                    let name = local_name(&element);
                    if head_start.is_some() {
                        let attrs = attributes(&element)?;
                        head_scan.observe(&name, &attrs);
                        continue;
                    }
                    match name.as_str() {
                        "tt" if root_attributes.is_none() => {
                            root_attributes = Some(attributes(&element)?);
                        }
                        "br" => {
                            if let Some(caption) = open.as_mut() {
                                caption.text.push('\n');
                            }
                        }
                        "div" if in_body => paragraph_pending = true,
                        "p" if in_body => {
                            let attrs = attributes(&element)?;
                            captions.push((
                                NodeAttrs {
                                    begin: parse_time_attribute(&attrs, "begin")?,
                                    end: parse_time_attribute(&attrs, "end")?,
                                    region: attribute(&attrs, "region").and_then(|v| v.parse().ok()),
                                    start_of_paragraph: paragraph_pending,
                                },
                                String::new(),
                            ));
                            paragraph_pending = false;
                        }
                        _ => {}
                    }
                }
                Event::End(element) => {
                    depth = depth.saturating_sub(1);
                    let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
                    if let Some(start) = head_start {
                        if name == "head" {
                            let end = reader.buffer_position() as usize;
                            head = Some(text[start..end].to_string());
                            head_start = None;
                        }
                        continue;
                    }
                    match name.as_str() {
                        "p" => {
                            if let Some(caption) = open.take() {
                                captions.push((caption.attrs, markup::normalize(&caption.text)));
                            }
                        }
                        "span" => {
                            if let Some(caption) = open.as_mut() {
                                if let Some(closer) = caption.span_closers.pop() {
                                    caption.text.push_str(&closer);
                                }
                            }
                        }
                        "body" => in_body = false,
                        _ => {}
                    }
                }
                Event::Text(content) => {
                    if let Some(caption) = open.as_mut() {
                        let unescaped = content.unescape()?;
                        caption.text.push_str(&SOURCE_BREAK_REGEX.replace_all(&unescaped, " "));
                    }
                }
                Event::CData(content) => {
                    if let Some(caption) = open.as_mut() {
                        caption.text.push_str(&String::from_utf8_lossy(&content.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if depth != 0 {
            return Err(DocumentError::Parse("unexpected end of document".to_string()));
        }
        let root_attributes = root_attributes
            .ok_or_else(|| DocumentError::Parse("missing <tt> root element".to_string()))?;
        if head.is_none() || !(head_scan.has_style && head_scan.has_bottom && head_scan.has_top) {
            warn!("Caption document head is incomplete, adding editor style and regions");
        }
        let head = complete_head(head, &head_scan);

        let mut document = CaptionDocument::from_parts(root_attributes, head, body_region);
        for (attrs, markup) in captions {
            document.add_caption(Placement::Back, attrs, &markup)?;
        }
        debug!("Parsed caption document with {} captions", document.len());
        Ok(document)
    }

    /// A document with no captions in the given language
    pub fn empty(language_code: &str) -> Self {
        let root_attributes = vec![
            ("xmlns".to_string(), TTML_NAMESPACE.to_string()),
            ("xmlns:tts".to_string(), TTML_STYLING_NAMESPACE.to_string()),
            ("xml:lang".to_string(), language_code.to_string()),
        ];
        let head = complete_head(None, &HeadScan::default());
        CaptionDocument::from_parts(root_attributes, head, Some("bottom".to_string()))
    }
}

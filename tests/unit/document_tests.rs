/*!
 * Tests for DFXP document parsing, editing and writing
 */

use subedit::caption::{Region, UNSET_TIME};
use subedit::document::{empty_dfxp, CaptionDocument, NodeAttrs, Placement};
use subedit::errors::DocumentError;

use crate::common;

/// Test that source line breaks inside a paragraph collapse to spaces
#[test]
fn test_parse_withIndentedText_shouldCollapseSourceBreaks() {
    let text = r#"<tt xml:lang="en"><body><div>
        <p begin="00:00:01.000" end="00:00:02.000">
            First half
            second half<br/>
            next line
        </p>
    </div></body></tt>"#;
    let doc = CaptionDocument::parse(text).unwrap();
    let node = doc.nodes()[0];
    assert_eq!(doc.text(node).unwrap(), "First half second half\nnext line");
}

/// Test nested formatting spans
#[test]
fn test_parse_withNestedSpans_shouldProduceMarkup() {
    let text = r#"<tt xmlns:tts="http://www.w3.org/ns/ttml#styling"><body><div>
        <p begin="1s" end="2s"><span tts:fontWeight="bold">Loud <span tts:textDecoration="underline">and</span></span> clear</p>
    </div></body></tt>"#;
    let doc = CaptionDocument::parse(text).unwrap();
    assert_eq!(doc.text(doc.nodes()[0]).unwrap(), "**Loud _and_** clear");
}

/// Test that every div starts a paragraph and the first caption always does
#[test]
fn test_parse_withSeveralDivs_shouldMarkParagraphStarts() {
    let text = r#"<tt><body>
        <div><p>a</p><p>b</p></div>
        <div><p>c</p></div>
        <div/>
        <div><p/></div>
    </body></tt>"#;
    let doc = CaptionDocument::parse(text).unwrap();
    let flags: Vec<bool> = doc
        .nodes()
        .into_iter()
        .map(|node| doc.start_of_paragraph(node).unwrap())
        .collect();
    assert_eq!(flags, vec![true, false, true, true]);
}

/// Test that unknown regions read as no region
#[test]
fn test_parse_withUnknownRegion_shouldIgnoreIt() {
    let text = r#"<tt><body><div><p region="middle">x</p><p region="bottom">y</p></div></body></tt>"#;
    let doc = CaptionDocument::parse(text).unwrap();
    let nodes = doc.nodes();
    assert_eq!(doc.region(nodes[0]).unwrap(), None);
    assert_eq!(doc.region(nodes[1]).unwrap(), Some(Region::Bottom));
}

/// Test that metadata survives a write and read back
#[test]
fn test_toXmlString_shouldPreserveHeadMetadata() {
    let text = common::dfxp_document("en", &[(0.0, 1000.0, "one")]);
    let doc = CaptionDocument::parse(&text).unwrap();
    let written = doc.to_xml_string();

    assert!(written.contains("<ttm:title>Test video</ttm:title>"));
    assert!(written.contains(r#"xml:lang="en""#));
    assert!(written.contains(r#"<body region="bottom">"#));
    assert_eq!(CaptionDocument::parse(&written).unwrap(), doc);
}

/// Test that fractional and unset times round-trip
#[test]
fn test_toXmlString_withFractionalTimes_shouldRoundTrip() {
    let mut doc = CaptionDocument::empty("en");
    let a = doc
        .add_caption(
            Placement::Back,
            NodeAttrs { begin: 1500.25, end: 4500.75, region: None, start_of_paragraph: true },
            "a",
        )
        .unwrap();
    doc.add_caption(Placement::After(a), NodeAttrs::default(), "b").unwrap();

    let reparsed = CaptionDocument::parse(&doc.to_xml_string()).unwrap();
    let nodes = reparsed.nodes();
    assert_eq!(reparsed.start_time(nodes[0]).unwrap(), 1500.25);
    assert_eq!(reparsed.end_time(nodes[0]).unwrap(), 4500.75);
    assert_eq!(reparsed.start_time(nodes[1]).unwrap(), UNSET_TIME);
    assert_eq!(reparsed.end_time(nodes[1]).unwrap(), UNSET_TIME);
}

/// Test the empty document
#[test]
fn test_empty_shouldWriteEmptyDiv() {
    let doc = CaptionDocument::empty("fr");
    let written = doc.to_xml_string();
    assert!(written.contains("<div/>"));
    assert!(written.contains(r#"xml:id="amara-style""#));
    assert!(CaptionDocument::parse(&written).unwrap().is_empty());
    assert!(empty_dfxp("fr").contains(r#"xml:lang="fr""#));
}

/// Test that moving a node keeps its attributes
#[test]
fn test_moveCaption_shouldKeepNodeData() {
    let mut doc = CaptionDocument::empty("en");
    let a = doc.add_caption(Placement::Back, NodeAttrs::default(), "a").unwrap();
    let b = doc.add_caption(Placement::Back, NodeAttrs::default(), "b").unwrap();
    doc.set_region(a, Some(Region::Top)).unwrap();

    doc.move_caption(a, Placement::Back).unwrap();
    assert_eq!(doc.nodes(), vec![b, a]);
    assert_eq!(doc.region(a).unwrap(), Some(Region::Top));
    assert_eq!(doc.position(a).unwrap(), 1);
}

/// Test operations on a removed node
#[test]
fn test_operations_withRemovedNode_shouldFail() {
    let mut doc = CaptionDocument::empty("en");
    let a = doc.add_caption(Placement::Back, NodeAttrs::default(), "a").unwrap();
    doc.remove_caption(a).unwrap();

    assert!(!doc.contains(a));
    assert_eq!(doc.text(a), Err(DocumentError::UnknownNode(a)));
    assert!(doc.add_caption(Placement::After(a), NodeAttrs::default(), "b").is_err());
    assert!(doc.is_empty());
}

use quick_xml::escape::escape;
use std::fmt::Write;

use crate::markup;

use super::model::{CaptionDocument, CaptionNode};
use super::timing::format_time_expression;

// @module: DFXP serialization

fn write_caption(out: &mut String, node: &CaptionNode) {
    out.push_str("            <p");
    if node.begin >= 0.0 {
        let _ = write!(out, r#" begin="{}""#, format_time_expression(node.begin));
    }
    if node.end >= 0.0 {
        let _ = write!(out, r#" end="{}""#, format_time_expression(node.end));
    }
    if let Some(region) = node.region {
        let _ = write!(out, r#" region="{}""#, region);
    }
    let _ = writeln!(out, ">{}</p>", markup::to_dfxp(&node.text));
}

impl CaptionDocument {
    /// Serialize the document as DFXP.
    ///
    /// Each caption that starts a paragraph opens a new `<div>`; the first
    /// caption always opens one.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();

        out.push_str("<tt");
        for (key, value) in &self.root_attributes {
            let _ = write!(out, r#" {}="{}""#, key, escape(value.as_str()));
        }
        out.push_str(">\n");

        let _ = writeln!(out, "    {}", self.head.trim());

        match &self.body_region {
            Some(region) => {
                let _ = writeln!(out, r#"    <body region="{}">"#, escape(region.as_str()));
            }
            None => out.push_str("    <body>\n"),
        }

        if self.nodes.is_empty() {
            out.push_str("        <div/>\n");
        } else {
            for (index, node) in self.nodes.iter().enumerate() {
                if index > 0 && node.start_of_paragraph {
                    out.push_str("        </div>\n");
                }
                if index == 0 || node.start_of_paragraph {
                    out.push_str("        <div>\n");
                }
                write_caption(&mut out, node);
            }
            out.push_str("        </div>\n");
        }

        out.push_str("    </body>\n</tt>\n");
        out
    }
}

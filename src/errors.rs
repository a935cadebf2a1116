/*!
 * Error types for the subedit library.
 *
 * This module contains custom error types for the different layers of the
 * caption editor, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

use crate::caption::CaptionId;
use crate::document::NodeId;

/// Errors raised by the caption document store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The document text is not a usable caption document
    #[error("Failed to parse caption document: {0}")]
    Parse(String),

    /// The underlying XML reader rejected the input
    #[error("Malformed XML: {0}")]
    Xml(String),

    /// A begin/end attribute could not be read as a time expression
    #[error("Invalid time expression: {0}")]
    InvalidTime(String),

    /// A node handle that the document does not (or no longer) contain
    #[error("Unknown document node: {0:?}")]
    UnknownNode(NodeId),
}

impl From<quick_xml::Error> for DocumentError {
    fn from(error: quick_xml::Error) -> Self {
        Self::Xml(error.to_string())
    }
}

/// Errors raised by the caption timeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    /// Error from the document store
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// The caption is not part of this timeline
    #[error("Caption {0} is not in the timeline")]
    UnknownCaption(CaptionId),

    /// Language code rejected when creating an empty document
    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),
}

/// Errors raised by the edit session
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// A draft is already open; only one edit can run at a time
    #[error("An edit of caption {0} is already in progress")]
    AlreadyEditing(CaptionId),

    /// The caption the draft was taken from has been removed
    #[error("Caption {0} was removed while it was being edited")]
    SourceRemoved(CaptionId),

    /// Error from the timeline while committing
    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),
}

//! YAML event stream consumed by the router.
//!
//! The router only needs a flat, pull-based sequence of events with a source
//! line attached. [`EventSource`] is that seam; [`SaphyrEvents`] implements
//! it on top of `saphyr-parser`.

use saphyr_parser::{Event, Parser, ScanError, Span, Tag};

use crate::error::{ParamError, Result};

/// How a scalar was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum::Display)]
pub enum ScalarStyle {
    #[default]
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

impl ScalarStyle {
    pub fn is_quoted(self) -> bool {
        matches!(self, Self::SingleQuoted | Self::DoubleQuoted)
    }
}

/// A scalar event payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scalar {
    pub value: String,
    pub style: ScalarStyle,
    /// Resolved tag, e.g. `tag:yaml.org,2002:str`.
    pub tag: Option<String>,
}

impl Scalar {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn quoted(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            style: ScalarStyle::DoubleQuoted,
            tag: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, strum::Display)]
pub enum YamlEvent {
    /// Produced when the tokenizer has nothing left to report.
    NoEvent,
    StreamStart,
    StreamEnd,
    DocumentStart,
    DocumentEnd,
    Alias,
    Scalar(Scalar),
    SequenceStart,
    SequenceEnd,
    MappingStart,
    MappingEnd,
}

/// An event with the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkedEvent {
    pub event: YamlEvent,
    pub line: usize,
}

impl MarkedEvent {
    pub fn new(event: YamlEvent, line: usize) -> Self {
        Self { event, line }
    }
}

/// A pull-based producer of YAML events.
pub trait EventSource {
    fn next_event(&mut self) -> Result<MarkedEvent>;
}

type SaphyrItem<'input> = std::result::Result<(Event<'input>, Span), ScanError>;

/// [`EventSource`] backed by `saphyr_parser::Parser`.
pub struct SaphyrEvents<'input> {
    inner: Box<dyn Iterator<Item = SaphyrItem<'input>> + 'input>,
    line: usize,
}

impl<'input> SaphyrEvents<'input> {
    pub fn new(input: &'input str) -> Self {
        Self {
            inner: Box::new(Parser::new_from_str(input)),
            line: 0,
        }
    }
}

impl std::fmt::Debug for SaphyrEvents<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaphyrEvents").field("line", &self.line).finish()
    }
}

fn scalar_style(style: saphyr_parser::ScalarStyle) -> ScalarStyle {
    match style {
        saphyr_parser::ScalarStyle::SingleQuoted => ScalarStyle::SingleQuoted,
        saphyr_parser::ScalarStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
        saphyr_parser::ScalarStyle::Literal => ScalarStyle::Literal,
        saphyr_parser::ScalarStyle::Folded => ScalarStyle::Folded,
        #[allow(unreachable_patterns)]
        _ => ScalarStyle::Plain,
    }
}

fn tag_name(tag: &Tag) -> String {
    format!("{}{}", tag.handle, tag.suffix)
}

impl EventSource for SaphyrEvents<'_> {
    fn next_event(&mut self) -> Result<MarkedEvent> {
        let Some(item) = self.inner.next() else {
            return Ok(MarkedEvent::new(YamlEvent::NoEvent, self.line));
        };
        let (event, span) = item.map_err(|e| {
            ParamError::Parse(format!(
                "Error parsing a event near line {}: {}",
                e.marker().line().max(self.line),
                e
            ))
        })?;
        self.line = span.start.line();

        let event = match event {
            Event::Nothing => YamlEvent::NoEvent,
            Event::StreamStart => YamlEvent::StreamStart,
            Event::StreamEnd => YamlEvent::StreamEnd,
            Event::DocumentStart(..) => YamlEvent::DocumentStart,
            Event::DocumentEnd => YamlEvent::DocumentEnd,
            Event::Alias(..) => YamlEvent::Alias,
            Event::SequenceStart(..) => YamlEvent::SequenceStart,
            Event::SequenceEnd => YamlEvent::SequenceEnd,
            Event::MappingStart(..) => YamlEvent::MappingStart,
            Event::MappingEnd => YamlEvent::MappingEnd,
            Event::Scalar(value, style, _anchor, tag) => {
                let style = scalar_style(style);
                let value = String::from(value);
                // A missing value comes through as a zero-width `~`.
                let absent = style == ScalarStyle::Plain
                    && value == "~"
                    && span.start.index() == span.end.index();
                YamlEvent::Scalar(Scalar {
                    value: if absent { String::new() } else { value },
                    style,
                    tag: tag.as_ref().map(|t| tag_name(t)),
                })
            }
        };
        tracing::trace!("line {}: {:?}", self.line, event);
        Ok(MarkedEvent::new(event, self.line))
    }
}

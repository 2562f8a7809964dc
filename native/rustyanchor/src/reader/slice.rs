//! Zero-Copy Slice Reader
//!
//! Lenient pull parser over a `&str`. Markup names and raw sections are
//! borrowed from the input; text is borrowed unless it contained entities.
//! Input that cannot be tokenized (an unterminated comment, an unclosed tag)
//! ends the event stream rather than failing, and a stray `<` that does not
//! open markup is reported as text.

use std::borrow::Cow;

use super::events::{EndElement, StartElement, XmlEvent};
use crate::core::entities::decode_text;
use crate::core::scanner::Scanner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    Init,
    Content,
    Done,
}

/// Outcome of one tokenizing step
enum Step<'a> {
    Event(XmlEvent<'a>),
    /// Markup consumed without producing an event
    Skip,
}

/// Zero-copy reader over document source
pub struct SliceReader<'a> {
    scanner: Scanner<'a>,
    state: ReaderState,
}

impl<'a> SliceReader<'a> {
    pub fn new(input: &'a str) -> Self {
        SliceReader {
            scanner: Scanner::new(input),
            state: ReaderState::Init,
        }
    }

    /// Get the next event
    pub fn next_event(&mut self) -> Option<XmlEvent<'a>> {
        match self.state {
            ReaderState::Done => return None,
            ReaderState::Init => {
                // Leading document whitespace carries no content
                self.scanner.skip_whitespace();
                self.state = ReaderState::Content;
            }
            ReaderState::Content => {}
        }

        loop {
            if self.scanner.is_eof() {
                self.state = ReaderState::Done;
                return Some(XmlEvent::EndDocument);
            }

            let step = match self.scanner.peek() {
                Some(b'<') => self.parse_markup(),
                _ => Some(Step::Event(self.parse_text())),
            };

            match step {
                Some(Step::Event(event)) => return Some(event),
                Some(Step::Skip) => continue,
                None => {
                    self.state = ReaderState::Done;
                    return Some(XmlEvent::EndDocument);
                }
            }
        }
    }

    /// Parse markup starting with '<'
    fn parse_markup(&mut self) -> Option<Step<'a>> {
        let start = self.scanner.position();
        self.scanner.advance(1);

        match self.scanner.peek() {
            Some(b'/') => self.parse_end_tag(start).map(Step::Event),
            Some(b'!') => self.parse_bang_markup(),
            Some(b'?') => self.parse_pi(start).map(Step::Event),
            _ => match self.scanner.read_name() {
                Some(name) => self.parse_start_tag(name).map(Step::Event),
                None => Some(Step::Event(XmlEvent::Text(Cow::Borrowed(
                    self.scanner.slice(start, start + 1),
                )))),
            },
        }
    }

    fn parse_start_tag(&mut self, name: &'a str) -> Option<XmlEvent<'a>> {
        let end = self.scanner.find_tag_end_quoted()?;
        let is_empty = self.scanner.slice(self.scanner.position(), end).ends_with('/');
        self.scanner.set_position(end + 1);

        let elem = StartElement::new(name);
        Some(if is_empty {
            XmlEvent::EmptyElement(elem)
        } else {
            XmlEvent::StartElement(elem)
        })
    }

    fn parse_end_tag(&mut self, start: usize) -> Option<XmlEvent<'a>> {
        self.scanner.advance(1);

        match self.scanner.read_name() {
            Some(name) => {
                let end = self.scanner.find_tag_end_quoted()?;
                self.scanner.set_position(end + 1);
                Some(XmlEvent::EndElement(EndElement::new(name)))
            }
            None => Some(XmlEvent::Text(Cow::Borrowed(self.scanner.slice(start, start + 2)))),
        }
    }

    /// Parse markup starting with '!' (comment, CDATA, DOCTYPE, other declarations)
    fn parse_bang_markup(&mut self) -> Option<Step<'a>> {
        self.scanner.advance(1);

        if self.scanner.starts_with("--") {
            self.scanner.advance(2);
            let content = self.read_until("-->")?;
            Some(Step::Event(XmlEvent::Comment(content)))
        } else if self.scanner.starts_with("[CDATA[") {
            self.scanner.advance(7);
            let content = self.read_until("]]>")?;
            Some(Step::Event(XmlEvent::CData(content)))
        } else if self.scanner.starts_with("DOCTYPE") || self.scanner.starts_with("doctype") {
            self.scanner.advance(7);
            self.parse_doctype().map(Step::Event)
        } else {
            // <!ELEMENT ...> and friends outside a DOCTYPE carry no content
            let end = self.scanner.find_tag_end_quoted()?;
            self.scanner.set_position(end + 1);
            Some(Step::Skip)
        }
    }

    fn parse_doctype(&mut self) -> Option<XmlEvent<'a>> {
        self.scanner.skip_whitespace();
        let name = self.scanner.read_name().unwrap_or("");

        let tag_end = self.scanner.find_tag_end_quoted()?;
        let subset_open = self.scanner.find_str("[").filter(|&open| open < tag_end);

        let end = match subset_open {
            Some(open) => {
                self.scanner.set_position(open);
                let close = self.scanner.find_str("]")?;
                self.scanner.set_position(close);
                self.scanner.find_tag_end_quoted()?
            }
            None => tag_end,
        };

        self.scanner.set_position(end + 1);
        Some(XmlEvent::DocType { name })
    }

    fn parse_pi(&mut self, start: usize) -> Option<XmlEvent<'a>> {
        self.scanner.advance(1);

        let Some(target) = self.scanner.read_name() else {
            return Some(XmlEvent::Text(Cow::Borrowed(self.scanner.slice(start, start + 2))));
        };
        let data = self.read_until("?>")?;

        if target.eq_ignore_ascii_case("xml") {
            return Some(XmlEvent::XmlDeclaration);
        }

        let data = data.trim_start_matches([' ', '\t', '\n', '\r']);
        Some(XmlEvent::ProcessingInstruction { target, data })
    }

    fn parse_text(&mut self) -> XmlEvent<'a> {
        let start = self.scanner.position();
        let end = self.scanner.find_tag_start().unwrap_or(self.scanner.end());

        self.scanner.set_position(end);
        XmlEvent::Text(decode_text(self.scanner.slice(start, end)))
    }

    /// Consume up to and including `terminator`, returning the content before it
    fn read_until(&mut self, terminator: &str) -> Option<&'a str> {
        let content_start = self.scanner.position();
        let pos = self.scanner.find_str(terminator)?;
        self.scanner.set_position(pos + terminator.len());
        Some(self.scanner.slice(content_start, pos))
    }
}

impl<'a> Iterator for SliceReader<'a> {
    type Item = XmlEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_event()? {
            XmlEvent::EndDocument => None,
            event => Some(event),
        }
    }
}

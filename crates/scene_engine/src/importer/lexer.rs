//! Pull lexer for the nested-element scene description markup
//!
//! Produces a flat stream of [`MarkupEvent`]s: start tags with their
//! attributes, end tags, and non-whitespace character data. Comments and the
//! `<?xml ?>` prolog are skipped; self-closing tags emit a start event
//! followed by the matching end event. The lexer tracks line numbers for
//! diagnostics but leaves nesting validation to the tree builder.

use crate::importer::ImportError;

/// One lexical event from the scene description.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupEvent {
    /// `<name attr="value" ...>`; also emitted for the self-closing form,
    /// immediately followed by the matching [`MarkupEvent::End`].
    Start {
        /// Element name.
        name: String,
        /// Attributes in document order.
        attrs: Vec<(String, String)>,
    },
    /// `</name>`
    End {
        /// Element name.
        name: String,
    },
    /// Non-whitespace character data between tags, edge-trimmed.
    Text(String),
}

pub(crate) struct MarkupLexer<'s> {
    src: &'s str,
    pos: usize,
    line: usize,
    pending_end: Option<String>,
}

impl<'s> MarkupLexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            pending_end: None,
        }
    }

    /// 1-based line of the current read position.
    pub fn line(&self) -> usize {
        self.line
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.src[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn err(&self, msg: impl Into<String>) -> ImportError {
        ImportError::Malformed(format!("line {}: {}", self.line, msg.into()))
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    /// Advance past the next occurrence of `delim`.
    fn skip_past(&mut self, delim: &str) -> Result<(), ImportError> {
        loop {
            if self.src[self.pos..].starts_with(delim) {
                for _ in 0..delim.chars().count() {
                    self.advance();
                }
                return Ok(());
            }
            if self.advance().is_none() {
                return Err(self.err(format!("unterminated section, expected `{delim}`")));
            }
        }
    }

    fn lex_name(&mut self) -> Result<String, ImportError> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':') {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.err("expected a name"));
        }
        Ok(name)
    }

    fn lex_attr_value(&mut self) -> Result<String, ImportError> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.err("expected a quoted attribute value")),
        };
        self.advance();
        let mut value = String::new();
        loop {
            match self.advance() {
                None => return Err(self.err("unterminated attribute value")),
                Some(c) if c == quote => break,
                Some(c) => value.push(c),
            }
        }
        Ok(value)
    }

    fn lex_end_tag(&mut self) -> Result<MarkupEvent, ImportError> {
        self.advance(); // consume `/`
        let name = self.lex_name()?;
        self.skip_whitespace();
        match self.advance() {
            Some('>') => Ok(MarkupEvent::End { name }),
            _ => Err(self.err(format!("malformed closing tag `</{name}`"))),
        }
    }

    fn lex_start_tag(&mut self) -> Result<MarkupEvent, ImportError> {
        let name = self.lex_name()?;
        let mut attrs = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('>') => {
                    self.advance();
                    return Ok(MarkupEvent::Start { name, attrs });
                }
                Some('/') => {
                    self.advance();
                    if self.advance() != Some('>') {
                        return Err(self.err("expected `>` after `/`"));
                    }
                    self.pending_end = Some(name.clone());
                    return Ok(MarkupEvent::Start { name, attrs });
                }
                Some(_) => {
                    let key = self.lex_name()?;
                    self.skip_whitespace();
                    if self.advance() != Some('=') {
                        return Err(self.err(format!("attribute `{key}` is missing `=`")));
                    }
                    self.skip_whitespace();
                    let value = self.lex_attr_value()?;
                    attrs.push((key, value));
                }
                None => return Err(self.err(format!("unterminated tag `<{name}`"))),
            }
        }
    }

    /// Next event, or `None` at end of input.
    pub fn next_event(&mut self) -> Result<Option<MarkupEvent>, ImportError> {
        if let Some(name) = self.pending_end.take() {
            return Ok(Some(MarkupEvent::End { name }));
        }
        loop {
            // character data runs up to the next tag
            let start = self.pos;
            while matches!(self.peek(), Some(c) if c != '<') {
                self.advance();
            }
            let text = self.src[start..self.pos].trim();
            if !text.is_empty() {
                return Ok(Some(MarkupEvent::Text(text.to_string())));
            }
            if self.peek().is_none() {
                return Ok(None);
            }
            self.advance(); // consume `<`
            match self.peek() {
                Some('?') => self.skip_past("?>")?,
                Some('!') => self.skip_past("-->")?,
                Some('/') => return self.lex_end_tag().map(Some),
                Some(_) => return self.lex_start_tag().map(Some),
                None => return Err(self.err("dangling `<` at end of input")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_events(src: &str) -> Vec<MarkupEvent> {
        let mut lexer = MarkupLexer::new(src);
        let mut events = Vec::new();
        while let Some(event) = lexer.next_event().unwrap() {
            events.push(event);
        }
        events
    }

    #[test]
    fn tags_attributes_and_text() {
        let events = all_events(r#"<scene><group name="a">1.0 2.0</group></scene>"#);
        assert_eq!(
            events,
            vec![
                MarkupEvent::Start { name: "scene".into(), attrs: vec![] },
                MarkupEvent::Start {
                    name: "group".into(),
                    attrs: vec![("name".into(), "a".into())],
                },
                MarkupEvent::Text("1.0 2.0".into()),
                MarkupEvent::End { name: "group".into() },
                MarkupEvent::End { name: "scene".into() },
            ]
        );
    }

    #[test]
    fn self_closing_emits_start_then_end() {
        let events = all_events(r#"<image name="tex" path="a.png"/>"#);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], MarkupEvent::Start { name, .. } if name == "image"));
        assert!(matches!(&events[1], MarkupEvent::End { name } if name == "image"));
    }

    #[test]
    fn comments_and_prolog_are_skipped() {
        let events = all_events(
            "<?xml version=\"1.0\"?>\n<!-- a comment -->\n<scene></scene>",
        );
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn whitespace_only_text_is_dropped() {
        let events = all_events("<scene>\n\t  \n</scene>");
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn errors_carry_line_numbers() {
        let mut lexer = MarkupLexer::new("<scene>\n<group name=></scene>");
        lexer.next_event().unwrap();
        let err = lexer.next_event().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 2"), "unexpected message: {msg}");
    }

    #[test]
    fn single_quoted_attributes() {
        let events = all_events("<object name='o' instanceof='box'></object>");
        assert!(matches!(
            &events[0],
            MarkupEvent::Start { attrs, .. } if attrs.len() == 2 && attrs[1].1 == "box"
        ));
    }
}

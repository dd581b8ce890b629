/*
 * Copyright (c) 2021 gematik GmbH
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *    http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 *
 */

use std::str::{from_utf8, FromStr};

use quick_xml::{
    events::{BytesStart, BytesText, Event},
    Reader,
};

use super::{Attribute, Element, Error, Node};

/* Document */

/// Parsed XML document with a single root element.
///
/// The parser keeps attributes in source order, retains comments and treats
/// CDATA sections as text. Character and predefined entity references are
/// expanded while building the tree. Processing instructions and doctypes
/// that declare entities or attribute lists are rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Element,
}

impl Document {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        from_utf8(bytes)?.parse()
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_start_matches('\u{feff}');

        let mut reader = Reader::from_str(s);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event(&mut buf)? {
                Event::Start(start) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(Error::MultipleRootElements);
                    }

                    let element = read_element(&reader, &start)?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = read_element(&reader, &start)?;
                    close_element(element, &mut stack, &mut root)?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or(Error::UnexpectedEndTag)?;
                    close_element(element, &mut stack, &mut root)?;
                }
                Event::Text(text) => match stack.last_mut() {
                    Some(parent) => {
                        let text = read_text(&reader, &text)?;
                        parent.children.push(Node::Text(text));
                    }
                    None => {
                        let raw = reader.decode(&text)?;
                        if !raw.chars().all(char::is_whitespace) {
                            return Err(Error::ContentOutsideRoot);
                        }
                    }
                },
                Event::CData(text) => {
                    let parent = stack.last_mut().ok_or(Error::ContentOutsideRoot)?;

                    // CDATA content is literal, only line endings are normalized
                    let text = normalize_line_endings(reader.decode(&text)?);
                    parent.children.push(Node::Text(text));
                }
                Event::Comment(text) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = normalize_line_endings(reader.decode(&text)?);
                        parent.children.push(Node::Comment(text));
                    }
                }
                Event::Decl(_) => (),
                Event::DocType(text) => {
                    let text = reader.decode(&text)?.to_uppercase();
                    if text.contains("<!ENTITY") {
                        return Err(Error::EntityDeclaration);
                    }
                    if text.contains("<!ATTLIST") {
                        return Err(Error::AttlistDeclaration);
                    }
                }
                Event::PI(_) => return Err(Error::ProcessingInstruction),
                Event::Eof => break,
            }

            buf.clear();
        }

        if !stack.is_empty() {
            return Err(Error::UnexpectedEndOfDocument);
        }

        let root = root.ok_or(Error::MissingRootElement)?;

        Ok(Document { root })
    }
}

fn close_element(
    element: Element,
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
) -> Result<(), Error> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Element(element));

            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);

            Ok(())
        }
        None => Err(Error::MultipleRootElements),
    }
}

fn read_element(reader: &Reader<&[u8]>, start: &BytesStart) -> Result<Element, Error> {
    let name = reader.decode(start.name())?;
    let (prefix, local) = split_name(name);
    let mut element = Element::new(prefix, local);

    for attribute in start.attributes() {
        let attribute = attribute?;

        let key = reader.decode(attribute.key)?;
        let (prefix, local) = split_name(key);
        let value = read_attribute_value(reader, &attribute.value)?;

        element.attributes.push(Attribute::new(prefix, local, value));
    }

    Ok(element)
}

fn split_name(name: &str) -> (&str, &str) {
    match name.find(':') {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => ("", name),
    }
}

/// Expands a raw text node. Line-ending normalization applies to literal
/// characters only, so it runs before the references are expanded: `&#xD;`
/// stays a carriage return while a literal one becomes a line feed.
fn read_text(reader: &Reader<&[u8]>, text: &[u8]) -> Result<String, Error> {
    let mut raw = Vec::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        match text[i] {
            b'\r' => {
                raw.push(b'\n');
                if text.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            b => raw.push(b),
        }

        i += 1;
    }

    let binding = BytesText::from_escaped(raw);
    let unescaped = binding.unescaped()?;
    let text = reader.decode(&unescaped)?;

    Ok(text.to_owned())
}

/// Expands a raw attribute value. Literal tabs, line feeds and carriage
/// returns become spaces; whitespace produced by character references keeps
/// its code point.
fn read_attribute_value(reader: &Reader<&[u8]>, value: &[u8]) -> Result<String, Error> {
    let mut raw = Vec::with_capacity(value.len());
    let mut i = 0;
    while i < value.len() {
        match value[i] {
            b'\r' => {
                raw.push(b' ');
                if value.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\n' | b'\t' => raw.push(b' '),
            b => raw.push(b),
        }

        i += 1;
    }

    let binding = BytesText::from_escaped(raw);
    let unescaped = binding.unescaped()?;
    let value = reader.decode(&unescaped)?;

    Ok(value.to_owned())
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

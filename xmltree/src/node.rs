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

/* Attribute */

/// Attribute of an element. The identity of an attribute within its element
/// is the pair `(prefix, local)`; the display name (e.g. `xmlns:ietf` or
/// `Algorithm`) is only rendered during serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub(crate) prefix: String,
    pub(crate) local: String,
    pub(crate) value: String,
}

impl Attribute {
    pub fn new<P, L, V>(prefix: P, local: L, value: V) -> Self
    where
        P: Into<String>,
        L: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            local: local.into(),
            value: value.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn identity(&self) -> (&str, &str) {
        (&self.prefix, &self.local)
    }

    /// Display form of the attribute name.
    pub fn name(&self) -> String {
        if self.prefix.is_empty() {
            self.local.clone()
        } else {
            format!("{}:{}", self.prefix, self.local)
        }
    }

    /// `xmlns:prefix="uri"` or the default declaration `xmlns="uri"`.
    pub fn is_namespace_declaration(&self) -> bool {
        self.prefix == "xmlns" || (self.prefix.is_empty() && self.local == "xmlns")
    }

    /// Not a namespace declaration and carries no prefix.
    pub fn is_unqualified(&self) -> bool {
        !self.is_namespace_declaration() && self.prefix.is_empty()
    }
}

/* Node */

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

/* Element */

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub(crate) prefix: String,
    pub(crate) local: String,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) children: Vec<Node>,
}

impl Element {
    pub(crate) fn new<P, L>(prefix: P, local: L) -> Self
    where
        P: Into<String>,
        L: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            local: local.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    /// Display form of the element name.
    pub fn name(&self) -> String {
        if self.prefix.is_empty() {
            self.local.clone()
        } else {
            format!("{}:{}", self.prefix, self.local)
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, prefix: &str, local: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attr| attr.identity() == (prefix, local))
    }

    pub fn namespace_declarations(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes
            .iter()
            .filter(|attr| attr.is_namespace_declaration())
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Immediate child elements with the given local name, in document order.
    pub fn select_elements(&self, local: &str) -> Vec<&Element> {
        self.child_elements()
            .filter(|element| element.local == local)
            .collect()
    }

    /// This element and its descendants with the given local name, in
    /// document order. Matching ignores prefixes and namespaces.
    pub fn find_elements(&self, local: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_elements(local, &mut found);

        found
    }

    fn collect_elements<'a>(&'a self, local: &str, found: &mut Vec<&'a Element>) {
        if self.local == local {
            found.push(self);
        }

        for child in self.child_elements() {
            child.collect_elements(local, found);
        }
    }

    /// Character data of the immediate text children, concatenated.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            if let Node::Text(t) = child {
                text.push_str(t);
            }
        }

        text
    }

    /// Removes the first strict descendant with the given local name from its
    /// parent. Returns whether a descendant was removed.
    pub fn remove_descendant(&mut self, local: &str) -> bool {
        for i in 0..self.children.len() {
            if let Node::Element(child) = &mut self.children[i] {
                if child.local == local {
                    self.children.remove(i);

                    return true;
                }

                if child.remove_descendant(local) {
                    return true;
                }
            }
        }

        false
    }
}

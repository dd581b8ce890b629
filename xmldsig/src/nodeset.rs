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

use bytes::Bytes;

use xmltree::{Attribute, Document, Element};

use crate::Error;

/* NodeSet */

/// Data flowing through a transform chain: either an octet stream or a node
/// set. A node set detached from its document carries the nearest namespace
/// declaration per identity that an ancestor has in force at its apex, so
/// canonicalization can restore the namespace context later without keeping
/// the source tree alive.
#[derive(Debug, Clone)]
pub enum NodeSet {
    Octets(Bytes),
    Tree {
        root: Element,
        inherited: Vec<Attribute>,
    },
}

impl NodeSet {
    pub fn from_document(document: Document) -> Self {
        Self::Tree {
            root: document.into_root(),
            inherited: Vec::new(),
        }
    }

    pub fn from_subtree(root: Element, inherited: Vec<Attribute>) -> Self {
        Self::Tree { root, inherited }
    }

    pub fn is_octet_stream(&self) -> bool {
        matches!(self, Self::Octets(_))
    }

    /// Octet streams are parsed on demand. A node set parsed from octets has
    /// no ancestors and inherits nothing.
    pub fn into_tree(self) -> Result<(Element, Vec<Attribute>), Error> {
        match self {
            Self::Octets(octets) => {
                let document = Document::from_bytes(&octets)?;

                Ok((document.into_root(), Vec::new()))
            }
            Self::Tree { root, inherited } => Ok((root, inherited)),
        }
    }
}

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

use std::collections::HashSet;

use xmltree::{Attribute, Document, Element};

use crate::{Error, NodeSet, NODE_SIGNATURE, PROP_ID};

/// Resolves the `URI` attribute of a `Reference` element to a node set.
///
/// The empty URI selects the whole document. A fragment URI (`#id`) selects
/// the one descendant whose `Id` attribute matches; the namespace
/// declarations its ancestors have in force travel with the node set.
/// External URIs are not resolved.
pub fn dereference(document: &Document, uri: &str) -> Result<NodeSet, Error> {
    if uri.is_empty() {
        return Ok(NodeSet::from_subtree(document.root().clone(), Vec::new()));
    }

    if let Some(id) = uri.strip_prefix('#') {
        let mut hits = search(document.root(), &|element: &Element| {
            element.attribute("", PROP_ID).map(Attribute::value) == Some(id)
        });

        if hits.len() > 1 {
            return Err(Error::AmbiguousReference(uri.to_owned()));
        }

        return match hits.pop() {
            Some((element, inherited)) => Ok(NodeSet::from_subtree(element.clone(), inherited)),
            None => Err(Error::ReferenceNotFound(uri.to_owned())),
        };
    }

    Err(Error::UnsupportedUri(uri.to_owned()))
}

/// Locates the single `Signature` element of the document. Matching is by
/// local name only, like the rest of the signature-node lookups. Returns the
/// element together with the namespace declarations in force at it.
pub(crate) fn find_signature(document: &Document) -> Result<(&Element, Vec<Attribute>), Error> {
    let mut hits = search(document.root(), &|element: &Element| {
        element.local() == NODE_SIGNATURE
    });

    if hits.len() > 1 {
        return Err(Error::InvalidSignatureNode(
            "found more than one Signature element".into(),
        ));
    }

    hits.pop().ok_or(Error::SignatureNodeNotFound)
}

/// Matching elements of the subtree (the root included), in document order,
/// each with the namespace declarations its strict ancestors have in force.
fn search<'a, P>(root: &'a Element, predicate: &P) -> Vec<(&'a Element, Vec<Attribute>)>
where
    P: Fn(&Element) -> bool,
{
    let mut ancestors = Vec::new();
    let mut hits = Vec::new();
    search_element(root, predicate, &mut ancestors, &mut hits);

    hits
}

fn search_element<'a, P>(
    element: &'a Element,
    predicate: &P,
    ancestors: &mut Vec<&'a Element>,
    hits: &mut Vec<(&'a Element, Vec<Attribute>)>,
) where
    P: Fn(&Element) -> bool,
{
    if predicate(element) {
        hits.push((element, collect_inherited(ancestors)));
    }

    ancestors.push(element);
    for child in element.child_elements() {
        search_element(child, predicate, ancestors, hits);
    }
    ancestors.pop();
}

/// Nearest declaration per identity, walking from the closest ancestor
/// outward.
fn collect_inherited(ancestors: &[&Element]) -> Vec<Attribute> {
    let mut seen = HashSet::new();
    let mut inherited = Vec::new();

    for ancestor in ancestors.iter().rev() {
        for declaration in ancestor.namespace_declarations() {
            let identity = (
                declaration.prefix().to_owned(),
                declaration.local().to_owned(),
            );

            if seen.insert(identity) {
                inherited.push(declaration.clone());
            }
        }
    }

    inherited
}

/// Extends an inherited namespace context by one level: the element's own
/// declarations shadow the ones from above.
pub(crate) fn extend_inherited(element: &Element, inherited: &[Attribute]) -> Vec<Attribute> {
    let mut extended: Vec<Attribute> = element.namespace_declarations().cloned().collect();

    for attribute in inherited {
        let shadowed = extended
            .iter()
            .any(|declaration| declaration.identity() == attribute.identity());

        if !shadowed {
            extended.push(attribute.clone());
        }
    }

    extended
}

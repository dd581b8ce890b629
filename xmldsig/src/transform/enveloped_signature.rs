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

use crate::{Error, NodeSet, NODE_SIGNATURE};

/// Removes the first descendant `Signature` element from its parent.
/// Matching is by local name only. A node set without a `Signature`
/// descendant, or whose apex is the `Signature` element itself, passes
/// through unchanged.
pub(super) fn remove_signature(input: NodeSet) -> Result<NodeSet, Error> {
    let (mut root, inherited) = input.into_tree()?;

    if root.local() != NODE_SIGNATURE {
        root.remove_descendant(NODE_SIGNATURE);
    }

    Ok(NodeSet::from_subtree(root, inherited))
}

#[cfg(test)]
mod tests {
    use super::super::canonical_octets;
    use super::*;

    use xmltree::Document;

    fn transform_str(xml: &str) -> String {
        let document: Document = xml.parse().unwrap();
        let output = remove_signature(NodeSet::from_document(document)).unwrap();
        let octets = canonical_octets(output).unwrap();

        String::from_utf8(octets.to_vec()).unwrap()
    }

    #[test]
    fn does_nothing_without_a_signature_element() {
        let xml = "<a><aa><aaa></aaa></aa><ab><aba></aba><abb></abb></ab></a>";

        assert_eq!(transform_str(xml), xml);
    }

    #[test]
    fn removes_the_contained_signature_element() {
        let actual = transform_str(
            "<a><aa><aaa></aaa></aa><ab><aba></aba><abb><ds:Signature></ds:Signature></abb></ab></a>",
        );

        assert_eq!(
            actual,
            "<a><aa><aaa></aaa></aa><ab><aba></aba><abb></abb></ab></a>"
        );
    }

    #[test]
    fn removes_only_the_first_signature_element() {
        let actual = transform_str(
            "<a><Signature>1</Signature><b><Signature>2</Signature></b></a>",
        );

        assert_eq!(actual, "<a><b><Signature>2</Signature></b></a>");
    }

    #[test]
    fn keeps_an_apex_signature_element() {
        let xml = "<Signature><SignedInfo></SignedInfo></Signature>";

        assert_eq!(transform_str(xml), xml);
    }
}

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

use std::collections::HashMap;

use super::{Attribute, Element, Error, Node};

/// Namespace declarations in force at some point of the tree, keyed by the
/// attribute identity (`("xmlns", prefix)` or `("", "xmlns")`).
type Scope = HashMap<(String, String), String>;

/// Canonical XML 1.0 (omitting comments) of the subtree rooted at `element`.
///
/// `inherited` carries the nearest namespace declaration per identity that an
/// ancestor has in force at the element; pass an empty slice when the element
/// is the document root. The input is never mutated, the canonicalization
/// works on a deep copy.
///
/// Documents using an empty default namespace declaration (`xmlns=""`) are
/// not supported and are rejected instead of producing non-conformant bytes.
pub fn canonicalize(element: &Element, inherited: &[Attribute]) -> Result<Vec<u8>, Error> {
    let mut apex = element.clone();
    propagate_inherited(&mut apex, inherited);

    transform_element(&mut apex, &Scope::new())?;

    let mut output = Vec::new();
    write_element(&apex, &mut output);

    Ok(output)
}

/// A detached subtree keeps its meaning only if the namespace context of its
/// ancestors is materialized on the apex. Declarations the apex redeclares
/// itself win over inherited ones.
fn propagate_inherited(apex: &mut Element, inherited: &[Attribute]) {
    for attribute in inherited {
        if !attribute.is_namespace_declaration() {
            continue;
        }

        if apex.attribute(&attribute.prefix, &attribute.local).is_none() {
            apex.attributes.push(attribute.clone());
        }
    }
}

/// Removes namespace declarations already in force with the same value,
/// removes comments and sorts attributes, recursing through the subtree.
/// The apex is called with an empty scope, which exempts its declarations
/// from the redundancy pruning.
fn transform_element(element: &mut Element, in_force: &Scope) -> Result<(), Error> {
    let mut scope = in_force.clone();

    let mut attributes = Vec::with_capacity(element.attributes.len());
    for attribute in element.attributes.drain(..) {
        if !attribute.is_namespace_declaration() {
            attributes.push(attribute);
            continue;
        }

        if attribute.prefix.is_empty() && attribute.value.is_empty() {
            return Err(Error::EmptyDefaultNamespace);
        }

        let identity = (attribute.prefix.clone(), attribute.local.clone());
        match in_force.get(&identity) {
            // an ancestor already declares the same prefix with the same
            // value, the declaration is redundant
            Some(value) if *value == attribute.value => (),
            _ => {
                scope.insert(identity, attribute.value.clone());
                attributes.push(attribute);
            }
        }
    }

    attributes.sort_by_cached_key(|attribute| sort_key(attribute, &scope));
    element.attributes = attributes;

    element
        .children
        .retain(|child| !matches!(child, Node::Comment(_)));

    for child in &mut element.children {
        if let Node::Element(child) = child {
            transform_element(child, &scope)?;
        }
    }

    Ok(())
}

/// Total attribute order: namespace declarations (by display name, which puts
/// the default declaration first), then unqualified attributes (by local
/// name), then qualified attributes (by namespace URI, then local name).
fn sort_key(attribute: &Attribute, scope: &Scope) -> (u8, String, String) {
    if attribute.is_namespace_declaration() {
        (0, attribute.name(), String::new())
    } else if attribute.is_unqualified() {
        (1, attribute.local.clone(), String::new())
    } else {
        let identity = ("xmlns".to_owned(), attribute.prefix.clone());
        let uri = scope.get(&identity).cloned().unwrap_or_default();

        (2, uri, attribute.local.clone())
    }
}

fn write_element(element: &Element, output: &mut Vec<u8>) {
    output.push(b'<');
    output.extend_from_slice(element.name().as_bytes());

    for attribute in &element.attributes {
        output.push(b' ');
        output.extend_from_slice(attribute.name().as_bytes());
        output.extend_from_slice(b"=\"");
        write_attribute_value(&attribute.value, output);
        output.push(b'"');
    }

    output.push(b'>');

    for child in &element.children {
        match child {
            Node::Element(child) => write_element(child, output),
            Node::Text(text) => write_text(text, output),
            Node::Comment(_) => (),
        }
    }

    output.extend_from_slice(b"</");
    output.extend_from_slice(element.name().as_bytes());
    output.push(b'>');
}

fn write_text(text: &str, output: &mut Vec<u8>) {
    for &byte in text.as_bytes() {
        match byte {
            b'&' => output.extend_from_slice(b"&amp;"),
            b'<' => output.extend_from_slice(b"&lt;"),
            b'>' => output.extend_from_slice(b"&gt;"),
            b'\r' => output.extend_from_slice(b"&#xD;"),
            byte => output.push(byte),
        }
    }
}

fn write_attribute_value(value: &str, output: &mut Vec<u8>) {
    for &byte in value.as_bytes() {
        match byte {
            b'&' => output.extend_from_slice(b"&amp;"),
            b'<' => output.extend_from_slice(b"&lt;"),
            b'"' => output.extend_from_slice(b"&quot;"),
            b'\t' => output.extend_from_slice(b"&#x9;"),
            b'\n' => output.extend_from_slice(b"&#xA;"),
            b'\r' => output.extend_from_slice(b"&#xD;"),
            byte => output.push(byte),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::Document;
    use super::*;

    fn canonicalize_str(xml: &str) -> String {
        let doc: Document = xml.parse().unwrap();
        let output = canonicalize(doc.root(), &[]).unwrap();

        String::from_utf8(output).unwrap()
    }

    #[test]
    fn propagates_namespaces_from_ancestors_to_the_apex() {
        let doc: Document = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<ietf:c14n11Xmllang xmlns:ietf=\"http://www.ietf.org\"
xmlns:w3c=\"http://www.w3.org\">
   <ietf:e1 xml:lang=\"EN\">
      <ietf:e11>
         <ietf:e111 />
      </ietf:e11>
      <ietf:e12 at=\"2\">
         <ietf:e121 />
      </ietf:e12>
   </ietf:e1>
   <ietf:e2 >
      <ietf:e21 />
   </ietf:e2>
</ietf:c14n11Xmllang>"
            .parse()
            .unwrap();

        let apex = doc.root().select_elements("e1")[0];
        let inherited = doc
            .root()
            .namespace_declarations()
            .cloned()
            .collect::<Vec<_>>();

        let actual = canonicalize(apex, &inherited).unwrap();

        let expected = "<ietf:e1 xmlns:ietf=\"http://www.ietf.org\" xmlns:w3c=\"http://www.w3.org\" xml:lang=\"EN\">
      <ietf:e11>
         <ietf:e111></ietf:e111>
      </ietf:e11>
      <ietf:e12 at=\"2\">
         <ietf:e121></ietf:e121>
      </ietf:e12>
   </ietf:e1>";
        assert_eq!(String::from_utf8(actual).unwrap(), expected);
    }

    #[test]
    fn propagation_skips_identities_the_apex_redeclares() {
        let doc: Document =
            "<root xmlns:a=\"http://outer.example\"><e xmlns:a=\"http://inner.example\"></e></root>"
                .parse()
                .unwrap();

        let apex = doc.root().select_elements("e")[0];
        let inherited = doc
            .root()
            .namespace_declarations()
            .cloned()
            .collect::<Vec<_>>();

        let actual = canonicalize(apex, &inherited).unwrap();

        assert_eq!(
            String::from_utf8(actual).unwrap(),
            "<e xmlns:a=\"http://inner.example\"></e>"
        );
    }

    #[test]
    fn expands_character_references() {
        assert_eq!(canonicalize_str("<doc>&#169;</doc>"), "<doc>\u{a9}</doc>");
    }

    #[test]
    fn canonicalizes_text_and_attribute_content() {
        let actual = canonicalize_str(
            "<doc>
   <text>First line&#x0d;&#10;Second line</text>
   <value>&#x32;</value>
   <compute><![CDATA[value>\"0\" && value<\"10\" ?\"valid\":\"error\"]]></compute>
   <compute expr='value>\"0\" &amp;&amp; value&lt;\"10\" ?\"valid\":\"error\"'>valid</compute>
   <norm attr=' &apos;   &#x20;&#13;&#xa;&#9;   &apos; '/>
   <normNames attr='   A   &#x20;&#13;&#xa;&#9;   B   '/>
   <normId id=' &apos;   &#x20;&#13;&#xa;&#9;   &apos; '/>
</doc>",
        );

        let expected = "<doc>
   <text>First line&#xD;
Second line</text>
   <value>2</value>
   <compute>value&gt;\"0\" &amp;&amp; value&lt;\"10\" ?\"valid\":\"error\"</compute>
   <compute expr=\"value>&quot;0&quot; &amp;&amp; value&lt;&quot;10&quot; ?&quot;valid&quot;:&quot;error&quot;\">valid</compute>
   <norm attr=\" '    &#xD;&#xA;&#x9;   ' \"></norm>
   <normNames attr=\"   A    &#xD;&#xA;&#x9;   B   \"></normNames>
   <normId id=\" '    &#xD;&#xA;&#x9;   ' \"></normId>
</doc>";
        assert_eq!(actual, expected);
    }

    #[test]
    fn sorts_attributes_and_removes_superfluous_namespaces() {
        let actual = canonicalize_str(
            "<doc>
   <e1   />
   <e2   ></e2>
   <e3   name = \"elem3\"   id=\"elem3\"   />
   <e4   name=\"elem4\"   id=\"elem4\"   ></e4>
   <e5 a:attr=\"out\" b:attr=\"sorted\" attr2=\"all\" attr=\"I'm\"
      xmlns:b=\"http://www.ietf.org\"
      xmlns:a=\"http://www.w3.org\"
      xmlns=\"http://example.org\"/>
   <e6 xmlns:a=\"http://www.w3.org\">
      <e7 xmlns=\"http://www.ietf.org\">
         <e8 xmlns:a=\"http://www.w3.org\">
            <e9 xmlns:a=\"http://www.ietf.org\" attr=\"default\"/>
         </e8>
      </e7>
   </e6>
</doc>",
        );

        let expected = "<doc>
   <e1></e1>
   <e2></e2>
   <e3 id=\"elem3\" name=\"elem3\"></e3>
   <e4 id=\"elem4\" name=\"elem4\"></e4>
   <e5 xmlns=\"http://example.org\" xmlns:a=\"http://www.w3.org\" xmlns:b=\"http://www.ietf.org\" attr=\"I'm\" attr2=\"all\" b:attr=\"sorted\" a:attr=\"out\"></e5>
   <e6 xmlns:a=\"http://www.w3.org\">
      <e7 xmlns=\"http://www.ietf.org\">
         <e8>
            <e9 xmlns:a=\"http://www.ietf.org\" attr=\"default\"></e9>
         </e8>
      </e7>
   </e6>
</doc>";
        assert_eq!(actual, expected);
    }

    #[test]
    fn preserves_whitespace_in_element_content() {
        let xml = "<doc>
   <clean>   </clean>
   <dirty>   A   B   </dirty>
   <mixed>
      A
      <clean>   </clean>
      B
      <dirty>   A   B   </dirty>
      C
   </mixed>
</doc>";

        assert_eq!(canonicalize_str(xml), xml);
    }

    #[test]
    fn removes_prolog_and_comments() {
        let actual = canonicalize_str(
            "<?xml version=\"1.0\"?>\n\n\n<doc>Hello, world!<!-- Comment 1 --></doc>\n\n\n<!-- Comment 2 -->\n\n<!-- Comment 3 -->",
        );

        assert_eq!(actual, "<doc>Hello, world!</doc>");
    }

    #[test]
    fn keeps_redeclarations_with_a_different_value() {
        let actual = canonicalize_str(
            "<a xmlns:n=\"http://one.example\"><b xmlns:n=\"http://one.example\"><c xmlns:n=\"http://two.example\"></c></b></a>",
        );

        assert_eq!(
            actual,
            "<a xmlns:n=\"http://one.example\"><b><c xmlns:n=\"http://two.example\"></c></b></a>"
        );
    }

    #[test]
    fn is_idempotent() {
        let xml = "<doc xmlns:b=\"http://www.ietf.org\">
   <e5 a:attr=\"out\" b:attr=\"sorted\" attr2=\"all\" attr=\"I'm\"
      xmlns:b=\"http://www.ietf.org\"
      xmlns:a=\"http://www.w3.org\"/>
   <text>First line&#x0d;&#10;Second line</text>
</doc>";

        let once = canonicalize_str(xml);
        let twice = canonicalize_str(&once);

        assert_eq!(once, twice);
    }

    #[test]
    fn is_independent_of_attribute_order() {
        let left = canonicalize_str(
            "<e xmlns:b=\"http://b.example\" xmlns:a=\"http://a.example\" b:x=\"1\" a:y=\"2\" plain=\"3\"></e>",
        );
        let right = canonicalize_str(
            "<e plain=\"3\" a:y=\"2\" b:x=\"1\" xmlns:a=\"http://a.example\" xmlns:b=\"http://b.example\"></e>",
        );

        assert_eq!(left, right);
    }

    #[test]
    fn orders_qualified_attributes_by_namespace_uri() {
        let actual = canonicalize_str(
            "<e xmlns:z=\"http://a.example\" xmlns:a=\"http://z.example\" a:attr=\"1\" z:attr=\"2\"></e>",
        );

        // z maps to the lexicographically smaller URI, so z:attr comes first
        assert_eq!(
            actual,
            "<e xmlns:a=\"http://z.example\" xmlns:z=\"http://a.example\" z:attr=\"2\" a:attr=\"1\"></e>"
        );
    }

    #[test]
    fn writes_empty_elements_with_separate_end_tags() {
        assert_eq!(canonicalize_str("<doc><e/></doc>"), "<doc><e></e></doc>");
    }

    #[test]
    fn rejects_empty_default_namespace_declarations() {
        let doc: Document = "<doc xmlns=\"http://example.org\"><e xmlns=\"\"></e></doc>"
            .parse()
            .unwrap();

        let result = canonicalize(doc.root(), &[]);

        assert!(matches!(result, Err(Error::EmptyDefaultNamespace)));
    }
}

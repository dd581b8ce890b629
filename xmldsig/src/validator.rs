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

use base64::{decode, encode};
use log::debug;

use xmltree::{Attribute, Document, Element};

use crate::{
    dereference::{extend_inherited, find_signature},
    digest::{digest, DigestMethod},
    transform::canonical_octets,
    verify::candidate_keys,
    Error, NodeSet, SignatureAlgorithm, TransformAlgorithm,
};

/* ValidationResult */

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ReferenceValidationResult {
    pub is_valid: bool,
    pub generated_digest_value: String,
    pub digest_value: String,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ValidationResult {
    pub reference_validation_results: Vec<ReferenceValidationResult>,
    pub is_signature_valid: bool,
}

/// Validates the XML signature enclosed in the given document.
///
/// Every `Reference` of `SignedInfo` is dereferenced, transformed, digested
/// and compared against its `DigestValue`; the canonicalized `SignedInfo` is
/// then verified against the `SignatureValue` with the keys extracted from
/// `KeyInfo`. A mismatching digest or signature is a `false` verdict in the
/// result, not an error; errors are reserved for documents this validator
/// cannot process at all.
pub fn validate(xml_bytes: &[u8]) -> Result<ValidationResult, Error> {
    let document = Document::from_bytes(xml_bytes)?;

    let (signature, inherited) = find_signature(&document)?;
    let signed_info = only_one_child(signature, NODE_SIGNED_INFO)?;
    let references = at_least_one_child(signed_info, NODE_REFERENCE)?;

    let mut reference_validation_results = Vec::with_capacity(references.len());
    for (index, reference) in references.into_iter().enumerate() {
        reference_validation_results.push(validate_reference(&document, index, reference)?);
    }

    let is_signature_valid = verify_signature(signature, signed_info, &inherited)?;

    Ok(ValidationResult {
        reference_validation_results,
        is_signature_valid,
    })
}

fn validate_reference(
    document: &Document,
    index: usize,
    reference: &Element,
) -> Result<ReferenceValidationResult, Error> {
    let uri = reference
        .attribute("", PROP_URI)
        .map(Attribute::value)
        .ok_or_else(|| {
            Error::InvalidSignatureNode(format!(
                "Reference#{} has no URI attribute, anonymous references are not supported",
                index
            ))
        })?;

    let mut node_set = crate::dereference(document, uri)?;

    if let Some(transforms) = reference.select_elements(NODE_TRANSFORMS).first().copied() {
        for transform in at_least_one_child(transforms, NODE_TRANSFORM)? {
            let algorithm = require_attribute(transform, PROP_ALGORITHM)?;
            let algorithm = TransformAlgorithm::from_uri(algorithm)?;

            node_set = algorithm.apply(node_set)?;
        }
    }

    // a reference that is still a node set is canonicalized with the fixed
    // default algorithm; CanonicalizationMethod only governs SignedInfo
    let octets = match node_set {
        NodeSet::Octets(octets) => octets,
        node_set => canonical_octets(node_set)?,
    };

    let digest_method = only_one_descendant(reference, NODE_DIGEST_METHOD)?;
    let digest_method = DigestMethod::from_uri(require_attribute(digest_method, PROP_ALGORITHM)?)?;
    let generated_digest_value = encode(&digest(digest_method, &octets)?);

    let digest_value = only_one_descendant(reference, NODE_DIGEST_VALUE)?;
    let digest_value = digest_value.text().trim().to_owned();

    let is_valid = generated_digest_value == digest_value;

    debug!(
        "Reference#{} ({}): digest {}",
        index,
        uri,
        if is_valid { "matches" } else { "does not match" }
    );

    Ok(ReferenceValidationResult {
        is_valid,
        generated_digest_value,
        digest_value,
    })
}

fn verify_signature(
    signature: &Element,
    signed_info: &Element,
    inherited: &[Attribute],
) -> Result<bool, Error> {
    let canonicalization_method = only_one_child(signed_info, NODE_CANONICALIZATION_METHOD)?;
    let canonicalization_method = require_attribute(canonicalization_method, PROP_ALGORITHM)?;

    let signature_method = only_one_child(signed_info, NODE_SIGNATURE_METHOD)?;
    let algorithm = SignatureAlgorithm::from_uri(require_attribute(signature_method, PROP_ALGORITHM)?)?;

    let node_set = NodeSet::from_subtree(
        signed_info.clone(),
        extend_inherited(signature, inherited),
    );
    let canonical_signed_info = match canonicalization_method {
        TRANSFORM_C14N_1_0 => canonical_octets(node_set)?,
        TRANSFORM_C14N_1_0_WITH_COMMENTS
        | TRANSFORM_C14N_1_1
        | TRANSFORM_C14N_1_1_WITH_COMMENTS
        | TRANSFORM_C14N_EXCLUSIVE_1_0
        | TRANSFORM_C14N_EXCLUSIVE_1_0_WITH_COMMENTS => {
            return Err(Error::UnimplementedCanonicalizationMethod(
                canonicalization_method.to_owned(),
            ));
        }
        uri => return Err(Error::UnknownCanonicalizationMethod(uri.to_owned())),
    };

    let signature_value = only_one_child(signature, NODE_SIGNATURE_VALUE)?;
    let signature_value = decode(&strip_whitespace(&signature_value.text()))?;

    let candidates = candidate_keys(signature)?;

    debug!(
        "verifying SignatureValue against {} candidate key(s)",
        candidates.len()
    );

    for candidate in &candidates {
        if candidate.verify(algorithm, &canonical_signed_info, &signature_value)? {
            return Ok(true);
        }
    }

    Ok(false)
}

fn only_one_child<'a>(parent: &'a Element, local: &str) -> Result<&'a Element, Error> {
    let found = parent.select_elements(local);
    if found.len() > 1 {
        return Err(Error::InvalidSignatureNode(format!(
            "found more than one {} element on {} element",
            local,
            parent.name()
        )));
    }

    found.first().copied().ok_or_else(|| {
        Error::InvalidSignatureNode(format!(
            "{} element was not found on {} element",
            local,
            parent.name()
        ))
    })
}

fn at_least_one_child<'a>(parent: &'a Element, local: &str) -> Result<Vec<&'a Element>, Error> {
    let found = parent.select_elements(local);
    if found.is_empty() {
        return Err(Error::InvalidSignatureNode(format!(
            "{} element was not found on {} element",
            local,
            parent.name()
        )));
    }

    Ok(found)
}

fn only_one_descendant<'a>(parent: &'a Element, local: &str) -> Result<&'a Element, Error> {
    let found = parent.find_elements(local);
    if found.len() > 1 {
        return Err(Error::InvalidSignatureNode(format!(
            "found more than one {} element in {} element",
            local,
            parent.name()
        )));
    }

    found.first().copied().ok_or_else(|| {
        Error::InvalidSignatureNode(format!(
            "{} element was not found in {} element",
            local,
            parent.name()
        ))
    })
}

fn require_attribute<'a>(element: &'a Element, local: &str) -> Result<&'a str, Error> {
    element
        .attribute("", local)
        .map(Attribute::value)
        .ok_or_else(|| {
            Error::InvalidSignatureNode(format!(
                "{} element is missing the {} attribute",
                element.name(),
                local
            ))
        })
}

pub(crate) fn strip_whitespace(text: &str) -> String {
    text.split_whitespace().collect()
}

pub const NODE_SIGNATURE: &str = "Signature";
pub const NODE_SIGNED_INFO: &str = "SignedInfo";
pub const NODE_SIGNATURE_VALUE: &str = "SignatureValue";
pub const NODE_KEY_INFO: &str = "KeyInfo";
pub const NODE_CANONICALIZATION_METHOD: &str = "CanonicalizationMethod";
pub const NODE_SIGNATURE_METHOD: &str = "SignatureMethod";
pub const NODE_REFERENCE: &str = "Reference";
pub const NODE_X509_DATA: &str = "X509Data";
pub const NODE_X509_CERTIFICATE: &str = "X509Certificate";
pub const NODE_TRANSFORMS: &str = "Transforms";
pub const NODE_TRANSFORM: &str = "Transform";
pub const NODE_DIGEST_METHOD: &str = "DigestMethod";
pub const NODE_DIGEST_VALUE: &str = "DigestValue";

pub const PROP_URI: &str = "URI";
pub const PROP_ALGORITHM: &str = "Algorithm";
pub const PROP_ID: &str = "Id";

pub const TRANSFORM_C14N_1_0: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315";
pub const TRANSFORM_C14N_1_0_WITH_COMMENTS: &str =
    "http://www.w3.org/TR/2001/REC-xml-c14n-20010315#WithComments";
pub const TRANSFORM_C14N_1_1: &str = "http://www.w3.org/2006/12/xml-c14n11";
pub const TRANSFORM_C14N_1_1_WITH_COMMENTS: &str =
    "http://www.w3.org/2006/12/xml-c14n11#WithComments";
pub const TRANSFORM_C14N_EXCLUSIVE_1_0: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
pub const TRANSFORM_C14N_EXCLUSIVE_1_0_WITH_COMMENTS: &str =
    "http://www.w3.org/2001/10/xml-exc-c14n#WithComments";
pub const TRANSFORM_ENVELOPED_SIGNATURE: &str =
    "http://www.w3.org/2000/09/xmldsig#enveloped-signature";
pub const TRANSFORM_BASE64: &str = "http://www.w3.org/2000/09/xmldsig#base64";
pub const TRANSFORM_XPATH: &str = "http://www.w3.org/TR/1999/REC-xpath-19991116";
pub const TRANSFORM_XSLT: &str = "http://www.w3.org/TR/1999/REC-xslt-19991116";

pub const DIGEST_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";
pub const DIGEST_SHA224: &str = "http://www.w3.org/2001/04/xmldsig-more#sha224";
pub const DIGEST_SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
pub const DIGEST_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#sha384";
pub const DIGEST_SHA512: &str = "http://www.w3.org/2001/04/xmlenc#sha512";

pub const SIGNATURE_RSA_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";
pub const SIGNATURE_RSA_SHA224: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha224";
pub const SIGNATURE_RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
pub const SIGNATURE_RSA_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384";
pub const SIGNATURE_RSA_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512";
pub const SIGNATURE_DSA_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#dsa-sha1";
pub const SIGNATURE_DSA_SHA256: &str = "http://www.w3.org/2009/xmldsig11#dsa-sha256";
pub const SIGNATURE_ECDSA_SHA1: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha1";
pub const SIGNATURE_ECDSA_SHA224: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha224";
pub const SIGNATURE_ECDSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256";
pub const SIGNATURE_ECDSA_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha384";
pub const SIGNATURE_ECDSA_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha512";

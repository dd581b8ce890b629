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

mod dereference;
mod digest;
mod error;
mod nodeset;
mod transform;
mod validator;
mod verify;

pub use dereference::*;
pub use digest::*;
pub use error::*;
pub use nodeset::*;
pub use transform::*;
pub use validator::*;
pub use verify::*;

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::read_to_string;

    const REFERENCE_DIGEST: &str = "w/tgJPO4QwPspLnFjxAENxoINBETerT3bUIW7omcL8k=";
    const SIGNED_PROPERTIES_DIGEST: &str =
        "wlXYH7RjJL6evMsOOdf005TCJ1vkRJM1xBs/Wi9OQ4ouYwuLZpl/odqaoBqbxQzwvQ8Oybx/dKA1ss4qZVbJWA==";

    fn signed_document() -> String {
        read_to_string("./examples/signed.xml").unwrap()
    }

    #[test]
    fn validates_a_signed_document() {
        let xml = signed_document();

        let result = validate(xml.as_bytes()).unwrap();

        assert_eq!(result.reference_validation_results.len(), 2);

        let enveloped = &result.reference_validation_results[0];
        assert!(enveloped.is_valid);
        assert_eq!(enveloped.generated_digest_value, REFERENCE_DIGEST);
        assert_eq!(enveloped.digest_value, REFERENCE_DIGEST);

        let signed_properties = &result.reference_validation_results[1];
        assert!(signed_properties.is_valid);
        assert_eq!(
            signed_properties.generated_digest_value,
            SIGNED_PROPERTIES_DIGEST
        );

        assert!(result.is_signature_valid);
    }

    #[test]
    fn tampered_content_breaks_the_reference_digest_but_not_the_signature() {
        let xml = signed_document().replace("42.00", "43.00");

        let result = validate(xml.as_bytes()).unwrap();

        // the enveloped reference no longer matches, while SignedInfo itself
        // is untouched and still carries a valid signature
        assert!(!result.reference_validation_results[0].is_valid);
        assert!(result.reference_validation_results[1].is_valid);
        assert!(result.is_signature_valid);
    }

    #[test]
    fn tampered_signed_info_breaks_the_signature() {
        let xml = signed_document().replace(REFERENCE_DIGEST, REFERENCE_DIGEST.to_lowercase().as_str());

        let result = validate(xml.as_bytes()).unwrap();

        assert!(!result.reference_validation_results[0].is_valid);
        assert!(!result.is_signature_valid);
    }

    #[test]
    fn declared_but_unimplemented_signature_methods_verify_as_invalid() {
        let xml = signed_document().replace(
            "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256",
            "http://www.w3.org/2000/09/xmldsig#dsa-sha1",
        );

        let result = validate(xml.as_bytes()).unwrap();

        assert!(result.reference_validation_results[0].is_valid);
        assert!(result.reference_validation_results[1].is_valid);
        assert!(!result.is_signature_valid);
    }

    #[test]
    fn unknown_signature_methods_are_an_error() {
        let xml = signed_document().replace(
            "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256",
            "http://www.example.com/not-a-signature",
        );

        let result = validate(xml.as_bytes());

        assert!(matches!(result, Err(Error::UnknownSignatureMethod(_))));
    }

    #[test]
    fn unknown_digest_methods_are_an_error() {
        let xml = signed_document().replace(
            "http://www.w3.org/2001/04/xmlenc#sha256",
            "http://www.w3.org/2001/04/xmlenc#md5",
        );

        let result = validate(xml.as_bytes());

        assert!(matches!(result, Err(Error::UnknownDigestMethod(_))));
    }

    #[test]
    fn unresolvable_reference_uris_are_an_error() {
        let xml = signed_document().replace("URI=\"#signedprops\"", "URI=\"#missing\"");

        let result = validate(xml.as_bytes());

        assert!(matches!(result, Err(Error::ReferenceNotFound(_))));
    }

    #[test]
    fn unimplemented_transform_algorithms_are_an_error() {
        let xml = signed_document().replace(
            "<Transform Algorithm=\"http://www.w3.org/TR/2001/REC-xml-c14n-20010315\">",
            "<Transform Algorithm=\"http://www.w3.org/2001/10/xml-exc-c14n#\">",
        );

        let result = validate(xml.as_bytes());

        assert!(matches!(result, Err(Error::UnimplementedTransformation(_))));
    }

    #[test]
    fn documents_without_a_signature_are_an_error() {
        let result = validate(b"<Invoice><Amount>42.00</Amount></Invoice>");

        assert!(matches!(result, Err(Error::SignatureNodeNotFound)));
    }

    #[test]
    fn documents_with_two_signatures_are_an_error() {
        let xml = signed_document().replace(
            "</Invoice>",
            "<Signature></Signature></Invoice>",
        );

        let result = validate(xml.as_bytes());

        assert!(matches!(result, Err(Error::InvalidSignatureNode(_))));
    }

    #[test]
    fn line_wrapped_digest_values_are_trimmed_before_comparison() {
        let xml = signed_document().replace(
            &format!("<DigestValue>{}</DigestValue>", REFERENCE_DIGEST),
            &format!("<DigestValue>\n{}\n</DigestValue>", REFERENCE_DIGEST),
        );

        let result = validate(xml.as_bytes()).unwrap();

        // the declared digest is trimmed for the comparison, but SignedInfo's
        // canonical bytes changed, so the signature no longer matches
        assert!(result.reference_validation_results[0].is_valid);
        assert!(!result.is_signature_valid);
    }
}

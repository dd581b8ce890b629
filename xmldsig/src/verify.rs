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

use base64::decode;
use openssl::{
    hash::MessageDigest,
    pkey::{PKey, Public},
    sign::Verifier,
    x509::X509,
};

use xmltree::Element;

use crate::validator::strip_whitespace;
use crate::{
    Error, NODE_KEY_INFO, NODE_X509_CERTIFICATE, NODE_X509_DATA,
    SIGNATURE_DSA_SHA1, SIGNATURE_DSA_SHA256, SIGNATURE_ECDSA_SHA1, SIGNATURE_ECDSA_SHA224,
    SIGNATURE_ECDSA_SHA256, SIGNATURE_ECDSA_SHA384, SIGNATURE_ECDSA_SHA512, SIGNATURE_RSA_SHA1,
    SIGNATURE_RSA_SHA224, SIGNATURE_RSA_SHA256, SIGNATURE_RSA_SHA384, SIGNATURE_RSA_SHA512,
};

/* SignatureAlgorithm */

/// Signature algorithms a `SignatureMethod` may declare. Only the RSA family
/// (RSASSA-PKCS1-v1_5) is implemented; DSA and ECDSA are recognized so their
/// documents verify as "signature invalid" instead of failing.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SignatureAlgorithm {
    RsaSha1,
    RsaSha224,
    RsaSha256,
    RsaSha384,
    RsaSha512,
    DsaSha1,
    DsaSha256,
    EcdsaSha1,
    EcdsaSha224,
    EcdsaSha256,
    EcdsaSha384,
    EcdsaSha512,
}

impl SignatureAlgorithm {
    pub fn from_uri(uri: &str) -> Result<Self, Error> {
        match uri {
            SIGNATURE_RSA_SHA1 => Ok(Self::RsaSha1),
            SIGNATURE_RSA_SHA224 => Ok(Self::RsaSha224),
            SIGNATURE_RSA_SHA256 => Ok(Self::RsaSha256),
            SIGNATURE_RSA_SHA384 => Ok(Self::RsaSha384),
            SIGNATURE_RSA_SHA512 => Ok(Self::RsaSha512),
            SIGNATURE_DSA_SHA1 => Ok(Self::DsaSha1),
            SIGNATURE_DSA_SHA256 => Ok(Self::DsaSha256),
            SIGNATURE_ECDSA_SHA1 => Ok(Self::EcdsaSha1),
            SIGNATURE_ECDSA_SHA224 => Ok(Self::EcdsaSha224),
            SIGNATURE_ECDSA_SHA256 => Ok(Self::EcdsaSha256),
            SIGNATURE_ECDSA_SHA384 => Ok(Self::EcdsaSha384),
            SIGNATURE_ECDSA_SHA512 => Ok(Self::EcdsaSha512),
            uri => Err(Error::UnknownSignatureMethod(uri.to_owned())),
        }
    }

    fn message_digest(self) -> MessageDigest {
        match self {
            Self::RsaSha1 | Self::DsaSha1 | Self::EcdsaSha1 => MessageDigest::sha1(),
            Self::RsaSha224 | Self::EcdsaSha224 => MessageDigest::sha224(),
            Self::RsaSha256 | Self::DsaSha256 | Self::EcdsaSha256 => MessageDigest::sha256(),
            Self::RsaSha384 | Self::EcdsaSha384 => MessageDigest::sha384(),
            Self::RsaSha512 | Self::EcdsaSha512 => MessageDigest::sha512(),
        }
    }

    fn is_implemented(self) -> bool {
        matches!(
            self,
            Self::RsaSha1 | Self::RsaSha224 | Self::RsaSha256 | Self::RsaSha384 | Self::RsaSha512
        )
    }
}

/* CandidateKey */

/// Public key extracted from `KeyInfo`. Every certificate yields one
/// candidate; the signature is valid as soon as any candidate verifies it.
pub struct CandidateKey {
    key: PKey<Public>,
}

impl CandidateKey {
    pub fn from_certificate_der(der: &[u8]) -> Result<Self, Error> {
        let certificate = X509::from_der(der)?;
        let key = certificate.public_key()?;

        Ok(Self { key })
    }

    /// `Ok(false)` means "does not verify"; `Err` is reserved for failures of
    /// the crypto primitives themselves.
    pub fn verify(
        &self,
        algorithm: SignatureAlgorithm,
        signed_info: &[u8],
        signature: &[u8],
    ) -> Result<bool, Error> {
        if !algorithm.is_implemented() {
            return Ok(false);
        }

        // RSA algorithms cannot match a candidate carrying another key type
        if self.key.rsa().is_err() {
            return Ok(false);
        }

        let mut verifier = Verifier::new(algorithm.message_digest(), &self.key)?;
        verifier.update(signed_info)?;

        Ok(verifier.verify(signature)?)
    }
}

/// Candidate keys from `KeyInfo/X509Data/X509Certificate`, in document order.
/// Each certificate is base64 DER. Documents without `KeyInfo` yield no
/// candidates.
pub(crate) fn candidate_keys(signature: &Element) -> Result<Vec<CandidateKey>, Error> {
    let mut candidates = Vec::new();

    for key_info in signature.select_elements(NODE_KEY_INFO) {
        for x509_data in key_info.select_elements(NODE_X509_DATA) {
            for certificate in x509_data.select_elements(NODE_X509_CERTIFICATE) {
                let der = decode(&strip_whitespace(&certificate.text()))?;

                candidates.push(CandidateKey::from_certificate_der(&der)?);
            }
        }
    }

    Ok(candidates)
}

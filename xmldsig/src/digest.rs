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

use openssl::hash::{Hasher, MessageDigest};

use crate::{
    Error, DIGEST_SHA1, DIGEST_SHA224, DIGEST_SHA256, DIGEST_SHA384, DIGEST_SHA512,
};

/* DigestMethod */

pub enum DigestMethod {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestMethod {
    pub fn from_uri(uri: &str) -> Result<Self, Error> {
        match uri {
            DIGEST_SHA1 => Ok(Self::Sha1),
            DIGEST_SHA224 => Ok(Self::Sha224),
            DIGEST_SHA256 => Ok(Self::Sha256),
            DIGEST_SHA384 => Ok(Self::Sha384),
            DIGEST_SHA512 => Ok(Self::Sha512),
            uri => Err(Error::UnknownDigestMethod(uri.to_owned())),
        }
    }
}

impl Into<MessageDigest> for DigestMethod {
    fn into(self) -> MessageDigest {
        match self {
            DigestMethod::Sha1 => MessageDigest::sha1(),
            DigestMethod::Sha224 => MessageDigest::sha224(),
            DigestMethod::Sha256 => MessageDigest::sha256(),
            DigestMethod::Sha384 => MessageDigest::sha384(),
            DigestMethod::Sha512 => MessageDigest::sha512(),
        }
    }
}

pub fn digest(method: DigestMethod, input: &[u8]) -> Result<Vec<u8>, Error> {
    let mut hasher = Hasher::new(method.into())?;
    hasher.update(input)?;
    let digest = hasher.finish()?;

    Ok(digest.to_vec())
}

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

mod c14n;
mod enveloped_signature;

pub(crate) use c14n::canonical_octets;

use crate::{
    Error, NodeSet, TRANSFORM_BASE64, TRANSFORM_C14N_1_0, TRANSFORM_C14N_1_0_WITH_COMMENTS,
    TRANSFORM_C14N_1_1, TRANSFORM_C14N_1_1_WITH_COMMENTS, TRANSFORM_C14N_EXCLUSIVE_1_0,
    TRANSFORM_C14N_EXCLUSIVE_1_0_WITH_COMMENTS, TRANSFORM_ENVELOPED_SIGNATURE, TRANSFORM_XPATH,
    TRANSFORM_XSLT,
};

/* TransformAlgorithm */

/// Transform algorithms a `Reference` may name. Each member is a pure
/// function from node set to node set; the dereferenced data is threaded
/// through the transforms in document order.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TransformAlgorithm {
    EnvelopedSignature,
    Canonicalization,
}

impl TransformAlgorithm {
    pub fn from_uri(uri: &str) -> Result<Self, Error> {
        match uri {
            TRANSFORM_ENVELOPED_SIGNATURE => Ok(Self::EnvelopedSignature),
            TRANSFORM_C14N_1_0 => Ok(Self::Canonicalization),
            TRANSFORM_C14N_1_0_WITH_COMMENTS
            | TRANSFORM_C14N_1_1
            | TRANSFORM_C14N_1_1_WITH_COMMENTS
            | TRANSFORM_C14N_EXCLUSIVE_1_0
            | TRANSFORM_C14N_EXCLUSIVE_1_0_WITH_COMMENTS
            | TRANSFORM_BASE64
            | TRANSFORM_XPATH
            | TRANSFORM_XSLT => Err(Error::UnimplementedTransformation(uri.to_owned())),
            uri => Err(Error::UnknownTransformation(uri.to_owned())),
        }
    }

    pub fn apply(self, input: NodeSet) -> Result<NodeSet, Error> {
        match self {
            Self::EnvelopedSignature => enveloped_signature::remove_signature(input),
            Self::Canonicalization => c14n::canonicalize(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_the_implemented_algorithm_uris() {
        assert_eq!(
            TransformAlgorithm::from_uri(TRANSFORM_ENVELOPED_SIGNATURE).unwrap(),
            TransformAlgorithm::EnvelopedSignature
        );
        assert_eq!(
            TransformAlgorithm::from_uri(TRANSFORM_C14N_1_0).unwrap(),
            TransformAlgorithm::Canonicalization
        );
    }

    #[test]
    fn distinguishes_unimplemented_from_unknown_uris() {
        assert!(matches!(
            TransformAlgorithm::from_uri(TRANSFORM_C14N_EXCLUSIVE_1_0),
            Err(Error::UnimplementedTransformation(_))
        ));
        assert!(matches!(
            TransformAlgorithm::from_uri(TRANSFORM_XPATH),
            Err(Error::UnimplementedTransformation(_))
        ));
        assert!(matches!(
            TransformAlgorithm::from_uri("http://www.example.com/not-a-transform"),
            Err(Error::UnknownTransformation(_))
        ));
    }
}

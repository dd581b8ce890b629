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

use crate::{Error, NodeSet};

/// Canonical XML 1.0 octets of a node set. Octet input is parsed first.
pub(crate) fn canonical_octets(input: NodeSet) -> Result<Bytes, Error> {
    let (root, inherited) = input.into_tree()?;
    let output = xmltree::canonicalize(&root, &inherited)?;

    Ok(output.into())
}

pub(super) fn canonicalize(input: NodeSet) -> Result<NodeSet, Error> {
    Ok(NodeSet::Octets(canonical_octets(input)?))
}

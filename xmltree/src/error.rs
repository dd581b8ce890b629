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

use std::str::Utf8Error;

use quick_xml::Error as XmlError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("XML Error: {0}")]
    XmlError(XmlError),

    #[error("UTF-8 Error: {0}")]
    Utf8Error(Utf8Error),

    #[error("Document has no root element!")]
    MissingRootElement,

    #[error("Document has more than one root element!")]
    MultipleRootElements,

    #[error("Unexpected content outside of the root element!")]
    ContentOutsideRoot,

    #[error("Unexpected end tag!")]
    UnexpectedEndTag,

    #[error("Unexpected end of document!")]
    UnexpectedEndOfDocument,

    #[error("Processing instructions are not supported!")]
    ProcessingInstruction,

    #[error("Entity declarations are not supported!")]
    EntityDeclaration,

    #[error("Attribute-list declarations are not supported!")]
    AttlistDeclaration,

    #[error("Empty default namespace declarations (xmlns=\"\") are not supported!")]
    EmptyDefaultNamespace,
}

impl From<XmlError> for Error {
    fn from(err: XmlError) -> Self {
        Self::XmlError(err)
    }
}

impl From<Utf8Error> for Error {
    fn from(err: Utf8Error) -> Self {
        Self::Utf8Error(err)
    }
}

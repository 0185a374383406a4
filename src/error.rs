// Copyright (c) 2023 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Errors that may occur in this crate.
//!
//! [`HpackError`] covers every way an HPACK byte stream can be malformed.
//! Incomplete input is not an error: decoding interfaces signal it with
//! `Ok(None)` so that callers can retry once more bytes arrive.

use core::fmt::{Display, Formatter};
use std::error::Error;

/// Errors that may occur when decoding an HPACK byte stream.
///
/// Any of these errors leaves the compression context desynchronized from
/// the peer, so the surrounding connection must be torn down.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct HpackError {
    kind: ErrorKind,
}

impl From<ErrorKind> for HpackError {
    fn from(kind: ErrorKind) -> Self {
        HpackError { kind }
    }
}

impl Display for HpackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self.kind {
            ErrorKind::IntegerOverflow => "integer representation is too large",
            ErrorKind::InvalidHuffmanCode => "invalid huffman code",
            ErrorKind::InvalidIndex => "no header at the referenced index",
            ErrorKind::UnsupportedSizeUpdate => "dynamic table size update is not supported",
        })
    }
}

impl Error for HpackError {}

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub(crate) enum ErrorKind {
    /// An integer representation grew past `MAX_HPACK_INTEGER` before
    /// terminating.
    IntegerOverflow,

    /// A Huffman-coded string reached an absent branch, decoded the EOS
    /// symbol, or ended with invalid padding.
    InvalidHuffmanCode,

    /// A representation referenced an index outside the static and dynamic
    /// tables, or used the forbidden index 0.
    InvalidIndex,

    /// A dynamic table size update appeared on the wire.
    UnsupportedSizeUpdate,
}

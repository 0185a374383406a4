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

//! [Header Field Representation] implementation of [HPACK].
//!
//! [Header Field Representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-2.4
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! # Description from RFC7541
//! An encoded header field can be represented either as an index or as a
//! literal.
//!
//! An indexed representation defines a header field as a reference to an
//! entry in either the static table or the dynamic table.
//!
//! A literal representation defines a header field by specifying its name
//! and value. The header field name can be represented literally or as a
//! reference to a table entry. The header field value is represented
//! literally. Three literal variants exist, differing in whether the decoder
//! inserts the field into its dynamic table (incremental indexing), leaves
//! the table untouched (without indexing), or additionally promises that
//! intermediaries re-encode the field literally (never indexed).

mod decoder;
mod encoder;

pub(crate) use decoder::ReprDecoder;
pub(crate) use encoder::ReprEncoder;

/// One decoded header field representation or dynamic table size update
/// instruction, as laid out in [RFC7541 section-6].
///
/// [RFC7541 section-6]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6
pub(crate) enum Representation {
    /// An indexed header field representation identifies an entry in either
    /// the static table or the dynamic table.
    ///
    /// # Binary Format
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 1 |        Index (7+)         |
    /// +---+---------------------------+
    /// ```
    Indexed { index: usize },

    /// A literal whose decoding appends the header field to the decoder's
    /// dynamic table.
    ///
    /// # Binary Format
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 1 |      Index (6+)       |
    /// +---+---+-----------------------+
    /// | H |     Name Length (7+)      |    (only when Index is 0)
    /// +---+---------------------------+
    /// |  Name String (Length octets)  |
    /// +---+---------------------------+
    /// | H |     Value Length (7+)     |
    /// +---+---------------------------+
    /// | Value String (Length octets)  |
    /// +-------------------------------+
    /// ```
    LiteralWithIndexing { name: Name, value: Vec<u8> },

    /// A literal that leaves the dynamic table untouched. Starts with the
    /// `0000` 4-bit pattern; otherwise laid out like the incremental form
    /// with a 4-bit index prefix.
    LiteralWithoutIndexing { name: Name, value: Vec<u8> },

    /// A literal that leaves the dynamic table untouched and must be
    /// re-encoded literally by intermediaries. Starts with the `0001` 4-bit
    /// pattern.
    LiteralNeverIndexed { name: Name, value: Vec<u8> },

    /// A dynamic table size update. Starts with the `001` 3-bit pattern.
    /// This codec recognizes the instruction but does not support it, so
    /// the size operand is never parsed.
    SizeUpdate,
}

/// The high bits of a representation's first byte, which select the
/// representation type and fix the width of the index prefix.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) struct PrefixBit(u8);

impl PrefixBit {
    pub(crate) const INDEXED: Self = Self(0x80);
    pub(crate) const LITERAL_WITH_INDEXING: Self = Self(0x40);
    pub(crate) const SIZE_UPDATE: Self = Self(0x20);
    pub(crate) const LITERAL_NEVER_INDEXED: Self = Self(0x10);
    pub(crate) const LITERAL_WITHOUT_INDEXING: Self = Self(0x00);

    /// Creates a `PrefixBit` from a representation's first byte.
    pub(crate) fn from_u8(byte: u8) -> Self {
        match byte {
            x if x >= 0x80 => Self::INDEXED,
            x if x >= 0x40 => Self::LITERAL_WITH_INDEXING,
            x if x >= 0x20 => Self::SIZE_UPDATE,
            x if x >= 0x10 => Self::LITERAL_NEVER_INDEXED,
            _ => Self::LITERAL_WITHOUT_INDEXING,
        }
    }

    pub(crate) fn prefix(self) -> u8 {
        self.0
    }

    /// The all-ones mask over the index prefix that follows this pattern.
    pub(crate) fn index_mask(self) -> u8 {
        match self.0 {
            0x80 => 0x7f,
            0x40 => 0x3f,
            0x20 => 0x1f,
            _ => 0x0f,
        }
    }
}

/// Name of a literal representation: either a reference into the tables or
/// literal octets.
pub(crate) enum Name {
    Index(usize),
    Literal(Vec<u8>),
}

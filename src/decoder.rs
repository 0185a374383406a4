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

use crate::error::{ErrorKind, HpackError};
use crate::representation::{Name, ReprDecoder, Representation};
use crate::table::{static_table, Header, IndexTable};
use crate::util::bytes::ByteCursor;

/// Decoder implementation of [`HPACK`].
///
/// [`HPACK`]: https://httpwg.org/specs/rfc7541.html
///
/// Owns the decode-side dynamic table and mirrors the insertions that the
/// remote encoder announced through incremental-indexing representations.
/// The table needs no reverse indexes; the decoder only resolves indices to
/// entries.
pub struct HpackDecoder {
    pub(crate) table: IndexTable,
    never_indexed: bool,
}

impl HpackDecoder {
    /// Creates a decoder whose dynamic table is bounded by
    /// `max_table_size` octets.
    pub fn new(max_table_size: usize) -> Self {
        Self {
            table: IndexTable::with_options(max_table_size, static_table().end_index(), false),
            never_indexed: false,
        }
    }

    /// Decodes at most one header field from the cursor.
    ///
    /// Returns `Ok(Some(header))` with the cursor advanced past exactly one
    /// representation, or `Ok(None)` when the input ends mid-representation;
    /// in that case the cursor is rewound to where the call found it and no
    /// table state has changed, so the caller can retry with more input.
    ///
    /// On `Err` the byte stream is malformed. The compression context is no
    /// longer synchronized with the peer and the surrounding connection must
    /// be torn down; neither the cursor position nor the dynamic table is
    /// meaningful afterwards.
    pub fn decode(&mut self, src: &mut ByteCursor<'_>) -> Result<Option<Header>, HpackError> {
        let mark = src.position();
        let repr = match ReprDecoder::new(src).decode() {
            Ok(Some(repr)) => repr,
            Ok(None) => {
                src.rewind(mark);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        self.never_indexed = matches!(repr, Representation::LiteralNeverIndexed { .. });
        match repr {
            Representation::Indexed { index } => {
                let header = self
                    .header_at(index)
                    .ok_or(HpackError::from(ErrorKind::InvalidIndex))?;
                Ok(Some(header.clone()))
            }
            Representation::LiteralWithIndexing { name, value } => {
                let header = self.resolve_literal(name, value)?;
                self.table.add_header(header.clone());
                Ok(Some(header))
            }
            Representation::LiteralWithoutIndexing { name, value }
            | Representation::LiteralNeverIndexed { name, value } => {
                Ok(Some(self.resolve_literal(name, value)?))
            }
            // RFC7541-4.2 requires acknowledging size changes signalled
            // through SETTINGS; this codec never shrinks its table, so the
            // instruction cannot be honored.
            Representation::SizeUpdate => Err(ErrorKind::UnsupportedSizeUpdate.into()),
        }
    }

    /// Whether the most recently decoded header field arrived in the
    /// never-indexed form. Proxies must re-encode such fields with
    /// [`IndexPolicy::NeverIndexed`](crate::IndexPolicy::NeverIndexed).
    pub fn is_never_indexed(&self) -> bool {
        self.never_indexed
    }

    /// Materializes a literal representation's header, resolving an indexed
    /// name through the tables.
    fn resolve_literal(&self, name: Name, value: Vec<u8>) -> Result<Header, HpackError> {
        let name = match name {
            Name::Index(index) => self
                .header_at(index)
                .ok_or(HpackError::from(ErrorKind::InvalidIndex))?
                .name
                .clone(),
            Name::Literal(octets) => octets,
        };
        Ok(Header { name, value })
    }

    /// Resolves an external index against the shared static/dynamic index
    /// address space.
    fn header_at(&self, index: usize) -> Option<&Header> {
        if index >= self.table.start_index() {
            self.table.header_at(index)
        } else {
            static_table().header_at(index)
        }
    }
}

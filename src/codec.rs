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

use crate::decoder::HpackDecoder;
use crate::encoder::{EncodeOptions, HpackEncoder};
use crate::error::HpackError;
use crate::table::Header;
use crate::util::bytes::{Appender, ByteCursor};

/// The initial value of `SETTINGS_HEADER_TABLE_SIZE` according to
/// rfc7540#section-6.5.2.
pub const DEFAULT_HEADER_TABLE_SIZE: usize = 4096;

/// A bidirectional [`HPACK`] codec for one HTTP/2 connection.
///
/// [`HPACK`]: https://httpwg.org/specs/rfc7541.html
///
/// Pairs an [`HpackEncoder`] for the sending direction with an
/// [`HpackDecoder`] for the receiving direction. The two dynamic tables are
/// independent: the encode-side table mirrors the remote decoder and the
/// decode-side table mirrors the remote encoder.
///
/// A codec belongs to a single connection and is mutated serially; it is
/// not meant to be shared between threads. The static table and the Huffman
/// tree behind it are process-wide, built on first use and read-only
/// afterwards.
///
/// Header names are expected to be lowercase already, as HTTP/2 requires;
/// this layer does not normalize them.
///
/// # Examples
/// ```
/// use ylong_hpack::{ByteCursor, EncodeOptions, Header, HpackCodec};
///
/// let mut sender = HpackCodec::new();
/// let mut receiver = HpackCodec::new();
///
/// let mut wire: Vec<u8> = Vec::new();
/// let header = Header::new("content-type", "text/html");
/// sender.encode(&mut wire, &header, &EncodeOptions::default());
///
/// let mut cursor = ByteCursor::new(&wire);
/// let decoded = receiver.decode(&mut cursor).unwrap().unwrap();
/// assert_eq!(decoded, header);
/// ```
pub struct HpackCodec {
    encoder: HpackEncoder,
    decoder: HpackDecoder,
}

impl HpackCodec {
    /// Creates a codec with the protocol-default table size of 4096 octets.
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_HEADER_TABLE_SIZE)
    }

    /// Creates a codec whose two dynamic tables are each bounded by
    /// `max_table_size` octets. Resizing a live codec is not supported.
    pub fn with_max_size(max_table_size: usize) -> Self {
        Self {
            encoder: HpackEncoder::new(max_table_size),
            decoder: HpackDecoder::new(max_table_size),
        }
    }

    /// Encodes one header field into `dst` and returns the octets written.
    /// See [`HpackEncoder::encode`].
    pub fn encode<S: Appender + ?Sized>(
        &mut self,
        dst: &mut S,
        header: &Header,
        options: &EncodeOptions,
    ) -> usize {
        self.encoder.encode(dst, header, options)
    }

    /// Decodes at most one header field from the cursor. See
    /// [`HpackDecoder::decode`] for the incomplete-input and error
    /// contracts.
    pub fn decode(&mut self, src: &mut ByteCursor<'_>) -> Result<Option<Header>, HpackError> {
        self.decoder.decode(src)
    }

    /// Decodes at most one header field from the front of a byte slice.
    ///
    /// Returns the header together with the number of octets it occupied,
    /// which the caller should drain from its buffer. `Ok(None)` means the
    /// slice holds no complete representation yet.
    pub fn decode_slice(&mut self, src: &[u8]) -> Result<Option<(Header, usize)>, HpackError> {
        let mut cursor = ByteCursor::new(src);
        match self.decoder.decode(&mut cursor)? {
            Some(header) => Ok(Some((header, cursor.position()))),
            None => Ok(None),
        }
    }

    /// Whether the most recently decoded header field arrived in the
    /// never-indexed form. See [`HpackDecoder::is_never_indexed`].
    pub fn is_never_indexed(&self) -> bool {
        self.decoder.is_never_indexed()
    }
}

impl Default for HpackCodec {
    fn default() -> Self {
        Self::new()
    }
}

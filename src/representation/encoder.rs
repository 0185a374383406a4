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

use crate::huffman::{huffman_encoded_len, HuffmanEncoder};
use crate::integer::encode_integer;
use crate::representation::PrefixBit;
use crate::util::bytes::Appender;

/// Encoder for a single header field representation.
///
/// Each method writes exactly one complete representation to the sink and
/// returns the number of octets written. Encoding never fails: the sink is
/// appendable, so there is no partial-write state to carry.
pub(crate) struct ReprEncoder<'a, S: Appender + ?Sized> {
    dst: &'a mut S,
}

impl<'a, S: Appender + ?Sized> ReprEncoder<'a, S> {
    pub(crate) fn new(dst: &'a mut S) -> Self {
        Self { dst }
    }

    /// Writes an indexed header field representation.
    pub(crate) fn encode_indexed(&mut self, index: usize) -> usize {
        encode_integer(
            self.dst,
            PrefixBit::INDEXED.prefix(),
            PrefixBit::INDEXED.index_mask(),
            index,
        )
    }

    /// Writes a literal representation whose name is a table reference.
    pub(crate) fn encode_indexed_name(
        &mut self,
        repr: PrefixBit,
        name_index: usize,
        value: &[u8],
        huffman_value: bool,
    ) -> usize {
        let mut written = encode_integer(self.dst, repr.prefix(), repr.index_mask(), name_index);
        written += self.encode_string(value, huffman_value);
        written
    }

    /// Writes a literal representation carrying both name and value as
    /// string literals. The index prefix is 0.
    pub(crate) fn encode_new_name(
        &mut self,
        repr: PrefixBit,
        name: &[u8],
        value: &[u8],
        huffman_name: bool,
        huffman_value: bool,
    ) -> usize {
        let mut written = encode_integer(self.dst, repr.prefix(), repr.index_mask(), 0);
        written += self.encode_string(name, huffman_name);
        written += self.encode_string(value, huffman_value);
        written
    }

    /// Writes a string literal: the Huffman flag and the 7-bit-prefix
    /// length of the encoded octets, then the octets themselves.
    fn encode_string(&mut self, octets: &[u8], huffman: bool) -> usize {
        if huffman {
            let length = huffman_encoded_len(octets);
            let written = encode_integer(self.dst, 0x80, 0x7f, length);
            let mut huffman_encoder = HuffmanEncoder::new(self.dst);
            for byte in octets.iter() {
                huffman_encoder.encode(*byte);
            }
            written + huffman_encoder.finish()
        } else {
            let written = encode_integer(self.dst, 0x00, 0x7f, octets.len());
            self.dst.append_bytes(octets);
            written + octets.len()
        }
    }
}

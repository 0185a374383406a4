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

//! [Huffman coding] implementation of the HTTP/2 protocol.
//!
//! [Huffman Coding]: https://en.wikipedia.org/wiki/Huffman_coding
//!
//! # Huffman code in Http/2
//! There is a table of Huffman code in `RFC7541`. This [Huffman code] was
//! generated from statistics obtained on a large sample of HTTP headers. It
//! is a canonical Huffman code with some tweaking to ensure that no symbol
//! has a unique code length.
//!
//! The code space covers the 256 octet values plus an end-of-stream symbol
//! (EOS). Encoded strings are padded to an octet boundary with the most
//! significant bits of the EOS code, which are all ones; a decoded EOS or
//! any other trailing bit pattern is a decoding error.
//!
//! [Huffman Code]: https://www.rfc-editor.org/rfc/rfc7541.html#ref-HUFFMAN

mod consts;

use std::sync::OnceLock;

use consts::{HUFFMAN_EOS, HUFFMAN_TABLE};

use crate::error::{ErrorKind, HpackError};
use crate::util::bytes::Appender;

/// One node of the decoding tree. Children are node ids into the tree's
/// arena; id 0 is the root and therefore marks an absent child.
#[derive(Clone, Copy)]
enum HuffmanNode {
    Internal { left: u16, right: u16 },
    Leaf { symbol: u16 },
}

/// The prefix tree over all 257 symbols, built once from [`HUFFMAN_TABLE`].
/// Reading the bits of a code from most to least significant descends from
/// the root, left on `0` and right on `1`, to the symbol's leaf.
pub(crate) struct HuffmanTree {
    nodes: Vec<HuffmanNode>,
}

impl HuffmanTree {
    fn new() -> Self {
        let mut tree = Self {
            nodes: vec![HuffmanNode::Internal { left: 0, right: 0 }],
        };
        for (symbol, &(code, bit_len)) in HUFFMAN_TABLE.iter().enumerate() {
            tree.add_leaf(symbol as u16, code, bit_len);
        }
        tree
    }

    fn add_leaf(&mut self, symbol: u16, code: u32, bit_len: u8) {
        let mut cur = 0usize;
        for i in (0..bit_len).rev() {
            let bit = ((code >> i) & 1) as u8;
            if i == 0 {
                let leaf = self.alloc(HuffmanNode::Leaf { symbol });
                self.link(cur, bit, leaf);
                return;
            }
            cur = match self.step(cur as u16, bit) {
                0 => {
                    let next = self.alloc(HuffmanNode::Internal { left: 0, right: 0 });
                    self.link(cur, bit, next);
                    next as usize
                }
                next => next as usize,
            };
        }
    }

    fn alloc(&mut self, node: HuffmanNode) -> u16 {
        let id = self.nodes.len() as u16;
        self.nodes.push(node);
        id
    }

    fn link(&mut self, parent: usize, bit: u8, child: u16) {
        if let HuffmanNode::Internal { left, right } = &mut self.nodes[parent] {
            match bit {
                0 => *left = child,
                _ => *right = child,
            }
        }
    }

    /// Follows one bit from `node`. Returns 0 when the branch is absent.
    fn step(&self, node: u16, bit: u8) -> u16 {
        match self.nodes[node as usize] {
            HuffmanNode::Internal { left, right } => match bit {
                0 => left,
                _ => right,
            },
            HuffmanNode::Leaf { .. } => 0,
        }
    }
}

/// Returns the process-wide decoding tree, building it on first use.
pub(crate) fn huffman_tree() -> &'static HuffmanTree {
    static TREE: OnceLock<HuffmanTree> = OnceLock::new();
    TREE.get_or_init(HuffmanTree::new)
}

/// Returns the number of octets the Huffman encoding of `src` occupies,
/// without encoding it.
pub(crate) fn huffman_encoded_len(src: &[u8]) -> usize {
    let mut bits = 0usize;
    for byte in src.iter() {
        bits += HUFFMAN_TABLE[*byte as usize].1 as usize;
    }
    bits.div_ceil(8)
}

/// Bit-packs Huffman codes into the sink, most significant bit first.
///
/// The encoder holds at most one partially filled octet. `remain` counts its
/// unfilled low bits, so `remain == 8` means the accumulator is empty.
pub(crate) struct HuffmanEncoder<'a, S: Appender + ?Sized> {
    dst: &'a mut S,
    partial: u8,
    remain: u32,
    written: usize,
}

impl<'a, S: Appender + ?Sized> HuffmanEncoder<'a, S> {
    pub(crate) fn new(dst: &'a mut S) -> Self {
        Self {
            dst,
            partial: 0,
            remain: 8,
            written: 0,
        }
    }

    /// Appends the code of one input octet to the bit stream.
    pub(crate) fn encode(&mut self, byte: u8) {
        let (code, bit_len) = HUFFMAN_TABLE[byte as usize];
        let mut left = bit_len as u32;
        while left > 0 {
            let take = self.remain.min(left);
            // Clear the already written leading bits, then align the chunk
            // to the accumulator's unfilled area.
            let chunk = (code & ((1u32 << left) - 1)) >> (left - take);
            self.partial |= (chunk as u8) << (self.remain - take);
            self.remain -= take;
            left -= take;
            if self.remain == 0 {
                self.dst.push_byte(self.partial);
                self.written += 1;
                self.partial = 0;
                self.remain = 8;
            }
        }
    }

    /// Ends the stream, padding any unfilled bits with `1`s (the most
    /// significant bits of the EOS code). Returns total octets written.
    pub(crate) fn finish(mut self) -> usize {
        if self.remain < 8 {
            self.partial |= (1u8 << self.remain) - 1;
            self.dst.push_byte(self.partial);
            self.written += 1;
        }
        self.written
    }
}

/// Walks the decoding tree bit by bit, most significant bit first.
///
/// `depth` counts the bits consumed since the last emitted symbol and
/// `padding` stays `true` only while every one of those bits was a `1`, so
/// that the trailing partial octet can be validated as an EOS prefix.
pub(crate) struct HuffmanDecoder {
    node: u16,
    depth: u16,
    padding: bool,
    buf: Vec<u8>,
}

impl HuffmanDecoder {
    pub(crate) fn new() -> Self {
        Self {
            node: 0,
            depth: 0,
            padding: true,
            buf: Vec::new(),
        }
    }

    /// Decodes input octets. Stops when `src` is used up.
    pub(crate) fn decode(&mut self, src: &[u8]) -> Result<(), HpackError> {
        let tree = huffman_tree();
        for byte in src.iter() {
            for i in (0..8).rev() {
                let bit = (byte >> i) & 1;
                let next = tree.step(self.node, bit);
                if next == 0 {
                    return Err(ErrorKind::InvalidHuffmanCode.into());
                }
                match tree.nodes[next as usize] {
                    HuffmanNode::Leaf { symbol } => {
                        if symbol == HUFFMAN_EOS {
                            return Err(ErrorKind::InvalidHuffmanCode.into());
                        }
                        self.buf.push(symbol as u8);
                        self.node = 0;
                        self.depth = 0;
                        self.padding = true;
                    }
                    HuffmanNode::Internal { .. } => {
                        self.node = next;
                        self.depth += 1;
                        self.padding = self.padding && bit == 1;
                    }
                }
            }
        }
        Ok(())
    }

    /// Finishes decoding and gets the decoded result.
    ///
    /// The stream must end on a symbol boundary or inside a run of `1` bits
    /// no longer than 7, i.e. a strict prefix of the EOS code.
    pub(crate) fn finish(self) -> Result<Vec<u8>, HpackError> {
        if self.depth == 0 || (self.depth <= 7 && self.padding) {
            return Ok(self.buf);
        }
        Err(ErrorKind::InvalidHuffmanCode.into())
    }
}

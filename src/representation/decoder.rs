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
use crate::huffman::HuffmanDecoder;
use crate::integer::IntegerDecoder;
use crate::representation::{Name, PrefixBit, Representation};
use crate::util::bytes::ByteCursor;

/// Unwraps a decoded value, propagating both "need more input" and errors
/// to the caller.
macro_rules! decoded {
    ($expr: expr) => {
        match $expr {
            Ok(Some(value)) => value,
            Ok(None) => return Ok(None),
            Err(e) => return Err(e),
        }
    };
}

/// Decoder for a single header field representation.
///
/// Every call to `decode` reads at most one representation from the cursor.
/// `Ok(None)` means the input ended mid-representation; the cursor is then
/// mid-way through the partial data and the caller is expected to rewind it
/// to a checkpoint and retry once more bytes are available. Nothing is
/// retained between calls.
pub(crate) struct ReprDecoder<'a, 'b> {
    src: &'b mut ByteCursor<'a>,
}

impl<'a, 'b> ReprDecoder<'a, 'b> {
    pub(crate) fn new(src: &'b mut ByteCursor<'a>) -> Self {
        Self { src }
    }

    /// Decodes one `Representation` from the cursor.
    pub(crate) fn decode(&mut self) -> Result<Option<Representation>, HpackError> {
        let first = match self.src.peek() {
            Some(byte) => byte,
            None => return Ok(None),
        };
        let repr = PrefixBit::from_u8(first);
        // A size update is rejected by the caller whatever its operand
        // says, so it is reported before any of its bytes are parsed.
        if repr == PrefixBit::SIZE_UPDATE {
            return Ok(Some(Representation::SizeUpdate));
        }
        let index = decoded!(self.decode_integer(repr.index_mask()));

        match repr {
            PrefixBit::INDEXED => {
                // RFC7541-6.1: The index value of 0 is not used. It MUST be
                // treated as a decoding error if found in an indexed header
                // field representation.
                if index == 0 {
                    return Err(ErrorKind::InvalidIndex.into());
                }
                Ok(Some(Representation::Indexed { index }))
            }
            _ => {
                let name = match index {
                    0 => Name::Literal(decoded!(self.decode_string())),
                    _ => Name::Index(index),
                };
                let value = decoded!(self.decode_string());
                Ok(Some(match repr {
                    PrefixBit::LITERAL_WITH_INDEXING => {
                        Representation::LiteralWithIndexing { name, value }
                    }
                    PrefixBit::LITERAL_NEVER_INDEXED => {
                        Representation::LiteralNeverIndexed { name, value }
                    }
                    _ => Representation::LiteralWithoutIndexing { name, value },
                }))
            }
        }
    }

    /// Decodes a prefix integer starting at the cursor's current byte.
    fn decode_integer(&mut self, mask: u8) -> Result<Option<usize>, HpackError> {
        let byte = match self.src.next_byte() {
            Some(byte) => byte,
            None => return Ok(None),
        };
        let mut int = match IntegerDecoder::first_byte(byte, mask) {
            Ok(value) => return Ok(Some(value)),
            Err(int) => int,
        };
        loop {
            let byte = match self.src.next_byte() {
                Some(byte) => byte,
                None => return Ok(None),
            };
            if let Some(value) = int.next_byte(byte)? {
                return Ok(Some(value));
            }
        }
    }

    /// Decodes a string literal: a Huffman flag and 7-bit-prefix length,
    /// then that many payload octets. The payload is only consumed once it
    /// is fully present.
    fn decode_string(&mut self) -> Result<Option<Vec<u8>>, HpackError> {
        let first = match self.src.peek() {
            Some(byte) => byte,
            None => return Ok(None),
        };
        let huffman = (first & 0x80) == 0x80;
        let length = decoded!(self.decode_integer(0x7f));
        if length > self.src.bytes_left() {
            return Ok(None);
        }
        if huffman {
            let mut huffman_decoder = HuffmanDecoder::new();
            huffman_decoder.decode(self.src.take_slice(length))?;
            huffman_decoder.finish().map(Some)
        } else {
            let mut octets = Vec::with_capacity(length);
            self.src.copy_and_advance(&mut octets, length);
            Ok(Some(octets))
        }
    }
}

#[cfg(test)]
mod ut_repr_decoder {
    use super::*;
    use crate::util::test_util::decode;

    /// UT test cases for `ReprDecoder`.
    ///
    /// # Brief
    /// 1. Creates a `ReprDecoder`.
    /// 2. Calls `ReprDecoder::decode()`, passing in the specified
    ///    parameters.
    /// 3. Checks if the test results are correct.
    #[test]
    fn ut_repr_decoder() {
        rfc7541_test_cases();

        macro_rules! inner_test_case {
            ($cursor: expr, $pat: ident => $index: expr) => {
                match ReprDecoder::new(&mut $cursor).decode() {
                    Ok(Some(Representation::$pat { index })) => assert_eq!($index, index),
                    _ => panic!("ReprDecoder::decode() failed!"),
                }
            };
            ($cursor: expr, $pat: ident, $kind: ident => $name: expr, $value: expr) => {
                match ReprDecoder::new(&mut $cursor).decode() {
                    Ok(Some(Representation::$pat {
                        name: Name::$kind(n),
                        value: v,
                    })) => {
                        assert_eq!($name, n);
                        assert_eq!($value, v);
                    }
                    _ => panic!("ReprDecoder::decode() failed!"),
                }
            };
        }

        macro_rules! repr_test_case {
            ($octets: literal, $({ $pat: ident $(, $kind: ident)? => $first: expr $(, $second: expr)?} $(,)?)*) => {
                let slice = decode($octets).unwrap();
                let mut cursor = ByteCursor::new(&slice);
                $(
                    inner_test_case!(cursor, $pat $(, $kind)? => $first $(, $second)?);
                )*
                assert!(cursor.is_empty());
            }
        }

        /// The following test cases are from RFC7541.
        fn rfc7541_test_cases() {
            // C.2.1. Literal Header Field with Indexing
            repr_test_case!(
                "400a637573746f6d2d6b65790d637573746f6d2d686561646572",
                { LiteralWithIndexing, Literal => b"custom-key".to_vec(), b"custom-header".to_vec() }
            );

            // C.2.2. Literal Header Field without Indexing
            repr_test_case!(
                "040c2f73616d706c652f70617468",
                { LiteralWithoutIndexing, Index => 4, b"/sample/path".to_vec() }
            );

            // C.2.3. Literal Header Field Never Indexed
            repr_test_case!(
                "100870617373776f726406736563726574",
                { LiteralNeverIndexed, Literal => b"password".to_vec(), b"secret".to_vec() }
            );

            // C.2.4. Indexed Header Field
            repr_test_case!(
                "82",
                { Indexed => 2 }
            );

            // C.3.1. First Request
            repr_test_case!(
                "828684410f7777772e6578616d706c652e636f6d",
                { Indexed => 2 },
                { Indexed => 6 },
                { Indexed => 4 },
                { LiteralWithIndexing, Index => 1, b"www.example.com".to_vec() }
            );

            // C.4.1. First Request (Huffman)
            repr_test_case!(
                "828684418cf1e3c2e5f23a6ba0ab90f4ff",
                { Indexed => 2 },
                { Indexed => 6 },
                { Indexed => 4 },
                { LiteralWithIndexing, Index => 1, b"www.example.com".to_vec() }
            );

            // C.6.2. Second Response (Huffman)
            repr_test_case!(
                "4883640effc1c0bf",
                { LiteralWithIndexing, Index => 8, b"307".to_vec() },
                { Indexed => 65 },
                { Indexed => 64 },
                { Indexed => 63 }
            );
        }
    }

    /// UT test cases for size update and zero index decoding.
    ///
    /// # Brief
    /// 1. Decodes a size update instruction and an indexed representation
    ///    with index 0.
    /// 2. Checks that the former is recognized without consuming its
    ///    operand and the latter errors.
    #[test]
    fn ut_repr_decoder_special_forms() {
        let bytes = [0x3f, 0xe1, 0x1f];
        let mut cursor = ByteCursor::new(&bytes);
        match ReprDecoder::new(&mut cursor).decode() {
            Ok(Some(Representation::SizeUpdate)) => {}
            _ => panic!("ReprDecoder::decode() failed!"),
        }

        let bytes = [0x80];
        let mut cursor = ByteCursor::new(&bytes);
        match ReprDecoder::new(&mut cursor).decode() {
            Err(e) => assert_eq!(e, HpackError::from(ErrorKind::InvalidIndex)),
            _ => panic!("index 0 must be a decoding error"),
        }
    }

    /// UT test cases for truncated input.
    ///
    /// # Brief
    /// 1. Decodes every proper prefix of valid representations.
    /// 2. Checks that each attempt reports incomplete input, not an error.
    #[test]
    fn ut_repr_decoder_truncated() {
        for octets in [
            "400a637573746f6d2d6b65790d637573746f6d2d686561646572",
            "040c2f73616d706c652f70617468",
            "418cf1e3c2e5f23a6ba0ab90f4ff",
            "1f9a0a",
        ] {
            let bytes = decode(octets).unwrap();
            for cut in 0..bytes.len() {
                let mut cursor = ByteCursor::new(&bytes[..cut]);
                match ReprDecoder::new(&mut cursor).decode() {
                    Ok(None) => {}
                    _ => panic!("truncated input at {cut} must report incomplete"),
                }
            }
        }
    }
}

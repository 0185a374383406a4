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

use crate::representation::{PrefixBit, ReprEncoder};
use crate::table::{static_table, Header, IndexTable};
use crate::util::bytes::Appender;

/// How a header field is allowed to interact with the index tables.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum IndexPolicy {
    /// Replace the field by an index when possible; otherwise transmit it
    /// literally and add it to both peers' dynamic tables.
    #[default]
    Incremental,

    /// Replace the field by an index when possible, but never touch the
    /// dynamic tables.
    NotIndexed,

    /// Always transmit the field literally, marked so that intermediaries
    /// must do the same. For sensitive values such as credentials.
    NeverIndexed,
}

/// Options controlling how one header field is encoded.
#[derive(Debug, Default, Copy, Clone)]
pub struct EncodeOptions {
    /// How to index this header field.
    pub index_policy: IndexPolicy,

    /// If `true`, a literally transmitted name is Huffman coded.
    pub huffman_name: bool,

    /// If `true`, a literally transmitted value is Huffman coded.
    pub huffman_value: bool,
}

/// Encoder implementation of [`HPACK`].
///
/// [`HPACK`]: https://httpwg.org/specs/rfc7541.html
///
/// Owns the encode-side dynamic table. The table mirrors what the peer's
/// decoder will build from the emitted representations, so an encoder and
/// its paired remote decoder must see the same stream in the same order.
pub struct HpackEncoder {
    pub(crate) table: IndexTable,
}

impl HpackEncoder {
    /// Creates an encoder whose dynamic table is bounded by
    /// `max_table_size` octets.
    pub fn new(max_table_size: usize) -> Self {
        Self {
            table: IndexTable::with_options(max_table_size, static_table().end_index(), true),
        }
    }

    /// Encodes one header field into `dst` and returns the octets written.
    ///
    /// The smallest permitted representation is chosen: a full
    /// `(name, value)` table match becomes a one-integer indexed field
    /// (unless the policy is [`IndexPolicy::NeverIndexed`]), otherwise a
    /// literal is emitted with the name referenced by index when any table
    /// knows it. Under [`IndexPolicy::Incremental`] the field enters the
    /// encode-side table before the literal is written out, matching the
    /// decoder, which inserts after parsing; the new entry cannot be
    /// referenced by its own representation, so both sides observe the same
    /// index space.
    pub fn encode<S: Appender + ?Sized>(
        &mut self,
        dst: &mut S,
        header: &Header,
        options: &EncodeOptions,
    ) -> usize {
        if options.index_policy != IndexPolicy::NeverIndexed {
            if let Some(index) = self.find_header(header) {
                return ReprEncoder::new(dst).encode_indexed(index);
            }
        }

        let name_index = self.find_name(&header.name).unwrap_or(0);
        if options.index_policy == IndexPolicy::Incremental {
            self.table.add_header(header.clone());
        }

        let repr = match options.index_policy {
            IndexPolicy::Incremental => PrefixBit::LITERAL_WITH_INDEXING,
            IndexPolicy::NotIndexed => PrefixBit::LITERAL_WITHOUT_INDEXING,
            IndexPolicy::NeverIndexed => PrefixBit::LITERAL_NEVER_INDEXED,
        };
        let mut repr_encoder = ReprEncoder::new(dst);
        match name_index {
            0 => repr_encoder.encode_new_name(
                repr,
                &header.name,
                &header.value,
                options.huffman_name,
                options.huffman_value,
            ),
            _ => repr_encoder.encode_indexed_name(
                repr,
                name_index,
                &header.value,
                options.huffman_value,
            ),
        }
    }

    fn find_header(&self, header: &Header) -> Option<usize> {
        static_table()
            .index_of_header(header)
            .or_else(|| self.table.index_of_header(header))
    }

    fn find_name(&self, name: &[u8]) -> Option<usize> {
        static_table()
            .index_of_name(name)
            .or_else(|| self.table.index_of_name(name))
    }
}

#[cfg(test)]
mod ut_hpack_encoder {
    use super::*;
    use crate::util::test_util::decode;

    fn plain(index_policy: IndexPolicy) -> EncodeOptions {
        EncodeOptions {
            index_policy,
            huffman_name: false,
            huffman_value: false,
        }
    }

    /// UT test cases for `HpackEncoder`.
    ///
    /// # Brief
    /// 1. Creates a `HpackEncoder`.
    /// 2. Calls `HpackEncoder::encode()`, passing in the specified
    ///    parameters.
    /// 3. Checks the emitted octets and the dynamic table size.
    #[test]
    fn ut_hpack_encoder() {
        rfc7541_test_cases();

        macro_rules! hpack_test_case {
            (
                $encoder: expr, $res: literal, $size: expr,
                $({ $name: literal, $value: literal, $opts: expr } $(,)?)*
            ) => {
                let _encoder = $encoder;
                let mut vec: Vec<u8> = Vec::new();
                let mut written = 0;
                $(
                    written += _encoder.encode(
                        &mut vec,
                        &Header::new($name.as_bytes(), $value.as_bytes()),
                        &$opts,
                    );
                )*
                assert_eq!(written, vec.len());
                assert_eq!(vec, decode($res).unwrap());
                assert_eq!(_encoder.table.size(), $size);
            }
        }

        /// The following test cases are from RFC7541.
        fn rfc7541_test_cases() {
            // C.2.1. Literal Header Field with Indexing
            hpack_test_case!(
                &mut HpackEncoder::new(4096),
                "400a637573746f6d2d6b65790d637573746f6d2d686561646572", 55,
                { "custom-key", "custom-header", plain(IndexPolicy::Incremental) },
            );

            // C.2.2. Literal Header Field without Indexing
            hpack_test_case!(
                &mut HpackEncoder::new(4096),
                "040c2f73616d706c652f70617468", 0,
                { ":path", "/sample/path", plain(IndexPolicy::NotIndexed) },
            );

            // C.2.3. Literal Header Field Never Indexed
            hpack_test_case!(
                &mut HpackEncoder::new(4096),
                "100870617373776f726406736563726574", 0,
                { "password", "secret", plain(IndexPolicy::NeverIndexed) },
            );

            // C.2.4. Indexed Header Field
            hpack_test_case!(
                &mut HpackEncoder::new(4096),
                "82", 0,
                { ":method", "GET", plain(IndexPolicy::Incremental) },
            );

            // C.3. Request Examples without Huffman Coding
            {
                let mut encoder = HpackEncoder::new(4096);
                // C.3.1. First Request
                hpack_test_case!(
                    &mut encoder,
                    "828684410f7777772e6578616d706c652e636f6d", 57,
                    { ":method", "GET", plain(IndexPolicy::Incremental) },
                    { ":scheme", "http", plain(IndexPolicy::Incremental) },
                    { ":path", "/", plain(IndexPolicy::Incremental) },
                    { ":authority", "www.example.com", plain(IndexPolicy::Incremental) },
                );

                // C.3.2. Second Request
                hpack_test_case!(
                    &mut encoder,
                    "828684be58086e6f2d6361636865", 110,
                    { ":method", "GET", plain(IndexPolicy::Incremental) },
                    { ":scheme", "http", plain(IndexPolicy::Incremental) },
                    { ":path", "/", plain(IndexPolicy::Incremental) },
                    { ":authority", "www.example.com", plain(IndexPolicy::Incremental) },
                    { "cache-control", "no-cache", plain(IndexPolicy::Incremental) },
                );

                // C.3.3. Third Request
                hpack_test_case!(
                    &mut encoder,
                    "828785bf400a637573746f6d2d6b65790c637573746f6d2d76616c7565", 164,
                    { ":method", "GET", plain(IndexPolicy::Incremental) },
                    { ":scheme", "https", plain(IndexPolicy::Incremental) },
                    { ":path", "/index.html", plain(IndexPolicy::Incremental) },
                    { ":authority", "www.example.com", plain(IndexPolicy::Incremental) },
                    { "custom-key", "custom-value", plain(IndexPolicy::Incremental) },
                );
            }

            // C.4.1. First Request (with Huffman coding on values)
            hpack_test_case!(
                &mut HpackEncoder::new(4096),
                "828684418cf1e3c2e5f23a6ba0ab90f4ff", 57,
                { ":method", "GET", EncodeOptions { huffman_value: true, ..plain(IndexPolicy::Incremental) } },
                { ":scheme", "http", EncodeOptions { huffman_value: true, ..plain(IndexPolicy::Incremental) } },
                { ":path", "/", EncodeOptions { huffman_value: true, ..plain(IndexPolicy::Incremental) } },
                { ":authority", "www.example.com", EncodeOptions { huffman_value: true, ..plain(IndexPolicy::Incremental) } },
            );

            // C.5. Response Examples without Huffman Coding, 256-octet table
            {
                let mut encoder = HpackEncoder::new(256);
                // C.5.1. First Response
                hpack_test_case!(
                    &mut encoder,
                    "4803333032580770726976617465611d\
                    4d6f6e2c203231204f63742032303133\
                    2032303a31333a323120474d546e1768\
                    747470733a2f2f7777772e6578616d70\
                    6c652e636f6d",
                    222,
                    { ":status", "302", plain(IndexPolicy::Incremental) },
                    { "cache-control", "private", plain(IndexPolicy::Incremental) },
                    { "date", "Mon, 21 Oct 2013 20:13:21 GMT", plain(IndexPolicy::Incremental) },
                    { "location", "https://www.example.com", plain(IndexPolicy::Incremental) },
                );

                // C.5.2. Second Response
                hpack_test_case!(
                    &mut encoder,
                    "4803333037c1c0bf", 222,
                    { ":status", "307", plain(IndexPolicy::Incremental) },
                    { "cache-control", "private", plain(IndexPolicy::Incremental) },
                    { "date", "Mon, 21 Oct 2013 20:13:21 GMT", plain(IndexPolicy::Incremental) },
                    { "location", "https://www.example.com", plain(IndexPolicy::Incremental) },
                );

                // C.5.3. Third Response
                hpack_test_case!(
                    &mut encoder,
                    "88c1611d4d6f6e2c203231204f637420\
                    323031332032303a31333a323220474d\
                    54c05a04677a69707738666f6f3d4153\
                    444a4b48514b425a584f5157454f5049\
                    5541585157454f49553b206d61782d61\
                    67653d333630303b2076657273696f6e\
                    3d31",
                    215,
                    { ":status", "200", plain(IndexPolicy::Incremental) },
                    { "cache-control", "private", plain(IndexPolicy::Incremental) },
                    { "date", "Mon, 21 Oct 2013 20:13:22 GMT", plain(IndexPolicy::Incremental) },
                    { "location", "https://www.example.com", plain(IndexPolicy::Incremental) },
                    { "content-encoding", "gzip", plain(IndexPolicy::Incremental) },
                    { "set-cookie", "foo=ASDJKHQKBZXOQWEOPIUAXQWEOIU; max-age=3600; version=1", plain(IndexPolicy::Incremental) },
                );
            }
        }
    }

    /// UT test cases for policies that must not grow the table.
    ///
    /// # Brief
    /// 1. Encodes fields under the non-indexing policies.
    /// 2. Checks the table stays empty and later encodes cannot reference
    ///    them.
    #[test]
    fn ut_hpack_encoder_no_indexing() {
        let mut encoder = HpackEncoder::new(4096);
        let header = Header::new("x-secret", "token");
        let mut vec: Vec<u8> = Vec::new();
        encoder.encode(&mut vec, &header, &plain(IndexPolicy::NeverIndexed));
        assert!(encoder.table.is_empty());

        // A full match in the dynamic table is ignored for never-indexed
        // fields even after the header has been inserted once.
        let mut vec: Vec<u8> = Vec::new();
        encoder.encode(&mut vec, &header, &plain(IndexPolicy::Incremental));
        assert!(!encoder.table.is_empty());
        let mut never: Vec<u8> = Vec::new();
        let written = encoder.encode(&mut never, &header, &plain(IndexPolicy::NeverIndexed));
        assert!(written > 1);
        assert_eq!(never[0] & 0xf0, 0x10);
    }
}

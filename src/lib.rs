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

//! `ylong_hpack` implements [HPACK], the header compression format of the
//! [HTTP/2 protocol], as a standalone codec.
//!
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//! [HTTP/2 protocol]: https://httpwg.org/specs/rfc9113.html
//!
//! # Introduction
//! HTTP/2 peers compress request and response header lists with a stateful
//! scheme built from three parts: a fixed static table of common header
//! fields, a bounded dynamic table that both peers keep synchronized, and a
//! canonical Huffman code for string literals. [`HpackCodec`] bundles the
//! encoding and decoding direction of one connection; [`HpackEncoder`] and
//! [`HpackDecoder`] are the two halves for callers that only need one.
//!
//! The codec performs no I/O of its own. Encoded octets go into any
//! [`Appender`] and decoding reads from a [`ByteCursor`]; an incomplete
//! header representation is reported as `Ok(None)` with nothing consumed, so
//! the caller can simply retry after more octets arrive.
//!
//! Dynamic table size updates (RFC 7541 section 6.3) are not supported:
//! they are never emitted and are rejected when decoded.

mod codec;
mod decoder;
mod encoder;
mod error;
mod huffman;
mod integer;
mod representation;
mod table;

pub(crate) mod util;

pub use codec::{HpackCodec, DEFAULT_HEADER_TABLE_SIZE};
pub use decoder::HpackDecoder;
pub use encoder::{EncodeOptions, HpackEncoder, IndexPolicy};
pub use error::HpackError;
pub use integer::MAX_HPACK_INTEGER;
pub use table::Header;
pub use util::bytes::{Appender, ByteCursor};

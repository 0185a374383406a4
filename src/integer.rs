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

//! [Integer Representation] implementation of [HPACK].
//!
//! [Integer Representation]: https://httpwg.org/specs/rfc7541.html#integer.representation
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! # Introduction
//! Integers are used to represent name indexes, header field indexes, or
//! string lengths. An integer representation can start anywhere within an
//! octet. To allow for optimized processing, an integer representation always
//! finishes at the end of an octet.

use core::cmp::Ordering;

use crate::error::{ErrorKind, HpackError};
use crate::util::bytes::Appender;

/// No header representation carries an integer this large. Streams that try
/// are treated as malformed rather than accumulated without bound.
pub const MAX_HPACK_INTEGER: usize = 10 * 1024 * 1024;

/// Encodes an integer according to `Pseudocode to represent an integer I` in
/// `RFC7541 section-5.1` and appends it to `dst`. `mask` is the all-ones
/// prefix of `N` bits and `pre` carries the fixed leading `8 - N` bits.
/// Returns the number of bytes written.
///
/// # Pseudocode
/// ```text
/// if I < 2^N - 1, encode I on N bits
/// else
///     encode (2^N - 1) on N bits
///     I = I - (2^N - 1)
///     while I >= 128
///          encode (I % 128 + 128) on 8 bits
///          I = I / 128
///     encode I on 8 bits
/// ```
pub(crate) fn encode_integer<S: Appender + ?Sized>(
    dst: &mut S,
    pre: u8,
    mask: u8,
    value: usize,
) -> usize {
    if value < mask as usize {
        dst.push_byte(pre | value as u8);
        return 1;
    }
    dst.push_byte(pre | mask);
    let mut value = value - mask as usize;
    let mut written = 1;
    while value >= 128 {
        dst.push_byte((value & 0x7f) as u8 | 0x80);
        value >>= 7;
        written += 1;
    }
    dst.push_byte(value as u8);
    written + 1
}

/// `IntegerDecoder` implementation according to `Pseudocode to decode an
/// integer I` in `RFC7541 section-5.1`.
///
/// # Pseudocode
/// ```text
/// decode I from the next N bits
/// if I < 2^N - 1, return I
/// else
///     M = 0
///     repeat
///         B = next octet
///         I = I + (B & 127) * 2^M
///         M = M + 7
///     while B & 128 == 128
///     return I
/// ```
pub(crate) struct IntegerDecoder {
    value: usize,
    shift: u32,
}

impl IntegerDecoder {
    /// Calculates an integer based on the incoming first byte and mask.
    /// If no subsequent bytes exist, return the result directly, otherwise
    /// return the decoder itself.
    pub(crate) fn first_byte(byte: u8, mask: u8) -> Result<usize, Self> {
        let value = byte & mask;
        match value.cmp(&mask) {
            Ordering::Less => Ok(value as usize),
            _ => Err(Self {
                value: value as usize,
                shift: 0,
            }),
        }
    }

    /// Continues computing the integer based on the next byte of the input.
    /// Returns `Ok(Some(value))` if the result is obtained, `Ok(None)` if
    /// more bytes are needed, and `Err` once the integer reaches
    /// [`MAX_HPACK_INTEGER`].
    pub(crate) fn next_byte(&mut self, byte: u8) -> Result<Option<usize>, HpackError> {
        let add = (byte & 0x7f) as usize;
        if add != 0 {
            self.value = add
                .checked_shl(self.shift)
                .and_then(|add| add.checked_add(self.value))
                .ok_or(HpackError::from(ErrorKind::IntegerOverflow))?;
        }
        self.shift += 7;
        if self.value >= MAX_HPACK_INTEGER {
            return Err(ErrorKind::IntegerOverflow.into());
        }
        match byte & 0x80 {
            0x00 => Ok(Some(self.value)),
            _ => Ok(None),
        }
    }
}

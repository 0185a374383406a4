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

//! The [`Indexing Tables`][indexing_tables] implementation of [HPACK].
//!
//! [indexing_tables]: https://httpwg.org/specs/rfc7541.html#indexing.tables
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! # Introduction
//! HPACK uses two tables for associating header fields to indexes. The
//! static table is predefined and contains common header fields. The dynamic
//! table is a bounded list of header fields maintained in first-in, first-out
//! order; the first and newest entry is at the lowest index, and the oldest
//! entry is at the highest index. Both tables share a single index address
//! space: the static table occupies indices 1 through 61 and the dynamic
//! table begins right after it.
//!
//! The dynamic table can contain duplicate entries. Therefore, duplicate
//! entries MUST NOT be treated as an error by a decoder.

use std::collections::{HashMap, VecDeque};
use std::sync::OnceLock;

/// A header field: a name paired with a value, both owned byte strings.
///
/// Names are expected to be ASCII-lowercase, as HTTP/2 requires of every
/// header field name prior to encoding. An empty value is valid; such
/// entries are findable by name only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Header {
    /// Header name (lowercase).
    pub name: Vec<u8>,
    /// Header value.
    pub value: Vec<u8>,
}

impl Header {
    /// Creates a new `Header` from anything convertible to owned bytes.
    pub fn new(name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The octets this entry occupies in a table.
    ///
    /// RFC7541-4.1: The additional 32 octets account for an estimated
    /// overhead associated with an entry.
    pub fn size(&self) -> usize {
        self.name.len() + self.value.len() + 32
    }
}

/// Reverse lookups for the encoder. Each map points at the *latest*
/// insertion id of its key; older duplicates are shadowed. The encoder only
/// cares whether a header is present somewhere, and the latest duplicate is
/// always the last one to be evicted.
struct TableIndexes {
    header: HashMap<Header, u64>,
    name: HashMap<Vec<u8>, u64>,
}

/// A bounded FIFO of header entries addressed by external HPACK indices.
///
/// One instance backs the static table (unbounded, shared) and two more back
/// each codec's dynamic tables. External indices stay stable while entries
/// age: the newest entry always sits at `start_index` and every insertion
/// shifts the older entries up by one. Internally that is bookkept with
/// `add_times`, a monotonic count of insertions, so that an entry inserted
/// as id `t` is currently at external index
/// `start_index + (add_times - t) - 1`.
pub(crate) struct IndexTable {
    start_index: usize,
    add_times: u64,
    size: usize,
    max_size: usize,
    queue: VecDeque<Header>,
    indexes: Option<TableIndexes>,
}

impl IndexTable {
    /// Creates a table whose first entry will be published at
    /// `start_index`. Reverse indexes are only maintained when
    /// `need_indexes` is set; decoder-side tables never look headers up.
    pub(crate) fn with_options(max_size: usize, start_index: usize, need_indexes: bool) -> Self {
        Self {
            start_index,
            add_times: 0,
            size: 0,
            max_size,
            queue: VecDeque::new(),
            indexes: need_indexes.then(|| TableIndexes {
                header: HashMap::new(),
                name: HashMap::new(),
            }),
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn max_size(&self) -> usize {
        self.max_size
    }

    pub(crate) fn start_index(&self) -> usize {
        self.start_index
    }

    /// The external index one past the oldest live entry, which is also the
    /// index the next insertion will publish at.
    pub(crate) fn end_index(&self) -> usize {
        self.start_index + self.queue.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Gets the entry at an external index, newest first.
    pub(crate) fn header_at(&self, index: usize) -> Option<&Header> {
        if index < self.start_index {
            return None;
        }
        self.queue.get(index - self.start_index)
    }

    /// Looks up the external index of an exact `(name, value)` match.
    /// Entries with empty values are not findable here, only by name.
    pub(crate) fn index_of_header(&self, header: &Header) -> Option<usize> {
        let indexes = self.indexes.as_ref()?;
        let id = indexes.header.get(header)?;
        Some(self.index_of_id(*id))
    }

    /// Looks up the external index of the latest entry with this name.
    pub(crate) fn index_of_name(&self, name: &[u8]) -> Option<usize> {
        let indexes = self.indexes.as_ref()?;
        let id = indexes.name.get(name)?;
        Some(self.index_of_id(*id))
    }

    fn index_of_id(&self, id: u64) -> usize {
        // The latest added entry has the smallest index.
        self.start_index + (self.add_times - id) as usize - 1
    }

    /// Inserts an entry, evicting from the oldest end until it fits.
    ///
    /// RFC7541-4.4: an entry larger than the whole table empties the table
    /// and is itself not inserted. This is not an error.
    pub(crate) fn add_header(&mut self, header: Header) {
        debug_assert!(!header.name.is_empty());
        let entry_size = header.size();

        while !self.is_empty() && self.size() + entry_size > self.max_size() {
            self.pop_header();
        }

        if entry_size > self.max_size() {
            debug_assert!(self.is_empty());
            return;
        }

        self.size += entry_size;
        let id = self.add_times;
        self.add_times += 1;
        if let Some(indexes) = &mut self.indexes {
            // Overwrite the previous id so lookups always see the newest
            // duplicate.
            if !header.value.is_empty() {
                indexes.header.insert(header.clone(), id);
            }
            indexes.name.insert(header.name.clone(), id);
        }
        self.queue.push_front(header);
    }

    /// Evicts the oldest entry.
    pub(crate) fn pop_header(&mut self) {
        let Some(header) = self.queue.back() else {
            return;
        };
        // Erase the reverse index slots only if they still point at this
        // entry. A newer duplicate with the same key must keep its mapping
        // when an older shadowed one ages out.
        let id = self.add_times - self.queue.len() as u64;
        if let Some(indexes) = &mut self.indexes {
            if indexes.header.get(header) == Some(&id) {
                indexes.header.remove(header);
            }
            if indexes.name.get(header.name.as_slice()) == Some(&id) {
                indexes.name.remove(header.name.as_slice());
            }
        }
        self.size -= header.size();
        self.queue.pop_back();
    }
}

/// Static table entries as defined in RFC 7541 Appendix A.
static STATIC_HEADERS: [(&str, &str); 61] = [
    (":authority", ""),                   // 1
    (":method", "GET"),                   // 2
    (":method", "POST"),                  // 3
    (":path", "/"),                       // 4
    (":path", "/index.html"),             // 5
    (":scheme", "http"),                  // 6
    (":scheme", "https"),                 // 7
    (":status", "200"),                   // 8
    (":status", "204"),                   // 9
    (":status", "206"),                   // 10
    (":status", "304"),                   // 11
    (":status", "400"),                   // 12
    (":status", "404"),                   // 13
    (":status", "500"),                   // 14
    ("accept-charset", ""),               // 15
    ("accept-encoding", "gzip, deflate"), // 16
    ("accept-language", ""),              // 17
    ("accept-ranges", ""),                // 18
    ("accept", ""),                       // 19
    ("access-control-allow-origin", ""),  // 20
    ("age", ""),                          // 21
    ("allow", ""),                        // 22
    ("authorization", ""),                // 23
    ("cache-control", ""),                // 24
    ("content-disposition", ""),          // 25
    ("content-encoding", ""),             // 26
    ("content-language", ""),             // 27
    ("content-length", ""),               // 28
    ("content-location", ""),             // 29
    ("content-range", ""),                // 30
    ("content-type", ""),                 // 31
    ("cookie", ""),                       // 32
    ("date", ""),                         // 33
    ("etag", ""),                         // 34
    ("expect", ""),                       // 35
    ("expires", ""),                      // 36
    ("from", ""),                         // 37
    ("host", ""),                         // 38
    ("if-match", ""),                     // 39
    ("if-modified-since", ""),            // 40
    ("if-none-match", ""),                // 41
    ("if-range", ""),                     // 42
    ("if-unmodified-since", ""),          // 43
    ("last-modified", ""),                // 44
    ("link", ""),                         // 45
    ("location", ""),                     // 46
    ("max-forwards", ""),                 // 47
    ("proxy-authenticate", ""),           // 48
    ("proxy-authorization", ""),          // 49
    ("range", ""),                        // 50
    ("referer", ""),                      // 51
    ("refresh", ""),                      // 52
    ("retry-after", ""),                  // 53
    ("server", ""),                       // 54
    ("set-cookie", ""),                   // 55
    ("strict-transport-security", ""),    // 56
    ("transfer-encoding", ""),            // 57
    ("user-agent", ""),                   // 58
    ("vary", ""),                         // 59
    ("via", ""),                          // 60
    ("www-authenticate", ""),             // 61
];

/// Returns the process-wide static table, building it on first use.
///
/// The table is given an unbounded size so insertion never evicts, and
/// entries are added in reverse so `:authority` lands at external index 1.
pub(crate) fn static_table() -> &'static IndexTable {
    static TABLE: OnceLock<IndexTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = IndexTable::with_options(usize::MAX, 1, true);
        for (name, value) in STATIC_HEADERS.iter().rev() {
            table.add_header(Header::new(*name, *value));
        }
        table
    })
}

#[cfg(test)]
mod ut_index_table {
    use super::{static_table, Header, IndexTable};

    /// UT test cases for `IndexTable::add_header` and external indexing.
    ///
    /// # Brief
    /// 1. Creates an `IndexTable` and inserts entries.
    /// 2. Checks sizes, external indices and newest-first ordering.
    #[test]
    fn ut_index_table_add_header() {
        let mut table = IndexTable::with_options(4096, 62, true);
        assert!(table.is_empty());
        assert_eq!(table.end_index(), 62);

        table.add_header(Header::new("custom-key", "custom-header"));
        assert_eq!(table.size(), 55);
        assert_eq!(table.end_index(), 63);
        assert_eq!(table.header_at(62).unwrap().value, b"custom-header");
        assert!(table.header_at(63).is_none());
        assert!(table.header_at(61).is_none());

        table.add_header(Header::new("cache-control", "no-cache"));
        // The newest entry takes the lowest index and shifts the rest up.
        assert_eq!(table.header_at(62).unwrap().name, b"cache-control");
        assert_eq!(table.header_at(63).unwrap().name, b"custom-key");
        assert_eq!(table.index_of_header(&Header::new("custom-key", "custom-header")), Some(63));
        assert_eq!(table.index_of_name(b"cache-control"), Some(62));
        assert_eq!(table.index_of_name(b"unknown"), None);
    }

    /// UT test cases for FIFO eviction.
    ///
    /// # Brief
    /// 1. Creates a small `IndexTable` and overfills it.
    /// 2. Checks that the oldest entries leave first and the size bound
    ///    holds after every insertion.
    #[test]
    fn ut_index_table_eviction() {
        // Each entry below costs 33 octets, so only two fit.
        let mut table = IndexTable::with_options(70, 62, true);
        table.add_header(Header::new("a", ""));
        table.add_header(Header::new("b", ""));
        assert_eq!(table.size(), 66);

        table.add_header(Header::new("c", ""));
        assert_eq!(table.size(), 66);
        assert_eq!(table.header_at(62).unwrap().name, b"c");
        assert_eq!(table.header_at(63).unwrap().name, b"b");
        assert!(table.header_at(64).is_none());
        // "a" was evicted and its name mapping went with it.
        assert_eq!(table.index_of_name(b"a"), None);
        assert_eq!(table.index_of_name(b"b"), Some(63));
    }

    /// UT test cases for the oversized-entry rule.
    ///
    /// # Brief
    /// 1. Inserts an entry whose cost exceeds the table's maximum size.
    /// 2. Checks that the table is emptied and the entry is dropped.
    #[test]
    fn ut_index_table_oversized_entry() {
        let mut table = IndexTable::with_options(64, 62, true);
        table.add_header(Header::new("a", ""));
        assert!(!table.is_empty());

        table.add_header(Header::new("name", vec![b'v'; 100]));
        assert!(table.is_empty());
        assert_eq!(table.size(), 0);
        assert_eq!(table.index_of_name(b"a"), None);
        assert_eq!(table.index_of_name(b"name"), None);
    }

    /// UT test cases for duplicate entries and the eviction guard.
    ///
    /// # Brief
    /// 1. Inserts the same header twice so the older copy is shadowed.
    /// 2. Evicts the older copy and checks the newer one is still found.
    #[test]
    fn ut_index_table_shadowed_duplicate() {
        let header = Header::new("dup", "value");
        // Three entries of 40 octets each fit exactly.
        let mut table = IndexTable::with_options(120, 62, true);
        table.add_header(header.clone());
        table.add_header(Header::new("other", "val"));
        table.add_header(header.clone());
        assert_eq!(table.index_of_header(&header), Some(62));

        // Evicting the shadowed duplicate must not erase the mapping that
        // points at the newer copy.
        table.pop_header();
        assert_eq!(table.index_of_header(&header), Some(62));
        assert_eq!(table.index_of_name(b"dup"), Some(62));

        table.pop_header();
        assert_eq!(table.index_of_header(&header), Some(62));

        table.pop_header();
        assert_eq!(table.index_of_header(&header), None);
        assert!(table.is_empty());
    }

    /// UT test cases for empty-value entries.
    ///
    /// # Brief
    /// 1. Inserts an entry with an empty value.
    /// 2. Checks it is findable by name but not by full match.
    #[test]
    fn ut_index_table_empty_value() {
        let mut table = IndexTable::with_options(4096, 62, true);
        let header = Header::new("x-empty", "");
        table.add_header(header.clone());
        assert_eq!(table.index_of_header(&header), None);
        assert_eq!(table.index_of_name(b"x-empty"), Some(62));
        // Eviction of an unindexed full match must not disturb anything.
        table.pop_header();
        assert_eq!(table.index_of_name(b"x-empty"), None);
    }

    /// UT test cases for the static table.
    ///
    /// # Brief
    /// 1. Reads entries and indices out of the shared static table.
    /// 2. Checks the RFC 7541 Appendix A layout.
    #[test]
    fn ut_static_table() {
        let table = static_table();
        assert_eq!(table.start_index(), 1);
        assert_eq!(table.end_index(), 62);

        assert_eq!(table.header_at(1).unwrap().name, b":authority");
        assert_eq!(table.header_at(2).unwrap(), &Header::new(":method", "GET"));
        assert_eq!(table.header_at(4).unwrap(), &Header::new(":path", "/"));
        assert_eq!(table.header_at(61).unwrap().name, b"www-authenticate");
        assert!(table.header_at(0).is_none());
        assert!(table.header_at(62).is_none());

        assert_eq!(table.index_of_header(&Header::new(":method", "GET")), Some(2));
        assert_eq!(table.index_of_header(&Header::new(":method", "PUT")), None);
        assert_eq!(table.index_of_name(b":method"), Some(2));
        assert_eq!(table.index_of_name(b":path"), Some(4));
        assert_eq!(table.index_of_name(b":authority"), Some(1));
        assert_eq!(table.index_of_name(b"cookie"), Some(32));
        assert_eq!(
            table.index_of_header(&Header::new("accept-encoding", "gzip, deflate")),
            Some(16)
        );
    }
}

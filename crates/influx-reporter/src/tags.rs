// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Inline tag parsing for metric names.
//!
//! A registry name may carry tags after the first comma:
//!
//! ```text
//! http.requests,method=GET,status=200
//! ^^^^^^^^^^^^^ ^^^^^^^^^^^^^^^^^^^^^
//!  clean name    inline tags (override base tags)
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;

/// Tag key/value mapping attached to every point.
pub type TagSet = BTreeMap<String, String>;

/// Separator between the base name and inline tags, and between inline tags.
pub const TAG_DELIMITER: char = ',';

/// Split a raw metric name into its clean name and effective tag set.
///
/// Without a delimiter the base tags are returned borrowed, so the common
/// case allocates nothing. Entries lacking `=` are ignored.
pub fn parse_name<'a>(name: &'a str, base: &'a TagSet) -> (&'a str, Cow<'a, TagSet>) {
    let Some((clean, inline)) = name.split_once(TAG_DELIMITER) else {
        return (name, Cow::Borrowed(base));
    };

    let mut tags = base.clone();
    for entry in inline.split(TAG_DELIMITER) {
        if let Some((key, value)) = entry.split_once('=') {
            tags.insert(key.to_string(), value.to_string());
        }
    }

    (clean, Cow::Owned(tags))
}

/// Copy of `tags` with an additional `bucket` entry.
pub fn with_bucket(tags: &TagSet, bucket: &str) -> TagSet {
    let mut out = tags.clone();
    out.insert("bucket".to_string(), bucket.to_string());
    out
}

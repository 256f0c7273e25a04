//! Prefix arithmetic for grant lookups.
//!
//! Access Grants matches two kinds of prefix grants:
//!
//! - directory grants, `s3://bucket/prefix/*`, cached under `s3://bucket/prefix`
//! - character grants, `s3://bucket/prefix*`, cached under `s3://bucket/prefix*`
//!
//! A lookup for `s3://bucket/a/b/c.txt` walks both hierarchies, most specific
//! candidate first, until one of them is cached.

/// Separator between path segments.
const SEGMENT_SEPARATOR: char = '/';

/// Separator between a scheme and the bucket.
const SCHEME_SEPARATOR: &str = "://";

/// Suffix of a prefix grant target.
const WILDCARD: char = '*';

/// Suffix of a directory grant target.
const DIRECTORY_WILDCARD: &str = "/*";

/// Directory-level lookup candidates of a path.
///
/// Yields the path itself, then each ancestor obtained by stripping the last
/// `/` segment, down to and including the scheme root. For
/// `s3://bucket/a/b` that is `s3://bucket/a/b`, `s3://bucket/a`,
/// `s3://bucket` and `s3:/`. The last one is what a bucket-wide grant on
/// `s3://*` normalizes to.
pub fn directory_candidates(path: &str) -> DirectoryCandidates<'_> {
    DirectoryCandidates {
        next: Some(path).filter(|p| p.contains(SEGMENT_SEPARATOR)),
    }
}

/// Character-level lookup candidates of a path.
///
/// Yields `path*`, then the same with the path shortened by one character at
/// a time, stopping before the path shrinks to its `scheme://` root.
pub fn character_candidates(path: &str) -> CharacterCandidates<'_> {
    let floor = path
        .find(SCHEME_SEPARATOR)
        .map_or(0, |index| index + SCHEME_SEPARATOR.len());
    CharacterCandidates {
        path,
        end: path.len(),
        floor,
    }
}

/// Iterator returned by [`directory_candidates`].
#[derive(Debug, Clone)]
pub struct DirectoryCandidates<'a> {
    next: Option<&'a str>,
}

impl<'a> Iterator for DirectoryCandidates<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current
            .rfind(SEGMENT_SEPARATOR)
            .map(|index| &current[..index])
            .filter(|parent| parent.contains(SEGMENT_SEPARATOR));
        Some(current)
    }
}

/// Iterator returned by [`character_candidates`].
#[derive(Debug, Clone)]
pub struct CharacterCandidates<'a> {
    path: &'a str,
    end: usize,
    floor: usize,
}

impl Iterator for CharacterCandidates<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.end <= self.floor {
            return None;
        }
        let current = &self.path[..self.end];
        self.end = drop_last_char(current).len();

        let mut candidate = String::with_capacity(current.len() + 1);
        candidate.push_str(current);
        candidate.push(WILDCARD);
        Some(candidate)
    }
}

/// Whether a matched grant target covers a prefix rather than one object.
///
/// Only prefix grants are worth caching; object grants cannot serve any
/// other request.
pub fn is_prefix_grant(target: &str) -> bool {
    target.ends_with(WILDCARD)
}

/// Cache location of a matched grant target.
///
/// Strips a trailing `/*` so directory grants land where
/// [`directory_candidates`] looks for them. Character grants keep their `*`.
/// `s3://*` becomes `s3:/`.
pub fn normalize_grant_target(target: &str) -> &str {
    target.strip_suffix(DIRECTORY_WILDCARD).unwrap_or(target)
}

/// Common prefix of several object keys, with a leading `/`.
///
/// Used to build a single lookup target for requests touching several keys.
/// The keys are first trimmed to their longest shared directory, then the
/// first key's next segment is extended character by character as long as
/// every key still matches.
///
/// ```
/// use accessgrants_cache::prefix::common_prefix;
///
/// let keys = ["folder/path123/A/logs", "folder/path234/A/logs"];
/// assert_eq!(common_prefix(&keys), "/folder/path");
/// assert_eq!(common_prefix::<&str>(&[]), "/");
/// assert_eq!(common_prefix(&["ABC/log.txt"]), "/ABC/log.txt");
/// ```
pub fn common_prefix<S: AsRef<str>>(keys: &[S]) -> String {
    let Some(first) = keys.first().map(AsRef::as_ref) else {
        return SEGMENT_SEPARATOR.to_string();
    };

    let mut common = first;
    let mut last_segment = "";
    for key in &keys[1..] {
        let key = key.as_ref();
        while !common.is_empty() && !key.starts_with(common) {
            let Some(index) = common.rfind(SEGMENT_SEPARATOR) else {
                return SEGMENT_SEPARATOR.to_string();
            };
            last_segment = &common[index + 1..];
            common = &common[..index];
        }
    }

    let mut candidate = format!("{common}/{last_segment}");
    for key in keys {
        let key = key.as_ref();
        while !last_segment.is_empty() && !key.starts_with(&candidate) {
            last_segment = drop_last_char(last_segment);
            candidate = format!("{common}/{last_segment}");
        }
    }

    if candidate.strip_suffix(SEGMENT_SEPARATOR) == Some(first) {
        return format!("/{first}");
    }
    format!("/{candidate}")
}

fn drop_last_char(s: &str) -> &str {
    s.char_indices().next_back().map_or("", |(index, _)| &s[..index])
}

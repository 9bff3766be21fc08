//! core::keys
//!
//! Translation of repository-relative paths into store keys.
//!
//! # Design
//!
//! The remote keyspace is flat; "directories" exist only as `/`-separated
//! key segments. A repository-relative path may climb out of its base
//! prefix with leading `../` markers, the way `objects/info/alternates`
//! entries and ref lookups do. Resolution is pure string arithmetic with
//! no I/O.
//!
//! # Example
//!
//! ```
//! use silt::core::keys::resolve_key;
//!
//! assert_eq!(
//!     resolve_key("repo.git/objects", "../refs/heads/main").unwrap(),
//!     "repo.git/refs/heads/main"
//! );
//! assert_eq!(
//!     resolve_key("repo.git/objects", "pack").unwrap(),
//!     "repo.git/objects/pack"
//! );
//! ```

use thiserror::Error;

/// Marker for "go up one directory" in a repository-relative path.
pub const PARENT_DIR: &str = "../";

/// Errors from key resolution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The path consumed more parent markers than the prefix has segments.
    ///
    /// Such a key would escape the repository namespace entirely, so this
    /// is a hard error rather than a clamp-at-root.
    #[error("path '{path}' climbs above key prefix '{prefix}'")]
    EscapesPrefix {
        /// Base prefix the resolution started from
        prefix: String,
        /// Offending relative path
        path: String,
    },
}

/// Resolve a repository-relative path against a base key prefix.
///
/// A single trailing `/` on `relative_path` is ignored. Each leading `../`
/// removes the last segment of `base_prefix`; the remainder is appended
/// under what is left. Consuming every segment of the prefix is allowed
/// (the key lands at the bucket root); consuming more is an error.
pub fn resolve_key(base_prefix: &str, relative_path: &str) -> Result<String, KeyError> {
    let mut rest = relative_path.strip_suffix('/').unwrap_or(relative_path);
    let mut segments: Vec<&str> = if base_prefix.is_empty() {
        Vec::new()
    } else {
        base_prefix.split('/').collect()
    };

    while let Some(stripped) = rest.strip_prefix(PARENT_DIR) {
        if segments.pop().is_none() {
            return Err(KeyError::EscapesPrefix {
                prefix: base_prefix.to_string(),
                path: relative_path.to_string(),
            });
        }
        rest = stripped;
    }

    if segments.is_empty() {
        Ok(rest.to_string())
    } else {
        Ok(format!("{}/{}", segments.join("/"), rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn plain_path_appends_under_prefix() {
        assert_eq!(
            resolve_key("repo.git/objects", "ab/cd1234").unwrap(),
            "repo.git/objects/ab/cd1234"
        );
    }

    #[test]
    fn trailing_slash_is_stripped_once() {
        assert_eq!(
            resolve_key("repo.git/objects", "pack/").unwrap(),
            "repo.git/objects/pack"
        );
    }

    #[test]
    fn parent_marker_drops_last_segment() {
        assert_eq!(
            resolve_key("repo.git/objects", "../packed-refs").unwrap(),
            "repo.git/packed-refs"
        );
    }

    #[test]
    fn chained_parent_markers_drop_one_segment_each() {
        assert_eq!(
            resolve_key("mirrors/repo.git/objects", "../../shared.git/objects").unwrap(),
            "mirrors/shared.git/objects"
        );
    }

    #[test]
    fn consuming_whole_prefix_lands_at_bucket_root() {
        assert_eq!(
            resolve_key("repo.git/objects", "../../top").unwrap(),
            "top"
        );
    }

    #[test]
    fn climbing_above_the_prefix_fails() {
        let err = resolve_key("repo.git", "../../escape").unwrap_err();
        assert_eq!(
            err,
            KeyError::EscapesPrefix {
                prefix: "repo.git".into(),
                path: "../../escape".into(),
            }
        );
    }

    #[test]
    fn trailing_slash_strips_before_marker_consumption() {
        // "../" alone loses its slash first and is no longer a marker.
        assert_eq!(
            resolve_key("repo.git/objects", "../").unwrap(),
            "repo.git/objects/.."
        );
        assert_eq!(
            resolve_key("repo.git/objects", "../pack/").unwrap(),
            "repo.git/pack"
        );
    }

    proptest! {
        #[test]
        fn removes_exactly_m_segments(
            segments in proptest::collection::vec("[a-z0-9]{1,8}", 1..6),
            markers in 0usize..6,
            rest in "[a-z0-9]{1,8}(/[a-z0-9]{1,8}){0,2}",
        ) {
            prop_assume!(markers <= segments.len());
            let base = segments.join("/");
            let rel = format!("{}{}", PARENT_DIR.repeat(markers), rest);

            let key = resolve_key(&base, &rel).unwrap();

            let kept = &segments[..segments.len() - markers];
            let expected = if kept.is_empty() {
                rest.clone()
            } else {
                format!("{}/{}", kept.join("/"), rest)
            };
            prop_assert_eq!(key, expected);
        }

        #[test]
        fn too_many_markers_always_fail(
            segments in proptest::collection::vec("[a-z0-9]{1,8}", 1..4),
            extra in 1usize..3,
            rest in "[a-z0-9]{1,8}",
        ) {
            let base = segments.join("/");
            let rel = format!("{}{}", PARENT_DIR.repeat(segments.len() + extra), rest);
            prop_assert!(resolve_key(&base, &rel).is_err());
        }
    }
}

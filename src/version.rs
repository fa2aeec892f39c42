//! Upstream version strings and their precedence ordering.
//!
//! Upstream archives rarely carry strict three-component semver, so parsing is
//! lenient: `1.2`, `5.4.1.1`, `1:2.0`, `2.0~rc1`, `1.0rc1`, `9.2p1`,
//! `1.0.post1` and `1.0+dfsg` are all accepted. Ordering follows
//! semantic-version precedence rather than string order.

use semver::{BuildMetadata, Prerelease};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::VersionError;

/// A version as published upstream, with its comparable form
#[derive(Debug, Clone)]
pub struct UpstreamVersion {
    raw: String,
    epoch: u64,
    release: Vec<u64>,
    qualifier: Qualifier,
    pre: Option<Prerelease>,
    build: Option<BuildMetadata>,
}

/// Alphabetic marker glued to the last release component (`1.0rc1`, `9.2p1`,
/// `1.0.post1`). Variant order is precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Qualifier {
    /// `a`/`alpha` < `b`/`beta` < `c`/`rc`/`pre`, then the number
    Pre(u8, u64),
    Release,
    /// `post`, `p`, `pl`, `r`
    Post(u64),
}

impl Qualifier {
    fn from_marker(word: &str, number: u64) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "a" | "alpha" => Some(Qualifier::Pre(0, number)),
            "b" | "beta" => Some(Qualifier::Pre(1, number)),
            "c" | "rc" | "pre" => Some(Qualifier::Pre(2, number)),
            "post" | "p" | "pl" | "r" => Some(Qualifier::Post(number)),
            _ => None,
        }
    }
}

/// Split `0rc1` into (`Some(0)`, `rc`, `1`) and `post1` into (`None`, `post`, `1`)
fn split_marker(component: &str) -> Option<(Option<u64>, &str, u64)> {
    let word_start = component
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(component.len());
    let (digits, rest) = component.split_at(word_start);
    let word_end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let (word, tail) = rest.split_at(word_end);

    if word.is_empty() || !tail.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let number = if digits.is_empty() {
        None
    } else {
        Some(digits.parse().ok()?)
    };
    let tail = if tail.is_empty() { 0 } else { tail.parse().ok()? };
    Some((number, word, tail))
}

impl UpstreamVersion {
    /// Parse a version string.
    ///
    /// Accepts an optional `v` prefix, an optional `N:` epoch, a dotted numeric
    /// release whose last component may carry a pre/post marker, a pre-release
    /// after `-` or `~`, and build metadata after `+`.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(VersionError::Empty);
        }

        let rest = raw.strip_prefix('v').unwrap_or(raw);

        let (epoch, rest) = match rest.split_once(':') {
            Some((epoch, rest)) => {
                let epoch = epoch
                    .parse::<u64>()
                    .map_err(|_| VersionError::InvalidEpoch(raw.to_string()))?;
                (epoch, rest)
            }
            None => (0, rest),
        };

        let (rest, build) = match rest.split_once('+') {
            Some((rest, build)) => {
                let parsed = BuildMetadata::new(build).ok().filter(|b| !b.is_empty());
                let parsed = parsed.ok_or_else(|| VersionError::InvalidBuild {
                    version: raw.to_string(),
                    build: build.to_string(),
                })?;
                (rest, Some(parsed))
            }
            None => (rest, None),
        };

        let (release, pre) = match rest.find(|c: char| c == '-' || c == '~') {
            Some(idx) => (&rest[..idx], Some(&rest[idx + 1..])),
            None => (rest, None),
        };

        let invalid_release = |component: &str| VersionError::InvalidRelease {
            version: raw.to_string(),
            component: component.to_string(),
        };

        let components: Vec<&str> = release.split('.').collect();
        let last = components.len() - 1;
        let mut numbers = Vec::with_capacity(components.len());
        let mut qualifier = Qualifier::Release;

        for (i, component) in components.into_iter().enumerate() {
            if let Ok(n) = component.parse::<u64>() {
                numbers.push(n);
                continue;
            }

            let marker = if i == last { split_marker(component) } else { None };
            let (number, word, tail) = marker.ok_or_else(|| invalid_release(component))?;
            qualifier =
                Qualifier::from_marker(word, tail).ok_or_else(|| invalid_release(component))?;
            numbers.extend(number);
        }

        if numbers.is_empty() {
            return Err(invalid_release(release));
        }

        let pre = match pre {
            Some(pre) => {
                let parsed = Prerelease::new(pre).ok().filter(|p| !p.is_empty());
                Some(parsed.ok_or_else(|| VersionError::InvalidPrerelease {
                    version: raw.to_string(),
                    pre: pre.to_string(),
                })?)
            }
            None => None,
        };

        Ok(Self {
            raw: raw.to_string(),
            epoch,
            release: numbers,
            qualifier,
            pre,
            build,
        })
    }

    /// The version exactly as it was published
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || matches!(self.qualifier, Qualifier::Pre(..))
    }

    /// Compare by precedence only: epoch, release, marker, then pre-release.
    /// Build metadata and spelling (`1.2` vs `1.2.0`) do not count.
    pub fn precedence_cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| cmp_release(&self.release, &other.release))
            .then_with(|| self.qualifier.cmp(&other.qualifier))
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

fn cmp_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

impl Ord for UpstreamVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence_cmp(other)
            .then_with(|| self.build.cmp(&other.build))
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for UpstreamVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for UpstreamVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for UpstreamVersion {}

impl FromStr for UpstreamVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for UpstreamVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> UpstreamVersion {
        UpstreamVersion::parse(s).unwrap()
    }

    #[test]
    fn test_parse_plain_semver() {
        let version = v("3.7.4");
        assert_eq!(version.as_str(), "3.7.4");
        assert!(!version.is_prerelease());
    }

    #[test]
    fn test_parse_trims_and_keeps_raw() {
        assert_eq!(v("  5.4.1\n").to_string(), "5.4.1");
        assert_eq!(v("v1.0.0").to_string(), "v1.0.0");
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        assert!(v("1.10.0") > v("1.9.0"));
        assert!(v("2.0") > v("1.99.99"));
        assert!(v("5.4.10") > v("5.4.9"));
    }

    #[test]
    fn test_missing_components_pad_with_zero() {
        assert_eq!(v("1.2").precedence_cmp(&v("1.2.0")), Ordering::Equal);
        assert!(v("1.2.0.1") > v("1.2"));
    }

    #[test]
    fn test_prerelease_ranks_below_release() {
        assert!(v("2.0.0-rc.1") < v("2.0.0"));
        assert!(v("2.0.0~beta2") < v("2.0.0"));
        assert!(v("2.0.0-alpha") < v("2.0.0-beta"));
        assert!(v("2.0.0-rc.2") < v("2.0.0-rc.10"));
        assert!(v("2.0.0~rc1").is_prerelease());
    }

    #[test]
    fn test_epoch_dominates() {
        assert!(v("1:0.9") > v("5.0"));
    }

    #[test]
    fn test_build_metadata_ignored_for_precedence() {
        assert_eq!(v("1.0+dfsg").precedence_cmp(&v("1.0")), Ordering::Equal);
        assert!(v("1.0+dfsg") > v("1.0"));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(UpstreamVersion::parse("   "), Err(VersionError::Empty));
        assert!(matches!(
            UpstreamVersion::parse("1.x.3"),
            Err(VersionError::InvalidRelease { .. })
        ));
        assert!(matches!(
            UpstreamVersion::parse("1.2-"),
            Err(VersionError::InvalidPrerelease { .. })
        ));
        assert!(matches!(
            UpstreamVersion::parse("x:1.2"),
            Err(VersionError::InvalidEpoch(_))
        ));
        assert!(matches!(
            UpstreamVersion::parse("1.2+"),
            Err(VersionError::InvalidBuild { .. })
        ));
        assert!(matches!(
            UpstreamVersion::parse("1.0rc1.2"),
            Err(VersionError::InvalidRelease { .. })
        ));
        assert!(matches!(
            UpstreamVersion::parse("1.0zz1"),
            Err(VersionError::InvalidRelease { .. })
        ));
        assert!(matches!(
            UpstreamVersion::parse("post1"),
            Err(VersionError::InvalidRelease { .. })
        ));
    }

    #[test]
    fn test_post_release_markers_rank_above_release() {
        assert!(v("1.0.post1") > v("1.0"));
        assert!(v("9.2p1") > v("9.2"));
        assert!(v("9.2p2") > v("9.2p1"));
        assert!(v("9.3") > v("9.2p9"));
        assert!(v("2.4r3") > v("2.4.0"));
        assert!(!v("1.0.post1").is_prerelease());
    }

    #[test]
    fn test_pre_release_markers_rank_below_release() {
        assert!(v("1.0rc1") < v("1.0"));
        assert!(v("1.0rc1") < v("1.0rc2"));
        assert!(v("5.2.5a") < v("5.2.5"));
        assert!(v("5.2.5a") > v("5.2.4"));
        assert!(v("1.0a1") < v("1.0b1"));
        assert!(v("1.0b2") < v("1.0rc1"));
        assert!(v("1.0rc1").is_prerelease());
    }

    #[test]
    fn test_sorting_picks_maximum() {
        let mut versions = vec![
            v("5.2.5"),
            v("5.4.1"),
            v("5.4.0"),
            v("5.4.1-rc1"),
            v("5.10.0~alpha"),
        ];
        versions.sort_by(|a, b| b.cmp(a));
        assert_eq!(versions[0].as_str(), "5.10.0~alpha");
        assert_eq!(versions[1].as_str(), "5.4.1");
    }
}

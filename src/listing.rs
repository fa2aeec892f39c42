use chrono::NaiveDateTime;
use regex::Regex;
use tracing::warn;

use crate::error::ListingError;
use crate::version::UpstreamVersion;

/// Date format used by Apache-style autoindex pages
pub const LISTING_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Zero-based index of the date cell within a listing row
const DATE_CELL: usize = 2;

/// One archive row from an upstream directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub version: UpstreamVersion,
    pub released: NaiveDateTime,
    pub filename: String,
}

/// Extracts `<package>_<version><suffix>` archives from directory listing HTML
pub struct ListingParser {
    row: Regex,
    cell: Regex,
    anchor: Regex,
    tag: Regex,
    filename: Regex,
    suffix: String,
}

impl ListingParser {
    pub fn new(package: &str, suffix: &str) -> Result<Self, ListingError> {
        Ok(Self {
            row: Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>")?,
            cell: Regex::new(r"(?is)<td[^>]*>(.*?)</td>")?,
            anchor: Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']+)["']"#)?,
            tag: Regex::new(r"(?s)<[^>]*>")?,
            filename: Regex::new(&format!(
                "^{}_(?P<version>.+){}$",
                regex::escape(package),
                regex::escape(suffix)
            ))?,
            suffix: suffix.to_string(),
        })
    }

    /// Parse every matching row. Rows without a matching archive anchor are
    /// skipped, as are archives whose version cannot be parsed. A matching row
    /// with a bad date is an error.
    pub fn parse(&self, html: &str) -> Result<Vec<ListingEntry>, ListingError> {
        let mut entries = Vec::new();

        for row in self.row.captures_iter(html) {
            let row = &row[1];

            let Some((filename, version)) = self.archive_in_row(row) else {
                continue;
            };

            let version = match UpstreamVersion::parse(&version) {
                Ok(version) => version,
                Err(e) => {
                    warn!(%filename, error = %e, "skipping archive with unparseable version");
                    continue;
                }
            };
            let released = self.row_date(row, &filename)?;

            entries.push(ListingEntry {
                version,
                released,
                filename,
            });
        }

        Ok(entries)
    }

    fn archive_in_row(&self, row: &str) -> Option<(String, String)> {
        self.anchor.captures_iter(row).find_map(|caps| {
            let href = caps[1].trim();
            if !href.ends_with(&self.suffix) {
                return None;
            }
            let filename = href.rsplit('/').next().unwrap_or(href);
            let version = self.filename.captures(filename)?["version"].to_string();
            Some((filename.to_string(), version))
        })
    }

    fn row_date(&self, row: &str, filename: &str) -> Result<NaiveDateTime, ListingError> {
        let cell = self
            .cell
            .captures_iter(row)
            .nth(DATE_CELL)
            .ok_or_else(|| ListingError::MissingDate {
                filename: filename.to_string(),
            })?;

        let text = self.tag.replace_all(&cell[1], "");
        let text = text.replace("&nbsp;", " ");
        let text = text.trim();

        NaiveDateTime::parse_from_str(text, LISTING_DATE_FORMAT).map_err(|source| {
            ListingError::InvalidDate {
                filename: filename.to_string(),
                value: text.to_string(),
                source,
            }
        })
    }
}

/// Convenience wrapper around [`ListingParser`]
pub fn parse_listing(
    html: &str,
    package: &str,
    suffix: &str,
) -> Result<Vec<ListingEntry>, ListingError> {
    ListingParser::new(package, suffix)?.parse(html)
}

/// Order entries by version, newest first, and return the newest
pub fn latest(mut entries: Vec<ListingEntry>) -> Option<ListingEntry> {
    entries.sort_by(|a, b| b.version.cmp(&a.version));
    entries.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(filename: &str, date: &str) -> String {
        format!(
            "<tr><td valign=\"top\"><img src=\"/icons/compressed.gif\" alt=\"[   ]\"></td>\
             <td><a href=\"{filename}\">{filename}</a></td>\
             <td align=\"right\">{date}  </td><td align=\"right\">1.2M</td><td>&nbsp;</td></tr>\n"
        )
    }

    fn page(rows: &[String]) -> String {
        format!(
            "<html><body><table>\n\
             <tr><th valign=\"top\"><img src=\"/icons/blank.gif\" alt=\"[ICO]\"></th>\
             <th><a href=\"?C=N;O=D\">Name</a></th>\
             <th><a href=\"?C=M;O=A\">Last modified</a></th></tr>\n\
             <tr><td valign=\"top\"><img src=\"/icons/back.gif\" alt=\"[PARENTDIR]\"></td>\
             <td><a href=\"/debian/pool/main/x/\">Parent Directory</a></td><td>&nbsp;</td></tr>\n\
             {}</table></body></html>",
            rows.concat()
        )
    }

    #[test]
    fn test_parse_listing_extracts_matching_archives() {
        let html = page(&[
            row("xz-utils_5.4.1.orig.tar.xz", "2023-01-11 18:31"),
            row("xz-utils_5.4.1-0.2.debian.tar.xz", "2023-01-12 10:00"),
            row("xz-utils_5.4.1-0.2.dsc", "2023-01-12 10:00"),
            row("xz-utils_5.2.5.orig.tar.xz", "2020-03-17 09:12"),
        ]);

        let entries = parse_listing(&html, "xz-utils", ".orig.tar.xz").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].version.as_str(), "5.4.1");
        assert_eq!(entries[0].filename, "xz-utils_5.4.1.orig.tar.xz");
        assert_eq!(
            entries[0].released,
            NaiveDateTime::parse_from_str("2023-01-11 18:31", LISTING_DATE_FORMAT).unwrap()
        );
        assert_eq!(entries[1].version.as_str(), "5.2.5");
    }

    #[test]
    fn test_parse_listing_ignores_other_packages() {
        let html = page(&[row("xz-java_1.9.orig.tar.xz", "2021-01-01 00:00")]);
        let entries = parse_listing(&html, "xz-utils", ".orig.tar.xz").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_parse_listing_handles_absolute_hrefs() {
        let html = page(&[row(
            "/debian/pool/main/x/xz-utils/xz-utils_5.6.2.orig.tar.xz",
            "2024-06-01 12:00",
        )]);
        let entries = parse_listing(&html, "xz-utils", ".orig.tar.xz").unwrap();
        assert_eq!(entries[0].filename, "xz-utils_5.6.2.orig.tar.xz");
        assert_eq!(entries[0].version.as_str(), "5.6.2");
    }

    #[test]
    fn test_parse_listing_malformed_date_is_error() {
        let html = page(&[row("xz-utils_5.4.1.orig.tar.xz", "11/01/2023")]);
        let err = parse_listing(&html, "xz-utils", ".orig.tar.xz").unwrap_err();
        assert!(matches!(
            err,
            ListingError::InvalidDate { ref value, .. } if value == "11/01/2023"
        ));
    }

    #[test]
    fn test_parse_listing_skips_unparseable_versions() {
        let html = page(&[
            row("xz-utils_5.6.2.orig.tar.xz", "2024-06-04 19:00"),
            row("xz-utils_5.2.5a.orig.tar.xz", "2020-03-17 09:12"),
            row("xz-utils_snapshot-weekly.orig.tar.xz", "2019-01-01 00:00"),
        ]);
        let entries = parse_listing(&html, "xz-utils", ".orig.tar.xz").unwrap();

        let versions: Vec<_> = entries.iter().map(|e| e.version.as_str()).collect();
        assert_eq!(versions, vec!["5.6.2", "5.2.5a"]);
        assert_eq!(latest(entries).unwrap().version.as_str(), "5.6.2");
    }

    #[test]
    fn test_parse_listing_missing_date_cell_is_error() {
        let html = "<table><tr><td><a href=\"xz-utils_5.4.1.orig.tar.xz\">x</a></td></tr></table>";
        let err = parse_listing(html, "xz-utils", ".orig.tar.xz").unwrap_err();
        assert!(matches!(err, ListingError::MissingDate { .. }));
    }

    #[test]
    fn test_latest_is_order_invariant() {
        let rows = vec![
            row("xz-utils_5.2.5.orig.tar.xz", "2020-03-17 09:12"),
            row("xz-utils_5.4.1.orig.tar.xz", "2023-01-11 18:31"),
            row("xz-utils_5.10.0.orig.tar.xz", "2024-01-01 00:00"),
            row("xz-utils_5.4.0.orig.tar.xz", "2022-12-13 20:00"),
        ];

        let forward = parse_listing(&page(&rows), "xz-utils", ".orig.tar.xz").unwrap();
        let mut reversed_rows = rows.clone();
        reversed_rows.reverse();
        let reversed = parse_listing(&page(&reversed_rows), "xz-utils", ".orig.tar.xz").unwrap();
        let mut rotated_rows = rows.clone();
        rotated_rows.rotate_left(2);
        let rotated = parse_listing(&page(&rotated_rows), "xz-utils", ".orig.tar.xz").unwrap();

        for entries in [forward, reversed, rotated] {
            assert_eq!(latest(entries).unwrap().version.as_str(), "5.10.0");
        }
    }

    #[test]
    fn test_latest_of_empty_is_none() {
        assert!(latest(Vec::new()).is_none());
    }
}

//! API models for request and response payloads

use common::BroadcastItem;
use serde::Serialize;
use serde_json::Value;

/// Query parameters accepted by the listing endpoint
#[derive(Debug, Clone, Default)]
pub struct BroadcastQuery {
    /// `json` (default) or `csv`
    pub format: Option<String>,
    /// Page number (1-based)
    pub page: Option<String>,
    /// Number of items per page
    pub limit: Option<String>,
    pub gender: Option<String>,
    pub country: Option<String>,
    pub orientation: Option<String>,
    /// Comma separated tag slugs
    pub tags: Option<String>,
    /// Look a single user up instead of listing
    pub user: Option<String>,
}

impl BroadcastQuery {
    /// Build the query from decoded key/value pairs
    ///
    /// The first occurrence of a key wins and unknown keys are ignored, so a
    /// repeated or stray parameter never affects the others.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "format" => &mut query.format,
                "page" => &mut query.page,
                "limit" => &mut query.limit,
                "gender" => &mut query.gender,
                "country" => &mut query.country,
                "orientation" => &mut query.orientation,
                "tags" => &mut query.tags,
                "user" => &mut query.user,
                _ => continue,
            };
            slot.get_or_insert_with(|| value.into());
        }
        query
    }
}

/// Serialization of a listing response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Page requested by the client, with invalid values replaced by defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub format: ExportFormat,
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub const DEFAULT_PAGE: u64 = 1;
    pub const DEFAULT_LIMIT: u64 = 30;

    pub fn from_query(query: &BroadcastQuery) -> Self {
        let format = match query.format.as_deref() {
            Some(format) if format.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        };

        Self {
            format,
            page: parse_positive(query.page.as_deref(), Self::DEFAULT_PAGE),
            limit: parse_positive(query.limit.as_deref(), Self::DEFAULT_LIMIT),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            format: ExportFormat::Json,
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Parse the leading integer of `value`, falling back to `default` unless it is positive
///
/// Digits too large for a `u64` saturate.
fn parse_positive(value: Option<&str>, default: u64) -> u64 {
    let Some(value) = value else {
        return default;
    };

    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if negative || digits.is_empty() {
        return default;
    }

    match digits.parse::<u64>() {
        Ok(0) => default,
        Ok(n) => n,
        Err(_) => u64::MAX,
    }
}

/// Local filters applied to the ranked broadcasts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastFilter {
    /// Exact gender
    pub gender: Option<String>,
    /// Country code, case-insensitive
    pub country: Option<String>,
    /// Sexual orientation, case-insensitive
    pub orientation: Option<String>,
    /// Lowercased tag slugs, any of which must be present
    pub tags: Vec<String>,
}

impl BroadcastFilter {
    pub fn from_query(query: &BroadcastQuery) -> Self {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

        let tags = query
            .tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(|tag| tag.trim().to_lowercase())
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            gender: non_empty(&query.gender),
            country: non_empty(&query.country),
            orientation: non_empty(&query.orientation),
            tags,
        }
    }

    /// True when no filter is set
    pub fn is_empty(&self) -> bool {
        self.gender.is_none()
            && self.country.is_none()
            && self.orientation.is_none()
            && self.tags.is_empty()
    }

    pub fn matches(&self, item: &BroadcastItem) -> bool {
        if let Some(gender) = &self.gender {
            if item.gender != *gender {
                return false;
            }
        }
        if let Some(country) = &self.country {
            if !item.country.eq_ignore_ascii_case(country) {
                return false;
            }
        }
        if let Some(orientation) = &self.orientation {
            if item.sexual_orientation.to_lowercase() != orientation.to_lowercase() {
                return false;
            }
        }
        if !self.tags.is_empty() {
            return item
                .tags
                .iter()
                .any(|tag| self.tags.contains(&tag.slug.to_lowercase()));
        }
        true
    }
}

/// Broadcast annotated with its popularity rank
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBroadcast {
    /// 1-based position after sorting every broadcast by viewers
    #[serde(rename = "XCamId")]
    pub rank: u64,
    #[serde(flatten)]
    pub item: BroadcastItem,
}

/// One page of ranked broadcasts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastPage {
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
    pub items: Vec<RankedBroadcast>,
}

/// Response for the listing endpoint
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastListResponse {
    pub broadcasts: BroadcastPage,
}

/// Response for a single user lookup
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLookupResponse {
    pub user: String,
    pub graph_data: BroadcastItem,
    pub stream_info: Value,
    pub profile_info: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Tag;

    fn query(pairs: &[(&str, &str)]) -> BroadcastQuery {
        BroadcastQuery::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_query_keeps_first_value_of_repeated_keys() {
        let query = query(&[
            ("format", "csv"),
            ("page", "2"),
            ("page", "3"),
            ("utm_source", "x"),
            ("limit", "2"),
        ]);
        assert_eq!(query.format.as_deref(), Some("csv"));
        assert_eq!(query.page.as_deref(), Some("2"));
        assert_eq!(query.limit.as_deref(), Some("2"));
        assert!(query.user.is_none());
    }

    #[test]
    fn test_page_request_defaults() {
        assert_eq!(PageRequest::from_query(&query(&[])), PageRequest::default());
    }

    #[test]
    fn test_page_request_parses_values() {
        let request = PageRequest::from_query(&query(&[
            ("format", "CSV"),
            ("page", "3"),
            ("limit", "50"),
        ]));
        assert_eq!(request.format, ExportFormat::Csv);
        assert_eq!(request.page, 3);
        assert_eq!(request.limit, 50);
    }

    #[test]
    fn test_page_request_falls_back_on_invalid_values() {
        for bad in ["abc", "", "0", "-2", "-0"] {
            let request = PageRequest::from_query(&query(&[("page", bad), ("limit", bad)]));
            assert_eq!(request.page, 1, "page={bad}");
            assert_eq!(request.limit, 30, "limit={bad}");
        }
    }

    #[test]
    fn test_page_request_takes_leading_integer() {
        let request = PageRequest::from_query(&query(&[("page", " 12abc"), ("limit", "+7.5")]));
        assert_eq!(request.page, 12);
        assert_eq!(request.limit, 7);
    }

    #[test]
    fn test_page_request_saturates_oversized_numbers() {
        let request = PageRequest::from_query(&query(&[
            ("page", "99999999999999999999"),
            ("limit", "99999999999999999999x"),
        ]));
        assert_eq!(request.page, u64::MAX);
        assert_eq!(request.limit, u64::MAX);

        let request = PageRequest::from_query(&query(&[("page", "-99999999999999999999")]));
        assert_eq!(request.page, 1);
    }

    #[test]
    fn test_unknown_format_is_json() {
        let request = PageRequest::from_query(&query(&[("format", "xml")]));
        assert_eq!(request.format, ExportFormat::Json);
    }

    fn broadcast(gender: &str, country: &str, orientation: &str, tags: &[&str]) -> BroadcastItem {
        BroadcastItem {
            gender: gender.to_string(),
            country: country.to_string(),
            sexual_orientation: orientation.to_string(),
            tags: tags
                .iter()
                .map(|slug| Tag {
                    name: slug.to_string(),
                    slug: slug.to_string(),
                })
                .collect(),
            ..BroadcastItem::default()
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = BroadcastFilter::from_query(&query(&[("country", ""), ("tags", " , ")]));
        assert!(filter.is_empty());
        assert!(filter.matches(&broadcast("male", "BR", "gay", &[])));
    }

    #[test]
    fn test_filter_matches_fields() {
        let filter = BroadcastFilter::from_query(&query(&[
            ("gender", "male"),
            ("country", "br"),
            ("orientation", "GAY"),
            ("tags", "Chat, bear"),
        ]));
        assert_eq!(filter.tags, vec!["chat", "bear"]);

        assert!(filter.matches(&broadcast("male", "BR", "Gay", &["bear"])));
        assert!(!filter.matches(&broadcast("Male", "BR", "gay", &["bear"])));
        assert!(!filter.matches(&broadcast("male", "US", "gay", &["bear"])));
        assert!(!filter.matches(&broadcast("male", "BR", "straight", &["bear"])));
        assert!(!filter.matches(&broadcast("male", "BR", "gay", &["music"])));
    }

    #[test]
    fn test_ranked_broadcast_puts_rank_first() {
        let ranked = RankedBroadcast {
            rank: 1,
            item: broadcast("male", "BR", "gay", &[]),
        };
        let value = serde_json::to_value(&ranked).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();

        assert_eq!(keys[0], "XCamId");
        assert_eq!(keys[1], "id");
        assert_eq!(keys.len(), 11);
    }
}

//! Header specification parsing and outbound request construction

use crate::error::{ProbeError, Result};
use crate::models::ProbeTask;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use reqwest::{Client, Request};
use tracing::warn;

/// Header name to ordered values, in first-seen name order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMultimap {
    entries: Vec<(String, Vec<String>)>,
}

impl HeaderMultimap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `"Key1:Value1;Key2:Value2"` specification.
    ///
    /// Entries without `:` are logged and skipped; parsing continues with the
    /// remaining entries. Use [`HeaderMultimap::parse_with_rejects`] to
    /// inspect the skipped entries.
    pub fn parse(spec: &str) -> Self {
        Self::parse_with_rejects(spec).0
    }

    /// Like [`HeaderMultimap::parse`], also returning the malformed entries
    pub fn parse_with_rejects(spec: &str) -> (Self, Vec<String>) {
        let mut map = Self::new();
        let mut rejected = Vec::new();

        for pair in spec.split(';') {
            if pair.trim().is_empty() {
                continue;
            }

            match pair.split_once(':') {
                Some((name, value)) if !name.trim().is_empty() => {
                    map.insert(name.trim(), value.trim());
                }
                _ => {
                    warn!("Invalid header format: {}", pair.trim());
                    rejected.push(pair.trim().to_string());
                }
            }
        }

        (map, rejected)
    }

    /// Appends a value for `name`, keeping earlier values
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, values)) => values.push(value.to_string()),
            None => self
                .entries
                .push((name.to_string(), vec![value.to_string()])),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(n, values)| (n.as_str(), values.as_slice()))
    }

    /// Converts into a `HeaderMap`.
    ///
    /// Names are compared case-insensitively. All `Cookie` values are joined
    /// with `; ` into a single header line; every other repeated header
    /// becomes repeated header lines.
    pub fn to_header_map(&self) -> std::result::Result<HeaderMap, String> {
        let mut map = HeaderMap::new();
        let mut cookies: Vec<&str> = Vec::new();

        for (name, values) in self.iter() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| format!("invalid header name '{name}': {e}"))?;

            if header_name == COOKIE {
                cookies.extend(values.iter().map(String::as_str));
                continue;
            }

            for value in values {
                let value = HeaderValue::from_str(value)
                    .map_err(|e| format!("invalid value for header '{name}': {e}"))?;
                map.append(header_name.clone(), value);
            }
        }

        if !cookies.is_empty() {
            let joined = cookies.join("; ");
            let value = HeaderValue::from_str(&joined)
                .map_err(|e| format!("invalid value for header 'Cookie': {e}"))?;
            map.insert(COOKIE, value);
        }

        Ok(map)
    }
}

/// Builds the outbound request for one probe task.
///
/// Configured headers replace client defaults with the same name.
pub fn build_request(client: &Client, task: &ProbeTask, headers: &HeaderMultimap) -> Result<Request> {
    let header_map = headers.to_header_map().map_err(|reason| ProbeError::RequestBuild {
        url: task.url.clone(),
        reason,
    })?;

    client
        .request(task.method.clone(), task.url.as_str())
        .headers(header_map)
        .build()
        .map_err(|e| ProbeError::RequestBuild {
            url: task.url.clone(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    #[test]
    fn test_parse_basic_pairs() {
        let headers = HeaderMultimap::parse("Key1:Value1;Key2:Value2");
        assert_eq!(headers.get("Key1"), Some(&["Value1".to_string()][..]));
        assert_eq!(headers.get("Key2"), Some(&["Value2".to_string()][..]));
    }

    #[test]
    fn test_value_keeps_colons_after_first() {
        let headers = HeaderMultimap::parse(" Referer : https://example.com:8443/x ");
        assert_eq!(
            headers.get("Referer"),
            Some(&["https://example.com:8443/x".to_string()][..])
        );
    }

    #[test]
    fn test_malformed_entry_is_skipped() {
        let (headers, rejected) =
            HeaderMultimap::parse_with_rejects("Authorization: Bearer abc;garbage;X-Test:1;");
        assert_eq!(rejected, vec!["garbage".to_string()]);
        assert_eq!(headers.len(), 2);
        assert!(headers.get("X-Test").is_some());
    }

    #[test]
    fn test_repeated_names_accumulate_in_order() {
        let headers = HeaderMultimap::parse("Cookie:a=1;X-A:1;Cookie:b=2");
        assert_eq!(
            headers.get("Cookie"),
            Some(&["a=1".to_string(), "b=2".to_string()][..])
        );
        let names: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Cookie", "X-A"]);
    }

    #[test]
    fn test_cookie_values_join_into_one_line() {
        let headers = HeaderMultimap::parse("Cookie:a=1;Cookie:b=2");
        let map = headers.to_header_map().expect("valid headers");

        let cookies: Vec<_> = map.get_all(COOKIE).iter().collect();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0], "a=1; b=2");
    }

    #[test]
    fn test_cookie_names_differing_in_case_share_one_line() {
        let headers = HeaderMultimap::parse("Cookie:a=1;cookie:b=2;COOKIE:c=3");
        let map = headers.to_header_map().expect("valid headers");

        let cookies: Vec<_> = map.get_all("cookie").iter().collect();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0], "a=1; b=2; c=3");
    }

    #[test]
    fn test_other_repeated_headers_are_appended() {
        let headers = HeaderMultimap::parse("X-Role:admin;x-role:user");
        let map = headers.to_header_map().expect("valid headers");
        assert_eq!(map.get_all("x-role").iter().count(), 2);
    }

    #[test]
    fn test_build_request_rejects_bad_url() {
        let client = Client::new();
        let task = ProbeTask::new(Method::GET, "not a url");
        let result = build_request(&client, &task, &HeaderMultimap::new());
        assert!(matches!(result, Err(ProbeError::RequestBuild { .. })));
    }

    #[test]
    fn test_build_request_rejects_bad_header_value() {
        let client = Client::new();
        let task = ProbeTask::new(Method::GET, "https://example.com/");
        let mut headers = HeaderMultimap::new();
        headers.insert("X-Bad", "line\nbreak");
        let result = build_request(&client, &task, &headers);
        assert!(matches!(result, Err(ProbeError::RequestBuild { .. })));
    }

    #[test]
    fn test_build_request_carries_method_and_headers() {
        let client = Client::new();
        let task = ProbeTask::new(Method::PATCH, "https://example.com/api");
        let headers = HeaderMultimap::parse("Authorization:Bearer t0k3n");
        let request = build_request(&client, &task, &headers).expect("request");

        assert_eq!(request.method(), &Method::PATCH);
        assert_eq!(request.url().as_str(), "https://example.com/api");
        assert_eq!(
            request.headers().get("authorization").and_then(|v| v.to_str().ok()),
            Some("Bearer t0k3n")
        );
    }
}

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use thiserror::Error;

/// Bytes left as-is in placeholder values: RFC3986 unreserved characters.
const PATH_VALUE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Error returned when an endpoint template references placeholders that have
/// no value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("endpoint '{template}' has unresolved placeholders: {}", .missing.join(", "))]
pub struct UnresolvedPlaceholder {
    pub template: String,
    pub missing: Vec<String>,
}

/// Resolve an endpoint template by substituting every `{name}` placeholder.
///
/// Values are percent-encoded so a group name such as `team/eng ops` cannot
/// alter the path structure. Every placeholder must resolve; a missing or
/// empty value is reported with all offending names.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use atladmin_util::http::resolve_endpoint;
///
/// let mut params = BTreeMap::new();
/// params.insert("projectKey".to_string(), "ENG".to_string());
/// params.insert("roleId".to_string(), "10002".to_string());
///
/// let path = resolve_endpoint("/rest/api/3/project/{projectKey}/role/{roleId}", &params).unwrap();
/// assert_eq!(path, "/rest/api/3/project/ENG/role/10002");
///
/// let missing = resolve_endpoint("/issue/{issueKey}", &BTreeMap::new()).unwrap_err();
/// assert_eq!(missing.missing, vec!["issueKey".to_string()]);
/// ```
pub fn resolve_endpoint(template: &str, params: &BTreeMap<String, String>) -> Result<String, UnresolvedPlaceholder> {
    let mut resolved = String::with_capacity(template.len());
    let mut missing = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        resolved.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('}') else {
            // An unterminated brace is literal text.
            resolved.push_str(&rest[open..]);
            rest = "";
            break;
        };
        let name = &after_open[..close];
        match params.get(name).filter(|value| !value.trim().is_empty()) {
            Some(value) => resolved.extend(utf8_percent_encode(value, PATH_VALUE_ENCODE_SET)),
            None => missing.push(name.to_string()),
        }
        rest = &after_open[close + 1..];
    }
    resolved.push_str(rest);

    if missing.is_empty() {
        Ok(resolved)
    } else {
        Err(UnresolvedPlaceholder {
            template: template.to_string(),
            missing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn resolve_preserves_unreserved_identifier_bytes() {
        let path = resolve_endpoint("/users/{accountId}/manage/profile", &params(&[("accountId", "5b10a2844c20165700ede21g")]));
        assert_eq!(path.as_deref(), Ok("/users/5b10a2844c20165700ede21g/manage/profile"));
    }

    #[test]
    fn resolve_encodes_reserved_bytes_for_placeholder_values() {
        let path = resolve_endpoint("/space/{spaceKey}/permission", &params(&[("spaceKey", "team/dev ops")]));
        assert_eq!(path.as_deref(), Ok("/space/team%2Fdev%20ops/permission"));

        let path = resolve_endpoint("/users/{accountId}", &params(&[("accountId", "557058:f5e7")]));
        assert_eq!(path.as_deref(), Ok("/users/557058%3Af5e7"));
    }

    #[test]
    fn resolve_reports_every_missing_or_blank_placeholder() {
        let error = resolve_endpoint("/ex/jira/{cloudId}/issue/{issueKey}", &params(&[("cloudId", " ")])).unwrap_err();
        assert_eq!(error.missing, vec!["cloudId".to_string(), "issueKey".to_string()]);
        assert!(error.to_string().contains("cloudId, issueKey"));
    }

    #[test]
    fn resolve_ignores_unused_params_and_unterminated_braces() {
        let path = resolve_endpoint("/users{", &params(&[("extra", "x")]));
        assert_eq!(path.as_deref(), Ok("/users{"));
    }
}

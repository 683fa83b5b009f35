//! Minimal XML-RPC envelope for talking to aria2.
//!
//! Only the value shapes aria2's add calls need are supported: strings,
//! integers, arrays, structs, and base64 binary. Requests are built as
//! text and responses are scanned for either a fault or a single scalar
//! result, which is all the add-call acknowledgements carry.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use regex::Regex;

use super::error::SubmitError;

#[allow(clippy::expect_used)]
static FAULT_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<name>faultCode</name>\s*<value>\s*<(?:int|i4)>(-?\d+)</(?:int|i4)>")
        .expect("fault code regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static FAULT_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<name>faultString</name>\s*<value>\s*(?:<string>)?([^<]*)")
        .expect("fault string regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static SCALAR_RESULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<param>\s*<value>\s*(?:<(?:string|int|i4)>)?([^<]*)")
        .expect("scalar result regex is valid") // Static pattern, safe to panic
});

/// An XML-RPC parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `<string>`
    Text(String),
    /// `<int>`
    Integer(i64),
    /// `<array>` of values.
    Array(Vec<Value>),
    /// `<struct>` keyed by member name, in key order.
    Struct(BTreeMap<String, Value>),
    /// `<base64>`-encoded binary payload.
    Binary(Vec<u8>),
}

impl Value {
    fn write_xml(&self, out: &mut String) {
        out.push_str("<value>");
        match self {
            Self::Text(s) => {
                out.push_str("<string>");
                out.push_str(&escape(s));
                out.push_str("</string>");
            }
            Self::Integer(n) => {
                out.push_str("<int>");
                out.push_str(&n.to_string());
                out.push_str("</int>");
            }
            Self::Array(items) => {
                out.push_str("<array><data>");
                for item in items {
                    item.write_xml(out);
                }
                out.push_str("</data></array>");
            }
            Self::Struct(members) => {
                out.push_str("<struct>");
                for (name, value) in members {
                    out.push_str("<member><name>");
                    out.push_str(&escape(name));
                    out.push_str("</name>");
                    value.write_xml(out);
                    out.push_str("</member>");
                }
                out.push_str("</struct>");
            }
            Self::Binary(bytes) => {
                out.push_str("<base64>");
                out.push_str(&BASE64.encode(bytes));
                out.push_str("</base64>");
            }
        }
        out.push_str("</value>");
    }
}

/// Serializes a `methodCall` document.
#[must_use]
pub fn method_call(method: &str, params: &[Value]) -> String {
    let mut body = String::new();
    body.push_str(r#"<?xml version="1.0"?>"#);
    body.push_str("<methodCall><methodName>");
    body.push_str(&escape(method));
    body.push_str("</methodName><params>");
    for param in params {
        body.push_str("<param>");
        param.write_xml(&mut body);
        body.push_str("</param>");
    }
    body.push_str("</params></methodCall>");
    body
}

/// Rejects a `methodResponse` that carries a fault envelope.
///
/// # Errors
///
/// [`SubmitError::Fault`] with the extracted code and string.
pub fn check_fault(body: &str) -> Result<(), SubmitError> {
    if body.contains("<fault>") {
        let code = FAULT_CODE
            .captures(body)
            .and_then(|caps| caps[1].parse::<i64>().ok())
            .unwrap_or(0);
        let message = FAULT_STRING
            .captures(body)
            .map(|caps| unescape(caps[1].trim()))
            .unwrap_or_else(|| "unknown fault".to_string());
        return Err(SubmitError::Fault { code, message });
    }
    Ok(())
}

/// Extracts the scalar result of a `methodResponse`, or the fault it
/// carries. A struct-valued result yields an empty string; use
/// [`struct_member`] to pull named members out of those.
///
/// # Errors
///
/// [`SubmitError::Fault`] for fault envelopes, [`SubmitError::MalformedResponse`]
/// when neither a fault nor a result value can be found.
pub fn parse_response(body: &str) -> Result<String, SubmitError> {
    check_fault(body)?;
    SCALAR_RESULT
        .captures(body)
        .map(|caps| unescape(caps[1].trim()))
        .ok_or_else(|| SubmitError::MalformedResponse {
            detail: "no scalar result in methodResponse".to_string(),
        })
}

/// Extracts a named string member from a struct-valued response, e.g. the
/// `version` member of an `aria2.getVersion` answer.
#[must_use]
pub fn struct_member(body: &str, name: &str) -> Option<String> {
    let pattern = format!(
        "<name>{}</name>\\s*<value>\\s*(?:<string>)?([^<]*)",
        regex::escape(name)
    );
    let member = Regex::new(&pattern).ok()?;
    member
        .captures(body)
        .map(|caps| unescape(caps[1].trim()))
}

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn unescape(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_method_call_serializes_string_params() {
        let body = method_call("aria2.getVersion", &[Value::Text("token:abc".into())]);
        assert!(body.starts_with(r#"<?xml version="1.0"?>"#));
        assert!(body.contains("<methodName>aria2.getVersion</methodName>"));
        assert!(body.contains("<param><value><string>token:abc</string></value></param>"));
    }

    #[test]
    fn test_method_call_escapes_xml_metacharacters() {
        let body = method_call(
            "aria2.addUri",
            &[Value::Array(vec![Value::Text(
                "magnet:?xt=urn:btih:abc&dn=a<b".into(),
            )])],
        );
        assert!(body.contains("magnet:?xt=urn:btih:abc&amp;dn=a&lt;b"));
        assert!(!body.contains("a<b"));
    }

    #[test]
    fn test_method_call_serializes_struct_with_mixed_value_types() {
        let mut options = BTreeMap::new();
        options.insert("dir".to_string(), Value::Text("/data/dl".into()));
        options.insert("split".to_string(), Value::Integer(4));
        let body = method_call("aria2.addUri", &[Value::Struct(options)]);
        assert!(body.contains(
            "<member><name>dir</name><value><string>/data/dl</string></value></member>"
        ));
        assert!(body.contains("<member><name>split</name><value><int>4</int></value></member>"));
    }

    #[test]
    fn test_method_call_serializes_binary_as_base64() {
        let body = method_call("aria2.addTorrent", &[Value::Binary(b"d8:announce".to_vec())]);
        assert!(body.contains("<base64>"));
        assert!(body.contains(&BASE64.encode(b"d8:announce")));
    }

    #[test]
    fn test_parse_response_extracts_string_result() {
        let body = concat!(
            r#"<?xml version="1.0"?>"#,
            "<methodResponse><params><param><value><string>2089b05ecca3d829</string>",
            "</value></param></params></methodResponse>",
        );
        assert_eq!(parse_response(body).unwrap(), "2089b05ecca3d829");
    }

    #[test]
    fn test_parse_response_extracts_untyped_result() {
        let body =
            "<methodResponse><params><param><value>bare</value></param></params></methodResponse>";
        assert_eq!(parse_response(body).unwrap(), "bare");
    }

    #[test]
    fn test_parse_response_maps_fault_to_error() {
        let body = concat!(
            "<methodResponse><fault><value><struct>",
            "<member><name>faultCode</name><value><int>1</int></value></member>",
            "<member><name>faultString</name><value><string>Unauthorized</string></value></member>",
            "</struct></value></fault></methodResponse>",
        );
        let err = parse_response(body).unwrap_err();
        match err {
            SubmitError::Fault { code, message } => {
                assert_eq!(code, 1);
                assert_eq!(message, "Unauthorized");
            }
            other => panic!("expected Fault, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_response_rejects_garbage() {
        let err = parse_response("not xml at all").unwrap_err();
        assert!(matches!(err, SubmitError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_response_accepts_struct_result_as_empty_scalar() {
        let body = concat!(
            "<methodResponse><params><param><value><struct>",
            "<member><name>version</name><value><string>1.37.0</string></value></member>",
            "</struct></value></param></params></methodResponse>",
        );
        assert_eq!(parse_response(body).unwrap(), "");
    }

    #[test]
    fn test_struct_member_extracts_named_string() {
        let body = concat!(
            "<methodResponse><params><param><value><struct>",
            "<member><name>version</name><value><string>1.37.0</string></value></member>",
            "<member><name>enabledFeatures</name><value><array><data>",
            "<value><string>BitTorrent</string></value>",
            "</data></array></value></member>",
            "</struct></value></param></params></methodResponse>",
        );
        assert_eq!(struct_member(body, "version").as_deref(), Some("1.37.0"));
        assert_eq!(struct_member(body, "missing"), None);
    }
}

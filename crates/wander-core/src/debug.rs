// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wander contributors

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

/// Pretty-prints backend session state with 4-space indentation.
pub fn pretty_session(value: &serde_json::Value) -> crate::Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Markup of the "Session" dialog body.
pub fn session_markup(pretty: &str) -> String {
    format!("<pre>{}</pre>", html_escape::encode_text(pretty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_four_space_indent() {
        let value = json!({"waypoints": [{"place_name": "Coit Tower"}]});
        let text = pretty_session(&value).unwrap();
        assert_eq!(
            text,
            "{\n    \"waypoints\": [\n        {\n            \"place_name\": \"Coit Tower\"\n        }\n    ]\n}"
        );
    }

    #[test]
    fn test_markup_wraps_in_pre() {
        assert_eq!(session_markup("{}"), "<pre>{}</pre>");
        assert_eq!(session_markup("\"a<b\""), "<pre>\"a&lt;b\"</pre>");
    }
}

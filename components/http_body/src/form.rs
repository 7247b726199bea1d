//! Form-urlencoded body encoding

use bytes::Bytes;
use http_errors::HttpResult;
use http_types::{ArrayEncoding, BoolEncoding, FormValue};

/// Encode a (possibly nested) set of form fields per §4.1: nested maps flatten with
/// `parent[child]` bracket notation, arrays follow `array_encoding`, booleans follow
/// `bool_encoding`, and the whole thing is percent-encoded per URL-query rules.
pub fn encode_form(
    fields: &[(String, FormValue)],
    array_encoding: ArrayEncoding,
    bool_encoding: BoolEncoding,
) -> HttpResult<Bytes> {
    let mut flat = Vec::new();
    for (key, value) in fields {
        flatten(key, value, array_encoding, bool_encoding, &mut flat);
    }
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(flat.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish();
    Ok(Bytes::from(encoded))
}

fn flatten(
    key: &str,
    value: &FormValue,
    array_encoding: ArrayEncoding,
    bool_encoding: BoolEncoding,
    out: &mut Vec<(String, String)>,
) {
    match value {
        FormValue::String(s) => out.push((key.to_string(), s.clone())),
        FormValue::Bool(b) => {
            let rendered = match bool_encoding {
                BoolEncoding::Numeric => {
                    if *b {
                        "1".to_string()
                    } else {
                        "0".to_string()
                    }
                }
                BoolEncoding::Literal => b.to_string(),
            };
            out.push((key.to_string(), rendered));
        }
        FormValue::Int(i) => out.push((key.to_string(), i.to_string())),
        FormValue::Float(f) => out.push((key.to_string(), f.to_string())),
        FormValue::Array(items) => {
            for item in items {
                let item_key = match array_encoding {
                    ArrayEncoding::Brackets => format!("{key}[]"),
                    ArrayEncoding::Plain => key.to_string(),
                };
                flatten(&item_key, item, array_encoding, bool_encoding, out);
            }
        }
        FormValue::Object(pairs) => {
            for (sub_key, sub_value) in pairs {
                let nested_key = format!("{key}[{sub_key}]");
                flatten(&nested_key, sub_value, array_encoding, bool_encoding, out);
            }
        }
    }
}

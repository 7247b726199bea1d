//! Unit tests for http_body component

use bytes::Bytes;
use http_body::{encode_body, BodyPayload};
use http_types::{ArrayEncoding, Body, BoolEncoding, FormValue, JsonOptions};

#[cfg(test)]
mod encode_body_tests {
    use super::*;

    #[tokio::test]
    async fn form_urlencoded_scenario_from_spec() {
        let fields = vec![
            ("p3".to_string(), FormValue::Bool(false)),
            (
                "p4".to_string(),
                FormValue::Array(vec!["a".into(), "b".into()]),
            ),
            (
                "nested".to_string(),
                FormValue::Object(vec![("k".to_string(), "v".into())]),
            ),
        ];
        let encoded = encode_body(&Body::FormUrlEncoded(
            fields,
            ArrayEncoding::Brackets,
            BoolEncoding::Numeric,
        ))
        .await
        .unwrap();
        let body = match encoded.payload {
            BodyPayload::Bytes(bytes) => String::from_utf8(bytes.to_vec()).unwrap(),
            _ => panic!("expected bytes payload"),
        };
        assert!(body.contains("p3=0"));
        assert!(body.contains("p4%5B%5D=a"));
        assert!(body.contains("p4%5B%5D=b"));
        assert!(body.contains("nested%5Bk%5D=v"));
        assert_eq!(
            encoded.content_type.as_deref(),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[tokio::test]
    async fn multipart_two_files_scenario_from_spec() {
        let body = Body::multipart(vec![
            http_types::MultipartPart::file("image1", "png.png", "image/png", b"PNGBYTES".to_vec()),
            http_types::MultipartPart::file("image2", "jpg.jpg", "image/jpeg", b"JPGBYTES".to_vec()),
        ]);
        let encoded = encode_body(&body).await.unwrap();
        assert!(encoded
            .content_type
            .as_deref()
            .unwrap()
            .starts_with("multipart/form-data; boundary="));
        let bytes = match encoded.payload {
            BodyPayload::Bytes(bytes) => bytes,
            _ => panic!("expected bytes payload"),
        };
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("name=\"image1\"; filename=\"png.png\""));
        assert!(text.contains("Content-Type: image/png"));
        assert!(text.ends_with("--\r\n"));
    }

    #[tokio::test]
    async fn stream_body_sets_only_content_type() {
        let encoded = encode_body(&Body::Stream(
            http_types::StreamSource::Bytes(Bytes::from_static(b"streamed")),
            Some("application/octet-stream".to_string()),
        ))
        .await
        .unwrap();
        assert_eq!(
            encoded.content_type.as_deref(),
            Some("application/octet-stream")
        );
        assert_eq!(encoded.content_length, Some(8));
        assert!(matches!(encoded.payload, BodyPayload::Stream(_)));
    }

    #[tokio::test]
    async fn json_body_defaults_to_application_json() {
        let encoded = encode_body(&Body::Json(
            serde_json::json!({"b": 1, "a": 2}),
            JsonOptions::default(),
        ))
        .await
        .unwrap();
        let bytes = match encoded.payload {
            BodyPayload::Bytes(bytes) => bytes,
            _ => panic!("expected bytes payload"),
        };
        assert_eq!(bytes.as_ref(), br#"{"a":2,"b":1}"#);
    }
}

//! Unit tests for http_types component

use http::Method;
use http_types::{
    ArrayEncoding, Body, BoolEncoding, FormValue, JsonOptions, MultipartPart, PartialData,
    RequestBuilder, TransferMode,
};

#[cfg(test)]
mod body_tests {
    use super::*;

    #[test]
    fn form_urlencoded_body_preserves_field_order() {
        let body = Body::FormUrlEncoded(
            vec![
                ("p3".to_string(), FormValue::Bool(false)),
                (
                    "p4".to_string(),
                    FormValue::Array(vec!["a".into(), "b".into()]),
                ),
                (
                    "nested".to_string(),
                    FormValue::Object(vec![("k".to_string(), "v".into())]),
                ),
            ],
            ArrayEncoding::Brackets,
            BoolEncoding::Numeric,
        );
        match body {
            Body::FormUrlEncoded(pairs, ..) => {
                assert_eq!(pairs[0].0, "p3");
                assert_eq!(pairs[1].0, "p4");
                assert_eq!(pairs[2].0, "nested");
            }
            _ => panic!("expected FormUrlEncoded"),
        }
    }

    #[test]
    fn json_body_defaults_to_sorted_keys() {
        let opts = JsonOptions::default();
        assert!(opts.sorted_keys);
    }

    #[test]
    fn multipart_file_part_known_length_from_bytes() {
        let part = MultipartPart::file("image1", "png.png", "image/png", vec![1, 2, 3, 4]);
        assert_eq!(part.known_length(), Some(4));
    }
}

#[cfg(test)]
mod request_tests {
    use super::*;

    #[test]
    fn builder_rejects_partial_data_without_large_data_mode_mismatch() {
        // The builder itself always forces LargeData when partial_data is set,
        // so this exercises that the invariant holds after build().
        let request = RequestBuilder::to_path(Method::GET, "/download")
            .partial_data(PartialData {
                bytes: bytes::Bytes::from_static(b"resumable"),
                file_name: Some("download.bin".to_string()),
            })
            .build()
            .unwrap();
        assert_eq!(request.transfer_mode, TransferMode::LargeData);
        assert!(request.partial_data.is_some());
    }

    #[test]
    fn default_priority_is_auto() {
        let request = RequestBuilder::to_path(Method::GET, "/x").build().unwrap();
        assert_eq!(request.priority, http_types::Priority::Auto);
    }
}

//! Validation of untrusted GeoJSON text.
//!
//! Input comes from the page URL fragment or a user's gist, so it is
//! URI-decoded, parsed and shape-checked here before anything is drawn.

use crate::{
    data::{
        geojson::{Feature, FeatureCollection, Geometry},
        properties::FeatureProperties,
    },
    layers::icon::IconManifest,
    FormatError,
};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Replaces `& < > " '` with HTML entities.
///
/// `&` goes first so the entities produced for the other characters are
/// not escaped again.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Strict percent-decoding: every `%` must start a two-digit hex escape
/// and the decoded bytes must be UTF-8.
pub fn decode_uri_component(encoded: &str) -> Result<String, FormatError> {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = bytes.get(i + 1).copied().and_then(hex_value);
            let lo = bytes.get(i + 2).copied().and_then(hex_value);
            match (hi, lo) {
                (Some(hi), Some(lo)) => decoded.push(hi << 4 | lo),
                _ => return Err(FormatError::BadUriEncoding),
            }
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).map_err(|_| FormatError::BadUriEncoding)
}

fn validate_feature(
    index: usize,
    feature: &Map<String, Value>,
    icons: &IconManifest,
) -> Result<Feature, FormatError> {
    let geometry = match feature.get("geometry") {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            Geometry::deserialize(value)
                .map_err(|source| FormatError::InvalidGeometry { index, source })?,
        ),
    };

    let empty = Map::new();
    let raw_properties = feature
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    Ok(Feature {
        id: feature.get("id").cloned(),
        geometry,
        properties: FeatureProperties::from_raw(raw_properties, icons, index)?,
    })
}

/// Decodes, parses and sanitizes a user-supplied FeatureCollection.
///
/// The document is rejected as a whole when it is not URI-decodable, not
/// JSON, an array, not a `FeatureCollection`, has no `features` array, or
/// when any feature has an unusable `popupText` or geometry. Other bad
/// property values are replaced with defaults (see
/// [`FeatureProperties::from_raw`]).
pub fn validate(untrusted: &str, icons: &IconManifest) -> Result<FeatureCollection, FormatError> {
    let decoded = decode_uri_component(untrusted)?;
    let document: Value = serde_json::from_str(&decoded).map_err(FormatError::InvalidJson)?;

    let object = match document {
        Value::Array(_) => return Err(FormatError::TopLevelArray),
        Value::Object(object) => object,
        _ => return Err(FormatError::NotFeatureCollection),
    };

    if object.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(FormatError::NotFeatureCollection);
    }

    let features = object
        .get("features")
        .and_then(Value::as_array)
        .ok_or(FormatError::MissingFeatures)?;

    let mut collection = FeatureCollection::default();
    for (index, feature) in features.iter().enumerate() {
        let feature = feature
            .as_object()
            .ok_or(FormatError::InvalidFeature { index })?;
        collection
            .features
            .push(validate_feature(index, feature, icons)?);
    }

    log::debug!("validated {} features", collection.len());
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::properties::PopupText;
    use crate::core::geo::LatLng;

    fn icons() -> IconManifest {
        IconManifest::builtin()
    }

    const WAYPOINT: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","geometry":{"type":"Point","coordinates":[1200,3400]},
         "properties":{"popupText":"Camp","iconName":"doesNotExist","iconSize":"bad"}}
    ]}"#;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_html_output_has_no_raw_characters() {
        let escaped = escape_html("&<>\"' & done");
        for c in ['<', '>', '"', '\''] {
            assert!(!escaped.contains(c));
        }
        // every '&' now starts an entity
        assert_eq!(escaped.matches('&').count(), escaped.matches(';').count());
        // escaping again only doubles the ampersands
        assert_eq!(escape_html(&escaped), escaped.replace('&', "&amp;"));
    }

    #[test]
    fn test_decode_uri_component() {
        assert_eq!(decode_uri_component("a%20b%7B%22").unwrap(), "a b{\"");
        assert_eq!(decode_uri_component("%C3%A9").unwrap(), "é");
        assert_eq!(decode_uri_component("plain").unwrap(), "plain");
        assert!(decode_uri_component("100%").is_err());
        assert!(decode_uri_component("%zz").is_err());
        assert!(decode_uri_component("%C3").is_err());
    }

    #[test]
    fn test_valid_document() {
        let collection = validate(WAYPOINT, &icons()).unwrap();
        assert_eq!(collection.len(), 1);

        let feature = &collection.features[0];
        assert_eq!(
            feature.geometry.as_ref().unwrap().to_lat_lng_points(),
            vec![LatLng::new(3400.0, 1200.0)]
        );
        assert_eq!(feature.properties.icon_name.as_deref(), Some("waypoint"));
        assert_eq!(feature.properties.icon_size, Some([32.0, 32.0]));
        assert_eq!(
            feature.properties.popup_text,
            Some(PopupText::Single("Camp".to_string()))
        );
    }

    #[test]
    fn test_uri_encoded_document() {
        let encoded = WAYPOINT
            .replace('{', "%7B")
            .replace('}', "%7D")
            .replace('"', "%22");
        assert_eq!(validate(&encoded, &icons()).unwrap().len(), 1);
    }

    #[test]
    fn test_rejects_non_feature_collections() {
        let cases = [
            r#"[]"#,
            r#"[{"type":"FeatureCollection","features":[]}]"#,
            r#"{}"#,
            r#"{"type":"Feature","features":[]}"#,
            r#""FeatureCollection""#,
            r#"null"#,
            r#"42"#,
        ];
        for case in cases {
            assert!(validate(case, &icons()).is_err(), "accepted {}", case);
        }
        assert!(matches!(
            validate("[]", &icons()),
            Err(FormatError::TopLevelArray)
        ));
        assert!(matches!(
            validate("{}", &icons()),
            Err(FormatError::NotFeatureCollection)
        ));
    }

    #[test]
    fn test_rejects_missing_features() {
        for case in [
            r#"{"type":"FeatureCollection"}"#,
            r#"{"type":"FeatureCollection","features":{}}"#,
        ] {
            assert!(matches!(
                validate(case, &icons()),
                Err(FormatError::MissingFeatures)
            ));
        }
    }

    #[test]
    fn test_rejects_bad_encoding_and_json() {
        assert!(matches!(
            validate("%E0%A4%A", &icons()),
            Err(FormatError::BadUriEncoding)
        ));
        assert!(matches!(
            validate("{not json", &icons()),
            Err(FormatError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_bad_popup_text_fails_whole_document() {
        let doc = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":null,"properties":{"popupText":"fine"}},
            {"type":"Feature","geometry":null,"properties":{"popupText":[1,2]}}
        ]}"#;
        assert!(matches!(
            validate(doc, &icons()),
            Err(FormatError::InvalidPopupText { index: 1 })
        ));
    }

    #[test]
    fn test_bad_geometry_fails_whole_document() {
        let doc = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Point","coordinates":"here"}}
        ]}"#;
        assert!(matches!(
            validate(doc, &icons()),
            Err(FormatError::InvalidGeometry { index: 0, .. })
        ));
    }

    #[test]
    fn test_non_object_feature_fails_whole_document() {
        let doc = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]}},
            7
        ]}"#;
        assert!(matches!(
            validate(doc, &icons()),
            Err(FormatError::InvalidFeature { index: 1 })
        ));
    }

    #[test]
    fn test_features_without_properties_or_geometry() {
        let doc = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature"},
            {"type":"Feature","properties":"odd","geometry":{"type":"Point","coordinates":[0,0]}}
        ]}"#;
        let collection = validate(doc, &icons()).unwrap();
        assert_eq!(collection.len(), 2);
        assert!(collection.features[0].geometry.is_none());
        assert_eq!(collection.features[1].properties.popup_text, None);
    }
}

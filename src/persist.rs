//! Type-tagged document persistence.
//!
//! A frozen registry maps a Rust type to an encode function and a reserved
//! tag key to a decode function. Values of registered types are written as
//! `{ "<tag>": true, ...fields }`; everything else is encoded structurally.
//! On decode the tag key is authoritative regardless of field order, and
//! mappings without a registered tag pass through unchanged. The registry
//! is built once behind a `LazyLock` and immutable afterwards, so
//! registration can never race an encode or decode.

use std::{
    any::{Any, TypeId, type_name},
    path::Path,
    sync::LazyLock,
};

use anyhow::Context as _;
use serde_json::{Map, Value};

use crate::{
    boundary::ExclusionBoundary,
    error::{LetterhuntError, LhResult},
    model::{Distractor, Document},
    space::Point2,
};

/// Tag key identifying an encoded [`Point2`].
pub const POINT_TAG: &str = "__Point2D__";
/// Tag key identifying an encoded [`Distractor`].
pub const DISTRACTOR_TAG: &str = "__distractor__";

/// Default file name for a saved document.
pub const DEFAULT_DOCUMENT_NAME: &str = "letterhunt.json";

type EncodeDyn = Box<dyn Fn(&dyn Any) -> Option<Value> + Send + Sync>;
type DecodeDyn = Box<dyn Fn(&Map<String, Value>) -> LhResult<Box<dyn Any>> + Send + Sync>;

struct EncoderEntry {
    type_id: TypeId,
    type_name: &'static str,
    encode: EncodeDyn,
}

struct DecoderEntry {
    tag: &'static str,
    decode: DecodeDyn,
}

/// Open-ended collection phase of the codec. Handlers for new persisted
/// types register here without touching the encode/decode core.
#[derive(Default)]
pub struct CodecBuilder {
    encoders: Vec<EncoderEntry>,
    decoders: Vec<DecoderEntry>,
}

impl CodecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: 'static>(
        mut self,
        tag: &'static str,
        encode: fn(&T) -> Value,
        decode: fn(&Map<String, Value>) -> LhResult<T>,
    ) -> Self {
        self.encoders.push(EncoderEntry {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            encode: Box::new(move |any| any.downcast_ref::<T>().map(encode)),
        });
        self.decoders.push(DecoderEntry {
            tag,
            decode: Box::new(move |map| decode(map).map(|v| Box::new(v) as Box<dyn Any>)),
        });
        self
    }

    /// Finish registration. The resulting codec has no mutating methods.
    pub fn freeze(self) -> Codec {
        Codec {
            encoders: self.encoders,
            decoders: self.decoders,
        }
    }
}

pub struct Codec {
    encoders: Vec<EncoderEntry>,
    decoders: Vec<DecoderEntry>,
}

impl Codec {
    /// Encode a registered value as its tagged mapping.
    pub fn encode(&self, value: &dyn Any) -> LhResult<Value> {
        let type_id = Any::type_id(value);
        for entry in &self.encoders {
            if entry.type_id == type_id {
                return (entry.encode)(value).ok_or_else(|| {
                    LetterhuntError::unregistered_type(format!(
                        "encoder for {} rejected the value",
                        entry.type_name
                    ))
                });
            }
        }
        Err(LetterhuntError::unregistered_type(
            "no encoder registered for this type",
        ))
    }

    /// Reconstruct the typed value from a mapping carrying a registered tag
    /// key. A mapping without any registered tag passes through (`None`).
    pub fn revive(&self, map: &Map<String, Value>) -> LhResult<Option<Box<dyn Any>>> {
        for entry in &self.decoders {
            if map.contains_key(entry.tag) {
                return (entry.decode)(map).map(Some);
            }
        }
        Ok(None)
    }

    /// [`Codec::revive`] narrowed to an expected type. Non-mappings and
    /// untagged mappings pass through as `None`.
    pub fn revive_as<T: 'static>(&self, value: &Value) -> LhResult<Option<T>> {
        let Some(map) = value.as_object() else {
            return Ok(None);
        };
        match self.revive(map)? {
            None => Ok(None),
            Some(boxed) => match boxed.downcast::<T>() {
                Ok(typed) => Ok(Some(*typed)),
                Err(_) => Err(LetterhuntError::validation(format!(
                    "tagged value decoded to a different type than {}",
                    type_name::<T>()
                ))),
            },
        }
    }
}

/// The process-wide codec for document persistence, frozen before first use.
pub fn document_codec() -> &'static Codec {
    static CODEC: LazyLock<Codec> = LazyLock::new(|| {
        CodecBuilder::new()
            .register::<Point2>(POINT_TAG, encode_point, decode_point)
            .register::<Distractor>(DISTRACTOR_TAG, encode_distractor, decode_distractor)
            .freeze()
    });
    &CODEC
}

fn encode_point(p: &Point2) -> Value {
    let mut m = Map::new();
    m.insert(POINT_TAG.to_string(), Value::Bool(true));
    m.insert("x".to_string(), p.x.into());
    m.insert("y".to_string(), p.y.into());
    Value::Object(m)
}

fn decode_point(m: &Map<String, Value>) -> LhResult<Point2> {
    Ok(Point2::new(require_f64(m, "x")?, require_f64(m, "y")?))
}

fn encode_distractor(d: &Distractor) -> Value {
    let mut m = Map::new();
    m.insert(DISTRACTOR_TAG.to_string(), Value::Bool(true));
    m.insert("string".to_string(), d.text.clone().into());
    m.insert("pos_x".to_string(), d.pos.x.into());
    m.insert("pos_y".to_string(), d.pos.y.into());
    Value::Object(m)
}

fn decode_distractor(m: &Map<String, Value>) -> LhResult<Distractor> {
    Ok(Distractor::new(
        require_str(m, "string")?,
        Point2::new(require_f64(m, "pos_x")?, require_f64(m, "pos_y")?),
    ))
}

/// Encode the document in the wire field order.
pub fn document_to_value(doc: &Document) -> LhResult<Value> {
    let codec = document_codec();
    let mut m = Map::new();

    m.insert("path".to_string(), doc.path.clone().into());
    m.insert("name".to_string(), doc.name.clone().into());
    m.insert("word".to_string(), doc.word.clone().into());
    m.insert("word_x".to_string(), doc.layout.word_offset.x.into());
    m.insert("word_y".to_string(), doc.layout.word_offset.y.into());
    m.insert("img_x".to_string(), doc.layout.img_offset.x.into());
    m.insert("img_y".to_string(), doc.layout.img_offset.y.into());
    m.insert("font".to_string(), doc.font.clone().into());
    m.insert(
        "distractor_font".to_string(),
        doc.distractor_font.clone().into(),
    );
    m.insert("show_path".to_string(), doc.show_path.into());
    m.insert("close_path".to_string(), doc.exclusion.closed.into());

    let exclusion_path = doc
        .exclusion
        .points()
        .iter()
        .map(|p| codec.encode(p))
        .collect::<LhResult<Vec<_>>>()?;
    m.insert("exclusion_path".to_string(), Value::Array(exclusion_path));

    let distractors = doc
        .distractors
        .iter()
        .map(|d| codec.encode(d))
        .collect::<LhResult<Vec<_>>>()?;
    m.insert("distractors".to_string(), Value::Array(distractors));

    Ok(Value::Object(m))
}

/// Decode a document. Missing fields keep their defaults (the historical
/// format grew over time); malformed values are load errors.
pub fn document_from_value(value: &Value) -> LhResult<Document> {
    decode_document(value).map_err(|e| LetterhuntError::document_load(anyhow::Error::new(e)))
}

fn decode_document(value: &Value) -> LhResult<Document> {
    let codec = document_codec();
    let obj = value
        .as_object()
        .ok_or_else(|| LetterhuntError::validation("document must be a JSON object"))?;

    let mut doc = Document::new();
    doc.set_source_path(field_str(obj, "path")?.unwrap_or_default());
    if let Some(name) = field_str(obj, "name")? {
        doc.name = name;
    }
    doc.word = field_str(obj, "word")?.unwrap_or_default();
    doc.font = field_str(obj, "font")?.unwrap_or_default();
    doc.distractor_font = field_str(obj, "distractor_font")?.unwrap_or_default();

    let word_offset = crate::space::Vec2::new(
        field_f64(obj, "word_x")?.unwrap_or(0.0),
        field_f64(obj, "word_y")?.unwrap_or(0.0),
    );
    let img_offset = crate::space::Vec2::new(
        field_f64(obj, "img_x")?.unwrap_or(0.0),
        field_f64(obj, "img_y")?.unwrap_or(0.0),
    );
    doc.layout = doc
        .layout
        .with_word_offset(word_offset)
        .with_img_offset(img_offset);

    doc.show_path = field_bool(obj, "show_path")?.unwrap_or(false);
    let closed = field_bool(obj, "close_path")?.unwrap_or(false);

    let mut points = Vec::new();
    if let Some(items) = field_array(obj, "exclusion_path")? {
        for item in items {
            let point = codec.revive_as::<Point2>(item)?.ok_or_else(|| {
                LetterhuntError::validation(format!(
                    "exclusion_path element is not tagged {POINT_TAG}"
                ))
            })?;
            points.push(point);
        }
    }
    doc.exclusion = ExclusionBoundary::from_points(points, closed);

    if let Some(items) = field_array(obj, "distractors")? {
        for item in items {
            let distractor = codec.revive_as::<Distractor>(item)?.ok_or_else(|| {
                LetterhuntError::validation(format!(
                    "distractors element is not tagged {DISTRACTOR_TAG}"
                ))
            })?;
            doc.distractors.push(distractor);
        }
    }

    doc.validate()?;
    Ok(doc)
}

pub fn save_document(doc: &Document, path: impl AsRef<Path>) -> LhResult<()> {
    let path = path.as_ref();
    let value = document_to_value(doc)?;
    let bytes = serde_json::to_vec_pretty(&value)
        .with_context(|| "serialize document")
        .map_err(LetterhuntError::Other)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("write document '{}'", path.display()))
        .map_err(LetterhuntError::Other)?;
    Ok(())
}

pub fn load_document(path: impl AsRef<Path>) -> LhResult<Document> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("read document '{}'", path.display()))
        .map_err(LetterhuntError::document_load)?;
    let value: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse document '{}'", path.display()))
        .map_err(LetterhuntError::document_load)?;
    document_from_value(&value)
}

fn field_str(obj: &Map<String, Value>, key: &str) -> LhResult<Option<String>> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(type_mismatch(key, "a string", other)),
    }
}

fn field_f64(obj: &Map<String, Value>, key: &str) -> LhResult<Option<f64>> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| type_mismatch(key, "a finite number", &Value::Number(n.clone()))),
        Some(other) => Err(type_mismatch(key, "a number", other)),
    }
}

fn field_bool(obj: &Map<String, Value>, key: &str) -> LhResult<Option<bool>> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(type_mismatch(key, "a bool", other)),
    }
}

fn field_array<'a>(obj: &'a Map<String, Value>, key: &str) -> LhResult<Option<&'a Vec<Value>>> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(other) => Err(type_mismatch(key, "an array", other)),
    }
}

fn type_mismatch(key: &str, expected: &str, got: &Value) -> LetterhuntError {
    LetterhuntError::validation(format!("field '{key}' must be {expected}, got {got}"))
}

fn require_f64(m: &Map<String, Value>, key: &str) -> LhResult<f64> {
    field_f64(m, key)?
        .ok_or_else(|| LetterhuntError::validation(format!("missing required field '{key}'")))
}

fn require_str(m: &Map<String, Value>, key: &str) -> LhResult<String> {
    field_str(m, key)?
        .ok_or_else(|| LetterhuntError::validation(format!("missing required field '{key}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Vec2;

    fn sample_document() -> Document {
        let mut doc = Document::new();
        doc.set_source_path("photos/elephant.png");
        doc.word = "elephant".to_string();
        doc.font = "Noto Sans Bold 60".to_string();
        doc.distractor_font = "Noto Sans Bold 30".to_string();
        doc.layout = doc
            .layout
            .with_word_offset(Vec2::new(12.0, -8.0))
            .with_img_offset(Vec2::new(620.0, 100.5));
        doc.show_path = true;
        doc.exclusion = ExclusionBoundary::from_points(
            vec![
                Point2::new(1.0, 2.0),
                Point2::new(3.0, 4.0),
                Point2::new(5.0, 6.0),
            ],
            true,
        );
        doc.add_distractor(Distractor::new("e", Point2::new(40.0, 50.0)));
        doc.add_distractor(Distractor::new("ph", Point2::new(60.0, 70.0)));
        doc
    }

    #[test]
    fn document_roundtrips_field_by_field() {
        let doc = sample_document();
        let value = document_to_value(&doc).unwrap();
        let back = document_from_value(&value).unwrap();

        assert_eq!(back.path, doc.path);
        assert_eq!(back.name, doc.name);
        assert_eq!(back.word, doc.word);
        assert_eq!(back.font, doc.font);
        assert_eq!(back.distractor_font, doc.distractor_font);
        assert_eq!(back.layout.word_offset, doc.layout.word_offset);
        assert_eq!(back.layout.img_offset, doc.layout.img_offset);
        assert_eq!(back.show_path, doc.show_path);
        assert_eq!(back.exclusion, doc.exclusion);
        assert_eq!(back.distractors, doc.distractors);
        assert_eq!(back, doc);
    }

    #[test]
    fn wire_format_field_order_and_tags() {
        let value = document_to_value(&sample_document()).unwrap();
        let obj = value.as_object().unwrap();

        let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "path",
                "name",
                "word",
                "word_x",
                "word_y",
                "img_x",
                "img_y",
                "font",
                "distractor_font",
                "show_path",
                "close_path",
                "exclusion_path",
                "distractors",
            ]
        );

        let first_point = &obj["exclusion_path"].as_array().unwrap()[0];
        assert_eq!(first_point[POINT_TAG], Value::Bool(true));
        assert_eq!(first_point["x"], Value::from(1.0));

        let first_distractor = &obj["distractors"].as_array().unwrap()[0];
        assert_eq!(first_distractor[DISTRACTOR_TAG], Value::Bool(true));
        assert_eq!(first_distractor["string"], Value::from("e"));
        assert_eq!(first_distractor["pos_x"], Value::from(40.0));
    }

    #[test]
    fn decode_ignores_field_order_inside_tagged_records() {
        let raw = r#"{
            "distractors": [
                {"pos_y": 7.0, "string": "q", "pos_x": 6.0, "__distractor__": true}
            ],
            "exclusion_path": [
                {"y": 2.0, "__Point2D__": true, "x": 1.0}
            ]
        }"#;
        let value: Value = serde_json::from_str(raw).unwrap();
        let doc = document_from_value(&value).unwrap();
        assert_eq!(doc.distractors[0], Distractor::new("q", Point2::new(6.0, 7.0)));
        assert_eq!(doc.exclusion.points()[0], Point2::new(1.0, 2.0));
    }

    #[test]
    fn missing_fields_decode_to_defaults() {
        let value: Value = serde_json::from_str(r#"{"word": "cat"}"#).unwrap();
        let doc = document_from_value(&value).unwrap();
        assert_eq!(doc.word, "cat");
        assert_eq!(doc.path, "");
        assert!(doc.distractors.is_empty());
        assert!(doc.exclusion.is_empty());
        assert!(!doc.exclusion.closed);
    }

    #[test]
    fn wrong_typed_field_is_a_document_load_error() {
        let value: Value = serde_json::from_str(r#"{"word": 7}"#).unwrap();
        assert!(matches!(
            document_from_value(&value),
            Err(LetterhuntError::DocumentLoad(_))
        ));

        let value: Value =
            serde_json::from_str(r#"{"exclusion_path": [{"x": 1.0, "y": 2.0}]}"#).unwrap();
        assert!(matches!(
            document_from_value(&value),
            Err(LetterhuntError::DocumentLoad(_))
        ));
    }

    #[test]
    fn encode_rejects_unregistered_types() {
        let codec = document_codec();
        let err = codec.encode(&"plain string".to_string()).unwrap_err();
        assert!(matches!(err, LetterhuntError::UnregisteredType(_)));
    }

    #[test]
    fn untagged_mappings_pass_through_revive() {
        let codec = document_codec();
        let value: Value = serde_json::from_str(r#"{"x": 1.0, "y": 2.0}"#).unwrap();
        assert!(codec.revive_as::<Point2>(&value).unwrap().is_none());
        assert!(codec.revive(value.as_object().unwrap()).unwrap().is_none());
    }

    #[test]
    fn tag_key_is_authoritative_for_the_decoder_choice() {
        let codec = document_codec();
        // Looks point-shaped but carries the distractor tag: the tag wins.
        let raw = r#"{"__distractor__": true, "string": "s", "pos_x": 1.0, "pos_y": 2.0, "x": 9.0}"#;
        let value: Value = serde_json::from_str(raw).unwrap();
        let revived = codec.revive_as::<Distractor>(&value).unwrap().unwrap();
        assert_eq!(revived, Distractor::new("s", Point2::new(1.0, 2.0)));
    }

    #[test]
    fn save_and_load_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_DOCUMENT_NAME);

        let doc = sample_document();
        save_document(&doc, &path).unwrap();
        let back = load_document(&path).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn malformed_stream_is_a_document_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"{ not json").unwrap();
        assert!(matches!(
            load_document(&path),
            Err(LetterhuntError::DocumentLoad(_))
        ));
    }
}

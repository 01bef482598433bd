//! # Portfolio Schema Validation
//!
//! Converts an untrusted `serde_json::Value` into [`PortfolioItem`] records.
//!
//! Two top-level shapes are accepted: a bare array of items, or an object
//! carrying the array under `data` (the legacy `{success, message, data}`
//! envelope included; other keys are ignored). Validation is all-or-nothing:
//! one bad element rejects the whole batch, and the error names the path and
//! constraint of every violation found, the first one leading.
//!
//! Coercions are deliberately few: a numeric `id` becomes its decimal string,
//! a missing `featured` becomes `false`, and text fields with length rules are
//! trimmed. Everything else must already have the right type.

use serde_json::{Map, Value};
use url::Url;

use super::model::{NewPortfolioItem, PortfolioItem};
use crate::retrieve::error::{ValidationError, Violation};

const MIN_DESCRIPTION_CHARS: usize = 10;

/// Validates a whole response body.
///
/// # Errors
/// Returns a [`ValidationError`] if the top-level shape is not recognized or
/// if any element violates a field constraint. No items are returned in that
/// case.
pub fn validate_portfolio_items(data: &Value) -> Result<Vec<PortfolioItem>, ValidationError> {
    match data {
        Value::Array(elements) => validate_batch(elements, ""),
        Value::Object(envelope) => match envelope.get("data") {
            Some(Value::Array(elements)) => validate_batch(elements, "data"),
            Some(other) => Err(ValidationError::single(
                "data",
                format!("expected an array, received {}", type_name(other)),
            )),
            None => Err(ValidationError::single(
                "",
                "expected an array of portfolio items or an object with a `data` array",
            )),
        },
        other => Err(ValidationError::single(
            "",
            format!(
                "expected an array of portfolio items or an object with a `data` array, received {}",
                type_name(other)
            ),
        )),
    }
}

/// Validates a single item, e.g. one coming from a form.
pub fn validate_portfolio_item(item: &Value) -> Result<PortfolioItem, ValidationError> {
    let object = as_object(item, "")?;
    read_item(object, "")
}

/// Validates a single item in its creation form, where `id`, `featured` and
/// `liveUrl` may be absent.
pub fn validate_new_portfolio_item(item: &Value) -> Result<NewPortfolioItem, ValidationError> {
    let object = as_object(item, "")?;
    let fields = ItemFields::read(object, "", optional(coerce_id), optional(boolean))?;
    Ok(NewPortfolioItem {
        id: fields.id,
        title: fields.title,
        image_url: fields.image_url,
        description: fields.description,
        video_url: fields.video_url,
        live_url: fields.live_url,
        github_url: fields.github_url,
        technologies: fields.technologies,
        category: fields.category,
        featured: fields.featured,
    })
}

fn validate_batch(elements: &[Value], prefix: &str) -> Result<Vec<PortfolioItem>, ValidationError> {
    let mut items = Vec::with_capacity(elements.len());
    let mut violations = Vec::new();

    for (index, element) in elements.iter().enumerate() {
        let path = format!("{}[{}]", prefix, index);
        let outcome = as_object(element, &path).and_then(|object| read_item(object, &path));
        match outcome {
            Ok(item) => items.push(item),
            Err(err) => violations.extend_from_slice(err.violations()),
        }
    }

    if violations.is_empty() {
        Ok(items)
    } else {
        Err(ValidationError::new(violations))
    }
}

fn read_item(object: &Map<String, Value>, path: &str) -> Result<PortfolioItem, ValidationError> {
    let fields = ItemFields::read(object, path, required(coerce_id), |v| {
        optional(boolean)(v).map(|b| b.unwrap_or(false))
    })?;
    Ok(PortfolioItem {
        id: fields.id,
        title: fields.title,
        image_url: fields.image_url,
        description: fields.description,
        video_url: fields.video_url,
        live_url: fields.live_url,
        github_url: fields.github_url,
        technologies: fields.technologies,
        category: fields.category,
        featured: fields.featured,
    })
}

/// Every schema field, read in schema order. `id` and `featured` differ
/// between the full and the creation schema, so their rules are passed in.
struct ItemFields<I, F> {
    id: I,
    title: String,
    image_url: String,
    description: String,
    video_url: Option<String>,
    live_url: Option<String>,
    github_url: String,
    technologies: Vec<String>,
    category: String,
    featured: F,
}

impl<I, F> ItemFields<I, F> {
    fn read<'a>(
        object: &'a Map<String, Value>,
        path: &'a str,
        id_rule: impl FnOnce(Option<&'a Value>) -> Rule<I>,
        featured_rule: impl FnOnce(Option<&'a Value>) -> Rule<F>,
    ) -> Result<Self, ValidationError> {
        let mut reader = FieldReader::new(object, path);
        let fields = Self::read_all(&mut reader, id_rule, featured_rule);
        let violations = reader.finish();
        match fields {
            Some(fields) if violations.is_empty() => Ok(fields),
            _ => Err(ValidationError::new(violations)),
        }
    }

    fn read_all<'a>(
        reader: &mut FieldReader<'a>,
        id_rule: impl FnOnce(Option<&'a Value>) -> Rule<I>,
        featured_rule: impl FnOnce(Option<&'a Value>) -> Rule<F>,
    ) -> Option<Self> {
        let id = reader.read("id", id_rule);
        let title = reader.read("title", required(|v| trimmed_text(v, 1)));
        let image_url = reader.read("imageUrl", required(url_or_path));
        let description = reader.read(
            "description",
            required(|v| trimmed_text(v, MIN_DESCRIPTION_CHARS)),
        );
        let video_url = reader.read("videoUrl", optional(url_or_path));
        let live_url = reader.read("liveUrl", optional(url_or_empty));
        let github_url = reader.read("githubUrl", required(absolute_url));
        let technologies = reader.read("technologies", required(technologies));
        let category = reader.read("category", required(|v| trimmed_text(v, 1)));
        let featured = reader.read("featured", featured_rule);

        Some(Self {
            id: id?,
            title: title?,
            image_url: image_url?,
            description: description?,
            video_url: video_url?,
            live_url: live_url?,
            github_url: github_url?,
            technologies: technologies?,
            category: category?,
            featured: featured?,
        })
    }
}

/// A rule failure, relative to the field being read.
struct Issue {
    /// Appended to the field path, e.g. `[2]` for an array element.
    suffix: String,
    constraint: String,
}

impl Issue {
    fn here(constraint: impl Into<String>) -> Self {
        Self {
            suffix: String::new(),
            constraint: constraint.into(),
        }
    }

    fn at(suffix: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            constraint: constraint.into(),
        }
    }
}

type Rule<T> = Result<T, Issue>;

/// Reads fields off one object, collecting a violation per failing field.
struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    path: &'a str,
    violations: Vec<Violation>,
}

impl<'a> FieldReader<'a> {
    fn new(object: &'a Map<String, Value>, path: &'a str) -> Self {
        Self {
            object,
            path,
            violations: Vec::new(),
        }
    }

    fn read<T>(&mut self, field: &str, rule: impl FnOnce(Option<&'a Value>) -> Rule<T>) -> Option<T> {
        match rule(self.object.get(field)) {
            Ok(value) => Some(value),
            Err(issue) => {
                let path = if self.path.is_empty() {
                    format!("{}{}", field, issue.suffix)
                } else {
                    format!("{}.{}{}", self.path, field, issue.suffix)
                };
                self.violations.push(Violation::new(path, issue.constraint));
                None
            }
        }
    }

    fn finish(self) -> Vec<Violation> {
        self.violations
    }
}

fn required<'v, T>(rule: impl FnOnce(&'v Value) -> Rule<T>) -> impl FnOnce(Option<&'v Value>) -> Rule<T> {
    move |value| match value {
        Some(value) => rule(value),
        None => Err(Issue::here("is required")),
    }
}

fn optional<'v, T>(
    rule: impl FnOnce(&'v Value) -> Rule<T>,
) -> impl FnOnce(Option<&'v Value>) -> Rule<Option<T>> {
    move |value| match value {
        Some(value) => rule(value).map(Some),
        None => Ok(None),
    }
}

fn as_object<'v>(value: &'v Value, path: &str) -> Result<&'v Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| {
        ValidationError::single(
            path,
            format!("expected an object, received {}", type_name(value)),
        )
    })
}

fn expect_str<'v>(value: &'v Value, expected: &str) -> Rule<&'v str> {
    value
        .as_str()
        .ok_or_else(|| Issue::here(format!("expected {}, received {}", expected, type_name(value))))
}

fn coerce_id(value: &Value) -> Rule<String> {
    let id = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (None, Some(u), _) => u.to_string(),
            // Integral floats render without a fractional part: 1.0 -> "1".
            (None, None, Some(f)) => f.to_string(),
            (None, None, None) => n.to_string(),
        },
        other => {
            return Err(Issue::here(format!(
                "expected a string or number, received {}",
                type_name(other)
            )))
        }
    };
    if id.is_empty() {
        return Err(Issue::here("must not be empty"));
    }
    Ok(id)
}

fn trimmed_text(value: &Value, min_chars: usize) -> Rule<String> {
    let text = expect_str(value, "a string")?.trim();
    let chars = text.chars().count();
    if chars < min_chars {
        return Err(Issue::here(if min_chars == 1 {
            "must not be empty".to_string()
        } else {
            format!(
                "must contain at least {} characters, received {}",
                min_chars, chars
            )
        }));
    }
    Ok(text.to_string())
}

fn url_or_path(value: &Value) -> Rule<String> {
    let text = expect_str(value, "a string")?;
    if text.is_empty() {
        return Err(Issue::here("must be a URL or a non-empty path"));
    }
    Ok(text.to_string())
}

fn absolute_url(value: &Value) -> Rule<String> {
    let text = expect_str(value, "a string")?;
    Url::parse(text)
        .map(|_| text.to_string())
        .map_err(|e| Issue::here(format!("must be a valid URL ({})", e)))
}

fn url_or_empty(value: &Value) -> Rule<String> {
    let text = expect_str(value, "a string")?;
    if text.is_empty() || Url::parse(text).is_ok() {
        Ok(text.to_string())
    } else {
        Err(Issue::here("must be a valid URL or an empty string"))
    }
}

fn boolean(value: &Value) -> Rule<bool> {
    value
        .as_bool()
        .ok_or_else(|| Issue::here(format!("expected a boolean, received {}", type_name(value))))
}

fn technologies(value: &Value) -> Rule<Vec<String>> {
    let elements = value
        .as_array()
        .ok_or_else(|| Issue::here(format!("expected an array, received {}", type_name(value))))?;
    if elements.is_empty() {
        return Err(Issue::here("must contain at least 1 element"));
    }
    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            trimmed_text(element, 1).map_err(|issue| Issue::at(format!("[{}]", index), issue.constraint))
        })
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_item(id: Value) -> Value {
        json!({
            "id": id,
            "title": "Portfolio API",
            "imageUrl": "https://example.com/image.jpg",
            "description": "REST API serving portfolio projects",
            "videoUrl": "https://example.com/video.mp4",
            "liveUrl": "https://example.com",
            "githubUrl": "https://github.com/test/api",
            "technologies": ["Rust", "Axum"],
            "category": "backend",
            "featured": true
        })
    }

    fn first_violation(err: &ValidationError) -> (String, String) {
        let first = err.first().expect("at least one violation");
        (first.path.clone(), first.constraint.clone())
    }

    #[test]
    fn end_to_end_example_item() {
        let payload = json!([{
            "id": 1,
            "title": "X",
            "imageUrl": "http://a/b.png",
            "description": "A long enough description",
            "githubUrl": "http://github.com/x",
            "technologies": ["React"],
            "category": "frontend"
        }]);

        let items = validate_portfolio_items(&payload).unwrap();
        assert_eq!(
            items,
            vec![PortfolioItem {
                id: "1".into(),
                title: "X".into(),
                image_url: "http://a/b.png".into(),
                description: "A long enough description".into(),
                video_url: None,
                live_url: None,
                github_url: "http://github.com/x".into(),
                technologies: vec!["React".into()],
                category: "frontend".into(),
                featured: false,
            }]
        );
    }

    #[test]
    fn bare_array_keeps_order_and_length() {
        let payload = json!([valid_item(json!("a")), valid_item(json!("b")), valid_item(json!("c"))]);
        let items = validate_portfolio_items(&payload).unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert!(items.iter().all(|i| i.featured));
    }

    #[test]
    fn data_envelope_matches_bare_array() {
        let elements = json!([valid_item(json!(1)), valid_item(json!("2"))]);
        let bare = validate_portfolio_items(&elements).unwrap();
        let wrapped = validate_portfolio_items(&json!({ "data": elements })).unwrap();
        let legacy = validate_portfolio_items(&json!({
            "success": true,
            "message": "ok",
            "data": elements
        }))
        .unwrap();
        assert_eq!(bare, wrapped);
        assert_eq!(bare, legacy);
    }

    #[test]
    fn numeric_id_is_coerced_to_string() {
        let item = validate_portfolio_item(&valid_item(json!(42))).unwrap();
        assert_eq!(item.id, "42");
    }

    #[test]
    fn integral_float_ids_drop_the_fraction() {
        for (raw, expected) in [
            (json!(1.0), "1"),
            (json!(1e2), "100"),
            (json!(-7), "-7"),
            (json!(2.5), "2.5"),
            (json!(u64::MAX), "18446744073709551615"),
        ] {
            let item = validate_portfolio_item(&valid_item(raw)).unwrap();
            assert_eq!(item.id, expected);
        }
    }

    #[test]
    fn missing_github_url_rejects_the_whole_batch() {
        let mut broken = valid_item(json!(2));
        broken.as_object_mut().unwrap().remove("githubUrl");
        let payload = json!([valid_item(json!(1)), broken, valid_item(json!(3))]);

        let err = validate_portfolio_items(&payload).unwrap_err();
        assert_eq!(
            first_violation(&err),
            ("[1].githubUrl".to_string(), "is required".to_string())
        );
        assert!(err.to_string().starts_with("[1].githubUrl: is required"));
    }

    #[test]
    fn short_description_is_rejected_with_its_path() {
        let mut broken = valid_item(json!(1));
        broken["description"] = json!("  too short  ");
        let err = validate_portfolio_items(&json!({ "data": [broken] })).unwrap_err();
        let (path, constraint) = first_violation(&err);
        assert_eq!(path, "data[0].description");
        assert!(constraint.contains("at least 10 characters"));
    }

    #[test]
    fn text_fields_are_trimmed() {
        let mut item = valid_item(json!(1));
        item["title"] = json!("  Padded title ");
        item["technologies"] = json!([" Rust "]);
        let item = validate_portfolio_item(&item).unwrap();
        assert_eq!(item.title, "Padded title");
        assert_eq!(item.technologies, vec!["Rust".to_string()]);
    }

    #[test]
    fn whitespace_only_title_is_empty() {
        let mut item = valid_item(json!(1));
        item["title"] = json!("   ");
        let err = validate_portfolio_item(&item).unwrap_err();
        assert_eq!(
            first_violation(&err),
            ("title".to_string(), "must not be empty".to_string())
        );
    }

    #[test]
    fn live_url_accepts_empty_string_but_not_garbage() {
        let mut item = valid_item(json!(1));
        item["liveUrl"] = json!("");
        assert_eq!(
            validate_portfolio_item(&item).unwrap().live_url.as_deref(),
            Some("")
        );

        item["liveUrl"] = json!("not a url");
        let err = validate_portfolio_item(&item).unwrap_err();
        assert_eq!(first_violation(&err).0, "liveUrl");
    }

    #[test]
    fn image_may_be_a_local_path_but_github_must_be_a_url() {
        let mut item = valid_item(json!(1));
        item["imageUrl"] = json!("/assets/images/cover.png");
        item["githubUrl"] = json!("github.com/test/api");
        let err = validate_portfolio_item(&item).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(first_violation(&err).0, "githubUrl");
    }

    #[test]
    fn technologies_need_one_non_empty_entry() {
        let mut item = valid_item(json!(1));
        item["technologies"] = json!([]);
        let err = validate_portfolio_item(&item).unwrap_err();
        assert_eq!(
            first_violation(&err),
            (
                "technologies".to_string(),
                "must contain at least 1 element".to_string()
            )
        );

        item["technologies"] = json!(["Rust", ""]);
        let err = validate_portfolio_item(&item).unwrap_err();
        assert_eq!(first_violation(&err).0, "technologies[1]");
    }

    #[test]
    fn featured_must_be_a_boolean_when_present() {
        let mut item = valid_item(json!(1));
        item["featured"] = json!("yes");
        let err = validate_portfolio_item(&item).unwrap_err();
        assert_eq!(
            first_violation(&err),
            (
                "featured".to_string(),
                "expected a boolean, received string".to_string()
            )
        );
    }

    #[test]
    fn first_violation_follows_schema_order() {
        let mut item = valid_item(json!(1));
        item["title"] = json!("");
        item["featured"] = json!("yes");
        item["liveUrl"] = json!("not a url");

        let err = validate_portfolio_items(&json!([item])).unwrap_err();
        let paths: Vec<&str> = err.violations().iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, ["[0].title", "[0].liveUrl", "[0].featured"]);
        assert!(err.to_string().starts_with("[0].title: must not be empty"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut item = valid_item(json!(1));
        item["stars"] = json!(120);
        assert!(validate_portfolio_item(&item).is_ok());
    }

    #[test]
    fn every_failing_field_is_reported() {
        let payload = json!([{ "id": true, "title": "" }]);
        let err = validate_portfolio_items(&payload).unwrap_err();
        let paths: Vec<&str> = err.violations().iter().map(|v| v.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "[0].id",
                "[0].title",
                "[0].imageUrl",
                "[0].description",
                "[0].githubUrl",
                "[0].technologies",
                "[0].category"
            ]
        );
    }

    #[test]
    fn unrecognized_shapes_are_rejected() {
        for payload in [json!("items"), json!(null), json!({ "items": [] })] {
            let err = validate_portfolio_items(&payload).unwrap_err();
            assert_eq!(first_violation(&err).0, "");
        }

        let err = validate_portfolio_items(&json!({ "data": { "id": 1 } })).unwrap_err();
        assert_eq!(
            first_violation(&err),
            ("data".to_string(), "expected an array, received object".to_string())
        );

        let err = validate_portfolio_items(&json!([1])).unwrap_err();
        assert_eq!(
            first_violation(&err),
            ("[0]".to_string(), "expected an object, received number".to_string())
        );
    }

    #[test]
    fn empty_array_is_a_valid_empty_batch() {
        assert!(validate_portfolio_items(&json!([])).unwrap().is_empty());
        assert!(validate_portfolio_items(&json!({ "data": [] })).unwrap().is_empty());
    }

    #[test]
    fn new_item_may_omit_server_assigned_fields() {
        let mut item = valid_item(json!(1));
        let object = item.as_object_mut().unwrap();
        object.remove("id");
        object.remove("featured");
        object.remove("liveUrl");

        let new_item = validate_new_portfolio_item(&item).unwrap();
        assert_eq!(new_item.id, None);
        assert_eq!(new_item.featured, None);
        assert_eq!(new_item.live_url, None);
        assert_eq!(new_item.title, "Portfolio API");

        assert!(validate_portfolio_item(&item).is_err());
    }
}

use std::collections::HashMap;

use serde_json::Value;

use crate::color::is_hex_color;
use crate::document::MapDocument;

/// Outcome of structural validation.
///
/// Validation never fails early: every problem is accumulated, in document
/// order, so a map author gets the full list in one pass. Shape errors are
/// indexed by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Validation {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validates untyped JSON against the map document schema.
///
/// Documents originate from arbitrary third-party files dropped into a
/// folder; nothing downstream (rendering, path construction) may see one
/// that has not passed this gate. Working on the raw value, rather than the
/// typed model, keeps the accumulate-all-errors contract even when fields
/// carry the wrong JSON type.
pub fn validate_value(raw: &Value) -> Validation {
    let Some(doc) = raw.as_object() else {
        return Validation::from_errors(vec!["document is not a JSON object".to_string()]);
    };

    let mut errors = Vec::new();

    let background = doc.get("backgroundImage").and_then(Value::as_object);
    match background {
        None => errors.push("backgroundImage must be an object".to_string()),
        Some(bg) => {
            match bg.get("file").and_then(Value::as_str) {
                Some(file) if !file.trim().is_empty() => {}
                _ => errors.push("backgroundImage.file must be a non-empty string".to_string()),
            }
            for dim in ["width", "height"] {
                match bg.get(dim).and_then(coerce_number) {
                    Some(n) if n.is_finite() && n > 0.0 => {}
                    _ => errors.push(format!("backgroundImage.{dim} must be a positive number")),
                }
            }
        }
    }

    match doc.get("shapes").and_then(Value::as_array) {
        None => errors.push("shapes must be an array".to_string()),
        Some(shapes) if shapes.is_empty() => {
            errors.push("shapes must not be empty".to_string());
        }
        Some(shapes) => {
            let mut seen_ids: HashMap<&str, usize> = HashMap::new();
            for (index, shape) in shapes.iter().enumerate() {
                validate_shape_value(index, shape, &mut errors);
                if let Some(id) = shape.get("id").and_then(Value::as_str) {
                    check_duplicate_id(index, id, &mut seen_ids, &mut errors);
                }
            }
        }
    }

    if let Some(sound) = doc.get("mapSound") {
        if !sound.is_string() {
            errors.push("mapSound must be a string".to_string());
        }
    }

    Validation::from_errors(errors)
}

fn validate_shape_value(index: usize, shape: &Value, errors: &mut Vec<String>) {
    let Some(obj) = shape.as_object() else {
        errors.push(format!("shapes[{index}] is not an object"));
        return;
    };

    for field in ["id", "path", "script"] {
        match obj.get(field).and_then(Value::as_str) {
            Some(s) if !s.is_empty() => {}
            _ => errors.push(format!("shapes[{index}].{field} must be a non-empty string")),
        }
    }

    match obj.get("color").and_then(Value::as_str) {
        Some(color) if is_hex_color(color) => {}
        Some(_) => errors.push(format!(
            "shapes[{index}].color must be a 3- or 6-digit hex color"
        )),
        None => errors.push(format!("shapes[{index}].color must be a non-empty string")),
    }
}

/// Re-checks an already-typed document. Used by tests and by callers that
/// construct documents programmatically; the loader path goes through
/// [`validate_value`].
pub fn validate(doc: &MapDocument) -> Validation {
    let mut errors = Vec::new();

    if doc.background_image.file.trim().is_empty() {
        errors.push("backgroundImage.file must be a non-empty string".to_string());
    }
    for (dim, value) in [
        ("width", doc.background_image.width),
        ("height", doc.background_image.height),
    ] {
        if !(value.is_finite() && value > 0.0) {
            errors.push(format!("backgroundImage.{dim} must be a positive number"));
        }
    }

    if doc.shapes.is_empty() {
        errors.push("shapes must not be empty".to_string());
    }
    let mut seen_ids: HashMap<&str, usize> = HashMap::new();
    for (index, shape) in doc.shapes.iter().enumerate() {
        check_duplicate_id(index, &shape.id, &mut seen_ids, &mut errors);
        for (field, value) in [
            ("id", &shape.id),
            ("path", &shape.path),
            ("script", &shape.script),
        ] {
            if value.is_empty() {
                errors.push(format!("shapes[{index}].{field} must be a non-empty string"));
            }
        }
        if !is_hex_color(&shape.color) {
            errors.push(format!(
                "shapes[{index}].color must be a 3- or 6-digit hex color"
            ));
        }
    }

    Validation::from_errors(errors)
}

/// Shape ids key the rendered hit-zones, so a duplicate would shadow the
/// earlier zone. Empty ids are reported separately and skipped here.
fn check_duplicate_id<'a>(
    index: usize,
    id: &'a str,
    seen: &mut HashMap<&'a str, usize>,
    errors: &mut Vec<String>,
) {
    if id.is_empty() {
        return;
    }
    if let Some(&first) = seen.get(id) {
        errors.push(format!("shapes[{index}].id duplicates shapes[{first}].id"));
    } else {
        seen.insert(id, index);
    }
}

fn coerce_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

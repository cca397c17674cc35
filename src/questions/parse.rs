use serde_json::Value;

use super::types::Question;

pub const PARSING_FAILED: &str = "Parsing failed";
pub const NO_JSON_FOUND: &str = "No JSON found";

/// Pull the question list out of a model answer.
///
/// Models often wrap JSON in code fences or surround it with prose, so this
/// tries the raw text, then the span between the first `{` and the last `}`
/// with fences removed, then the first balanced object.
pub fn parse_questions(response: &str) -> Result<Vec<Question>, &'static str> {
    let value = extract_object(response)?;
    Ok(questions_from_value(&value))
}

fn extract_object(response: &str) -> Result<Value, &'static str> {
    let trimmed = response.trim();
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    let unfenced = trimmed.replace("```json", "").replace("```", "");
    let (Some(start), Some(end)) = (unfenced.find('{'), unfenced.rfind('}')) else {
        return Err(NO_JSON_FOUND);
    };

    if start < end {
        if let Ok(value) = serde_json::from_str::<Value>(&unfenced[start..=end]) {
            return Ok(value);
        }
    }

    first_balanced_object(&unfenced)
        .and_then(|span| serde_json::from_str::<Value>(span).ok())
        .ok_or(PARSING_FAILED)
}

/// First `{...}` span with balanced braces, ignoring braces inside strings
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + i]);
                }
            }
            _ => {}
        }
    }

    None
}

fn questions_from_value(value: &Value) -> Vec<Question> {
    let Some(items) = value.get("questions").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.as_str()),
            Value::Object(_) => item.get("question").and_then(Value::as_str),
            _ => None,
        })
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(Question::new)
        .collect()
}

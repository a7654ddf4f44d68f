use serde_json::{Map, Value};

/// Turns a webhook body into a JSON value without ever failing.
///
/// JSON bodies are decoded as is. Anything else is read as a urlencoded
/// form, where Mailchimp nests fields with brackets
/// (`data[merges][FNAME]=Ursula`). Bodies that decode as neither are kept
/// as a plain string.
pub fn parse_payload(content_type: Option<&str>, body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Object(Map::new());
    }

    let is_json = content_type
        .map(|content_type| content_type.to_ascii_lowercase().contains("json"))
        .unwrap_or(false);

    let parsed = if is_json {
        serde_json::from_slice(body).ok()
    } else {
        parse_form(body)
    };

    parsed.unwrap_or_else(|| Value::String(String::from_utf8_lossy(body).into_owned()))
}

fn parse_form(body: &[u8]) -> Option<Value> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body).ok()?;
    let mut root = Value::Object(Map::new());
    for (key, value) in pairs {
        insert(&mut root, &key_path(&key), value);
    }
    Some(root)
}

/// `data[merges][FNAME]` -> `["data", "merges", "FNAME"]`
fn key_path(key: &str) -> Vec<String> {
    match key.find('[') {
        Some(start) if start > 0 && key.ends_with(']') => {
            let mut path = vec![key[..start].to_string()];
            path.extend(
                key[start + 1..key.len() - 1]
                    .split("][")
                    .map(str::to_string),
            );
            path
        }
        _ => vec![key.to_string()],
    }
}

fn insert(target: &mut Value, path: &[String], value: String) {
    let (head, rest) = match path.split_first() {
        Some(split) => split,
        None => return,
    };

    // `key[]` appends
    if head.is_empty() {
        if !target.is_array() {
            *target = Value::Array(Vec::new());
        }
        if let Value::Array(items) = target {
            if rest.is_empty() {
                items.push(Value::String(value));
            } else {
                let mut child = Value::Object(Map::new());
                insert(&mut child, rest, value);
                items.push(child);
            }
        }
        return;
    }

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(map) = target {
        if rest.is_empty() {
            map.insert(head.clone(), Value::String(value));
        } else {
            let child = map.entry(head.clone()).or_insert(Value::Null);
            insert(child, rest, value);
        }
    }
}

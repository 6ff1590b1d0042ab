use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutput {
    pub url: Option<String>,
}

// The hosted model does not promise a schema for `output`.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    Null,
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<ModelOutput>),
    Map(Vec<(String, ModelOutput)>),
    File(FileOutput),
    Other(Value),
}

impl From<Value> for ModelOutput {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ModelOutput::Null,
            Value::String(s) if is_file_url(&s) => ModelOutput::File(FileOutput { url: Some(s) }),
            Value::String(s) => ModelOutput::Text(s),
            Value::Array(items) => ModelOutput::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                ModelOutput::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
            other => ModelOutput::Other(other),
        }
    }
}

fn is_file_url(s: &str) -> bool {
    s.starts_with("https://") || s.starts_with("http://") || s.starts_with("data:")
}

/// First non-empty URL in `output`, maps by value and lists by element, in order.
pub fn resolve_output_url(output: &ModelOutput) -> Option<String> {
    match output {
        ModelOutput::Map(entries) => entries.iter().find_map(|(_, v)| resolve_output_url(v)),
        ModelOutput::List(items) => items.iter().find_map(resolve_output_url),
        ModelOutput::Text(s) => non_empty(s.clone()),
        ModelOutput::Bytes(b) => non_empty(String::from_utf8_lossy(b).into_owned()),
        ModelOutput::File(file) => file.url.clone().and_then(non_empty),
        ModelOutput::Null | ModelOutput::Other(_) => None,
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone)]
pub enum Status {
    Success,
    Received,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::Received => write!(f, "received"),
        }
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        value.to_string()
    }
}

#[derive(Debug)]
pub enum Formatter {
    ParsedStr(String),
    Str(String),
}

/// Replaces `$0`, `$1`, ... in `parser` with the matching argument.
pub fn formatter(mut parser: String, args: &[Formatter]) -> String {
    for (index, value) in args.iter().enumerate() {
        let key = format!("${}", index);
        match value {
            Formatter::ParsedStr(s) => {
                let parsed_string = format!(r#""{}""#, s);
                parser = parser.replace(key.as_str(), &parsed_string);
            },
            Formatter::Str(s) => {
                parser = parser.replace(key.as_str(), s);
            },
        }
    }
    parser
}

/// `null`, `false`, `0`, `""`, `[]` and `{}` carry no subscription.
pub fn is_empty_document(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Text form of a reply field: strings verbatim, other scalars as JSON.
pub fn reply_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::from("unknown"),
        Some(Value::String(s)) => s.to_owned(),
        Some(other) => other.to_string(),
    }
}

use serde_json::Value;
use std::io::{self, Read};

/// Read a piped request from stdin, JSON or YAML.
/// Returns None when stdin is a terminal or nothing was piped.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_request(&buffer)
}

fn parse_request(text: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str(trimmed) {
        Ok(value) => Ok(Some(value)),
        Err(json_err) => {
            let value: Value = serde_yaml::from_str(trimmed)
                .map_err(|yaml_err| format!("stdin is neither JSON ({json_err}) nor YAML ({yaml_err})"))?;
            Ok(Some(value))
        }
    }
}

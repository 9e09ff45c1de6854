use serde::Serialize;

use crate::cli::OutputFormat;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::render;
    use crate::cli::OutputFormat;

    #[test]
    fn raw_output_is_single_line() {
        let value = json!({"id": "lsn-1a2b3c4d", "status": "pending"});
        assert_eq!(
            render(&value, OutputFormat::Raw).unwrap(),
            r#"{"id":"lsn-1a2b3c4d","status":"pending"}"#
        );
    }

    #[test]
    fn json_output_is_pretty() {
        let value = json!({"id": "lsn-1a2b3c4d"});
        assert_eq!(
            render(&value, OutputFormat::Json).unwrap(),
            "{\n  \"id\": \"lsn-1a2b3c4d\"\n}"
        );
    }
}

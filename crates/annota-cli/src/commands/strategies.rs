//! `annota strategies`: list the built-in validation strategies.

use std::io::{self, Write};

use annota_engine::builtin_strategies;

use super::run::Format;

pub fn execute(format: Format) -> anyhow::Result<()> {
    let stdout = io::stdout();
    render(&mut stdout.lock(), format)?;
    Ok(())
}

/// Write the strategy names, one per line or as a JSON document
fn render(out: &mut impl Write, format: Format) -> io::Result<()> {
    let names: Vec<String> = builtin_strategies()
        .iter()
        .map(|descriptor| descriptor.name().to_string())
        .collect();

    match format {
        Format::Json => writeln!(out, "{}", serde_json::json!({ "strategies": names })),
        Format::Text => names.iter().try_for_each(|name| writeln!(out, "{}", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_text() {
        let mut out = Vec::new();
        render(&mut out, Format::Text).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "NonEmptyString\nNotBlank\nPositiveNumber\nNonNegativeNumber\n"
        );
    }

    #[test]
    fn test_render_json() {
        let mut out = Vec::new();
        render(&mut out, Format::Json).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(
            json["strategies"],
            serde_json::json!(["NonEmptyString", "NotBlank", "PositiveNumber", "NonNegativeNumber"])
        );
    }
}

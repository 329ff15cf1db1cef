//! Style profile payloads and their normalization.
//!
//! Service output is loosely shaped. Everything is normalized here on the
//! caller side: the name is forced to two words and the palette to at most
//! five `#RRGGBB` entries.

use serde::{Deserialize, Serialize};

use crate::error::StyleError;

/// Prompt sent alongside the reference image.
pub const PROMPT: &str = "Analyze the color grading and visual style of this image. Provide:
  1. A creative style name (MUST be exactly 2 words, e.g., \"Muted Nordic\", \"Neon Cyberpunk\").
  2. A brief 2-sentence description of the color profile (highlights, shadows, saturation).
  3. A list of 5 dominant hex color codes.";

/// Maximum palette entries kept.
pub const PALETTE_LEN: usize = 5;

/// Display-only description of a reference image's look.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProfile {
    /// Exactly two words.
    pub style_name: String,
    pub description: String,
    /// Up to five upper-case `#RRGGBB` colors.
    pub palette: Vec<String>,
}

/// Wire shape before validation; every field may be missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawProfile {
    style_name: Option<String>,
    description: Option<String>,
    palette: Option<Vec<String>>,
}

/// Force a style name to exactly two words.
///
/// Two words are kept as-is (whitespace collapsed); longer names keep their
/// first two words; a single word `W` becomes `W Look`; an empty name
/// becomes `Custom Look`.
pub fn normalize_style_name(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    match words.as_slice() {
        [] => "Custom Look".to_string(),
        [word] => format!("{word} Look"),
        [first, second, ..] => format!("{first} {second}"),
    }
}

/// Normalize one color to `#RRGGBB`, or `None` when it is not a hex triplet.
pub fn normalize_hex_color(color: &str) -> Option<String> {
    let hex = color.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("#{}", hex.to_ascii_uppercase()))
    } else {
        None
    }
}

/// Keep the first five valid colors.
pub fn normalize_palette<S: AsRef<str>>(colors: &[S]) -> Vec<String> {
    colors
        .iter()
        .filter_map(|c| normalize_hex_color(c.as_ref()))
        .take(PALETTE_LEN)
        .collect()
}

/// Decode and normalize a service response body.
///
/// A missing or empty `styleName` is a malformed response; missing
/// description and palette default to empty.
pub fn parse_profile(raw: &str) -> Result<StyleProfile, StyleError> {
    let trimmed = raw.trim();
    let body = if trimmed.is_empty() { "{}" } else { trimmed };
    let parsed: RawProfile = serde_json::from_str(body)?;

    let style_name = parsed
        .style_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| StyleError::MalformedResponse("missing styleName".to_string()))?;

    Ok(StyleProfile {
        style_name: normalize_style_name(&style_name),
        description: parsed.description.unwrap_or_default().trim().to_string(),
        palette: normalize_palette(&parsed.palette.unwrap_or_default()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_name_two_words() {
        assert_eq!(normalize_style_name("Muted Nordic"), "Muted Nordic");
        assert_eq!(normalize_style_name("  Neon \t Cyberpunk "), "Neon Cyberpunk");
        assert_eq!(normalize_style_name("Warm Golden Hour"), "Warm Golden");
        assert_eq!(normalize_style_name("Moody"), "Moody Look");
        assert_eq!(normalize_style_name("   "), "Custom Look");
        assert_eq!(normalize_style_name(""), "Custom Look");
    }

    #[test]
    fn test_palette_normalization() {
        let palette = normalize_palette(&[
            "#1a2b3c", "FFAA00", "not-a-color", "#12345", "#abcdef", "#000000", "#ffffff",
            "#111111",
        ]);
        assert_eq!(
            palette,
            vec!["#1A2B3C", "#FFAA00", "#ABCDEF", "#000000", "#FFFFFF"]
        );
    }

    #[test]
    fn test_parse_profile_normalizes_fields() {
        let raw = r##"{
            "styleName": "Teal and Orange",
            "description": " Cool shadows, warm skin. ",
            "palette": ["#0a3d62", "#e58e26"]
        }"##;
        let profile = parse_profile(raw).unwrap();
        assert_eq!(profile.style_name, "Teal and");
        assert_eq!(profile.description, "Cool shadows, warm skin.");
        assert_eq!(profile.palette, vec!["#0A3D62", "#E58E26"]);
    }

    #[test]
    fn test_parse_profile_rejects_missing_name() {
        assert!(matches!(
            parse_profile(r#"{ "description": "x" }"#),
            Err(StyleError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_profile(""),
            Err(StyleError::MalformedResponse(_))
        ));
        assert!(matches!(parse_profile("not json"), Err(StyleError::Json(_))));
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let profile = StyleProfile {
            style_name: "Muted Nordic".into(),
            description: String::new(),
            palette: vec![],
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"styleName\""));
    }

    #[test]
    fn test_prompt_asks_for_two_words_and_five_colors() {
        assert!(PROMPT.contains("exactly 2 words"));
        assert!(PROMPT.contains("5 dominant hex color codes"));
    }
}

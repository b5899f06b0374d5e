use crate::error::{VidsmithError, VidsmithResult};

pub const MIN_PROMPT_LEN: usize = 3;
pub const MAX_PROMPT_LEN: usize = 500;

const INJECTION_FRAGMENTS: &[&str] = &["<script", "<?php", "javascript:", "data:", "vbscript:"];

/// Validates a raw user prompt and returns the trimmed text.
///
/// Rejected prompts never reach the pipeline: too short/long, purely
/// non-alphanumeric, or containing markup/script fragments.
pub fn validate_prompt(prompt: &str) -> VidsmithResult<&str> {
    let trimmed = prompt.trim();

    // Limits are in characters, not bytes; multibyte prompts count the same.
    let char_count = trimmed.chars().count();
    if char_count < MIN_PROMPT_LEN {
        return Err(VidsmithError::validation(format!(
            "prompt must be at least {MIN_PROMPT_LEN} characters"
        )));
    }
    if char_count > MAX_PROMPT_LEN {
        return Err(VidsmithError::validation(format!(
            "prompt must be at most {MAX_PROMPT_LEN} characters"
        )));
    }
    if !trimmed.chars().any(|c| c.is_alphanumeric()) {
        return Err(VidsmithError::validation(
            "prompt must contain at least one alphanumeric character",
        ));
    }

    let lower = trimmed.to_lowercase();
    for fragment in INJECTION_FRAGMENTS {
        if lower.contains(fragment) {
            return Err(VidsmithError::validation(format!(
                "prompt contains a disallowed fragment '{fragment}'"
            )));
        }
    }

    Ok(trimmed)
}

const QUALITY_TERMS: &[&str] = &[
    "high quality",
    "detailed",
    "professional",
    "8k",
    "masterpiece",
    "best quality",
    "ultra detailed",
    "photorealistic",
];

/// Appends quality hints for remote generators. Keyword dispatch always
/// runs on the raw prompt, never on the enhanced one.
pub fn enhance_prompt(prompt: &str) -> String {
    let trimmed = prompt.trim();
    let lower = trimmed.to_lowercase();
    let has_quality = QUALITY_TERMS.iter().any(|term| lower.contains(term));

    if has_quality || trimmed.chars().count() >= 400 {
        trimmed.to_string()
    } else {
        format!("{trimmed}, high quality, detailed, professional")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_prompts() {
        assert_eq!(validate_prompt("  a cat in space  ").unwrap(), "a cat in space");
    }

    #[test]
    fn rejects_short_and_empty_prompts() {
        assert!(validate_prompt("").is_err());
        assert!(validate_prompt("   ").is_err());
        assert!(validate_prompt("ab").is_err());
    }

    #[test]
    fn rejects_overlong_prompts() {
        let long = "x".repeat(MAX_PROMPT_LEN + 1);
        assert!(validate_prompt(&long).is_err());
    }

    #[test]
    fn length_limits_count_characters_not_bytes() {
        // 300 two-byte characters: 600 bytes, well within the 500-char cap.
        let multibyte = "é".repeat(300);
        assert!(validate_prompt(&multibyte).is_ok());
        // Two characters, four bytes: still below the minimum.
        assert!(validate_prompt("éé").is_err());
    }

    #[test]
    fn enhance_cutoff_counts_characters() {
        let multibyte = "é".repeat(420);
        assert_eq!(enhance_prompt(&multibyte), multibyte);
    }

    #[test]
    fn rejects_non_alphanumeric_prompts() {
        assert!(validate_prompt("!!! ???").is_err());
    }

    #[test]
    fn rejects_markup_fragments() {
        assert!(validate_prompt("hello <script>alert(1)</script>").is_err());
        assert!(validate_prompt("JAVASCRIPT:void(0)").is_err());
    }

    #[test]
    fn enhance_appends_quality_terms_once() {
        let enhanced = enhance_prompt("a red fox");
        assert!(enhanced.ends_with("high quality, detailed, professional"));
        assert_eq!(enhance_prompt(&enhanced), enhanced);
    }

    #[test]
    fn enhance_skips_long_prompts() {
        let long = "y".repeat(420);
        assert_eq!(enhance_prompt(&long), long);
    }
}

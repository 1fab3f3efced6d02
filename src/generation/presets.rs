//! Style presets composed with user prompts for variation generation.

/// Name and prompt modifier, in variation order.
pub const STYLE_PRESETS: &[(&str, &str)] = &[
    ("minimal", "clean, minimal, lots of white space, modern"),
    ("bold", "vibrant, high contrast, bold colors, energetic"),
    ("elegant", "refined, subtle gradients, sophisticated, muted tones"),
    ("organic", "natural textures, earthy tones, handcrafted feel"),
    ("tech", "futuristic, dark mode, neon accents, digital"),
    ("retro", "vintage, film grain, warm tones, nostalgic"),
    ("abstract", "geometric shapes, fluid forms, artistic, non-representational"),
    ("photography", "photorealistic, natural lighting, editorial quality"),
];

/// Default number of variations.
pub const DEFAULT_VARIATIONS: usize = 4;

/// Hard cap on variations per batch.
pub const MAX_VARIATIONS: usize = 4;

pub fn style_preset(name: &str) -> Option<&'static str> {
    STYLE_PRESETS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, text)| *text)
}

/// Prompt for one styled variation.
pub fn styled_prompt(prompt: &str, preset_text: &str) -> String {
    format!("{}. Style: {}", prompt, preset_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_order_and_lookup() {
        let names: Vec<_> = STYLE_PRESETS.iter().take(MAX_VARIATIONS).map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["minimal", "bold", "elegant", "organic"]);
        assert_eq!(style_preset("tech"), Some("futuristic, dark mode, neon accents, digital"));
        assert_eq!(style_preset("vaporwave"), None);
    }

    #[test]
    fn test_styled_prompt() {
        assert_eq!(
            styled_prompt("sunset", "vintage, film grain"),
            "sunset. Style: vintage, film grain"
        );
    }
}

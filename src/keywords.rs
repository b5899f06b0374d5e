//! Ordered keyword dispatch tables.
//!
//! Every table here is an ordered association list scanned top-to-bottom
//! against the lower-cased prompt; the first matching row wins. Row order is
//! part of the contract (it encodes tie-break priority), which is why these
//! are slices and not maps.

/// Base tint picked for procedural backgrounds. First match wins.
pub const COLOR_TABLE: &[(&str, [u8; 3])] = &[
    ("red", [220, 20, 20]),
    ("blue", [20, 20, 220]),
    ("green", [20, 220, 20]),
    ("yellow", [220, 220, 20]),
    ("purple", [139, 92, 246]),
    ("orange", [245, 158, 11]),
    ("pink", [236, 72, 153]),
    ("black", [30, 30, 30]),
    ("white", [245, 245, 245]),
    ("gray", [128, 128, 128]),
    ("brown", [139, 69, 19]),
    ("gold", [255, 215, 0]),
    ("silver", [192, 192, 192]),
];

/// Neutral indigo used when no color keyword matches.
pub const DEFAULT_TINT: [u8; 3] = [99, 102, 241];

pub fn base_tint(prompt: &str) -> [u8; 3] {
    let lower = prompt.to_lowercase();
    COLOR_TABLE
        .iter()
        .find(|(kw, _)| lower.contains(kw))
        .map(|(_, rgb)| *rgb)
        .unwrap_or(DEFAULT_TINT)
}

/// Shape primitive drawn for a detected object keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Cat,
    Dog,
    Tree,
    Sun,
    House,
    Mountain,
    Generic,
}

pub const OBJECT_TABLE: &[(&str, ObjectKind)] = &[
    ("cat", ObjectKind::Cat),
    ("dog", ObjectKind::Dog),
    ("tree", ObjectKind::Tree),
    ("sun", ObjectKind::Sun),
    ("house", ObjectKind::House),
    ("mountain", ObjectKind::Mountain),
    ("flower", ObjectKind::Generic),
    ("car", ObjectKind::Generic),
    ("moon", ObjectKind::Generic),
    ("star", ObjectKind::Generic),
    ("ocean", ObjectKind::Generic),
    ("forest", ObjectKind::Generic),
    ("city", ObjectKind::Generic),
    ("person", ObjectKind::Generic),
    ("bird", ObjectKind::Generic),
    ("fish", ObjectKind::Generic),
];

/// Collects every matching object in table order (not first-match-only):
/// "a cat under a tree" draws both.
pub fn detect_objects(prompt: &str) -> Vec<ObjectKind> {
    let lower = prompt.to_lowercase();
    OBJECT_TABLE
        .iter()
        .filter(|(kw, _)| lower.contains(kw))
        .map(|(_, kind)| *kind)
        .collect()
}

/// Coarse action classification used by the stage planner, the blender's
/// pre-processing and the single-image motion simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ActionCategory {
    Cutting,
    Walking,
    Jumping,
    Dancing,
    Fighting,
    Eating,
    Waving,
    Other,
}

pub const ACTION_TABLE: &[(&str, ActionCategory)] = &[
    ("cutting", ActionCategory::Cutting),
    ("chopping", ActionCategory::Cutting),
    ("slicing", ActionCategory::Cutting),
    ("swinging", ActionCategory::Cutting),
    ("walking", ActionCategory::Walking),
    ("running", ActionCategory::Walking),
    ("jumping", ActionCategory::Jumping),
    ("leaping", ActionCategory::Jumping),
    ("dancing", ActionCategory::Dancing),
    ("flowing", ActionCategory::Dancing),
    ("fighting", ActionCategory::Fighting),
    ("punching", ActionCategory::Fighting),
    ("eating", ActionCategory::Eating),
    ("waving", ActionCategory::Waving),
];

pub fn detect_action(prompt: &str) -> ActionCategory {
    let lower = prompt.to_lowercase();
    ACTION_TABLE
        .iter()
        .find(|(kw, _)| lower.contains(kw))
        .map(|(_, cat)| *cat)
        .unwrap_or(ActionCategory::Other)
}

/// Per-run mood effect, selected once per run from the ordered table below.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Mood {
    Fire,
    Water,
    Motion,
    Glow,
    Night,
    Portrait,
    Breathing,
}

pub const MOOD_TABLE: &[(&str, Mood)] = &[
    ("fire", Mood::Fire),
    ("flame", Mood::Fire),
    ("burning", Mood::Fire),
    ("dragon", Mood::Fire),
    ("water", Mood::Water),
    ("ocean", Mood::Water),
    ("wave", Mood::Water),
    ("rain", Mood::Water),
    ("sea", Mood::Water),
    ("snow", Mood::Water),
    ("wind", Mood::Motion),
    ("flying", Mood::Motion),
    ("moving", Mood::Motion),
    ("floating", Mood::Motion),
    ("car", Mood::Motion),
    ("running", Mood::Motion),
    ("magic", Mood::Glow),
    ("spell", Mood::Glow),
    ("glow", Mood::Glow),
    ("energy", Mood::Glow),
    ("fantasy", Mood::Glow),
    ("warrior", Mood::Glow),
    ("armor", Mood::Glow),
    ("sword", Mood::Glow),
    ("night", Mood::Night),
    ("dark", Mood::Night),
    ("moon", Mood::Night),
    ("stars", Mood::Night),
    ("city", Mood::Night),
    ("portrait", Mood::Portrait),
    ("face", Mood::Portrait),
    ("person", Mood::Portrait),
    ("girl", Mood::Portrait),
    ("boy", Mood::Portrait),
    ("man", Mood::Portrait),
    ("woman", Mood::Portrait),
];

pub fn detect_mood(prompt: &str) -> Mood {
    let lower = prompt.to_lowercase();
    MOOD_TABLE
        .iter()
        .find(|(kw, _)| lower.contains(kw))
        .map(|(_, mood)| *mood)
        .unwrap_or(Mood::Breathing)
}

/// Hook phrase category for the opening text overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookCategory {
    Animal,
    Scenic,
    Action,
    Cooking,
    Default,
}

pub const HOOK_TABLE: &[(&str, HookCategory)] = &[
    ("cat", HookCategory::Animal),
    ("dog", HookCategory::Animal),
    ("animal", HookCategory::Animal),
    ("pet", HookCategory::Animal),
    ("puppy", HookCategory::Animal),
    ("kitten", HookCategory::Animal),
    ("nature", HookCategory::Scenic),
    ("mountain", HookCategory::Scenic),
    ("ocean", HookCategory::Scenic),
    ("sunset", HookCategory::Scenic),
    ("beautiful", HookCategory::Scenic),
    ("stunning", HookCategory::Scenic),
    ("action", HookCategory::Action),
    ("fast", HookCategory::Action),
    ("speed", HookCategory::Action),
    ("racing", HookCategory::Action),
    ("fighting", HookCategory::Action),
    ("cooking", HookCategory::Cooking),
    ("food", HookCategory::Cooking),
    ("recipe", HookCategory::Cooking),
    ("baking", HookCategory::Cooking),
];

pub fn detect_hook_category(prompt: &str) -> HookCategory {
    let lower = prompt.to_lowercase();
    HOOK_TABLE
        .iter()
        .find(|(kw, _)| lower.contains(kw))
        .map(|(_, cat)| *cat)
        .unwrap_or(HookCategory::Default)
}

pub fn hook_phrases(category: HookCategory) -> &'static [&'static str] {
    match category {
        HookCategory::Animal => &[
            "This is too cute!",
            "Watch this amazing animal!",
            "You won't believe this!",
        ],
        HookCategory::Scenic => &[
            "This is breathtaking!",
            "Watch this incredible view!",
            "Amazing transformation!",
        ],
        HookCategory::Action => &[
            "Watch this incredible move!",
            "This is insane!",
            "Speed like never before!",
        ],
        HookCategory::Cooking => &[
            "Wait for the reveal!",
            "You need to try this!",
            "The tastiest thing today!",
        ],
        HookCategory::Default => &[
            "This is amazing!",
            "Watch this!",
            "Incredible AI creation!",
        ],
    }
}

/// Closing call-to-action, fixed for every run.
pub const CALL_TO_ACTION: &str = "Follow for more AI magic!";

/// Overlay text color by mood keyword. First match wins; default white.
pub const TEXT_COLOR_TABLE: &[(&str, [u8; 3])] = &[
    ("fire", [255, 214, 120]),
    ("sunset", [255, 200, 120]),
    ("golden", [255, 220, 140]),
    ("water", [170, 225, 255]),
    ("ocean", [170, 225, 255]),
    ("night", [220, 220, 245]),
    ("dark", [220, 220, 245]),
];

pub fn overlay_text_color(prompt: &str) -> [u8; 3] {
    let lower = prompt.to_lowercase();
    TEXT_COLOR_TABLE
        .iter()
        .find(|(kw, _)| lower.contains(kw))
        .map(|(_, rgb)| *rgb)
        .unwrap_or([255, 255, 255])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_row_wins() {
        // "wave" (water) precedes "running" (motion) in the mood table.
        assert_eq!(detect_mood("a runner waving at the wave pool"), Mood::Water);
    }

    #[test]
    fn cat_in_fire_selects_fire_mood_but_animal_hook() {
        let prompt = "a cat playing in a fire";
        assert_eq!(detect_mood(prompt), Mood::Fire);
        assert_eq!(detect_hook_category(prompt), HookCategory::Animal);
    }

    #[test]
    fn default_rows_apply_without_matches() {
        assert_eq!(detect_mood("an empty field"), Mood::Breathing);
        assert_eq!(detect_action("an empty field"), ActionCategory::Other);
        assert_eq!(detect_hook_category("an empty field"), HookCategory::Default);
        assert_eq!(base_tint("an empty field"), DEFAULT_TINT);
        assert_eq!(overlay_text_color("an empty field"), [255, 255, 255]);
    }

    #[test]
    fn objects_collect_in_table_order() {
        let objs = detect_objects("a tree beside a cat");
        assert_eq!(objs, vec![ObjectKind::Cat, ObjectKind::Tree]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(detect_mood("DRAGON Rider"), Mood::Fire);
        assert_eq!(base_tint("Deep RED sky"), [220, 20, 20]);
    }
}

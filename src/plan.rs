//! Action-sequence planning: expands one prompt into ordered stage prompts
//! describing the temporal arc of the implied action.

use crate::keywords::{detect_action, ActionCategory};

/// Stage clauses per action category. Every category yields a sequence, so
/// downstream interpolation always has a temporal arc to request key images
/// against; the default arc is generic beginning/mid/peak/completion.
pub fn stage_clauses(action: ActionCategory) -> &'static [&'static str] {
    match action {
        ActionCategory::Cutting => &[
            "raising the blade for the swing",
            "the blade striking through",
            "following through after impact",
        ],
        ActionCategory::Walking => &[
            "starting to step forward",
            "mid stride",
            "arms swinging through the stride",
            "completing the stride",
        ],
        ActionCategory::Jumping => &[
            "crouching before the jump",
            "leaping upward",
            "at the peak of the jump",
            "landing",
        ],
        ActionCategory::Dancing => &[
            "starting the dance move",
            "flowing through the motion",
            "at the most expressive point",
            "finishing the move",
        ],
        ActionCategory::Fighting => &[
            "squaring up",
            "throwing the strike",
            "the strike connecting",
            "recovering stance",
        ],
        ActionCategory::Eating => &[
            "reaching for the food",
            "taking a bite",
            "chewing happily",
            "finishing the bite",
        ],
        ActionCategory::Waving => &[
            "raising a hand",
            "the hand sweeping across",
            "the hand at its far side",
            "lowering the hand",
        ],
        ActionCategory::Other => &[
            "beginning the action",
            "midway through the action",
            "at the peak of the action",
            "completing the action",
        ],
    }
}

/// Ordered stage prompts for the prompt's detected action: the original
/// prompt with a stage clause appended.
pub fn plan_stages(prompt: &str) -> Vec<String> {
    let action = detect_action(prompt);
    stage_clauses(action)
        .iter()
        .map(|clause| format!("{prompt}, {clause}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutting_has_three_stages() {
        let stages = plan_stages("a chef chopping onions");
        assert_eq!(stages.len(), 3);
        assert!(stages[0].starts_with("a chef chopping onions, "));
    }

    #[test]
    fn unmatched_prompts_get_generic_four_stage_arc() {
        let stages = plan_stages("a quiet library");
        assert_eq!(stages.len(), 4);
        assert!(stages[3].ends_with("completing the action"));
    }

    #[test]
    fn stage_order_follows_the_arc() {
        let stages = plan_stages("a frog jumping over a log");
        assert!(stages[0].contains("crouching"));
        assert!(stages[2].contains("peak"));
        assert!(stages[3].contains("landing"));
    }
}

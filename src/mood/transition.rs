use super::table::Mood;

/// Intensity committed by the apology fast-recovery rule.
pub const FAST_RECOVERY_INTENSITY: u8 = 6;

/// Which rule produced a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TransitionRule {
    FastRecovery,
    Stable,
    DirectNeighbor,
    Step,
    FirstNeighbor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodTransition {
    pub mood: Mood,
    pub intensity: u8,
    pub rule: TransitionRule,
}

/// Compute the next mood, moving at most one graph edge per turn.
///
/// Only the apology fast-recovery rule can skip the graph.
pub fn next_mood(current: Mood, desired: Mood) -> MoodTransition {
    if desired == Mood::Apologetic && matches!(current, Mood::Annoyed | Mood::Angry) {
        return MoodTransition {
            mood: Mood::Friendly,
            intensity: FAST_RECOVERY_INTENSITY,
            rule: TransitionRule::FastRecovery,
        };
    }

    let current_canonical = current.canonical_intensity();
    let desired_canonical = desired.canonical_intensity();

    if current == desired || current_canonical.abs_diff(desired_canonical) <= 1 {
        return MoodTransition {
            mood: current,
            intensity: current_canonical,
            rule: TransitionRule::Stable,
        };
    }

    let neighbors = Mood::neighbors_for_label(current.as_str());

    if neighbors.contains(&desired) {
        return MoodTransition {
            mood: desired,
            intensity: desired_canonical,
            rule: TransitionRule::DirectNeighbor,
        };
    }

    let current_distance = current_canonical.abs_diff(desired_canonical);
    let (step, rule) = neighbors
        .iter()
        .find(|n| n.canonical_intensity().abs_diff(desired_canonical) < current_distance)
        .map_or_else(
            || (neighbors[0], TransitionRule::FirstNeighbor),
            |n| (*n, TransitionRule::Step),
        );

    MoodTransition {
        mood: step,
        intensity: step.canonical_intensity(),
        rule,
    }
}

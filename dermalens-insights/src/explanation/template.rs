//! Template fallback explanations
//!
//! Rule-based text built only from a recommendation's matching ingredients
//! and concerns. No model, no network; always returns non-empty text.

use crate::scorer::Recommendation;

/// Join labels as "a", "a and b", "a, b and c"
pub(crate) fn join_labels(labels: &[String]) -> String {
    match labels {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn product_name(recommendation: &Recommendation) -> &str {
    let name = recommendation.item.name.trim();
    if name.is_empty() {
        "This product"
    } else {
        name
    }
}

/// Render the deterministic explanation for `recommendation`
pub fn render(recommendation: &Recommendation) -> String {
    let name = product_name(recommendation);
    let ingredients: Vec<String> = recommendation
        .matching_ingredients
        .iter()
        .map(|i| i.label())
        .collect();
    let concerns: Vec<String> = recommendation
        .matching_concerns
        .iter()
        .map(|c| c.label().to_string())
        .collect();

    let body = match (ingredients.is_empty(), concerns.is_empty()) {
        (false, false) => format!(
            "{} targets your {} and contains {}, which are known to help with these concerns.",
            name,
            join_labels(&concerns),
            join_labels(&ingredients)
        ),
        (false, true) => format!(
            "{} contains {}, known to benefit your current skin profile.",
            name,
            join_labels(&ingredients)
        ),
        (true, false) => format!(
            "{} is formulated to target your {}.",
            name,
            join_labels(&concerns)
        ),
        (true, true) => format!(
            "{} is a general fit for your skin type and routine.",
            name
        ),
    };

    format!("{} Match score: {}/100.", body, recommendation.score)
}

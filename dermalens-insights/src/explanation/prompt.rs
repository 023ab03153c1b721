//! Prompt construction for the text generator

use crate::explanation::template::join_labels;
use crate::scorer::Recommendation;
use dermalens_common::Assessment;

/// Build the generation prompt for one recommended item
pub fn build_prompt(assessment: &Assessment, recommendation: &Recommendation) -> String {
    let mut lines = vec![
        "Explain in two sentences why this skincare product suits the user.".to_string(),
        format!(
            "Skin type: {} (confidence {:.0}%)",
            assessment.skin_type.value(),
            assessment.skin_type_confidence * 100.0
        ),
    ];

    let primary = assessment.primary_concerns();
    if primary.is_empty() {
        lines.push("Primary concerns: none".to_string());
    } else {
        let described: Vec<String> = primary
            .iter()
            .map(|(concern, severity)| format!("{} {:.0}%", concern.label(), severity * 100.0))
            .collect();
        lines.push(format!("Primary concerns: {}", described.join(", ")));
    }
    if let Some(&(worst, _)) = primary.first() {
        if let Some((zone, _)) = assessment.dominant_zone(worst) {
            lines.push(format!("Most affected area: {} ({})", zone.label(), worst.label()));
        }
    }

    let item = &recommendation.item;
    lines.push(format!(
        "Product: {} ({})",
        item.name,
        item.category.as_str().to_lowercase()
    ));
    let ingredients: Vec<String> = recommendation
        .matching_ingredients
        .iter()
        .map(|i| i.label())
        .collect();
    if !ingredients.is_empty() {
        lines.push(format!("Helpful ingredients: {}", join_labels(&ingredients)));
    }
    let concerns: Vec<String> = recommendation
        .matching_concerns
        .iter()
        .map(|c| c.label().to_string())
        .collect();
    if !concerns.is_empty() {
        lines.push(format!("Targets: {}", join_labels(&concerns)));
    }
    lines.push(format!("Match score: {}/100", recommendation.score));
    lines.join("\n")
}

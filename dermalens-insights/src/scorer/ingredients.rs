//! Concern → beneficial ingredient lookup table
//!
//! Effectiveness weights are 0.0-1.0. An ingredient that helps several active
//! concerns counts once, at its highest weight.

use dermalens_common::{ConcernKind, IngredientId};
use std::collections::BTreeMap;

const ACNE: &[(&str, f64)] = &[
    ("SALICYLIC_ACID", 0.9),
    ("BENZOYL_PEROXIDE", 0.85),
    ("RETINOL", 0.75),
    ("NIACINAMIDE", 0.7),
    ("TEA_TREE_OIL", 0.6),
];

const DRYNESS: &[(&str, f64)] = &[
    ("HYALURONIC_ACID", 0.9),
    ("CERAMIDES", 0.85),
    ("GLYCERIN", 0.8),
    ("SQUALANE", 0.7),
    ("SHEA_BUTTER", 0.6),
];

const OILINESS: &[(&str, f64)] = &[
    ("NIACINAMIDE", 0.85),
    ("SALICYLIC_ACID", 0.8),
    ("ZINC", 0.7),
    ("CLAY", 0.65),
];

const HYPERPIGMENTATION: &[(&str, f64)] = &[
    ("VITAMIN_C", 0.9),
    ("ALPHA_ARBUTIN", 0.85),
    ("NIACINAMIDE", 0.8),
    ("AZELAIC_ACID", 0.8),
    ("KOJIC_ACID", 0.7),
];

const REDNESS: &[(&str, f64)] = &[
    ("CENTELLA_ASIATICA", 0.85),
    ("AZELAIC_ACID", 0.8),
    ("NIACINAMIDE", 0.7),
    ("ALOE_VERA", 0.6),
    ("ALLANTOIN", 0.6),
];

/// Ingredients known to help `concern`, with effectiveness weights
pub fn beneficial_ingredients(concern: ConcernKind) -> &'static [(&'static str, f64)] {
    match concern {
        ConcernKind::Acne => ACNE,
        ConcernKind::Dryness => DRYNESS,
        ConcernKind::Oiliness => OILINESS,
        ConcernKind::Hyperpigmentation => HYPERPIGMENTATION,
        ConcernKind::Redness => REDNESS,
    }
}

/// Union of beneficial ingredients for `concerns`, keeping the max weight
pub fn benefit_set(concerns: &[ConcernKind]) -> BTreeMap<IngredientId, f64> {
    let mut set = BTreeMap::new();
    for &concern in concerns {
        for &(name, weight) in beneficial_ingredients(concern) {
            let entry = set.entry(IngredientId::new(name)).or_insert(weight);
            if weight > *entry {
                *entry = weight;
            }
        }
    }
    set
}

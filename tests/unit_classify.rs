// Unit tests for the decision engine's pure functions.
//
// Category matching, severity rules, the merge rules and the score
// combiner, checked against the behavior callers rely on. No models.

use triage::classify::category::CATEGORY_KEYWORDS;
use triage::classify::modality::{image_verdict, ranked_image_verdict, text_verdict};
use triage::classify::severity::{HIGH_KEYWORDS, MEDIUM_KEYWORDS};
use triage::classify::{
    assess_severity, combine, match_category, merge_verdicts, Category, ClassificationSignal,
    CombinedSeverity, ModalityVerdict, Severity,
};
use triage::models::traits::LabelScore;

fn verdict(severity: Severity, category: Category) -> ModalityVerdict {
    ModalityVerdict {
        severity,
        category,
        label: "x".to_string(),
        score: 0.5,
    }
}

// ============================================================
// Category matching
// ============================================================

#[test]
fn flood_warning_is_water_not_sanitation() {
    assert_eq!(match_category("flood warning issued"), Category::Water);
}

#[test]
fn unmatched_text_is_other() {
    assert_eq!(match_category("random text"), Category::Other);
}

#[test]
fn empty_text_is_other() {
    assert_eq!(match_category(""), Category::Other);
}

#[test]
fn every_keyword_maps_to_its_first_declaring_category() {
    for (category, keywords) in CATEGORY_KEYWORDS.iter() {
        for keyword in keywords.iter() {
            let first = CATEGORY_KEYWORDS
                .iter()
                .find(|(_, kws)| kws.iter().any(|k| keyword.contains(k)))
                .map(|(c, _)| *c)
                .unwrap();
            assert_eq!(
                match_category(keyword),
                first,
                "{keyword} (declared under {category})"
            );
        }
    }
}

#[test]
fn table_order_is_fixed() {
    let order: Vec<Category> = CATEGORY_KEYWORDS.iter().map(|(c, _)| *c).collect();
    assert_eq!(
        order,
        vec![
            Category::Road,
            Category::Water,
            Category::Electricity,
            Category::Sanitation,
            Category::Nature,
            Category::Other,
        ]
    );
}

// ============================================================
// Severity rules
// ============================================================

#[test]
fn flood_is_high_for_any_model_output() {
    for (label, score) in [("NEGATIVE", 0.0), ("NEGATIVE", 1.0), ("POSITIVE", 0.99)] {
        assert_eq!(
            assess_severity("the flood reached our street", label, score),
            Severity::High
        );
    }
}

#[test]
fn streetlight_without_high_keyword_is_medium() {
    assert_eq!(
        assess_severity("streetlight flickering", "NEGATIVE", 0.99),
        Severity::Medium
    );
}

#[test]
fn confidence_fallback_matches_expected_tiers() {
    assert_eq!(assess_severity("bad", "NEGATIVE", 0.9), Severity::High);
    assert_eq!(assess_severity("bad", "NEGATIVE", 0.5), Severity::Low);
    assert_eq!(assess_severity("bad", "POSITIVE", 0.9), Severity::Low);
}

#[test]
fn every_high_keyword_forces_high() {
    for keyword in HIGH_KEYWORDS {
        assert_eq!(assess_severity(keyword, "POSITIVE", 0.0), Severity::High, "{keyword}");
    }
}

#[test]
fn every_medium_keyword_forces_medium() {
    for keyword in MEDIUM_KEYWORDS {
        assert_eq!(
            assess_severity(keyword, "POSITIVE", 0.0),
            Severity::Medium,
            "{keyword}"
        );
    }
}

#[test]
fn severity_serializes_lowercase() {
    let json = serde_json::to_string(&[Severity::Low, Severity::Medium, Severity::High]).unwrap();
    assert_eq!(json, r#"["low","medium","high"]"#);
}

// ============================================================
// Single-modality verdicts
// ============================================================

#[test]
fn text_verdict_combines_category_and_severity() {
    let verdict = text_verdict(
        "Garbage collection missed again",
        &ClassificationSignal::text("NEGATIVE", 0.97),
    );
    assert_eq!(verdict.category, Category::Sanitation);
    assert_eq!(verdict.severity, Severity::Medium);
}

#[test]
fn image_verdict_runs_keywords_on_label() {
    let verdict = image_verdict(&ClassificationSignal::image("plant pot", 0.4));
    assert_eq!(verdict.category, Category::Nature);
    assert_eq!(verdict.severity, Severity::Low);
}

#[test]
fn empty_image_labels_give_default_verdict() {
    let verdict = ranked_image_verdict(&[]);
    assert_eq!(verdict.severity, Severity::Low);
    assert_eq!(verdict.category, Category::Other);
    assert_eq!(verdict.label, "Unknown");
    assert_eq!(verdict.score, 0.0);
}

#[test]
fn ranked_verdict_ignores_lower_labels() {
    let ranked = vec![
        LabelScore::new("tabby, tabby cat", 0.5),
        LabelScore::new("fire screen", 0.4),
    ];
    let verdict = ranked_image_verdict(&ranked);
    assert_eq!(verdict.severity, Severity::Low);
}

// ============================================================
// Merge rules
// ============================================================

#[test]
fn image_other_keeps_text_category() {
    let merged = merge_verdicts(
        Some(&verdict(Severity::Low, Category::Water)),
        Some(&verdict(Severity::Low, Category::Other)),
    )
    .unwrap();
    assert_eq!(merged.category, Category::Water);
}

#[test]
fn image_category_wins_when_not_other() {
    let merged = merge_verdicts(
        Some(&verdict(Severity::Low, Category::Water)),
        Some(&verdict(Severity::Low, Category::Road)),
    )
    .unwrap();
    assert_eq!(merged.category, Category::Road);
}

#[test]
fn merged_severity_is_max() {
    let low_then_high = merge_verdicts(
        Some(&verdict(Severity::Low, Category::Other)),
        Some(&verdict(Severity::High, Category::Other)),
    )
    .unwrap();
    assert_eq!(low_then_high.severity, Severity::High);

    let high_then_low = merge_verdicts(
        Some(&verdict(Severity::High, Category::Other)),
        Some(&verdict(Severity::Low, Category::Other)),
    )
    .unwrap();
    assert_eq!(high_then_low.severity, Severity::High);
}

#[test]
fn merge_without_inputs_is_invalid() {
    let err = merge_verdicts(None, None).unwrap_err();
    assert!(err.is_invalid_input());
}

// ============================================================
// Score combiner
// ============================================================

#[test]
fn combiner_high_pair() {
    let result = combine(
        &ClassificationSignal::text("NEGATIVE", 0.8),
        &ClassificationSignal::image("pothole", 0.9),
    );
    assert_eq!(result.combined_score, 0.85);
    assert_eq!(result.severity, CombinedSeverity::High);
}

#[test]
fn combiner_zero_pair() {
    let result = combine(
        &ClassificationSignal::text("NEGATIVE", 0.0),
        &ClassificationSignal::image("Unknown", 0.0),
    );
    assert_eq!(result.combined_score, 0.0);
    assert_eq!(result.severity, CombinedSeverity::Low);
}

#[test]
fn combiner_ignores_keywords() {
    // "flood" would be high in the keyword engine; here only scores count
    let result = combine(
        &ClassificationSignal::text("flood", 0.1),
        &ClassificationSignal::image("flood", 0.1),
    );
    assert_eq!(result.severity, CombinedSeverity::Low);
}

//! Golden tests for the risk classifier.
//!
//! Each case lists report values and the expected condition/level pairs.

use bloodwise_core::classify;
use bloodwise_core::models::{ExtractedValue, RiskLevel, ValueMap};

/// Test case from golden file.
struct GoldenCase {
    id: &'static str,
    values: &'static [(&'static str, &'static str)],
    expected: &'static [(&'static str, RiskLevel)],
}

fn value_map(values: &[(&str, &str)]) -> ValueMap {
    values
        .iter()
        .map(|(k, v)| (k.to_string(), ExtractedValue::new(*v)))
        .collect()
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "empty-report",
            values: &[],
            expected: &[
                ("Vitamin B12 Deficiency and Anemia", RiskLevel::High),
                ("Hypothyroidism", RiskLevel::High),
                ("Chronic Kidney Disease (CKD)", RiskLevel::Low),
                ("Gout", RiskLevel::Low),
                ("Immune Deficiency", RiskLevel::High),
                ("Cardiovascular Disease", RiskLevel::Low),
            ],
        },
        GoldenCase {
            id: "kidney-only",
            values: &[("CREATININE", "1.5"), ("BLOOD UREA NITROGEN", "25")],
            expected: &[("Chronic Kidney Disease (CKD)", RiskLevel::High)],
        },
        GoldenCase {
            id: "healthy-adult",
            values: &[
                ("vitamin b12", "520"),
                ("SODIUM", "139"),
                ("RBC COUNT", "5.1"),
                ("PLATELET COUNT", "260000"),
                ("CALCIUM", "9.5"),
                ("CHLORIDE", "101"),
                ("URIC ACID", "5.0"),
                ("CREATININE", "0.9"),
                ("BLOOD UREA NITROGEN", "13"),
                ("THYROXINE", "8.1"),
                ("TOTAL CHOLESTEROL", "172"),
                ("NEUTROPHILS", "3900"),
            ],
            expected: &[
                ("Vitamin B12 Deficiency and Anemia", RiskLevel::Low),
                ("Thyroid Dysfunction", RiskLevel::Low),
                ("Chronic Kidney Disease (CKD)", RiskLevel::Low),
                ("Gout", RiskLevel::Low),
                ("Infection/Immune Status", RiskLevel::Normal),
                ("Cardiovascular Disease", RiskLevel::Low),
            ],
        },
        GoldenCase {
            id: "hyperthyroid-infection",
            values: &[("THYROXINE", "12.6"), ("NEUTROPHILS", "9100")],
            expected: &[
                ("Hyperthyroidism", RiskLevel::High),
                ("Infection", RiskLevel::High),
            ],
        },
        GoldenCase {
            id: "thyroxine-lower-boundary",
            values: &[("THYROXINE", "4.5")],
            expected: &[("Thyroid Dysfunction", RiskLevel::Low)],
        },
        GoldenCase {
            id: "thyroxine-upper-boundary",
            values: &[("THYROXINE", "11.2")],
            expected: &[("Thyroid Dysfunction", RiskLevel::Low)],
        },
        GoldenCase {
            id: "cholesterol-200",
            values: &[("TOTAL CHOLESTEROL", "200")],
            expected: &[("Cardiovascular Disease", RiskLevel::Low)],
        },
        GoldenCase {
            id: "cholesterol-200.01",
            values: &[("TOTAL CHOLESTEROL", "200.01")],
            expected: &[("Cardiovascular Disease", RiskLevel::Moderate)],
        },
        GoldenCase {
            id: "cholesterol-240",
            values: &[("TOTAL CHOLESTEROL", "240")],
            expected: &[("Cardiovascular Disease", RiskLevel::Moderate)],
        },
        GoldenCase {
            id: "cholesterol-240.01",
            values: &[("TOTAL CHOLESTEROL", "240.01")],
            expected: &[("Cardiovascular Disease", RiskLevel::High)],
        },
        GoldenCase {
            id: "anemia-low-platelets",
            values: &[
                ("vitamin b12", "310"),
                ("RBC COUNT", "4.6"),
                ("PLATELET COUNT", "98000"),
            ],
            expected: &[("Vitamin B12 Deficiency and Anemia", RiskLevel::Moderate)],
        },
        GoldenCase {
            id: "gout-elevated",
            values: &[("URIC ACID", "8.2")],
            expected: &[("Gout", RiskLevel::High)],
        },
        GoldenCase {
            id: "malformed-thyroxine",
            values: &[("THYROXINE", "see comment")],
            expected: &[("Hypothyroidism", RiskLevel::High)],
        },
    ]
}

#[test]
fn test_golden_cases() {
    for case in get_golden_cases() {
        let risks = classify(&value_map(case.values));

        assert_eq!(risks.len(), 6, "Case {}: expected six entries", case.id);
        for (condition, level) in case.expected {
            assert_eq!(
                risks.get(condition),
                Some(*level),
                "Case {}: {} mismatch",
                case.id,
                condition
            );
        }
    }
}

#[test]
fn test_thyroxine_boundaries_exclude_outer_conditions() {
    let at_low = classify(&value_map(&[("THYROXINE", "4.5")]));
    assert!(!at_low.contains("Hypothyroidism"));

    let at_high = classify(&value_map(&[("THYROXINE", "11.2")]));
    assert!(!at_high.contains("Hyperthyroidism"));
}

#[test]
fn test_unused_parameters_do_not_affect_result() {
    let base = classify(&value_map(&[("CREATININE", "1.0")]));
    let extra = classify(&value_map(&[
        ("CREATININE", "1.0"),
        ("SODIUM", "150"),
        ("CALCIUM", "12"),
        ("CHLORIDE", "80"),
    ]));
    assert_eq!(base, extra);
}

#[test]
fn test_saved_map_with_null_and_boolean_values() {
    let json = r#"{"THYROXINE": null, "URIC ACID": 7.5, "NEUTROPHILS": true}"#;
    let values: ValueMap = serde_json::from_str(json).unwrap();
    let risks = classify(&values);

    assert_eq!(risks.len(), 6);
    assert_eq!(risks.get("Hypothyroidism"), Some(RiskLevel::High));
    assert_eq!(risks.get("Gout"), Some(RiskLevel::High));
    assert_eq!(risks.get("Immune Deficiency"), Some(RiskLevel::High));
}

// tests/evaluate_report.rs
use resale_matcher::classify::Classifier;
use resale_matcher::evaluate::{self, ExampleGenerator, OFFER_TEMPLATES, ORDER_TEMPLATES};
use resale_matcher::message::Category;

#[test]
fn report_is_reproducible_for_a_seed() {
    let c = Classifier::default();
    let a = evaluate::run(&c, 300, 2024);
    let b = evaluate::run(&c, 300, 2024);
    assert_eq!(a.total, 600);
    assert_eq!(a.correct + a.incorrect, a.total);
    assert_eq!(a.correct, b.correct);
    assert_eq!(a.missing_order_keywords, b.missing_order_keywords);
    assert!((0.0..=100.0).contains(&a.accuracy));
}

#[test]
fn per_template_totals_add_up() {
    let c = Classifier::default();
    let corpus = ExampleGenerator::new(9).corpus(400);
    let r = evaluate::evaluate(&c, &corpus);
    let sum: usize = r.per_template.values().map(|s| s.total).sum();
    assert_eq!(sum, 800);
    for name in r.per_template.keys() {
        let known = ORDER_TEMPLATES.contains(&name.as_str()) || OFFER_TEMPLATES.contains(&name.as_str());
        assert!(known, "unexpected template {name}");
    }
    let missed = r.pattern_gaps.order_missed.len() + r.pattern_gaps.offer_missed.len();
    assert_eq!(missed, r.incorrect);
    for m in &r.misclassified {
        assert_ne!(m.expected, m.predicted);
        assert_ne!(m.expected, Category::Unknown);
    }
}

#[test]
fn report_serializes_for_the_cli() {
    let r = evaluate::run(&Classifier::default(), 20, 1);
    let v = serde_json::to_value(&r).unwrap();
    for key in ["total", "correct", "incorrect", "accuracy", "misclassified", "pattern_gaps", "per_template", "suggestions"] {
        assert!(v.get(key).is_some(), "missing {key}");
    }
}

use usprop_core::config::ModelSettings;
use usprop_core::resolver::PLACEHOLDER_CONTEXT;
use usprop_core::{AnswerResolver, QaModel, QaTable};
use usprop_model::{get_default_model, resolve_model_dir, FakeQaModel};

#[test]
fn fake_model_shapes_and_determinism() {
    let model = FakeQaModel::new();
    let a = model.score("What drives home prices?", PLACEHOLDER_CONTEXT).expect("score");
    let b = model.score("What drives home prices?", PLACEHOLDER_CONTEXT).expect("score");

    // [CLS] + 4 question words + [SEP] + context words + [SEP]
    let expected = 4 + 3 + PLACEHOLDER_CONTEXT.split_whitespace().count();
    assert_eq!(a.tokens.len(), expected);
    assert_eq!(a.start_scores.len(), expected);
    assert_eq!(a.end_scores.len(), expected);
    assert_eq!(a, b, "same input gives same tokens and scores");
    assert!(a.start_scores.iter().all(|s| (0.0..=1.0).contains(s)));
}

#[test]
fn fake_model_detokenizes_its_own_tokens() {
    let model = FakeQaModel::new();
    let scores = model.score("Is AUTOVAL accurate?", "context words").expect("score");
    let text = model.detokenize(&scores.tokens[1..3]).expect("detokenize");
    assert_eq!(text, "is autoval");
    assert!(model.detokenize(&[9_999]).is_err());
}

#[test]
fn fake_model_ids_outlive_later_calls() {
    let model = FakeQaModel::new();
    let first = model.score("list price", "context").expect("score");
    let second = model.score("closing costs", "other context").expect("score");
    assert_ne!(first.tokens[1], second.tokens[1]);
    assert_eq!(model.detokenize(&first.tokens[1..3]).expect("detokenize"), "list price");
    assert_eq!(model.detokenize(&second.tokens[1..3]).expect("detokenize"), "closing costs");
}

#[test]
fn fake_model_behind_resolver() {
    let settings = ModelSettings { use_fake: true, ..ModelSettings::default() };
    let model = get_default_model(&settings).expect("model");
    let known = QaTable::from_pairs([("What is AUTOVAL?", "AUTOVAL is an automated valuation model.")]);
    let resolver = AnswerResolver::new(known, model);

    assert_eq!(resolver.resolve("What is AUTOVAL?").unwrap(), "AUTOVAL is an automated valuation model.");

    let first = resolver.resolve("how are comps chosen?").unwrap();
    let second = resolver.resolve("how are comps chosen?").unwrap();
    assert_eq!(first, second);
    // Whatever span is chosen, it is made of input words.
    let input = format!("[cls] how are comps chosen? [sep] {} [sep]", PLACEHOLDER_CONTEXT.to_lowercase());
    for word in first.split_whitespace() {
        assert!(input.split_whitespace().any(|w| w == word), "{word} not in input");
    }
}

#[test]
fn missing_configured_model_dir_is_an_error() {
    // Only meaningful when no model is installed in the default locations.
    if std::env::var("APP_MODEL_DIR").is_ok() || std::env::var("MODEL_DIR").is_ok() {
        return;
    }
    if std::path::Path::new("models").exists() || std::path::Path::new("../models").exists() {
        return;
    }
    assert!(resolve_model_dir("/definitely/not/here").is_err());
}

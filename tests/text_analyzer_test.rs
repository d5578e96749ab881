use std::collections::BTreeSet;

use proptest::prelude::*;

use yari_search::analysis::analyzer::Analyzer;
use yari_search::analysis::analyzer::pipeline::PipelineAnalyzer;
use yari_search::analysis::settings::AnalyzerDefinition;
use yari_search::analysis::token_filter::elision::DEFAULT_ARTICLES;
use yari_search::analysis::token_filter::stop::ENGLISH_STOP_WORDS;
use yari_search::search::models::{analysis_settings, build_text_analyzer};

fn analyzer() -> PipelineAnalyzer {
    build_text_analyzer().unwrap()
}

fn term_set(analyzer: &PipelineAnalyzer, text: &str) -> BTreeSet<String> {
    analyzer.terms(text).unwrap().into_iter().collect()
}

fn set(terms: &[&str]) -> BTreeSet<String> {
    terms.iter().map(|t| t.to_string()).collect()
}

/// Terms that folding turned into something the next analysis removes: a stop
/// word (`à` → `a`) or an elided article (`ç'a` → `c'a`).
fn dropped_on_reanalysis(term: &str) -> bool {
    ENGLISH_STOP_WORDS.contains(&term)
        || term
            .split_once('\'')
            .is_some_and(|(article, _)| DEFAULT_ARTICLES.contains(&article))
}

#[test]
fn test_elided_article_is_removed() {
    let analyzer = analyzer();
    assert_eq!(term_set(&analyzer, "l'avion"), set(&["avion"]));
    assert_eq!(term_set(&analyzer, "L’Avion"), set(&["avion"]));
}

#[test]
fn test_articles_inside_a_token_are_kept() {
    let analyzer = analyzer();
    assert_eq!(
        term_set(&analyzer, "rock'n'roll"),
        set(&["rock'n'roll", "rock", "n", "roll"])
    );
    assert_eq!(
        term_set(&analyzer, "foo'l'bar"),
        set(&["foo'l'bar", "foo", "l", "bar"])
    );
    // Only the part that starts the token is an elided article.
    assert_eq!(term_set(&analyzer, "l'rock'n'roll"), term_set(&analyzer, "rock'n'roll"));
}

#[test]
fn test_dotted_api_name_keeps_original_and_parts() {
    let analyzer = analyzer();
    assert_eq!(
        term_set(&analyzer, "Array.prototype.forEach"),
        set(&["array.prototype.foreach", "array", "prototype", "foreach"])
    );
}

#[test]
fn test_case_changes_and_digits_do_not_split() {
    let analyzer = analyzer();

    let webgl = term_set(&analyzer, "WebGL");
    assert!(webgl.contains("webgl"));
    assert!(!webgl.contains("web"));
    assert!(!webgl.contains("gl"));

    // "forEach" would otherwise lose "for" to the stop filter.
    assert_eq!(term_set(&analyzer, "forEach"), set(&["foreach"]));

    let three_d = term_set(&analyzer, "3D");
    assert!(three_d.contains("3d"));
    assert!(!three_d.contains("3"));
    assert!(!three_d.contains("d"));
}

#[test]
fn test_html_tags_become_tokens() {
    let analyzer = analyzer();

    let video = term_set(&analyzer, "<video>: The Video Embed element");
    assert!(video.contains("_video_"));
    assert!(video.contains("video"));
    assert!(!video.contains("the"));

    // Without the char filter `<a>` would be the stop word "a".
    assert!(term_set(&analyzer, "<a>").contains("_a_"));

    // Only lowercase tag names are rewritten.
    assert!(!term_set(&analyzer, "<Video>").contains("_video_"));
}

#[test]
fn test_accents_are_folded() {
    let analyzer = analyzer();
    assert!(term_set(&analyzer, "bézier").contains("bezier"));
    assert_eq!(term_set(&analyzer, "Bézier curve"), term_set(&analyzer, "bezier curve"));
}

#[test]
fn test_folding_can_produce_terms_that_reanalyze_to_nothing() {
    let analyzer = analyzer();

    // Stop words are removed before folding.
    assert_eq!(term_set(&analyzer, "à"), set(&["a"]));
    assert!(term_set(&analyzer, "a").is_empty());

    // Elision runs before folding, so `ç` is not an article yet.
    assert_eq!(term_set(&analyzer, "ç'A"), set(&["c'a", "c"]));
    assert!(term_set(&analyzer, "c'a").is_empty());
}

#[test]
fn test_stop_words_are_removed() {
    let analyzer = analyzer();
    assert_eq!(
        term_set(&analyzer, "The Navigation Section element"),
        set(&["navigation", "section", "element"])
    );
    assert!(analyzer.terms("to be or not to be").unwrap().is_empty());
}

#[test]
fn test_offsets_point_into_original_text() {
    let analyzer = analyzer();
    let text = "Use <video> here";
    let tokens: Vec<_> = analyzer.analyze(text).unwrap().collect();

    let here = tokens.iter().find(|t| t.text == "here").unwrap();
    assert_eq!(&text[here.start_offset..here.end_offset], "here");

    let video = tokens.iter().find(|t| t.text == "_video_").unwrap();
    assert_eq!(video.start_offset, 4);
    assert_eq!(video.end_offset, 11);
}

#[test]
fn test_filter_order_is_significant() {
    // Stop before lowercase misses capitalised stop words.
    let settings = analysis_settings().with_analyzer(
        "reordered",
        AnalyzerDefinition::custom("standard").with_filters(["stop", "lowercase"]),
    );
    let reordered = settings.build_analyzer("reordered").unwrap();
    assert!(reordered.terms("The").unwrap().contains(&"the".to_string()));
    assert!(analyzer().terms("The").unwrap().is_empty());
}

proptest! {
    #[test]
    fn test_reanalyzing_a_token_yields_it_again(
        text in "[A-Za-z0-9 .\\-'àéèçüößæœøÀÉÇ]{0,40}"
    ) {
        let analyzer = analyzer();
        for term in analyzer.terms(&text).unwrap() {
            let again = term_set(&analyzer, &term);
            prop_assert!(
                again.contains(&term) || dropped_on_reanalysis(&term),
                "{:?} -> {:?} -> {:?}",
                text,
                term,
                again
            );
        }
    }

    #[test]
    fn test_analysis_never_fails(text in "\\PC{0,60}") {
        let analyzer = analyzer();
        prop_assert!(analyzer.analyze(&text).is_ok());
    }
}

use super::*;

fn highlighter() -> KeywordHighlighter {
    KeywordHighlighter::rust().unwrap_or_else(|e| panic!("{e}"))
}

#[test]
fn keywords_strings_numbers_comments() {
    let theme = HighlightTheme::default();
    let spans = highlighter().highlight("let x = \"hi\"; // 42\nfn f() { 7 }");
    let colors: Vec<Color> = spans.iter().map(|s| s.color).collect();
    assert_eq!(
        colors,
        vec![theme.keyword, theme.string, theme.comment, theme.keyword, theme.number]
    );
    assert_eq!((spans[0].start, spans[0].end), (0, 3));
    assert_eq!((spans[1].start, spans[1].end), (8, 12));
}

#[test]
fn identifiers_are_not_colored() {
    let spans = highlighter().highlight("letter fnord");
    assert!(spans.is_empty());
}

#[test]
fn char_colors_use_character_offsets() {
    let code = "é let";
    let spans = highlighter().highlight(code);
    assert_eq!(spans[0].start, 2);
    let colors = char_colors(code, &spans);
    assert_eq!(colors.len(), 5);
    assert!(colors[0].is_none());
    assert!(colors[2..].iter().all(Option::is_some));
}

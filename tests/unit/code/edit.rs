use super::*;
use crate::code::range::{lines, word};
use crate::code::scope::{ScopeSide, resolve_scope};

#[test]
fn tokenizer_keeps_every_character() {
    let code = "let x_1 = foo(a,  b);\n";
    let tokens = tokenize(code);
    assert_eq!(tokens.concat(), code);
    assert_eq!(
        tokens,
        vec!["let", " ", "x_1", " ", "=", " ", "foo", "(", "a", ",", "  ", "b", ")", ";", "\n"]
    );
}

#[test]
fn diff_resolves_to_both_ends() {
    let from = "let a = 1;\nprint(a);";
    let to = "let b = 1;\nprint(b);\nreturn;";
    let scope = diff_code(from, to, 0.0);
    assert_eq!(resolve_scope(&scope, ScopeSide::Before), from);
    assert_eq!(resolve_scope(&scope, ScopeSide::After), to);
    assert!(
        scope
            .fragments
            .iter()
            .any(|t| matches!(t, CodeTag::Fragment(f) if f.before == "a" && f.after == "b"))
    );
}

#[test]
fn offsets_clamp() {
    let code = "ab\ncdé";
    assert_eq!(offset_of(code, CodePoint::new(0, 1)), 1);
    assert_eq!(offset_of(code, CodePoint::new(1, 0)), 3);
    assert_eq!(offset_of(code, CodePoint::new(1, usize::MAX)), code.len());
    assert_eq!(offset_of(code, CodePoint::new(9, 0)), code.len());
}

#[test]
fn edits_resolve_as_expected() {
    let code = "one\ntwo\nthree";
    let after = |scope: CodeScope| resolve_scope(&scope, ScopeSide::After);
    assert_eq!(after(append_scope(code, "!", 1.0)), "one\ntwo\nthree!");
    assert_eq!(after(prepend_scope(code, "> ", 1.0)), "> one\ntwo\nthree");
    assert_eq!(
        after(insert_scope(code, CodePoint::new(1, 1), "-", 1.0)),
        "one\nt-wo\nthree"
    );
    assert_eq!(after(remove_scope(code, &lines(1, 1), 1.0)), "one\n\nthree");
    assert_eq!(
        after(replace_scope(code, &word(2, 0, Some(5)), "four", 1.0)),
        "one\ntwo\nfour"
    );
    assert_eq!(
        resolve_scope(&replace_scope(code, &word(2, 0, Some(5)), "four", 1.0), ScopeSide::Before),
        code
    );
}

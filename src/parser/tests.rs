//! Unit tests for the comma-list parser

use crate::parser::split_symbols;

#[test]
fn test_parse_simple_list() {
    let list = split_symbols("a,b,c").expect("Should parse successfully");
    assert_eq!(list.symbols, vec!['a', 'b', 'c']);
    assert!(!list.whitespace_only);
    assert!(!list.has_duplicates);
}

#[test]
fn test_trailing_comma_fails() {
    assert!(split_symbols("1,").is_err());
    assert!(split_symbols(",1").is_err());
    assert!(split_symbols("1,,2").is_err());
}

#[test]
fn test_multi_character_token_fails() {
    assert!(split_symbols("1,20").is_err());
    assert!(split_symbols("ab").is_err());
    assert!(split_symbols("'ab'").is_err());
}

#[test]
fn test_whitespace_only() {
    let list = split_symbols("   ").expect("Should parse successfully");
    assert!(list.is_empty());
    assert!(list.whitespace_only);
    assert!(!list.has_duplicates);

    let list = split_symbols("").expect("Should parse successfully");
    assert!(list.is_empty());
    assert!(list.whitespace_only);
}

#[test]
fn test_quoted_entries_and_trimming() {
    let list = split_symbols("1,2 , '3', ' ' ").expect("Should parse successfully");
    assert_eq!(list.symbols, vec!['1', '2', '3', ' ']);
    assert!(!list.has_duplicates);
    assert!(!list.whitespace_only);
}

#[test]
fn test_quoted_punctuation() {
    let list = split_symbols("',', ';', ;, ''', ', \"").expect("Should parse successfully");
    assert_eq!(list.symbols, vec![',', ';', ';', '\'', '\'', '"']);
    assert!(list.has_duplicates);
}

#[test]
fn test_unquoted_comma_or_space_fails() {
    assert!(split_symbols("a b").is_err());
    assert!(split_symbols("a, ,b").is_err());
}

#[test]
fn test_duplicates_detected() {
    let list = split_symbols("a, b, a").expect("Should parse successfully");
    assert_eq!(list.symbols, vec!['a', 'b', 'a']);
    assert!(list.has_duplicates);
}

#[test]
fn test_unicode_symbols() {
    let list = split_symbols("α, β, ₀").expect("Should parse successfully");
    assert_eq!(list.symbols, vec!['α', 'β', '₀']);
}

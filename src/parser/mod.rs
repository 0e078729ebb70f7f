//! Comma-list Parser Module
//! Parses alphabets and transition labels: comma-separated single characters,
//! where a comma or whitespace symbol is written quoted (`','`, `' '`)

use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[grammar = "parser/comma_list.pest"]
pub struct CommaListParser;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Parse error: {0}")]
    PestError(#[from] Box<pest::error::Error<Rule>>),
    #[error("Entry is not a single character: {0}")]
    InvalidEntry(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Result of parsing a comma list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolList {
    /// Entries in input order, duplicates preserved
    pub symbols: Vec<char>,
    /// The input held nothing but whitespace
    pub whitespace_only: bool,
    /// At least one symbol occurs more than once
    pub has_duplicates: bool,
}

impl SymbolList {
    fn from_symbols(symbols: Vec<char>) -> Self {
        let has_duplicates = symbols
            .iter()
            .enumerate()
            .any(|(i, c)| symbols[..i].contains(c));
        Self {
            symbols,
            whitespace_only: false,
            has_duplicates,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Parse a comma list such as `a, b, ',', ' '`
pub fn split_symbols(source: &str) -> ParseResult<SymbolList> {
    if source.chars().all(char::is_whitespace) {
        return Ok(SymbolList {
            whitespace_only: true,
            ..SymbolList::default()
        });
    }

    let pairs = CommaListParser::parse(Rule::list, source).map_err(Box::new)?;
    let mut symbols = Vec::new();

    for pair in pairs.flatten() {
        let text = match pair.as_rule() {
            Rule::quoted_char | Rule::bare => pair.as_str(),
            _ => continue,
        };
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => symbols.push(c),
            _ => return Err(ParseError::InvalidEntry(text.to_string())),
        }
    }

    Ok(SymbolList::from_symbols(symbols))
}

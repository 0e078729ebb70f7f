//! FSM Interpreter
//! Derives a validated finite-state machine from the diagram and renders its transition table

use std::fmt::Write as _;

use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::config::FsmOptions;
use crate::model::{AnyLink, Document};
use crate::parser::split_symbols;
use crate::text::{convert_latex_shortcuts, text_to_xml};


/// A semantic problem found while interpreting the diagram
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FsmIssue {
    #[error("Alphabet could not be parsed: {message}")]
    AlphabetSyntax { message: String },
    #[error("Alphabet contains duplicate symbols")]
    DuplicateAlphabetSymbol,
    #[error("State id of node {node} is empty")]
    EmptyStateId { node: usize },
    #[error("State '{id}' is declared more than once")]
    DuplicateState { id: String },
    #[error("No initial state is marked")]
    NoInitialState,
    #[error("Transition label '{label}' from '{from}' to '{to}' could not be parsed")]
    TransitionSyntax {
        from: String,
        label: String,
        to: String,
    },
    #[error("Symbol '{symbol}' on transition from '{from}' to '{to}' is not in the alphabet")]
    UndeclaredSymbol { symbol: char, from: String, to: String },
}

/// State ids in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateSets {
    pub all: IndexSet<String>,
    pub initial: IndexSet<String>,
    pub accepting: IndexSet<String>,
}

/// Result of interpreting a document; recomputed on demand, never persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FsmModel {
    pub alphabet: Vec<char>,
    pub states: StateSets,
    /// state -> symbol -> destination states
    pub transitions: IndexMap<String, IndexMap<char, IndexSet<String>>>,
    /// Links carrying each (from, symbol, to) arrow, by position in the document
    #[serde(skip)]
    pub transition_links: IndexMap<(String, char, String), Vec<usize>>,
    pub errors: Vec<FsmIssue>,
}

impl FsmModel {
    /// Interpret the document's nodes, links and alphabet text
    pub fn build(document: &Document, options: FsmOptions) -> Self {
        let mut model = FsmModel::default();
        model.read_alphabet(&document.alphabet);

        let mut state_of = Vec::with_capacity(document.nodes.len());
        for (i, node) in document.nodes.iter().enumerate() {
            let id = convert_latex_shortcuts(&node.text).trim().to_string();
            if id.is_empty() {
                model.errors.push(FsmIssue::EmptyStateId { node: i });
                state_of.push(None);
                continue;
            }
            if model.states.all.contains(&id) {
                model.errors.push(FsmIssue::DuplicateState { id });
                state_of.push(None);
                continue;
            }
            if node.is_initial_state() {
                model.states.initial.insert(id.clone());
            }
            if node.is_accept_state {
                model.states.accepting.insert(id.clone());
            }
            model.states.all.insert(id.clone());
            state_of.push(Some(id));
        }

        if options.ensure_initial_state && model.states.initial.is_empty() {
            model.errors.push(FsmIssue::NoInitialState);
        }

        for (i, link) in document.links.iter().enumerate() {
            let (a, b) = match link {
                AnyLink::Link(l) => (l.node_a, l.node_b),
                AnyLink::SelfLink(l) => (l.node, l.node),
                AnyLink::StartLink(_) => continue,
            };
            let from = state_of.get(a).cloned().flatten();
            let to = state_of.get(b).cloned().flatten();
            let (Some(from), Some(to)) = (from, to) else {
                debug!("Link {} touches a node without a state; skipped", i);
                continue;
            };
            model.read_transition(i, &from, link.text(), &to);
        }

        model
    }

    fn read_alphabet(&mut self, source: &str) {
        match split_symbols(&convert_latex_shortcuts(source)) {
            Ok(list) if list.has_duplicates => {
                self.errors.push(FsmIssue::DuplicateAlphabetSymbol);
            }
            Ok(list) => self.alphabet = list.symbols,
            Err(e) => self.errors.push(FsmIssue::AlphabetSyntax {
                message: e.to_string(),
            }),
        }
    }

    fn read_transition(&mut self, link: usize, from: &str, text: &str, to: &str) {
        let label = convert_latex_shortcuts(text);
        let list = match split_symbols(&label) {
            Ok(list) if list.whitespace_only => return,
            Ok(list) => list,
            Err(_) => {
                self.errors.push(FsmIssue::TransitionSyntax {
                    from: from.to_string(),
                    label,
                    to: to.to_string(),
                });
                return;
            }
        };

        for symbol in list.symbols {
            if !self.alphabet.contains(&symbol) {
                self.errors.push(FsmIssue::UndeclaredSymbol {
                    symbol,
                    from: from.to_string(),
                    to: to.to_string(),
                });
                continue;
            }
            self.transitions
                .entry(from.to_string())
                .or_default()
                .entry(symbol)
                .or_default()
                .insert(to.to_string());
            let supporting = self
                .transition_links
                .entry((from.to_string(), symbol, to.to_string()))
                .or_default();
            if !supporting.contains(&link) {
                supporting.push(link);
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Destinations of `state` on `symbol`
    pub fn destinations(&self, state: &str, symbol: char) -> Option<&IndexSet<String>> {
        self.transitions.get(state)?.get(&symbol)
    }

    /// Document link positions drawing the arrow `from --symbol--> to`
    pub fn links_for(&self, from: &str, symbol: char, to: &str) -> &[usize] {
        self.transition_links
            .get(&(from.to_string(), symbol, to.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Run the (possibly nondeterministic) machine over `word`.
    /// Invalid models and symbols outside the alphabet reject.
    pub fn accepts(&self, word: &str) -> bool {
        if !self.is_valid() {
            return false;
        }
        let mut current: IndexSet<&str> = self.states.initial.iter().map(String::as_str).collect();
        for symbol in word.chars() {
            if !self.alphabet.contains(&symbol) {
                return false;
            }
            current = current
                .iter()
                .filter_map(|state| self.destinations(state, symbol))
                .flatten()
                .map(String::as_str)
                .collect();
            if current.is_empty() {
                return false;
            }
        }
        current.iter().any(|state| self.states.accepting.contains(*state))
    }

    /// Grid view; `None` when the model has errors
    pub fn transition_table(&self) -> Option<TransitionTable> {
        if !self.is_valid() {
            return None;
        }
        let rows = self
            .states
            .all
            .iter()
            .map(|state| TableRow {
                state: state.clone(),
                is_initial: self.states.initial.contains(state),
                is_accepting: self.states.accepting.contains(state),
                cells: self
                    .alphabet
                    .iter()
                    .map(|symbol| {
                        self.destinations(state, *symbol)
                            .map(|to| to.iter().cloned().collect::<Vec<_>>().join(", "))
                            .unwrap_or_default()
                    })
                    .collect(),
            })
            .collect();
        Some(TransitionTable {
            symbols: self.alphabet.clone(),
            rows,
        })
    }
}

/// Rows follow state discovery order, columns follow alphabet order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionTable {
    pub symbols: Vec<char>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub state: String,
    pub is_initial: bool,
    pub is_accepting: bool,
    /// Comma-joined destinations per symbol; empty when there is no transition
    pub cells: Vec<String>,
}

impl TableRow {
    /// `→` for initial, `*` for accepting
    pub fn markers(&self) -> String {
        let mut markers = String::new();
        if self.is_initial {
            markers.push('→');
        }
        if self.is_accepting {
            markers.push('*');
        }
        markers
    }
}

/// HTML table fragment styled through `fsm-*` classes
pub fn to_html_table(model: &FsmModel) -> String {
    let Some(table) = model.transition_table() else {
        return "<table class=\"fsm-table fsm-invalid\"><tr><td>FSM is not valid</td></tr></table>\n"
            .to_string();
    };

    let mut html = String::from("<table class=\"fsm-table\">\n<thead><tr><th class=\"fsm-corner\"></th>");
    for symbol in &table.symbols {
        let _ = write!(
            html,
            "<th class=\"fsm-symbol\">{}</th>",
            text_to_xml(&symbol.to_string())
        );
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for row in &table.rows {
        let mut classes = String::from("fsm-state");
        if row.is_initial {
            classes.push_str(" fsm-initial");
        }
        if row.is_accepting {
            classes.push_str(" fsm-accepting");
        }
        let markers = row.markers();
        let label = if markers.is_empty() {
            text_to_xml(&row.state)
        } else {
            format!("{} {}", text_to_xml(&markers), text_to_xml(&row.state))
        };
        let _ = write!(html, "<tr><th class=\"{}\">{}</th>", classes, label);
        for cell in &row.cells {
            let _ = write!(html, "<td class=\"fsm-cell\">{}</td>", text_to_xml(cell));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n");
    html
}

/// Bulleted list of the model's errors
pub fn errors_to_html(model: &FsmModel) -> String {
    let mut html = String::from("<ul class=\"fsm-errors\">\n");
    for error in &model.errors {
        let _ = writeln!(html, "<li>{}</li>", text_to_xml(&error.to_string()));
    }
    html.push_str("</ul>\n");
    html
}

/// Fixed-width table for terminals; lists the errors instead when invalid
pub fn to_text_table(model: &FsmModel) -> String {
    let Some(table) = model.transition_table() else {
        let mut text = String::from("FSM is not valid:\n");
        for error in &model.errors {
            let _ = writeln!(text, "  - {}", error);
        }
        return text;
    };

    let head: Vec<String> = table
        .rows
        .iter()
        .map(|row| {
            let markers = row.markers();
            if markers.is_empty() {
                row.state.clone()
            } else {
                format!("{} {}", markers, row.state)
            }
        })
        .collect();

    let width = |s: &str| s.chars().count();
    let first = head.iter().map(|s| width(s)).max().unwrap_or(0);
    let columns: Vec<usize> = table
        .symbols
        .iter()
        .enumerate()
        .map(|(c, _)| {
            table
                .rows
                .iter()
                .map(|row| width(&row.cells[c]))
                .max()
                .unwrap_or(0)
                .max(1)
        })
        .collect();

    let pad = |s: &str, w: usize| format!("{}{}", s, " ".repeat(w.saturating_sub(width(s))));
    let mut text = String::new();

    let mut line = pad("", first);
    for (symbol, w) in table.symbols.iter().zip(&columns) {
        let _ = write!(line, " | {}", pad(&symbol.to_string(), *w));
    }
    let _ = writeln!(text, "{}", line.trim_end());

    for (row, label) in table.rows.iter().zip(&head) {
        let mut line = pad(label, first);
        for (cell, w) in row.cells.iter().zip(&columns) {
            let _ = write!(line, " | {}", pad(cell, *w));
        }
        let _ = writeln!(text, "{}", line.trim_end());
    }
    text
}

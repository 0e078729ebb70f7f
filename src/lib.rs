//! StateCanvas - Diagram Editor Core
//! Nodes and links on a canvas, JSON interchange, SVG/TikZ export and FSM interpretation

pub mod config;
pub mod fsm;
pub mod geometry;
pub mod model;
pub mod parser;
pub mod persistence;
pub mod render;
pub mod serialization;
pub mod text;

pub use config::{Config, FsmOptions, Preset};
pub use fsm::FsmModel;
pub use model::{AnyLink, Document, Link, Node, SelfLink, StartLink, TemporaryLink};
pub use parser::split_symbols;
pub use render::{export_latex, export_svg, RenderTarget};
pub use serialization::{load_document, to_json_string, LoadError, LoadReport};

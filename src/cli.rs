//! StateCanvas CLI - batch export and validation of diagram documents

use std::env;
use std::fs;
use std::process;
use std::str::FromStr;

use statecanvas::fsm::{errors_to_html, to_html_table, to_text_table};
use statecanvas::{export_latex, export_svg, load_document, Config, Document, FsmModel, FsmOptions, Preset};

fn usage() {
    println!("StateCanvas CLI - diagram export and FSM validation");
    println!("Usage: statecanvas-cli <command> <document.json> [--preset NAME] [--config FILE]");
    println!();
    println!("Commands:");
    println!("  svg     Write the diagram as an SVG document");
    println!("  latex   Write the diagram as a LaTeX/TikZ document");
    println!("  json    Write the interpreted FSM model as JSON");
    println!("  table   Print the FSM transition table");
    println!("  html    Write the FSM transition table (or its errors) as HTML");
    println!("  check   Validate the FSM; exits with status 1 when invalid");
    println!();
    println!("Presets: {}", Preset::ALL.map(Preset::name).join(", "));
}

struct Options {
    command: String,
    document: String,
    preset: Option<String>,
    config: Option<String>,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut positional = Vec::new();
    let mut preset = None;
    let mut config = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--preset" => {
                preset = Some(iter.next().ok_or("--preset needs a value")?.clone());
            }
            "--config" => {
                config = Some(iter.next().ok_or("--config needs a value")?.clone());
            }
            other if other.starts_with("--") => return Err(format!("Unknown option '{}'", other)),
            other => positional.push(other.to_string()),
        }
    }

    match positional.as_slice() {
        [command, document] => Ok(Options {
            command: command.clone(),
            document: document.clone(),
            preset,
            config,
        }),
        _ => Err("Expected a command and a document path".to_string()),
    }
}

fn load_config(options: &Options) -> Result<Config, String> {
    if let Some(path) = &options.config {
        let source = fs::read_to_string(path)
            .map_err(|e| format!("Could not read config '{}': {}", path, e))?;
        return Config::from_json(&source).map_err(|e| e.to_string());
    }
    match &options.preset {
        Some(name) => Preset::from_str(name)
            .map(Config::preset)
            .map_err(|e| e.to_string()),
        None => Ok(Config::default()),
    }
}

fn run(options: &Options) -> Result<bool, String> {
    let config = load_config(options)?;
    let source = fs::read_to_string(&options.document)
        .map_err(|e| format!("Could not read file '{}': {}", options.document, e))?;

    let mut document = Document::new(config);
    let report = load_document(&mut document, &source).map_err(|e| e.to_string())?;
    if report.dropped_nodes + report.dropped_links > 0 {
        eprintln!(
            "Dropped {} node(s) and {} link(s) while loading",
            report.dropped_nodes, report.dropped_links
        );
    }

    let model = || FsmModel::build(&document, FsmOptions::default());

    match options.command.as_str() {
        "svg" => println!("{}", export_svg(&document)),
        "latex" => print!("{}", export_latex(&document)),
        "json" => {
            let json = serde_json::to_string_pretty(&model()).map_err(|e| e.to_string())?;
            println!("{}", json);
        }
        "table" => {
            let model = model();
            println!("{}", to_text_table(&model));
            return Ok(model.is_valid());
        }
        "html" => {
            let model = model();
            if model.is_valid() {
                println!("{}", to_html_table(&model));
            } else {
                println!("{}", errors_to_html(&model));
            }
        }
        "check" => {
            let model = model();
            if model.is_valid() {
                println!(
                    "FSM is valid: {} state(s), {} symbol(s)",
                    model.states.all.len(),
                    model.alphabet.len()
                );
            } else {
                println!("FSM is not valid:");
                for error in &model.errors {
                    println!("  - {}", error);
                }
            }
            return Ok(model.is_valid());
        }
        other => return Err(format!("Unknown command '{}'", other)),
    }
    Ok(true)
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        usage();
        return;
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            usage();
            process::exit(2);
        }
    };

    match run(&options) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    }
}

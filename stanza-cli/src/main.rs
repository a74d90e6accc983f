//! Command-line block recognizer.
//!
//! Usage:
//!   stanza `<path>` [--rules `<file>`] [--format `<format>`]  - Scan a file for blocks
//!   stanza --list-defaults                                    - Print the built-in rule file
//!
//! Rules come from the embedded defaults with an optional user TOML file
//! layered on top; every recognized block is reported with its line span.

mod report;

use std::cell::RefCell;
use std::rc::Rc;

use clap::{Arg, ArgAction, Command};

use report::{BlockReport, RunReport};
use stanza_config::Loader;
use stanza_parser::parse_file;

fn main() {
    env_logger::init();

    let matches = Command::new("stanza")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Recognize declarative line blocks in text files")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the input file")
                .required_unless_present("list-defaults")
                .index(1),
        )
        .arg(
            Arg::new("rules")
                .long("rules")
                .short('r')
                .help("TOML rule file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format: text or json")
                .default_value("text"),
        )
        .arg(
            Arg::new("list-defaults")
                .long("list-defaults")
                .help("Print the built-in default rule file")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("list-defaults") {
        print!("{}", stanza_config::default_rules());
        return;
    }

    let path = matches
        .get_one::<String>("path")
        .expect("path is required unless listing defaults");
    let format = matches.get_one::<String>("format").expect("has a default");

    let mut loader = Loader::new();
    if let Some(rules_path) = matches.get_one::<String>("rules") {
        loader = loader.with_file(rules_path);
    }
    let rules = loader.build().unwrap_or_else(|e| {
        eprintln!("Rule file error: {}", e);
        std::process::exit(1);
    });

    let reports: Rc<RefCell<Vec<BlockReport>>> = Rc::new(RefCell::new(Vec::new()));
    let spec = rules
        .compile(&mut |_rule| {
            let sink = reports.clone();
            Some(Box::new(move |m: stanza_parser::BlockMatch| {
                let sink = sink.clone();
                let report = BlockReport::from_match(&m);
                Ok(Some(Box::new(move || {
                    sink.borrow_mut().push(report);
                    Ok(())
                }) as stanza_parser::Commit))
            }))
        })
        .unwrap_or_else(|e| {
            eprintln!("Rule error: {}", e);
            std::process::exit(1);
        });

    let summary = parse_file(path, &spec).unwrap_or_else(|e| {
        eprintln!("Parse error: {}", e);
        std::process::exit(1);
    });

    let reports = reports.take();
    match format.as_str() {
        "text" => {
            for report in &reports {
                println!(
                    "== {} #{} (lines {}-{})",
                    report.block, report.occurrence, report.first_line, report.last_line
                );
                for line in &report.lines {
                    println!("   {}", line);
                }
            }
            println!(
                "-- {} block(s) in {} line(s)",
                summary.blocks_committed, summary.lines_seen
            );
        }
        "json" => {
            let run = RunReport {
                summary,
                blocks: reports,
            };
            match serde_json::to_string_pretty(&run) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error formatting output: {}", e);
                    std::process::exit(1);
                }
            }
        }
        other => {
            eprintln!("Format '{}' not supported", other);
            eprintln!("Available formats: text, json");
            std::process::exit(1);
        }
    }
}

extern crate smali_analyzer;

use std::fs;
use std::path::Path;
use std::process;

use clap::{App, Arg, crate_version};
use log::info;

use smali_analyzer::{LeniencyLevel, parse_and_analyze, split_methods};
use smali_analyzer::analyze::AnalyzedStream;
use smali_analyzer::error::Error;

fn main() {
    env_logger::init();

    let matches = App::new("smali_analyze")
        .version(crate_version!())
        .about("Tokenizes and analyzes smali-style assembly files.")
        .arg(Arg::with_name("INPUT")
            .help("Files to analyze")
            .required(true)
            .multiple(true))
        .arg(Arg::with_name("lenient")
            .long("lenient")
            .help("Allow labels to be defined more than once (last definition wins)"))
        .arg(Arg::with_name("tokens")
            .short("t")
            .long("tokens")
            .help("Print every token"))
        .arg(Arg::with_name("methods")
            .short("m")
            .long("methods")
            .help("Print the span and signature of every method"))
        .arg(Arg::with_name("no-color")
            .long("no-color")
            .help("Don't color error output"))
        .get_matches();

    let leniency = if matches.is_present("lenient") { LeniencyLevel::Lenient } else { LeniencyLevel::Strict };
    let color = !matches.is_present("no-color");

    let mut failed = false;
    for arg in matches.values_of("INPUT").into_iter().flatten() {
        let path = Path::new(arg);
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(error) => {
                eprintln!("{}: {}", path.display(), error);
                failed = true;
                continue;
            }
        };

        info!("analyzing {}", path.display());
        let result = parse_and_analyze(&source, leniency)
            .and_then(|stream| {
                if matches.is_present("tokens") {
                    print_tokens(&stream);
                }
                if matches.is_present("methods") {
                    print_methods(&stream).map_err(|error| vec![error])?;
                }
                Ok(stream)
            });

        match result {
            Ok(stream) => println!("{}: {}", path.display(), stream.signature()),
            Err(errors) => {
                failed = true;
                for error in errors {
                    eprintln!("{}", error.render(Some(arg), color));
                }
            }
        }
    }

    if failed {
        process::exit(1);
    }
}

fn print_tokens(stream: &AnalyzedStream) {
    for token in stream.tokens() {
        match stream.jump_target(token) {
            Some(target) => println!("{} -> {}", token, target),
            None => println!("{}", token),
        }
    }
}

fn print_methods(stream: &AnalyzedStream) -> Result<(), Error> {
    for method in split_methods(stream)? {
        println!("{}..={} {} {}", method.start(), method.end(), method.name(), method.signature());
    }
    Ok(())
}

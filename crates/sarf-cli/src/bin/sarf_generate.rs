// sarf-generate: Generate inflected forms for a lemma and feature request.
//
// With a LEMMA argument, generates for that single request. Otherwise reads
// requests from stdin, one `LEMMA FEAT:VAL...` per line.
//
// Usage:
//   sarf-generate [-d DB_PATH] [OPTIONS] [LEMMA FEAT:VAL...]
//
// Options:
//   -d, --db-path PATH   Database file, or directory containing morphology.db
//   --variant NAME       Dialect variant (default: msa)
//   --diac-only          Skip bw and gloss assembly
//   --debug              Print categories of each result and the trace
//   --json               Print one JSON object per request
//   -h, --help           Print help

use std::io::{self, BufRead, Write};

use sarf_gen::{Generator, GeneratorOptions};

fn print_help() {
    println!("sarf-generate: Generate inflected forms from a lemma and features.");
    println!();
    println!("Usage: sarf-generate [-d DB_PATH] [OPTIONS] [LEMMA FEAT:VAL...]");
    println!();
    println!("If LEMMA is given, generates for that request.");
    println!("Otherwise reads requests from stdin (one `LEMMA FEAT:VAL...` per line).");
    println!();
    println!("Options:");
    println!("  -d, --db-path PATH   Database file, or directory containing morphology.db");
    println!("  --variant NAME       Dialect variant (default: msa)");
    println!("  --diac-only          Skip bw and gloss assembly");
    println!("  --debug              Print categories of each result and the trace");
    println!("  --json               Print one JSON object per request");
    println!("  -h, --help           Print this help");
    println!();
    println!("The database is searched in: -d, ${}, ~/.sarf, the current directory.", sarf_cli::DB_PATH_ENV);
}

/// Run one request line. Returns false when the request was rejected.
fn run_request(
    generator: &Generator<'_>,
    line: &str,
    debug: bool,
    json: bool,
    out: &mut impl Write,
) -> bool {
    let (lemma, request) = match sarf_cli::parse_request(line) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("error: {e}");
            return false;
        }
    };

    if debug {
        let result = match generator.generate_debug(&lemma, &request) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("error: {lemma}: {e}");
                return false;
            }
        };
        if json {
            let value = sarf_cli::debug_json(&lemma, &request, &result.matches, &result.trace);
            let _ = writeln!(out, "{value}");
        } else {
            let _ = writeln!(out, "{lemma} {request}:");
            for m in &result.matches {
                let _ = writeln!(out, "  {}", sarf_cli::format_match(m));
            }
            if result.is_empty() {
                let _ = writeln!(out, "  (no analysis)");
            }
            for entry in result.trace.entries() {
                let _ = writeln!(out, "  trace: {entry}");
            }
        }
        return true;
    }

    let analyses = match generator.generate(&lemma, &request) {
        Ok(analyses) => analyses,
        Err(e) => {
            eprintln!("error: {lemma}: {e}");
            return false;
        }
    };
    if json {
        let value = sarf_cli::analyses_json(&lemma, &request, &analyses);
        let _ = writeln!(out, "{value}");
    } else {
        let _ = writeln!(out, "{lemma} {request}:");
        if analyses.is_empty() {
            let _ = writeln!(out, "  (no analysis)");
        }
        for analysis in &analyses {
            let _ = writeln!(out, "  {}", sarf_cli::format_analysis(analysis));
        }
    }
    true
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = sarf_cli::parse_args(&args).unwrap_or_else(|e| sarf_cli::fatal(&e));

    if cli.help {
        print_help();
        return;
    }

    sarf_cli::init_logging();

    let db = sarf_cli::load_database(cli.db_path.as_deref())
        .unwrap_or_else(|e| sarf_cli::fatal(&e));

    let mut options = GeneratorOptions {
        diac_only: cli.diac_only,
        ..GeneratorOptions::default()
    };
    if let Some(variant) = cli.variant {
        options.variant = variant;
    }
    let generator =
        Generator::with_options(&db, options).unwrap_or_else(|e| sarf_cli::fatal(&e.to_string()));

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    if !cli.request.is_empty() {
        let line = cli.request.join(" ");
        let ok = run_request(&generator, &line, cli.debug, cli.json, &mut out);
        let _ = out.flush();
        if !ok {
            std::process::exit(1);
        }
        return;
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("error reading stdin: {e}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        run_request(&generator, line, cli.debug, cli.json, &mut out);
    }
}

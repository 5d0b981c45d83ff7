// sarf-cli: shared utilities for the command-line tools.

use std::path::PathBuf;
use std::process;

use sarf_core::{Analysis, DebugTrace, Feature, FeatureSet};
use sarf_db::MorphologyDatabase;
use sarf_gen::{GenerateError, GeneratedMatch};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

/// Database directory name under the user's home directory.
const DB_DIR: &str = ".sarf";

/// Database file name looked up in every search directory.
const DB_FILE: &str = "morphology.db";

/// Environment variable naming a database file or directory.
pub const DB_PATH_ENV: &str = "SARF_DB_PATH";

/// Search for the database file and load it.
///
/// Search order:
/// 1. `db_path` argument (if provided), as a file or a directory
/// 2. `SARF_DB_PATH` environment variable, as a file or a directory
/// 3. `~/.sarf/morphology.db`
/// 4. Current working directory (looks for `morphology.db` directly)
pub fn load_database(db_path: Option<&str>) -> Result<MorphologyDatabase, String> {
    let search_paths = build_search_paths(db_path);

    for candidate in &search_paths {
        let file = if candidate.is_file() {
            candidate.clone()
        } else {
            candidate.join(DB_FILE)
        };
        if file.is_file() {
            return MorphologyDatabase::from_path(&file)
                .map_err(|e| format!("failed to load {}: {e}", file.display()));
        }
    }

    Err(format!(
        "could not find {} in any of the search paths:\n{}",
        DB_FILE,
        search_paths
            .iter()
            .map(|p| format!("  - {}", p.display()))
            .collect::<Vec<_>>()
            .join("\n")
    ))
}

/// Build the list of files or directories to search for the database.
fn build_search_paths(db_path: Option<&str>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(p) = db_path {
        paths.push(PathBuf::from(p));
    }

    if let Ok(env_path) = std::env::var(DB_PATH_ENV) {
        paths.push(PathBuf::from(env_path));
    }

    if let Some(home) = home_dir() {
        paths.push(home.join(DB_DIR));
    }

    // fallback for local development
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd);
    }

    paths
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

/// Parsed command line of `sarf-generate`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub db_path: Option<String>,
    pub variant: Option<String>,
    pub diac_only: bool,
    pub debug: bool,
    pub json: bool,
    pub help: bool,
    /// `LEMMA FEAT:VAL...`, empty when requests come from stdin.
    pub request: Vec<String>,
}

/// Parse command-line arguments (without the program name).
pub fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value_of = |name: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{name} requires a value"))
        };
        match arg.as_str() {
            "-d" | "--db-path" => parsed.db_path = Some(value_of(arg.as_str())?),
            "--variant" => parsed.variant = Some(value_of(arg.as_str())?),
            "--diac-only" => parsed.diac_only = true,
            "--debug" => parsed.debug = true,
            "--json" => parsed.json = true,
            "-h" | "--help" => parsed.help = true,
            other => {
                if let Some(val) = other.strip_prefix("--db-path=") {
                    parsed.db_path = Some(val.to_string());
                } else if let Some(val) = other.strip_prefix("--variant=") {
                    parsed.variant = Some(val.to_string());
                } else if other.starts_with('-') {
                    return Err(format!("unknown option: {other}"));
                } else {
                    parsed.request.push(other.to_string());
                }
            }
        }
    }

    Ok(parsed)
}

/// Parse a `LEMMA FEAT:VAL...` request.
pub fn parse_request(line: &str) -> Result<(String, FeatureSet), GenerateError> {
    let mut tokens = line.split_whitespace();
    let lemma = tokens
        .next()
        .ok_or_else(|| GenerateError::MalformedRequest(line.to_string()))?;
    if lemma.contains(':') {
        return Err(GenerateError::MalformedRequest(format!(
            "expected a lemma before features, got {lemma:?}"
        )));
    }

    let mut features = FeatureSet::new();
    for token in tokens {
        let (name, value) = token
            .split_once(':')
            .ok_or_else(|| GenerateError::MalformedRequest(token.to_string()))?;
        features.insert(name.parse::<Feature>()?, value);
    }
    Ok((lemma.to_string(), features))
}

/// One analysis as a tab-separated line: surface form, then fields.
pub fn format_analysis(analysis: &Analysis) -> String {
    let mut line = format!("{}\tlex:{}", analysis.diac, analysis.lex);
    if !analysis.bw.is_empty() {
        line.push_str(&format!(" bw:{}", analysis.bw));
    }
    if !analysis.gloss.is_empty() {
        line.push_str(&format!(" gloss:{}", analysis.gloss));
    }
    if !analysis.features.is_empty() {
        line.push_str(&format!(" {}", analysis.features));
    }
    line
}

/// An analysis followed by its prefix, stem and suffix categories.
pub fn format_match(m: &GeneratedMatch<'_>) -> String {
    format!(
        "{}\t[{} {} {}]",
        format_analysis(&m.analysis),
        m.prefix_category,
        m.stem_category,
        m.suffix_category
    )
}

/// JSON object for one request and its results.
pub fn analyses_json(lemma: &str, request: &FeatureSet, analyses: &[Analysis]) -> Value {
    json!({
        "lemma": lemma,
        "request": request,
        "analyses": analyses,
    })
}

/// Like [`analyses_json`], with categories per result and the trace.
pub fn debug_json(
    lemma: &str,
    request: &FeatureSet,
    matches: &[GeneratedMatch<'_>],
    trace: &DebugTrace,
) -> Value {
    let results: Vec<Value> = matches
        .iter()
        .map(|m| {
            json!({
                "analysis": m.analysis,
                "prefix_category": m.prefix_category,
                "stem_category": m.stem_category,
                "suffix_category": m.suffix_category,
            })
        })
        .collect();
    json!({
        "lemma": lemma,
        "request": request,
        "analyses": results,
        "trace": trace.entries(),
    })
}

/// Install a stderr log subscriber filtered by `RUST_LOG` (default `warn`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_flags_and_request() {
        let parsed = parse_args(&args(&[
            "-d",
            "/tmp/db",
            "--variant=egy",
            "--debug",
            "katab",
            "pos:verb",
            "gen:f",
        ]))
        .unwrap();
        assert_eq!(parsed.db_path.as_deref(), Some("/tmp/db"));
        assert_eq!(parsed.variant.as_deref(), Some("egy"));
        assert!(parsed.debug);
        assert!(!parsed.json);
        assert!(!parsed.diac_only);
        assert_eq!(parsed.request, args(&["katab", "pos:verb", "gen:f"]));
    }

    #[test]
    fn parse_args_errors() {
        assert!(parse_args(&args(&["--variant"])).is_err());
        assert!(parse_args(&args(&["--colour"])).is_err());
        assert!(parse_args(&args(&["-h"])).unwrap().help);
    }

    #[test]
    fn parse_request_line() {
        let (lemma, features) = parse_request("katab  pos:verb prc1.5:0").unwrap();
        assert_eq!(lemma, "katab");
        assert_eq!(features.get(Feature::Pos), Some("verb"));
        assert_eq!(features.get(Feature::Prc1_5), Some("0"));
    }

    #[test]
    fn parse_request_errors() {
        assert!(matches!(
            parse_request("   "),
            Err(GenerateError::MalformedRequest(_))
        ));
        assert!(matches!(
            parse_request("pos:verb"),
            Err(GenerateError::MalformedRequest(_))
        ));
        assert!(matches!(
            parse_request("katab verb"),
            Err(GenerateError::MalformedRequest(_))
        ));
        assert_eq!(
            parse_request("katab colour:red").unwrap_err(),
            GenerateError::UnknownFeature("colour".into())
        );
    }

    #[test]
    fn search_paths_start_with_argument() {
        let paths = build_search_paths(Some("/opt/sarf/morphology.db"));
        assert_eq!(paths[0], PathBuf::from("/opt/sarf/morphology.db"));
    }

    #[test]
    fn format_plain_analysis() {
        let mut analysis = Analysis::new("katabat");
        analysis.lex = "katab_1".into();
        analysis.bw = "katab/PV+at/PVSUFF_SUBJ:3FS".into();
        analysis.features = FeatureSet::parse("pos:verb gen:f").unwrap();
        assert_eq!(
            format_analysis(&analysis),
            "katabat\tlex:katab_1 bw:katab/PV+at/PVSUFF_SUBJ:3FS pos:verb gen:f"
        );
    }

    #[test]
    fn json_request_object() {
        let request = FeatureSet::parse("pos:verb").unwrap();
        let value = analyses_json("katab", &request, &[Analysis::new("katab")]);
        assert_eq!(value["lemma"], "katab");
        assert_eq!(value["request"]["pos"], "verb");
        assert_eq!(value["analyses"][0]["diac"], "katab");
    }
}

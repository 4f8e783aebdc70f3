use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use sift::{load_terms_from_file, Filter, FilterConfig, MatchType};

#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(about = "Single-pass content filter for text files")]
#[command(version)]
struct Args {
    /// Text file to scan
    input: PathBuf,

    /// Deny dictionary file (one term per line, # comments skipped)
    #[arg(long)]
    deny_file: PathBuf,

    /// Allow dictionary file; allow hits override deny hits
    #[arg(long)]
    allow_file: Option<PathBuf>,

    /// Stop at the first accepted match
    #[arg(long)]
    fail_fast: bool,

    /// Match case-sensitively (character folds are on by default)
    #[arg(long)]
    case_sensitive: bool,

    /// Step over repeated characters during term matching
    #[arg(long)]
    ignore_repeat: bool,

    /// Flag maximal digit runs
    #[arg(long)]
    enable_num_check: bool,

    /// Minimum digit-run length flagged by the numeric check
    #[arg(long, default_value_t = 8)]
    num_threshold: usize,

    /// Flag email addresses
    #[arg(long)]
    enable_email_check: bool,

    /// Flag URLs
    #[arg(long)]
    enable_url_check: bool,

    /// Flag IPv4 addresses
    #[arg(long)]
    enable_ipv4_check: bool,

    /// Emit masked text instead of the match list
    #[arg(long)]
    replace: bool,

    /// Emit matches as JSON lines instead of tab-separated fields
    #[arg(long)]
    json: bool,

    /// Stats output file path
    #[arg(long, default_value = "scan_stats.json")]
    stats_out: PathBuf,
}

#[derive(Debug, Serialize)]
struct ScanStats {
    input_path: String,
    input_chars: usize,
    deny_terms: usize,
    allow_terms: usize,
    match_count: usize,
    term_matches: usize,
    numeric_matches: usize,
    email_matches: usize,
    url_matches: usize,
    ipv4_matches: usize,
    duration_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // WHY: structured JSON logging enables observability and debugging in production
    tracing_subscriber::fmt()
        .with_target(false)
        .json()
        .init();

    let args = Args::parse();

    info!("Starting sift");
    info!(?args, "Parsed CLI arguments");

    // WHY: validate inputs early to fail fast with clear errors
    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }
    if !args.deny_file.exists() {
        anyhow::bail!("Deny dictionary does not exist: {}", args.deny_file.display());
    }
    if let Some(ref allow_file) = args.allow_file {
        if !allow_file.exists() {
            anyhow::bail!("Allow dictionary does not exist: {}", allow_file.display());
        }
    }

    let deny_source = load_terms_from_file(&args.deny_file).await?;
    let deny_terms = deny_source.len();

    let (allow_source, allow_terms) = match args.allow_file {
        Some(ref path) => {
            let source = load_terms_from_file(path).await?;
            let count = source.len();
            (Some(source), count)
        }
        None => (None, 0),
    };

    let mut builder = FilterConfig::builder()
        .fail_fast(args.fail_fast)
        .ignore_case(!args.case_sensitive)
        .ignore_repeat(args.ignore_repeat)
        .enable_num_check(args.enable_num_check)
        .num_threshold(args.num_threshold)
        .enable_email_check(args.enable_email_check)
        .enable_url_check(args.enable_url_check)
        .enable_ipv4_check(args.enable_ipv4_check)
        .deny_source(Box::new(deny_source));
    if let Some(source) = allow_source {
        builder = builder.allow_source(Box::new(source));
    }
    let filter = Filter::new(builder.build()?)?;

    let text = tokio::fs::read_to_string(&args.input).await?;
    let input_chars = text.chars().count();
    info!("Scanning {} characters from {}", input_chars, args.input.display());

    let scan_start = std::time::Instant::now();
    let matches = filter.find_all(&text);
    let duration_ms = scan_start.elapsed().as_millis() as u64;

    if args.replace {
        print!("{}", filter.replace(&text));
    } else {
        for m in &matches {
            if args.json {
                println!("{}", serde_json::to_string(m)?);
            } else {
                println!("{}", filter.format_match(m));
            }
        }
    }

    let count_type = |match_type: MatchType| -> usize {
        matches.iter().filter(|m| m.match_type == match_type).count()
    };
    let stats = ScanStats {
        input_path: args.input.display().to_string(),
        input_chars,
        deny_terms,
        allow_terms,
        match_count: matches.len(),
        term_matches: count_type(MatchType::Term),
        numeric_matches: count_type(MatchType::Numeric),
        email_matches: count_type(MatchType::Email),
        url_matches: count_type(MatchType::Url),
        ipv4_matches: count_type(MatchType::Ipv4),
        duration_ms,
    };
    tokio::fs::write(&args.stats_out, serde_json::to_string_pretty(&stats)?).await?;

    info!("Scan completed: {} matches in {}ms", matches.len(), duration_ms);

    eprintln!("sift v{} - scan complete", env!("CARGO_PKG_VERSION"));
    eprintln!("Scanned {} characters against {} deny / {} allow terms", input_chars, deny_terms, allow_terms);
    eprintln!("Matches found: {}", matches.len());
    eprintln!("Stats written to: {}", args.stats_out.display());

    Ok(())
}

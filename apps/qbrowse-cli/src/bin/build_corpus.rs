use std::{env, path::PathBuf};

use qbrowse_core::config::{expand_path, Config};
use qbrowse_core::corpus::CorpusIndexer;
use qbrowse_core::scan::{scan_image_dir, write_corpus, ScanOptions};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let args: Vec<String> = env::args().skip(1).collect();
    let mut folder = None; let mut out = None; let mut options = ScanOptions::default();
    let mut i = 0; while i < args.len() { match args[i].as_str() {
        "--recurse" | "-R" => options.recurse = true,
        "--out" | "-O" => { if i + 1 < args.len() { out = Some(expand_path(&args[i + 1])); i += 1; } else { eprintln!("Error: --out requires a path"); std::process::exit(1); } }
        s if !s.starts_with('-') => folder = Some(expand_path(s)),
        s => { eprintln!("Unknown flag: {}", s); std::process::exit(2); } } i += 1; }
    let Some(folder) = folder else {
        eprintln!("Usage: qbrowse-build <image-folder> [--recurse] [--out data.json]");
        std::process::exit(1);
    };
    let out: PathBuf = out.unwrap_or_else(|| expand_path(&settings.corpus.data_json));

    println!("qbrowse corpus builder\n======================");
    println!("Image folder: {}", folder.display()); println!("Output: {}", out.display());
    if options.recurse { println!("Recursing into subfolders"); }
    let records = scan_image_dir(&folder, options)?;
    if records.is_empty() { println!("No tagged images found under {}.", folder.display()); return Ok(()); }

    tracing::info!(records = records.len(), "scanned image folder");
    let build = CorpusIndexer::with_config(settings.indexing()).build(&records);
    write_corpus(&out, records)?;
    println!("\n✅ Wrote {} questions to {}", build.documents.len(), out.display());
    println!("📊 {} distinct tags, most common:", build.tag_frequencies.len());
    for t in build.tag_frequencies.iter().take(10) { println!("  {:<20} {}", t.tag, t.count); }
    Ok(())
}

use std::cell::RefCell;
use std::env;
use std::rc::Rc;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::LocalSet;
use tracing_subscriber::EnvFilter;

use qbrowse_browser::Browser;
use qbrowse_core::config::Config;
use qbrowse_core::traits::RenderSurface;
use qbrowse_core::types::{Document, TagFrequency};
use qbrowse_render::RenderJobHandle;
use qbrowse_text::TantivyIndex;

/// Prints to stdout; status updates go to a spinner line.
#[derive(Default)]
struct TerminalSurface {
    status: Option<ProgressBar>,
    last_status: String,
    muted: bool,
}

impl TerminalSurface {
    fn print(&self, line: String) {
        if self.muted { return; }
        match &self.status {
            Some(bar) => bar.suspend(|| println!("{}", line)),
            None => println!("{}", line),
        }
    }

    /// Retire the spinner and leave the final status on screen.
    fn finish(&mut self) {
        if let Some(bar) = self.status.take() { bar.finish_and_clear(); }
        if !self.muted && !self.last_status.is_empty() { println!("🔍 {}", self.last_status); }
    }
}

impl RenderSurface for TerminalSurface {
    fn show_detail(&mut self, doc: &Document) {
        let tags: Vec<&str> = doc.tag_names().collect();
        self.print(format!("\n📄 {}  (id {}, image {}, thumb {})\n   tags: {}\n{}", doc.title, doc.id, doc.image_ref, doc.thumb_ref, tags.join(", "), doc.body.trim_end()));
    }

    fn clear_list(&mut self) { self.print(String::from("──────────")); }

    fn append_list(&mut self, docs: &[Document]) {
        for d in docs { self.print(format!("  {:>10}  {:<21}  {}", d.id, d.short_title, d.search_terms)); }
    }

    fn show_word_list(&mut self, tags: &[TagFrequency]) {
        for t in tags { self.print(format!("  {:<20} {}", t.tag, t.count)); }
    }

    fn set_status(&mut self, status: &str) {
        self.last_status = status.to_string();
        if self.muted { return; }
        if status.is_empty() {
            if let Some(bar) = self.status.take() { bar.finish_and_clear(); }
            return;
        }
        let bar = self.status.get_or_insert_with(|| {
            let bar = ProgressBar::new_spinner();
            bar.set_style(ProgressStyle::with_template("{spinner:.green} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()));
            bar
        });
        bar.set_message(status.to_string());
        bar.tick();
    }
}

type CliBrowser = Browser<TantivyIndex, TerminalSurface>;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() { eprintln!("Usage: {} <tags|suggest|search|show|interactive> [args...]", prog); std::process::exit(1); }
    let cmd = args.remove(0);
    (cmd, args)
}

async fn drain(job: RenderJobHandle, surface: &Rc<RefCell<TerminalSurface>>) {
    let _ = job.collect().await;
    surface.borrow_mut().finish();
}

fn show(browser: &CliBrowser, arg: Option<&str>) {
    match arg.and_then(|a| a.parse::<u32>().ok()) {
        Some(id) => { if !browser.select(id) { eprintln!("No document with id {}", id); } }
        None => eprintln!("Usage: show <id>"),
    }
}

async fn interactive(browser: &CliBrowser, surface: &Rc<RefCell<TerminalSurface>>) -> anyhow::Result<()> {
    println!("Type to search (:show <id>, :clear, :quit)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line.split_once(' ').map_or((line, ""), |(c, rest)| (c, rest.trim())) {
            (":quit", _) | (":q", _) => break,
            (":clear", _) => { browser.clear(); }
            (":show", id) => show(browser, Some(id)),
            _ => {
                let outcome = browser.on_input(line)?;
                if !outcome.suggestions.is_empty() { println!("💡 {}", outcome.suggestions.join("  ")); }
                if let Some(job) = outcome.job { drain(job, surface).await; }
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let (cmd, args) = parse_args();

    let surface = Rc::new(RefCell::new(TerminalSurface { muted: true, ..TerminalSurface::default() }));
    let browser = Browser::from_settings(&settings, &env::current_dir()?, surface.clone())?;
    surface.borrow_mut().muted = false;
    tracing::info!(documents = browser.documents().len(), tags = browser.tag_frequencies().len(), "corpus loaded");

    LocalSet::new().run_until(async {
        match cmd.as_str() {
            "tags" => browser.clear(),
            "suggest" => {
                let prefix = args.first().cloned().unwrap_or_default();
                for s in browser.suggest(&prefix) { println!("{}", s); }
            }
            "search" => {
                let term = args.join(" ");
                if term.trim().is_empty() { eprintln!("Usage: qbrowse search \"<term>\""); std::process::exit(1); }
                drain(browser.search(&term)?, &surface).await;
            }
            "show" => show(&browser, args.first().map(String::as_str)),
            "interactive" | "i" => interactive(&browser, &surface).await?,
            _ => { eprintln!("Unknown command: {}", cmd); std::process::exit(1); }
        }
        Ok::<_, anyhow::Error>(())
    }).await
}

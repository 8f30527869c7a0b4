//! Line-driven interactive session.
//!
//! Searches run on their own task so input keeps flowing while one is in
//! flight; `more` and `search` typed meanwhile hit the controller's loading
//! guard exactly as a scroll or a double click would.

use std::io;
use std::str::FromStr;

use chrono::NaiveDate;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::app::{AppContext, Result, WikidashError};
use crate::cli::commands::{render_dashboard, render_notice, select};
use crate::controller::{DashboardController, SearchRequest, SearchResolution};
use crate::domain::selection::parse_date;

const HELP: &str = "\
Commands:
  search            fetch the current selection
  lang <code>       change language
  date <YYYY-MM-DD> change date
  page <n>          go to page n
  size <n>          set page size (back to page 1)
  more              grow the page size by one step
  open <n>          open the n-th most-read article and mark it read
  show              print the dashboard
  help              this text
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Search,
    Language(String),
    Date(NaiveDate),
    Page(usize),
    PageSize(usize),
    More,
    Open(usize),
    Show,
    Help,
    Quit,
}

impl FromStr for BrowseCommand {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("");
        let arg = parts.next();

        let number = |arg: Option<&str>| -> std::result::Result<usize, String> {
            arg.ok_or_else(|| format!("{} needs a number", command))?
                .parse()
                .map_err(|_| format!("{} needs a number", command))
        };

        match command {
            "search" | "s" => Ok(BrowseCommand::Search),
            "lang" | "l" => arg
                .map(|code| BrowseCommand::Language(code.to_string()))
                .ok_or_else(|| "lang needs a language code".to_string()),
            "date" | "d" => arg
                .and_then(parse_date)
                .map(BrowseCommand::Date)
                .ok_or_else(|| "date needs YYYY-MM-DD".to_string()),
            "page" | "p" => number(arg).map(BrowseCommand::Page),
            "size" => number(arg).map(BrowseCommand::PageSize),
            "more" | "m" => Ok(BrowseCommand::More),
            "open" | "o" => number(arg).map(BrowseCommand::Open),
            "show" => Ok(BrowseCommand::Show),
            "help" | "?" => Ok(BrowseCommand::Help),
            "quit" | "q" | "exit" => Ok(BrowseCommand::Quit),
            "" => Err(String::new()),
            other => Err(format!("unknown command: {} (try help)", other)),
        }
    }
}

/// One line of input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Command(BrowseCommand),
    /// Unusable line; the message is shown to the user when not empty.
    Invalid(String),
    End,
}

/// Reads the next line. Bad input never ends the session, only I/O
/// failures do.
async fn next_input<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>) -> Result<Input> {
    match lines.next_line().await {
        Ok(Some(line)) => Ok(match line.parse::<BrowseCommand>() {
            Ok(command) => Input::Command(command),
            Err(message) => Input::Invalid(message),
        }),
        Ok(None) => Ok(Input::End),
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            Ok(Input::Invalid("input is not valid UTF-8".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn run(ctx: &AppContext, language: Option<String>, date: Option<NaiveDate>) -> Result<()> {
    let mut controller = ctx.controller();
    let mut notices = ctx.notifications.subscribe();
    select(&mut controller, language, date);

    let (results_tx, mut results_rx) = mpsc::unbounded_channel();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    if let Some(request) = controller.begin_search() {
        spawn_search(request, results_tx.clone());
        println!("Loading...");
    }

    loop {
        let expiry = notices.expires_at();

        tokio::select! {
            Some(resolution) = results_rx.recv() => {
                controller.finish_search(resolution);
                print!("{}", render_dashboard(&controller));
            }
            Some(event) = notices.changed() => {
                println!("{}", render_notice(&event));
            }
            _ = sleep_until(expiry.unwrap_or_else(Instant::now)), if expiry.is_some() => {
                if notices.current().is_none() {
                    println!("(notification cleared)");
                }
            }
            input = next_input(&mut lines) => {
                match input? {
                    Input::End | Input::Command(BrowseCommand::Quit) => break,
                    Input::Command(command) => handle(&mut controller, command, &results_tx),
                    Input::Invalid(message) => {
                        if !message.is_empty() {
                            eprintln!("{}", message);
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn handle(
    controller: &mut DashboardController,
    command: BrowseCommand,
    results_tx: &mpsc::UnboundedSender<SearchResolution>,
) {
    match command {
        BrowseCommand::Search => match controller.begin_search() {
            Some(request) => {
                println!("Loading...");
                spawn_search(request, results_tx.clone());
            }
            None => println!("Already loading"),
        },
        BrowseCommand::Language(code) => {
            select(controller, Some(code), None);
            println!("Language: {} (run search to refresh)", controller.selection().language);
        }
        BrowseCommand::Date(date) => {
            controller.set_date(date);
            println!("Date: {} (run search to refresh)", date);
        }
        BrowseCommand::Page(page) => {
            controller.set_page(page);
            print!("{}", render_dashboard(controller));
        }
        BrowseCommand::PageSize(size) => {
            controller.set_page_size(size);
            print!("{}", render_dashboard(controller));
        }
        BrowseCommand::More => {
            if controller.request_more() {
                print!("{}", render_dashboard(controller));
            } else {
                println!("Still loading");
            }
        }
        BrowseCommand::Open(n) => open_nth(controller, n),
        BrowseCommand::Show => print!("{}", render_dashboard(controller)),
        BrowseCommand::Help => println!("{}", HELP),
        BrowseCommand::Quit => {}
    }
}

fn open_nth(controller: &mut DashboardController, n: usize) {
    let start = controller.pagination().bounds(controller.view().count).start;
    let Some(article) = n
        .checked_sub(start + 1)
        .and_then(|i| controller.view().articles.get(i))
    else {
        println!("No article {} on this page", n);
        return;
    };

    let tid = article.tid.clone();
    let url = article.page_url().map(str::to_string);

    if let Some(url) = url {
        if let Err(e) = open::that(&url) {
            eprintln!("Could not open {}: {}", url, e);
        }
    } else {
        println!("{} has no page link", article.display_title());
    }

    if let Some(tid) = tid {
        controller.open_article(&tid);
    }
}

fn spawn_search(request: SearchRequest, results_tx: mpsc::UnboundedSender<SearchResolution>) {
    let selection = request.selection().clone();
    tokio::spawn(async move {
        // A panicked fetch still has to bring the controller back to Idle.
        let resolution = match tokio::spawn(request.execute()).await {
            Ok(resolution) => resolution,
            Err(e) => SearchResolution::failed(
                selection,
                WikidashError::Other(format!("search task failed: {}", e)),
            ),
        };
        let _ = results_tx.send(resolution);
    });
}

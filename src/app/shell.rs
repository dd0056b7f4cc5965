//! Line-oriented front end over a [`SearchSession`].

use crate::app::render::render_snapshot;
use crate::core::export::ReportExporter;
use crate::core::fetch::ListingFetcher;
use crate::core::session::SearchSession;
use crate::core::view::DiscountLevel;
use crate::domain::ports::{Clock, SearchBackend, SessionStore, Storage};
use crate::utils::error::{GemsError, Result};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub const HELP: &str = "Commands:
  search <zip>      find undervalued listings in a 5-digit ZIP code
  discount <pct>    minimum discount: 10, 20, 30, 40 or 50
  more              load the next page of results
  select <n|id>     expand or collapse a listing
  export            write the visible listings to a report bundle
  show              print the current results
  help              show this message
  quit              leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Discount(DiscountLevel),
    More,
    Select(String),
    Export,
    Show,
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> std::result::Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.collect::<Vec<_>>().join(" ");

    let command = match verb.to_ascii_lowercase().as_str() {
        "search" | "s" if !arg.is_empty() => Command::Search(arg),
        "search" | "s" => return Err("Usage: search <zip>".to_string()),
        "discount" | "d" => {
            let percent = arg
                .trim_end_matches('%')
                .parse::<u8>()
                .ok()
                .and_then(DiscountLevel::from_percent)
                .ok_or_else(|| "Usage: discount <10|20|30|40|50>".to_string())?;
            Command::Discount(percent)
        }
        "more" | "m" => Command::More,
        "select" | "open" if !arg.is_empty() => Command::Select(arg),
        "select" | "open" => return Err("Usage: select <n|id>".to_string()),
        "export" | "e" => Command::Export,
        "show" | "ls" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("Unknown command `{}`. Type `help`.", other)),
    };
    Ok(Some(command))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<B, S, K, T>
where
    B: SearchBackend,
    S: SessionStore,
    K: Clock,
    T: Storage,
{
    session: SearchSession<S>,
    fetcher: ListingFetcher<B, S, K>,
    exporter: ReportExporter<T>,
}

impl<B, S, K, T> Shell<B, S, K, T>
where
    B: SearchBackend,
    S: SessionStore,
    K: Clock,
    T: Storage,
{
    pub fn new(
        session: SearchSession<S>,
        fetcher: ListingFetcher<B, S, K>,
        exporter: ReportExporter<T>,
    ) -> Self {
        Self {
            session,
            fetcher,
            exporter,
        }
    }

    pub fn session(&self) -> &SearchSession<S> {
        &self.session
    }

    pub async fn search<W: Write>(&self, input: &str, out: &mut W) -> Result<()> {
        match self.session.search(&self.fetcher, input).await {
            Ok(_) => {}
            Err(e @ GemsError::Validation { .. }) => {
                writeln!(out, "{}", e.user_friendly_message())?;
                return Ok(());
            }
            Err(e) => return Err(e),
        }
        render_snapshot(&self.session.snapshot(), out)?;
        Ok(())
    }

    /// Resumes the restored search, if the session has one.
    pub async fn resume<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.session.resume(&self.fetcher).await? {
            render_snapshot(&self.session.snapshot(), out)?;
        }
        Ok(())
    }

    pub async fn export<W: Write>(&self, out: &mut W) -> Result<()> {
        let snapshot = self.session.snapshot();
        let Some(zip) = snapshot.postal_code else {
            writeln!(out, "Search for a ZIP code before exporting.")?;
            return Ok(());
        };

        match self.exporter.export(&zip, &snapshot.visible).await {
            Ok(name) => writeln!(out, "📁 Report saved: {}", name)?,
            Err(e @ GemsError::Validation { .. }) => {
                writeln!(out, "{}", e.user_friendly_message())?
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    pub async fn execute<W: Write>(&self, command: Command, out: &mut W) -> Result<Flow> {
        match command {
            Command::Search(input) => self.search(&input, out).await?,
            Command::Discount(level) => {
                self.session.set_discount(level);
                render_snapshot(&self.session.snapshot(), out)?;
            }
            Command::More => {
                if self.session.load_more() {
                    render_snapshot(&self.session.snapshot(), out)?;
                } else {
                    writeln!(out, "No more listings to show.")?;
                }
            }
            Command::Select(target) => {
                let snapshot = self.session.snapshot();
                let id = target
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| snapshot.visible.get(i))
                    .map(|l| l.id.clone())
                    .unwrap_or(target);

                if snapshot.visible.iter().any(|l| l.id == id) {
                    self.session.toggle_selection(&id);
                    render_snapshot(&self.session.snapshot(), out)?;
                } else {
                    writeln!(out, "No visible listing `{}`.", id)?;
                }
            }
            Command::Export => self.export(out).await?,
            Command::Show => render_snapshot(&self.session.snapshot(), out)?,
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Reads commands from `input` until `quit` or end of input.
    pub async fn run<R, W>(&self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        write!(out, "gems> ")?;
        out.flush()?;

        while let Some(line) = lines.next_line().await? {
            match parse_command(&line) {
                Ok(Some(command)) => {
                    if self.execute(command, out).await? == Flow::Quit {
                        break;
                    }
                }
                Ok(None) => {}
                Err(message) => writeln!(out, "{}", message)?,
            }
            write!(out, "gems> ")?;
            out.flush()?;
        }
        Ok(())
    }
}

//! Line-based parser for handbook files.

use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use super::{Block, Handbook, Inline, Page};
use crate::error::Result;

/// Line separating two pages.
const PAGE_BREAK: &str = "---";

fn entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*- \[ \] (.+)$").expect("valid checklist regex"))
}

fn copy_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("valid copy field regex"))
}

/// Parse handbook source text.
///
/// # Errors
///
/// Returns [`crate::Error::EmptyDocument`] if no page has any content.
pub fn parse(source: &str) -> Result<Handbook> {
    let mut lines = source.lines().peekable();

    let mut title = None;
    while let Some(&line) = lines.peek() {
        if line.trim().is_empty() {
            lines.next();
            continue;
        }
        if let Some(rest) = line.strip_prefix("# ") {
            title = Some(rest.trim().to_string());
            lines.next();
        }
        break;
    }

    let mut pages = Vec::new();
    let mut current = PageBuilder::default();
    let mut entry_count = 0;
    let mut copy_count = 0;

    for line in lines {
        if line.trim_end() == PAGE_BREAK {
            if let Some(page) = current.finish() {
                pages.push(page);
            } else {
                trace!("Dropping empty page segment");
            }
            current = PageBuilder::default();
            continue;
        }

        if current.page.title.is_none() {
            if let Some(rest) = line.strip_prefix("## ") {
                current.page.title = Some(rest.trim().to_string());
                continue;
            }
        }

        let block = if line.trim().is_empty() {
            Block::Blank
        } else if let Some(caps) = entry_re().captures(line) {
            let label = parse_inlines(&caps[1], &mut copy_count);
            let block = Block::Entry {
                index: entry_count,
                label,
            };
            entry_count += 1;
            block
        } else {
            Block::Text(parse_inlines(line, &mut copy_count))
        };
        current.page.blocks.push(block);
    }
    if let Some(page) = current.finish() {
        pages.push(page);
    }

    Handbook::from_pages(title, pages)
}

/// Split a line into plain runs and copy fields, numbering copy fields from
/// `next_id`.
fn parse_inlines(line: &str, next_id: &mut usize) -> Vec<Inline> {
    let mut inlines = Vec::new();
    let mut last = 0;

    for caps in copy_re().captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            inlines.push(Inline::Plain(line[last..whole.start()].to_string()));
        }
        inlines.push(Inline::Copy {
            id: *next_id,
            text: caps[1].to_string(),
        });
        *next_id += 1;
        last = whole.end();
    }
    if last < line.len() {
        inlines.push(Inline::Plain(line[last..].to_string()));
    }
    inlines
}

#[derive(Default)]
struct PageBuilder {
    page: Page,
}

impl PageBuilder {
    /// Finish the page, trimming blank lines at both ends.
    /// Returns `None` for a page with no title and no content.
    fn finish(mut self) -> Option<Page> {
        while matches!(self.page.blocks.last(), Some(Block::Blank)) {
            self.page.blocks.pop();
        }
        let leading = self
            .page
            .blocks
            .iter()
            .take_while(|b| matches!(b, Block::Blank))
            .count();
        self.page.blocks.drain(..leading);

        if self.page.title.is_none() && self.page.blocks.is_empty() {
            None
        } else {
            Some(self.page)
        }
    }
}

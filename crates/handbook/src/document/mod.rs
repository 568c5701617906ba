//! Handbook document model.
//!
//! A handbook is a fixed, ordered sequence of pages parsed once at startup.
//! Checklist entries and copy fields are numbered in document order across
//! all pages; those positions are their only identity.

mod parser;

use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

pub use parser::parse;

/// A parsed handbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handbook {
    /// Title from the leading `# ` line, if any.
    pub title: Option<String>,
    /// Pages in display order. Never empty.
    pages: Vec<Page>,
    /// Checklist entries in document order.
    entries: Vec<ChecklistEntry>,
    /// Copy fields in document order.
    copy_fields: Vec<CopyField>,
}

/// One page of the handbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Title from the first `## ` line of the page, if any.
    pub title: Option<String>,
    /// Lines of the page body.
    pub blocks: Vec<Block>,
}

/// One line of a page body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// An empty line.
    Blank,
    /// A line of text.
    Text(Vec<Inline>),
    /// A checklist entry; `index` is its position in the document's checklist.
    Entry {
        /// Position in the document-wide checklist.
        index: usize,
        /// The entry's label.
        label: Vec<Inline>,
    },
}

/// A run of text inside a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Ordinary text.
    Plain(String),
    /// A click-to-copy field.
    Copy {
        /// Position in the document-wide list of copy fields.
        id: usize,
        /// Text written to the clipboard.
        text: String,
    },
}

/// A checklist entry with the page it lives on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistEntry {
    /// Page index.
    pub page: usize,
    /// Label as plain text.
    pub label: String,
}

/// A copy field with the page it lives on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyField {
    /// Page index.
    pub page: usize,
    /// Text written to the clipboard.
    pub text: String,
}

impl Inline {
    /// Text shown for this run when no transient label replaces it.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(text) | Self::Copy { text, .. } => text,
        }
    }
}

/// Concatenate the text of a run of inlines.
#[must_use]
pub fn plain_text(inlines: &[Inline]) -> String {
    inlines.iter().map(Inline::text).collect()
}

impl Handbook {
    /// Build a handbook from parsed pages, indexing entries and copy fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyDocument`] if there are no pages.
    pub(crate) fn from_pages(title: Option<String>, pages: Vec<Page>) -> Result<Self> {
        if pages.is_empty() {
            return Err(Error::EmptyDocument);
        }

        let mut entries = Vec::new();
        let mut copy_fields = Vec::new();
        for (page_index, page) in pages.iter().enumerate() {
            for block in &page.blocks {
                let inlines = match block {
                    Block::Blank => continue,
                    Block::Text(inlines) => inlines,
                    Block::Entry { label, .. } => {
                        entries.push(ChecklistEntry {
                            page: page_index,
                            label: plain_text(label),
                        });
                        label
                    }
                };
                for inline in inlines {
                    if let Inline::Copy { text, .. } = inline {
                        copy_fields.push(CopyField {
                            page: page_index,
                            text: text.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self {
            title,
            pages,
            entries,
            copy_fields,
        })
    }

    /// Read and parse a handbook file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains no pages.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| Error::DocumentRead {
            path: path.to_path_buf(),
            source,
        })?;
        let handbook = parse(&source)?;
        debug!(
            path = %path.display(),
            pages = handbook.page_count(),
            entries = handbook.entries.len(),
            "Loaded handbook"
        );
        Ok(handbook)
    }

    /// Number of pages (always at least one).
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All pages.
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// The page at `index`, if any.
    #[must_use]
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Checklist entries in document order.
    #[must_use]
    pub fn entries(&self) -> &[ChecklistEntry] {
        &self.entries
    }

    /// Copy fields in document order.
    #[must_use]
    pub fn copy_fields(&self) -> &[CopyField] {
        &self.copy_fields
    }

    /// The copy field with the given id, if any.
    #[must_use]
    pub fn copy_field(&self, id: usize) -> Option<&CopyField> {
        self.copy_fields.get(id)
    }

    /// BLAKE3 fingerprint of the checklist labels in order.
    ///
    /// Saved checklist state is positional; a changed fingerprint means the
    /// entries were edited or reordered since the state was written.
    #[must_use]
    pub fn layout_fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for entry in &self.entries {
            hasher.update(entry.label.as_bytes());
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Render the whole handbook as plain text, marking entries from `checked`.
    ///
    /// This is what gets sent to the printer.
    #[must_use]
    pub fn render_plain(&self, checked: &[bool]) -> String {
        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(title);
            out.push_str("\n\n");
        }

        let total = self.pages.len();
        for (index, page) in self.pages.iter().enumerate() {
            if index > 0 {
                out.push('\x0c');
            }
            out.push_str(&format!("[{}/{}]", index + 1, total));
            if let Some(title) = &page.title {
                out.push(' ');
                out.push_str(title);
            }
            out.push_str("\n\n");

            for block in &page.blocks {
                match block {
                    Block::Blank => {}
                    Block::Text(inlines) => out.push_str(&plain_text(inlines)),
                    Block::Entry { index, label } => {
                        let mark = if checked.get(*index).copied().unwrap_or(false) {
                            "[x]"
                        } else {
                            "[ ]"
                        };
                        out.push_str(mark);
                        out.push(' ');
                        out.push_str(&plain_text(label));
                    }
                }
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIP: &str = "\
# Autumn in Kansai

## Flights
Outbound `JL 123` from Taipei
Return `JL 124`
---
## Packing
- [ ] Passport
- [ ] Rail pass `JR-7781`
---
## Last day
- [ ] Return the pocket wifi
";

    #[test]
    fn test_entries_are_numbered_across_pages() {
        let handbook = parse(TRIP).unwrap();

        assert_eq!(handbook.page_count(), 3);
        let labels: Vec<_> = handbook.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Passport", "Rail pass JR-7781", "Return the pocket wifi"]
        );
        assert_eq!(handbook.entries()[2].page, 2);
    }

    #[test]
    fn test_copy_fields_are_indexed() {
        let handbook = parse(TRIP).unwrap();

        let texts: Vec<_> = handbook
            .copy_fields()
            .iter()
            .map(|f| f.text.as_str())
            .collect();
        assert_eq!(texts, vec!["JL 123", "JL 124", "JR-7781"]);
        assert_eq!(handbook.copy_field(2).unwrap().page, 1);
        assert!(handbook.copy_field(3).is_none());
    }

    #[test]
    fn test_layout_fingerprint_tracks_order() {
        let a = parse("- [ ] one\n- [ ] two\n").unwrap();
        let b = parse("- [ ] two\n- [ ] one\n").unwrap();
        let c = parse("intro\n- [ ] one\n- [ ] two\n").unwrap();

        assert_ne!(a.layout_fingerprint(), b.layout_fingerprint());
        assert_eq!(a.layout_fingerprint(), c.layout_fingerprint());
    }

    #[test]
    fn test_render_plain_marks_checked_entries() {
        let handbook = parse(TRIP).unwrap();
        let text = handbook.render_plain(&[true, false]);

        assert!(text.starts_with("Autumn in Kansai\n"));
        assert!(text.contains("[1/3] Flights"));
        assert!(text.contains("Outbound JL 123 from Taipei"));
        assert!(text.contains("[x] Passport"));
        assert!(text.contains("[ ] Rail pass JR-7781"));
        assert!(text.contains("[ ] Return the pocket wifi"));
        assert_eq!(text.matches('\x0c').count(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Handbook::load("/nonexistent/handbook.md");
        assert!(matches!(result, Err(Error::DocumentRead { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trip.md");
        std::fs::write(&path, TRIP).unwrap();

        let handbook = Handbook::load(&path).unwrap();
        assert_eq!(handbook.title.as_deref(), Some("Autumn in Kansai"));
    }
}

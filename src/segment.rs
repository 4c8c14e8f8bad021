//! Line-oriented chunking shared by the dump and annotation parsers.
//!
//! Each non-blank line is trimmed and handed to a classifier, which decides
//! whether the line carries content, opens a new named chunk, or both. The
//! segmenter itself knows nothing about either file format.

use crate::diagnostic::Diagnostic;

/// How the classifier wants a single line handled.
#[derive(Debug)]
pub struct Classified<T, M> {
    content: Option<T>,
    start: Option<(String, Option<M>)>,
}

impl<T, M> Classified<T, M> {
    /// The line is consumed without producing anything.
    pub fn skip() -> Self {
        Self {
            content: None,
            start: None,
        }
    }

    /// The line belongs to the currently open chunk.
    pub fn content(content: T) -> Self {
        Self {
            content: Some(content),
            start: None,
        }
    }

    /// The line opens a new chunk. Metadata can only travel with a chunk start.
    pub fn start(name: impl Into<String>, metadata: Option<M>) -> Self {
        Self {
            content: None,
            start: Some((name.into(), metadata)),
        }
    }

    /// Content that goes into the chunk this same line opens.
    pub fn with_content(mut self, content: T) -> Self {
        self.content = Some(content);
        self
    }
}

/// A named run of content lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk<T, M> {
    pub name: String,
    pub lines: Vec<T>,
    /// 1-based line that opened the chunk.
    pub start_line: usize,
    pub metadata: Option<M>,
}

/// Split `lines` into chunks.
///
/// `classify` sees every non-blank line (trimmed) together with its 1-based
/// line number. Content produced while no chunk is open goes to `on_orphan`,
/// whose error aborts the split.
pub fn split_stream<I, S, T, M, C, O>(
    lines: I,
    mut classify: C,
    mut on_orphan: O,
) -> Result<Vec<Chunk<T, M>>, Diagnostic>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    C: FnMut(&str, usize) -> Result<Classified<T, M>, Diagnostic>,
    O: FnMut(&str, usize) -> Diagnostic,
{
    let mut chunks: Vec<Chunk<T, M>> = Vec::new();

    for (index, raw) in lines.into_iter().enumerate() {
        let line_no = index + 1;
        let line = raw.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        let classified = classify(line, line_no)?;

        if let Some((name, metadata)) = classified.start {
            chunks.push(Chunk {
                name,
                lines: Vec::new(),
                start_line: line_no,
                metadata,
            });
        }

        if let Some(content) = classified.content {
            match chunks.last_mut() {
                Some(chunk) => chunk.lines.push(content),
                None => return Err(on_orphan(line, line_no)),
            }
        }
    }

    Ok(chunks)
}

//! Structured editing of the bootstrap source file (`environment.ts`).
//!
//! The file is split into an ordered list of segments: verbatim text, import
//! statements and the `imports: [...]` array literal. Only segments that were
//! changed are re-rendered, so untouched text round-trips byte for byte.

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

use crate::error::LinkError;
use crate::runtime::{Runtime, write_atomic};

const MODULE_LIST_KEY: &[u8] = b"imports";

#[derive(Debug, Clone, PartialEq, Eq)]
struct ImportStatement {
    raw: String,
    /// Named specifiers between the braces, as written (`A`, `B as C`).
    names: Vec<String>,
    source: String,
    quote: char,
    semicolon: bool,
}

impl ImportStatement {
    fn new(name: &str, source: &str) -> Self {
        let mut statement = Self {
            raw: String::new(),
            names: vec![name.to_string()],
            source: source.to_string(),
            quote: '\'',
            semicolon: true,
        };
        statement.raw = statement.build();
        statement
    }

    fn parse(raw: &str) -> Self {
        let mut statement = Self {
            raw: raw.to_string(),
            names: Vec::new(),
            source: String::new(),
            quote: '\'',
            semicolon: raw.ends_with(';'),
        };
        let Some(quote_pos) = raw.find(['\'', '"']) else {
            return statement;
        };
        let quote = if raw[quote_pos..].starts_with('"') { '"' } else { '\'' };
        let rest = &raw[quote_pos + 1..];
        statement.quote = quote;
        statement.source = rest[..rest.find(quote).unwrap_or(rest.len())].to_string();

        let head = &raw[..quote_pos];
        if let Some(open) = head.find('{')
            && let Some(close) = head[open..].find('}')
        {
            statement.names = head[open + 1..open + close]
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect();
        }
        statement
    }

    fn build(&self) -> String {
        format!(
            "import {{ {} }} from {q}{}{q}{}",
            self.names.join(", "),
            self.source,
            if self.semicolon { ";" } else { "" },
            q = self.quote
        )
    }

    fn binds(&self, name: &str) -> bool {
        self.names.iter().any(|n| binding_name(n) == name)
    }

    fn drop_name(&mut self, name: &str) {
        self.names.retain(|n| binding_name(n) != name);
        self.raw = self.build();
    }
}

/// Local name bound by an import specifier: `A` for `A`, `C` for `B as C`.
fn binding_name(specifier: &str) -> &str {
    let specifier = specifier.trim();
    let specifier = specifier.strip_prefix("type ").unwrap_or(specifier).trim();
    match specifier.rsplit_once(" as ") {
        Some((_, alias)) => alias.trim(),
        None => specifier,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ListItem {
    Entry(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Layout {
    /// `imports: [A, B]`
    Inline,
    /// One entry per line.
    Multiline {
        item_indent: String,
        /// Indentation of the closing bracket; `None` when it follows the last entry.
        close_indent: Option<String>,
        trailing_comma: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ModuleList {
    /// `imports: [`
    open: String,
    items: Vec<ListItem>,
    layout: Layout,
    raw: String,
    dirty: bool,
}

impl ModuleList {
    fn parse(open: &str, inner: &str, raw: &str) -> Self {
        let bytes = inner.as_bytes();
        let mut items = Vec::new();
        let mut trailing_comma = false;
        let mut depth = 0i32;
        let mut start = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'\'' | b'"' | b'`' => {
                    i = skip_string(bytes, i).unwrap_or(bytes.len());
                    continue;
                }
                b'/' if matches!(bytes.get(i + 1), Some(b'/' | b'*')) => {
                    let end = skip_comment(bytes, i);
                    if depth == 0 && inner[start..i].trim().is_empty() {
                        items.push(ListItem::Comment(inner[i..end].trim_end().to_string()));
                        start = end;
                    }
                    i = end;
                    continue;
                }
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth -= 1,
                b',' if depth == 0 => {
                    let text = inner[start..i].trim();
                    if !text.is_empty() {
                        items.push(ListItem::Entry(text.to_string()));
                        trailing_comma = true;
                    }
                    start = i + 1;
                }
                _ => {}
            }
            i += 1;
        }
        let rest = inner[start..].trim();
        if !rest.is_empty() {
            items.push(ListItem::Entry(rest.to_string()));
            trailing_comma = false;
        }

        let layout = if inner.contains('\n') {
            let close_indent = inner
                .rsplit_once('\n')
                .map(|(_, tail)| tail.trim_end_matches('\r'))
                .filter(|tail| tail.trim().is_empty())
                .map(str::to_string);
            let item_indent = inner
                .split('\n')
                .skip(1)
                .find(|line| !line.trim().is_empty())
                .map(|line| {
                    line[..line.len() - line.trim_start().len()].to_string()
                })
                .unwrap_or_else(|| format!("{}  ", close_indent.as_deref().unwrap_or("")));
            Layout::Multiline {
                item_indent,
                close_indent,
                trailing_comma,
            }
        } else {
            Layout::Inline
        };

        Self {
            open: open.to_string(),
            items,
            layout,
            raw: raw.to_string(),
            dirty: false,
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, ListItem::Entry(e) if e == name))
    }

    fn render(&self, newline: &str) -> String {
        if !self.dirty {
            return self.raw.clone();
        }
        let mut out = self.open.clone();
        match &self.layout {
            Layout::Inline => {
                let mut first = true;
                for item in &self.items {
                    match item {
                        ListItem::Entry(text) => {
                            if !first {
                                out.push_str(", ");
                            }
                            out.push_str(text);
                            first = false;
                        }
                        ListItem::Comment(text) => {
                            out.push_str(text);
                            out.push(' ');
                        }
                    }
                }
                out.push(']');
            }
            Layout::Multiline {
                item_indent,
                close_indent,
                trailing_comma,
            } => {
                let last_entry = self
                    .items
                    .iter()
                    .rposition(|item| matches!(item, ListItem::Entry(_)));
                for (index, item) in self.items.iter().enumerate() {
                    out.push_str(newline);
                    out.push_str(item_indent);
                    match item {
                        ListItem::Entry(text) => {
                            out.push_str(text);
                            if Some(index) != last_entry || *trailing_comma {
                                out.push(',');
                            }
                        }
                        ListItem::Comment(text) => out.push_str(text),
                    }
                }
                if let Some(indent) = close_indent {
                    out.push_str(newline);
                    out.push_str(indent);
                }
                out.push(']');
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Import(ImportStatement),
    ModuleList(ModuleList),
}

/// Index just past the string literal starting at `start`.
fn skip_string(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Index just past the comment starting at `start`. Line comments stop before the newline.
fn skip_comment(bytes: &[u8], start: usize) -> usize {
    if bytes.get(start + 1) == Some(&b'/') {
        bytes[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len(), |p| start + p)
    } else {
        bytes[start + 2..]
            .windows(2)
            .position(|w| w == b"*/")
            .map_or(bytes.len(), |p| start + 2 + p + 2)
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn is_import_start(rest: &[u8]) -> bool {
    rest.starts_with(b"import")
        && matches!(rest.get(6), Some(b' ' | b'\t' | b'{' | b'\'' | b'"'))
}

/// End of the import statement at `start`: past the module specifier and an optional `;`.
fn import_end(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = start + bytes[start..].iter().position(|&b| b == b'\'' || b == b'"')?;
    let end = skip_string(bytes, quote)?;
    Some(if bytes.get(end) == Some(&b';') { end + 1 } else { end })
}

/// If `imports` `:` `[` starts at `start`, the index just past the `[`.
fn module_list_open(bytes: &[u8], start: usize) -> Option<usize> {
    if !bytes[start..].starts_with(MODULE_LIST_KEY) {
        return None;
    }
    if start > 0 && (is_ident_byte(bytes[start - 1]) || bytes[start - 1] == b'.') {
        return None;
    }
    let mut i = start + MODULE_LIST_KEY.len();
    let skip_ws = |mut i: usize| {
        while bytes.get(i).is_some_and(|b| b.is_ascii_whitespace()) {
            i += 1;
        }
        i
    };
    i = skip_ws(i);
    if bytes.get(i) != Some(&b':') {
        return None;
    }
    i = skip_ws(i + 1);
    if bytes.get(i) != Some(&b'[') {
        return None;
    }
    Some(i + 1)
}

/// Index of the `]` closing the list whose contents start at `start`.
fn find_list_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0i32;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_string(bytes, i)?;
                continue;
            }
            b'/' if matches!(bytes.get(i + 1), Some(b'/' | b'*')) => {
                i = skip_comment(bytes, i);
                continue;
            }
            b'(' | b'[' | b'{' => depth += 1,
            b']' if depth == 0 => return Some(i),
            b')' | b']' | b'}' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    None
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if !text.is_empty() {
        segments.push(Segment::Text(text.to_string()));
    }
}

fn parse_segments(path: &Path, source: &str) -> Result<Vec<Segment>> {
    let bytes = source.as_bytes();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut list_found = false;
    let mut i = 0;

    while i < bytes.len() {
        let line_start = i == 0 || bytes[i - 1] == b'\n';
        if line_start && is_import_start(&bytes[i..]) {
            let end = import_end(bytes, i)
                .ok_or_else(|| LinkError::parse(path, "unterminated import statement"))?;
            push_text(&mut segments, &source[text_start..i]);
            segments.push(Segment::Import(ImportStatement::parse(&source[i..end])));
            i = end;
            text_start = end;
            continue;
        }
        if !list_found && let Some(open_end) = module_list_open(bytes, i) {
            let close = find_list_end(bytes, open_end)
                .ok_or_else(|| LinkError::parse(path, "unterminated `imports` array"))?;
            push_text(&mut segments, &source[text_start..i]);
            segments.push(Segment::ModuleList(ModuleList::parse(
                &source[i..open_end],
                &source[open_end..close],
                &source[i..=close],
            )));
            i = close + 1;
            text_start = i;
            list_found = true;
            continue;
        }
        match bytes[i] {
            b'\'' | b'"' | b'`' => i = skip_string(bytes, i).unwrap_or(bytes.len()),
            b'/' if matches!(bytes.get(i + 1), Some(b'/' | b'*')) => i = skip_comment(bytes, i),
            _ => i += 1,
        }
    }
    push_text(&mut segments, &source[text_start..]);
    Ok(segments)
}

/// The bootstrap file, parsed into editable segments.
#[derive(Debug, Clone)]
pub struct BootstrapFile {
    path: PathBuf,
    segments: Vec<Segment>,
    newline: &'static str,
}

impl BootstrapFile {
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        Self::parse(path, &content)
    }

    pub fn parse(path: &Path, source: &str) -> Result<Self> {
        let segments = parse_segments(path, source)?;
        debug!("Parsed {:?} into {} segments", path, segments.len());
        Ok(Self {
            path: path.to_path_buf(),
            segments,
            newline: if source.contains("\r\n") { "\r\n" } else { "\n" },
        })
    }

    fn module_list(&self) -> Option<&ModuleList> {
        self.segments.iter().find_map(|s| match s {
            Segment::ModuleList(list) => Some(list),
            _ => None,
        })
    }

    fn module_list_mut(&mut self) -> Option<&mut ModuleList> {
        self.segments.iter_mut().find_map(|s| match s {
            Segment::ModuleList(list) => Some(list),
            _ => None,
        })
    }

    /// Whether any import statement binds `name`, whatever its source.
    fn binds(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Import(statement) if statement.binds(name)))
    }

    /// Insert `import { name } from 'source';` after the last import statement,
    /// or at the top of the file. Returns false if `name` is already imported
    /// from any source; a second binding would not compile.
    pub fn add_import(&mut self, name: &str, source: &str) -> bool {
        if self.binds(name) {
            return false;
        }
        let statement = Segment::Import(ImportStatement::new(name, source));
        let line_break = Segment::Text(self.newline.to_string());
        match self
            .segments
            .iter()
            .rposition(|s| matches!(s, Segment::Import(_)))
        {
            Some(last) => {
                self.segments.insert(last + 1, line_break);
                self.segments.insert(last + 2, statement);
            }
            None => {
                self.segments.insert(0, statement);
                self.segments.insert(1, line_break);
            }
        }
        true
    }

    /// Remove `name` from the import of `source`. A statement importing other
    /// names too is kept without `name`. Returns false if nothing matched.
    pub fn remove_import(&mut self, name: &str, source: &str) -> bool {
        let Some(index) = self.segments.iter().position(|s| {
            matches!(s, Segment::Import(statement) if statement.source == source && statement.binds(name))
        }) else {
            return false;
        };

        if let Segment::Import(statement) = &mut self.segments[index]
            && statement.names.iter().any(|n| binding_name(n) != name)
        {
            statement.drop_name(name);
            return true;
        }

        self.segments.remove(index);
        // The line break that ended the statement goes with it
        let newline = self.newline;
        if let Some(Segment::Text(next)) = self.segments.get_mut(index)
            && next.starts_with(newline)
        {
            next.drain(..newline.len());
        }
        true
    }

    #[cfg(test)]
    fn has_module(&self, name: &str) -> bool {
        self.module_list().is_some_and(|list| list.contains(name))
    }

    /// Append `name` to the `imports` array. Returns false if already present.
    pub fn add_module(&mut self, name: &str) -> Result<bool> {
        let path = self.path.clone();
        let list = self
            .module_list_mut()
            .ok_or_else(|| LinkError::parse(path, "no `imports: [...]` array found"))?;
        if list.contains(name) {
            return Ok(false);
        }
        list.items.push(ListItem::Entry(name.to_string()));
        list.dirty = true;
        Ok(true)
    }

    /// Returns true if `name` was removed from the `imports` array.
    pub fn remove_module(&mut self, name: &str) -> bool {
        let Some(list) = self.module_list_mut() else {
            return false;
        };
        let before = list.items.len();
        list.items
            .retain(|item| !matches!(item, ListItem::Entry(e) if e == name));
        if list.items.len() == before {
            return false;
        }
        list.dirty = true;
        true
    }

    pub fn render(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.clone(),
                Segment::Import(statement) => statement.raw.clone(),
                Segment::ModuleList(list) => list.render(self.newline),
            })
            .collect()
    }

    pub fn save<R: Runtime>(&self, runtime: &R) -> Result<()> {
        write_atomic(runtime, &self.path, self.render().as_bytes())
            .with_context(|| format!("Failed to write {:?}", self.path))
    }
}

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::mem;
use std::path::Path;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::{FileInfo, Section};

const SEPARATOR: &str = "----------";

static FIELD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(Driver|File|RawFile|Link|Info|Version|Source|Licen[cs]e|Original licen[cs]e info(?:rmation)?):\s*(.*)$",
    )
    .expect("Invalid WHENCE field regex")
});
static FILE_VALUE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\S+)(?:\s+--\s+(.*))?").expect("Invalid WHENCE file value regex")
});

// Licence text is often laid out as a C comment; drop the comment markers.
static CONTINUATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[/ ]\*| \*/)?\s*(.*?)\s*$").expect("Invalid licence continuation regex")
});

#[derive(Debug, Error)]
pub enum WhenceError {
    #[error("line {line}: failed to read manifest")]
    Io {
        line: usize,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: Driver entry has no name")]
    MissingDriverName { line: usize },
    #[error("line {line}: {field} entry has no file name")]
    MissingFileName { line: usize, field: String },
    #[error("line {line}: Link entry '{value}' is not of the form '<name> -> <target>'")]
    MalformedLink { line: usize, value: String },
}

/// Binaries collected since the last blank line. They share the group's
/// sources and version.
#[derive(Default)]
struct FileGroup {
    binaries: Vec<(String, Option<String>)>,
    source: Vec<String>,
    version: Option<String>,
}

#[derive(Default)]
struct SectionBuilder {
    driver: Option<String>,
    licence: Option<String>,
    files: IndexMap<String, FileInfo>,
    links: IndexMap<String, String>,
    group: FileGroup,
}

impl SectionBuilder {
    fn end_group(&mut self) {
        let group = mem::take(&mut self.group);
        for (binary, description) in group.binaries {
            let info = FileInfo {
                binary: binary.clone(),
                description,
                source: group.source.clone(),
                version: group.version.clone(),
            };
            self.files.insert(binary, info);
        }
    }

    /// Emits the section, or nothing if no `Driver:` line was seen.
    fn finish(&mut self) -> Option<Section> {
        self.end_group();
        let builder = mem::take(self);
        let driver = builder.driver?;
        Some(Section {
            driver,
            licence: builder.licence.unwrap_or_default(),
            files: builder.files,
            links: builder.links,
        })
    }

    fn continue_licence(&mut self, line: &str) {
        if let Some(licence) = self.licence.as_mut() {
            let text = CONTINUATION_REGEX
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map_or("", |m| m.as_str());
            licence.push('\n');
            licence.push_str(text);
        }
    }
}

/// Streams [`Section`]s out of a `WHENCE` manifest in a single forward pass.
///
/// The reader stops after the first error.
pub struct WhenceReader<R> {
    input: R,
    line_no: usize,
    in_header: bool,
    finished: bool,
    current: SectionBuilder,
}

impl WhenceReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> WhenceReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            line_no: 0,
            in_header: true,
            finished: false,
            current: SectionBuilder::default(),
        }
    }

    fn process_line(&mut self, line: &str) -> Result<Option<Section>, WhenceError> {
        if line.starts_with(SEPARATOR) {
            if self.in_header {
                self.in_header = false;
                return Ok(None);
            }
            return Ok(self.current.finish());
        }
        if self.in_header {
            return Ok(None);
        }
        if line.is_empty() {
            self.current.end_group();
            return Ok(None);
        }

        let Some(caps) = FIELD_REGEX.captures(line) else {
            self.current.continue_licence(line);
            return Ok(None);
        };
        let keyword = caps.get(1).map_or("", |m| m.as_str());
        let value = caps.get(2).map_or("", |m| m.as_str()).trim_end();

        match keyword {
            "Driver" => {
                let name = value.split(' ').next().unwrap_or("");
                if name.is_empty() {
                    return Err(WhenceError::MissingDriverName { line: self.line_no });
                }
                self.current.driver = Some(name.to_lowercase());
            }
            "File" | "RawFile" => {
                let file = FILE_VALUE_REGEX.captures(value).ok_or_else(|| {
                    WhenceError::MissingFileName {
                        line: self.line_no,
                        field: keyword.to_string(),
                    }
                })?;
                let binary = file[1].to_string();
                let description = file.get(2).map(|m| m.as_str().to_string());
                self.current.group.binaries.push((binary, description));
            }
            "Link" => {
                let (name, target) = value
                    .split_once("->")
                    .map(|(name, target)| (name.trim(), target.trim()))
                    .filter(|(name, target)| !name.is_empty() && !target.is_empty())
                    .ok_or_else(|| WhenceError::MalformedLink {
                        line: self.line_no,
                        value: value.to_string(),
                    })?;
                self.current.links.insert(name.to_string(), target.to_string());
            }
            "Info" | "Version" => self.current.group.version = Some(value.to_string()),
            "Source" => self.current.group.source.push(value.to_string()),
            _ => self.current.licence = Some(value.to_string()),
        }
        Ok(None)
    }
}

impl<R: BufRead> Iterator for WhenceReader<R> {
    type Item = Result<Section, WhenceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut buf = String::new();
        loop {
            buf.clear();
            match self.input.read_line(&mut buf) {
                Ok(0) => {
                    self.finished = true;
                    return self.current.finish().map(Ok);
                }
                Ok(_) => self.line_no += 1,
                Err(source) => {
                    self.finished = true;
                    return Some(Err(WhenceError::Io {
                        line: self.line_no + 1,
                        source,
                    }));
                }
            }

            let line = buf.strip_suffix('\n').unwrap_or(&buf);
            let line = line.strip_suffix('\r').unwrap_or(line);
            match self.process_line(line) {
                Ok(Some(section)) => return Some(Ok(section)),
                Ok(None) => {}
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

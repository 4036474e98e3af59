#![allow(clippy::module_inception)]

use std::rc::Rc;

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod driver;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod module;
pub mod parser;
pub mod query;
pub mod resolver;
pub mod type_checker;

extern crate regex;

/// A byte offset into a named source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn null() -> Self {
        Span {
            start: Position::null(),
            end: Position::null(),
        }
    }

    /// An empty span at the very beginning of `file`.
    pub fn file_start(file: Rc<String>) -> Self {
        Span {
            start: Position(0, Rc::clone(&file)),
            end: Position(0, file),
        }
    }

    pub fn file(&self) -> &str {
        self.start.1.as_str()
    }

    /// Whether `offset` in `file` falls inside this span (end inclusive, so a
    /// cursor placed right after an identifier still hits it).
    pub fn contains(&self, file: &str, offset: u32) -> bool {
        self.file() == file && self.start.0 <= offset && offset <= self.end.0
    }
}

/// Finds the line containing byte offset `position`.
///
/// Returns the 1-based line number, the line text and the offset of
/// `position` within that line, or `None` when the offset lies past the end
/// of `content`.
pub fn get_line_at_position(content: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;

    if pos > content.len() {
        return None;
    }

    let mut start = 0;
    let mut line_number = 1;

    for line in content.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return Some((line_number, line.to_string(), pos - start));
        }

        start = end;
        line_number += 1;
    }

    // Offset sits at EOF, point just past the final line.
    let last = content.lines().last().unwrap_or("").to_string();
    let line_number = content.lines().count().max(1);
    let line_pos = last.len();
    Some((line_number, last, line_pos))
}

/// Renders a diagnostic against its source text.
///
/// ```text
/// Error: TypeMismatch (Expected type `int`, received `bool`)
/// -> main.mg
///    |
/// 20 | let a = 1 + true;
///    | --------^
/// ```
pub fn render_error(error: &Error, source: &str) -> String {
    let mut out = String::new();
    let position = error.get_position();

    if let ErrorTip::None = error.get_tip() {
        out.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        out.push_str(&format!(
            "Error: {} ({})\n",
            error.get_error_name(),
            error.get_tip()
        ));
    }
    out.push_str(&format!("-> {}\n", position.1));

    let Some((line, line_text, line_pos)) = get_line_at_position(source, position.0) else {
        out.push_str(&format!("   {}\n", error));
        return out;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    out.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    out.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;
    out.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));

    out
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count();

    (String::from(&string[start..]), start)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::errors::errors::{Error, ErrorImpl};
    use crate::{Position, Span};

    const SOURCE: &str = "Hello, world!\nfoo\nbar\n    Testing { }\n";

    #[test]
    fn test_get_line_at_position() {
        let (line_number, line, line_pos) = super::get_line_at_position(SOURCE, 10).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line, "Hello, world!\n");
        assert_eq!(line_pos, 10);

        let (line_number, line, line_pos) = super::get_line_at_position(SOURCE, 34).unwrap();
        assert_eq!(line_number, 4);
        assert_eq!(line, "    Testing { }\n");
        assert_eq!(line_pos, 12);
    }

    #[test]
    fn test_get_line_past_end() {
        assert!(super::get_line_at_position(SOURCE, 500).is_none());
    }

    #[test]
    fn test_render_error_points_at_offset() {
        let file = Rc::new(String::from("main.mg"));
        let source = "fn main() {\n    let a = #;\n}\n";
        let error = Error::new(
            ErrorImpl::UnrecognisedToken {
                token: String::from("#"),
            },
            Span {
                start: Position(24, Rc::clone(&file)),
                end: Position(25, file),
            },
        );

        let rendered = super::render_error(&error, source);
        assert!(rendered.contains("Error: UnrecognisedToken"));
        assert!(rendered.contains("-> main.mg"));
        assert!(rendered.contains("2 | let a = #;"));
        assert!(rendered.contains("| --------^"));
    }

    #[test]
    fn test_span_contains() {
        let file = Rc::new(String::from("a.mg"));
        let span = Span {
            start: Position(4, Rc::clone(&file)),
            end: Position(8, file),
        };
        assert!(span.contains("a.mg", 4));
        assert!(span.contains("a.mg", 8));
        assert!(!span.contains("a.mg", 9));
        assert!(!span.contains("b.mg", 5));
    }
}

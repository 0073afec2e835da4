//! Named parameter support on top of positional (`?`) drivers.
//!
//! Rewrites `:name` placeholders into positional markers and reports the names in the
//! order the markers appear, so a name-keyed parameter bag can be turned into the value
//! array the driver expects.
//!
//! The scan is a single left-to-right pass. Nothing is rewritten inside single-quoted
//! literals, double-quoted identifiers, `/* */` comments or `--` comments. Inside an
//! `EXECUTE BLOCK`, names declared as input parameters, `RETURNS` columns,
//! `DECLARE [VARIABLE]` locals or sub-routine parameters are PSQL variables once
//! declared: a default value in the declaration list (`ID INTEGER = :ID`) is still bound
//! by the caller, but `:ID` inside the block body is left untouched. The bodies of
//! `CREATE [OR ALTER] | RECREATE | ALTER` `PROCEDURE`, `FUNCTION` and `TRIGGER`
//! statements are scoped the same way.
//!
//! ```
//! use fbnamedsql::named_params::parse;
//!
//! let parsed = parse("SELECT :id FROM t WHERE id = :id");
//! assert_eq!(parsed.sql_stmt, "SELECT ? FROM t WHERE id = ?");
//! assert_eq!(parsed.param_names, Some(vec!["id".to_string(), "id".to_string()]));
//! ```

use crate::str_utils::{is_ident_char, is_ident_start, is_keyword};
use std::collections::HashSet;

/// Result of rewriting a SQL template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSql {
    /// The SQL with true placeholders replaced by positional markers
    pub sql_stmt: String,
    /// Placeholder names in marker order, `None` when nothing was rewritten
    pub param_names: Option<Vec<String>>,
}

impl ParsedSql {
    /// Parameter names as a slice, empty when the statement has no placeholders
    pub fn names(&self) -> &[String] {
        self.param_names.as_deref().unwrap_or(&[])
    }

    /// Number of positional markers in the rewritten statement
    pub fn marker_count(&self) -> usize {
        self.names().len()
    }
}

/// Lexical zone of the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Normal,
    InString,
    InQuotedIdent,
    InBlockComment,
    InLineComment,
}

/// Where the scanner stands relative to a PSQL block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockScope {
    Outside,
    /// `EXECUTE` seen, `BLOCK` must follow
    SawExecute,
    /// `CREATE`, `RECREATE` or `ALTER` seen, a routine kind may follow
    SawCreate,
    /// Between the block or routine keyword and `AS`
    Header,
    /// Inside the input parameter list or the `RETURNS` column list
    ParamDecl {
        depth: usize,
        expect_name: bool,
        returns: bool,
    },
    /// `RETURNS` seen, waiting for its column list
    ExpectReturns,
    /// After `AS`; `depth` counts open `BEGIN`/`CASE` against `END`
    Body {
        depth: usize,
        decl: BodyDecl,
        /// Inside a `DECLARE PROCEDURE`/`DECLARE FUNCTION` sub-routine
        routine: bool,
    },
}

/// Declaration being read inside a block body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyDecl {
    Idle,
    /// `DECLARE` seen
    Declare,
    /// `DECLARE PROCEDURE`/`DECLARE FUNCTION` seen, the routine name follows
    RoutineName,
    /// Sub-routine header up to its own `AS`
    RoutineHeader { paren: usize, expect_name: bool },
}

const BODY_START: BlockScope = BlockScope::Body {
    depth: 0,
    decl: BodyDecl::Idle,
    routine: false,
};

struct Scanner<'a, F> {
    chars: Vec<char>,
    pos: usize,
    zone: Zone,
    scope: BlockScope,
    locals: HashSet<String>,
    out: String,
    names: Vec<String>,
    marker: &'a F,
}

/// Rewrite `:name` placeholders into `?` markers
pub fn parse(sql: &str) -> ParsedSql {
    parse_with(sql, &|_: usize| "?".to_string())
}

/// Rewrite `:name` placeholders using `marker` to render each positional marker.
/// The marker function receives the 1-based position of the placeholder.
pub fn parse_with<F>(sql: &str, marker: &F) -> ParsedSql
where
    F: Fn(usize) -> String,
{
    let mut scanner = Scanner {
        chars: sql.chars().collect(),
        pos: 0,
        zone: Zone::Normal,
        scope: BlockScope::Outside,
        locals: HashSet::new(),
        out: String::with_capacity(sql.len()),
        names: Vec::new(),
        marker,
    };
    scanner.run();

    if scanner.names.is_empty() {
        return ParsedSql {
            sql_stmt: sql.to_string(),
            param_names: None,
        };
    }

    tracing::debug!(
        placeholders = scanner.names.len(),
        "rewrote named parameters to positional markers"
    );
    ParsedSql {
        sql_stmt: scanner.out,
        param_names: Some(scanner.names),
    }
}

impl<F> Scanner<'_, F>
where
    F: Fn(usize) -> String,
{
    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn emit_char(&mut self) {
        self.out.push(self.chars[self.pos]);
        self.pos += 1;
    }

    fn run(&mut self) {
        while self.pos < self.chars.len() {
            match self.zone {
                Zone::Normal => self.scan_normal(),
                Zone::InString => self.scan_quoted('\''),
                Zone::InQuotedIdent => self.scan_quoted('"'),
                Zone::InBlockComment => self.scan_block_comment(),
                Zone::InLineComment => self.scan_line_comment(),
            }
        }
    }

    fn scan_normal(&mut self) {
        let ch = self.chars[self.pos];
        match ch {
            '\'' => {
                self.leave_pending_keyword();
                self.zone = Zone::InString;
                self.emit_char();
            }
            '"' => {
                self.leave_pending_keyword();
                self.zone = Zone::InQuotedIdent;
                self.emit_char();
            }
            '/' if self.peek(1) == Some('*') => {
                self.zone = Zone::InBlockComment;
                self.emit_char();
                self.emit_char();
            }
            '-' if self.peek(1) == Some('-') => {
                self.zone = Zone::InLineComment;
                self.emit_char();
                self.emit_char();
            }
            ':' if self.peek(1) == Some(':') => {
                self.leave_pending_keyword();
                self.emit_char();
                self.emit_char();
            }
            ':' if self.peek(1).is_some_and(is_ident_start) => self.scan_placeholder(),
            c if is_ident_char(c) => self.scan_word(),
            c if c.is_whitespace() => self.emit_char(),
            c => {
                self.on_punctuation(c);
                self.emit_char();
            }
        }
    }

    /// Single-quoted literal or double-quoted identifier; a doubled delimiter is an escape
    fn scan_quoted(&mut self, delim: char) {
        if self.chars[self.pos] == delim {
            if self.peek(1) == Some(delim) {
                self.emit_char();
                self.emit_char();
                return;
            }
            self.zone = Zone::Normal;
        }
        self.emit_char();
    }

    fn scan_block_comment(&mut self) {
        if self.chars[self.pos] == '*' && self.peek(1) == Some('/') {
            self.emit_char();
            self.emit_char();
            self.zone = Zone::Normal;
        } else {
            self.emit_char();
        }
    }

    fn scan_line_comment(&mut self) {
        if self.chars[self.pos] == '\n' {
            self.zone = Zone::Normal;
        }
        self.emit_char();
    }

    fn take_ident(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.chars.len() && is_ident_char(self.chars[self.pos]) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn scan_placeholder(&mut self) {
        self.leave_pending_keyword();
        let colon = self.pos;
        self.pos += 1;
        let name = self.take_ident();

        let is_local = matches!(self.scope, BlockScope::Body { .. })
            && self.locals.contains(&name.to_ascii_uppercase());
        if is_local {
            tracing::trace!(name = %name, "left PSQL local reference in place");
            self.out.extend(&self.chars[colon..self.pos]);
            return;
        }

        self.names.push(name);
        let marker = (self.marker)(self.names.len());
        self.out.push_str(&marker);
    }

    fn scan_word(&mut self) {
        let word = self.take_ident();
        self.on_word(&word);
        self.out.push_str(&word);
    }

    fn declare_local(&mut self, name: &str) {
        self.locals.insert(name.to_ascii_uppercase());
    }

    /// `EXECUTE` and `CREATE` only open a block when the very next token says so
    fn leave_pending_keyword(&mut self) {
        if matches!(self.scope, BlockScope::SawExecute | BlockScope::SawCreate) {
            self.scope = BlockScope::Outside;
        }
    }

    fn on_word(&mut self, word: &str) {
        let scope = self.scope;
        self.scope = match scope {
            BlockScope::Outside | BlockScope::SawExecute | BlockScope::SawCreate => {
                Self::on_statement_word(scope, word)
            }
            BlockScope::Header | BlockScope::ExpectReturns => {
                if is_keyword(word, "RETURNS") {
                    BlockScope::ExpectReturns
                } else if is_keyword(word, "AS") {
                    BODY_START
                } else {
                    scope
                }
            }
            BlockScope::ParamDecl {
                depth,
                expect_name,
                returns,
            } => {
                if expect_name && depth == 1 {
                    tracing::trace!(name = %word, returns, "declared block parameter");
                    self.declare_local(word);
                }
                BlockScope::ParamDecl {
                    depth,
                    expect_name: expect_name && depth != 1,
                    returns,
                }
            }
            BlockScope::Body {
                depth,
                decl,
                routine,
            } => self.on_body_word(word, depth, decl, routine),
        };
    }

    /// Words that may open a PSQL block: `EXECUTE BLOCK` and routine DDL
    fn on_statement_word(scope: BlockScope, word: &str) -> BlockScope {
        let routine_kind = ["PROCEDURE", "FUNCTION", "TRIGGER"]
            .iter()
            .any(|kind| is_keyword(word, kind));

        if is_keyword(word, "EXECUTE") {
            BlockScope::SawExecute
        } else if scope == BlockScope::SawExecute && is_keyword(word, "BLOCK") {
            BlockScope::Header
        } else if ["CREATE", "RECREATE", "ALTER"]
            .iter()
            .any(|kw| is_keyword(word, kw))
        {
            BlockScope::SawCreate
        } else if scope == BlockScope::SawCreate && is_keyword(word, "OR") {
            BlockScope::SawCreate
        } else if scope == BlockScope::SawCreate && routine_kind {
            BlockScope::Header
        } else {
            BlockScope::Outside
        }
    }

    fn on_body_word(
        &mut self,
        word: &str,
        depth: usize,
        decl: BodyDecl,
        routine: bool,
    ) -> BlockScope {
        let body = |depth, decl, routine| BlockScope::Body {
            depth,
            decl,
            routine,
        };

        match decl {
            BodyDecl::Declare => {
                if is_keyword(word, "VARIABLE") {
                    body(depth, BodyDecl::Declare, routine)
                } else if is_keyword(word, "PROCEDURE") || is_keyword(word, "FUNCTION") {
                    body(depth, BodyDecl::RoutineName, true)
                } else {
                    self.declare_local(word);
                    body(depth, BodyDecl::Idle, routine)
                }
            }
            BodyDecl::RoutineName => {
                tracing::trace!(name = %word, "declared sub-routine");
                body(
                    depth,
                    BodyDecl::RoutineHeader {
                        paren: 0,
                        expect_name: false,
                    },
                    routine,
                )
            }
            BodyDecl::RoutineHeader { paren, expect_name } => {
                if paren == 0 && is_keyword(word, "AS") {
                    return body(depth, BodyDecl::Idle, routine);
                }
                if paren == 1 && expect_name {
                    self.declare_local(word);
                }
                body(
                    depth,
                    BodyDecl::RoutineHeader {
                        paren,
                        expect_name: expect_name && paren != 1,
                    },
                    routine,
                )
            }
            BodyDecl::Idle => {
                if is_keyword(word, "DECLARE") {
                    body(depth, BodyDecl::Declare, routine)
                } else if is_keyword(word, "BEGIN") || is_keyword(word, "CASE") {
                    body(depth + 1, BodyDecl::Idle, routine)
                } else if is_keyword(word, "END") && depth > 0 {
                    match (depth - 1, routine) {
                        // a sub-routine ends, the enclosing block goes on
                        (0, true) => body(0, BodyDecl::Idle, false),
                        (0, false) => {
                            tracing::trace!(locals = self.locals.len(), "closed PSQL block scope");
                            self.locals.clear();
                            BlockScope::Outside
                        }
                        (depth, _) => body(depth, BodyDecl::Idle, routine),
                    }
                } else {
                    body(depth, decl, routine)
                }
            }
        }
    }

    fn on_punctuation(&mut self, ch: char) {
        let scope = self.scope;
        self.scope = match (scope, ch) {
            (BlockScope::SawExecute | BlockScope::SawCreate, _) => BlockScope::Outside,
            (BlockScope::Header, ';') => BlockScope::Outside,
            (BlockScope::Header, '(') => BlockScope::ParamDecl {
                depth: 1,
                expect_name: true,
                returns: false,
            },
            (BlockScope::ExpectReturns, '(') => BlockScope::ParamDecl {
                depth: 1,
                expect_name: true,
                returns: true,
            },
            (
                BlockScope::ParamDecl {
                    depth,
                    expect_name,
                    returns,
                },
                _,
            ) => match ch {
                '(' => BlockScope::ParamDecl {
                    depth: depth + 1,
                    expect_name,
                    returns,
                },
                ')' if depth == 1 => BlockScope::Header,
                ')' => BlockScope::ParamDecl {
                    depth: depth - 1,
                    expect_name,
                    returns,
                },
                ',' if depth == 1 => BlockScope::ParamDecl {
                    depth,
                    expect_name: true,
                    returns,
                },
                _ => scope,
            },
            (
                BlockScope::Body {
                    depth,
                    decl: BodyDecl::RoutineHeader { paren, expect_name },
                    routine,
                },
                _,
            ) => {
                let (paren, expect_name) = match ch {
                    '(' => (paren + 1, paren == 0 || expect_name),
                    ')' => (paren.saturating_sub(1), expect_name),
                    ',' if paren == 1 => (paren, true),
                    _ => (paren, expect_name),
                };
                BlockScope::Body {
                    depth,
                    decl: BodyDecl::RoutineHeader { paren, expect_name },
                    routine,
                }
            }
            _ => scope,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dollar_markers_are_numbered() {
        let parsed = parse_with("SELECT :a, :b, :a", &|idx| format!("${idx}"));
        assert_eq!(parsed.sql_stmt, "SELECT $1, $2, $3");
        assert_eq!(parsed.names(), ["a", "b", "a"]);
    }

    #[test]
    fn test_execute_without_block_is_plain_sql() {
        let parsed = parse("EXECUTE PROCEDURE p(:x)");
        assert_eq!(parsed.sql_stmt, "EXECUTE PROCEDURE p(?)");
        assert_eq!(parsed.names(), ["x"]);
    }

    #[test]
    fn test_double_colon_is_not_a_placeholder() {
        let parsed = parse("SELECT a::int FROM t WHERE b = :b");
        assert_eq!(parsed.sql_stmt, "SELECT a::int FROM t WHERE b = ?");
        assert_eq!(parsed.marker_count(), 1);
    }

    #[test]
    fn test_returns_list_without_inputs() {
        let sql = "EXECUTE BLOCK RETURNS (N INTEGER) AS BEGIN SELECT COUNT(*) FROM t WHERE x = :x INTO :N; SUSPEND; END";
        let parsed = parse(sql);
        assert_eq!(
            parsed.sql_stmt,
            "EXECUTE BLOCK RETURNS (N INTEGER) AS BEGIN SELECT COUNT(*) FROM t WHERE x = ? INTO :N; SUSPEND; END"
        );
        assert_eq!(parsed.names(), ["x"]);
    }
}

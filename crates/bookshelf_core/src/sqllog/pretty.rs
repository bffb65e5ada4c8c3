//! Clause-oriented SQL pretty printer.
//!
//! # Responsibility
//! - Re-flow a single SQL statement into indented, clause-per-line text for
//!   human-readable logs.
//!
//! # Invariants
//! - Output always starts with a newline and one indent unit.
//! - Quoted literals (`'..'`, `".."`, `[..]`) are copied through verbatim.
//! - The printer never fails; malformed SQL yields best-effort layout.

const INDENT: &str = "    ";
const LINE_SEPARATOR: &str = "\n";
const WHITESPACE: &[char] = &[' ', '\n', '\r', '\x0c', '\t'];
const DELIMITERS: &[char] = &[
    '(', ')', '+', '*', '/', '-', '=', '<', '>', '\'', '`', '"', '[', ']', ',', ' ', '\n', '\r',
    '\x0c', '\t',
];

const BEGIN_CLAUSES: &[&str] = &["left", "right", "inner", "outer", "group", "order"];
const END_CLAUSES: &[&str] = &[
    "where", "set", "having", "join", "from", "by", "into", "union",
];
const LOGICAL: &[&str] = &["and", "or", "when", "else", "end"];
const QUANTIFIERS: &[&str] = &["in", "all", "exists", "some", "any"];
const DML: &[&str] = &["insert", "update", "delete"];
const MISC: &[&str] = &["select", "on"];

/// Formats `sql` into a multi-line, clause-indented layout.
pub fn pretty_sql(sql: &str) -> String {
    FormatProcess::new(sql).perform()
}

fn tokenize(sql: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    for (idx, ch) in sql.char_indices() {
        if DELIMITERS.contains(&ch) {
            if start < idx {
                tokens.push(&sql[start..idx]);
            }
            let end = idx + ch.len_utf8();
            tokens.push(&sql[idx..end]);
            start = end;
        }
    }
    if start < sql.len() {
        tokens.push(&sql[start..]);
    }
    tokens
}

fn is_whitespace(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(ch), None) if WHITESPACE.contains(&ch))
}

fn is_function_name(token: Option<&str>) -> bool {
    let Some(token) = token else {
        return false;
    };
    let Some(first) = token.chars().next() else {
        return false;
    };
    let identifier_like = first.is_alphabetic() || first == '_' || first == '$' || first == '"';
    identifier_like
        && !LOGICAL.contains(&token)
        && !END_CLAUSES.contains(&token)
        && !QUANTIFIERS.contains(&token)
        && !DML.contains(&token)
        && !MISC.contains(&token)
}

struct FormatProcess<'a> {
    tokens: std::vec::IntoIter<&'a str>,
    result: String,
    indent: i32,
    begin_line: bool,
    after_begin_before_end: bool,
    after_by_or_set_or_from_or_select: bool,
    after_on: bool,
    after_between: bool,
    after_insert: bool,
    in_function: u32,
    parens_since_select: i32,
    paren_counts: Vec<i32>,
    after_by_or_from_selects: Vec<bool>,
    last_token: Option<String>,
    token: String,
    lc_token: String,
}

impl<'a> FormatProcess<'a> {
    fn new(sql: &'a str) -> Self {
        Self {
            tokens: tokenize(sql).into_iter(),
            result: String::with_capacity(sql.len() * 2),
            indent: 1,
            begin_line: true,
            after_begin_before_end: false,
            after_by_or_set_or_from_or_select: false,
            after_on: false,
            after_between: false,
            after_insert: false,
            in_function: 0,
            parens_since_select: 0,
            paren_counts: Vec::new(),
            after_by_or_from_selects: Vec::new(),
            last_token: None,
            token: String::new(),
            lc_token: String::new(),
        }
    }

    fn perform(mut self) -> String {
        self.result.push_str(LINE_SEPARATOR);
        self.result.push_str(INDENT);

        while let Some(next) = self.tokens.next() {
            self.token = next.to_string();
            self.lc_token = next.to_lowercase();

            match next {
                "'" => self.glue_until("'"),
                "\"" => self.glue_until("\""),
                "[" => self.glue_until("]"),
                _ => {}
            }

            let lc = self.lc_token.clone();
            let lc = lc.as_str();
            if self.after_by_or_set_or_from_or_select && self.token == "," {
                self.comma_after_by_or_from_or_select();
            } else if self.after_on && self.token == "," {
                self.comma_after_on();
            } else if self.token == "(" {
                self.open_paren();
            } else if self.token == ")" {
                self.close_paren();
            } else if BEGIN_CLAUSES.contains(&lc) {
                self.begin_new_clause();
            } else if END_CLAUSES.contains(&lc) {
                self.end_new_clause();
            } else if lc == "select" {
                self.select();
            } else if DML.contains(&lc) {
                self.update_or_insert_or_delete();
            } else if lc == "values" {
                self.values();
            } else if lc == "on" {
                self.on();
            } else if self.after_between && lc == "and" {
                self.misc();
                self.after_between = false;
            } else if LOGICAL.contains(&lc) {
                self.logical();
            } else if is_whitespace(&self.token) {
                self.white();
            } else {
                self.misc();
            }

            if !is_whitespace(&self.token) {
                self.last_token = Some(self.lc_token.clone());
            }
        }

        self.result
    }

    /// Appends tokens to the current one until `close` (inclusive) or input end.
    fn glue_until(&mut self, close: &str) {
        for next in self.tokens.by_ref() {
            self.token.push_str(next);
            if next == close {
                break;
            }
        }
    }

    fn comma_after_on(&mut self) {
        self.out();
        self.indent -= 1;
        self.newline();
        self.after_on = false;
        self.after_by_or_set_or_from_or_select = true;
    }

    fn comma_after_by_or_from_or_select(&mut self) {
        self.out();
        self.newline();
    }

    fn logical(&mut self) {
        if self.lc_token == "end" {
            self.indent -= 1;
        }
        self.newline();
        self.out();
        self.begin_line = false;
    }

    fn on(&mut self) {
        self.indent += 1;
        self.after_on = true;
        self.newline();
        self.out();
        self.begin_line = false;
    }

    fn misc(&mut self) {
        self.out();
        if self.lc_token == "between" {
            self.after_between = true;
        }
        if self.after_insert {
            self.newline();
            self.after_insert = false;
        } else {
            self.begin_line = false;
            if self.lc_token == "case" {
                self.indent += 1;
            }
        }
    }

    fn white(&mut self) {
        if !self.begin_line {
            self.result.push(' ');
        }
    }

    fn update_or_insert_or_delete(&mut self) {
        self.out();
        self.indent += 1;
        self.begin_line = false;
        if self.lc_token == "update" {
            self.newline();
        }
        if self.lc_token == "insert" {
            self.after_insert = true;
        }
    }

    fn select(&mut self) {
        self.out();
        self.indent += 1;
        self.newline();
        self.paren_counts.push(self.parens_since_select);
        self.after_by_or_from_selects
            .push(self.after_by_or_set_or_from_or_select);
        self.parens_since_select = 0;
        self.after_by_or_set_or_from_or_select = true;
    }

    fn end_new_clause(&mut self) {
        if !self.after_begin_before_end {
            self.indent -= 1;
            if self.after_on {
                self.indent -= 1;
                self.after_on = false;
            }
            self.newline();
        }
        self.out();
        if self.lc_token != "union" {
            self.indent += 1;
        }
        self.newline();
        self.after_begin_before_end = false;
        self.after_by_or_set_or_from_or_select =
            matches!(self.lc_token.as_str(), "by" | "set" | "from");
    }

    fn begin_new_clause(&mut self) {
        if !self.after_begin_before_end {
            if self.after_on {
                self.indent -= 1;
                self.after_on = false;
            }
            self.indent -= 1;
            self.newline();
        }
        self.out();
        self.begin_line = false;
        self.after_begin_before_end = true;
    }

    fn values(&mut self) {
        self.indent -= 1;
        self.newline();
        self.out();
        self.indent += 1;
        self.newline();
    }

    fn close_paren(&mut self) {
        self.parens_since_select -= 1;
        if self.parens_since_select < 0 {
            self.indent -= 1;
            self.parens_since_select = self.paren_counts.pop().unwrap_or(0);
            self.after_by_or_set_or_from_or_select =
                self.after_by_or_from_selects.pop().unwrap_or(false);
        }
        if self.in_function > 0 {
            self.in_function -= 1;
            self.out();
        } else {
            if !self.after_by_or_set_or_from_or_select {
                self.indent -= 1;
                self.newline();
            }
            self.out();
        }
        self.begin_line = false;
    }

    fn open_paren(&mut self) {
        if is_function_name(self.last_token.as_deref()) || self.in_function > 0 {
            self.in_function += 1;
        }
        self.begin_line = false;
        self.out();
        if self.in_function == 0 && !self.after_by_or_set_or_from_or_select {
            self.indent += 1;
            self.newline();
            self.begin_line = true;
        }
        self.parens_since_select += 1;
    }

    fn out(&mut self) {
        self.result.push_str(&self.token);
    }

    fn newline(&mut self) {
        self.result.push_str(LINE_SEPARATOR);
        for _ in 0..self.indent.max(0) {
            self.result.push_str(INDENT);
        }
        self.begin_line = true;
    }
}

#[cfg(test)]
mod tests {
    use super::{is_function_name, pretty_sql, tokenize};

    #[test]
    fn tokenize_keeps_delimiters_as_tokens() {
        assert_eq!(tokenize("a=b, c"), vec!["a", "=", "b", ",", " ", "c"]);
    }

    #[test]
    fn function_names_exclude_keywords() {
        assert!(is_function_name(Some("count")));
        assert!(is_function_name(Some("books")));
        assert!(!is_function_name(Some("in")));
        assert!(is_function_name(Some("values")));
        assert!(!is_function_name(Some("(")));
        assert!(!is_function_name(None));
    }

    #[test]
    fn select_puts_each_clause_on_its_own_line() {
        let formatted = pretty_sql("select id, name from books where author = ?1 order by id");
        assert_eq!(
            formatted,
            "\n    select\n        id,\n        name \n    from\n        books \n    where\n        author = ?1 \n    order by\n        id"
        );
    }

    #[test]
    fn quoted_literals_are_not_reflowed() {
        let formatted = pretty_sql("select * from books where name = 'select from where'");
        assert!(formatted.contains("'select from where'"));
    }

    #[test]
    fn unbalanced_parens_do_not_panic() {
        let formatted = pretty_sql("delete from books where id in (1, 2))) and (");
        assert!(formatted.starts_with("\n    delete"));
    }
}

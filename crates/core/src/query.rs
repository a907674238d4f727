//! Structured SELECT model
//!
//! Queries are parsed once into a [`SelectQuery`] and rewritten as data:
//! projections are swapped, predicates are appended, and the result is
//! rendered back to text for the store. Nothing splices strings into the
//! caller's command text.
//!
//! Accepted shape:
//!
//! ```text
//! SELECT [TOP n] [VALUE] [:::]<projection>
//! FROM <source> [[AS] <alias>]
//! [WHERE <condition>]
//! [ORDER BY <path> [ASC|DESC], ...]
//! ```
//!
//! Keywords are matched case-insensitively, at parenthesis depth 0 and
//! outside string literals. The `:::` marker in front of the projection is
//! accepted and discarded.
//!
//! A top-level condition made only of `AND`-joined comparisons and `IN`
//! lists is decomposed into [`Predicate`]s. Anything else (an `OR`, a
//! function call, `BETWEEN`) is kept verbatim as [`Predicate::Raw`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Marker that may precede the projection of a paged SELECT.
pub const PROJECTION_MARKER: &str = ":::";

/// What a SELECT returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    /// `*`
    All,
    /// Comma separated field expressions, e.g. `r.Name, r.Email AS mail`
    Fields(Vec<String>),
    /// `VALUE <expr>`
    Value(String),
    /// `VALUE COUNT(1)`
    Count,
}

/// Comparison operator of a [`Predicate::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=` or `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    fn parse(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(CompareOp::Eq),
            "!=" | "<>" => Some(CompareOp::Ne),
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Le),
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::Ge),
            _ => None,
        }
    }

    /// The operator as written in query text.
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// Right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    /// Bind parameter, stored with its leading `@`
    Param(String),
    /// Inline literal
    Literal(serde_json::Value),
}

impl Operand {
    /// Parameter operand from a name with or without `@`.
    pub fn param(name: &str) -> Self {
        Operand::Param(crate::parameter::bind_name(name))
    }

    /// String literal operand.
    pub fn text(value: impl Into<String>) -> Self {
        Operand::Literal(serde_json::Value::String(value.into()))
    }

    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(name) = text.strip_prefix('@') {
            if !name.is_empty() && name.chars().all(is_ident_char) {
                return Some(Operand::Param(text.to_string()));
            }
            return None;
        }
        if let Some(literal) = parse_string_literal(text) {
            return Some(Operand::Literal(serde_json::Value::String(literal)));
        }
        match text.to_ascii_lowercase().as_str() {
            "true" => return Some(Operand::Literal(serde_json::Value::Bool(true))),
            "false" => return Some(Operand::Literal(serde_json::Value::Bool(false))),
            "null" => return Some(Operand::Literal(serde_json::Value::Null)),
            _ => {}
        }
        if let Ok(i) = text.parse::<i64>() {
            return Some(Operand::Literal(serde_json::Value::from(i)));
        }
        if let Ok(f) = text.parse::<f64>() {
            if f.is_finite() {
                return Some(Operand::Literal(serde_json::Value::from(f)));
            }
        }
        None
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Param(name) => write!(f, "{}", name),
            Operand::Literal(serde_json::Value::String(s)) => write!(f, "{}", quote(s)),
            Operand::Literal(other) => write!(f, "{}", other),
        }
    }
}

/// One conjunct of a WHERE clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// `<path> <op> <operand>`
    Compare {
        /// Qualified path, e.g. `r.Name`
        path: String,
        /// Operator
        op: CompareOp,
        /// Right-hand side
        operand: Operand,
    },
    /// `<path> IN (<operand>, ...)`
    In {
        /// Qualified path
        path: String,
        /// Candidate values
        values: Vec<Operand>,
    },
    /// Condition text kept verbatim
    Raw(String),
}

impl Predicate {
    /// `<path> = @<param>`
    pub fn eq_param(path: impl Into<String>, param: &str) -> Self {
        Predicate::Compare {
            path: path.into(),
            op: CompareOp::Eq,
            operand: Operand::param(param),
        }
    }

    fn parse(text: &str) -> Self {
        Self::parse_structured(text).unwrap_or_else(|| Predicate::Raw(text.trim().to_string()))
    }

    fn parse_structured(text: &str) -> Option<Self> {
        let tokens = lex(text).ok()?;
        let first = tokens.first()?;
        if first.kind != TokenKind::Word || !is_path(first.slice(text)) {
            return None;
        }
        let path = first.slice(text).to_string();
        let second = tokens.get(1)?;

        if second.is_word(text, "IN") {
            let open = tokens.get(2)?;
            let close = tokens.last()?;
            if !open.is_symbol(text, '(') || !close.is_symbol(text, ')') || close.depth != 0 {
                return None;
            }
            let inner = &text[open.end..close.start];
            let values = split_top_level_commas(inner)?
                .into_iter()
                .map(Operand::parse)
                .collect::<Option<Vec<_>>>()?;
            return Some(Predicate::In { path, values });
        }

        // Operator symbols are adjacent single-character tokens
        let mut op_end = 1;
        let mut symbol = String::new();
        while let Some(token) = tokens.get(op_end) {
            let s = token.slice(text);
            let adjacent = op_end == 1 || tokens[op_end - 1].end == token.start;
            if token.kind == TokenKind::Symbol && adjacent && matches!(s, "=" | "<" | ">" | "!") {
                symbol.push_str(s);
                op_end += 1;
            } else {
                break;
            }
        }
        let op = CompareOp::parse(&symbol)?;
        let rest = &text[tokens.get(op_end)?.start..];
        let operand = Operand::parse(rest)?;
        Some(Predicate::Compare { path, op, operand })
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare { path, op, operand } => {
                write!(f, "{} {} {}", path, op.as_str(), operand)
            }
            Predicate::In { path, values } => {
                let list: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{} IN ({})", path, list.join(", "))
            }
            Predicate::Raw(text) => write!(f, "({})", text),
        }
    }
}

/// One `ORDER BY` item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Qualified path
    pub path: String,
    /// `DESC` when true
    pub descending: bool,
}

/// A parsed SELECT statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectQuery {
    /// `TOP n`
    pub top: Option<u64>,
    /// Projection
    pub projection: Projection,
    /// Collection or root name after `FROM`
    pub source: String,
    /// Root alias, when one is given
    pub alias: Option<String>,
    /// Conjunctive filter
    pub filter: Vec<Predicate>,
    /// Ordering
    pub order_by: Vec<OrderItem>,
}

impl SelectQuery {
    /// Minimal `SELECT * FROM <source> <alias>`.
    pub fn from_source(source: impl Into<String>, alias: Option<&str>) -> Self {
        Self {
            top: None,
            projection: Projection::All,
            source: source.into(),
            alias: alias.map(str::to_string),
            filter: Vec::new(),
            order_by: Vec::new(),
        }
    }

    /// Parse SELECT text.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Syntax`] when the text is not a SELECT of the
    /// accepted shape.
    pub fn parse(text: &str) -> Result<Self, QueryError> {
        let text = text.trim().trim_end_matches(';').trim_end();
        let tokens = lex(text)?;

        let select = tokens
            .first()
            .filter(|t| t.is_word(text, "SELECT"))
            .ok_or_else(|| QueryError::syntax("statement does not start with SELECT"))?;
        let from = find_top_word(&tokens, text, "FROM", 1)
            .ok_or_else(|| QueryError::syntax("missing FROM clause"))?;
        let where_at = find_top_word(&tokens, text, "WHERE", from + 1);
        let order_at = find_order_by(&tokens, text, where_at.unwrap_or(from) + 1);

        let (top, projection) = parse_select_clause(&text[select.end..tokens[from].start])?;

        let from_end = where_at
            .or(order_at)
            .map(|i| tokens[i].start)
            .unwrap_or(text.len());
        let (source, alias) = parse_from_clause(&text[tokens[from].end..from_end])?;

        let filter = match where_at {
            Some(w) => {
                let end = order_at.map(|i| tokens[i].start).unwrap_or(text.len());
                parse_condition(&text[tokens[w].end..end])?
            }
            None => Vec::new(),
        };

        let order_by = match order_at {
            // Skip both ORDER and BY
            Some(o) => parse_order_by(&text[tokens[o + 1].end..])?,
            None => Vec::new(),
        };

        Ok(Self {
            top,
            projection,
            source,
            alias,
            filter,
            order_by,
        })
    }

    /// Name that qualifies paths in this query: the alias, or the source.
    pub fn root(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.source)
    }

    /// Qualify a field with the query root, e.g. `r.Name`.
    pub fn qualify(&self, field: &str) -> String {
        format!("{}.{}", self.root(), field)
    }

    /// Strip the root qualifier from a path.
    ///
    /// Returns `None` for paths rooted elsewhere.
    pub fn relative<'a>(&self, path: &'a str) -> Option<&'a str> {
        let root = self.root();
        path.strip_prefix(root)
            .and_then(|rest| rest.strip_prefix('.'))
            .filter(|rest| !rest.is_empty())
    }

    /// Copy of this query with a different projection.
    pub fn with_projection(&self, projection: Projection) -> Self {
        Self {
            projection,
            ..self.clone()
        }
    }

    /// AND a predicate into the filter.
    pub fn and(&mut self, predicate: Predicate) -> &mut Self {
        self.filter.push(predicate);
        self
    }

    /// Bind names referenced by the query, in order of first appearance.
    pub fn referenced_params(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mut push = |name: String| {
            if !names.contains(&name) {
                names.push(name);
            }
        };
        for predicate in &self.filter {
            match predicate {
                Predicate::Compare {
                    operand: Operand::Param(p),
                    ..
                } => push(p.clone()),
                Predicate::In { values, .. } => {
                    for value in values {
                        if let Operand::Param(p) = value {
                            push(p.clone());
                        }
                    }
                }
                Predicate::Raw(text) => {
                    if let Ok(tokens) = lex(text) {
                        for token in tokens {
                            let s = token.slice(text);
                            if token.kind == TokenKind::Word && s.starts_with('@') {
                                push(s.to_string());
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        names
    }

    /// Render to query text.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        if let Some(top) = self.top {
            write!(f, "TOP {} ", top)?;
        }
        match &self.projection {
            Projection::All => write!(f, "*")?,
            Projection::Fields(fields) => write!(f, "{}", fields.join(", "))?,
            Projection::Value(expr) => write!(f, "VALUE {}", expr)?,
            Projection::Count => write!(f, "VALUE COUNT(1)")?,
        }
        write!(f, " FROM {}", self.source)?;
        if let Some(alias) = &self.alias {
            write!(f, " {}", alias)?;
        }
        if !self.filter.is_empty() {
            let terms: Vec<String> = self.filter.iter().map(|p| p.to_string()).collect();
            write!(f, " WHERE {}", terms.join(" AND "))?;
        }
        if !self.order_by.is_empty() {
            let items: Vec<String> = self
                .order_by
                .iter()
                .map(|o| {
                    if o.descending {
                        format!("{} DESC", o.path)
                    } else {
                        format!("{} ASC", o.path)
                    }
                })
                .collect();
            write!(f, " ORDER BY {}", items.join(", "))?;
        }
        Ok(())
    }
}

// =============================================================================
// Clause parsing
// =============================================================================

fn parse_select_clause(clause: &str) -> Result<(Option<u64>, Projection), QueryError> {
    let mut rest = strip_marker(clause.trim());
    let mut top = None;

    if let Some(after) = strip_keyword(rest, "TOP") {
        let after = after.trim_start();
        let end = after.find(char::is_whitespace).unwrap_or(after.len());
        let n = after[..end]
            .parse::<u64>()
            .map_err(|_| QueryError::syntax("TOP expects a non-negative integer"))?;
        top = Some(n);
        rest = strip_marker(after[end..].trim_start());
    }

    if let Some(after) = strip_keyword(rest, "VALUE") {
        let expr = strip_marker(after.trim()).trim();
        if expr.is_empty() {
            return Err(QueryError::syntax("VALUE expects an expression"));
        }
        let compact: String = expr.chars().filter(|c| !c.is_whitespace()).collect();
        let upper = compact.to_ascii_uppercase();
        if upper == "COUNT(1)" || upper == "COUNT(*)" {
            return Ok((top, Projection::Count));
        }
        return Ok((top, Projection::Value(expr.to_string())));
    }

    let rest = rest.trim();
    if rest.is_empty() {
        return Err(QueryError::syntax("empty projection"));
    }
    if rest == "*" {
        return Ok((top, Projection::All));
    }
    let fields = split_top_level_commas(rest)
        .ok_or_else(|| QueryError::syntax("malformed projection"))?
        .into_iter()
        .map(|f| f.trim().to_string())
        .collect::<Vec<_>>();
    if fields.iter().any(String::is_empty) {
        return Err(QueryError::syntax("empty projection item"));
    }
    Ok((top, Projection::Fields(fields)))
}

fn parse_from_clause(clause: &str) -> Result<(String, Option<String>), QueryError> {
    let words: Vec<&str> = clause.split_whitespace().collect();
    match words.as_slice() {
        [source] => Ok((source.to_string(), None)),
        [source, alias] => Ok((source.to_string(), Some(alias.to_string()))),
        [source, kw, alias] if kw.eq_ignore_ascii_case("AS") => {
            Ok((source.to_string(), Some(alias.to_string())))
        }
        [] => Err(QueryError::syntax("FROM expects a source")),
        _ => Err(QueryError::syntax(format!(
            "unsupported FROM clause '{}'",
            clause.trim()
        ))),
    }
}

fn parse_condition(clause: &str) -> Result<Vec<Predicate>, QueryError> {
    let clause = clause.trim();
    if clause.is_empty() {
        return Err(QueryError::syntax("WHERE expects a condition"));
    }
    let tokens = lex(clause)?;
    let top_words = |word: &str| {
        tokens
            .iter()
            .any(|t| t.depth == 0 && t.is_word(clause, word))
    };
    if top_words("OR") || top_words("BETWEEN") {
        return Ok(vec![Predicate::Raw(clause.to_string())]);
    }

    let mut terms = Vec::new();
    let mut start = 0;
    for token in tokens.iter().filter(|t| t.depth == 0 && t.is_word(clause, "AND")) {
        terms.push(&clause[start..token.start]);
        start = token.end;
    }
    terms.push(&clause[start..]);

    if terms.iter().any(|t| t.trim().is_empty()) {
        return Err(QueryError::syntax("dangling AND in WHERE clause"));
    }
    Ok(terms.into_iter().map(Predicate::parse).collect())
}

fn parse_order_by(clause: &str) -> Result<Vec<OrderItem>, QueryError> {
    let items = split_top_level_commas(clause)
        .ok_or_else(|| QueryError::syntax("malformed ORDER BY"))?;
    items
        .into_iter()
        .map(|item| {
            let words: Vec<&str> = item.split_whitespace().collect();
            match words.as_slice() {
                [path] => Ok(OrderItem {
                    path: path.to_string(),
                    descending: false,
                }),
                [path, dir] if dir.eq_ignore_ascii_case("ASC") => Ok(OrderItem {
                    path: path.to_string(),
                    descending: false,
                }),
                [path, dir] if dir.eq_ignore_ascii_case("DESC") => Ok(OrderItem {
                    path: path.to_string(),
                    descending: true,
                }),
                _ => Err(QueryError::syntax(format!(
                    "unsupported ORDER BY item '{}'",
                    item.trim()
                ))),
            }
        })
        .collect()
}

fn strip_marker(text: &str) -> &str {
    text.strip_prefix(PROJECTION_MARKER)
        .map(str::trim_start)
        .unwrap_or(text)
}

fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let head = text.get(..keyword.len())?;
    let tail = &text[keyword.len()..];
    let boundary = tail.chars().next().map_or(true, |c| !is_word_char(c));
    (head.eq_ignore_ascii_case(keyword) && boundary).then_some(tail)
}

fn find_top_word(tokens: &[Token], text: &str, word: &str, from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&i| tokens[i].depth == 0 && tokens[i].is_word(text, word))
}

fn find_order_by(tokens: &[Token], text: &str, from: usize) -> Option<usize> {
    (from..tokens.len().saturating_sub(1)).find(|&i| {
        tokens[i].depth == 0 && tokens[i].is_word(text, "ORDER") && tokens[i + 1].is_word(text, "BY")
    })
}

fn split_top_level_commas(text: &str) -> Option<Vec<&str>> {
    let tokens = lex(text).ok()?;
    let mut parts = Vec::new();
    let mut start = 0;
    for token in tokens.iter().filter(|t| t.depth == 0 && t.is_symbol(text, ',')) {
        parts.push(&text[start..token.start]);
        start = token.end;
    }
    parts.push(&text[start..]);
    Some(parts)
}

fn is_path(text: &str) -> bool {
    !text.is_empty()
        && !text.starts_with('@')
        && !text.starts_with('.')
        && !text.ends_with('.')
        && text.chars().all(|c| is_ident_char(c) || c == '.')
        && text.chars().next().map_or(false, |c| !c.is_ascii_digit())
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_word_char(c: char) -> bool {
    is_ident_char(c) || matches!(c, '@' | '.' | ':' | '*' | '-')
}

/// Quote a string literal, escaping backslashes and single quotes.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

fn parse_string_literal(text: &str) -> Option<String> {
    let mut chars = text.chars();
    let open = chars.next()?;
    if open != '\'' && open != '"' {
        return None;
    }
    let mut out = String::new();
    let mut escaped = false;
    let mut closed = false;
    for c in chars.by_ref() {
        if escaped {
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == open {
            closed = true;
            break;
        } else {
            out.push(c);
        }
    }
    // Nothing may follow the closing quote
    (closed && chars.next().is_none()).then_some(out)
}

// =============================================================================
// Lexer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Quoted,
    Symbol,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    start: usize,
    end: usize,
    depth: usize,
    kind: TokenKind,
}

impl Token {
    fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    fn is_word(&self, text: &str, word: &str) -> bool {
        self.kind == TokenKind::Word && self.slice(text).eq_ignore_ascii_case(word)
    }

    fn is_symbol(&self, text: &str, symbol: char) -> bool {
        self.kind == TokenKind::Symbol && self.slice(text).starts_with(symbol)
    }
}

fn lex(text: &str) -> Result<Vec<Token>, QueryError> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        if c == '\'' || c == '"' {
            let mut escaped = false;
            let mut end = None;
            for (i, d) in chars.by_ref() {
                if escaped {
                    escaped = false;
                } else if d == '\\' {
                    escaped = true;
                } else if d == c {
                    end = Some(i + d.len_utf8());
                    break;
                }
            }
            let end = end.ok_or_else(|| QueryError::syntax("unterminated string literal"))?;
            tokens.push(Token {
                start,
                end,
                depth,
                kind: TokenKind::Quoted,
            });
            continue;
        }
        if is_word_char(c) {
            let mut end = start + c.len_utf8();
            while let Some(&(i, d)) = chars.peek() {
                if is_word_char(d) {
                    end = i + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token {
                start,
                end,
                depth,
                kind: TokenKind::Word,
            });
            continue;
        }
        let end = start + c.len_utf8();
        match c {
            '(' => {
                tokens.push(Token {
                    start,
                    end,
                    depth,
                    kind: TokenKind::Symbol,
                });
                depth += 1;
            }
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| QueryError::syntax("unbalanced parenthesis"))?;
                tokens.push(Token {
                    start,
                    end,
                    depth,
                    kind: TokenKind::Symbol,
                });
            }
            _ => tokens.push(Token {
                start,
                end,
                depth,
                kind: TokenKind::Symbol,
            }),
        }
    }

    if depth != 0 {
        return Err(QueryError::syntax("unbalanced parenthesis"));
    }
    Ok(tokens)
}

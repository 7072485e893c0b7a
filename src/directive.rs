//! Directive lexer
//!
//! A directive is a structured comment recognized by one of four keywords:
//!
//! ```text
//! // @pre -nd u, name              zero-value precondition
//! // @pre amount > 0, "message"    expression precondition
//! // @post -nd result              postcondition (checked at function exit)
//! res, _ := db.Query(q) // @errcheck    error must be nil
//! v, _ := m[k]          // @okcheck     comma-ok must be true
//! ```
//!
//! Every kind accepts a trailing `panic(<args>)` clause that overrides the
//! generated message. The lexer only understands comment text; whether a
//! directive is standalone or inline is decided later from its host line.

/// The four directive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `@pre` — standalone check injected at the directive site.
    Precondition,
    /// `@post` — standalone check deferred to function exit.
    Postcondition,
    /// `@errcheck` — inline guard on a discarded error value.
    ErrorCheck,
    /// `@okcheck` — inline guard on a discarded comma-ok value.
    BoolCheck,
}

impl DirectiveKind {
    /// Short name used in panic messages and reports.
    pub fn name(self) -> &'static str {
        match self {
            DirectiveKind::Precondition => "pre",
            DirectiveKind::Postcondition => "post",
            DirectiveKind::ErrorCheck => "errcheck",
            DirectiveKind::BoolCheck => "okcheck",
        }
    }
}

impl std::fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parsed form of a single contract comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub kind: DirectiveKind,
    /// Zero-value list form (`-nd a, b`).
    pub nd: bool,
    /// Variables of the `-nd` form.
    pub vars: Vec<String>,
    /// Boolean expression (`@pre` / `@post` expression form).
    pub expr: String,
    /// Custom message from the `, "message"` suffix.
    pub message: String,
    /// Arguments of an explicit trailing `panic(...)` clause.
    pub panic_args: Vec<String>,
}

impl Directive {
    fn new(kind: DirectiveKind) -> Self {
        Directive {
            kind,
            nd: false,
            vars: Vec::new(),
            expr: String::new(),
            message: String::new(),
            panic_args: Vec::new(),
        }
    }

    /// True when the author supplied an explicit `panic(...)` clause.
    pub fn has_panic_args(&self) -> bool {
        !self.panic_args.is_empty()
    }
}

/// Extracts a [`Directive`] from a comment's raw text.
///
/// Returns `None` when the comment is not a directive, or when a recognized
/// keyword carries an ill-formed body. Both cases are silent: the
/// transformer simply produces nothing for that comment.
pub fn parse_directive(comment: &str) -> Option<Directive> {
    let body = strip_comment(comment)?;

    let (kind, keyword) = if body.starts_with("@pre") {
        (DirectiveKind::Precondition, "@pre")
    } else if body.starts_with("@post") {
        (DirectiveKind::Postcondition, "@post")
    } else if body.starts_with("@errcheck") {
        (DirectiveKind::ErrorCheck, "@errcheck")
    } else if body.starts_with("@okcheck") {
        (DirectiveKind::BoolCheck, "@okcheck")
    } else {
        return None;
    };

    // The keyword must be a whole word: `@preload` is not a directive.
    let rest = &body[keyword.len()..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim();

    let mut d = Directive::new(kind);
    match kind {
        DirectiveKind::Precondition | DirectiveKind::Postcondition => {
            if rest.is_empty() {
                return None; // body is mandatory
            }
            if let Some(list) = rest.strip_prefix("-nd") {
                if !list.is_empty() && !list.starts_with(char::is_whitespace) {
                    return None;
                }
                d.nd = true;
                d.vars = split_top_level(list.trim());
                if d.vars.is_empty() || !d.vars.iter().all(|v| is_identifier(v)) {
                    return None;
                }
            } else {
                let expr = parse_trailing_panic(&mut d, rest);
                let expr = parse_trailing_message(&mut d, &expr);
                if expr.is_empty() {
                    return None;
                }
                d.expr = expr;
            }
        }
        DirectiveKind::ErrorCheck | DirectiveKind::BoolCheck => {
            // Bare form, or `panic` / `panic(args)`.
            if !rest.is_empty() && !parse_panic_clause(&mut d, rest) {
                return None;
            }
        }
    }

    Some(d)
}

/// Removes Go comment delimiters and returns trimmed content, or `None`
/// when the text is not a comment.
fn strip_comment(s: &str) -> Option<&str> {
    let s = s.trim();
    if let Some(rest) = s.strip_prefix("//") {
        return Some(rest.trim());
    }
    if let Some(rest) = s.strip_prefix("/*") {
        if let Some(inner) = rest.strip_suffix("*/") {
            return Some(inner.trim());
        }
    }
    None
}

/// Splits an optional `panic(<args>)` clause off the END of `rest`,
/// recording its arguments in `d`. Returns the part before the clause.
///
/// The split point is the rightmost top-level ` panic(` — since `panic` is
/// a Go builtin it cannot appear as a bare identifier inside the guarded
/// expression, which makes the split unambiguous. Nested parentheses and
/// quoted strings are respected.
fn parse_trailing_panic(d: &mut Directive, rest: &str) -> String {
    let rest = rest.trim();

    if let Some(idx) = rfind_top_level(rest, " panic(") {
        let arg_start = idx + " panic".len();
        if let Some((args, remaining)) = parse_paren_args(&rest[arg_start..]) {
            if remaining.trim().is_empty() {
                d.panic_args = args;
                return rest[..idx].trim().to_string();
            }
        }
    }

    // Bare `panic` at the end: keep the default message.
    if let Some(before) = rest.strip_suffix(" panic") {
        return before.trim().to_string();
    }

    rest.to_string()
}

/// Splits an optional `, "message"` suffix off the END of `expr`,
/// recording the unquoted message in `d`. Returns the part before it.
fn parse_trailing_message(d: &mut Directive, expr: &str) -> String {
    let parts = split_top_level(expr);
    if parts.len() < 2 {
        return expr.trim().to_string();
    }
    let last = parts.last().map(String::as_str).unwrap_or("");
    if let Some(msg) = unquote(last) {
        d.message = msg;
        return parts[..parts.len() - 1].join(", ");
    }
    expr.trim().to_string()
}

/// Parses `panic` or `panic(<args>)` as the ENTIRE body (inline kinds).
/// Returns false when the body is anything else.
fn parse_panic_clause(d: &mut Directive, rest: &str) -> bool {
    let Some(after) = rest.strip_prefix("panic") else {
        return false;
    };
    if after.is_empty() {
        return true;
    }
    let after = after.trim_start();
    match parse_paren_args(after) {
        Some((args, remaining)) if remaining.trim().is_empty() => {
            d.panic_args = args;
            true
        }
        _ => false,
    }
}

/// Parses `"(arg1, arg2, ...)"` respecting nested parens and strings.
/// Returns the args and the remaining text after `)`.
fn parse_paren_args(s: &str) -> Option<(Vec<String>, &str)> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'(') {
        return None;
    }
    let mut depth = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    let inner = &s[1..i];
                    return Some((split_top_level(inner), &s[i + 1..]));
                }
            }
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    None // unmatched paren
}

/// Splits `s` by top-level commas, respecting nested parens, brackets,
/// braces, and double-quoted strings with backslash escapes.
pub(crate) fn split_top_level(s: &str) -> Vec<String> {
    let bytes = s.as_bytes();
    let mut result = Vec::new();
    let mut depth = 0i32;
    let mut in_str = false;
    let mut start = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        let ch = bytes[i];
        if in_str {
            match ch {
                b'\\' => i += 1, // skip escaped byte
                b'"' => in_str = false,
                _ => {}
            }
        } else {
            match ch {
                b'"' => in_str = true,
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth -= 1,
                b',' if depth == 0 => {
                    let part = s[start..i].trim();
                    if !part.is_empty() {
                        result.push(part.to_string());
                    }
                    start = i + 1;
                }
                _ => {}
            }
        }
        i += 1;
    }
    let last = s[start..].trim();
    if !last.is_empty() {
        result.push(last.to_string());
    }
    result
}

/// Finds the rightmost occurrence of `needle` that sits at paren depth 0
/// and outside string literals.
fn rfind_top_level(s: &str, needle: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut in_str = false;
    let mut found = None;
    let mut i = 0usize;
    while i < bytes.len() {
        let ch = bytes[i];
        if in_str {
            match ch {
                b'\\' => i += 1,
                b'"' => in_str = false,
                _ => {}
            }
        } else {
            match ch {
                b'"' => in_str = true,
                b'(' => depth += 1,
                b')' => depth -= 1,
                _ => {
                    if depth == 0 && s[i..].starts_with(needle) {
                        found = Some(i);
                    }
                }
            }
        }
        i += 1;
    }
    found
}

/// Unquotes a double-quoted Go string literal, or returns `None` when the
/// text is not one.
fn unquote(s: &str) -> Option<String> {
    let s = s.trim();
    let inner = s.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '"' {
            return None; // unescaped quote inside — not a single literal
        }
        if c == '\\' {
            match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                '\\' => out.push('\\'),
                '"' => out.push('"'),
                other => {
                    out.push('\\');
                    out.push(other);
                }
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("// @pre -nd x", vec!["x"])]
    #[case("// @pre -nd x, y", vec!["x", "y"])]
    #[case("// @pre -nd   a ,  b , c ", vec!["a", "b", "c"])]
    #[case("  // @pre -nd ptr  ", vec!["ptr"])]
    fn pre_nd(#[case] input: &str, #[case] want: Vec<&str>) {
        let d = parse_directive(input).expect("directive");
        assert_eq!(d.kind, DirectiveKind::Precondition);
        assert!(d.nd);
        assert_eq!(d.vars, want);
    }

    #[rstest]
    #[case("// @pre len(x) > 0", "len(x) > 0", "")]
    #[case(r#"// @pre age > 0, "age must be positive""#, "age > 0", "age must be positive")]
    #[case("// @pre a > b", "a > b", "")]
    #[case(r#"// @pre x != nil, "x required""#, "x != nil", "x required")]
    fn pre_expr(#[case] input: &str, #[case] expr: &str, #[case] message: &str) {
        let d = parse_directive(input).expect("directive");
        assert_eq!(d.kind, DirectiveKind::Precondition);
        assert!(!d.nd);
        assert_eq!(d.expr, expr);
        assert_eq!(d.message, message);
    }

    #[test]
    fn pre_expr_with_call_commas() {
        // Commas inside call parens are not message separators.
        let d = parse_directive("// @pre min(a, b) > 0").expect("directive");
        assert_eq!(d.expr, "min(a, b) > 0");
        assert!(d.message.is_empty());
    }

    #[test]
    fn pre_trailing_panic() {
        let d = parse_directive(r#"// @pre u != nil panic("user must not be nil")"#)
            .expect("directive");
        assert_eq!(d.expr, "u != nil");
        assert_eq!(d.panic_args, vec![r#""user must not be nil""#]);
    }

    #[test]
    fn pre_panic_with_nested_parens() {
        let d = parse_directive(r#"// @pre ok panic(fmt.Sprintf("x=%d", x))"#).expect("directive");
        assert_eq!(d.expr, "ok");
        assert_eq!(d.panic_args, vec![r#"fmt.Sprintf("x=%d", x)"#]);
    }

    #[test]
    fn pre_bare_panic_suffix() {
        let d = parse_directive("// @pre x > 0 panic").expect("directive");
        assert_eq!(d.expr, "x > 0");
        assert!(d.panic_args.is_empty());
    }

    #[test]
    fn post_nd() {
        let d = parse_directive("// @post -nd result").expect("directive");
        assert_eq!(d.kind, DirectiveKind::Postcondition);
        assert!(d.nd);
        assert_eq!(d.vars, vec!["result"]);
    }

    #[test]
    fn post_expr_message() {
        let d = parse_directive(r#"// @post result != nil, "must return value""#)
            .expect("directive");
        assert_eq!(d.kind, DirectiveKind::Postcondition);
        assert_eq!(d.expr, "result != nil");
        assert_eq!(d.message, "must return value");
    }

    #[rstest]
    #[case("// @errcheck")]
    #[case("  // @errcheck  ")]
    #[case("/* @errcheck */")]
    fn errcheck_bare(#[case] input: &str) {
        let d = parse_directive(input).expect("directive");
        assert_eq!(d.kind, DirectiveKind::ErrorCheck);
        assert!(d.panic_args.is_empty());
    }

    #[test]
    fn errcheck_panic_args() {
        let d = parse_directive(r#"// @errcheck panic("query failed: " + $v.Error())"#)
            .expect("directive");
        assert_eq!(d.kind, DirectiveKind::ErrorCheck);
        assert_eq!(d.panic_args, vec![r#""query failed: " + $v.Error()"#]);
    }

    #[test]
    fn okcheck_bare_and_panic() {
        let d = parse_directive("// @okcheck").expect("directive");
        assert_eq!(d.kind, DirectiveKind::BoolCheck);

        let d = parse_directive(r#"// @okcheck panic("missing key")"#).expect("directive");
        assert_eq!(d.panic_args, vec![r#""missing key""#]);
    }

    #[test]
    fn block_comment_form() {
        let d = parse_directive("/* @pre -nd db */").expect("directive");
        assert_eq!(d.kind, DirectiveKind::Precondition);
        assert!(d.nd);
        assert_eq!(d.vars, vec!["db"]);
    }

    #[rstest]
    #[case("// plain comment")]
    #[case("// @prefixed is not a keyword")]
    #[case("// @preload x")]
    #[case("// @pre")] // body mandatory
    #[case("// @post")]
    #[case("// @pre -nd")] // empty var list
    #[case("// @pre -nd 1bad")] // not an identifier
    #[case("// @errcheck nonsense")]
    #[case("// @okcheck panic(unclosed")]
    #[case("not a comment at all")]
    fn rejects(#[case] input: &str) {
        assert_eq!(parse_directive(input), None);
    }

    #[test]
    fn split_top_level_respects_nesting() {
        assert_eq!(
            split_top_level(r#"f(a, b), "x,y", m[k, v]"#),
            vec!["f(a, b)", r#""x,y""#, "m[k, v]"]
        );
    }

    #[test]
    fn split_top_level_respects_escapes() {
        assert_eq!(
            split_top_level(r#""a\",b", c"#),
            vec![r#""a\",b""#, "c"]
        );
    }
}

//! Shadow generation — the directive-to-control-flow transformer
//!
//! The generator consumes one parsed file plus its positioned directives
//! and produces the shadow text: a line-for-line rewrite of the original in
//! which every directive has become ordinary Go. Three kinds of change are
//! made, and only these:
//!
//! - standalone directive lines are replaced by injected `if`/`defer`
//!   statements,
//! - inline directive hosts have their rightmost discarded position
//!   rewritten to a synthetic variable, followed by an immediate check,
//! - missing imports required by injected code are added.
//!
//! Whenever emitted lines diverge from the original line count, a
//! `//line <file>:<n>` compiler directive resets the coordinate mapping so
//! that panics and stack traces always report original positions.

use crate::directive::{parse_directive, Directive, DirectiveKind};
use crate::error::{Error, Result};
use crate::fold;
use crate::resolve::{Resolver, TypeCategory, TypeInfo};
use crate::source::{Assign, AssignOp, ImportAnchor, SourceFile, Span};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Standard-library packages injected code is allowed to pull in.
const WELL_KNOWN_IMPORTS: &[&str] = &[
    "errors", "fmt", "os", "reflect", "strconv", "strings", "time",
];

/// A directive paired with its comment position and host-line class.
#[derive(Debug, Clone)]
pub struct PositionedDirective {
    pub directive: Directive,
    pub span: Span,
    /// True when the host line holds nothing but the comment.
    pub standalone: bool,
}

/// Runs the lexer over every comment of `file`, in source order.
pub fn collect_directives(file: &SourceFile) -> Vec<PositionedDirective> {
    let mut out: Vec<PositionedDirective> = file
        .comments
        .iter()
        .filter_map(|c| {
            parse_directive(&c.text).map(|d| PositionedDirective {
                standalone: file.line_is_blank_before(c.span.start_line, c.span.start_col),
                directive: d,
                span: c.span,
            })
        })
        .collect();
    out.sort_by_key(|d| (d.span.start_line, d.span.start_col));
    out
}

/// Generated shadow content for one file.
#[derive(Debug)]
pub struct Shadow {
    pub text: String,
    /// Import paths added beyond the original file's imports.
    pub extra_imports: Vec<String>,
    /// Non-fatal diagnostics (always-false preconditions) for the engine to
    /// report on stderr.
    pub warnings: Vec<String>,
    /// Number of directives that actually produced injected constructs.
    pub injected: usize,
}

/// Per-file emission plan, keyed by original line number.
#[derive(Default)]
struct Plan {
    /// Lines replaced by injected statements (the line itself is dropped).
    drop: BTreeSet<usize>,
    /// Injected lines emitted at the position of a line.
    inject_at: BTreeMap<usize, Vec<String>>,
    /// Injected lines emitted after a line.
    inject_after: BTreeMap<usize, Vec<String>>,
    /// In-place column edits: line -> (start_col, end_col, replacement).
    edits: BTreeMap<usize, Vec<(usize, usize, String)>>,
    /// Synthetic names already declared, per enclosing function index.
    declared: HashMap<usize, HashSet<String>>,
    imports: BTreeSet<String>,
    warnings: Vec<String>,
    injected: usize,
}

/// Transforms `file` into its shadow text.
///
/// Fails only on a `@post` directive outside any function; everything else
/// degrades per the error policy (ill-formed directives were already
/// dropped by the lexer, unresolved types fall back to nil checks).
pub fn generate_shadow(
    file: &SourceFile,
    directives: &[PositionedDirective],
    resolver: Resolver<'_>,
) -> Result<Shadow> {
    let mut plan = Plan::default();

    for pd in directives {
        match (pd.standalone, pd.directive.kind) {
            (true, DirectiveKind::Precondition) => {
                plan_condition(&mut plan, file, resolver, pd, false);
            }
            (true, DirectiveKind::Postcondition) => {
                if file.enclosing_function(pd.span.start_line).is_none() {
                    return Err(Error::PostOutsideFunction {
                        path: file.path.clone(),
                        line: pd.span.start_line,
                    });
                }
                plan_condition(&mut plan, file, resolver, pd, true);
            }
            (true, DirectiveKind::ErrorCheck) | (true, DirectiveKind::BoolCheck) => {
                plan_block_check(&mut plan, file, pd);
            }
            (false, DirectiveKind::ErrorCheck) | (false, DirectiveKind::BoolCheck) => {
                plan_inline_check(&mut plan, file, pd);
            }
            // A pre/post trailing a statement guards nothing; drop it and
            // leave the line untouched.
            (false, _) => {}
        }
    }

    finish(plan, file)
}

/// Plans a standalone `@pre` or `@post`: injected checks at the directive
/// line, wrapped in a deferred closure for postconditions.
fn plan_condition(
    plan: &mut Plan,
    file: &SourceFile,
    resolver: Resolver<'_>,
    pd: &PositionedDirective,
    deferred: bool,
) {
    let line = pd.span.start_line;
    let Some(func) = file.enclosing_function(line) else {
        return; // nothing to guard at top level
    };
    let d = &pd.directive;
    let loc = format!("{}:{}", file.path.display(), line);
    let indent = line_indent(file, line);

    let mut checks: Vec<(String, String)> = Vec::new(); // (condition, panic payload)

    if d.nd {
        for var in &d.vars {
            let info = resolver
                .var_type(file, func, var)
                .unwrap_or_else(nil_fallback);
            if let Some(path) = &info.import_path {
                plan.imports.insert(path.clone());
            }
            let payload = if d.has_panic_args() {
                d.panic_args.join(", ")
            } else {
                go_quote(&format!(
                    "gird: {} -nd violation: [{}] is defaulted ({}) at {}",
                    d.kind.name(),
                    var,
                    info.zero_desc(),
                    loc
                ))
            };
            checks.push((info.zero_check(var), payload));
        }
    } else {
        if !crate::source::parses_as_expression(&d.expr) {
            plan.warnings.push(format!(
                "parse of {} expression failed at {}: {}",
                d.kind.name(),
                loc,
                d.expr
            ));
            return; // skip this one directive, leave its line untouched
        }
        if d.kind == DirectiveKind::Precondition && fold::is_always_false(&d.expr) {
            plan.warnings.push(format!(
                "expression \"{}\" always false at {}",
                d.expr, loc
            ));
        }
        let payload = if d.has_panic_args() {
            d.panic_args.join(", ")
        } else if !d.message.is_empty() {
            go_quote(&format!("{} at {}", d.message, loc))
        } else {
            go_quote(&format!(
                "gird: {} violation: {} (at {})",
                d.kind.name(),
                d.expr,
                loc
            ))
        };
        checks.push((format!("!({})", d.expr), payload));
    }

    let mut lines = Vec::new();
    if deferred {
        lines.push(format!("{}defer func() {{", indent));
        for (cond, payload) in &checks {
            push_if_panic(&mut lines, &format!("{}\t", indent), cond, payload);
        }
        lines.push(format!("{}}}()", indent));
    } else {
        for (cond, payload) in &checks {
            push_if_panic(&mut lines, &indent, cond, payload);
        }
    }

    drop_comment_lines(plan, pd.span);
    plan.inject_at.entry(line).or_default().extend(lines);
    plan.injected += 1;
}

/// Plans a standalone `@errcheck`/`@okcheck`: the directive guards the next
/// statement iff that statement is an assignment in the same function.
fn plan_block_check(plan: &mut Plan, file: &SourceFile, pd: &PositionedDirective) {
    let line = pd.span.start_line;
    let Some(assign) = file.assignment_following(pd.span.end_line) else {
        return; // leave the comment line untouched
    };
    let same_function = enclosing_function_idx(file, line)
        == enclosing_function_idx(file, assign.span.start_line);
    if !same_function {
        return;
    }
    let assign = assign.clone();
    if plan_check_for_assign(plan, file, pd, &assign) {
        drop_comment_lines(plan, pd.span);
    }
}

/// Plans an inline `@errcheck`/`@okcheck` trailing its host assignment.
fn plan_inline_check(plan: &mut Plan, file: &SourceFile, pd: &PositionedDirective) {
    let Some(assign) = file.assignment_ending_at(pd.span.start_line, pd.span.start_col) else {
        return; // decorative comment on a non-assignment line
    };
    let assign = assign.clone();
    if plan_check_for_assign(plan, file, pd, &assign) {
        // Strip the trailing directive comment from the host line.
        let line = pd.span.start_line;
        let end = file.lines[line - 1].len();
        plan.edits
            .entry(line)
            .or_default()
            .push((pd.span.start_col, end, String::new()));
    }
}

/// Shared rewrite for both check kinds: captures the guarded value in a
/// synthetic variable (or an explicit `err`/`ok`) and emits the immediate
/// check after the assignment. Returns false for the silent no-op case.
fn plan_check_for_assign(
    plan: &mut Plan,
    file: &SourceFile,
    pd: &PositionedDirective,
    assign: &Assign,
) -> bool {
    let d = &pd.directive;
    let line = pd.span.start_line;
    let loc = format!("{}:{}", file.path.display(), line);
    let indent = line_indent(file, assign.span.start_line);

    let (stem, fallback) = match d.kind {
        DirectiveKind::ErrorCheck => ("err", "err"),
        _ => ("ok", "ok"),
    };

    let var = match assign.last_blank() {
        Some(idx) => {
            let synth = format!("_gird_{}_{}", stem, line);
            let item = &assign.lhs[idx];
            plan.edits
                .entry(item.span.start_line)
                .or_default()
                .push((item.span.start_col, item.span.end_col, synth.clone()));

            let scope = enclosing_function_idx(file, assign.span.start_line).unwrap_or(usize::MAX);
            let declared = plan.declared.entry(scope).or_default();
            match assign.op {
                AssignOp::Assign => {
                    // First mention in this function becomes a short
                    // declaration; later mentions stay plain assignments.
                    if declared.insert(synth.clone()) {
                        plan.edits
                            .entry(assign.op_span.start_line)
                            .or_default()
                            .push((
                                assign.op_span.start_col,
                                assign.op_span.end_col,
                                ":=".to_string(),
                            ));
                    }
                }
                AssignOp::Define => {
                    declared.insert(synth.clone());
                }
                AssignOp::Other => return false, // compound ops cannot discard
            }
            synth
        }
        None => {
            // No discarded position: fall back to an explicitly named
            // err/ok variable, or drop the directive entirely.
            match assign.named(fallback) {
                Some(_) => fallback.to_string(),
                None => return false,
            }
        }
    };

    let (cond, payload) = match d.kind {
        DirectiveKind::ErrorCheck => {
            let payload = if d.has_panic_args() {
                substitute_placeholder(&d.panic_args, &var)
            } else {
                format!(
                    "{} + {}.Error()",
                    go_quote(&format!("gird: errcheck violation at {}: ", loc)),
                    var
                )
            };
            (format!("{} != nil", var), payload)
        }
        _ => {
            let payload = if d.has_panic_args() {
                substitute_placeholder(&d.panic_args, &var)
            } else {
                go_quote(&format!("gird: okcheck violation at {}", loc))
            };
            (format!("!{}", var), payload)
        }
    };

    let mut lines = Vec::new();
    push_if_panic(&mut lines, &indent, &cond, &payload);
    plan.inject_after
        .entry(assign.span.end_line)
        .or_default()
        .extend(lines);
    plan.injected += 1;
    true
}

/// Assembles the final shadow text: import insertion, line-by-line
/// emission, and `//line` resynchronization.
fn finish(mut plan: Plan, file: &SourceFile) -> Result<Shadow> {
    if plan.injected == 0 {
        return Ok(Shadow {
            text: file.text.clone(),
            extra_imports: Vec::new(),
            warnings: plan.warnings,
            injected: 0,
        });
    }

    // Import discovery: packages referenced by injected code, plus any the
    // resolver reported, minus what the file already imports.
    for text in plan
        .inject_at
        .values()
        .chain(plan.inject_after.values())
        .flatten()
    {
        for pkg in referenced_packages(text) {
            if WELL_KNOWN_IMPORTS.contains(&pkg.as_str()) {
                plan.imports.insert(pkg);
            }
        }
    }
    let extra_imports: Vec<String> = plan
        .imports
        .iter()
        .filter(|p| !file.has_import(p))
        .cloned()
        .collect();

    if !extra_imports.is_empty() {
        let (anchor_line, lines): (usize, Vec<String>) = match file.import_anchor {
            ImportAnchor::Block { open_line } => (
                open_line,
                extra_imports.iter().map(|p| format!("\t\"{}\"", p)).collect(),
            ),
            ImportAnchor::Single { line } => (
                line,
                extra_imports
                    .iter()
                    .map(|p| format!("import \"{}\"", p))
                    .collect(),
            ),
            ImportAnchor::PackageClause { line } => {
                let mut v = vec![String::new()];
                v.extend(extra_imports.iter().map(|p| format!("import \"{}\"", p)));
                (line, v)
            }
        };
        let entry = plan.inject_after.entry(anchor_line).or_default();
        for (i, l) in lines.into_iter().enumerate() {
            entry.insert(i, l);
        }
    }

    // Emission. `desynced` tracks line-count divergence; every return to a
    // verbatim original line is preceded by a //line reset.
    let path_display = file.path.display().to_string();
    let mut out: Vec<String> = Vec::with_capacity(file.lines.len());
    let mut desynced = false;

    for (idx, original) in file.lines.iter().enumerate() {
        let lineno = idx + 1;

        if let Some(injected) = plan.inject_at.get(&lineno) {
            out.extend(injected.iter().cloned());
            desynced = true;
        }

        if plan.drop.contains(&lineno) {
            desynced = true;
        } else {
            let text = match plan.edits.get(&lineno) {
                Some(edits) => apply_edits(original, edits),
                None => original.clone(),
            };
            if desynced {
                out.push(format!("//line {}:{}", path_display, lineno));
                desynced = false;
            }
            out.push(text);
        }

        if let Some(injected) = plan.inject_after.get(&lineno) {
            out.extend(injected.iter().cloned());
            desynced = true;
        }
    }

    let mut text = out.join("\n");
    text.push('\n');

    Ok(Shadow {
        text,
        extra_imports,
        warnings: plan.warnings,
        injected: plan.injected,
    })
}

/// `if <cond> { panic(<payload>) }` over three lines at `indent`.
fn push_if_panic(lines: &mut Vec<String>, indent: &str, cond: &str, payload: &str) {
    lines.push(format!("{}if {} {{", indent, cond));
    lines.push(format!("{}\tpanic({})", indent, payload));
    lines.push(format!("{}}}", indent));
}

/// Marks every line of a standalone comment for removal.
fn drop_comment_lines(plan: &mut Plan, span: Span) {
    for l in span.start_line..=span.end_line {
        plan.drop.insert(l);
    }
}

/// Fallback for unresolvable names: behaves like an unknown type (nil
/// comparison, "nil" description).
fn nil_fallback() -> TypeInfo {
    TypeInfo {
        category: TypeCategory::Unknown,
        text: String::new(),
        import_path: None,
    }
}

fn enclosing_function_idx(file: &SourceFile, line: usize) -> Option<usize> {
    file.functions
        .iter()
        .enumerate()
        .filter(|(_, f)| f.body_span.contains_line(line))
        .min_by_key(|(_, f)| {
            (
                f.body_span.line_extent(),
                usize::MAX - f.body_span.start_line,
            )
        })
        .map(|(i, _)| i)
}

fn line_indent(file: &SourceFile, line: usize) -> String {
    file.lines
        .get(line - 1)
        .map(|l| l.chars().take_while(|c| c.is_whitespace()).collect())
        .unwrap_or_default()
}

/// Applies column edits to one line, rightmost first, then trims trailing
/// whitespace left behind by comment removal.
fn apply_edits(line: &str, edits: &[(usize, usize, String)]) -> String {
    let mut text = line.to_string();
    let mut sorted: Vec<&(usize, usize, String)> = edits.iter().collect();
    sorted.sort_by_key(|(start, _, _)| std::cmp::Reverse(*start));
    for (start, end, replacement) in sorted {
        let end = (*end).min(text.len());
        if *start <= end {
            text.replace_range(*start..end, replacement);
        }
    }
    text.trim_end().to_string()
}

/// Substitutes the `$v` placeholder with the synthetic variable name and
/// joins the panic arguments.
fn substitute_placeholder(args: &[String], var: &str) -> String {
    args.iter()
        .map(|a| a.replace("$v", var))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Go string literal with escapes.
fn go_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Package names referenced as `pkg.Member` in a snippet of injected code.
fn referenced_packages(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_alphabetic() || c == b'_' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            let prev_ok = start == 0 || {
                let p = bytes[start - 1];
                !(p.is_ascii_alphanumeric() || p == b'_' || p == b'.' || p == b')' || p == b'"')
            };
            let next_is_member = bytes.get(i) == Some(&b'.')
                && bytes
                    .get(i + 1)
                    .is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_');
            if prev_ok && next_is_member {
                out.push(text[start..i].to_string());
            }
        } else if c == b'"' {
            // Skip string literals; message text is not code.
            i += 1;
            while i < bytes.len() && bytes[i] != b'"' {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            i += 1;
        } else {
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Unit;
    use std::path::Path;

    fn shadow_of(src: &str) -> Shadow {
        let file = SourceFile::parse(Path::new("main.go"), src.to_string()).expect("parse");
        let unit = Unit::from_files(Path::new("."), vec![file]);
        let file = unit.file(Path::new("main.go")).expect("file");
        let directives = collect_directives(file);
        generate_shadow(file, &directives, unit.resolver()).expect("generate")
    }

    #[test]
    fn pointer_precondition() {
        let s = shadow_of(
            "package main\n\ntype User struct{ Name string }\n\nfunc Greet(u *User) {\n\t// @pre -nd u\n\t_ = u\n}\n",
        );
        assert!(s.text.contains("if u == nil {"));
        assert!(s
            .text
            .contains("gird: pre -nd violation: [u] is defaulted (nil) at main.go:6"));
        assert!(s.text.contains("//line main.go:7"));
        assert!(!s.text.contains("@pre"));
    }

    #[test]
    fn expression_precondition_with_message() {
        let s = shadow_of(
            "package main\n\nfunc Pay(amount int) {\n\t// @pre amount > 0, \"amount must be positive\"\n\t_ = amount\n}\n",
        );
        assert!(s.text.contains("if !(amount > 0) {"));
        assert!(s.text.contains("\"amount must be positive at main.go:4\""));
    }

    #[test]
    fn default_expression_message_names_kind_and_expr() {
        let s = shadow_of(
            "package main\n\nfunc Pay(amount int) {\n\t// @pre amount > 0\n\t_ = amount\n}\n",
        );
        assert!(s
            .text
            .contains("gird: pre violation: amount > 0 (at main.go:4)"));
    }

    #[test]
    fn custom_panic_args_standalone() {
        let s = shadow_of(
            "package main\n\nfunc Get(u *int) {\n\t// @pre u != nil panic(\"user must not be nil\")\n\t_ = u\n}\n",
        );
        assert!(s.text.contains("panic(\"user must not be nil\")"));
    }

    #[test]
    fn always_false_warns_and_still_emits() {
        let s = shadow_of("package main\n\nfunc F() {\n\t// @pre 1 > 2\n\t_ = 0\n}\n");
        assert_eq!(s.warnings.len(), 1);
        assert!(s.warnings[0].contains("\"1 > 2\" always false"));
        assert!(s.text.contains("if !(1 > 2) {"));
    }

    #[test]
    fn unparseable_expression_is_logged_and_skipped() {
        let s = shadow_of("package main\n\nfunc F(x int) {\n\t// @pre x >\n\t_ = x\n}\n");
        assert_eq!(s.injected, 0);
        assert_eq!(s.warnings.len(), 1);
        assert!(s.warnings[0].contains("parse of pre expression failed"));
        assert!(s.text.contains("// @pre x >"));
    }

    #[test]
    fn postcondition_is_deferred() {
        let s = shadow_of(
            "package main\n\ntype Item struct{ ID int }\n\nfunc Find(id int) (result *Item) {\n\t// @post -nd result\n\treturn &Item{ID: id}\n}\n",
        );
        assert!(s.text.contains("defer func() {"));
        assert!(s.text.contains("if result == nil {"));
        assert!(s.text.contains("}()"));
        // Return logic preserved below the wrapper.
        let defer_at = s.text.find("defer func()").expect("defer");
        let ret_at = s.text.find("return &Item").expect("return");
        assert!(defer_at < ret_at);
    }

    #[test]
    fn postcondition_outside_function_is_fatal() {
        let file = SourceFile::parse(
            Path::new("main.go"),
            "package main\n\n// @post -nd x\n\nfunc main() {}\n".to_string(),
        )
        .expect("parse");
        let unit = Unit::from_files(Path::new("."), vec![file]);
        let file = unit.file(Path::new("main.go")).expect("file");
        let directives = collect_directives(file);
        let err = generate_shadow(file, &directives, unit.resolver());
        assert!(matches!(
            err,
            Err(Error::PostOutsideFunction { line: 3, .. })
        ));
    }

    #[test]
    fn precondition_outside_function_is_skipped() {
        let s = shadow_of("package main\n\n// @pre x > 0\n\nfunc main() {}\n");
        assert_eq!(s.injected, 0);
        assert_eq!(s.text, "package main\n\n// @pre x > 0\n\nfunc main() {}\n");
    }

    #[test]
    fn inline_errcheck_rewrites_last_blank() {
        let s = shadow_of(
            "package main\n\ntype DB struct{}\n\nfunc (db *DB) Query(q string) (string, error) {\n\treturn \"\", nil\n}\n\nfunc Fetch(db *DB) {\n\tres, _ := db.Query(\"SELECT 1\") // @errcheck\n\t_ = res\n}\n",
        );
        assert!(s.text.contains("res, _gird_err_10 := db.Query(\"SELECT 1\")"));
        assert!(s.text.contains("if _gird_err_10 != nil {"));
        assert!(s
            .text
            .contains("\"gird: errcheck violation at main.go:10: \" + _gird_err_10.Error()"));
        assert!(!s.text.contains("@errcheck"));
        assert!(s.text.contains("//line main.go:11"));
    }

    #[test]
    fn errcheck_replaces_rightmost_blank_only() {
        let s = shadow_of(
            "package main\n\nfunc pair() (int, error) { return 0, nil }\n\nfunc F() {\n\t_, _ = pair() // @errcheck\n}\n",
        );
        assert!(s.text.contains("_, _gird_err_6 := pair()"));
    }

    #[test]
    fn plain_assign_promoted_once_per_scope() {
        let s = shadow_of(
            "package main\n\nfunc pair() (int, error) { return 0, nil }\n\nfunc F() {\n\tvar a int\n\ta, _ = pair() // @errcheck\n\t_ = a\n}\n",
        );
        assert!(s.text.contains("a, _gird_err_7 := pair()"));
    }

    #[test]
    fn explicit_err_checked_without_rewrite() {
        let s = shadow_of(
            "package main\n\nfunc pair() (int, error) { return 0, nil }\n\nfunc F() {\n\tres, err := pair() // @errcheck\n\t_, _ = res, err\n}\n",
        );
        assert!(s.text.contains("res, err := pair()"));
        assert!(s.text.contains("if err != nil {"));
        assert!(!s.text.contains("_gird_err_"));
    }

    #[test]
    fn inline_okcheck() {
        let s = shadow_of(
            "package main\n\nfunc F(m map[string]int) {\n\tv, _ := m[\"k\"] // @okcheck\n\t_ = v\n}\n",
        );
        assert!(s.text.contains("v, _gird_ok_4 := m[\"k\"]"));
        assert!(s.text.contains("if !_gird_ok_4 {"));
        assert!(s.text.contains("gird: okcheck violation at main.go:4"));
    }

    #[test]
    fn okcheck_placeholder_substitution() {
        let s = shadow_of(
            "package main\n\nfunc pair() (int, error) { return 0, nil }\n\nfunc F() {\n\tv, _ := pair() // @errcheck panic(\"lookup: \" + $v.Error())\n\t_ = v\n}\n",
        );
        assert!(s.text.contains("panic(\"lookup: \" + _gird_err_6.Error())"));
    }

    #[test]
    fn block_form_errcheck_guards_next_assignment() {
        let s = shadow_of(
            "package main\n\nfunc pair() (int, error) { return 0, nil }\n\nfunc F() {\n\t// @errcheck\n\tres, _ := pair()\n\t_ = res\n}\n",
        );
        assert!(s.text.contains("res, _gird_err_6 := pair()"));
        assert!(s.text.contains("if _gird_err_6 != nil {"));
        assert!(!s.text.contains("@errcheck"));
    }

    #[test]
    fn block_form_skips_non_adjacent_assignment() {
        let s = shadow_of(
            "package main\n\nfunc pair() (int, error) { return 0, nil }\n\nfunc F() {\n\t// @errcheck\n\tprintln(\"hi\")\n\tres, _ := pair()\n\t_ = res\n}\n",
        );
        assert_eq!(s.injected, 0);
        assert!(s.text.contains("// @errcheck"));
    }

    #[test]
    fn inline_no_discard_is_noop() {
        let s = shadow_of(
            "package main\n\nfunc one() int { return 1 }\n\nfunc F() {\n\tres := one() // @errcheck\n\t_ = res\n}\n",
        );
        assert_eq!(s.injected, 0);
        assert!(s.text.contains("res := one() // @errcheck"));
    }

    #[test]
    fn if_header_assignment_is_not_a_host() {
        let s = shadow_of(
            "package main\n\nfunc pair() (int, error) { return 0, nil }\n\nfunc F() {\n\tif v, _ := pair(); v > 0 { // @errcheck\n\t\t_ = v\n\t}\n}\n",
        );
        assert_eq!(s.injected, 0);
        assert!(s.text.contains("// @errcheck"));
    }

    #[test]
    fn decorative_comment_on_field_is_ignored() {
        let s = shadow_of(
            "package main\n\ntype T struct {\n\tName string // @errcheck\n}\n\nfunc main() {}\n",
        );
        assert_eq!(s.injected, 0);
    }

    #[test]
    fn reflect_import_added_for_any_type_param() {
        let s = shadow_of(
            "package main\n\nfunc Check[T any](v T) T {\n\t// @pre -nd v\n\treturn v\n}\n",
        );
        assert!(s.text.contains("reflect.ValueOf(&v).Elem().IsZero()"));
        assert_eq!(s.extra_imports, vec!["reflect"]);
        assert!(s.text.contains("import \"reflect\""));
    }

    #[test]
    fn reflect_import_into_existing_block() {
        let s = shadow_of(
            "package main\n\nimport (\n\t\"fmt\"\n)\n\nfunc Check[T any](v T) {\n\t// @pre -nd v\n\tfmt.Println(v)\n}\n",
        );
        assert!(s.text.contains("\t\"reflect\""));
        // Resync after the inserted import line.
        assert!(s.text.contains("//line main.go:4"));
    }

    #[test]
    fn comparable_type_param_needs_no_import() {
        let s = shadow_of(
            "package main\n\nfunc First[T comparable](v T) {\n\t// @pre -nd v\n\t_ = v\n}\n",
        );
        assert!(s.text.contains("v == *new(T)"));
        assert!(s.extra_imports.is_empty());
    }

    #[test]
    fn multiple_directives_emitted_in_source_order() {
        let s = shadow_of(
            "package main\n\nfunc F(name string, age int, score float64) {\n\t// @pre len(name) > 0, \"name required\"\n\t// @pre age > 0, \"age must be positive\"\n\t// @pre score >= 0, \"score required\"\n\t_, _, _ = name, age, score\n}\n",
        );
        let a = s.text.find("name required").expect("first");
        let b = s.text.find("age must be positive").expect("second");
        let c = s.text.find("score required").expect("third");
        assert!(a < b && b < c);
        // A single resync after the injected run, pointing at the next
        // original line.
        assert!(s.text.contains("//line main.go:7"));
    }

    #[test]
    fn multiple_nd_vars() {
        let s = shadow_of(
            "package main\n\nfunc Multi(a *int, b string, c float64) {\n\t// @pre -nd a, b, c\n\t_, _, _ = a, b, c\n}\n",
        );
        assert!(s.text.contains("if a == nil {"));
        assert!(s.text.contains("if b == \"\" {"));
        assert!(s.text.contains("if c == 0.0 {"));
    }

    #[test]
    fn closure_scopes_are_distinct() {
        let s = shadow_of(
            "package main\n\nfunc Outer() {\n\tf := func(x *int) {\n\t\t// @pre -nd x\n\t\t_ = x\n\t}\n\tf(nil)\n}\n",
        );
        assert!(s.text.contains("if x == nil {"));
        // Injected inside the literal keeps the literal's indentation.
        assert!(s.text.contains("\t\tif x == nil {"));
    }

    #[test]
    fn no_directives_returns_original() {
        let s = shadow_of("package main\n\nfunc main() {\n\t// just a comment\n}\n");
        assert_eq!(s.injected, 0);
        assert_eq!(s.text, "package main\n\nfunc main() {\n\t// just a comment\n}\n");
    }

    #[test]
    fn line_numbers_stay_continuous() {
        let s = shadow_of(
            "package main\n\nfunc Foo(a *int, b *int, c *int) {\n\t// @pre -nd a\n\t// @pre -nd b\n\t// @pre -nd c\n\t_, _, _ = a, b, c\n}\n",
        );
        // Three consecutive directive lines collapse into one injected run;
        // the next original line is line 7.
        assert!(s.text.contains("//line main.go:7"));
        let last_orig = "\t_, _, _ = a, b, c";
        let directive_pos = s.text.find("//line main.go:7").expect("line directive");
        let orig_pos = s.text.find(last_orig).expect("original line");
        assert!(directive_pos < orig_pos);
    }

    #[test]
    fn referenced_packages_scanner() {
        assert_eq!(
            referenced_packages("reflect.ValueOf(&v).Elem().IsZero()"),
            vec!["reflect"]
        );
        assert!(referenced_packages("\"text with fmt.Println inside\"").is_empty());
        // Plain member calls are collected too; the allow-list filters them.
        assert_eq!(referenced_packages("v.Error()"), vec!["v"]);
        assert_eq!(referenced_packages("x == nil"), Vec::<String>::new());
    }
}

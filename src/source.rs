//! Go source parsing via tree-sitter
//!
//! Parses one file into a positional model: comments with spans, function
//! shapes, assignment statements, imports, and top-level type declarations.
//! This is everything the resolver and the generator need; statement bodies
//! are never rewritten structurally, so no full expression tree is kept.

use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser};

/// Source span, 1-based lines, 0-based byte columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl Span {
    pub fn contains_line(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }

    /// Number of lines covered; used to pick the innermost of two spans.
    pub fn line_extent(&self) -> usize {
        self.end_line - self.start_line
    }
}

/// A comment with its position.
#[derive(Debug, Clone)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}

/// One imported package.
#[derive(Debug, Clone)]
pub struct Import {
    /// Explicit alias (`p "x/y"`), if any. `.` and `_` imports keep their
    /// marker here.
    pub alias: Option<String>,
    /// Unquoted import path.
    pub path: String,
}

impl Import {
    /// Name under which the package's members are referenced.
    pub fn local_name(&self) -> &str {
        match &self.alias {
            Some(a) => a,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

/// Where generated import lines can be inserted.
#[derive(Debug, Clone, Copy)]
pub enum ImportAnchor {
    /// Inside a factored `import (...)` block; line of the `import (`.
    Block { open_line: usize },
    /// After a sole `import "x"` line.
    Single { line: usize },
    /// No imports; after the `package` clause line.
    PackageClause { line: usize },
}

/// A function parameter, receiver, or result.
#[derive(Debug, Clone)]
pub struct Param {
    /// Empty for unnamed parameters/results.
    pub name: String,
    /// Type expression text, e.g. `*User`, `[]byte`, `map[string]int`.
    pub typ: String,
}

/// A generic type parameter with its constraint text.
#[derive(Debug, Clone)]
pub struct TypeParam {
    pub name: String,
    pub constraint: String,
}

/// Shape of one function declaration, method, or function literal.
#[derive(Debug, Clone)]
pub struct FuncInfo {
    /// Empty for function literals.
    pub name: String,
    pub span: Span,
    /// Span of the `{ ... }` body.
    pub body_span: Span,
    pub receiver: Option<Param>,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
}

/// Assignment operator of interest to the rewriter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `:=`
    Define,
    /// `=`
    Assign,
    /// Compound operators (`+=` etc.) — never rewritten.
    Other,
}

/// One left-hand-side item of an assignment.
#[derive(Debug, Clone)]
pub struct LhsItem {
    pub text: String,
    pub span: Span,
}

/// A (possibly multi-value) assignment or short variable declaration.
#[derive(Debug, Clone)]
pub struct Assign {
    pub span: Span,
    pub lhs: Vec<LhsItem>,
    pub op: AssignOp,
    /// Span of the `=` / `:=` token.
    pub op_span: Span,
}

impl Assign {
    /// Index of the rightmost discarded (`_`) position, if any.
    pub fn last_blank(&self) -> Option<usize> {
        self.lhs.iter().rposition(|l| l.text == "_")
    }

    /// Index of the rightmost LHS item with the given name.
    pub fn named(&self, name: &str) -> Option<usize> {
        self.lhs.iter().rposition(|l| l.text == name)
    }
}

/// Kind of a top-level type declaration.
#[derive(Debug, Clone)]
pub enum TypeDeclKind {
    /// Struct with the type texts of its fields (embedded fields included).
    Struct { field_types: Vec<String> },
    Interface,
    /// Named type or alias over another type expression.
    Named { underlying: String },
}

/// One top-level `type` declaration.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeDeclKind,
}

/// A parsed Go file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
    /// Lines without terminators; index 0 is line 1.
    pub lines: Vec<String>,
    pub package: String,
    pub imports: Vec<Import>,
    pub import_anchor: ImportAnchor,
    pub comments: Vec<Comment>,
    pub functions: Vec<FuncInfo>,
    pub assigns: Vec<Assign>,
    pub types: Vec<TypeDecl>,
    /// Start lines of every statement; used to decide whether a block-form
    /// directive is adjacent to its target assignment.
    pub stmt_lines: BTreeSet<usize>,
}

impl SourceFile {
    /// Parses `text` as Go. A tree containing syntax errors is a fatal
    /// parse failure carrying `path`.
    pub fn parse(path: &Path, text: String) -> Result<SourceFile> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| Error::Parse {
                path: path.to_path_buf(),
                message: format!("failed to set language: {}", e),
            })?;

        let tree = parser.parse(&text, None).ok_or_else(|| Error::Parse {
            path: path.to_path_buf(),
            message: "tree-sitter returned no tree".into(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(Error::Parse {
                path: path.to_path_buf(),
                message: first_error_location(root),
            });
        }

        let mut file = SourceFile {
            path: path.to_path_buf(),
            lines: text.lines().map(str::to_string).collect(),
            text,
            package: String::new(),
            imports: Vec::new(),
            import_anchor: ImportAnchor::PackageClause { line: 1 },
            comments: Vec::new(),
            functions: Vec::new(),
            assigns: Vec::new(),
            types: Vec::new(),
            stmt_lines: BTreeSet::new(),
        };

        let mut anchor_found = false;
        collect(root, &file.text.clone(), &mut file, &mut anchor_found);
        Ok(file)
    }

    /// Innermost function whose body contains `line`, by smallest body
    /// extent (linear scan; ties broken by later start, i.e. deeper nesting).
    pub fn enclosing_function(&self, line: usize) -> Option<&FuncInfo> {
        self.functions
            .iter()
            .filter(|f| f.body_span.contains_line(line))
            .min_by_key(|f| (f.body_span.line_extent(), usize::MAX - f.body_span.start_line))
    }

    /// The assignment a trailing comment at (`line`, `col`) attaches to:
    /// the last assignment ending on that line before the comment.
    pub fn assignment_ending_at(&self, line: usize, col: usize) -> Option<&Assign> {
        self.assigns
            .iter()
            .filter(|a| a.span.end_line == line && a.span.end_col <= col)
            .last()
    }

    /// The assignment a block-form directive at `line` guards: the next
    /// statement after the directive, iff that statement is an assignment.
    pub fn assignment_following(&self, line: usize) -> Option<&Assign> {
        let next_stmt = *self.stmt_lines.range(line + 1..).next()?;
        self.assigns
            .iter()
            .find(|a| a.span.start_line == next_stmt)
    }

    /// True when everything before `col` on `line` is whitespace — the
    /// standalone/inline test for a comment starting at that position.
    pub fn line_is_blank_before(&self, line: usize, col: usize) -> bool {
        match self.lines.get(line - 1) {
            Some(l) => l
                .as_bytes()
                .iter()
                .take(col)
                .all(|b| b.is_ascii_whitespace()),
            None => false,
        }
    }

    pub fn has_import(&self, path_or_name: &str) -> bool {
        self.imports
            .iter()
            .any(|i| i.path == path_or_name || i.local_name() == path_or_name)
    }
}

/// True when `expr` parses as a single Go expression. The generator skips
/// directives whose expression would not compile once injected.
pub fn parses_as_expression(expr: &str) -> bool {
    if expr.contains('\n') {
        return false;
    }
    let wrapped = format!("package p\n\nfunc _() {{\n\t_ = ({})\n}}\n", expr);
    let mut parser = Parser::new();
    if parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .is_err()
    {
        return false;
    }
    match parser.parse(&wrapped, None) {
        Some(tree) => !tree.root_node().has_error(),
        None => false,
    }
}

/// Converts a tree-sitter node position to a [`Span`].
fn node_span(node: Node) -> Span {
    Span {
        start_line: node.start_position().row + 1,
        start_col: node.start_position().column,
        end_line: node.end_position().row + 1,
        end_col: node.end_position().column,
    }
}

fn node_text(node: Node, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or("").to_string()
}

/// Recursive harvest over the whole tree.
fn collect(node: Node, source: &str, file: &mut SourceFile, anchor_found: &mut bool) {
    match node.kind() {
        "comment" => {
            file.comments.push(Comment {
                text: node_text(node, source),
                span: node_span(node),
            });
        }
        "package_clause" => {
            if let Some(name) = node.named_child(0) {
                file.package = node_text(name, source);
            }
            if !*anchor_found {
                file.import_anchor = ImportAnchor::PackageClause {
                    line: node_span(node).end_line,
                };
            }
        }
        "import_declaration" => {
            collect_imports(node, source, file, anchor_found);
        }
        "function_declaration" | "method_declaration" | "func_literal" => {
            if let Some(func) = parse_function(node, source) {
                file.functions.push(func);
            }
        }
        "short_var_declaration" | "assignment_statement" => {
            // Only statement-level assignments can host a check; an
            // assignment in an `if`/`for` header has no insertion point
            // directly after it.
            let stmt_level = node.parent().is_some_and(|p| {
                matches!(
                    p.kind(),
                    "block" | "expression_case" | "default_case" | "communication_case"
                        | "labeled_statement"
                )
            });
            if stmt_level {
                if let Some(assign) = parse_assign(node, source) {
                    file.assigns.push(assign);
                }
            }
        }
        "type_declaration" => {
            collect_type_decls(node, source, file);
        }
        _ => {}
    }

    if node.kind().ends_with("_statement")
        || node.kind() == "short_var_declaration"
        || (node.kind().ends_with("_declaration") && node.kind() != "import_declaration")
    {
        file.stmt_lines.insert(node_span(node).start_line);
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect(child, source, file, anchor_found);
    }
}

fn collect_imports(node: Node, source: &str, file: &mut SourceFile, anchor_found: &mut bool) {
    let mut cursor = node.walk();
    let mut factored = false;
    for child in node.children(&mut cursor) {
        match child.kind() {
            "import_spec_list" => {
                factored = true;
                let mut list_cursor = child.walk();
                for spec in child.children(&mut list_cursor) {
                    if spec.kind() == "import_spec" {
                        push_import_spec(spec, source, file);
                    }
                }
            }
            "import_spec" => {
                push_import_spec(child, source, file);
            }
            _ => {}
        }
    }

    // Prefer the first factored block as insertion anchor; otherwise the
    // first single import line.
    let span = node_span(node);
    let no_real_anchor = !*anchor_found
        || matches!(file.import_anchor, ImportAnchor::PackageClause { .. });
    if factored && no_real_anchor {
        file.import_anchor = ImportAnchor::Block {
            open_line: span.start_line,
        };
        *anchor_found = true;
    } else if !*anchor_found {
        file.import_anchor = ImportAnchor::Single {
            line: span.start_line,
        };
        *anchor_found = true;
    }
}

fn push_import_spec(spec: Node, source: &str, file: &mut SourceFile) {
    let mut alias = None;
    let mut path = String::new();
    let mut cursor = spec.walk();
    for child in spec.children(&mut cursor) {
        match child.kind() {
            "package_identifier" | "dot" | "blank_identifier" => {
                alias = Some(node_text(child, source));
            }
            "interpreted_string_literal" | "raw_string_literal" => {
                path = node_text(child, source)
                    .trim_matches(|c| c == '"' || c == '`')
                    .to_string();
            }
            _ => {}
        }
    }
    if !path.is_empty() {
        file.imports.push(Import { alias, path });
    }
}

fn parse_function(node: Node, source: &str) -> Option<FuncInfo> {
    let body = node.child_by_field_name("body")?;

    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, source))
        .unwrap_or_default();

    let receiver = node.child_by_field_name("receiver").and_then(|recv| {
        let mut cursor = recv.walk();
        let decl = recv
            .children(&mut cursor)
            .find(|c| c.kind() == "parameter_declaration");
        decl.and_then(|decl| parse_params(decl, source).into_iter().next())
    });

    let type_params = node
        .child_by_field_name("type_parameters")
        .map(|tp| parse_type_params(tp, source))
        .unwrap_or_default();

    let params = node
        .child_by_field_name("parameters")
        .map(|p| parse_param_list(p, source))
        .unwrap_or_default();

    let results = match node.child_by_field_name("result") {
        Some(res) if res.kind() == "parameter_list" => parse_param_list(res, source),
        Some(res) => vec![Param {
            name: String::new(),
            typ: node_text(res, source),
        }],
        None => Vec::new(),
    };

    Some(FuncInfo {
        name,
        span: node_span(node),
        body_span: node_span(body),
        receiver,
        type_params,
        params,
        results,
    })
}

fn parse_param_list(list: Node, source: &str) -> Vec<Param> {
    let mut params = Vec::new();
    let mut cursor = list.walk();
    for child in list.children(&mut cursor) {
        match child.kind() {
            "parameter_declaration" | "variadic_parameter_declaration" => {
                params.extend(parse_params(child, source));
            }
            _ => {}
        }
    }
    params
}

/// One `parameter_declaration` may declare several names (`a, b int`) or
/// none (`int`). Variadic declarations keep their `...` in the type text.
fn parse_params(decl: Node, source: &str) -> Vec<Param> {
    let variadic = decl.kind() == "variadic_parameter_declaration";
    let typ = match decl.child_by_field_name("type") {
        Some(t) => {
            let text = node_text(t, source);
            if variadic {
                format!("...{}", text)
            } else {
                text
            }
        }
        None => return Vec::new(),
    };

    let mut names = Vec::new();
    let mut cursor = decl.walk();
    for child in decl.children(&mut cursor) {
        if child.kind() == "identifier" {
            names.push(node_text(child, source));
        }
    }

    if names.is_empty() {
        return vec![Param {
            name: String::new(),
            typ,
        }];
    }
    names
        .into_iter()
        .map(|name| Param {
            name,
            typ: typ.clone(),
        })
        .collect()
}

fn parse_type_params(list: Node, source: &str) -> Vec<TypeParam> {
    let mut out = Vec::new();
    let mut cursor = list.walk();
    for decl in list.children(&mut cursor) {
        if decl.kind() != "type_parameter_declaration" {
            continue;
        }
        let mut names = Vec::new();
        let mut constraint = String::new();
        let mut decl_cursor = decl.walk();
        for child in decl.named_children(&mut decl_cursor) {
            if child.kind() == "identifier" {
                names.push(node_text(child, source));
            } else {
                constraint = node_text(child, source);
            }
        }
        for name in names {
            out.push(TypeParam {
                name,
                constraint: constraint.clone(),
            });
        }
    }
    out
}

fn parse_assign(node: Node, source: &str) -> Option<Assign> {
    let left = node.child_by_field_name("left")?;

    let mut lhs = Vec::new();
    let mut cursor = left.walk();
    for child in left.children(&mut cursor) {
        if child.kind() == "," {
            continue;
        }
        lhs.push(LhsItem {
            text: node_text(child, source),
            span: node_span(child),
        });
    }

    let (op, op_span) = if node.kind() == "short_var_declaration" {
        let tok = find_token(node, ":=")?;
        (AssignOp::Define, node_span(tok))
    } else {
        let op_node = node.child_by_field_name("operator")?;
        let op = match node_text(op_node, source).as_str() {
            "=" => AssignOp::Assign,
            _ => AssignOp::Other,
        };
        (op, node_span(op_node))
    };

    Some(Assign {
        span: node_span(node),
        lhs,
        op,
        op_span,
    })
}

fn find_token<'a>(node: Node<'a>, token: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let result = node.children(&mut cursor).find(|c| c.kind() == token);
    result
}

fn collect_type_decls(node: Node, source: &str, file: &mut SourceFile) {
    let mut cursor = node.walk();
    for spec in node.children(&mut cursor) {
        if spec.kind() != "type_spec" && spec.kind() != "type_alias" {
            continue;
        }
        let Some(name) = spec.child_by_field_name("name") else {
            continue;
        };
        let Some(ty) = spec.child_by_field_name("type") else {
            continue;
        };
        let kind = match ty.kind() {
            "struct_type" => TypeDeclKind::Struct {
                field_types: struct_field_types(ty, source),
            },
            "interface_type" => TypeDeclKind::Interface,
            _ => TypeDeclKind::Named {
                underlying: node_text(ty, source),
            },
        };
        file.types.push(TypeDecl {
            name: node_text(name, source),
            kind,
        });
    }
}

fn struct_field_types(struct_node: Node, source: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = struct_node.walk();
    for child in struct_node.children(&mut cursor) {
        if child.kind() != "field_declaration_list" {
            continue;
        }
        let mut list_cursor = child.walk();
        for field in child.children(&mut list_cursor) {
            if field.kind() != "field_declaration" {
                continue;
            }
            match field.child_by_field_name("type") {
                Some(t) => out.push(node_text(t, source)),
                // Embedded field: the whole declaration is the type.
                None => out.push(node_text(field, source)),
            }
        }
    }
    out
}

/// Line/column of the first syntax error node, for the fatal parse report.
fn first_error_location(root: Node) -> String {
    let mut cursor = root.walk();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return format!("syntax error at line {}, column {}", pos.row + 1, pos.column + 1);
        }
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
    }
    "syntax error".into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn parse(src: &str) -> SourceFile {
        SourceFile::parse(Path::new("main.go"), src.to_string()).expect("parse")
    }

    #[test]
    fn collects_comments_with_positions() {
        let f = parse("package main\n\nfunc main() {\n\t// @pre -nd x\n\t_ = 1\n}\n");
        assert_eq!(f.package, "main");
        assert_eq!(f.comments.len(), 1);
        assert_eq!(f.comments[0].span.start_line, 4);
        assert!(f.line_is_blank_before(4, f.comments[0].span.start_col));
    }

    #[test]
    fn trailing_comment_is_not_standalone() {
        let f = parse("package main\n\nfunc f() {\n\tx := 1 // note\n\t_ = x\n}\n");
        let c = &f.comments[0];
        assert!(!f.line_is_blank_before(c.span.start_line, c.span.start_col));
    }

    #[test]
    fn function_shapes() {
        let f = parse(
            "package main\n\nfunc Greet(u *User, name string) (result *User, err error) {\n\treturn nil, nil\n}\n",
        );
        assert_eq!(f.functions.len(), 1);
        let func = &f.functions[0];
        assert_eq!(func.name, "Greet");
        assert_eq!(func.params.len(), 2);
        assert_eq!(func.params[0].name, "u");
        assert_eq!(func.params[0].typ, "*User");
        assert_eq!(func.results.len(), 2);
        assert_eq!(func.results[0].name, "result");
    }

    #[test]
    fn method_receiver() {
        let f = parse(
            "package main\n\ntype DB struct{}\n\nfunc (db *DB) Query(q string) error {\n\treturn nil\n}\n",
        );
        let func = &f.functions[0];
        let recv = func.receiver.as_ref().expect("receiver");
        assert_eq!(recv.name, "db");
        assert_eq!(recv.typ, "*DB");
        assert_eq!(func.results[0].typ, "error");
    }

    #[test]
    fn shared_param_type() {
        let f = parse("package main\n\nfunc Add(a, b int) int {\n\treturn a + b\n}\n");
        let func = &f.functions[0];
        assert_eq!(func.params.len(), 2);
        assert_eq!(func.params[0].typ, "int");
        assert_eq!(func.params[1].typ, "int");
    }

    #[test]
    fn type_parameters() {
        let f = parse("package main\n\nfunc First[T comparable](items []T) (result T) {\n\treturn\n}\n");
        let func = &f.functions[0];
        assert_eq!(func.type_params.len(), 1);
        assert_eq!(func.type_params[0].name, "T");
        assert_eq!(func.type_params[0].constraint, "comparable");
    }

    #[test]
    fn assignment_blanks_and_operator() {
        let f = parse("package main\n\nfunc f() {\n\tres, _ := query()\n\t_ = res\n}\n");
        let assign = &f.assigns[0];
        assert_eq!(assign.op, AssignOp::Define);
        assert_eq!(assign.last_blank(), Some(1));
        assert_eq!(assign.lhs[1].span.start_line, 4);
    }

    #[test]
    fn plain_assignment_operator() {
        let f = parse("package main\n\nfunc f() {\n\tvar a int\n\ta, _ = pair()\n}\n");
        let assign = f
            .assigns
            .iter()
            .find(|a| a.op == AssignOp::Assign)
            .expect("plain assign");
        assert_eq!(assign.last_blank(), Some(1));
    }

    #[test]
    fn innermost_function_wins() {
        let f = parse(
            "package main\n\nfunc Outer() {\n\tf := func(x *int) {\n\t\t_ = x\n\t}\n\tf(nil)\n}\n",
        );
        let inner = f.enclosing_function(5).expect("enclosing");
        assert_eq!(inner.name, "");
        let outer = f.enclosing_function(7).expect("enclosing");
        assert_eq!(outer.name, "Outer");
    }

    #[test]
    fn imports_and_anchor() {
        let f = parse("package main\n\nimport (\n\t\"fmt\"\n\tlog \"mylog\"\n)\n\nfunc main() { fmt.Println() }\n");
        assert_eq!(f.imports.len(), 2);
        assert!(f.has_import("fmt"));
        assert!(f.has_import("log"));
        assert!(f.has_import("mylog"));
        assert!(matches!(f.import_anchor, ImportAnchor::Block { open_line: 3 }));
    }

    #[test]
    fn single_import_anchor() {
        let f = parse("package main\n\nimport \"fmt\"\n\nfunc main() { fmt.Println() }\n");
        assert!(matches!(f.import_anchor, ImportAnchor::Single { line: 3 }));
    }

    #[test]
    fn no_import_anchor_is_package_clause() {
        let f = parse("package main\n\nfunc main() {}\n");
        assert!(matches!(
            f.import_anchor,
            ImportAnchor::PackageClause { line: 1 }
        ));
    }

    #[test]
    fn struct_decl_fields() {
        let f = parse("package main\n\ntype User struct {\n\tName string\n\tAge  int\n}\n");
        assert_eq!(f.types.len(), 1);
        match &f.types[0].kind {
            TypeDeclKind::Struct { field_types } => {
                assert_eq!(field_types, &vec!["string".to_string(), "int".to_string()]);
            }
            other => panic!("expected struct, got {:?}", other),
        }
    }

    #[test]
    fn expression_validity() {
        assert!(parses_as_expression("len(name) > 0"));
        assert!(parses_as_expression("u != nil"));
        assert!(parses_as_expression("m[k] == 0"));
        assert!(!parses_as_expression("x >"));
        assert!(!parses_as_expression("a ||"));
        assert!(!parses_as_expression(")"));
    }

    #[test]
    fn syntax_error_is_fatal() {
        let err = SourceFile::parse(Path::new("bad.go"), "package main\n\nfunc {{{\n".into());
        assert!(err.is_err());
    }

    #[test]
    fn statement_lines() {
        let f = parse("package main\n\nfunc f() {\n\tx := 1\n\ty := 2\n\t_ = x\n\t_ = y\n}\n");
        assert!(f.stmt_lines.contains(&4));
        assert!(f.stmt_lines.contains(&5));
    }

    #[test]
    fn assignment_following_skips_non_adjacent() {
        let f = parse("package main\n\nfunc f() {\n\tcall()\n\tres, _ := q()\n\t_ = res\n}\n");
        // Next statement after line 3 is the call, not the assignment.
        assert!(f.assignment_following(3).is_none());
        assert!(f.assignment_following(4).is_some());
    }
}

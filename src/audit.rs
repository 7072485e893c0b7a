//! Contract coverage audit
//!
//! Read-only analysis over the same file set the transformer processes:
//! which functions carry contracts, how many error-discarding assignments
//! are guarded, and which functions have no coverage at all. Never touches
//! the cache directory.

use crate::directive::{parse_directive, DirectiveKind};
use crate::error::Result;
use crate::source::SourceFile;
use crate::walk::walk_go_files;
use std::path::{Path, PathBuf};

/// Full audit result for a project.
#[derive(Debug)]
pub struct AuditReport {
    pub root: PathBuf,
    pub files: Vec<FileAudit>,
}

/// Audit information for a single file.
#[derive(Debug)]
pub struct FileAudit {
    pub path: PathBuf,
    pub rel_path: String,
    pub functions: Vec<FuncAudit>,
}

/// Contract coverage for a single function.
#[derive(Debug, Default)]
pub struct FuncAudit {
    pub name: String,
    pub line: usize,
    pub has_pre: bool,
    pub has_post: bool,
    pub directives: Vec<DirectiveAt>,
    /// Multi-value assignments that discard a position with `_`.
    pub error_assignments: usize,
    /// Of those, how many are guarded by an inline or block check.
    pub guarded_assignments: usize,
}

/// A directive and its location.
#[derive(Debug)]
pub struct DirectiveAt {
    pub kind: DirectiveKind,
    pub line: usize,
    pub text: String,
}

/// Aggregate statistics across all files.
#[derive(Debug, Default)]
pub struct AuditSummary {
    pub total_files: usize,
    pub files_with_contracts: usize,

    pub total_funcs: usize,
    pub funcs_with_pre: usize,
    pub funcs_with_post: usize,
    pub funcs_with_any: usize,

    pub total_directives: usize,
    pub pre_count: usize,
    pub post_count: usize,
    pub errcheck_count: usize,
    pub okcheck_count: usize,

    pub total_error_assignments: usize,
    pub guarded_error_assignments: usize,

    pub uncovered_funcs: Vec<UncoveredFunc>,
}

/// A named function with no contract coverage.
#[derive(Debug)]
pub struct UncoveredFunc {
    pub file: String,
    pub name: String,
    pub line: usize,
}

impl AuditReport {
    /// Computes aggregate statistics from the report.
    pub fn summarize(&self) -> AuditSummary {
        let mut s = AuditSummary {
            total_files: self.files.len(),
            ..Default::default()
        };
        for file in &self.files {
            let mut file_has_contracts = false;
            for func in &file.functions {
                s.total_funcs += 1;
                for d in &func.directives {
                    s.total_directives += 1;
                    match d.kind {
                        DirectiveKind::Precondition => s.pre_count += 1,
                        DirectiveKind::Postcondition => s.post_count += 1,
                        DirectiveKind::ErrorCheck => s.errcheck_count += 1,
                        DirectiveKind::BoolCheck => s.okcheck_count += 1,
                    }
                }
                if func.has_pre {
                    s.funcs_with_pre += 1;
                }
                if func.has_post {
                    s.funcs_with_post += 1;
                }
                if !func.directives.is_empty() {
                    s.funcs_with_any += 1;
                    file_has_contracts = true;
                } else if !func.name.is_empty() {
                    s.uncovered_funcs.push(UncoveredFunc {
                        file: file.rel_path.clone(),
                        name: func.name.clone(),
                        line: func.line,
                    });
                }
                s.total_error_assignments += func.error_assignments;
                s.guarded_error_assignments += func.guarded_assignments;
            }
            if file_has_contracts {
                s.files_with_contracts += 1;
            }
        }
        s
    }
}

impl AuditSummary {
    /// Percentage of functions with at least one contract.
    pub fn func_coverage(&self) -> f64 {
        if self.total_funcs == 0 {
            return 100.0;
        }
        self.funcs_with_any as f64 / self.total_funcs as f64 * 100.0
    }

    /// Percentage of discarding assignments guarded by a check directive.
    pub fn error_coverage(&self) -> f64 {
        if self.total_error_assignments == 0 {
            return 100.0;
        }
        self.guarded_error_assignments as f64 / self.total_error_assignments as f64 * 100.0
    }

    /// Writes a human-readable report to stdout.
    pub fn print_report(&self, root: &Path) {
        println!("gird audit — contract coverage report");
        println!("root: {}", root.display());
        println!("{}", "─".repeat(60));

        println!();
        println!("  {:<24} {}", "Files scanned:", self.total_files);
        println!("  {:<24} {}", "Files with contracts:", self.files_with_contracts);
        println!("  {:<24} {}", "Functions found:", self.total_funcs);
        println!();

        println!("  Directives:");
        println!("    @pre                 {}", self.pre_count);
        println!("    @post                {}", self.post_count);
        println!("    @errcheck            {}", self.errcheck_count);
        println!("    @okcheck             {}", self.okcheck_count);
        println!("    total                {}", self.total_directives);
        println!();

        println!("  Coverage:");
        println!(
            "    functions w/ contracts   {} / {}  ({:.1}%)",
            self.funcs_with_any,
            self.total_funcs,
            self.func_coverage()
        );
        println!("      ├─ with @pre           {}", self.funcs_with_pre);
        println!("      └─ with @post          {}", self.funcs_with_post);
        println!(
            "    discards guarded         {} / {}  ({:.1}%)",
            self.guarded_error_assignments,
            self.total_error_assignments,
            self.error_coverage()
        );
        println!();

        if !self.uncovered_funcs.is_empty() {
            println!("{}", "─".repeat(60));
            println!("  Uncovered functions ({}):", self.uncovered_funcs.len());
            for uf in &self.uncovered_funcs {
                println!("    {}:{}  {}", uf.file, uf.line, uf.name);
            }
            println!();
        }

        println!("{}", "─".repeat(60));
        let cov = self.func_coverage();
        println!("  contract coverage:  {}  {:.1}%", render_bar(cov, 30), cov);
        println!();
    }
}

/// Simple ASCII progress bar.
fn render_bar(pct: f64, width: usize) -> String {
    let filled = ((pct / 100.0 * width as f64) as usize).min(width);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(width - filled))
}

/// Walks Go source files and collects contract coverage information.
pub struct Auditor {
    pub root: PathBuf,
}

impl Auditor {
    pub fn new(root: &Path) -> Auditor {
        Auditor {
            root: root.to_path_buf(),
        }
    }

    /// Performs the audit. Files are visited in the walker's sorted order,
    /// so the report is deterministic.
    pub fn run(&self) -> Result<AuditReport> {
        let mut report = AuditReport {
            root: self.root.clone(),
            files: Vec::new(),
        };

        for path in walk_go_files(&self.root)? {
            if let Some(fa) = self.audit_file(&path)? {
                report.files.push(fa);
            }
        }

        Ok(report)
    }

    /// Analyzes one file; `None` when it declares no functions.
    fn audit_file(&self, path: &Path) -> Result<Option<FileAudit>> {
        let text = std::fs::read_to_string(path).map_err(|e| crate::error::Error::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let source = SourceFile::parse(path, text)?;

        let rel_path = path
            .strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();

        let directives: Vec<DirectiveAt> = source
            .comments
            .iter()
            .filter_map(|c| {
                parse_directive(&c.text).map(|d| DirectiveAt {
                    kind: d.kind,
                    line: c.span.start_line,
                    text: c.text.clone(),
                })
            })
            .collect();

        let mut functions = Vec::new();
        for func in &source.functions {
            if func.name.is_empty() {
                continue; // literals are audited as part of their parent
            }
            functions.push(audit_func(&source, func, &directives));
        }

        if functions.is_empty() {
            return Ok(None);
        }

        Ok(Some(FileAudit {
            path: path.to_path_buf(),
            rel_path,
            functions,
        }))
    }
}

fn audit_func(
    source: &SourceFile,
    func: &crate::source::FuncInfo,
    all_directives: &[DirectiveAt],
) -> FuncAudit {
    let mut audit = FuncAudit {
        name: func.name.clone(),
        line: func.span.start_line,
        ..Default::default()
    };

    for d in all_directives {
        if !func.body_span.contains_line(d.line) {
            continue;
        }
        match d.kind {
            DirectiveKind::Precondition => audit.has_pre = true,
            DirectiveKind::Postcondition => audit.has_post = true,
            _ => {}
        }
        audit.directives.push(DirectiveAt {
            kind: d.kind,
            line: d.line,
            text: d.text.clone(),
        });
    }

    count_discards(source, func, all_directives, &mut audit);
    audit
}

/// Counts multi-value assignments that discard a position, and how many of
/// them a check directive guards. Each directive guards exactly one
/// assignment; block-form directives may sit a few lines above a
/// multi-line call.
fn count_discards(
    source: &SourceFile,
    func: &crate::source::FuncInfo,
    all_directives: &[DirectiveAt],
    audit: &mut FuncAudit,
) {
    let mut consumed: Vec<usize> = Vec::new();

    for assign in &source.assigns {
        if !func.body_span.contains_line(assign.span.start_line) {
            continue;
        }
        if assign.lhs.len() < 2 || assign.last_blank().is_none() {
            continue;
        }
        audit.error_assignments += 1;

        let assign_line = assign.span.start_line;
        for d in all_directives {
            let is_check =
                matches!(d.kind, DirectiveKind::ErrorCheck | DirectiveKind::BoolCheck);
            if !is_check || consumed.contains(&d.line) {
                continue;
            }
            // Inline on the host line, or block form shortly before it.
            let guards = d.line == assign.span.end_line
                || (d.line < assign_line && d.line + 5 >= assign_line);
            if guards {
                audit.guarded_assignments += 1;
                consumed.push(d.line);
                break;
            }
        }
    }
}

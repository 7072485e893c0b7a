//! Semantic resolution for a compilation unit
//!
//! A [`Unit`] is the set of non-test Go files sharing one directory, parsed
//! together so that named types declared in any file are visible when
//! generating checks in another. The [`Resolver`] answers the only semantic
//! questions the generator asks: what is the type of this identifier, what
//! does its zero value look like in source text, and does naming that type
//! require an import.
//!
//! Resolution is best-effort by design. Anything unresolvable degrades to a
//! `== nil` check rather than failing the run.

use crate::error::{Error, Result};
use crate::source::{FuncInfo, SourceFile, TypeDeclKind};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Import path of the reflection package used for unconstrained type
/// parameters.
pub const REFLECT_IMPORT: &str = "reflect";

/// All non-test files of one directory, type-checked together.
#[derive(Debug)]
pub struct Unit {
    pub dir: PathBuf,
    pub files: BTreeMap<PathBuf, SourceFile>,
    /// Top-level type declarations across every file of the unit.
    types: BTreeMap<String, TypeDeclKind>,
}

impl Unit {
    /// Parses every `.go` file (excluding `_test.go`) in `dir`, in sorted
    /// order. Parse failures are fatal and carry the file's path.
    pub fn load(dir: &Path) -> Result<Unit> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(|e| Error::Walk {
                path: dir.to_path_buf(),
                source: e,
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file()
                    && p.extension().is_some_and(|e| e == "go")
                    && !p
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.ends_with("_test.go"))
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(Error::EmptyUnit(dir.to_path_buf()));
        }

        let mut files = Vec::new();
        for path in paths {
            let text = std::fs::read_to_string(&path).map_err(|e| Error::Read {
                path: path.clone(),
                source: e,
            })?;
            files.push(SourceFile::parse(&path, text)?);
        }
        Ok(Unit::from_files(dir, files))
    }

    /// Builds a unit from already-parsed files.
    pub fn from_files(dir: &Path, files: Vec<SourceFile>) -> Unit {
        let mut types = BTreeMap::new();
        for file in &files {
            for decl in &file.types {
                types.insert(decl.name.clone(), decl.kind.clone());
            }
        }
        Unit {
            dir: dir.to_path_buf(),
            files: files.into_iter().map(|f| (f.path.clone(), f)).collect(),
            types,
        }
    }

    pub fn file(&self, path: &Path) -> Option<&SourceFile> {
        self.files.get(path)
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver { unit: self }
    }
}

/// Answers type questions against one [`Unit`].
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    unit: &'a Unit,
}

/// Zero-value category of a resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeCategory {
    /// Pointer, slice, map, chan, func, interface: compares against `nil`.
    Nilable,
    Str,
    Int,
    Float,
    Complex,
    Bool,
    /// Comparable struct or array; `literal` is the composite-literal zero,
    /// e.g. `User{}` or `[4]int{}` or `pkg.Config{}`.
    ComparableAggregate { literal: String },
    /// Type parameter constrained to comparable types.
    TypeParamComparable { name: String },
    /// Unconstrained type parameter: reflective zero check.
    TypeParamAny,
    /// Unresolved; the generator falls back to a `nil` comparison.
    Unknown,
}

/// A resolved type: category plus any import the generated check needs.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub category: TypeCategory,
    /// Original type expression text.
    pub text: String,
    /// Import path required to name the type (or `reflect`) in generated
    /// code, if any.
    pub import_path: Option<String>,
}

impl TypeInfo {
    fn unknown() -> TypeInfo {
        TypeInfo {
            category: TypeCategory::Unknown,
            text: String::new(),
            import_path: None,
        }
    }

    /// Source text of the condition that is true when `var` holds its
    /// type's zero value.
    pub fn zero_check(&self, var: &str) -> String {
        match &self.category {
            TypeCategory::Nilable | TypeCategory::Unknown => format!("{} == nil", var),
            TypeCategory::Str => format!("{} == \"\"", var),
            TypeCategory::Int => format!("{} == 0", var),
            TypeCategory::Float => format!("{} == 0.0", var),
            TypeCategory::Complex => format!("{} == 0", var),
            TypeCategory::Bool => format!("!{}", var),
            TypeCategory::ComparableAggregate { literal } => {
                format!("{} == ({})", var, literal)
            }
            TypeCategory::TypeParamComparable { name } => {
                format!("{} == *new({})", var, name)
            }
            TypeCategory::TypeParamAny => {
                format!("reflect.ValueOf(&{}).Elem().IsZero()", var)
            }
        }
    }

    /// Human-readable zero description for panic messages.
    pub fn zero_desc(&self) -> String {
        match &self.category {
            TypeCategory::Nilable | TypeCategory::Unknown => "nil".into(),
            TypeCategory::Str => "empty string".into(),
            TypeCategory::Int | TypeCategory::Float | TypeCategory::Complex => "zero".into(),
            TypeCategory::Bool => "false".into(),
            TypeCategory::ComparableAggregate { literal } => {
                if literal.starts_with('[') {
                    "zero-valued array".into()
                } else {
                    "zero-valued struct".into()
                }
            }
            TypeCategory::TypeParamComparable { name } => {
                format!("zero value of type param {}", name)
            }
            TypeCategory::TypeParamAny => "zero value (reflect)".into(),
        }
    }
}

impl<'a> Resolver<'a> {
    /// Type of `name` within `func`'s signature: receiver, then parameters,
    /// then named results. `None` when the name is not part of the
    /// signature — the caller degrades to a `nil` check.
    pub fn var_type(&self, file: &SourceFile, func: &FuncInfo, name: &str) -> Option<TypeInfo> {
        let param = func
            .receiver
            .iter()
            .chain(func.params.iter())
            .chain(func.results.iter())
            .find(|p| p.name == name)?;
        Some(self.classify(file, Some(func), &param.typ))
    }

    /// Classifies a type expression text into its zero-value category.
    pub fn classify(&self, file: &SourceFile, func: Option<&FuncInfo>, typ: &str) -> TypeInfo {
        let mut seen = HashSet::new();
        self.classify_inner(file, func, typ.trim(), &mut seen)
    }

    fn classify_inner(
        &self,
        file: &SourceFile,
        func: Option<&FuncInfo>,
        typ: &str,
        seen: &mut HashSet<String>,
    ) -> TypeInfo {
        let info = |category| TypeInfo {
            category,
            text: typ.to_string(),
            import_path: None,
        };

        // Reference-like shapes first: all compare against nil.
        if typ.starts_with('*')
            || typ.starts_with("[]")
            || typ.starts_with("...")
            || typ.starts_with("map[")
            || typ.starts_with("chan ")
            || typ.starts_with("chan<-")
            || typ.starts_with("<-chan")
            || typ.starts_with("func(")
            || typ.starts_with("func ")
            || typ.starts_with("interface{")
            || typ.starts_with("interface {")
            || typ == "any"
            || typ == "error"
        {
            return info(TypeCategory::Nilable);
        }

        // Fixed-size array: comparable iff the element type is.
        if typ.starts_with('[') {
            if let Some(close) = typ.find(']') {
                let elem = &typ[close + 1..];
                if self.is_comparable(file, func, elem, seen) {
                    return info(TypeCategory::ComparableAggregate {
                        literal: format!("{}{{}}", typ),
                    });
                }
            }
            return TypeInfo {
                category: TypeCategory::Unknown,
                text: typ.to_string(),
                import_path: None,
            };
        }

        match typ {
            "string" => return info(TypeCategory::Str),
            "bool" => return info(TypeCategory::Bool),
            "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16"
            | "uint32" | "uint64" | "uintptr" | "byte" | "rune" => {
                return info(TypeCategory::Int)
            }
            "float32" | "float64" => return info(TypeCategory::Float),
            "complex64" | "complex128" => return info(TypeCategory::Complex),
            _ => {}
        }

        // Generic type parameter of the enclosing function.
        if let Some(f) = func {
            if let Some(tp) = f.type_params.iter().find(|tp| tp.name == typ) {
                return if tp.constraint == "comparable" {
                    info(TypeCategory::TypeParamComparable {
                        name: tp.name.clone(),
                    })
                } else {
                    TypeInfo {
                        category: TypeCategory::TypeParamAny,
                        text: typ.to_string(),
                        import_path: Some(REFLECT_IMPORT.to_string()),
                    }
                };
            }
        }

        // Qualified type from another unit: assume a comparable named type
        // and record the import its composite literal needs.
        if let Some((pkg, _name)) = typ.split_once('.') {
            let import_path = file
                .imports
                .iter()
                .find(|i| i.local_name() == pkg)
                .map(|i| i.path.clone());
            return TypeInfo {
                category: TypeCategory::ComparableAggregate {
                    literal: format!("{}{{}}", typ),
                },
                text: typ.to_string(),
                import_path,
            };
        }

        // Named type declared somewhere in this unit.
        match self.unit.types.get(typ) {
            Some(TypeDeclKind::Interface) => info(TypeCategory::Nilable),
            Some(TypeDeclKind::Struct { .. }) => {
                if self.is_comparable(file, func, typ, seen) {
                    info(TypeCategory::ComparableAggregate {
                        literal: format!("{}{{}}", typ),
                    })
                } else {
                    // Non-comparable aggregates degrade to the nil fallback,
                    // same as unresolved types.
                    TypeInfo {
                        category: TypeCategory::Unknown,
                        text: typ.to_string(),
                        import_path: None,
                    }
                }
            }
            Some(TypeDeclKind::Named { underlying }) => {
                let underlying = underlying.clone();
                if !seen.insert(typ.to_string()) {
                    return TypeInfo::unknown();
                }
                let mut inner = self.classify_inner(file, func, underlying.trim(), seen);
                // A named basic keeps its basic zero form, but a named
                // aggregate must use its own name in the literal.
                if let TypeCategory::ComparableAggregate { .. } = inner.category {
                    inner.category = TypeCategory::ComparableAggregate {
                        literal: format!("{}{{}}", typ),
                    };
                }
                inner.text = typ.to_string();
                inner
            }
            None => TypeInfo {
                category: TypeCategory::Unknown,
                text: typ.to_string(),
                import_path: None,
            },
        }
    }

    /// Go comparability of a type expression, resolved through the unit's
    /// type table. Conservative: unknown types are not comparable, which
    /// only means the check degrades to the nil fallback.
    fn is_comparable(
        &self,
        file: &SourceFile,
        func: Option<&FuncInfo>,
        typ: &str,
        seen: &mut HashSet<String>,
    ) -> bool {
        let typ = typ.trim();

        if typ.starts_with("[]")
            || typ.starts_with("...")
            || typ.starts_with("map[")
            || typ.starts_with("func(")
            || typ.starts_with("func ")
        {
            return false;
        }
        if typ.starts_with('*')
            || typ.starts_with("chan ")
            || typ.starts_with("chan<-")
            || typ.starts_with("<-chan")
            || typ.starts_with("interface{")
            || typ.starts_with("interface {")
            || typ == "any"
            || typ == "error"
        {
            return true;
        }
        if typ.starts_with('[') {
            return match typ.find(']') {
                Some(close) => self.is_comparable(file, func, &typ[close + 1..], seen),
                None => false,
            };
        }
        if matches!(
            typ,
            "string"
                | "bool"
                | "int"
                | "int8"
                | "int16"
                | "int32"
                | "int64"
                | "uint"
                | "uint8"
                | "uint16"
                | "uint32"
                | "uint64"
                | "uintptr"
                | "byte"
                | "rune"
                | "float32"
                | "float64"
                | "complex64"
                | "complex128"
        ) {
            return true;
        }
        if let Some(f) = func {
            if let Some(tp) = f.type_params.iter().find(|tp| tp.name == typ) {
                return tp.constraint == "comparable";
            }
        }
        if typ.contains('.') {
            return true; // cross-unit named type, assumed comparable
        }

        if !seen.insert(typ.to_string()) {
            return true; // recursive type; Go only allows this via pointers
        }
        match self.unit.types.get(typ) {
            Some(TypeDeclKind::Struct { field_types }) => field_types
                .iter()
                .all(|ft| self.is_comparable(file, func, ft, seen)),
            Some(TypeDeclKind::Interface) => true,
            Some(TypeDeclKind::Named { underlying }) => {
                let underlying = underlying.clone();
                self.is_comparable(file, func, &underlying, seen)
            }
            None => false,
        }
    }
}

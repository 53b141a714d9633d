// AST (Abstract Syntax Tree) definitions for Enforce Script

use std::sync::Arc;

/// Source span of a node: the document it came from plus char offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub uri: Arc<str>,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(uri: &Arc<str>, start: usize, end: usize) -> Self {
        Span {
            uri: Arc::clone(uri),
            start,
            end: end.max(start),
        }
    }

    /// Whether `offset` falls inside this span (end inclusive, for cursors
    /// sitting right after the last char).
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// 1-based line and column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Offset → line/column table for one document.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in text.chars().enumerate() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        LineIndex { line_starts }
    }

    pub fn location(&self, offset: usize) -> SourceLocation {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        SourceLocation::new(line + 1, offset - self.line_starts[line] + 1)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// A declared name with the span of the identifier alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

impl Ident {
    pub fn new(name: impl Into<String>, start: usize, end: usize) -> Self {
        Ident {
            name: name.into(),
            start,
            end,
        }
    }

    /// Zero-width name fabricated by recovery.
    pub fn missing(offset: usize) -> Self {
        Ident::new("", offset, offset)
    }

    pub fn is_missing(&self) -> bool {
        self.name.is_empty()
    }
}

/// `[Name(arg, ...)]` collected as `["Name", "arg", ...]`
pub type Annotation = Vec<String>;

/// Root of a parsed document
#[derive(Debug, Clone)]
pub struct FileNode {
    pub uri: Arc<str>,
    pub body: Vec<Declaration>,
    pub start: usize,
    pub end: usize,
    pub version: i32,
}

// ===== Declarations =====

#[derive(Debug, Clone)]
pub struct GenericParameter {
    pub span: Span,
    pub ident: Ident,
    /// `Class` in `class Foo<Class T>`
    pub constraint: Option<TypeNode>,
    pub modifiers: Vec<String>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub span: Span,
    pub ident: Ident,
    pub modifiers: Vec<String>,
    pub annotations: Vec<Annotation>,
    pub generic_params: Vec<GenericParameter>,
    pub base_class: Option<TypeNode>,
    pub members: Vec<Declaration>,
}

#[derive(Debug, Clone)]
pub struct EnumMemberDecl {
    pub span: Span,
    pub ident: Ident,
    pub modifiers: Vec<String>,
    pub annotations: Vec<Annotation>,
    pub value: Option<Expression>,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub span: Span,
    pub ident: Ident,
    pub modifiers: Vec<String>,
    pub annotations: Vec<Annotation>,
    /// `enum E : int` / `enum E extends F`
    pub base_type: Option<String>,
    pub members: Vec<EnumMemberDecl>,
}

#[derive(Debug, Clone)]
pub struct ParameterDecl {
    pub span: Span,
    pub ident: Ident,
    pub modifiers: Vec<String>,
    pub annotations: Vec<Annotation>,
    pub param_type: TypeNode,
    pub default_value: Option<Expression>,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub span: Span,
    pub ident: Ident,
    pub modifiers: Vec<String>,
    pub annotations: Vec<Annotation>,
    pub return_type: TypeNode,
    pub generic_params: Vec<GenericParameter>,
    pub parameters: Vec<ParameterDecl>,
    /// `None` for `proto`/bodiless declarations; an empty block when bodies
    /// are skipped.
    pub body: Option<Block>,
}

/// How a method relates to its owning class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Constructor,
    Destructor,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub function: FunctionDecl,
    pub kind: MethodKind,
    pub class_name: String,
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub span: Span,
    pub ident: Ident,
    pub modifiers: Vec<String>,
    pub annotations: Vec<Annotation>,
    /// Shared between the siblings of `int a, b, c;`
    pub var_type: Arc<TypeNode>,
    pub initializer: Option<Expression>,
}

#[derive(Debug, Clone)]
pub struct TypedefDecl {
    pub span: Span,
    pub ident: Ident,
    pub modifiers: Vec<String>,
    pub annotations: Vec<Annotation>,
    pub aliased_type: TypeNode,
}

/// Top-level and class-member declarations
#[derive(Debug, Clone)]
pub enum Declaration {
    Class(ClassDecl),
    Enum(EnumDecl),
    Function(FunctionDecl),
    Method(MethodDecl),
    Variable(VarDecl),
    Typedef(TypedefDecl),
}

impl Declaration {
    pub fn span(&self) -> &Span {
        match self {
            Declaration::Class(d) => &d.span,
            Declaration::Enum(d) => &d.span,
            Declaration::Function(d) => &d.span,
            Declaration::Method(d) => &d.function.span,
            Declaration::Variable(d) => &d.span,
            Declaration::Typedef(d) => &d.span,
        }
    }

    pub(crate) fn span_mut(&mut self) -> &mut Span {
        match self {
            Declaration::Class(d) => &mut d.span,
            Declaration::Enum(d) => &mut d.span,
            Declaration::Function(d) => &mut d.span,
            Declaration::Method(d) => &mut d.function.span,
            Declaration::Variable(d) => &mut d.span,
            Declaration::Typedef(d) => &mut d.span,
        }
    }

    pub fn ident(&self) -> &Ident {
        match self {
            Declaration::Class(d) => &d.ident,
            Declaration::Enum(d) => &d.ident,
            Declaration::Function(d) => &d.ident,
            Declaration::Method(d) => &d.function.ident,
            Declaration::Variable(d) => &d.ident,
            Declaration::Typedef(d) => &d.ident,
        }
    }

    pub fn name(&self) -> &str {
        &self.ident().name
    }

    pub fn modifiers(&self) -> &[String] {
        match self {
            Declaration::Class(d) => &d.modifiers,
            Declaration::Enum(d) => &d.modifiers,
            Declaration::Function(d) => &d.modifiers,
            Declaration::Method(d) => &d.function.modifiers,
            Declaration::Variable(d) => &d.modifiers,
            Declaration::Typedef(d) => &d.modifiers,
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        match self {
            Declaration::Class(d) => &d.annotations,
            Declaration::Enum(d) => &d.annotations,
            Declaration::Function(d) => &d.annotations,
            Declaration::Method(d) => &d.function.annotations,
            Declaration::Variable(d) => &d.annotations,
            Declaration::Typedef(d) => &d.annotations,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Declaration::Class(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Declaration::Function(_) | Declaration::Method(_))
    }

    pub fn as_class(&self) -> Option<&ClassDecl> {
        match self {
            Declaration::Class(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDecl> {
        match self {
            Declaration::Function(d) => Some(d),
            Declaration::Method(d) => Some(&d.function),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&VarDecl> {
        match self {
            Declaration::Variable(d) => Some(d),
            _ => None,
        }
    }

    /// Short label used by outlines and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Declaration::Class(_) => "class",
            Declaration::Enum(_) => "enum",
            Declaration::Function(_) => "function",
            Declaration::Method(m) => match m.kind {
                MethodKind::Method => "method",
                MethodKind::Constructor => "constructor",
                MethodKind::Destructor => "destructor",
            },
            Declaration::Variable(_) => "variable",
            Declaration::Typedef(_) => "typedef",
        }
    }

    /// Nested declarations (class members only).
    pub fn children(&self) -> &[Declaration] {
        match self {
            Declaration::Class(d) => &d.members,
            _ => &[],
        }
    }
}

// ===== Types =====

#[derive(Debug, Clone)]
pub enum TypeNode {
    /// `int`, `Foo`
    Reference { name: String, span: Span },
    /// `array<int>`, `map<string, ref Foo>`
    Generic {
        base: String,
        args: Vec<TypeNode>,
        span: Span,
    },
    /// `int[]`, `float[4]`
    Array {
        element: Box<TypeNode>,
        size: Option<Box<Expression>>,
        span: Span,
    },
    /// `auto`
    Auto { span: Span },
}

impl TypeNode {
    pub fn span(&self) -> &Span {
        match self {
            TypeNode::Reference { span, .. }
            | TypeNode::Generic { span, .. }
            | TypeNode::Array { span, .. }
            | TypeNode::Auto { span } => span,
        }
    }

    /// Base name without generic arguments or array suffixes.
    pub fn name(&self) -> &str {
        match self {
            TypeNode::Reference { name, .. } => name,
            TypeNode::Generic { base, .. } => base,
            TypeNode::Array { element, .. } => element.name(),
            TypeNode::Auto { .. } => "auto",
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeNode::Reference { name, .. } if name == "void")
    }
}

impl std::fmt::Display for TypeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeNode::Reference { name, .. } => write!(f, "{}", name),
            TypeNode::Generic { base, args, .. } => {
                write!(f, "{}<", base)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
            TypeNode::Array { element, .. } => write!(f, "{}[]", element),
            TypeNode::Auto { .. } => write!(f, "auto"),
        }
    }
}

// ===== Statements =====

#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// `case X:` / `default:` with the statements up to the next label
#[derive(Debug, Clone)]
pub struct CaseClause {
    /// `None` for `default`
    pub test: Option<Expression>,
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Block(Block),
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
        span: Span,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
        span: Span,
    },
    For {
        init: Vec<Statement>,
        condition: Option<Expression>,
        update: Vec<Expression>,
        body: Box<Statement>,
        span: Span,
    },
    ForEach {
        variables: Vec<VarDecl>,
        iterable: Expression,
        body: Box<Statement>,
        span: Span,
    },
    Switch {
        discriminant: Expression,
        cases: Vec<CaseClause>,
        span: Span,
    },
    Return {
        argument: Option<Expression>,
        span: Span,
    },
    Break {
        span: Span,
    },
    Continue {
        span: Span,
    },
    Declaration {
        declarations: Vec<VarDecl>,
        span: Span,
    },
    Expression {
        expression: Expression,
        span: Span,
    },
}

impl Statement {
    pub fn span(&self) -> &Span {
        match self {
            Statement::Block(block) => &block.span,
            Statement::If { span, .. }
            | Statement::While { span, .. }
            | Statement::For { span, .. }
            | Statement::ForEach { span, .. }
            | Statement::Switch { span, .. }
            | Statement::Return { span, .. }
            | Statement::Break { span }
            | Statement::Continue { span }
            | Statement::Declaration { span, .. }
            | Statement::Expression { span, .. } => span,
        }
    }
}

// ===== Expressions =====

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    BitShl,
    BitShr,
}

impl BinOp {
    pub fn from_token(value: &str) -> Option<BinOp> {
        let op = match value {
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            "%" => BinOp::Mod,
            "==" => BinOp::Eq,
            "!=" => BinOp::Ne,
            "<" => BinOp::Lt,
            "<=" => BinOp::Le,
            ">" => BinOp::Gt,
            ">=" => BinOp::Ge,
            "&&" => BinOp::And,
            "||" => BinOp::Or,
            "&" => BinOp::BitAnd,
            "|" => BinOp::BitOr,
            "^" => BinOp::BitXor,
            "<<" => BinOp::BitShl,
            ">>" => BinOp::BitShr,
            _ => return None,
        };
        Some(op)
    }
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
}

impl AssignOp {
    pub fn from_token(value: &str) -> Option<AssignOp> {
        let op = match value {
            "=" => AssignOp::Assign,
            "+=" => AssignOp::AddAssign,
            "-=" => AssignOp::SubAssign,
            "*=" => AssignOp::MulAssign,
            "/=" => AssignOp::DivAssign,
            "%=" => AssignOp::ModAssign,
            "&=" => AssignOp::AndAssign,
            "|=" => AssignOp::OrAssign,
            "^=" => AssignOp::XorAssign,
            "<<=" => AssignOp::ShlAssign,
            ">>=" => AssignOp::ShrAssign,
            _ => return None,
        };
        Some(op)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,     // -x
    Plus,    // +x
    Not,     // !x
    BitNot,  // ~x
    PreInc,  // ++x
    PreDec,  // --x
    PostInc, // x++
    PostDec, // x--
    Delete,  // delete x
    Thread,  // thread F()
}

/// Semantic subtype of a literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Int,
    Float,
    String,
    Bool,
    Null,
    /// A bare function name passed where a value is expected
    FuncReference,
}

#[derive(Debug, Clone)]
pub enum Expression {
    Binary {
        op: BinOp,
        left: Box<Expression>,
        right: Box<Expression>,
        span: Span,
    },
    Unary {
        op: UnOp,
        operand: Box<Expression>,
        span: Span,
    },
    Assignment {
        op: AssignOp,
        target: Box<Expression>,
        value: Box<Expression>,
        span: Span,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
        span: Span,
    },
    Member {
        object: Box<Expression>,
        property: Ident,
        /// `->` rather than `.`
        arrow: bool,
        /// Placeholder property fabricated for an incomplete `obj.`
        synthetic: bool,
        span: Span,
    },
    ArrayAccess {
        array: Box<Expression>,
        index: Box<Expression>,
        span: Span,
    },
    Cast {
        target_type: TypeNode,
        expr: Box<Expression>,
        span: Span,
    },
    New {
        target_type: TypeNode,
        arguments: Vec<Expression>,
        span: Span,
    },
    Conditional {
        condition: Box<Expression>,
        true_expr: Box<Expression>,
        false_expr: Box<Expression>,
        span: Span,
    },
    Identifier {
        name: String,
        /// `array<int>` used as an expression (static access, casts)
        type_args: Vec<TypeNode>,
        span: Span,
    },
    Literal {
        kind: LiteralKind,
        raw: String,
        span: Span,
    },
    ArrayLiteral {
        elements: Vec<Expression>,
        span: Span,
    },
    This {
        span: Span,
    },
    Super {
        span: Span,
    },
}

impl Expression {
    /// Get the source span of this node
    pub fn span(&self) -> &Span {
        match self {
            Expression::Binary { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Assignment { span, .. }
            | Expression::Call { span, .. }
            | Expression::Member { span, .. }
            | Expression::ArrayAccess { span, .. }
            | Expression::Cast { span, .. }
            | Expression::New { span, .. }
            | Expression::Conditional { span, .. }
            | Expression::Identifier { span, .. }
            | Expression::Literal { span, .. }
            | Expression::ArrayLiteral { span, .. }
            | Expression::This { span }
            | Expression::Super { span } => span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("ab\ncd\n\nx");
        assert_eq!(index.location(0), SourceLocation::new(1, 1));
        assert_eq!(index.location(2), SourceLocation::new(1, 3));
        assert_eq!(index.location(3), SourceLocation::new(2, 1));
        assert_eq!(index.location(7), SourceLocation::new(4, 1));
        assert_eq!(index.line_count(), 4);
    }

    #[test]
    fn test_type_display() {
        let uri: Arc<str> = Arc::from("file:///t.c");
        let int = TypeNode::Reference {
            name: "int".to_string(),
            span: Span::new(&uri, 6, 9),
        };
        let generic = TypeNode::Generic {
            base: "map".to_string(),
            args: vec![int.clone(), int],
            span: Span::new(&uri, 0, 14),
        };
        assert_eq!(generic.to_string(), "map<int, int>");
        assert_eq!(generic.name(), "map");
    }
}

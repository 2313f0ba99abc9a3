// ABOUTME: Tagged-variant AST — statements, expressions, types, and auxiliary records

use crate::position::Position;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Type {
    Named(String),
    Generic(String, Vec<Type>),
    Nullable(Box<Type>),
    Function(Vec<Type>, Box<Type>),
    Union(Vec<Type>),
    Literal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Ownership {
    Ex,
    De,
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    Public,
    Private,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub type_: Option<Type>,
    pub default: Option<Expression>,
    pub rest: bool,
    pub optional: bool,
    pub ownership: Option<Ownership>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub type_: Type,
    pub default: Option<Expression>,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    pub name: String,
    pub value: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantField {
    pub name: String,
    pub type_: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantDecl {
    pub name: String,
    pub fields: Vec<VariantField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSpecifier {
    pub imported: String,
    pub local: Option<String>,
    pub wildcard: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PatternBinding {
    /// `Variant pro|fixum f1, f2, …` — bind individual fields.
    Fields(Vec<String>),
    /// `Variant ut whole` — bind the whole discriminant value.
    Alias(String),
    /// No bindings at all.
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CasePattern {
    Variant {
        name: String,
        binding: PatternBinding,
    },
    Wildcard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCase {
    pub patterns: Vec<CasePattern>,
    pub body: Vec<Statement>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchCase {
    pub value: Expression,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatchClause {
    pub binding: String,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuardClause {
    pub condition: Expression,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralKind {
    Integer(String),
    Fractional(String),
    String(String),
    True,
    False,
    Null,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ObjectProperty {
    KeyValue { key: String, value: Expression },
    Shorthand { name: String },
    Computed { key: Expression, value: Expression },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LambdaBody {
    Expression(Box<Expression>),
    Block(Vec<Statement>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TemplatePart {
    Text(String),
    /// Implicit positional `§` slot.
    Positional,
    /// Explicit indexed `§N` slot.
    Indexed(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RangeKind {
    Inclusive, // `usque`
    Exclusive, // `ante`
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConversionKind {
    Numeratum,
    Fractatum,
    Textatum,
    Bivalentum,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectInitializer {
    pub properties: Vec<ObjectProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expression {
    Identifier {
        name: String,
        position: Position,
    },
    SelfRef {
        position: Position,
    },
    Literal {
        kind: LiteralKind,
        position: Position,
    },
    Binary {
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
        position: Position,
    },
    Unary {
        operator: String,
        operand: Box<Expression>,
        position: Position,
    },
    Assignment {
        operator: String,
        target: Box<Expression>,
        value: Box<Expression>,
        position: Position,
    },
    Ternary {
        condition: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
        position: Position,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
        position: Position,
    },
    Member {
        object: Box<Expression>,
        property: String,
        computed: bool,
        computed_expr: Option<Box<Expression>>,
        non_null: bool,
        position: Position,
    },
    ArrayLiteral {
        elements: Vec<Expression>,
        position: Position,
    },
    ObjectLiteral {
        properties: Vec<ObjectProperty>,
        position: Position,
    },
    Lambda {
        params: Vec<Parameter>,
        body: LambdaBody,
        position: Position,
    },
    New {
        type_: Type,
        args: Vec<Expression>,
        initializer: Option<ObjectInitializer>,
        position: Position,
    },
    Suspend {
        operand: Box<Expression>,
        position: Position,
    },
    Cast {
        operand: Box<Expression>,
        type_: Type,
        position: Position,
    },
    Reinterpret {
        operand: Box<Expression>,
        type_: Type,
        position: Position,
    },
    /// Postfix `expr novum T` — constructs `T` from `expr` as the sole argument.
    PostfixNew {
        operand: Box<Expression>,
        type_: Type,
        position: Position,
    },
    VariantConstruct {
        enclosing_type: Option<String>,
        variant: String,
        fields: Vec<(String, Expression)>,
        position: Position,
    },
    Template {
        parts: Vec<TemplatePart>,
        args: Vec<Expression>,
        position: Position,
    },
    Range {
        start: Box<Expression>,
        end: Box<Expression>,
        kind: RangeKind,
        position: Position,
    },
    Conversion {
        operand: Box<Expression>,
        kind: ConversionKind,
        fallback: Option<Box<Expression>>,
        position: Position,
    },
}

impl Expression {
    pub fn position(&self) -> Position {
        match self {
            Expression::Identifier { position, .. }
            | Expression::SelfRef { position }
            | Expression::Literal { position, .. }
            | Expression::Binary { position, .. }
            | Expression::Unary { position, .. }
            | Expression::Assignment { position, .. }
            | Expression::Ternary { position, .. }
            | Expression::Call { position, .. }
            | Expression::Member { position, .. }
            | Expression::ArrayLiteral { position, .. }
            | Expression::ObjectLiteral { position, .. }
            | Expression::Lambda { position, .. }
            | Expression::New { position, .. }
            | Expression::Suspend { position, .. }
            | Expression::Cast { position, .. }
            | Expression::Reinterpret { position, .. }
            | Expression::PostfixNew { position, .. }
            | Expression::VariantConstruct { position, .. }
            | Expression::Template { position, .. }
            | Expression::Range { position, .. }
            | Expression::Conversion { position, .. } => *position,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeclFlags {
    pub public: bool,
    pub private: bool,
    pub protected: bool,
    pub async_: bool,
    pub extern_: bool,
    pub abstract_: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VarKind {
    Varia,
    Fixum,
    Figendum,
    Variandum,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: String,
    pub generics: Vec<String>,
    pub params: Vec<Parameter>,
    pub return_type: Option<Type>,
    pub body: Option<Vec<Statement>>,
    pub flags: DeclFlags,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDecl {
    pub name: String,
    pub generics: Vec<String>,
    pub protocols: Vec<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<FunctionDecl>,
    pub flags: DeclFlags,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolMethod {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: Option<Type>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolDecl {
    pub name: String,
    pub methods: Vec<ProtocolMethod>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    Block {
        body: Vec<Statement>,
        position: Position,
    },
    Expression {
        expr: Expression,
        position: Position,
    },
    VarDecl {
        kind: VarKind,
        name: String,
        type_: Option<Type>,
        value: Option<Expression>,
        flags: DeclFlags,
        position: Position,
    },
    FunctionDecl(FunctionDecl),
    ClassDecl(ClassDecl),
    ProtocolDecl(ProtocolDecl),
    EnumDecl {
        name: String,
        members: Vec<EnumMember>,
        position: Position,
    },
    UnionDecl {
        name: String,
        variants: Vec<VariantDecl>,
        position: Position,
    },
    TypeAlias {
        name: String,
        type_: Type,
        position: Position,
    },
    Import {
        path: String,
        specifiers: Vec<ImportSpecifier>,
        position: Position,
    },
    If {
        condition: Expression,
        then_branch: Vec<Statement>,
        else_branch: Option<Vec<Statement>>,
        position: Position,
    },
    While {
        condition: Expression,
        body: Vec<Statement>,
        position: Position,
    },
    DoWhile {
        body: Vec<Statement>,
        condition: Expression,
        position: Position,
    },
    ForEach {
        binding: String,
        kind: VarKind,
        iterable: Expression,
        by_key: bool,
        body: Vec<Statement>,
        position: Position,
    },
    Switch {
        discriminant: Expression,
        cases: Vec<SwitchCase>,
        default: Option<Vec<Statement>>,
        position: Position,
    },
    Match {
        discriminants: Vec<Expression>,
        cases: Vec<MatchCase>,
        position: Position,
    },
    GuardChain {
        guards: Vec<GuardClause>,
        else_branch: Option<Vec<Statement>>,
        position: Position,
    },
    Try {
        body: Vec<Statement>,
        catch: Option<CatchClause>,
        finally: Option<Vec<Statement>>,
        position: Position,
    },
    Return {
        value: Option<Expression>,
        position: Position,
    },
    Throw {
        value: Expression,
        position: Position,
    },
    Panic {
        value: Expression,
        position: Position,
    },
    Print {
        severity: PrintSeverity,
        value: Expression,
        position: Position,
    },
    Assert {
        condition: Expression,
        message: Option<Expression>,
        position: Position,
    },
    Break {
        position: Position,
    },
    Continue {
        position: Position,
    },
    Entry {
        body: Vec<Statement>,
        is_async: bool,
        position: Position,
    },
    TestSuite {
        name: String,
        body: Vec<Statement>,
        position: Position,
    },
    TestCase {
        name: String,
        body: Vec<Statement>,
        position: Position,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrintSeverity {
    Info,  // scribe
    Debug, // vide
    Warn,  // mone
}

impl Statement {
    pub fn position(&self) -> Position {
        match self {
            Statement::Block { position, .. }
            | Statement::Expression { position, .. }
            | Statement::VarDecl { position, .. }
            | Statement::EnumDecl { position, .. }
            | Statement::UnionDecl { position, .. }
            | Statement::TypeAlias { position, .. }
            | Statement::Import { position, .. }
            | Statement::If { position, .. }
            | Statement::While { position, .. }
            | Statement::DoWhile { position, .. }
            | Statement::ForEach { position, .. }
            | Statement::Switch { position, .. }
            | Statement::Match { position, .. }
            | Statement::GuardChain { position, .. }
            | Statement::Try { position, .. }
            | Statement::Return { position, .. }
            | Statement::Throw { position, .. }
            | Statement::Panic { position, .. }
            | Statement::Print { position, .. }
            | Statement::Assert { position, .. }
            | Statement::Break { position }
            | Statement::Continue { position }
            | Statement::Entry { position, .. }
            | Statement::TestSuite { position, .. }
            | Statement::TestCase { position, .. } => *position,
            Statement::FunctionDecl(f) => f.position,
            Statement::ClassDecl(c) => c.position,
            Statement::ProtocolDecl(p) => p.position,
        }
    }
}

/// A module: an ordered sequence of top-level statements plus its source origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module {
    pub filename: Option<String>,
    pub start: Position,
    pub statements: Vec<Statement>,
}

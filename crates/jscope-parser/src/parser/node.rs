//! Syntax tree node types.
//!
//! Every node shares the same header (`kind`, byte range, parent) and carries
//! a kind-specific payload in [`NodeData`]. Typed accessors on [`NodeArena`]
//! (`get_block`, `get_try`, ...) return the payload only when it matches.

use super::base::{NodeIndex, NodeList};
use super::flags::ModifierFlags;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    CompilationUnit,

    // Type declarations and members
    ClassDeclaration,
    InterfaceDeclaration,
    EnumDeclaration,
    RecordDeclaration,
    AnnotationTypeDeclaration,
    EnumConstant,
    FieldDeclaration,
    MethodDeclaration,
    ConstructorDeclaration,
    CompactConstructorDeclaration,
    Initializer,
    Parameter,
    RecordComponent,

    // Statements
    Block,
    LocalVariableStatement,
    VariableDeclarator,
    ExpressionStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ForStatement,
    ForEachStatement,
    TryStatement,
    ResourceList,
    Resource,
    CatchClause,
    SwitchStatement,
    SwitchExpression,
    SwitchBody,
    CaseClause,
    ReturnStatement,
    ThrowStatement,
    YieldStatement,
    AssertStatement,
    BreakStatement,
    ContinueStatement,
    LabeledStatement,
    SynchronizedStatement,
    EmptyStatement,

    // Expressions
    Identifier,
    NameExpression,
    Literal,
    ThisExpression,
    SuperExpression,
    FieldAccess,
    MethodCall,
    ArrayAccess,
    ObjectCreation,
    ArrayCreation,
    ArrayInitializer,
    Binary,
    Assignment,
    Unary,
    Conditional,
    Cast,
    InstanceOf,
    Lambda,
    MethodReference,
    ClassLiteral,
    Parenthesized,
    TypeReference,
}

impl NodeKind {
    pub fn is_type_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::ClassDeclaration
                | NodeKind::InterfaceDeclaration
                | NodeKind::EnumDeclaration
                | NodeKind::RecordDeclaration
                | NodeKind::AnnotationTypeDeclaration
        )
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub pos: u32,
    pub end: u32,
    pub parent: NodeIndex,
    pub data: NodeData,
}

/// Kind-specific payload of a node.
#[derive(Clone, Debug)]
pub enum NodeData {
    None,
    CompilationUnit(CompilationUnitData),
    TypeDecl(TypeDeclData),
    EnumConstant(EnumConstantData),
    Variable(VariableData),
    VariableDeclarator(VariableDeclaratorData),
    Method(MethodData),
    Initializer(InitializerData),
    Parameter(ParameterData),
    Block(BlockData),
    Expr(ExprData),
    If(IfData),
    Loop(LoopData),
    For(ForData),
    ForEach(ForEachData),
    Try(TryData),
    ResourceList(ResourceListData),
    Resource(ResourceData),
    CatchClause(CatchClauseData),
    Switch(SwitchData),
    SwitchBody(SwitchBodyData),
    CaseClause(CaseClauseData),
    Assert(AssertData),
    Jump(JumpData),
    Labeled(LabeledData),
    Synchronized(SynchronizedData),
    Name(NameData),
    Literal(LiteralData),
    This(ThisData),
    FieldAccess(FieldAccessData),
    MethodCall(MethodCallData),
    ArrayAccess(ArrayAccessData),
    ObjectCreation(ObjectCreationData),
    ArrayCreation(ArrayCreationData),
    ArrayInitializer(ArrayInitializerData),
    Binary(BinaryData),
    Unary(UnaryData),
    Conditional(ConditionalData),
    Cast(CastData),
    InstanceOf(InstanceOfData),
    Lambda(LambdaData),
    MethodReference(MethodReferenceData),
    ClassLiteral(ClassLiteralData),
    TypeReference(TypeReferenceData),
}

#[derive(Clone, Debug, Default)]
pub struct CompilationUnitData {
    pub file_name: String,
    pub package_name: Option<String>,
    pub imports: Vec<String>,
    pub types: NodeList,
}

/// Class, interface, enum, record and annotation type declarations.
#[derive(Clone, Debug)]
pub struct TypeDeclData {
    pub modifiers: ModifierFlags,
    /// `Identifier` node
    pub name: NodeIndex,
    /// `RecordComponent` nodes (records only)
    pub components: NodeList,
    /// `EnumConstant` nodes (enums only)
    pub enum_constants: NodeList,
    pub members: NodeList,
}

#[derive(Clone, Debug)]
pub struct EnumConstantData {
    pub name: NodeIndex,
    pub arguments: NodeList,
    /// Members of the constant's class body, if it has one.
    pub body: Option<NodeList>,
}

/// Field declarations and local variable declaration statements.
#[derive(Clone, Debug)]
pub struct VariableData {
    pub modifiers: ModifierFlags,
    pub type_ref: NodeIndex,
    /// `VariableDeclarator` nodes
    pub declarators: NodeList,
}

#[derive(Clone, Debug)]
pub struct VariableDeclaratorData {
    pub name: NodeIndex,
    pub initializer: NodeIndex,
}

/// Methods, constructors and compact constructors.
#[derive(Clone, Debug)]
pub struct MethodData {
    pub modifiers: ModifierFlags,
    pub name: NodeIndex,
    pub return_type: NodeIndex,
    pub parameters: NodeList,
    pub body: NodeIndex,
    /// Annotation element default value.
    pub default_value: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct InitializerData {
    pub is_static: bool,
    pub body: NodeIndex,
}

/// Formal, record-component, catch, lambda and for-each parameters.
#[derive(Clone, Debug)]
pub struct ParameterData {
    pub modifiers: ModifierFlags,
    /// `NodeIndex::NONE` for implicitly typed lambda parameters.
    pub type_ref: NodeIndex,
    pub name: NodeIndex,
    pub is_varargs: bool,
}

#[derive(Clone, Debug, Default)]
pub struct BlockData {
    pub statements: NodeList,
}

/// Single-expression payload: expression/return/throw/yield statements and
/// parenthesized expressions.
#[derive(Clone, Debug)]
pub struct ExprData {
    pub expression: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct IfData {
    pub expression: NodeIndex,
    pub then_statement: NodeIndex,
    pub else_statement: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct LoopData {
    pub condition: NodeIndex,
    pub statement: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ForData {
    /// A `LocalVariableStatement` or `ExpressionStatement` nodes.
    pub initializer: NodeList,
    pub condition: NodeIndex,
    /// `ExpressionStatement` nodes
    pub update: NodeList,
    pub statement: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ForEachData {
    /// `Parameter` node declaring the loop variable.
    pub variable: NodeIndex,
    pub expression: NodeIndex,
    pub statement: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct TryData {
    /// `ResourceList` node or `NodeIndex::NONE`.
    pub resources: NodeIndex,
    pub try_block: NodeIndex,
    pub catch_clauses: NodeList,
    pub finally_block: NodeIndex,
}

#[derive(Clone, Debug, Default)]
pub struct ResourceListData {
    pub resources: NodeList,
}

/// A try-with-resources entry: either a declaration (`name` set) or a
/// reference to an existing variable (`name` is `NodeIndex::NONE`).
#[derive(Clone, Debug)]
pub struct ResourceData {
    pub modifiers: ModifierFlags,
    pub type_ref: NodeIndex,
    pub name: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct CatchClauseData {
    pub parameter: NodeIndex,
    pub block: NodeIndex,
}

/// Switch statements and switch expressions.
#[derive(Clone, Debug)]
pub struct SwitchData {
    pub expression: NodeIndex,
    /// `SwitchBody` node
    pub body: NodeIndex,
}

#[derive(Clone, Debug, Default)]
pub struct SwitchBodyData {
    pub clauses: NodeList,
}

#[derive(Clone, Debug)]
pub struct CaseClauseData {
    /// Label expressions; empty for `default`.
    pub labels: NodeList,
    pub is_default: bool,
    /// `case X -> ...` form
    pub is_arrow: bool,
    pub statements: NodeList,
}

#[derive(Clone, Debug)]
pub struct AssertData {
    pub condition: NodeIndex,
    pub message: NodeIndex,
}

#[derive(Clone, Debug, Default)]
pub struct JumpData {
    pub label: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LabeledData {
    pub label: String,
    pub statement: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct SynchronizedData {
    pub expression: NodeIndex,
    pub block: NodeIndex,
}

/// Declared names (`Identifier`) and name uses (`NameExpression`).
#[derive(Clone, Debug)]
pub struct NameData {
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct LiteralData {
    pub text: String,
}

#[derive(Clone, Debug, Default)]
pub struct ThisData {
    /// `Outer` in `Outer.this` / `Outer.super`
    pub qualifier: Option<String>,
}

#[derive(Clone, Debug)]
pub struct FieldAccessData {
    pub expression: NodeIndex,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct MethodCallData {
    /// Receiver expression, or `NodeIndex::NONE` for an unqualified call.
    pub expression: NodeIndex,
    pub name: String,
    pub arguments: NodeList,
}

#[derive(Clone, Debug)]
pub struct ArrayAccessData {
    pub expression: NodeIndex,
    pub index: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ObjectCreationData {
    /// Outer instance in `outer.new Inner()`.
    pub outer: NodeIndex,
    pub type_ref: NodeIndex,
    pub arguments: NodeList,
    /// Members of an anonymous class body.
    pub body: Option<NodeList>,
}

#[derive(Clone, Debug)]
pub struct ArrayCreationData {
    pub type_ref: NodeIndex,
    pub dimensions: NodeList,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug, Default)]
pub struct ArrayInitializerData {
    pub elements: NodeList,
}

/// Binary operators and assignments.
#[derive(Clone, Debug)]
pub struct BinaryData {
    pub left: NodeIndex,
    pub operator: &'static str,
    pub right: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct UnaryData {
    pub operator: &'static str,
    pub operand: NodeIndex,
    pub is_prefix: bool,
}

#[derive(Clone, Debug)]
pub struct ConditionalData {
    pub condition: NodeIndex,
    pub when_true: NodeIndex,
    pub when_false: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct CastData {
    pub type_ref: NodeIndex,
    pub expression: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct InstanceOfData {
    pub expression: NodeIndex,
    pub type_ref: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct LambdaData {
    /// `Parameter` nodes
    pub parameters: NodeList,
    /// A `Block` or an expression.
    pub body: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct MethodReferenceData {
    pub expression: NodeIndex,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct ClassLiteralData {
    pub type_ref: NodeIndex,
}

/// A syntactic type. Types are never name uses, so only the text is kept.
#[derive(Clone, Debug)]
pub struct TypeReferenceData {
    pub text: String,
}

/// Arena holding every node of one compilation unit.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    pub(crate) nodes: Vec<Node>,
}

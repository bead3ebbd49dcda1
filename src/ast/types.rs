//! The query tree (§3). Every variant here is immutable after parsing; the
//! executor only ever reads it.

/// Top-level query representation. The central aggregate of the engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub ctes: Vec<Cte>,
    pub select_list: Vec<SelectItem>,
    pub distinct: bool,
    pub source: Source,
    pub table_alias: Option<String>,
    pub joins: Vec<Join>,
    pub filter: Option<Expression>,
    pub group_by: Vec<String>,
    pub having: Option<Expression>,
    pub order_by: Vec<OrderItem>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A query's `FROM` clause resolves to exactly one of these (I1).
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// A file path, glob, or CTE reference.
    TableName(String),
    Subquery(Box<Query>),
    /// Parsed but not yet given a `FROM`; only `Query::default()` uses this.
    Unset,
}

impl Default for Source {
    fn default() -> Self {
        Source::Unset
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    pub name: String,
    pub query: Query,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expression,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub source: Source,
    pub alias: Option<String>,
    /// `None` only for `Cross`.
    pub condition: Option<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

/// A column reference: `name`, `alias.name`, `*`, or `_file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef(pub String);

/// Every scalar-subquery node carries a stable id so the cache can key on
/// node identity rather than structural equality (§4.3, §4.8).
pub type NodeId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Column(ColumnRef),
    BinaryExpr(BoolOp, Box<Expression>, Box<Expression>),
    ComparisonExpr(ColumnRef, ComparisonOp, Literal),
    ColumnComparisonExpr(ColumnRef, ComparisonOp, ColumnRef),
    InExpr(ColumnRef, Vec<Literal>, bool),
    InSubqueryExpr(ColumnRef, Box<Query>, bool),
    LikeExpr(ColumnRef, String, bool),
    BetweenExpr(ColumnRef, Literal, Literal, bool),
    IsNullExpr(ColumnRef, bool),
    ExistsExpr(Box<Query>, bool),
    FunctionCall(String, Vec<Expression>),
    AggregateExpr(String, Option<ColumnRef>),
    WindowExpr(String, Vec<Expression>, WindowSpec),
    CaseExpr(Vec<(Expression, Expression)>, Option<Box<Expression>>),
    ScalarSubqueryExpr(NodeId, Box<Query>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub column: String,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowSpec {
    pub partition_by: Vec<String>,
    pub order_by: Vec<OrderItem>,
    pub frame: Option<WindowFrame>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Rows,
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBound {
    UnboundedPreceding,
    OffsetPreceding(u64),
    CurrentRow,
    OffsetFollowing(u64),
    UnboundedFollowing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowFrame {
    pub frame_type: FrameType,
    pub start: FrameBound,
    pub end: FrameBound,
}

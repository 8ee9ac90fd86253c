use super::expr::Expr;

// 语句类型别名
pub type Stmt = Box<StmtKind>;

/// 解析器语句枚举
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    // 表达式语句（如 `f(1)`）
    Expr(ExprStmt),
    // 代码块语句
    Block(BlockStmt),
    // 变量声明语句（如 `let x = 5`）
    VarDecl(VarDeclStmt),
    // 赋值语句（如 `x = 1` 或 `obj.a = 1`）
    Assign(AssignStmt),
    // If条件语句
    If(IfStmt),
    // While循环语句
    While(WhileStmt),
    // Return返回语句
    Return(ReturnStmt),
    // Print语句
    Print(PrintStmt),
    // 启动新 fiber（如 `spawn f(1, 2)`）
    Spawn(SpawnStmt),
    // 让出执行权
    Yield(YieldStmt),
    // 通道发送（如 `ch <- 1`）
    Send(SendStmt),
    // 具名函数声明
    FunctionDecl(FunctionDeclStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expression: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclStmt {
    pub name: String,
    pub initializer: Expr,
}

/// 赋值目标
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    Variable(String),
    Property { object: Expr, member: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: AssignTarget,
    pub value: Expr,
}

/// `else if` 以嵌套的 If 语句保存在 else_body 中
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_body: Stmt,
    pub else_body: Option<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Stmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintStmt {
    pub expression: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnStmt {
    pub callee: Expr,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct YieldStmt;

#[derive(Debug, Clone, PartialEq)]
pub struct SendStmt {
    pub channel: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclStmt {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

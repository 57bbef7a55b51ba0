//! Lowers a checked [`mpyc_par::ast::Program`] into a flat [`Tac`] list.
//!
//! The one piece of real logic here is constant folding: an operator
//! applied to two values the generator already knows at compile time
//! (two literals, or a chain of literals threaded through earlier
//! folds) is evaluated directly instead of emitting a TAC instruction
//! for it. [`Value`] is the seam that makes this possible - it
//! distinguishes a value still known by its literal contents from one
//! that has already been forced into a register - mirroring the
//! dynamic type inspection the reference generator this is ported
//! from does at every `gen_*` call (`type(operand) != str`-style
//! checks against the Python value it had just produced).
//!
//! Register and label counters live on the [`IrGen`] instance, not as
//! module-level state: two generators (as in a test harness lowering
//! several programs in the same process) never share a counter.

use mpyc_par::ast::{
    BinaryOp, CodeLine, ElifStatement, Expr, FunctionDef, IfStatement, Literal, Program,
    Statement, UnaryOp,
};
use mpyc_util::Interner;

use crate::tac::{Op, Operand, Tac};

#[derive(Debug, Clone)]
enum Const {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Includes the surrounding quotes, exactly as the lexer produced them.
    Str(String),
}

impl Const {
    fn into_operand(self) -> Operand {
        match self {
            Const::Bool(b) => Operand::Bool(b),
            Const::Int(v) => Operand::Int(v),
            Const::Float(v) => Operand::Float(v),
            Const::Str(s) => Operand::Str(s),
        }
    }

    fn is_str(&self) -> bool {
        matches!(self, Const::Str(_))
    }

    fn truthy(&self) -> bool {
        match self {
            Const::Bool(b) => *b,
            Const::Int(v) => *v != 0,
            Const::Float(v) => *v != 0.0,
            Const::Str(s) => unquote(s).len() != 0,
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Const::Bool(b) => *b as i64 as f64,
            Const::Int(v) => *v as f64,
            Const::Float(v) => *v,
            Const::Str(_) => unreachable!("numeric coercion of a string constant"),
        }
    }

    fn is_float(&self) -> bool {
        matches!(self, Const::Float(_))
    }
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(s)
}

/// Either a value the generator still knows the literal contents of
/// (eligible for further folding) or one that has already been
/// lowered to a register/name operand.
enum Value {
    Const(Const),
    Operand(Operand),
}

impl Value {
    fn into_operand(self) -> Operand {
        match self {
            Value::Const(c) => c.into_operand(),
            Value::Operand(o) => o,
        }
    }
}

pub struct IrGen<'a> {
    interner: &'a Interner,
    tacs: Vec<Tac>,
    next_reg: u32,
    next_label: u32,
}

impl<'a> IrGen<'a> {
    pub fn new(interner: &'a Interner) -> Self {
        Self { interner, tacs: Vec::new(), next_reg: 0, next_label: 0 }
    }

    pub fn generate(mut self, program: &Program) -> Vec<Tac> {
        for line in &program.code_lines {
            self.gen_code_line(line);
        }
        self.tacs
    }

    /// Registers are numbered from 1 (`_t1`, `_t2`, ...), matching the
    /// pre-increment counter this lowering pass is ported from.
    fn fresh_register(&mut self) -> u32 {
        self.next_reg += 1;
        self.next_reg
    }

    /// Not referenced by any instruction this flat TAC model emits
    /// today (there are no explicit jump targets to number), kept for
    /// parity with the generator this is lowering the same way as.
    #[allow(dead_code)]
    fn fresh_label(&mut self) -> u32 {
        let l = self.next_label;
        self.next_label += 1;
        l
    }

    fn emit(&mut self, result: Option<Operand>, op: Op, left: Option<Operand>, right: Option<Operand>) {
        self.tacs.push(Tac { result, op, left, right });
    }

    fn name(&self, sym: mpyc_util::Symbol) -> String {
        self.interner.resolve(sym).to_string()
    }

    fn gen_code_line(&mut self, line: &CodeLine) {
        match line {
            CodeLine::FunctionDef(def) => self.gen_function_def(def),
            CodeLine::Statement(stmt) => self.gen_statement(stmt),
            CodeLine::Expr(expr) => {
                self.gen_expr(expr);
            }
        }
    }

    fn gen_function_def(&mut self, def: &FunctionDef) {
        let params = Operand::Tuple(def.params.iter().map(|p| Operand::Name(self.name(*p))).collect());
        self.emit(None, Op::FuncDef, Some(Operand::Name(self.name(def.name))), Some(params));
        for line in &def.body {
            self.gen_code_line(line);
        }
        self.emit(None, Op::EndLabel, None, None);
    }

    fn gen_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Assignment { name, expr, .. } => {
                let value = self.gen_expr(expr).into_operand();
                self.emit(Some(Operand::Name(self.name(*name))), Op::Copy, Some(value), None);
            }
            Statement::If(if_stmt) => self.gen_if(if_stmt),
            Statement::While { cond, body, .. } => {
                let cond = self.gen_expr(cond).into_operand();
                self.emit(None, Op::While, Some(cond), None);
                for line in body {
                    self.gen_code_line(line);
                }
                self.emit(None, Op::EndLabel, None, None);
            }
            Statement::Return { expr, .. } => {
                let value = expr.as_ref().map(|e| self.gen_expr(e).into_operand());
                self.emit(None, Op::Return, value, None);
            }
            Statement::Print { expr, .. } => {
                let value = expr.as_ref().map(|e| self.gen_expr(e).into_operand());
                self.emit(None, Op::Print, value, None);
            }
        }
    }

    fn gen_if(&mut self, if_stmt: &IfStatement) {
        let cond = self.gen_expr(&if_stmt.cond).into_operand();
        self.emit(None, Op::If, Some(cond), None);
        for line in &if_stmt.if_body {
            self.gen_code_line(line);
        }
        if let Some(elif) = &if_stmt.elif_chain {
            self.gen_elif(elif);
        }
        if let Some(else_body) = &if_stmt.else_body {
            self.emit(None, Op::Else, None, None);
            for line in else_body {
                self.gen_code_line(line);
            }
        }
        self.emit(None, Op::EndLabel, None, None);
    }

    fn gen_elif(&mut self, elif: &ElifStatement) {
        let cond = self.gen_expr(&elif.cond).into_operand();
        self.emit(None, Op::ElseIf, Some(cond), None);
        for line in &elif.body {
            self.gen_code_line(line);
        }
        if let Some(next) = &elif.other {
            self.gen_elif(next);
        }
    }

    fn gen_expr(&mut self, expr: &Expr) -> Value {
        match expr {
            Expr::Id(name, _) => Value::Operand(Operand::Name(self.name(*name))),
            Expr::Literal(lit, _) => Value::Const(const_of(lit)),
            Expr::Unary { op, expr, .. } => self.gen_unary(*op, expr),
            Expr::Binary { op, left, right, .. } => self.gen_binary(*op, left, right),
            Expr::FunctionCall { name, args, .. } => {
                let arg_operands = self.gen_operand_list(args);
                let reg = self.fresh_register();
                self.emit(
                    Some(Operand::Reg(reg)),
                    Op::FCall,
                    Some(Operand::Name(self.name(*name))),
                    Some(Operand::Tuple(arg_operands)),
                );
                Value::Operand(Operand::Reg(reg))
            }
            Expr::List(elements, _) => Value::Operand(Operand::List(self.gen_operand_list(elements))),
            Expr::Tuple(elements, _) => Value::Operand(Operand::Tuple(self.gen_operand_list(elements))),
            Expr::SequenceIndex { seq, index, .. } => {
                let seq = self.gen_expr(seq).into_operand();
                let index = self.gen_expr(index).into_operand();
                let reg = self.fresh_register();
                self.emit(Some(Operand::Reg(reg)), Op::Index, Some(seq), Some(index));
                Value::Operand(Operand::Reg(reg))
            }
            Expr::SequenceSlice { seq, start, end, step, .. } => {
                let seq = self.gen_expr(seq).into_operand();
                let bound = |this: &mut Self, b: &Option<Box<Expr>>| match b {
                    Some(e) => this.gen_expr(e).into_operand(),
                    None => Operand::Absent,
                };
                let start = bound(self, start);
                let end = bound(self, end);
                let step = bound(self, step);
                let reg = self.fresh_register();
                self.emit(Some(Operand::Reg(reg)), Op::Slice, Some(seq), Some(Operand::Tuple(vec![start, end, step])));
                Value::Operand(Operand::Reg(reg))
            }
            Expr::SequenceFunctionCall { arg, .. } => {
                let arg = self.gen_expr(arg).into_operand();
                let reg = self.fresh_register();
                self.emit(Some(Operand::Reg(reg)), Op::FCall, Some(Operand::Name("len".into())), Some(Operand::Tuple(vec![arg])));
                Value::Operand(Operand::Reg(reg))
            }
            Expr::SequenceMethod { seq, method, arg1, arg2, .. } => {
                let seq = self.gen_expr(seq).into_operand();
                let mut args = vec![seq];
                if let Some(a) = arg1 {
                    args.push(self.gen_expr(a).into_operand());
                }
                if let Some(a) = arg2 {
                    args.push(self.gen_expr(a).into_operand());
                }
                let reg = self.fresh_register();
                self.emit(
                    Some(Operand::Reg(reg)),
                    Op::MCall,
                    Some(Operand::Name(method.name().to_string())),
                    Some(Operand::Tuple(args)),
                );
                Value::Operand(Operand::Reg(reg))
            }
        }
    }

    fn gen_operand_list(&mut self, exprs: &[Expr]) -> Vec<Operand> {
        exprs.iter().map(|e| self.gen_expr(e).into_operand()).collect()
    }

    fn gen_unary(&mut self, op: UnaryOp, operand: &Expr) -> Value {
        let value = self.gen_expr(operand);
        if let Value::Const(c) = &value {
            if !c.is_str() {
                return Value::Const(fold_unary(op, c));
            }
        }
        let operand = value.into_operand();
        let reg = self.fresh_register();
        self.emit(Some(Operand::Reg(reg)), Op::Operator(op.as_str()), Some(operand), None);
        Value::Operand(Operand::Reg(reg))
    }

    fn gen_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Value {
        let left = self.gen_expr(left);
        let right = self.gen_expr(right);
        if let (Value::Const(l), Value::Const(r)) = (&left, &right) {
            let both_str = l.is_str() && r.is_str();
            let neither_str = !l.is_str() && !r.is_str();
            if neither_str || (both_str && op == BinaryOp::Add) {
                return Value::Const(fold_binary(op, l, r));
            }
        }
        let left = left.into_operand();
        let right = right.into_operand();
        let reg = self.fresh_register();
        self.emit(Some(Operand::Reg(reg)), Op::Operator(op.as_str()), Some(left), Some(right));
        Value::Operand(Operand::Reg(reg))
    }
}

fn const_of(lit: &Literal) -> Const {
    match lit {
        Literal::Bool(b) => Const::Bool(*b),
        Literal::Int(v) => Const::Int(*v),
        Literal::Float(v) => Const::Float(*v),
        Literal::Str(s) => Const::Str(s.clone()),
    }
}

fn fold_unary(op: UnaryOp, c: &Const) -> Const {
    match op {
        UnaryOp::Plus => c.clone(),
        UnaryOp::Minus => match c {
            Const::Float(v) => Const::Float(-1.0 * v),
            Const::Int(v) => Const::Int(-1 * v),
            Const::Bool(b) => Const::Int(-1 * (*b as i64)),
            Const::Str(_) => unreachable!("unary minus never folds over a string"),
        },
        UnaryOp::Not => Const::Bool(!c.truthy()),
    }
}

fn fold_binary(op: BinaryOp, l: &Const, r: &Const) -> Const {
    use BinaryOp::*;
    match op {
        And => {
            if !l.truthy() {
                l.clone()
            } else {
                r.clone()
            }
        }
        Or => {
            if l.truthy() {
                l.clone()
            } else {
                r.clone()
            }
        }
        Eq => Const::Bool(const_eq(l, r)),
        Ne => Const::Bool(!const_eq(l, r)),
        Add => fold_add(l, r),
        Sub => fold_numeric(l, r, |a, b| a - b),
        Mul => fold_numeric(l, r, |a, b| a * b),
        Div => fold_numeric(l, r, |a, b| a / b),
        Mod => fold_numeric(l, r, |a, b| a - b * (a / b).floor()),
        Pow => fold_numeric(l, r, f64::powf),
        FloorDiv => fold_numeric(l, r, |a, b| (a / b).floor()),
        Gt => Const::Bool(const_cmp(l, r) == std::cmp::Ordering::Greater),
        Lt => Const::Bool(const_cmp(l, r) == std::cmp::Ordering::Less),
        Ge => Const::Bool(const_cmp(l, r) != std::cmp::Ordering::Less),
        Le => Const::Bool(const_cmp(l, r) != std::cmp::Ordering::Greater),
    }
}

fn const_eq(l: &Const, r: &Const) -> bool {
    match (l, r) {
        (Const::Str(a), Const::Str(b)) => unquote(a) == unquote(b),
        _ if !l.is_str() && !r.is_str() => l.as_f64() == r.as_f64(),
        _ => false,
    }
}

fn const_cmp(l: &Const, r: &Const) -> std::cmp::Ordering {
    match (l, r) {
        (Const::Str(a), Const::Str(b)) => unquote(a).cmp(unquote(b)),
        _ => l.as_f64().partial_cmp(&r.as_f64()).unwrap_or(std::cmp::Ordering::Equal),
    }
}

/// Numeric `+`, or string concatenation by stripping the closing quote
/// off `left` and the opening quote off `right` so the two literals
/// join without doubling the quote in between.
fn fold_add(l: &Const, r: &Const) -> Const {
    if let (Const::Str(a), Const::Str(b)) = (l, r) {
        let joined = format!("{}{}", a.strip_suffix('"').unwrap_or(a), b.strip_prefix('"').unwrap_or(b));
        return Const::Str(joined);
    }
    fold_numeric(l, r, |a, b| a + b)
}

fn fold_numeric(l: &Const, r: &Const, f: impl Fn(f64, f64) -> f64) -> Const {
    let result = f(l.as_f64(), r.as_f64());
    if l.is_float() || r.is_float() {
        Const::Float(result)
    } else {
        Const::Int(result as i64)
    }
}

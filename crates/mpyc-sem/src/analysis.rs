//! Walks a parsed [`mpyc_par::ast::Program`], resolving names and
//! checking every expression and statement against the type rules in
//! [`crate::types`]. Errors are reported through the shared `Handler`
//! rather than returned, so one run surfaces every problem in the
//! program instead of stopping at the first one - the same recovery
//! philosophy the lexer and parser use.

use mpyc_par::ast::{
    BinaryOp, CodeLine, ElifStatement, Expr, FunctionDef, IfStatement, Literal, Program,
    SequenceMethod, Statement, UnaryOp,
};
use mpyc_util::{Handler, Span};

use crate::scope::SymbolTable;
use crate::types::{self, Type};

pub struct TypeChecker<'a> {
    table: SymbolTable,
    handler: &'a mut Handler,
}

impl<'a> TypeChecker<'a> {
    pub fn new(handler: &'a mut Handler) -> Self {
        Self { table: SymbolTable::new(), handler }
    }

    /// Consumes the checker and hands back the symbol table, which
    /// the driver keeps around only to decide whether typechecking
    /// found every name it needed to.
    pub fn check_program(mut self, program: &Program) -> SymbolTable {
        for line in &program.code_lines {
            match line {
                CodeLine::FunctionDef(def) => self.check_function(def),
                CodeLine::Statement(stmt) => self.check_statement(stmt),
                CodeLine::Expr(expr) => {
                    self.check_expr(expr);
                }
            }
        }

        self.table
    }

    fn error(&mut self, line: u32, message: impl Into<String>) {
        self.handler.error(message, Span::new(line));
    }

    /// Checks the body first, then declares the name - a call to `f`
    /// inside `f`'s own body, or from any code line before this
    /// definition, is a call to an undeclared function.
    fn check_function(&mut self, def: &FunctionDef) {
        self.table.push_scope();
        for param in &def.params {
            self.table.declare_variable(*param, Type::Any);
        }
        for line in &def.body {
            self.check_code_line(line);
        }
        self.table.pop_scope();

        if !self.table.declare_function(def.clone()) {
            self.error(def.line, "function is already defined");
        }
    }

    fn check_code_line(&mut self, line: &CodeLine) {
        match line {
            CodeLine::FunctionDef(def) => {
                self.error(def.line, "function definitions are only allowed at the top level");
            }
            CodeLine::Statement(stmt) => self.check_statement(stmt),
            CodeLine::Expr(expr) => {
                self.check_expr(expr);
            }
        }
    }

    fn check_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Assignment { name, expr, line } => {
                let ty = self.check_expr(expr);
                match self.table.lookup_variable(*name) {
                    Some(old_ty) if !matches!(old_ty, Type::Any) && !matches!(ty, Type::Any) && old_ty != ty => {
                        self.error(*line, format!("cannot change type from '{old_ty}' to '{ty}'"));
                    }
                    Some(_) => {}
                    None => self.table.declare_variable(*name, ty),
                }
            }
            Statement::If(if_stmt) => self.check_if(if_stmt),
            Statement::While { cond, body, line } => {
                self.check_condition(cond, *line);
                self.table.push_scope();
                for l in body {
                    self.check_code_line(l);
                }
                self.table.pop_scope();
            }
            Statement::Return { expr, .. } | Statement::Print { expr, .. } => {
                if let Some(expr) = expr {
                    self.check_expr(expr);
                }
            }
        }
    }

    fn check_if(&mut self, if_stmt: &IfStatement) {
        self.check_condition(&if_stmt.cond, if_stmt.line);
        self.table.push_scope();
        for l in &if_stmt.if_body {
            self.check_code_line(l);
        }
        self.table.pop_scope();

        if let Some(elif) = &if_stmt.elif_chain {
            self.check_elif(elif);
        }
        if let Some(else_body) = &if_stmt.else_body {
            self.table.push_scope();
            for l in else_body {
                self.check_code_line(l);
            }
            self.table.pop_scope();
        }
    }

    fn check_elif(&mut self, elif: &ElifStatement) {
        self.check_condition(&elif.cond, elif.line);
        self.table.push_scope();
        for l in &elif.body {
            self.check_code_line(l);
        }
        self.table.pop_scope();
        if let Some(next) = &elif.other {
            self.check_elif(next);
        }
    }

    fn check_condition(&mut self, cond: &Expr, _line: u32) {
        self.check_expr(cond);
    }

    fn check_expr(&mut self, expr: &Expr) -> Type {
        match expr {
            Expr::Id(name, line) => match self.table.lookup_variable(*name) {
                Some(ty) => ty,
                None => {
                    self.error(*line, "use of undeclared variable");
                    Type::Any
                }
            },
            Expr::Literal(lit, _) => literal_type(lit),
            Expr::Unary { op, expr, line } => self.check_unary(*op, expr, *line),
            Expr::Binary { op, left, right, line } => self.check_binary(*op, left, right, *line),
            Expr::FunctionCall { name, args, line } => {
                for arg in args {
                    self.check_expr(arg);
                }
                if self.table.lookup_function(*name).is_none() {
                    self.error(*line, "call to undeclared function");
                }
                Type::Any
            }
            Expr::List(elements, _) => {
                for e in elements {
                    self.check_expr(e);
                }
                Type::List
            }
            Expr::Tuple(elements, _) => {
                for e in elements {
                    self.check_expr(e);
                }
                Type::Tuple
            }
            Expr::SequenceIndex { seq, index, line } => {
                let seq_ty = self.check_expr(seq);
                self.check_expr(index);
                if !matches!(seq_ty, Type::List | Type::Tuple | Type::Str | Type::Any) {
                    self.error(*line, format!("'{seq_ty}' is not indexable"));
                }
                Type::Any
            }
            Expr::SequenceSlice { seq, start, end, step, line } => {
                let seq_ty = self.check_expr(seq);
                for part in [start, end, step].into_iter().flatten() {
                    self.check_expr(part);
                }
                if !matches!(seq_ty, Type::List | Type::Tuple | Type::Str | Type::Any) {
                    self.error(*line, format!("'{seq_ty}' cannot be sliced"));
                }
                seq_ty
            }
            Expr::SequenceFunctionCall { arg, line } => {
                let ty = self.check_expr(arg);
                if !matches!(ty, Type::List | Type::Tuple | Type::Str | Type::Any) {
                    self.error(*line, format!("'{ty}' has no len()"));
                }
                Type::Int
            }
            Expr::SequenceMethod { seq, method, arg1, arg2, line } => {
                self.check_sequence_method(seq, *method, arg1, arg2, *line)
            }
        }
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &Expr, line: u32) -> Type {
        let ty = self.check_expr(operand);
        match op {
            UnaryOp::Not => types::logical_or_equality_result(ty, ty),
            UnaryOp::Plus | UnaryOp::Minus => match types::unary_numeric_result(op.as_str(), ty) {
                Ok(result) => result,
                Err(message) => {
                    self.error(line, message);
                    Type::Any
                }
            },
        }
    }

    fn check_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr, line: u32) -> Type {
        let lty = self.check_expr(left);
        let rty = self.check_expr(right);
        let result = match op {
            BinaryOp::And | BinaryOp::Or | BinaryOp::Eq | BinaryOp::Ne => {
                Ok(types::logical_or_equality_result(lty, rty))
            }
            BinaryOp::Gt | BinaryOp::Lt | BinaryOp::Ge | BinaryOp::Le => types::comparison_result(lty, rty),
            BinaryOp::Add => types::add_result(lty, rty),
            BinaryOp::Mul => types::mul_result(lty, rty),
            BinaryOp::Sub | BinaryOp::Div | BinaryOp::Mod | BinaryOp::Pow | BinaryOp::FloorDiv => {
                types::numeric_only_result(op.as_str(), lty, rty)
            }
        };
        match result {
            Ok(ty) => ty,
            Err(message) => {
                self.error(line, message);
                Type::Any
            }
        }
    }

    fn check_sequence_method(
        &mut self,
        seq: &Expr,
        method: SequenceMethod,
        arg1: &Option<Box<Expr>>,
        arg2: &Option<Box<Expr>>,
        line: u32,
    ) -> Type {
        let seq_ty = self.check_expr(seq);
        if !matches!(seq_ty, Type::List | Type::Tuple | Type::Any) {
            self.error(
                line,
                format!("'{}' is only valid on a sequence, found '{seq_ty}'", method.name()),
            );
        }

        let arg1_ty = arg1.as_ref().map(|a| self.check_expr(a));
        if let Some(a) = arg2 {
            self.check_expr(a);
        }

        match method {
            SequenceMethod::Append | SequenceMethod::Extend | SequenceMethod::Insert | SequenceMethod::Pop => {
                if matches!(seq_ty, Type::Tuple) {
                    self.error(
                        line,
                        format!("'{}' is not valid on a tuple, found '{seq_ty}'", method.name()),
                    );
                }
            }
            SequenceMethod::Index | SequenceMethod::Copy => {}
        }

        match method {
            SequenceMethod::Extend => {
                if let Some(arg1_ty) = arg1_ty {
                    if !matches!(arg1_ty, Type::List | Type::Any) {
                        self.error(line, format!("'extend' argument must be a list, found '{arg1_ty}'"));
                    }
                }
            }
            SequenceMethod::Insert => {
                if let Some(arg1_ty) = arg1_ty {
                    if !matches!(arg1_ty, Type::Int | Type::Bool | Type::Any) {
                        self.error(line, format!("'insert' index must be an int, found '{arg1_ty}'"));
                    }
                }
            }
            _ => {}
        }

        match method {
            SequenceMethod::Append | SequenceMethod::Extend | SequenceMethod::Insert => Type::Any,
            SequenceMethod::Index => Type::Int,
            SequenceMethod::Pop => Type::Any,
            SequenceMethod::Copy => seq_ty,
        }
    }
}

fn literal_type(lit: &Literal) -> Type {
    match lit {
        Literal::Bool(_) => Type::Bool,
        Literal::Int(_) => Type::Int,
        Literal::Float(_) => Type::Float,
        Literal::Str(_) => Type::Str,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpyc_lex::Lexer;
    use mpyc_par::Parser;
    use mpyc_util::Interner;

    fn check(src: &str) -> bool {
        let mut handler = Handler::new();
        let mut interner = Interner::new();
        let tokens = Lexer::new(src, &mut handler, &mut interner).tokenize();
        let program = Parser::new(tokens, &mut handler).parse_program();
        TypeChecker::new(&mut handler).check_program(&program);
        handler.has_errors()
    }

    #[test]
    fn well_typed_program_has_no_errors() {
        assert!(!check("x = 1\ny = x + 2\nprint(y)\n"));
    }

    #[test]
    fn undeclared_variable_is_an_error() {
        assert!(check("print(x)\n"));
    }

    #[test]
    fn mixing_incompatible_sequence_types_is_an_error() {
        assert!(check("x = \"a\" + [1]\n"));
    }

    #[test]
    fn calling_an_undeclared_function_is_an_error() {
        assert!(check("x = missing(1)\n"));
    }

    #[test]
    fn a_non_bool_condition_is_not_an_error_since_truthiness_is_deferred() {
        assert!(!check("if 1 + 2:\nprint(1)\n#\n"));
        assert!(!check("if 1 == 2:\nprint(1)\n#\n"));
    }

    #[test]
    fn duplicate_function_definitions_are_rejected() {
        assert!(check("def f():\nreturn 1\n#\ndef f():\nreturn 2\n#\n"));
    }

    #[test]
    fn variables_declared_in_a_function_do_not_leak_out() {
        assert!(check("def f():\ny = 1\nreturn y\n#\nprint(y)\n"));
    }

    #[test]
    fn reassigning_a_variable_to_a_different_type_is_an_error() {
        assert!(check("x = 1\nx = \"s\"\n"));
    }

    #[test]
    fn reassigning_a_variable_to_the_same_type_is_fine() {
        assert!(!check("x = 1\nx = 2\n"));
    }

    #[test]
    fn extending_a_list_with_a_non_list_is_an_error() {
        assert!(check("x = [1, 2]\nx.extend(3)\n"));
    }

    #[test]
    fn inserting_with_a_non_int_index_is_an_error() {
        assert!(check("x = [1, 2]\nx.insert(\"a\", 3)\n"));
    }

    #[test]
    fn appending_to_a_tuple_is_an_error() {
        assert!(check("x = (1, 2)\nx.append(3)\n"));
    }

    #[test]
    fn indexing_a_tuple_is_not_an_error() {
        assert!(!check("x = (1, 2)\ny = x.index(1)\n"));
    }

    #[test]
    fn copying_a_tuple_returns_a_tuple() {
        assert!(!check("x = (1, 2)\ny = x.copy()\nz = y.index(1)\n"));
    }

    #[test]
    fn calling_a_function_before_its_definition_is_undeclared() {
        assert!(check("x = f()\ndef f():\nreturn 1\n#\n"));
    }
}

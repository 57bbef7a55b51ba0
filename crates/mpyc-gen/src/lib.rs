//! mpyc-gen - emits a targetJ (Java-shaped) source file from a TAC list.
//!
//! [`TargetGen`] walks the flat [`mpyc_ir::Tac`] stream once, in order,
//! translating each instruction into one or more Java lines. It leans
//! on two pieces of state threaded through that single pass:
//!
//! - [`scope::VarScope`] mirrors the block nesting `if`/`while`/a
//!   function body introduce, so an assignment to a name already in
//!   scope becomes a plain re-assign (`x = 1`) rather than a
//!   redeclaration (`int x = 1`).
//! - a register bank (`regs`) recording the Java expression each TAC
//!   temporary evaluated to, since a register is referenced by every
//!   later instruction that consumes it rather than re-evaluated.
//!
//! Every `fcall`/`mcall` result is provisionally a bare statement (its
//! value is evaluated only for a side effect); a forward scan over the
//! TAC list before the main pass un-marks any such result that a later
//! instruction references as an operand, which is the only way to tell
//! a free-standing `f(x)` apart from `y = f(x)` from the TAC alone.

pub mod scope;
pub mod runtime;

use mpyc_ir::{Op, Operand, Tac};
use mpyc_util::FxHashSet;
use scope::VarScope;

pub struct TargetGen {
    regs: Vec<String>,
    in_func_def: bool,
    function_defs: Vec<String>,
    target: Vec<String>,
    scope: VarScope,
    statement_form_regs: FxHashSet<u32>,
}

impl TargetGen {
    pub fn new() -> Self {
        Self {
            regs: Vec::new(),
            in_func_def: false,
            function_defs: Vec::new(),
            target: Vec::new(),
            scope: VarScope::new(),
            statement_form_regs: FxHashSet::default(),
        }
    }

    /// Renders `tacs` into a complete `.java` source file for a public
    /// class named `class_name`.
    pub fn generate_target(mut self, tacs: &[Tac], class_name: &str) -> String {
        self.statement_form_regs = statement_form_registers(tacs);

        let mut starting_code = vec!["import java.util.*".to_string(), format!("public class {class_name} {{")];
        starting_code.extend(runtime::step_method_lines());
        self.target.push("public static void main(String args[]) {".to_string());

        let mut indents = 0;
        let starting_code = runtime::format_lines(&starting_code, &mut indents);

        for tac in tacs {
            self.generate(tac);
        }
        self.target.push("}".to_string());
        self.target.push("}".to_string());

        let function_defs = runtime::format_lines(&self.function_defs, &mut indents);
        let target = runtime::format_lines(&self.target, &mut indents);

        let mut out = String::new();
        for line in starting_code.iter().chain(function_defs.iter()).chain(target.iter()) {
            out.push_str(line);
        }
        out
    }

    fn write(&mut self, line: String) {
        if self.in_func_def {
            self.function_defs.push(line);
        } else {
            self.target.push(line);
        }
    }

    /// Registers are numbered from 1, matching the IR generator's
    /// counter, so the returned number can be used directly as an
    /// `Operand::Reg` tag.
    fn assign_reg(&mut self, value: String) -> u32 {
        self.regs.push(value);
        self.regs.len() as u32
    }

    fn get_reg(&self, n: u32) -> &str {
        &self.regs[(n - 1) as usize]
    }

    fn translate_expr(&self, operand: &Operand) -> String {
        match operand {
            Operand::Reg(n) => self.get_reg(*n).to_string(),
            Operand::Name(s) => s.clone(),
            Operand::Str(s) => s.clone(),
            Operand::Bool(true) => "true".to_string(),
            Operand::Bool(false) => "false".to_string(),
            Operand::Int(v) => v.to_string(),
            Operand::Float(v) => mpyc_ir::tac::format_float(*v),
            Operand::List(items) | Operand::Tuple(items) => self.translate_seq(items),
            Operand::Absent => unreachable!("an absent slice bound is never handed to translate_expr directly"),
        }
    }

    fn translate_seq(&self, items: &[Operand]) -> String {
        let elems = items.iter().map(|e| self.translate_expr(e)).collect::<Vec<_>>().join(", ");
        format!("new ArrayList(Arrays.asList({elems}))")
    }

    /// A slice bound or sequence index must be a Java `int`, not the
    /// boxed `Object`/`Integer` an arbitrary expression might evaluate
    /// to.
    fn translate_into_integer(&self, operand: &Operand) -> String {
        match operand {
            Operand::Reg(n) => format!("(Integer) {}", self.get_reg(*n)),
            Operand::Int(v) => format!("Integer.valueOf({v})"),
            Operand::Bool(b) => format!("Integer.valueOf({})", *b as i64),
            other => unreachable!("translate_into_integer given a non-numeric operand: {other:?}"),
        }
    }

    fn translate_operator(op: &str) -> &str {
        match op {
            "or" => "||",
            "and" => "&&",
            "not" => "!",
            other => other,
        }
    }

    fn generate(&mut self, tac: &Tac) {
        match tac.op {
            Op::Copy => self.gen_assign(tac),
            Op::Operator(op) => match &tac.right {
                Some(_) => self.gen_bin_op(tac, op),
                None => self.gen_unary_op(tac, op),
            },
            Op::FuncDef => self.gen_func_def(tac),
            Op::If => self.gen_if(tac),
            Op::ElseIf => self.gen_else_if(tac),
            Op::Else => self.gen_else(tac),
            Op::While => self.gen_while(tac),
            Op::EndLabel => self.gen_end_label(),
            Op::Print => self.gen_print(tac),
            Op::Return => self.gen_return(tac),
            Op::FCall => self.gen_func_call(tac),
            Op::Index => self.gen_seq_index(tac),
            Op::Slice => self.gen_seq_slice(tac),
            Op::MCall => self.gen_seq_method_call(tac),
        }
    }

    fn gen_assign(&mut self, tac: &Tac) {
        let left = tac.left.as_ref().expect("copy requires a source operand");
        let result = tac.result.as_ref().expect("copy requires a destination name");
        let Operand::Name(name) = result else {
            unreachable!("an assignment's destination is always a bare name");
        };

        let (type_str, expr_str) = match left {
            Operand::Reg(n) => ("Object".to_string(), self.get_reg(*n).to_string()),
            Operand::Name(source) => (self.scope.type_of(source), source.clone()),
            Operand::Bool(_) => ("boolean".to_string(), self.translate_expr(left)),
            Operand::Int(_) => ("int".to_string(), self.translate_expr(left)),
            Operand::Float(_) => ("double".to_string(), self.translate_expr(left)),
            Operand::Str(_) => ("String".to_string(), self.translate_expr(left)),
            Operand::List(_) | Operand::Tuple(_) => ("ArrayList".to_string(), self.translate_expr(left)),
            Operand::Absent => unreachable!("an assignment never copies an absent value"),
        };

        if self.scope.is_declared(name) {
            self.write(format!("{name} = {expr_str}"));
        } else {
            self.scope.declare(name, &type_str);
            self.write(format!("{type_str} {name} = {expr_str}"));
        }
    }

    fn gen_unary_op(&mut self, tac: &Tac, op: &str) {
        let op = Self::translate_operator(op);
        let operand = self.translate_expr(tac.left.as_ref().expect("unary op needs an operand"));
        let expr = if op == "!" {
            format!("({op} (Boolean) ({operand}))")
        } else {
            format!("({op} ({operand}))")
        };
        self.assign_reg(expr);
    }

    fn gen_bin_op(&mut self, tac: &Tac, op: &str) {
        let op = Self::translate_operator(op);
        let left = self.translate_expr(tac.left.as_ref().expect("binary op needs a left operand"));
        let right = self.translate_expr(tac.right.as_ref().expect("binary op needs a right operand"));
        let expr = match op {
            "**" => format!("Math.pow({left}, {right})"),
            "//" => format!("Math.floor(({left}) / ({right}))"),
            "&&" | "||" => format!("(Boolean) (((Boolean) {left}) {op} ((Boolean) {right}))"),
            _ => format!("(({left}) {op} ({right}))"),
        };
        self.assign_reg(expr);
    }

    fn gen_func_def(&mut self, tac: &Tac) {
        self.in_func_def = true;
        self.scope.push();

        let Operand::Name(fname) = tac.left.as_ref().expect("fdef needs a name") else {
            unreachable!("a function name is always a bare name operand");
        };
        let Operand::Tuple(params) = tac.right.as_ref().expect("fdef needs a params tuple") else {
            unreachable!("fdef's params are always carried as a tuple");
        };

        let params_str = params
            .iter()
            .map(|p| {
                let Operand::Name(p) = p else { unreachable!("a parameter is always a bare name") };
                self.scope.declare(p, "Object");
                format!("Object {p}")
            })
            .collect::<Vec<_>>()
            .join(", ");

        self.write(format!("static Object {fname}({params_str}) {{"));
    }

    fn gen_return(&mut self, tac: &Tac) {
        let stmt = match &tac.left {
            None => "return null".to_string(),
            Some(expr) => format!("return {}", self.translate_expr(expr)),
        };
        self.write(stmt);
    }

    fn gen_seq_index(&mut self, tac: &Tac) {
        let lst = self.translate_expr(tac.left.as_ref().expect("index needs a sequence"));
        let index = self.translate_into_integer(tac.right.as_ref().expect("index needs an index operand"));
        self.assign_reg(format!("{lst}.get({index})"));
    }

    fn gen_seq_slice(&mut self, tac: &Tac) {
        let lst = self.translate_expr(tac.left.as_ref().expect("slice needs a sequence"));
        let Operand::Tuple(parts) = tac.right.as_ref().expect("slice needs a (start, end, step) tuple") else {
            unreachable!("a slice's bounds are always carried as a tuple");
        };
        let [start, end, step] = &parts[..] else {
            unreachable!("a slice always carries exactly three bounds");
        };

        let start_str = if matches!(start, Operand::Absent) { "0".to_string() } else { self.translate_into_integer(start) };
        let end_str = if matches!(end, Operand::Absent) { format!("{lst}.size()") } else { self.translate_into_integer(end) };

        let expr = if matches!(step, Operand::Absent) {
            format!("{lst}.subList({start_str}, {end_str})")
        } else {
            format!("step_method({lst}, {start_str}, {end_str}, {})", self.translate_into_integer(step))
        };
        self.assign_reg(expr);
    }

    fn gen_func_call(&mut self, tac: &Tac) {
        let Operand::Name(fname) = tac.left.as_ref().expect("fcall needs a function name") else {
            unreachable!("a function name is always a bare name operand");
        };
        let Operand::Tuple(args) = tac.right.as_ref().expect("fcall needs an args tuple") else {
            unreachable!("fcall's arguments are always carried as a tuple");
        };

        let expr = if fname == "len" {
            format!("{}.size()", self.translate_expr(&args[0]))
        } else {
            let args_str = args.iter().map(|a| self.translate_expr(a)).collect::<Vec<_>>().join(", ");
            format!("{fname}({args_str})")
        };

        let reg = self.assign_reg(expr.clone());
        if self.statement_form_regs.contains(&reg) {
            self.write(expr);
        }
    }

    fn gen_seq_method_call(&mut self, tac: &Tac) {
        let _ = tac;
        let Operand::Name(method) = tac.left.as_ref().expect("mcall needs a method name") else {
            unreachable!("a method name is always a bare name operand");
        };
        let Operand::Tuple(args) = tac.right.as_ref().expect("mcall needs an args tuple") else {
            unreachable!("mcall's arguments are always carried as a tuple");
        };

        let lst = self.translate_expr(&args[0]);
        let rest = &args[1..];

        let mut expr = format!("{lst}.");
        match method.as_str() {
            "append" => expr.push_str("add("),
            "extend" => expr.push_str("addAll("),
            "index" => expr.push_str("indexOf("),
            "insert" => expr.push_str("add((int)"),
            "pop" => {
                if rest.is_empty() {
                    expr.push_str(&format!("remove({lst}.size() - 1"));
                } else {
                    expr.push_str("remove(");
                }
            }
            "copy" => expr.push_str("clone("),
            other => unreachable!("unrecognized sequence method: {other}"),
        }

        if let Some((first, tail)) = rest.split_first() {
            expr.push_str(&self.translate_expr(first));
            for arg in tail {
                expr.push_str(&format!(", {}", self.translate_expr(arg)));
            }
        }
        expr.push(')');

        let reg = self.assign_reg(expr.clone());
        if self.statement_form_regs.contains(&reg) {
            self.write(expr);
        }
    }

    fn gen_if(&mut self, tac: &Tac) {
        let cond = self.translate_expr(tac.left.as_ref().expect("if needs a condition"));
        self.write(format!("if ((Boolean) {cond}) {{"));
        self.scope.push();
    }

    fn gen_else_if(&mut self, tac: &Tac) {
        let cond = self.translate_expr(tac.left.as_ref().expect("else-if needs a condition"));
        self.write(format!("else if ((Boolean) {cond}) {{"));
        self.scope.push();
    }

    fn gen_else(&mut self, _tac: &Tac) {
        self.write("else {".to_string());
        self.scope.push();
    }

    fn gen_while(&mut self, tac: &Tac) {
        let cond = self.translate_expr(tac.left.as_ref().expect("while needs a condition"));
        self.write(format!("while ({cond}) {{"));
        self.scope.push();
    }

    fn gen_end_label(&mut self) {
        self.scope.pop();
        self.write("}".to_string());
        if self.scope.depth() == 1 {
            self.in_func_def = false;
        }
    }

    fn gen_print(&mut self, tac: &Tac) {
        let arg = tac.left.as_ref().map(|e| self.translate_expr(e)).unwrap_or_default();
        self.write(format!("System.out.println({arg})"));
    }
}

impl Default for TargetGen {
    fn default() -> Self {
        Self::new()
    }
}

/// Registers whose `fcall`/`mcall` result is never read back by a
/// later instruction - those calls are emitted as a bare statement in
/// addition to having their expression cached for any (absent) reader.
fn statement_form_registers(tacs: &[Tac]) -> FxHashSet<u32> {
    let mut marked = FxHashSet::default();
    for tac in tacs {
        for operand in [&tac.left, &tac.right] {
            if let Some(operand) = operand {
                unmark_referenced(operand, &mut marked);
            }
        }
        if matches!(tac.op, Op::FCall | Op::MCall) {
            if let Some(Operand::Reg(n)) = tac.result {
                marked.insert(n);
            }
        }
    }
    marked
}

fn unmark_referenced(operand: &Operand, marked: &mut FxHashSet<u32>) {
    match operand {
        Operand::Reg(n) => {
            marked.remove(n);
        }
        Operand::List(items) | Operand::Tuple(items) => {
            for item in items {
                unmark_referenced(item, marked);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpyc_ir::IrGen;
    use mpyc_lex::Lexer;
    use mpyc_par::Parser;
    use mpyc_sem::TypeChecker;
    use mpyc_util::{Handler, Interner};

    fn compile_to_java(src: &str) -> String {
        let mut handler = Handler::new();
        let mut interner = Interner::new();
        let tokens = Lexer::new(src, &mut handler, &mut interner).tokenize();
        let program = Parser::new(tokens, &mut handler).parse_program();
        TypeChecker::new(&mut handler).check_program(&program);
        assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
        let tacs = IrGen::new(&interner).generate(&program);
        TargetGen::new().generate_target(&tacs, "Prog")
    }

    #[test]
    fn assignment_declares_the_java_type_once_then_reassigns() {
        let java = compile_to_java("x = 1\nx = 2\n");
        assert!(java.contains("int x = 1;"));
        assert!(java.contains("x = 2;"));
        assert!(!java.contains("int x = 2;"));
    }

    #[test]
    fn standalone_call_is_written_as_a_statement() {
        let java = compile_to_java("def f(a):\nreturn a\n#\nf(1)\n");
        assert!(java.contains("f(1);"));
    }

    #[test]
    fn call_used_in_an_expression_is_not_also_written_standalone() {
        let java = compile_to_java("def f(a):\nreturn a\n#\nx = f(1) + 1\n");
        assert!(!java.lines().any(|l| l.trim() == "f(1);"));
    }

    #[test]
    fn print_wraps_the_expression_in_println() {
        let java = compile_to_java("print(1)\n");
        assert!(java.contains("System.out.println(1);"));
    }

    #[test]
    fn slice_with_a_step_calls_the_runtime_helper() {
        let java = compile_to_java("xs = [1, 2, 3]\ny = xs[::2]\n");
        assert!(java.contains("step_method("));
    }

    #[test]
    fn slice_without_a_step_uses_sublist() {
        let java = compile_to_java("xs = [1, 2, 3]\ny = xs[0:2]\n");
        assert!(java.contains(".subList("));
    }

    #[test]
    fn power_and_floor_division_translate_to_math_calls() {
        let java = compile_to_java("x = 2 ** y\nz = 7 // y\n");
        assert!(java.contains("Math.pow"));
        assert!(java.contains("Math.floor"));
    }

    #[test]
    fn function_exits_function_def_mode_after_its_end_label() {
        let java = compile_to_java("def f():\nreturn 1\n#\nx = 1\n");
        assert!(java.contains("int x = 1;"));
    }
}

//! Printer: program -> canonical IR1 text.
//!
//! Functions are separated by a blank line. Instructions are indented by
//! two spaces, labels are not. A zero offset is omitted from addresses.

use ir1_common::{Addr, Func, Inst, Operand, Program, UnOp};

/// Print a program as canonical text.
///
/// The output parses back to an identical program
/// (`parse(print(program)) == program`).
pub fn print(program: &Program) -> String {
    let mut out = String::new();
    for (i, func) in program.funcs.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        print_func(&mut out, func);
    }
    out
}

fn print_func(out: &mut String, func: &Func) {
    out.push_str(&format!("{} ({})\n", func.name, func.params.join(", ")));
    if !func.locals.is_empty() {
        out.push_str(&format!("({})\n", func.locals.join(", ")));
    }
    out.push_str("{\n");
    for inst in &func.code {
        if !matches!(inst, Inst::Label { .. }) {
            out.push_str("  ");
        }
        out.push_str(&inst_text(inst));
        out.push('\n');
    }
    out.push_str("}\n");
}

fn inst_text(inst: &Inst) -> String {
    match inst {
        Inst::Binop { op, dst, lhs, rhs } => {
            format!("{dst} = {} {op} {}", operand(lhs), operand(rhs))
        }
        // `- 5` keeps the minus from fusing into a literal.
        Inst::Unop { op, dst, src } => match (op, src) {
            (UnOp::Neg, Operand::Int(_)) => format!("{dst} = {op} {}", operand(src)),
            _ => format!("{dst} = {op}{}", operand(src)),
        },
        Inst::Move { dst, src } => format!("{dst} = {}", operand(src)),
        Inst::Load { dst, addr } => format!("{dst} = {}", address(addr)),
        Inst::Store { addr, src } => format!("{} = {}", address(addr), operand(src)),
        Inst::Jump { label } => format!("goto {label}"),
        Inst::CJump {
            op,
            lhs,
            rhs,
            label,
        } => format!("if {} {op} {} goto {label}", operand(lhs), operand(rhs)),
        Inst::Call { callee, args, dst } => {
            let args: Vec<String> = args.iter().map(operand).collect();
            let call = format!("call {callee}({})", args.join(", "));
            match dst {
                Some(dst) => format!("{dst} = {call}"),
                None => call,
            }
        }
        Inst::Return { val: Some(val) } => format!("return {}", operand(val)),
        Inst::Return { val: None } => "return".to_string(),
        Inst::Label { name } => format!("{name}:"),
    }
}

fn address(addr: &Addr) -> String {
    match addr.offset {
        0 => format!("[{}]", operand(&addr.base)),
        offset => format!("{offset}[{}]", operand(&addr.base)),
    }
}

fn operand(op: &Operand) -> String {
    match op {
        Operand::Name(name) => name.clone(),
        Operand::Int(i) => i.to_string(),
        Operand::Bool(b) => b.to_string(),
        Operand::Str(s) => quote(s),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

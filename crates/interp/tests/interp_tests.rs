//! Integration tests for the IR1 interpreter.
//!
//! Programs are written as IR1 text and parsed, except where a test needs
//! a shape the text syntax cannot express.

use ir1_common::{Func, Inst, Operand, Program, Value};
use ir1_interp::{
    run, run_with_config, Config, Heap, Interpreter, ProgramIndex, RuntimeError, Site,
};
use ir1_parser::parse;
use proptest::prelude::*;

// ============================================================
// Helper functions
// ============================================================

/// Parse and run `text`, returning stdout and the final heap.
fn exec(text: &str) -> Result<(String, Heap), RuntimeError> {
    exec_with(text, Config::default())
}

fn exec_with(text: &str, config: Config) -> Result<(String, Heap), RuntimeError> {
    let program = parse(text).unwrap_or_else(|e| panic!("bad test program: {e}"));
    let mut out = Vec::new();
    let heap = run_with_config(&program, config, &mut out)?;
    Ok((String::from_utf8(out).unwrap(), heap))
}

/// Output of a program that must succeed.
fn output(text: &str) -> String {
    exec(text).unwrap().0
}

/// Error of a program that must fail.
fn error(text: &str) -> RuntimeError {
    exec(text).unwrap_err()
}

/// Wrap a body in a `_main` with no parameters.
fn main_body(body: &str) -> String {
    format!("_main ()\n{{\n{body}\n}}\n")
}

fn site(func: &str, pc: usize) -> Site {
    Site::new(func, pc)
}

// ============================================================
// End-to-end scenarios
// ============================================================

#[test]
fn add_two_numbers() {
    let text = "\
_main ()
{
  t = call add(2, 3)
  call _printInt(t)
}

add (a, b)
{
  r = a + b
  return r
}
";
    assert_eq!(output(text), "5\n");
}

#[test]
fn counting_loop() {
    let text = "\
_main ()
(i)
{
  i = 0
L0:
  if i < 3 goto L1
  goto L2
L1:
  call _printInt(i)
  i = i + 1
  goto L0
L2:
  return
}
";
    assert_eq!(output(text), "0\n1\n2\n");
}

#[test]
fn recursive_factorial_keeps_caller_locals() {
    let text = "\
_main ()
{
  n = 7
  r = 99
  f = call fact(5)
  call _printInt(f)
  call _printInt(n)
  call _printInt(r)
}

fact (n)
{
  if n <= 1 goto base
  m = n - 1
  r = call fact(m)
  r = r * n
  return r
base:
  return 1
}
";
    assert_eq!(output(text), "120\n7\n99\n");
}

#[test]
fn print_every_value_kind() {
    let text = main_body(
        "  call _printInt(-12)\n  call _printInt(true)\n  call _printStr(\"a b\")\n  p = call _malloc(1)\n  u = [p]\n  call _printStr(u)",
    );
    assert_eq!(output(&text), "-12\ntrue\na b\nUndVal\n");
}

#[test]
fn print_ignores_destination() {
    let text = main_body("  t = call _printInt(1)\n  call _printInt(t)");
    assert_eq!(
        error(&text),
        RuntimeError::UnboundName {
            at: site("_main", 1),
            name: "t".to_string()
        }
    );
}

#[test]
fn empty_main_produces_nothing() {
    let (out, heap) = exec("_main ()\n{\n}\n").unwrap();
    assert_eq!(out, "");
    assert!(heap.is_empty());
}

// ============================================================
// Calls and the return channel
// ============================================================

#[test]
fn implicit_return_binds_undefined() {
    let text = "\
_main ()
{
  r = call nothing()
  call _printInt(r)
}

nothing ()
{
  x = 1
}
";
    assert_eq!(output(text), "UndVal\n");
}

#[test]
fn bare_return_binds_undefined() {
    let text = "\
_main ()
{
  r = call give(1)
  r = call bare()
  call _printInt(r)
}

give (x)
{
  return x
}

bare ()
{
  return
}
";
    assert_eq!(output(text), "UndVal\n");
}

#[test]
fn call_without_destination_discards_result() {
    let text = "\
_main ()
{
  call id(5)
  call _printInt(1)
}

id (x)
{
  return x
}
";
    assert_eq!(output(text), "1\n");
}

#[test]
fn callee_cannot_see_caller_bindings() {
    let text = "\
_main ()
{
  secret = 1
  call peek()
}

peek ()
{
  call _printInt(secret)
}
";
    assert_eq!(
        error(text),
        RuntimeError::UnboundName {
            at: site("peek", 0),
            name: "secret".to_string()
        }
    );
}

#[test]
fn callee_writes_do_not_leak() {
    let text = "\
_main ()
{
  x = 1
  call clobber(x)
  call _printInt(x)
}

clobber (x)
{
  x = 100
  y = 5
}
";
    assert_eq!(output(text), "1\n");
}

#[test]
fn arguments_evaluated_in_caller() {
    let text = "\
_main ()
{
  a = 40
  r = call inc(a)
  call _printInt(r)
}

inc (a)
{
  a = a + 2
  return a
}
";
    assert_eq!(output(text), "42\n");
}

#[test]
fn mutual_recursion() {
    let text = "\
_main ()
{
  r = call even(10)
  call _printInt(r)
  r = call even(7)
  call _printInt(r)
}

even (n)
{
  if n == 0 goto yes
  m = n - 1
  r = call odd(m)
  return r
yes:
  return true
}

odd (n)
{
  if n == 0 goto no
  m = n - 1
  r = call even(m)
  return r
no:
  return false
}
";
    assert_eq!(output(text), "true\nfalse\n");
}

#[test]
fn deep_recursion_grows_the_stack() {
    let text = "\
_main ()
{
  r = call down(20000)
  call _printInt(r)
}

down (n)
{
  if n == 0 goto done
  m = n - 1
  r = call down(m)
  r = r + 1
  return r
done:
  return 0
}
";
    assert_eq!(output(text), "20000\n");
}

#[test]
fn call_depth_limit() {
    let text = "\
_main ()
{
  call forever()
}

forever ()
{
  call forever()
}
";
    let err = exec_with(text, Config::default().with_max_call_depth(50)).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::CallDepthExceeded {
            at: site("forever", 0),
            limit: 50
        }
    );
}

#[test]
fn depth_limit_allows_shallow_calls() {
    let text = "\
_main ()
{
  r = call one()
  call _printInt(r)
}

one ()
{
  return 1
}
";
    let (out, _) = exec_with(text, Config::default().with_max_call_depth(1)).unwrap();
    assert_eq!(out, "1\n");
}

#[test]
fn entry_with_parameters_fails_before_running() {
    let text = "\
_main ()
{
}

f (a)
{
  call _printInt(a)
}
";
    let err = exec_with(text, Config::default().with_entry("f")).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::ArityMismatch {
            at: site("f", 0),
            callee: "f".to_string(),
            expected: 1,
            got: 0
        }
    );
}

#[test]
fn custom_entry() {
    let text = "\
_main ()
{
  call _printInt(1)
}

other ()
{
  call _printInt(2)
}
";
    let (out, _) = exec_with(text, Config::default().with_entry("other")).unwrap();
    assert_eq!(out, "2\n");
}

// ============================================================
// Control transfer
// ============================================================

#[test]
fn false_condition_falls_through() {
    let text = main_body(
        "  if 1 > 2 goto skip\n  call _printInt(1)\nskip:\n  call _printInt(2)",
    );
    assert_eq!(output(&text), "1\n2\n");
}

#[test]
fn true_condition_jumps() {
    let text = main_body(
        "  if 2 > 1 goto skip\n  call _printInt(1)\nskip:\n  call _printInt(2)",
    );
    assert_eq!(output(&text), "2\n");
}

#[test]
fn jump_backwards_and_forwards() {
    let text = main_body(
        "  goto b\na:\n  call _printInt(2)\n  goto c\nb:\n  call _printInt(1)\n  goto a\nc:\n  call _printInt(3)",
    );
    assert_eq!(output(&text), "1\n2\n3\n");
}

#[test]
fn labels_are_no_ops_in_sequence() {
    let text = main_body("x:\ny:\n  call _printInt(1)\nz:");
    assert_eq!(output(&text), "1\n");
}

#[test]
fn cjump_on_bools_equality() {
    let text = main_body(
        "  b = 1 < 2\n  if b == true goto yes\n  call _printInt(0)\n  return\nyes:\n  call _printInt(1)",
    );
    assert_eq!(output(&text), "1\n");
}

#[test]
fn labels_do_not_cross_functions() {
    let text = "\
_main ()
{
  call helper()
there:
  return
}

helper ()
{
  goto there
}
";
    assert_eq!(
        error(text),
        RuntimeError::UnresolvedLabel {
            at: site("helper", 0),
            label: "there".to_string()
        }
    );
}

#[test]
fn same_label_in_two_functions() {
    let text = "\
_main ()
{
  goto L0
  call _printInt(0)
L0:
  call f()
}

f ()
{
  goto L0
  call _printInt(0)
L0:
  call _printInt(1)
}
";
    assert_eq!(output(text), "1\n");
}

// ============================================================
// Heap
// ============================================================

#[test]
fn heap_store_and_load() {
    let text = main_body(
        "  p = call _malloc(3)\n  [p] = 10\n  2[p] = \"s\"\n  a = [p]\n  b = 2[p]\n  call _printInt(a)\n  call _printStr(b)",
    );
    let (out, heap) = exec(&text).unwrap();
    assert_eq!(out, "10\ns\n");
    assert_eq!(
        heap.cells(),
        &[Value::Int(10), Value::Undefined, Value::str("s")]
    );
}

#[test]
fn allocations_are_contiguous() {
    let text = main_body(
        "  p = call _malloc(2)\n  q = call _malloc(3)\n  z = call _malloc(0)\n  call _printInt(p)\n  call _printInt(q)\n  call _printInt(z)",
    );
    let (out, heap) = exec(&text).unwrap();
    assert_eq!(out, "0\n2\n5\n");
    assert_eq!(heap.len(), 5);
}

#[test]
fn heap_shared_across_calls() {
    let text = "\
_main ()
{
  p = call _malloc(1)
  call fill(p)
  v = [p]
  call _printInt(v)
}

fill (p)
{
  [p] = 77
}
";
    assert_eq!(output(text), "77\n");
}

#[test]
fn negative_offset_addresses_earlier_cell() {
    let text = main_body("  p = call _malloc(2)\n  [p] = 1\n  q = p + 1\n  v = -1[q]\n  call _printInt(v)");
    assert_eq!(output(&text), "1\n");
}

#[test]
fn load_out_of_bounds() {
    let text = main_body("  p = call _malloc(2)\n  v = 2[p]");
    assert_eq!(
        error(&text),
        RuntimeError::HeapOutOfBounds {
            at: site("_main", 1),
            addr: 2,
            len: 2
        }
    );
}

#[test]
fn store_negative_address() {
    let text = main_body("  p = call _malloc(2)\n  -1[p] = 0");
    assert_eq!(
        error(&text),
        RuntimeError::HeapOutOfBounds {
            at: site("_main", 1),
            addr: -1,
            len: 2
        }
    );
}

#[test]
fn store_evaluates_value_before_address() {
    let text = main_body("  [p] = missing");
    assert_eq!(
        error(&text),
        RuntimeError::UnboundName {
            at: site("_main", 0),
            name: "missing".to_string()
        }
    );
}

#[test]
fn malloc_negative_size() {
    let text = main_body("  p = call _malloc(-1)");
    assert_eq!(
        error(&text),
        RuntimeError::InvalidAllocation {
            at: site("_main", 0),
            size: -1
        }
    );
}

#[test]
fn malloc_beyond_heap_limit() {
    let text = main_body("  p = call _malloc(3)\n  q = call _malloc(2)");
    let program = parse(&text).unwrap();
    let mut out = Vec::new();
    let config = Config::default().with_max_heap_cells(4);
    let err = run_with_config(&program, config, &mut out).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::InvalidAllocation {
            at: site("_main", 1),
            size: 2
        }
    );
}

#[test]
fn heap_limit_is_inclusive() {
    let text = main_body("  p = call _malloc(3)\n  q = call _malloc(1)\n  call _printInt(q)");
    let (out, heap) = exec_with(&text, Config::default().with_max_heap_cells(4)).unwrap();
    assert_eq!(out, "3\n");
    assert_eq!(heap.len(), 4);
}

#[test]
fn huge_allocation_fails_without_growing_heap() {
    let text = main_body("  p = call _malloc(2)\n  q = call _malloc(2147483647)");
    let program = parse(&text).unwrap();
    let index = ProgramIndex::build(&program).unwrap();
    let config = Config::default().with_max_heap_cells(1 << 20);
    let mut interp = Interpreter::new(&index, config, Vec::new());
    let err = interp.run().unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidAllocation { size: 2147483647, .. }));
    assert_eq!(interp.into_heap().len(), 2);
}

#[test]
fn malloc_non_integer_size() {
    let err = error(&main_body("  p = call _malloc(true)"));
    assert!(matches!(err, RuntimeError::TypeMismatch { inst: "call", .. }));
}

#[test]
fn address_base_must_be_integer() {
    let err = error(&main_body("  s = \"x\"\n  v = [s]"));
    assert!(matches!(err, RuntimeError::TypeMismatch { inst: "load", .. }));
}

// ============================================================
// Errors
// ============================================================

#[test]
fn division_by_zero_after_output() {
    let text = main_body("  call _printInt(1)\n  z = 0\n  t = 10 / z\n  call _printInt(t)");
    let program = parse(&text).unwrap();
    let mut out = Vec::new();
    let err = run(&program, &mut out).unwrap_err();
    assert_eq!(err, RuntimeError::DivisionByZero { at: site("_main", 2) });
    assert_eq!(out, b"1\n");
}

#[test]
fn duplicate_label_rejected_before_execution() {
    let text = main_body("L0:\n  call _printInt(1)\nL0:");
    let program = parse(&text).unwrap();
    let mut out = Vec::new();
    let err = run(&program, &mut out).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::DuplicateLabel {
            func: "_main".to_string(),
            label: "L0".to_string(),
            first: 0,
            second: 2
        }
    );
    assert!(err.is_startup());
    assert!(out.is_empty());
}

#[test]
fn duplicate_function_rejected() {
    let err = error("f ()\n{\n}\n\nf ()\n{\n}\n\n_main ()\n{\n}\n");
    assert_eq!(
        err,
        RuntimeError::DuplicateFunction {
            name: "f".to_string()
        }
    );
}

#[test]
fn missing_entry() {
    let err = error("f ()\n{\n}\n");
    assert_eq!(
        err,
        RuntimeError::MissingEntry {
            name: "_main".to_string()
        }
    );
    assert!(err.is_startup());
}

#[test]
fn unknown_function() {
    assert_eq!(
        error(&main_body("  call nowhere()")),
        RuntimeError::UnknownFunction {
            at: site("_main", 0),
            name: "nowhere".to_string()
        }
    );
}

#[test]
fn arity_mismatch() {
    let text = "\
_main ()
{
  call two(1)
}

two (a, b)
{
}
";
    let err = error(text);
    assert_eq!(
        err,
        RuntimeError::ArityMismatch {
            at: site("_main", 0),
            callee: "two".to_string(),
            expected: 2,
            got: 1
        }
    );
    assert!(!err.is_startup());
}

#[test]
fn builtin_arity_mismatch() {
    assert_eq!(
        error(&main_body("  call _printInt(1, 2)")),
        RuntimeError::ArityMismatch {
            at: site("_main", 0),
            callee: "_printInt".to_string(),
            expected: 1,
            got: 2
        }
    );
}

#[test]
fn type_mismatches() {
    let cases = [
        ("  t = 1 && true", "binop"),
        ("  t = \"a\" + 1", "binop"),
        ("  t = 1 < true", "binop"),
        ("  t = true < false", "binop"),
        ("  t = - \"s\"", "unop"),
        ("  if true > false goto L\nL:", "cjump"),
        ("  if 1 == \"1\" goto L\nL:", "cjump"),
    ];
    for (body, inst) in cases {
        match error(&main_body(body)) {
            RuntimeError::TypeMismatch { inst: got, .. } => assert_eq!(got, inst, "{body}"),
            other => panic!("{body}: expected type mismatch, got {other}"),
        }
    }
}

#[test]
fn undefined_is_not_an_operand_for_arithmetic() {
    let err = error(&main_body("  p = call _malloc(1)\n  u = [p]\n  t = u + 1"));
    assert!(matches!(err, RuntimeError::TypeMismatch { inst: "binop", .. }));
}

#[test]
fn error_message_names_site() {
    let err = error(&main_body("  t = 1\n  goto nowhere"));
    assert_eq!(err.to_string(), "unresolved label 'nowhere' at _main:1");
}

#[test]
fn output_failure_is_reported() {
    struct Broken;
    impl std::io::Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
    let program = parse(&main_body("  call _printInt(1)")).unwrap();
    let err = run(&program, Broken).unwrap_err();
    assert!(matches!(err, RuntimeError::Output { .. }));
}

// ============================================================
// Determinism
// ============================================================

#[test]
fn runs_are_deterministic() {
    let text = "\
_main ()
{
  p = call _malloc(4)
  i = 0
top:
  if i >= 4 goto done
  v = i * i
  a = p + i
  [a] = v
  call _printInt(v)
  i = i + 1
  goto top
done:
  return
}
";
    let first = exec(text).unwrap();
    let second = exec(text).unwrap();
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
    assert_eq!(first.0, "0\n1\n4\n9\n");
}

// ============================================================
// Arithmetic edges
// ============================================================

#[test]
fn division_rounds_toward_negative_infinity() {
    let text = main_body(
        "  a = -7 / 2\n  b = 7 / -2\n  c = -8 / 2\n  call _printInt(a)\n  call _printInt(b)\n  call _printInt(c)",
    );
    assert_eq!(output(&text), "-4\n-4\n-4\n");
}

#[test]
fn arithmetic_wraps() {
    let text = main_body(
        "  a = 2147483647 + 1\n  m = -2147483648\n  b = - m\n  c = m / -1\n  call _printInt(a)\n  call _printInt(b)\n  call _printInt(c)",
    );
    assert_eq!(
        output(&text),
        "-2147483648\n-2147483648\n-2147483648\n"
    );
}

#[test]
fn unop_follows_operand_kind() {
    let text = main_body("  a = !5\n  b = -true\n  call _printInt(a)\n  call _printInt(b)");
    assert_eq!(output(&text), "-5\nfalse\n");
}

// ============================================================
// Properties
// ============================================================

/// Build `_main` computing `t = a OP b` and printing it.
fn binop_program(op: &str, a: &Value, b: &Value) -> String {
    main_body(&format!("  t = {} {op} {}\n  call _printInt(t)", literal(a), literal(b)))
}

fn literal(v: &Value) -> String {
    match v {
        Value::Int(i) => i.to_string(),
        other => other.to_string(),
    }
}

fn int_result(op: &str, a: i32, b: i32) -> Result<String, RuntimeError> {
    exec(&binop_program(op, &Value::Int(a), &Value::Int(b))).map(|(out, _)| out)
}

proptest! {
    #[test]
    fn arithmetic_matches_wrapping_ops(a in any::<i32>(), b in any::<i32>()) {
        prop_assert_eq!(int_result("+", a, b)?, format!("{}\n", a.wrapping_add(b)));
        prop_assert_eq!(int_result("-", a, b)?, format!("{}\n", a.wrapping_sub(b)));
        prop_assert_eq!(int_result("*", a, b)?, format!("{}\n", a.wrapping_mul(b)));
    }

    #[test]
    fn division_is_floored(a in any::<i32>(), b in any::<i32>()) {
        if b == 0 {
            prop_assert!(
                matches!(int_result("/", a, b), Err(RuntimeError::DivisionByZero { .. })),
                "{a} / 0 did not raise"
            );
        } else {
            let floored = (f64::from(a) / f64::from(b)).floor() as i64;
            prop_assert_eq!(int_result("/", a, b)?, format!("{}\n", floored as i32));
        }
    }

    #[test]
    fn relational_matches_comparison(a in -50i32..50, b in -50i32..50) {
        let table = [
            ("<", a < b),
            ("<=", a <= b),
            (">", a > b),
            (">=", a >= b),
            ("==", a == b),
            ("!=", a != b),
        ];
        for (op, expected) in table {
            prop_assert_eq!(int_result(op, a, b)?, format!("{expected}\n"));
        }
    }

    #[test]
    fn logical_matches_bool_ops(a in any::<bool>(), b in any::<bool>()) {
        let and = exec(&binop_program("&&", &Value::Bool(a), &Value::Bool(b)))?.0;
        let or = exec(&binop_program("||", &Value::Bool(a), &Value::Bool(b)))?.0;
        prop_assert_eq!(and, format!("{}\n", a && b));
        prop_assert_eq!(or, format!("{}\n", a || b));
    }

    #[test]
    fn heap_roundtrip(n in 1i32..32, k in 0i32..32, v in any::<i32>()) {
        let k = k % n;
        let text = main_body(&format!(
            "  p = call _malloc({n})\n  {k}[p] = {v}\n  r = {k}[p]\n  call _printInt(r)"
        ));
        let (out, heap) = exec(&text)?;
        prop_assert_eq!(out, format!("{v}\n"));
        prop_assert_eq!(heap.len(), n as usize);
        for (i, cell) in heap.cells().iter().enumerate() {
            if i == k as usize {
                prop_assert_eq!(cell, &Value::Int(v));
            } else {
                prop_assert_eq!(cell, &Value::Undefined);
            }
        }
    }
}

// ============================================================
// Programs without text form
// ============================================================

#[test]
fn program_built_directly() {
    let program = Program::new(vec![
        Func::new(
            "_main",
            vec![],
            vec![
                Inst::Call {
                    callee: "sq".to_string(),
                    args: vec![Operand::Int(9)],
                    dst: Some("r".to_string()),
                },
                Inst::Call {
                    callee: "_printInt".to_string(),
                    args: vec![Operand::name("r")],
                    dst: None,
                },
            ],
        ),
        Func::new(
            "sq",
            vec!["x".to_string()],
            vec![
                Inst::Binop {
                    op: "*".parse().unwrap(),
                    dst: "y".to_string(),
                    lhs: Operand::name("x"),
                    rhs: Operand::name("x"),
                },
                Inst::Return {
                    val: Some(Operand::name("y")),
                },
            ],
        ),
    ]);
    let mut out = Vec::new();
    run(&program, &mut out).unwrap();
    assert_eq!(out, b"81\n");
}

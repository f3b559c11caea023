//! Function declaration, expressions, calls, construction, arguments and
//! resource limits.

use picojs::bytecode::{ArgKind, MetaKind, Op, INVALID_IDX};
use picojs::{Engine, EngineConfig, EngineError};

use super::{emit_exit_if, program, run, MAX_REG, MIN_REG};

#[test]
fn test_function_declaration_and_call() {
    // function add(a, b) { return a + b; } add(1, 2) == 3
    let mut b = program();
    let add = b.string("add");
    let pa = b.string("a");
    let pb = b.string("b");

    b.emit(Op::FuncDeclN { name: add, args: 2 });
    b.emit(Op::Meta {
        kind: MetaKind::Varg,
        a: pa,
        b: 0,
    });
    b.emit(Op::Meta {
        kind: MetaKind::Varg,
        a: pb,
        b: 0,
    });
    let fn_end = b.emit(Op::Meta {
        kind: MetaKind::FunctionEnd,
        a: 0,
        b: 0,
    });
    b.emit(Op::RegVarDecl {
        min: MIN_REG,
        max: MAX_REG,
    });
    b.emit(Op::Addition {
        dst: 100,
        left: pa,
        right: pb,
    });
    b.emit(Op::Retval { value: 100 });
    let after_body = b.here();
    b.patch_offset(fn_end, after_body);

    b.emit(Op::Assignment {
        dst: 100,
        kind: ArgKind::SmallInt,
        src: 1,
    });
    b.emit(Op::Assignment {
        dst: 101,
        kind: ArgKind::SmallInt,
        src: 2,
    });
    b.emit(Op::CallN {
        dst: 102,
        func: add,
        args: 2,
    });
    b.emit(Op::Meta {
        kind: MetaKind::Varg,
        a: 100,
        b: 0,
    });
    b.emit(Op::Meta {
        kind: MetaKind::Varg,
        a: 101,
        b: 0,
    });
    b.emit(Op::Assignment {
        dst: 103,
        kind: ArgKind::SmallInt,
        src: 3,
    });
    b.emit(Op::EqualValue {
        dst: 104,
        left: 102,
        right: 103,
    });
    emit_exit_if(&mut b, 104);
    assert!(run(b));
}

#[test]
fn test_named_function_expression_recursion() {
    // var f = function fact(n) { if (n <= 1) return 1; return n * fact(n - 1); };
    // f(5) == 120
    let mut b = program();
    let fact = b.string("fact");
    let n = b.string("n");

    b.emit(Op::FuncExprN {
        dst: 100,
        name: fact,
        args: 1,
    });
    b.emit(Op::Meta {
        kind: MetaKind::Varg,
        a: n,
        b: 0,
    });
    let fn_end = b.emit(Op::Meta {
        kind: MetaKind::FunctionEnd,
        a: 0,
        b: 0,
    });

    b.emit(Op::RegVarDecl {
        min: MIN_REG,
        max: MAX_REG,
    });
    b.emit(Op::Assignment {
        dst: 101,
        kind: ArgKind::SmallInt,
        src: 1,
    });
    b.emit(Op::LessOrEqualThan {
        dst: 102,
        left: n,
        right: 101,
    });
    let recurse_jump = b.emit(Op::IsFalseJmpDown {
        cond: 102,
        a: 0,
        b: 0,
    });
    b.emit(Op::Retval { value: 101 });
    let recurse = b.emit(Op::Subtraction {
        dst: 103,
        left: n,
        right: 101,
    });
    b.patch_offset(recurse_jump, recurse);
    b.emit(Op::CallN {
        dst: 104,
        func: fact,
        args: 1,
    });
    b.emit(Op::Meta {
        kind: MetaKind::Varg,
        a: 103,
        b: 0,
    });
    b.emit(Op::Multiplication {
        dst: 105,
        left: n,
        right: 104,
    });
    b.emit(Op::Retval { value: 105 });
    let after_body = b.here();
    b.patch_offset(fn_end, after_body);

    b.emit(Op::Assignment {
        dst: 106,
        kind: ArgKind::SmallInt,
        src: 5,
    });
    b.emit(Op::CallN {
        dst: 107,
        func: 100,
        args: 1,
    });
    b.emit(Op::Meta {
        kind: MetaKind::Varg,
        a: 106,
        b: 0,
    });
    b.emit(Op::Assignment {
        dst: 108,
        kind: ArgKind::SmallInt,
        src: 120,
    });
    b.emit(Op::EqualValue {
        dst: 109,
        left: 107,
        right: 108,
    });
    emit_exit_if(&mut b, 109);
    assert!(run(b));
}

#[test]
fn test_anonymous_function_expression_typeof() {
    // typeof (function(){}) === "function"
    let mut b = program();
    let function_str = b.string("function");
    b.emit(Op::FuncExprN {
        dst: 100,
        name: INVALID_IDX,
        args: 0,
    });
    let fn_end = b.emit(Op::Meta {
        kind: MetaKind::FunctionEnd,
        a: 0,
        b: 0,
    });
    b.emit(Op::RegVarDecl {
        min: MIN_REG,
        max: MAX_REG,
    });
    b.emit(Op::Ret);
    let after_body = b.here();
    b.patch_offset(fn_end, after_body);

    b.emit(Op::Typeof { dst: 101, var: 100 });
    b.emit(Op::Assignment {
        dst: 102,
        kind: ArgKind::StringLit,
        src: function_str,
    });
    b.emit(Op::EqualValueType {
        dst: 103,
        left: 101,
        right: 102,
    });
    emit_exit_if(&mut b, 103);
    assert!(run(b));
}

#[test]
fn test_construct_this_and_instanceof() {
    // function Point(x) { this.x = x; }
    // p = new Point(7); p.x == 7 && p instanceof Point
    let mut b = program();
    let point = b.string("Point");
    let px = b.string("x");

    b.emit(Op::FuncDeclN {
        name: point,
        args: 1,
    });
    b.emit(Op::Meta {
        kind: MetaKind::Varg,
        a: px,
        b: 0,
    });
    let fn_end = b.emit(Op::Meta {
        kind: MetaKind::FunctionEnd,
        a: 0,
        b: 0,
    });
    b.emit(Op::RegVarDecl {
        min: MIN_REG,
        max: MAX_REG,
    });
    b.emit(Op::ThisBinding { dst: 100 });
    b.emit(Op::Assignment {
        dst: 101,
        kind: ArgKind::StringLit,
        src: px,
    });
    b.emit(Op::PropSetter {
        base: 100,
        name: 101,
        rhs: px,
    });
    b.emit(Op::Ret);
    let after_body = b.here();
    b.patch_offset(fn_end, after_body);

    b.emit(Op::Assignment {
        dst: 100,
        kind: ArgKind::SmallInt,
        src: 7,
    });
    b.emit(Op::ConstructN {
        dst: 101,
        ctor: point,
        args: 1,
    });
    b.emit(Op::Meta {
        kind: MetaKind::Varg,
        a: 100,
        b: 0,
    });
    b.emit(Op::Assignment {
        dst: 102,
        kind: ArgKind::StringLit,
        src: px,
    });
    b.emit(Op::PropGetter {
        dst: 103,
        base: 101,
        name: 102,
    });
    b.emit(Op::EqualValue {
        dst: 104,
        left: 103,
        right: 100,
    });
    b.emit(Op::Instanceof {
        dst: 105,
        left: 101,
        right: point,
    });
    b.emit(Op::BitAnd {
        dst: 106,
        left: 104,
        right: 105,
    });
    emit_exit_if(&mut b, 106);
    assert!(run(b));
}

#[test]
fn test_arguments_object() {
    // function f() { return arguments.length; } f(4, 5, 6) == 3
    let mut b = program();
    let f = b.string("f");
    let arguments_str = b.string("arguments");
    let length = b.string("length");

    b.emit(Op::FuncDeclN { name: f, args: 0 });
    let fn_end = b.emit(Op::Meta {
        kind: MetaKind::FunctionEnd,
        a: 0,
        b: 0,
    });
    b.emit(Op::RegVarDecl {
        min: MIN_REG,
        max: MAX_REG,
    });
    b.emit(Op::Assignment {
        dst: 100,
        kind: ArgKind::StringLit,
        src: length,
    });
    b.emit(Op::PropGetter {
        dst: 101,
        base: arguments_str,
        name: 100,
    });
    b.emit(Op::Retval { value: 101 });
    let after_body = b.here();
    b.patch_offset(fn_end, after_body);

    for i in 0..3u8 {
        b.emit(Op::Assignment {
            dst: 100 + i,
            kind: ArgKind::SmallInt,
            src: 4 + i,
        });
    }
    b.emit(Op::CallN {
        dst: 103,
        func: f,
        args: 3,
    });
    for i in 0..3u8 {
        b.emit(Op::Meta {
            kind: MetaKind::Varg,
            a: 100 + i,
            b: 0,
        });
    }
    b.emit(Op::Assignment {
        dst: 104,
        kind: ArgKind::SmallInt,
        src: 3,
    });
    b.emit(Op::EqualValue {
        dst: 105,
        left: 103,
        right: 104,
    });
    emit_exit_if(&mut b, 105);
    assert!(run(b));
}

#[test]
fn test_call_of_non_function_throws() {
    // null(); -> TypeError, unhandled
    let mut b = program();
    b.emit(Op::Assignment {
        dst: 100,
        kind: ArgKind::Simple,
        src: picojs::bytecode::SimpleValue::Null as u8,
    });
    b.emit(Op::CallN {
        dst: 101,
        func: 100,
        args: 0,
    });
    b.emit(Op::Exitval { status: 0 });
    let err = super::run_result(b).unwrap_err();
    match err {
        EngineError::UnhandledException { message } => {
            assert!(message.contains("TypeError"), "message: {}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_call_depth_limit() {
    // function f() { return f(); } f();
    let mut b = program();
    let f = b.string("f");
    b.emit(Op::FuncDeclN { name: f, args: 0 });
    let fn_end = b.emit(Op::Meta {
        kind: MetaKind::FunctionEnd,
        a: 0,
        b: 0,
    });
    b.emit(Op::RegVarDecl {
        min: MIN_REG,
        max: MAX_REG,
    });
    b.emit(Op::CallN {
        dst: 100,
        func: f,
        args: 0,
    });
    b.emit(Op::Retval { value: 100 });
    let after_body = b.here();
    b.patch_offset(fn_end, after_body);

    b.emit(Op::CallN {
        dst: 101,
        func: f,
        args: 0,
    });
    b.emit(Op::Exitval { status: 0 });

    let err = super::run_result(b).unwrap_err();
    match err {
        EngineError::UnhandledException { message } => {
            assert!(message.contains("call depth"), "message: {}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_step_limit_interrupts_infinite_loop() {
    let mut b = program();
    let spin = b.emit(Op::Nop);
    let jump = b.emit(Op::JmpUp { a: 0, b: 0 });
    b.patch_offset(jump, spin);

    let config = EngineConfig {
        step_limit: Some(10_000),
        ..EngineConfig::default()
    };
    let mut engine = Engine::with_config(b.finish(), config);
    let err = engine.run().unwrap_err();
    match err {
        EngineError::UnhandledException { message } => {
            assert!(message.contains("interrupted"), "message: {}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

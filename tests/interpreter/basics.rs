//! Arithmetic, literals, jumps, typeof and variable declaration.

use picojs::bytecode::{ArgKind, Op, SimpleValue};

use super::{emit_exit_if, program, run};

#[test]
fn test_smallint_addition() {
    // 1 + 2 == 3
    let mut b = program();
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
    b.emit(Op::Addition {
        dst: 102,
        left: 100,
        right: 101,
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
fn test_number_literal_negation() {
    // 2.5 + (-2.5) == 0, and !0 is true
    let mut b = program();
    let lit = b.number(2.5);
    b.emit(Op::Assignment {
        dst: 100,
        kind: ArgKind::NumberLit,
        src: lit,
    });
    b.emit(Op::Assignment {
        dst: 101,
        kind: ArgKind::NumberLitNegate,
        src: lit,
    });
    b.emit(Op::Addition {
        dst: 102,
        left: 100,
        right: 101,
    });
    b.emit(Op::LogicalNot { dst: 103, var: 102 });
    emit_exit_if(&mut b, 103);
    assert!(run(b));
}

#[test]
fn test_string_concatenation() {
    // "foo" + "bar" === "foobar"
    let mut b = program();
    let foo = b.string("foo");
    let bar = b.string("bar");
    let foobar = b.string("foobar");
    b.emit(Op::Assignment {
        dst: 100,
        kind: ArgKind::StringLit,
        src: foo,
    });
    b.emit(Op::Assignment {
        dst: 101,
        kind: ArgKind::StringLit,
        src: bar,
    });
    b.emit(Op::Addition {
        dst: 102,
        left: 100,
        right: 101,
    });
    b.emit(Op::Assignment {
        dst: 103,
        kind: ArgKind::StringLit,
        src: foobar,
    });
    b.emit(Op::EqualValueType {
        dst: 104,
        left: 102,
        right: 103,
    });
    emit_exit_if(&mut b, 104);
    assert!(run(b));
}

#[test]
fn test_division_by_zero_is_infinity() {
    // 1 / 0 == Infinity, reading Infinity off the global object
    let mut b = program();
    let infinity = b.string("Infinity");
    b.emit(Op::Assignment {
        dst: 100,
        kind: ArgKind::SmallInt,
        src: 1,
    });
    b.emit(Op::Assignment {
        dst: 101,
        kind: ArgKind::SmallInt,
        src: 0,
    });
    b.emit(Op::Division {
        dst: 102,
        left: 100,
        right: 101,
    });
    b.emit(Op::EqualValueType {
        dst: 103,
        left: 102,
        right: infinity,
    });
    emit_exit_if(&mut b, 103);
    assert!(run(b));
}

#[test]
fn test_nan_comparisons_are_false() {
    // n = 0/0; (n < 1) is false and (n >= 1) is false
    let mut b = program();
    b.emit(Op::Assignment {
        dst: 100,
        kind: ArgKind::SmallInt,
        src: 0,
    });
    b.emit(Op::Division {
        dst: 101,
        left: 100,
        right: 100,
    });
    b.emit(Op::Assignment {
        dst: 102,
        kind: ArgKind::SmallInt,
        src: 1,
    });
    b.emit(Op::LessThan {
        dst: 103,
        left: 101,
        right: 102,
    });
    b.emit(Op::GreaterOrEqualThan {
        dst: 104,
        left: 101,
        right: 102,
    });
    // both must be false
    b.emit(Op::BitOr {
        dst: 105,
        left: 103,
        right: 104,
    });
    b.emit(Op::LogicalNot { dst: 106, var: 105 });
    emit_exit_if(&mut b, 106);
    assert!(run(b));
}

#[test]
fn test_relational_operators() {
    // 1 < 2, 2 <= 2, 3 > 2, 2 >= 2
    let mut b = program();
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
    b.emit(Op::Assignment {
        dst: 102,
        kind: ArgKind::SmallInt,
        src: 3,
    });
    b.emit(Op::LessThan {
        dst: 103,
        left: 100,
        right: 101,
    });
    b.emit(Op::LessOrEqualThan {
        dst: 104,
        left: 101,
        right: 101,
    });
    b.emit(Op::GreaterThan {
        dst: 105,
        left: 102,
        right: 101,
    });
    b.emit(Op::GreaterOrEqualThan {
        dst: 106,
        left: 101,
        right: 101,
    });
    b.emit(Op::BitAnd {
        dst: 107,
        left: 103,
        right: 104,
    });
    b.emit(Op::BitAnd {
        dst: 108,
        left: 107,
        right: 105,
    });
    b.emit(Op::BitAnd {
        dst: 109,
        left: 108,
        right: 106,
    });
    emit_exit_if(&mut b, 109);
    assert!(run(b));
}

#[test]
fn test_loop_with_jumps() {
    // sum = 0; i = 1; while (i <= 5) { sum += i; i += 1; } sum == 15
    let mut b = program();
    b.emit(Op::Assignment {
        dst: 100,
        kind: ArgKind::SmallInt,
        src: 0,
    });
    b.emit(Op::Assignment {
        dst: 101,
        kind: ArgKind::SmallInt,
        src: 1,
    });
    b.emit(Op::Assignment {
        dst: 102,
        kind: ArgKind::SmallInt,
        src: 5,
    });
    b.emit(Op::Assignment {
        dst: 103,
        kind: ArgKind::SmallInt,
        src: 1,
    });
    let loop_start = b.emit(Op::GreaterThan {
        dst: 104,
        left: 101,
        right: 102,
    });
    let exit_jump = b.emit(Op::IsTrueJmpDown {
        cond: 104,
        a: 0,
        b: 0,
    });
    b.emit(Op::Addition {
        dst: 100,
        left: 100,
        right: 101,
    });
    b.emit(Op::Addition {
        dst: 101,
        left: 101,
        right: 103,
    });
    let back_jump = b.emit(Op::JmpUp { a: 0, b: 0 });
    b.patch_offset(back_jump, loop_start);
    let after_loop = b.emit(Op::Assignment {
        dst: 105,
        kind: ArgKind::SmallInt,
        src: 15,
    });
    b.patch_offset(exit_jump, after_loop);
    b.emit(Op::EqualValue {
        dst: 106,
        left: 100,
        right: 105,
    });
    emit_exit_if(&mut b, 106);
    assert!(run(b));
}

#[test]
fn test_pre_and_post_increment() {
    // x = 5; a = x++; b = ++x; a == 5 && b == 7
    let mut b = program();
    b.emit(Op::Assignment {
        dst: 100,
        kind: ArgKind::SmallInt,
        src: 5,
    });
    b.emit(Op::PostIncr { dst: 101, var: 100 });
    b.emit(Op::PreIncr { dst: 102, var: 100 });
    b.emit(Op::Assignment {
        dst: 103,
        kind: ArgKind::SmallInt,
        src: 5,
    });
    b.emit(Op::EqualValue {
        dst: 104,
        left: 101,
        right: 103,
    });
    b.emit(Op::Assignment {
        dst: 105,
        kind: ArgKind::SmallInt,
        src: 7,
    });
    b.emit(Op::EqualValue {
        dst: 106,
        left: 102,
        right: 105,
    });
    b.emit(Op::BitAnd {
        dst: 107,
        left: 104,
        right: 106,
    });
    emit_exit_if(&mut b, 107);
    assert!(run(b));
}

#[test]
fn test_bitwise_and_shifts() {
    // (6 & 3) == 2, (6 ^ 3) == 5, (1 << 4) == 16
    let mut b = program();
    b.emit(Op::Assignment {
        dst: 100,
        kind: ArgKind::SmallInt,
        src: 6,
    });
    b.emit(Op::Assignment {
        dst: 101,
        kind: ArgKind::SmallInt,
        src: 3,
    });
    b.emit(Op::BitAnd {
        dst: 102,
        left: 100,
        right: 101,
    });
    b.emit(Op::Assignment {
        dst: 103,
        kind: ArgKind::SmallInt,
        src: 2,
    });
    b.emit(Op::EqualValue {
        dst: 104,
        left: 102,
        right: 103,
    });
    b.emit(Op::BitXor {
        dst: 105,
        left: 100,
        right: 101,
    });
    b.emit(Op::Assignment {
        dst: 106,
        kind: ArgKind::SmallInt,
        src: 5,
    });
    b.emit(Op::EqualValue {
        dst: 107,
        left: 105,
        right: 106,
    });
    b.emit(Op::Assignment {
        dst: 108,
        kind: ArgKind::SmallInt,
        src: 1,
    });
    b.emit(Op::Assignment {
        dst: 109,
        kind: ArgKind::SmallInt,
        src: 4,
    });
    b.emit(Op::ShiftLeft {
        dst: 110,
        left: 108,
        right: 109,
    });
    b.emit(Op::Assignment {
        dst: 111,
        kind: ArgKind::SmallInt,
        src: 16,
    });
    b.emit(Op::EqualValue {
        dst: 112,
        left: 110,
        right: 111,
    });
    b.emit(Op::BitAnd {
        dst: 113,
        left: 104,
        right: 107,
    });
    b.emit(Op::BitAnd {
        dst: 114,
        left: 113,
        right: 112,
    });
    emit_exit_if(&mut b, 114);
    assert!(run(b));
}

#[test]
fn test_unsigned_shift_of_negative() {
    // -1 >>> 28 == 15
    let mut b = program();
    b.emit(Op::Assignment {
        dst: 100,
        kind: ArgKind::SmallIntNegate,
        src: 1,
    });
    b.emit(Op::Assignment {
        dst: 101,
        kind: ArgKind::SmallInt,
        src: 28,
    });
    b.emit(Op::ShiftUright {
        dst: 102,
        left: 100,
        right: 101,
    });
    b.emit(Op::Assignment {
        dst: 103,
        kind: ArgKind::SmallInt,
        src: 15,
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
fn test_typeof_unresolvable_identifier() {
    // typeof missing === "undefined"
    let mut b = program();
    let missing = b.string("missing");
    let undefined_str = b.string("undefined");
    b.emit(Op::Typeof {
        dst: 100,
        var: missing,
    });
    b.emit(Op::Assignment {
        dst: 101,
        kind: ArgKind::StringLit,
        src: undefined_str,
    });
    b.emit(Op::EqualValueType {
        dst: 102,
        left: 100,
        right: 101,
    });
    emit_exit_if(&mut b, 102);
    assert!(run(b));
}

#[test]
fn test_typeof_null_is_object() {
    let mut b = program();
    let object_str = b.string("object");
    b.emit(Op::Assignment {
        dst: 100,
        kind: ArgKind::Simple,
        src: SimpleValue::Null as u8,
    });
    b.emit(Op::Typeof { dst: 101, var: 100 });
    b.emit(Op::Assignment {
        dst: 102,
        kind: ArgKind::StringLit,
        src: object_str,
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
fn test_var_declaration_and_global_binding() {
    // var x; x = 42; x == 42
    let mut b = program();
    let x = b.string("x");
    b.emit(Op::VarDecl { name: x });
    b.emit(Op::Assignment {
        dst: x,
        kind: ArgKind::SmallInt,
        src: 42,
    });
    b.emit(Op::Assignment {
        dst: 100,
        kind: ArgKind::Variable,
        src: x,
    });
    b.emit(Op::Assignment {
        dst: 101,
        kind: ArgKind::SmallInt,
        src: 42,
    });
    b.emit(Op::EqualValue {
        dst: 102,
        left: 100,
        right: 101,
    });
    emit_exit_if(&mut b, 102);
    assert!(run(b));
}

#[test]
fn test_delete_var() {
    // y = 1 (implicit global, deletable); var x (not deletable)
    // delete y == true, delete x == false
    let mut b = program();
    let x = b.string("x");
    let y = b.string("y");
    b.emit(Op::VarDecl { name: x });
    b.emit(Op::Assignment {
        dst: y,
        kind: ArgKind::SmallInt,
        src: 1,
    });
    b.emit(Op::DeleteVar { dst: 100, name: y });
    b.emit(Op::DeleteVar { dst: 101, name: x });
    b.emit(Op::LogicalNot { dst: 102, var: 101 });
    b.emit(Op::BitAnd {
        dst: 103,
        left: 100,
        right: 102,
    });
    emit_exit_if(&mut b, 103);
    assert!(run(b));
}

#[test]
fn test_loose_equality_across_types() {
    // "3" == 3, null == undefined, "" == 0
    let mut b = program();
    let three = b.string("3");
    let empty = b.string("");
    b.emit(Op::Assignment {
        dst: 100,
        kind: ArgKind::StringLit,
        src: three,
    });
    b.emit(Op::Assignment {
        dst: 101,
        kind: ArgKind::SmallInt,
        src: 3,
    });
    b.emit(Op::EqualValue {
        dst: 102,
        left: 100,
        right: 101,
    });
    b.emit(Op::Assignment {
        dst: 103,
        kind: ArgKind::Simple,
        src: SimpleValue::Null as u8,
    });
    b.emit(Op::Assignment {
        dst: 104,
        kind: ArgKind::Simple,
        src: SimpleValue::Undefined as u8,
    });
    b.emit(Op::EqualValue {
        dst: 105,
        left: 103,
        right: 104,
    });
    b.emit(Op::Assignment {
        dst: 106,
        kind: ArgKind::StringLit,
        src: empty,
    });
    b.emit(Op::Assignment {
        dst: 107,
        kind: ArgKind::SmallInt,
        src: 0,
    });
    b.emit(Op::EqualValue {
        dst: 108,
        left: 106,
        right: 107,
    });
    b.emit(Op::BitAnd {
        dst: 109,
        left: 102,
        right: 105,
    });
    b.emit(Op::BitAnd {
        dst: 110,
        left: 109,
        right: 108,
    });
    emit_exit_if(&mut b, 110);
    assert!(run(b));
}

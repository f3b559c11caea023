//! Collector behaviour under allocation pressure.

use picojs::bytecode::{ArgKind, Op};
use picojs::{Engine, EngineConfig};

use super::{MAX_REG, MIN_REG};

#[test]
fn test_garbage_objects_are_reclaimed() {
    // Allocate 200 short-lived objects in a loop, with the collector forced
    // to run every few allocations.
    let mut b = picojs::ProgramBuilder::new();
    b.emit(Op::RegVarDecl {
        min: MIN_REG,
        max: MAX_REG,
    });
    let limit = b.number(200.0);
    b.emit(Op::Assignment {
        dst: 100,
        kind: ArgKind::SmallInt,
        src: 0,
    });
    b.emit(Op::Assignment {
        dst: 101,
        kind: ArgKind::NumberLit,
        src: limit,
    });
    b.emit(Op::Assignment {
        dst: 102,
        kind: ArgKind::SmallInt,
        src: 1,
    });
    let loop_start = b.emit(Op::ObjDecl {
        dst: 103,
        props: 0,
    });
    b.emit(Op::Addition {
        dst: 100,
        left: 100,
        right: 102,
    });
    b.emit(Op::LessThan {
        dst: 104,
        left: 100,
        right: 101,
    });
    let back = b.emit(Op::IsTrueJmpUp {
        cond: 104,
        a: 0,
        b: 0,
    });
    b.patch_offset(back, loop_start);
    b.emit(Op::Exitval { status: 0 });

    let config = EngineConfig {
        gc_threshold: 8,
        ..EngineConfig::default()
    };
    let mut engine = Engine::with_config(b.finish(), config);

    let baseline = engine.gc_stats().live;
    assert!(engine.run().unwrap());
    engine.collect();

    let stats = engine.gc_stats();
    assert!(stats.collections > 0);
    // Everything the loop allocated is garbage once execution ends.
    assert_eq!(stats.live, baseline);
}

#[test]
fn test_reachable_objects_survive_collection() {
    // Keep an object in a global variable across a forced collection.
    let mut b = picojs::ProgramBuilder::new();
    b.emit(Op::RegVarDecl {
        min: MIN_REG,
        max: MAX_REG,
    });
    let keep = b.string("keep");
    let a = b.string("a");
    b.emit(Op::ObjDecl { dst: 100, props: 1 });
    b.emit(Op::Assignment {
        dst: 101,
        kind: ArgKind::SmallInt,
        src: 9,
    });
    b.emit(Op::Assignment {
        dst: 102,
        kind: ArgKind::StringLit,
        src: a,
    });
    b.emit(Op::Meta {
        kind: picojs::bytecode::MetaKind::VargPropData,
        a: 102,
        b: 101,
    });
    b.emit(Op::Assignment {
        dst: keep,
        kind: ArgKind::Variable,
        src: 100,
    });
    // Churn allocations so the collector runs.
    for _ in 0..64 {
        b.emit(Op::ObjDecl { dst: 103, props: 0 });
    }
    // keep.a == 9
    b.emit(Op::Assignment {
        dst: 104,
        kind: ArgKind::StringLit,
        src: a,
    });
    b.emit(Op::PropGetter {
        dst: 105,
        base: keep,
        name: 104,
    });
    b.emit(Op::Assignment {
        dst: 106,
        kind: ArgKind::SmallInt,
        src: 9,
    });
    b.emit(Op::EqualValue {
        dst: 107,
        left: 105,
        right: 106,
    });
    let jump = b.emit(Op::IsTrueJmpDown {
        cond: 107,
        a: 0,
        b: 0,
    });
    b.emit(Op::Exitval { status: 1 });
    let exit_ok = b.emit(Op::Exitval { status: 0 });
    b.patch_offset(jump, exit_ok);

    let config = EngineConfig {
        gc_threshold: 4,
        ..EngineConfig::default()
    };
    let mut engine = Engine::with_config(b.finish(), config);
    assert!(engine.run().unwrap());
    assert!(engine.gc_stats().collections > 0);
}

use crate::ir::{BinaryOp, Class, Cluster, Expression, Frame, Statement};
use crate::memory::{Pointer, Width};
use crate::reg::{RegisterPair, State};

fn cluster(statements: Vec<Statement>) -> Cluster {
    Cluster::new(Pointer::new(0x100), 1, Class::Linear, statements)
}

#[test]
fn test_default_state_is_unknown() {
    let state = State::default();

    assert!(state.is_empty());
    assert_eq!(None, state.get_register("HL"));
}

#[test]
fn test_constant_assignment() {
    let mut frame = Frame::new();
    let hl = frame.ensure_register("HL", Width::Word16);
    let mut state = State::new();

    state.apply(&cluster(vec![Statement::Assign {
        dst: Expression::Id(hl),
        src: Expression::constant(0x1234, Width::Word16),
    }]));

    assert_eq!(Some(0x1234), state.get_register("HL"));
}

#[test]
fn test_derived_assignment_is_masked() {
    let mut frame = Frame::new();
    let a = frame.ensure_register("A", Width::Byte);
    let mut state = State::new();
    state.set_register("A", 0xFF);

    state.apply(&cluster(vec![Statement::Assign {
        dst: Expression::Id(a.clone()),
        src: Expression::binary(
            BinaryOp::Add,
            Width::Byte,
            Expression::Id(a),
            Expression::constant(1, Width::Byte),
        ),
    }]));

    assert_eq!(Some(0x00), state.get_register("A"));
}

#[test]
fn test_unknown_assignment_forgets() {
    let mut frame = Frame::new();
    let bc = frame.ensure_register("BC", Width::Word16);
    let mut state = State::new();
    state.set_register("BC", 0x10);

    state.apply(&cluster(vec![Statement::Assign {
        dst: Expression::Id(bc),
        src: Expression::mem(Expression::Addr(Pointer::new(0xFF00)), Width::Word16),
    }]));

    assert_eq!(None, state.get_register("BC"));
}

#[test]
fn test_memory_and_flags_do_not_change_state() {
    let mut frame = Frame::new();
    let flags = frame.ensure_flags("SZHVC");
    let mut state = State::new();
    state.set_register("A", 3);

    state.apply(&cluster(vec![
        Statement::Assign {
            dst: Expression::mem(Expression::Addr(Pointer::new(0xFF10)), Width::Byte),
            src: Expression::constant(9, Width::Byte),
        },
        Statement::Assign {
            dst: Expression::Id(flags),
            src: Expression::constant(0, Width::Byte),
        },
    ]));

    assert_eq!(Some(3), state.get_register("A"));
    assert_eq!(None, state.get_register("SZHVC"));
}

#[test]
fn test_call_clobbers_state() {
    let mut state = State::new();
    state.set_register("A", 3);
    state.set_register("HL", 0x8000);

    state.apply(&cluster(vec![Statement::Call(Expression::Addr(
        Pointer::new(0x200),
    ))]));

    assert!(state.is_empty());
}

static PAIRS: [RegisterPair; 1] = [RegisterPair {
    pair: "HL",
    high: "H",
    low: "L",
}];

#[test]
fn test_pair_write_sets_halves() {
    let mut frame = Frame::new();
    let hl = frame.ensure_register("HL", Width::Word16);
    let mut state = State::new().with_pairs(&PAIRS);

    state.apply(&cluster(vec![Statement::Assign {
        dst: Expression::Id(hl.clone()),
        src: Expression::constant(0x2040, Width::Word16),
    }]));

    assert_eq!(Some(0x20), state.get_register("H"));
    assert_eq!(Some(0x40), state.get_register("L"));

    state.apply(&cluster(vec![Statement::Assign {
        dst: Expression::Id(hl),
        src: Expression::mem(Expression::Addr(Pointer::new(0xFF00)), Width::Word16),
    }]));

    assert_eq!(None, state.get_register("H"));
    assert_eq!(None, state.get_register("L"));
}

#[test]
fn test_half_write_updates_pair() {
    let mut frame = Frame::new();
    let hl = frame.ensure_register("HL", Width::Word16);
    let l = frame.ensure_register("L", Width::Byte);
    let a = frame.ensure_register("A", Width::Byte);
    let mut state = State::new().with_pairs(&PAIRS);

    state.apply(&cluster(vec![
        Statement::Assign {
            dst: Expression::Id(hl),
            src: Expression::constant(0x2000, Width::Word16),
        },
        Statement::Assign {
            dst: Expression::Id(l.clone()),
            src: Expression::constant(0x7F, Width::Byte),
        },
    ]));

    assert_eq!(Some(0x207F), state.get_register("HL"));

    state.apply(&cluster(vec![Statement::Assign {
        dst: Expression::Id(l),
        src: Expression::Id(a),
    }]));

    assert_eq!(None, state.get_register("L"));
    assert_eq!(None, state.get_register("HL"));
    assert_eq!(Some(0x20), state.get_register("H"));
}

//! Lowering of TLCS-90 instructions into IR

use crate::analysis::Diagnostics;
use crate::arch::tlcs90::{Condition, Instruction, Opcode, Operand, Register};
use crate::arch::MachineInstruction;
use crate::ir::{BinaryOp, Class, Emitter, Expression, Frame, Identifier, UnaryOp};
use crate::memory::{Pointer, Width};
use crate::reg::State;

/// The vector `swi` calls through.
const SWI_VECTOR: u64 = 0x0010;

/// Flags written by the ALU.
const ALU_FLAGS: &str = "SZHVC";

/// Lower one instruction into `m`.
pub fn rewrite(
    instr: &Instruction,
    m: &mut Emitter,
    state: &State,
    frame: &mut Frame,
    host: &dyn Diagnostics,
) -> Class {
    let at = instr.address();

    match instr.opcode() {
        Opcode::Invalid => {
            host.error(at, "invalid instruction");
            m.invalid();
            return Class::Invalid;
        }
        Opcode::Exx => {
            host.error(
                at,
                &format!("instruction `{}` is not implemented", instr.mnemonic()),
            );
            m.invalid();
            return Class::Invalid;
        }
        _ => {}
    }

    // Lowering may fail partway, so it only reaches `m` once complete.
    let mut scratch = Emitter::new();
    let mut lowering = Lowering {
        instr,
        m: &mut scratch,
        state,
        frame,
    };

    match lowering.lower() {
        Some(class) => {
            m.append(scratch);
            class
        }
        None => {
            host.error(at, &format!("malformed operands for `{}`", instr));
            m.invalid();
            Class::Invalid
        }
    }
}

struct Lowering<'a> {
    instr: &'a Instruction,
    m: &'a mut Emitter,
    state: &'a State,
    frame: &'a mut Frame,
}

impl<'a> Lowering<'a> {
    fn reg(&mut self, reg: Register) -> Expression {
        Expression::Id(self.frame.ensure_register(reg.name(), reg.width()))
    }

    fn flags(&mut self, group: &str) -> Expression {
        Expression::Id(self.frame.ensure_flags(group))
    }

    fn set_flags(&mut self, group: &str, value: Expression) {
        let width = value.width().unwrap_or(Width::Byte);
        let flags = self.flags(group);

        self.m
            .assign(flags, Expression::unary(UnaryOp::Cond, width, value));
    }

    fn carry(&mut self, width: Width) -> Expression {
        let carry = self.flags("C");

        match width {
            Width::Byte => carry,
            _ => Expression::intrinsic("__zero_extend", width, vec![carry]),
        }
    }

    /// Compute the address of a register-indirect operand, folding it into
    /// a constant when every register involved is known.
    fn effective_address(
        &mut self,
        base: Register,
        index: Option<Register>,
        displacement: i8,
    ) -> Expression {
        let known = self
            .state
            .get_register(base.name())
            .and_then(|b| match index {
                Some(index) => self
                    .state
                    .get_register(index.name())
                    .map(|i| b.wrapping_add(i)),
                None => Some(b),
            });

        if let Some(value) = known {
            let address = value.wrapping_add(displacement as i64 as u64) & Width::Word16.mask();
            return Expression::Addr(Pointer::new(address));
        }

        let mut ea = self.reg(base);
        if let Some(index) = index {
            let index = self.reg(index);
            ea = Expression::binary(BinaryOp::Add, Width::Word16, ea, index);
        }

        if displacement != 0 {
            ea = Expression::binary(
                BinaryOp::Add,
                Width::Word16,
                ea,
                Expression::constant(displacement as i64 as u64, Width::Word16),
            );
        }

        ea
    }

    fn operand(&mut self, op: &Operand) -> Option<Expression> {
        Some(match op {
            Operand::Register(reg) => self.reg(*reg),
            Operand::Immediate { value, width } => Expression::constant(*value, *width),
            Operand::Absolute { address, width } => {
                Expression::mem(Expression::Addr(*address), *width)
            }
            Operand::Indirect {
                base,
                index,
                displacement,
                width,
            } => {
                let ea = self.effective_address(*base, *index, *displacement);
                Expression::mem(ea, *width)
            }
            Operand::Target(ptr) => Expression::Addr(*ptr),
            Operand::Condition(_) => return None,
        })
    }

    fn op1(&mut self) -> Option<Expression> {
        let instr = self.instr;
        self.operand(instr.op1()?)
    }

    fn op2(&mut self) -> Option<Expression> {
        let instr = self.instr;
        self.operand(instr.op2()?)
    }

    fn width(&self) -> Width {
        self.instr.width().unwrap_or(Width::Byte)
    }

    /// The destination and target of a jump that may carry a condition.
    fn jump_operands(&self) -> Option<(Option<Condition>, &'a Operand)> {
        let instr = self.instr;

        match (instr.op1()?, instr.op2()) {
            (Operand::Condition(cc), Some(target)) => Some((Some(*cc), target)),
            (target, None) => Some((None, target)),
            _ => None,
        }
    }

    fn lower(&mut self) -> Option<Class> {
        use Opcode::*;

        let opcode = self.instr.opcode();

        match opcode {
            Nop => self.m.nop(),
            Halt => self.intrinsic_effect("__halt"),
            Di => self.intrinsic_effect("__disable_interrupts"),
            Ei => self.intrinsic_effect("__enable_interrupts"),
            Ld | Ldw => {
                let dst = self.op1()?;
                let src = self.op2()?;
                self.m.assign(dst, src);
            }
            Ex => {
                let a = self.op1()?;
                let b = self.op2()?;
                let width = self.width();
                let tmp = Expression::Id(self.frame.create_temporary(width));

                self.m.assign(tmp.clone(), a.clone());
                self.m.assign(a, b.clone());
                self.m.assign(b, tmp);
            }
            Incx | Decx => {
                let dst = self.op1()?;
                let op = if opcode == Incx {
                    BinaryOp::Add
                } else {
                    BinaryOp::Sub
                };

                self.m.assign(
                    dst.clone(),
                    Expression::binary(op, Width::Byte, dst.clone(), Expression::constant(1, Width::Byte)),
                );
                self.set_flags("X", dst);
            }
            Daa => {
                let a = self.op1()?;
                self.m.assign(
                    a.clone(),
                    Expression::intrinsic("__decimal_adjust", Width::Byte, vec![a.clone()]),
                );
                self.set_flags(ALU_FLAGS, a);
            }
            Rcf | Scf => {
                let c = self.flags("C");
                let value = if opcode == Scf { 1 } else { 0 };

                self.m.assign(c, Expression::constant(value, Width::Byte));
            }
            Ccf => {
                let c = self.flags("C");
                self.m
                    .assign(c.clone(), Expression::unary(UnaryOp::Not, Width::Byte, c));
            }
            Cpl | Neg => {
                let a = self.op1()?;
                let op = if opcode == Cpl {
                    UnaryOp::Comp
                } else {
                    UnaryOp::Neg
                };

                self.m
                    .assign(a.clone(), Expression::unary(op, Width::Byte, a.clone()));
                if opcode == Neg {
                    self.set_flags(ALU_FLAGS, a);
                }
            }
            Mul => {
                let hl = self.op1()?;
                let n = self.op2()?;
                let l = self.reg(Register::L);

                self.m
                    .assign(hl, Expression::binary(BinaryOp::UMul, Width::Word16, l, n));
            }
            Div => {
                let hl = self.op1()?;
                let n = self.op2()?;
                let dividend = Expression::Id(self.frame.create_temporary(Width::Word16));
                let l = self.reg(Register::L);
                let h = self.reg(Register::H);

                self.m.assign(dividend.clone(), hl);
                self.m.assign(
                    l,
                    Expression::binary(BinaryOp::UDiv, Width::Byte, dividend.clone(), n.clone()),
                );
                self.m.assign(
                    h,
                    Expression::binary(BinaryOp::URem, Width::Byte, dividend.clone(), n.clone()),
                );
                self.set_flags("V", Expression::binary(BinaryOp::UDiv, Width::Word16, dividend, n));
            }
            Add | Adc | Sub | Sbc | And | Xor | Or | Cp => self.alu(opcode)?,
            Inc | Dec => {
                let dst = self.op1()?;
                let width = dst.width().unwrap_or(Width::Byte);
                let op = if opcode == Inc {
                    BinaryOp::Add
                } else {
                    BinaryOp::Sub
                };

                self.m.assign(
                    dst.clone(),
                    Expression::binary(op, width, dst.clone(), Expression::constant(1, width)),
                );
                if width == Width::Byte {
                    self.set_flags("SZHV", dst);
                }
            }
            Rlc | Rrc | Rl | Rr | Sla | Sra | Sll | Srl => self.shift(opcode)?,
            Bit | Res | Set => self.bit(opcode)?,
            Ldar => {
                let dst = self.op1()?;
                let target = self.op2()?;
                self.m.assign(dst, target);
            }
            Push => {
                let src = self.op1()?;
                let sp = self.reg(Register::SP);

                self.m.assign(
                    sp.clone(),
                    Expression::binary(BinaryOp::Sub, Width::Word16, sp.clone(), Expression::constant(2, Width::Word16)),
                );
                self.m.assign(Expression::mem(sp, Width::Word16), src);
            }
            Pop => {
                let dst = self.op1()?;
                let sp = self.reg(Register::SP);

                self.m.assign(dst, Expression::mem(sp.clone(), Width::Word16));
                self.m.assign(
                    sp.clone(),
                    Expression::binary(BinaryOp::Add, Width::Word16, sp, Expression::constant(2, Width::Word16)),
                );
            }
            Jp | Jr | Jrl => return self.jump(),
            Djnz => {
                let instr = self.instr;
                let (counter, target) = match (instr.op1()?, instr.op2()) {
                    (Operand::Register(reg), Some(Operand::Target(t))) => (*reg, *t),
                    (Operand::Target(t), None) => (Register::B, *t),
                    _ => return None,
                };

                let width = counter.width();
                let counter = self.reg(counter);

                self.m.assign(
                    counter.clone(),
                    Expression::binary(BinaryOp::Sub, width, counter.clone(), Expression::constant(1, width)),
                );
                self.m.branch(
                    Expression::binary(BinaryOp::Ne, width, counter, Expression::constant(0, width)),
                    target,
                );

                return Some(Class::ConditionalTransfer);
            }
            Call | Callr => {
                let target = self.op1()?;
                self.m.call(target);

                return Some(Class::Call);
            }
            Swi => {
                self.m
                    .call(Expression::Addr(Pointer::new(SWI_VECTOR)));

                return Some(Class::Call);
            }
            Ret => {
                self.m.ret();

                return Some(Class::Transfer);
            }
            Reti => {
                self.intrinsic_effect("__restore_interrupts");
                self.m.ret();

                return Some(Class::Transfer);
            }
            Invalid | Exx => return None,
        }

        Some(Class::Linear)
    }

    fn intrinsic_effect(&mut self, name: &'static str) {
        self.m
            .side_effect(Expression::intrinsic(name, Width::Byte, vec![]));
    }

    fn alu(&mut self, opcode: Opcode) -> Option<()> {
        let dst = self.op1()?;
        let src = self.op2()?;
        let width = dst.width().unwrap_or_else(|| self.width());

        let value = match opcode {
            Opcode::Add => Expression::binary(BinaryOp::Add, width, dst.clone(), src),
            Opcode::Adc => {
                let carry = self.carry(width);
                Expression::binary(
                    BinaryOp::Add,
                    width,
                    Expression::binary(BinaryOp::Add, width, dst.clone(), src),
                    carry,
                )
            }
            Opcode::Sub | Opcode::Cp => Expression::binary(BinaryOp::Sub, width, dst.clone(), src),
            Opcode::Sbc => {
                let carry = self.carry(width);
                Expression::binary(
                    BinaryOp::Sub,
                    width,
                    Expression::binary(BinaryOp::Sub, width, dst.clone(), src),
                    carry,
                )
            }
            Opcode::And => Expression::binary(BinaryOp::And, width, dst.clone(), src),
            Opcode::Xor => Expression::binary(BinaryOp::Xor, width, dst.clone(), src),
            Opcode::Or => Expression::binary(BinaryOp::Or, width, dst.clone(), src),
            _ => return None,
        };

        if opcode == Opcode::Cp {
            self.set_flags(ALU_FLAGS, value);
        } else {
            self.m.assign(dst.clone(), value);
            self.set_flags(ALU_FLAGS, dst);
        }

        Some(())
    }

    fn shift(&mut self, opcode: Opcode) -> Option<()> {
        let dst = self.op1()?;
        let width = dst.width().unwrap_or(Width::Byte);
        let one = Expression::constant(1, width);

        let value = match opcode {
            Opcode::Rlc => Expression::intrinsic("__rol", width, vec![dst.clone(), one]),
            Opcode::Rrc => Expression::intrinsic("__ror", width, vec![dst.clone(), one]),
            Opcode::Rl => {
                let carry = self.flags("C");
                Expression::intrinsic("__rcl", width, vec![dst.clone(), one, carry])
            }
            Opcode::Rr => {
                let carry = self.flags("C");
                Expression::intrinsic("__rcr", width, vec![dst.clone(), one, carry])
            }
            Opcode::Sla | Opcode::Sll => Expression::binary(BinaryOp::Shl, width, dst.clone(), one),
            Opcode::Sra => Expression::binary(BinaryOp::Sar, width, dst.clone(), one),
            Opcode::Srl => Expression::binary(BinaryOp::Shr, width, dst.clone(), one),
            _ => return None,
        };

        self.m.assign(dst.clone(), value);
        self.set_flags(ALU_FLAGS, dst);

        Some(())
    }

    fn bit(&mut self, opcode: Opcode) -> Option<()> {
        let index = match self.instr.op1()? {
            Operand::Immediate { value, .. } => *value,
            _ => return None,
        };
        let dst = self.op2()?;
        let width = dst.width().unwrap_or(Width::Byte);
        let mask = 1u64 << (index & 0x07);

        match opcode {
            Opcode::Bit => self.set_flags(
                "Z",
                Expression::binary(BinaryOp::And, width, dst, Expression::constant(mask, width)),
            ),
            Opcode::Res => self.m.assign(
                dst.clone(),
                Expression::binary(BinaryOp::And, width, dst, Expression::constant(!mask, width)),
            ),
            Opcode::Set => self.m.assign(
                dst.clone(),
                Expression::binary(BinaryOp::Or, width, dst, Expression::constant(mask, width)),
            ),
            _ => return None,
        }

        Some(())
    }

    fn jump(&mut self) -> Option<Class> {
        let (condition, target) = self.jump_operands()?;

        match condition {
            None | Some(Condition::T) => {
                let target = self.operand(target)?;
                self.m.goto(target);

                Some(Class::Transfer)
            }
            Some(Condition::F) => {
                self.m.nop();

                Some(Class::Linear)
            }
            Some(cc) => {
                let target = match target {
                    Operand::Target(t) => *t,
                    _ => return None,
                };
                let flags: Identifier = self.frame.ensure_flags(cc.flags());

                self.m
                    .branch(Expression::Test(cc.name().to_string(), flags), target);

                Some(Class::ConditionalTransfer)
            }
        }
    }
}

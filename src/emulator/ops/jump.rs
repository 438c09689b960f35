//! A taken jump stores `target - 1` in PC: after every executed instruction
//! the engine moves PC forward by one, which lands it exactly on `target`.

use crate::emulator::engine::Engine;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

pub(super) fn jump_if(ctx: &mut ExecContext<'_>, taken: bool) -> Result<Control, ExecError> {
    let target = ctx.next_byte()?;
    if taken {
        tracing::trace!("jump to {:02X}", target);
        ctx.registers.set(Register::Pc, target.wrapping_sub(1));
    }
    Ok(Control::Continue)
}

#[derive(Debug, Clone, Copy)]
pub struct JumpOp;

impl Op for JumpOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        jump_if(ctx, true)
    }
}

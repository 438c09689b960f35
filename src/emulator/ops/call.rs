use crate::emulator::engine::Engine;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::jump::jump_if;
use super::{Control, ExecContext, Op};

/// RET ends up pointing at the CALL's operand byte, so returning resumes
/// after the CALL.
#[derive(Debug, Clone, Copy)]
pub struct CallOp;

impl Op for CallOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        let pc = ctx.registers.get(Register::Pc);
        ctx.registers.set(Register::Ret, pc.wrapping_add(1));
        jump_if(ctx, true)
    }
}

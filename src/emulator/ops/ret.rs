use crate::emulator::engine::Engine;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

#[derive(Debug, Clone, Copy)]
pub struct RetOp;

impl Op for RetOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        let ret = ctx.registers.get(Register::Ret);
        ctx.registers.set(Register::Pc, ret);
        Ok(Control::Continue)
    }
}

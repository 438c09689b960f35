use crate::emulator::engine::Engine;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

/// `MOVE RA, addr`
#[derive(Debug, Clone, Copy)]
pub struct MoveLoadOp;

impl Op for MoveLoadOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        let address = ctx.next_byte()?;
        let value = ctx.memory.read_address(address)?;
        ctx.registers.set(Register::Ra, value);
        Ok(Control::Continue)
    }
}

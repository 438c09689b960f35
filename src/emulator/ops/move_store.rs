use crate::emulator::engine::Engine;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

/// `MOVE addr, RA`
#[derive(Debug, Clone, Copy)]
pub struct MoveStoreOp;

impl Op for MoveStoreOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        let address = ctx.next_byte()?;
        let ra = ctx.registers.get(Register::Ra);
        ctx.memory.write_address(address, ra)?;
        Ok(Control::Continue)
    }
}

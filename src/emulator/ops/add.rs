use crate::emulator::engine::Engine;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

/// `ADD RA, addr`, the addend is read from memory.
#[derive(Debug, Clone, Copy)]
pub struct AddOp;

impl Op for AddOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        let address = ctx.next_byte()?;
        let value = ctx.memory.read_address(address)?;
        tracing::trace!("ADD RA, [{:02X}] = {:02X}", address, value);
        ctx.registers.increment(Register::Ra, value);
        Ok(Control::Continue)
    }
}

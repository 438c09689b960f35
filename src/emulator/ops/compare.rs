use crate::emulator::alu::add_with_carry;
use crate::emulator::engine::Engine;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

/// RA - value, flags only.
pub(super) fn compare_with(ctx: &mut ExecContext<'_>, value: u8) {
    let ra = ctx.registers.get(Register::Ra);
    let sum = add_with_carry(u32::from(ra), u32::from(value.wrapping_neg()), 8);
    tracing::trace!(ra, value, result = sum.result, "compare");
    ctx.registers.update_flags(sum);
}

/// `COMPARE RA, addr`
#[derive(Debug, Clone, Copy)]
pub struct CompareOp;

impl Op for CompareOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        let address = ctx.next_byte()?;
        let value = ctx.memory.read_address(address)?;
        compare_with(ctx, value);
        Ok(Control::Continue)
    }
}

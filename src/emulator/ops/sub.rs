use crate::emulator::engine::Engine;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

#[derive(Debug, Clone, Copy)]
pub struct SubOp;

impl Op for SubOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        let address = ctx.next_byte()?;
        let value = ctx.memory.read_address(address)?;
        tracing::trace!("SUB RA, [{:02X}] = {:02X}", address, value);
        ctx.registers.decrement(Register::Ra, value);
        Ok(Control::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::ops::test_rig::Rig;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_sub_below_zero_goes_negative() {
        let mut rig = Rig::new(&[6, 0x20]);
        rig.memory.write_address(0x20, 3).unwrap();
        rig.registers.set(Register::Ra, 1);
        rig.run(&SubOp).unwrap();

        assert_eq!(rig.reg(Register::Ra), 0xFE);
        assert_eq!(rig.reg(Register::N), 1);
        assert_eq!(rig.reg(Register::C), 0);
    }
}

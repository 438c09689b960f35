use crate::emulator::engine::Engine;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

#[derive(Debug, Clone, Copy)]
pub struct SubiOp;

impl Op for SubiOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        let value = ctx.next_byte()?;
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
    fn test_subi_to_zero() {
        let mut rig = Rig::new(&[5, 0x05]);
        rig.registers.set(Register::Ra, 5);
        rig.run(&SubiOp).unwrap();

        assert_eq!(rig.reg(Register::Ra), 0);
        assert_eq!(rig.reg(Register::Z), 1);
        assert_eq!(rig.reg(Register::C), 1);
        assert_eq!(rig.reg(Register::N), 0);
    }
}

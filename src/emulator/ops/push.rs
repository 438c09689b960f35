use crate::emulator::engine::Engine;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

#[derive(Debug, Clone, Copy)]
pub struct PushOp;

impl Op for PushOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        let sp = ctx.registers.get(Register::Sp);
        let ra = ctx.registers.get(Register::Ra);
        ctx.memory.write_address(sp, ra)?;
        ctx.registers.decrement(Register::Sp, 1);
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
    fn test_push_writes_then_decrements() {
        let mut rig = Rig::new(&[15]);
        rig.registers.set(Register::Ra, 0x2A);
        rig.run(&PushOp).unwrap();

        assert_eq!(rig.memory.read_address(0xFF), Ok(0x2A));
        assert_eq!(rig.reg(Register::Sp), 0xFE);
    }

    #[traced_test]
    #[test]
    fn test_push_does_not_touch_flags() {
        let mut rig = Rig::new(&[15]);
        rig.registers.set(Register::Z, 1);
        rig.run(&PushOp).unwrap();
        assert_eq!(rig.reg(Register::Z), 1);
        assert_eq!(rig.reg(Register::C), 0);
    }
}

use crate::emulator::engine::Engine;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

#[derive(Debug, Clone, Copy)]
pub struct IncOp;

impl Op for IncOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        ctx.registers.increment(Register::Ra, 1);
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
    fn test_inc_wraps_and_sets_carry() {
        let mut rig = Rig::new(&[7]);
        rig.run(&IncOp).unwrap();
        rig.run(&IncOp).unwrap();
        assert_eq!(rig.reg(Register::Ra), 2);
        // no operand consumed
        assert_eq!(rig.reg(Register::Pc), 0);

        rig.registers.set(Register::Ra, 0xFF);
        rig.run(&IncOp).unwrap();
        assert_eq!(rig.reg(Register::Ra), 0);
        assert_eq!(rig.reg(Register::Z), 1);
        assert_eq!(rig.reg(Register::C), 1);
    }
}

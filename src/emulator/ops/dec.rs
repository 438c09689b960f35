use crate::emulator::engine::Engine;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

#[derive(Debug, Clone, Copy)]
pub struct DecOp;

impl Op for DecOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        ctx.registers.decrement(Register::Ra, 1);
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
    fn test_dec_below_zero() {
        let mut rig = Rig::new(&[8]);
        rig.registers.set(Register::Ra, 1);
        rig.run(&DecOp).unwrap();
        assert_eq!(rig.reg(Register::Ra), 0);
        assert_eq!(rig.reg(Register::Z), 1);

        rig.run(&DecOp).unwrap();
        assert_eq!(rig.reg(Register::Ra), 0xFF);
        assert_eq!(rig.reg(Register::N), 1);
        assert_eq!(rig.reg(Register::Pc), 0);
    }
}

use crate::emulator::engine::Engine;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

/// `MOVEI RA, value`. A plain register write: no flags.
#[derive(Debug, Clone, Copy)]
pub struct MoveiOp;

impl Op for MoveiOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        let value = ctx.next_byte()?;
        ctx.registers.set(Register::Ra, value);
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
    fn test_movei_does_not_set_flags() {
        let mut rig = Rig::new(&[0, 0x00]);
        rig.run(&MoveiOp).unwrap();
        assert_eq!(rig.reg(Register::Ra), 0);
        assert_eq!(rig.reg(Register::Z), 0);
        assert_eq!(rig.reg(Register::Pc), 1);
    }
}

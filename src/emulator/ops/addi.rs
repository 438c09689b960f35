use crate::emulator::engine::Engine;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

/// `ADDI RA, value`
#[derive(Debug, Clone, Copy)]
pub struct AddiOp;

impl Op for AddiOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        let value = ctx.next_byte()?;
        ctx.registers.increment(Register::Ra, value);
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
    fn test_addi_consumes_operand_and_sets_flags() {
        let mut rig = Rig::new(&[3, 0x80]);
        rig.registers.set(Register::Ra, 0x7F);
        rig.run(&AddiOp).unwrap();

        assert_eq!(rig.reg(Register::Pc), 1);
        assert_eq!(rig.reg(Register::Ra), 0xFF);
        assert_eq!(rig.reg(Register::N), 1);
        assert_eq!(rig.reg(Register::Z), 0);
        assert_eq!(rig.reg(Register::C), 0);
    }
}

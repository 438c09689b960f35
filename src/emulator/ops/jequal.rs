use crate::emulator::engine::Engine;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::jump::jump_if;
use super::{Control, ExecContext, Op};

/// Taken when Z is 1.
#[derive(Debug, Clone, Copy)]
pub struct JequalOp;

impl Op for JequalOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        let taken = ctx.registers.get(Register::Z) == 1;
        jump_if(ctx, taken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::ops::test_rig::Rig;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_jequal_follows_z() {
        // (n, z, taken)
        let cases = [
            (0, 1, true),
            (1, 0, false),
            (0, 0, false),
        ];

        for (n, z, taken) in cases {
            let mut rig = Rig::new(&[14, 0x40]);
            rig.registers.set(Register::N, n);
            rig.registers.set(Register::Z, z);
            rig.run(&JequalOp).unwrap();

            let expected = if taken { 0x3F } else { 0x01 };
            assert_eq!(rig.reg(Register::Pc), expected, "n={n} z={z}");
        }
    }
}

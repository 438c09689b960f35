use crate::emulator::engine::Engine;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::jump::jump_if;
use super::{Control, ExecContext, Op};

/// Taken when neither N nor Z is set.
#[derive(Debug, Clone, Copy)]
pub struct JgreaterOp;

impl Op for JgreaterOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        let taken = !ctx.registers.flag(Register::N) && !ctx.registers.flag(Register::Z);
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
    fn test_jgreater_needs_both_clear() {
        // (n, z, taken)
        let cases = [
            (0, 0, true),
            (1, 0, false),
            (0, 1, false),
        ];

        for (n, z, taken) in cases {
            let mut rig = Rig::new(&[13, 0x40]);
            rig.registers.set(Register::N, n);
            rig.registers.set(Register::Z, z);
            rig.run(&JgreaterOp).unwrap();

            let expected = if taken { 0x3F } else { 0x01 };
            assert_eq!(rig.reg(Register::Pc), expected, "n={n} z={z}");
        }
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use super::alu::{add_with_carry, is_negative, Sum};
use super::observer::ObserverHandle;

/// Every slot of the register file, flags included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Register {
    /// Accumulator, the only register arithmetic targets
    Ra,
    /// Program counter
    Pc,
    /// Stack pointer, grows downwards from the top of memory
    Sp,
    /// Address just before the return target of the last CALL
    Ret,
    /// Zero flag
    Z,
    /// Carry flag
    C,
    /// Negative flag
    N,
}

impl Register {
    pub const ALL: [Register; 7] = [
        Register::Ra,
        Register::Pc,
        Register::Sp,
        Register::Ret,
        Register::Z,
        Register::C,
        Register::N,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Register::Ra => "RA",
            Register::Pc => "PC",
            Register::Sp => "SP",
            Register::Ret => "RET",
            Register::Z => "Z",
            Register::C => "C",
            Register::N => "N",
        }
    }

    pub fn is_flag(self) -> bool {
        matches!(self, Register::Z | Register::C | Register::N)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registers {
    values: [u8; 7],
    observer: ObserverHandle,
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_observer(&mut self, observer: ObserverHandle) {
        self.observer = observer;
    }

    pub fn get(&self, register: Register) -> u8 {
        self.values[register.index()]
    }

    pub fn set(&mut self, register: Register, value: u8) {
        tracing::trace!(register = register.name(), value, "set register");
        self.values[register.index()] = value;
        self.observer.notify(|o| o.register_updated(register, value));
    }

    /// Adds `delta` with 8-bit wraparound. Z, C and N follow only when the
    /// target is RA.
    pub fn increment(&mut self, register: Register, delta: u8) -> Sum {
        let sum = add_with_carry(u32::from(self.get(register)), u32::from(delta), 8);
        self.set(register, sum.result as u8);

        if register == Register::Ra {
            self.update_flags(sum);
        }
        sum
    }

    pub fn decrement(&mut self, register: Register, delta: u8) -> Sum {
        self.increment(register, delta.wrapping_neg())
    }

    /// Sets Z, N and C from a result that was not necessarily stored in RA.
    pub fn update_flags(&mut self, sum: Sum) {
        let span = tracing::trace_span!("update_flags", result = sum.result, carry = sum.carry);
        let _enter = span.enter();

        self.set(Register::Z, u8::from(sum.result & 0xFF == 0));
        self.set(Register::C, sum.carry);
        self.set(Register::N, u8::from(is_negative(sum.result, 8)));
    }

    pub fn flag(&self, flag: Register) -> bool {
        debug_assert!(flag.is_flag());
        self.get(flag) != 0
    }

    /// Zeroes every slot without notifying.
    pub fn reset(&mut self) {
        self.values = [0; 7];
    }

    pub fn snapshot(&self) -> [(Register, u8); 7] {
        Register::ALL.map(|r| (r, self.get(r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::observer::Observer;
    use std::sync::{Arc, Mutex};
    use tracing_test::traced_test;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(Register, u8)>>);

    impl Observer for Recorder {
        fn register_updated(&self, register: Register, value: u8) {
            self.0.lock().unwrap().push((register, value));
        }
    }

    #[traced_test]
    #[test]
    fn test_increment_ra_updates_flags() {
        let mut regs = Registers::new();
        regs.set(Register::Ra, 0xFF);
        regs.increment(Register::Ra, 1);

        assert_eq!(regs.get(Register::Ra), 0);
        assert_eq!(regs.get(Register::Z), 1);
        assert_eq!(regs.get(Register::C), 1);
        assert_eq!(regs.get(Register::N), 0);

        regs.decrement(Register::Ra, 1);
        assert_eq!(regs.get(Register::Ra), 0xFF);
        assert_eq!(regs.get(Register::Z), 0);
        assert_eq!(regs.get(Register::C), 0);
        assert_eq!(regs.get(Register::N), 1);
    }

    #[traced_test]
    #[test]
    fn test_other_registers_leave_flags_alone() {
        let mut regs = Registers::new();
        regs.set(Register::Z, 1);
        regs.set(Register::N, 1);
        regs.set(Register::Sp, 0xFF);

        regs.increment(Register::Sp, 1);
        regs.decrement(Register::Pc, 1);

        assert_eq!(regs.get(Register::Sp), 0);
        assert_eq!(regs.get(Register::Pc), 0xFF);
        assert_eq!(regs.get(Register::Z), 1);
        assert_eq!(regs.get(Register::N), 1);
        assert_eq!(regs.get(Register::C), 0);
    }

    #[traced_test]
    #[test]
    fn test_set_notifies_observer() {
        let recorder = Arc::new(Recorder::default());
        let mut regs = Registers::new();
        regs.set_observer(ObserverHandle::new(recorder.clone()));

        regs.set(Register::Sp, 0xFF);
        regs.increment(Register::Ra, 2);

        let seen = recorder.0.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                (Register::Sp, 0xFF),
                (Register::Ra, 2),
                (Register::Z, 0),
                (Register::C, 0),
                (Register::N, 0),
            ]
        );
    }

    #[traced_test]
    #[test]
    fn test_reset_zeroes_everything() {
        let mut regs = Registers::new();
        for r in Register::ALL {
            regs.set(r, 7);
        }
        regs.reset();
        assert!(regs.snapshot().iter().all(|(_, v)| *v == 0));
    }
}

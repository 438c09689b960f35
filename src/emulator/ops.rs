//! The Easy8 instruction set.
//!
//! Every opcode is one [`OpCode`] variant. The same variant drives both
//! directions: [`OpCode::encode`] at assembly time and [`OpCode::execute`] at
//! run time, so the two can never disagree about operand layout.

use std::fmt;

use lazy_static::lazy_static;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};

use super::engine::Engine;
use super::io::IoPort;
use super::memory::{Memory, MemoryError};
use super::parse::{EncodeError, Emitter, Operand};
use super::registers::{Register, Registers};
use super::ExecError;

mod add;
mod addi;
mod call;
mod compare;
mod comparei;
mod dec;
mod in_op;
mod inc;
mod jequal;
mod jgreater;
mod jless;
mod jump;
mod move_load;
mod move_store;
mod movei;
mod out;
mod pop;
mod push;
mod rand_op;
mod ret;
mod sleep;
mod stop;
mod sub;
mod subi;

pub use add::AddOp;
pub use addi::AddiOp;
pub use call::CallOp;
pub use compare::CompareOp;
pub use comparei::CompareiOp;
pub use dec::DecOp;
pub use in_op::InOp;
pub use inc::IncOp;
pub use jequal::JequalOp;
pub use jgreater::JgreaterOp;
pub use jless::JlessOp;
pub use jump::JumpOp;
pub use move_load::MoveLoadOp;
pub use move_store::MoveStoreOp;
pub use movei::MoveiOp;
pub use out::OutOp;
pub use pop::PopOp;
pub use push::PushOp;
pub use rand_op::RandOp;
pub use ret::RetOp;
pub use sleep::SleepOp;
pub use stop::StopOp;
pub use sub::SubOp;
pub use subi::SubiOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpCode {
    Stop,
    Inc,
    Dec,
    Push,
    Pop,
    Ret,
    Movei,
    /// `MOVE RA, addr`
    MoveLoad,
    /// `MOVE addr, RA`
    MoveStore,
    Addi,
    Add,
    Subi,
    Sub,
    Comparei,
    Compare,
    Jump,
    Jless,
    Jgreater,
    Jequal,
    Call,
    In,
    Out,
    Sleep,
    Rand,
    /// Raw data directive, never executed
    Byte,
}

/// How an instruction is written in source and laid out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Opcode only, no operands
    OneByte,
    /// `MNEMONIC RA, value`
    RaValue,
    /// `MOVE RA, addr`
    RaFirst,
    /// `MOVE addr, RA`
    RaSecond,
    /// `MNEMONIC value`
    Value,
    /// `BYTE xx`, a single literal with no opcode
    Raw,
}

/// Instruction table in lookup order. When a mnemonic maps to several
/// variants the assembler tries them in this order.
pub const INSTRUCTION_SET: [OpCode; 25] = [
    OpCode::Stop,
    OpCode::Inc,
    OpCode::Dec,
    OpCode::Push,
    OpCode::Pop,
    OpCode::Ret,
    OpCode::Movei,
    OpCode::MoveLoad,
    OpCode::MoveStore,
    OpCode::Addi,
    OpCode::Add,
    OpCode::Subi,
    OpCode::Sub,
    OpCode::Comparei,
    OpCode::Compare,
    OpCode::Jump,
    OpCode::Jless,
    OpCode::Jgreater,
    OpCode::Jequal,
    OpCode::Call,
    OpCode::In,
    OpCode::Out,
    OpCode::Sleep,
    OpCode::Rand,
    OpCode::Byte,
];

lazy_static! {
    static ref BY_CODE: [Option<OpCode>; 256] = {
        let mut table = [None; 256];
        for op in INSTRUCTION_SET {
            if let Ok(code) = u8::try_from(op.code()) {
                table[code as usize] = Some(op);
            }
        }
        table
    };
    static ref BY_MNEMONIC: HashMap<&'static str, Vec<OpCode>> = {
        let mut table: HashMap<&'static str, Vec<OpCode>> = HashMap::default();
        for op in INSTRUCTION_SET {
            table.entry(op.mnemonic()).or_default().push(op);
        }
        table
    };
}

/// What the engine does after an executor returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Halt,
}

/// One executable instruction.
pub trait Op: std::fmt::Debug {
    /// Runs the instruction. PC points at the opcode on entry; ops that take
    /// an operand leave it on the operand byte.
    fn execute(&self, ctx: &mut ExecContext<'_>, engine: &mut Engine) -> Result<Control, ExecError>;
}

/// The machine as seen by an executor. Scheduling is not in here: it is
/// passed to [`Op::execute`] separately and only `IN` and `SLEEP` use it.
pub struct ExecContext<'a> {
    pub memory: &'a mut Memory,
    pub registers: &'a mut Registers,
    pub io: &'a mut IoPort,
    pub rng: &'a mut StdRng,
}

impl ExecContext<'_> {
    /// Moves PC onto the operand byte and returns it.
    pub fn next_byte(&mut self) -> Result<u8, MemoryError> {
        self.memory.next_byte(self.registers)
    }
}

impl OpCode {
    /// The byte written for this instruction. `BYTE` has no opcode and reports -1.
    pub fn code(self) -> i16 {
        match self {
            OpCode::Movei => 0,
            OpCode::MoveLoad => 1,
            OpCode::MoveStore => 2,
            OpCode::Addi => 3,
            OpCode::Add => 4,
            OpCode::Subi => 5,
            OpCode::Sub => 6,
            OpCode::Inc => 7,
            OpCode::Dec => 8,
            OpCode::Comparei => 9,
            OpCode::Compare => 10,
            OpCode::Jump => 11,
            OpCode::Jless => 12,
            OpCode::Jgreater => 13,
            OpCode::Jequal => 14,
            OpCode::Push => 15,
            OpCode::Pop => 16,
            OpCode::Call => 17,
            OpCode::Ret => 18,
            OpCode::In => 19,
            OpCode::Out => 20,
            OpCode::Stop => 21,
            OpCode::Sleep => 22,
            OpCode::Rand => 23,
            OpCode::Byte => -1,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Stop => "STOP",
            OpCode::Inc => "INC",
            OpCode::Dec => "DEC",
            OpCode::Push => "PUSH",
            OpCode::Pop => "POP",
            OpCode::Ret => "RET",
            OpCode::Movei => "MOVEI",
            OpCode::MoveLoad | OpCode::MoveStore => "MOVE",
            OpCode::Addi => "ADDI",
            OpCode::Add => "ADD",
            OpCode::Subi => "SUBI",
            OpCode::Sub => "SUB",
            OpCode::Comparei => "COMPAREI",
            OpCode::Compare => "COMPARE",
            OpCode::Jump => "JUMP",
            OpCode::Jless => "JLESS",
            OpCode::Jgreater => "JGREATER",
            OpCode::Jequal => "JEQUAL",
            OpCode::Call => "CALL",
            OpCode::In => "IN",
            OpCode::Out => "OUT",
            OpCode::Sleep => "SLEEP",
            OpCode::Rand => "RAND",
            OpCode::Byte => "BYTE",
        }
    }

    pub fn shape(self) -> Shape {
        match self {
            OpCode::Stop
            | OpCode::Inc
            | OpCode::Dec
            | OpCode::Push
            | OpCode::Pop
            | OpCode::Ret
            | OpCode::Rand => Shape::OneByte,
            OpCode::Movei
            | OpCode::Addi
            | OpCode::Add
            | OpCode::Subi
            | OpCode::Sub
            | OpCode::Comparei
            | OpCode::Compare => Shape::RaValue,
            OpCode::MoveLoad => Shape::RaFirst,
            OpCode::MoveStore => Shape::RaSecond,
            OpCode::Jump
            | OpCode::Jless
            | OpCode::Jgreater
            | OpCode::Jequal
            | OpCode::Call
            | OpCode::In
            | OpCode::Out
            | OpCode::Sleep => Shape::Value,
            OpCode::Byte => Shape::Raw,
        }
    }

    /// Decode lookup. Never yields `BYTE`.
    pub fn from_value(byte: u8) -> Option<OpCode> {
        BY_CODE[byte as usize]
    }

    /// Every variant written with `mnemonic`, in table order.
    pub fn by_mnemonic(mnemonic: &str) -> &'static [OpCode] {
        BY_MNEMONIC
            .get(mnemonic)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn has_executor(self) -> bool {
        self != OpCode::Byte
    }

    /// Length in bytes once assembled.
    pub fn width(self) -> usize {
        match self.shape() {
            Shape::OneByte | Shape::Raw => 1,
            Shape::RaValue | Shape::RaFirst | Shape::RaSecond | Shape::Value => 2,
        }
    }

    /// Writes this instruction through `emitter`.
    ///
    /// Callers check [`Shape::accepts`] first; a shape mismatch here is
    /// reported as [`EncodeError::Rejected`].
    pub(crate) fn encode(
        self,
        operands: &[Option<Operand>; 2],
        emitter: &mut Emitter<'_>,
    ) -> Result<(), EncodeError> {
        let shape = self.shape();
        if !shape.accepts(operands) {
            return Err(EncodeError::Rejected);
        }

        match (shape, operands) {
            (Shape::OneByte, _) => emitter.write_opcode(self),
            (Shape::RaValue | Shape::RaFirst, [_, Some(value)])
            | (Shape::RaSecond | Shape::Value, [Some(value), _]) => {
                emitter.write_opcode(self)?;
                emitter.write_operand(value)
            }
            (Shape::Raw, [Some(value), _]) => emitter.write_literal(value),
            _ => Err(EncodeError::Rejected),
        }
    }

    /// Decodes to the matching [`Op`] and runs it.
    pub fn execute(
        self,
        ctx: &mut ExecContext<'_>,
        engine: &mut Engine,
    ) -> Result<Control, ExecError> {
        let span = tracing::debug_span!("execute", op = self.mnemonic(), code = self.code());
        let _guard = span.enter();

        match self {
            OpCode::Stop => StopOp.execute(ctx, engine),
            OpCode::Rand => RandOp.execute(ctx, engine),
            OpCode::Inc => IncOp.execute(ctx, engine),
            OpCode::Dec => DecOp.execute(ctx, engine),
            OpCode::Addi => AddiOp.execute(ctx, engine),
            OpCode::Add => AddOp.execute(ctx, engine),
            OpCode::Subi => SubiOp.execute(ctx, engine),
            OpCode::Sub => SubOp.execute(ctx, engine),
            OpCode::Comparei => CompareiOp.execute(ctx, engine),
            OpCode::Compare => CompareOp.execute(ctx, engine),
            OpCode::Push => PushOp.execute(ctx, engine),
            OpCode::Pop => PopOp.execute(ctx, engine),
            OpCode::Movei => MoveiOp.execute(ctx, engine),
            OpCode::MoveLoad => MoveLoadOp.execute(ctx, engine),
            OpCode::MoveStore => MoveStoreOp.execute(ctx, engine),
            OpCode::Jump => JumpOp.execute(ctx, engine),
            OpCode::Jless => JlessOp.execute(ctx, engine),
            OpCode::Jgreater => JgreaterOp.execute(ctx, engine),
            OpCode::Jequal => JequalOp.execute(ctx, engine),
            OpCode::Call => CallOp.execute(ctx, engine),
            OpCode::Ret => RetOp.execute(ctx, engine),
            OpCode::In => InOp.execute(ctx, engine),
            OpCode::Out => OutOp.execute(ctx, engine),
            OpCode::Sleep => SleepOp.execute(ctx, engine),
            OpCode::Byte => Err(ExecError::NoExecutor {
                address: ctx.registers.get(Register::Pc),
                mnemonic: self.mnemonic(),
            }),
        }
    }

    /// Source text for this instruction with the given operand byte.
    pub fn render(self, operand: Option<u8>) -> String {
        let value = operand.map(|v| format!("{v:02X}")).unwrap_or_default();
        match self.shape() {
            Shape::OneByte => self.mnemonic().to_string(),
            Shape::RaValue | Shape::RaFirst => format!("{} RA, {value}", self.mnemonic()),
            Shape::RaSecond => format!("{} {value}, RA", self.mnemonic()),
            Shape::Value | Shape::Raw => format!("{} {value}", self.mnemonic()),
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.mnemonic(), self.code())
    }
}

impl Shape {
    /// Whether an operand list fits this shape. For `MOVE` at most one of
    /// [`Shape::RaFirst`] and [`Shape::RaSecond`] accepts a given pair.
    pub fn accepts(self, operands: &[Option<Operand>; 2]) -> bool {
        let is_ra = |o: &Option<Operand>| matches!(o, Some(op) if op.is_register_ra());
        match (self, operands) {
            (Shape::OneByte, [None, None]) => true,
            (Shape::RaValue, [first, Some(_)]) => is_ra(first),
            (Shape::RaFirst, [first, second @ Some(_)]) => is_ra(first) && !is_ra(second),
            (Shape::RaSecond, [first @ Some(_), second]) => is_ra(second) && !is_ra(first),
            (Shape::Value | Shape::Raw, [Some(_), None]) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_rig {
    use rand::SeedableRng;

    use super::*;

    /// Owned machine parts for driving single executors in tests.
    pub struct Rig {
        pub memory: Memory,
        pub registers: Registers,
        pub io: IoPort,
        pub rng: StdRng,
        pub engine: Engine,
    }

    impl Rig {
        /// Loads `program` at address 0 with PC on the first byte and a
        /// running engine.
        pub fn new(program: &[u8]) -> Self {
            let mut memory = Memory::default();
            for byte in program {
                memory.write_byte(*byte).unwrap();
            }
            let mut registers = Registers::new();
            registers.set(Register::Sp, (memory.size() - 1) as u8);
            let mut engine = Engine::default();
            engine.start();
            Self {
                memory,
                registers,
                io: IoPort::new(),
                rng: StdRng::seed_from_u64(7),
                engine,
            }
        }

        pub fn run(&mut self, op: &dyn Op) -> Result<Control, ExecError> {
            let mut ctx = ExecContext {
                memory: &mut self.memory,
                registers: &mut self.registers,
                io: &mut self.io,
                rng: &mut self.rng,
            };
            op.execute(&mut ctx, &mut self.engine)
        }

        pub fn exec(&mut self, op: OpCode) -> Result<Control, ExecError> {
            let mut ctx = ExecContext {
                memory: &mut self.memory,
                registers: &mut self.registers,
                io: &mut self.io,
                rng: &mut self.rng,
            };
            op.execute(&mut ctx, &mut self.engine)
        }

        pub fn reg(&self, register: Register) -> u8 {
            self.registers.get(register)
        }
    }
}

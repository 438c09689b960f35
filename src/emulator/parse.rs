//! Two-pass assembler for Easy8 source.
//!
//! ```norust
//! @loop: ADDI RA, 01   # label, mnemonic, operands, comment
//! ^^^^^  ^^^^ ^^  ^^
//! |      |    |   Operand::Word("01")
//! |      |    Operand::Word("RA")
//! |      mnemonic
//! label "loop"
//!
//!        JUMP @loop
//!             ^^^^^ Operand::Label("loop")
//! ```
//!
//! The first pass lays bytes down in order and leaves a zero wherever a label
//! is referenced; the second pass patches those zeros with the label
//! addresses.

use std::iter::Peekable;
use std::str::Chars;

use indexmap::IndexMap;
use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::memory::Memory;
use super::ops::OpCode;
use super::Emulator;

/// Marks an operand as a label reference, and a label definition.
pub const LABEL_SIGIL: char = '@';
pub const COMMENT_CHAR: char = '#';
pub const LABEL_SUFFIX: char = ':';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    /// `@name`, stored without the sigil
    Label(String),
    /// Anything else: a register name or a hex literal
    Word(String),
}

impl Operand {
    pub fn is_register_ra(&self) -> bool {
        matches!(self, Operand::Word(w) if w == "RA")
    }
}

/// One classified source line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub label: Option<String>,
    pub mnemonic: Option<String>,
    pub operands: [Option<Operand>; 2],
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AssemblyError {
    #[error("syntax error on line {line}: {text}")]
    Syntax { line: usize, text: String },
    #[error("unknown instruction '{mnemonic}' on line {line}")]
    UnknownMnemonic { line: usize, mnemonic: String },
    #[error("invalid operands for {mnemonic} on line {line}: {text}")]
    InvalidOperands {
        line: usize,
        mnemonic: String,
        text: String,
    },
    #[error("'{literal}' on line {line} is not a hexadecimal byte")]
    InvalidLiteral { line: usize, literal: String },
    #[error("program does not fit in {size} bytes (line {line})")]
    ProgramTooLarge { line: usize, size: usize },
    #[error("label not found: {label}")]
    LabelNotFound { label: String },
}

/// Failure inside a single encoder, before it is tied to a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The operands do not fit this variant; another may take them
    Rejected,
    InvalidLiteral(String),
    Full,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// What the last successful assembly produced, for front ends and listings.
pub struct CompilationArtifacts {
    /// Labels in definition order. A redefined label keeps its latest address.
    pub labels: IndexMap<String, u8>,
    /// 1-based source line to the address of the first byte it produced
    pub line_to_address: HashMap<usize, u8>,
    /// Bytes written, i.e. the final assembly pointer
    pub len: usize,
}

/// Splits one line into its parts, or `None` if it matches none of the
/// accepted shapes.
pub fn lex_line(text: &str) -> Option<Line> {
    LineLexer {
        chars: text.chars().peekable(),
    }
    .lex()
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct LineLexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl LineLexer<'_> {
    fn lex(mut self) -> Option<Line> {
        let mut line = Line::default();
        self.skip_whitespace();

        match self.chars.peek() {
            None => return Some(line),
            Some(&COMMENT_CHAR) => {
                line.comment = Some(self.rest());
                return Some(line);
            }
            Some(&LABEL_SIGIL) => {
                line.label = Some(self.label()?);
                if self.chars.next() != Some(LABEL_SUFFIX) {
                    return None;
                }
                self.skip_whitespace();
                match self.chars.peek() {
                    None => return Some(line),
                    Some(&COMMENT_CHAR) => {
                        line.comment = Some(self.rest());
                        return Some(line);
                    }
                    _ => {}
                }
            }
            _ => {}
        }

        line.mnemonic = Some(self.word()?);

        let spaced = self.skip_whitespace();
        match self.chars.peek() {
            None => return Some(line),
            Some(&COMMENT_CHAR) => {
                line.comment = Some(self.rest());
                return Some(line);
            }
            // operands must be separated from the mnemonic
            Some(_) if !spaced => return None,
            _ => {}
        }

        line.operands[0] = Some(self.operand()?);
        self.skip_whitespace();
        if self.chars.peek() == Some(&',') {
            self.chars.next();
            self.skip_whitespace();
            line.operands[1] = Some(self.operand()?);
            self.skip_whitespace();
        }

        match self.chars.peek() {
            None => Some(line),
            Some(&COMMENT_CHAR) => {
                line.comment = Some(self.rest());
                Some(line)
            }
            _ => None,
        }
    }

    /// Returns whether anything was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
            skipped = true;
        }
        skipped
    }

    fn rest(&mut self) -> String {
        self.chars.by_ref().collect()
    }

    fn word(&mut self) -> Option<String> {
        let mut word = String::new();
        while let Some(&c) = self.chars.peek() {
            if !is_word_char(c) {
                break;
            }
            word.push(c);
            self.chars.next();
        }
        (!word.is_empty()).then_some(word)
    }

    fn label(&mut self) -> Option<String> {
        if self.chars.next() != Some(LABEL_SIGIL) {
            return None;
        }
        self.word()
    }

    fn operand(&mut self) -> Option<Operand> {
        if self.chars.peek() == Some(&LABEL_SIGIL) {
            self.label().map(Operand::Label)
        } else {
            self.word().map(Operand::Word)
        }
    }
}

/// A label use waiting for the second pass.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Patch {
    label: String,
    address: usize,
    line: usize,
}

/// Byte sink handed to the encoders during the first pass.
pub struct Emitter<'a> {
    memory: &'a mut Memory,
    patches: &'a mut Vec<Patch>,
    line: usize,
}

impl Emitter<'_> {
    pub fn write_opcode(&mut self, op: OpCode) -> Result<(), EncodeError> {
        let code = u8::try_from(op.code()).map_err(|_| EncodeError::Rejected)?;
        self.write(code)
    }

    /// Writes a hex literal, or a placeholder to be patched with a label address.
    pub fn write_operand(&mut self, operand: &Operand) -> Result<(), EncodeError> {
        match operand {
            Operand::Label(label) => {
                self.patches.push(Patch {
                    label: label.clone(),
                    address: self.memory.assembly_pointer(),
                    line: self.line,
                });
                self.write(0)
            }
            Operand::Word(_) => self.write_literal(operand),
        }
    }

    pub fn write_literal(&mut self, operand: &Operand) -> Result<(), EncodeError> {
        match operand {
            Operand::Word(text) => {
                let value = u8::from_str_radix(text, 16)
                    .map_err(|_| EncodeError::InvalidLiteral(text.clone()))?;
                self.write(value)
            }
            Operand::Label(label) => Err(EncodeError::InvalidLiteral(format!("@{label}"))),
        }
    }

    fn write(&mut self, byte: u8) -> Result<(), EncodeError> {
        self.memory.write_byte(byte).map_err(|_| EncodeError::Full)
    }
}

/// One assembly run. Label table and patch list live exactly as long as this.
pub struct Assembler<'m> {
    memory: &'m mut Memory,
    labels: IndexMap<String, u8>,
    patches: Vec<Patch>,
    line_to_address: HashMap<usize, u8>,
}

impl<'m> Assembler<'m> {
    pub fn new(memory: &'m mut Memory) -> Self {
        Self {
            memory,
            labels: IndexMap::new(),
            patches: Vec::new(),
            line_to_address: HashMap::default(),
        }
    }

    /// Clears memory and assembles `source` into it. On error memory is left
    /// however far the failing pass got; the caller clears it.
    pub fn assemble(mut self, source: &str) -> Result<CompilationArtifacts, AssemblyError> {
        self.memory.clear();

        for (index, text) in source.split('\n').enumerate() {
            self.first_pass_line(index + 1, text)?;
        }
        tracing::debug!(
            labels = self.labels.len(),
            patches = self.patches.len(),
            "first pass complete"
        );

        self.resolve()?;

        Ok(CompilationArtifacts {
            labels: self.labels,
            line_to_address: self.line_to_address,
            len: self.memory.assembly_pointer(),
        })
    }

    fn pointer(&self, line: usize) -> Result<u8, AssemblyError> {
        u8::try_from(self.memory.assembly_pointer()).map_err(|_| AssemblyError::ProgramTooLarge {
            line,
            size: self.memory.size(),
        })
    }

    fn first_pass_line(&mut self, line_no: usize, text: &str) -> Result<(), AssemblyError> {
        let line = lex_line(text).ok_or_else(|| AssemblyError::Syntax {
            line: line_no,
            text: text.to_string(),
        })?;

        if let Some(label) = &line.label {
            let address = self.pointer(line_no)?;
            tracing::debug!("line {}: label '{}' at {:02X}", line_no, label, address);
            if let Some(previous) = self.labels.insert(label.clone(), address) {
                tracing::warn!(
                    "line {}: label '{}' redefined ({:02X} -> {:02X})",
                    line_no,
                    label,
                    previous,
                    address
                );
            }
        }

        let Some(mnemonic) = &line.mnemonic else {
            return Ok(());
        };

        let candidates = OpCode::by_mnemonic(mnemonic);
        if candidates.is_empty() {
            return Err(AssemblyError::UnknownMnemonic {
                line: line_no,
                mnemonic: mnemonic.clone(),
            });
        }

        let op = candidates
            .iter()
            .copied()
            .find(|op| op.shape().accepts(&line.operands))
            .ok_or_else(|| AssemblyError::InvalidOperands {
                line: line_no,
                mnemonic: mnemonic.clone(),
                text: text.trim().to_string(),
            })?;

        let address = self.pointer(line_no)?;
        self.line_to_address.insert(line_no, address);
        tracing::trace!("line {}: {} at {:02X}", line_no, op, address);

        let size = self.memory.size();
        let mut emitter = Emitter {
            memory: &mut *self.memory,
            patches: &mut self.patches,
            line: line_no,
        };
        op.encode(&line.operands, &mut emitter)
            .map_err(|err| match err {
                EncodeError::InvalidLiteral(literal) => AssemblyError::InvalidLiteral {
                    line: line_no,
                    literal,
                },
                EncodeError::Full => AssemblyError::ProgramTooLarge {
                    line: line_no,
                    size,
                },
                EncodeError::Rejected => AssemblyError::InvalidOperands {
                    line: line_no,
                    mnemonic: mnemonic.clone(),
                    text: text.trim().to_string(),
                },
            })
    }

    /// Second pass: overwrite every placeholder with its label's address.
    fn resolve(&mut self) -> Result<(), AssemblyError> {
        for patch in &self.patches {
            let address =
                *self
                    .labels
                    .get(&patch.label)
                    .ok_or_else(|| AssemblyError::LabelNotFound {
                        label: format!("{LABEL_SIGIL}{}", patch.label),
                    })?;
            self.memory
                .patch_byte(patch.address, address)
                .map_err(|_| AssemblyError::ProgramTooLarge {
                    line: patch.line,
                    size: self.memory.size(),
                })?;
            tracing::trace!(
                "line {}: '{}' resolved to {:02X}",
                patch.line,
                patch.label,
                address
            );
        }
        Ok(())
    }
}

impl Emulator {
    /// Assembles `source` into memory.
    ///
    /// On any error memory is cleared, the observer is told, and nothing of
    /// the program stays resident.
    pub fn assemble(&mut self, source: &str) -> Result<&CompilationArtifacts, AssemblyError> {
        let span = tracing::info_span!("assemble", source_length = source.len());
        let _guard = span.enter();

        tracing::info!("assembling program");

        match Assembler::new(&mut self.memory).assemble(source) {
            Ok(artifacts) => {
                tracing::info!(
                    bytes = artifacts.len,
                    labels = artifacts.labels.len(),
                    "assembly succeeded"
                );
                self.observer.notify(|o| o.memory_updated(&self.memory));
                Ok(self.artifacts.insert(artifacts))
            }
            Err(err) => {
                tracing::warn!("assembly failed: {}", err);
                self.memory.clear();
                self.artifacts = None;
                self.observer.notify(|o| {
                    o.syntax_error(&err);
                    o.memory_updated(&self.memory);
                });
                Err(err)
            }
        }
    }

    /// Lists the assembled region as `(address, source)` pairs.
    pub fn disassemble(&self) -> Vec<(u8, String)> {
        let bytes = &self.memory.bytes()[..self.memory.assembly_pointer()];
        let mut listing = Vec::new();
        let mut address = 0;

        while address < bytes.len() {
            let byte = bytes[address];
            let decoded = OpCode::from_value(byte).filter(|op| address + op.width() <= bytes.len());
            let (text, width) = match decoded {
                Some(op) if op.width() == 2 => (op.render(Some(bytes[address + 1])), 2),
                Some(op) => (op.render(None), 1),
                None => (OpCode::Byte.render(Some(byte)), 1),
            };
            listing.push((address as u8, text));
            address += width;
        }
        listing
    }
}

use std::fmt;

use crate::commons::Word;

// LC-2K instruction words
//
//  31..25  unused
//  24..22  opcode
//  21..19  reg A
//  18..16  reg B
//  15..0   offset (lw, sw, beq) or destination register (add, nand)

pub type Reg = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instr {
    Add { a: Reg, b: Reg, dest: Reg },
    Nand { a: Reg, b: Reg, dest: Reg },
    Lw { a: Reg, b: Reg, offset: i32 },
    Sw { a: Reg, b: Reg, offset: i32 },
    Beq { a: Reg, b: Reg, offset: i32 },
    Jalr { a: Reg, b: Reg },
    Halt,
    Noop,
}

impl Instr {
    pub fn decode(word: Word) -> Self {
        let word = word as u32;
        let a = ((word >> 19) & 0b111) as Reg;
        let b = ((word >> 16) & 0b111) as Reg;
        let low = (word & 0xffff) as u16;
        let dest = (low & 0b111) as Reg;
        let offset = sign_extend(low);
        match (word >> 22) & 0b111 {
            0 => Instr::Add { a, b, dest },
            1 => Instr::Nand { a, b, dest },
            2 => Instr::Lw { a, b, offset },
            3 => Instr::Sw { a, b, offset },
            4 => Instr::Beq { a, b, offset },
            5 => Instr::Jalr { a, b },
            6 => Instr::Halt,
            _ => Instr::Noop,
        }
    }
}

fn sign_extend(field: u16) -> i32 {
    field as i16 as i32
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instr::Add { a, b, dest } => write!(f, "add {} {} {}", a, b, dest),
            Instr::Nand { a, b, dest } => write!(f, "nand {} {} {}", a, b, dest),
            Instr::Lw { a, b, offset } => write!(f, "lw {} {} {}", a, b, offset),
            Instr::Sw { a, b, offset } => write!(f, "sw {} {} {}", a, b, offset),
            Instr::Beq { a, b, offset } => write!(f, "beq {} {} {}", a, b, offset),
            Instr::Jalr { a, b } => write!(f, "jalr {} {}", a, b),
            Instr::Halt => write!(f, "halt"),
            Instr::Noop => write!(f, "noop"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_fields() {
        // lw 0 1 5
        assert_eq!(Instr::decode(8454149), Instr::Lw { a: 0, b: 1, offset: 5 });
        // add 1 1 2
        assert_eq!(Instr::decode(589826), Instr::Add { a: 1, b: 1, dest: 2 });
        // beq 0 0 -1
        assert_eq!(Instr::decode(16842751), Instr::Beq { a: 0, b: 0, offset: -1 });
        assert_eq!(Instr::decode(25165824), Instr::Halt);
        assert_eq!(Instr::decode(29360128), Instr::Noop);
    }

    #[test]
    fn plain_data_decodes_as_add() {
        assert_eq!(Instr::decode(21), Instr::Add { a: 0, b: 0, dest: 5 });
    }
}

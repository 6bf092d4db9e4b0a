use anyhow::{bail, ensure, Context, Result};
use log::{info, trace};

use crate::cache::Cache;
use crate::commons::{Addr, Word};
use crate::events::{EventLog, Stats};
use crate::instr::Instr;
use crate::memory::{Memory, MemoryPort};

pub const NUM_REGS: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcState {
    Running,
    Halted,
}

/// Outcome of a program run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub instructions: u64,
    pub stats: Stats,
}

/// LC-2K processor. Every instruction fetch, load and store goes through the cache.
pub struct Processor {
    pub pc: u32,
    pub regs: [Word; NUM_REGS],
    mem: Memory,
    cache: Cache,
    executed: u64,
}

impl Processor {
    pub fn new(mem: Memory, cache: Cache) -> Result<Self> {
        let block_size = cache.spec().block_size as usize;
        ensure!(
            block_size <= mem.size(),
            "block size of {} words exceeds memory size of {} words",
            block_size,
            mem.size(),
        );
        Ok(Processor {
            pc: 0,
            regs: [0; NUM_REGS],
            mem,
            cache,
            executed: 0,
        })
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn executed(&self) -> u64 {
        self.executed
    }

    // helper functions

    fn addr(&self, value: i64) -> Result<Addr> {
        if value < 0 || value >= self.mem.size() as i64 {
            bail!("address {} out of range (pc={})", value, self.pc);
        }
        Ok(Addr(value as u32))
    }

    fn effective(&self, base: usize, offset: i32) -> Result<Addr> {
        self.addr(i64::from(self.regs[base]) + i64::from(offset))
    }

    // execution

    /// Fetches and executes one instruction.
    pub fn step<L: EventLog + ?Sized>(&mut self, log: &mut L) -> Result<ProcState> {
        let pc = self.addr(i64::from(self.pc))?;
        let instr = Instr::decode(self.cache.fetch(pc, &mut self.mem, log));
        trace!("{:>5}: {}", pc, instr);
        self.executed += 1;
        self.pc += 1;

        match instr {
            Instr::Add { a, b, dest } => {
                self.regs[dest] = self.regs[a].wrapping_add(self.regs[b]);
            }
            Instr::Nand { a, b, dest } => {
                self.regs[dest] = !(self.regs[a] & self.regs[b]);
            }
            Instr::Lw { a, b, offset } => {
                let addr = self.effective(a, offset)?;
                self.regs[b] = self.cache.load(addr, &mut self.mem, log);
            }
            Instr::Sw { a, b, offset } => {
                let addr = self.effective(a, offset)?;
                self.cache.store(addr, self.regs[b], &mut self.mem, log);
            }
            Instr::Beq { a, b, offset } => {
                if self.regs[a] == self.regs[b] {
                    self.pc = self.addr(i64::from(self.pc) + i64::from(offset))?.0;
                }
            }
            Instr::Jalr { a, b } => {
                let target = self.regs[a];
                self.regs[b] = self.pc as Word;
                self.pc = self.addr(i64::from(target))?.0;
            }
            Instr::Halt => return Ok(ProcState::Halted),
            Instr::Noop => (),
        }
        Ok(ProcState::Running)
    }

    /// Runs until `halt`, then flushes the cache so memory holds every store.
    ///
    /// With a `limit`, running more than that many instructions is an error.
    pub fn run<L: EventLog + ?Sized>(&mut self, log: &mut L, limit: Option<u64>) -> Result<Summary> {
        loop {
            if let Some(limit) = limit {
                ensure!(self.executed < limit, "no halt after {} instructions", limit);
            }
            let state = self
                .step(log)
                .with_context(|| format!("executing instruction {}", self.executed))?;
            if state == ProcState::Halted {
                break;
            }
        }
        info!("Machine halted after {} instructions", self.executed);
        self.cache.flush(&mut self.mem, log);
        Ok(Summary {
            instructions: self.executed,
            stats: self.cache.stats(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commons::CacheSpec;

    fn encode(op: u32, a: u32, b: u32, low: i32) -> Word {
        ((op << 22) | (a << 19) | (b << 16) | (low as u32 & 0xffff)) as Word
    }

    fn processor(image: &[Word], spec: CacheSpec) -> Processor {
        let mem = Memory::from_image(image).unwrap();
        Processor::new(mem, Cache::new(spec).unwrap()).unwrap()
    }

    #[test]
    fn runs_a_program_through_the_cache() {
        let image = [
            encode(2, 0, 1, 5), // lw 0 1 five
            encode(0, 1, 1, 2), // add 1 1 2
            encode(3, 0, 2, 6), // sw 0 2 answer
            encode(6, 0, 0, 0), // halt
            encode(7, 0, 0, 0), // noop
            21,                 // five: .fill 21
            0,                  // answer: .fill 0
        ];
        let mut proc = processor(&image, CacheSpec::new(2, 2, 1).unwrap());
        let summary = proc.run(&mut (), None).unwrap();

        assert_eq!(summary.instructions, 4);
        assert_eq!(summary.stats.accesses(), 6);
        assert_eq!(proc.regs[2], 42);
        assert_eq!(proc.memory().read_word(Addr(6)), 42);
        assert_eq!(proc.cache().dirty_lines(), 0);
    }

    #[test]
    fn counts_down_a_loop() {
        let image = [
            encode(2, 0, 1, 7),  // lw 0 1 count
            encode(2, 0, 2, 8),  // lw 0 2 neg1
            encode(4, 1, 0, 2),  // loop: beq 1 0 done
            encode(0, 1, 2, 1),  // add 1 2 1
            encode(4, 0, 0, -3), // beq 0 0 loop
            encode(6, 0, 0, 0),  // done: halt
            0,
            3,                   // count
            -1,                  // neg1
        ];
        let mut proc = processor(&image, CacheSpec::default());
        let summary = proc.run(&mut (), Some(100)).unwrap();

        assert_eq!(proc.regs[1], 0);
        // 2 loads, 3 full iterations, final beq, halt
        assert_eq!(summary.instructions, 2 + 3 * 3 + 1 + 1);
    }

    #[test]
    fn jalr_links_and_jumps() {
        let image = [
            encode(2, 0, 1, 4), // lw 0 1 target
            encode(5, 1, 2, 0), // jalr 1 2
            encode(7, 0, 0, 0), // noop (skipped)
            encode(6, 0, 0, 0), // halt
            3,                  // target
        ];
        let mut proc = processor(&image, CacheSpec::default());
        let summary = proc.run(&mut (), None).unwrap();
        assert_eq!(proc.regs[2], 2);
        assert_eq!(summary.instructions, 3);
    }

    #[test]
    fn bad_address_is_an_error() {
        let image = [
            encode(2, 0, 1, -1), // lw 0 1 -1
            encode(6, 0, 0, 0),
        ];
        let mut proc = processor(&image, CacheSpec::default());
        assert!(proc.run(&mut (), None).is_err());
    }

    #[test]
    fn runaway_program_hits_the_limit() {
        let image = [encode(4, 0, 0, -1)]; // beq 0 0 -1
        let mut proc = processor(&image, CacheSpec::default());
        assert!(proc.run(&mut (), Some(50)).is_err());
        assert_eq!(proc.executed(), 50);
    }
}

use std::fmt;

// words and cache geometry

/// A machine word. Memory, registers and cache blocks all hold these.
pub type Word = i32;

/// Upper bound on `num_sets * assoc`, the number of lines the hardware can hold.
pub const MAX_CACHE_LINES: u64 = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheSpec {          // unit     reasonable defaults
    pub block_size: u32,        // words    4
    pub num_sets: u32,          // sets     4
    pub assoc: u32,             // ways     2
}

impl Default for CacheSpec {
    fn default() -> Self {
        CacheSpec {
            block_size: 4,
            num_sets: 4,
            assoc: 2,
        }
    }
}

impl CacheSpec {
    /// Builds a validated geometry. Every dimension must be a power of two and the cache may
    /// not hold more than [`MAX_CACHE_LINES`] lines.
    pub fn new(block_size: u32, num_sets: u32, assoc: u32) -> Result<Self, ConfigError> {
        let spec = CacheSpec { block_size, num_sets, assoc };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let dims = [
            ("block size", self.block_size),
            ("number of sets", self.num_sets),
            ("associativity", self.assoc),
        ];
        for (field, value) in dims {
            if !value.is_power_of_two() {
                return Err(ConfigError::NotPowerOfTwo { field, value });
            }
        }
        let lines = self.num_lines();
        if lines > MAX_CACHE_LINES {
            return Err(ConfigError::TooManyLines { lines });
        }
        Ok(())
    }

    pub fn num_lines(&self) -> u64 {
        u64::from(self.num_sets) * u64::from(self.assoc)
    }

    fn block_bits(&self) -> u32 {
        self.block_size.trailing_zeros()
    }

    fn set_bits(&self) -> u32 {
        self.num_sets.trailing_zeros()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    NotPowerOfTwo { field: &'static str, value: u32 },
    TooManyLines { lines: u64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotPowerOfTwo { field, value } => {
                write!(f, "{field} must be a power of two, got {value}")
            }
            ConfigError::TooManyLines { lines } => write!(
                f,
                "cache would hold {lines} lines, at most {MAX_CACHE_LINES} are supported",
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// addresses

/// A linear word address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Addr(pub u32);

/// Where an address lives in the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pos {
    pub tag: u32,
    pub set: usize,
    pub offset: usize,
}

impl Addr {
    /// get tag, set index and block offset of this address under given cache specs
    pub fn pos(&self, spec: &CacheSpec) -> Pos {
        let addr = u64::from(self.0);
        let offset = addr & u64::from(spec.block_size - 1);
        let set = (addr >> spec.block_bits()) & u64::from(spec.num_sets - 1);
        let tag = addr >> (spec.block_bits() + spec.set_bits());
        Pos {
            tag: tag as u32,
            set: set as usize,
            offset: offset as usize,
        }
    }

    /// base address of the block tagged `tag` in set `set`
    pub fn from_pos(tag: u32, set: usize, spec: &CacheSpec) -> Addr {
        let block = (u64::from(tag) << spec.set_bits()) | set as u64;
        Addr((block << spec.block_bits()) as u32)
    }

    pub fn block_base(&self, spec: &CacheSpec) -> Addr {
        Addr(self.0 & !(spec.block_size - 1))
    }

    pub fn offset(&self, n: u32) -> Addr {
        Addr(self.0 + n)
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

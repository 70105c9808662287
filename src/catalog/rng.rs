//! Id token generation for ingested units. SplitMix64 keyed by an ingestion nonce.
//! Deterministic: the same nonce and row always produce the same token.

const SPLITMIX64_GOLDEN: u64 = 0x9e3779b97f4a7c15;
const SPLITMIX64_M1: u64 = 0xbf58476d1ce4e5b9;
const SPLITMIX64_M2: u64 = 0x94d049bb133111eb;

const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
pub const TOKEN_LEN: usize = 6;

#[derive(Debug, Clone, Copy)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(SPLITMIX64_GOLDEN);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(SPLITMIX64_M1);
        z = (z ^ (z >> 27)).wrapping_mul(SPLITMIX64_M2);
        z ^ (z >> 31)
    }
}

/// Source of the random-looking suffix appended to every unit id.
///
/// `attempt` is bumped by ingestion when a generated id collides with one
/// already issued in the same catalog.
pub trait IdSource {
    fn token(&mut self, row: usize, attempt: u32) -> String;
}

/// Default id source: tokens are a pure function of (nonce, row, attempt).
#[derive(Debug, Clone, Copy)]
pub struct NonceIds {
    nonce: u64,
}

impl NonceIds {
    pub fn new(nonce: u64) -> Self {
        Self { nonce }
    }

    /// Nonce drawn from the OS. Falls back to the clock if the OS source is unavailable.
    pub fn from_entropy() -> Self {
        let mut buf = [0_u8; 8];
        let nonce = match getrandom::getrandom(&mut buf) {
            Ok(()) => u64::from_le_bytes(buf),
            Err(err) => {
                tracing::warn!("os entropy unavailable ({err}), seeding ids from clock");
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_nanos() as u64)
                    .unwrap_or(0)
            }
        };
        Self { nonce }
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }
}

impl IdSource for NonceIds {
    fn token(&mut self, row: usize, attempt: u32) -> String {
        let key = (row as u64)
            .wrapping_mul(SPLITMIX64_GOLDEN)
            .wrapping_add(u64::from(attempt).rotate_left(32));
        let mut rng = Rng::new(self.nonce ^ key);
        (0..TOKEN_LEN)
            .map(|_| {
                let idx = (rng.next_u64() % TOKEN_ALPHABET.len() as u64) as usize;
                TOKEN_ALPHABET[idx] as char
            })
            .collect()
    }
}
